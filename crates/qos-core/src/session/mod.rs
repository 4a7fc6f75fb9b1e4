//! Bearer Session Model
//!
//! Value types describing QoS bearer sessions as delivered by the modem:
//! session ids, packet-filter constraints, and the EPS/NR QoS specifications.

pub mod types;

pub use types::{
    CallbackId, PortRange, QosBandwidth, QosSession, QosSpec, SessionFilter, SessionId,
};
