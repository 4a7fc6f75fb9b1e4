//! Session Type Definitions
//!
//! Immutable value snapshots of QoS bearer sessions. A session is replaced
//! wholesale on every snapshot update; nothing here is mutated in place.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::events::SessionType;
use crate::metrics::RadioAccessType;

/// Unique identifier of a bearer session, assigned by the network.
///
/// Stable across snapshot updates for as long as the underlying bearer
/// persists; at most one session carries a given id at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a registered client callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallbackId(pub u32);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive port range constraint on one side of a session filter.
///
/// An unspecified range (the default) is invalid and imposes no usable
/// constraint; the matching engine skips filters whose relevant range is
/// invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    /// Lowest port the bearer filter domain considers assignable.
    pub const MIN_PORT: u16 = 20;
    /// Highest valid port.
    pub const MAX_PORT: u16 = 65535;

    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// The full assignable port domain.
    pub fn full() -> Self {
        Self { start: Self::MIN_PORT, end: Self::MAX_PORT }
    }

    /// A range is valid when it is non-empty and lies within the port domain.
    pub fn is_valid(&self) -> bool {
        self.start >= Self::MIN_PORT && self.start <= self.end
    }

    pub fn contains(&self, port: u16) -> bool {
        self.is_valid() && port >= self.start && port <= self.end
    }
}

/// One packet-filter entry within a bearer session.
///
/// Carries zero-or-more local and remote addresses, a port range per side,
/// and a precedence value. Lower precedence values rank higher when several
/// filters of one session match the same client filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    pub local_addresses: Vec<IpAddr>,
    pub remote_addresses: Vec<IpAddr>,
    pub local_port_range: PortRange,
    pub remote_port_range: PortRange,
    pub precedence: u32,
}

impl SessionFilter {
    pub fn new(precedence: u32) -> Self {
        Self {
            local_addresses: Vec::new(),
            remote_addresses: Vec::new(),
            local_port_range: PortRange::default(),
            remote_port_range: PortRange::default(),
            precedence,
        }
    }

    pub fn with_local(mut self, address: IpAddr, ports: PortRange) -> Self {
        self.local_addresses.push(address);
        self.local_port_range = ports;
        self
    }

    pub fn with_remote(mut self, address: IpAddr, ports: PortRange) -> Self {
        self.remote_addresses.push(address);
        self.remote_port_range = ports;
        self
    }

    /// Whether this filter carries a usable local endpoint constraint.
    pub fn has_local_endpoint_info(&self) -> bool {
        !self.local_addresses.is_empty() && self.local_port_range.is_valid()
    }

    /// Whether this filter carries a usable remote endpoint constraint.
    pub fn has_remote_endpoint_info(&self) -> bool {
        !self.remote_addresses.is_empty() && self.remote_port_range.is_valid()
    }
}

/// Guaranteed and maximum bitrate for one traffic direction, in kbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QosBandwidth {
    pub max_bitrate_kbps: u64,
    pub guaranteed_bitrate_kbps: u64,
}

impl QosBandwidth {
    pub fn new(max_bitrate_kbps: u64, guaranteed_bitrate_kbps: u64) -> Self {
        Self { max_bitrate_kbps, guaranteed_bitrate_kbps }
    }
}

/// QoS specification of a bearer session.
///
/// Exactly two variants exist: EPS (4G) and NR (5G). The tracker branches
/// exhaustively on this enum to derive radio access type and QoS class;
/// keeping it closed means an unrecognized variant cannot reach runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QosSpec {
    /// EPS bearer QoS (LTE): QoS class identifier plus per-direction bitrates.
    Eps {
        qci: u8,
        uplink: QosBandwidth,
        downlink: QosBandwidth,
    },
    /// NR QoS flow (5G): 5QI, QoS flow identifier, per-direction bitrates,
    /// and the averaging window over which bitrates are measured.
    Nr {
        five_qi: u16,
        qfi: u8,
        uplink: QosBandwidth,
        downlink: QosBandwidth,
        averaging_window_ms: u32,
    },
}

impl QosSpec {
    /// Radio access type implied by the QoS variant.
    pub fn radio_access_type(&self) -> RadioAccessType {
        match self {
            QosSpec::Eps { .. } => RadioAccessType::Lte,
            QosSpec::Nr { .. } => RadioAccessType::Nr,
        }
    }

    /// QoS class identifier: QCI for EPS, 5QI for NR.
    pub fn qos_class(&self) -> u16 {
        match self {
            QosSpec::Eps { qci, .. } => u16::from(*qci),
            QosSpec::Nr { five_qi, .. } => *five_qi,
        }
    }

    /// Session type tag reported with lost notifications.
    pub fn session_type(&self) -> SessionType {
        match self {
            QosSpec::Eps { .. } => SessionType::EpsBearer,
            QosSpec::Nr { .. } => SessionType::NrBearer,
        }
    }
}

/// One bearer session as delivered in a snapshot update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QosSession {
    /// Unique session identifier (primary key).
    pub session_id: SessionId,
    /// Packet filters describing the traffic this bearer carries.
    pub filters: Vec<SessionFilter>,
    /// QoS specification of the bearer.
    pub qos: QosSpec,
}

impl QosSession {
    pub fn new(session_id: SessionId, filters: Vec<SessionFilter>, qos: QosSpec) -> Self {
        Self { session_id, filters, qos }
    }
}
