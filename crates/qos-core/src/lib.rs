//! # qostrack-qos-core
//!
//! Tracks the QoS bearer sessions offered by a mobile network and matches
//! them against client-registered packet filters, emitting session
//! available/lost notifications whenever the matching relationship changes.
//!
//! The modem side delivers full session snapshots; [`QosCallbackTracker`]
//! diffs each snapshot against the previous one, re-evaluates every
//! (filter, session) pair with the pure matching engine in [`filter`], and
//! dispatches at most one notification per real transition. All operations
//! run on one serialized worker task, so the tracker never needs locks on
//! its session store or callback registry.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use qos_core::{
//!     channel_sink, CallbackId, NullMetrics, PortRange, QosBandwidth, QosCallbackTracker,
//!     QosSession, QosSpec, SessionFilter, SessionId, SocketFilter, TrackerConfig,
//! };
//!
//! # async fn run() -> qos_core::Result<()> {
//! let (sink, mut events) = channel_sink();
//! let tracker = QosCallbackTracker::new(
//!     TrackerConfig::default(),
//!     Arc::new(sink),
//!     Arc::new(NullMetrics),
//! );
//!
//! tracker.add_filter(
//!     CallbackId(1),
//!     Arc::new(
//!         SocketFilter::new("192.168.1.2:5000".parse().unwrap())
//!             .with_remote("10.0.0.1:80".parse().unwrap()),
//!     ),
//! )?;
//!
//! tracker.update_sessions(vec![QosSession::new(
//!     SessionId(1),
//!     vec![SessionFilter::new(1)
//!         .with_remote("10.0.0.1".parse().unwrap(), PortRange::new(80, 80))],
//!     QosSpec::Eps {
//!         qci: 5,
//!         uplink: QosBandwidth::new(100, 50),
//!         downlink: QosBandwidth::new(200, 100),
//!     },
//! )])?;
//!
//! let event = events.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod events;
pub mod filter;
pub mod metrics;
pub mod registry;
pub mod session;
pub mod store;
pub mod tracker;

pub use errors::{QosTrackerError, Result};
pub use events::{
    channel_sink, ChannelSink, NotificationSink, QosEvent, SessionAttributes, SessionType,
};
pub use filter::{best_matching_filter, session_matches, QosFilter, SocketFilter};
pub use metrics::{BearerTransition, MetricsSink, NullMetrics, RadioAccessType};
pub use session::{
    CallbackId, PortRange, QosBandwidth, QosSession, QosSpec, SessionFilter, SessionId,
};
pub use tracker::{QosCallbackTracker, TrackerConfig};
