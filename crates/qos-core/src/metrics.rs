//! Metrics Surface
//!
//! Collaborator interface for dedicated-bearer metrics. The tracker reports
//! listener lifecycle and per-transition bearer events through this trait;
//! embedders without a metrics pipeline plug in [`NullMetrics`].

use serde::{Deserialize, Serialize};

use crate::session::CallbackId;

/// Network generation inferred from a session's QoS variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadioAccessType {
    /// 4G / EPS bearer.
    Lte,
    /// 5G / NR QoS flow.
    Nr,
}

/// Kind of matching transition a bearer event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BearerTransition {
    /// Initial state of a (callback, session) pair before any match. The
    /// tracker only reports actual transitions, so it never emits this
    /// variant itself; it completes the vocabulary for sinks that persist
    /// or aggregate transition state.
    None,
    Added,
    Modified,
    Deleted,
}

/// Consumer interface for dedicated-bearer metrics.
///
/// Calls arrive from the tracker's worker task and must not block.
pub trait MetricsSink: Send + Sync {
    /// A registered listener found a matching session (fired per match when
    /// a filter is added against the current store).
    fn dedicated_bearer_listener_added(
        &self,
        callback_id: CallbackId,
        slot_id: u32,
        radio_access_type: RadioAccessType,
        qos_class: u16,
    );

    /// A listener registration was removed.
    fn dedicated_bearer_listener_removed(&self, callback_id: CallbackId);

    /// A listener was told about a session (fired alongside every available
    /// notification).
    fn dedicated_bearer_listener_updated(
        &self,
        callback_id: CallbackId,
        slot_id: u32,
        radio_access_type: RadioAccessType,
        qos_class: u16,
        established: bool,
    );

    /// A matching transition occurred between some filter and a session.
    #[allow(clippy::too_many_arguments)]
    fn dedicated_bearer_event(
        &self,
        slot_id: u32,
        radio_access_type: RadioAccessType,
        qos_class: u16,
        transition: BearerTransition,
        has_local_info: bool,
        has_remote_info: bool,
        established: bool,
    );
}

/// No-op metrics sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn dedicated_bearer_listener_added(
        &self,
        _callback_id: CallbackId,
        _slot_id: u32,
        _radio_access_type: RadioAccessType,
        _qos_class: u16,
    ) {
    }

    fn dedicated_bearer_listener_removed(&self, _callback_id: CallbackId) {}

    fn dedicated_bearer_listener_updated(
        &self,
        _callback_id: CallbackId,
        _slot_id: u32,
        _radio_access_type: RadioAccessType,
        _qos_class: u16,
        _established: bool,
    ) {
    }

    fn dedicated_bearer_event(
        &self,
        _slot_id: u32,
        _radio_access_type: RadioAccessType,
        _qos_class: u16,
        _transition: BearerTransition,
        _has_local_info: bool,
        _has_remote_info: bool,
        _established: bool,
    ) {
    }
}
