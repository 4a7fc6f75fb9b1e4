//! QoS Callback Tracker
//!
//! Matches client filters against bearer-session snapshots and dispatches
//! the corresponding available/lost notifications. All operations are
//! marshaled onto one ordered command queue drained by a single worker
//! task, so the session store and callback registry are touched from
//! exactly one execution context and need no locks.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{QosTrackerError, Result};
use crate::events::{NotificationSink, SessionAttributes};
use crate::filter::{best_matching_filter, QosFilter};
use crate::metrics::{BearerTransition, MetricsSink};
use crate::registry::CallbackRegistry;
use crate::session::{CallbackId, QosSession, SessionId};
use crate::store::SessionStore;

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Slot (SIM) index reported with metrics.
    pub slot_id: u32,
    /// Tag prefixed to this tracker's log lines, to tell instances apart.
    pub log_tag: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { slot_id: 0, log_tag: "qosct".to_string() }
    }
}

/// Operations marshaled onto the worker queue.
enum Command {
    AddFilter { callback_id: CallbackId, filter: Arc<dyn QosFilter> },
    RemoveFilter { callback_id: CallbackId },
    UpdateSessions { sessions: Vec<QosSession> },
    Flush { ack: oneshot::Sender<()> },
}

/// Handle to a running tracker.
///
/// Entry points may be called from any thread/task; each call is a
/// non-blocking hand-off to the worker queue and executes in submission
/// order. Dropping the handle aborts the worker, discarding any commands
/// that have not started yet.
pub struct QosCallbackTracker {
    command_tx: mpsc::UnboundedSender<Command>,
    worker: JoinHandle<()>,
}

impl QosCallbackTracker {
    /// Spawn the worker task. Requires a Tokio runtime.
    pub fn new(
        config: TrackerConfig,
        notifier: Arc<dyn NotificationSink>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let worker = TrackerWorker {
            config,
            sessions: SessionStore::new(),
            callbacks: CallbackRegistry::new(),
            notifier,
            metrics,
        };
        let worker = tokio::spawn(worker.run(command_rx));
        Self { command_tx, worker }
    }

    /// Register a filter to receive session notifications.
    ///
    /// The worker immediately evaluates the filter against every session in
    /// the store and emits an available notification per current match, so
    /// late-joining observers see the existing state.
    pub fn add_filter(&self, callback_id: CallbackId, filter: Arc<dyn QosFilter>) -> Result<()> {
        self.send(Command::AddFilter { callback_id, filter }, "add_filter")
    }

    /// Remove the registration for a callback id. Unknown ids are a no-op;
    /// no lost notifications are synthesized for sessions the filter was
    /// matching.
    pub fn remove_filter(&self, callback_id: CallbackId) -> Result<()> {
        self.send(Command::RemoveFilter { callback_id }, "remove_filter")
    }

    /// Replace the tracked session set with a new snapshot, emitting
    /// available/lost notifications for every matching transition.
    pub fn update_sessions(&self, sessions: Vec<QosSession>) -> Result<()> {
        self.send(Command::UpdateSessions { sessions }, "update_sessions")
    }

    /// Resolves once every previously submitted operation has executed.
    pub async fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::Flush { ack }, "flush")?;
        done.await.map_err(|_| QosTrackerError::tracker_stopped("flush"))
    }

    /// Stop the worker. Commands that have not started are discarded, no
    /// further sink callbacks fire, and subsequent entry-point calls fail
    /// with [`QosTrackerError::TrackerStopped`] once the worker is torn
    /// down.
    pub fn shutdown(&self) {
        self.worker.abort();
    }

    fn send(&self, command: Command, operation: &'static str) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| QosTrackerError::tracker_stopped(operation))
    }
}

impl Drop for QosCallbackTracker {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// The single-threaded engine behind the tracker handle. Owns all mutable
/// state; commands run to completion without interleaving.
struct TrackerWorker {
    config: TrackerConfig,
    sessions: SessionStore,
    callbacks: CallbackRegistry,
    notifier: Arc<dyn NotificationSink>,
    metrics: Arc<dyn MetricsSink>,
}

impl TrackerWorker {
    async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                Command::AddFilter { callback_id, filter } => {
                    self.handle_add_filter(callback_id, filter)
                }
                Command::RemoveFilter { callback_id } => self.handle_remove_filter(callback_id),
                Command::UpdateSessions { sessions } => self.handle_update_sessions(sessions),
                Command::Flush { ack } => {
                    let _ = ack.send(());
                }
            }
        }
        debug!("[{}] tracker worker stopped", self.config.log_tag);
    }

    fn handle_add_filter(&mut self, callback_id: CallbackId, filter: Arc<dyn QosFilter>) {
        debug!("[{}] addFilter: callback={}", self.config.log_tag, callback_id);
        self.callbacks.insert(callback_id, filter.clone());

        // Bootstrap: announce every session the new filter already matches.
        for session in self.sessions.sessions() {
            if best_matching_filter(session, filter.as_ref()).is_some() {
                self.send_session_available(callback_id, session, filter.as_ref());
                self.metrics.dedicated_bearer_listener_added(
                    callback_id,
                    self.config.slot_id,
                    session.qos.radio_access_type(),
                    session.qos.qos_class(),
                );
            }
        }
    }

    fn handle_remove_filter(&mut self, callback_id: CallbackId) {
        debug!("[{}] removeFilter: callback={}", self.config.log_tag, callback_id);
        self.callbacks.remove(&callback_id);
        self.metrics.dedicated_bearer_listener_removed(callback_id);
    }

    fn handle_update_sessions(&mut self, sessions: Vec<QosSession>) {
        debug!(
            "[{}] updateSessions: incoming={} known={}",
            self.config.log_tag,
            sessions.len(),
            self.sessions.len()
        );

        // Duplicate ids within one snapshot are a caller error; the last
        // entry wins deterministically.
        let mut incoming: HashMap<SessionId, QosSession> = HashMap::new();
        let mut order: Vec<SessionId> = Vec::with_capacity(sessions.len());
        for session in sessions {
            let session_id = session.session_id;
            if incoming.insert(session_id, session).is_some() {
                warn!(
                    "[{}] updateSessions: duplicate session id {}, last entry wins",
                    self.config.log_tag, session_id
                );
            } else {
                order.push(session_id);
            }
        }

        // Added / modified transitions, per incoming session in input order.
        for session_id in &order {
            let incoming_session = &incoming[session_id];
            let existing_session = self.sessions.get(session_id);

            for (callback_id, filter) in self.callbacks.iter() {
                let incoming_match =
                    best_matching_filter(incoming_session, filter.as_ref()).is_some();
                let existing_match = existing_session
                    .is_some_and(|existing| best_matching_filter(existing, filter.as_ref()).is_some());

                if !existing_match && incoming_match {
                    // The filter matches now and did not match earlier.
                    self.send_session_available(callback_id, incoming_session, filter.as_ref());
                    self.report_bearer_event(
                        incoming_session,
                        filter.as_ref(),
                        BearerTransition::Added,
                    );
                } else if existing_match && incoming_match {
                    // Same pair still matches; re-announce only when the QoS
                    // itself changed.
                    let qos_changed = existing_session
                        .map(|existing| existing.qos != incoming_session.qos)
                        .unwrap_or(false);
                    if qos_changed {
                        self.send_session_available(callback_id, incoming_session, filter.as_ref());
                        self.report_bearer_event(
                            incoming_session,
                            filter.as_ref(),
                            BearerTransition::Modified,
                        );
                    }
                }
            }
        }

        // Lost transitions for sessions absent from the snapshot.
        let mut removed: Vec<SessionId> = Vec::new();
        for existing_session in self.sessions.sessions() {
            if incoming.contains_key(&existing_session.session_id) {
                continue;
            }
            for (callback_id, filter) in self.callbacks.iter() {
                // A match here means the pair was previously available.
                if best_matching_filter(existing_session, filter.as_ref()).is_some() {
                    self.send_session_lost(callback_id, existing_session);
                    self.report_bearer_event(
                        existing_session,
                        filter.as_ref(),
                        BearerTransition::Deleted,
                    );
                }
            }
            removed.push(existing_session.session_id);
        }

        // Replace the store contents: everything in the snapshot goes in,
        // everything else goes away. Runs after all events so no partial
        // state is ever observed by matching.
        for session_id in order {
            if let Some(session) = incoming.remove(&session_id) {
                self.sessions.insert(session);
            }
        }
        for session_id in removed {
            self.sessions.remove(&session_id);
        }
    }

    fn send_session_available(
        &self,
        callback_id: CallbackId,
        session: &QosSession,
        filter: &dyn QosFilter,
    ) {
        let matched = best_matching_filter(session, filter);
        let remote_endpoint: Option<SocketAddr> = matched.and_then(|session_filter| {
            session_filter
                .remote_addresses
                .first()
                .map(|address| SocketAddr::new(*address, session_filter.remote_port_range.start))
        });

        let attributes = SessionAttributes::from_session(session, remote_endpoint);
        self.notifier.session_available(callback_id, session.session_id, attributes);

        self.metrics.dedicated_bearer_listener_updated(
            callback_id,
            self.config.slot_id,
            session.qos.radio_access_type(),
            session.qos.qos_class(),
            true,
        );
        debug!(
            "[{}] sessionAvailable: callback={} session={}",
            self.config.log_tag, callback_id, session.session_id
        );
    }

    fn send_session_lost(&self, callback_id: CallbackId, session: &QosSession) {
        self.notifier.session_lost(callback_id, session.session_id, session.qos.session_type());
        debug!(
            "[{}] sessionLost: callback={} session={}",
            self.config.log_tag, callback_id, session.session_id
        );
    }

    fn report_bearer_event(
        &self,
        session: &QosSession,
        filter: &dyn QosFilter,
        transition: BearerTransition,
    ) {
        let matched = best_matching_filter(session, filter);
        let has_local_info = matched.map_or(false, |m| m.has_local_endpoint_info());
        let has_remote_info = matched.map_or(false, |m| m.has_remote_endpoint_info());

        self.metrics.dedicated_bearer_event(
            self.config.slot_id,
            session.qos.radio_access_type(),
            session.qos.qos_class(),
            transition,
            has_local_info,
            has_remote_info,
            true,
        );
    }
}
