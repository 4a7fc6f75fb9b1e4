//! Error handling for the tracker
//!
//! Matching never fails: absence of a match is a normal result, and the QoS
//! variant space is closed at the type level. The only runtime failure is
//! posting an operation to a tracker whose worker has stopped.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, QosTrackerError>;

#[derive(Error, Debug)]
pub enum QosTrackerError {
    /// The tracker worker is gone; the submission was discarded.
    #[error("tracker stopped, {operation} discarded")]
    TrackerStopped { operation: &'static str },
}

impl QosTrackerError {
    pub(crate) fn tracker_stopped(operation: &'static str) -> Self {
        Self::TrackerStopped { operation }
    }
}
