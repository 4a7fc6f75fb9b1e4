//! Session Notification Surface
//!
//! Attribute payloads and the sink interface the tracker dispatches
//! available/lost notifications through. Dispatch is best-effort from the
//! tracker's perspective: a sink that drops or fails an event never rolls
//! back store state.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::session::{CallbackId, QosSession, QosSpec, SessionId};

/// Bearer type tag reported with lost notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    EpsBearer,
    NrBearer,
}

/// QoS attributes delivered with an available notification, mirroring the
/// session's QoS variant plus up to one remote endpoint derived from the
/// matched session filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAttributes {
    EpsBearer {
        qci: u8,
        max_uplink_kbps: u64,
        max_downlink_kbps: u64,
        guaranteed_downlink_kbps: u64,
        guaranteed_uplink_kbps: u64,
        remote_endpoint: Option<SocketAddr>,
    },
    NrBearer {
        five_qi: u16,
        qfi: u8,
        max_uplink_kbps: u64,
        max_downlink_kbps: u64,
        guaranteed_downlink_kbps: u64,
        guaranteed_uplink_kbps: u64,
        averaging_window_ms: u32,
        remote_endpoint: Option<SocketAddr>,
    },
}

impl SessionAttributes {
    /// Build the attribute payload for a session, attaching the remote
    /// endpoint derived from the matched filter (if any).
    pub fn from_session(session: &QosSession, remote_endpoint: Option<SocketAddr>) -> Self {
        match &session.qos {
            QosSpec::Eps { qci, uplink, downlink } => SessionAttributes::EpsBearer {
                qci: *qci,
                max_uplink_kbps: uplink.max_bitrate_kbps,
                max_downlink_kbps: downlink.max_bitrate_kbps,
                guaranteed_downlink_kbps: downlink.guaranteed_bitrate_kbps,
                guaranteed_uplink_kbps: uplink.guaranteed_bitrate_kbps,
                remote_endpoint,
            },
            QosSpec::Nr { five_qi, qfi, uplink, downlink, averaging_window_ms } => {
                SessionAttributes::NrBearer {
                    five_qi: *five_qi,
                    qfi: *qfi,
                    max_uplink_kbps: uplink.max_bitrate_kbps,
                    max_downlink_kbps: downlink.max_bitrate_kbps,
                    guaranteed_downlink_kbps: downlink.guaranteed_bitrate_kbps,
                    guaranteed_uplink_kbps: uplink.guaranteed_bitrate_kbps,
                    averaging_window_ms: *averaging_window_ms,
                    remote_endpoint,
                }
            }
        }
    }
}

/// Consumer interface for session notifications.
///
/// Calls arrive from the tracker's worker task, strictly in transition
/// order; implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn session_available(
        &self,
        callback_id: CallbackId,
        session_id: SessionId,
        attributes: SessionAttributes,
    );

    fn session_lost(
        &self,
        callback_id: CallbackId,
        session_id: SessionId,
        session_type: SessionType,
    );
}

/// Notification as a plain event value, for channel-based consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QosEvent {
    Available {
        callback_id: CallbackId,
        session_id: SessionId,
        attributes: SessionAttributes,
    },
    Lost {
        callback_id: CallbackId,
        session_id: SessionId,
        session_type: SessionType,
    },
}

/// `NotificationSink` that forwards every notification into an unbounded
/// channel. Dropped receivers make forwarding a silent no-op.
pub struct ChannelSink {
    event_tx: mpsc::UnboundedSender<QosEvent>,
}

/// Create a channel-backed sink and the receiving half for consumers.
pub fn channel_sink() -> (ChannelSink, mpsc::UnboundedReceiver<QosEvent>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    (ChannelSink { event_tx }, event_rx)
}

impl NotificationSink for ChannelSink {
    fn session_available(
        &self,
        callback_id: CallbackId,
        session_id: SessionId,
        attributes: SessionAttributes,
    ) {
        let _ = self.event_tx.send(QosEvent::Available { callback_id, session_id, attributes });
    }

    fn session_lost(
        &self,
        callback_id: CallbackId,
        session_id: SessionId,
        session_type: SessionType,
    ) {
        let _ = self.event_tx.send(QosEvent::Lost { callback_id, session_id, session_type });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{QosBandwidth, SessionFilter};

    #[test]
    fn eps_attributes_from_session() {
        let session = QosSession::new(
            SessionId(1),
            vec![SessionFilter::new(1)],
            QosSpec::Eps {
                qci: 5,
                uplink: QosBandwidth::new(100, 50),
                downlink: QosBandwidth::new(200, 80),
            },
        );
        let remote: SocketAddr = "10.0.0.1:80".parse().unwrap();

        let attrs = SessionAttributes::from_session(&session, Some(remote));
        assert_eq!(
            attrs,
            SessionAttributes::EpsBearer {
                qci: 5,
                max_uplink_kbps: 100,
                max_downlink_kbps: 200,
                guaranteed_downlink_kbps: 80,
                guaranteed_uplink_kbps: 50,
                remote_endpoint: Some(remote),
            }
        );
    }

    #[test]
    fn nr_attributes_from_session() {
        let session = QosSession::new(
            SessionId(2),
            vec![],
            QosSpec::Nr {
                five_qi: 9,
                qfi: 3,
                uplink: QosBandwidth::new(1000, 500),
                downlink: QosBandwidth::new(2000, 900),
                averaging_window_ms: 2000,
            },
        );

        let attrs = SessionAttributes::from_session(&session, None);
        assert_eq!(
            attrs,
            SessionAttributes::NrBearer {
                five_qi: 9,
                qfi: 3,
                max_uplink_kbps: 1000,
                max_downlink_kbps: 2000,
                guaranteed_downlink_kbps: 900,
                guaranteed_uplink_kbps: 500,
                averaging_window_ms: 2000,
                remote_endpoint: None,
            }
        );
    }

    #[test]
    fn events_serialize_for_diagnostic_export() {
        let event = QosEvent::Available {
            callback_id: CallbackId(4),
            session_id: SessionId(11),
            attributes: SessionAttributes::EpsBearer {
                qci: 5,
                max_uplink_kbps: 100,
                max_downlink_kbps: 200,
                guaranteed_downlink_kbps: 80,
                guaranteed_uplink_kbps: 50,
                remote_endpoint: Some("10.0.0.1:80".parse().unwrap()),
            },
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["Available"]["callback_id"], 4);
        assert_eq!(json["Available"]["session_id"], 11);
        assert_eq!(json["Available"]["attributes"]["EpsBearer"]["qci"], 5);

        let decoded: QosEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn channel_sink_forwards_events() {
        let (sink, mut rx) = channel_sink();
        sink.session_lost(CallbackId(7), SessionId(1), SessionType::EpsBearer);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            QosEvent::Lost {
                callback_id: CallbackId(7),
                session_id: SessionId(1),
                session_type: SessionType::EpsBearer,
            }
        );
    }
}
