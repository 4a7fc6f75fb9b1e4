//! Session Store
//!
//! Id-keyed container of the currently-known bearer sessions. Owned
//! exclusively by the tracker worker task, so no locking is needed; all
//! reads and writes happen from the one serialized execution context.

use std::collections::HashMap;

use crate::session::{QosSession, SessionId};

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, QosSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a session under its id, returning the previous
    /// snapshot when one existed.
    pub fn insert(&mut self, session: QosSession) -> Option<QosSession> {
        self.sessions.insert(session.session_id, session)
    }

    pub fn remove(&mut self, session_id: &SessionId) -> Option<QosSession> {
        self.sessions.remove(session_id)
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&QosSession> {
        self.sessions.get(session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &QosSession> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{QosBandwidth, QosSpec};

    fn session(id: u32, qci: u8) -> QosSession {
        QosSession::new(
            SessionId(id),
            vec![],
            QosSpec::Eps {
                qci,
                uplink: QosBandwidth::default(),
                downlink: QosBandwidth::default(),
            },
        )
    }

    #[test]
    fn insert_replaces_by_id() {
        let mut store = SessionStore::new();
        assert!(!store.contains(&SessionId(1)));
        assert!(store.insert(session(1, 5)).is_none());
        assert_eq!(store.len(), 1);
        assert!(store.contains(&SessionId(1)));

        // Same id: replaced, previous snapshot returned.
        let old = store.insert(session(1, 9)).unwrap();
        assert_eq!(old.qos.qos_class(), 5);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&SessionId(1)).unwrap().qos.qos_class(), 9);
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut store = SessionStore::new();
        assert!(store.remove(&SessionId(42)).is_none());

        store.insert(session(2, 5));
        assert!(store.remove(&SessionId(2)).is_some());
        assert!(!store.contains(&SessionId(2)));
        assert!(store.is_empty());
    }
}
