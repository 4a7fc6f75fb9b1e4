//! Filter Matching Engine
//!
//! Decides whether a client-registered filter matches a bearer session's
//! packet-filter list, resolving multiple matches by filter precedence.
//! Matching is a pure function of (session, filter); the tracker re-runs it
//! every snapshot cycle instead of persisting match state.

use std::net::{IpAddr, SocketAddr};

use crate::session::{PortRange, QosSession, SessionFilter};

/// Client-side matching capability registered with the tracker.
///
/// Implemented by whatever filter type the embedding transport provides;
/// the tracker only ever asks the two predicate questions and never mutates
/// or inspects the filter itself.
pub trait QosFilter: Send + Sync {
    /// Does this local address and port range fall inside the filter?
    fn matches_local(&self, address: IpAddr, start_port: u16, end_port: u16) -> bool;

    /// Does this remote address and port range fall inside the filter?
    fn matches_remote(&self, address: IpAddr, start_port: u16, end_port: u16) -> bool;
}

/// Returns the session filter matching `filter` with the highest precedence
/// (lowest precedence value), or `None` when nothing matches.
///
/// Each `SessionFilter` is evaluated independently; list order within the
/// session is irrelevant to the result. Ties keep the first filter found.
pub fn best_matching_filter<'a>(
    session: &'a QosSession,
    filter: &dyn QosFilter,
) -> Option<&'a SessionFilter> {
    let mut best: Option<&SessionFilter> = None;

    for session_filter in &session.filters {
        let matched = if session_filter.has_local_endpoint_info()
            && session_filter.has_remote_endpoint_info()
        {
            matches_remote_side(session_filter, filter) && matches_local_side(session_filter, filter)
        } else if session_filter.has_remote_endpoint_info() {
            matches_remote_side(session_filter, filter)
        } else if session_filter.has_local_endpoint_info() {
            matches_local_side(session_filter, filter)
        } else {
            // Neither side carries a usable constraint; can never match.
            false
        };

        if matched {
            best = Some(higher_precedence(best, session_filter));
        }
    }

    best
}

/// Whether any filter of `session` matches the client filter.
pub fn session_matches(session: &QosSession, filter: &dyn QosFilter) -> bool {
    best_matching_filter(session, filter).is_some()
}

// Only the first address of each list is consulted. Follows the upstream
// bearer-matching behavior; see the open-question note in DESIGN.md before
// widening this to the full list.
fn matches_local_side(session_filter: &SessionFilter, filter: &dyn QosFilter) -> bool {
    match session_filter.local_addresses.first() {
        Some(address) => filter.matches_local(
            *address,
            session_filter.local_port_range.start,
            session_filter.local_port_range.end,
        ),
        None => false,
    }
}

fn matches_remote_side(session_filter: &SessionFilter, filter: &dyn QosFilter) -> bool {
    match session_filter.remote_addresses.first() {
        Some(address) => filter.matches_remote(
            *address,
            session_filter.remote_port_range.start,
            session_filter.remote_port_range.end,
        ),
        None => false,
    }
}

/// Lower precedence value wins; the incumbent survives a tie.
fn higher_precedence<'a>(
    current: Option<&'a SessionFilter>,
    candidate: &'a SessionFilter,
) -> &'a SessionFilter {
    match current {
        Some(current) if current.precedence <= candidate.precedence => current,
        _ => candidate,
    }
}

/// Socket-bound client filter: exact address equality plus port containment.
///
/// The usual capability implementation for an embedding transport that knows
/// the concrete local (and optionally remote) socket address of the flow a
/// client cares about. A filter without a remote side never matches on the
/// remote predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketFilter {
    local: SocketAddr,
    remote: Option<SocketAddr>,
}

impl SocketFilter {
    pub fn new(local: SocketAddr) -> Self {
        Self { local, remote: None }
    }

    pub fn with_remote(mut self, remote: SocketAddr) -> Self {
        self.remote = Some(remote);
        self
    }

    fn endpoint_matches(endpoint: &SocketAddr, address: IpAddr, start: u16, end: u16) -> bool {
        endpoint.ip() == address && PortRange::new(start, end).contains(endpoint.port())
    }
}

impl QosFilter for SocketFilter {
    fn matches_local(&self, address: IpAddr, start_port: u16, end_port: u16) -> bool {
        Self::endpoint_matches(&self.local, address, start_port, end_port)
    }

    fn matches_remote(&self, address: IpAddr, start_port: u16, end_port: u16) -> bool {
        match &self.remote {
            Some(remote) => Self::endpoint_matches(remote, address, start_port, end_port),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{QosBandwidth, QosSpec, SessionId};

    fn eps_session(filters: Vec<SessionFilter>) -> QosSession {
        QosSession::new(
            SessionId(1),
            filters,
            QosSpec::Eps {
                qci: 5,
                uplink: QosBandwidth::new(100, 50),
                downlink: QosBandwidth::new(200, 100),
            },
        )
    }

    fn remote_filter(precedence: u32, address: &str, start: u16, end: u16) -> SessionFilter {
        SessionFilter::new(precedence).with_remote(address.parse().unwrap(), PortRange::new(start, end))
    }

    /// Matches everything on both predicates.
    struct MatchAll;
    impl QosFilter for MatchAll {
        fn matches_local(&self, _: IpAddr, _: u16, _: u16) -> bool {
            true
        }
        fn matches_remote(&self, _: IpAddr, _: u16, _: u16) -> bool {
            true
        }
    }

    #[test]
    fn no_filters_never_matches() {
        let session = eps_session(vec![]);
        assert!(best_matching_filter(&session, &MatchAll).is_none());
    }

    #[test]
    fn unconstrained_filter_never_matches() {
        // No addresses, no valid port ranges: tier 4 of the matching rule.
        let session = eps_session(vec![SessionFilter::new(1)]);
        assert!(best_matching_filter(&session, &MatchAll).is_none());
    }

    #[test]
    fn remote_only_filter_matches_remote_predicate() {
        let session = eps_session(vec![remote_filter(1, "10.0.0.1", 80, 80)]);
        let client = SocketFilter::new("192.168.1.2:5000".parse().unwrap())
            .with_remote("10.0.0.1:80".parse().unwrap());
        assert!(session_matches(&session, &client));

        // Same shape, wrong remote address.
        let other = SocketFilter::new("192.168.1.2:5000".parse().unwrap())
            .with_remote("10.0.0.2:80".parse().unwrap());
        assert!(!session_matches(&session, &other));

        // Client with no remote side cannot satisfy a remote-only filter.
        let local_only = SocketFilter::new("192.168.1.2:5000".parse().unwrap());
        assert!(!session_matches(&session, &local_only));
    }

    #[test]
    fn local_only_filter_matches_local_predicate() {
        let session = eps_session(vec![SessionFilter::new(1)
            .with_local("192.168.1.2".parse().unwrap(), PortRange::new(5000, 6000))]);
        let client = SocketFilter::new("192.168.1.2:5500".parse().unwrap());
        assert!(session_matches(&session, &client));

        let wrong_port = SocketFilter::new("192.168.1.2:7000".parse().unwrap());
        assert!(!session_matches(&session, &wrong_port));
    }

    #[test]
    fn both_sides_required_when_both_present() {
        let session = eps_session(vec![SessionFilter::new(1)
            .with_local("192.168.1.2".parse().unwrap(), PortRange::new(5000, 6000))
            .with_remote("10.0.0.1".parse().unwrap(), PortRange::new(80, 80))]);

        let both = SocketFilter::new("192.168.1.2:5500".parse().unwrap())
            .with_remote("10.0.0.1:80".parse().unwrap());
        assert!(session_matches(&session, &both));

        // Local matches but remote does not: the filter must not match.
        let remote_off = SocketFilter::new("192.168.1.2:5500".parse().unwrap())
            .with_remote("10.9.9.9:80".parse().unwrap());
        assert!(!session_matches(&session, &remote_off));
    }

    #[test]
    fn invalid_port_range_downgrades_the_tier() {
        // Remote side present but invalid range, valid local side: evaluated
        // as a local-only filter.
        let mut filter = SessionFilter::new(1)
            .with_local("192.168.1.2".parse().unwrap(), PortRange::new(5000, 6000));
        filter.remote_addresses.push("10.0.0.1".parse().unwrap());
        let session = eps_session(vec![filter]);

        let client = SocketFilter::new("192.168.1.2:5500".parse().unwrap());
        assert!(session_matches(&session, &client));
    }

    #[test]
    fn only_first_address_is_consulted() {
        let mut filter = remote_filter(1, "10.0.0.1", 80, 80);
        filter.remote_addresses.push("10.0.0.2".parse().unwrap());
        let session = eps_session(vec![filter]);

        // Client matching only the second address gets nothing.
        let client = SocketFilter::new("192.168.1.2:5000".parse().unwrap())
            .with_remote("10.0.0.2:80".parse().unwrap());
        assert!(!session_matches(&session, &client));
    }

    #[test]
    fn precedence_picks_the_lowest_value() {
        let session = eps_session(vec![
            remote_filter(5, "10.0.0.1", 80, 80),
            remote_filter(2, "10.0.0.1", 80, 80),
        ]);
        let client = SocketFilter::new("192.168.1.2:5000".parse().unwrap())
            .with_remote("10.0.0.1:80".parse().unwrap());

        let best = best_matching_filter(&session, &client).unwrap();
        assert_eq!(best.precedence, 2);
    }

    #[test]
    fn precedence_tie_keeps_the_first_found() {
        let first = remote_filter(3, "10.0.0.1", 80, 80);
        let second = remote_filter(3, "10.0.0.1", 80, 90);
        let session = eps_session(vec![first.clone(), second]);
        let client = SocketFilter::new("192.168.1.2:5000".parse().unwrap())
            .with_remote("10.0.0.1:80".parse().unwrap());

        assert_eq!(best_matching_filter(&session, &client), Some(&first));
    }

    #[test]
    fn matching_is_deterministic() {
        let session = eps_session(vec![remote_filter(1, "10.0.0.1", 80, 80)]);
        let client = SocketFilter::new("192.168.1.2:5000".parse().unwrap())
            .with_remote("10.0.0.1:80".parse().unwrap());

        let first = best_matching_filter(&session, &client);
        for _ in 0..10 {
            assert_eq!(best_matching_filter(&session, &client), first);
        }
    }
}
