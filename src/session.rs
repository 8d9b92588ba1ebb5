//! Explicit per-session state.
//!
//! One session covers one query from first fetch to the server's "no more
//! data" signal. All mutable loader state lives here, owned by one
//! controller instance, so independent sessions never share ambient
//! globals.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::Query;

/// Poll loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No fetch chain has run yet.
    Idle,
    /// Exactly one fetch chain is in flight.
    Polling,
    /// The chain ended (server signalled completion, or a forced stop).
    Stopped,
}

/// State for one query's lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub query: Query,
    /// How many results have been rendered; also the offset of the next
    /// fetch. Monotonically non-decreasing within a session.
    pub cursor: usize,
    pub state: PollState,
    /// Short-lived guard against re-entrant scroll-triggered batch loads.
    pub batch_loading: bool,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(query: Query) -> Self {
        Self {
            id: Uuid::new_v4(),
            query,
            cursor: 0,
            state: PollState::Idle,
            batch_loading: false,
            started_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResultDomain;

    #[test]
    fn test_new_session_starts_at_zero() {
        let session = Session::new(Query::from_parts("rust", None));
        assert_eq!(session.cursor, 0);
        assert_eq!(session.state, PollState::Idle);
        assert!(!session.batch_loading);
        assert_eq!(session.query.domain, ResultDomain::General);
    }

    #[test]
    fn test_sessions_are_independent() {
        let a = Session::new(Query::from_parts("rust", None));
        let b = Session::new(Query::from_parts("rust", None));
        assert_ne!(a.id, b.id);
    }
}
