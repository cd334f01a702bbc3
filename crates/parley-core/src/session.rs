//! Single-session bookkeeping: one live token per username.

use dashmap::DashMap;

/// Outcome of [`SessionRegistry::revoke_others`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The caller holds the live token, so no other session exists.
    CallerIsLive,
    /// A newer token is live. It is left in place and the caller's token
    /// will fail verification as superseded.
    CallerSuperseded,
    /// No session is recorded for the user.
    NoSession,
}

/// Per-user live-token pointer.
///
/// Each replace or compare is atomic for its username. A login racing with
/// another shows up as `Superseded` on the loser's next verify rather than
/// as a lost update. Entries are never swept by time; expiry is a property
/// of the token and is checked at verify time.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    live: DashMap<String, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `token` as the user's only live session and return the token
    /// it replaced.
    pub fn set_live(&self, username: &str, token: &str) -> Option<String> {
        let previous = self.live.insert(username.to_string(), token.to_string());
        if previous.is_some() {
            tracing::debug!("Session replaced for user: {username}");
        } else {
            tracing::debug!("Session created for user: {username}");
        }
        previous
    }

    pub fn live_token(&self, username: &str) -> Option<String> {
        self.live.get(username).map(|entry| entry.value().clone())
    }

    pub fn is_live(&self, username: &str, token: &str) -> bool {
        self.live
            .get(username)
            .is_some_and(|entry| entry.value() == token)
    }

    /// Invalidate every session for `username` other than the one holding
    /// `caller_token`.
    ///
    /// Only one pointer is tracked per user, so there is never a third token
    /// to drop: either the caller is live, or a newer login owns the pointer
    /// and must keep it.
    pub fn revoke_others(&self, username: &str, caller_token: &str) -> RevokeOutcome {
        let outcome = match self.live.get(username) {
            None => RevokeOutcome::NoSession,
            Some(entry) if entry.value() == caller_token => RevokeOutcome::CallerIsLive,
            Some(_) => RevokeOutcome::CallerSuperseded,
        };
        tracing::debug!("Revoke others for user {username}: {outcome:?}");
        outcome
    }

    /// Number of users with a recorded session.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_live_installs_token() {
        let sessions = SessionRegistry::new();
        assert_eq!(sessions.set_live("alice", "t1"), None);

        assert!(sessions.is_live("alice", "t1"));
        assert_eq!(sessions.live_token("alice").as_deref(), Some("t1"));
    }

    #[test]
    fn set_live_replaces_previous_token() {
        let sessions = SessionRegistry::new();
        sessions.set_live("alice", "t1");

        let previous = sessions.set_live("alice", "t2");

        assert_eq!(previous.as_deref(), Some("t1"));
        assert!(!sessions.is_live("alice", "t1"));
        assert!(sessions.is_live("alice", "t2"));
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn at_most_one_live_token_after_many_logins() {
        let sessions = SessionRegistry::new();
        let tokens: Vec<String> = (0..20).map(|i| format!("t{i}")).collect();
        for token in &tokens {
            sessions.set_live("alice", token);
        }

        let live: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|t| sessions.is_live("alice", t))
            .collect();
        assert_eq!(live, vec!["t19"]);
    }

    #[test]
    fn sessions_are_per_user() {
        let sessions = SessionRegistry::new();
        sessions.set_live("alice", "a1");
        sessions.set_live("bob", "b1");

        assert!(sessions.is_live("alice", "a1"));
        assert!(sessions.is_live("bob", "b1"));
        assert!(!sessions.is_live("alice", "b1"));
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn revoke_others_with_live_caller_keeps_session() {
        let sessions = SessionRegistry::new();
        sessions.set_live("alice", "t1");

        assert_eq!(sessions.revoke_others("alice", "t1"), RevokeOutcome::CallerIsLive);
        assert!(sessions.is_live("alice", "t1"));
    }

    #[test]
    fn revoke_others_with_stale_caller_keeps_newer_session() {
        let sessions = SessionRegistry::new();
        sessions.set_live("alice", "t1");
        sessions.set_live("alice", "t2");

        assert_eq!(
            sessions.revoke_others("alice", "t1"),
            RevokeOutcome::CallerSuperseded
        );
        assert!(sessions.is_live("alice", "t2"));
    }

    #[test]
    fn revoke_others_without_session() {
        let sessions = SessionRegistry::new();
        assert_eq!(sessions.revoke_others("ghost", "t"), RevokeOutcome::NoSession);
        assert!(sessions.is_empty());
    }

    #[test]
    fn concurrent_logins_leave_exactly_one_live_token() {
        let sessions = std::sync::Arc::new(SessionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sessions = sessions.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        sessions.set_live("alice", &format!("t{i}-{j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let live = sessions.live_token("alice").unwrap();
        assert!(sessions.is_live("alice", &live));
        assert_eq!(sessions.len(), 1);
    }
}
