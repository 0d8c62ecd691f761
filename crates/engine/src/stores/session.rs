//! Concurrent session registry.
//!
//! Maps an opaque session id to its mutable progress state. Each entry
//! carries its own mutex so a read-modify-write on one session never
//! contends with unrelated sessions, while two racing calls on the same
//! session serialize and neither update is lost.
//!
//! Entries are never evicted; whether that is a short-lived-deployment
//! assumption or a leak is a deployment concern, so the registry exposes
//! `len`/`session_ids` for operators to watch growth.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use ethos_domain::{SessionId, SessionState};

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a brand-new session, replacing any existing entry under the
    /// same id. Last writer wins: restarting a scenario under a reused
    /// session id resets progress.
    pub fn create(&self, state: SessionState) {
        let session_id = state.session_id.clone();
        if self
            .sessions
            .insert(session_id.clone(), Arc::new(Mutex::new(state)))
            .is_some()
        {
            tracing::info!(%session_id, "existing session replaced");
        } else {
            tracing::debug!(%session_id, "session created");
        }
    }

    /// Snapshot of a session's current state.
    pub async fn get(&self, session_id: &SessionId) -> Option<SessionState> {
        let entry = self.sessions.get(session_id)?.clone();
        let state = entry.lock().await;
        Some(state.clone())
    }

    /// Apply an atomic read-modify-write to a session. The per-session
    /// lock is held across the whole closure, so concurrent calls for the
    /// same id serialize. Returns `None` when the session is unknown.
    pub async fn mutate<F, T>(&self, session_id: &SessionId, f: F) -> Option<T>
    where
        F: FnOnce(&mut SessionState) -> T,
    {
        let entry = self.sessions.get(session_id)?.clone();
        let mut state = entry.lock().await;
        Some(f(&mut state))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ethos_domain::{ScenarioId, UserId};

    fn state(session: &str) -> SessionState {
        SessionState::new(
            SessionId::new(session),
            UserId::new("user-1"),
            ScenarioId::new("sc001"),
            "stmt_1",
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn create_overwrites_existing_entry() {
        let store = SessionStore::new();
        let mut first = state("sess-1");
        first.record_choice("a", 1, "Evidence", "stmt_2", Utc::now());
        store.create(first);
        store.create(state("sess-1"));

        let snapshot = store.get(&SessionId::new("sess-1")).await.expect("present");
        assert_eq!(snapshot.step, 1);
        assert!(snapshot.choice_history.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.get(&SessionId::new("nope")).await.is_none());
        assert!(store.mutate(&SessionId::new("nope"), |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn same_session_mutations_are_serialized() {
        crate::test_fixtures::init_tracing();
        let store = Arc::new(SessionStore::new());
        store.create(state("sess-1"));
        let id = SessionId::new("sess-1");

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let store = store.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    store
                        .mutate(&id, |s| {
                            s.record_choice(format!("c{i}"), 1, "Evidence", "stmt_2", Utc::now())
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.expect("join").is_some());
        }

        // No lost updates: exactly one append per accepted call.
        let snapshot = store.get(&id).await.expect("present");
        assert_eq!(snapshot.choice_history.len(), 64);
        assert_eq!(snapshot.score_history.len(), 64);
        assert_eq!(snapshot.tactic_history.len(), 64);
        assert_eq!(snapshot.step, 65);
    }

    #[tokio::test]
    async fn distinct_sessions_do_not_interfere() {
        let store = Arc::new(SessionStore::new());
        for i in 0..8 {
            store.create(state(&format!("sess-{i}")));
        }

        let mut tasks = Vec::new();
        for i in 0..8 {
            for _ in 0..16 {
                let store = store.clone();
                let id = SessionId::new(format!("sess-{i}"));
                tasks.push(tokio::spawn(async move {
                    store
                        .mutate(&id, |s| {
                            s.record_choice("c", 0, "Questioning", "stmt_2", Utc::now())
                        })
                        .await
                }));
            }
        }
        for task in tasks {
            assert!(task.await.expect("join").is_some());
        }

        for i in 0..8 {
            let snapshot = store
                .get(&SessionId::new(format!("sess-{i}")))
                .await
                .expect("present");
            assert_eq!(snapshot.choice_history.len(), 16);
        }
    }
}
