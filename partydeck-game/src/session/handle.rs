use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::{PartySession, Removal, ScoreUpdate, SessionSnapshot};
use crate::error::SessionResult;
use crate::player::{Player, PlayerId, ProgressKind};
use crate::store::RosterStore;
use crate::turn::TurnOutcome;

/// Shared, serialized access to one session.
///
/// Each call holds the session lock for its whole duration, including the
/// store round-trip, so overlapping UI events cannot interleave roster reads
/// and writes.
#[derive(Debug)]
pub struct SessionHandle<S> {
    inner: Arc<Mutex<PartySession<S>>>,
}

impl<S> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RosterStore> SessionHandle<S> {
    #[must_use]
    pub fn new(session: PartySession<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for multi-step sequences.
    pub async fn lock(&self) -> MutexGuard<'_, PartySession<S>> {
        self.inner.lock().await
    }

    /// # Errors
    ///
    /// See [`PartySession::add_player`].
    pub async fn add_player(&self, name: &str) -> SessionResult<Player> {
        self.inner.lock().await.add_player(name).await
    }

    /// # Errors
    ///
    /// See [`PartySession::remove_player`].
    pub async fn remove_player(&self, id: PlayerId) -> SessionResult<Removal> {
        self.inner.lock().await.remove_player(id).await
    }

    /// # Errors
    ///
    /// See [`PartySession::apply_points`].
    pub async fn apply_points(
        &self,
        id: PlayerId,
        delta: i64,
        kind: ProgressKind,
    ) -> SessionResult<ScoreUpdate> {
        self.inner.lock().await.apply_points(id, delta, kind).await
    }

    /// # Errors
    ///
    /// See [`PartySession::next_turn`].
    pub async fn next_turn(&self) -> SessionResult<TurnOutcome> {
        self.inner.lock().await.next_turn()
    }

    /// # Errors
    ///
    /// See [`PartySession::resolve_turn`].
    pub async fn resolve_turn(&self, kind: ProgressKind) -> SessionResult<ScoreUpdate> {
        self.inner.lock().await.resolve_turn(kind).await
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }
}
