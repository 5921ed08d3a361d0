//! Error taxonomy shared by every session component.
use thiserror::Error;

use crate::config::SessionConfigError;
use crate::player::PlayerId;

/// Failure reported by a roster store implementation.
#[derive(Debug, Error)]
#[error("roster store {operation} failed: {source}")]
pub struct StoreError {
    pub operation: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl StoreError {
    pub fn new(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// Errors raised by session operations.
///
/// Every variant except [`SessionError::Store`] is raised before any state is
/// touched, so callers can surface a message and carry on.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("player {0} is not on the roster")]
    NotFound(PlayerId),
    #[error("no eligible players to pick from")]
    EmptyRoster,
    #[error("at least {required} players are needed (have {present})")]
    NotEnoughPlayers { required: usize, present: usize },
    #[error("session already completed; winner is {winner}")]
    SessionCompleted { winner: PlayerId },
    #[error("no turn is in progress")]
    NoActiveTurn,
    #[error("a turn for {actor} is already in progress")]
    TurnInProgress { actor: PlayerId },
    #[error("no game configuration selected")]
    NoConfig,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the UI can report the error and continue with unchanged state.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

impl From<SessionConfigError> for SessionError {
    fn from(err: SessionConfigError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
