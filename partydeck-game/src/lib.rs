//! PartyDeck Session Engine
//!
//! Platform-agnostic core logic for PartyDeck party games: the player roster,
//! score accounting, per-mode turn selection, win detection, and session
//! lifecycle. Rendering and remote storage live outside this crate; storage is
//! reached through the [`RosterStore`] trait.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod deck;
pub mod error;
pub mod ledger;
pub mod numbers;
pub mod player;
pub mod registry;
pub mod session;
pub mod store;
pub mod turn;
pub mod win;

// Re-export commonly used types
pub use catalog::{CardRule, CatalogError, ContentCatalog, Prompt, PromptKind};
pub use config::{GameMode, SessionConfig, SessionConfigError, UnitsRange};
pub use constants::{DEFAULT_WIN_THRESHOLD, MIN_PLAYERS};
pub use deck::{Card, CardDeck, Rank, Suit};
pub use error::{SessionError, SessionResult, StoreError};
pub use ledger::{DeltaSet, PointDelta, apply_points, redistribute};
pub use player::{Player, PlayerId, PlayerPatch, ProgressKind};
pub use registry::PlayerRegistry;
pub use session::{
    OwnerId, PartySession, Removal, ScoreUpdate, SessionHandle, SessionSnapshot,
};
pub use store::{MemoryRosterStore, RosterOp, RosterStore};
pub use turn::{TurnOutcome, TurnStrategy, wheel_segment};
pub use win::{SessionPhase, WinDetector};

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait ContentLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the content catalog from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<ContentCatalog, Self::Error>;

    /// Load the session configuration for a game mode
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config(&self, mode: GameMode) -> Result<SessionConfig, Self::Error>;
}

/// Loader serving the bundled catalog and per-mode default configs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledContent;

impl ContentLoader for BundledContent {
    type Error = std::convert::Infallible;

    fn load_catalog(&self) -> Result<ContentCatalog, Self::Error> {
        Ok(catalog::catalog().clone())
    }

    fn load_config(&self, mode: GameMode) -> Result<SessionConfig, Self::Error> {
        Ok(SessionConfig::for_mode(mode))
    }
}

/// Entry point for creating sessions with loaded content
pub struct PartyEngine<L>
where
    L: ContentLoader,
{
    content_loader: L,
}

impl<L> PartyEngine<L>
where
    L: ContentLoader,
{
    /// Create a new engine with the provided content loader
    pub const fn new(content_loader: L) -> Self {
        Self { content_loader }
    }

    /// Create a fresh session for `mode` backed by `store`
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be loaded or the loaded config is invalid.
    pub fn create_session<S: RosterStore>(
        &self,
        store: S,
        seed: u64,
        mode: GameMode,
    ) -> Result<PartySession<S>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.content_loader.load_catalog().map_err(Into::into)?;
        let config = self.content_loader.load_config(mode).map_err(Into::into)?;
        let mut session = PartySession::new(store, seed).with_catalog(catalog);
        session.start_new_round(config)?;
        Ok(session)
    }

    /// Resume a session around the roster already held by `store`
    ///
    /// # Errors
    ///
    /// Returns an error if content or the stored roster cannot be loaded.
    pub async fn open_session<S: RosterStore>(
        &self,
        store: S,
        seed: u64,
        mode: GameMode,
    ) -> Result<PartySession<S>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.content_loader.load_catalog().map_err(Into::into)?;
        let config = self.content_loader.load_config(mode).map_err(Into::into)?;
        let mut session = PartySession::load(store, seed).await?.with_catalog(catalog);
        session.start_new_round(config)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct MissingAsset;

    impl fmt::Display for MissingAsset {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("asset missing")
        }
    }

    impl std::error::Error for MissingAsset {}

    struct FixtureLoader {
        threshold: u64,
    }

    impl ContentLoader for FixtureLoader {
        type Error = MissingAsset;

        fn load_catalog(&self) -> Result<ContentCatalog, Self::Error> {
            Ok(ContentCatalog::empty())
        }

        fn load_config(&self, mode: GameMode) -> Result<SessionConfig, Self::Error> {
            if mode == GameMode::GuessWho {
                return Err(MissingAsset);
            }
            Ok(SessionConfig::for_mode(mode).with_win_threshold(self.threshold))
        }
    }

    #[test]
    fn engine_creates_configured_session() {
        let engine = PartyEngine::new(BundledContent);
        let session = engine
            .create_session(MemoryRosterStore::new(), 0xABCD, GameMode::Wheel)
            .unwrap();
        assert_eq!(session.config().map(|c| c.mode), Some(GameMode::Wheel));
        assert_eq!(session.round(), 1);
        assert_eq!(session.seed(), 0xABCD);
    }

    #[test]
    fn loader_errors_and_invalid_configs_surface() {
        let engine = PartyEngine::new(FixtureLoader { threshold: 0 });
        assert!(
            engine
                .create_session(MemoryRosterStore::new(), 1, GameMode::Wheel)
                .is_err()
        );
        let err = engine
            .create_session(MemoryRosterStore::new(), 1, GameMode::GuessWho)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "asset missing");
    }

    #[tokio::test]
    async fn open_session_resumes_stored_roster() {
        let store = MemoryRosterStore::with_players(vec![
            Player::new(PlayerId(4), "Ana"),
            Player::new(PlayerId(9), "Bo"),
        ]);
        let engine = PartyEngine::new(FixtureLoader { threshold: 15 });
        let mut session = engine
            .open_session(store, 2, GameMode::TruthOrDare)
            .await
            .unwrap();
        assert_eq!(session.players().len(), 2);
        assert_eq!(session.config().map(|c| c.win_threshold), Some(15));
        let added = session.add_player("Cy").await.unwrap();
        assert_eq!(added.id, PlayerId(10));
    }
}
