//! Session orchestration: roster mutations, turn flow, win detection, and
//! lifecycle transitions, persisted through a [`RosterStore`].
//!
//! Every mutation is staged on a copy of the roster, persisted, and only then
//! committed, so a failed call leaves the session exactly as it was.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::ContentCatalog;
use crate::config::SessionConfig;
use crate::constants::{DEFAULT_SEED, MIN_PLAYERS};
use crate::error::{SessionError, SessionResult};
use crate::ledger::{self, DeltaSet, REDISTRIBUTION_KIND};
use crate::player::{Player, PlayerId, ProgressKind};
use crate::registry::PlayerRegistry;
use crate::store::{RosterOp, RosterStore};
use crate::turn::{TurnOutcome, TurnStrategy};
use crate::win::{SessionPhase, WinDetector};

pub mod handle;
pub use handle::SessionHandle;

/// Opaque identity of the signed-in user owning the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

/// Result of a point mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub player: Player,
    /// Set only on the mutation that completed the session.
    pub winner: Option<PlayerId>,
    pub phase: SessionPhase,
}

/// Result of removing a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    pub removed: Player,
    pub deltas: DeltaSet,
    /// Points lost to integer division (or all of them when nobody remains).
    pub discarded: u64,
    pub winner: Option<PlayerId>,
}

/// Read-only view handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub players: Vec<Player>,
    pub phase: SessionPhase,
    pub config: Option<SessionConfig>,
    pub round: u32,
    pub active_turn: Option<TurnOutcome>,
}

/// One play-through: roster, configuration, turn state, and win state.
#[derive(Debug)]
pub struct PartySession<S> {
    store: S,
    owner: Option<OwnerId>,
    registry: PlayerRegistry,
    detector: WinDetector,
    config: Option<SessionConfig>,
    strategy: Option<TurnStrategy>,
    catalog: ContentCatalog,
    rng: ChaCha20Rng,
    seed: u64,
    active_turn: Option<TurnOutcome>,
    round: u32,
}

impl<S: RosterStore> PartySession<S> {
    /// Fresh session with an empty roster and no game selected.
    #[must_use]
    pub fn new(store: S, seed: u64) -> Self {
        Self {
            store,
            owner: None,
            registry: PlayerRegistry::new(),
            detector: WinDetector::new(),
            config: None,
            strategy: None,
            catalog: crate::catalog::catalog().clone(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            active_turn: None,
            round: 0,
        }
    }

    /// Session seeded with [`DEFAULT_SEED`].
    #[must_use]
    pub fn with_default_seed(store: S) -> Self {
        Self::new(store, DEFAULT_SEED)
    }

    /// Build a session around the roster already held by `store`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the roster cannot be fetched.
    pub async fn load(store: S, seed: u64) -> SessionResult<Self> {
        let mut session = Self::new(store, seed);
        session.refresh().await?;
        Ok(session)
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: ContentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Replace the local roster with the store's records.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the roster cannot be fetched.
    pub async fn refresh(&mut self) -> SessionResult<()> {
        let players = self.store.list().await.inspect_err(log_store_failure)?;
        self.registry = PlayerRegistry::from_players(players);
        if let Some(turn) = &self.active_turn
            && !self.registry.contains(turn.actor.id)
        {
            self.active_turn = None;
        }
        Ok(())
    }

    // Roster -----------------------------------------------------------------

    /// Add a player to the roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] for a blank name, or
    /// [`SessionError::Store`] if the record cannot be persisted.
    pub async fn add_player(&mut self, name: &str) -> SessionResult<Player> {
        let mut staged = self.registry.clone();
        let player = staged.add_player(name)?;
        self.store
            .create(&player)
            .await
            .inspect_err(log_store_failure)?;
        self.registry = staged;
        log::info!("added {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Re-send a known player record; a no-op when it is already on the roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] for a blank name, or
    /// [`SessionError::Store`] if the record cannot be persisted.
    pub async fn restore_player(&mut self, player: Player) -> SessionResult<Player> {
        if let Some(existing) = self.registry.get(player.id) {
            return Ok(existing.clone());
        }
        if player.name.trim().is_empty() {
            return Err(SessionError::validation("player name must not be empty"));
        }
        self.store
            .create(&player)
            .await
            .inspect_err(log_store_failure)?;
        self.registry.insert(player.clone());
        Ok(player)
    }

    /// Remove a player, first handing their points to everyone else.
    ///
    /// The share is computed from one roster read and persisted as a single
    /// batch; either every delta and the deletion land or none do. When a
    /// non-atomic store fails partway, the shares already written are put
    /// back before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] for an unknown id, or
    /// [`SessionError::Store`] if the batch cannot be persisted.
    pub async fn remove_player(&mut self, id: PlayerId) -> SessionResult<Removal> {
        let mut staged = self.registry.clone();
        let mut detector = self.detector.clone();
        let removed = staged.remove_player(id)?;

        let deltas = ledger::redistribute(&removed, staged.list_players());
        let mut winner = None;
        for delta in &deltas {
            ledger::apply_points(
                &mut staged,
                delta.player_id,
                ledger::signed_delta(delta)?,
                REDISTRIBUTION_KIND,
            )?;
            winner = winner.or(self.evaluate(&mut detector, &staged));
        }

        // Delete goes last so a sequential batch never drops the record
        // before every share has landed.
        let mut ops: Vec<RosterOp> = deltas
            .iter()
            .filter_map(|delta| {
                staged.get(delta.player_id).map(|player| RosterOp::Update {
                    id: player.id,
                    patch: player.progress_patch(),
                })
            })
            .collect();
        ops.push(RosterOp::Delete { id });
        if let Err(err) = self.store.apply_batch(&ops).await {
            log_store_failure(&err);
            let touched: Vec<PlayerId> = deltas.iter().map(|d| d.player_id).collect();
            self.roll_back(&touched).await;
            return Err(err.into());
        }

        let discarded = ledger::redistribution_remainder(&removed, staged.len());
        self.registry = staged;
        self.detector = detector;
        if self
            .active_turn
            .as_ref()
            .is_some_and(|turn| turn.actor.id == id)
        {
            self.active_turn = None;
        }
        log::info!(
            "removed {} ({}); redistributed {} delta(s), discarded {discarded} point(s)",
            removed.name,
            removed.id,
            deltas.len()
        );
        Ok(Removal {
            removed,
            deltas,
            discarded,
            winner,
        })
    }

    // Scoring ----------------------------------------------------------------

    /// Award points to a player and run win detection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionCompleted`] once a winner exists,
    /// [`SessionError::Validation`] for a negative delta,
    /// [`SessionError::NotFound`] for an unknown id, or
    /// [`SessionError::Store`] if the update cannot be persisted.
    pub async fn apply_points(
        &mut self,
        id: PlayerId,
        delta: i64,
        kind: ProgressKind,
    ) -> SessionResult<ScoreUpdate> {
        self.ensure_playing()?;
        let mut staged = self.registry.clone();
        let mut detector = self.detector.clone();
        let player = ledger::apply_points(&mut staged, id, delta, kind)?;
        let winner = self.evaluate(&mut detector, &staged);

        self.store
            .update(id, player.progress_patch())
            .await
            .inspect_err(log_store_failure)?;

        self.registry = staged;
        self.detector = detector;
        Ok(ScoreUpdate {
            player,
            winner,
            phase: self.detector.phase(),
        })
    }

    // Turns ------------------------------------------------------------------

    /// Select the actor and magnitude for the next turn.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoConfig`] before a game is selected,
    /// [`SessionError::SessionCompleted`] after a win,
    /// [`SessionError::TurnInProgress`] while a turn is unresolved, or
    /// [`SessionError::NotEnoughPlayers`] with fewer than two players.
    pub fn next_turn(&mut self) -> SessionResult<TurnOutcome> {
        let config = self.config.ok_or(SessionError::NoConfig)?;
        self.ensure_playing()?;
        if let Some(turn) = &self.active_turn {
            return Err(SessionError::TurnInProgress {
                actor: turn.actor.id,
            });
        }
        self.registry.require_players(MIN_PLAYERS)?;
        let strategy = self
            .strategy
            .get_or_insert_with(|| TurnStrategy::for_mode(config.mode));
        let outcome = strategy.select_turn(
            &config,
            self.registry.list_players(),
            &self.catalog,
            &mut self.rng,
        )?;
        self.active_turn = Some(outcome.clone());
        Ok(outcome)
    }

    /// Credit the in-flight turn's magnitude to its actor.
    ///
    /// On failure the turn stays in flight so the UI can retry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveTurn`] without a selected turn,
    /// [`SessionError::NotEnoughPlayers`] if the roster shrank below two, or
    /// any error from [`PartySession::apply_points`].
    pub async fn resolve_turn(&mut self, kind: ProgressKind) -> SessionResult<ScoreUpdate> {
        let turn = self.active_turn.clone().ok_or(SessionError::NoActiveTurn)?;
        self.registry.require_players(MIN_PLAYERS)?;
        let update = self
            .apply_points(turn.actor.id, i64::from(turn.magnitude), kind)
            .await?;
        self.active_turn = None;
        Ok(update)
    }

    /// Drop the in-flight turn without scoring it.
    pub fn discard_turn(&mut self) -> Option<TurnOutcome> {
        self.active_turn.take()
    }

    // Lifecycle --------------------------------------------------------------

    /// Install a configuration and begin a new round, keeping the roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionCompleted`] after a win (use
    /// [`PartySession::reset`] or [`PartySession::restart_same_game`]), or
    /// [`SessionError::Validation`] for an invalid configuration or one whose
    /// threshold a player already meets.
    pub fn start_new_round(&mut self, config: SessionConfig) -> SessionResult<()> {
        self.ensure_playing()?;
        config.validate()?;
        if let Some(leader) = self
            .registry
            .list_players()
            .iter()
            .find(|player| player.points >= config.win_threshold)
        {
            return Err(SessionError::validation(format!(
                "{} already holds {} point(s), at or above the threshold of {}",
                leader.name, leader.points, config.win_threshold
            )));
        }
        let same_mode = self.config.is_some_and(|current| current.mode == config.mode);
        if !same_mode {
            self.strategy = Some(TurnStrategy::for_mode(config.mode));
        }
        self.config = Some(config);
        self.active_turn = None;
        self.detector.reset();
        self.round = self.round.saturating_add(1);
        log::info!("round {} started ({})", self.round, config.mode);
        Ok(())
    }

    /// Zero every player's counters and play again with the same roster.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the cleared counters cannot be persisted.
    pub async fn restart_same_game(&mut self) -> SessionResult<()> {
        let mut staged = self.registry.clone();
        staged.clear_progress();
        let ops: Vec<RosterOp> = staged
            .list_players()
            .iter()
            .map(|player| RosterOp::Update {
                id: player.id,
                patch: player.progress_patch(),
            })
            .collect();
        if !ops.is_empty()
            && let Err(err) = self.store.apply_batch(&ops).await
        {
            log_store_failure(&err);
            let touched: Vec<PlayerId> = staged.list_players().iter().map(|p| p.id).collect();
            self.roll_back(&touched).await;
            return Err(err.into());
        }
        self.registry = staged;
        self.active_turn = None;
        self.strategy = self.config.map(|config| TurnStrategy::for_mode(config.mode));
        self.detector.reset();
        self.round = 0;
        log::info!("restarted with {} player(s)", self.registry.len());
        Ok(())
    }

    /// Tear the session down: roster, configuration, and any in-flight turn.
    ///
    /// The in-flight turn is discarded even if the store call fails.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the stored roster cannot be deleted;
    /// the local roster is kept so the call can be retried.
    pub async fn exit_to_game_selection(&mut self) -> SessionResult<()> {
        self.active_turn = None;
        self.store
            .delete_all()
            .await
            .inspect_err(log_store_failure)?;
        self.registry.reset_all();
        self.config = None;
        self.strategy = None;
        self.detector.reset();
        self.round = 0;
        log::info!("exited to game selection");
        Ok(())
    }

    /// Return to `Playing` with a cleared roster, keeping the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the stored roster cannot be deleted.
    pub async fn reset(&mut self) -> SessionResult<()> {
        self.store
            .delete_all()
            .await
            .inspect_err(log_store_failure)?;
        self.registry.reset_all();
        self.active_turn = None;
        self.strategy = self.config.map(|config| TurnStrategy::for_mode(config.mode));
        self.detector.reset();
        self.round = 0;
        log::info!("session reset");
        Ok(())
    }

    /// Deterministically reseed turn selection.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = ChaCha20Rng::seed_from_u64(seed);
    }

    // Accessors --------------------------------------------------------------

    #[must_use]
    pub fn players(&self) -> &[Player] {
        self.registry.list_players()
    }

    #[must_use]
    pub const fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.detector.phase()
    }

    #[must_use]
    pub const fn detector(&self) -> &WinDetector {
        &self.detector
    }

    #[must_use]
    pub const fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    #[must_use]
    pub const fn active_turn(&self) -> Option<&TurnOutcome> {
        self.active_turn.as_ref()
    }

    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn owner(&self) -> Option<&OwnerId> {
        self.owner.as_ref()
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            players: self.registry.list_players().to_vec(),
            phase: self.detector.phase(),
            config: self.config,
            round: self.round,
            active_turn: self.active_turn.clone(),
        }
    }

    /// Best-effort restore of the stored records for `ids` after a failed
    /// batch, for stores whose batches are not atomic.
    async fn roll_back(&self, ids: &[PlayerId]) {
        let ops: Vec<RosterOp> = ids
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .map(|player| RosterOp::Update {
                id: player.id,
                patch: player.progress_patch(),
            })
            .collect();
        if ops.is_empty() {
            return;
        }
        if let Err(err) = self.store.apply_batch(&ops).await {
            log::warn!("roll back of {} record(s) failed: {err}", ops.len());
        }
    }

    fn ensure_playing(&self) -> SessionResult<()> {
        match self.detector.winner() {
            Some(winner) => Err(SessionError::SessionCompleted { winner }),
            None => Ok(()),
        }
    }

    /// Win check run after every point mutation; skipped before a game is
    /// selected since there is no threshold yet.
    fn evaluate(&self, detector: &mut WinDetector, roster: &PlayerRegistry) -> Option<PlayerId> {
        let config = self.config.as_ref()?;
        detector.evaluate(roster.list_players(), config.win_threshold)
    }
}

fn log_store_failure(err: &crate::error::StoreError) {
    log::warn!("{err}");
}
