use anyhow::{Context, Result};
use partydeck_game::{
    BundledContent, GameMode, MIN_PLAYERS, MemoryRosterStore, PartyEngine, Player, PlayerId,
    ProgressKind,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Mixed into the session seed so the tester's own choices do not mirror
/// the engine's turn selection.
const TESTER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// One simulated session: which mode, who plays, and when someone leaves.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: GameMode,
    pub players: Vec<String>,
    pub win_threshold: Option<u64>,
    pub max_turns: u32,
    pub removal_turn: Option<u32>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(mode: GameMode, players: Vec<String>) -> Self {
        Self {
            mode,
            players,
            win_threshold: None,
            max_turns: 500,
            removal_turn: Some(3),
        }
    }

    #[must_use]
    pub const fn with_win_threshold(mut self, threshold: Option<u64>) -> Self {
        self.win_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub const fn with_removal_turn(mut self, turn: Option<u32>) -> Self {
        self.removal_turn = turn;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub actor: PlayerId,
    pub magnitude: u32,
    pub kind: ProgressKind,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalRecord {
    pub turn: u32,
    pub removed: Player,
    pub shared: u64,
    pub discarded: u64,
    pub winner: Option<PlayerId>,
}

/// Everything the invariant checks need to judge one session.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub mode: GameMode,
    pub seed: u64,
    pub threshold: u64,
    pub turns: Vec<TurnRecord>,
    pub removal: Option<RemovalRecord>,
    pub completions: u32,
    pub winner: Option<PlayerId>,
    pub awarded: u64,
    pub final_players: Vec<Player>,
    pub stored_players: Vec<Player>,
}

impl SimulationSummary {
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.final_players.iter().map(|p| p.points).sum()
    }

    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.removal.as_ref().map_or(0, |r| r.discarded)
    }

    #[must_use]
    pub fn winner_points(&self) -> Option<u64> {
        let winner = self.winner?;
        self.final_players
            .iter()
            .find(|p| p.id == winner)
            .map(|p| p.points)
    }
}

/// Play `plan` to completion (or `max_turns`) against an in-memory store.
///
/// # Errors
///
/// Returns an error if the engine rejects any step of the scripted session.
pub async fn run_plan(plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
    let engine = PartyEngine::new(BundledContent);
    let store = MemoryRosterStore::new();
    let mut session = engine
        .create_session(store, seed, plan.mode)
        .context("creating session")?;
    if let Some(threshold) = plan.win_threshold {
        let config = session
            .config()
            .copied()
            .context("session has no config")?
            .with_win_threshold(threshold);
        session.start_new_round(config)?;
    }
    let threshold = session
        .config()
        .map(|c| c.win_threshold)
        .context("session has no config")?;

    for name in &plan.players {
        session
            .add_player(name)
            .await
            .with_context(|| format!("adding player {name}"))?;
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed ^ TESTER_SEED_SALT);
    let mut turns = Vec::new();
    let mut removal = None;
    let mut completions = 0;
    let mut awarded = 0_u64;

    for turn in 1..=plan.max_turns {
        if session.phase().is_completed() {
            break;
        }

        if plan.removal_turn == Some(turn) && session.players().len() > MIN_PLAYERS {
            let idx = rng.gen_range(0..session.players().len());
            let id = session.players()[idx].id;
            let outcome = session
                .remove_player(id)
                .await
                .with_context(|| format!("removing {id} on turn {turn}"))?;
            if outcome.winner.is_some() {
                completions += 1;
            }
            log::debug!(
                "turn {turn}: {} left, {} shared",
                outcome.removed.name,
                outcome.deltas.iter().map(|d| d.delta).sum::<u64>()
            );
            removal = Some(RemovalRecord {
                turn,
                shared: outcome.deltas.iter().map(|d| d.delta).sum(),
                discarded: outcome.discarded,
                winner: outcome.winner,
                removed: outcome.removed,
            });
            if session.phase().is_completed() {
                break;
            }
        }

        let selected = session
            .next_turn()
            .with_context(|| format!("selecting turn {turn}"))?;
        let kind = if rng.gen_bool(0.5) {
            ProgressKind::Drink
        } else {
            ProgressKind::Challenge
        };
        let update = session
            .resolve_turn(kind)
            .await
            .with_context(|| format!("resolving turn {turn}"))?;
        awarded += u64::from(selected.magnitude);
        if update.winner.is_some() {
            completions += 1;
        }
        turns.push(TurnRecord {
            turn,
            actor: selected.actor.id,
            magnitude: selected.magnitude,
            kind,
            winner: update.winner,
        });
    }

    Ok(SimulationSummary {
        mode: plan.mode,
        seed,
        threshold,
        turns,
        removal,
        completions,
        winner: session.phase().winner(),
        awarded,
        final_players: session.players().to_vec(),
        stored_players: session.store().snapshot(),
    })
}
