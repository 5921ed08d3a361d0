//! Win detection state machine.
use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Playing,
    Completed { winner: PlayerId },
}

impl SessionPhase {
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    #[must_use]
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Self::Playing => None,
            Self::Completed { winner } => Some(winner),
        }
    }
}

/// Watches the roster after each point mutation and records the first winner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinDetector {
    phase: SessionPhase,
    evaluations: u64,
}

impl WinDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        self.phase.winner()
    }

    /// Number of evaluations run since the last reset.
    #[must_use]
    pub const fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Scan the roster in order; the first player at or above `threshold` wins.
    ///
    /// Returns the winner only on the transition into `Completed`; once
    /// completed, later evaluations are counted but never change the winner.
    pub fn evaluate(&mut self, roster: &[Player], threshold: u64) -> Option<PlayerId> {
        self.evaluations = self.evaluations.saturating_add(1);
        if self.phase.is_completed() {
            return None;
        }
        let winner = roster
            .iter()
            .find(|player| player.points >= threshold)
            .map(|player| player.id)?;
        log::info!("{winner} reached {threshold} points; session completed");
        self.phase = SessionPhase::Completed { winner };
        Some(winner)
    }

    /// Return to `Playing`.
    pub const fn reset(&mut self) {
        self.phase = SessionPhase::Playing;
        self.evaluations = 0;
    }
}
