//! Player records and progress counters.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a player, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// What a scoring event rewards the actor for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    Drink,
    Challenge,
}

impl ProgressKind {
    pub const ALL: [Self; 2] = [Self::Drink, Self::Challenge];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Drink => "drink",
            Self::Challenge => "challenge",
        }
    }
}

/// A participant in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub drinks_completed: u32,
    #[serde(default)]
    pub challenges_completed: u32,
}

impl Player {
    /// Create a player with every counter at zero.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            points: 0,
            drinks_completed: 0,
            challenges_completed: 0,
        }
    }

    /// Counter matching a progress kind.
    #[must_use]
    pub const fn completed(&self, kind: ProgressKind) -> u32 {
        match kind {
            ProgressKind::Drink => self.drinks_completed,
            ProgressKind::Challenge => self.challenges_completed,
        }
    }

    /// Zero all progress while keeping identity.
    pub const fn clear_progress(&mut self) {
        self.points = 0;
        self.drinks_completed = 0;
        self.challenges_completed = 0;
    }

    /// Partial update describing this player's progress, used for persistence.
    #[must_use]
    pub const fn progress_patch(&self) -> PlayerPatch {
        PlayerPatch {
            points: Some(self.points),
            drinks_completed: Some(self.drinks_completed),
            challenges_completed: Some(self.challenges_completed),
        }
    }
}

/// Field-level update sent to the roster store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drinks_completed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenges_completed: Option<u32>,
}

impl PlayerPatch {
    /// Apply the present fields to a player record.
    pub fn apply_to(&self, player: &mut Player) {
        if let Some(points) = self.points {
            player.points = points;
        }
        if let Some(drinks) = self.drinks_completed {
            player.drinks_completed = drinks;
        }
        if let Some(challenges) = self.challenges_completed {
            player.challenges_completed = challenges;
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_none()
            && self.drinks_completed.is_none()
            && self.challenges_completed.is_none()
    }
}
