//! Canonical roster of session players.
use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};
use crate::player::{Player, PlayerId};

/// Ordered roster; the only writer of player records.
///
/// Iteration order is insertion order and is relied on by redistribution and
/// win detection for deterministic tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    next_id: u64,
}

impl PlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from records fetched from a store.
    ///
    /// Duplicate ids keep the first record; the id counter resumes after the
    /// highest id seen.
    #[must_use]
    pub fn from_players(players: impl IntoIterator<Item = Player>) -> Self {
        let mut registry = Self::new();
        for player in players {
            registry.insert(player);
        }
        registry
    }

    /// Add a new player with a fresh id and zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] when the name is empty or only whitespace.
    pub fn add_player(&mut self, name: &str) -> SessionResult<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::validation("player name must not be empty"));
        }
        let player = Player::new(self.allocate_id(), name);
        self.players.push(player.clone());
        Ok(player)
    }

    /// Insert a complete record, ignoring it when the id is already present.
    ///
    /// Returns `true` when the roster changed.
    pub fn insert(&mut self, player: Player) -> bool {
        if self.contains(player.id) {
            return false;
        }
        self.next_id = self.next_id.max(player.id.0.saturating_add(1));
        self.players.push(player);
        true
    }

    /// Remove a player, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when the id is absent.
    pub fn remove_player(&mut self, id: PlayerId) -> SessionResult<Player> {
        let index = self.position(id).ok_or(SessionError::NotFound(id))?;
        Ok(self.players.remove(index))
    }

    /// Players in insertion order.
    #[must_use]
    pub fn list_players(&self) -> &[Player] {
        &self.players
    }

    /// Players other than `id`, in insertion order.
    #[must_use]
    pub fn others(&self, id: PlayerId) -> Vec<Player> {
        self.players
            .iter()
            .filter(|player| player.id != id)
            .cloned()
            .collect()
    }

    /// Drop every player.
    pub fn reset_all(&mut self) {
        self.players.clear();
    }

    /// Zero counters for every player while keeping the roster.
    pub fn clear_progress(&mut self) {
        for player in &mut self.players {
            player.clear_progress();
        }
    }

    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Sum of points across the roster.
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.players
            .iter()
            .fold(0_u64, |acc, player| acc.saturating_add(player.points))
    }

    /// Fail unless the roster holds at least `required` players.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotEnoughPlayers`] when the roster is too small.
    pub fn require_players(&self, required: usize) -> SessionResult<()> {
        if self.players.len() < required {
            return Err(SessionError::NotEnoughPlayers {
                required,
                present: self.players.len(),
            });
        }
        Ok(())
    }

    fn position(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == id)
    }

    const fn allocate_id(&mut self) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}
