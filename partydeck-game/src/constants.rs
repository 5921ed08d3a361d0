//! Centralized tuning constants for PartyDeck session logic.
//!
//! Per-mode defaults live here so gameplay changes go through review rather
//! than through external JSON assets.

/// Fewest players a turn can be resolved with.
pub const MIN_PLAYERS: usize = 2;

/// Points a player needs to win when no override is configured.
pub const DEFAULT_WIN_THRESHOLD: u64 = 20;

// Drinks assigned per turn, inclusive bounds.
pub(crate) const CARD_DECK_UNITS: (u32, u32) = (1, 3);
pub(crate) const WHEEL_UNITS: (u32, u32) = (1, 5);
pub(crate) const TRUTH_OR_DARE_UNITS: (u32, u32) = (1, 2);
pub(crate) const GUESS_WHO_UNITS: (u32, u32) = (1, 3);
pub(crate) const NEVER_HAVE_I_EVER_UNITS: (u32, u32) = (1, 1);

/// Seed used when a session is created without one.
pub const DEFAULT_SEED: u64 = 0x5041_5254_5944_4543;
