//! Session configuration: game mode, per-turn magnitude bounds, win threshold.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::{
    CARD_DECK_UNITS, DEFAULT_WIN_THRESHOLD, GUESS_WHO_UNITS, NEVER_HAVE_I_EVER_UNITS,
    TRUTH_OR_DARE_UNITS, WHEEL_UNITS,
};

/// Game variant; each one maps to a turn strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    CardDeck,
    Wheel,
    TruthOrDare,
    GuessWho,
    NeverHaveIEver,
}

impl GameMode {
    pub const ALL: [Self; 5] = [
        Self::CardDeck,
        Self::Wheel,
        Self::TruthOrDare,
        Self::GuessWho,
        Self::NeverHaveIEver,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CardDeck => "card-deck",
            Self::Wheel => "wheel",
            Self::TruthOrDare => "truth-or-dare",
            Self::GuessWho => "guess-who",
            Self::NeverHaveIEver => "never-have-i-ever",
        }
    }

    /// Parse a kebab-case label as produced by [`GameMode::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(label))
    }

    #[must_use]
    pub const fn default_units(self) -> UnitsRange {
        let (min, max) = match self {
            Self::CardDeck => CARD_DECK_UNITS,
            Self::Wheel => WHEEL_UNITS,
            Self::TruthOrDare => TRUTH_OR_DARE_UNITS,
            Self::GuessWho => GUESS_WHO_UNITS,
            Self::NeverHaveIEver => NEVER_HAVE_I_EVER_UNITS,
        };
        UnitsRange { min, max }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive bounds on the magnitude assigned per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsRange {
    pub min: u32,
    pub max: u32,
}

impl UnitsRange {
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionConfigError {
    #[error("units per round minimum {min} exceeds maximum {max}")]
    UnitsMinExceedsMax { min: u32, max: u32 },
    #[error("win threshold must be positive")]
    ZeroWinThreshold,
    #[error("config JSON is invalid: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: GameMode,
    #[serde(default = "SessionConfig::default_units")]
    pub units_per_round: UnitsRange,
    #[serde(default = "SessionConfig::default_win_threshold")]
    pub win_threshold: u64,
}

impl SessionConfig {
    const fn default_units() -> UnitsRange {
        UnitsRange::new(1, 1)
    }

    const fn default_win_threshold() -> u64 {
        DEFAULT_WIN_THRESHOLD
    }

    /// Defaults tuned for a mode.
    #[must_use]
    pub const fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            units_per_round: mode.default_units(),
            win_threshold: DEFAULT_WIN_THRESHOLD,
        }
    }

    /// Build and validate a config.
    ///
    /// # Errors
    ///
    /// Returns an error when the bounds are inverted or the threshold is zero.
    pub fn new(
        mode: GameMode,
        units_per_round: UnitsRange,
        win_threshold: u64,
    ) -> Result<Self, SessionConfigError> {
        let config = Self {
            mode,
            units_per_round,
            win_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub const fn with_win_threshold(mut self, win_threshold: u64) -> Self {
        self.win_threshold = win_threshold;
        self
    }

    #[must_use]
    pub const fn with_units(mut self, units_per_round: UnitsRange) -> Self {
        self.units_per_round = units_per_round;
        self
    }

    /// Parse and validate a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, SessionConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| SessionConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check config invariants.
    ///
    /// # Errors
    ///
    /// Returns an error when the bounds are inverted or the threshold is zero.
    pub const fn validate(&self) -> Result<(), SessionConfigError> {
        if self.units_per_round.min > self.units_per_round.max {
            return Err(SessionConfigError::UnitsMinExceedsMax {
                min: self.units_per_round.min,
                max: self.units_per_round.max,
            });
        }
        if self.win_threshold == 0 {
            return Err(SessionConfigError::ZeroWinThreshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_are_valid() {
        for mode in GameMode::ALL {
            let config = SessionConfig::for_mode(mode);
            assert_eq!(config.validate(), Ok(()));
            assert!(config.units_per_round.min >= 1);
        }
    }

    #[test]
    fn labels_round_trip() {
        for mode in GameMode::ALL {
            assert_eq!(GameMode::from_label(mode.label()), Some(mode));
        }
        assert_eq!(GameMode::from_label(" WHEEL "), Some(GameMode::Wheel));
        assert_eq!(GameMode::from_label("poker"), None);
    }

    #[test]
    fn inverted_bounds_and_zero_threshold_are_rejected() {
        assert_eq!(
            SessionConfig::new(GameMode::Wheel, UnitsRange::new(4, 2), 10),
            Err(SessionConfigError::UnitsMinExceedsMax { min: 4, max: 2 })
        );
        assert_eq!(
            SessionConfig::new(GameMode::Wheel, UnitsRange::new(1, 2), 0),
            Err(SessionConfigError::ZeroWinThreshold)
        );
    }

    #[test]
    fn from_json_applies_field_defaults() {
        let config = SessionConfig::from_json(r#"{ "mode": "truth_or_dare" }"#).unwrap();
        assert_eq!(config.mode, GameMode::TruthOrDare);
        assert_eq!(config.win_threshold, DEFAULT_WIN_THRESHOLD);
        assert!(matches!(
            SessionConfig::from_json(r#"{ "mode": "wheel", "win_threshold": 0 }"#),
            Err(SessionConfigError::ZeroWinThreshold)
        ));
        assert!(matches!(
            SessionConfig::from_json("nope"),
            Err(SessionConfigError::Parse(_))
        ));
    }
}
