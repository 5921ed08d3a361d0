//! Turn selection strategies, one per game mode.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{ContentCatalog, Prompt, PromptKind};
use crate::config::{GameMode, SessionConfig, UnitsRange};
use crate::deck::{Card, CardDeck};
use crate::error::{SessionError, SessionResult};
use crate::numbers::{FULL_TURN, floor_f64_to_usize, normalize_degrees, usize_to_f64};
use crate::player::Player;

/// Result of one resolved selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub actor: Player,
    pub magnitude: u32,
    /// Wheel segment the pointer landed on.
    #[serde(default)]
    pub segment: Option<usize>,
    /// Final wheel rotation in degrees, normalized to `[0, 360)`.
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub card: Option<Card>,
    #[serde(default)]
    pub prompt: Option<Prompt>,
}

impl TurnOutcome {
    fn new(actor: Player, magnitude: u32) -> Self {
        Self {
            actor,
            magnitude,
            segment: None,
            rotation: None,
            card: None,
            prompt: None,
        }
    }
}

/// Index of the wheel segment under the pointer after a rotation of `theta` degrees.
///
/// Segments are equally sized and numbered clockwise from the pointer; returns
/// `None` for a wheel without segments.
#[must_use]
pub fn wheel_segment(theta: f64, segments: usize) -> Option<usize> {
    if segments == 0 {
        return None;
    }
    let normalized = normalize_degrees(theta);
    let segment_size = FULL_TURN / usize_to_f64(segments);
    Some(floor_f64_to_usize((FULL_TURN - normalized) / segment_size) % segments)
}

/// Strategy chosen once per session from the game mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnStrategy {
    /// Uniform actor and magnitude, optionally with a prompt of one kind.
    RandomUniform { prompt: Option<PromptKind> },
    /// Spin a wheel with one segment per eligible player.
    Wheel,
    /// Draw from a deck; the card's rank picks the rule.
    CardDeck { deck: CardDeck },
    /// Uniform actor, then a coin flip between a truth and a dare.
    TruthOrDare,
}

impl TurnStrategy {
    #[must_use]
    pub const fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::CardDeck => Self::CardDeck {
                deck: CardDeck::new(),
            },
            GameMode::Wheel => Self::Wheel,
            GameMode::TruthOrDare => Self::TruthOrDare,
            GameMode::GuessWho => Self::RandomUniform {
                prompt: Some(PromptKind::Subject),
            },
            GameMode::NeverHaveIEver => Self::RandomUniform {
                prompt: Some(PromptKind::Statement),
            },
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::RandomUniform { .. } => "random-uniform",
            Self::Wheel => "wheel",
            Self::CardDeck { .. } => "card-deck",
            Self::TruthOrDare => "truth-or-dare",
        }
    }

    /// Pick the actor and magnitude for one turn.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyRoster`] when `eligible` is empty.
    pub fn select_turn<R: Rng + ?Sized>(
        &mut self,
        config: &SessionConfig,
        eligible: &[Player],
        catalog: &ContentCatalog,
        rng: &mut R,
    ) -> SessionResult<TurnOutcome> {
        if eligible.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        let outcome = match self {
            Self::RandomUniform { prompt } => {
                let mut outcome = uniform_outcome(config.units_per_round, eligible, rng);
                outcome.prompt = prompt.and_then(|kind| catalog.pick(kind, rng));
                outcome
            }
            Self::Wheel => {
                let rotation = rng.gen_range(0.0..FULL_TURN);
                let segment = wheel_segment(rotation, eligible.len()).unwrap_or(0);
                let mut outcome = TurnOutcome::new(
                    eligible[segment].clone(),
                    draw_magnitude(config.units_per_round, rng),
                );
                outcome.segment = Some(segment);
                outcome.rotation = Some(rotation);
                outcome
            }
            Self::CardDeck { deck } => {
                let card = deck.draw(rng);
                let mut outcome = uniform_outcome(config.units_per_round, eligible, rng);
                outcome.prompt = catalog.rule_for(card.rank).map(|rule| Prompt {
                    kind: PromptKind::CardRule,
                    text: rule.rule.clone(),
                });
                outcome.card = Some(card);
                outcome
            }
            Self::TruthOrDare => {
                let mut outcome = uniform_outcome(config.units_per_round, eligible, rng);
                let kind = if rng.gen_bool(0.5) {
                    PromptKind::Truth
                } else {
                    PromptKind::Dare
                };
                outcome.prompt = catalog.pick(kind, rng);
                outcome
            }
        };
        log::debug!(
            "{} selected {} for {} unit(s)",
            self.label(),
            outcome.actor.id,
            outcome.magnitude
        );
        Ok(outcome)
    }
}

fn uniform_outcome<R: Rng + ?Sized>(
    units: UnitsRange,
    eligible: &[Player],
    rng: &mut R,
) -> TurnOutcome {
    let actor = eligible[rng.gen_range(0..eligible.len())].clone();
    TurnOutcome::new(actor, draw_magnitude(units, rng))
}

fn draw_magnitude<R: Rng + ?Sized>(units: UnitsRange, rng: &mut R) -> u32 {
    if units.min >= units.max {
        return units.min;
    }
    rng.gen_range(units.min..=units.max)
}
