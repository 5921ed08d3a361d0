//! Read-only content catalogs used by content-driven turn strategies.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::deck::Rank;

const DEFAULT_CATALOG_DATA: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRule {
    pub rank: Rank,
    pub title: String,
    pub rule: String,
}

/// What kind of text a prompt carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Truth,
    Dare,
    Statement,
    Subject,
    CardRule,
}

/// Content shown alongside a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Static content sequences. Entries are indexed, never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCatalog {
    #[serde(default)]
    pub card_rules: Vec<CardRule>,
    #[serde(default)]
    pub truths: Vec<String>,
    #[serde(default)]
    pub dares: Vec<String>,
    #[serde(default)]
    pub never_have_i_ever: Vec<String>,
    #[serde(default)]
    pub guess_who: Vec<String>,
}

impl ContentCatalog {
    /// Catalog with no entries (useful for tests).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            card_rules: Vec::new(),
            truths: Vec::new(),
            dares: Vec::new(),
            never_have_i_ever: Vec::new(),
            guess_who: Vec::new(),
        }
    }

    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Built-in catalog bundled with the crate.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_CATALOG_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn rule_for(&self, rank: Rank) -> Option<&CardRule> {
        self.card_rules.iter().find(|rule| rule.rank == rank)
    }

    /// Uniformly pick a prompt of the given kind, if any exist.
    pub fn pick<R: Rng + ?Sized>(&self, kind: PromptKind, rng: &mut R) -> Option<Prompt> {
        let text = match kind {
            PromptKind::Truth => self.truths.choose(rng).map(String::as_str),
            PromptKind::Dare => self.dares.choose(rng).map(String::as_str),
            PromptKind::Statement => self.never_have_i_ever.choose(rng).map(String::as_str),
            PromptKind::Subject => self.guess_who.choose(rng).map(String::as_str),
            PromptKind::CardRule => self.card_rules.choose(rng).map(|r| r.rule.as_str()),
        }?;
        Some(Prompt {
            kind,
            text: text.to_string(),
        })
    }
}

/// Shared built-in catalog.
#[must_use]
pub fn catalog() -> &'static ContentCatalog {
    static CATALOG: OnceLock<ContentCatalog> = OnceLock::new();
    CATALOG.get_or_init(ContentCatalog::load_from_static)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn bundled_catalog_covers_every_rank() {
        let catalog = catalog();
        for rank in Rank::ALL {
            assert!(catalog.rule_for(rank).is_some(), "missing rule for {rank:?}");
        }
        assert!(!catalog.truths.is_empty());
        assert!(!catalog.dares.is_empty());
    }

    #[test]
    fn pick_from_empty_list_is_none() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(ContentCatalog::empty().pick(PromptKind::Dare, &mut rng).is_none());
    }

    #[test]
    fn pick_draws_from_the_matching_list() {
        let catalog = catalog();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..50 {
            let dare = catalog.pick(PromptKind::Dare, &mut rng).unwrap();
            assert!(catalog.dares.contains(&dare.text));
            let subject = catalog.pick(PromptKind::Subject, &mut rng).unwrap();
            assert!(catalog.guess_who.contains(&subject.text));
            let rule = catalog.pick(PromptKind::CardRule, &mut rng).unwrap();
            assert!(catalog.card_rules.iter().any(|r| r.rule == rule.text));
        }
    }

    #[test]
    fn from_json_fills_missing_sections() {
        let catalog = ContentCatalog::from_json(r#"{ "truths": ["only one"] }"#).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let prompt = catalog.pick(PromptKind::Truth, &mut rng).unwrap();
        assert_eq!(prompt.text, "only one");
        assert!(catalog.card_rules.is_empty());
        assert!(ContentCatalog::from_json("[").is_err());
    }
}
