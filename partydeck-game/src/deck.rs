//! Standard 52-card deck drawn without replacement.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Clubs, Self::Diamonds, Self::Hearts, Self::Spades];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Ace,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// Shuffled deck; reshuffles a full deck once exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDeck {
    remaining: Vec<Card>,
    shuffles: u32,
}

impl Default for CardDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl CardDeck {
    pub const SIZE: usize = 52;

    /// Empty deck; the first draw shuffles a fresh one in.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: Vec::new(),
            shuffles: 0,
        }
    }

    fn full() -> Vec<Card> {
        Suit::ALL
            .iter()
            .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card { rank, suit }))
            .collect()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut cards = Self::full();
        cards.shuffle(rng);
        self.remaining = cards;
        self.shuffles = self.shuffles.saturating_add(1);
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Card {
        if self.remaining.is_empty() {
            self.shuffle(rng);
        }
        // A freshly shuffled deck is never empty.
        self.remaining.pop().unwrap_or(Card {
            rank: Rank::Ace,
            suit: Suit::Spades,
        })
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    #[must_use]
    pub const fn shuffles(&self) -> u32 {
        self.shuffles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    #[test]
    fn deck_never_repeats_within_a_shuffle() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut deck = CardDeck::new();
        let drawn: HashSet<Card> = (0..CardDeck::SIZE).map(|_| deck.draw(&mut rng)).collect();
        assert_eq!(drawn.len(), CardDeck::SIZE);
        assert_eq!(deck.remaining(), 0);
        assert_eq!(deck.shuffles(), 1);
    }

    #[test]
    fn exhausted_deck_reshuffles() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut deck = CardDeck::new();
        for _ in 0..=CardDeck::SIZE {
            deck.draw(&mut rng);
        }
        assert_eq!(deck.shuffles(), 2);
        assert_eq!(deck.remaining(), CardDeck::SIZE - 1);
    }
}
