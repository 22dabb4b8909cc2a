use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::random::UniformRng;

pub const CARDS_PER_DECK: usize = 52;

/// The dealing shoe: several decks shuffled together, consumed from the top.
/// Length only decreases between reshuffles; `fresh` replaces the whole
/// sequence.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Card>,
}

impl Shoe {
    /// Ordered concatenation of `decks` full 52-card decks, unshuffled.
    pub fn build(decks: usize) -> Self {
        let mut cards = Vec::with_capacity(decks * CARDS_PER_DECK);
        for _ in 0..decks {
            for suit in Suit::ALL.iter().copied() {
                for rank in Rank::ORDERED.iter().copied() {
                    cards.push(Card::new(rank, suit));
                }
            }
        }
        Self { cards }
    }

    /// Build, shuffle and burn: the ready-to-deal shoe.
    pub fn fresh(decks: usize, rng: &mut UniformRng) -> Self {
        let mut shoe = Self::build(decks);
        shoe.shuffle(rng);
        shoe.burn();
        shoe
    }

    /// Fisher-Yates, walking from the top index down to 1 and swapping with
    /// a uniformly chosen position at or below it.
    pub fn shuffle(&mut self, rng: &mut UniformRng) {
        for i in (1..self.cards.len()).rev() {
            let j = rng.uniform_int(i as u32 + 1) as usize;
            self.cards.swap(i, j);
        }
    }

    /// Casino burn procedure: turn one card, then discard as many more as
    /// its point value, with a zero-point card counting as ten.
    fn burn(&mut self) {
        let Some(first) = self.cards.pop() else {
            return;
        };
        let count = match first.point_value() {
            0 => 10,
            n => n,
        };
        for _ in 0..count {
            if self.cards.pop().is_none() {
                break;
            }
        }
    }

    /// Remove and return the next card.
    ///
    /// Panics when the shoe is empty. The reshuffle check runs before every
    /// deal, so reaching this is a scheduling bug upstream, not a
    /// recoverable condition.
    pub fn draw(&mut self) -> Card {
        self.cards
            .pop()
            .expect("drew from an empty shoe; reshuffle check missed")
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Cut-card approximation: a fresh shoe is due once fewer than
    /// `threshold` cards remain.
    pub fn needs_reshuffle(&self, threshold: usize) -> bool {
        self.cards.len() < threshold
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::{CARDS_PER_DECK, Shoe};
    use crate::model::card::Card;
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;
    use crate::random::UniformRng;
    use std::collections::HashMap;

    #[test]
    fn eight_deck_shoe_has_416_cards() {
        let shoe = Shoe::build(8);
        assert_eq!(shoe.remaining(), 8 * CARDS_PER_DECK);
    }

    #[test]
    fn every_combination_appears_once_per_deck() {
        let shoe = Shoe::build(8);
        let mut counts: HashMap<Card, usize> = HashMap::new();
        for card in shoe.cards() {
            *counts.entry(*card).or_default() += 1;
        }
        assert_eq!(counts.len(), 52);
        assert!(counts.values().all(|&count| count == 8));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = UniformRng::seeded(5);
        let reference = Shoe::build(8);
        let mut shoe = Shoe::build(8);
        shoe.shuffle(&mut rng);

        assert_eq!(shoe.remaining(), reference.remaining());

        let mut expected: HashMap<Card, usize> = HashMap::new();
        for card in reference.cards() {
            *expected.entry(*card).or_default() += 1;
        }
        let mut actual: HashMap<Card, usize> = HashMap::new();
        for card in shoe.cards() {
            *actual.entry(*card).or_default() += 1;
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn shuffle_with_seed_is_deterministic() {
        let mut rng_a = UniformRng::seeded(42);
        let mut rng_b = UniformRng::seeded(42);
        let shoe_a = Shoe::fresh(8, &mut rng_a);
        let shoe_b = Shoe::fresh(8, &mut rng_b);
        assert_eq!(shoe_a.cards(), shoe_b.cards());
    }

    #[test]
    fn burn_discards_between_two_and_eleven_cards() {
        // One turned card plus 1..=10 burned behind it.
        for seed in 0..50 {
            let mut rng = UniformRng::seeded(seed);
            let shoe = Shoe::fresh(8, &mut rng);
            let burned = 8 * CARDS_PER_DECK - shoe.remaining();
            assert!((2..=11).contains(&burned), "burned {burned} cards");
        }
    }

    #[test]
    fn burn_count_follows_the_turned_card() {
        // Unshuffled shoe ends on the King of Hearts: zero points, ten burned.
        let mut shoe = Shoe::build(1);
        assert_eq!(
            shoe.cards().last(),
            Some(&Card::new(Rank::King, Suit::Hearts))
        );
        shoe.burn();
        assert_eq!(shoe.remaining(), 52 - 11);
    }

    #[test]
    fn needs_reshuffle_below_threshold() {
        let mut shoe = Shoe::build(1);
        assert!(!shoe.needs_reshuffle(16));
        while shoe.remaining() > 15 {
            let _ = shoe.draw();
        }
        assert!(shoe.needs_reshuffle(16));
    }

    #[test]
    #[should_panic(expected = "empty shoe")]
    fn drawing_from_an_empty_shoe_panics() {
        let mut shoe = Shoe { cards: Vec::new() };
        let _ = shoe.draw();
    }
}
