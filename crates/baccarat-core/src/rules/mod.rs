pub mod drawing;

use core::fmt;
use serde::{Deserialize, Serialize};

/// Table configuration. Defaults match the standard eight-deck Punto Banco
/// layout: 8:1 tie, 5% Banker commission, cut card roughly sixteen cards
/// from the bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    #[serde(default = "default_decks")]
    pub decks: usize,
    /// Tie profit multiplier (8 means 8:1; some tables pay 9:1).
    #[serde(default = "default_tie_odds")]
    pub tie_odds: i64,
    /// No-commission variant: Banker wins pay even money except on a
    /// Banker total of six, which pays half profit.
    #[serde(default)]
    pub no_commission: bool,
    /// Flat commission taken from Banker-win profit, in percent.
    #[serde(default = "default_commission_percent")]
    pub commission_percent: i64,
    /// Fresh shoe once fewer than this many cards remain.
    #[serde(default = "default_reshuffle_threshold")]
    pub reshuffle_threshold: usize,
}

fn default_decks() -> usize {
    8
}

fn default_tie_odds() -> i64 {
    8
}

fn default_commission_percent() -> i64 {
    5
}

fn default_reshuffle_threshold() -> usize {
    16
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            decks: default_decks(),
            tie_odds: default_tie_odds(),
            no_commission: false,
            commission_percent: default_commission_percent(),
            reshuffle_threshold: default_reshuffle_threshold(),
        }
    }
}

/// Round result from comparing final totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    PlayerWin,
    BankerWin,
    Tie,
}

impl Outcome {
    pub const fn from_totals(player: u8, banker: u8) -> Self {
        if player > banker {
            Outcome::PlayerWin
        } else if banker > player {
            Outcome::BankerWin
        } else {
            Outcome::Tie
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::PlayerWin => "Player",
            Outcome::BankerWin => "Banker",
            Outcome::Tie => "Tie",
        };
        f.write_str(label)
    }
}
