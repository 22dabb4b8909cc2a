use crate::model::money::Money;
use core::fmt;
use serde::{Deserialize, Serialize};

/// The five wager categories on the felt. Player, Banker and Tie are the
/// main bets; at most one of them may be live in a round. The pair bets are
/// independent side bets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Player,
    Banker,
    Tie,
    PlayerPair,
    BankerPair,
}

impl BetKind {
    pub const ALL: [BetKind; 5] = [
        BetKind::Player,
        BetKind::Banker,
        BetKind::Tie,
        BetKind::PlayerPair,
        BetKind::BankerPair,
    ];

    pub const fn is_main(self) -> bool {
        matches!(self, BetKind::Player | BetKind::Banker | BetKind::Tie)
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BetKind::Player => "Player",
            BetKind::Banker => "Banker",
            BetKind::Tie => "Tie",
            BetKind::PlayerPair => "Player Pair",
            BetKind::BankerPair => "Banker Pair",
        };
        f.write_str(label)
    }
}

/// Per-round stakes keyed by bet kind, plus the one-main-bet lock.
///
/// The ledger only records amounts; the engine orders the funds check
/// against the bankroll before anything is recorded here.
#[derive(Debug, Clone, Default)]
pub struct BetLedger {
    stakes: [Money; 5],
    active_main: Option<BetKind>,
}

impl BetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `kind` is a main bet and a different main bet is already
    /// live; recording it would break exclusivity.
    pub fn would_conflict(&self, kind: BetKind) -> bool {
        kind.is_main() && self.active_main.is_some_and(|active| active != kind)
    }

    /// Accumulates a stake. Repeated bets on the same kind stack. The first
    /// main-bet stake locks out the other two main categories until
    /// `clear`.
    pub fn record(&mut self, kind: BetKind, amount: Money) {
        debug_assert!(!self.would_conflict(kind), "main-bet conflict not checked");
        self.stakes[kind.index()] += amount;
        if kind.is_main() {
            self.active_main = Some(kind);
        }
    }

    pub fn stake(&self, kind: BetKind) -> Money {
        self.stakes[kind.index()]
    }

    pub fn active_main(&self) -> Option<BetKind> {
        self.active_main
    }

    pub fn total_staked(&self) -> Money {
        self.stakes
            .iter()
            .fold(Money::ZERO, |sum, stake| sum + *stake)
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.iter().all(|stake| stake.is_zero())
    }

    /// Zero every entry and release the main-bet lock.
    pub fn clear(&mut self) {
        self.stakes = [Money::ZERO; 5];
        self.active_main = None;
    }
}
