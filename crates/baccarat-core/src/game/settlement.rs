use crate::model::bets::{BetKind, BetLedger};
use crate::model::hand::BaccaratHand;
use crate::model::money::Money;
use crate::rules::{Outcome, TableRules};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetDisposition {
    Won,
    Lost,
    Push,
}

/// What happened to a single wager. `payout` is the full amount returned to
/// the bankroll: stake plus profit on a win, the bare stake on a push, zero
/// on a loss (the stake was deducted at placement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetOutcome {
    pub kind: BetKind,
    pub staked: Money,
    pub payout: Money,
    pub disposition: BetDisposition,
}

impl BetOutcome {
    pub fn net(&self) -> Money {
        self.payout - self.staked
    }
}

/// Result of a completed round: the outcome, the per-bet breakdown, and the
/// cent-exact totals credited back to the bankroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub outcome: Outcome,
    pub player_total: u8,
    pub banker_total: u8,
    pub player_pair: bool,
    pub banker_pair: bool,
    pub bets: Vec<BetOutcome>,
    pub total_payout: Money,
    pub net_profit: Money,
}

/// Commission on a winning Banker stake.
///
/// The source game was ambiguous about the no-commission branch; here the
/// consistent interpretation is used throughout: commission is always a
/// fraction of the stake, deducted from profit. Standard tables take a flat
/// percentage on every Banker win; no-commission tables take half the stake
/// only when the Banker wins with a total of exactly six.
fn commission(stake: Money, banker_total: u8, rules: &TableRules) -> Money {
    if rules.no_commission {
        if banker_total == 6 {
            stake.halved()
        } else {
            Money::ZERO
        }
    } else {
        stake.percent(rules.commission_percent)
    }
}

/// Settles every staked bet against the final hands.
pub fn settle(
    player: &BaccaratHand,
    banker: &BaccaratHand,
    ledger: &BetLedger,
    rules: &TableRules,
) -> Settlement {
    let player_total = player.total();
    let banker_total = banker.total();
    let outcome = Outcome::from_totals(player_total, banker_total);
    let player_pair = player.is_pair();
    let banker_pair = banker.is_pair();

    let mut bets = Vec::new();
    let mut total_payout = Money::ZERO;

    for kind in BetKind::ALL {
        let staked = ledger.stake(kind);
        if staked.is_zero() {
            continue;
        }

        let (payout, disposition) = match kind {
            BetKind::Player => match outcome {
                Outcome::PlayerWin => (staked.times(2), BetDisposition::Won),
                Outcome::Tie => (staked, BetDisposition::Push),
                Outcome::BankerWin => (Money::ZERO, BetDisposition::Lost),
            },
            BetKind::Banker => match outcome {
                Outcome::BankerWin => {
                    let fee = commission(staked, banker_total, rules);
                    (staked.times(2) - fee, BetDisposition::Won)
                }
                Outcome::Tie => (staked, BetDisposition::Push),
                Outcome::PlayerWin => (Money::ZERO, BetDisposition::Lost),
            },
            BetKind::Tie => {
                if outcome == Outcome::Tie {
                    (staked.times(rules.tie_odds + 1), BetDisposition::Won)
                } else {
                    (Money::ZERO, BetDisposition::Lost)
                }
            }
            BetKind::PlayerPair => {
                if player_pair {
                    (staked.times(12), BetDisposition::Won)
                } else {
                    (Money::ZERO, BetDisposition::Lost)
                }
            }
            BetKind::BankerPair => {
                if banker_pair {
                    (staked.times(12), BetDisposition::Won)
                } else {
                    (Money::ZERO, BetDisposition::Lost)
                }
            }
        };

        total_payout += payout;
        bets.push(BetOutcome {
            kind,
            staked,
            payout,
            disposition,
        });
    }

    let net_profit = total_payout - ledger.total_staked();

    Settlement {
        outcome,
        player_total,
        banker_total,
        player_pair,
        banker_pair,
        bets,
        total_payout,
        net_profit,
    }
}
