use crate::game::settlement::Settlement;
use crate::model::card::Card;
use crate::model::money::Money;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Which side of the table a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandSide {
    Player,
    Banker,
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HandSide::Player => "Player",
            HandSide::Banker => "Banker",
        };
        f.write_str(label)
    }
}

/// Outbound notifications for the presentation layer. The engine never
/// touches presentation state; a host drains these after each command and
/// renders them on its own schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    ShoeCreated {
        remaining: usize,
    },
    CardDealt {
        side: HandSide,
        card: Card,
        slot: usize,
    },
    ThirdCardDealt {
        side: HandSide,
        card: Card,
    },
    RoundSettled {
        settlement: Settlement,
        bankroll: Money,
    },
    BankrollChanged {
        bankroll: Money,
    },
    BetRejected {
        reason: String,
    },
}
