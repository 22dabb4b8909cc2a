use crate::game::events::{EngineEvent, HandSide};
use crate::game::settlement::{Settlement, settle};
use crate::model::bets::{BetKind, BetLedger};
use crate::model::hand::BaccaratHand;
use crate::model::money::Money;
use crate::model::shoe::Shoe;
use crate::random::UniformRng;
use crate::rules::TableRules;
use crate::rules::drawing;
use core::fmt;

/// Round lifecycle. Transitions happen only inside explicit command calls;
/// the host supplies any pacing between them (card animations and the like
/// are its concern, not the engine's).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingBets,
    Dealt,
    ThirdCardPhase,
    Settled,
}

/// A rejected wager. The operation is a no-op: nothing was deducted or
/// recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetError {
    RoundInProgress,
    InvalidAmount(Money),
    MainBetConflict { active: BetKind, attempted: BetKind },
    InsufficientFunds { bankroll: Money, attempted: Money },
}

impl fmt::Display for BetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetError::RoundInProgress => f.write_str("bets are closed while a round is in play"),
            BetError::InvalidAmount(amount) => {
                write!(f, "bet amount {amount} must be positive")
            }
            BetError::MainBetConflict { active, attempted } => {
                write!(f, "{attempted} conflicts with the active {active} bet")
            }
            BetError::InsufficientFunds { bankroll, attempted } => {
                write!(f, "bankroll {bankroll} cannot cover a {attempted} bet")
            }
        }
    }
}

impl std::error::Error for BetError {}

/// A round command issued out of phase. The state machine is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundError {
    NoBetsPlaced,
    RoundInProgress,
    AwaitingDeal,
    ThirdCardPending,
    RoundNotSettled,
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RoundError::NoBetsPlaced => "cannot deal before any bet is placed",
            RoundError::RoundInProgress => "a round is already in play",
            RoundError::AwaitingDeal => "no round has been dealt",
            RoundError::ThirdCardPending => "the third-card phase has not run",
            RoundError::RoundNotSettled => "the round has not been settled",
        };
        f.write_str(text)
    }
}

impl std::error::Error for RoundError {}

/// The table aggregate: shoe, hands, ledger, bankroll and the round state
/// machine, with every mutation routed through its commands. Hosts drain
/// `EngineEvent`s after each command to drive presentation.
#[derive(Debug)]
pub struct BaccaratTable {
    rules: TableRules,
    rng: UniformRng,
    shoe: Shoe,
    player: BaccaratHand,
    banker: BaccaratHand,
    ledger: BetLedger,
    bankroll: Money,
    phase: RoundPhase,
    last_settlement: Option<Settlement>,
    events: Vec<EngineEvent>,
}

impl BaccaratTable {
    /// A table with an OS-randomized shoe.
    pub fn new(rules: TableRules, bankroll: Money) -> Self {
        Self::with_rng(rules, bankroll, UniformRng::secure())
    }

    /// A fully deterministic table for tests and simulation replays.
    pub fn with_seed(rules: TableRules, bankroll: Money, seed: u64) -> Self {
        Self::with_rng(rules, bankroll, UniformRng::seeded(seed))
    }

    fn with_rng(rules: TableRules, bankroll: Money, mut rng: UniformRng) -> Self {
        let shoe = Shoe::fresh(rules.decks, &mut rng);
        let mut table = Self {
            rules,
            rng,
            shoe,
            player: BaccaratHand::new(),
            banker: BaccaratHand::new(),
            ledger: BetLedger::new(),
            bankroll,
            phase: RoundPhase::AwaitingBets,
            last_settlement: None,
            events: Vec::new(),
        };
        table.events.push(EngineEvent::ShoeCreated {
            remaining: table.shoe.remaining(),
        });
        table
    }

    /// Stakes `amount` on `kind`. Deducts from the bankroll on acceptance;
    /// on rejection nothing changes and a `BetRejected` event is queued for
    /// the host to surface.
    pub fn place_bet(&mut self, kind: BetKind, amount: Money) -> Result<(), BetError> {
        let result = self.try_place_bet(kind, amount);
        if let Err(err) = &result {
            self.events.push(EngineEvent::BetRejected {
                reason: err.to_string(),
            });
        }
        result
    }

    fn try_place_bet(&mut self, kind: BetKind, amount: Money) -> Result<(), BetError> {
        if self.phase != RoundPhase::AwaitingBets {
            return Err(BetError::RoundInProgress);
        }
        if amount <= Money::ZERO {
            return Err(BetError::InvalidAmount(amount));
        }
        if let Some(active) = self.ledger.active_main() {
            if kind.is_main() && active != kind {
                return Err(BetError::MainBetConflict {
                    active,
                    attempted: kind,
                });
            }
        }
        if self.bankroll < amount {
            return Err(BetError::InsufficientFunds {
                bankroll: self.bankroll,
                attempted: amount,
            });
        }

        self.bankroll -= amount;
        self.ledger.record(kind, amount);
        self.events.push(EngineEvent::BankrollChanged {
            bankroll: self.bankroll,
        });
        Ok(())
    }

    /// Refunds every stake on the felt and clears the ledger. Only allowed
    /// before the deal; once cards are out the round runs to settlement.
    pub fn cancel_bets(&mut self) -> Result<Money, RoundError> {
        if self.phase != RoundPhase::AwaitingBets {
            return Err(RoundError::RoundInProgress);
        }
        let refund = self.ledger.total_staked();
        self.ledger.clear();
        if !refund.is_zero() {
            self.bankroll += refund;
            self.events.push(EngineEvent::BankrollChanged {
                bankroll: self.bankroll,
            });
        }
        Ok(refund)
    }

    /// Deals the opening two cards to each side. Replaces the shoe first
    /// when the cut card has been reached, so the shoe can never run dry
    /// mid-round.
    pub fn deal(&mut self) -> Result<(), RoundError> {
        if self.phase != RoundPhase::AwaitingBets {
            return Err(RoundError::RoundInProgress);
        }
        if self.ledger.is_empty() {
            return Err(RoundError::NoBetsPlaced);
        }
        if self.shoe.needs_reshuffle(self.rules.reshuffle_threshold) {
            self.shoe = Shoe::fresh(self.rules.decks, &mut self.rng);
            self.events.push(EngineEvent::ShoeCreated {
                remaining: self.shoe.remaining(),
            });
        }

        for slot in 0..2 {
            let card = self.shoe.draw();
            self.player.add(card);
            self.events.push(EngineEvent::CardDealt {
                side: HandSide::Player,
                card,
                slot,
            });
        }
        for slot in 0..2 {
            let card = self.shoe.draw();
            self.banker.add(card);
            self.events.push(EngineEvent::CardDealt {
                side: HandSide::Banker,
                card,
                slot,
            });
        }

        self.phase = RoundPhase::Dealt;
        Ok(())
    }

    /// Applies the third-card protocol once, drawing at most one card per
    /// side. A natural on either side stands both hands pat.
    pub fn play_third_card_phase(&mut self) -> Result<(), RoundError> {
        match self.phase {
            RoundPhase::Dealt => {}
            RoundPhase::AwaitingBets => return Err(RoundError::AwaitingDeal),
            RoundPhase::ThirdCardPhase | RoundPhase::Settled => {
                return Err(RoundError::RoundInProgress);
            }
        }

        if !self.player.is_natural() && !self.banker.is_natural() {
            let player_total = self.player.total();
            let banker_total = self.banker.total();

            if drawing::player_draws(player_total) {
                let card = self.shoe.draw();
                self.player.add(card);
                self.events.push(EngineEvent::ThirdCardDealt {
                    side: HandSide::Player,
                    card,
                });
                if drawing::banker_draws(banker_total, card.point_value()) {
                    self.draw_banker_third();
                }
            } else if drawing::banker_draws_unassisted(banker_total) {
                self.draw_banker_third();
            }
        }

        self.phase = RoundPhase::ThirdCardPhase;
        Ok(())
    }

    fn draw_banker_third(&mut self) {
        let card = self.shoe.draw();
        self.banker.add(card);
        self.events.push(EngineEvent::ThirdCardDealt {
            side: HandSide::Banker,
            card,
        });
    }

    /// Settles all bets against the final hands, credits the payout and
    /// zeroes the ledger.
    pub fn settle_round(&mut self) -> Result<Settlement, RoundError> {
        match self.phase {
            RoundPhase::ThirdCardPhase => {}
            RoundPhase::AwaitingBets => return Err(RoundError::AwaitingDeal),
            RoundPhase::Dealt => return Err(RoundError::ThirdCardPending),
            RoundPhase::Settled => return Err(RoundError::RoundInProgress),
        }

        let settlement = settle(&self.player, &self.banker, &self.ledger, &self.rules);
        self.bankroll += settlement.total_payout;
        self.ledger.clear();
        self.phase = RoundPhase::Settled;
        self.events.push(EngineEvent::RoundSettled {
            settlement: settlement.clone(),
            bankroll: self.bankroll,
        });
        self.last_settlement = Some(settlement.clone());
        Ok(settlement)
    }

    /// Clears the hands and reopens betting.
    pub fn next_round(&mut self) -> Result<(), RoundError> {
        if self.phase != RoundPhase::Settled {
            return Err(RoundError::RoundNotSettled);
        }
        self.player.clear();
        self.banker.clear();
        self.phase = RoundPhase::AwaitingBets;
        Ok(())
    }

    /// Runs a full round in one call: deal, third-card phase, settlement,
    /// cleanup. Convenience for hosts that do their own pacing elsewhere.
    pub fn play_round(&mut self) -> Result<Settlement, RoundError> {
        self.deal()?;
        self.play_third_card_phase()?;
        let settlement = self.settle_round()?;
        self.next_round()?;
        Ok(settlement)
    }

    /// Hands back every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn bankroll(&self) -> Money {
        self.bankroll
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn player_hand(&self) -> &BaccaratHand {
        &self.player
    }

    pub fn banker_hand(&self) -> &BaccaratHand {
        &self.banker
    }

    pub fn shoe_remaining(&self) -> usize {
        self.shoe.remaining()
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn last_settlement(&self) -> Option<&Settlement> {
        self.last_settlement.as_ref()
    }

    /// Out of money with nothing left on the felt: the game-over condition.
    pub fn is_broke(&self) -> bool {
        self.bankroll.is_zero() && self.ledger.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{BaccaratTable, BetError, RoundError, RoundPhase};
    use crate::game::events::EngineEvent;
    use crate::model::bets::BetKind;
    use crate::model::money::Money;
    use crate::rules::TableRules;

    fn table(seed: u64) -> BaccaratTable {
        BaccaratTable::with_seed(TableRules::default(), Money::from_dollars_whole(5_000), seed)
    }

    #[test]
    fn new_table_announces_its_shoe() {
        let mut table = table(1);
        let events = table.drain_events();
        assert!(matches!(events.as_slice(), [EngineEvent::ShoeCreated { .. }]));
        assert_eq!(table.phase(), RoundPhase::AwaitingBets);
    }

    #[test]
    fn placing_a_bet_moves_funds_to_the_ledger() {
        let mut table = table(1);
        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        assert_eq!(table.bankroll(), Money::from_dollars_whole(4_900));
        assert_eq!(
            table.ledger().stake(BetKind::Player),
            Money::from_dollars_whole(100)
        );
    }

    #[test]
    fn repeated_main_bets_stack() {
        let mut table = table(1);
        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        assert_eq!(
            table.ledger().stake(BetKind::Player),
            Money::from_dollars_whole(200)
        );
    }

    #[test]
    fn conflicting_main_bet_is_rejected_without_mutation() {
        let mut table = table(1);
        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        table.drain_events();

        let err = table
            .place_bet(BetKind::Banker, Money::from_dollars_whole(100))
            .unwrap_err();
        assert_eq!(
            err,
            BetError::MainBetConflict {
                active: BetKind::Player,
                attempted: BetKind::Banker,
            }
        );
        assert_eq!(table.bankroll(), Money::from_dollars_whole(4_900));
        assert!(table.ledger().stake(BetKind::Banker).is_zero());

        let events = table.drain_events();
        assert!(matches!(
            events.as_slice(),
            [EngineEvent::BetRejected { .. }]
        ));
    }

    #[test]
    fn side_bets_ride_alongside_the_main_bet() {
        let mut table = table(1);
        table
            .place_bet(BetKind::Tie, Money::from_dollars_whole(50))
            .unwrap();
        table
            .place_bet(BetKind::PlayerPair, Money::from_dollars_whole(25))
            .unwrap();
        table
            .place_bet(BetKind::BankerPair, Money::from_dollars_whole(25))
            .unwrap();
        assert_eq!(table.ledger().total_staked(), Money::from_dollars_whole(100));
    }

    #[test]
    fn bet_beyond_bankroll_is_rejected() {
        let mut table = table(1);
        let err = table
            .place_bet(BetKind::Player, Money::from_dollars_whole(5_001))
            .unwrap_err();
        assert!(matches!(err, BetError::InsufficientFunds { .. }));
        assert_eq!(table.bankroll(), Money::from_dollars_whole(5_000));
    }

    #[test]
    fn zero_bet_is_rejected() {
        let mut table = table(1);
        let err = table.place_bet(BetKind::Player, Money::ZERO).unwrap_err();
        assert!(matches!(err, BetError::InvalidAmount(_)));
    }

    #[test]
    fn cancel_refunds_everything() {
        let mut table = table(1);
        table
            .place_bet(BetKind::Banker, Money::from_dollars_whole(100))
            .unwrap();
        table
            .place_bet(BetKind::BankerPair, Money::from_dollars_whole(20))
            .unwrap();
        let refund = table.cancel_bets().unwrap();
        assert_eq!(refund, Money::from_dollars_whole(120));
        assert_eq!(table.bankroll(), Money::from_dollars_whole(5_000));
        assert!(table.ledger().is_empty());
        assert_eq!(table.ledger().active_main(), None);
    }

    #[test]
    fn dealing_without_bets_fails() {
        let mut table = table(1);
        assert_eq!(table.deal(), Err(RoundError::NoBetsPlaced));
    }

    #[test]
    fn round_in_flight_locks_out_bets_and_cancel() {
        let mut table = table(1);
        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        table.deal().unwrap();

        assert_eq!(
            table.place_bet(BetKind::Player, Money::from_dollars_whole(100)),
            Err(BetError::RoundInProgress)
        );
        assert_eq!(table.cancel_bets(), Err(RoundError::RoundInProgress));
        assert_eq!(table.deal(), Err(RoundError::RoundInProgress));
    }

    #[test]
    fn commands_out_of_phase_are_rejected() {
        let mut table = table(1);
        assert_eq!(table.play_third_card_phase(), Err(RoundError::AwaitingDeal));
        assert_eq!(table.settle_round(), Err(RoundError::AwaitingDeal));
        assert_eq!(table.next_round(), Err(RoundError::RoundNotSettled));

        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        table.deal().unwrap();
        assert_eq!(table.settle_round(), Err(RoundError::ThirdCardPending));
    }

    #[test]
    fn a_full_round_walks_the_state_machine() {
        let mut table = table(7);
        table
            .place_bet(BetKind::Player, Money::from_dollars_whole(100))
            .unwrap();
        let bankroll_staked = table.bankroll();

        table.deal().unwrap();
        assert_eq!(table.phase(), RoundPhase::Dealt);
        assert_eq!(table.player_hand().len(), 2);
        assert_eq!(table.banker_hand().len(), 2);

        table.play_third_card_phase().unwrap();
        assert_eq!(table.phase(), RoundPhase::ThirdCardPhase);
        assert!(table.player_hand().len() <= 3);
        assert!(table.banker_hand().len() <= 3);

        let settlement = table.settle_round().unwrap();
        assert_eq!(table.phase(), RoundPhase::Settled);
        assert_eq!(table.bankroll(), bankroll_staked + settlement.total_payout);
        assert!(table.ledger().is_empty());

        table.next_round().unwrap();
        assert_eq!(table.phase(), RoundPhase::AwaitingBets);
        assert!(table.player_hand().is_empty());
        assert!(table.banker_hand().is_empty());
    }

    #[test]
    fn naturals_stand_both_hands_pat() {
        for seed in 0..200 {
            let mut table = table(seed);
            table
                .place_bet(BetKind::Player, Money::from_dollars_whole(10))
                .unwrap();
            table.deal().unwrap();
            let natural = table.player_hand().is_natural() || table.banker_hand().is_natural();
            table.play_third_card_phase().unwrap();
            if natural {
                assert_eq!(table.player_hand().len(), 2, "seed {seed}");
                assert_eq!(table.banker_hand().len(), 2, "seed {seed}");
            }
        }
    }

    #[test]
    fn round_event_stream_has_the_expected_shape() {
        let mut table = table(3);
        table.drain_events();
        table
            .place_bet(BetKind::Banker, Money::from_dollars_whole(100))
            .unwrap();
        table.play_round().unwrap();

        let events = table.drain_events();
        let dealt = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::CardDealt { .. }))
            .count();
        let thirds = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::ThirdCardDealt { .. }))
            .count();
        let settled = events
            .iter()
            .filter(|e| matches!(e, EngineEvent::RoundSettled { .. }))
            .count();
        assert_eq!(dealt, 4);
        assert!(thirds <= 2);
        assert_eq!(settled, 1);
    }

    #[test]
    fn shoe_is_replaced_at_the_cut_card() {
        let mut table = table(11);
        table.drain_events();

        // An eight-deck shoe holds at most 414 cards after the burn; at up
        // to six cards a round, 100 rounds must cross the cut card.
        let mut reshuffles = 0;
        for _ in 0..100 {
            table
                .place_bet(BetKind::Player, Money::from_dollars_whole(1))
                .unwrap();
            table.play_round().unwrap();
            reshuffles += table
                .drain_events()
                .iter()
                .filter(|e| matches!(e, EngineEvent::ShoeCreated { .. }))
                .count();
        }
        assert!(reshuffles >= 1);
        assert!(table.shoe_remaining() >= 6);
    }

    #[test]
    fn bankroll_reconciles_over_many_rounds() {
        let mut table = table(21);
        let start = table.bankroll();
        let mut expected = start;

        for _ in 0..300 {
            let stake = Money::from_cents(10_033);
            if table.bankroll() < stake {
                break;
            }
            table.place_bet(BetKind::Banker, stake).unwrap();
            let settlement = table.play_round().unwrap();
            expected += settlement.net_profit;
        }
        assert_eq!(table.bankroll(), expected);
    }

    #[test]
    fn broke_table_reports_game_over() {
        let broke = BaccaratTable::with_seed(TableRules::default(), Money::ZERO, 1);
        assert!(broke.is_broke());

        let funded = table(1);
        assert!(!funded.is_broke());
    }
}
