pub mod bets;
pub mod card;
pub mod hand;
pub mod money;
pub mod rank;
pub mod shoe;
pub mod suit;
