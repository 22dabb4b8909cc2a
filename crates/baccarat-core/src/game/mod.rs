pub mod engine;
pub mod events;
pub mod settlement;

pub use engine::{BaccaratTable, BetError, RoundError, RoundPhase};
pub use events::{EngineEvent, HandSide};
pub use settlement::{BetDisposition, BetOutcome, Settlement, settle};
