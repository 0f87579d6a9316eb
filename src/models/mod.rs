pub mod bet;
pub mod stats;

pub use bet::{derive_profit, Bet, BetResult, BetUpdate, NewBet};
pub use stats::{BetStats, MarketStats, ResultCounts};
