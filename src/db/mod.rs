pub mod bets;

pub use bets::BetStore;
