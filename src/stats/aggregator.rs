use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{Bet, BetResult, BetStats, MarketStats, ResultCounts};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("no bets found")]
    NoBets,
}

/// Running totals for one market before ratios are taken
#[derive(Debug, Default)]
struct MarketTally {
    total_bets: u64,
    wins: u64,
    losses: u64,
    cashouts: u64,
    cashouts_positive: u64,
    total_stake: f64,
    total_profit: f64,
}

impl MarketTally {
    fn add(&mut self, bet: &Bet) {
        self.total_bets += 1;
        self.total_stake += bet.stake;
        self.total_profit += bet.profit.unwrap_or(0.0);

        match bet.result {
            BetResult::Win => self.wins += 1,
            BetResult::Loss => self.losses += 1,
            BetResult::Cashout => {
                self.cashouts += 1;
                if is_positive_cashout(bet) {
                    self.cashouts_positive += 1;
                }
            }
            BetResult::Pending | BetResult::Void => {}
        }
    }

    fn finish(self) -> MarketStats {
        MarketStats {
            win_rate: round2(percentage(self.wins as f64, self.total_bets as f64)),
            roi: round2(percentage(self.total_profit, self.total_stake)),
            total_bets: self.total_bets,
            wins: self.wins,
            losses: self.losses,
            cashouts: self.cashouts,
            cashouts_positive: self.cashouts_positive,
            total_stake: self.total_stake,
            total_profit: self.total_profit,
        }
    }
}

/// Reduce an already-filtered set of bets to a performance report.
///
/// Bets without a market count toward the totals but not toward `by_market`.
/// Ties for best/worst market go to the market seen first in `bets`.
pub fn aggregate(bets: &[Bet]) -> Result<BetStats, StatsError> {
    if bets.is_empty() {
        return Err(StatsError::NoBets);
    }

    let total_bets = bets.len() as u64;
    let mut total_stake = 0.0;
    let mut total_profit = 0.0;
    let mut odd_sum = 0.0;
    let mut by_result = ResultCounts::default();
    let mut positive_cashouts = 0;
    let mut positive_cashouts_profit = 0.0;
    let mut tallies: IndexMap<String, MarketTally> = IndexMap::new();

    for bet in bets {
        total_stake += bet.stake;
        total_profit += bet.profit.unwrap_or(0.0);
        odd_sum += bet.odd;

        match bet.result {
            BetResult::Win => by_result.win += 1,
            BetResult::Loss => by_result.loss += 1,
            BetResult::Pending => by_result.pending += 1,
            BetResult::Void => by_result.void += 1,
            BetResult::Cashout => by_result.cashout += 1,
        }

        if is_positive_cashout(bet) {
            positive_cashouts += 1;
            positive_cashouts_profit += bet.profit.unwrap_or(0.0);
        }

        if let Some(market) = bet.market_name() {
            tallies.entry(market.to_string()).or_default().add(bet);
        }
    }

    let by_market: IndexMap<String, MarketStats> = tallies
        .into_iter()
        .map(|(name, tally)| (name, tally.finish()))
        .collect();

    let best_market = first_max_by(&by_market, |m| m.win_rate);
    let worst_market = first_max_by(&by_market, |m| m.losses as f64);

    Ok(BetStats {
        total_bets,
        total_stake: round2(total_stake),
        total_profit: round2(total_profit),
        avg_odd: round2(odd_sum / total_bets as f64),
        win_rate: round2(percentage(by_result.win as f64, total_bets as f64)),
        roi: round2(percentage(total_profit, total_stake)),
        by_result,
        by_market,
        best_market,
        worst_market,
        positive_cashouts,
        positive_cashouts_profit: round2(positive_cashouts_profit),
    })
}

/// Cashout with a known, strictly positive profit
fn is_positive_cashout(bet: &Bet) -> bool {
    bet.result == BetResult::Cashout && bet.profit.is_some_and(|p| p > 0.0)
}

/// `part / whole * 100`, or 0 when `whole` is 0
fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

/// Round the exact binary value to two decimals, ties to even
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Key of the first entry holding the maximum of `key`
fn first_max_by<F>(markets: &IndexMap<String, MarketStats>, key: F) -> Option<String>
where
    F: Fn(&MarketStats) -> f64,
{
    let mut best: Option<(&String, f64)> = None;

    for (name, stats) in markets {
        let value = key(stats);
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((name, value)),
        }
    }

    best.map(|(name, _)| name.clone())
}
