pub mod aggregator;
pub mod date_range;

pub use aggregator::{aggregate, StatsError};
pub use date_range::{
    parse_datetime, resolve_date_range, resolve_date_range_at, DateRange, DateRangeError,
};
