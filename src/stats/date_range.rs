use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use thiserror::Error;

/// Accepted datetime layouts, tried in order before falling back to a bare date
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive time window applied to `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("invalid date '{0}', expected ISO-8601 (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)")]
    InvalidDate(String),
}

/// Relative filter tokens accepted by the stats endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeFilter {
    Today,
    Last7Days,
    Last30Days,
}

impl RelativeFilter {
    /// "all" and unknown tokens mean no filtering
    fn parse(token: &str) -> Option<Self> {
        match token {
            "today" => Some(RelativeFilter::Today),
            "7days" => Some(RelativeFilter::Last7Days),
            "30days" => Some(RelativeFilter::Last30Days),
            _ => None,
        }
    }
}

/// Resolve filter arguments against the current local time
pub fn resolve_date_range(
    filter: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Option<DateRange>, DateRangeError> {
    resolve_date_range_at(Local::now().naive_local(), filter, start_date, end_date)
}

/// Resolve filter arguments relative to `now`.
///
/// An explicit start/end pair wins over `filter`; a lone start or end is
/// ignored. Midnight bounds expand to cover the whole calendar day.
pub fn resolve_date_range_at(
    now: NaiveDateTime,
    filter: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Option<DateRange>, DateRangeError> {
    let start_date = start_date.filter(|s| !s.trim().is_empty());
    let end_date = end_date.filter(|s| !s.trim().is_empty());

    if let (Some(start), Some(end)) = (start_date, end_date) {
        return Ok(Some(DateRange {
            start: parse_start(start)?,
            end: parse_end(end)?,
        }));
    }

    let range = match filter.and_then(RelativeFilter::parse) {
        Some(RelativeFilter::Today) => Some(DateRange {
            start: start_of_day(now.date()),
            end: end_of_day(now.date()),
        }),
        Some(RelativeFilter::Last7Days) => Some(DateRange {
            start: now - TimeDelta::days(7),
            end: now,
        }),
        Some(RelativeFilter::Last30Days) => Some(DateRange {
            start: now - TimeDelta::days(30),
            end: now,
        }),
        None => None,
    };

    Ok(range)
}

/// Parse an ISO-8601 date or datetime; bare dates resolve to midnight.
///
/// Values carrying a UTC offset (`Z`, `+03:00`) are converted to local time.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, DateRangeError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(start_of_day)
        .map_err(|_| DateRangeError::InvalidDate(value.to_string()))
}

fn parse_start(value: &str) -> Result<NaiveDateTime, DateRangeError> {
    let dt = parse_datetime(value)?;
    if dt.time() == NaiveTime::MIN {
        return Ok(start_of_day(dt.date()));
    }
    Ok(dt)
}

fn parse_end(value: &str) -> Result<NaiveDateTime, DateRangeError> {
    let dt = parse_datetime(value)?;
    if dt.time() == NaiveTime::MIN {
        return Ok(end_of_day(dt.date()));
    }
    Ok(dt)
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999999 of `date`
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::microseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_explicit_dates_cover_whole_days() {
        let range = resolve_date_range(None, Some("2024-01-01"), Some("2024-01-01"))
            .unwrap()
            .unwrap();

        assert_eq!(range.start, dt("2024-01-01T00:00:00"));
        assert_eq!(range.end, dt("2024-01-01T23:59:59.999999"));
    }

    #[test]
    fn test_explicit_times_used_verbatim() {
        let range = resolve_date_range(
            None,
            Some("2024-01-01T08:30:00"),
            Some("2024-01-02 18:15"),
        )
        .unwrap()
        .unwrap();

        assert_eq!(range.start, dt("2024-01-01T08:30:00"));
        assert_eq!(range.end, dt("2024-01-02T18:15:00"));
    }

    #[test]
    fn test_midnight_datetime_end_expands() {
        let range = resolve_date_range(
            None,
            Some("2024-01-01T00:00:00"),
            Some("2024-01-05T00:00:00"),
        )
        .unwrap()
        .unwrap();

        assert_eq!(range.start, dt("2024-01-01T00:00:00"));
        assert_eq!(range.end, dt("2024-01-05T23:59:59.999999"));
    }

    #[test]
    fn test_explicit_dates_override_filter() {
        let now = dt("2024-03-10T12:00:00");
        let range =
            resolve_date_range_at(now, Some("today"), Some("2024-01-01"), Some("2024-01-31"))
                .unwrap()
                .unwrap();

        assert_eq!(range.start, dt("2024-01-01T00:00:00"));
        assert_eq!(range.end, dt("2024-01-31T23:59:59.999999"));
    }

    #[test]
    fn test_lone_start_falls_back_to_filter() {
        let now = dt("2024-03-10T12:00:00");

        let range = resolve_date_range_at(now, None, Some("2024-01-01"), None).unwrap();
        assert_eq!(range, None);

        let range = resolve_date_range_at(now, Some("30days"), Some("2024-01-01"), Some(""))
            .unwrap()
            .unwrap();
        assert_eq!(range.start, dt("2024-02-09T12:00:00"));
    }

    #[test]
    fn test_today() {
        let now = dt("2024-03-10T12:34:56");
        let range = resolve_date_range_at(now, Some("today"), None, None)
            .unwrap()
            .unwrap();

        assert_eq!(range.start, dt("2024-03-10T00:00:00"));
        assert_eq!(range.end, dt("2024-03-10T23:59:59.999999"));
    }

    #[test]
    fn test_seven_days() {
        let now = dt("2024-03-10T12:00:00");
        let range = resolve_date_range_at(now, Some("7days"), None, None)
            .unwrap()
            .unwrap();

        assert_eq!(range.start, dt("2024-03-03T12:00:00"));
        assert_eq!(range.end, now);
    }

    #[test]
    fn test_thirty_days() {
        let now = dt("2024-03-10T12:00:00");
        let range = resolve_date_range_at(now, Some("30days"), None, None)
            .unwrap()
            .unwrap();

        assert_eq!(range.start, dt("2024-02-09T12:00:00"));
        assert_eq!(range.end, now);
    }

    #[test]
    fn test_all_none_and_unknown_mean_unfiltered() {
        let now = dt("2024-03-10T12:00:00");
        assert_eq!(resolve_date_range_at(now, Some("all"), None, None), Ok(None));
        assert_eq!(resolve_date_range_at(now, None, None, None), Ok(None));
        assert_eq!(resolve_date_range_at(now, Some("yesterday"), None, None), Ok(None));
    }

    #[test]
    fn test_invalid_date_is_error() {
        let err = resolve_date_range(None, Some("01/02/2024"), Some("2024-01-03")).unwrap_err();
        assert_eq!(err, DateRangeError::InvalidDate("01/02/2024".to_string()));

        assert!(resolve_date_range(None, Some("2024-01-01"), Some("2024-13-01")).is_err());
    }

    #[test]
    fn test_offset_datetimes_convert_to_local() {
        use chrono::{TimeZone, Utc};

        let expected = Utc
            .with_ymd_and_hms(2024, 1, 1, 10, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .naive_local();

        assert_eq!(parse_datetime("2024-01-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01T13:00:00+03:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01T10:00:00.000+00:00").unwrap(), expected);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange {
            start: dt("2024-01-01T00:00:00"),
            end: dt("2024-01-01T23:59:59.999999"),
        };
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(dt("2024-01-02T00:00:00")));
    }
}
