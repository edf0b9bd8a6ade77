use chrono::{DateTime, NaiveDate, Utc};

/// Calendar date (UTC) of a unix timestamp in seconds.
pub fn unix_to_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

/// Midnight UTC at the start of `date`.
pub fn date_to_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

pub fn parse_cli_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
}
