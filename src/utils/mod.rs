pub mod time;

pub use time::{date_to_utc, parse_cli_date, unix_to_date};
