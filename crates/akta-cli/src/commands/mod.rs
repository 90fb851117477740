pub mod ask;
pub mod dispatch;
pub mod ingest;
pub mod refresh;
pub mod rules;
pub mod schema;

use chrono::NaiveDate;

/// `as_of` or today's local date.
pub fn as_of_or_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}
