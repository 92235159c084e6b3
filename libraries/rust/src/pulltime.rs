use chrono::{DateTime, Utc};
use chrono_tz::America::New_York;

/// Render a pull timestamp as `MM/DD/YY, HH:MM` in New York time, suffixed
/// with the zone abbreviation.
pub fn format_pull_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&New_York)
        .format("%m/%d/%y, %H:%M %Z")
        .to_string()
}
