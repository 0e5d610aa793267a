use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::error::SnapshotError;

const FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Renders epoch seconds as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_timestamp(seconds: i64) -> Result<String, SnapshotError> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .ok()
        .and_then(|moment| moment.format(FORMAT).ok())
        .ok_or(SnapshotError::TimestampRange(seconds))
}

/// Parses `YYYY-MM-DDTHH:MM:SSZ` back into epoch seconds.
pub fn parse_timestamp(text: &str) -> Option<i64> {
    PrimitiveDateTime::parse(text, FORMAT)
        .ok()
        .map(|moment| moment.assume_utc().unix_timestamp())
}
