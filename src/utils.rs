//! Utility functions for common operations.

use chrono::NaiveDateTime;

/// Timestamp layout used by the API, without offset.
const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Returns the segment after the last `/` of a stored identifier.
///
/// `/manga/28519` yields `28519`; a string without `/` is returned whole.
pub fn id_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Encodes a remote manga id as an identifier path.
pub fn manga_path(id: &str) -> String {
    format!("/manga/{}", id)
}

/// Encodes a remote chapter id as an identifier path.
pub fn chapter_path(id: &str) -> String {
    format!("/chapter/{}", id)
}

/// Parses an upload date into epoch milliseconds.
///
/// The naive time is read as UTC. Anything after the seconds field
/// (fractions, `Z`, offsets) is ignored. Missing or malformed input
/// yields 0.
pub fn parse_upload_date(date: Option<&str>) -> i64 {
    let Some(date) = date else {
        return 0;
    };

    match NaiveDateTime::parse_and_remainder(date.trim(), UPLOAD_DATE_FORMAT) {
        Ok((parsed, _)) => parsed.and_utc().timestamp_millis(),
        Err(e) => {
            tracing::debug!(date, error = %e, "unparseable upload date");
            0
        }
    }
}
