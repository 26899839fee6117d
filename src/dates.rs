// src/dates.rs

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::BoxesError;

/// First season whose box score layout the extractor understands.
pub const MIN_SEASON: i32 = 2008;

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, BoxesError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        BoxesError::validation(format!("incorrect date format {s:?}, should be YYYY-MM-DD ({e})"))
    })
}

/// Turn an optional `(start, end)` pair of ISO strings into concrete dates.
///
/// Missing both ends means yesterday..today; a single missing end copies the
/// other one. A reversed range is swapped.
pub fn sanitize_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(NaiveDate, NaiveDate), BoxesError> {
    sanitize_date_range_at(start, end, Local::now().date_naive())
}

pub(crate) fn sanitize_date_range_at(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), BoxesError> {
    let (start, end) = match (start, end) {
        (None, None) => (today - Duration::days(1), today),
        (Some(s), None) => {
            let d = parse_iso_date(s)?;
            (d, d)
        }
        (None, Some(e)) => {
            let d = parse_iso_date(e)?;
            (d, d)
        }
        (Some(s), Some(e)) => (parse_iso_date(s)?, parse_iso_date(e)?),
    };
    if start > end {
        Ok((end, start))
    } else {
        Ok((start, end))
    }
}

/// Reject dates from seasons before [`MIN_SEASON`].
pub fn ensure_supported_season(date: NaiveDate) -> Result<(), BoxesError> {
    if date.year() < MIN_SEASON {
        return Err(BoxesError::validation(format!(
            "year must be {MIN_SEASON} or later"
        )));
    }
    Ok(())
}
