// src/fetch/urls.rs

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use super::Doubleheader;
use crate::error::BoxesError;

static TEAM_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2,3}$").expect("team code regex should compile"));

/// Reject anything that is not a 2–3 letter uppercase team abbreviation.
pub fn validate_team(team: &str) -> Result<(), BoxesError> {
    if TEAM_CODE.is_match(team) {
        Ok(())
    } else {
        Err(BoxesError::validation(format!(
            "team must be a 2-3 letter uppercase code, got {team:?}"
        )))
    }
}

/// `{base}/boxes/{TEAM}/{TEAM}{YYYYMMDD}{D}.shtml`
pub fn box_score_url(
    base: &Url,
    team: &str,
    date: NaiveDate,
    game: Doubleheader,
) -> Result<Url, url::ParseError> {
    let path = format!(
        "boxes/{team}/{team}{}{}.shtml",
        date.format("%Y%m%d"),
        game.index()
    );
    base.join(&path)
}
