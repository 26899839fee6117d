// src/boxes.rs

use arrow::record_batch::RecordBatch;
use tracing::{info, instrument};

use crate::dates::{ensure_supported_season, sanitize_date_range};
use crate::error::BoxesError;
use crate::fetch::{fetch_page, Doubleheader, PageSource};
use crate::process::{extract, normalize, BoxScoreTable, MlbIdFromLink, TableSelection};

/// Box score for `team`'s single game on `date` (`YYYY-MM-DD`).
pub fn boxes<S: PageSource + ?Sized>(
    source: &S,
    team: &str,
    date: &str,
) -> Result<RecordBatch, BoxesError> {
    boxes_game(source, team, date, Doubleheader::Single)
}

/// Box score for one game of a possible doubleheader.
///
/// Dates before 2008 are rejected before any request goes out.
#[instrument(level = "info", skip(source))]
pub fn boxes_game<S: PageSource + ?Sized>(
    source: &S,
    team: &str,
    date: &str,
    game: Doubleheader,
) -> Result<RecordBatch, BoxesError> {
    let (game_date, end_date) = sanitize_date_range(Some(date), Some(date))?;
    ensure_supported_season(game_date)?;
    ensure_supported_season(end_date)?;

    let page = fetch_page(source, team, game_date, game)?;
    let resolver = MlbIdFromLink::new(page.url.clone());
    let extracted = extract(&page.doc, TableSelection::FirstTable, &resolver)?;
    let batch = normalize(&BoxScoreTable::from(extracted))?;

    info!(url = %page.url, rows = batch.num_rows(), cols = batch.num_columns(), "box score ready");
    Ok(batch)
}
