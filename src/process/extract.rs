// src/process/extract.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};
use url::Url;

use super::raw_table::{ExtractedTable, LineScoreRecord, RawRow, ID_HEADER};
use crate::error::BoxesError;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should parse")
}

static TABLE: Lazy<Selector> = Lazy::new(|| sel("table"));
static TR: Lazy<Selector> = Lazy::new(|| sel("tr"));
static TH: Lazy<Selector> = Lazy::new(|| sel("th"));
static TD: Lazy<Selector> = Lazy::new(|| sel("td"));
static TBODY: Lazy<Selector> = Lazy::new(|| sel("tbody"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| sel("a"));

/// Headers a table must carry to pass as the batting box score.
const BATTING_HEADERS: [&str; 3] = ["AB", "H", "BA"];
const MIN_BATTING_HEADER_CELLS: usize = 6;

/// Which `<table>` on the page holds the box score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableSelection {
    /// The first table on the page, which is where the site puts it.
    #[default]
    FirstTable,
    /// The first table whose header row has at least six cells and includes
    /// the `AB`, `H` and `BA` columns.
    BattingTable,
}

impl TableSelection {
    pub fn select<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            TableSelection::FirstTable => doc.select(&TABLE).next(),
            TableSelection::BattingTable => doc.select(&TABLE).find(|t| is_batting_table(*t)),
        }
    }
}

fn is_batting_table(table: ElementRef<'_>) -> bool {
    let Some(first_row) = table.select(&TR).next() else {
        return false;
    };
    let headers: Vec<String> = first_row.select(&TH).map(cell_text).collect();
    headers.len() >= MIN_BATTING_HEADER_CELLS
        && BATTING_HEADERS
            .iter()
            .all(|want| headers.iter().any(|h| h == want))
}

/// Looks up the side-channel key for one body row.
pub trait RowIdResolver {
    fn resolve(&self, row: ElementRef<'_>) -> Option<String>;
}

/// Reads a query parameter (by default `mlb_ID`) off the row's first link.
pub struct MlbIdFromLink {
    page: Url,
    param: String,
}

impl MlbIdFromLink {
    pub fn new(page: Url) -> Self {
        Self {
            page,
            param: "mlb_ID".to_string(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }
}

impl RowIdResolver for MlbIdFromLink {
    fn resolve(&self, row: ElementRef<'_>) -> Option<String> {
        let href = row.select(&ANCHOR).next()?.value().attr("href")?;
        let link = self.page.join(href.trim()).ok()?;
        link.query_pairs()
            .find(|(k, _)| *k == *self.param)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }
}

/// Pull the header row and every body row out of the selected table.
pub fn extract<R: RowIdResolver + ?Sized>(
    doc: &Html,
    selection: TableSelection,
    resolver: &R,
) -> Result<ExtractedTable, BoxesError> {
    let table = selection
        .select(doc)
        .ok_or_else(|| BoxesError::parse(format!("no table matching {selection:?}")))?;

    let header_row = table
        .select(&TR)
        .next()
        .ok_or_else(|| BoxesError::parse("table has no header row"))?;
    // first header cell labels the rows, it is not a column
    let mut headers: Vec<String> = header_row.select(&TH).skip(1).map(cell_text).collect();
    headers.push(ID_HEADER.to_string());

    let rows = raw_rows(table, resolver);
    debug!(headers = headers.len(), rows = rows.len(), "extracted table");

    let records = rows
        .iter()
        .map(|row| fold_row(row, headers.len()))
        .collect();
    Ok(ExtractedTable { headers, records })
}

/// Body rows with their resolved ids. A missing `<tbody>` gives no rows.
pub fn raw_rows<R: RowIdResolver + ?Sized>(table: ElementRef<'_>, resolver: &R) -> Vec<RawRow> {
    let Some(body) = table.select(&TBODY).next() else {
        return Vec::new();
    };
    body.select(&TR)
        .map(|tr| {
            let cells: Vec<String> = tr.select(&TD).map(cell_text).collect();
            let id = resolver.resolve(tr);
            trace!(cells = cells.len(), id = ?id, "row");
            RawRow { cells, id }
        })
        .collect()
}

fn fold_row(row: &RawRow, n_headers: usize) -> LineScoreRecord {
    let values = row.values();
    let mut rec = extract_line_score(&values);

    // pair page headers with cells by position; the id always lands last
    let mut columns: Vec<Option<String>> = (0..n_headers.saturating_sub(1))
        .map(|i| row.cells.get(i).cloned())
        .collect();
    columns.push(row.id.clone());
    rec.columns = columns;
    rec
}

/// Fold a row's values into team / innings / R-H-E.
///
/// Position 1 is the team, positions `2..n-4` are innings, and the three
/// values before the trailing identifier are runs, hits and errors. Positions
/// that do not exist in a short row come back as `None`.
pub fn extract_line_score(values: &[Option<&str>]) -> LineScoreRecord {
    let n = values.len();
    let at = |i: Option<usize>| -> Option<String> {
        i.and_then(|i| values.get(i).copied().flatten())
            .map(str::to_owned)
    };
    let line_score = if n > 6 {
        values[2..n - 4].iter().flatten().copied().collect()
    } else {
        String::new()
    };
    LineScoreRecord {
        team: at(Some(1)),
        line_score,
        runs: at(n.checked_sub(4)),
        hits: at(n.checked_sub(3)),
        errors: at(n.checked_sub(2)),
        columns: Vec::new(),
    }
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
