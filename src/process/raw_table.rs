/// Header given to the identifier column appended after the page's own headers.
pub const ID_HEADER: &str = "mlbID";

/// Names of the folded line-score fields, in output order.
pub const LINE_SCORE_COLUMNS: [&str; 5] = ["team", "line_score", "runs", "hits", "errors"];

/// One `<tr>` of the table body: trimmed `<td>` texts plus the resolved player id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
    pub id: Option<String>,
}

impl RawRow {
    /// Cells followed by the identifier, the way positional columns see the row.
    pub fn values(&self) -> Vec<Option<&str>> {
        self.cells
            .iter()
            .map(|c| Some(c.as_str()))
            .chain(std::iter::once(self.id.as_deref()))
            .collect()
    }
}

/// A body row after line-score folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineScoreRecord {
    pub team: Option<String>,
    /// Inning cells concatenated; empty when the row carries no innings.
    pub line_score: String,
    pub runs: Option<String>,
    pub hits: Option<String>,
    pub errors: Option<String>,
    /// Values paired with the table headers by position. The last entry is
    /// always the identifier.
    pub columns: Vec<Option<String>>,
}

impl LineScoreRecord {
    pub fn mlb_id(&self) -> Option<&str> {
        self.columns.last().and_then(|v| v.as_deref())
    }
}

/// What the extractor found: the header row and one record per body row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    /// Page headers minus the leading label cell, with [`ID_HEADER`] appended.
    pub headers: Vec<String>,
    pub records: Vec<LineScoreRecord>,
}

/// Flat, still untyped table in final column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxScoreTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl From<ExtractedTable> for BoxScoreTable {
    /// Page columns first, then the line-score fields, identifier last.
    fn from(t: ExtractedTable) -> Self {
        let page_cols = t.headers.len().saturating_sub(1);
        let mut columns: Vec<String> = t.headers[..page_cols].to_vec();
        columns.extend(LINE_SCORE_COLUMNS.iter().map(|s| s.to_string()));
        columns.push(ID_HEADER.to_string());

        let rows = t
            .records
            .into_iter()
            .map(|rec| {
                let mut cols = rec.columns;
                let id = cols.pop().flatten();
                cols.resize(page_cols, None);
                cols.extend([
                    rec.team,
                    Some(rec.line_score),
                    rec.runs,
                    rec.hits,
                    rec.errors,
                    id,
                ]);
                cols
            })
            .collect();

        BoxScoreTable { columns, rows }
    }
}
