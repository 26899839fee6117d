use arrow::{
    array::{ArrayRef, Float64Builder, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use std::sync::Arc;
use tracing::debug;

use crate::error::BoxesError;
use crate::process::raw_table::BoxScoreTable;
use crate::process::utils::{coerce_numeric, is_blank};

/// Columns coerced to `Float64`; every other column stays text.
pub const NUMERIC_COLUMNS: [&str; 25] = [
    "Age", "#days", "G", "PA", "AB", "R", "H", "2B", "3B", "HR", "RBI", "BB", "IBB", "SO", "HBP",
    "SH", "SF", "GDP", "SB", "CS", "BA", "OBP", "SLG", "OPS", "mlbID",
];

/// Drop empty rows, type the numeric columns and drop the unnamed label column.
///
/// Listed columns the page does not have are skipped; unparseable numeric
/// cells become nulls.
pub fn normalize(table: &BoxScoreTable) -> Result<RecordBatch, BoxesError> {
    let rows: Vec<&Vec<Option<String>>> = table
        .rows
        .iter()
        .filter(|r| !r.iter().all(is_blank))
        .collect();
    let dropped = table.rows.len() - rows.len();
    if dropped > 0 {
        debug!(dropped, "dropped empty rows");
    }

    let mut fields = Vec::with_capacity(table.columns.len());
    let mut out: Vec<ArrayRef> = Vec::with_capacity(table.columns.len());

    for (i, name) in table.columns.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        let cells = rows.iter().map(|r| r.get(i).and_then(|c| c.as_deref()));

        if NUMERIC_COLUMNS.contains(&name.as_str()) {
            let mut b = Float64Builder::with_capacity(rows.len());
            for cell in cells {
                b.append_option(cell.and_then(coerce_numeric));
            }
            fields.push(Field::new(name, DataType::Float64, true));
            out.push(Arc::new(b.finish()) as ArrayRef);
        } else {
            let arr: StringArray = cells.collect();
            fields.push(Field::new(name, DataType::Utf8, true));
            out.push(Arc::new(arr) as ArrayRef);
        }
    }

    let opts = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), out, &opts)
        .map_err(|e| BoxesError::parse(format!("building record batch: {e}")))
}
