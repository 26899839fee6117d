// src/process/mod.rs
//
// Parsed page → extracted rows → typed record batch.

pub mod convert;
pub mod extract;
pub mod raw_table;
pub mod utils;

pub use convert::{normalize, NUMERIC_COLUMNS};
pub use extract::{extract, extract_line_score, MlbIdFromLink, RowIdResolver, TableSelection};
pub use raw_table::{BoxScoreTable, ExtractedTable, LineScoreRecord, RawRow};
