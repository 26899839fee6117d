// src/output.rs

use anyhow::{Context, Result};
use arrow::array::{Array, Float64Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::{Map, Number, Value};
use std::{fs, fs::File, path::Path};

/// Render the batch as an ASCII table.
pub fn render_table(batch: &RecordBatch) -> Result<String> {
    Ok(pretty_format_batches(std::slice::from_ref(batch))
        .context("formatting box score")?
        .to_string())
}

/// One JSON object per row, keyed by column name. Nulls stay `null`.
pub fn to_json_rows(batch: &RecordBatch) -> Vec<Value> {
    let schema = batch.schema();
    (0..batch.num_rows())
        .map(|row| {
            let mut obj = Map::new();
            for (i, field) in schema.fields().iter().enumerate() {
                obj.insert(field.name().clone(), cell_value(batch.column(i).as_ref(), row));
            }
            Value::Object(obj)
        })
        .collect()
}

fn cell_value(col: &dyn Array, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    if let Some(f) = col.as_any().downcast_ref::<Float64Array>() {
        return Number::from_f64(f.value(row)).map_or(Value::Null, Value::Number);
    }
    if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
        return Value::String(s.value(row).to_string());
    }
    Value::Null
}

/// Write the batch to `path` as a Snappy-compressed Parquet file.
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(batch).context("writing box score batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::ArrayRef;
    use arrow::datatypes::{DataType, Field, Schema};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("Name", DataType::Utf8, true),
            Field::new("AB", DataType::Float64, true),
        ]);
        let names = Arc::new(StringArray::from(vec![Some("Miguel Cabrera"), Some("Brennan Boesch")]))
            as ArrayRef;
        let ab = Arc::new(Float64Array::from(vec![Some(4.0), None])) as ArrayRef;
        RecordBatch::try_new(Arc::new(schema), vec![names, ab]).unwrap()
    }

    #[test]
    fn json_rows_keep_nulls() {
        let rows = to_json_rows(&batch());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Name"], "Miguel Cabrera");
        assert_eq!(rows[0]["AB"], 4.0);
        assert!(rows[1]["AB"].is_null());
    }

    #[test]
    fn table_mentions_every_column() -> Result<()> {
        let text = render_table(&batch())?;
        assert!(text.contains("Name"));
        assert!(text.contains("Brennan Boesch"));
        Ok(())
    }

    #[test]
    fn parquet_round_trip_preserves_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("DET201007190.parquet");
        write_parquet(&batch(), &path)?;

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path)?)?.build()?;
        let rows: usize = reader.map(|b| b.map(|b| b.num_rows())).sum::<Result<usize, _>>()?;
        assert_eq!(rows, 2);
        Ok(())
    }
}
