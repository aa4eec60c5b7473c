use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Row, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (the usual case)
/// * `.json`    – `[{ "Platform": "...", "Likes": 12, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.column_names,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Cell types are guessed (integer, float, bool, text; empty → null).
fn load_csv(path: &Path) -> Result<Table> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Table> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), CellValue::guess(value)))
            .collect();
        rows.push(row);
    }

    Ok(Table::from_rows(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "Platform": "Instagram", "PostType": "Video", "AvgLikes": 512.3 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Table::from_rows(column_names, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let cells: Row = column_names
                .iter()
                .enumerate()
                .map(|(col_idx, name)| {
                    extract_cell(batch.column(col_idx), row)
                        .with_context(|| format!("Row {row}: failed to read '{name}'"))
                        .map(|cell| (name.clone(), cell))
                })
                .collect::<Result<_>>()?;
            rows.push(cells);
        }
    }

    Ok(Table::from_rows(column_names, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let s = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            CellValue::String(s.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            CellValue::String(s.value(row).to_string())
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Bool(arr.value(row))
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("social-charts-{}-{name}", std::process::id()))
    }

    #[test]
    fn csv_guesses_types_and_keeps_header_order() {
        let path = temp_path("raw.csv");
        std::fs::write(
            &path,
            "Platform,PostType,Date,Likes,AgeGroup\n\
             Instagram,Image,3/1/2024,120,18-25\n\
             Twitter,Video,3/2/2024,47.5,26-40\n",
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(
            table.column_names,
            ["Platform", "PostType", "Date", "Likes", "AgeGroup"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0]["Likes"], CellValue::Integer(120));
        assert_eq!(table.rows[1]["Likes"], CellValue::Float(47.5));
        assert_eq!(table.rows[1]["AgeGroup"], CellValue::String("26-40".into()));
    }

    #[test]
    fn json_records() {
        let table = parse_json(
            r#"[{"Platform": "Facebook", "AvgLikes": 300.5},
                {"Platform": "Twitter", "AvgLikes": 12, "PostType": null}]"#,
        )
        .unwrap();
        assert_eq!(table.column_names, ["Platform", "AvgLikes", "PostType"]);
        assert_eq!(table.rows[0]["AvgLikes"], CellValue::Float(300.5));
        assert_eq!(table.rows[1]["AvgLikes"], CellValue::Integer(12));
        assert_eq!(table.rows[1]["PostType"], CellValue::Null);
    }

    #[test]
    fn json_rejects_non_array() {
        assert!(parse_json(r#"{"Platform": "Facebook"}"#).is_err());
    }

    #[test]
    fn parquet_scalar_columns() {
        let path = temp_path("avg.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("Platform", DataType::Utf8, false),
            Field::new("AvgLikes", DataType::Float64, true),
            Field::new("Posts", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Instagram", "LinkedIn"])),
                Arc::new(Float64Array::from(vec![Some(512.0), None])),
                Arc::new(Int32Array::from(vec![3, 4])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.column_names, ["Platform", "AvgLikes", "Posts"]);
        assert_eq!(table.rows[0]["AvgLikes"], CellValue::Float(512.0));
        assert_eq!(table.rows[1]["AvgLikes"], CellValue::Null);
        assert_eq!(table.rows[1]["Posts"], CellValue::Integer(4));
    }

    #[test]
    fn unsupported_extension_and_missing_file() {
        assert!(load_file(Path::new("data.xlsx")).is_err());
        let err = load_file(&temp_path("does-not-exist.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("does-not-exist.csv"));
    }
}
