use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Contribution, MagicTable, Row, TableType};
use crate::error::{DepthPlotError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Resolve a file name against a base directory. Absolute paths and paths
/// that already name an existing file are kept as-is.
pub fn resolve_file_name(name: &str, dir_path: &Path) -> PathBuf {
    let p = Path::new(name);
    if p.is_absolute() || p.exists() {
        p.to_path_buf()
    } else {
        dir_path.join(name)
    }
}

/// Load a single MagIC table from a file. Dispatch by extension:
/// * `.json` – records-oriented JSON array `[{"col": val, ...}, ...]`
/// * anything else – MagIC tab-delimited text (optional `tab<TAB>name` header)
pub fn load_table(path: &Path, dtype: TableType) -> Result<MagicTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let text = std::fs::read_to_string(path)?;
    match ext.as_str() {
        "json" => read_json_records(&text),
        _ => read_magic_text(text.as_bytes(), dtype),
    }
}

/// Load a whole contribution from a single JSON file: a top-level object
/// mapping table names to records arrays.
pub fn load_json_contribution(path: &Path) -> Result<Contribution> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let obj = root
        .as_object()
        .ok_or_else(|| DepthPlotError::InvalidInput("expected top-level JSON object".into()))?;

    let mut con = Contribution::new();
    for dtype in [
        TableType::Measurements,
        TableType::Specimens,
        TableType::Samples,
        TableType::Sites,
        TableType::Ages,
    ] {
        if let Some(records) = obj.get(dtype.name()) {
            con.insert(dtype, json_records_to_table(records)?);
        }
    }
    Ok(con)
}

// ---------------------------------------------------------------------------
// MagIC tab-delimited text
// ---------------------------------------------------------------------------

/// Parse MagIC text: an optional first line `tab<TAB><table name>`, then a
/// tab-separated header row, then data rows. A file without the `tab` line
/// is read as plain headered TSV.
pub fn read_magic_text<R: Read>(reader: R, dtype: TableType) -> Result<MagicTable> {
    let mut text = String::new();
    let mut reader = reader;
    reader.read_to_string(&mut text)?;

    let body = match text.split_once('\n') {
        Some((first, rest)) if first.split('\t').next().map(str::trim) == Some("tab") => {
            let declared = first.split('\t').nth(1).map(str::trim).unwrap_or("");
            if !declared.is_empty() && declared != dtype.name() {
                log::warn!(
                    "file declares table type '{declared}', expected '{}'",
                    dtype.name()
                );
            }
            rest
        }
        _ => text.as_str(),
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let mut row = Row::new();
        for (i, value) in record.iter().enumerate() {
            if let Some(col) = headers.get(i) {
                row.insert(col.clone(), CellValue::parse(value.trim()));
            }
        }
        rows.push(row);
    }

    Ok(MagicTable {
        column_names: headers,
        rows,
    })
}

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

/// Records-oriented JSON: `[{ "specimen": "s1", "aniso_s": "...", ... }, ...]`
fn read_json_records(text: &str) -> Result<MagicTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    json_records_to_table(&root)
}

fn json_records_to_table(root: &JsonValue) -> Result<MagicTable> {
    let records = root
        .as_array()
        .ok_or_else(|| DepthPlotError::InvalidInput("expected JSON records array".into()))?;

    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let obj = rec
            .as_object()
            .ok_or_else(|| DepthPlotError::InvalidInput("JSON record is not an object".into()))?;
        let mut row = Row::new();
        for (key, val) in obj {
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }
    Ok(MagicTable::from_rows(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::parse(s),
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
// Summary CSV (core tops)
// ---------------------------------------------------------------------------

/// One row of an IODP core-summary CSV. Only the cored-top depth matters.
#[derive(Debug, Deserialize)]
struct SummaryRow {
    #[serde(rename = "Top depth cored CSF (m)")]
    top_depth: f64,
}

/// Read reference horizon depths from a core-summary CSV.
pub fn load_summary_depths(path: &Path) -> Result<Vec<f64>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut depths = Vec::new();
    for result in reader.deserialize::<SummaryRow>() {
        depths.push(result?.top_depth);
    }
    Ok(depths)
}
