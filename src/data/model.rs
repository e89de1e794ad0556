use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a MagIC table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell. MagIC text tables carry no schema, so
/// every cell is parsed into the narrowest type that fits.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Parse a raw text cell into the narrowest fitting type.
    pub fn parse(s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Interpret the value as an `f64` where possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the value as an `i64` where possible.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) => Some(*v as i64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Missing or blank cell.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Truthiness used by the row filters: null, empty string, zero and
    /// `false` are all falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::String(s) => !s.is_empty(),
            CellValue::Integer(i) => *i != 0,
            CellValue::Float(v) => *v != 0.0 && !v.is_nan(),
            CellValue::Bool(b) => *b,
        }
    }
}

// ---------------------------------------------------------------------------
// Row / MagicTable
// ---------------------------------------------------------------------------

/// One table row: column name → cell.
pub type Row = BTreeMap<String, CellValue>;

/// Convenience lookup that treats a missing column as [`CellValue::Null`].
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a CellValue {
    row.get(column).unwrap_or(&CellValue::Null)
}

/// The kind of MagIC table. `Display` gives the lowercase MagIC name, which
/// appears verbatim in error messages and default file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableType {
    Measurements,
    Specimens,
    Samples,
    Sites,
    Ages,
}

impl TableType {
    pub fn name(&self) -> &'static str {
        match self {
            TableType::Measurements => "measurements",
            TableType::Specimens => "specimens",
            TableType::Samples => "samples",
            TableType::Sites => "sites",
            TableType::Ages => "ages",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed MagIC table: ordered column names plus rows.
#[derive(Debug, Clone, Default)]
pub struct MagicTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
}

impl MagicTable {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut column_names: Vec<String> = Vec::new();
        for row in &rows {
            for col in row.keys() {
                if !column_names.iter().any(|c| c == col) {
                    column_names.push(col.clone());
                }
            }
        }
        MagicTable { column_names, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First non-null value of a column, scanning top-down.
    pub fn first_value(&self, column: &str) -> Option<&CellValue> {
        self.rows
            .iter()
            .map(|r| cell(r, column))
            .find(|v| !v.is_null())
    }
}

// ---------------------------------------------------------------------------
// Contribution – the table aggregate
// ---------------------------------------------------------------------------

/// A set of MagIC tables belonging together. Built from files by the loader,
/// or assembled in memory by the caller to bypass file I/O entirely.
#[derive(Debug, Clone, Default)]
pub struct Contribution {
    tables: BTreeMap<TableType, MagicTable>,
}

impl Contribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dtype: TableType, table: MagicTable) {
        self.tables.insert(dtype, table);
    }

    pub fn get(&self, dtype: TableType) -> Option<&MagicTable> {
        self.tables.get(&dtype)
    }

    pub fn get_mut(&mut self, dtype: TableType) -> Option<&mut MagicTable> {
        self.tables.get_mut(&dtype)
    }

    /// A table counts as present only when it has rows.
    pub fn has(&self, dtype: TableType) -> bool {
        self.tables.get(&dtype).is_some_and(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Depth scale
// ---------------------------------------------------------------------------

/// Which source column feeds the working depth field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthScale {
    #[default]
    CoreDepth,
    CompositeDepth,
    Age,
}

impl DepthScale {
    /// Column name in the samples (or ages) table.
    pub fn column(&self) -> &'static str {
        match self {
            DepthScale::CoreDepth => "core_depth",
            DepthScale::CompositeDepth => "composite_depth",
            DepthScale::Age => "age",
        }
    }

    /// Parse a scale name, accepting the legacy `sample_*` aliases.
    pub fn from_name(name: &str) -> Option<DepthScale> {
        match name {
            "core_depth" | "sample_core_depth" => Some(DepthScale::CoreDepth),
            "composite_depth" | "sample_composite_depth" => Some(DepthScale::CompositeDepth),
            "age" => Some(DepthScale::Age),
            _ => None,
        }
    }
}
