//! Well Table Loader
//!
//! Reads the production spreadsheet (exported as CSV) into [`Well`] records.
//! Header names are matched case-insensitively against alias lists, so both
//! the Portuguese operator sheet and English exports load without edits:
//!
//! | Column | Built-in aliases |
//! |---|---|
//! | well | `POÇO`, `Poço`, `Well`, `Well Name` |
//! | field (optional) | `Campo`, `Field` |
//! | water flow (m³/d) | `Vazão Água (m³/dia)`, `Vazão_m3_d`, `Water Flow`, `Flow m3/d` |
//! | daily profit (USD/d) | `Lucratividade (USD/d)`, `Lucro_USD_d`, `Profit USD/d`, `Daily Profit` |
//!
//! Extra aliases come from the `[data]` config section. The table is owned by
//! the caller; nothing is cached process-wide.
//!
//! # Usage
//!
//! ```ignore
//! use well_closure::loader::WellTable;
//! use well_closure::types::FieldFilter;
//!
//! let table = WellTable::load("wells.csv")?;
//! let pilar = table.select(&FieldFilter::Only("Pilar".into())).producing();
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::DataConfig;
use crate::types::{FieldFilter, Well};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read well table: {0}")]
    Io(#[from] std::io::Error),

    #[error("well table is empty (no header or no data rows)")]
    Empty,

    #[error("missing {column} column (expected one of {expected:?})")]
    MissingColumn {
        column: &'static str,
        expected: Vec<String>,
    },

    #[error("line {line}: invalid number {value:?} in column '{column}'")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },

    #[error("line {line}: row has fewer columns than the header")]
    ShortRow { line: usize },

    #[error("line {line}: blank well name")]
    BlankWell { line: usize },

    #[error("line {line}: duplicate well '{well}'")]
    DuplicateWell { line: usize, well: String },
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Returns owned strings because quoted fields need unquoting.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                // Escaped quote ("")
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

// ============================================================================
// Column Mapping
// ============================================================================

/// Header aliases for each mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAliases {
    pub well: Vec<String>,
    pub field: Vec<String>,
    pub flow: Vec<String>,
    pub profit: Vec<String>,
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            well: owned(&["POÇO", "Poço", "Well", "Well Name"]),
            field: owned(&["Campo", "Field"]),
            flow: owned(&["Vazão Água (m³/dia)", "Vazão_m3_d", "Water Flow", "Flow m3/d"]),
            profit: owned(&[
                "Lucratividade (USD/d)",
                "Lucro_USD_d",
                "Profit USD/d",
                "Daily Profit",
            ]),
        }
    }
}

impl ColumnAliases {
    /// Built-in aliases plus the extras configured under `[data]`.
    pub fn from_config(data: &DataConfig) -> Self {
        let mut aliases = Self::default();
        aliases.well.extend(data.extra_well_columns.iter().cloned());
        aliases.field.extend(data.extra_field_columns.iter().cloned());
        aliases.flow.extend(data.extra_flow_columns.iter().cloned());
        aliases.profit.extend(data.extra_profit_columns.iter().cloned());
        aliases
    }
}

fn normalize(header: &str) -> String {
    header.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Header positions of the mapped columns.
#[derive(Debug, Clone)]
struct ColumnMap {
    headers: Vec<String>,
    well: usize,
    field: Option<usize>,
    flow: usize,
    profit: usize,
}

impl ColumnMap {
    fn from_header(header: &str, aliases: &ColumnAliases) -> Result<Self, LoadError> {
        let headers = csv_split(header);
        let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();

        let find = |names: &[String]| -> Option<usize> {
            names.iter().find_map(|name| {
                let name = normalize(name);
                normalized.iter().position(|h| *h == name)
            })
        };
        let require = |column: &'static str, names: &[String]| {
            find(names).ok_or_else(|| LoadError::MissingColumn {
                column,
                expected: names.to_vec(),
            })
        };

        Ok(Self {
            well: require("well", &aliases.well)?,
            field: find(&aliases.field),
            flow: require("water flow", &aliases.flow)?,
            profit: require("daily profit", &aliases.profit)?,
            headers,
        })
    }

    /// Rows must reach every mapped column.
    fn min_width(&self) -> usize {
        [Some(self.well), self.field, Some(self.flow), Some(self.profit)]
            .into_iter()
            .flatten()
            .max()
            .map_or(0, |i| i + 1)
    }

    fn number(&self, fields: &[String], index: usize, line: usize) -> Result<f64, LoadError> {
        let raw = fields[index].trim();
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(LoadError::InvalidNumber {
                line,
                column: self.headers[index].trim().to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

// ============================================================================
// Well Table
// ============================================================================

/// Wells loaded from one spreadsheet export, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellTable {
    wells: Vec<Well>,
}

impl WellTable {
    /// Load a CSV file using the built-in column aliases.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::load_with(path, &ColumnAliases::default())
    }

    /// Load a CSV file with custom column aliases.
    pub fn load_with(path: impl AsRef<Path>, aliases: &ColumnAliases) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let table = Self::from_reader_with(File::open(path)?, aliases)?;
        info!(
            file = %path.display(),
            wells = table.len(),
            fields = table.fields().len(),
            "Loaded well table"
        );
        Ok(table)
    }

    /// Parse CSV from any reader using the built-in column aliases.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        Self::from_reader_with(reader, &ColumnAliases::default())
    }

    /// Parse CSV from any reader with custom column aliases.
    pub fn from_reader_with<R: Read>(reader: R, aliases: &ColumnAliases) -> Result<Self, LoadError> {
        // Line numbers are 1-based file positions, blank lines included
        let mut lines = BufReader::new(reader)
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line));

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(LoadError::Empty),
            }
        };
        let map = ColumnMap::from_header(&header, aliases)?;
        let width = map.min_width();
        debug!(
            well = %map.headers[map.well].trim(),
            flow = %map.headers[map.flow].trim(),
            profit = %map.headers[map.profit].trim(),
            has_field = map.field.is_some(),
            "Mapped well table columns"
        );

        let mut wells = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for (line_no, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let fields = csv_split(&line);
            if fields.len() < width {
                return Err(LoadError::ShortRow { line: line_no });
            }

            let id = fields[map.well].trim().to_string();
            if id.is_empty() {
                return Err(LoadError::BlankWell { line: line_no });
            }
            if !seen.insert(id.clone()) {
                return Err(LoadError::DuplicateWell {
                    line: line_no,
                    well: id,
                });
            }

            let flow = map.number(&fields, map.flow, line_no)?;
            let profit = map.number(&fields, map.profit, line_no)?;
            let mut well = Well::new(id, flow, profit);
            if let Some(label) = map.field.map(|i| fields[i].trim()).filter(|s| !s.is_empty()) {
                well = well.with_field(label);
            }
            wells.push(well);
        }

        if wells.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { wells })
    }

    pub fn from_wells(wells: Vec<Well>) -> Self {
        Self { wells }
    }

    pub fn wells(&self) -> &[Well] {
        &self.wells
    }

    pub fn into_wells(self) -> Vec<Well> {
        self.wells
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// Distinct field labels, sorted.
    pub fn fields(&self) -> BTreeSet<String> {
        self.wells.iter().filter_map(|w| w.field.clone()).collect()
    }

    /// Wells matching a field filter, in file order.
    pub fn select(&self, filter: &FieldFilter) -> WellTable {
        Self {
            wells: self.wells.iter().filter(|w| filter.matches(w)).cloned().collect(),
        }
    }

    /// Wells with positive water flow, in file order.
    pub fn producing(&self) -> WellTable {
        Self {
            wells: self.wells.iter().filter(|w| w.is_producing()).cloned().collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
