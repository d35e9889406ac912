use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{CATEGORY_PREFIX, RAW_METRIC_PREFIX};
use crate::error::{RadarError, Result};

pub const PLAYER_NAME_COLUMN: &str = "player_name";
pub const DEFAULT_DATA_FILE: &str = "all-player-seasons-metrics.csv";

// pandas' default missing-value spellings, matched case-insensitively.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None",
];

static DATASET: OnceCell<Table> = OnceCell::new();

/// Column classification, derived once from the header at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Identity,
    Category,
    Raw,
    Other,
}

impl ColumnKind {
    pub fn classify(key: &str) -> Self {
        if key == PLAYER_NAME_COLUMN {
            Self::Identity
        } else if key.starts_with(CATEGORY_PREFIX) {
            Self::Category
        } else if key.starts_with(RAW_METRIC_PREFIX) {
            Self::Raw
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub kind: ColumnKind,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Text(_) => None,
        }
    }
}

/// Season-level player table, stored column-wise. Rows are addressed by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    row_count: usize,
    name_column: usize,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.index.get(key).and_then(|idx| self.columns.get(*idx))
    }

    pub fn column_keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    /// Keys of the given kind, in table column order.
    pub fn keys_of_kind(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.key.as_str())
            .collect()
    }

    pub fn numeric(&self, key: &str) -> Option<&[Option<f64>]> {
        self.column(key).and_then(Column::numeric)
    }

    pub fn value(&self, row: usize, key: &str) -> Option<f64> {
        self.numeric(key)
            .and_then(|values| values.get(row).copied().flatten())
    }

    pub fn player_name(&self, row: usize) -> Option<&str> {
        match &self.columns[self.name_column].data {
            ColumnData::Text(names) => names.get(row).and_then(|n| n.as_deref()),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Distinct non-null player names in first-appearance order.
    pub fn player_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        (0..self.row_count)
            .filter_map(|row| self.player_name(row))
            .filter(|name| seen.insert(*name))
            .collect()
    }

    pub fn row(&self, index: usize) -> Option<PlayerRow<'_>> {
        (index < self.row_count).then_some(PlayerRow { table: self, index })
    }

    pub fn rows(&self) -> impl Iterator<Item = PlayerRow<'_>> {
        (0..self.row_count).map(move |index| PlayerRow { table: self, index })
    }

    /// First row whose name matches exactly. No trimming or case folding.
    pub fn find_player(&self, name: &str) -> Option<PlayerRow<'_>> {
        (0..self.row_count)
            .find(|row| self.player_name(*row) == Some(name))
            .map(|index| PlayerRow { table: self, index })
    }

    pub(crate) fn replace_numeric(&mut self, key: &str, values: Vec<Option<f64>>) -> Result<()> {
        let idx = *self
            .index
            .get(key)
            .ok_or_else(|| RadarError::UnknownColumn(key.to_string()))?;
        let column = &mut self.columns[idx];
        match &mut column.data {
            ColumnData::Numeric(existing) if existing.len() == values.len() => {
                *existing = values;
                Ok(())
            }
            ColumnData::Numeric(_) => Err(RadarError::UnknownColumn(key.to_string())),
            ColumnData::Text(_) => Err(RadarError::NonNumericColumn(key.to_string())),
        }
    }
}

/// Borrowed view of one player-season.
#[derive(Debug, Clone, Copy)]
pub struct PlayerRow<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> PlayerRow<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn player_name(&self) -> Option<&'a str> {
        self.table.player_name(self.index)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.table.value(self.index, key)
    }

    /// Every numeric column of this row, in column order.
    pub fn metrics(&self) -> impl Iterator<Item = (&'a str, Option<f64>)> + 'a {
        let index = self.index;
        self.table.columns.iter().filter_map(move |c| {
            c.numeric()
                .map(|values| (c.key.as_str(), values.get(index).copied().flatten()))
        })
    }
}

/// Process-wide table, read from `path` on the first call only.
pub fn load(path: &Path) -> Result<&'static Table> {
    DATASET.get_or_try_init(|| read_table(path))
}

pub fn cached() -> Option<&'static Table> {
    DATASET.get()
}

pub fn read_table(path: &Path) -> Result<Table> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|err| RadarError::unavailable(&source, err))?;
    let table = parse_table(BufReader::new(file), &source)?;
    info!(
        path = %source,
        rows = table.row_count(),
        columns = table.column_count(),
        "dataset loaded"
    );
    Ok(table)
}

pub fn parse_table<R: Read>(rdr: R, source: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(rdr);

    let headers = reader
        .headers()
        .map_err(|err| RadarError::unavailable(source, err))?
        .clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(RadarError::unavailable(source, "missing header row"));
    }

    let mut index = HashMap::with_capacity(headers.len());
    for (idx, key) in headers.iter().enumerate() {
        if index.insert(key.to_string(), idx).is_some() {
            return Err(RadarError::unavailable(
                source,
                format!("duplicate column '{key}'"),
            ));
        }
    }
    let Some(&name_column) = index.get(PLAYER_NAME_COLUMN) else {
        return Err(RadarError::unavailable(
            source,
            format!("missing required column '{PLAYER_NAME_COLUMN}'"),
        ));
    };

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|err| RadarError::unavailable(source, err))?;
        for (idx, field) in record.iter().enumerate() {
            cells[idx].push(parse_cell(field));
        }
    }
    let row_count = cells.first().map(Vec::len).unwrap_or(0);

    let mut columns = Vec::with_capacity(headers.len());
    for (key, raw) in headers.iter().zip(cells) {
        let kind = ColumnKind::classify(key);
        let data = match kind {
            ColumnKind::Identity => ColumnData::Text(raw),
            ColumnKind::Category | ColumnKind::Raw => {
                ColumnData::Numeric(parse_numeric_strict(key, &raw, source)?)
            }
            ColumnKind::Other => match parse_numeric_lenient(&raw) {
                Some(values) => ColumnData::Numeric(values),
                None => ColumnData::Text(raw),
            },
        };
        columns.push(Column {
            key: key.to_string(),
            kind,
            data,
        });
    }
    debug!(source, rows = row_count, "parsed dataset");

    Ok(Table {
        columns,
        index,
        row_count,
        name_column,
    })
}

fn parse_cell(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }
    if NULL_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        return None;
    }
    Some(field.to_string())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn parse_numeric_strict(
    key: &str,
    raw: &[Option<String>],
    source: &str,
) -> Result<Vec<Option<f64>>> {
    raw.iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            None => Ok(None),
            Some(text) => parse_number(text).map(Some).ok_or_else(|| {
                // +2: header line plus 1-based numbering.
                RadarError::unavailable(
                    source,
                    format!("line {}: column '{key}' has non-numeric value {text:?}", row + 2),
                )
            }),
        })
        .collect()
}

fn parse_numeric_lenient(raw: &[Option<String>]) -> Option<Vec<Option<f64>>> {
    raw.iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(text) => parse_number(text).map(Some),
        })
        .collect()
}
