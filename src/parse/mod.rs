use serde::Serialize;

/// Shown in place of null, empty, and (in numeric columns) zero values.
pub const PLACEHOLDER: &str = "-";

/// How `mysql --batch` prints SQL NULL.
const BATCH_NULL: &str = "NULL";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Nothing came back. mysql prints no header for an empty result, so
    /// callers treat this as "no rows".
    #[error("result has no header row")]
    MissingHeader,

    #[error("line {line}: expected {expected} columns, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("result has no `{0}` column")]
    MissingColumn(String),
}

/// Parsed tab-separated result: named columns and rows in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows with by-name access.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |cells| Record {
            table: self,
            cells,
        })
    }
}

/// One row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    cells: &'a [String],
}

impl<'a> Record<'a> {
    /// Cell text, placeholder included.
    pub fn get(&self, column: &str) -> Result<&'a str, ParseError> {
        let idx = self
            .table
            .column_index(column)
            .ok_or_else(|| ParseError::MissingColumn(column.to_string()))?;
        Ok(self.cells[idx].as_str())
    }

    /// Cell text, or `None` for the placeholder.
    pub fn value(&self, column: &str) -> Result<Option<&'a str>, ParseError> {
        let cell = self.get(column)?;
        Ok(if cell == PLACEHOLDER { None } else { Some(cell) })
    }
}

/// Parse `mysql --batch` output. The first line names the columns; every
/// following line must have exactly as many tab-separated cells. Rows whose
/// cell count differs are rejected rather than padded or cut.
///
/// Null and empty cells become [`PLACEHOLDER`]; in `numeric_columns` a `0`
/// does too. Escaped newlines, tabs and backslashes inside cells are restored.
pub fn parse_tsv(raw: &str, numeric_columns: &[&str]) -> Result<Table, ParseError> {
    let body = raw.trim_matches(|c: char| c == '\n' || c == '\r');
    if body.trim().is_empty() {
        return Err(ParseError::MissingHeader);
    }

    let mut lines = body.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
    let columns: Vec<String> = match lines.next() {
        Some(header) => header.split('\t').map(str::to_string).collect(),
        None => return Err(ParseError::MissingHeader),
    };
    let numeric: Vec<bool> = columns
        .iter()
        .map(|c| numeric_columns.contains(&c.as_str()))
        .collect();

    let mut rows = Vec::new();
    for (i, line) in lines.enumerate() {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() != columns.len() {
            return Err(ParseError::RaggedRow {
                // 1-based, header is line 1
                line: i + 2,
                expected: columns.len(),
                found: cells.len(),
            });
        }
        rows.push(
            cells
                .iter()
                .zip(&numeric)
                .map(|(cell, &is_numeric)| normalize_cell(cell, is_numeric))
                .collect(),
        );
    }

    Ok(Table { columns, rows })
}

fn normalize_cell(raw: &str, numeric: bool) -> String {
    if raw.is_empty() || raw == BATCH_NULL || (numeric && raw == "0") {
        PLACEHOLDER.to_string()
    } else {
        unescape(raw)
    }
}

/// Undo mysql batch escaping.
pub fn unescape(cell: &str) -> String {
    if !cell.contains('\\') {
        return cell.to_string();
    }
    let mut out = String::with_capacity(cell.len());
    let mut chars = cell.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('0') => out.push('\0'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
