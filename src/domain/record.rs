// Record set domain model
use chrono::NaiveDate;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Scalar {
    /// Raw cell text as read from a file or API; blank cells become `Empty`
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Scalar::Empty
        } else {
            Scalar::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Empty => true,
            Scalar::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Empty => Ok(()),
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Ordered header plus ordered rows; every row holds one value per column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<Vec<Scalar>>,
}

impl RecordSet {
    /// Builds a record set, trimming header names and padding short rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        let columns: Vec<String> = columns.into_iter().map(|c| c.trim().to_string()).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Scalar::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Scalar> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Overwrites one cell; returns false when the row or column does not exist
    pub fn set(&mut self, row: usize, column: &str, value: Scalar) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        match self.rows.get_mut(row) {
            Some(r) => {
                r[idx] = value;
                true
            }
            None => false,
        }
    }

    /// Indices of rows whose textual value in `column` contains `query`
    ///
    /// Returns `None` if the column is unknown.
    pub fn matching_rows(&self, column: &str, query: &str, case_sensitive: bool) -> Option<Vec<usize>> {
        let idx = self.column_index(column)?;
        let needle = if case_sensitive { query.to_string() } else { query.to_lowercase() };
        let hits = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                let text = row[idx].to_string();
                if case_sensitive {
                    text.contains(&needle)
                } else {
                    text.to_lowercase().contains(&needle)
                }
            })
            .map(|(i, _)| i)
            .collect();
        Some(hits)
    }
}
