// Table service - Use cases for viewing, searching, editing and saving the local table
use crate::application::table_store::TableStore;
use crate::domain::error::TrackerError;
use crate::domain::record::{RecordSet, Scalar};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ROW_NUMBER_COLUMN: &str = "Row Number";
const NO_RESULTS: &str = "Oops! No results found.";

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub row_number: usize,
    pub values: Vec<String>,
}

/// What the user sees: a column list and rows tagged with their position in the file
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

pub struct TableService {
    path: PathBuf,
    store: Arc<dyn TableStore>,
    table: RecordSet,
    display_columns: Vec<String>,
}

impl TableService {
    pub fn open(
        path: impl Into<PathBuf>,
        store: Arc<dyn TableStore>,
        display_columns: Vec<String>,
    ) -> Result<Self, TrackerError> {
        let path = path.into();
        let table = store.load(&path)?;
        tracing::info!(
            "Loaded {} rows with {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        Ok(Self {
            path,
            store,
            table,
            display_columns,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &RecordSet {
        &self.table
    }

    fn build_view(&self, columns: &[String], rows: impl Iterator<Item = usize>) -> TableView {
        let rows = rows
            .map(|row| TableRow {
                row_number: row,
                values: columns
                    .iter()
                    .map(|c| self.table.get(row, c).map(|v| v.to_string()).unwrap_or_default())
                    .collect(),
            })
            .collect();
        TableView {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Every row; `columns` narrows the view, unknown columns show up empty
    pub fn view(&self, columns: Option<&[String]>) -> TableView {
        let columns = columns.unwrap_or(self.table.columns());
        self.build_view(columns, 0..self.table.len())
    }

    pub fn search(&self, column: &str, query: &str, case_sensitive: bool) -> Result<TableView, TrackerError> {
        if query.is_empty() {
            return Err(TrackerError::InvalidInput("Please enter a filter value.".to_string()));
        }
        let hits = self
            .table
            .matching_rows(column, query, case_sensitive)
            .ok_or_else(|| TrackerError::InvalidInput(format!("Unknown column '{column}'")))?;
        tracing::debug!("Search {}~{:?} matched {} rows", column, query, hits.len());
        Ok(self.build_view(self.table.columns(), hits.into_iter()))
    }

    /// Human-readable listing of a view using the configured display columns
    pub fn format_results(&self, view: &TableView) -> String {
        if view.rows.is_empty() {
            return NO_RESULTS.to_string();
        }
        let mut text = String::from("Here are the details for your search:\n\n");
        for row in &view.rows {
            text.push_str("-------------------------------------------------------\n");
            text.push_str(&format!("Index: {}\n", row.row_number));
            for column in &self.display_columns {
                let value = self
                    .table
                    .get(row.row_number, column)
                    .filter(|v| !v.is_empty())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                text.push_str(&format!("{column}: {value}\n"));
            }
            text.push_str("-------------------------------------------------------\n\n");
        }
        text
    }

    fn check_row(&self, row: usize) -> Result<(), TrackerError> {
        if row < self.table.len() {
            Ok(())
        } else {
            Err(TrackerError::InvalidInput(format!(
                "Row {row} does not exist (table has {} rows)",
                self.table.len()
            )))
        }
    }

    pub fn edit_cell(&mut self, row: usize, column: &str, value: &str) -> Result<(), TrackerError> {
        self.check_row(row)?;
        if !self.table.set(row, column, Scalar::from_raw(value)) {
            return Err(TrackerError::InvalidInput(format!("Unknown column '{column}'")));
        }
        tracing::debug!("Edited row {} column {}", row, column);
        Ok(())
    }

    /// Applies several column edits to one row; nothing changes if any column is unknown
    pub fn edit_row(&mut self, row: usize, values: &HashMap<String, String>) -> Result<(), TrackerError> {
        self.check_row(row)?;
        if let Some(unknown) = values.keys().find(|c| !self.table.has_column(c)) {
            return Err(TrackerError::InvalidInput(format!("Unknown column '{unknown}'")));
        }
        for (column, value) in values {
            self.table.set(row, column, Scalar::from_raw(value));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), TrackerError> {
        self.store.save(&self.path, &self.table)?;
        tracing::info!("Saved {} rows to {}", self.table.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::csv_store::CsvTableStore;

    const CONFIRMATIONS: &str = "\
Business Name,Address,Cell No,Email,Plan Details
Acme Plumbing,1 Main St,6145550100,ops@acme.test,Internet 600
Blue Bakery,2 Oak Ave,6145550101,,Voice 1 TN
acme dental,3 Elm Rd,,dental@acme.test,Internet 300
";

    fn open(dir: &tempfile::TempDir) -> TableService {
        let path = dir.path().join("confirmations.csv");
        std::fs::write(&path, CONFIRMATIONS).unwrap();
        TableService::open(
            path,
            Arc::new(CsvTableStore::new()),
            vec!["Business Name".to_string(), "Cell No".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_view_with_projection() {
        let dir = tempfile::tempdir().unwrap();
        let service = open(&dir);

        let full = service.view(None);
        assert_eq!(full.columns.len(), 5);
        assert_eq!(full.rows.len(), 3);
        assert_eq!(full.rows[2].row_number, 2);

        let projected = service.view(Some(&["Email".to_string(), "Offer".to_string()]));
        assert_eq!(projected.rows[0].values, vec!["ops@acme.test".to_string(), String::new()]);
    }

    #[test]
    fn test_search_keeps_row_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let service = open(&dir);

        let hits = service.search("Business Name", "acme", false).unwrap();
        let numbers: Vec<usize> = hits.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![0, 2]);

        let strict = service.search("Business Name", "acme", true).unwrap();
        assert_eq!(strict.rows.len(), 1);
        assert_eq!(strict.rows[0].row_number, 2);
    }

    #[test]
    fn test_search_validation() {
        let dir = tempfile::tempdir().unwrap();
        let service = open(&dir);

        let err = service.search("Business Name", "", false).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a filter value.");
        assert!(service.search("Nope", "x", false).is_err());
    }

    #[test]
    fn test_format_results() {
        let dir = tempfile::tempdir().unwrap();
        let service = open(&dir);

        let hits = service.search("Address", "2 oak", false).unwrap();
        let text = service.format_results(&hits);
        assert!(text.starts_with("Here are the details for your search:\n\n"));
        assert!(text.contains("Index: 1\nBusiness Name: Blue Bakery\nCell No: 6145550101\n"));

        let hits = service.search("Address", "acme dental", false).unwrap();
        assert_eq!(service.format_results(&hits), "Oops! No results found.");

        let hits = service.search("Business Name", "dental", false).unwrap();
        assert!(service.format_results(&hits).contains("Cell No: N/A\n"));
    }

    #[test]
    fn test_edit_save_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = open(&dir);
        let before = service.table().clone();

        service.edit_cell(1, "Email", "hello@bluebakery.test").unwrap();
        service.save().unwrap();

        let reloaded = CsvTableStore::new().load(service.path()).unwrap();
        assert_eq!(
            reloaded.get(1, "Email"),
            Some(&Scalar::Text("hello@bluebakery.test".to_string()))
        );
        for (r, row) in before.rows().iter().enumerate() {
            for (c, column) in before.columns().iter().enumerate() {
                if (r, column.as_str()) == (1, "Email") {
                    continue;
                }
                assert_eq!(reloaded.get(r, column), Some(&row[c]), "row {r} column {column}");
            }
        }
    }

    #[test]
    fn test_edit_row_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = open(&dir);

        let mut edits = HashMap::new();
        edits.insert("Address".to_string(), "9 New Rd".to_string());
        edits.insert("Fax".to_string(), "1".to_string());
        assert!(service.edit_row(0, &edits).is_err());
        assert_eq!(service.table().get(0, "Address"), Some(&Scalar::from_raw("1 Main St")));

        edits.remove("Fax");
        service.edit_row(0, &edits).unwrap();
        assert_eq!(service.table().get(0, "Address"), Some(&Scalar::from_raw("9 New Rd")));
    }

    #[test]
    fn test_edit_out_of_range_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = open(&dir);
        assert!(matches!(
            service.edit_cell(3, "Email", "x"),
            Err(TrackerError::InvalidInput(_))
        ));
    }
}
