// CSV implementation of the table store
use crate::application::table_store::TableStore;
use crate::domain::error::TrackerError;
use crate::domain::record::{RecordSet, Scalar};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CsvTableStore;

impl CsvTableStore {
    pub fn new() -> Self {
        Self
    }

    fn read_table(path: &Path) -> Result<RecordSet> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .context("Failed to open file")?;

        let columns = reader
            .headers()
            .context("Failed to read header row")?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.context("Failed to read row")?;
            let row: Vec<Scalar> = record.iter().map(Scalar::from_raw).collect();
            // Rows with nothing in any cell are spreadsheet padding
            if row.iter().all(Scalar::is_empty) {
                continue;
            }
            rows.push(row);
        }

        Ok(RecordSet::new(columns, rows))
    }

    fn write_table(path: &Path, table: &RecordSet) -> Result<()> {
        // Header comes from the file on disk so its exact text survives the rewrite
        let header = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .context("Failed to open file")?
            .headers()
            .context("Failed to read header row")?
            .clone();

        replace_via_staging(path, |staging| {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(staging)
                .context("Failed to create staging file")?;
            writer.write_record(&header)?;
            for row in table.rows() {
                writer.write_record(row.iter().map(|v| v.to_string()))?;
            }
            writer.flush()?;
            Ok(())
        })
    }
}

/// Write into `<file>.saving`, then rename it over `path`.
/// The staging file is removed again if either step fails.
fn replace_via_staging<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let staging = staging_path(path);
    let result = write(&staging)
        .and_then(|()| std::fs::rename(&staging, path).context("Failed to replace file"));
    if result.is_err() && staging.exists() {
        if let Err(e) = std::fs::remove_file(&staging) {
            tracing::warn!("Failed to remove {}: {}", staging.display(), e);
        }
    }
    result
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".saving");
    path.with_file_name(name)
}

impl TableStore for CsvTableStore {
    fn load(&self, path: &Path) -> Result<RecordSet, TrackerError> {
        Self::read_table(path).map_err(|e| TrackerError::FileIoFailed {
            path: path.display().to_string(),
            cause: format!("{:#}", e),
        })
    }

    fn save(&self, path: &Path, table: &RecordSet) -> Result<(), TrackerError> {
        Self::write_table(path, table).map_err(|e| TrackerError::FileIoFailed {
            path: path.display().to_string(),
            cause: format!("{:#}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_pads_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.csv");
        std::fs::write(&path, "Date ,Agent Name,Email\n10/13/2024,alice,a@x.test\n10/14/2024,bob\n").unwrap();

        let table = CsvTableStore::new().load(&path).unwrap();

        assert_eq!(table.columns(), &["Date", "Agent Name", "Email"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "Email"), Some(&Scalar::Empty));
    }

    #[test]
    fn test_save_keeps_header_text_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.csv");
        std::fs::write(&path, "Date ,Agent Name\n10/13/2024,alice\n10/14/2024,bob\n").unwrap();
        let store = CsvTableStore::new();

        let mut table = store.load(&path).unwrap();
        assert!(table.set(0, "Agent Name", Scalar::from_raw("Alice, Jr.")));
        store.save(&path, &table).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Date ,Agent Name\n10/13/2024,\"Alice, Jr.\"\n10/14/2024,bob\n");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_load_skips_all_empty_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.csv");
        std::fs::write(&path, "Date,Agent Name,Email\n10/13/2024,alice,\n,,\n , ,\n10/14/2024,bob,b@x.test\n").unwrap();

        let table = CsvTableStore::new().load(&path).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "Agent Name"), Some(&Scalar::from_raw("alice")));
        assert_eq!(table.get(1, "Agent Name"), Some(&Scalar::from_raw("bob")));
    }

    #[test]
    fn test_failed_write_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proposals.csv");
        std::fs::write(&path, "Date,Agent Name\n10/13/2024,alice\n").unwrap();

        let result = replace_via_staging(&path, |staging| {
            std::fs::write(staging, "Date,Agent Name\npartial")?;
            anyhow::bail!("disk full")
        });

        assert!(result.is_err());
        assert!(!staging_path(&path).exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Date,Agent Name\n10/13/2024,alice\n");
    }

    #[test]
    fn test_failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file
        let path = dir.path().join("proposals.csv");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let result = replace_via_staging(&path, |staging| {
            std::fs::write(staging, "Date\n")?;
            Ok(())
        });

        assert!(result.is_err());
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_missing_file_is_file_io_failed() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvTableStore::new()
            .load(&dir.path().join("missing.csv"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::FileIoFailed { .. }));
    }
}
