// Store trait for the local spreadsheet file
use crate::domain::error::TrackerError;
use crate::domain::record::RecordSet;
use std::path::Path;

pub trait TableStore: Send + Sync {
    /// Read the whole table; the first row is the header
    fn load(&self, path: &Path) -> Result<RecordSet, TrackerError>;

    /// Replace every body row below the existing header with `table`'s rows
    fn save(&self, path: &Path, table: &RecordSet) -> Result<(), TrackerError>;
}
