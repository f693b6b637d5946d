// Source trait for remote tabular data
use crate::domain::error::TrackerError;
use crate::domain::record::RecordSet;
use async_trait::async_trait;

/// Where one record set lives: a spreadsheet and a worksheet inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    /// Label used in logs and error messages ("Sales Sheet")
    pub name: String,
    /// Full spreadsheet URL or bare spreadsheet id
    pub spreadsheet: String,
    pub worksheet: String,
}

#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch every row of a worksheet; the first row is the header
    ///
    /// Implementations never panic on remote errors; they return `FetchFailed`.
    async fn fetch_records(&self, sheet: &SheetRef) -> Result<RecordSet, TrackerError>;
}
