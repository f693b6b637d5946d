// Error taxonomy shared by every feature area
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Error occurred while fetching data from {source_name}: {cause}")]
    FetchFailed { source_name: String, cause: String },

    #[error("No data available from {} to {}", long_date(.start), long_date(.end))]
    NoDataInWindow { start: NaiveDate, end: NaiveDate },

    #[error("{source_name} has no column named '{column}'")]
    MissingColumn { source_name: String, column: String },

    #[error("File operation on {path} failed: {cause}")]
    FileIoFailed { path: String, cause: String },

    #[error("Failed to send to {target}: {cause}")]
    SendFailed { target: String, cause: String },

    #[error("Failed to draw chart: {0}")]
    RenderFailed(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl TrackerError {
    /// Failures the refresh loop retries on its short delay
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrackerError::FetchFailed { .. }
                | TrackerError::NoDataInWindow { .. }
                | TrackerError::MissingColumn { .. }
        )
    }
}

/// Formats a date the way chart titles and messages show it ("October 13, 2024")
pub fn long_date(date: &NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
