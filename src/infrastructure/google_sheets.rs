// Google Sheets source implementation
use crate::application::sheet_source::{SheetRef, SheetSource};
use crate::domain::error::TrackerError;
use crate::domain::record::{RecordSet, Scalar};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GoogleSheetsRepository {
    api_base: String,
    api_key: Option<String>,
    access_token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ValueRangeResponse {
    #[allow(dead_code)]
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl GoogleSheetsRepository {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Sheets HTTP client")?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            access_token,
            client,
        })
    }

    /// Accepts either a full `.../spreadsheets/d/<id>/edit` URL or a bare id
    pub fn spreadsheet_id(spreadsheet: &str) -> &str {
        match spreadsheet.split_once("/spreadsheets/d/") {
            Some((_, rest)) => rest.split(['/', '?', '#']).next().unwrap_or(rest),
            None => spreadsheet,
        }
    }

    fn build_values_url(&self, sheet: &SheetRef) -> String {
        let mut url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base,
            Self::spreadsheet_id(&sheet.spreadsheet),
            urlencoding::encode(&sheet.worksheet)
        );
        if let Some(key) = &self.api_key {
            url.push_str("?key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }

    async fn execute_fetch(&self, sheet: &SheetRef) -> Result<ValueRangeResponse> {
        let url = self.build_values_url(sheet);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .context("Failed to send request to the Sheets API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Sheets API request failed with status {}: {}", status, body);
        }

        response
            .json::<ValueRangeResponse>()
            .await
            .context("Failed to parse Sheets API response")
    }

    fn to_scalar(value: &serde_json::Value) -> Scalar {
        match value {
            serde_json::Value::Null => Scalar::Empty,
            serde_json::Value::String(s) => Scalar::from_raw(s),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Empty),
            other => Scalar::Text(other.to_string()),
        }
    }

    fn to_record_set(response: ValueRangeResponse) -> RecordSet {
        let mut rows = response.values.into_iter();
        let Some(header) = rows.next() else {
            return RecordSet::default();
        };
        let columns = header.iter().map(|v| Self::to_scalar(v).to_string()).collect();
        let body = rows
            .map(|row| row.iter().map(Self::to_scalar).collect())
            .collect();
        RecordSet::new(columns, body)
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsRepository {
    async fn fetch_records(&self, sheet: &SheetRef) -> Result<RecordSet, TrackerError> {
        tracing::debug!("Fetching {} ({})", sheet.name, sheet.worksheet);
        self.execute_fetch(sheet)
            .await
            .map(Self::to_record_set)
            .map_err(|e| TrackerError::FetchFailed {
                source_name: sheet.name.clone(),
                cause: format!("{:#}", e),
            })
    }
}
