// Twilio Lookups implementation of the phone lookup API
use crate::application::phone_lookup::PhoneLookup;
use crate::domain::error::TrackerError;
use crate::domain::phone::PhoneInfo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TwilioLookup {
    base_url: String,
    account_sid: String,
    auth_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    phone_number: String,
    #[serde(default)]
    national_format: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    carrier: Option<CarrierResponse>,
}

#[derive(Debug, Deserialize, Default)]
struct CarrierResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    carrier_type: Option<String>,
    #[serde(default)]
    mobile_country_code: Option<String>,
    #[serde(default)]
    mobile_network_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

impl TwilioLookup {
    pub fn new(base_url: String, account_sid: String, auth_token: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Twilio HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid,
            auth_token,
            client,
        })
    }

    async fn execute_lookup(&self, e164: &str) -> Result<LookupResponse> {
        let url = format!(
            "{}/v1/PhoneNumbers/{}?Type=carrier",
            self.base_url,
            urlencoding::encode(e164)
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .context("Failed to send request to Twilio")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => anyhow::bail!(
                    "HTTP {} error: Unable to fetch record: {} (code {})",
                    status.as_u16(),
                    err.message,
                    err.code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
                ),
                Err(_) => anyhow::bail!("Twilio lookup failed with status {}: {}", status, body),
            }
        }

        response
            .json::<LookupResponse>()
            .await
            .context("Failed to parse Twilio response")
    }
}

#[async_trait]
impl PhoneLookup for TwilioLookup {
    async fn lookup(&self, e164: &str) -> Result<PhoneInfo, TrackerError> {
        let response = self
            .execute_lookup(e164)
            .await
            .map_err(|e| TrackerError::SendFailed {
                target: e164.to_string(),
                cause: format!("{:#}", e),
            })?;

        let carrier = response.carrier.unwrap_or_default();
        Ok(PhoneInfo {
            phone_number: response.phone_number,
            national_format: response.national_format,
            country_code: response.country_code,
            carrier_name: carrier.name,
            carrier_type: carrier.carrier_type,
            mobile_country_code: carrier.mobile_country_code,
            mobile_network_code: carrier.mobile_network_code,
        })
    }
}
