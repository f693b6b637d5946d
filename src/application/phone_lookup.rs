// Phone lookup service - normalizes input and asks the carrier API
use crate::domain::error::TrackerError;
use crate::domain::phone::{format_e164, PhoneInfo};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PhoneLookup: Send + Sync {
    /// Carrier metadata for an E.164 number
    async fn lookup(&self, e164: &str) -> Result<PhoneInfo, TrackerError>;
}

#[derive(Clone)]
pub struct PhoneLookupService {
    api: Arc<dyn PhoneLookup>,
    default_country_code: String,
}

impl PhoneLookupService {
    pub fn new(api: Arc<dyn PhoneLookup>, default_country_code: String) -> Self {
        Self {
            api,
            default_country_code,
        }
    }

    pub async fn lookup(&self, input: &str) -> Result<PhoneInfo, TrackerError> {
        let number = format_e164(input, &self.default_country_code)
            .ok_or_else(|| TrackerError::InvalidInput("Enter phone number".to_string()))?;
        tracing::debug!("Looking up {}", number);
        self.api.lookup(&number).await
    }
}
