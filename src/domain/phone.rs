// Phone lookup domain model
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneInfo {
    pub phone_number: String,
    pub national_format: Option<String>,
    pub country_code: Option<String>,
    pub carrier_name: Option<String>,
    pub carrier_type: Option<String>,
    pub mobile_country_code: Option<String>,
    pub mobile_network_code: Option<String>,
}

impl PhoneInfo {
    /// Multi-line report shown to the user
    pub fn report(&self) -> String {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "None".to_string());
        format!(
            "Phone Number: {}\nNational Format: {}\nCountry Code: {}\nCarrier: {}\nCarrier Type: {}\nMobile Country Code: {}\nMobile Network Code: {}",
            self.phone_number,
            field(&self.national_format),
            field(&self.country_code),
            field(&self.carrier_name),
            field(&self.carrier_type),
            field(&self.mobile_country_code),
            field(&self.mobile_network_code),
        )
    }
}

/// Prefixes `default_country_code` unless the number already carries a `+`
pub fn format_e164(number: &str, default_country_code: &str) -> Option<String> {
    let number = number.trim();
    if number.is_empty() {
        return None;
    }
    if number.starts_with('+') {
        Some(number.to_string())
    } else {
        Some(format!("{default_country_code}{number}"))
    }
}
