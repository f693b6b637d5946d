use crate::domain::chart::DateWindow;
use crate::domain::record::RecordSet;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/tracker";

#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub sheets: SheetsSettings,
    pub date_window: DateWindow,
    #[serde(default)]
    pub retry_delays: RetryDelays,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub milestone: Option<MilestoneConfig>,
    #[serde(default)]
    pub table: Option<TableConfig>,
    #[serde(default)]
    pub sender: Option<SenderCredential>,
    #[serde(default)]
    pub campaign: CampaignConfig,
    #[serde(default)]
    pub lookup: Option<LookupConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsSettings {
    #[serde(default = "default_sheets_api")]
    pub api_base: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            api_base: default_sheets_api(),
            api_key: None,
            access_token: None,
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SheetsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_sheets_api() -> String {
    "https://sheets.googleapis.com".to_string()
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RetryDelays {
    #[serde(default = "default_success_secs")]
    pub success_secs: u64,
    #[serde(default = "default_failure_secs")]
    pub failure_secs: u64,
}

impl RetryDelays {
    pub fn success(&self) -> Duration {
        Duration::from_secs(self.success_secs)
    }

    pub fn failure(&self) -> Duration {
        Duration::from_secs(self.failure_secs)
    }
}

impl Default for RetryDelays {
    fn default() -> Self {
        Self {
            success_secs: default_success_secs(),
            failure_secs: default_failure_secs(),
        }
    }
}

fn default_success_secs() -> u64 {
    300
}

fn default_failure_secs() -> u64 {
    5
}

/// One remote worksheet feeding one chart category
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub worksheet: String,
    pub category: String,
    pub color: Option<String>,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_date_column")]
    pub date_column: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_name_column() -> String {
    "Agent Name".to_string()
}

fn default_date_column() -> String {
    "Date".to_string()
}

fn default_date_format() -> String {
    "%m/%d/%Y".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct MilestoneConfig {
    pub category: String,
    pub threshold: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TableConfig {
    pub path: String,
    #[serde(default = "default_display_columns")]
    pub display_columns: Vec<String>,
}

fn default_display_columns() -> Vec<String> {
    ["Business Name", "Address", "Cell No", "Email"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SenderCredential {
    pub email: String,
    pub password: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Deserialize, Clone)]
pub struct CampaignConfig {
    #[serde(default = "default_email_column")]
    pub email_column: String,
    #[serde(default = "default_recipient_column")]
    pub recipient_name_column: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body_template")]
    pub body_template: String,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            email_column: default_email_column(),
            recipient_name_column: default_recipient_column(),
            subject: default_subject(),
            body_template: default_body_template(),
        }
    }
}

fn default_email_column() -> String {
    "Email".to_string()
}

fn default_recipient_column() -> String {
    "Business Name".to_string()
}

fn default_subject() -> String {
    "Your Business Proposal".to_string()
}

fn default_body_template() -> String {
    "Dear ${Business Name},\n\n${Address}. This address is serviceable.\n\nYOUR SUGGESTED PLAN:\n${Plan Details}\n\nBest regards,\nSales & Marketing\n".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LookupConfig {
    pub account_sid: String,
    pub auth_token: String,
    #[serde(default = "default_lookup_base")]
    pub base_url: String,
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_lookup_base() -> String {
    "https://lookups.twilio.com".to_string()
}

fn default_country_code() -> String {
    "+1".to_string()
}

pub fn load_tracker_config(path: &str) -> anyhow::Result<TrackerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;

    let parsed: TrackerConfig = settings.try_deserialize()?;
    if parsed.date_window.start > parsed.date_window.end {
        anyhow::bail!(
            "date_window.start {} is after date_window.end {}",
            parsed.date_window.start,
            parsed.date_window.end
        );
    }
    Ok(parsed)
}

/// Replace `${Column}` placeholders with values taken from a map
///
/// One left-to-right pass: substituted values are never scanned again, and
/// unknown or unterminated placeholders are kept as written.
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            rest = &rest[start..];
            break;
        };
        match vars.get(&after[..end]) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    result
}

/// Placeholder values for one table row, keyed by column name
pub fn row_vars(table: &RecordSet, row: usize) -> HashMap<String, String> {
    table
        .columns()
        .iter()
        .map(|column| {
            let value = table
                .get(row, column)
                .map(|v| v.to_string())
                .unwrap_or_default();
            (column.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Scalar;
    use std::io::Write;

    #[test]
    fn test_render_template() {
        let mut vars = HashMap::new();
        vars.insert("Business Name".to_string(), "Acme".to_string());
        vars.insert("Plan Details".to_string(), "Internet 600".to_string());

        let body = "Dear ${Business Name},\nPlan: ${Plan Details}\n${Unknown}";
        let result = render_template(body, &vars);

        assert_eq!(result, "Dear Acme,\nPlan: Internet 600\n${Unknown}");
    }

    #[test]
    fn test_render_template_does_not_expand_values() {
        let mut vars = HashMap::new();
        vars.insert("Business Name".to_string(), "Cost ${Address}".to_string());
        vars.insert("Address".to_string(), "1 Main St".to_string());

        assert_eq!(
            render_template("Dear ${Business Name}, ${Address}", &vars),
            "Dear Cost ${Address}, 1 Main St"
        );
        assert_eq!(render_template("Total: ${Address", &vars), "Total: ${Address");
        assert_eq!(render_template("$5 {x} ${}", &vars), "$5 {x} ${}");
    }

    #[test]
    fn test_row_vars() {
        let table = RecordSet::new(
            vec!["Business Name".to_string(), "Email".to_string()],
            vec![vec![Scalar::from_raw("Acme"), Scalar::Empty]],
        );
        let vars = row_vars(&table, 0);
        assert_eq!(vars["Business Name"], "Acme");
        assert_eq!(vars["Email"], "");
    }

    #[test]
    fn test_load_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[sheets]
api_key = "k"

[date_window]
start = "2024-10-13"
end = "2025-01-30"

[[sources]]
name = "Sales Sheet"
url = "https://docs.google.com/spreadsheets/d/abc/edit"
worksheet = "Form Responses 1"
category = "Sales"
"#
        )
        .unwrap();

        let cfg = load_tracker_config(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.retry_delays.success(), Duration::from_secs(300));
        assert_eq!(cfg.retry_delays.failure(), Duration::from_secs(5));
        assert_eq!(cfg.sources[0].name_column, "Agent Name");
        assert_eq!(cfg.sources[0].date_format, "%m/%d/%Y");
        assert_eq!(cfg.campaign.email_column, "Email");
        assert_eq!(cfg.sheets.timeout(), Duration::from_secs(30));
        assert!(cfg.table.is_none());
    }

    #[test]
    fn test_load_config_rejects_inverted_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.toml");
        std::fs::write(
            &path,
            "[date_window]\nstart = \"2025-02-01\"\nend = \"2025-01-01\"\n",
        )
        .unwrap();
        assert!(load_tracker_config(path.to_str().unwrap()).is_err());
    }
}
