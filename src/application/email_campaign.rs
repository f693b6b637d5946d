// Email campaign - sequential confirm-then-send walk over table recipients
use crate::domain::email::{DraftOverrides, EmailDraft, OutgoingEmail};
use crate::domain::error::TrackerError;
use crate::domain::record::RecordSet;
use crate::infrastructure::config::{render_template, row_vars, CampaignConfig};
use async_trait::async_trait;

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// One authenticated send; `SendFailed` on any transport error
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TrackerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CampaignProgress {
    pub position: usize,
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Sent { to: String },
    Failed { to: String, error: String },
}

pub struct EmailCampaign {
    settings: CampaignConfig,
    table: RecordSet,
    recipients: Vec<usize>,
    progress: CampaignProgress,
}

impl EmailCampaign {
    /// Snapshot the table and collect every row that has an email address
    pub fn start(table: &RecordSet, settings: CampaignConfig) -> Result<Self, TrackerError> {
        if !table.has_column(&settings.email_column) {
            return Err(TrackerError::InvalidInput(format!(
                "No email column found in the table (expected '{}').",
                settings.email_column
            )));
        }
        let recipients: Vec<usize> = (0..table.len())
            .filter(|&row| {
                table
                    .get(row, &settings.email_column)
                    .is_some_and(|v| !v.is_empty())
            })
            .collect();
        if recipients.is_empty() {
            return Err(TrackerError::InvalidInput("No email addresses found.".to_string()));
        }

        tracing::info!("Email campaign started with {} recipients", recipients.len());
        let progress = CampaignProgress {
            total: recipients.len(),
            ..Default::default()
        };
        Ok(Self {
            settings,
            table: table.clone(),
            recipients,
            progress,
        })
    }

    pub fn progress(&self) -> CampaignProgress {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.progress.position >= self.recipients.len()
    }

    /// Draft for the current recipient, or `None` once the walk is over
    pub fn current(&self) -> Option<EmailDraft> {
        let row = *self.recipients.get(self.progress.position)?;
        let cell = |column: &str| {
            self.table
                .get(row, column)
                .map(|v| v.to_string().trim().to_string())
                .unwrap_or_default()
        };
        let vars = row_vars(&self.table, row);
        Some(EmailDraft {
            row,
            recipient_name: cell(&self.settings.recipient_name_column),
            email: OutgoingEmail {
                to: cell(&self.settings.email_column),
                subject: self.settings.subject.clone(),
                body: render_template(&self.settings.body_template, &vars),
            },
        })
    }

    fn finished_error() -> TrackerError {
        TrackerError::InvalidInput("All recipients have been handled.".to_string())
    }

    /// Send the current draft and move on, whether or not the send worked
    pub async fn send_current(
        &mut self,
        transport: &dyn MailTransport,
        overrides: DraftOverrides,
    ) -> Result<SendOutcome, TrackerError> {
        let draft = self.current().ok_or_else(Self::finished_error)?;
        let email = draft.apply(overrides);

        let outcome = match transport.send(&email).await {
            Ok(()) => {
                tracing::info!("Email sent to {}", email.to);
                self.progress.sent += 1;
                SendOutcome::Sent { to: email.to }
            }
            Err(e) => {
                tracing::warn!("Failed to send email to {}: {}", email.to, e);
                self.progress.failed += 1;
                SendOutcome::Failed {
                    to: email.to,
                    error: e.to_string(),
                }
            }
        };
        self.progress.position += 1;
        Ok(outcome)
    }

    pub fn skip(&mut self) -> Result<(), TrackerError> {
        let draft = self.current().ok_or_else(Self::finished_error)?;
        tracing::info!("Skipped {}", draft.email.to);
        self.progress.skipped += 1;
        self.progress.position += 1;
        Ok(())
    }
}
