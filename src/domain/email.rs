// Email domain model

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// The message prepared for the campaign's current recipient
#[derive(Debug, Clone, PartialEq)]
pub struct EmailDraft {
    pub row: usize,
    pub recipient_name: String,
    pub email: OutgoingEmail,
}

/// Edits applied to a draft before it is sent
#[derive(Debug, Clone, Default)]
pub struct DraftOverrides {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl EmailDraft {
    pub fn apply(&self, overrides: DraftOverrides) -> OutgoingEmail {
        OutgoingEmail {
            to: overrides.to.unwrap_or_else(|| self.email.to.clone()),
            subject: overrides.subject.unwrap_or_else(|| self.email.subject.clone()),
            body: overrides.body.unwrap_or_else(|| self.email.body.clone()),
        }
    }
}
