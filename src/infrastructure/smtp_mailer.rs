// SMTP implementation of the mail transport
use crate::application::email_campaign::MailTransport;
use crate::domain::email::OutgoingEmail;
use crate::domain::error::TrackerError;
use crate::infrastructure::config::SenderCredential;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct SmtpMailer {
    sender: String,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(credential: &SenderCredential) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&credential.smtp_host)
            .with_context(|| format!("Invalid SMTP relay {}", credential.smtp_host))?
            .port(credential.smtp_port)
            .credentials(Credentials::new(
                credential.email.clone(),
                credential.password.clone(),
            ))
            .build();
        Ok(Self {
            sender: credential.email.clone(),
            transport,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        Message::builder()
            .from(self.sender.parse().context("Invalid sender address")?)
            .to(email.to.parse().context("Invalid recipient address")?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .context("Failed to build message")
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), TrackerError> {
        let failed = |e: anyhow::Error| TrackerError::SendFailed {
            target: email.to.clone(),
            cause: format!("{:#}", e),
        };
        let message = self.build_message(email).map_err(failed)?;
        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")
            .map_err(failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(&SenderCredential {
            email: "sales@example.com".to_string(),
            password: "app-password".to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_bad_recipient_is_send_failed_without_network() {
        let err = mailer()
            .send(&OutgoingEmail {
                to: "not an address".to_string(),
                subject: "Hi".to_string(),
                body: "Body".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            TrackerError::SendFailed { target, cause } => {
                assert_eq!(target, "not an address");
                assert!(cause.contains("Invalid recipient address"), "{cause}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_message_carries_subject_and_body() {
        let message = mailer()
            .build_message(&OutgoingEmail {
                to: "ops@acme.test".to_string(),
                subject: "Your Business Proposal".to_string(),
                body: "Dear Acme".to_string(),
            })
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Your Business Proposal"));
        assert!(raw.contains("To: ops@acme.test"));
        assert!(raw.contains("Dear Acme"));
    }
}
