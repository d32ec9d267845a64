//! Crewdesk email delivery
//!
//! The only mail the service sends is the team invitation. Production
//! delivery goes through AWS SES; the mock sender keeps messages in memory
//! for tests and local development.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use validator::ValidateEmail;

pub mod aws_ses;
pub mod content;
pub mod mock;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("AWS SES error: {0}")]
    AwsSes(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// A rendered invitation ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl Invitation {
    /// Render the invitation for `to` around `link`.
    pub fn render(to: &str, from: &str, link: &str) -> Self {
        Self {
            to: to.to_string(),
            from: from.to_string(),
            subject: content::INVITATION_SUBJECT.to_string(),
            html: content::invitation_html(link),
            text: content::invitation_text(link),
        }
    }

    /// Reject the message unless both ends are well-formed addresses.
    pub fn check_addresses(&self) -> Result<(), EmailError> {
        for address in [&self.to, &self.from] {
            if !address.validate_email() {
                return Err(EmailError::InvalidAddress(address.clone()));
            }
        }
        Ok(())
    }
}

/// Provider acknowledgement of a delivered message
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub provider: &'static str,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Ses,
    Mock,
}

impl FromStr for EmailProvider {
    type Err = EmailError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ses" | "aws-ses" => Ok(Self::Ses),
            "mock" => Ok(Self::Mock),
            other => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: ses, mock",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub aws_region: Option<String>,
    /// Custom endpoint, e.g. LocalStack
    pub aws_endpoint_url: Option<String>,
    pub from_address: String,
    /// When false every send is swallowed by the mock sender
    pub enabled: bool,
}

impl EmailConfig {
    pub fn from_env() -> Result<Self, EmailError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("EMAIL_PROVIDER")
            .unwrap_or_else(|_| "mock".to_string())
            .parse()?;

        let enabled = std::env::var("EMAIL_ENABLED")
            .map(|v| v != "false")
            .unwrap_or(true);

        Ok(Self {
            provider,
            aws_region: std::env::var("AWS_REGION").ok(),
            aws_endpoint_url: std::env::var("AWS_ENDPOINT_URL").ok(),
            from_address: std::env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "people@crewdesk.io".to_string()),
            enabled,
        })
    }
}

#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Hand a rendered invitation to the provider.
    async fn deliver(&self, invitation: Invitation) -> Result<DeliveryReceipt, EmailError>;

    fn from_address(&self) -> &str;

    /// Send a team invitation carrying `link` (a password-setup link for
    /// new accounts, the application origin for existing ones).
    async fn send_invitation(
        &self,
        recipient_email: &str,
        link: &str,
    ) -> Result<DeliveryReceipt, EmailError> {
        let invitation = Invitation::render(recipient_email, self.from_address(), link);
        invitation.check_addresses()?;
        self.deliver(invitation).await
    }
}

pub struct EmailServiceFactory;

impl EmailServiceFactory {
    pub async fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email delivery disabled, capturing invitations in memory");
            return Ok(Box::new(mock::MockEmailService::new()));
        }

        match config.provider {
            EmailProvider::Ses => {
                tracing::info!(region = ?config.aws_region, "Creating AWS SES email service");
                Ok(Box::new(aws_ses::SesEmailService::new(config).await?))
            }
            EmailProvider::Mock => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::new()))
            }
        }
    }
}
