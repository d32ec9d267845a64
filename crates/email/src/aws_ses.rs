//! Invitation delivery through AWS Simple Email Service.
//!
//! A configured endpoint URL switches to LocalStack with static credentials.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_ses::config::SharedCredentialsProvider;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client as SesClient;
use chrono::Utc;

use crate::{DeliveryReceipt, EmailConfig, EmailError, EmailService, Invitation};

const DEFAULT_REGION: &str = "us-east-1";
const CHARSET: &str = "UTF-8";

pub struct SesEmailService {
    client: SesClient,
    from_address: String,
}

impl SesEmailService {
    pub async fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let sdk_config = load_sdk_config(&config).await;
        Ok(Self {
            client: SesClient::new(&sdk_config),
            from_address: config.from_address,
        })
    }

    fn build_message(invitation: &Invitation) -> Result<Message, EmailError> {
        let body = Body::builder()
            .text(utf8(&invitation.text, "text body")?)
            .html(utf8(&invitation.html, "html body")?)
            .build();

        Ok(Message::builder()
            .subject(utf8(&invitation.subject, "subject")?)
            .body(body)
            .build())
    }
}

async fn load_sdk_config(config: &EmailConfig) -> SdkConfig {
    let region = Region::new(
        config
            .aws_region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
    );
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(region);

    match &config.aws_endpoint_url {
        Some(endpoint) => {
            tracing::info!(endpoint = %endpoint, "Using custom SES endpoint");
            let credentials = Credentials::new("test", "test", None, None, "crewdesk-localstack");
            loader
                .endpoint_url(endpoint)
                .credentials_provider(SharedCredentialsProvider::new(credentials))
                .load()
                .await
        }
        None => loader.load().await,
    }
}

fn utf8(data: &str, part: &str) -> Result<Content, EmailError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|e| EmailError::AwsSes(format!("Failed to build {}: {}", part, e)))
}

#[async_trait::async_trait]
impl EmailService for SesEmailService {
    async fn deliver(&self, invitation: Invitation) -> Result<DeliveryReceipt, EmailError> {
        invitation.check_addresses()?;
        let message = Self::build_message(&invitation)?;

        let output = self
            .client
            .send_email()
            .source(&invitation.from)
            .destination(Destination::builder().to_addresses(&invitation.to).build())
            .message(message)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(recipient = %invitation.to, error = %e, "SES rejected invitation");
                EmailError::AwsSes(e.to_string())
            })?;

        tracing::info!(
            recipient = %invitation.to,
            message_id = %output.message_id(),
            "Invitation sent via SES"
        );

        Ok(DeliveryReceipt {
            message_id: output.message_id().to_string(),
            provider: "aws-ses",
            sent_at: Utc::now(),
        })
    }

    fn from_address(&self) -> &str {
        &self.from_address
    }
}
