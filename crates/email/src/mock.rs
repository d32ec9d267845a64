//! In-memory invitation sender.
//!
//! Recipients can be marked as failing so callers can exercise mid-batch
//! delivery errors.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::{DeliveryReceipt, EmailError, EmailService, Invitation};

#[derive(Debug, Default)]
struct Outbox {
    sent: Vec<Invitation>,
    failing: HashSet<String>,
    attempts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MockEmailService {
    outbox: Arc<Mutex<Outbox>>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send to `recipient` fail with a delivery error
    pub fn fail_for(&self, recipient: &str) {
        self.outbox
            .lock()
            .unwrap()
            .failing
            .insert(recipient.to_string());
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<Invitation> {
        self.outbox
            .lock()
            .unwrap()
            .sent
            .iter()
            .filter(|i| i.to == recipient)
            .cloned()
            .collect()
    }

    /// Link from the most recent invitation sent to `recipient`, read back
    /// out of the HTML anchor.
    pub fn latest_invitation_link(&self, recipient: &str) -> Option<String> {
        let latest = self.sent_to(recipient).pop()?;
        let re = regex::Regex::new(r#"href="([^"]+)""#).ok()?;
        re.captures(&latest.html)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Number of delivered invitations
    pub fn email_count(&self) -> usize {
        self.outbox.lock().unwrap().sent.len()
    }

    /// Number of send attempts, failed ones included
    pub fn attempt_count(&self) -> usize {
        self.outbox.lock().unwrap().attempts
    }

    pub fn clear(&self) {
        *self.outbox.lock().unwrap() = Outbox::default();
    }
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn deliver(&self, invitation: Invitation) -> Result<DeliveryReceipt, EmailError> {
        let mut outbox = self.outbox.lock().unwrap();
        outbox.attempts += 1;

        if outbox.failing.contains(&invitation.to) {
            tracing::warn!(recipient = %invitation.to, "Mock email delivery failure");
            return Err(EmailError::Delivery(format!(
                "Mock delivery to {} rejected",
                invitation.to
            )));
        }

        tracing::debug!(recipient = %invitation.to, "Mock invitation captured");
        outbox.sent.push(invitation);

        Ok(DeliveryReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            provider: "mock",
            sent_at: Utc::now(),
        })
    }

    fn from_address(&self) -> &str {
        "people@crewdesk.io"
    }
}
