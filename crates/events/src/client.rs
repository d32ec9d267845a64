//! HTTP Event Publisher
//!
//! POSTs event envelopes to `{base_url}/e/{event_key}`.

use crate::{DomainEvent, EventEnvelope, EventError, EventPublisher, EventsConfig};

pub struct HttpEventPublisher {
    http: reqwest::Client,
    event_url: String,
}

impl HttpEventPublisher {
    pub fn new(config: EventsConfig) -> Self {
        let event_url = format!(
            "{}/e/{}",
            config.base_url.trim_end_matches('/'),
            config.event_key
        );
        Self {
            http: reqwest::Client::new(),
            event_url,
        }
    }
}

#[async_trait::async_trait]
impl EventPublisher for HttpEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), EventError> {
        let envelope = EventEnvelope::new(event);

        let response = self
            .http
            .post(&self.event_url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| EventError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(EventError::Response(format!(
                "Event API returned {}: {}",
                status, body
            )));
        }

        tracing::debug!(event_name = %envelope.name, event_id = %envelope.id, "Event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn publisher(server: &MockServer) -> HttpEventPublisher {
        HttpEventPublisher::new(EventsConfig {
            provider: "http".to_string(),
            base_url: format!("{}/", server.uri()),
            event_key: "test-key".to_string(),
        })
    }

    #[tokio::test]
    async fn test_publish_posts_envelope() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/e/test-key"))
            .and(body_partial_json(serde_json::json!({
                "name": "crewdesk/membership.deleted",
                "type": "MembershipDeleted",
                "data": { "userId": user_id.to_string() }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        publisher(&server)
            .publish(DomainEvent::MembershipDeleted {
                membership_id: Uuid::new_v4(),
                user_id,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_surfaces_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/e/test-key"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = publisher(&server)
            .publish(DomainEvent::MembershipDeleted {
                membership_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, EventError::Response(_)));
        assert!(err.to_string().contains("503"));
    }
}
