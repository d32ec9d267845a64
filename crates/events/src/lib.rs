//! Crewdesk Event Publishing
//!
//! Membership and project events emitted after the core commits its writes:
//! - HTTP event API integration for production
//! - Mock publisher recording events for tests and development
//!
//! Events carry primitive fields only so consumers never depend on the
//! teams crate's entity types.

pub mod client;
pub mod mock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Event configuration error: {0}")]
    Configuration(String),

    #[error("Event request error: {0}")]
    Request(String),

    #[error("Event response error: {0}")]
    Response(String),
}

/// Events published by the teams domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "PascalCase")]
pub enum DomainEvent {
    /// A user joined a team by accepting an invite
    #[serde(rename_all = "camelCase")]
    MembershipCreated {
        membership_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
        role: String,
        created_at: DateTime<Utc>,
    },
    /// A team was bootstrapped for a project and its owner became administrator
    #[serde(rename_all = "camelCase")]
    MembershipCreatedForProject {
        membership_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
        role: String,
        project_id: Uuid,
        created_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    MembershipDeleted { membership_id: Uuid, user_id: Uuid },
    /// A project was bound to an existing team
    #[serde(rename_all = "camelCase")]
    ProjectUpdated {
        project_id: Uuid,
        team_id: Uuid,
        user_id: Uuid,
        updated_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Stable event name used by consumers for routing.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::MembershipCreated { .. } => "crewdesk/membership.created",
            DomainEvent::MembershipCreatedForProject { .. } => {
                "crewdesk/membership.created-for-project"
            }
            DomainEvent::MembershipDeleted { .. } => "crewdesk/membership.deleted",
            DomainEvent::ProjectUpdated { .. } => "crewdesk/project.updated",
        }
    }
}

/// Wire envelope wrapping a domain event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub event: DomainEvent,
    pub ts: i64,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: event.name().to_string(),
            event,
            ts: Utc::now().timestamp_millis(),
        }
    }
}

/// Event publisher configuration.
#[derive(Clone)]
pub struct EventsConfig {
    /// Publisher provider (http, mock)
    pub provider: String,
    /// Base URL of the event API
    pub base_url: String,
    /// Key authenticating with the event API
    pub event_key: String,
}

impl std::fmt::Debug for EventsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventsConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("event_key", &"[REDACTED]")
            .finish()
    }
}

impl EventsConfig {
    /// Create events config from environment variables.
    pub fn from_env() -> Result<Self, EventError> {
        dotenvy::dotenv().ok();

        let provider = std::env::var("EVENTS_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let base_url =
            std::env::var("EVENTS_URL").unwrap_or_else(|_| "http://localhost:8288".to_string());
        let event_key = std::env::var("EVENTS_KEY").unwrap_or_default();

        if provider != "mock" && event_key.is_empty() {
            return Err(EventError::Configuration(
                "EVENTS_KEY is required for the http provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            base_url,
            event_key,
        })
    }
}

/// Publisher trait for different implementations.
#[async_trait::async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event. Not retried.
    async fn publish(&self, event: DomainEvent) -> Result<(), EventError>;
}

/// Factory for creating EventPublisher implementations.
pub struct EventPublisherFactory;

impl EventPublisherFactory {
    pub fn create(config: EventsConfig) -> Result<Box<dyn EventPublisher>, EventError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!(base_url = %config.base_url, "Creating HTTP event publisher");
                if config.event_key.is_empty() {
                    return Err(EventError::Configuration(
                        "EVENTS_KEY is required for the http provider".to_string(),
                    ));
                }
                Ok(Box::new(client::HttpEventPublisher::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock event publisher");
                Ok(Box::new(mock::MockEventPublisher::new()))
            }
            provider => Err(EventError::Configuration(format!(
                "Unknown events provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
