//! Domain entities for the Crewdesk teams domain
//!
//! Users mirror identity-provider accounts, teams own memberships, and
//! invites turn into memberships once accepted. Projects are a local copy
//! whose only field mutated here is the team binding.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use crewdesk_common::{Error, Result};
use crewdesk_identity::IdentityUser;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::state::InviteState;

/// Days an invite stays actionable after creation
pub const INVITE_TTL_DAYS: i64 = 5;

/// Maximum team name length, counted in characters after trimming
pub const TEAM_NAME_MAX_LEN: usize = 100;

/// Role held by a member within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "membership_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Editor => "editor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "editor" => Ok(Role::Editor),
            other => Err(Error::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Local mirror of an identity-provider account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub identity_id: String,
    pub email: String,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Local record for an account just created in the identity provider
    pub fn from_identity(account: &IdentityUser, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity_id: account.identity_id.clone(),
            email: account.email.clone(),
            email_verified: account.email_verified,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            picture: account.picture.clone(),
            locale: account.locale.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Team entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    /// Owner, the user who created the team
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team with validation. The stored name is trimmed.
    pub fn new(name: &str, owner: Uuid, now: DateTime<Utc>) -> Result<Self> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 || len > TEAM_NAME_MAX_LEN {
            return Err(Error::Validation(format!(
                "Team name must be 1-{} characters",
                TEAM_NAME_MAX_LEN
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Membership entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user_id: Uuid, team_id: Uuid, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            team_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Membership joined with the member's profile. Profile fields are empty
/// when the member has not registered a local user yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MembershipWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MembershipWithUser {
    pub fn join(membership: &Membership, user: Option<&User>) -> Self {
        Self {
            id: membership.id,
            user_id: membership.user_id,
            team_id: membership.team_id,
            email: user.map(|u| u.email.clone()),
            first_name: user.and_then(|u| u.first_name.clone()),
            last_name: user.and_then(|u| u.last_name.clone()),
            picture: user.and_then(|u| u.picture.clone()),
            role: membership.role,
            created_at: membership.created_at,
            updated_at: membership.updated_at,
        }
    }
}

/// Invite entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: Uuid,
    /// Invitee
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub read: bool,
    pub accepted: bool,
    pub expiration: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invite {
    /// Fresh, unread invite expiring `INVITE_TTL_DAYS` after `now`
    pub fn new(user_id: Uuid, team_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            team_id,
            read: false,
            accepted: false,
            expiration: now + Duration::days(INVITE_TTL_DAYS),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> InviteState {
        InviteState::from_flags(self.read, self.accepted)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

/// Invite enriched with the team's name for the invitee's inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InviteEnhanced {
    pub id: Uuid,
    pub user_id: Uuid,
    pub team_id: Uuid,
    pub team_name: String,
    pub read: bool,
    pub accepted: bool,
    pub expiration: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InviteEnhanced {
    pub fn join(invite: &Invite, team: &Team) -> Self {
        Self {
            id: invite.id,
            user_id: invite.user_id,
            team_id: invite.team_id,
            team_name: team.name.clone(),
            read: invite.read,
            accepted: invite.accepted,
            expiration: invite.expiration,
            created_at: invite.created_at,
            updated_at: invite.updated_at,
        }
    }
}

/// Local copy of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub team_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: &str, owner: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            team_id: None,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }
}
