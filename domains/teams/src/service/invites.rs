//! Invite orchestration and the invitee's side of invites
//!
//! Inviting a batch of addresses provisions missing accounts in the
//! identity provider, emails each invitee a link and records an invite.
//! Recipients are processed one by one in input order and the first
//! failure ends the batch; earlier recipients keep their side effects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crewdesk_common::{Error, Result};
use crewdesk_email::EmailService;
use crewdesk_events::{DomainEvent, EventPublisher};
use crewdesk_identity::{IdentityProvider, ManagementToken};
use uuid::Uuid;

use super::memberships::membership_conflict;
use super::token_cache::ManagementTokenCache;
use super::{upstream, Collaborators};
use crate::domain::entities::{Invite, InviteEnhanced, Membership, Role, User};
use crate::domain::state::{InviteEvent, InviteGuardContext, InviteStateMachine};
use crate::domain::validation::{parse_id, validate_email_list};
use crate::repository::TeamsRepositories;

#[derive(Clone)]
pub struct InviteService {
    repos: TeamsRepositories,
    identity: Arc<dyn IdentityProvider>,
    email: Arc<dyn EmailService>,
    events: Arc<dyn EventPublisher>,
    token_cache: Arc<ManagementTokenCache>,
    invite_origin: String,
}

impl InviteService {
    pub fn new(
        repos: TeamsRepositories,
        collaborators: Collaborators,
        token_cache: Arc<ManagementTokenCache>,
        invite_origin: String,
    ) -> Self {
        Self {
            repos,
            identity: collaborators.identity,
            email: collaborators.email,
            events: collaborators.events,
            token_cache,
            invite_origin,
        }
    }

    /// Invite every address in `emails` to the team, in order.
    ///
    /// The caller must be a member of the team. All addresses are
    /// validated before any side effect. Returns the
    /// invites created; on failure returns the first error and leaves the
    /// remaining addresses untouched.
    pub async fn create_invites(
        &self,
        caller: Uuid,
        team_id: &str,
        emails: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<Invite>> {
        let team_id = parse_id(team_id, "team")?;
        let emails = validate_email_list(emails)?;

        self.repos
            .teams
            .get_by_id(team_id)
            .await?
            .ok_or_else(|| Error::NotFound("Team not found".to_string()))?;

        // Non-members get the same answer as for a missing team
        self.repos
            .memberships
            .get_by_team_and_user(team_id, caller)
            .await?
            .ok_or_else(|| Error::NotFound("Team not found".to_string()))?;

        let token = self.token_cache.get_or_refresh(now).await?;

        let mut created = Vec::with_capacity(emails.len());
        for email in &emails {
            let invite = self
                .invite_one(&token, team_id, email, now)
                .await
                .inspect_err(|e| {
                    tracing::warn!(
                        team_id = %team_id,
                        email = %email,
                        invited = created.len(),
                        error = %e,
                        "Invite batch stopped"
                    );
                })?;
            created.push(invite);
        }

        tracing::info!(
            team_id = %team_id,
            invited_by = %caller,
            count = created.len(),
            "Invite batch complete"
        );
        Ok(created)
    }

    async fn invite_one(
        &self,
        token: &ManagementToken,
        team_id: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Invite> {
        let (user, link) = match self.repos.users.find_by_email(email).await? {
            Some(user) => (user, self.invite_origin.clone()),
            None => self.provision(token, email, now).await?,
        };

        self.email
            .send_invitation(email, &link)
            .await
            .map_err(upstream("failed to send invitation"))?;

        let invite = self
            .repos
            .invites
            .create(&Invite::new(user.id, team_id, now))
            .await?;

        tracing::info!(
            team_id = %team_id,
            user_id = %user.id,
            email = %email,
            invite_id = %invite.id,
            "Invite created"
        );
        Ok(invite)
    }

    /// Create the identity account and its local mirror, and obtain a
    /// password setup link for it
    async fn provision(
        &self,
        token: &ManagementToken,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<(User, String)> {
        let account = self
            .identity
            .create_user(token, email)
            .await
            .map_err(upstream("failed to create identity account"))?;

        let user = self
            .repos
            .users
            .create(&User::from_identity(&account, now))
            .await?;

        self.identity
            .set_user_metadata(token, &account.identity_id, user.id)
            .await
            .map_err(upstream("failed to link identity account"))?;

        let link = self
            .identity
            .password_setup_link(token, &account, &self.invite_origin)
            .await
            .map_err(upstream("failed to create password setup link"))?;

        tracing::info!(user_id = %user.id, email = %email, "Provisioned invited user");
        Ok((user, link))
    }

    /// Invitee reads or accepts one of their invites.
    ///
    /// Accepting adds the caller to the team as `Editor` in the same store
    /// transaction that records the acceptance.
    pub async fn update_invite(
        &self,
        caller: Uuid,
        team_id: &str,
        invite_id: &str,
        accepted: bool,
        now: DateTime<Utc>,
    ) -> Result<Invite> {
        let team_id = parse_id(team_id, "team")?;
        let invite_id = parse_id(invite_id, "invite")?;

        let mut invite = self.get_invite(caller, invite_id).await?;
        if invite.team_id != team_id {
            return Err(Error::NotFound("Invite not found".to_string()));
        }

        let next = InviteStateMachine::transition(
            invite.state(),
            InviteEvent::from_accepted(accepted),
            &InviteGuardContext {
                is_expired: invite.is_expired(now),
            },
        )?;
        (invite.read, invite.accepted) = next.flags();
        invite.updated_at = now;

        if !accepted {
            let updated = self.repos.invites.update(&invite).await?;
            tracing::debug!(invite_id = %invite_id, "Invite marked read");
            return Ok(updated);
        }

        let membership = Membership::new(caller, team_id, Role::Editor, now);
        let (updated, membership) = self
            .repos
            .invites
            .accept(&invite, &membership)
            .await
            .map_err(membership_conflict)?;

        tracing::info!(
            invite_id = %invite_id,
            team_id = %team_id,
            user_id = %caller,
            membership_id = %membership.id,
            "Invite accepted"
        );

        self.events
            .publish(DomainEvent::MembershipCreated {
                membership_id: membership.id,
                team_id,
                user_id: caller,
                role: membership.role.to_string(),
                created_at: membership.created_at,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    team_id = %team_id,
                    error = %e,
                    "Invite accepted but event not published"
                );
                upstream("failed to publish event")(e)
            })?;

        Ok(updated)
    }

    /// The caller's actionable invites, with team names
    pub async fn retrieve_invites(
        &self,
        caller: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<InviteEnhanced>> {
        Ok(self
            .repos
            .invites
            .list_for_user_unexpired(caller, now)
            .await?)
    }

    /// One of the caller's invites, whether or not it has expired
    pub async fn retrieve_invite(&self, caller: Uuid, invite_id: &str) -> Result<Invite> {
        let invite_id = parse_id(invite_id, "invite")?;
        self.get_invite(caller, invite_id).await
    }

    async fn get_invite(&self, caller: Uuid, invite_id: Uuid) -> Result<Invite> {
        self.repos
            .invites
            .get_for_user(caller, invite_id)
            .await?
            .ok_or_else(|| Error::NotFound("Invite not found".to_string()))
    }
}
