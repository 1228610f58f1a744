use std::sync::Arc;
use crate::domain::{
    models::{email::DeliveryReceipt, invitation::Invitation, membership::Membership, user::User},
    ports::{InvitationRepository, MembershipRepository, UserRepository},
    services::{auth_service::email_taken, notifier::{Notification, Notifier}},
};
use crate::error::{is_unique_violation, AppError, RuleViolation};
use chrono::Utc;
use tracing::{info, warn};

pub struct IssueInvitation {
    pub invitee_email: String,
    pub invitee_name: String,
    pub club: String,
    pub inviter_name: String,
}

/// The invitation is always persisted; `delivery` reports whether the email went out.
pub struct IssuedInvitation {
    pub invitation: Invitation,
    pub delivery: Result<DeliveryReceipt, AppError>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct EmailAvailability {
    pub exists: bool,
    pub message: Option<String>,
}

impl EmailAvailability {
    fn available() -> Self {
        Self { exists: false, message: None }
    }

    fn taken(message: Option<&str>) -> Self {
        Self { exists: true, message: message.map(String::from) }
    }
}

pub struct InvitationService {
    invitation_repo: Arc<dyn InvitationRepository>,
    membership_repo: Arc<dyn MembershipRepository>,
    user_repo: Arc<dyn UserRepository>,
    notifier: Arc<Notifier>,
}

impl InvitationService {
    pub fn new(
        invitation_repo: Arc<dyn InvitationRepository>,
        membership_repo: Arc<dyn MembershipRepository>,
        user_repo: Arc<dyn UserRepository>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self { invitation_repo, membership_repo, user_repo, notifier }
    }

    pub async fn issue(&self, request: IssueInvitation) -> Result<IssuedInvitation, AppError> {
        if self.membership_repo.find_by_email_and_club(&request.invitee_email, &request.club).await?.is_some() {
            return Err(RuleViolation::AlreadyMember.into());
        }
        if self.invitation_repo.find_pending(&request.invitee_email, &request.club).await?.is_some() {
            return Err(RuleViolation::PendingInvitationExists.into());
        }

        let invitation = Invitation::new(
            request.invitee_email,
            request.invitee_name,
            request.club,
            request.inviter_name,
        );

        // A concurrent issue for the same pair trips the partial unique index.
        let invitation = self.invitation_repo.create(&invitation).await.map_err(|e| match e {
            AppError::Database(ref db) if is_unique_violation(db) => RuleViolation::PendingInvitationExists.into(),
            other => other,
        })?;

        info!(club = %invitation.club, "Created invitation for {}", invitation.email);

        let delivery = self.notifier.send(&invitation_email(&invitation)).await;
        if delivery.is_err() {
            warn!(token = %invitation.token, "Invitation stored but email was not delivered");
        }

        Ok(IssuedInvitation { invitation, delivery })
    }

    pub async fn accept(&self, token: &str, user_email: &str, user_name: &str) -> Result<(Invitation, Membership), AppError> {
        let (invitation, membership) = self.invitation_repo
            .accept_with_membership(token, user_email, user_name, Utc::now())
            .await?;

        info!(club = %invitation.club, membership_id = %membership.id, "Invitation accepted by {}", user_email);
        Ok((invitation, membership))
    }

    /// Accepts `token` for an account that does not exist yet; the account, the
    /// acceptance and the membership commit together or not at all.
    pub async fn accept_for_new_user(&self, token: &str, user: &User) -> Result<(Invitation, Membership, User), AppError> {
        let (invitation, membership, user) = self.invitation_repo
            .accept_with_new_user(token, user, Utc::now())
            .await
            .map_err(email_taken)?;

        info!(club = %invitation.club, membership_id = %membership.id, "Invitation accepted at signup by {}", user.email);
        Ok((invitation, membership, user))
    }

    pub async fn resend(&self, token: &str, actor: &User) -> Result<(Invitation, DeliveryReceipt), AppError> {
        let invitation = self.invitation_repo.find_by_token(token).await?
            .ok_or(RuleViolation::InvitationNotFound)?;

        if !actor.can_manage_club(&invitation.club) {
            return Err(AppError::Forbidden(format!("You cannot manage {}", invitation.club)));
        }

        if !invitation.is_pending() {
            return Err(RuleViolation::InvitationAlreadyAccepted.into());
        }

        let receipt = self.notifier.send(&invitation_email(&invitation)).await?;
        info!(club = %invitation.club, "Re-sent invitation to {}", invitation.email);
        Ok((invitation, receipt))
    }

    /// A pending invitation only blocks the address when the caller does not hold its exact token.
    pub async fn check_email(&self, email: &str, invitation_token: Option<&str>) -> Result<EmailAvailability, AppError> {
        if !self.membership_repo.find_by_email(email).await?.is_empty() {
            return Ok(EmailAvailability::taken(None));
        }

        if self.user_repo.find_by_email(email).await?.is_some() {
            return Ok(EmailAvailability::taken(Some("This email is already registered.")));
        }

        let pending = self.invitation_repo.find_pending_by_email(email).await?;
        if pending.is_empty() {
            return Ok(EmailAvailability::available());
        }

        if let Some(token) = invitation_token {
            if pending.iter().any(|inv| inv.token == token) {
                return Ok(EmailAvailability::available());
            }
        }

        Ok(EmailAvailability::taken(Some(
            "This email has a pending invitation. Please check your email for the invitation link.",
        )))
    }

    pub async fn list_for_club(&self, club: &str) -> Result<Vec<Invitation>, AppError> {
        self.invitation_repo.list_by_club(club).await
    }
}

fn invitation_email(invitation: &Invitation) -> Notification {
    Notification::MemberInvitation {
        invitee_email: invitation.email.clone(),
        invitee_name: invitation.name.clone(),
        club: invitation.club.clone(),
        inviter_name: invitation.inviter_name.clone(),
        token: invitation.token.clone(),
    }
}
