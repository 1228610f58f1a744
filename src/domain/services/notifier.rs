use std::sync::Arc;
use crate::domain::{
    models::{email::{DeliveryReceipt, OutgoingEmail}, mail_log::MailLog},
    ports::{EmailService, MailLogRepository},
    services::templates::{
        EVENT_INVITATION_SUBJECT, MEMBER_INVITATION_SUBJECT, TASK_ASSIGNMENT_SUBJECT, WELCOME_SUBJECT,
    },
};
use crate::error::AppError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tera::{Context, Tera};
use tracing::{error, info, warn};

// Same unreserved set as JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone)]
pub enum Notification {
    Welcome {
        email: String,
        name: String,
    },
    TaskAssignment {
        assignee_email: String,
        assignee_name: String,
        task_title: String,
        task_description: String,
        assigned_by: String,
    },
    EventInvitation {
        attendee_email: String,
        attendee_name: String,
        event_title: String,
        event_date: String,
        event_location: Option<String>,
    },
    MemberInvitation {
        invitee_email: String,
        invitee_name: String,
        club: String,
        inviter_name: String,
        token: String,
    },
}

impl Notification {
    /// Name recorded in the mail ledger.
    pub fn template_name(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::TaskAssignment { .. } => "task-assignment",
            Notification::EventInvitation { .. } => "event-invitation",
            Notification::MemberInvitation { .. } => "member-invitation",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::TaskAssignment { .. } => "task_assignment",
            Notification::EventInvitation { .. } => "event_invitation",
            Notification::MemberInvitation { .. } => "member_invitation",
        }
    }

    fn subject_template(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => WELCOME_SUBJECT,
            Notification::TaskAssignment { .. } => TASK_ASSIGNMENT_SUBJECT,
            Notification::EventInvitation { .. } => EVENT_INVITATION_SUBJECT,
            Notification::MemberInvitation { .. } => MEMBER_INVITATION_SUBJECT,
        }
    }

    pub fn recipient(&self) -> (&str, &str) {
        match self {
            Notification::Welcome { email, name } => (email, name),
            Notification::TaskAssignment { assignee_email, assignee_name, .. } => (assignee_email, assignee_name),
            Notification::EventInvitation { attendee_email, attendee_name, .. } => (attendee_email, attendee_name),
            Notification::MemberInvitation { invitee_email, invitee_name, .. } => (invitee_email, invitee_name),
        }
    }

    fn context(&self, app_base_url: &str) -> Context {
        let mut ctx = Context::new();
        match self {
            Notification::Welcome { name, .. } => {
                ctx.insert("name", name);
            }
            Notification::TaskAssignment { assignee_name, task_title, task_description, assigned_by, .. } => {
                ctx.insert("assignee_name", assignee_name);
                ctx.insert("task_title", task_title);
                ctx.insert("task_description", task_description);
                ctx.insert("assigned_by", assigned_by);
            }
            Notification::EventInvitation { attendee_name, event_title, event_date, event_location, .. } => {
                ctx.insert("attendee_name", attendee_name);
                ctx.insert("event_title", event_title);
                ctx.insert("event_date", event_date);
                ctx.insert("event_location", event_location);
            }
            Notification::MemberInvitation { invitee_name, club, inviter_name, token, .. } => {
                ctx.insert("invitee_name", invitee_name);
                ctx.insert("club", club);
                ctx.insert("inviter_name", inviter_name);
                ctx.insert("signup_url", &signup_link(app_base_url, token, club));
            }
        }
        ctx
    }
}

/// `<base>/signup?token=<token>&club=<club>` with both values URI-component encoded.
pub fn signup_link(app_base_url: &str, token: &str, club: &str) -> String {
    format!(
        "{}/signup?token={}&club={}",
        app_base_url.trim_end_matches('/'),
        utf8_percent_encode(token, URI_COMPONENT),
        utf8_percent_encode(club, URI_COMPONENT),
    )
}

pub struct Notifier {
    email_service: Arc<dyn EmailService>,
    mail_log_repo: Arc<dyn MailLogRepository>,
    templates: Arc<Tera>,
    app_base_url: String,
}

impl Notifier {
    pub fn new(
        email_service: Arc<dyn EmailService>,
        mail_log_repo: Arc<dyn MailLogRepository>,
        templates: Arc<Tera>,
        app_base_url: String,
    ) -> Self {
        Self { email_service, mail_log_repo, templates, app_base_url }
    }

    pub fn render(&self, notification: &Notification) -> Result<OutgoingEmail, AppError> {
        let ctx = notification.context(&self.app_base_url);
        let stem = notification.file_stem();

        let subject = Tera::one_off(notification.subject_template(), &ctx, false)
            .map_err(|e| AppError::InternalWithMsg(format!("Subject render failed for {}: {}", stem, e)))?;
        let html_body = self.templates.render(&format!("{}.html", stem), &ctx)
            .map_err(|e| AppError::InternalWithMsg(format!("HTML render failed for {}: {}", stem, e)))?;
        let text_body = self.templates.render(&format!("{}.txt", stem), &ctx)
            .map_err(|e| AppError::InternalWithMsg(format!("Text render failed for {}: {}", stem, e)))?;

        let (to_email, to_name) = notification.recipient();
        Ok(OutgoingEmail {
            to_email: to_email.to_string(),
            to_name: Some(to_name.to_string()),
            subject,
            html_body,
            text_body: Some(text_body.trim().to_string()),
        })
    }

    /// One provider call, no retry. The attempt is written to the mail ledger either way.
    pub async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, AppError> {
        let email = self.render(notification)?;
        let template = notification.template_name();

        match self.email_service.send(&email).await {
            Ok(receipt) => {
                info!(template, message_id = %receipt.message_id, "Email sent to {}", email.to_email);
                self.record(MailLog::sent(&email.to_email, template, &receipt.message_id)).await;
                Ok(receipt)
            }
            Err(e) => {
                warn!(template, "Email to {} failed: {}", email.to_email, e);
                self.record(MailLog::failed(&email.to_email, template, e.to_string())).await;
                Err(e)
            }
        }
    }

    async fn record(&self, log: MailLog) {
        if let Err(e) = self.mail_log_repo.log_mail(&log).await {
            error!("Failed to write mail log for {}: {:?}", log.recipient, e);
        }
    }
}
