use serde::Serialize;
use crate::domain::models::auth::UserProfile;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSentResponse {
    pub message: &'static str,
    pub message_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationSentResponse {
    pub message: &'static str,
    pub message_id: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct InvitationAcceptedResponse {
    pub message: &'static str,
    pub club: String,
}

#[derive(Serialize)]
pub struct CheckEmailResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user: UserProfile,
    pub invitation_accepted: bool,
}
