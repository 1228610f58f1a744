use serde::Deserialize;

// Every field is optional on the wire so that absent and blank values
// are reported together as missing fields instead of a JSON rejection.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailRequest {
    pub email: Option<String>,
    pub invitation_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueInvitationRequest {
    pub invitee_email: Option<String>,
    pub invitee_name: Option<String>,
    pub club_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInvitationRequest {
    pub token: Option<String>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ResendInvitationRequest {
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct WelcomeEmailRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignmentEmailRequest {
    pub assignee_email: Option<String>,
    pub assignee_name: Option<String>,
    pub task_title: Option<String>,
    pub task_description: Option<String>,
    pub assigned_by: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInvitationEmailRequest {
    pub attendee_email: Option<String>,
    pub attendee_name: Option<String>,
    pub event_title: Option<String>,
    pub event_date: Option<String>,
    pub event_location: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub invitation_token: Option<String>,
}

#[derive(Deserialize)]
pub struct MailLogQuery {
    pub recipient: Option<String>,
}
