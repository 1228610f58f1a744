use tera::Tera;

pub const WELCOME_SUBJECT: &str = "Welcome to Club OS!";
pub const TASK_ASSIGNMENT_SUBJECT: &str = "New Task Assigned: {{ task_title }}";
pub const EVENT_INVITATION_SUBJECT: &str = "Event Invitation: {{ event_title }}";
pub const MEMBER_INVITATION_SUBJECT: &str = "Invitation to Join {{ club }} - Club OS";

/// Compiles the bundled email templates. `.html` bodies are auto-escaped by Tera, `.txt` are not.
pub fn load_email_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("welcome.html", include_str!("../../../templates/email/welcome.html")),
        ("welcome.txt", include_str!("../../../templates/email/welcome.txt")),
        ("task_assignment.html", include_str!("../../../templates/email/task_assignment.html")),
        ("task_assignment.txt", include_str!("../../../templates/email/task_assignment.txt")),
        ("event_invitation.html", include_str!("../../../templates/email/event_invitation.html")),
        ("event_invitation.txt", include_str!("../../../templates/email/event_invitation.txt")),
        ("member_invitation.html", include_str!("../../../templates/email/member_invitation.html")),
        ("member_invitation.txt", include_str!("../../../templates/email/member_invitation.txt")),
    ])?;
    Ok(tera)
}
