use serde::Serialize;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReceipt {
    pub message_id: String,
}
