use std::time::Duration;
use crate::domain::{models::email::{DeliveryReceipt, OutgoingEmail}, ports::EmailService};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Transactional email over a Brevo-compatible `smtp/email` endpoint.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String, sender_email: String, sender_name: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url,
            api_key,
            sender_email,
            sender_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailPayload {
    sender: EmailAddress,
    to: Vec<EmailAddress>,
    subject: String,
    html_content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    message_id: Option<String>,
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, AppError> {
        let payload = EmailPayload {
            sender: EmailAddress {
                email: self.sender_email.clone(),
                name: Some(self.sender_name.clone()),
            },
            to: vec![EmailAddress {
                email: email.to_email.clone(),
                name: email.to_name.clone(),
            }],
            subject: email.subject.clone(),
            html_content: email.html_body.clone(),
            text_content: email.text_body.clone(),
        };

        let res = self.client.post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Email service connection error: {}", e);
                error!("{}", msg);
                AppError::EmailDelivery(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Email service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::EmailDelivery(msg));
        }

        // Providers may answer 2xx with an empty or non-JSON body.
        let message_id = res.json::<SendResponse>().await
            .ok()
            .and_then(|r| r.message_id)
            .unwrap_or_else(|| "sent".to_string());

        Ok(DeliveryReceipt { message_id })
    }
}
