use crate::domain::ports::{MailTransport, OutboundEmail, SendFailureKind, SendOutcome};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Resend-compatible HTTP transport: POST {base}/emails with a bearer token.
/// Delivery is confirmed only by a message id in the response body; an empty
/// 2xx is a failed attempt like any other.
pub struct HttpMailTransport {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpMailTransport {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &OutboundEmail) -> SendOutcome {
        let payload = EmailPayload {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html_body,
        };

        let res = match self
            .client
            .post(format!("{}/emails", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!("Mail provider connection error: {}", e);
                return SendOutcome::failed(SendFailureKind::Network);
            }
        };

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!("Mail provider refused send. Status: {}, Body: {}", status, body);
            return if status == StatusCode::TOO_MANY_REQUESTS {
                SendOutcome::failed(SendFailureKind::RateLimited)
            } else if status.is_server_error() {
                SendOutcome::failed(SendFailureKind::Provider)
            } else {
                SendOutcome::Failed {
                    kind: SendFailureKind::Rejected,
                    retryable: false,
                }
            };
        }

        match res.json::<SendResponse>().await {
            Ok(SendResponse { id: Some(id) }) if !id.is_empty() => {
                SendOutcome::Delivered { message_id: id }
            }
            Ok(_) => {
                error!("Mail provider returned success without a message id");
                SendOutcome::failed(SendFailureKind::MissingMessageId)
            }
            Err(e) => {
                error!("Mail provider response was not parseable: {}", e);
                SendOutcome::failed(SendFailureKind::MissingMessageId)
            }
        }
    }
}
