//! Outbound email through the SendGrid v3 HTTP API.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::backends::MailConfig;
use crate::error::AppError;
use crate::logging::pii::Redacted;

pub const MAIL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Address {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Personalization {
    pub to: Vec<Address>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Content {
    #[serde(rename = "type")]
    pub mime: &'static str,
    pub value: String,
}

/// Request body of `POST /v3/mail/send`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Message {
    pub personalizations: Vec<Personalization>,
    pub from: Address,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    pub content: Vec<Content>,
}

/// Single-recipient message carrying `content` as plain text and HTML.
pub fn build_message(from: &str, recipient: &str, content: &str) -> Message {
    Message {
        personalizations: vec![Personalization {
            to: vec![Address {
                email: recipient.to_string(),
                name: "Recipient".to_string(),
            }],
        }],
        from: Address {
            email: from.to_string(),
            name: "Sender".to_string(),
        },
        subject: String::new(),
        content: vec![
            Content {
                mime: "text/plain",
                value: format!("Email content: {content}"),
            },
            Content {
                mime: "text/html",
                value: format!("<p>Email content: {content}</p>"),
            },
        ],
    }
}

#[derive(Clone, Debug)]
pub struct Mailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(MAIL_TIMEOUT)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build mail client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Send `content` to `recipient`. Without an API key this fails before
    /// any request is made.
    pub async fn send_email(&self, recipient: &str, content: &str) -> Result<(), AppError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!(recipient = %Redacted(recipient), "mail not sent: SENDGRID_API_KEY is not set");
            return Err(AppError::config("SENDGRID_API_KEY is not set"));
        };
        if recipient.trim().is_empty() {
            return Err(AppError::bad_request(
                "INVALID_RECIPIENT",
                "recipient address is empty",
            ));
        }

        let url = format!("{}/v3/mail/send", self.config.api_base.trim_end_matches('/'));
        let message = build_message(&self.config.from, recipient, content);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&message)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout(format!(
                        "mail send timed out after {}s",
                        MAIL_TIMEOUT.as_secs()
                    ))
                } else {
                    AppError::upstream("sendgrid", e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "mail provider rejected message");
            return Err(AppError::upstream(
                "sendgrid",
                format!("status {}", status.as_u16()),
            ));
        }

        info!(
            recipient = %Redacted(recipient),
            status = status.as_u16(),
            "Email sent successfully"
        );
        Ok(())
    }
}
