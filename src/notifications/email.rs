//! E-mail delivery through the Resend HTTP API

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::Notifier;
use crate::logger::{self, LogTag};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const SUBJECT: &str = "Rent Reclaim Summary";

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: String,
}

pub struct EmailNotifier {
    client: reqwest::Client,
    api_key: String,
    to: String,
    from: String,
}

impl EmailNotifier {
    pub fn new(api_key: &str, to: &str, from: &str) -> Result<Self, String> {
        if api_key.is_empty() || to.is_empty() {
            return Err("Email notifier needs an API key and a recipient".to_string());
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            to: to.to_string(),
            from: from.to_string(),
        })
    }

    fn body<'a>(&'a self, message: &str) -> ResendEmail<'a> {
        ResendEmail {
            from: &self.from,
            to: vec![self.to.as_str()],
            subject: SUBJECT,
            html: message.replace('\n', "<br>"),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    async fn notify(&self, message: &str) -> Result<(), String> {
        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&self.body(message))
            .send()
            .await
            .map_err(|e| format!("Email request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Email API returned {}: {}", status, text));
        }

        logger::debug(LogTag::Notify, &format!("Sent summary e-mail to {}", self.to));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let notifier =
            EmailNotifier::new("re_key", "ops@example.com", "Reclaimer <a@b.dev>").unwrap();
        let payload = serde_json::to_value(notifier.body("line one\nline two")).unwrap();
        assert_eq!(payload["to"][0], "ops@example.com");
        assert_eq!(payload["subject"], SUBJECT);
        assert_eq!(payload["html"], "line one<br>line two");
    }

    #[test]
    fn requires_key_and_recipient() {
        assert!(EmailNotifier::new("", "ops@example.com", "x").is_err());
        assert!(EmailNotifier::new("re_key", "", "x").is_err());
    }
}
