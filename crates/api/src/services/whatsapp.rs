//! Twilio WhatsApp transport.
//!
//! Implements the `WhatsAppSender` trait against the Twilio Messages API.
//! Template sends use the Content API (`ContentSid` + positional
//! variables); dialogue and magic-link sends use a plain `Body`.

use std::time::Duration;

use domain::services::messaging::{ContentVariables, SendOutcome, TemplateKind, WhatsAppSender};
use reqwest::Client;
use serde::Deserialize;
use shared::phone;
use tracing::{debug, error};

use crate::config::WhatsAppConfig;

/// WhatsApp transport backed by the Twilio REST API.
pub struct TwilioWhatsAppService {
    client: Client,
    config: WhatsAppConfig,
}

/// Relevant subset of Twilio's message-creation response.
#[derive(Debug, Deserialize)]
struct TwilioResponse {
    sid: Option<String>,
    message: Option<String>,
}

impl TwilioWhatsAppService {
    /// Create a new Twilio transport from configuration.
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    fn is_configured(&self) -> bool {
        !self.config.account_sid.is_empty()
            && !self.config.auth_token.is_empty()
            && !self.config.sender.is_empty()
    }

    fn template_sid(&self, template: TemplateKind) -> &str {
        match template {
            TemplateKind::VisitConfirmation => &self.config.templates.visit_confirmation,
            TemplateKind::VisitReminder => &self.config.templates.visit_reminder,
            TemplateKind::GapAlert => &self.config.templates.gap_alert,
        }
    }

    async fn post_message(&self, form: Vec<(&str, String)>) -> SendOutcome {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "WhatsApp send request failed");
                return SendOutcome::Failed(format!("Network error: {e}"));
            }
        };

        let status = response.status();
        let body: TwilioResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "WhatsApp response parse failed");
                return SendOutcome::Failed(format!("Invalid provider response: {e}"));
            }
        };

        match (status.is_success(), body.sid) {
            (true, Some(sid)) => {
                debug!(message_sid = %sid, "WhatsApp message accepted");
                SendOutcome::Sent { message_sid: sid }
            }
            _ => {
                let reason = body
                    .message
                    .unwrap_or_else(|| format!("Provider returned status {status}"));
                error!(reason = %reason, "WhatsApp send rejected");
                SendOutcome::Failed(reason)
            }
        }
    }
}

#[async_trait::async_trait]
impl WhatsAppSender for TwilioWhatsAppService {
    async fn send_template(
        &self,
        to: &str,
        template: TemplateKind,
        variables: ContentVariables,
    ) -> SendOutcome {
        if !self.is_configured() {
            return SendOutcome::NotConfigured;
        }

        let sid = self.template_sid(template);
        if sid.is_empty() {
            return SendOutcome::Failed(format!("No template SID configured for {template:?}"));
        }

        let form = vec![
            ("From", format!("whatsapp:{}", self.config.sender)),
            ("To", format!("whatsapp:{}", phone::with_plus(to))),
            ("ContentSid", sid.to_string()),
            ("ContentVariables", variables.to_json()),
        ];
        self.post_message(form).await
    }

    async fn send_text(&self, to: &str, body: &str) -> SendOutcome {
        if !self.is_configured() {
            return SendOutcome::NotConfigured;
        }

        let form = vec![
            ("From", format!("whatsapp:{}", self.config.sender)),
            ("To", format!("whatsapp:{}", phone::with_plus(to))),
            ("Body", body.to_string()),
        ];
        self.post_message(form).await
    }
}
