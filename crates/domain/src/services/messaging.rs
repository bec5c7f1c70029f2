//! Outbound WhatsApp messaging abstraction.
//!
//! The transport lives behind a trait so the dispatcher and the
//! registration dialogue can be exercised without a provider account.

use serde::Serialize;
use std::sync::Mutex;

/// Pre-approved template identifiers, resolved to provider SIDs by the
/// transport configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    VisitConfirmation,
    VisitReminder,
    GapAlert,
}

/// Ordered positional template variables, serialized as `{"1": .., "2": ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentVariables(Vec<String>);

impl ContentVariables {
    pub fn new(values: impl IntoIterator<Item = String>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// JSON object keyed by 1-based position, the shape the provider's
    /// content API expects.
    pub fn to_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, v)| ((i + 1).to_string(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(map).to_string()
    }
}

/// Result of one external send attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    Sent { message_sid: String },
    Failed(String),
    /// Provider credentials are missing; the caller records a failure but
    /// the cycle continues.
    NotConfigured,
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

/// Transport for WhatsApp messages.
#[async_trait::async_trait]
pub trait WhatsAppSender: Send + Sync {
    /// Send a pre-approved template with positional variables.
    async fn send_template(
        &self,
        phone: &str,
        template: TemplateKind,
        variables: ContentVariables,
    ) -> SendOutcome;

    /// Send a plain text body (registration dialogue, magic links).
    async fn send_text(&self, phone: &str, body: &str) -> SendOutcome;
}

/// A message captured by the mock transport.
#[derive(Debug, Clone)]
pub enum RecordedMessage {
    Template {
        phone: String,
        template: TemplateKind,
        variables: ContentVariables,
    },
    Text {
        phone: String,
        body: String,
    },
}

impl RecordedMessage {
    pub fn phone(&self) -> &str {
        match self {
            RecordedMessage::Template { phone, .. } => phone,
            RecordedMessage::Text { phone, .. } => phone,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            RecordedMessage::Text { body, .. } => Some(body),
            RecordedMessage::Template { .. } => None,
        }
    }
}

/// Mock transport for tests: records every message, optionally failing.
#[derive(Debug, Default)]
pub struct MockWhatsAppSender {
    pub simulate_failure: bool,
    sent: Mutex<Vec<RecordedMessage>>,
}

impl MockWhatsAppSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Messages recorded so far.
    pub fn sent(&self) -> Vec<RecordedMessage> {
        self.sent.lock().expect("mock sender lock").clone()
    }

    fn record(&self, message: RecordedMessage) -> SendOutcome {
        self.sent.lock().expect("mock sender lock").push(message);
        if self.simulate_failure {
            SendOutcome::Failed("simulated provider failure".to_string())
        } else {
            SendOutcome::Sent {
                message_sid: format!("SM{:08}", self.sent.lock().expect("mock sender lock").len()),
            }
        }
    }
}

#[async_trait::async_trait]
impl WhatsAppSender for MockWhatsAppSender {
    async fn send_template(
        &self,
        phone: &str,
        template: TemplateKind,
        variables: ContentVariables,
    ) -> SendOutcome {
        self.record(RecordedMessage::Template {
            phone: phone.to_string(),
            template,
            variables,
        })
    }

    async fn send_text(&self, phone: &str, body: &str) -> SendOutcome {
        self.record(RecordedMessage::Text {
            phone: phone.to_string(),
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_variables_json() {
        let vars = ContentVariables::new(["יוסי".to_string(), "בוקר".to_string()]);
        let json: serde_json::Value = serde_json::from_str(&vars.to_json()).unwrap();
        assert_eq!(json["1"], "יוסי");
        assert_eq!(json["2"], "בוקר");
    }

    #[test]
    fn test_empty_content_variables_json() {
        assert_eq!(ContentVariables::default().to_json(), "{}");
    }

    #[tokio::test]
    async fn test_mock_sender_records_and_succeeds() {
        let sender = MockWhatsAppSender::new();
        let outcome = sender.send_text("+15551234567", "שלום").await;
        assert!(outcome.is_sent());

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].phone(), "+15551234567");
        assert_eq!(sent[0].body(), Some("שלום"));
    }

    #[tokio::test]
    async fn test_failing_mock_sender() {
        let sender = MockWhatsAppSender::failing();
        let outcome = sender
            .send_template(
                "+15551234567",
                TemplateKind::GapAlert,
                ContentVariables::default(),
            )
            .await;
        assert_eq!(
            outcome,
            SendOutcome::Failed("simulated provider failure".to_string())
        );
        assert_eq!(sender.sent().len(), 1);
    }
}
