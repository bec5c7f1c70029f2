//! Inbound WhatsApp webhook.
//!
//! The messaging provider posts form-encoded fields. A body starting with
//! one of the coordinator command words routes to the admin-response
//! handler; anything else enters the registration/login flow. The reply is
//! an empty TwiML payload in both cases.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Form,
};
use domain::services::dialogue;
use serde::Deserialize;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::RegistrationService;

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: String,
}

/// POST /api/whatsapp/webhook
pub async fn receive_message(
    State(state): State<AppState>,
    Form(message): Form<InboundMessage>,
) -> Result<impl IntoResponse, ApiError> {
    if message.from.is_empty() || message.body.is_empty() {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    }

    info!(
        from = %message.from,
        message_sid = %message.message_sid,
        "WhatsApp webhook received"
    );

    let service = RegistrationService::new(
        state.pool.clone(),
        state.sender.clone(),
        state.config.app.base_url.clone(),
    );

    if dialogue::is_admin_command(&message.body) {
        let action = service
            .handle_admin_response(&message.from, &message.body)
            .await?;
        info!(action = ?action, "Admin response handled");
    } else {
        let action = service
            .handle_incoming(&message.from, &message.body)
            .await?;
        info!(action = ?action, "Inbound message handled");
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        EMPTY_TWIML,
    ))
}

/// GET /api/whatsapp/webhook - provider verification ping.
pub async fn verify() -> &'static str {
    "WhatsApp webhook is active"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_twiml_shape() {
        assert!(EMPTY_TWIML.starts_with("<?xml"));
        assert!(EMPTY_TWIML.ends_with("<Response></Response>"));
    }

    #[tokio::test]
    async fn test_verify() {
        assert_eq!(verify().await, "WhatsApp webhook is active");
    }
}
