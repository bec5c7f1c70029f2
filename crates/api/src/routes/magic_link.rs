//! Magic-link routes: internal token storage, validation, consumption.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use domain::models::magic_link::TokenValidation;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::MagicLinkService;

fn service(state: &AppState) -> MagicLinkService {
    MagicLinkService::new(
        state.pool.clone(),
        state.sender.clone(),
        state.config.app.base_url.clone(),
    )
}

#[derive(Debug, Deserialize)]
pub struct StoreTokenRequest {
    pub phone: String,
    pub token: String,
    pub return_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreTokenResponse {
    pub success: bool,
}

/// Store a token generated by the identity layer.
///
/// POST /api/internal/store-magic-token (gated by `X-Internal-Secret`)
pub async fn store_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StoreTokenRequest>,
) -> Result<Json<StoreTokenResponse>, ApiError> {
    let secret = headers
        .get("X-Internal-Secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if secret != state.config.security.internal_api_secret {
        return Err(ApiError::Unauthenticated("Invalid internal secret".to_string()));
    }

    if request.phone.is_empty() || request.token.is_empty() {
        return Err(ApiError::Validation("Missing phone or token".to_string()));
    }

    service(&state)
        .store(
            &request.phone,
            &request.token,
            request.return_url.as_deref(),
            Utc::now(),
        )
        .await?;

    info!(phone = %request.phone, "Magic-link token stored");
    Ok(Json(StoreTokenResponse { success: true }))
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Read-only token validation; callers may poll this while a client page
/// loads.
///
/// GET /api/auth/magic-link/validate?token=...
pub async fn validate_token(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenValidation>, ApiError> {
    let validation = service(&state).validate(&query.token, Utc::now()).await?;
    Ok(Json(validation))
}

#[derive(Debug, Deserialize)]
pub struct ConsumeTokenRequest {
    pub token: String,
}

/// Consumption response: either the sign-in payload with a session token,
/// or the typed failure the client branches on (offering a resend for
/// expired links).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ConsumeTokenResponse {
    Success {
        success: bool,
        phone: String,
        /// The token doubles as the identity layer's verification code.
        code: String,
        return_url: Option<String>,
        session_token: String,
    },
    Failure {
        success: bool,
        #[serde(flatten)]
        validation: TokenValidation,
    },
}

/// Consume a token exactly once and hand back the sign-in payload.
///
/// POST /api/auth/magic-link/consume
pub async fn consume_token(
    State(state): State<AppState>,
    Json(request): Json<ConsumeTokenRequest>,
) -> Result<(StatusCode, Json<ConsumeTokenResponse>), ApiError> {
    match service(&state).consume(&request.token, Utc::now()).await? {
        Ok(consumed) => {
            let session_token = state
                .session_keys
                .issue(&consumed.phone)
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            Ok((
                StatusCode::OK,
                Json(ConsumeTokenResponse::Success {
                    success: true,
                    phone: consumed.phone,
                    code: consumed.code,
                    return_url: consumed.return_url,
                    session_token,
                }),
            ))
        }
        Err(validation) => Ok((
            StatusCode::CONFLICT,
            Json(ConsumeTokenResponse::Failure {
                success: false,
                validation,
            }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_failure_serialization() {
        let response = ConsumeTokenResponse::Failure {
            success: false,
            validation: TokenValidation::Expired {
                phone: "+15551234567".to_string(),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["status"], "expired");
        assert_eq!(json["phone"], "+15551234567");
    }

    #[test]
    fn test_consume_success_serialization() {
        let response = ConsumeTokenResponse::Success {
            success: true,
            phone: "+15551234567".to_string(),
            code: "tok".to_string(),
            return_url: None,
            session_token: "jwt".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["code"], "tok");
    }
}
