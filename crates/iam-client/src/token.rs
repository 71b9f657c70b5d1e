//! Access token retrieval.

use iam_core::ServerConfig;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

/// Scopes requested for the management operations the tool performs.
pub const MANAGEMENT_SCOPE: &str = "internal_application_mgt_update internal_application_mgt_create \
internal_application_mgt_view internal_application_mgt_delete internal_idp_update internal_idp_create \
internal_idp_view internal_idp_delete internal_userstore_view internal_userstore_create \
internal_userstore_update internal_userstore_delete internal_claim_meta_view \
internal_claim_meta_create internal_claim_meta_update internal_claim_meta_delete";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Requests an access token with the client-credentials grant.
pub async fn fetch_access_token(
    client: &reqwest::Client,
    server: &ServerConfig,
) -> ApiResult<String> {
    let url = server.token_url();
    tracing::debug!("Requesting access token from {url}");

    let response = client
        .post(&url)
        .basic_auth(&server.client_id, Some(&server.client_secret))
        .form(&[
            ("grant_type", "client_credentials"),
            ("scope", MANAGEMENT_SCOPE),
        ])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Token(ApiError::from_status(status.as_u16(), &body).to_string()));
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| ApiError::Token(format!("unexpected token response: {e}")))?;
    if token.access_token.is_empty() {
        return Err(ApiError::Token("empty access token".to_string()));
    }
    Ok(token.access_token)
}
