use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::{domain::AuthAPIError, utils::auth::AuthenticatedUser};

#[tracing::instrument(name = "MFA status", skip_all)]
pub async fn mfa_status(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AuthAPIError> {
    Ok(Json(MfaStatusResponse {
        mfa_enabled: user.mfa.is_enabled(),
        has_secret: user.mfa.has_secret(),
    }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MfaStatusResponse {
    #[serde(rename = "mfaEnabled")]
    pub mfa_enabled: bool,
    #[serde(rename = "hasSecret")]
    pub has_secret: bool,
}
