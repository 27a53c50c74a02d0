use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, MfaState, Password},
    utils::auth::AuthenticatedUser,
};

/// Requires password re-authentication; clears the secret and every
/// backup code in one step.
#[tracing::instrument(name = "MFA disable", skip_all)]
pub async fn mfa_disable(
    State(state): State<AppState>,
    AuthenticatedUser(mut user): AuthenticatedUser,
    Json(request): Json<MfaDisableRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    if user.registered_with_google() {
        return Err(AuthAPIError::ProviderMismatch);
    }

    let hash = user
        .credential
        .password_hash()
        .ok_or(AuthAPIError::ProviderMismatch)?;

    let password = Password::parse(request.password)
        .map_err(|_| AuthAPIError::IncorrectCredentials)?;
    hash.verify(&password)
        .await
        .map_err(|_| AuthAPIError::IncorrectCredentials)?;

    user.mfa = MfaState::Disabled;

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(MfaDisableResponse {
        message: String::from("MFA has been disabled successfully"),
    }))
}

#[derive(Deserialize)]
pub struct MfaDisableRequest {
    pub password: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MfaDisableResponse {
    pub message: String,
}
