use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        AuthAPIError, Email, ResetTokenRecord, UserStoreError,
        VerificationCode,
    },
    utils::auth::generate_reset_token,
};

/// Exchanges a valid reset code for the single outstanding reset token,
/// moving the flow from code phase to token phase.
#[tracing::instrument(name = "Verify reset code", skip_all)]
pub async fn verify_reset_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyResetCodeRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let email = Email::parse(Secret::new(request.email))?;
    let code = VerificationCode::parse(Secret::new(request.code))?;

    let mut user = state
        .user_store
        .read()
        .await
        .get_user(&email)
        .await
        .map_err(|e| match e {
            UserStoreError::UserNotFound => AuthAPIError::UserNotFound,
            err => AuthAPIError::UnexpectedError(eyre!(err)),
        })?;

    let pending = user
        .password_reset_code
        .clone()
        .ok_or(AuthAPIError::VerificationCodeNotFound)?;

    if pending.is_expired() {
        user.password_reset_code = None;
        state
            .user_store
            .write()
            .await
            .update_user(user)
            .await
            .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;
        return Err(AuthAPIError::VerificationCodeExpired);
    }

    if !pending.matches(&code) {
        return Err(AuthAPIError::IncorrectVerificationCode);
    }

    let (token, expires_at) = generate_reset_token(&user.id, &user.email)
        .map_err(AuthAPIError::UnexpectedError)?;

    // The code is consumed here; the stored token copy is what makes the
    // token single-use.
    user.password_reset_code = None;
    user.password_reset_token = Some(ResetTokenRecord {
        token: token.clone(),
        expires_at,
    });

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(VerifyResetCodeResponse {
        message: String::from("Reset code verified"),
        reset_token: token.expose_secret().to_owned(),
    }))
}

#[derive(Deserialize)]
pub struct VerifyResetCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyResetCodeResponse {
    pub message: String,
    #[serde(rename = "resetToken")]
    pub reset_token: String,
}
