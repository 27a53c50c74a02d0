use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, Email, UserStoreError, VerificationCode},
    utils::auth::generate_session_token,
};

use super::UserSummary;

#[tracing::instrument(name = "Verify email", skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
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

    if user.is_email_verified {
        return Err(AuthAPIError::EmailAlreadyVerified);
    }

    let pending = user
        .email_verification
        .clone()
        .ok_or(AuthAPIError::VerificationCodeNotFound)?;

    if pending.is_expired() {
        // Clear the artifact so a retry with the same code reports
        // not-found instead of expired.
        user.email_verification = None;
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

    user.is_email_verified = true;
    user.email_verification = None;
    state
        .user_store
        .write()
        .await
        .update_user(user.clone())
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    let token = generate_session_token(&user.id)
        .map_err(AuthAPIError::UnexpectedError)?;

    Ok(Json(VerifyEmailResponse {
        message: String::from("Email verified successfully"),
        token: token.expose_secret().to_owned(),
        user: UserSummary::from_user(&user),
    }))
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VerifyEmailResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}
