use axum::{extract::State, response::IntoResponse, Json};
use chrono::Duration;
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, Email, PendingCode, UserStoreError},
    utils::{constants::RESET_CODE_EXPIRE_MINUTES, email_templates},
};

const UNIFORM_RESPONSE: &str =
    "If an account with that email exists, a password reset code has been \
     sent.";

/// Never reveals whether the email exists — except for Google-registered
/// accounts, which get a provider-mismatch rejection. Documented tension,
/// kept on purpose.
#[tracing::instrument(name = "Forgot password", skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let email = Email::parse(Secret::new(request.email))?;

    let mut user = match state.user_store.read().await.get_user(&email).await
    {
        Ok(user) => user,
        Err(UserStoreError::UserNotFound) => {
            return Ok(Json(ForgotPasswordResponse {
                message: String::from(UNIFORM_RESPONSE),
            }));
        }
        Err(e) => return Err(AuthAPIError::UnexpectedError(eyre!(e))),
    };

    if user.registered_with_google() {
        return Err(AuthAPIError::ProviderMismatch);
    }

    // A new code phase replaces the previous code and invalidates any
    // outstanding reset token.
    let pending =
        PendingCode::issue(Duration::minutes(RESET_CODE_EXPIRE_MINUTES));
    user.password_reset_code = Some(pending.clone());
    user.password_reset_token = None;

    let recipient = user.email.clone();
    let first_name = user.profile.first_name.as_ref().to_owned();

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    // The response stays uniform even if delivery fails.
    if let Err(e) = state
        .email_client
        .send_email(
            &recipient,
            email_templates::PASSWORD_RESET_SUBJECT,
            &email_templates::password_reset_body(
                &first_name,
                pending.code().as_ref().expose_secret(),
            ),
        )
        .await
    {
        tracing::warn!(error = ?e, "failed to send password reset email");
    }

    Ok(Json(ForgotPasswordResponse {
        message: String::from(UNIFORM_RESPONSE),
    }))
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
}
