use axum::{extract::State, response::IntoResponse, Json};
use chrono::Duration;
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, Email, PendingCode, UserStoreError},
    utils::{
        constants::VERIFICATION_CODE_EXPIRE_MINUTES, email_templates,
    },
};

#[tracing::instrument(name = "Resend verification code", skip_all)]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(request): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let email = Email::parse(Secret::new(request.email))?;

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

    // Replaces any previously pending code.
    let pending = PendingCode::issue(Duration::minutes(
        *VERIFICATION_CODE_EXPIRE_MINUTES,
    ));
    user.email_verification = Some(pending.clone());

    let recipient = user.email.clone();
    let first_name = user.profile.first_name.as_ref().to_owned();

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    // Unlike registration, a resend exists only to deliver the email, so a
    // delivery failure is surfaced.
    state
        .email_client
        .send_email(
            &recipient,
            email_templates::VERIFICATION_SUBJECT,
            &email_templates::verification_body(
                &first_name,
                pending.code().as_ref().expose_secret(),
            ),
        )
        .await
        .map_err(AuthAPIError::UnexpectedError)?;

    Ok(Json(ResendVerificationResponse {
        message: String::from("Verification code sent to your email"),
    }))
}

#[derive(Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResendVerificationResponse {
    pub message: String,
}
