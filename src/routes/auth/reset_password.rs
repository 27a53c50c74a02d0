use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        AuthAPIError, Password, User, UserId, UserPasswordHash,
        UserStoreError,
    },
    utils::auth::{decode_reset_token, DecodedResetToken, ResetClaims},
};

#[tracing::instrument(name = "Reset password", skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let new_password = Password::parse(request.new_password)?;

    let decoded = decode_reset_token(&request.reset_token)
        .map_err(|_| AuthAPIError::ResetTokenInvalid)?;

    let (claims, expired) = match decoded {
        DecodedResetToken::Valid(claims) => (claims, false),
        DecodedResetToken::Expired(claims) => (claims, true),
    };

    let mut user = load_user(&state, &claims).await?;

    if expired {
        clear_reset_token(&state, &mut user).await?;
        return Err(AuthAPIError::ResetTokenExpired);
    }

    // The embedded email must still match the account; a mismatch means
    // the token predates an email change.
    if claims.email != user.email.as_ref().expose_secret().as_str() {
        clear_reset_token(&state, &mut user).await?;
        return Err(AuthAPIError::ResetTokenInvalid);
    }

    let Some(record) = user.password_reset_token.clone() else {
        return Err(AuthAPIError::ResetTokenInvalid);
    };

    if record.is_expired() {
        clear_reset_token(&state, &mut user).await?;
        return Err(AuthAPIError::ResetTokenExpired);
    }

    // Single-use: only the exact outstanding token is accepted.
    if !record.matches(&request.reset_token) {
        clear_reset_token(&state, &mut user).await?;
        return Err(AuthAPIError::ResetTokenInvalid);
    }

    if user.registered_with_google() {
        return Err(AuthAPIError::ProviderMismatch);
    }

    // Hash once, here; the store writes it through untouched.
    let new_hash = UserPasswordHash::from_password(&new_password)
        .await
        .map_err(AuthAPIError::UnexpectedError)?;
    user.credential.set_password_hash(new_hash);
    user.password_reset_token = None;
    user.password_reset_code = None;

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(ResetPasswordResponse {
        message: String::from("Password has been reset successfully"),
    }))
}

async fn load_user(
    state: &AppState,
    claims: &ResetClaims,
) -> Result<User, AuthAPIError> {
    let user_id = UserId::parse(&claims.sub)
        .map_err(|_| AuthAPIError::ResetTokenInvalid)?;
    state
        .user_store
        .read()
        .await
        .get_user_by_id(&user_id)
        .await
        .map_err(|e| match e {
            UserStoreError::UserNotFound => AuthAPIError::ResetTokenInvalid,
            err => AuthAPIError::UnexpectedError(eyre!(err)),
        })
}

/// Anti-replay: the stored copy is dropped as soon as expiry or mismatch
/// is detected, so the same token cannot be probed again.
async fn clear_reset_token(
    state: &AppState,
    user: &mut User,
) -> Result<(), AuthAPIError> {
    if user.password_reset_token.is_none() {
        return Ok(());
    }
    user.password_reset_token = None;
    state
        .user_store
        .write()
        .await
        .update_user(user.clone())
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(rename = "resetToken")]
    pub reset_token: Secret<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResetPasswordResponse {
    pub message: String,
}
