use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, Password, UserPasswordHash},
    utils::auth::AuthenticatedUser,
};

#[tracing::instrument(name = "Change password", skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthenticatedUser(mut user): AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let new_password = Password::parse(request.new_password)?;

    if user.registered_with_google() {
        return Err(AuthAPIError::ProviderMismatch);
    }

    let hash = user
        .credential
        .password_hash()
        .ok_or(AuthAPIError::ProviderMismatch)?;

    let current_password = Password::parse(request.current_password)
        .map_err(|_| AuthAPIError::IncorrectCredentials)?;
    hash.verify(&current_password)
        .await
        .map_err(|_| AuthAPIError::IncorrectCredentials)?;

    if hash.verify(&new_password).await.is_ok() {
        return Err(AuthAPIError::SamePassword);
    }

    let new_hash = UserPasswordHash::from_password(&new_password)
        .await
        .map_err(AuthAPIError::UnexpectedError)?;
    user.credential.set_password_hash(new_hash);

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(ChangePasswordResponse {
        message: String::from("Password has been changed successfully"),
    }))
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: Secret<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChangePasswordResponse {
    pub message: String,
}
