use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        AuthAPIError, BackupCode, BotCheckError, Email, Password, User,
        UserStoreError, VerificationCode,
    },
    utils::{
        auth::generate_session_token, client_ip, constants::MFA_ISSUER,
    },
};

use super::UserSummary;

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), AuthAPIError> {
    let email = Email::parse(Secret::new(request.email))?;
    let password = Password::parse(request.password)
        .map_err(|_| AuthAPIError::IncorrectCredentials)?;

    let ip = client_ip(&headers);
    state
        .bot_checker
        .verify(&request.bot_token, ip.as_deref())
        .await
        .map_err(|e| match e {
            BotCheckError::Rejected(message) => {
                AuthAPIError::BotCheckFailed(message)
            }
            BotCheckError::UnexpectedError(report) => {
                AuthAPIError::UnexpectedError(report)
            }
        })?;

    // Unknown user and wrong password collapse into one message; the
    // provider-mismatch rejection below deliberately does not.
    let mut user = state
        .user_store
        .read()
        .await
        .get_user(&email)
        .await
        .map_err(|e| match e {
            UserStoreError::UserNotFound => {
                AuthAPIError::IncorrectCredentials
            }
            err => AuthAPIError::UnexpectedError(eyre!(err)),
        })?;

    if user.registered_with_google() {
        return Err(AuthAPIError::ProviderMismatch);
    }

    let hash = user
        .credential
        .password_hash()
        .ok_or(AuthAPIError::ProviderMismatch)?;
    hash.verify(&password)
        .await
        .map_err(|_| AuthAPIError::IncorrectCredentials)?;

    if !user.is_email_verified {
        return Err(AuthAPIError::EmailNotVerified);
    }

    if user.mfa.is_enabled() {
        let Some(mfa_token) = request.mfa_token else {
            // Step-up: the second call repeats the credentials plus the
            // code. No token is issued here.
            return Ok((
                StatusCode::PARTIAL_CONTENT,
                Json(LoginResponse::MfaRequired(MfaRequiredResponse {
                    message: String::from("MFA required"),
                    mfa_required: true,
                })),
            ));
        };

        verify_mfa_token(&mut user, &mfa_token)?;
    }

    user.record_login();
    state
        .user_store
        .write()
        .await
        .update_user(user.clone())
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    let token = generate_session_token(&user.id)
        .map_err(AuthAPIError::UnexpectedError)?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse::Success(LoginSuccessResponse {
            message: String::from("Login successful"),
            token: token.expose_secret().to_owned(),
            user: UserSummary::from_user(&user),
        })),
    ))
}

/// Accepts a current TOTP code, or an unused backup code, which is
/// consumed.
fn verify_mfa_token(
    user: &mut User,
    mfa_token: &Secret<String>,
) -> Result<(), AuthAPIError> {
    let secret = user.mfa.secret().ok_or(AuthAPIError::IncorrectMfaCode)?;

    if let Ok(code) = VerificationCode::parse(mfa_token.to_owned()) {
        let totp_valid = crate::domain::verify_totp_code(
            secret,
            MFA_ISSUER,
            &user.email,
            &code,
        )
        .map_err(AuthAPIError::UnexpectedError)?;
        if totp_valid {
            return Ok(());
        }

        let backup = BackupCode::parse(mfa_token.to_owned())
            .map_err(|_| AuthAPIError::IncorrectMfaCode)?;
        if user.mfa.redeem_backup_code(&backup) {
            return Ok(());
        }
    }

    Err(AuthAPIError::IncorrectMfaCode)
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
    #[serde(rename = "botToken")]
    pub bot_token: Secret<String>,
    #[serde(rename = "mfaToken")]
    pub mfa_token: Option<Secret<String>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Success(LoginSuccessResponse),
    MfaRequired(MfaRequiredResponse),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginSuccessResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MfaRequiredResponse {
    pub message: String,
    #[serde(rename = "mfaRequired")]
    pub mfa_required: bool,
}
