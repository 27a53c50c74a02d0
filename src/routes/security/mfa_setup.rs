use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{provisioning_qr, AuthAPIError, BackupCode, MfaSecret, MfaState},
    utils::{auth::AuthenticatedUser, constants::MFA_ISSUER},
};

/// First phase of enrollment: a fresh secret and backup codes are stored
/// but MFA is not enabled until a code is verified once. Calling setup
/// again restarts enrollment with new material.
#[tracing::instrument(name = "MFA setup", skip_all)]
pub async fn mfa_setup(
    State(state): State<AppState>,
    AuthenticatedUser(mut user): AuthenticatedUser,
) -> Result<impl IntoResponse, AuthAPIError> {
    let secret = MfaSecret::generate();
    let backup_codes = BackupCode::generate_set();

    let (_, qr_code) = provisioning_qr(&secret, MFA_ISSUER, &user.email)
        .map_err(AuthAPIError::UnexpectedError)?;

    let secret_base32 = secret.as_ref().expose_secret().to_owned();
    let backup_code_strings: Vec<String> = backup_codes
        .iter()
        .map(|code| code.as_ref().expose_secret().to_owned())
        .collect();

    user.mfa = MfaState::PendingEnrollment {
        secret,
        backup_codes,
    };
    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(MfaSetupResponse {
        secret: secret_base32.clone(),
        qr_code,
        backup_codes: backup_code_strings,
        manual_entry_key: secret_base32,
    }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MfaSetupResponse {
    pub secret: String,
    #[serde(rename = "qrCode")]
    pub qr_code: String,
    #[serde(rename = "backupCodes")]
    pub backup_codes: Vec<String>,
    #[serde(rename = "manualEntryKey")]
    pub manual_entry_key: String,
}
