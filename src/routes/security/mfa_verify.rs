use axum::{extract::State, response::IntoResponse, Json};
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{verify_totp_code, AuthAPIError, MfaState, VerificationCode},
    utils::{auth::AuthenticatedUser, constants::MFA_ISSUER},
};

/// Second phase of enrollment: one valid TOTP code enables MFA. A wrong
/// code leaves the pending enrollment in place for a retry.
#[tracing::instrument(name = "MFA verify", skip_all)]
pub async fn mfa_verify(
    State(state): State<AppState>,
    AuthenticatedUser(mut user): AuthenticatedUser,
    Json(request): Json<MfaVerifyRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let code = VerificationCode::parse(request.token)?;

    let secret = user.mfa.secret().ok_or(AuthAPIError::MfaNotConfigured)?;

    let valid = verify_totp_code(secret, MFA_ISSUER, &user.email, &code)
        .map_err(AuthAPIError::UnexpectedError)?;
    if !valid {
        return Err(AuthAPIError::IncorrectVerificationCode);
    }

    user.mfa = match std::mem::take(&mut user.mfa) {
        MfaState::PendingEnrollment {
            secret,
            backup_codes,
        }
        | MfaState::Enabled {
            secret,
            backup_codes,
        } => MfaState::Enabled {
            secret,
            backup_codes,
        },
        MfaState::Disabled => return Err(AuthAPIError::MfaNotConfigured),
    };

    let backup_codes: Vec<String> = user
        .mfa
        .backup_codes()
        .iter()
        .map(|code| code.as_ref().expose_secret().to_owned())
        .collect();

    state
        .user_store
        .write()
        .await
        .update_user(user)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok(Json(MfaVerifyResponse {
        message: String::from("MFA has been enabled successfully"),
        backup_codes,
    }))
}

#[derive(Deserialize)]
pub struct MfaVerifyRequest {
    pub token: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MfaVerifyResponse {
    pub message: String,
    #[serde(rename = "backupCodes")]
    pub backup_codes: Vec<String>,
}
