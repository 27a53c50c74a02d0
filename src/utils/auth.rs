use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use color_eyre::eyre::{eyre, Context, Result};
use jsonwebtoken::{
    decode, encode, DecodingKey, EncodingKey, Validation,
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, Email, User, UserId, UserStoreError},
};

use super::constants::JWT_SECRET;

// Session tokens carry no `type` claim; reset tokens always do. That is
// the sole discriminator between the two kinds.
pub const SESSION_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 30;
pub const RESET_TOKEN_TTL_SECONDS: i64 = 600; // 10 minutes
const RESET_TOKEN_TYPE: &str = "password_reset";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub email: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub exp: usize,
}

// Used when decoding a session token, to reject reset tokens presented as
// bearer credentials.
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
    #[serde(rename = "type")]
    token_type: Option<String>,
}

fn expiry_timestamp(ttl_seconds: i64) -> Result<(DateTime<Utc>, usize)> {
    let delta = Duration::try_seconds(ttl_seconds)
        .ok_or_else(|| eyre!("invalid TTL delta"))?;
    let expires_at = Utc::now()
        .checked_add_signed(delta)
        .ok_or_else(|| eyre!("failed to add to current time"))?;
    let exp: usize = expires_at
        .timestamp()
        .try_into()
        .wrap_err("failed to cast exp time to usize")?;
    Ok((expires_at, exp))
}

fn encode_claims<T: Serialize>(claims: &T) -> Result<Secret<String>> {
    let token_string = encode(
        &jsonwebtoken::Header::default(),
        claims,
        &EncodingKey::from_secret(JWT_SECRET.expose_secret().as_bytes()),
    )
    .wrap_err("failed to create token")?;

    Ok(Secret::new(token_string))
}

#[tracing::instrument(name = "Generating session token", skip_all)]
pub fn generate_session_token(user_id: &UserId) -> Result<Secret<String>> {
    let (_, exp) = expiry_timestamp(SESSION_TOKEN_TTL_SECONDS)?;
    let claims = SessionClaims {
        sub: user_id.as_ref().to_string(),
        exp,
    };
    encode_claims(&claims)
}

#[tracing::instrument(name = "Validating session token", skip_all)]
pub fn validate_session_token(
    token: &Secret<String>,
) -> Result<SessionClaims> {
    let data = decode::<RawClaims>(
        token.expose_secret(),
        &DecodingKey::from_secret(JWT_SECRET.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .wrap_err("failed to decode token")?;

    if data.claims.token_type.is_some() {
        return Err(eyre!("purpose-scoped token used as session token"));
    }

    Ok(SessionClaims {
        sub: data.claims.sub,
        exp: data.claims.exp,
    })
}

/// Mint a password-reset token bound to the user's current email. The
/// caller stores the returned token + expiry on the user record; that
/// stored copy is what makes the token single-use.
#[tracing::instrument(name = "Generating reset token", skip_all)]
pub fn generate_reset_token(
    user_id: &UserId,
    email: &Email,
) -> Result<(Secret<String>, DateTime<Utc>)> {
    let (expires_at, exp) = expiry_timestamp(RESET_TOKEN_TTL_SECONDS)?;
    let claims = ResetClaims {
        sub: user_id.as_ref().to_string(),
        email: email.as_ref().expose_secret().to_owned(),
        token_type: RESET_TOKEN_TYPE.to_string(),
        exp,
    };
    let token = encode_claims(&claims)?;
    Ok((token, expires_at))
}

/// A structurally sound reset token. Expiry is reported with the claims
/// attached so the caller can clear the stored copy before rejecting.
#[derive(Debug)]
pub enum DecodedResetToken {
    Valid(ResetClaims),
    Expired(ResetClaims),
}

#[tracing::instrument(name = "Decoding reset token", skip_all)]
pub fn decode_reset_token(
    token: &Secret<String>,
) -> Result<DecodedResetToken> {
    // Expiry is checked by hand below so that an expired token still
    // yields its claims.
    let mut validation = Validation::default();
    validation.validate_exp = false;

    let data = decode::<ResetClaims>(
        token.expose_secret(),
        &DecodingKey::from_secret(JWT_SECRET.expose_secret().as_bytes()),
        &validation,
    )
    .wrap_err("failed to decode reset token")?;

    if data.claims.token_type != RESET_TOKEN_TYPE {
        return Err(eyre!("not a password-reset token"));
    }

    let expired = (data.claims.exp as i64) < Utc::now().timestamp();
    if expired {
        Ok(DecodedResetToken::Expired(data.claims))
    } else {
        Ok(DecodedResetToken::Valid(data.claims))
    }
}

/// Bearer-authenticated caller, extracted from `Authorization: Bearer …`
/// and resolved against the user store.
pub struct AuthenticatedUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthAPIError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthAPIError::MissingToken)?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthAPIError::MissingToken)?;

        let claims =
            validate_session_token(&Secret::new(token.to_owned()))
                .map_err(|_| AuthAPIError::InvalidToken)?;
        let user_id = UserId::parse(&claims.sub)
            .map_err(|_| AuthAPIError::InvalidToken)?;

        let user = state
            .user_store
            .read()
            .await
            .get_user_by_id(&user_id)
            .await
            .map_err(|e| match e {
                UserStoreError::UserNotFound => AuthAPIError::InvalidToken,
                err => AuthAPIError::UnexpectedError(eyre!(err)),
            })?;

        Ok(AuthenticatedUser(user))
    }
}
