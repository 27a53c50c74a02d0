use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Duration;
use color_eyre::eyre::eyre;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        Address, AuthAPIError, BotCheckError, Email, HowHeard, Password,
        PendingCode, PersonName, Phone, Profile, User, UserPasswordHash,
        UserStoreError,
    },
    utils::{
        client_ip,
        constants::VERIFICATION_CODE_EXPIRE_MINUTES,
        email_templates,
    },
};

#[tracing::instrument(name = "Register", skip_all)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthAPIError> {
    let email = Email::parse(Secret::new(request.email))?;
    let first_name = PersonName::parse(&request.first_name)?;
    let last_name = PersonName::parse(&request.last_name)?;
    let phone = Phone::parse(&request.phone)?;
    let address = Address::parse(&request.address)?;
    let how_heard = HowHeard::parse(&request.how_heard)?;
    let password = Password::parse(request.password)?;

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

    let hash = UserPasswordHash::from_password(&password)
        .await
        .map_err(AuthAPIError::UnexpectedError)?;

    let mut user = User::new_local(
        email,
        Profile::local(first_name, last_name, phone, address, how_heard),
        hash,
        ip,
        request.device_fingerprint,
    );

    let pending = PendingCode::issue(Duration::minutes(
        *VERIFICATION_CODE_EXPIRE_MINUTES,
    ));
    user.email_verification = Some(pending.clone());

    let user_id = user.id.clone();
    let recipient = user.email.clone();
    let first_name = user.profile.first_name.as_ref().to_owned();

    {
        let mut user_store = state.user_store.write().await;
        user_store.add_user(user).await.map_err(|e| match e {
            UserStoreError::UserAlreadyExists => {
                AuthAPIError::UserAlreadyExists
            }
            err => AuthAPIError::UnexpectedError(eyre!(err)),
        })?;
    }

    // Delivery failure does not roll the registration back.
    if let Err(e) = state
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
    {
        tracing::warn!(error = ?e, "failed to send verification email");
    }

    let response = Json(RegisterResponse {
        message: String::from(
            "Registration successful. Please check your email for \
             verification code.",
        ),
        user_id: user_id.as_ref().to_string(),
    });

    Ok((StatusCode::CREATED, response))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(rename = "howHeard")]
    pub how_heard: String,
    pub password: Secret<String>,
    #[serde(rename = "deviceFingerprint")]
    pub device_fingerprint: Option<String>,
    #[serde(rename = "botToken")]
    pub bot_token: Secret<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}
