use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        GoogleEntryPoint, GoogleIdentity, Profile, User, UserStoreError,
    },
    utils::{auth::generate_session_token, client_ip, constants::FRONTEND_URL},
};

#[derive(Debug, Clone, Copy)]
enum CallbackError {
    Failed,
    NoEmail,
    EmailNotVerified,
    NotRegistered,
    AlreadyRegistered,
}

impl CallbackError {
    fn code(&self) -> &'static str {
        match self {
            Self::Failed => "google_auth_failed",
            Self::NoEmail => "google_auth_no_email",
            Self::EmailNotVerified => "google_auth_email_not_verified",
            Self::NotRegistered => "google_auth_not_registered",
            Self::AlreadyRegistered => "google_auth_already_registered",
        }
    }

    /// Which frontend page receives the error.
    fn landing(&self, entry: GoogleEntryPoint) -> &'static str {
        match (entry, self) {
            // A registration attempt for an existing account points back
            // at the login page.
            (_, Self::AlreadyRegistered) => "login",
            (GoogleEntryPoint::Login, _) => "login",
            (GoogleEntryPoint::Register, _) => "register",
        }
    }
}

fn error_redirect(error: CallbackError, entry: GoogleEntryPoint) -> Redirect {
    Redirect::to(&format!(
        "{}/{}?error={}",
        *FRONTEND_URL,
        error.landing(entry),
        error.code()
    ))
}

/// The session token travels to the frontend as a query parameter, a
/// one-shot channel the client persists and strips from the URL
/// immediately.
fn token_redirect(token: &Secret<String>) -> Redirect {
    Redirect::to(&format!(
        "{}/dashboard?token={}",
        *FRONTEND_URL,
        token.expose_secret()
    ))
}

#[tracing::instrument(name = "Google login redirect", skip_all)]
pub async fn google_login(State(state): State<AppState>) -> Redirect {
    Redirect::to(
        &state
            .google_auth_client
            .authorize_url(GoogleEntryPoint::Login),
    )
}

#[tracing::instrument(name = "Google register redirect", skip_all)]
pub async fn google_register(State(state): State<AppState>) -> Redirect {
    Redirect::to(
        &state
            .google_auth_client
            .authorize_url(GoogleEntryPoint::Register),
    )
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub fingerprint: Option<String>,
}

async fn exchange(
    state: &AppState,
    query: &GoogleCallbackQuery,
    entry: GoogleEntryPoint,
) -> Result<GoogleIdentity, CallbackError> {
    if let Some(oauth_error) = &query.error {
        tracing::debug!(error = oauth_error, "Google returned an error");
        return Err(CallbackError::Failed);
    }
    let code = query.code.as_deref().ok_or(CallbackError::Failed)?;

    let identity = state
        .google_auth_client
        .exchange_code(code, entry)
        .await
        .map_err(|e| {
            tracing::warn!(error = ?e, "Google code exchange failed");
            CallbackError::Failed
        })?;

    if identity.email.is_none() {
        return Err(CallbackError::NoEmail);
    }
    if !identity.email_verified {
        return Err(CallbackError::EmailNotVerified);
    }

    Ok(identity)
}

#[tracing::instrument(name = "Google login callback", skip_all)]
pub async fn google_login_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Redirect {
    let entry = GoogleEntryPoint::Login;

    let identity = match exchange(&state, &query, entry).await {
        Ok(identity) => identity,
        Err(error) => return error_redirect(error, entry),
    };
    let email = identity.email.clone().expect("email presence checked");

    // Login requires an already-registered account, by email or subject ID.
    let mut user = match state
        .user_store
        .read()
        .await
        .get_user_by_email_or_google_id(&email, &identity.google_id)
        .await
    {
        Ok(user) => user,
        Err(UserStoreError::UserNotFound) => {
            return error_redirect(CallbackError::NotRegistered, entry)
        }
        Err(e) => {
            tracing::error!(error = ?e, "user lookup failed");
            return error_redirect(CallbackError::Failed, entry);
        }
    };

    // First Google sign-in of a locally registered account links the
    // subject ID; registration provenance is unchanged.
    user.credential.link_google(identity.google_id.clone());
    user.is_email_verified = true;
    user.record_login();

    if let Err(e) = state
        .user_store
        .write()
        .await
        .update_user(user.clone())
        .await
    {
        tracing::error!(error = ?e, "failed to persist Google login");
        return error_redirect(CallbackError::Failed, entry);
    }

    match generate_session_token(&user.id) {
        Ok(token) => token_redirect(&token),
        Err(e) => {
            tracing::error!(error = ?e, "failed to mint session token");
            error_redirect(CallbackError::Failed, entry)
        }
    }
}

#[tracing::instrument(name = "Google register callback", skip_all)]
pub async fn google_register_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GoogleCallbackQuery>,
) -> Redirect {
    let entry = GoogleEntryPoint::Register;

    let identity = match exchange(&state, &query, entry).await {
        Ok(identity) => identity,
        Err(error) => return error_redirect(error, entry),
    };
    let email = identity.email.clone().expect("email presence checked");

    let existing = state
        .user_store
        .read()
        .await
        .get_user_by_email_or_google_id(&email, &identity.google_id)
        .await;
    match existing {
        Ok(_) => {
            return error_redirect(CallbackError::AlreadyRegistered, entry)
        }
        Err(UserStoreError::UserNotFound) => (),
        Err(e) => {
            tracing::error!(error = ?e, "user lookup failed");
            return error_redirect(CallbackError::Failed, entry);
        }
    }

    let mut user = User::new_google(
        email,
        Profile::from_google(
            identity.given_name.as_deref(),
            identity.family_name.as_deref(),
        ),
        identity.google_id,
        client_ip(&headers),
        query.fingerprint.clone(),
    );
    user.record_login();

    // A concurrent registration loses the insert race and lands on the
    // same already-registered signal.
    match state.user_store.write().await.add_user(user.clone()).await {
        Ok(()) => (),
        Err(UserStoreError::UserAlreadyExists) => {
            return error_redirect(CallbackError::AlreadyRegistered, entry)
        }
        Err(e) => {
            tracing::error!(error = ?e, "failed to create Google user");
            return error_redirect(CallbackError::Failed, entry);
        }
    }

    match generate_session_token(&user.id) {
        Ok(token) => token_redirect(&token),
        Err(e) => {
            tracing::error!(error = ?e, "failed to mint session token");
            error_redirect(CallbackError::Failed, entry)
        }
    }
}
