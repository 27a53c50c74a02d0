use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    serve::Serve,
    Json, Router,
};

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::error::Error;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

use domain::{AuthAPIError, WebsiteAPIError};
pub mod routes;
use crate::utils::constants::FRONTEND_URL;
use crate::utils::tracing::*;
use routes::{
    auth::{
        forgot_password, google_login, google_login_callback,
        google_register, google_register_callback, login, me, register,
        resend_verification, reset_password, verify_email,
        verify_reset_code,
    },
    security::{
        change_password, mfa_disable, mfa_setup, mfa_status, mfa_verify,
    },
    websites::{add_website, list_websites},
};
pub mod app_state;
pub mod domain;
pub mod services;
use app_state::AppState;
pub mod utils;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AuthAPIError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AuthAPIError::BotCheckFailed(message) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::BAD_REQUEST, message.clone())
            }
            AuthAPIError::EmailAlreadyVerified => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "Email is already verified".to_string(),
                )
            }
            AuthAPIError::EmailNotVerified => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::FORBIDDEN,
                    "Please verify your email before logging in".to_string(),
                )
            }
            AuthAPIError::IncorrectCredentials => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::UNAUTHORIZED,
                    "Invalid credentials".to_string(),
                )
            }
            AuthAPIError::IncorrectMfaCode => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::UNAUTHORIZED, "Invalid MFA code".to_string())
            }
            AuthAPIError::IncorrectVerificationCode => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid verification code".to_string(),
                )
            }
            AuthAPIError::InvalidToken => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
            AuthAPIError::MissingToken => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::UNAUTHORIZED, "Missing token".to_string())
            }
            AuthAPIError::MfaNotConfigured => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "MFA secret not found. Please set up MFA first."
                        .to_string(),
                )
            }
            AuthAPIError::ProviderMismatch => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::FORBIDDEN,
                    "This account was registered using Google. Please sign \
                     in with Google instead."
                        .to_string(),
                )
            }
            AuthAPIError::ResetTokenExpired => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "Reset token has expired. Please request a new one."
                        .to_string(),
                )
            }
            AuthAPIError::ResetTokenInvalid => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "Reset token is invalid".to_string(),
                )
            }
            AuthAPIError::SamePassword => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "New password must be different from your current \
                     password"
                        .to_string(),
                )
            }
            AuthAPIError::UnexpectedError(_) => {
                log_error_chain(&self, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
            }
            AuthAPIError::UserAlreadyExists => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::CONFLICT,
                    "User already exists with this email".to_string(),
                )
            }
            AuthAPIError::UserNotFound => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::NOT_FOUND, "User not found".to_string())
            }
            AuthAPIError::ValidationError(message) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::BAD_REQUEST, format!("{message}"))
            }
            AuthAPIError::VerificationCodeExpired => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "Verification code has expired. Please request a new \
                     one."
                        .to_string(),
                )
            }
            AuthAPIError::VerificationCodeNotFound => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::BAD_REQUEST,
                    "Verification code not found. Please request a new one."
                        .to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}

impl IntoResponse for WebsiteAPIError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            WebsiteAPIError::AuthenticationError(auth_error) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::UNAUTHORIZED, format!("{auth_error}"))
            }
            WebsiteAPIError::DuplicateDomain(domain) => {
                log_error_chain(&self, Level::DEBUG);
                (
                    StatusCode::CONFLICT,
                    format!(
                        "The domain \"{domain}\" has already been added to \
                         our system. Each domain can only be added once."
                    ),
                )
            }
            WebsiteAPIError::IdAllocationFailed => {
                log_error_chain(&self, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to generate unique website ID. Please try \
                     again."
                        .to_string(),
                )
            }
            WebsiteAPIError::ProvisioningFailed(_) => {
                log_error_chain(&self, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "We encountered an issue while setting up your \
                     website. Please try again in a few moments."
                        .to_string(),
                )
            }
            WebsiteAPIError::UnexpectedError(_) => {
                log_error_chain(&self, Level::ERROR);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unexpected error".to_string(),
                )
            }
            WebsiteAPIError::ValidationError(message) => {
                log_error_chain(&self, Level::DEBUG);
                (StatusCode::BAD_REQUEST, format!("{message}"))
            }
        };
        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}

fn log_error_chain(e: &(dyn Error + 'static), debug_level: Level) {
    let separator =
        "\n-----------------------------------------------------------------------------------\n";
    let mut report = format!("{}{:?}\n", separator, e);
    let mut current = e.source();
    while let Some(cause) = current {
        let str = format!("Caused by:\n\n{:?}", cause);
        report = format!("{}\n{}", report, str);
        current = cause.source();
    }
    report = format!("{}\n{}", report, separator);
    match debug_level {
        Level::ERROR => tracing::error!("{}", report),
        Level::WARN => tracing::warn!("{}", report),
        Level::INFO => tracing::info!("{}", report),
        Level::DEBUG => tracing::debug!("{}", report),
        Level::TRACE => tracing::trace!("{}", report),
    }
}

pub struct Application {
    server: Serve<Router, Router>,
    pub address: String,
}

impl Application {
    pub async fn build(
        app_state: AppState,
        address: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let allowed_origins = [
            FRONTEND_URL.parse()?,
            "http://localhost:3000".parse()?,
            "http://127.0.0.1:3000".parse()?,
        ];

        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_credentials(true)
            .allow_origin(allowed_origins);

        let router = Router::new()
            .route("/auth/register", post(register))
            .route("/auth/verify-email", post(verify_email))
            .route(
                "/auth/resend-verification",
                post(resend_verification),
            )
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/auth/google", get(google_login))
            .route("/auth/google/register", get(google_register))
            .route("/auth/google/callback", get(google_login_callback))
            .route(
                "/auth/google/callback/register",
                get(google_register_callback),
            )
            .route("/auth/forgot-password", post(forgot_password))
            .route("/auth/verify-reset-code", post(verify_reset_code))
            .route("/auth/reset-password", post(reset_password))
            .route("/security/change-password", post(change_password))
            .route("/security/mfa/setup", get(mfa_setup))
            .route("/security/mfa/verify", post(mfa_verify))
            .route("/security/mfa/disable", post(mfa_disable))
            .route("/security/mfa/status", get(mfa_status))
            .route("/websites", post(add_website).get(list_websites))
            .with_state(app_state)
            .layer(cors)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(make_span_with_request_id)
                    .on_request(on_request)
                    .on_response(on_response),
            );

        let listener = tokio::net::TcpListener::bind(address).await?;
        let address = listener.local_addr()?.to_string();
        let server = axum::serve(listener, router);

        Ok(Application { server, address })
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        tracing::info!("listening on {}", &self.address);
        self.server.with_graceful_shutdown(shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn get_postgres_pool(
    url: &Secret<String>,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(url.expose_secret())
        .await
}
