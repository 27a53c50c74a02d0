use dotenvy::dotenv;
use lazy_static::lazy_static;
use secrecy::Secret;
use std::env as std_env;

lazy_static! {
    pub static ref JWT_SECRET: Secret<String> = set_token();
    pub static ref DATABASE_URL: Secret<String> = get_db_url();
    pub static ref POSTMARK_AUTH_TOKEN: Secret<String> =
        set_postmark_auth_token();
    pub static ref POSTMARK_EMAIL_SENDER_ADDRESS: Secret<String> =
        set_postmark_email_sender_address();
    pub static ref RECAPTCHA_SECRET: Secret<String> = set_recaptcha_secret();
    pub static ref GOOGLE_CLIENT_ID: String =
        load_or_default(env::GOOGLE_CLIENT_ID_ENV_VAR, "");
    pub static ref GOOGLE_CLIENT_SECRET: Secret<String> =
        set_google_client_secret();
    pub static ref BACKEND_URL: String =
        load_or_default(env::BACKEND_URL_ENV_VAR, "http://localhost:8000");
    pub static ref FRONTEND_URL: String =
        load_or_default(env::FRONTEND_URL_ENV_VAR, "http://localhost:3000");
    pub static ref VECTOR_INDEX_URL: String = load_or_default(
        env::VECTOR_INDEX_URL_ENV_VAR,
        "http://localhost:6333"
    );
    pub static ref VECTOR_INDEX_API_KEY: Secret<String> =
        set_vector_index_api_key();
    pub static ref VERIFICATION_CODE_EXPIRE_MINUTES: i64 =
        set_verification_code_expire_minutes();
}

fn load_env() {
    dotenv().ok();
}

fn set_token() -> Secret<String> {
    load_env();
    let secret =
        std_env::var(env::JWT_SECRET_ENV_VAR).expect("JWT_SECRET must be set.");
    if secret.is_empty() {
        panic!("JWT_SECRET must not be empty.");
    }
    Secret::new(secret)
}

fn get_db_url() -> Secret<String> {
    load_env();
    let db_url =
        std_env::var(env::DATABASE_URL_ENV_VAR).expect("DATABASE_URL must be set.");
    if db_url.is_empty() {
        panic!("DATABASE_URL must not be empty.");
    }
    Secret::new(db_url)
}

fn set_postmark_auth_token() -> Secret<String> {
    load_env();
    Secret::new(
        std_env::var(env::POSTMARK_AUTH_TOKEN_ENV_VAR)
            .expect("POSTMARK_AUTH_TOKEN must be set"),
    )
}

fn set_postmark_email_sender_address() -> Secret<String> {
    load_env();
    Secret::new(
        std_env::var(env::POSTMARK_EMAIL_SENDER_ADDRESS_ENV_VAR)
            .expect("POSTMARK_EMAIL_SENDER_ADDRESS must be set"),
    )
}

fn set_recaptcha_secret() -> Secret<String> {
    load_env();
    Secret::new(
        std_env::var(env::RECAPTCHA_SECRET_ENV_VAR)
            .expect("RECAPTCHA_SECRET must be set"),
    )
}

fn set_google_client_secret() -> Secret<String> {
    load_env();
    Secret::new(
        std_env::var(env::GOOGLE_CLIENT_SECRET_ENV_VAR).unwrap_or_default(),
    )
}

fn set_vector_index_api_key() -> Secret<String> {
    load_env();
    Secret::new(
        std_env::var(env::VECTOR_INDEX_API_KEY_ENV_VAR)
            .expect("VECTOR_INDEX_API_KEY must be set"),
    )
}

fn set_verification_code_expire_minutes() -> i64 {
    load_env();
    std_env::var(env::VERIFICATION_CODE_EXPIRE_ENV_VAR)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_VERIFICATION_CODE_EXPIRE_MINUTES)
}

fn load_or_default(variable_name: &str, default_value: &str) -> String {
    load_env();

    match std_env::var(variable_name) {
        Ok(value) => {
            if value.is_empty() {
                String::from(default_value)
            } else {
                value
            }
        }
        Err(_) => String::from(default_value),
    }
}

pub mod env {
    pub const DATABASE_URL_ENV_VAR: &str = "DATABASE_URL";
    pub const JWT_SECRET_ENV_VAR: &str = "JWT_SECRET";
    pub const POSTMARK_AUTH_TOKEN_ENV_VAR: &str = "POSTMARK_AUTH_TOKEN";
    pub const POSTMARK_EMAIL_SENDER_ADDRESS_ENV_VAR: &str =
        "POSTMARK_EMAIL_SENDER_ADDRESS";
    pub const RECAPTCHA_SECRET_ENV_VAR: &str = "RECAPTCHA_SECRET";
    pub const GOOGLE_CLIENT_ID_ENV_VAR: &str = "GOOGLE_CLIENT_ID";
    pub const GOOGLE_CLIENT_SECRET_ENV_VAR: &str = "GOOGLE_CLIENT_SECRET";
    pub const BACKEND_URL_ENV_VAR: &str = "BACKEND_URL";
    pub const FRONTEND_URL_ENV_VAR: &str = "FRONTEND_URL";
    pub const VECTOR_INDEX_URL_ENV_VAR: &str = "VECTOR_INDEX_URL";
    pub const VECTOR_INDEX_API_KEY_ENV_VAR: &str = "VECTOR_INDEX_API_KEY";
    pub const VERIFICATION_CODE_EXPIRE_ENV_VAR: &str =
        "VERIFICATION_CODE_EXPIRE";
}

pub const DEFAULT_VERIFICATION_CODE_EXPIRE_MINUTES: i64 = 15;
pub const RESET_CODE_EXPIRE_MINUTES: i64 = 10;
pub const MFA_ISSUER: &str = "Site Manager";

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
    pub mod email_client {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://api.postmarkapp.com";
        pub const TIMEOUT: Duration = std::time::Duration::from_secs(10);
    }
    pub mod bot_checker {
        use std::time::Duration;

        pub const BASE_URL: &str = "https://www.google.com/recaptcha/api";
        pub const TIMEOUT: Duration = std::time::Duration::from_secs(5);
    }
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";
    pub mod email_client {
        use std::time::Duration;

        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
    pub mod bot_checker {
        use std::time::Duration;

        pub const TIMEOUT: Duration = std::time::Duration::from_millis(200);
    }
}
