use std::sync::Arc;

use reqwest::Client;
use secrecy::Secret;
use sqlx::PgPool;
use tokio::sync::RwLock;

use site_manager::{
    app_state::AppState,
    domain::Email,
    get_postgres_pool,
    services::{
        data_stores::{PostgresUserStore, PostgresWebsiteStore},
        GoogleOAuthClient, GoogleOAuthConfig, PostmarkEmailClient,
        QdrantIndexProvisioner, RecaptchaBotChecker,
    },
    utils::{
        constants::{
            prod, BACKEND_URL, DATABASE_URL, GOOGLE_CLIENT_ID,
            GOOGLE_CLIENT_SECRET, POSTMARK_AUTH_TOKEN,
            POSTMARK_EMAIL_SENDER_ADDRESS, RECAPTCHA_SECRET,
            VECTOR_INDEX_API_KEY, VECTOR_INDEX_URL,
        },
        tracing::init_tracing,
    },
    Application,
};

#[tokio::main]
async fn main() {
    color_eyre::install().expect("Failed to install color_eyre");
    init_tracing().expect("Failed to initialize tracing");

    let pg_pool = configure_postgresql().await;
    let user_store =
        Arc::new(RwLock::new(PostgresUserStore::new(pg_pool.clone())));
    let website_store =
        Arc::new(RwLock::new(PostgresWebsiteStore::new(pg_pool)));

    let email_client = Arc::new(configure_postmark_email_client());
    let bot_checker = Arc::new(configure_bot_checker());
    let google_auth_client = Arc::new(configure_google_oauth_client());
    let index_provisioner = Arc::new(configure_index_provisioner());

    let app_state = AppState::new(
        user_store,
        website_store,
        email_client,
        bot_checker,
        google_auth_client,
        index_provisioner,
    );

    let app = Application::build(app_state, prod::APP_ADDRESS)
        .await
        .expect("Failed to build app");

    app.run().await.expect("Failed to run app");
}

async fn configure_postgresql() -> PgPool {
    let pg_pool = get_postgres_pool(&DATABASE_URL)
        .await
        .expect("Failed to create Postgres connection pool!");

    sqlx::migrate!()
        .run(&pg_pool)
        .await
        .expect("Failed to run migrations");

    pg_pool
}

fn configure_postmark_email_client() -> PostmarkEmailClient {
    let http_client = Client::builder()
        .timeout(prod::email_client::TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    PostmarkEmailClient::new(
        prod::email_client::BASE_URL.to_owned(),
        Email::parse(POSTMARK_EMAIL_SENDER_ADDRESS.to_owned())
            .expect("Invalid sender email address"),
        POSTMARK_AUTH_TOKEN.to_owned(),
        http_client,
    )
}

fn configure_bot_checker() -> RecaptchaBotChecker {
    let http_client = Client::builder()
        .timeout(prod::bot_checker::TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    RecaptchaBotChecker::new(
        prod::bot_checker::BASE_URL.to_owned(),
        RECAPTCHA_SECRET.to_owned(),
        http_client,
    )
}

fn configure_google_oauth_client() -> GoogleOAuthClient {
    let config = GoogleOAuthConfig::with_default_endpoints(
        GOOGLE_CLIENT_ID.to_owned(),
        GOOGLE_CLIENT_SECRET.to_owned(),
        &BACKEND_URL,
    );
    GoogleOAuthClient::new(config, Client::new())
}

fn configure_index_provisioner() -> QdrantIndexProvisioner {
    QdrantIndexProvisioner::new(
        VECTOR_INDEX_URL.to_owned(),
        VECTOR_INDEX_API_KEY.to_owned(),
        Client::new(),
    )
}
