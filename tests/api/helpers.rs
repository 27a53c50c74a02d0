use std::sync::Arc;

use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use site_manager::{
    app_state::{AppState, UserStoreType, WebsiteStoreType},
    domain::Email,
    services::{
        data_stores::{HashmapUserStore, HashmapWebsiteStore},
        GoogleOAuthClient, GoogleOAuthConfig, PostmarkEmailClient,
        QdrantIndexProvisioner, RecaptchaBotChecker,
    },
    utils::constants::test,
    Application,
};
use test_context::AsyncTestContext;
use tokio::sync::RwLock;
use totp_rs::{Algorithm, Secret as TotpSecret, TOTP};
use uuid::Uuid;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub struct TestApp {
    pub address: String,
    pub user_store: UserStoreType,
    pub website_store: WebsiteStoreType,
    pub email_server: MockServer,
    pub bot_server: MockServer,
    pub google_server: MockServer,
    pub vector_server: MockServer,
    pub http_client: Client,
}

impl TestApp {
    pub async fn new() -> Self {
        let user_store: UserStoreType =
            Arc::new(RwLock::new(HashmapUserStore::default()));
        let website_store: WebsiteStoreType =
            Arc::new(RwLock::new(HashmapWebsiteStore::default()));

        let email_server = MockServer::start().await;
        let bot_server = MockServer::start().await;
        let google_server = MockServer::start().await;
        let vector_server = MockServer::start().await;

        let email_client = Arc::new(PostmarkEmailClient::new(
            email_server.uri(),
            Email::parse(Secret::new("accounts@example.com".to_owned()))
                .unwrap(),
            Secret::new("postmark-token".to_owned()),
            Client::builder()
                .timeout(test::email_client::TIMEOUT)
                .build()
                .unwrap(),
        ));

        let bot_checker = Arc::new(RecaptchaBotChecker::new(
            bot_server.uri(),
            Secret::new("recaptcha-secret".to_owned()),
            Client::builder()
                .timeout(test::bot_checker::TIMEOUT)
                .build()
                .unwrap(),
        ));

        let google_auth_client = Arc::new(GoogleOAuthClient::new(
            GoogleOAuthConfig {
                client_id: "test-client-id".to_owned(),
                client_secret: Secret::new("test-client-secret".to_owned()),
                auth_url: format!("{}/auth", google_server.uri()),
                token_url: format!("{}/token", google_server.uri()),
                userinfo_url: format!("{}/userinfo", google_server.uri()),
                login_redirect_uri:
                    "http://localhost:8000/auth/google/callback".to_owned(),
                register_redirect_uri:
                    "http://localhost:8000/auth/google/callback/register"
                        .to_owned(),
            },
            Client::new(),
        ));

        let index_provisioner = Arc::new(QdrantIndexProvisioner::new(
            vector_server.uri(),
            Secret::new("vector-key".to_owned()),
            Client::new(),
        ));

        let app_state = AppState::new(
            user_store.clone(),
            website_store.clone(),
            email_client,
            bot_checker,
            google_auth_client,
            index_provisioner,
        );

        let app = Application::build(app_state, test::APP_ADDRESS)
            .await
            .expect("Failed to build app");
        let address = format!("http://{}", app.address.clone());

        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run());

        // Redirects are asserted on, never followed.
        let http_client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            address,
            user_store,
            website_store,
            email_server,
            bot_server,
            google_server,
            vector_server,
            http_client,
        }
    }

    pub async fn post_json<Body>(
        &self,
        path: &str,
        body: &Body,
    ) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .post(format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json_with_bearer<Body>(
        &self,
        path: &str,
        token: &str,
        body: &Body,
    ) -> reqwest::Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .post(format!("{}{}", &self.address, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http_client
            .get(format!("{}{}", &self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_with_bearer(
        &self,
        path: &str,
        token: &str,
    ) -> reqwest::Response {
        self.http_client
            .get(format!("{}{}", &self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

impl AsyncTestContext for TestApp {
    async fn setup() -> TestApp {
        TestApp::new().await
    }

    async fn teardown(self) {}
}

pub fn get_random_email() -> String {
    format!("{}@example.com", Uuid::new_v4())
}

pub async fn mount_bot_success(app: &TestApp) {
    Mock::given(path("/siteverify"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"success": true, "score": 0.9}),
        ))
        .mount(&app.bot_server)
        .await;
}

pub async fn mount_bot_failure(app: &TestApp) {
    Mock::given(path("/siteverify"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({
                "success": false,
                "error-codes": ["invalid-input-response"]
            }),
        ))
        .mount(&app.bot_server)
        .await;
}

pub async fn mount_email_success(app: &TestApp) {
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;
}

pub async fn mount_provisioning_success(app: &TestApp) {
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.vector_server)
        .await;
}

pub fn register_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "firstName": "Test",
        "lastName": "User",
        "email": email,
        "phone": "+44 1234 567890",
        "address": "1 Test Street, Testville",
        "howHeard": "Friend",
        "password": password,
        "botToken": "bot-token",
    })
}

/// Register and leave the account pending email verification.
pub async fn register_user(app: &TestApp, email: &str, password: &str) {
    mount_bot_success(app).await;
    mount_email_success(app).await;

    let response = app
        .post_json("/auth/register", &register_body(email, password))
        .await;
    assert_eq!(
        response.status().as_u16(),
        201,
        "Failed to register {email}"
    );
}

pub async fn verification_code_for(app: &TestApp, email: &str) -> String {
    let email =
        Email::parse(Secret::new(email.to_owned())).expect("valid email");
    let user = app
        .user_store
        .read()
        .await
        .get_user(&email)
        .await
        .expect("user should exist");
    user.email_verification
        .expect("a verification code should be pending")
        .code()
        .as_ref()
        .expose_secret()
        .to_owned()
}

pub async fn reset_code_for(app: &TestApp, email: &str) -> String {
    let email =
        Email::parse(Secret::new(email.to_owned())).expect("valid email");
    let user = app
        .user_store
        .read()
        .await
        .get_user(&email)
        .await
        .expect("user should exist");
    user.password_reset_code
        .expect("a reset code should be pending")
        .code()
        .as_ref()
        .expose_secret()
        .to_owned()
}

/// Register + verify email, i.e. a fully usable local account.
pub async fn register_verified_user(
    app: &TestApp,
    email: &str,
    password: &str,
) {
    register_user(app, email, password).await;
    let code = verification_code_for(app, email).await;

    let response = app
        .post_json(
            "/auth/verify-email",
            &serde_json::json!({"email": email, "code": code}),
        )
        .await;
    assert_eq!(
        response.status().as_u16(),
        200,
        "Failed to verify {email}"
    );
}

pub async fn login_and_get_token(
    app: &TestApp,
    email: &str,
    password: &str,
) -> String {
    mount_bot_success(app).await;

    let response = app
        .post_json(
            "/auth/login",
            &serde_json::json!({
                "email": email,
                "password": password,
                "botToken": "bot-token",
            }),
        )
        .await;
    assert_eq!(
        response.status().as_u16(),
        200,
        "Failed to log in as {email}"
    );

    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().expect("token in response").to_owned()
}

/// A TOTP code for the current time step, matching the server's MFA
/// parameters.
pub fn totp_code_for(secret_base32: &str) -> String {
    let secret_bytes = TotpSecret::Encoded(secret_base32.to_owned())
        .to_bytes()
        .expect("valid base32 secret");
    let totp = TOTP::new(
        Algorithm::SHA1,
        6,
        2,
        30,
        secret_bytes,
        Some("Site Manager".to_owned()),
        "ignored@example.com".to_owned(),
    )
    .expect("valid TOTP parameters");
    totp.generate_current().expect("system clock is sane")
}

/// Run the two-phase enrollment; returns (secret, backup codes).
pub async fn enable_mfa(
    app: &TestApp,
    token: &str,
) -> (String, Vec<String>) {
    let response = app.get_with_bearer("/security/mfa/setup", token).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let secret = body["secret"].as_str().unwrap().to_owned();

    let code = totp_code_for(&secret);
    let response = app
        .post_json_with_bearer(
            "/security/mfa/verify",
            token,
            &serde_json::json!({"token": code}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let backup_codes = body["backupCodes"]
        .as_array()
        .expect("backup codes in response")
        .iter()
        .map(|code| code.as_str().unwrap().to_owned())
        .collect();

    (secret, backup_codes)
}
