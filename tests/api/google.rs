use secrecy::Secret;
use site_manager::domain::Email;
use test_context::test_context;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{get_random_email, register_verified_user, TestApp};

async fn mount_google_identity(
    app: &TestApp,
    sub: &str,
    email: &str,
    email_verified: bool,
) {
    Mock::given(path("/token"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"access_token": "access-token"}),
        ))
        .mount(&app.google_server)
        .await;

    Mock::given(path("/userinfo"))
        .and(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({
                "sub": sub,
                "email": email,
                "email_verified": email_verified,
                "given_name": "Ada",
                "family_name": "Lovelace"
            }),
        ))
        .mount(&app.google_server)
        .await;
}

fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_owned()
}

#[test_context(TestApp)]
#[tokio::test]
async fn entry_points_redirect_to_the_consent_screen(app: &mut TestApp) {
    let response = app.get("/auth/google").await;
    assert!(response.status().is_redirection());
    let login_location = location(&response);
    assert!(login_location.contains("client_id=test-client-id"));
    assert!(login_location.contains("response_type=code"));

    let response = app.get("/auth/google/register").await;
    assert!(response.status().is_redirection());
    assert!(location(&response).contains("callback%2Fregister"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn callback_without_code_redirects_with_failure(app: &mut TestApp) {
    let response = app.get("/auth/google/callback").await;
    assert!(response.status().is_redirection());
    assert!(location(&response).ends_with("/login?error=google_auth_failed"));

    let response = app
        .get("/auth/google/callback?error=access_denied")
        .await;
    assert!(location(&response).ends_with("/login?error=google_auth_failed"));

    let response = app.get("/auth/google/callback/register").await;
    assert!(location(&response)
        .ends_with("/register?error=google_auth_failed"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn login_callback_requires_a_registered_user(app: &mut TestApp) {
    mount_google_identity(
        app,
        "google-sub-unknown",
        &get_random_email(),
        true,
    )
    .await;

    let response = app.get("/auth/google/callback?code=auth-code").await;
    assert!(location(&response)
        .ends_with("/login?error=google_auth_not_registered"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn unverified_google_email_is_rejected(app: &mut TestApp) {
    mount_google_identity(
        app,
        "google-sub-unverified",
        &get_random_email(),
        false,
    )
    .await;

    let response = app.get("/auth/google/callback?code=auth-code").await;
    assert!(location(&response)
        .ends_with("/login?error=google_auth_email_not_verified"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn register_callback_creates_a_verified_google_user(
    app: &mut TestApp,
) {
    let google_email = get_random_email();
    mount_google_identity(app, "google-sub-new", &google_email, true).await;

    let response = app
        .get("/auth/google/callback/register?code=auth-code")
        .await;
    let redirect = location(&response);
    assert!(redirect.contains("/dashboard?token="));

    let email = Email::parse(Secret::new(google_email)).unwrap();
    let user = app
        .user_store
        .read()
        .await
        .get_user(&email)
        .await
        .expect("Google registration should create the user");
    assert!(user.registered_with_google());
    assert!(user.is_email_verified);
    assert!(user.credential.password_hash().is_none());
    assert_eq!(user.profile.first_name.as_ref(), "Ada");
}

#[test_context(TestApp)]
#[tokio::test]
async fn register_callback_rejects_existing_accounts(app: &mut TestApp) {
    let google_email = get_random_email();
    mount_google_identity(app, "google-sub-dup", &google_email, true).await;

    let response = app
        .get("/auth/google/callback/register?code=auth-code")
        .await;
    assert!(location(&response).contains("/dashboard?token="));

    // Second registration for the same identity.
    let response = app
        .get("/auth/google/callback/register?code=auth-code")
        .await;
    assert!(location(&response)
        .ends_with("/login?error=google_auth_already_registered"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn login_callback_links_google_to_a_local_account(
    app: &mut TestApp,
) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;

    mount_google_identity(app, "google-sub-link", &random_email, true)
        .await;
    let response = app.get("/auth/google/callback?code=auth-code").await;
    assert!(location(&response).contains("/dashboard?token="));

    let email = Email::parse(Secret::new(random_email)).unwrap();
    let user = app.user_store.read().await.get_user(&email).await.unwrap();
    assert!(
        !user.registered_with_google(),
        "linking must not change registration provenance"
    );
    assert_eq!(
        user.credential.google_id().unwrap().as_ref(),
        "google-sub-link"
    );
    assert!(
        user.credential.password_hash().is_some(),
        "the local password survives the link"
    );
}
