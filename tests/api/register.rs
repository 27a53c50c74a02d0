use secrecy::Secret;
use site_manager::{domain::Email, ErrorResponse};
use test_context::test_context;

use crate::helpers::{
    get_random_email, mount_bot_failure, mount_bot_success,
    mount_email_success, register_body, TestApp,
};

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_201_and_store_an_unverified_user(app: &mut TestApp) {
    mount_bot_success(app).await;
    mount_email_success(app).await;
    let random_email = get_random_email();

    let response = app
        .post_json(
            "/auth/register",
            &register_body(&random_email, "Passw0rd1"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["userId"].as_str().unwrap().is_empty());
    assert!(
        body.get("token").is_none(),
        "registration must not issue a session token"
    );

    let email = Email::parse(Secret::new(random_email)).unwrap();
    let user = app
        .user_store
        .read()
        .await
        .get_user(&email)
        .await
        .expect("user should have been created");
    assert!(!user.is_email_verified);

    let pending = user
        .email_verification
        .expect("a verification code should be stored");
    assert!(!pending.is_expired());
    assert!(pending.expires_at() > chrono::Utc::now());
}

#[test_context(TestApp)]
#[tokio::test]
async fn registration_succeeds_even_if_email_delivery_fails(
    app: &mut TestApp,
) {
    mount_bot_success(app).await;
    // No email mock mounted: delivery will fail with a connection-level
    // 404 from wiremock's default response.

    let response = app
        .post_json(
            "/auth/register",
            &register_body(&get_random_email(), "Passw0rd1"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_422_if_malformed_input(app: &mut TestApp) {
    let random_email = get_random_email();

    let test_cases = [
        serde_json::json!({
            "email": random_email,
            "password": "Passw0rd1",
        }),
        serde_json::json!({
            "firstName": "Test",
            "lastName": "User",
            "email": random_email,
            "phone": "+44 1234",
            "address": "1 Test Street",
            "howHeard": "Friend",
            "password": true,
            "botToken": "bot-token",
        }),
    ];

    for test_case in test_cases.iter() {
        let response = app.post_json("/auth/register", test_case).await;
        assert_eq!(
            response.status().as_u16(),
            422,
            "Failed for input: {:?}",
            test_case
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_if_invalid_input(app: &mut TestApp) {
    mount_bot_success(app).await;
    let random_email = get_random_email();

    let mut bad_email = register_body("not-an-email", "Passw0rd1");
    bad_email["email"] = serde_json::json!("not-an-email");

    let mut weak_password = register_body(&random_email, "password");
    weak_password["password"] = serde_json::json!("alllowercase");

    let mut bad_how_heard = register_body(&random_email, "Passw0rd1");
    bad_how_heard["howHeard"] = serde_json::json!("Billboard");

    let mut empty_phone = register_body(&random_email, "Passw0rd1");
    empty_phone["phone"] = serde_json::json!("  ");

    for test_case in
        [bad_email, weak_password, bad_how_heard, empty_phone].iter()
    {
        let response = app.post_json("/auth/register", test_case).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "Failed for input: {:?}",
            test_case
        );
    }
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_400_if_bot_check_rejects(app: &mut TestApp) {
    mount_bot_failure(app).await;

    let response = app
        .post_json(
            "/auth/register",
            &register_body(&get_random_email(), "Passw0rd1"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let body = response
        .json::<ErrorResponse>()
        .await
        .expect("Could not deserialize response body to ErrorResponse");
    assert!(body.error.contains("reCAPTCHA"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_409_if_email_already_registered(app: &mut TestApp) {
    mount_bot_success(app).await;
    mount_email_success(app).await;
    let random_email = get_random_email();

    let response = app
        .post_json(
            "/auth/register",
            &register_body(&random_email, "Passw0rd1"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let response = app
        .post_json(
            "/auth/register",
            &register_body(&random_email, "0therPassw0rd"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 409);
}

#[test_context(TestApp)]
#[tokio::test]
async fn duplicate_check_is_case_insensitive(app: &mut TestApp) {
    mount_bot_success(app).await;
    mount_email_success(app).await;
    let random_email = get_random_email();

    let response = app
        .post_json(
            "/auth/register",
            &register_body(&random_email, "Passw0rd1"),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let shouty = random_email.to_uppercase();
    let response = app
        .post_json("/auth/register", &register_body(&shouty, "Passw0rd1"))
        .await;
    assert_eq!(response.status().as_u16(), 409);
}
