use secrecy::Secret;
use site_manager::{
    domain::{Email, GoogleId, Profile, User},
    ErrorResponse,
};
use test_context::test_context;

use crate::helpers::{
    enable_mfa, get_random_email, login_and_get_token, mount_bot_failure,
    mount_bot_success, register_user, register_verified_user,
    totp_code_for, TestApp,
};

fn login_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": password,
        "botToken": "bot-token",
    })
}

#[test_context(TestApp)]
#[tokio::test]
async fn valid_credentials_return_a_token(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;

    mount_bot_success(app).await;
    let response = app
        .post_json("/auth/login", &login_body(&random_email, "Passw0rd1"))
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"].as_str().unwrap(), random_email);

    let email = Email::parse(Secret::new(random_email)).unwrap();
    let user = app.user_store.read().await.get_user(&email).await.unwrap();
    assert!(user.last_login.is_some());
}

#[test_context(TestApp)]
#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable(
    app: &mut TestApp,
) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;

    mount_bot_success(app).await;
    let wrong_password = app
        .post_json("/auth/login", &login_body(&random_email, "Wr0ngPass1"))
        .await;
    assert_eq!(wrong_password.status().as_u16(), 401);
    let wrong_password_error =
        wrong_password.json::<ErrorResponse>().await.unwrap().error;

    let unknown_user = app
        .post_json(
            "/auth/login",
            &login_body(&get_random_email(), "Passw0rd1"),
        )
        .await;
    assert_eq!(unknown_user.status().as_u16(), 401);
    let unknown_user_error =
        unknown_user.json::<ErrorResponse>().await.unwrap().error;

    assert_eq!(
        wrong_password_error, unknown_user_error,
        "login must not reveal which of user/password was wrong"
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn unverified_account_cannot_log_in(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;

    mount_bot_success(app).await;
    // Correct password, but the email was never verified.
    let response = app
        .post_json("/auth/login", &login_body(&random_email, "Passw0rd1"))
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.get("token").is_none());
}

#[test_context(TestApp)]
#[tokio::test]
async fn google_registered_account_gets_provider_mismatch(
    app: &mut TestApp,
) {
    let random_email = get_random_email();
    let user = User::new_google(
        Email::parse(Secret::new(random_email.clone())).unwrap(),
        Profile::from_google(Some("G"), None),
        GoogleId::parse("google-sub-login").unwrap(),
        None,
        None,
    );
    app.user_store.write().await.add_user(user).await.unwrap();

    mount_bot_success(app).await;
    let response = app
        .post_json("/auth/login", &login_body(&random_email, "Passw0rd1"))
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let body = response.json::<ErrorResponse>().await.unwrap();
    assert!(body.error.contains("Google"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn bot_check_rejection_blocks_login(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;

    // Remount: the scorer now rejects.
    app.bot_server.reset().await;
    mount_bot_failure(app).await;

    let response = app
        .post_json("/auth/login", &login_body(&random_email, "Passw0rd1"))
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[test_context(TestApp)]
#[tokio::test]
async fn should_return_422_if_malformed_credentials(app: &mut TestApp) {
    let test_cases = [
        serde_json::json!({"email": get_random_email()}),
        serde_json::json!({"password": "Passw0rd1"}),
        serde_json::json!({
            "email": true,
            "password": "Passw0rd1",
            "botToken": "bot-token"
        }),
    ];

    for test_case in test_cases.iter() {
        let response = app.post_json("/auth/login", test_case).await;
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
async fn mfa_enabled_login_requires_a_second_step(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;
    let (secret, _) = enable_mfa(app, &token).await;

    mount_bot_success(app).await;

    // Password alone: MFA-required signal, no token.
    let response = app
        .post_json("/auth/login", &login_body(&random_email, "Passw0rd1"))
        .await;
    assert_eq!(response.status().as_u16(), 206);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["mfaRequired"], serde_json::json!(true));
    assert!(body.get("token").is_none());

    // Wrong code: still no token.
    let current_code = totp_code_for(&secret);
    if current_code != "000000" {
        let mut with_wrong_code = login_body(&random_email, "Passw0rd1");
        with_wrong_code["mfaToken"] = serde_json::json!("000000");
        let response =
            app.post_json("/auth/login", &with_wrong_code).await;
        assert_eq!(response.status().as_u16(), 401);
    }

    // Correct TOTP code: full session.
    let mut with_code = login_body(&random_email, "Passw0rd1");
    with_code["mfaToken"] = serde_json::json!(totp_code_for(&secret));
    let response = app.post_json("/auth/login", &with_code).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[test_context(TestApp)]
#[tokio::test]
async fn backup_code_is_accepted_once_at_the_mfa_step(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;
    let (secret, backup_codes) = enable_mfa(app, &token).await;

    mount_bot_success(app).await;

    // Pick a backup code that cannot collide with the current TOTP code.
    let current = totp_code_for(&secret);
    let backup_code = backup_codes
        .iter()
        .find(|code| **code != current)
        .expect("ten backup codes cannot all equal the TOTP code");

    let mut with_backup = login_body(&random_email, "Passw0rd1");
    with_backup["mfaToken"] = serde_json::json!(backup_code);
    let response = app.post_json("/auth/login", &with_backup).await;
    assert_eq!(response.status().as_u16(), 200);

    // Consumed: the same backup code does not work twice.
    let response = app.post_json("/auth/login", &with_backup).await;
    assert_eq!(response.status().as_u16(), 401);
}

#[test_context(TestApp)]
#[tokio::test]
async fn me_returns_the_profile_for_a_valid_bearer_token(
    app: &mut TestApp,
) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;

    let response = app.get_with_bearer("/auth/me", &token).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"].as_str().unwrap(), random_email);
    assert_eq!(body["user"]["firstName"].as_str().unwrap(), "Test");
    assert!(body["user"]["isEmailVerified"].as_bool().unwrap());
    assert!(
        body["user"].get("passwordHash").is_none()
            && body["user"].get("password").is_none(),
        "no credential material in any read path"
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn protected_routes_reject_missing_and_invalid_tokens(
    app: &mut TestApp,
) {
    let response = app.get("/auth/me").await;
    assert_eq!(response.status().as_u16(), 401);

    let response = app.get_with_bearer("/auth/me", "not-a-jwt").await;
    assert_eq!(response.status().as_u16(), 401);
}
