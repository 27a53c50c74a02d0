use chrono::{Duration, Utc};
use secrecy::Secret;
use site_manager::domain::{Email, PendingCode, VerificationCode};
use test_context::test_context;

use crate::helpers::{
    get_random_email, mount_email_success, register_user,
    verification_code_for, TestApp,
};

#[test_context(TestApp)]
#[tokio::test]
async fn correct_code_verifies_and_issues_a_token(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;
    let code = verification_code_for(app, &random_email).await;

    let response = app
        .post_json(
            "/auth/verify-email",
            &serde_json::json!({"email": random_email, "code": code}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"].as_str().unwrap(), random_email);

    let email = Email::parse(Secret::new(random_email)).unwrap();
    let user = app.user_store.read().await.get_user(&email).await.unwrap();
    assert!(user.is_email_verified);
    assert!(
        user.email_verification.is_none(),
        "the code is single-use and must be cleared"
    );
}

#[test_context(TestApp)]
#[tokio::test]
async fn second_verification_attempt_fails(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;
    let code = verification_code_for(app, &random_email).await;

    let body = serde_json::json!({"email": random_email, "code": code});
    let response = app.post_json("/auth/verify-email", &body).await;
    assert_eq!(response.status().as_u16(), 200);

    // Same correct code again: rejected, never silently double-verified.
    let response = app.post_json("/auth/verify-email", &body).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[test_context(TestApp)]
#[tokio::test]
async fn wrong_code_is_rejected(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;
    let code = verification_code_for(app, &random_email).await;

    let wrong_code = if code == "000000" { "000001" } else { "000000" };
    let response = app
        .post_json(
            "/auth/verify-email",
            &serde_json::json!({"email": random_email, "code": wrong_code}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[test_context(TestApp)]
#[tokio::test]
async fn unknown_email_is_404(app: &mut TestApp) {
    let response = app
        .post_json(
            "/auth/verify-email",
            &serde_json::json!({
                "email": get_random_email(),
                "code": "123456"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}

#[test_context(TestApp)]
#[tokio::test]
async fn expired_code_fails_then_reports_not_found(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;
    let code = verification_code_for(app, &random_email).await;

    // Age the stored code past its expiry.
    let email = Email::parse(Secret::new(random_email.clone())).unwrap();
    {
        let mut store = app.user_store.write().await;
        let mut user = store.get_user(&email).await.unwrap();
        user.email_verification = Some(PendingCode::from_parts(
            VerificationCode::parse(Secret::new(code.clone())).unwrap(),
            Utc::now() - Duration::minutes(1),
        ));
        store.update_user(user).await.unwrap();
    }

    let body = serde_json::json!({"email": random_email, "code": code});
    let response = app.post_json("/auth/verify-email", &body).await;
    assert_eq!(response.status().as_u16(), 400);
    let error: serde_json::Value = response.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().contains("expired"));

    // The artifact was cleared: the same value now reports not-found.
    let response = app.post_json("/auth/verify-email", &body).await;
    assert_eq!(response.status().as_u16(), 400);
    let error: serde_json::Value = response.json().await.unwrap();
    assert!(error["error"].as_str().unwrap().contains("not found"));
}

#[test_context(TestApp)]
#[tokio::test]
async fn resend_replaces_the_previous_code(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;
    let first_code = verification_code_for(app, &random_email).await;

    mount_email_success(app).await;
    let response = app
        .post_json(
            "/auth/resend-verification",
            &serde_json::json!({"email": random_email}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let second_code = verification_code_for(app, &random_email).await;

    if first_code != second_code {
        let response = app
            .post_json(
                "/auth/verify-email",
                &serde_json::json!({
                    "email": random_email,
                    "code": first_code
                }),
            )
            .await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "a replaced code must not verify"
        );
    }

    let response = app
        .post_json(
            "/auth/verify-email",
            &serde_json::json!({
                "email": random_email,
                "code": second_code
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[test_context(TestApp)]
#[tokio::test]
async fn resend_rejects_already_verified_accounts(app: &mut TestApp) {
    let random_email = get_random_email();
    register_user(app, &random_email, "Passw0rd1").await;
    let code = verification_code_for(app, &random_email).await;

    let response = app
        .post_json(
            "/auth/verify-email",
            &serde_json::json!({"email": random_email, "code": code}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .post_json(
            "/auth/resend-verification",
            &serde_json::json!({"email": random_email}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[test_context(TestApp)]
#[tokio::test]
async fn resend_for_unknown_email_is_404(app: &mut TestApp) {
    let response = app
        .post_json(
            "/auth/resend-verification",
            &serde_json::json!({"email": get_random_email()}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 404);
}
