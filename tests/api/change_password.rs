use secrecy::Secret;
use site_manager::domain::{Email, GoogleId, Profile, User};
use test_context::test_context;

use crate::helpers::{
    get_random_email, login_and_get_token, mount_bot_success,
    register_verified_user, TestApp,
};

#[test_context(TestApp)]
#[tokio::test]
async fn change_password_happy_path(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;

    let response = app
        .post_json_with_bearer(
            "/security/change-password",
            &token,
            &serde_json::json!({
                "currentPassword": "Passw0rd1",
                "newPassword": "N3wPassword"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    mount_bot_success(app).await;
    let response = app
        .post_json(
            "/auth/login",
            &serde_json::json!({
                "email": random_email,
                "password": "Passw0rd1",
                "botToken": "bot-token",
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 401);

    login_and_get_token(app, &random_email, "N3wPassword").await;
}

#[test_context(TestApp)]
#[tokio::test]
async fn wrong_current_password_is_401(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;

    let response = app
        .post_json_with_bearer(
            "/security/change-password",
            &token,
            &serde_json::json!({
                "currentPassword": "Wr0ngPass1",
                "newPassword": "N3wPassword"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 401);
}

#[test_context(TestApp)]
#[tokio::test]
async fn new_password_must_differ_from_current(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;

    let response = app
        .post_json_with_bearer(
            "/security/change-password",
            &token,
            &serde_json::json!({
                "currentPassword": "Passw0rd1",
                "newPassword": "Passw0rd1"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[test_context(TestApp)]
#[tokio::test]
async fn weak_new_password_is_400(app: &mut TestApp) {
    let random_email = get_random_email();
    register_verified_user(app, &random_email, "Passw0rd1").await;
    let token = login_and_get_token(app, &random_email, "Passw0rd1").await;

    let response = app
        .post_json_with_bearer(
            "/security/change-password",
            &token,
            &serde_json::json!({
                "currentPassword": "Passw0rd1",
                "newPassword": "short"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);
}

#[test_context(TestApp)]
#[tokio::test]
async fn google_registered_accounts_cannot_change_password(
    app: &mut TestApp,
) {
    let random_email = get_random_email();
    let user = User::new_google(
        Email::parse(Secret::new(random_email.clone())).unwrap(),
        Profile::from_google(Some("G"), None),
        GoogleId::parse("google-sub-change").unwrap(),
        None,
        None,
    );
    let user_id = user.id.clone();
    app.user_store.write().await.add_user(user).await.unwrap();

    let token =
        site_manager::utils::auth::generate_session_token(&user_id)
            .unwrap();
    let response = app
        .post_json_with_bearer(
            "/security/change-password",
            secrecy::ExposeSecret::expose_secret(&token),
            &serde_json::json!({
                "currentPassword": "Passw0rd1",
                "newPassword": "N3wPassword"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);
}

#[test_context(TestApp)]
#[tokio::test]
async fn requires_a_bearer_token(app: &mut TestApp) {
    let response = app
        .post_json(
            "/security/change-password",
            &serde_json::json!({
                "currentPassword": "Passw0rd1",
                "newPassword": "N3wPassword"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 401);
}
