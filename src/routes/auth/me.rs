use axum::{response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AuthAPIError, User},
    utils::auth::AuthenticatedUser,
};

#[tracing::instrument(name = "Get current user", skip_all)]
pub async fn me(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AuthAPIError> {
    Ok(Json(MeResponse {
        user: UserProfileView::from_user(&user),
    }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MeResponse {
    pub user: UserProfileView,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UserProfileView {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "howHeard")]
    pub how_heard: Option<String>,
    #[serde(rename = "isEmailVerified")]
    pub is_email_verified: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<DateTime<Utc>>,
}

impl UserProfileView {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.as_ref().to_string(),
            first_name: user.profile.first_name.as_ref().to_string(),
            last_name: user
                .profile
                .last_name
                .as_ref()
                .map(|name| name.as_ref().to_string())
                .unwrap_or_default(),
            email: user.email.as_ref().expose_secret().to_string(),
            phone: user
                .profile
                .phone
                .as_ref()
                .map(|phone| phone.as_ref().to_string()),
            address: user
                .profile
                .address
                .as_ref()
                .map(|address| address.as_ref().to_string()),
            how_heard: user
                .profile
                .how_heard
                .as_ref()
                .map(|choice| choice.as_str().to_string()),
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}
