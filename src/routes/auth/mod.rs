mod forgot_password;
mod google;
mod login;
mod me;
mod register;
mod resend_verification;
mod reset_password;
mod verify_email;
mod verify_reset_code;

pub use forgot_password::*;
pub use google::*;
pub use login::*;
pub use me::*;
pub use register::*;
pub use resend_verification::*;
pub use reset_password::*;
pub use verify_email::*;
pub use verify_reset_code::*;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::domain::User;

/// User subset returned by the token-issuing endpoints. Never includes
/// credential or code material.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UserSummary {
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
        }
    }
}
