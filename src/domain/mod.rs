mod bot_checker;
mod data_stores;
mod email;
mod email_client;
mod error;
mod google;
mod index_provisioner;
mod mfa;
mod password;
mod profile;
mod user;
mod user_id;
mod user_password_hash;
mod verification_code;
mod website;

pub use bot_checker::*;
pub use data_stores::*;
pub use email::*;
pub use email_client::*;
pub use error::*;
pub use google::*;
pub use index_provisioner::*;
pub use mfa::*;
pub use password::*;
pub use profile::*;
pub use user::*;
pub use user_id::*;
pub use user_password_hash::*;
pub use verification_code::*;
pub use website::*;
