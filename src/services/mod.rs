pub mod data_stores;
pub mod google_oauth_client;
pub mod postmark_email_client;
pub mod qdrant_index_provisioner;
pub mod recaptcha_bot_checker;

pub use google_oauth_client::*;
pub use postmark_email_client::*;
pub use qdrant_index_provisioner::*;
pub use recaptcha_bot_checker::*;
