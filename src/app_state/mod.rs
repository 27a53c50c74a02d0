use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{
    BotChecker, EmailClient, GoogleIdentityProvider, IndexProvisioner,
    UserStore, WebsiteStore,
};

pub type UserStoreType = Arc<RwLock<dyn UserStore + Send + Sync>>;
pub type WebsiteStoreType = Arc<RwLock<dyn WebsiteStore + Send + Sync>>;
pub type EmailClientType = Arc<dyn EmailClient + Send + Sync>;
pub type BotCheckerType = Arc<dyn BotChecker + Send + Sync>;
pub type GoogleAuthClientType = Arc<dyn GoogleIdentityProvider + Send + Sync>;
pub type IndexProvisionerType = Arc<dyn IndexProvisioner + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub user_store: UserStoreType,
    pub website_store: WebsiteStoreType,
    pub email_client: EmailClientType,
    pub bot_checker: BotCheckerType,
    pub google_auth_client: GoogleAuthClientType,
    pub index_provisioner: IndexProvisionerType,
}

impl AppState {
    pub fn new(
        user_store: UserStoreType,
        website_store: WebsiteStoreType,
        email_client: EmailClientType,
        bot_checker: BotCheckerType,
        google_auth_client: GoogleAuthClientType,
        index_provisioner: IndexProvisionerType,
    ) -> Self {
        Self {
            user_store,
            website_store,
            email_client,
            bot_checker,
            google_auth_client,
            index_provisioner,
        }
    }
}
