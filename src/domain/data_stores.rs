use super::{DomainName, Email, GoogleId, User, UserId, Website, WebsiteId};
use color_eyre::eyre::Report;
use thiserror::Error;

#[async_trait::async_trait]
pub trait UserStore {
    async fn add_user(&mut self, user: User) -> Result<(), UserStoreError>;
    async fn get_user(&self, email: &Email) -> Result<User, UserStoreError>;
    async fn get_user_by_id(
        &self,
        id: &UserId,
    ) -> Result<User, UserStoreError>;
    /// Lookup for OAuth callbacks: matches on either the email or the
    /// Google subject ID.
    async fn get_user_by_email_or_google_id(
        &self,
        email: &Email,
        google_id: &GoogleId,
    ) -> Result<User, UserStoreError>;
    async fn update_user(&mut self, user: User)
        -> Result<(), UserStoreError>;
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserAlreadyExists, Self::UserAlreadyExists)
                | (Self::UserNotFound, Self::UserNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait::async_trait]
pub trait WebsiteStore {
    /// Insert relies on the store's unique constraints as the final
    /// tie-break for concurrent duplicates.
    async fn add_website(
        &mut self,
        website: Website,
    ) -> Result<(), WebsiteStoreError>;
    /// Compensating delete for failed external provisioning.
    async fn delete_website(
        &mut self,
        website_id: &WebsiteId,
    ) -> Result<(), WebsiteStoreError>;
    /// All records owned by the caller, newest first.
    async fn websites_for_owner(
        &self,
        owner: &Email,
    ) -> Result<Vec<Website>, WebsiteStoreError>;
    async fn domain_exists(
        &self,
        domain: &DomainName,
    ) -> Result<bool, WebsiteStoreError>;
    async fn website_id_exists(
        &self,
        website_id: &WebsiteId,
    ) -> Result<bool, WebsiteStoreError>;
}

#[derive(Debug, Error)]
pub enum WebsiteStoreError {
    #[error("Domain already exists")]
    DomainAlreadyExists,
    #[error("Website ID already exists")]
    WebsiteIdAlreadyExists,
    #[error("Website not found")]
    WebsiteNotFound,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for WebsiteStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::DomainAlreadyExists, Self::DomainAlreadyExists)
                | (Self::WebsiteIdAlreadyExists, Self::WebsiteIdAlreadyExists)
                | (Self::WebsiteNotFound, Self::WebsiteNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}
