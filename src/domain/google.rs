use color_eyre::eyre::Report;
use thiserror::Error;

use super::{Email, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoogleId(String);

impl GoogleId {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(String::from(
                "Google subject ID is empty",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for GoogleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity claims obtained from a completed code exchange. `email` is
/// optional because Google only includes it for the `email` scope; the
/// callback handlers map its absence to a dedicated error code.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub google_id: GoogleId,
    pub email: Option<Email>,
    pub email_verified: bool,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

/// The two OAuth entry points carry distinct redirect URIs; which one a
/// callback belongs to decides login-vs-registration semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoogleEntryPoint {
    Login,
    Register,
}

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("Code exchange failed")]
    ExchangeFailed(#[source] Report),
}

#[async_trait::async_trait]
pub trait GoogleIdentityProvider {
    /// Consent-screen URL for the given entry point.
    fn authorize_url(&self, entry: GoogleEntryPoint) -> String;

    async fn exchange_code(
        &self,
        code: &str,
        entry: GoogleEntryPoint,
    ) -> Result<GoogleIdentity, GoogleAuthError>;
}
