use color_eyre::eyre::Report;
use secrecy::Secret;
use thiserror::Error;

/// Score-based bot defense (reCAPTCHA-style). The token is opaque,
/// supplied by the client, and verified against an external scorer with a
/// bounded timeout.
#[async_trait::async_trait]
pub trait BotChecker {
    async fn verify(
        &self,
        token: &Secret<String>,
        client_ip: Option<&str>,
    ) -> Result<(), BotCheckError>;
}

#[derive(Debug, Error)]
pub enum BotCheckError {
    /// Verification completed and rejected the request; carries the
    /// user-facing message.
    #[error("{0}")]
    Rejected(String),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for BotCheckError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Rejected(_), Self::Rejected(_))
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}
