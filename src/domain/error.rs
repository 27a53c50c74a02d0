use color_eyre::eyre::Report;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthAPIError {
    #[error("Bot check failed")]
    BotCheckFailed(String),
    #[error("Email already verified")]
    EmailAlreadyVerified,
    #[error("Email not verified")]
    EmailNotVerified,
    #[error("Invalid credentials")]
    IncorrectCredentials,
    #[error("Invalid MFA code")]
    IncorrectMfaCode,
    #[error("Invalid verification code")]
    IncorrectVerificationCode,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Missing token")]
    MissingToken,
    #[error("MFA is not set up")]
    MfaNotConfigured,
    #[error("Provider mismatch")]
    ProviderMismatch,
    #[error("Reset token expired")]
    ResetTokenExpired,
    #[error("Reset token invalid")]
    ResetTokenInvalid,
    #[error("New password matches current password")]
    SamePassword,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Validation error")]
    ValidationError(#[from] ValidationError),
    #[error("Verification code expired")]
    VerificationCodeExpired,
    #[error("Verification code not found")]
    VerificationCodeNotFound,
}

#[derive(Debug, Error)]
pub enum WebsiteAPIError {
    #[error("Authentication error")]
    AuthenticationError(#[from] AuthAPIError),
    #[error("Domain already registered: {0}")]
    DuplicateDomain(String),
    #[error("Could not allocate a website ID")]
    IdAllocationFailed,
    #[error("Provisioning failed")]
    ProvisioningFailed(#[source] Report),
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
    #[error("Validation error")]
    ValidationError(#[from] ValidationError),
}

#[derive(Debug, Error)]
#[error("Validation error: {0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: String) -> Self {
        Self(message)
    }

    pub fn as_ref(&self) -> &String {
        &self.0
    }
}
