use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, Secret};

use super::ValidationError;

/// Uniformly random 6-digit decimal code, zero padded. Used for email
/// verification and the code phase of password reset.
#[derive(Clone, Debug)]
pub struct VerificationCode(Secret<String>);

impl VerificationCode {
    pub fn parse(code: Secret<String>) -> Result<Self, ValidationError> {
        let regex = regex::Regex::new(r"^\d{6}$")
            .expect("Regex for VerificationCode parser is invalid");
        if regex.is_match(code.expose_secret()) {
            Ok(Self(code))
        } else {
            Err(ValidationError::new(String::from(
                "Verification code must be 6 digits",
            )))
        }
    }

    pub fn generate() -> Self {
        let code = rand::random::<u32>() % 1_000_000;
        VerificationCode(Secret::new(format!("{:06}", code)))
    }
}

impl PartialEq for VerificationCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl AsRef<Secret<String>> for VerificationCode {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// A stored code plus its expiry. Issuing a new one replaces any previous
/// pending code for the same purpose.
#[derive(Clone, Debug)]
pub struct PendingCode {
    code: VerificationCode,
    expires_at: DateTime<Utc>,
}

impl PendingCode {
    pub fn issue(ttl: Duration) -> Self {
        Self {
            code: VerificationCode::generate(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// Rebuild from stored parts.
    pub fn from_parts(
        code: VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self { code, expires_at }
    }

    pub fn code(&self) -> &VerificationCode {
        &self.code
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn matches(&self, candidate: &VerificationCode) -> bool {
        self.code == *candidate
    }
}
