use color_eyre::eyre::{eyre, Result};
use secrecy::{ExposeSecret, Secret};
use totp_rs::{Algorithm, Secret as TotpSecret, TOTP};

use super::{Email, ValidationError, VerificationCode};

/// Accept codes from ±2 time steps (30 s each), i.e. ±60 s of clock skew.
const TOTP_SKEW: u8 = 2;
const TOTP_DIGITS: usize = 6;
const TOTP_STEP_SECONDS: u64 = 30;

pub const BACKUP_CODE_COUNT: usize = 10;

/// Base32-encoded TOTP shared secret.
#[derive(Debug, Clone)]
pub struct MfaSecret(Secret<String>);

impl MfaSecret {
    pub fn generate() -> Self {
        let encoded = TotpSecret::generate_secret().to_encoded().to_string();
        Self(Secret::new(encoded))
    }

    pub fn parse(s: Secret<String>) -> Result<Self, ValidationError> {
        let encoded = s.expose_secret();
        if encoded.is_empty()
            || !encoded
                .chars()
                .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c))
        {
            return Err(ValidationError::new(String::from(
                "MFA secret is not valid base32",
            )));
        }
        Ok(Self(s))
    }
}

impl PartialEq for MfaSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl AsRef<Secret<String>> for MfaSecret {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// Single-use recovery code, issued in batches of ten at enrollment and
/// stored as the literal string shown to the user.
#[derive(Debug, Clone)]
pub struct BackupCode(Secret<String>);

impl BackupCode {
    pub fn generate_set() -> Vec<Self> {
        (0..BACKUP_CODE_COUNT)
            .map(|_| {
                Self(VerificationCode::generate().as_ref().to_owned())
            })
            .collect()
    }

    pub fn parse(s: Secret<String>) -> Result<Self, ValidationError> {
        let code = VerificationCode::parse(s)?;
        Ok(Self(code.as_ref().to_owned()))
    }
}

impl PartialEq for BackupCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl AsRef<Secret<String>> for BackupCode {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

/// Two-phase enrollment: setup stores the secret without enabling, a first
/// successful TOTP check flips the state to `Enabled`.
#[derive(Debug, Clone, Default)]
pub enum MfaState {
    #[default]
    Disabled,
    PendingEnrollment {
        secret: MfaSecret,
        backup_codes: Vec<BackupCode>,
    },
    Enabled {
        secret: MfaSecret,
        backup_codes: Vec<BackupCode>,
    },
}

impl MfaState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn has_secret(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub fn secret(&self) -> Option<&MfaSecret> {
        match self {
            Self::Disabled => None,
            Self::PendingEnrollment { secret, .. }
            | Self::Enabled { secret, .. } => Some(secret),
        }
    }

    pub fn backup_codes(&self) -> &[BackupCode] {
        match self {
            Self::Disabled => &[],
            Self::PendingEnrollment { backup_codes, .. }
            | Self::Enabled { backup_codes, .. } => backup_codes,
        }
    }

    /// Redeem a backup code at the login step-up: removes it from the
    /// unused set. Returns false (and changes nothing) if the code is not
    /// an unused backup code of an enabled enrollment.
    pub fn redeem_backup_code(&mut self, candidate: &BackupCode) -> bool {
        if let Self::Enabled { backup_codes, .. } = self {
            if let Some(position) =
                backup_codes.iter().position(|code| code == candidate)
            {
                backup_codes.remove(position);
                return true;
            }
        }
        false
    }
}

fn build_totp(
    secret: &MfaSecret,
    issuer: &str,
    account: &Email,
) -> Result<TOTP> {
    let secret_bytes =
        TotpSecret::Encoded(secret.as_ref().expose_secret().to_owned())
            .to_bytes()
            .map_err(|e| eyre!("invalid TOTP secret: {e:?}"))?;

    TOTP::new(
        Algorithm::SHA1,
        TOTP_DIGITS,
        TOTP_SKEW,
        TOTP_STEP_SECONDS,
        secret_bytes,
        Some(issuer.to_string()),
        account.as_ref().expose_secret().to_owned(),
    )
    .map_err(|e| eyre!("failed to build TOTP: {e}"))
}

/// Check a submitted code against the shared secret within the skew window.
#[tracing::instrument(name = "Verifying TOTP code", skip_all)]
pub fn verify_totp_code(
    secret: &MfaSecret,
    issuer: &str,
    account: &Email,
    code: &VerificationCode,
) -> Result<bool> {
    let totp = build_totp(secret, issuer, account)?;
    totp.check_current(code.as_ref().expose_secret())
        .map_err(|e| eyre!("system clock error: {e}"))
}

/// Provisioning URI plus a scannable QR image as a data URL.
#[tracing::instrument(name = "Building TOTP provisioning QR", skip_all)]
pub fn provisioning_qr(
    secret: &MfaSecret,
    issuer: &str,
    account: &Email,
) -> Result<(String, String)> {
    let totp = build_totp(secret, issuer, account)?;
    let uri = totp.get_url();
    let qr = totp
        .get_qr_base64()
        .map_err(|e| eyre!("failed to render QR code: {e}"))?;
    Ok((uri, format!("data:image/png;base64,{}", qr)))
}
