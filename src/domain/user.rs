use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};

use super::{
    Email, GoogleId, MfaState, PendingCode, Profile, UserId,
    UserPasswordHash,
};

/// Provider-tagged credential. A locally registered account always has a
/// password hash and may link a Google identity later; a Google-registered
/// account never has a password, and the password-based flows (login,
/// change-password, MFA disable, forgot-password) are rejected for it.
#[derive(Debug, Clone)]
pub enum Credential {
    Local {
        hash: UserPasswordHash,
        google_id: Option<GoogleId>,
    },
    Google {
        google_id: GoogleId,
    },
}

impl Credential {
    pub fn registered_with_google(&self) -> bool {
        matches!(self, Self::Google { .. })
    }

    /// Capability check for password-based operations.
    pub fn password_hash(&self) -> Option<&UserPasswordHash> {
        match self {
            Self::Local { hash, .. } => Some(hash),
            Self::Google { .. } => None,
        }
    }

    pub fn google_id(&self) -> Option<&GoogleId> {
        match self {
            Self::Local { google_id, .. } => google_id.as_ref(),
            Self::Google { google_id } => Some(google_id),
        }
    }

    /// First Google sign-in on a locally registered account records the
    /// subject ID; registration provenance is unchanged.
    pub fn link_google(&mut self, id: GoogleId) {
        if let Self::Local { google_id, .. } = self {
            google_id.get_or_insert(id);
        }
    }

    pub fn set_password_hash(&mut self, new_hash: UserPasswordHash) {
        if let Self::Local { hash, .. } = self {
            *hash = new_hash;
        }
    }
}

/// The single outstanding password-reset token (token phase). Issuing a
/// new token or completing a reset replaces/clears it.
#[derive(Debug, Clone)]
pub struct ResetTokenRecord {
    pub token: Secret<String>,
    pub expires_at: DateTime<Utc>,
}

impl ResetTokenRecord {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn matches(&self, candidate: &Secret<String>) -> bool {
        self.token.expose_secret() == candidate.expose_secret()
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub profile: Profile,
    pub credential: Credential,
    pub is_email_verified: bool,
    pub email_verification: Option<PendingCode>,
    pub password_reset_code: Option<PendingCode>,
    pub password_reset_token: Option<ResetTokenRecord>,
    pub mfa: MfaState,
    pub registration_ip: Option<String>,
    pub device_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new_local(
        email: Email,
        profile: Profile,
        hash: UserPasswordHash,
        registration_ip: Option<String>,
        device_fingerprint: Option<String>,
    ) -> Self {
        Self {
            id: UserId::default(),
            email,
            profile,
            credential: Credential::Local {
                hash,
                google_id: None,
            },
            is_email_verified: false,
            email_verification: None,
            password_reset_code: None,
            password_reset_token: None,
            mfa: MfaState::Disabled,
            registration_ip,
            device_fingerprint,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    /// Google-registered accounts start out email-verified.
    pub fn new_google(
        email: Email,
        profile: Profile,
        google_id: GoogleId,
        registration_ip: Option<String>,
        device_fingerprint: Option<String>,
    ) -> Self {
        Self {
            id: UserId::default(),
            email,
            profile,
            credential: Credential::Google { google_id },
            is_email_verified: true,
            email_verification: None,
            password_reset_code: None,
            password_reset_token: None,
            mfa: MfaState::Disabled,
            registration_ip,
            device_fingerprint,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    pub fn registered_with_google(&self) -> bool {
        self.credential.registered_with_google()
    }

    pub fn record_login(&mut self) {
        self.last_login = Some(Utc::now());
    }
}
