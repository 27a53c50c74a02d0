use chrono::{DateTime, Utc};
use color_eyre::eyre::{eyre, Result};
use secrecy::{ExposeSecret, Secret};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::{
    BackupCode, Credential, Email, GoogleId, MfaSecret, MfaState,
    PendingCode, PersonName, Profile, ResetTokenRecord, User, UserId,
    UserPasswordHash, UserStore, UserStoreError, VerificationCode,
};

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_USER: &str = "SELECT id, email, first_name, last_name, phone, \
     address, how_heard, password_hash, google_id, registered_with_google, \
     is_email_verified, email_verification_code, \
     email_verification_code_expire, password_reset_code, \
     password_reset_code_expire, password_reset_token, \
     password_reset_token_expire, mfa_enabled, mfa_secret, \
     mfa_backup_codes, registration_ip, device_fingerprint, created_at, \
     last_login FROM users";

fn pending_code_from_columns(
    code: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<Option<PendingCode>> {
    match (code, expires_at) {
        (Some(code), Some(expires_at)) => {
            let code = VerificationCode::parse(Secret::new(code))
                .map_err(|e| eyre!(e))?;
            Ok(Some(PendingCode::from_parts(code, expires_at)))
        }
        _ => Ok(None),
    }
}

fn user_from_row(row: &PgRow) -> Result<User> {
    let email =
        Email::parse(Secret::new(row.try_get::<String, _>("email")?))
            .map_err(|e| eyre!(e))?;

    let google_id: Option<GoogleId> = row
        .try_get::<Option<String>, _>("google_id")?
        .map(|id| GoogleId::parse(&id))
        .transpose()
        .map_err(|e| eyre!(e))?;

    let credential = if row.try_get::<bool, _>("registered_with_google")? {
        Credential::Google {
            google_id: google_id
                .ok_or_else(|| eyre!("Google account without google_id"))?,
        }
    } else {
        let hash = row
            .try_get::<Option<String>, _>("password_hash")?
            .ok_or_else(|| eyre!("local account without password hash"))?;
        Credential::Local {
            hash: UserPasswordHash::parse(Secret::new(hash))?,
            google_id,
        }
    };

    let mfa_secret: Option<MfaSecret> = row
        .try_get::<Option<String>, _>("mfa_secret")?
        .map(|secret| MfaSecret::parse(Secret::new(secret)))
        .transpose()
        .map_err(|e| eyre!(e))?;
    let backup_codes: Vec<BackupCode> = row
        .try_get::<Vec<String>, _>("mfa_backup_codes")?
        .into_iter()
        .map(|code| BackupCode::parse(Secret::new(code)))
        .collect::<Result<_, _>>()
        .map_err(|e| eyre!(e))?;
    let mfa = match (row.try_get::<bool, _>("mfa_enabled")?, mfa_secret) {
        (_, None) => MfaState::Disabled,
        (false, Some(secret)) => MfaState::PendingEnrollment {
            secret,
            backup_codes,
        },
        (true, Some(secret)) => MfaState::Enabled {
            secret,
            backup_codes,
        },
    };

    let password_reset_token = match (
        row.try_get::<Option<String>, _>("password_reset_token")?,
        row.try_get::<Option<DateTime<Utc>>, _>(
            "password_reset_token_expire",
        )?,
    ) {
        (Some(token), Some(expires_at)) => Some(ResetTokenRecord {
            token: Secret::new(token),
            expires_at,
        }),
        _ => None,
    };

    let profile = Profile {
        first_name: PersonName::parse(
            &row.try_get::<String, _>("first_name")?,
        )
        .map_err(|e| eyre!(e))?,
        last_name: row
            .try_get::<Option<String>, _>("last_name")?
            .filter(|name| !name.is_empty())
            .map(|name| PersonName::parse(&name))
            .transpose()
            .map_err(|e| eyre!(e))?,
        phone: row
            .try_get::<Option<String>, _>("phone")?
            .map(|phone| crate::domain::Phone::parse(&phone))
            .transpose()
            .map_err(|e| eyre!(e))?,
        address: row
            .try_get::<Option<String>, _>("address")?
            .map(|address| crate::domain::Address::parse(&address))
            .transpose()
            .map_err(|e| eyre!(e))?,
        how_heard: row
            .try_get::<Option<String>, _>("how_heard")?
            .map(|choice| crate::domain::HowHeard::parse(&choice))
            .transpose()
            .map_err(|e| eyre!(e))?,
    };

    Ok(User {
        id: UserId::new(row.try_get("id")?),
        email,
        profile,
        credential,
        is_email_verified: row.try_get("is_email_verified")?,
        email_verification: pending_code_from_columns(
            row.try_get("email_verification_code")?,
            row.try_get("email_verification_code_expire")?,
        )?,
        password_reset_code: pending_code_from_columns(
            row.try_get("password_reset_code")?,
            row.try_get("password_reset_code_expire")?,
        )?,
        password_reset_token,
        mfa,
        registration_ip: row.try_get("registration_ip")?,
        device_fingerprint: row.try_get("device_fingerprint")?,
        created_at: row.try_get("created_at")?,
        last_login: row.try_get("last_login")?,
    })
}

struct UserColumns<'a> {
    password_hash: Option<&'a Secret<String>>,
    google_id: Option<&'a str>,
    mfa_secret: Option<&'a Secret<String>>,
    mfa_backup_codes: Vec<String>,
}

fn user_columns(user: &User) -> UserColumns<'_> {
    UserColumns {
        password_hash: user.credential.password_hash().map(|h| h.as_ref()),
        google_id: user.credential.google_id().map(|id| id.as_ref()),
        mfa_secret: user.mfa.secret().map(|secret| secret.as_ref()),
        mfa_backup_codes: user
            .mfa
            .backup_codes()
            .iter()
            .map(|code| code.as_ref().expose_secret().to_owned())
            .collect(),
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[tracing::instrument(name = "Adding user to PostgreSQL", skip_all)]
    async fn add_user(&mut self, user: User) -> Result<(), UserStoreError> {
        let columns = user_columns(&user);

        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, phone, \
             address, how_heard, password_hash, google_id, \
             registered_with_google, is_email_verified, \
             email_verification_code, email_verification_code_expire, \
             password_reset_code, password_reset_code_expire, \
             password_reset_token, password_reset_token_expire, \
             mfa_enabled, mfa_secret, mfa_backup_codes, registration_ip, \
             device_fingerprint, created_at, last_login) VALUES ($1, $2, \
             $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
             $16, $17, $18, $19, $20, $21, $22, $23, $24)",
        )
        .bind(user.id.as_ref())
        .bind(user.email.as_ref().expose_secret())
        .bind(user.profile.first_name.as_ref())
        .bind(user.profile.last_name.as_ref().map(|name| name.as_ref()))
        .bind(user.profile.phone.as_ref().map(|phone| phone.as_ref()))
        .bind(user.profile.address.as_ref().map(|a| a.as_ref()))
        .bind(user.profile.how_heard.as_ref().map(|h| h.as_str()))
        .bind(columns.password_hash.map(|hash| hash.expose_secret()))
        .bind(columns.google_id)
        .bind(user.registered_with_google())
        .bind(user.is_email_verified)
        .bind(
            user.email_verification
                .as_ref()
                .map(|p| p.code().as_ref().expose_secret().to_owned()),
        )
        .bind(user.email_verification.as_ref().map(|p| p.expires_at()))
        .bind(
            user.password_reset_code
                .as_ref()
                .map(|p| p.code().as_ref().expose_secret().to_owned()),
        )
        .bind(user.password_reset_code.as_ref().map(|p| p.expires_at()))
        .bind(
            user.password_reset_token
                .as_ref()
                .map(|t| t.token.expose_secret().to_owned()),
        )
        .bind(user.password_reset_token.as_ref().map(|t| t.expires_at))
        .bind(user.mfa.is_enabled())
        .bind(columns.mfa_secret.map(|secret| secret.expose_secret()))
        .bind(&columns.mfa_backup_codes)
        .bind(user.registration_ip.as_deref())
        .bind(user.device_fingerprint.as_deref())
        .bind(user.created_at)
        .bind(user.last_login)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserStoreError::UserAlreadyExists
            }
            err => UserStoreError::UnexpectedError(eyre!(err)),
        })?;
        Ok(())
    }

    #[tracing::instrument(name = "Retrieving user from PostgreSQL", skip_all)]
    async fn get_user(&self, email: &Email) -> Result<User, UserStoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.as_ref().expose_secret())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => UserStoreError::UserNotFound,
                err => UserStoreError::UnexpectedError(eyre!(err)),
            })?;

        user_from_row(&row).map_err(UserStoreError::UnexpectedError)
    }

    #[tracing::instrument(
        name = "Retrieving user by ID from PostgreSQL",
        skip_all
    )]
    async fn get_user_by_id(
        &self,
        id: &UserId,
    ) -> Result<User, UserStoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id.as_ref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => UserStoreError::UserNotFound,
                err => UserStoreError::UnexpectedError(eyre!(err)),
            })?;

        user_from_row(&row).map_err(UserStoreError::UnexpectedError)
    }

    #[tracing::instrument(
        name = "Retrieving user by email or Google ID from PostgreSQL",
        skip_all
    )]
    async fn get_user_by_email_or_google_id(
        &self,
        email: &Email,
        google_id: &GoogleId,
    ) -> Result<User, UserStoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_USER} WHERE email = $1 OR google_id = $2"
        ))
        .bind(email.as_ref().expose_secret())
        .bind(google_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => UserStoreError::UserNotFound,
            err => UserStoreError::UnexpectedError(eyre!(err)),
        })?;

        user_from_row(&row).map_err(UserStoreError::UnexpectedError)
    }

    #[tracing::instrument(name = "Updating user in PostgreSQL", skip_all)]
    async fn update_user(
        &mut self,
        user: User,
    ) -> Result<(), UserStoreError> {
        let columns = user_columns(&user);

        let result = sqlx::query(
            "UPDATE users SET email = $2, first_name = $3, last_name = $4, \
             phone = $5, address = $6, how_heard = $7, password_hash = $8, \
             google_id = $9, registered_with_google = $10, \
             is_email_verified = $11, email_verification_code = $12, \
             email_verification_code_expire = $13, password_reset_code = \
             $14, password_reset_code_expire = $15, password_reset_token = \
             $16, password_reset_token_expire = $17, mfa_enabled = $18, \
             mfa_secret = $19, mfa_backup_codes = $20, registration_ip = \
             $21, device_fingerprint = $22, last_login = $23 WHERE id = $1",
        )
        .bind(user.id.as_ref())
        .bind(user.email.as_ref().expose_secret())
        .bind(user.profile.first_name.as_ref())
        .bind(user.profile.last_name.as_ref().map(|name| name.as_ref()))
        .bind(user.profile.phone.as_ref().map(|phone| phone.as_ref()))
        .bind(user.profile.address.as_ref().map(|a| a.as_ref()))
        .bind(user.profile.how_heard.as_ref().map(|h| h.as_str()))
        .bind(columns.password_hash.map(|hash| hash.expose_secret()))
        .bind(columns.google_id)
        .bind(user.registered_with_google())
        .bind(user.is_email_verified)
        .bind(
            user.email_verification
                .as_ref()
                .map(|p| p.code().as_ref().expose_secret().to_owned()),
        )
        .bind(user.email_verification.as_ref().map(|p| p.expires_at()))
        .bind(
            user.password_reset_code
                .as_ref()
                .map(|p| p.code().as_ref().expose_secret().to_owned()),
        )
        .bind(user.password_reset_code.as_ref().map(|p| p.expires_at()))
        .bind(
            user.password_reset_token
                .as_ref()
                .map(|t| t.token.expose_secret().to_owned()),
        )
        .bind(user.password_reset_token.as_ref().map(|t| t.expires_at))
        .bind(user.mfa.is_enabled())
        .bind(columns.mfa_secret.map(|secret| secret.expose_secret()))
        .bind(&columns.mfa_backup_codes)
        .bind(user.registration_ip.as_deref())
        .bind(user.device_fingerprint.as_deref())
        .bind(user.last_login)
        .execute(&self.pool)
        .await
        .map_err(|e| UserStoreError::UnexpectedError(eyre!(e)))?;

        if result.rows_affected() == 0 {
            return Err(UserStoreError::UserNotFound);
        }

        Ok(())
    }
}
