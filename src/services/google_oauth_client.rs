use color_eyre::eyre::eyre;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::domain::{
    Email, GoogleAuthError, GoogleEntryPoint, GoogleId, GoogleIdentity,
    GoogleIdentityProvider,
};

/// Immutable OAuth configuration. The login and registration flows use
/// different redirect URIs so the callback can tell them apart; both are
/// fixed at construction.
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub login_redirect_uri: String,
    pub register_redirect_uri: String,
}

impl GoogleOAuthConfig {
    pub fn with_default_endpoints(
        client_id: String,
        client_secret: Secret<String>,
        backend_url: &str,
    ) -> Self {
        let backend = backend_url.trim_end_matches('/');
        Self {
            client_id,
            client_secret,
            auth_url: String::from(
                "https://accounts.google.com/o/oauth2/v2/auth",
            ),
            token_url: String::from("https://oauth2.googleapis.com/token"),
            userinfo_url: String::from(
                "https://openidconnect.googleapis.com/v1/userinfo",
            ),
            login_redirect_uri: format!("{backend}/auth/google/callback"),
            register_redirect_uri: format!(
                "{backend}/auth/google/callback/register"
            ),
        }
    }
}

pub struct GoogleOAuthClient {
    http_client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleOAuthConfig, http_client: Client) -> Self {
        Self {
            http_client,
            config,
        }
    }

    fn redirect_uri(&self, entry: GoogleEntryPoint) -> &str {
        match entry {
            GoogleEntryPoint::Login => &self.config.login_redirect_uri,
            GoogleEntryPoint::Register => {
                &self.config.register_redirect_uri
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    given_name: Option<String>,
    family_name: Option<String>,
}

#[async_trait::async_trait]
impl GoogleIdentityProvider for GoogleOAuthClient {
    fn authorize_url(&self, entry: GoogleEntryPoint) -> String {
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.redirect_uri(entry)),
                ("response_type", "code"),
                ("scope", "profile email"),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .expect("auth URL is valid");
        url.to_string()
    }

    #[tracing::instrument(name = "Exchanging Google auth code", skip_all)]
    async fn exchange_code(
        &self,
        code: &str,
        entry: GoogleEntryPoint,
    ) -> Result<GoogleIdentity, GoogleAuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            (
                "client_secret",
                self.config.client_secret.expose_secret().as_str(),
            ),
            ("redirect_uri", self.redirect_uri(entry)),
            ("grant_type", "authorization_code"),
        ];

        let token: TokenResponse = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?
            .error_for_status()
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?
            .json()
            .await
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?;

        let info: UserInfoResponse = self
            .http_client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?
            .error_for_status()
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?
            .json()
            .await
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?;

        let google_id = GoogleId::parse(&info.sub)
            .map_err(|e| GoogleAuthError::ExchangeFailed(eyre!(e)))?;
        let email = info
            .email
            .and_then(|raw| Email::parse(Secret::new(raw)).ok());

        Ok(GoogleIdentity {
            google_id,
            email,
            email_verified: info.email_verified,
            given_name: info.given_name,
            family_name: info.family_name,
        })
    }
}
