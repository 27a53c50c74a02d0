use color_eyre::eyre::eyre;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::domain::{BotCheckError, BotChecker};

/// Minimum v3 score to accept a request as human.
const SCORE_THRESHOLD: f64 = 0.5;

pub struct RecaptchaBotChecker {
    http_client: Client,
    base_url: String,
    secret: Secret<String>,
}

impl RecaptchaBotChecker {
    pub fn new(
        base_url: String,
        secret: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            secret,
        }
    }

    fn rejection_message(error_codes: &[String]) -> String {
        if error_codes.iter().any(|code| code == "invalid-input-secret") {
            String::from(
                "reCAPTCHA configuration error. Please contact support.",
            )
        } else if error_codes
            .iter()
            .any(|code| code == "invalid-input-response")
        {
            String::from(
                "reCAPTCHA verification expired. Please complete the \
                 verification again.",
            )
        } else {
            String::from("reCAPTCHA verification failed. Please try again.")
        }
    }
}

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    score: Option<f64>,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

#[async_trait::async_trait]
impl BotChecker for RecaptchaBotChecker {
    #[tracing::instrument(name = "Verifying bot-defense token", skip_all)]
    async fn verify(
        &self,
        token: &Secret<String>,
        client_ip: Option<&str>,
    ) -> Result<(), BotCheckError> {
        let url = format!(
            "{}/siteverify",
            self.base_url.trim_end_matches('/')
        );

        let mut params = vec![
            ("secret", self.secret.expose_secret().to_owned()),
            ("response", token.expose_secret().to_owned()),
        ];
        if let Some(ip) = client_ip {
            params.push(("remoteip", ip.to_owned()));
        }

        let response: SiteverifyResponse = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| BotCheckError::UnexpectedError(eyre!(e)))?
            .json()
            .await
            .map_err(|e| BotCheckError::UnexpectedError(eyre!(e)))?;

        if !response.success {
            tracing::debug!(
                error_codes = ?response.error_codes,
                "bot check rejected token"
            );
            return Err(BotCheckError::Rejected(Self::rejection_message(
                &response.error_codes,
            )));
        }

        if let Some(score) = response.score {
            if score < SCORE_THRESHOLD {
                tracing::debug!(score, "bot check score below threshold");
                return Err(BotCheckError::Rejected(String::from(
                    "reCAPTCHA verification failed. Please try again.",
                )));
            }
        }

        Ok(())
    }
}
