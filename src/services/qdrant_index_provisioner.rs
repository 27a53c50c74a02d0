use color_eyre::eyre::{Result, WrapErr};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

use crate::domain::{IndexProvisioner, WebsiteId};

pub struct QdrantIndexProvisioner {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl QdrantIndexProvisioner {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl IndexProvisioner for QdrantIndexProvisioner {
    #[tracing::instrument(
        name = "Provisioning vector-index collection",
        skip_all
    )]
    async fn create_collection(&self, website_id: &WebsiteId) -> Result<()> {
        let url = format!(
            "{}/collections/{}",
            self.base_url.trim_end_matches('/'),
            website_id.as_ref()
        );

        let body = serde_json::json!({
            "vectors": {
                "size": 2560,
                "distance": "Cosine",
                "on_disk": true
            },
            "on_disk_payload": true,
            "hnsw_config": {
                "m": 16,
                "ef_construct": 100,
                "on_disk": true
            },
            "quantization_config": {
                "scalar": {
                    "type": "int8",
                    "quantile": 0.99,
                    "always_ram": false
                }
            }
        });

        self.http_client
            .put(&url)
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .wrap_err("failed to reach vector-index service")?
            .error_for_status()
            .wrap_err("vector-index collection creation rejected")?;

        Ok(())
    }
}
