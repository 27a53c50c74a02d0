use color_eyre::eyre::Result;

use super::WebsiteId;

/// Creates the external per-website vector-index collection keyed by the
/// website ID. A failure here triggers the compensating delete of the
/// just-inserted Website row.
#[async_trait::async_trait]
pub trait IndexProvisioner {
    async fn create_collection(&self, website_id: &WebsiteId) -> Result<()>;
}
