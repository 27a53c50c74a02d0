use color_eyre::eyre::eyre;
use secrecy::ExposeSecret;

use crate::{
    app_state::{IndexProvisionerType, WebsiteStoreType},
    domain::{Website, WebsiteId, WebsiteStoreError},
    WebsiteAPIError,
};

const ID_ALLOCATION_ATTEMPTS: usize = 10;

/// Draw candidate IDs until one is unused. Best-effort pre-check only; the
/// store's unique constraint remains the final arbiter on insert.
#[tracing::instrument(name = "Allocating website ID", skip_all)]
pub async fn allocate_website_id(
    website_store: &WebsiteStoreType,
) -> Result<WebsiteId, WebsiteAPIError> {
    let store = website_store.read().await;
    for _ in 0..ID_ALLOCATION_ATTEMPTS {
        let candidate = WebsiteId::generate();
        let exists = store
            .website_id_exists(&candidate)
            .await
            .map_err(|e| WebsiteAPIError::UnexpectedError(eyre!(e)))?;
        if !exists {
            return Ok(candidate);
        }
    }
    Err(WebsiteAPIError::IdAllocationFailed)
}

/// Two-phase registration: reserve the row, commit the external resource,
/// finalize — or delete the row again so no Website exists without its
/// backing collection.
#[tracing::instrument(name = "Registering website", skip_all)]
pub async fn register_website(
    website_store: &WebsiteStoreType,
    index_provisioner: &IndexProvisionerType,
    website: Website,
) -> Result<Website, WebsiteAPIError> {
    website_store
        .write()
        .await
        .add_website(website.clone())
        .await
        .map_err(|e| match e {
            WebsiteStoreError::DomainAlreadyExists => {
                WebsiteAPIError::DuplicateDomain(
                    website.domain.as_ref().to_string(),
                )
            }
            WebsiteStoreError::WebsiteIdAlreadyExists => {
                WebsiteAPIError::IdAllocationFailed
            }
            err => WebsiteAPIError::UnexpectedError(eyre!(err)),
        })?;

    if let Err(provision_error) = index_provisioner
        .create_collection(&website.website_id)
        .await
    {
        if let Err(delete_error) = website_store
            .write()
            .await
            .delete_website(&website.website_id)
            .await
        {
            tracing::error!(
                website_id = website.website_id.as_ref(),
                owner = website.owner_email.as_ref().expose_secret(),
                error = ?delete_error,
                "failed to roll back website row after provisioning failure"
            );
        }
        return Err(WebsiteAPIError::ProvisioningFailed(provision_error));
    }

    Ok(website)
}
