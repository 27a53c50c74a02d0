use std::collections::HashMap;

use crate::domain::{
    DomainName, Email, Website, WebsiteId, WebsiteStore, WebsiteStoreError,
};

#[derive(Default)]
pub struct HashmapWebsiteStore {
    websites: HashMap<WebsiteId, Website>,
}

#[async_trait::async_trait]
impl WebsiteStore for HashmapWebsiteStore {
    async fn add_website(
        &mut self,
        website: Website,
    ) -> Result<(), WebsiteStoreError> {
        if self
            .websites
            .values()
            .any(|existing| existing.domain == website.domain)
        {
            return Err(WebsiteStoreError::DomainAlreadyExists);
        }
        if self.websites.contains_key(&website.website_id) {
            return Err(WebsiteStoreError::WebsiteIdAlreadyExists);
        }

        self.websites.insert(website.website_id.clone(), website);
        Ok(())
    }

    async fn delete_website(
        &mut self,
        website_id: &WebsiteId,
    ) -> Result<(), WebsiteStoreError> {
        match self.websites.remove(website_id) {
            Some(_) => Ok(()),
            None => Err(WebsiteStoreError::WebsiteNotFound),
        }
    }

    async fn websites_for_owner(
        &self,
        owner: &Email,
    ) -> Result<Vec<Website>, WebsiteStoreError> {
        let mut owned: Vec<Website> = self
            .websites
            .values()
            .filter(|website| website.owner_email == *owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn domain_exists(
        &self,
        domain: &DomainName,
    ) -> Result<bool, WebsiteStoreError> {
        Ok(self
            .websites
            .values()
            .any(|website| website.domain == *domain))
    }

    async fn website_id_exists(
        &self,
        website_id: &WebsiteId,
    ) -> Result<bool, WebsiteStoreError> {
        Ok(self.websites.contains_key(website_id))
    }
}
