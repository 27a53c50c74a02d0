mod add_website;
mod list_websites;

pub use add_website::*;
pub use list_websites::*;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::domain::Website;

#[derive(Debug, Deserialize, Serialize)]
pub struct WebsiteView {
    #[serde(rename = "websiteId")]
    pub website_id: String,
    pub domain: String,
    pub description: String,
    #[serde(rename = "employeesCount")]
    pub employees_count: String,
    #[serde(rename = "ownerEmail")]
    pub owner_email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl WebsiteView {
    pub fn from_website(website: &Website) -> Self {
        Self {
            website_id: website.website_id.as_ref().to_string(),
            domain: website.domain.as_ref().to_string(),
            description: website.description.as_ref().to_string(),
            employees_count: website.employees_count.as_str().to_string(),
            owner_email: website
                .owner_email
                .as_ref()
                .expose_secret()
                .to_string(),
            created_at: website.created_at,
        }
    }
}
