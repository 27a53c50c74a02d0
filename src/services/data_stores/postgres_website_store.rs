use color_eyre::eyre::{eyre, Result};
use secrecy::{ExposeSecret, Secret};
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::{
    Description, DomainName, Email, EmployeesCount, Website, WebsiteId,
    WebsiteStore, WebsiteStoreError,
};

pub struct PostgresWebsiteStore {
    pool: PgPool,
}

impl PostgresWebsiteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn website_from_row(row: &PgRow) -> Result<Website> {
    Ok(Website {
        website_id: WebsiteId::parse(
            &row.try_get::<String, _>("website_id")?,
        )
        .map_err(|e| eyre!(e))?,
        domain: DomainName::parse(&row.try_get::<String, _>("domain")?)
            .map_err(|e| eyre!(e))?,
        description: Description::parse(
            &row.try_get::<String, _>("description")?,
        )
        .map_err(|e| eyre!(e))?,
        employees_count: EmployeesCount::parse(
            &row.try_get::<String, _>("employees_count")?,
        )
        .map_err(|e| eyre!(e))?,
        owner_email: Email::parse(Secret::new(
            row.try_get::<String, _>("owner_email")?,
        ))
        .map_err(|e| eyre!(e))?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait::async_trait]
impl WebsiteStore for PostgresWebsiteStore {
    #[tracing::instrument(name = "Adding website to PostgreSQL", skip_all)]
    async fn add_website(
        &mut self,
        website: Website,
    ) -> Result<(), WebsiteStoreError> {
        sqlx::query(
            "INSERT INTO websites (website_id, domain, description, \
             employees_count, owner_email, created_at) VALUES ($1, $2, $3, \
             $4, $5, $6)",
        )
        .bind(website.website_id.as_ref())
        .bind(website.domain.as_ref())
        .bind(website.description.as_ref())
        .bind(website.employees_count.as_str())
        .bind(website.owner_email.as_ref().expose_secret())
        .bind(website.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                // The two unique constraints surface as different
                // application errors; tell them apart by constraint name.
                if db_err
                    .constraint()
                    .is_some_and(|name| name.contains("domain"))
                {
                    WebsiteStoreError::DomainAlreadyExists
                } else {
                    WebsiteStoreError::WebsiteIdAlreadyExists
                }
            }
            _ => WebsiteStoreError::UnexpectedError(eyre!(e)),
        })?;
        Ok(())
    }

    #[tracing::instrument(
        name = "Deleting website from PostgreSQL",
        skip_all
    )]
    async fn delete_website(
        &mut self,
        website_id: &WebsiteId,
    ) -> Result<(), WebsiteStoreError> {
        let result =
            sqlx::query("DELETE FROM websites WHERE website_id = $1")
                .bind(website_id.as_ref())
                .execute(&self.pool)
                .await
                .map_err(|e| WebsiteStoreError::UnexpectedError(eyre!(e)))?;

        if result.rows_affected() == 0 {
            return Err(WebsiteStoreError::WebsiteNotFound);
        }

        Ok(())
    }

    #[tracing::instrument(
        name = "Listing websites for owner from PostgreSQL",
        skip_all
    )]
    async fn websites_for_owner(
        &self,
        owner: &Email,
    ) -> Result<Vec<Website>, WebsiteStoreError> {
        let rows = sqlx::query(
            "SELECT website_id, domain, description, employees_count, \
             owner_email, created_at FROM websites WHERE owner_email = $1 \
             ORDER BY created_at DESC",
        )
        .bind(owner.as_ref().expose_secret())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WebsiteStoreError::UnexpectedError(eyre!(e)))?;

        rows.iter()
            .map(|row| {
                website_from_row(row)
                    .map_err(WebsiteStoreError::UnexpectedError)
            })
            .collect()
    }

    async fn domain_exists(
        &self,
        domain: &DomainName,
    ) -> Result<bool, WebsiteStoreError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM websites WHERE domain = $1) AS \
             present",
        )
        .bind(domain.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| WebsiteStoreError::UnexpectedError(eyre!(e)))?;

        row.try_get("present")
            .map_err(|e| WebsiteStoreError::UnexpectedError(eyre!(e)))
    }

    async fn website_id_exists(
        &self,
        website_id: &WebsiteId,
    ) -> Result<bool, WebsiteStoreError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM websites WHERE website_id = $1) \
             AS present",
        )
        .bind(website_id.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| WebsiteStoreError::UnexpectedError(eyre!(e)))?;

        row.try_get("present")
            .map_err(|e| WebsiteStoreError::UnexpectedError(eyre!(e)))
    }
}
