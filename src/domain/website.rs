use chrono::{DateTime, Utc};
use rand::Rng;

use super::{Email, ValidationError};

/// Registrable hostname, normalized to lowercase. No scheme, no path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(String);

impl DomainName {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let normalized = s.trim().to_lowercase();
        let length = normalized.chars().count();
        if !(3..=253).contains(&length) {
            return Err(ValidationError::new(String::from(
                "Domain name must be between 3 and 253 characters in length.",
            )));
        }

        let regex = regex::Regex::new(
            r"^([a-z0-9]([a-z0-9\-]*[a-z0-9])?\.)+[a-z]{2,}$",
        )
        .expect("Regex for DomainName parser is invalid");
        if !regex.is_match(&normalized) {
            return Err(ValidationError::new(String::from(
                "The domain format is invalid. Please enter a valid domain \
                 like example.com or subdomain.example.com (without \
                 http:// or https://).",
            )));
        }

        Ok(Self(normalized))
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Description(String);

impl Description {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let length = trimmed.chars().count();
        if !(10..=500).contains(&length) {
            return Err(ValidationError::new(String::from(
                "Description must be between 10 and 500 characters.",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

const EMPLOYEE_BUCKETS: [&str; 9] = [
    "1-10",
    "11-50",
    "51-100",
    "101-250",
    "251-500",
    "501-1000",
    "1001-5000",
    "5001-10000",
    "10000+",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeesCount(&'static str);

impl EmployeesCount {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        EMPLOYEE_BUCKETS
            .iter()
            .copied()
            .find(|bucket| *bucket == s.trim())
            .map(Self)
            .ok_or_else(|| {
                ValidationError::new(String::from(
                    "Please select a valid employee count range.",
                ))
            })
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Server-generated public identifier: 10 uppercase alphanumerics. Also
/// keys the external vector-index collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WebsiteId(String);

const WEBSITE_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const WEBSITE_ID_LENGTH: usize = 10;

impl WebsiteId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..WEBSITE_ID_LENGTH)
            .map(|_| {
                let index = rng.gen_range(0..WEBSITE_ID_CHARSET.len());
                WEBSITE_ID_CHARSET[index] as char
            })
            .collect();
        Self(id)
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let candidate = s.trim();
        if candidate.len() != WEBSITE_ID_LENGTH
            || !candidate
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(ValidationError::new(String::from(
                "Website ID must be 10 uppercase alphanumeric characters",
            )));
        }
        Ok(Self(candidate.to_string()))
    }
}

impl AsRef<str> for WebsiteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Website {
    pub website_id: WebsiteId,
    pub domain: DomainName,
    pub description: Description,
    pub employees_count: EmployeesCount,
    pub owner_email: Email,
    pub created_at: DateTime<Utc>,
}

impl Website {
    pub fn new(
        website_id: WebsiteId,
        domain: DomainName,
        description: Description,
        employees_count: EmployeesCount,
        owner_email: Email,
    ) -> Self {
        Self {
            website_id,
            domain,
            description,
            employees_count,
            owner_email,
            created_at: Utc::now(),
        }
    }
}
