use secrecy::{ExposeSecret, Secret};

use super::ValidationError;

use std::hash::Hash;

/// Case-insensitive email address, normalized to lowercase at parse time.
#[derive(Debug, Clone)]
pub struct Email(Secret<String>);

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Hash for Email {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.expose_secret().hash(state);
    }
}

impl Eq for Email {}

impl Email {
    pub fn parse(s: Secret<String>) -> Result<Self, ValidationError> {
        let normalized = s.expose_secret().trim().to_lowercase();
        if !validator::validate_email(&normalized) {
            return Err(ValidationError::new(String::from(
                "Please enter a valid email",
            )));
        }

        Ok(Self(Secret::new(normalized)))
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
