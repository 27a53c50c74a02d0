use super::ValidationError;
use secrecy::{ExposeSecret, Secret};

#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Password {
    pub fn parse(s: Secret<String>) -> Result<Password, ValidationError> {
        validate_password(&s)?;
        Ok(Self(s))
    }
}

fn validate_password(s: &Secret<String>) -> Result<(), ValidationError> {
    let min_characters = 8;
    let max_characters = 128;
    let password = s.expose_secret();
    let char_count = password.chars().count();

    if char_count < min_characters {
        return Err(ValidationError::new(format!(
            "Password too short. Should be {} to {} characters.",
            min_characters, max_characters
        )));
    }

    if char_count > max_characters {
        return Err(ValidationError::new(format!(
            "Password too long. Should be {} to {} characters.",
            min_characters, max_characters
        )));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_lowercase())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ValidationError::new(String::from(
            "Password must contain at least one uppercase letter, one \
             lowercase letter, and one number",
        )));
    }

    Ok(())
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
