use super::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct PersonName(String);

impl PersonName {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(String::from(
                "Name is required",
            )));
        }
        if trimmed.chars().count() > 50 {
            return Err(ValidationError::new(String::from(
                "Name cannot exceed 50 characters",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phone(String);

impl Phone {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(String::from(
                "Phone number is required",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address(String);

impl Address {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(String::from(
                "Address is required",
            )));
        }
        if trimmed.chars().count() > 200 {
            return Err(ValidationError::new(String::from(
                "Address cannot exceed 200 characters",
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HowHeard {
    Reddit,
    SearchEngine,
    Friend,
    AiChatBot,
    SocialMedia,
    Ad,
    Other,
}

impl HowHeard {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim() {
            "Reddit" => Ok(Self::Reddit),
            "Search Engine" => Ok(Self::SearchEngine),
            "Friend" => Ok(Self::Friend),
            "AI Chat Bot" => Ok(Self::AiChatBot),
            "Social Media" => Ok(Self::SocialMedia),
            "Ad" => Ok(Self::Ad),
            "Other" => Ok(Self::Other),
            _ => Err(ValidationError::new(String::from(
                "Please select a valid option",
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reddit => "Reddit",
            Self::SearchEngine => "Search Engine",
            Self::Friend => "Friend",
            Self::AiChatBot => "AI Chat Bot",
            Self::SocialMedia => "Social Media",
            Self::Ad => "Ad",
            Self::Other => "Other",
        }
    }
}

/// Profile fields. Phone, address and how-heard are mandatory for local
/// registrations and absent for Google-registered accounts; the register
/// handler enforces the former via `Profile::local`.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub first_name: PersonName,
    pub last_name: Option<PersonName>,
    pub phone: Option<Phone>,
    pub address: Option<Address>,
    pub how_heard: Option<HowHeard>,
}

impl Profile {
    pub fn local(
        first_name: PersonName,
        last_name: PersonName,
        phone: Phone,
        address: Address,
        how_heard: HowHeard,
    ) -> Self {
        Self {
            first_name,
            last_name: Some(last_name),
            phone: Some(phone),
            address: Some(address),
            how_heard: Some(how_heard),
        }
    }

    /// Built from Google identity claims; names may be missing there.
    pub fn from_google(
        given_name: Option<&str>,
        family_name: Option<&str>,
    ) -> Self {
        let first_name = given_name
            .and_then(|name| PersonName::parse(name).ok())
            .unwrap_or_else(|| {
                PersonName::parse("User").expect("literal name is valid")
            });
        let last_name =
            family_name.and_then(|name| PersonName::parse(name).ok());

        Self {
            first_name,
            last_name,
            phone: None,
            address: None,
            how_heard: None,
        }
    }
}
