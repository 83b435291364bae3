use validator::ValidationError;

/// Organization display name. Trimmed, non-empty, at most `MAX_LEN` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationName(String);

impl OrganizationName {
    pub const MAX_LEN: usize = 100;

    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            let mut error = ValidationError::new("organization_name_empty");
            error.message = Some("Organization name is required".into());
            return Err(error);
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            let mut error = ValidationError::new("organization_name_too_long");
            error.message = Some("Organization name must be at most 100 characters".into());
            return Err(error);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
