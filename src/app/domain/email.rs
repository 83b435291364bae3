use validator::ValidationError;

const MAX_LEN: usize = 254;

/// Normalized email address: trimmed, lowercase, `local@domain.tld`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

impl Email {
    pub fn new(raw: String) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.len() > MAX_LEN {
            return Err(invalid("email_too_long", "Unable to validate email address: too long"));
        }

        let well_formed = normalized
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            })
            && !normalized.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(invalid("invalid_email", "Unable to validate email address: invalid format"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before `@`. Used as the greeting name in outgoing mail.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<Email, ValidationError> {
        Email::new(raw.to_string())
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(parse("  Hanako@Salon.Example.JP ").unwrap().as_str(), "hanako@salon.example.jp");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for raw in ["notanemail", "@example.com", "a@b@example.com", "nobody@localhost", "a@.com", "a b@example.com"] {
            assert!(parse(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn invalid_email_carries_provider_message() {
        let err = parse("nobody@localhost").unwrap_err();
        assert_eq!(
            err.message.as_deref(),
            Some("Unable to validate email address: invalid format")
        );
    }

    #[test]
    fn local_part_before_at() {
        assert_eq!(parse("hanako@salon.example.jp").unwrap().local_part(), "hanako");
    }

    #[test]
    fn too_long() {
        let err = parse(&("a".repeat(250) + "@example.com")).unwrap_err();
        assert_eq!(err.code, "email_too_long");
    }
}
