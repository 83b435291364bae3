use argon2::{
    password_hash::{self, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand_core::OsRng;
use validator::ValidationError;

const MIN_CHARS: usize = 8;
const MAX_CHARS: usize = 128;

/// Plaintext password. Values built with `new` meet the signup strength rules.
#[derive(Debug, Clone)]
pub struct Password(String);

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

impl Password {
    /// Plaintext typed at login. Strength rules are not applied, so accounts
    /// created under older rules can still sign in.
    pub fn for_verification(plaintext: String) -> Self {
        Self(plaintext)
    }

    /// Signup password. Length is counted in characters, not bytes.
    pub fn new(plaintext: String) -> Result<Self, ValidationError> {
        let chars = plaintext.chars().count();
        if chars == 0 {
            return Err(rejected("password_missing", "Password is required"));
        }
        if chars < MIN_CHARS {
            return Err(rejected(
                "password_too_short",
                "Password should be at least 8 characters",
            ));
        }
        if chars > MAX_CHARS {
            return Err(rejected(
                "password_too_long",
                "Password should be at most 128 characters",
            ));
        }

        let mixed = plaintext.chars().any(char::is_uppercase)
            && plaintext.chars().any(char::is_lowercase)
            && plaintext.chars().any(|c| c.is_ascii_digit());
        if !mixed {
            return Err(rejected(
                "weak_password",
                "Password should contain uppercase, lowercase, and digit characters",
            ));
        }

        Ok(Self(plaintext))
    }

    fn bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Argon2id PHC string as stored in `users.password_hash`.
#[derive(Debug, Clone)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn from_password(password: &Password) -> Result<Self, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default().hash_password(password.bytes(), &salt)?;
        Ok(Self(phc.to_string()))
    }

    /// `Err` both for a wrong password and for a stored value that is not a
    /// PHC string.
    pub fn verify(&self, password: &Password) -> Result<(), password_hash::Error> {
        let stored = PasswordHash::new(&self.0)?;
        Argon2::default().verify_password(password.bytes(), &stored)
    }

    pub fn from_string(phc: String) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(plaintext: &str) -> String {
        Password::new(plaintext.to_string()).unwrap_err().code.to_string()
    }

    #[test]
    fn accepts_mixed_password() {
        assert!(Password::new("Salon2026".to_string()).is_ok());
    }

    #[test]
    fn rejection_codes() {
        assert_eq!(code_of(""), "password_missing");
        assert_eq!(code_of("Sal0n"), "password_too_short");
        assert_eq!(code_of(&format!("Aa1{}", "x".repeat(MAX_CHARS))), "password_too_long");
        assert_eq!(code_of("salon2026"), "weak_password");
        assert_eq!(code_of("SALON2026"), "weak_password");
        assert_eq!(code_of("SalonBook"), "weak_password");
    }

    #[test]
    fn short_message_is_provider_style() {
        let err = Password::new("Sal0n".to_string()).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("Password should be at least 8 characters"));
    }

    #[test]
    fn length_counts_characters() {
        // Seven characters, but well over eight bytes.
        assert_eq!(code_of("Aaさくら1本"), "password_too_short");
    }

    #[test]
    fn hash_verifies_only_the_same_password() {
        let password = Password::new("TestPassword123".to_string()).unwrap();
        let hash = HashedPassword::from_password(&password).unwrap();
        assert!(hash.verify(&password).is_ok());

        let other = Password::for_verification("WrongPassword456".to_string());
        assert!(hash.verify(&other).is_err());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        let hash = HashedPassword::from_string("not-a-phc-string".to_string());
        assert!(hash.verify(&Password::for_verification("anything".to_string())).is_err());
    }

    #[test]
    fn for_verification_skips_strength_rules() {
        let weak = Password::for_verification("password".to_string());
        let hash = HashedPassword::from_password(&weak).unwrap();
        assert!(hash.verify(&weak).is_ok());
    }
}
