/// Coupon code. Uppercase ASCII letters, digits, `-` and `_`; 3 to 32 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponCode(String);

impl CouponCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, &'static str> {
        let normalized = code.as_ref().trim().to_ascii_uppercase();
        if normalized.len() < 3 || normalized.len() > 32 {
            return Err("Coupon code must be 3 to 32 characters.");
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err("Coupon code may only contain letters, digits, '-' and '_'.");
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_uppercase() {
        assert_eq!(CouponCode::new(" spring-10 ").unwrap().as_str(), "SPRING-10");
    }

    #[test]
    fn rejects_bad_codes() {
        assert!(CouponCode::new("ab").is_err());
        assert!(CouponCode::new("has space").is_err());
        assert!(CouponCode::new("クーポン").is_err());
    }
}
