//! ULID-backed identifiers. Non-sequential, sortable by creation time.

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(ulid::Ulid);

        impl $name {
            /// Generate a new random ULID.
            pub fn new() -> Self {
                Self(ulid::Ulid::new())
            }

            /// Get as string for storage/display.
            pub fn as_str(&self) -> String {
                self.0.to_string()
            }

            /// Parse from string.
            pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
                Ok(Self(ulid::Ulid::from_string(s.trim())?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

ulid_id!(
    /// Identity of an authenticated user.
    UserId
);
ulid_id!(
    /// Tenant identifier. Every tenant-owned row carries one.
    OrganizationId
);
ulid_id!(StoreId);
ulid_id!(CustomerId);
ulid_id!(CouponId);
ulid_id!(ShiftId);
ulid_id!(VisitId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_new_id() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn parse_trims_whitespace() {
        let original = OrganizationId::new();
        let parsed = OrganizationId::from_string(&format!(" {} ", original)).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn parse_invalid_ulid() {
        assert!(StoreId::from_string("invalid").is_err());
        assert!(OrganizationId::from_string("").is_err());
    }
}
