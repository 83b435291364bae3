use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Role on the membership edge between a user and an organization.
/// The same user can be `owner` in one organization and `member` in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrganizationRole {
    Owner,
    Admin,
    Member,
}

impl OrganizationRole {
    /// Human label for templates.
    pub fn label(&self) -> &'static str {
        match self {
            OrganizationRole::Owner => "オーナー",
            OrganizationRole::Admin => "管理者",
            OrganizationRole::Member => "メンバー",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("owner".parse::<OrganizationRole>().unwrap(), OrganizationRole::Owner);
        assert_eq!("admin".parse::<OrganizationRole>().unwrap(), OrganizationRole::Admin);
        assert_eq!(OrganizationRole::Member.to_string(), "member");
    }

    #[test]
    fn rejects_unknown_roles() {
        assert!("viewer".parse::<OrganizationRole>().is_err());
        assert!("Owner ".parse::<OrganizationRole>().is_err());
    }
}
