use serde::{Deserialize, Serialize};

use crate::app::domain::validation_helpers;

/// Per-organization look and feel. Stored as a JSON object; `{}` when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Branding {
    const MAX_URL_LEN: usize = 2048;

    /// Build from form fields. Blank fields mean "unset".
    /// Colour must be `#rrggbb`; the logo must be an HTTPS image URL.
    pub fn new(primary_color: &str, logo_url: &str) -> Result<Self, &'static str> {
        let primary_color = match primary_color.trim() {
            "" => None,
            c if is_hex_color(c) => Some(c.to_ascii_lowercase()),
            _ => return Err("Brand colour must look like #1a2b3c."),
        };
        let logo_url = match logo_url.trim() {
            "" => None,
            u => {
                validation_helpers::check_https_scheme(u)?;
                if u.len() > Self::MAX_URL_LEN {
                    return Err("Logo URL is too long.");
                }
                if !validation_helpers::has_image_extension(u) {
                    return Err("Logo URL must point to an image.");
                }
                Some(u.to_string())
            }
        };
        Ok(Self {
            primary_color,
            logo_url,
        })
    }

    /// Parse the stored column. Anything unreadable is treated as empty branding.
    pub fn from_json(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|err| {
            tracing::warn!(%err, "unreadable branding column, using defaults");
            Self::default()
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn is_hex_color(c: &str) -> bool {
    c.len() == 7 && c.starts_with('#') && c[1..].chars().all(|ch| ch.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_branding_serializes_to_empty_object() {
        assert_eq!(Branding::default().to_json(), "{}");
        assert_eq!(Branding::from_json("{}"), Branding::default());
    }

    #[test]
    fn accepts_color_and_logo() {
        let b = Branding::new("#AABBCC", "https://cdn.example.jp/logo.png").unwrap();
        assert_eq!(b.primary_color.as_deref(), Some("#aabbcc"));
        assert_eq!(Branding::from_json(&b.to_json()), b);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Branding::new("red", "").is_err());
        assert!(Branding::new("", "http://cdn.example.jp/logo.png").is_err());
        assert!(Branding::new("", "https://cdn.example.jp/logo.pdf").is_err());
    }

    #[test]
    fn garbage_column_falls_back_to_default() {
        assert_eq!(Branding::from_json("not json"), Branding::default());
    }
}
