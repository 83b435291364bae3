/// Image file extensions (lowercase). Requests for these never reach the auth gate.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "ico"];

/// Check that a trimmed, non-empty URL uses the HTTPS scheme.
pub fn check_https_scheme(t: &str) -> Result<(), &'static str> {
    if t.starts_with("https://") {
        Ok(())
    } else {
        Err("URL must use HTTPS.")
    }
}

/// Whether the last path segment ends in one of `IMAGE_EXTENSIONS`.
///
/// Query and fragment are stripped first. A segment without a dot has no extension.
pub fn has_image_extension(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path).split('#').next().unwrap_or(path);
    let filename = path.rsplit('/').next().unwrap_or(path);
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => {
            IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        }
        _ => false,
    }
}

/// URL-safe slug from a display name: ASCII alphanumerics lowercased, runs of
/// anything else collapsed to a single `-`. May be empty for non-Latin names.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions_match_case_insensitively() {
        assert!(has_image_extension("/logo.PNG"));
        assert!(has_image_extension("/img/a/b/photo.jpeg?w=100"));
        assert!(has_image_extension("/icon.svg#frag"));
    }

    #[test]
    fn non_image_paths_do_not_match() {
        assert!(!has_image_extension("/dashboard"));
        assert!(!has_image_extension("/dashboard/customers.json"));
        assert!(!has_image_extension("/png"));
        assert!(!has_image_extension("/trailing."));
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Hair Salon -- Shibuya! "), "hair-salon-shibuya");
        assert_eq!(slugify("Studio 9"), "studio-9");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("美容室"), "");
        assert_eq!(slugify("美容室 Aoyama"), "aoyama");
    }
}
