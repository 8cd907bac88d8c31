//! Slug derivation and validation.
//!
//! Slugs are the stable URL-safe handle of a category: derived once from a
//! display name at creation when not supplied explicitly, never rewritten
//! afterward.

/// Maximum slug length accepted by [`validate_slug`].
pub const MAX_SLUG_LEN: usize = 255;

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, maps whitespace and underscores to hyphens, drops every
/// other non-alphanumeric character, and collapses hyphen runs.
///
/// # Example
///
/// ```
/// use taxa_core::slug::slugify;
///
/// assert_eq!(slugify("Test Category Name"), "test-category-name");
/// assert_eq!(slugify("  Rust & WebAssembly!  "), "rust-webassembly");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress leading hyphens

    for c in name.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-' || c == '_') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }
    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// Validate a slug.
///
/// Rules:
/// - Length between 1 and [`MAX_SLUG_LEN`] characters
/// - Allowed characters: lowercase alphanumeric, hyphens (-)
/// - Must not start or end with a hyphen
///
/// Returns Ok(()) if valid, Err with message if invalid.
pub fn validate_slug(slug: &str) -> std::result::Result<(), String> {
    if slug.is_empty() {
        return Err("Slug cannot be empty".to_string());
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(format!(
            "Slug must be {} characters or less",
            MAX_SLUG_LEN
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("Slug cannot start or end with a hyphen".to_string());
    }

    let invalid_chars: Vec<char> = slug
        .chars()
        .filter(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
        .collect();

    if !invalid_chars.is_empty() {
        let chars_display: String = invalid_chars
            .iter()
            .take(5)
            .map(|c| format!("'{}'", c))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!(
            "Slug contains invalid characters: {}. Only lowercase alphanumeric characters and hyphens are allowed",
            chars_display
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Programming"), "programming");
        assert_eq!(slugify("Test Category Name"), "test-category-name");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Rust & WebAssembly!"), "rust-webassembly");
        assert_eq!(slugify("C++ (advanced)"), "c-advanced");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn test_slugify_trims_edges() {
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("--dashed--"), "dashed");
    }

    #[test]
    fn test_slugify_unicode_lowercase() {
        assert_eq!(slugify("Café"), "café");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_validate_slug_accepts_slugified_output() {
        for name in ["Programming", "Test Category Name", "a  -  b"] {
            let slug = slugify(name);
            assert!(validate_slug(&slug).is_ok(), "slug {:?} should validate", slug);
        }
    }

    #[test]
    fn test_validate_slug_rejects_empty() {
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_validate_slug_rejects_uppercase() {
        let err = validate_slug("Programming").unwrap_err();
        assert!(err.contains("'P'"));
    }

    #[test]
    fn test_validate_slug_rejects_edge_hyphens() {
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("trailing-").is_err());
    }

    #[test]
    fn test_validate_slug_rejects_overlong() {
        let slug = "a".repeat(MAX_SLUG_LEN + 1);
        assert!(validate_slug(&slug).is_err());
    }
}
