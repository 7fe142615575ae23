//! Address normalization.
//!
//! Index records are hand-maintained, so content addresses routinely carry
//! stray whitespace or unescaped spaces in file names. Every address goes
//! through [`normalize`] before it reaches a [`DocumentSource`](crate::DocumentSource).

use crate::error::{ErrorKind, Result};

/// Normalizes a document address so it can be requested as-is.
///
/// Surrounding whitespace is trimmed and every literal space is
/// percent-encoded as `%20`. Nothing else is escaped: existing escapes and
/// reserved characters pass through untouched.
///
/// # Returns
/// Returns the normalized address, or [`InvalidAddress`](crate::error::ErrorKind::InvalidAddress)
/// if nothing is left after trimming.
///
/// # Examples
///
/// ```
/// use folio_source::normalize_address;
/// assert_eq!(
///     normalize_address("  https://example.com/docs/my notes.md\n").unwrap(),
///     "https://example.com/docs/my%20notes.md"
/// );
/// assert!(normalize_address("   ").is_err());
/// ```
pub fn normalize(raw: impl AsRef<str>) -> Result<String> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
        exn::bail!(ErrorKind::InvalidAddress(raw.as_ref().to_string()));
    }
    Ok(trimmed.replace(' ', "%20"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://x/a.md", "https://x/a.md")]
    #[case("https://x/a b.md", "https://x/a%20b.md")]
    #[case("  https://x/a b c.md  ", "https://x/a%20b%20c.md")]
    #[case("\thttps://x/docs/a.md\n", "https://x/docs/a.md")]
    #[case("https://x/already%20escaped.md", "https://x/already%20escaped.md")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).unwrap(), expected);
    }

    #[test]
    fn test_normalized_has_no_spaces() {
        let normalized = normalize(" https://x/some dir/a b.md ").unwrap();
        assert!(!normalized.contains(' '));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn test_empty_rejected(#[case] input: &str) {
        let err = normalize(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidAddress(_)));
    }
}
