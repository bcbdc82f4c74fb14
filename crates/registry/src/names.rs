//! Name grammar shared by regions and property definitions.
//!
//! Identifiers follow the usual "letter, `_` or `$` first, then letters,
//! digits, `_` or `$`" shape, with Unicode letters and digits accepted.

/// Separator between namespace segments.
pub const SEPARATOR: char = '.';

#[inline]
fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

#[inline]
fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_numeric()
}

/// Returns `true` when `region` is a non-empty identifier.
#[must_use]
pub fn is_valid_region(region: &str) -> bool {
    let mut chars = region.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_part)
}

/// Returns `true` when `name` is an identifier starting with an uppercase letter.
#[must_use]
pub fn is_valid_property_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_uppercase() && is_identifier_start(c))
        && chars.all(is_identifier_part)
}

/// Splits a possibly qualified name into its last segment.
///
/// Returns the simplified name and, when the input was dotted, the prefix that
/// preceded the final separator (empty for names like `.Uuid`).
#[must_use]
pub fn simplify(name: &str) -> (&str, Option<&str>) {
    name.rfind(SEPARATOR).map_or((name, None), |at| (&name[at + 1..], Some(&name[..at])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_follow_identifier_grammar() {
        assert!(is_valid_region("core"));
        assert!(is_valid_region("_private"));
        assert!(is_valid_region("$cache2"));
        assert!(is_valid_region("région"));
        assert!(!is_valid_region(""));
        assert!(!is_valid_region("2fast"));
        assert!(!is_valid_region("with space"));
        assert!(!is_valid_region("dotted.name"));
    }

    #[test]
    fn property_names_require_leading_uppercase() {
        assert!(is_valid_property_name("Uuid"));
        assert!(is_valid_property_name("MaxRetries2"));
        assert!(is_valid_property_name("Ärger"));
        assert!(!is_valid_property_name("uuid"));
        assert!(!is_valid_property_name("_Hidden"));
        assert!(!is_valid_property_name(""));
        assert!(!is_valid_property_name("Bad-Name"));
    }

    #[test]
    fn simplify_keeps_last_segment() {
        assert_eq!(simplify("Uuid"), ("Uuid", None));
        assert_eq!(simplify(".Uuid"), ("Uuid", Some("")));
        assert_eq!(simplify(".net.http.Timeout"), ("Timeout", Some(".net.http")));
        assert_eq!(simplify("trailing."), ("", Some("trailing")));
    }
}
