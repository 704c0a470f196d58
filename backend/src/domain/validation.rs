//! Shared input sanitisation helpers.
//!
//! Free-form text arriving from clients (listing categories, application
//! reasons, search terms) is sanitised server side regardless of what the UI
//! validates.

use std::sync::OnceLock;

use regex::Regex;

static CONTROL_CHARS: OnceLock<Regex> = OnceLock::new();

fn control_chars() -> &'static Regex {
    CONTROL_CHARS.get_or_init(|| {
        Regex::new(r"[\x00-\x1f\x7f]+")
            .unwrap_or_else(|error| panic!("control character regex failed to compile: {error}"))
    })
}

/// Strip control characters and collapse surrounding whitespace.
pub fn sanitize_text(raw: &str) -> String {
    control_chars().replace_all(raw, " ").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::sanitize_text;

    #[rstest]
    #[case("  Books  ", "Books")]
    #[case("Elec\x00tronics", "Elec tronics")]
    #[case("\t\n", "")]
    #[case("Dorm Essentials", "Dorm Essentials")]
    fn sanitises_input(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_text(raw), expected);
    }
}
