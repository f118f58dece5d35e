//! Deterministic URL- and filesystem-safe names.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Slug used when the input contains no usable characters.
pub const FALLBACK_SLUG: &str = "untitled";

/// Letters that compatibility decomposition leaves untouched.
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'ø' | 'Ø' => "o",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'ł' | 'Ł' => "l",
        'þ' | 'Þ' => "th",
        'ı' => "i",
        _ => return None,
    })
}

fn separate(slug: &mut String, pending_dash: &mut bool) {
    if *pending_dash && !slug.is_empty() {
        slug.push('-');
    }
    *pending_dash = false;
}

/// Derives a slug from arbitrary text.
///
/// The input is NFKD-decomposed, combining marks are dropped and a few
/// letters without a decomposition are transliterated, so `Crème Brûlée`
/// becomes `creme-brulee`. ASCII letters and digits are lowercased and kept;
/// every other run of characters collapses to a single `-`. Leading and
/// trailing separators are trimmed. If nothing is left the result is
/// [`FALLBACK_SLUG`].
///
/// # Examples
///
/// ```
/// use cgi_params::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Straße  über   Øresund "), "strasse-uber-oresund");
/// assert_eq!(slugify("!!!"), "untitled");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            separate(&mut slug, &mut pending_dash);
            slug.push(ch.to_ascii_lowercase());
        } else if let Some(ascii) = transliterate(ch) {
            separate(&mut slug, &mut pending_dash);
            slug.push_str(ascii);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Derives a slug and appends `extension` verbatim.
///
/// # Examples
///
/// ```
/// use cgi_params::slug_name;
///
/// assert_eq!(slug_name("Hello, World!", ".html"), "hello-world.html");
/// assert_eq!(slug_name("Q3 Report", ".pdf"), "q3-report.pdf");
/// ```
pub fn slug_name(input: &str, extension: &str) -> String {
    let mut name = slugify(input);
    name.push_str(extension);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn collapses_runs_of_separators() {
        assert_eq!(slugify("a  --  b__c...d"), "a-b-c-d");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  --hello--  "), "hello");
    }

    #[test]
    fn folds_accents() {
        assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
        assert_eq!(slugify("Ångström"), "angstrom");
    }

    #[test]
    fn transliterates_undecomposable_letters() {
        assert_eq!(slugify("Straße"), "strasse");
        assert_eq!(slugify("Łódź"), "lodz");
        assert_eq!(slugify("Æsir Þor"), "aesir-thor");
    }

    #[test]
    fn compatibility_forms_are_folded() {
        // Fullwidth letters and ligatures decompose under NFKD
        assert_eq!(slugify("ＡＢＣ ﬁle"), "abc-file");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Top 10 of 2024"), "top-10-of-2024");
    }

    #[test]
    fn non_latin_scripts_fall_back() {
        assert_eq!(slugify("日本語"), FALLBACK_SLUG);
        assert_eq!(slugify("東京 2020"), "2020");
        assert_eq!(slugify(""), FALLBACK_SLUG);
    }

    #[test]
    fn slug_name_appends_extension() {
        assert_eq!(slug_name("Hello, World!", ".html"), "hello-world.html");
        assert_eq!(slug_name("x", ""), "x");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: slugs only contain lowercase ASCII, digits and inner dashes
            #[test]
            fn proptest_slug_charset(input in ".{0,64}") {
                let slug = slugify(&input);
                prop_assert!(slug
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }

            /// Property: slugging is deterministic and idempotent
            #[test]
            fn proptest_slug_idempotent(input in ".{0,64}") {
                let once = slugify(&input);
                prop_assert_eq!(&once, &slugify(&input));
                prop_assert_eq!(&once, &slugify(&once));
            }
        }
    }
}
