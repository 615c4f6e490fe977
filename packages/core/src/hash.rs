//! Content hashing for Article dedup (spec §3, §8).
//!
//! `content_hash` must be invariant under whitespace-only and
//! punctuation-only perturbations of the input.

/// `md5(lowercase(strip_whitespace(collapse_punctuation(content))))`.
pub fn content_hash(content: &str) -> String {
    let collapsed = collapse_punctuation(content);
    let stripped = strip_whitespace(&collapsed);
    let normalized = stripped.to_lowercase();
    format!("{:x}", md5::compute(normalized.as_bytes()))
}

/// Removes ASCII punctuation entirely so differing punctuation style
/// (straight vs curly quotes, trailing periods, em-dashes) does not
/// change the hash.
fn collapse_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect()
}

/// Collapses runs of whitespace to a single space and trims the ends.
fn strip_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn invariant_under_whitespace_changes() {
        let a = content_hash("Hello   world");
        let b = content_hash("Hello world");
        let c = content_hash("  Hello\nworld  ");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn invariant_under_punctuation_changes() {
        let a = content_hash("Don't stop, believing!");
        let b = content_hash("Dont stop believing");
        assert_eq!(a, b);
    }

    #[test]
    fn differs_for_different_content() {
        assert_ne!(content_hash("alpha"), content_hash("beta"));
    }

    proptest! {
        #[test]
        fn idempotent_on_already_normalized(s in "[a-z ]{0,40}") {
            let once = content_hash(&s);
            let stripped = strip_whitespace(&s);
            let twice = content_hash(&stripped);
            prop_assert_eq!(once, twice);
        }
    }
}
