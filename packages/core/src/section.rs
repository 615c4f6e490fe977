//! Bit-exact section normalization (spec §6).

/// Normalizes a free-text section label into the canonical set.
///
/// Matching is case-insensitive on trimmed input. Idempotent:
/// `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    match trimmed.as_str() {
        "obits" | "obituary" | "obituaries" => "Obituaries".to_string(),
        "police" | "police and courts" | "crime" => "Public Safety".to_string(),
        "editorial" | "opinion" => "Opinion".to_string(),
        "local" => "Local".to_string(),
        "news" => "News".to_string(),
        "sports" => "Sports".to_string(),
        "business" => "Business".to_string(),
        "" => "General".to_string(),
        // "Public Safety" fed back in lowercased, for idempotence over
        // already-normalized output.
        "public safety" => "Public Safety".to_string(),
        _ => "General".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_aliases() {
        assert_eq!(normalize("Obituary"), "Obituaries");
        assert_eq!(normalize("  CRIME "), "Public Safety");
        assert_eq!(normalize("Editorial"), "Opinion");
        assert_eq!(normalize("local"), "Local");
        assert_eq!(normalize("Sports"), "Sports");
        assert_eq!(normalize("business"), "Business");
    }

    #[test]
    fn falls_back_to_general() {
        assert_eq!(normalize("weather"), "General");
        assert_eq!(normalize(""), "General");
    }

    #[test]
    fn is_idempotent() {
        for s in ["obituary", "crime", "opinion", "local", "news", "sports", "business", "weather", ""] {
            let once = normalize(s);
            let twice = normalize(&once);
            assert_eq!(once, twice, "not idempotent for {s:?}");
        }
    }
}
