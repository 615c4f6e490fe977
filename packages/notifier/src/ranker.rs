//! Default digest ranking: word count descending, then section priority,
//! then id (spec §4.5). The policy sits behind a plain function so a
//! future configurable ranker can slot in without touching callers.

use newsdesk_core::models::Article;

/// Newsroom priority order for the canonical section set
/// (`newsdesk_core::section::normalize`'s output), highest first.
fn section_priority(section: Option<&str>) -> i32 {
    match section {
        Some("News") => 0,
        Some("Public Safety") => 1,
        Some("Local") => 2,
        Some("Business") => 3,
        Some("Sports") => 4,
        Some("Opinion") => 5,
        Some("Obituaries") => 6,
        _ => 7,
    }
}

/// Orders candidates for digest selection: most words first, ties broken
/// by section priority, then by id for determinism.
pub fn rank(mut candidates: Vec<Article>) -> Vec<Article> {
    candidates.sort_by(|a, b| {
        b.word_count
            .unwrap_or(0)
            .cmp(&a.word_count.unwrap_or(0))
            .then_with(|| section_priority(a.section.as_deref()).cmp(&section_priority(b.section.as_deref())))
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use newsdesk_core::models::{ProcessingStatus, SourceType};

    fn article(id: i64, word_count: i32, section: &str) -> Article {
        Article {
            id,
            title: format!("article {id}"),
            content: String::new(),
            content_hash: format!("hash{id}"),
            source_type: SourceType::Html,
            date_extracted: Utc::now(),
            processing_status: ProcessingStatus::Summarized,
            edition_date: Utc::now().date_naive(),
            url: None,
            source_file: None,
            publication: None,
            section: Some(section.to_string()),
            page_number: None,
            column_number: None,
            author: None,
            word_count: Some(word_count),
            date_published: None,
            raw_html: None,
            location_name: None,
            location_lat: None,
            location_lon: None,
            event_dates: None,
            tags: None,
            metadata: None,
            failure_reason: None,
        }
    }

    #[test]
    fn orders_by_word_count_descending() {
        let ranked = rank(vec![article(1, 100, "News"), article(2, 500, "News"), article(3, 300, "News")]);
        assert_eq!(ranked.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn breaks_word_count_ties_on_section_priority_then_id() {
        let ranked = rank(vec![
            article(1, 200, "Sports"),
            article(2, 200, "News"),
            article(3, 200, "News"),
        ]);
        assert_eq!(ranked.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }
}
