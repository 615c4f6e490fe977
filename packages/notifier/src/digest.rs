//! Composes the ntfy.sh wire payload for a selected set of Articles
//! (spec §4.5: plain-text body, `Title`/`Priority`/`Tags` headers).

use chrono::NaiveDate;
use newsdesk_core::models::Article;

pub struct Digest {
    pub body: String,
    pub title: String,
    pub priority: u8,
    pub tags: String,
}

/// One-line summary per item (falling back to the first line of content
/// when no brief summary is available), separated by a blank line.
pub fn compose(date: NaiveDate, items: &[(Article, Option<String>)]) -> Digest {
    let body = items
        .iter()
        .map(|(article, summary)| {
            let line = summary
                .as_deref()
                .and_then(|s| s.lines().next())
                .unwrap_or_else(|| article.content.lines().next().unwrap_or(""));
            format!("{}\n{}", article.title, line)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Digest {
        body,
        title: format!("Daily digest, {date} ({} stories)", items.len()),
        priority: 3,
        tags: "newspaper".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use newsdesk_core::models::{ProcessingStatus, SourceType};

    fn article(title: &str, content: &str) -> Article {
        Article {
            id: 1,
            title: title.to_string(),
            content: content.to_string(),
            content_hash: "h".to_string(),
            source_type: SourceType::Html,
            date_extracted: Utc::now(),
            processing_status: ProcessingStatus::Summarized,
            edition_date: Utc::now().date_naive(),
            url: None,
            source_file: None,
            publication: None,
            section: None,
            page_number: None,
            column_number: None,
            author: None,
            word_count: None,
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
    fn prefers_summary_line_over_content() {
        let items = vec![(article("Title A", "full content here"), Some("short summary".to_string()))];
        let digest = compose(Utc::now().date_naive(), &items);
        assert!(digest.body.contains("Title A"));
        assert!(digest.body.contains("short summary"));
        assert!(!digest.body.contains("full content here"));
    }

    #[test]
    fn falls_back_to_content_without_a_summary() {
        let items = vec![(article("Title B", "first line\nsecond line"), None)];
        let digest = compose(Utc::now().date_naive(), &items);
        assert!(digest.body.contains("first line"));
    }

    #[test]
    fn separates_items_with_a_blank_line() {
        let items = vec![
            (article("A", "a body"), None),
            (article("B", "b body"), None),
        ];
        let digest = compose(Utc::now().date_naive(), &items);
        assert!(digest.body.contains("\n\n"));
    }
}
