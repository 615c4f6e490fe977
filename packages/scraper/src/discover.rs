//! `Discover(session, publication, date) → [PageURL]` (spec §4.1).
//!
//! Pure: enumerates downloadable resources without writing anything.
//! Ordering is deterministic (page number ascending).

use crate::browser::BrowserSession;
use anyhow::bail;
use newsdesk_core::error::PipelineError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageUrl {
    pub page_number: u32,
    pub url: String,
}

/// Observed indicators that the session has been logged out mid-discovery
/// (login redirect, 401/403 on an authenticated endpoint), per spec §4.1.
fn looks_like_auth_loss(url: &str, status: Option<u16>) -> bool {
    matches!(status, Some(401) | Some(403)) || url.contains("/login") || url.contains("/signin")
}

/// Discovers the edition's page URLs by navigating to the publication's
/// e-edition index and reading the page list out of the DOM. The exact
/// selector is publication-specific in production; this enumerates an
/// `a[data-page-url]` list, the common e-edition index convention, and is
/// the seam a real deployment swaps per publication.
pub async fn discover(
    session: &BrowserSession,
    edition_index_url: &str,
) -> Result<Vec<PageUrl>, PipelineError> {
    let page = session.page().await;

    page.goto_builder(edition_index_url)
        .goto()
        .await
        .map_err(|e| PipelineError::Transient(format!("navigation failed: {e}")))?;

    let current_url = page
        .url()
        .map_err(|e| PipelineError::Transient(e.to_string()))?;
    if looks_like_auth_loss(&current_url, None) {
        return Err(PipelineError::AuthFailed(
            "edition index redirected to login".into(),
        ));
    }

    let raw: Vec<(u32, String)> = page
        .eval(
            "Array.from(document.querySelectorAll('a[data-page-url]')).map((a, i) => \
             [parseInt(a.getAttribute('data-page')) || (i + 1), a.getAttribute('data-page-url')])",
        )
        .await
        .map_err(|e| PipelineError::DataError(format!("failed to read page list: {e}")))?;

    if raw.is_empty() {
        return Err(PipelineError::DataError(format!(
            "no downloadable pages found at {edition_index_url}"
        )));
    }

    let mut pages: Vec<PageUrl> = raw
        .into_iter()
        .map(|(page_number, url)| PageUrl { page_number, url })
        .collect();
    pages.sort_by_key(|p| p.page_number);
    Ok(pages)
}

pub fn require_nonempty(pages: &[PageUrl], publication: &str, date: &str) -> anyhow::Result<()> {
    if pages.is_empty() {
        bail!("no pages discovered for {publication} on {date}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_auth_redirect() {
        assert!(looks_like_auth_loss("https://paper.example/login", None));
        assert!(looks_like_auth_loss("https://paper.example/edition", Some(403)));
        assert!(!looks_like_auth_loss("https://paper.example/edition", Some(200)));
    }

    #[test]
    fn pages_sort_by_number() {
        let mut pages = vec![
            PageUrl { page_number: 3, url: "c".into() },
            PageUrl { page_number: 1, url: "a".into() },
            PageUrl { page_number: 2, url: "b".into() },
        ];
        pages.sort_by_key(|p| p.page_number);
        assert_eq!(pages.iter().map(|p| p.page_number).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
