//! HTML pipeline (spec §4.2): readability-style main-content extraction,
//! `og:title → <title> → h1` title fallback, `meta[name=section] →
//! breadcrumbs → URL path segment` section fallback, author/date from
//! standard meta tags.
//!
//! Uses the `scraper` crate for DOM selection and `htmd` for markdown
//! conversion, pulling the metadata fields this pipeline needs (title,
//! section, author, publish date) beyond a bare content extraction.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};

pub struct ExtractedHtml {
    pub title: String,
    pub content_markdown: String,
    pub section: Option<String>,
    pub author: Option<String>,
    pub date_published: Option<DateTime<Utc>>,
    pub raw_html: String,
}

const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#content",
    "#main",
    ".content",
    ".main",
    ".post-content",
    ".entry-content",
];

const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    ".nav",
    ".navbar",
    ".header",
    ".footer",
    ".sidebar",
    ".menu",
    ".advertisement",
    ".ads",
    "#nav",
    "#header",
    "#footer",
    "#sidebar",
    "script",
    "style",
    "noscript",
    "iframe",
];

pub fn extract(raw_html: &str, source_url: Option<&str>) -> ExtractedHtml {
    let document = Html::parse_document(raw_html);

    let title = extract_title(&document);
    let main_content_html = extract_main_content(&document);
    let content_markdown = html_to_markdown(&main_content_html);
    let section = extract_section(&document, source_url);
    let author = meta_content(&document, &["author", "article:author"]);
    let date_published = meta_content(&document, &["article:published_time", "date", "pubdate"])
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|dt| dt.with_timezone(&Utc));

    ExtractedHtml {
        title,
        content_markdown,
        section,
        author,
        date_published,
        raw_html: raw_html.to_string(),
    }
}

fn extract_title(document: &Html) -> String {
    if let Some(og) = meta_property(document, "og:title") {
        return og;
    }
    if let Ok(sel) = Selector::parse("title") {
        if let Some(text) = document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
        {
            return text;
        }
    }
    if let Ok(sel) = Selector::parse("h1") {
        if let Some(text) = document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
        {
            return text;
        }
    }
    "Untitled".to_string()
}

fn extract_section(document: &Html, source_url: Option<&str>) -> Option<String> {
    if let Some(section) = meta_content(document, &["section"]) {
        return Some(section);
    }
    if let Ok(sel) = Selector::parse(".breadcrumb a, nav[aria-label='breadcrumb'] a") {
        if let Some(crumb) = document.select(&sel).nth(0) {
            let text = crumb.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    source_url.and_then(|u| {
        url::Url::parse(u)
            .ok()
            .and_then(|parsed| {
                parsed
                    .path_segments()
                    .and_then(|mut segs| segs.next().map(str::to_string))
            })
            .filter(|s| !s.is_empty())
    })
}

fn extract_main_content(document: &Html) -> String {
    for selector_str in MAIN_CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(main) = document.select(&selector).next() {
                return remove_boilerplate(&main.html());
            }
        }
    }
    if let Ok(body_selector) = Selector::parse("body") {
        if let Some(body) = document.select(&body_selector).next() {
            return remove_boilerplate(&body.html());
        }
    }
    document.html()
}

fn remove_boilerplate(html: &str) -> String {
    // scraper's tree has no removal API, so the practical approach is a
    // parse pass that walks direct children, skipping ones that match a
    // boilerplate selector.
    let fragment = Html::parse_fragment(html);
    let boilerplate: Vec<Selector> = BOILERPLATE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();

    let root = fragment.root_element();
    let mut out = String::new();
    for child in root.children() {
        if let Some(el) = scraper::ElementRef::wrap(child) {
            let is_boilerplate = boilerplate.iter().any(|sel| {
                fragment
                    .select(sel)
                    .any(|matched| matched.id() == el.id())
            });
            if is_boilerplate {
                continue;
            }
            out.push_str(&el.html());
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
    if out.is_empty() {
        html.to_string()
    } else {
        out
    }
}

fn html_to_markdown(html: &str) -> String {
    htmd::convert(html).unwrap_or_else(|_| {
        // Plain-text fallback: strip tags crudely rather than fail the
        // pipeline over a markdown-conversion edge case.
        let fragment = Html::parse_fragment(html);
        fragment.root_element().text().collect::<String>()
    })
}

fn meta_content(document: &Html, names: &[&str]) -> Option<String> {
    for name in names {
        let selector = format!("meta[name='{name}']");
        let parsed = Selector::parse(&selector);
        let sel = match parsed {
            Ok(sel) => sel,
            Err(_) => continue,
        };
        if let Some(content) = document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return Some(content.to_string());
        }
    }
    None
}

fn meta_property(document: &Html, property: &str) -> Option<String> {
    let selector = format!("meta[property='{property}']");
    Selector::parse(&selector).ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_prefers_og_title() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Title">
            <title>Doc Title</title>
        </head><body><h1>H1 Title</h1></body></html>"#;
        let extracted = extract(html, None);
        assert_eq!(extracted.title, "OG Title");
    }

    #[test]
    fn title_falls_back_to_h1() {
        let html = r#"<html><head></head><body><h1>H1 Title</h1></body></html>"#;
        let extracted = extract(html, None);
        assert_eq!(extracted.title, "H1 Title");
    }

    #[test]
    fn section_falls_back_to_url_path() {
        let html = "<html><head></head><body><p>content</p></body></html>";
        let extracted = extract(html, Some("https://paper.example/sports/story-1"));
        assert_eq!(extracted.section.as_deref(), Some("sports"));
    }

    #[test]
    fn section_prefers_meta_tag() {
        let html = r#"<html><head><meta name="section" content="Local"></head><body></body></html>"#;
        let extracted = extract(html, Some("https://paper.example/news/story-1"));
        assert_eq!(extracted.section.as_deref(), Some("Local"));
    }
}
