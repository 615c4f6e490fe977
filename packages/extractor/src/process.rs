//! `ProcessEdition(publication, date, {force}) → ProcessingReport` (spec
//! §4.2): lists raw blobs for an edition, dispatches each to the PDF or
//! HTML pipeline by extension, normalizes, and upserts Articles.
//!
//! Uses direct, runtime-checked `sqlx::query` calls rather than the
//! compile-time query macro, and a capability-probe style dedup check
//! ahead of the unique-constraint insert.

use crate::normalize::{extract_event_dates, normalize_section};
use crate::pipeline::{html, pdf};
use chrono::NaiveDate;
use newsdesk_core::error::{PipelineError, Result};
use newsdesk_core::models::{NewArticle, ProcessingReport, SourceType};
use newsdesk_core::objectstore::ObjectStore;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::{info, warn};

/// One candidate article awaiting insert, carrying the ordering key used
/// for the within-edition tie-break (spec §4.2 Ordering / tie-breaks).
struct Candidate {
    new: NewArticle,
    source_type: SourceType,
    order_key: (i32, i32, usize),
}

pub async fn process_edition(
    pool: &PgPool,
    store: &ObjectStore,
    publication_slug: &str,
    edition_date: NaiveDate,
    force: bool,
) -> Result<ProcessingReport> {
    let prefix = format!("{}/{publication_slug}/raw/", edition_date.format("%Y-%m-%d"));
    let keys = store.list_prefix(&prefix).await?;

    let mut pdf_candidates = Vec::new();
    let mut html_candidates = Vec::new();
    let mut pdf_failed = 0i32;
    let mut html_failed = 0i32;

    for key in &keys {
        let bytes = match store.get(key).await? {
            Some(b) => b,
            None => continue,
        };

        if key.ends_with(".pdf") {
            match pdf::extract_blocks(&bytes, &pdf::HeadlineFontHeuristic) {
                Ok(blocks) => {
                    for (idx, block) in blocks.into_iter().enumerate() {
                        let section = Some(normalize_section(&block.title));
                        let event_dates = extract_event_dates(&block.content);
                        let new = NewArticle {
                            title: block.title,
                            content: block.content,
                            source_type: SourceType::Pdf,
                            edition_date,
                            url: None,
                            source_file: Some(key.clone()),
                            publication: Some(publication_slug.to_string()),
                            section,
                            page_number: Some(block.page_number as i32),
                            column_number: block.column_number.map(|c| c as i32),
                            author: None,
                            date_published: None,
                            raw_html: None,
                            location_name: None,
                            location_lat: None,
                            location_lon: None,
                            event_dates: if event_dates.is_empty() { None } else { Some(event_dates) },
                            tags: None,
                            metadata: None,
                        };
                        pdf_candidates.push(Candidate {
                            new,
                            source_type: SourceType::Pdf,
                            order_key: (block.page_number as i32, 0, idx),
                        });
                    }
                }
                Err(e) => {
                    warn!(key, error = %e, "pdf block extraction failed");
                    pdf_failed += 1;
                }
            }
        } else if key.ends_with(".html") || key.ends_with(".htm") {
            match std::str::from_utf8(&bytes) {
                Ok(raw_html) => {
                    let extracted = html::extract(raw_html, Some(key.as_str()));
                    let section = extracted.section.map(|s| normalize_section(&s));
                    let event_dates = extract_event_dates(&extracted.content_markdown);
                    let new = NewArticle {
                        title: extracted.title,
                        content: extracted.content_markdown,
                        source_type: SourceType::Html,
                        edition_date,
                        url: None,
                        source_file: Some(key.clone()),
                        publication: Some(publication_slug.to_string()),
                        section,
                        page_number: None,
                        column_number: None,
                        author: extracted.author,
                        date_published: extracted.date_published,
                        raw_html: Some(extracted.raw_html),
                        location_name: None,
                        location_lat: None,
                        location_lon: None,
                        event_dates: if event_dates.is_empty() { None } else { Some(event_dates) },
                        tags: None,
                        metadata: None,
                    };
                    html_candidates.push(Candidate {
                        new,
                        source_type: SourceType::Html,
                        order_key: (0, 0, html_candidates.len()),
                    });
                }
                Err(e) => {
                    warn!(key, error = %e, "html blob is not valid utf-8");
                    html_failed += 1;
                }
            }
        }
    }

    let mut report = ProcessingReport::default();
    report.failed += pdf_failed + html_failed;

    let has_pdf = keys.iter().any(|k| k.ends_with(".pdf")) || !pdf_candidates.is_empty() || pdf_failed > 0;
    if has_pdf {
        let pdf_report = insert_candidates(pool, pdf_candidates, force).await?;
        record_history(pool, edition_date, publication_slug, "pdf", &pdf_report, pdf_failed).await?;
        merge(&mut report, &pdf_report);
    }

    let has_html = keys.iter().any(|k| k.ends_with(".html") || k.ends_with(".htm")) || !html_candidates.is_empty() || html_failed > 0;
    if has_html {
        let html_report = insert_candidates(pool, html_candidates, force).await?;
        record_history(pool, edition_date, publication_slug, "html", &html_report, html_failed).await?;
        merge(&mut report, &html_report);
    }

    info!(
        publication = publication_slug,
        edition_date = %edition_date,
        found = report.found,
        new = report.new,
        duplicate = report.duplicate,
        failed = report.failed,
        "edition processed"
    );

    Ok(report)
}

fn merge(total: &mut ProcessingReport, part: &ProcessingReport) {
    total.found += part.found;
    total.new += part.new;
    total.duplicate += part.duplicate;
    total.failed += part.failed;
}

/// Sorts candidates by the ascending `(page_number, column_number,
/// block_index)` tie-break and drops within-batch hash repeats (first
/// kept), returning the survivors plus how many were dropped as
/// in-batch duplicates.
fn order_and_dedupe(mut candidates: Vec<Candidate>) -> (Vec<Candidate>, i32) {
    candidates.sort_by_key(|c| c.order_key);

    let mut survivors = Vec::with_capacity(candidates.len());
    let mut dropped = 0;
    let mut seen = HashSet::new();

    for candidate in candidates {
        let hash = candidate.new.content_hash();
        if seen.insert(hash) {
            survivors.push(candidate);
        } else {
            dropped += 1;
        }
    }

    (survivors, dropped)
}

async fn insert_candidates(pool: &PgPool, candidates: Vec<Candidate>, force: bool) -> Result<ProcessingReport> {
    let (survivors, in_batch_duplicates) = order_and_dedupe(candidates);

    let mut report = ProcessingReport::default();
    report.found = survivors.len() as i32 + in_batch_duplicates;
    report.duplicate = in_batch_duplicates;

    for candidate in survivors {
        match upsert_article(pool, &candidate.new, candidate.source_type, force).await {
            Ok(Some((article_id, inserted))) => {
                if inserted {
                    report.new += 1;
                    insert_events(pool, article_id, &candidate.new).await?;
                } else {
                    report.duplicate += 1;
                }
            }
            Ok(None) => report.duplicate += 1,
            Err(e) => {
                warn!(error = %e, "article upsert failed");
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// `force=false` uses `ON CONFLICT DO NOTHING` (no row is returned on a
/// dedup hit). `force=true` uses `DO UPDATE` and reports via `xmax = 0`
/// whether the row was freshly inserted or refreshed in place.
async fn upsert_article(
    pool: &PgPool,
    new: &NewArticle,
    source_type: SourceType,
    force: bool,
) -> Result<Option<(i64, bool)>> {
    let content_hash = new.content_hash();
    let word_count = new.word_count();
    let tags = new.tags.as_ref().map(|m| serde_json::to_value(m).unwrap_or_default());
    let metadata = new.metadata.as_ref().map(|m| serde_json::to_value(m).unwrap_or_default());

    let sql = if force {
        r#"INSERT INTO articles
            (title, content, content_hash, source_type, processing_status, edition_date,
             url, source_file, publication, section, page_number, column_number, author,
             word_count, date_published, raw_html, event_dates, tags, metadata)
           VALUES ($1,$2,$3,$4,'extracted',$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
           ON CONFLICT (content_hash, edition_date) DO UPDATE SET
             title = EXCLUDED.title,
             content = EXCLUDED.content,
             url = EXCLUDED.url,
             source_file = EXCLUDED.source_file,
             section = EXCLUDED.section,
             page_number = EXCLUDED.page_number,
             column_number = EXCLUDED.column_number,
             author = EXCLUDED.author,
             word_count = EXCLUDED.word_count,
             date_published = EXCLUDED.date_published,
             raw_html = EXCLUDED.raw_html,
             event_dates = EXCLUDED.event_dates
           RETURNING id, (xmax = 0) AS inserted"#
    } else {
        r#"INSERT INTO articles
            (title, content, content_hash, source_type, processing_status, edition_date,
             url, source_file, publication, section, page_number, column_number, author,
             word_count, date_published, raw_html, event_dates, tags, metadata)
           VALUES ($1,$2,$3,$4,'extracted',$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
           ON CONFLICT (content_hash, edition_date) DO NOTHING
           RETURNING id, true AS inserted"#
    };

    let row: Option<(i64, bool)> = sqlx::query_as(sql)
        .bind(&new.title)
        .bind(&new.content)
        .bind(&content_hash)
        .bind(source_type)
        .bind(new.edition_date)
        .bind(&new.url)
        .bind(&new.source_file)
        .bind(&new.publication)
        .bind(&new.section)
        .bind(new.page_number)
        .bind(new.column_number)
        .bind(&new.author)
        .bind(word_count)
        .bind(new.date_published)
        .bind(&new.raw_html)
        .bind(&new.event_dates)
        .bind(tags)
        .bind(metadata)
        .fetch_optional(pool)
        .await
        .map_err(PipelineError::from)?;

    Ok(row)
}

async fn insert_events(pool: &PgPool, article_id: i64, new: &NewArticle) -> Result<()> {
    let Some(event_dates) = &new.event_dates else {
        return Ok(());
    };
    for start_time in event_dates {
        sqlx::query("INSERT INTO article_events (article_id, title, start_time) VALUES ($1, $2, $3)")
            .bind(article_id)
            .bind(&new.title)
            .bind(start_time)
            .execute(pool)
            .await
            .map_err(PipelineError::from)?;
    }
    Ok(())
}

async fn record_history(
    pool: &PgPool,
    edition_date: NaiveDate,
    publication: &str,
    source_type: &str,
    report: &ProcessingReport,
    extraction_failures: i32,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO processing_history
            (edition_date, publication, source_type, articles_found, articles_new, articles_duplicate, articles_failed)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(edition_date)
    .bind(publication)
    .bind(source_type)
    .bind(report.found)
    .bind(report.new)
    .bind(report.duplicate)
    .bind(report.failed + extraction_failures)
    .execute(pool)
    .await
    .map_err(PipelineError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candidate(title: &str, content: &str, page: i32, col: i32, idx: usize) -> Candidate {
        Candidate {
            new: NewArticle {
                title: title.to_string(),
                content: content.to_string(),
                source_type: SourceType::Pdf,
                edition_date: NaiveDate::from_ymd_opt(2025, 1, 8).unwrap(),
                url: None,
                source_file: None,
                publication: None,
                section: None,
                page_number: Some(page),
                column_number: Some(col),
                author: None,
                date_published: None,
                raw_html: None,
                location_name: None,
                location_lat: None,
                location_lon: None,
                event_dates: None,
                tags: None,
                metadata: None,
            },
            source_type: SourceType::Pdf,
            order_key: (page, col, idx),
        }
    }

    #[test]
    fn orders_ascending_by_page_then_column_then_index() {
        let candidates = vec![
            candidate("c", "body c", 2, 1, 0),
            candidate("a", "body a", 1, 0, 0),
            candidate("b", "body b", 1, 1, 0),
        ];
        let (survivors, dropped) = order_and_dedupe(candidates);
        assert_eq!(dropped, 0);
        assert_eq!(
            survivors.iter().map(|c| c.new.title.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn keeps_first_on_hash_collision() {
        let candidates = vec![
            candidate("first", "same body text here", 1, 0, 0),
            candidate("second", "same body text here", 1, 1, 0),
        ];
        let (survivors, dropped) = order_and_dedupe(candidates);
        assert_eq!(dropped, 1);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].new.title, "first");
    }
}
