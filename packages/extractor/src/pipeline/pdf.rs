//! PDF pipeline (spec §4.2): parse pages in order, split into article
//! blocks via a pluggable layout heuristic, produce `{title, content,
//! section?, page_number, column_number?}` per block.
//!
//! The block-splitting heuristic is deliberately a trait (DESIGN.md Open
//! Question 1): `pdf-extract` exposes flat page text, not glyph boxes, so
//! a layout-aware strategy can replace `HeadlineFontHeuristic` per
//! publication without touching callers.

use newsdesk_core::error::PipelineError;

pub struct PdfBlock {
    pub title: String,
    pub content: String,
    pub page_number: u32,
    pub column_number: Option<u32>,
}

pub trait PageSplitStrategy: Send + Sync {
    fn split(&self, page_number: u32, page_text: &str) -> Vec<PdfBlock>;
}

/// Default strategy: a line markedly shorter than the page's median
/// content-line length, followed by a longer paragraph, is treated as a
/// headline+body boundary.
pub struct HeadlineFontHeuristic;

impl PageSplitStrategy for HeadlineFontHeuristic {
    fn split(&self, page_number: u32, page_text: &str) -> Vec<PdfBlock> {
        let lines: Vec<&str> = page_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Vec::new();
        }

        let lengths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        let median = median_of(&lengths);
        let headline_threshold = (median as f64 * 0.6).max(8.0) as usize;

        let mut blocks = Vec::new();
        let mut current_title: Option<String> = None;
        let mut current_body = String::new();

        for line in &lines {
            let len = line.chars().count();
            let is_headline_like = len > 0 && len <= headline_threshold;

            if is_headline_like && !current_body.is_empty() {
                if let Some(title) = current_title.take() {
                    blocks.push(PdfBlock {
                        title,
                        content: current_body.trim().to_string(),
                        page_number,
                        column_number: None,
                    });
                }
                current_body.clear();
                current_title = Some(line.to_string());
            } else if is_headline_like && current_title.is_none() {
                current_title = Some(line.to_string());
            } else {
                if !current_body.is_empty() {
                    current_body.push(' ');
                }
                current_body.push_str(line);
            }
        }

        if let Some(title) = current_title {
            blocks.push(PdfBlock {
                title,
                content: current_body.trim().to_string(),
                page_number,
                column_number: None,
            });
        } else if !current_body.is_empty() {
            // No headline-like line found: treat the whole page as one
            // block rather than silently dropping content.
            blocks.push(PdfBlock {
                title: lines[0].to_string(),
                content: current_body.trim().to_string(),
                page_number,
                column_number: None,
            });
        }

        blocks
    }
}

fn median_of(values: &[usize]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 && mid > 0 {
        (sorted[mid - 1] + sorted[mid]) / 2
    } else {
        sorted[mid]
    }
}

/// Parses the full PDF's text and splits each page into blocks with the
/// given strategy. `pdf-extract` returns the whole document as one
/// string with form-feed (`\x0c`) page separators.
pub fn extract_blocks(pdf_bytes: &[u8], strategy: &dyn PageSplitStrategy) -> Result<Vec<PdfBlock>, PipelineError> {
    let text = pdf_extract::extract_text_from_mem(pdf_bytes)
        .map_err(|e| PipelineError::DataError(format!("failed to parse PDF: {e}")))?;

    let mut blocks = Vec::new();
    for (idx, page_text) in text.split('\x0c').enumerate() {
        if page_text.trim().is_empty() {
            continue;
        }
        blocks.extend(strategy.split((idx + 1) as u32, page_text));
    }

    if blocks.is_empty() {
        return Err(PipelineError::DataError("PDF produced no text blocks".into()));
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_headline_and_body() {
        let strategy = HeadlineFontHeuristic;
        let page = "Town Council Meeting\nThe town council met on Tuesday to discuss the new budget proposal and several zoning variances that had been tabled from last month.\nSchool Board Update\nThe school board approved a new curriculum for the coming year after lengthy public comment.";
        let blocks = strategy.split(1, page);
        assert!(blocks.len() >= 1);
        assert_eq!(blocks[0].page_number, 1);
    }

    #[test]
    fn empty_page_yields_no_blocks() {
        let strategy = HeadlineFontHeuristic;
        assert!(strategy.split(1, "").is_empty());
    }
}
