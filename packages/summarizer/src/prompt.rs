//! System prompt and input-budget truncation for the summarizer worker
//! (spec §4.3 Prompt & model contract).

const SYSTEM_PROMPT: &str = "You are a local-news summarizer. Given an article's title and body, \
return a JSON object matching {\"summary\": string (<=300 words), \"bullets\": string[]?, \"tags\": string[]?}. \
Write in a neutral, factual tone suitable for a community newspaper digest. Respond with JSON only.";

/// Rough token estimate: ~4 characters per token, matching the
/// conservative ratio used for the rest of the OpenAI-compatible stack.
const CHARS_PER_TOKEN: usize = 4;

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Truncates `content` to roughly fit `token_cap` tokens, cutting from
/// the middle so the lede and the closing paragraph both survive (spec
/// §4.3: "middle-truncation if over budget").
pub fn truncate_to_budget(content: &str, token_cap: u32) -> String {
    let char_cap = (token_cap as usize).saturating_mul(CHARS_PER_TOKEN);
    if content.chars().count() <= char_cap {
        return content.to_string();
    }

    let half = char_cap / 2;
    let chars: Vec<char> = content.chars().collect();
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[chars.len() - half..].iter().collect();
    format!("{head}\n\n[... truncated ...]\n\n{tail}")
}

pub fn user_message(title: &str, content: &str, token_cap: u32) -> String {
    let body = truncate_to_budget(content, token_cap);
    format!("Title: {title}\n\nBody:\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_short_content_untouched() {
        let content = "short article body";
        assert_eq!(truncate_to_budget(content, 6000), content);
    }

    #[test]
    fn truncates_from_the_middle() {
        let content = "a".repeat(10_000);
        let truncated = truncate_to_budget(&content, 100);
        assert!(truncated.contains("[... truncated ...]"));
        assert!(truncated.len() < content.len());
        assert!(truncated.starts_with('a'));
        assert!(truncated.ends_with('a'));
    }
}
