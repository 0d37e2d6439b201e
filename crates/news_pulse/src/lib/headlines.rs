//! Headline extraction from model-curated output.
//!
//! The curation response is free-form markdown; headlines come back in a
//! handful of shapes (numbered lists, dash bullets, bare bold lines). We
//! accept any of them and normalize to plain headline strings.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on headlines kept from a single curation pass.
pub const MAX_HEADLINES: usize = 20;

/// Minimum length for a line to count as a real headline.
const MIN_HEADLINE_LEN: usize = 10;

static NUMBERED_BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s*\*\*").expect("numbered bold pattern should compile")
});

static DASH_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*\*\*").expect("dash bold pattern should compile"));

static BARE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*[A-Z]").expect("bare bold pattern should compile"));

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("leading number pattern should compile"));

static LEADING_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*").expect("leading dash pattern should compile"));

static LEADING_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^•\s*").expect("leading bullet pattern should compile"));

/// Extracts headline strings from curated markdown output.
///
/// Keeps lines that carry a bold span with a source attribution, or that
/// match one of the known list shapes. Leading list markers are stripped,
/// short fragments are dropped, and at most [`MAX_HEADLINES`] survive, in
/// the order the model produced them.
pub fn parse_headlines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| is_headline_line(line))
        .map(strip_list_marker)
        .filter(|line| line.len() > MIN_HEADLINE_LEN)
        .take(MAX_HEADLINES)
        .collect()
}

fn is_headline_line(line: &str) -> bool {
    (line.contains("**") && line.contains('('))
        || NUMBERED_BOLD.is_match(line)
        || DASH_BOLD.is_match(line)
        || BARE_BOLD.is_match(line)
}

fn strip_list_marker(line: &str) -> String {
    let line = LEADING_NUMBER.replace(line, "");
    let line = LEADING_DASH.replace(&line, "");
    LEADING_BULLET.replace(&line, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_numbered_bold_headlines() {
        let text = "\
Here are today's top stories:

1. **OpenAI ships new reasoning model** (TechCrunch)
2. **Anthropic expands enterprise tier** (Reuters)

Let me know if you want more detail.";

        let headlines = parse_headlines(text);
        assert_eq!(
            headlines,
            vec![
                "**OpenAI ships new reasoning model** (TechCrunch)",
                "**Anthropic expands enterprise tier** (Reuters)",
            ]
        );
    }

    #[test]
    fn accepts_dash_and_bare_bold_shapes() {
        let text = "\
- **Meta open-sources a new vision model** (The Verge)
**Google updates Gemini pricing** (Bloomberg)
• **DeepMind publishes protein folding results** (Nature)";

        let headlines = parse_headlines(text);
        assert_eq!(headlines.len(), 3);
        assert!(headlines[0].starts_with("**Meta"));
        assert!(headlines[2].starts_with("**DeepMind"));
    }

    #[test]
    fn strips_list_markers_but_keeps_bold_spans() {
        let text = "3. **Nvidia reports record revenue** (CNBC)";
        let headlines = parse_headlines(text);
        assert_eq!(headlines, vec!["**Nvidia reports record revenue** (CNBC)"]);
    }

    #[test]
    fn drops_short_fragments_and_prose() {
        let text = "\
Sure! Here are the results.
1. **AI** (x)
This line is just commentary without any markers.";

        assert!(parse_headlines(text).is_empty());
    }

    #[test]
    fn caps_at_twenty_in_original_order() {
        let mut text = String::new();
        for i in 1..=25 {
            text.push_str(&format!("{i}. **Story number {i} about AI systems** (Wire)\n"));
        }

        let headlines = parse_headlines(&text);
        assert_eq!(headlines.len(), MAX_HEADLINES);
        assert!(headlines[0].contains("Story number 1 "));
        assert!(headlines[19].contains("Story number 20 "));
    }

    #[test]
    fn empty_input_yields_no_headlines() {
        assert!(parse_headlines("").is_empty());
    }
}
