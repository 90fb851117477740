//! Statute chunking for embedding.
//!
//! Splits normalized statute text into retrieval chunks:
//!
//! - Sections are delimited by headings: Markdown ATX headings (`#` count is
//!   the level), ALL-CAPS multi-word lines such as `PART XII` (level 1), and
//!   numbered section headings such as `12. Notice of termination` or
//!   `60A. Hours of work` (level 2). An ALL-CAPS title directly under
//!   `PART II` is folded into that heading.
//! - A heading stack produces the `section_path` breadcrumb on each chunk
//! - A chunk never straddles two sections
//! - Sections longer than `max_tokens` whitespace tokens are split between
//!   sentences: after `.`, `?`, `!` or `;`, at a blank line, or before a line
//!   opening a sub-clause such as `(2)`. A single sentence longer than the
//!   budget becomes its own chunk.
//!
//! Token spans index the document's whole whitespace-token sequence, heading
//! lines included, so spans stay comparable across sections.

use std::sync::LazyLock;

use akta_core::entities::TokenSpan;
use regex::Regex;

static MD_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("markdown heading regex is valid")
});

static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}[A-Z]{0,2}\.\s+\p{Lu}").expect("numbered heading regex is valid")
});

static SUB_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((?:\d{1,3}[A-Z]?|[a-z]{1,4})\)").expect("sub-clause regex is valid")
});

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &["e.g.", "i.e.", "etc.", "no.", "s.", "ss.", "cf.", "vs.", "para."];

/// Longest line still considered a numbered heading.
const MAX_HEADING_WORDS: usize = 14;

/// A chunk of one section, before ids and embeddings are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatuteChunk {
    /// Breadcrumb of headings enclosing the chunk. Empty for a preamble.
    pub section_path: Vec<String>,
    /// Source text of the chunk, original line breaks preserved.
    pub text: String,
    pub token_span: TokenSpan,
}

/// Chunk statute text into sections and size-bounded sentence groups.
///
/// # Examples
///
/// ```
/// use akta_search::chunker::chunk_statute;
///
/// let text = "PART XII\n\n60A. Hours of work\n\n(1) An employee shall not work more than eight hours in one day.";
/// let chunks = chunk_statute(text, 256);
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].section_path, vec!["PART XII", "60A. Hours of work"]);
/// ```
#[must_use]
pub fn chunk_statute(text: &str, max_tokens: usize) -> Vec<StatuteChunk> {
    let max_tokens = max_tokens.max(1);
    let mut chunks = Vec::new();
    for section in split_sections(text).0 {
        for group in pack_sentences(&split_sentences(text, &section.tokens), max_tokens) {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            chunks.push(StatuteChunk {
                section_path: section.path.clone(),
                text: text[first.start..last.end].to_string(),
                token_span: TokenSpan {
                    start: first.index,
                    end: last.index + 1,
                },
            });
        }
    }
    chunks
}

/// Heading labels of `text` in reading order.
#[must_use]
pub fn outline(text: &str) -> Vec<String> {
    split_sections(text).1
}

// ── Internal types ───────────────────────────────────────────

/// A whitespace token with its byte range and global position.
#[derive(Debug, Clone, Copy)]
struct Token {
    start: usize,
    end: usize,
    index: usize,
    /// First token on its line.
    line_start: bool,
    /// First token after one or more blank lines.
    after_blank: bool,
}

/// Body tokens under one heading path.
struct Section {
    path: Vec<String>,
    tokens: Vec<Token>,
}

// ── Heading detection ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingKind {
    Markdown,
    Caps,
    Numbered,
}

/// Heading kind, level and label for a trimmed line, if it is a heading.
fn detect_heading(line: &str) -> Option<(HeadingKind, usize, String)> {
    if line.is_empty() {
        return None;
    }
    if let Some(caps) = MD_HEADING.captures(line) {
        return Some((HeadingKind::Markdown, caps[1].len(), caps[2].trim().to_string()));
    }
    if is_all_caps_heading(line) {
        return Some((HeadingKind::Caps, 1, line.to_string()));
    }
    if is_numbered_heading(line) {
        return Some((HeadingKind::Numbered, 2, line.to_string()));
    }
    None
}

/// At least two words containing letters, every letter uppercase.
fn is_all_caps_heading(line: &str) -> bool {
    let wordy = line
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .count();
    wordy >= 2
        && line
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase)
}

/// `12. Title` / `60A. Title`: short, capitalized, not a sentence.
fn is_numbered_heading(line: &str) -> bool {
    NUMBERED_HEADING.is_match(line)
        && line.split_whitespace().count() <= MAX_HEADING_WORDS
        && !line.ends_with(['.', ';', ':', ','])
}

// ── Section splitting ────────────────────────────────────────

fn split_sections(text: &str) -> (Vec<Section>, Vec<String>) {
    let mut sections = Vec::new();
    let mut outline: Vec<String> = Vec::new();
    let mut heading_stack: Vec<(usize, String)> = Vec::new();
    let mut current = Section {
        path: Vec::new(),
        tokens: Vec::new(),
    };
    let mut index = 0usize;
    let mut offset = 0usize;
    let mut saw_blank = false;
    // Kind of the previous non-blank line, when it was a heading.
    let mut previous_heading: Option<HeadingKind> = None;

    for line in text.split('\n') {
        let line_offset = offset;
        offset += line.len() + 1;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            saw_blank = true;
            continue;
        }

        let spans = token_spans(line, line_offset);
        if let Some((kind, level, title)) = detect_heading(trimmed) {
            index += spans.len();
            saw_blank = false;

            // `PART II` followed by `CONTRACTS OF SERVICE` names one part.
            if kind == HeadingKind::Caps && previous_heading == Some(HeadingKind::Caps) {
                if let Some((_, top)) = heading_stack.last_mut() {
                    *top = format!("{top} - {title}");
                    if let Some(last) = outline.last_mut() {
                        last.clone_from(top);
                    }
                    current.path = build_section_path(&heading_stack);
                    previous_heading = None;
                    continue;
                }
            }

            if !current.tokens.is_empty() {
                sections.push(current);
            }
            while heading_stack.last().is_some_and(|(l, _)| *l >= level) {
                heading_stack.pop();
            }
            heading_stack.push((level, title.clone()));
            outline.push(title);
            current = Section {
                path: build_section_path(&heading_stack),
                tokens: Vec::new(),
            };
            previous_heading = Some(kind);
            continue;
        }

        for (i, (start, end)) in spans.into_iter().enumerate() {
            current.tokens.push(Token {
                start,
                end,
                index,
                line_start: i == 0,
                after_blank: i == 0 && saw_blank,
            });
            index += 1;
        }
        saw_blank = false;
        previous_heading = None;
    }

    if !current.tokens.is_empty() {
        sections.push(current);
    }
    (sections, outline)
}

fn build_section_path(heading_stack: &[(usize, String)]) -> Vec<String> {
    heading_stack
        .iter()
        .map(|(_, title)| title.clone())
        .collect()
}

/// Byte ranges of the whitespace-separated tokens of `line`.
fn token_spans(line: &str, base: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((base + s, base + i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((base + s, base + line.len()));
    }
    spans
}

// ── Sentence splitting ───────────────────────────────────────

fn split_sentences(text: &str, tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut sentences = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for token in tokens {
        let word = &text[token.start..token.end];
        let opens_clause = token.line_start && SUB_CLAUSE.is_match(word);
        if !current.is_empty() && (token.after_blank || opens_clause) {
            sentences.push(std::mem::take(&mut current));
        }
        current.push(*token);
        if ends_sentence(word) {
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

fn ends_sentence(word: &str) -> bool {
    let core = word.trim_end_matches(['"', '\'', ')', '\u{201d}', '\u{2019}']);
    if !core.ends_with(['.', '?', '!', ';']) {
        return false;
    }
    let lower = core.to_lowercase();
    !ABBREVIATIONS.contains(&lower.as_str())
}

/// Greedily group consecutive sentences into chunks of at most `max_tokens`.
fn pack_sentences(sentences: &[Vec<Token>], max_tokens: usize) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    for sentence in sentences {
        if !current.is_empty() && current.len() + sentence.len() > max_tokens {
            groups.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(sentence);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const ACT: &str = "EMPLOYMENT ACT 1955

An Act relating to employment.

PART II
CONTRACTS OF SERVICE

12. Notice of termination of contract

(1) Either party to a contract of service may at any time give to the other party notice of his intention to terminate such contract of service.

(2) The length of such notice shall be four weeks' notice if the employee has been so employed for less than two years.

PART XII
REST DAYS, HOURS OF WORK, HOLIDAYS AND OTHER CONDITIONS OF SERVICE

60A. Hours of work

(1) An employee shall not be required to work more than eight hours in one day.";

    #[rstest]
    #[case("# Employment Act", Some((1, "Employment Act")))]
    #[case("### 60A. Hours of work ###", Some((3, "60A. Hours of work")))]
    #[case("PART XII", Some((1, "PART XII")))]
    #[case("12. Notice of termination of contract", Some((2, "12. Notice of termination of contract")))]
    #[case("60A. Hours of work", Some((2, "60A. Hours of work")))]
    #[case("EPF", None)]
    #[case("12. The employer shall pay the wages.", None)]
    #[case("(1) An employee shall not work", None)]
    #[case("2026", None)]
    #[case("RM 1,500", None)]
    fn heading_styles(#[case] line: &str, #[case] expected: Option<(usize, &str)>) {
        let got = detect_heading(line).map(|(_, level, title)| (level, title));
        assert_eq!(got, expected.map(|(l, t)| (l, t.to_string())));
    }

    #[test]
    fn sections_follow_heading_hierarchy() {
        let chunks = chunk_statute(ACT, 256);
        let paths: Vec<Vec<String>> = chunks.iter().map(|c| c.section_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                vec!["EMPLOYMENT ACT 1955".to_string()],
                vec![
                    "PART II - CONTRACTS OF SERVICE".to_string(),
                    "12. Notice of termination of contract".to_string()
                ],
                vec![
                    "PART XII - REST DAYS, HOURS OF WORK, HOLIDAYS AND OTHER CONDITIONS OF SERVICE"
                        .to_string(),
                    "60A. Hours of work".to_string()
                ],
            ]
        );
    }

    #[test]
    fn outline_lists_every_heading() {
        let headings = outline(ACT);
        assert_eq!(headings.first().map(String::as_str), Some("EMPLOYMENT ACT 1955"));
        assert!(headings.contains(&"60A. Hours of work".to_string()));
        assert!(headings.contains(&"PART II - CONTRACTS OF SERVICE".to_string()));
        assert_eq!(headings.len(), 5);
    }

    #[test]
    fn long_sections_split_between_sentences() {
        let chunks = chunk_statute(ACT, 20);
        let notice: Vec<&StatuteChunk> = chunks
            .iter()
            .filter(|c| c.section_path.last().is_some_and(|h| h.starts_with("12.")))
            .collect();
        assert_eq!(notice.len(), 2);
        assert!(notice[0].text.starts_with("(1) Either party"));
        assert!(notice[0].text.ends_with("contract of service."));
        assert!(notice[1].text.starts_with("(2) The length"));
    }

    #[test]
    fn oversized_sentence_is_its_own_chunk() {
        let text = "one two three four five six seven eight. nine ten.";
        let chunks = chunk_statute(text, 3);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["one two three four five six seven eight.", "nine ten."]
        );
    }

    #[test]
    fn sub_clause_line_breaks_sentence() {
        let text = "The employer shall pay\n(a) wages; and\n(b) overtime";
        let chunks = chunk_statute(text, 3);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["The employer shall pay", "(a) wages; and", "(b) overtime"]);
    }

    #[test]
    fn abbreviations_do_not_end_sentences() {
        let text = "See s. 12 for notice. Then apply.";
        let chunks = chunk_statute(text, 5);
        assert_eq!(chunks[0].text, "See s. 12 for notice.");
    }

    #[test]
    fn token_spans_cover_document_tokens() {
        let chunks = chunk_statute(ACT, 20);
        let words: Vec<&str> = ACT.split_whitespace().collect();
        for chunk in &chunks {
            let from_span = words[chunk.token_span.start..chunk.token_span.end].join(" ");
            let from_text = chunk.text.split_whitespace().collect::<Vec<_>>().join(" ");
            assert_eq!(from_span, from_text);
        }
        for pair in chunks.windows(2) {
            assert!(pair[0].token_span.end <= pair[1].token_span.start);
        }
    }

    #[test]
    fn chunking_is_deterministic() {
        assert_eq!(chunk_statute(ACT, 16), chunk_statute(ACT, 16));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(chunk_statute("", 256).is_empty());
        assert!(chunk_statute("# Only a heading", 256).is_empty());
    }
}
