//! Lexical scoring: term overlap and statutory-term boosts.
//!
//! Used as the whole relevance signal for degraded chunks and when the query
//! cannot be embedded, and as an additive boost otherwise.

use std::collections::HashSet;

/// Words carrying no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "any", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from",
    "how", "i", "if", "in", "is", "it", "me", "much", "my", "of", "on", "or", "shall", "so",
    "such", "that", "the", "this", "to", "what", "when", "which", "who", "will", "with",
];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Distinct lowercase terms of `text`, stop words removed.
#[must_use]
pub fn terms(text: &str) -> HashSet<String> {
    words(text)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// `|query ∩ chunk| / |query|`, or `0.0` for an empty query.
#[must_use]
pub fn overlap_ratio(query: &HashSet<String>, chunk: &HashSet<String>) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    let shared = query.iter().filter(|t| chunk.contains(*t)).count();
    ratio(shared, query.len())
}

/// Text reduced to ` word word word ` so phrases match on word boundaries.
#[must_use]
pub fn phrase_text(text: &str) -> String {
    let mut out = String::from(" ");
    for word in words(text) {
        out.push_str(&word);
        out.push(' ');
    }
    out
}

#[allow(clippy::cast_precision_loss)] // counts are small
fn ratio(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64
}

/// Configured list of statutory terms (e.g. `EPF`, `notice period`).
#[derive(Debug, Clone, Default)]
pub struct StatutoryTerms {
    phrases: Vec<String>,
}

impl StatutoryTerms {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<String> = terms
            .into_iter()
            .map(|t| phrase_text(t.as_ref()))
            .filter(|p| !p.trim().is_empty())
            .collect();
        phrases.sort();
        phrases.dedup();
        Self { phrases }
    }

    /// Terms present in a [`phrase_text`]-normalized text.
    pub fn matched<'a>(&'a self, phrase_text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.phrases
            .iter()
            .filter(move |p| phrase_text.contains(p.as_str()))
            .map(|p| p.trim())
    }

    /// Fraction of the query's statutory terms that the chunk also contains.
    /// `0.0` when the query names none.
    #[must_use]
    pub fn boost_fraction(&self, query_phrase: &str, chunk_phrase: &str) -> f64 {
        let in_query: Vec<&String> = self
            .phrases
            .iter()
            .filter(|p| query_phrase.contains(p.as_str()))
            .collect();
        if in_query.is_empty() {
            return 0.0;
        }
        let shared = in_query
            .iter()
            .filter(|p| chunk_phrase.contains(p.as_str()))
            .count();
        ratio(shared, in_query.len())
    }
}
