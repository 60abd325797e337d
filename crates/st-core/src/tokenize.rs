//! Text → symptom-token tokenization.
//!
//! The indexer and the dialog controller both go through a [`Tokenizer`], so
//! training and inference always see the same token stream for the same text.

use regex::Regex;

/// Splits free text into lower-cased tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Word tokenizer: lower-cases, then extracts runs of letters and digits.
///
/// Apostrophes and hyphens stay inside a word ("can't", "short-term") but
/// never start or end one.
#[derive(Debug, Clone)]
pub struct WordTokenizer {
    pattern: Regex,
}

const WORD_PATTERN: &str = r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*";

impl WordTokenizer {
    pub fn new() -> Self {
        WordTokenizer {
            pattern: Regex::new(WORD_PATTERN).unwrap(),
        }
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.pattern
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Whitespace-only tokenizer; useful when the caller has already normalized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(|t| t.to_lowercase()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let tok = WordTokenizer::new();
        assert_eq!(
            tok.tokenize("I have a Fever, and CHILLS!"),
            vec!["i", "have", "a", "fever", "and", "chills"]
        );
    }

    #[test]
    fn keeps_inner_apostrophes_and_hyphens() {
        let tok = WordTokenizer::new();
        assert_eq!(
            tok.tokenize("can't sleep, short-term pain -- 'ok'"),
            vec!["can't", "sleep", "short-term", "pain", "ok"]
        );
    }

    #[test]
    fn empty_and_symbol_only_input() {
        let tok = WordTokenizer::new();
        assert!(tok.tokenize("").is_empty());
        assert!(tok.tokenize("?!... ,,").is_empty());
    }

    #[test]
    fn whitespace_tokenizer_lowercases() {
        assert_eq!(
            WhitespaceTokenizer.tokenize("  Fever  Cough "),
            vec!["fever", "cough"]
        );
    }
}
