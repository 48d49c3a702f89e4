//! Word tokenization for statement text

use regex::Regex;
use std::sync::OnceLock;

/// Splits already-lowercased text into word tokens
pub trait Tokenizer: Send + Sync {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Tokens are maximal runs of letters, digits and underscores.
///
/// Operators and punctuation never become tokens, which is why math
/// symbols are counted on the raw text instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_]+").expect("separator pattern is valid"))
}

impl Tokenizer for WordTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        separator()
            .split(text)
            .filter(|token| !token.is_empty())
            .collect()
    }
}
