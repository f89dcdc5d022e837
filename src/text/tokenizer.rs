//! Word tokenization.

use crate::text::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// English clitics split off the end of a word: "don't" -> "do" + "n't".
static CLITIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<stem>\w+?)(?P<clitic>n['’]t|['’](?:s|m|d|ll|re|ve))$")
        .expect("clitic pattern is valid")
});

/// English words split in two without an apostrophe, with the split offset.
const FUSED_WORDS: [(&str, usize); 6] = [
    ("cannot", 3),
    ("gimme", 3),
    ("gonna", 3),
    ("gotta", 3),
    ("lemme", 3),
    ("wanna", 3),
];

/// A token with its position in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text.
    pub text: String,
    /// Start position in the original text (byte offset).
    pub start: usize,
    /// End position in the original text (byte offset).
    pub end: usize,
    /// Token index in the sequence.
    pub index: usize,
}

impl Token {
    /// Creates a new token.
    pub fn new(text: String, start: usize, end: usize, index: usize) -> Self {
        Self {
            text,
            start,
            end,
            index,
        }
    }
}

/// Language-aware word tokenizer.
///
/// Words are found on Unicode word boundaries (UAX #29). For English the
/// Treebank contractions are split as well, so negations such as "n't" and
/// the "not" in "cannot" surface as tokens of their own.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    language: Language,
}

impl Tokenizer {
    /// Creates a tokenizer for the given language.
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Language whose rules this tokenizer applies.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Tokenizes text into a sequence of tokens.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();

        for (start, word) in text.unicode_word_indices() {
            if self.language == Language::English {
                for (offset, part) in split_english(word) {
                    let begin = start + offset;
                    let index = tokens.len();
                    tokens.push(Token::new(part.to_string(), begin, begin + part.len(), index));
                }
            } else {
                let index = tokens.len();
                tokens.push(Token::new(word.to_string(), start, start + word.len(), index));
            }
        }

        tokens
    }

    /// Tokenizes text and returns only the token strings.
    pub fn tokenize_to_strings(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|t| t.text).collect()
    }
}

/// Splits an English word into (byte offset, part) pieces.
fn split_english(word: &str) -> Vec<(usize, &str)> {
    let lower = word.to_lowercase();
    if let Some(&(_, at)) = FUSED_WORDS.iter().find(|(fused, _)| *fused == lower) {
        if word.is_char_boundary(at) {
            return vec![(0, &word[..at]), (at, &word[at..])];
        }
    }

    if let Some(caps) = CLITIC.captures(word) {
        if let (Some(stem), Some(clitic)) = (caps.name("stem"), caps.name("clitic")) {
            return vec![(0, stem.as_str()), (clitic.start(), clitic.as_str())];
        }
    }

    vec![(0, word)]
}
