//! Rule-based English noun lemmatizer.
//!
//! Mirrors WordNet's `morphy` for nouns without a lexicon: irregular plurals
//! come from an exception table, regular plurals are reduced by suffix
//! detachment rules. Plurals whose regular reduction is not a word
//! ("movies", "houses") are listed as exceptions. Words that are not plural
//! nouns pass through unchanged, so verb forms such as "running" keep their
//! surface form.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static EXCEPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("geese", "goose"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
        ("lice", "louse"),
        ("oxen", "ox"),
        ("men", "man"),
        ("women", "woman"),
        ("wolves", "wolf"),
        ("knives", "knife"),
        ("wives", "wife"),
        ("lives", "life"),
        ("leaves", "leaf"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("thieves", "thief"),
        ("loaves", "loaf"),
        ("calves", "calf"),
        ("selves", "self"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("data", "datum"),
        ("corpora", "corpus"),
        ("analyses", "analysis"),
        ("theses", "thesis"),
        ("crises", "crisis"),
        ("diagnoses", "diagnosis"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("vertices", "vertex"),
        ("appendices", "appendix"),
        ("cacti", "cactus"),
        ("fungi", "fungus"),
        ("nuclei", "nucleus"),
        ("radii", "radius"),
        ("alumni", "alumnus"),
        ("bacteria", "bacterium"),
        ("media", "medium"),
        ("people", "people"),
        ("series", "series"),
        ("species", "species"),
        ("news", "news"),
        ("lens", "lens"),
        ("movies", "movie"),
        ("cookies", "cookie"),
        ("pies", "pie"),
        ("ties", "tie"),
        ("lies", "lie"),
        ("calories", "calorie"),
        ("zombies", "zombie"),
        ("brownies", "brownie"),
        ("rookies", "rookie"),
        ("selfies", "selfie"),
        ("hippies", "hippie"),
        ("genies", "genie"),
        ("prairies", "prairie"),
        ("houses", "house"),
        ("horses", "horse"),
        ("courses", "course"),
        ("cases", "case"),
        ("purposes", "purpose"),
        ("responses", "response"),
        ("uses", "use"),
        ("causes", "cause"),
        ("bases", "base"),
        ("databases", "database"),
        ("releases", "release"),
        ("expenses", "expense"),
        ("licenses", "license"),
        ("nurses", "nurse"),
        ("verses", "verse"),
        ("doses", "dose"),
        ("phases", "phase"),
        ("noses", "nose"),
        ("roses", "rose"),
        ("senses", "sense"),
        ("clauses", "clause"),
        ("promises", "promise"),
        ("exercises", "exercise"),
        ("purchases", "purchase"),
        ("increases", "increase"),
        ("decreases", "decrease"),
        ("diseases", "disease"),
        ("phrases", "phrase"),
        ("glimpses", "glimpse"),
    ]
    .into_iter()
    .collect()
});

/// Suffix rules applied in order; the first applicable rule wins.
const DETACHMENTS: [(&str, &str); 9] = [
    ("sses", "ss"),
    ("ses", "s"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
    ("ies", "y"),
    ("men", "man"),
    ("s", ""),
];

/// Endings of singular nouns that look plural.
const SINGULAR_ENDINGS: [&str; 4] = ["ss", "us", "is", "ous"];

/// Shortest word the detachment rules touch.
const MIN_WORD_LEN: usize = 4;

/// English noun lemmatizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lemmatizer;

impl Lemmatizer {
    /// Creates a new lemmatizer.
    pub fn new() -> Self {
        Self
    }

    /// Reduces a lowercase token to its noun lemma.
    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = EXCEPTIONS.get(word) {
            return (*lemma).to_string();
        }

        if word.chars().count() < MIN_WORD_LEN
            || SINGULAR_ENDINGS.iter().any(|end| word.ends_with(end))
        {
            return word.to_string();
        }

        for (suffix, replacement) in DETACHMENTS {
            if let Some(stem) = word.strip_suffix(suffix) {
                // A lemma needs at least two characters and a vowel.
                if stem.chars().count() + replacement.len() >= 2
                    && has_vowel(stem)
                {
                    return format!("{stem}{replacement}");
                }
                break;
            }
        }

        word.to_string()
    }
}

fn has_vowel(stem: &str) -> bool {
    stem.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(word: &str) -> String {
        Lemmatizer::new().lemmatize(word)
    }

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemma("cats"), "cat");
        assert_eq!(lemma("dogs"), "dog");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("churches"), "church");
        assert_eq!(lemma("dishes"), "dish");
        assert_eq!(lemma("studies"), "study");
        assert_eq!(lemma("classes"), "class");
        assert_eq!(lemma("firemen"), "fireman");
        assert_eq!(lemma("buses"), "bus");
        assert_eq!(lemma("gases"), "gas");
    }

    #[test]
    fn test_plurals_kept_as_real_lemmas() {
        assert_eq!(lemma("movies"), "movie");
        assert_eq!(lemma("cookies"), "cookie");
        assert_eq!(lemma("houses"), "house");
        assert_eq!(lemma("courses"), "course");
        assert_eq!(lemma("lens"), "lens");
        assert_eq!(lemma("cities"), "city");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemma("geese"), "goose");
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("women"), "woman");
        assert_eq!(lemma("corpora"), "corpus");
    }

    #[test]
    fn test_unchanged_words() {
        assert_eq!(lemma("running"), "running");
        assert_eq!(lemma("glass"), "glass");
        assert_eq!(lemma("bus"), "bus");
        assert_eq!(lemma("analysis"), "analysis");
        assert_eq!(lemma("famous"), "famous");
        assert_eq!(lemma("gas"), "gas");
        assert_eq!(lemma("not"), "not");
    }
}
