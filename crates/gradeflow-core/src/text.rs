//! Text normalization and negation detection
//!
//! Free-text answers are compared on a normalized form: lower-cased,
//! tokenized, stopwords removed, remaining tokens lemmatized to a
//! base (noun) form, rejoined with single spaces. Negation detection
//! runs on the raw token stream instead — stopword filtering would
//! otherwise eat the very markers it looks for.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Fixed English stopword set.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
        "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
        "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
        "for", "with", "about", "against", "between", "into", "through", "during", "before",
        "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
        "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
        "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
        "only", "own", "same", "so", "than", "too", "very", "can", "will", "just", "should",
        "now", "s", "t", "d", "ll", "m", "o", "re", "ve", "y",
    ]
    .into_iter()
    .collect()
});

/// Fixed negation-marker set; `n't` covers tokenized contractions.
static NEGATION_MARKERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "never", "no", "none", "cannot", "n't", "nothing", "neither", "nor",
    ]
    .into_iter()
    .collect()
});

/// Irregular noun plurals the suffix rules cannot reach.
static IRREGULAR_NOUNS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("mice", "mouse"),
        ("geese", "goose"),
        ("leaves", "leaf"),
        // The es-strip rules cannot undo consonant doubling.
        ("quizzes", "quiz"),
    ]
    .into_iter()
    .collect()
});

/// Lower-case and split `text` into word tokens.
///
/// Splits on anything that is not alphanumeric or an apostrophe, then
/// separates the `n't` contraction suffix into its own token and
/// splits remaining clitics at the apostrophe (`it's` -> `it`, `s`).
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens = Vec::new();
    for raw in lowered.split(|c: char| !c.is_alphanumeric() && c != '\'') {
        let word = raw.trim_matches('\'');
        if word.is_empty() {
            continue;
        }
        if word != "n't" && word.ends_with("n't") {
            let stem = &word[..word.len() - 3];
            if !stem.is_empty() {
                tokens.push(stem.to_string());
            }
            tokens.push("n't".to_string());
        } else if word != "n't" && word.contains('\'') {
            tokens.extend(
                word.split('\'')
                    .filter(|part| !part.is_empty())
                    .map(str::to_string),
            );
        } else {
            tokens.push(word.to_string());
        }
    }
    tokens
}

/// Reduce a token to its base noun form.
pub fn lemmatize(token: &str) -> String {
    if let Some(&base) = IRREGULAR_NOUNS.get(token) {
        return base.to_string();
    }
    if !token.is_ascii() {
        return token.to_string();
    }
    let n = token.len();
    if token.ends_with("ies") && n > 4 {
        return format!("{}y", &token[..n - 3]);
    }
    if ["sses", "zzes", "xes", "ches", "shes"]
        .iter()
        .any(|suffix| token.ends_with(suffix))
    {
        return token[..n - 2].to_string();
    }
    if token.ends_with('s')
        && n > 3
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        return token[..n - 1].to_string();
    }
    token.to_string()
}

/// Normalize `text` for similarity comparison.
///
/// Empty or whitespace-only input normalizes to an empty string; that
/// is a valid result, not an error.
#[must_use]
pub fn normalize(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .filter(|token| !STOPWORDS.contains(token.as_str()))
        .map(|token| lemmatize(&token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether any raw token of `text` is a negation marker.
#[must_use]
pub fn has_negation(text: &str) -> bool {
    tokenize(text)
        .iter()
        .any(|token| NEGATION_MARKERS.contains(token.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_and_whitespace_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n"), "");
        assert_eq!(normalize("the is a"), "");
    }

    #[test]
    fn normalize_lowercases_strips_stopwords_and_lemmatizes() {
        assert_eq!(normalize("The cats chase mice"), "cat chase mouse");
        assert_eq!(
            normalize("Processes run in isolated memory spaces"),
            "process run isolated memory space"
        );
    }

    #[test]
    fn tokenize_splits_negative_contractions() {
        assert_eq!(tokenize("I don't know"), vec!["i", "do", "n't", "know"]);
        assert_eq!(tokenize("can't"), vec!["ca", "n't"]);
    }

    #[test]
    fn tokenize_splits_clitics_at_apostrophe() {
        assert_eq!(tokenize("it's fine"), vec!["it", "s", "fine"]);
    }

    #[test]
    fn lemmatize_handles_regular_and_irregular_plurals() {
        assert_eq!(lemmatize("studies"), "study");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("churches"), "church");
        assert_eq!(lemmatize("quizzes"), "quiz");
        assert_eq!(lemmatize("buzzes"), "buzz");
        assert_eq!(lemmatize("mazes"), "maze");
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("glass"), "glass");
        assert_eq!(lemmatize("virus"), "virus");
        assert_eq!(lemmatize("analysis"), "analysis");
    }

    #[test]
    fn negation_detected_on_markers_and_contractions() {
        assert!(has_negation("I do not know"));
        assert!(has_negation("I don't know"));
        assert!(has_negation("Never use raw pointers"));
        assert!(has_negation("NONE of the above"));
        assert!(has_negation("It cannot happen"));
    }

    #[test]
    fn negation_absent_in_affirmative_text() {
        assert!(!has_negation("I know"));
        assert!(!has_negation("notation is nothingburger-free")); // substrings do not count
        assert!(!has_negation(""));
    }
}
