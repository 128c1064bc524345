// src/normalize.rs

//! Canonical form for typed answers.
//!
//! Both the learner's guess and every accepted answer go through [`normalize`]
//! before comparison, so case, Romanian diacritics, English contractions,
//! punctuation and spacing never decide correctness on their own.

use std::borrow::Cow;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Characters removed outright after contractions are expanded.
const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '-'];

/// Punctuation that may hug a contraction inside a sentence (`"i'm,"`), apostrophe excluded.
const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '"', '(', ')', '-'];

static CONTRACTIONS: &[(&str, &str)] = &[
    ("i'm", "i am"),
    ("i've", "i have"),
    ("i'll", "i will"),
    ("i'd", "i would"),
    ("you're", "you are"),
    ("you've", "you have"),
    ("you'll", "you will"),
    ("you'd", "you would"),
    ("he's", "he is"),
    ("she's", "she is"),
    ("it's", "it is"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("we'll", "we will"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("they'll", "they will"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("what's", "what is"),
    ("where's", "where is"),
    ("let's", "let us"),
    ("isn't", "is not"),
    ("aren't", "are not"),
    ("wasn't", "was not"),
    ("weren't", "were not"),
    ("haven't", "have not"),
    ("hasn't", "has not"),
    ("hadn't", "had not"),
    ("won't", "will not"),
    ("wouldn't", "would not"),
    ("don't", "do not"),
    ("doesn't", "does not"),
    ("didn't", "did not"),
    ("can't", "cannot"),
    ("couldn't", "could not"),
    ("shouldn't", "should not"),
    ("mustn't", "must not"),
];

/// Canonicalizes an answer string. Pure: equal inputs give equal outputs,
/// and `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text
        .trim()
        .to_lowercase()
        .replace(['\u{2018}', '\u{2019}'], "'");

    let without_marks: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let expanded = without_marks
        .split_whitespace()
        .map(expand_contraction)
        .collect::<Vec<_>>()
        .join(" ");

    let without_punctuation: String = expanded
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();

    without_punctuation
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Missing input normalizes to the empty string, which never grades as correct.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

fn expand_contraction(token: &str) -> Cow<'_, str> {
    let core = token.trim_matches(|c| EDGE_PUNCTUATION.contains(&c));
    match CONTRACTIONS.iter().find(|(short, _)| *short == core) {
        Some((short, long)) => Cow::Owned(token.replacen(short, long, 1)),
        None => Cow::Borrowed(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize("  Hello World  "), "hello world");
    }

    #[test]
    fn expands_contractions() {
        assert_eq!(normalize("I'm hungry"), "i am hungry");
        assert_eq!(normalize("I don't know."), "i do not know");
        assert_eq!(normalize("Well, I’m tired!"), "well i am tired");
        assert_eq!(normalize("(can't)"), "cannot");
    }

    #[test]
    fn strips_romanian_diacritics() {
        assert_eq!(normalize("mulțumesc"), "multumesc");
        assert_eq!(normalize("Îmi place să citesc"), "imi place sa citesc");
        assert_eq!(normalize("ȘTIINȚĂ"), "stiinta");
    }

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize("Bună   ziua!!"), "buna ziua");
        assert_eq!(normalize("Mi-e foame."), "mie foame");
        assert_eq!(normalize("\"Where\"  do\tyou\nlive?"), "where do you live");
    }

    #[test]
    fn empty_and_missing_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("?!."), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("Da")), "da");
    }

    #[test]
    fn idempotent_on_samples() {
        for s in ["I'm here", "Nu înțeleg.", "  weird -- spacing ", "you’re welcome", "ÎNTREBARE?"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {:?}", s);
        }
    }
}
