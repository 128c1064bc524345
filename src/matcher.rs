// src/matcher.rs

//! Fuzzy grading of typed answers.
//!
//! Every comparison happens on [`normalize`]d text. An exact match against any
//! accepted answer always passes; beyond that the tolerance depends on the
//! [`AnswerMode`]:
//!
//! * `Word` / `Production`: up to two positional character differences, and only
//!   when the lengths are within two characters of each other.
//! * `Sentence`: gist matching on the first ten characters of either side.
//!
//! Placement uses [`is_correct_strict`], whose tolerance grows with answer length.

use crate::constants::*;
use crate::models::{AnswerMode, AnswerSpec};
use crate::normalize::normalize;
use std::cmp::Ordering;

pub fn is_correct(guess: &str, answer: &AnswerSpec, mode: AnswerMode) -> bool {
    let guess = normalize(guess);
    if guess.is_empty() {
        return false;
    }

    let candidates = normalized_candidates(answer);
    if candidates.iter().any(|c| *c == guess) {
        return true;
    }

    match mode {
        AnswerMode::Word | AnswerMode::Production => {
            let guess_chars: Vec<char> = guess.chars().collect();
            candidates.iter().any(|c| {
                let answer_chars: Vec<char> = c.chars().collect();
                within_typo_budget(&guess_chars, &answer_chars)
            })
        }
        AnswerMode::Sentence => gist_matches(&guess, &candidates),
    }
}

/// Placement grading: exact total character difference, tolerance `max(2, len/4)`.
pub fn is_correct_strict(guess: &str, answer: &AnswerSpec) -> bool {
    let guess = normalize(guess);
    if guess.is_empty() {
        return false;
    }

    normalized_candidates(answer).iter().any(|c| {
        let tolerance = MAX_TYPO_DIFF.max(c.chars().count() / STRICT_TOLERANCE_DIVISOR);
        total_char_diff(&guess, c) <= tolerance
    })
}

/// Recognition questions: normalized equality only.
pub fn is_exact(guess: &str, answer: &AnswerSpec) -> bool {
    let guess = normalize(guess);
    !guess.is_empty() && normalized_candidates(answer).iter().any(|c| *c == guess)
}

fn normalized_candidates(answer: &AnswerSpec) -> Vec<String> {
    answer
        .candidates()
        .map(normalize)
        .filter(|c| !c.is_empty())
        .collect()
}

fn within_typo_budget(guess: &[char], answer: &[char]) -> bool {
    if guess.len().abs_diff(answer.len()) > MAX_LENGTH_DELTA {
        return false;
    }
    positional_diff(guess, answer) <= MAX_TYPO_DIFF
}

/// Walks both strings once. On a mismatch only the longer string's cursor skips
/// ahead (both advance when the lengths are equal). Stops counting once the
/// budget is blown. This is not edit distance and undercounts some reorderings.
pub fn positional_diff(guess: &[char], answer: &[char]) -> usize {
    let (mut i, mut j, mut diff) = (0, 0, 0);

    while i < guess.len() && j < answer.len() {
        if guess[i] == answer[j] {
            i += 1;
            j += 1;
            continue;
        }

        diff += 1;
        if diff > MAX_TYPO_DIFF {
            return diff;
        }

        match guess.len().cmp(&answer.len()) {
            Ordering::Greater => i += 1,
            Ordering::Less => j += 1,
            Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }

    diff + (guess.len() - i) + (answer.len() - j)
}

/// Differing positions over the common prefix length, plus the length delta.
pub fn total_char_diff(guess: &str, answer: &str) -> usize {
    let g: Vec<char> = guess.chars().collect();
    let a: Vec<char> = answer.chars().collect();
    let mismatched = g.iter().zip(a.iter()).filter(|(x, y)| x != y).count();
    mismatched + g.len().abs_diff(a.len())
}

fn gist_matches(guess: &str, candidates: &[String]) -> bool {
    if guess.chars().count() <= SENTENCE_MIN_GUESS_CHARS {
        return false;
    }

    let guess_prefix = char_prefix(guess, SENTENCE_PREFIX_CHARS);
    candidates.iter().any(|c| {
        guess.contains(char_prefix(c, SENTENCE_PREFIX_CHARS)) || c.contains(guess_prefix)
    })
}

fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
