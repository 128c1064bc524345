// src/difficulty.rs

use crate::constants::*;
use crate::models::clamp_level;

/// Maps a difficulty from a smaller source scale onto the 1..=10 level scale.
pub fn normalize_difficulty(value: u8, source_scale: u8) -> u8 {
    if source_scale == VOCABULARY_SCALE {
        return clamp_level(value as i32 * 2);
    }
    clamp_level(value as i32)
}

/// Heuristic difficulty for a sentence that arrives without one.
/// Longer sentences, long words and clause punctuation all push it up.
pub fn sentence_difficulty(sentence: &str) -> u8 {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.is_empty() {
        return 5;
    }

    let word_count = words.len();
    let avg_word_len = sentence.trim().chars().count() as f64 / word_count as f64;
    let has_clause_punctuation = sentence.chars().any(|c| matches!(c, ',' | ';' | ':'));

    let mut difficulty: i32 = match word_count {
        0..=3 => 1,
        4..=5 => 2,
        6..=8 => 3,
        9..=12 => 5,
        13..=18 => 7,
        _ => 8,
    };

    if avg_word_len > 7.0 {
        difficulty += 1;
    }
    if has_clause_punctuation {
        difficulty += 1;
    }

    clamp_level(difficulty)
}

pub fn difficulty_label(level: u8) -> &'static str {
    match level {
        0..=2 => "Beginner",
        3..=4 => "Elementary",
        5..=6 => "Intermediate",
        7..=8 => "Upper Intermediate",
        _ => "Advanced",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_scale_doubles() {
        assert_eq!(normalize_difficulty(1, VOCABULARY_SCALE), 2);
        assert_eq!(normalize_difficulty(5, VOCABULARY_SCALE), 10);
        assert_eq!(normalize_difficulty(0, CONTENT_SCALE), 1);
        assert_eq!(normalize_difficulty(12, CONTENT_SCALE), 10);
    }

    #[test]
    fn sentence_heuristic() {
        assert_eq!(sentence_difficulty("Bună ziua!"), 1);
        assert_eq!(sentence_difficulty("Vreau să învăț limba română."), 2);
        assert_eq!(
            sentence_difficulty("Indiferent de circumstanțe, trebuie să ne păstrăm calmul și să gândim clar."),
            6
        );
        assert_eq!(sentence_difficulty("   "), 5);
    }

    #[test]
    fn labels() {
        assert_eq!(difficulty_label(1), "Beginner");
        assert_eq!(difficulty_label(4), "Elementary");
        assert_eq!(difficulty_label(6), "Intermediate");
        assert_eq!(difficulty_label(8), "Upper Intermediate");
        assert_eq!(difficulty_label(10), "Advanced");
    }
}
