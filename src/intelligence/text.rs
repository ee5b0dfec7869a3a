// ABOUTME: Tokenization and script-counting helpers for the keyword heuristics
// ABOUTME: Whitespace word sets, Jaccard similarity, Thai character and Latin run counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::collections::HashSet;

/// Lowercased whitespace-separated words of `text`
#[must_use]
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Number of whitespace-separated words
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Jaccard similarity of two word sets; 0 when both are empty
#[must_use]
pub fn set_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Jaccard similarity of the lowercased word sets of two texts
#[must_use]
pub fn jaccard(a: &str, b: &str) -> f64 {
    set_similarity(&word_set(a), &word_set(b))
}

/// Whether `c` is in the Thai Unicode block
#[must_use]
pub const fn is_thai(c: char) -> bool {
    matches!(c, '\u{0E00}'..='\u{0E7F}')
}

/// Number of Thai-script characters
#[must_use]
pub fn thai_char_count(text: &str) -> usize {
    text.chars().filter(|c| is_thai(*c)).count()
}

/// Number of ASCII letters
#[must_use]
pub fn latin_letter_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_alphabetic).count()
}

/// Number of maximal runs of ASCII letters, i.e. English words
#[must_use]
pub fn latin_run_count(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in text.chars() {
        let letter = c.is_ascii_alphabetic();
        if letter && !in_run {
            runs += 1;
        }
        in_run = letter;
    }
    runs
}

/// Whether `text` contains any Thai-script character
#[must_use]
pub fn contains_thai(text: &str) -> bool {
    text.chars().any(is_thai)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard() {
        assert!((jaccard("a b c", "A B d") - 0.5).abs() < f64::EPSILON);
        assert!(jaccard("", "").abs() < f64::EPSILON);
        assert!((jaccard("same words", "same   words") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_script_counts() {
        assert_eq!(thai_char_count("สวัสดี hi"), 6);
        assert_eq!(latin_run_count("hello, world! ok"), 3);
        assert_eq!(latin_letter_count("ab1c"), 3);
        assert!(contains_thai("hi ครับ"));
        assert!(!contains_thai("hello"));
    }
}
