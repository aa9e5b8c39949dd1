//! Pairwise similarity heuristics for entity text variants.
//!
//! The canonicalizer asks one question of this module: do two entity
//! strings denote the same thing? The answer combines exact matching,
//! whole-word containment, person-name middle-initial handling, and an
//! abbreviation check. All tests are symmetric and case-insensitive.

use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Stop words an abbreviation may skip: "USA" matches
/// "United States of America" because "of" is skippable.
const ABBREVIATION_STOP_WORDS: &[&str] = &["of", "the", "and", "in", "for", "to", "with"];

/// True when the two entity strings are close enough to merge.
pub fn entity_variants_similar(a: &str, b: &str) -> bool {
    let fa = fold(a);
    let fb = fold(b);
    if fa.is_empty() || fb.is_empty() {
        return false;
    }
    if fa == fb {
        return true;
    }
    word_containment(&fa, &fb)
        || person_name_variant(&fa, &fb)
        || abbreviation_of(&fa, &fb)
        || abbreviation_of(&fb, &fa)
}

fn fold(s: &str) -> String {
    s.nfc().collect::<String>().trim().to_lowercase()
}

/// One string appears as a whole-word substring of the other, and the
/// strings are close in word count (difference <= 2) or the shorter's
/// words all occur among the longer's.
fn word_containment(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let pattern = format!(r"\b{}\b", regex::escape(short));
    let Ok(re) = Regex::new(&pattern) else {
        return false;
    };
    if !re.is_match(long) {
        return false;
    }

    let short_words: Vec<&str> = short.split_whitespace().collect();
    let long_words: Vec<&str> = long.split_whitespace().collect();
    let diff = long_words.len().abs_diff(short_words.len());
    let long_set: HashSet<&str> = long_words.iter().copied().collect();
    diff <= 2 || short_words.iter().all(|w| long_set.contains(w))
}

/// Person-name variant: strip single-letter tokens (middle initials) and
/// compare the remaining significant tokens. Equal sequences match, as
/// does a subset with agreeing first and last significant tokens
/// ("donald trump" vs "donald john trump").
fn person_name_variant(a: &str, b: &str) -> bool {
    let sig_a = significant_tokens(a);
    let sig_b = significant_tokens(b);
    if sig_a.is_empty() || sig_b.is_empty() {
        return false;
    }
    if sig_a == sig_b {
        return true;
    }

    let (small, big_sig, big_text) = if sig_a.len() <= sig_b.len() {
        (&sig_a, &sig_b, b)
    } else {
        (&sig_b, &sig_a, a)
    };
    let big_all: HashSet<&str> = big_text.split_whitespace().collect();

    small.first() == big_sig.first()
        && small.last() == big_sig.last()
        && small.iter().all(|t| big_all.contains(t.as_str()))
}

/// Tokens that carry more than one letter once periods are dropped.
fn significant_tokens(s: &str) -> Vec<String> {
    s.split_whitespace()
        .map(|t| t.trim_matches('.').to_string())
        .filter(|t| t.chars().filter(|c| c.is_alphanumeric()).count() > 1)
        .collect()
}

/// `candidate` (<= 5 letters once spaces and periods are removed) reads as
/// the initialism of `phrase`'s words, optionally skipping stop words.
fn abbreviation_of(candidate: &str, phrase: &str) -> bool {
    let compact: String = candidate
        .chars()
        .filter(|c| *c != ' ' && *c != '.')
        .collect();
    let letter_count = compact.chars().count();
    if !(2..=5).contains(&letter_count) {
        return false;
    }

    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }

    let mut letters = compact.chars();
    let mut current = letters.next();
    for word in &words {
        match current {
            Some(c) if word.starts_with(c) => {
                current = letters.next();
            }
            _ if ABBREVIATION_STOP_WORDS.contains(word) => {}
            _ => return false,
        }
    }
    current.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case_and_padding() {
        assert!(entity_variants_similar("NATO", "nato"));
        assert!(entity_variants_similar("  NATO ", "NATO"));
        assert!(!entity_variants_similar("", "NATO"));
    }

    #[test]
    fn whole_word_containment() {
        assert!(entity_variants_similar("European Commission", "Commission"));
        assert!(entity_variants_similar(
            "United Nations",
            "United Nations Security Council"
        ));
        // "ran" is inside "France" but not at word boundaries.
        assert!(!entity_variants_similar("ran", "France"));
    }

    #[test]
    fn person_middle_initial_is_stripped() {
        assert!(entity_variants_similar("Donald Trump", "Donald J. Trump"));
        assert!(entity_variants_similar("Donald J. Trump", "Donald Trump"));
        assert!(!entity_variants_similar("Donald Trump", "Ivanka Trump"));
    }

    #[test]
    fn person_subset_needs_matching_first_and_last() {
        assert!(entity_variants_similar(
            "Donald Trump",
            "Donald John Trump"
        ));
        // Last significant tokens disagree.
        assert!(!entity_variants_similar("Donald Smith", "Donald John Trump"));
    }

    #[test]
    fn abbreviation_heuristic() {
        assert!(entity_variants_similar("EU", "European Union"));
        assert!(entity_variants_similar("USA", "United States of America"));
        assert!(entity_variants_similar("U.S.A.", "United States of America"));
        assert!(entity_variants_similar("NATO", "North Atlantic Treaty Organization"));
        // Too few letters for the word count.
        assert!(!entity_variants_similar("UN", "United Nations Security Council"));
        // Single-word phrases never have an initialism.
        assert!(!entity_variants_similar("EU", "Europe"));
    }
}
