//! Sentence-length and syllable-estimate readability scoring.
//!
//! Used by gates that flag documents written above a plain-English
//! threshold (FCA's "fair, clear and not misleading" standard and GDPR's
//! "concise, transparent, intelligible" standard both lean on this).
//! Sentence and word boundaries come from `unicode-segmentation` rather
//! than naive byte splitting, so the score is stable across scripts.

use unicode_segmentation::UnicodeSegmentation;

/// A Flesch-style readability score and the statistics it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadabilityScore {
    /// Flesch Reading Ease score: higher is easier to read.
    pub score: f64,
    /// Average words per sentence.
    pub avg_words_per_sentence: f64,
    /// Average estimated syllables per word.
    pub avg_syllables_per_word: f64,
    /// Number of sentences the scorer found.
    pub sentence_count: usize,
    /// Number of words the scorer found.
    pub word_count: usize,
}

/// Computes a readability score for `text`.
///
/// Empty or punctuation-only text yields a neutral score of `100.0`
/// (maximally readable) with zero counts, so callers do not need to
/// special-case empty documents.
#[must_use]
pub fn score(text: &str) -> ReadabilityScore {
    let sentences: Vec<&str> = text
        .unicode_sentences()
        .filter(|s| !s.trim().is_empty())
        .collect();
    let words: Vec<&str> = text
        .unicode_words()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();

    if sentences.is_empty() || words.is_empty() {
        return ReadabilityScore {
            score: 100.0,
            avg_words_per_sentence: 0.0,
            avg_syllables_per_word: 0.0,
            sentence_count: sentences.len(),
            word_count: words.len(),
        };
    }

    let syllables: usize = words.iter().map(|w| estimate_syllables(w)).sum();

    let avg_words_per_sentence = words.len() as f64 / sentences.len() as f64;
    let avg_syllables_per_word = syllables as f64 / words.len() as f64;

    // Flesch Reading Ease: 206.835 - 1.015*(words/sentences) - 84.6*(syllables/words)
    let flesch = 206.835 - 1.015 * avg_words_per_sentence - 84.6 * avg_syllables_per_word;

    ReadabilityScore {
        score: flesch.clamp(-200.0, 121.22),
        avg_words_per_sentence,
        avg_syllables_per_word,
        sentence_count: sentences.len(),
        word_count: words.len(),
    }
}

/// Crude vowel-group syllable estimate; good enough for a relative
/// readability score, not intended as a dictionary-accurate count.
fn estimate_syllables(word: &str) -> usize {
    let lower: Vec<char> = word.to_lowercase().chars().collect();
    let mut count = 0usize;
    let mut prev_was_vowel = false;
    for ch in &lower {
        let is_vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_vowel;
    }
    if lower.ends_with(&['e']) && count > 1 {
        count -= 1;
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_neutral() {
        let result = score("");
        assert_eq!(result.score, 100.0);
        assert_eq!(result.word_count, 0);
    }

    #[test]
    fn test_simple_sentence_scores_high() {
        let result = score("The cat sat on the mat. It was a nice day.");
        assert!(result.score > 60.0, "expected easy text, got {}", result.score);
    }

    #[test]
    fn test_complex_sentence_scores_lower() {
        let simple = score("The cat sat on the mat.");
        let complex = score(
            "The aforementioned multidimensional organizational restructuring \
             necessitates comprehensive interdepartmental stakeholder consultation \
             processes prior to implementation.",
        );
        assert!(complex.score < simple.score);
    }

    #[test]
    fn test_syllable_estimate_reasonable() {
        assert_eq!(estimate_syllables("cat"), 1);
        assert!(estimate_syllables("beautiful") >= 3);
    }
}
