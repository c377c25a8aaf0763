//! Character-level helpers for comparing learner text with a target sentence.

/// Sentence punctuation that does not change whether a correction was made.
/// Includes the Spanish opening marks ¿ and ¡.
pub fn is_sentence_punctuation(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '¡' | '¿' | '…' | '"' | '«' | '»')
}

/// Normalize typographic quotes and apostrophes to their ASCII forms.
pub fn fold_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        _ => c,
    }
}

/// Lowercase, fold quotes, collapse runs of whitespace, and strip sentence
/// punctuation from both ends. Accents are kept: "esta" and "está" differ.
pub fn normalize_sentence(s: &str) -> String {
    let folded: String = s.chars().map(fold_quote).flat_map(char::to_lowercase).collect();
    let words: Vec<&str> = folded.split_whitespace().collect();
    words
        .join(" ")
        .trim_matches(|c: char| is_sentence_punctuation(c) || c.is_whitespace())
        .to_string()
}
