//! Keyword relevance scoring.

/// Score `text` against `keywords` in `[0, 1]`.
///
/// Every keyword found as a substring counts as one match and adds a
/// bonus of 0.2 when it also occurs as a whole word, 0.1 otherwise.
/// `score = min(1, matches / keywords * 0.6 + bonus)`; no match is 0.
pub fn relevance_score(keywords: &[String], text: &str) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }

    let lower = text.to_lowercase();
    let mut matches = 0usize;
    let mut bonus = 0.0f32;
    for keyword in keywords {
        if lower.contains(keyword.as_str()) {
            matches += 1;
            bonus += if contains_whole_word(&lower, keyword) { 0.2 } else { 0.1 };
        }
    }

    if matches == 0 {
        return 0.0;
    }
    let ratio = matches as f32 / keywords.len() as f32;
    (ratio * 0.6 + bonus).min(1.0)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn contains_whole_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}
