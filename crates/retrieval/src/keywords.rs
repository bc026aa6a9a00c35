//! Query keyword extraction.

/// Words that carry no retrieval signal. Includes the generic file
/// operation verbs and nouns, which appear in nearly every request.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "is", "are", "was", "were",
    "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "can", "to",
    "of", "in", "on", "at", "for", "with", "about", "from", "by",
    "this", "that", "these", "those", "it", "its", "my", "your",
    "what", "which", "who", "when", "where", "why", "how",
    "please", "thanks", "thank", "you", "me", "i", "we", "they",
    "create", "make", "add", "delete", "move", "copy", "file", "folder",
];

/// Lowercased, de-duplicated keywords in first-occurrence order.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in query.to_lowercase().split_whitespace() {
        let word: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if word.chars().count() <= 2
            || STOP_WORDS.contains(&word.as_str())
            || word.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}
