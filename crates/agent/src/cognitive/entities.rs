//! Entity extraction for task analysis.

use regex_lite::Regex;

const PATTERNS: [&str; 3] = [
    r"~/[\w\-/.]+",
    r"(?i)(?:folder|directory)\s+(?:called|named)?\s*\w+",
    r"(?i)file\s+(?:called|named)?\s*\w+\.?\w*",
];

const QUOTED: &str = r#""[^"]+"|'[^']+'"#;

/// Paths, quoted names, and folder/file references, de-duplicated in
/// first-seen order. Quoted names are returned without their quotes;
/// folder and file references are returned as matched.
pub fn extract_entities(message: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |entity: String| {
        if !found.contains(&entity) {
            found.push(entity);
        }
    };

    if let Ok(re) = Regex::new(PATTERNS[0]) {
        re.find_iter(message).for_each(|m| push(m.as_str().to_string()));
    }
    if let Ok(re) = Regex::new(QUOTED) {
        re.find_iter(message)
            .for_each(|m| push(m.as_str().replace(['"', '\''], "")));
    }
    for pattern in &PATTERNS[1..] {
        if let Ok(re) = Regex::new(pattern) {
            re.find_iter(message).for_each(|m| push(m.as_str().to_string()));
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_paths_quotes_and_references() {
        let entities = extract_entities(
            r#"Create a folder called Projects in ~/Documents and a file named "notes.md""#,
        );
        assert_eq!(
            entities,
            vec!["~/Documents", "notes.md", "folder called Projects", "file named"]
        );
    }

    #[test]
    fn duplicates_removed() {
        let entities = extract_entities("copy ~/a/b.txt to ~/c then back to ~/a/b.txt");
        assert_eq!(entities, vec!["~/a/b.txt", "~/c"]);
    }

    #[test]
    fn single_quotes_and_directory_keyword() {
        let entities = extract_entities("open the Directory named Archive and 'Q3 report'");
        assert_eq!(entities, vec!["Q3 report", "Directory named Archive"]);
    }

    #[test]
    fn nothing_to_find() {
        assert!(extract_entities("hello there").is_empty());
    }
}
