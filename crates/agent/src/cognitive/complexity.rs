//! Request complexity heuristics.

use super::count_matches;

/// Verbs that signal a filesystem action.
pub const ACTION_WORDS: [&str; 10] = [
    "create", "make", "add", "delete", "move", "copy", "edit", "modify", "organize", "rename",
];

/// Verbs counted when estimating steps.
const STEP_VERBS: [&str; 12] = [
    "create", "make", "add", "delete", "move", "copy", "edit", "modify", "rename", "read", "list",
    "organize",
];

/// Score a request from 1 (trivial) to 10.
pub fn complexity_score(message: &str) -> u8 {
    let msg = message.to_lowercase();
    let mut score = 1usize;

    // multi-step connectors
    if msg.contains(" and ") || msg.contains(" then ") {
        score += 2;
    }
    if msg.contains(" also ") || msg.contains(" additionally ") {
        score += 1;
    }

    score += ACTION_WORDS.iter().filter(|w| msg.contains(*w)).count().min(3);

    // anaphora
    if msg.contains("inside it") || msg.contains("in that") || msg.contains("that folder") {
        score += 1;
    }
    if msg.contains("inside ") || msg.contains("within ") {
        score += 1;
    }

    score += count_matches(r"~/[^\s]+", &msg).min(2);

    if msg.contains("how") || msg.contains("why") || msg.contains("explain") {
        score += 1;
    }

    let len = msg.chars().count();
    if len > 200 {
        score += 1;
    }
    if len > 400 {
        score += 1;
    }

    score.min(10) as u8
}

/// Rough number of steps a request needs: 1, plus every action-verb
/// occurrence, plus whole-word `and`/`then`. Capped at 10.
pub fn estimate_steps(message: &str) -> u8 {
    let msg = message.to_lowercase();
    let verbs: usize = STEP_VERBS.iter().map(|v| msg.matches(v).count()).sum();
    let connectors = count_matches(r"\band\b", &msg) + count_matches(r"\bthen\b", &msg);
    (1 + verbs + connectors).min(10) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_request_scores_low() {
        // 1 + rename
        assert_eq!(complexity_score("rename a.txt"), 2);
        assert_eq!(complexity_score("hello"), 1);
    }

    #[test]
    fn multi_step_request_scores_high() {
        let msg = "Create a folder called Projects in ~/Documents and then inside it make a file named notes.md";
        // 1 + and/then 2 + create,make 2 + inside it 1 + inside 1 + one path 1
        assert_eq!(complexity_score(msg), 8);

        let msg = "create a folder called Projects and then add a README inside it and explain why";
        // 1 + and/then 2 + create,add 2 + inside it 1 + inside 1 + why/explain 1
        assert_eq!(complexity_score(msg), 8);
    }

    #[test]
    fn action_words_capped_at_three() {
        let msg = "create make add delete move copy";
        assert_eq!(complexity_score(msg), 4);
    }

    #[test]
    fn paths_capped_at_two() {
        assert_eq!(complexity_score("~/a ~/b ~/c ~/d"), 3);
    }

    #[test]
    fn long_messages_add_points() {
        let medium = "x".repeat(201);
        let long = "x".repeat(401);
        assert_eq!(complexity_score(&medium), 2);
        assert_eq!(complexity_score(&long), 3);
    }

    #[test]
    fn score_is_clamped() {
        let msg = format!(
            "how do I create and then also move, copy, delete inside it within ~/a ~/b {}",
            "y".repeat(400)
        );
        assert_eq!(complexity_score(&msg), 10);
    }

    #[test]
    fn step_estimate() {
        assert_eq!(estimate_steps("list files"), 2);
        // create, make, and, then
        assert_eq!(estimate_steps("create a folder and then make a file"), 5);
        assert_eq!(estimate_steps(&"copy ".repeat(20)), 10);
        // "android" is not a whole-word "and"
        assert_eq!(estimate_steps("android"), 1);
    }
}
