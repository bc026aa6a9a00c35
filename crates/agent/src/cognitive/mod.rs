//! Cognitive scaffolding.
//!
//! Requests are scored for complexity on a 1-10 scale. When the score
//! reaches the configured threshold, the toolkit emits structured
//! reasoning templates (UNDERSTAND, PLAN, EXECUTE, VERIFY, REFLECT) for
//! injection into the system prompt. Task analysis (entity extraction and
//! step estimation) is advisory and never changes the prompt.

pub mod complexity;
pub mod entities;
pub mod templates;
pub mod toolkit;

pub use complexity::{complexity_score, estimate_steps};
pub use entities::extract_entities;
pub use toolkit::CognitiveToolkit;

use regex_lite::Regex;

/// Count non-overlapping matches. Patterns are literals, so a compile
/// failure is treated as no match.
pub(crate) fn count_matches(pattern: &str, text: &str) -> usize {
    Regex::new(pattern).map_or(0, |re| re.find_iter(text).count())
}
