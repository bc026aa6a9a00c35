//! Isolation scope: the account every retrieval is bound to.

use crate::error::RetrievalError;
use serde::{Deserialize, Serialize};

/// Number of leading characters shown when a scope is logged.
const DISPLAY_PREFIX: usize = 10;

/// The account identifier that scopes all retrieval and storage calls.
///
/// A scope can only be built from a non-blank identifier, so holding one
/// proves the caller named exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsolationScope(String);

impl IsolationScope {
    pub fn new(id: impl Into<String>) -> Result<Self, RetrievalError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RetrievalError::MissingIsolationScope);
        }
        Ok(Self(id))
    }

    /// The full, unredacted identifier (for storage queries only).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IsolationScope {
    type Error = RetrievalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IsolationScope> for String {
    fn from(scope: IsolationScope) -> Self {
        scope.0
    }
}

/// Redacted form, safe for logs.
impl std::fmt::Display for IsolationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.chars().take(DISPLAY_PREFIX).collect();
        if prefix.len() < self.0.len() {
            write!(f, "{prefix}...")
        } else {
            write!(f, "{prefix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_scope_rejected() {
        assert_eq!(
            IsolationScope::new("").unwrap_err(),
            RetrievalError::MissingIsolationScope
        );
        assert!(IsolationScope::new("   ").is_err());
    }

    #[test]
    fn display_is_redacted() {
        let scope = IsolationScope::new("0x1234567890abcdef").unwrap();
        assert_eq!(scope.to_string(), "0x12345678...");
        assert_eq!(scope.as_str(), "0x1234567890abcdef");
    }

    #[test]
    fn short_scope_displayed_whole() {
        let scope = IsolationScope::new("alice").unwrap();
        assert_eq!(scope.to_string(), "alice");
    }

    #[test]
    fn deserialization_validates() {
        let bad: Result<IsolationScope, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
        let good: IsolationScope = serde_json::from_str("\"acct-1\"").unwrap();
        assert_eq!(good.as_str(), "acct-1");
    }
}
