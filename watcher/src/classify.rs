//! Ordered signature classification.

use serde::{Deserialize, Serialize};

/// One entry in an ordered signature table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRule {
    /// Substring that must appear in the line.
    pub pattern: String,

    /// Label attached to matching lines.
    pub label: String,
}

impl SignatureRule {
    /// Create a new rule.
    pub fn new(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
        }
    }

    /// The stock table: specific runtime and compiler signatures ahead of
    /// the generic catch-alls.
    pub fn default_table() -> Vec<SignatureRule> {
        vec![
            SignatureRule::new("NullReferenceException", "NullReference"),
            SignatureRule::new("error CS", "CompilationError"),
            SignatureRule::new("Exception", "RuntimeException"),
            SignatureRule::new("Error", "GenericError"),
        ]
    }
}

/// Evaluates lines against an ordered signature table.
///
/// Rules are checked top to bottom and the first match wins, so specific
/// signatures must come before generic ones or they will be shadowed.
/// Matching is a case-insensitive substring test: log writers disagree on
/// "Error" vs "ERROR" for the same condition.
#[derive(Debug, Clone)]
pub struct SignatureClassifier {
    rules: Vec<SignatureRule>,
    lowered: Vec<String>,
}

impl SignatureClassifier {
    /// Create a classifier from an ordered rule table.
    pub fn new(rules: Vec<SignatureRule>) -> Self {
        let lowered = rules
            .iter()
            .map(|rule| rule.pattern.to_ascii_lowercase())
            .collect();
        Self { rules, lowered }
    }

    /// First rule whose pattern occurs in `line`, or `None`.
    pub fn classify(&self, line: &str) -> Option<&SignatureRule> {
        let line = line.to_ascii_lowercase();
        self.lowered
            .iter()
            .position(|pattern| line.contains(pattern.as_str()))
            .map(|idx| &self.rules[idx])
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[SignatureRule] {
        &self.rules
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::new(SignatureRule::default_table())
    }
}
