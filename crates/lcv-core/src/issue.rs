//! # Verification Issues
//!
//! One finding produced by the component verifier. Issues are plain values:
//! created once, collected into a caller-owned list, never mutated.
//!
//! Two severities exist. [`Severity::Error`] fails a build;
//! [`Severity::Notice`] is advisory and never does.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a verification issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; reported but never fails a build.
    Notice,
    /// Must fail a build.
    Error,
}

impl Severity {
    /// The bracketed prefix used when rendering an issue.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Notice => "[Notice]",
            Self::Error => "[Error]",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notice => f.write_str("Notice"),
            Self::Error => f.write_str("Error"),
        }
    }
}

/// A single verification finding.
///
/// Issues are produced only by the verifier and are serialized for reports;
/// they are never read back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VerifyIssue {
    description: String,
    severity: Severity,
}

impl VerifyIssue {
    /// Create an error-severity issue.
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(description, Severity::Error)
    }

    /// Create a notice-severity issue.
    pub fn notice(description: impl Into<String>) -> Self {
        Self::new(description, Severity::Notice)
    }

    fn new(description: impl Into<String>, severity: Severity) -> Self {
        let description = description.into();
        debug_assert!(!description.is_empty(), "issue description must not be empty");
        Self {
            description,
            severity,
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Severity of the finding.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether this issue fails a build.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.severity.prefix(), self.description)
    }
}

/// Whether a batch of issues passes: it must contain no error-severity issue.
pub fn is_valid(issues: &[VerifyIssue]) -> bool {
    !issues.iter().any(VerifyIssue::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_fixed_prefixes() {
        assert_eq!(
            VerifyIssue::error("The class is abstract.").to_string(),
            "[Error] The class is abstract."
        );
        assert_eq!(
            VerifyIssue::notice("Odd key.").to_string(),
            "[Notice] Odd key."
        );
    }

    #[test]
    fn notices_never_fail_a_batch() {
        let issues = vec![VerifyIssue::notice("a"), VerifyIssue::notice("b")];
        assert!(is_valid(&issues));
        assert!(is_valid(&[]));
    }

    #[test]
    fn one_error_fails_a_batch() {
        let issues = vec![VerifyIssue::notice("a"), VerifyIssue::error("b")];
        assert!(!is_valid(&issues));
    }

    #[test]
    fn serializes_description_and_lowercase_severity() {
        let yaml = serde_yaml::to_string(&VerifyIssue::error("The class is abstract.")).unwrap();
        assert_eq!(yaml, "description: The class is abstract.\nseverity: error\n");
    }

    #[test]
    fn severity_orders_errors_above_notices() {
        assert!(Severity::Error > Severity::Notice);
    }
}
