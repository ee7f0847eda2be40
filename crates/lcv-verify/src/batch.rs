//! Per-class results of a verification run.

use lcv_core::issue::is_valid;
use lcv_core::{Severity, VerifyIssue};
use serde::Serialize;

/// Issues found for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassReport {
    /// Fully-qualified class name.
    pub class_name: String,
    /// Issues in the order the rules produced them.
    pub issues: Vec<VerifyIssue>,
}

impl ClassReport {
    /// Whether no error-severity issue was found.
    pub fn is_valid(&self) -> bool {
        is_valid(&self.issues)
    }
}

/// Issues found for every class in a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// One entry per verified class.
    pub classes: Vec<ClassReport>,
}

impl BatchReport {
    /// Whether every class is valid.
    pub fn is_valid(&self) -> bool {
        self.classes.iter().all(ClassReport::is_valid)
    }

    /// Total error-severity issues.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Total notice-severity issues.
    pub fn notice_count(&self) -> usize {
        self.count(Severity::Notice)
    }

    fn count(&self, severity: Severity) -> usize {
        self.classes
            .iter()
            .flat_map(|c| &c.issues)
            .filter(|i| i.severity() == severity)
            .count()
    }

    /// One `class: [Severity] description` line per issue.
    pub fn render_lines(&self) -> Vec<String> {
        self.classes
            .iter()
            .flat_map(|c| c.issues.iter().map(move |i| format!("{}: {i}", c.class_name)))
            .collect()
    }
}
