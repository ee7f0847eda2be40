//! # Component Verifier
//!
//! Applies the rule battery to one class at a time.
//!
//! ## Contract
//!
//! [`ComponentVerifier::verify_type`] is a pure function of the loaded
//! type and its descriptor. It never fails: undecodable attributes,
//! unloadable service types, missing schemas, and rules that error out or
//! panic all become error issues. Findings a rule pushed before panicking
//! are kept. Identical input yields an identical issue list in
//! identical order.
//!
//! A primitive, array, or interface yields exactly one issue and nothing
//! else runs. For every other type the whole battery runs, so one class
//! may collect several issues in a single pass.
//!
//! ## Thread Safety
//!
//! The verifier holds no mutable state. With a `Sync` loader and resource
//! locator it can be shared across threads to verify classes in parallel.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use lcv_core::{ClassDescriptor, VerifyIssue};

use crate::batch::{BatchReport, ClassReport};
use crate::rules::{default_rules, non_class_issue, Rule, RuleContext};
use crate::types::{ClassLoader, ResourceLocator, TypeFacts};

/// Rule engine checking component classes against their metadata.
pub struct ComponentVerifier<L, R> {
    loader: L,
    resources: R,
    rules: Vec<Box<dyn Rule>>,
}

impl<L, R> std::fmt::Debug for ComponentVerifier<L, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentVerifier")
            .field("rules", &self.rule_names())
            .finish_non_exhaustive()
    }
}

impl<L, R> ComponentVerifier<L, R> {
    /// Create a verifier with the default rule battery.
    pub fn new(loader: L, resources: R) -> Self {
        Self {
            loader,
            resources,
            rules: default_rules(),
        }
    }

    /// Append a rule after the existing battery.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Names of the rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// The class loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}

impl<L: ClassLoader, R: ResourceLocator> ComponentVerifier<L, R> {
    /// Verify one loaded class against its canonical descriptor.
    pub fn verify_type(&self, class: &dyn TypeFacts, descriptor: &ClassDescriptor) -> Vec<VerifyIssue> {
        if let Some(issue) = non_class_issue(class) {
            tracing::debug!(class = class.name(), kind = %class.kind(), "not a class");
            return vec![issue];
        }

        let mut issues = Vec::new();
        let mut declarations = Vec::new();
        for decoded in descriptor.declarations() {
            match decoded {
                Ok(declaration) => declarations.push(declaration),
                Err(e) => issues.push(VerifyIssue::error(format!("Invalid attribute: {e}."))),
            }
        }

        let ctx = RuleContext {
            class,
            descriptor,
            declarations: &declarations,
            loader: &self.loader,
            resources: &self.resources,
        };

        for rule in &self.rules {
            let before = issues.len();
            let mut found = Vec::new();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.check(&ctx, &mut found)));
            issues.append(&mut found);
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(payload) => Some(panic_message(payload.as_ref())),
            };
            if let Some(reason) = failure {
                tracing::warn!(class = class.name(), rule = rule.name(), error = %reason, "rule failed");
                issues.push(VerifyIssue::error(format!(
                    "The {} rule could not complete: {reason}.",
                    rule.name()
                )));
            }
            tracing::debug!(
                class = class.name(),
                rule = rule.name(),
                found = issues.len() - before,
                "rule evaluated"
            );
        }
        issues
    }

    /// Verify every descriptor, loading each class by its descriptor name.
    ///
    /// A class that cannot be loaded gets a single error issue; the rest of
    /// the batch is still verified.
    pub fn verify_batch<'d, I>(&self, descriptors: I) -> BatchReport
    where
        I: IntoIterator<Item = &'d ClassDescriptor>,
    {
        let classes: Vec<ClassReport> = descriptors
            .into_iter()
            .map(|descriptor| {
                let issues = match self.loader.load(descriptor.name()) {
                    Ok(class) => self.verify_type(class, descriptor),
                    Err(e) => vec![VerifyIssue::error(format!("Unable to load the class: {e}."))],
                };
                ClassReport {
                    class_name: descriptor.name().to_string(),
                    issues,
                }
            })
            .collect();

        let report = BatchReport { classes };
        tracing::info!(
            classes = report.classes.len(),
            errors = report.error_count(),
            notices = report.notice_count(),
            "verification finished"
        );
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "rule panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{TypeCatalog, TypeSpec};
    use crate::rules::{RuleError, ABSTRACT, INTERFACE, NOT_A_COMPONENT};
    use lcv_core::Attribute;
    use std::collections::BTreeSet;

    fn catalog() -> TypeCatalog {
        TypeCatalog::from_specs([
            TypeSpec::class("a.Good"),
            TypeSpec::interface("a.Api"),
            TypeSpec {
                is_abstract: true,
                ..TypeSpec::class("a.Partial")
            },
        ])
        .unwrap()
    }

    fn descriptor(name: &str, marker: bool) -> ClassDescriptor {
        let attributes = if marker {
            vec![Attribute::new("component")]
        } else {
            vec![]
        };
        ClassDescriptor::new(name, attributes, vec![], vec![]).unwrap()
    }

    struct Failing;

    impl Rule for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn check(&self, _: &RuleContext<'_>, _: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
            Err(RuleError::Internal("catalog offline".to_string()))
        }
    }

    #[test]
    fn good_class_has_no_issues() {
        let catalog = catalog();
        let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new());
        let class = catalog.load("a.Good").unwrap();
        assert!(verifier.verify_type(class, &descriptor("a.Good", true)).is_empty());
    }

    #[test]
    fn interface_yields_exactly_one_issue() {
        let catalog = catalog();
        let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new());
        let class = catalog.load("a.Api").unwrap();
        let issues = verifier.verify_type(class, &descriptor("a.Api", false));
        assert_eq!(issues, vec![VerifyIssue::error(INTERFACE)]);
    }

    #[test]
    fn rules_do_not_short_circuit() {
        let catalog = catalog();
        let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new());
        let class = catalog.load("a.Partial").unwrap();
        let issues = verifier.verify_type(class, &descriptor("a.Partial", false));
        assert_eq!(
            issues,
            vec![VerifyIssue::error(ABSTRACT), VerifyIssue::error(NOT_A_COMPONENT)]
        );
    }

    #[test]
    fn failing_rule_becomes_an_error_issue() {
        let catalog = catalog();
        let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new()).with_rule(Failing);
        assert_eq!(verifier.rule_names().last(), Some(&"failing"));

        let class = catalog.load("a.Good").unwrap();
        let issues = verifier.verify_type(class, &descriptor("a.Good", true));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(issues[0].description().contains("catalog offline"));
    }

    struct PanicsOn(&'static str);

    impl Rule for PanicsOn {
        fn name(&self) -> &'static str {
            "panics"
        }
        fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
            issues.push(VerifyIssue::notice("partial finding"));
            if ctx.class.name() == self.0 {
                panic!("index out of range");
            }
            Ok(())
        }
    }

    #[test]
    fn panicking_rule_becomes_an_error_issue() {
        let catalog = catalog();
        let verifier =
            ComponentVerifier::new(&catalog, BTreeSet::<String>::new()).with_rule(PanicsOn("a.Good"));
        let class = catalog.load("a.Good").unwrap();
        let issues = verifier.verify_type(class, &descriptor("a.Good", true));
        assert_eq!(
            issues,
            vec![
                VerifyIssue::notice("partial finding"),
                VerifyIssue::error("The panics rule could not complete: index out of range."),
            ]
        );
    }

    #[test]
    fn panicking_rule_does_not_abort_the_batch() {
        let catalog = TypeCatalog::from_specs([TypeSpec::class("a.Bad"), TypeSpec::class("a.Good")])
            .unwrap();
        let verifier =
            ComponentVerifier::new(&catalog, BTreeSet::<String>::new()).with_rule(PanicsOn("a.Bad"));
        let descriptors = vec![descriptor("a.Bad", true), descriptor("a.Good", true)];

        let report = verifier.verify_batch(&descriptors);
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[0].class_name, "a.Bad");
        assert!(!report.classes[0].is_valid());
        assert_eq!(report.classes[1].class_name, "a.Good");
        assert!(report.classes[1].is_valid());
    }

    #[test]
    fn undecodable_attribute_becomes_an_error_issue() {
        let catalog = catalog();
        let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new());
        let class = catalog.load("a.Good").unwrap();
        let descriptor = ClassDescriptor::new(
            "a.Good",
            vec![Attribute::new("component"), Attribute::new("service")],
            vec![],
            vec![],
        )
        .unwrap();
        let issues = verifier.verify_type(class, &descriptor);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description().starts_with("Invalid attribute"));
    }

    #[test]
    fn batch_reports_unloadable_classes_and_continues() {
        let catalog = catalog();
        let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new());
        let descriptors = vec![descriptor("a.Missing", true), descriptor("a.Good", true)];
        let report = verifier.verify_batch(&descriptors);
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[0].issues.len(), 1);
        assert!(report.classes[0].issues[0].description().contains("a.Missing"));
        assert!(report.classes[1].issues.is_empty());
        assert!(!report.is_valid());
    }
}
