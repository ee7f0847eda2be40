//! # Component Class Filter
//!
//! Decides whether a class takes part in the metadata pipeline. A class is
//! admitted iff it carries a class-level `component` marker. Anything else
//! is a "no match", which is not an error.

use lcv_core::declaration::COMPONENT;
use lcv_core::ClassDescriptor;

/// Outcome of filtering one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMatch {
    /// The class is a component and enters the pipeline.
    Component,
    /// The class is skipped.
    NoMatch,
}

/// Admits classes carrying the component marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentFilter;

impl ComponentFilter {
    /// Create the filter.
    pub fn new() -> Self {
        Self
    }

    /// Check one class against its raw class-level attributes.
    pub fn check(&self, class: &ClassDescriptor) -> FilterMatch {
        if class.has_attribute(COMPONENT) {
            FilterMatch::Component
        } else {
            FilterMatch::NoMatch
        }
    }

    /// Keep only the admitted classes, preserving order.
    pub fn select<I>(&self, classes: I) -> Vec<ClassDescriptor>
    where
        I: IntoIterator<Item = ClassDescriptor>,
    {
        classes
            .into_iter()
            .filter(|class| {
                let admitted = self.check(class) == FilterMatch::Component;
                if !admitted {
                    tracing::debug!(class = class.name(), "skipping class without component marker");
                }
                admitted
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcv_core::{Attribute, MethodDescriptor};

    fn class(name: &str, attributes: Vec<Attribute>) -> ClassDescriptor {
        ClassDescriptor::new(name, attributes, vec![], vec![]).unwrap()
    }

    #[test]
    fn marker_admits_class() {
        let c = class("a.Mailer", vec![Attribute::new("component")]);
        assert_eq!(ComponentFilter::new().check(&c), FilterMatch::Component);
    }

    #[test]
    fn missing_marker_is_no_match() {
        let c = class("a.Helper", vec![Attribute::new("service").param("type", "a.S")]);
        assert_eq!(ComponentFilter::new().check(&c), FilterMatch::NoMatch);
    }

    #[test]
    fn method_level_marker_does_not_count() {
        let c = ClassDescriptor::new(
            "a.Helper",
            vec![],
            vec![],
            vec![MethodDescriptor::new("run").with_attribute(Attribute::new("component"))],
        )
        .unwrap();
        assert_eq!(ComponentFilter::new().check(&c), FilterMatch::NoMatch);
    }

    #[test]
    fn select_keeps_order_of_admitted_classes() {
        let selected = ComponentFilter::new().select(vec![
            class("a.One", vec![Attribute::new("component")]),
            class("a.Two", vec![]),
            class("a.Three", vec![Attribute::new("component")]),
        ]);
        let names: Vec<&str> = selected.iter().map(ClassDescriptor::name).collect();
        assert_eq!(names, vec!["a.One", "a.Three"]);
    }
}
