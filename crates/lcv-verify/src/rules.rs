//! # Rule Battery
//!
//! Each [`Rule`] inspects one class and appends what it finds to the
//! issue list. The default battery, in evaluation order:
//!
//! | # | Rule                       | Severity |
//! |---|----------------------------|----------|
//! | 1 | [`ShapeRule`]              | Error    |
//! | 2 | [`ComponentMarkerRule`]    | Error    |
//! | 3 | [`ServiceRule`]            | Error    |
//! | 4 | [`DependencyKeyRule`]      | Notice   |
//! | 5 | [`ConfigurationSchemaRule`]| Error    |
//!
//! Primitives, arrays, and interfaces are settled by [`non_class_issue`]
//! before the battery runs. Otherwise every rule runs; one rule's findings
//! never suppress another's. A rule that cannot complete returns a
//! [`RuleError`], which the verifier turns into an error issue.

use lcv_core::{
    derive_dependency_key, key_follows_convention, Capability, ClassDescriptor, Declaration, DeclarationSite,
    DependencyDeclaration, SchemaDeclaration, ServiceDeclaration, VerifyIssue,
};
use thiserror::Error;

use crate::types::{ClassLoader, LoadError, ResourceLocator, TypeFacts};

/// Description of a primitive type.
pub const PRIMITIVE: &str = "The class is a primitive.";
/// Description of an array type.
pub const ARRAY: &str = "The class is an array.";
/// Description of an interface type.
pub const INTERFACE: &str = "The class is an interface.";
/// Description of an abstract class.
pub const ABSTRACT: &str = "The class is abstract.";
/// Description of a non-public class.
pub const NOT_PUBLIC: &str = "The class is not public.";
/// Description of a class without a public no-argument constructor.
pub const NO_DEFAULT_CONSTRUCTOR: &str = "The class does not have a public default constructor.";
/// Description of a class without the component marker.
pub const NOT_A_COMPONENT: &str = "The class is not marked as a component.";

/// Error raised by a rule that could not complete.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A type the rule needed could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Any other internal failure.
    #[error("{0}")]
    Internal(String),
}

/// Everything a rule may look at for one class.
pub struct RuleContext<'a> {
    /// The loaded class under verification.
    pub class: &'a dyn TypeFacts,
    /// Its canonical descriptor.
    pub descriptor: &'a ClassDescriptor,
    /// Declarations decoded from the descriptor, in declaration order.
    pub declarations: &'a [(DeclarationSite, Declaration)],
    /// Loads types referenced by declarations.
    pub loader: &'a dyn ClassLoader,
    /// Checks that schema documents exist.
    pub resources: &'a dyn ResourceLocator,
}

impl<'a> RuleContext<'a> {
    /// Class-level service declarations.
    pub fn services(&self) -> impl Iterator<Item = &'a ServiceDeclaration> {
        let declarations = self.declarations;
        declarations.iter().filter_map(|(site, d)| match (site, d) {
            (DeclarationSite::Class, Declaration::Service(s)) => Some(s),
            _ => None,
        })
    }

    /// Method-level dependency declarations.
    pub fn dependencies(&self) -> impl Iterator<Item = &'a DependencyDeclaration> {
        let declarations = self.declarations;
        declarations.iter().filter_map(|(site, d)| match (site, d) {
            (DeclarationSite::Method(_), Declaration::Dependency(dep)) => Some(dep),
            _ => None,
        })
    }

    /// Method-level configuration and parameters schemas.
    pub fn schemas(&self) -> impl Iterator<Item = &'a SchemaDeclaration> {
        let declarations = self.declarations;
        declarations.iter().filter_map(|(site, d)| match (site, d) {
            (DeclarationSite::Method(_), Declaration::ConfigurationSchema(s)) => Some(s),
            _ => None,
        })
    }

    /// Whether the class carries the component marker.
    pub fn has_component_marker(&self) -> bool {
        self.declarations
            .iter()
            .any(|(site, d)| *site == DeclarationSite::Class && *d == Declaration::ComponentMarker)
    }
}

/// One check in the verifier's battery.
pub trait Rule: Send + Sync {
    /// Short identifier used in logs and internal-failure issues.
    fn name(&self) -> &'static str;

    /// Inspect the class and append any findings to `issues`.
    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError>;
}

/// The single issue for a type that is not a class at all, if it is one.
///
/// Primitives, arrays, and interfaces are reported with exactly one issue;
/// no other rule applies to them.
pub fn non_class_issue(class: &dyn TypeFacts) -> Option<VerifyIssue> {
    if class.is_primitive() {
        Some(VerifyIssue::error(PRIMITIVE))
    } else if class.is_array() {
        Some(VerifyIssue::error(ARRAY))
    } else if class.is_interface() {
        Some(VerifyIssue::error(INTERFACE))
    } else {
        None
    }
}

/// The default battery, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(ShapeRule),
        Box::new(ComponentMarkerRule),
        Box::new(ServiceRule),
        Box::new(DependencyKeyRule),
        Box::new(ConfigurationSchemaRule),
    ]
}

/// The class must be public, concrete, and instantiable without arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeRule;

impl Rule for ShapeRule {
    fn name(&self) -> &'static str {
        "shape"
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
        if ctx.class.is_abstract() {
            issues.push(VerifyIssue::error(ABSTRACT));
        }
        if !ctx.class.is_public() {
            issues.push(VerifyIssue::error(NOT_PUBLIC));
        }
        if !ctx.class.has_public_no_arg_constructor() {
            issues.push(VerifyIssue::error(NO_DEFAULT_CONSTRUCTOR));
        }
        Ok(())
    }
}

/// The class must carry the `component` marker, whatever it implements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentMarkerRule;

impl Rule for ComponentMarkerRule {
    fn name(&self) -> &'static str {
        "component-marker"
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
        if !ctx.has_component_marker() {
            issues.push(VerifyIssue::error(NOT_A_COMPONENT));
        }
        Ok(())
    }
}

/// Each declared service must be a public interface the class implements,
/// and must not be (or extend) a lifecycle capability interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceRule;

impl Rule for ServiceRule {
    fn name(&self) -> &'static str {
        "service"
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
        for service in ctx.services() {
            let type_name = &service.type_name;
            let service_type = match ctx.loader.load(type_name) {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!(service = %type_name, error = %e, "service type not loadable");
                    issues.push(VerifyIssue::error(format!(
                        "Unable to load the service type {type_name}."
                    )));
                    continue;
                }
            };

            if !service_type.is_interface() {
                issues.push(VerifyIssue::error(format!(
                    "The service {type_name} is not an interface."
                )));
            }
            for capability in Capability::ALL {
                if service_type.implements(capability.interface_name()) {
                    issues.push(VerifyIssue::error(format!(
                        "The service {type_name} exposes the lifecycle interface {}.",
                        capability.interface_name()
                    )));
                }
            }
            if !service_type.is_assignable_from(ctx.class) {
                issues.push(VerifyIssue::error(format!(
                    "The class does not implement the service {type_name}."
                )));
            }
            if !service_type.is_public() {
                issues.push(VerifyIssue::error(format!(
                    "The service {type_name} is not public."
                )));
            }
        }
        Ok(())
    }
}

/// Dependency keys should be the service type, optionally followed by
/// `/qualifier`. Advisory only.
///
/// A key equal to the one derived from the declared type and qualifier
/// always passes, whatever the qualifier contains. Other keys are held to
/// the `type` or `type/qualifier` shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyKeyRule;

impl DependencyKeyRule {
    fn accepts(dependency: &DependencyDeclaration) -> bool {
        let derived = derive_dependency_key(
            &dependency.type_name,
            None,
            dependency.qualifier.as_deref(),
        );
        dependency.key == derived
            || key_follows_convention(&dependency.key, &dependency.type_name)
    }
}

impl Rule for DependencyKeyRule {
    fn name(&self) -> &'static str {
        "dependency-key"
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
        for dependency in ctx.dependencies() {
            if !Self::accepts(dependency) {
                issues.push(VerifyIssue::notice(format!(
                    "The key {} for the dependency {} should be the type name, optionally followed by /qualifier.",
                    dependency.key, dependency.type_name
                )));
            }
        }
        Ok(())
    }
}

/// Every declared configuration or parameters schema must exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationSchemaRule;

impl Rule for ConfigurationSchemaRule {
    fn name(&self) -> &'static str {
        "configuration-schema"
    }

    fn check(&self, ctx: &RuleContext<'_>, issues: &mut Vec<VerifyIssue>) -> Result<(), RuleError> {
        for schema in ctx.schemas() {
            let path = resource_path(ctx.descriptor.package(), &schema.location);
            if !ctx.resources.exists(&path) {
                issues.push(VerifyIssue::error(format!(
                    "Unable to locate the {} schema {}.",
                    schema.kind.attribute_name(),
                    schema.location
                )));
            }
        }
        Ok(())
    }
}

/// Resolve a schema location the way class-relative resources resolve:
/// a leading `/` is relative to the resource root, anything else is
/// relative to the class's package directory.
pub fn resource_path(package: &str, location: &str) -> String {
    if let Some(absolute) = location.strip_prefix('/') {
        return absolute.to_string();
    }
    if package.is_empty() {
        location.to_string()
    } else {
        format!("{}/{location}", package.replace('.', "/"))
    }
}
