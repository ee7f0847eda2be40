//! # Typed Declarations
//!
//! The metadata model stores attributes as string-keyed bags so that
//! descriptors stay technology independent on disk. Rules, however, work
//! on [`Declaration`]: one variant per attribute kind, decoded once.
//!
//! | Attribute name                 | Level  | Variant                         |
//! |--------------------------------|--------|---------------------------------|
//! | `component`                    | class  | [`Declaration::ComponentMarker`] |
//! | `service`                      | class  | [`Declaration::Service`]         |
//! | `dependency`                   | method | [`Declaration::Dependency`]      |
//! | `configuration` / `parameters` | method | [`Declaration::ConfigurationSchema`] |
//! | anything else                  | any    | [`Declaration::Unknown`]         |
//!
//! [`derive_dependency_key`] is the single definition of the canonical
//! dependency key; both the normalizer and the decoder use it.

use std::collections::BTreeMap;

use crate::descriptor::Attribute;
use crate::error::MetadataError;

/// Attribute name marking a class as a component.
pub const COMPONENT: &str = "component";
/// Attribute name declaring a service the component provides.
pub const SERVICE: &str = "service";
/// Attribute name declaring a dependency the component looks up.
pub const DEPENDENCY: &str = "dependency";
/// Attribute name declaring a configuration schema.
pub const CONFIGURATION: &str = "configuration";
/// Attribute name declaring a parameters schema.
pub const PARAMETERS: &str = "parameters";

/// Parameter holding a (resolved) type name.
pub const PARAM_TYPE: &str = "type";
/// Parameter holding an explicit dependency key.
pub const PARAM_KEY: &str = "key";
/// Parameter holding a dependency qualifier.
pub const PARAM_QUALIFIER: &str = "qualifier";
/// Parameter marking a dependency as optional.
pub const PARAM_OPTIONAL: &str = "optional";
/// Parameter holding a schema resource location.
pub const PARAM_LOCATION: &str = "location";

/// Separator between a service type and its qualifier in a dependency key.
pub const KEY_SEPARATOR: char = '/';

/// Where an attribute was attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclarationSite {
    /// On the class itself.
    Class,
    /// On the named method.
    Method(String),
}

/// A service provided by the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDeclaration {
    /// Fully-qualified service interface name.
    pub type_name: String,
}

/// A dependency the component expects its host to supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    /// Fully-qualified service interface name.
    pub type_name: String,
    /// Canonical lookup key.
    pub key: String,
    /// Optional qualifier distinguishing several providers of one type.
    pub qualifier: Option<String>,
    /// Whether the component tolerates the dependency being absent.
    pub optional: bool,
}

/// Whether a schema describes a configuration tree or flat parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// `configuration` attribute.
    Configuration,
    /// `parameters` attribute.
    Parameters,
}

impl SchemaKind {
    /// The attribute name this kind is declared with.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Self::Configuration => CONFIGURATION,
            Self::Parameters => PARAMETERS,
        }
    }
}

/// A schema describing the configuration the component accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDeclaration {
    /// Which attribute declared the schema.
    pub kind: SchemaKind,
    /// Schema language type, if declared.
    pub type_name: Option<String>,
    /// Resource location of the schema document.
    pub location: String,
}

/// Typed form of a canonical attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// The class is a component.
    ComponentMarker,
    /// The class provides a service.
    Service(ServiceDeclaration),
    /// A method receives a dependency.
    Dependency(DependencyDeclaration),
    /// A method receives configuration described by a schema.
    ConfigurationSchema(SchemaDeclaration),
    /// Any attribute no rule interprets.
    Unknown {
        /// Attribute name.
        name: String,
        /// Attribute parameters, unchanged.
        parameters: BTreeMap<String, String>,
    },
}

impl Declaration {
    /// The attribute name this declaration round-trips to.
    pub fn attribute_name(&self) -> &str {
        match self {
            Self::ComponentMarker => COMPONENT,
            Self::Service(_) => SERVICE,
            Self::Dependency(_) => DEPENDENCY,
            Self::ConfigurationSchema(schema) => schema.kind.attribute_name(),
            Self::Unknown { name, .. } => name,
        }
    }
}

/// Derive the canonical key of a dependency.
///
/// An explicit key always wins. Otherwise the key is the type, followed by
/// `/qualifier` when a qualifier is present.
pub fn derive_dependency_key(
    type_name: &str,
    explicit_key: Option<&str>,
    qualifier: Option<&str>,
) -> String {
    match (explicit_key, qualifier) {
        (Some(key), _) => key.to_string(),
        (None, Some(qualifier)) => format!("{type_name}{KEY_SEPARATOR}{qualifier}"),
        (None, None) => type_name.to_string(),
    }
}

/// Whether `key` has the conventional `type` or `type/qualifier` shape.
pub fn key_follows_convention(key: &str, type_name: &str) -> bool {
    match key.strip_prefix(type_name) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(KEY_SEPARATOR)
            .is_some_and(|qualifier| !qualifier.is_empty() && !qualifier.contains(KEY_SEPARATOR)),
        None => false,
    }
}

/// Parse a boolean flag parameter. Only `true` and `false` (any case) are accepted.
pub fn parse_flag(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl TryFrom<&Attribute> for Declaration {
    type Error = MetadataError;

    fn try_from(attribute: &Attribute) -> Result<Self, Self::Error> {
        match attribute.name() {
            COMPONENT => Ok(Self::ComponentMarker),
            SERVICE => Ok(Self::Service(ServiceDeclaration {
                type_name: attribute.required_parameter(PARAM_TYPE)?.to_string(),
            })),
            DEPENDENCY => {
                let type_name = attribute.required_parameter(PARAM_TYPE)?;
                let qualifier = attribute.parameter(PARAM_QUALIFIER);
                let optional_raw = attribute.parameter_or(PARAM_OPTIONAL, "false");
                let optional =
                    parse_flag(optional_raw).ok_or_else(|| MetadataError::InvalidDeclaration {
                        attribute: attribute.name().to_string(),
                        reason: format!("optional must be true or false, found '{optional_raw}'"),
                    })?;
                Ok(Self::Dependency(DependencyDeclaration {
                    type_name: type_name.to_string(),
                    key: derive_dependency_key(
                        type_name,
                        attribute.parameter(PARAM_KEY),
                        qualifier,
                    ),
                    qualifier: qualifier.map(str::to_string),
                    optional,
                }))
            }
            CONFIGURATION | PARAMETERS => {
                let kind = if attribute.name() == CONFIGURATION {
                    SchemaKind::Configuration
                } else {
                    SchemaKind::Parameters
                };
                Ok(Self::ConfigurationSchema(SchemaDeclaration {
                    kind,
                    type_name: attribute.parameter(PARAM_TYPE).map(str::to_string),
                    location: attribute.required_parameter(PARAM_LOCATION)?.to_string(),
                }))
            }
            other => Ok(Self::Unknown {
                name: other.to_string(),
                parameters: attribute.parameters().clone(),
            }),
        }
    }
}

impl From<Declaration> for Attribute {
    fn from(declaration: Declaration) -> Self {
        match declaration {
            Declaration::ComponentMarker => Attribute::new(COMPONENT),
            Declaration::Service(service) => {
                Attribute::new(SERVICE).param(PARAM_TYPE, service.type_name)
            }
            Declaration::Dependency(dep) => {
                let mut attr = Attribute::new(DEPENDENCY)
                    .param(PARAM_TYPE, dep.type_name)
                    .param(PARAM_KEY, dep.key)
                    .param(PARAM_OPTIONAL, dep.optional.to_string());
                if let Some(qualifier) = dep.qualifier {
                    attr = attr.param(PARAM_QUALIFIER, qualifier);
                }
                attr
            }
            Declaration::ConfigurationSchema(schema) => {
                let mut attr = Attribute::new(schema.kind.attribute_name())
                    .param(PARAM_LOCATION, schema.location);
                if let Some(type_name) = schema.type_name {
                    attr = attr.param(PARAM_TYPE, type_name);
                }
                attr
            }
            Declaration::Unknown { name, parameters } => Attribute::with_parameters(name, parameters),
        }
    }
}
