//! # Metadata Model
//!
//! Canonical, technology-independent description of a compiled class:
//! its name, the declarative attributes attached to it, and the fields
//! and methods it declares (each with their own attributes).
//!
//! A [`ClassDescriptor`] is built once (usually by the attribute
//! normalizer in `lcv-meta`) and then read without mutation by the
//! verifier, possibly in a later run after a round trip through YAML or
//! JSON. Deserialization re-checks the non-empty name invariant.
//!
//! Attribute names are not unique per class or method: a class may carry
//! several `service` declarations. Queries by name therefore return every
//! match in declaration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::declaration::{Declaration, DeclarationSite};
use crate::error::MetadataError;

/// A named, parameterized metadata tag attached to a class, field, or method.
///
/// Parameter values are kept exactly as declared (raw) or as rewritten by
/// the normalizer (canonical). The map is ordered only so that serialized
/// descriptors are stable; parameter order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, String>,
}

impl Attribute {
    /// Create an attribute with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Create an attribute from a name and parameter pairs.
    pub fn with_parameters<K, V>(
        name: impl Into<String>,
        parameters: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// The attribute's dotted tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters of the attribute.
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Look up a parameter, if present.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Look up a parameter, falling back to `default` when absent.
    pub fn parameter_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.parameter(name).unwrap_or(default)
    }

    /// Look up a parameter that has no default.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MissingParameter`] when the parameter is absent.
    pub fn required_parameter(&self, name: &str) -> Result<&str, MetadataError> {
        self.parameter(name)
            .ok_or_else(|| MetadataError::MissingParameter {
                attribute: self.name.clone(),
                parameter: name.to_string(),
            })
    }
}

/// A formal parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter name.
    pub name: String,
    /// Fully-qualified type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ParameterDescriptor {
    /// Create a parameter descriptor.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A field declared by a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Fully-qualified type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Attributes attached to the field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl FieldDescriptor {
    /// Create a field descriptor with no attributes.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            attributes: Vec::new(),
        }
    }
}

/// A method declared by a class.
///
/// Methods are identified by name only; overloads are not distinguished
/// by their parameter lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Fully-qualified return type name (`void` for none).
    #[serde(default = "void_type")]
    pub return_type: String,
    /// Formal parameters in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescriptor>,
    /// Attributes attached to the method.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

fn void_type() -> String {
    "void".to_string()
}

impl MethodDescriptor {
    /// Create a `void` method with no parameters or attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: void_type(),
            parameters: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style parameter append.
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Builder-style attribute append.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Every attribute on this method with the given name.
    pub fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attribute> {
        self.attributes.iter().filter(move |a| a.name() == name)
    }
}

/// Wire form of [`ClassDescriptor`]; converted through [`TryFrom`] so that
/// deserialized descriptors uphold the same invariants as built ones.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassDescriptorRepr {
    name: String,
    #[serde(default)]
    attributes: Vec<Attribute>,
    #[serde(default)]
    fields: Vec<FieldDescriptor>,
    #[serde(default)]
    methods: Vec<MethodDescriptor>,
}

impl TryFrom<ClassDescriptorRepr> for ClassDescriptor {
    type Error = MetadataError;

    fn try_from(repr: ClassDescriptorRepr) -> Result<Self, Self::Error> {
        ClassDescriptor::new(repr.name, repr.attributes, repr.fields, repr.methods)
    }
}

/// Immutable description of a class and its declarative attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClassDescriptorRepr")]
pub struct ClassDescriptor {
    name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// Build a descriptor from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::EmptyClassName`] if `name` is empty or blank.
    pub fn new(
        name: impl Into<String>,
        attributes: Vec<Attribute>,
        fields: Vec<FieldDescriptor>,
        methods: Vec<MethodDescriptor>,
    ) -> Result<Self, MetadataError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(MetadataError::EmptyClassName);
        }
        Ok(Self {
            name,
            attributes,
            fields,
            methods,
        })
    }

    /// Fully-qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class name with everything up to and including the last `.` removed.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// The dotted package of the class, empty for the default package.
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    /// Class-level attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Declared fields.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Declared methods.
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Every class-level attribute with the given name, in declaration order.
    pub fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attribute> {
        self.attributes.iter().filter(move |a| a.name() == name)
    }

    /// The first class-level attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Whether at least one class-level attribute has the given name.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// The first method with the given name. Overloads are not distinguished.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The first field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Decode every class-level and method-level attribute into its typed
    /// [`Declaration`], tagged with where it was found.
    ///
    /// Class-level attributes come first, then method attributes in method
    /// declaration order. Field attributes carry no declarations.
    pub fn declarations(&self) -> Vec<Result<(DeclarationSite, Declaration), MetadataError>> {
        let class_level = self
            .attributes
            .iter()
            .map(|a| Declaration::try_from(a).map(|d| (DeclarationSite::Class, d)));
        let method_level = self.methods.iter().flat_map(|m| {
            m.attributes.iter().map(move |a| {
                Declaration::try_from(a).map(|d| (DeclarationSite::Method(m.name.clone()), d))
            })
        });
        class_level.chain(method_level).collect()
    }
}

/// Strip everything up to and including the final `.` of a dotted name.
pub fn simple_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClassDescriptor {
        ClassDescriptor::new(
            "org.example.Mailer",
            vec![
                Attribute::new("component"),
                Attribute::new("service").param("type", "org.example.Sender"),
                Attribute::new("service").param("type", "org.example.Queue"),
            ],
            vec![FieldDescriptor::new("retries", "int")],
            vec![MethodDescriptor::new("service")
                .with_parameter(ParameterDescriptor::new(
                    "manager",
                    "framework.service.ServiceManager",
                ))
                .with_attribute(Attribute::new("dependency").param("type", "org.example.Store"))],
        )
        .unwrap()
    }

    #[test]
    fn empty_name_rejected() {
        let err = ClassDescriptor::new("", vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err, MetadataError::EmptyClassName);
        let err = ClassDescriptor::new("   ", vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err, MetadataError::EmptyClassName);
    }

    #[test]
    fn attributes_named_returns_every_match_in_order() {
        let class = sample();
        let types: Vec<&str> = class
            .attributes_named("service")
            .map(|a| a.parameter("type").unwrap())
            .collect();
        assert_eq!(types, vec!["org.example.Sender", "org.example.Queue"]);
        assert_eq!(class.attributes_named("dependency").count(), 0);
    }

    #[test]
    fn parameter_lookup_with_default_and_required() {
        let attr = Attribute::new("dependency").param("type", "a.B");
        assert_eq!(attr.parameter_or("optional", "false"), "false");
        assert_eq!(attr.parameter_or("type", "x"), "a.B");
        assert_eq!(attr.required_parameter("type").unwrap(), "a.B");
        let err = attr.required_parameter("key").unwrap_err();
        assert_eq!(
            err,
            MetadataError::MissingParameter {
                attribute: "dependency".to_string(),
                parameter: "key".to_string(),
            }
        );
        assert!(err.to_string().contains("'key'"));
    }

    #[test]
    fn simple_name_and_package() {
        let class = sample();
        assert_eq!(class.simple_name(), "Mailer");
        assert_eq!(class.package(), "org.example");

        let bare = ClassDescriptor::new("Mailer", vec![], vec![], vec![]).unwrap();
        assert_eq!(bare.simple_name(), "Mailer");
        assert_eq!(bare.package(), "");
    }

    #[test]
    fn method_and_field_lookup_by_name() {
        let class = sample();
        assert_eq!(class.method("service").unwrap().parameters.len(), 1);
        assert!(class.method("configure").is_none());
        assert_eq!(class.field("retries").unwrap().type_name, "int");
    }

    #[test]
    fn method_lookup_ignores_overloads() {
        let class = ClassDescriptor::new(
            "a.Overloaded",
            vec![],
            vec![],
            vec![
                MethodDescriptor::new("run"),
                MethodDescriptor::new("run").with_parameter(ParameterDescriptor::new("n", "int")),
            ],
        )
        .unwrap();
        assert!(class.method("run").unwrap().parameters.is_empty());
    }

    #[test]
    fn declarations_keep_origin() {
        let class = sample();
        let decls: Vec<_> = class.declarations().into_iter().map(Result::unwrap).collect();
        assert_eq!(decls.len(), 4);
        assert_eq!(decls[0].0, DeclarationSite::Class);
        assert_eq!(decls[3].0, DeclarationSite::Method("service".to_string()));
    }

    #[test]
    fn yaml_round_trip_preserves_descriptor() {
        let class = sample();
        let yaml = serde_yaml::to_string(&class).unwrap();
        let back: ClassDescriptor = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, class);
    }

    #[test]
    fn deserializing_empty_name_fails() {
        let result: Result<ClassDescriptor, _> = serde_yaml::from_str("name: \"\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn deserializing_defaults_missing_collections() {
        let class: ClassDescriptor = serde_yaml::from_str(
            "name: a.B\nmethods:\n  - name: start\n",
        )
        .unwrap();
        assert!(class.attributes().is_empty());
        assert_eq!(class.methods()[0].return_type, "void");
    }
}
