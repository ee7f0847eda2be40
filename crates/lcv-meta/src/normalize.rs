//! # Attribute Normalizer
//!
//! Converts raw attributes (parameters exactly as written in source,
//! relative type names) into canonical attributes:
//!
//! - `component` (class level) passes through unchanged.
//! - `service` (class level) requires `type`, resolved to a
//!   fully-qualified name; the canonical form carries only `type`.
//! - `dependency` (method level) requires `type`, resolved likewise;
//!   `optional` defaults to `false`; `key` is derived by
//!   [`lcv_core::derive_dependency_key`].
//! - `configuration` / `parameters` (method level) keep an optional
//!   `type` and default `location` to `<SimpleName>-schema.xml`.
//! - Anything else passes through unchanged.
//!
//! Missing or malformed parameters are configuration errors. Nothing is
//! silently defaulted except where listed above.

use lcv_core::declaration::{
    parse_flag, CONFIGURATION, DEPENDENCY, PARAMETERS, PARAM_KEY, PARAM_LOCATION,
    PARAM_OPTIONAL, PARAM_QUALIFIER, PARAM_TYPE, SERVICE,
};
use lcv_core::{
    derive_dependency_key, simple_name, Attribute, ClassDescriptor, Declaration,
    DependencyDeclaration, MethodDescriptor, SchemaDeclaration, SchemaKind, ServiceDeclaration,
};

use crate::error::NormalizeError;
use crate::resolve::TypeResolver;

/// Suffix appended to a class's simple name to form its default schema location.
pub const DEFAULT_SCHEMA_SUFFIX: &str = "-schema.xml";

/// Default schema location for the class named `class_name`.
pub fn default_schema_location(class_name: &str) -> String {
    format!("{}{DEFAULT_SCHEMA_SUFFIX}", simple_name(class_name))
}

/// Normalizes raw attributes using an injected type resolver.
#[derive(Debug, Clone)]
pub struct AttributeNormalizer<R> {
    resolver: R,
}

impl<R: TypeResolver> AttributeNormalizer<R> {
    /// Create a normalizer around `resolver`.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Normalize every class-level and method-level attribute of `raw`.
    ///
    /// Fields and their attributes are carried over unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first [`NormalizeError`] encountered.
    pub fn normalize_class(&self, raw: &ClassDescriptor) -> Result<ClassDescriptor, NormalizeError> {
        let class_name = raw.name();
        let attributes = raw
            .attributes()
            .iter()
            .map(|a| self.normalize_class_attribute(class_name, a))
            .collect::<Result<Vec<_>, _>>()?;

        let methods = raw
            .methods()
            .iter()
            .map(|m| -> Result<MethodDescriptor, NormalizeError> {
                let attributes = m
                    .attributes
                    .iter()
                    .map(|a| self.normalize_method_attribute(class_name, a))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(MethodDescriptor {
                    attributes,
                    ..m.clone()
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let normalized =
            ClassDescriptor::new(class_name, attributes, raw.fields().to_vec(), methods)?;
        tracing::debug!(class = class_name, "normalized class attributes");
        Ok(normalized)
    }

    /// Normalize an attribute attached to the class itself.
    pub fn normalize_class_attribute(
        &self,
        class_name: &str,
        raw: &Attribute,
    ) -> Result<Attribute, NormalizeError> {
        match raw.name() {
            SERVICE => {
                let type_name = self.resolved_type(class_name, raw)?;
                Ok(Declaration::Service(ServiceDeclaration { type_name }).into())
            }
            _ => Ok(raw.clone()),
        }
    }

    /// Normalize an attribute attached to one of the class's methods.
    pub fn normalize_method_attribute(
        &self,
        class_name: &str,
        raw: &Attribute,
    ) -> Result<Attribute, NormalizeError> {
        match raw.name() {
            DEPENDENCY => self.normalize_dependency(class_name, raw),
            CONFIGURATION => Ok(self.normalize_schema(class_name, raw, SchemaKind::Configuration)),
            PARAMETERS => Ok(self.normalize_schema(class_name, raw, SchemaKind::Parameters)),
            _ => Ok(raw.clone()),
        }
    }

    fn normalize_dependency(
        &self,
        class_name: &str,
        raw: &Attribute,
    ) -> Result<Attribute, NormalizeError> {
        let type_name = self.resolved_type(class_name, raw)?;

        let optional = match raw.parameter(PARAM_OPTIONAL) {
            None => false,
            Some(value) => parse_flag(value.trim()).ok_or_else(|| {
                NormalizeError::InvalidParameter {
                    class: class_name.to_string(),
                    attribute: raw.name().to_string(),
                    parameter: PARAM_OPTIONAL.to_string(),
                    value: value.to_string(),
                }
            })?,
        };

        let qualifier = raw.parameter(PARAM_QUALIFIER);
        let key = derive_dependency_key(&type_name, raw.parameter(PARAM_KEY), qualifier);

        Ok(Declaration::Dependency(DependencyDeclaration {
            type_name,
            key,
            qualifier: qualifier.map(str::to_string),
            optional,
        })
        .into())
    }

    fn normalize_schema(&self, class_name: &str, raw: &Attribute, kind: SchemaKind) -> Attribute {
        let type_name = raw
            .parameter(PARAM_TYPE)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let location = raw
            .parameter(PARAM_LOCATION)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map_or_else(|| default_schema_location(class_name), str::to_string);

        Declaration::ConfigurationSchema(SchemaDeclaration {
            kind,
            type_name,
            location,
        })
        .into()
    }

    fn resolved_type(&self, class_name: &str, raw: &Attribute) -> Result<String, NormalizeError> {
        let declared = raw
            .parameter(PARAM_TYPE)
            .ok_or_else(|| NormalizeError::MissingParameter {
                class: class_name.to_string(),
                attribute: raw.name().to_string(),
                parameter: PARAM_TYPE.to_string(),
            })?;
        self.resolver
            .resolve(declared, class_name)
            .ok_or_else(|| NormalizeError::UnresolvedType {
                class: class_name.to_string(),
                attribute: raw.name().to_string(),
                type_name: declared.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::ImportResolver;
    use lcv_core::declaration::COMPONENT;

    fn normalizer() -> AttributeNormalizer<ImportResolver> {
        AttributeNormalizer::new(ImportResolver::new().with_import("org.store.Store"))
    }

    #[test]
    fn component_marker_passes_through() {
        let raw = Attribute::new(COMPONENT).param("lifestyle", "singleton");
        let out = normalizer()
            .normalize_class_attribute("org.example.Mailer", &raw)
            .unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn service_type_is_resolved() {
        let raw = Attribute::new(SERVICE).param("type", "Sender").param("version", "1.0");
        let out = normalizer()
            .normalize_class_attribute("org.example.Mailer", &raw)
            .unwrap();
        assert_eq!(out, Attribute::new(SERVICE).param("type", "org.example.Sender"));
    }

    #[test]
    fn service_without_type_is_a_configuration_error() {
        let err = normalizer()
            .normalize_class_attribute("org.example.Mailer", &Attribute::new(SERVICE))
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingParameter {
                class: "org.example.Mailer".to_string(),
                attribute: "service".to_string(),
                parameter: "type".to_string(),
            }
        );
        assert!(err.to_string().contains("org.example.Mailer"));
    }

    #[test]
    fn dependency_key_from_type() {
        let raw = Attribute::new(DEPENDENCY).param("type", "Store");
        let out = normalizer()
            .normalize_method_attribute("org.example.Mailer", &raw)
            .unwrap();
        assert_eq!(out.parameter("type"), Some("org.store.Store"));
        assert_eq!(out.parameter("key"), Some("org.store.Store"));
        assert_eq!(out.parameter("optional"), Some("false"));
    }

    #[test]
    fn dependency_key_from_type_and_qualifier() {
        let raw = Attribute::new(DEPENDENCY)
            .param("type", "Store")
            .param("qualifier", "fast");
        let out = normalizer()
            .normalize_method_attribute("org.example.Mailer", &raw)
            .unwrap();
        assert_eq!(out.parameter("key"), Some("org.store.Store/fast"));
        assert_eq!(out.parameter("qualifier"), Some("fast"));
    }

    #[test]
    fn explicit_dependency_key_wins() {
        let raw = Attribute::new(DEPENDENCY)
            .param("type", "Store")
            .param("key", "K")
            .param("qualifier", "Q")
            .param("optional", "TRUE");
        let out = normalizer()
            .normalize_method_attribute("org.example.Mailer", &raw)
            .unwrap();
        assert_eq!(out.parameter("key"), Some("K"));
        assert_eq!(out.parameter("optional"), Some("true"));
    }

    #[test]
    fn dependency_without_type_is_a_configuration_error() {
        let raw = Attribute::new(DEPENDENCY).param("key", "K").param("optional", "true");
        let err = normalizer()
            .normalize_method_attribute("org.example.Mailer", &raw)
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MissingParameter {
                class: "org.example.Mailer".to_string(),
                attribute: "dependency".to_string(),
                parameter: "type".to_string(),
            }
        );
    }

    #[test]
    fn dependency_with_invalid_optional_is_rejected() {
        let raw = Attribute::new(DEPENDENCY)
            .param("type", "Store")
            .param("optional", "sometimes");
        let err = normalizer()
            .normalize_method_attribute("org.example.Mailer", &raw)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidParameter { ref parameter, .. } if parameter == "optional"));
    }

    #[test]
    fn unresolvable_dependency_type_is_rejected() {
        let normalizer = AttributeNormalizer::new(
            ImportResolver::new().with_known_types(["org.example.Known"]),
        );
        let raw = Attribute::new(DEPENDENCY).param("type", "Unknown");
        let err = normalizer
            .normalize_method_attribute("org.example.Mailer", &raw)
            .unwrap_err();
        assert!(matches!(err, NormalizeError::UnresolvedType { .. }));
    }

    #[test]
    fn default_schema_location_uses_simple_name() {
        assert_eq!(default_schema_location("a.b.Foo"), "Foo-schema.xml");
        assert_eq!(default_schema_location("Foo"), "Foo-schema.xml");

        let out = normalizer()
            .normalize_method_attribute("a.b.Foo", &Attribute::new(CONFIGURATION))
            .unwrap();
        assert_eq!(out, Attribute::new(CONFIGURATION).param("location", "Foo-schema.xml"));
    }

    #[test]
    fn explicit_schema_location_and_type_are_kept() {
        let raw = Attribute::new(PARAMETERS)
            .param("location", " /schemas/foo.rng ")
            .param("type", "relax-ng");
        let out = normalizer().normalize_method_attribute("a.b.Foo", &raw).unwrap();
        assert_eq!(out.parameter("location"), Some("/schemas/foo.rng"));
        assert_eq!(out.parameter("type"), Some("relax-ng"));
        assert_eq!(out.name(), "parameters");
    }

    #[test]
    fn unknown_attributes_pass_through() {
        let raw = Attribute::new("x-since").param("version", "2");
        assert_eq!(
            normalizer().normalize_method_attribute("a.B", &raw).unwrap(),
            raw
        );
    }

    #[test]
    fn normalize_class_rewrites_every_level() {
        let raw = ClassDescriptor::new(
            "org.example.Mailer",
            vec![
                Attribute::new(COMPONENT),
                Attribute::new(SERVICE).param("type", "Sender"),
            ],
            vec![],
            vec![
                MethodDescriptor::new("service")
                    .with_attribute(Attribute::new(DEPENDENCY).param("type", "Store")),
                MethodDescriptor::new("configure").with_attribute(Attribute::new(CONFIGURATION)),
            ],
        )
        .unwrap();

        let canonical = normalizer().normalize_class(&raw).unwrap();
        assert_eq!(canonical.name(), "org.example.Mailer");
        assert_eq!(
            canonical.attribute("service").unwrap().parameter("type"),
            Some("org.example.Sender")
        );
        let dep = canonical.method("service").unwrap().attributes[0].clone();
        assert_eq!(dep.parameter("key"), Some("org.store.Store"));
        let schema = canonical.method("configure").unwrap().attributes[0].clone();
        assert_eq!(schema.parameter("location"), Some("Mailer-schema.xml"));
    }

    #[test]
    fn normalize_class_fails_on_first_bad_attribute() {
        let raw = ClassDescriptor::new(
            "org.example.Mailer",
            vec![Attribute::new(SERVICE)],
            vec![],
            vec![],
        )
        .unwrap();
        assert!(normalizer().normalize_class(&raw).is_err());
    }
}
