//! Descriptor documents on disk.
//!
//! A document holds either one class descriptor or a `classes:` list of
//! them. Documents are schema-validated before they are deserialized.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lcv_core::ClassDescriptor;
use lcv_schema::{find_documents, SchemaValidator, CLASS_DESCRIPTOR_SCHEMA};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorDocument {
    Many { classes: Vec<ClassDescriptor> },
    One(ClassDescriptor),
}

/// Load every class descriptor in one document.
pub fn load_descriptors(path: &Path, validator: &SchemaValidator) -> Result<Vec<ClassDescriptor>> {
    let value = validator
        .validate_file(path, CLASS_DESCRIPTOR_SCHEMA)
        .with_context(|| format!("invalid descriptor document: {}", path.display()))?;
    let document: DescriptorDocument = serde_json::from_value(value)
        .with_context(|| format!("failed to decode descriptor document: {}", path.display()))?;
    Ok(match document {
        DescriptorDocument::Many { classes } => classes,
        DescriptorDocument::One(class) => vec![class],
    })
}

/// Expand directories into the documents beneath them; files pass through.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .flat_map(|p| {
            if p.is_dir() {
                find_documents(p)
            } else {
                vec![p.clone()]
            }
        })
        .collect()
}

/// Load descriptors from every file and directory in `paths`, in order.
pub fn load_all(paths: &[PathBuf], validator: &SchemaValidator) -> Result<Vec<ClassDescriptor>> {
    let mut descriptors = Vec::new();
    for path in expand_paths(paths) {
        let loaded = load_descriptors(&path, validator)?;
        tracing::debug!(path = %path.display(), classes = loaded.len(), "loaded descriptors");
        descriptors.extend(loaded);
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SchemaValidator {
        SchemaValidator::builtin().unwrap()
    }

    #[test]
    fn single_and_list_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("one.yaml"),
            "name: a.One\nattributes:\n  - name: component\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("more")).unwrap();
        std::fs::write(
            dir.path().join("more/two.json"),
            r#"{"classes": [{"name": "a.Two"}, {"name": "a.Three"}]}"#,
        )
        .unwrap();

        let descriptors = load_all(&[dir.path().to_path_buf()], &validator()).unwrap();
        let names: Vec<&str> = descriptors.iter().map(ClassDescriptor::name).collect();
        assert_eq!(names, vec!["a.Two", "a.Three", "a.One"]);
        assert!(descriptors[2].has_attribute("component"));
    }

    #[test]
    fn invalid_document_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "name: a.Bad\nextra: 1\n").unwrap();
        let err = load_descriptors(&path, &validator()).unwrap_err();
        assert!(format!("{err:#}").contains("bad.yaml"));
    }
}
