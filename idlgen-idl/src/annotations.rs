use std::path::Path;

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Qualified symbol name mapped to the tags to overlay on it.
pub type Annotations = Map<String, Value>;

/// Load an annotation document.
///
/// ```yaml
/// org.example.Echo:
///   config: { qml_name: EchoItem }
/// org.example.Echo#text:
///   config_simulator: { default: "hello" }
/// ```
///
/// An empty document yields no annotations.
pub fn load_annotations(path: impl AsRef<Path>) -> Result<Annotations> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    if content.trim().is_empty() {
        return Ok(Annotations::new());
    }
    serde_yaml::from_str::<Option<Annotations>>(&content)
        .map(Option::unwrap_or_default)
        .map_err(|source| {
            Box::new(Error::Annotations {
                path: path.to_path_buf(),
                source,
            })
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_load_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.yaml");
        std::fs::write(
            &path,
            "org.example.Echo:\n  config:\n    qml_name: EchoItem\n",
        )
        .unwrap();

        let annotations = load_annotations(&path).unwrap();
        assert_eq!(
            annotations["org.example.Echo"],
            json!({ "config": { "qml_name": "EchoItem" } })
        );
    }

    #[test]
    fn test_missing_annotations_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_annotations(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }

    #[test]
    fn test_non_mapping_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "- a\n- b\n").unwrap();
        let err = load_annotations(&path).unwrap_err();
        assert!(matches!(*err, Error::Annotations { .. }));
    }
}
