use std::path::{Path, PathBuf};

use idlgen_idl::{Error, collect_documents, module_names, parse};
use idlgen_model::{Type, Version};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

const EXAMPLE: &str = r#"
module: org.example
version: "1.2"
imports: [org.common]
interfaces:
  - name: Echo
    tags:
      config: { qml_name: EchoItem }
    properties:
      - { name: text, type: string }
      - { name: origin, type: org.common.Point, readonly: true }
      - { name: colors, type: list<Color> }
    operations:
      - name: echo
        type: string
        parameters: [{ name: msg, type: string }]
      - name: reset
    signals:
      - name: echoed
        parameters: [{ name: flags, type: Flags }]
enums:
  - name: Color
    members: [Red, { name: Green, value: 2 }]
  - name: Flags
    flag: true
    members: [A, B]
"#;

const COMMON: &str = r#"
module: org.common
structs:
  - name: Point
    fields:
      - { name: x, type: int }
      - { name: y, type: int }
"#;

#[test]
fn test_parse_resolves_imported_types() {
    let dir = tempfile::tempdir().unwrap();
    let example = write(dir.path(), "example.yaml", EXAMPLE);
    let common = write(dir.path(), "common.yaml", COMMON);

    let system = parse(&[common, example]).unwrap();
    let names: Vec<_> = system.module_names().collect();
    assert_eq!(names, vec!["org.common", "org.example"]);

    let module = system.module("org.example").unwrap();
    assert_eq!(module.version, Version::new(1, 2));
    assert_eq!(module.imports, vec!["org.common"]);

    let echo = module.interface("Echo").unwrap();
    assert_eq!(echo.tags.get_str("config", "qml_name"), Some("EchoItem"));
    assert_eq!(echo.property("text").unwrap().ty, Type::STRING);
    assert_eq!(
        echo.property("origin").unwrap().ty,
        Type::structure("org.common", "Point")
    );
    assert!(echo.property("origin").unwrap().readonly);
    assert_eq!(
        echo.property("colors").unwrap().ty,
        Type::list(Type::enumeration("org.example", "Color"))
    );
    assert!(echo.operation("reset").unwrap().ty.is_void());
    assert_eq!(
        echo.signal("echoed").unwrap().parameters[0].ty,
        Type::flag("org.example", "Flags")
    );

    let color = module.enumeration("Color").unwrap();
    assert_eq!(color.members[1].value, Some(2));
}

#[test]
fn test_module_names_ignores_imports() {
    let dir = tempfile::tempdir().unwrap();
    let example = write(dir.path(), "example.yaml", EXAMPLE);

    // org.common is not loaded, yet the import-free pass succeeds
    assert_eq!(module_names(&[example.clone()]).unwrap(), vec!["org.example"]);

    let err = parse(&[example]).unwrap_err();
    assert!(matches!(*err, Error::UnknownType { ref name, .. } if name == "org.common.Point"));
}

#[test]
fn test_documents_of_one_module_are_merged() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(
        dir.path(),
        "a.yaml",
        "module: demo\nstructs:\n  - { name: A, fields: [{ name: b, type: B }] }\n",
    );
    let second = write(
        dir.path(),
        "b.json",
        r#"{ "module": "demo", "structs": [{ "name": "B", "fields": [] }] }"#,
    );

    let system = parse(&[first, second]).unwrap();
    assert_eq!(system.len(), 1);
    let demo = system.module("demo").unwrap();
    assert_eq!(demo.structs.len(), 2);
    assert_eq!(demo.structs[0].fields[0].ty, Type::structure("demo", "B"));
}

#[test]
fn test_version_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "a.yaml", "module: demo\nversion: '1.0'\n");
    let second = write(dir.path(), "b.yaml", "module: demo\nversion: '2.0'\n");

    let err = parse(&[first, second]).unwrap_err();
    assert!(matches!(*err, Error::VersionConflict { .. }));
}

#[test]
fn test_parse_error_has_span() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.yaml", "module: demo\ninterfaces: [\n");

    let err = parse(&[path]).unwrap_err();
    assert!(matches!(*err, Error::Parse { span: Some(_), .. }));
}

#[test]
fn test_collect_documents_recurses() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b/two.yml", COMMON);
    write(dir.path(), "a/one.yaml", COMMON);
    write(dir.path(), "a/notes.txt", "ignored");

    let found = collect_documents(dir.path()).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        vec![PathBuf::from("a/one.yaml"), PathBuf::from("b/two.yml")]
    );
}
