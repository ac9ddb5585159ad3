use idlgen_codegen::{
    FilterRegistry, GenerateError, selfcheck,
    testing::{Fixture, session},
};

const A: &str = r#"
module: a
version: "1.0"
imports: [b]
interfaces:
  - name: Item
    properties:
      - { name: origin, type: b.Point }
"#;

const B: &str = r#"
module: b
structs:
  - name: Point
    fields:
      - { name: x, type: int }
"#;

const MODULE_RULES: &str = r#"
module:
  documents:
    "{{ module }}.txt": m.tpl
"#;

#[test]
fn test_only_requested_modules_are_generated() {
    let fixture = Fixture::new().unwrap();
    let a = fixture.model("a.yaml", A).unwrap();
    let b = fixture.model("imports/b.yaml", B).unwrap();
    fixture
        .template("plain", MODULE_RULES, &[("m.tpl", "{{ module }}:{{ module.imports|join(',') }}\n")])
        .unwrap();

    let mut request = fixture.request("plain", &[a]);
    request.imports = vec![b];
    let report = fixture
        .generate(&session(&[], FilterRegistry::new()), &request)
        .unwrap();

    assert_eq!(fixture.outputs(), vec!["a.txt"]);
    assert_eq!(fixture.read("a.txt").unwrap(), "a:b\n");
    assert_eq!(report.written.len(), 1);
}

#[test]
fn test_unresolved_import_aborts_module() {
    let fixture = Fixture::new().unwrap();
    let a = fixture
        .model("a.yaml", "module: a\nimports: [missing]\nstructs: [{ name: S, fields: [] }]\n")
        .unwrap();
    fixture.template("plain", MODULE_RULES, &[("m.tpl", "x")]).unwrap();

    let request = fixture.request("plain", &[a]);
    let err = fixture
        .generate(&session(&[], FilterRegistry::new()), &request)
        .unwrap_err();

    let Some(GenerateError::UnresolvedImport { import, module }) = err.downcast_ref::<GenerateError>() else {
        panic!("expected an unresolved import, got {:?}", err);
    };
    assert_eq!(import, "missing");
    assert_eq!(module, "a");
    assert!(fixture.outputs().is_empty());
}

#[test]
fn test_json_style_rules_document() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture.model("demo.yaml", "module: demo\n").unwrap();
    fixture
        .template(
            "json",
            r#"{"module": {"documents": [{"{{module.name}}": "t.tpl"}]}}"#,
            &[("t.tpl", "{{ module.name }}\n")],
        )
        .unwrap();

    let request = fixture.request("json", &[demo]);
    let report = fixture
        .generate(&session(&[], FilterRegistry::new()), &request)
        .unwrap();

    assert_eq!(report.written.len(), 1);
    assert_eq!(fixture.outputs(), vec!["demo"]);
    assert_eq!(fixture.read("demo").unwrap(), "demo\n");
}

#[test]
fn test_legacy_rules_warn_once() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture
        .model(
            "demo.yaml",
            r#"
module: demo
interfaces: [{ name: Echo }, { name: Other }]
structs: [{ name: Point, fields: [] }]
"#,
        )
        .unwrap();
    fixture
        .template(
            "legacy",
            r#"
generate_rules:
  module_rules:
    - { dest_file: "{{ module|lower }}.txt", template_file: module.tpl }
  interface_rules:
    - { dest_file: "{{ interface|lower }}.txt", template_file: interface.tpl }
  struct_rules:
    - { dest_file: "{{ struct|lower }}.txt", template_file: struct.tpl }
"#,
            &[
                ("module.tpl", "{{ module }}\n"),
                ("interface.tpl", "{{ interface }} in {{ dst != '' }}\n"),
                ("struct.tpl", "{{ struct }}{{ interface is defined }}\n"),
            ],
        )
        .unwrap();

    let session = session(&[], FilterRegistry::new());
    let report = fixture.generate(&session, &fixture.request("legacy", &[demo.clone()])).unwrap();

    assert_eq!(report.warnings, 1);
    // a second run on the same session starts counting from zero
    let again = fixture.generate(&session, &fixture.request("legacy", &[demo])).unwrap();
    assert_eq!(again.warnings, 1);
    assert_eq!(
        fixture.outputs(),
        vec!["demo.txt", "echo.txt", "other.txt", "point.txt"]
    );
    assert_eq!(fixture.read("echo.txt").unwrap(), "Echo in true\n");
    assert_eq!(fixture.read("point.txt").unwrap(), "Pointfalse\n");
}

#[test]
fn test_preserve_and_force() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture.model("demo.yaml", "module: demo\n").unwrap();
    fixture
        .template(
            "keep",
            r#"
module:
  documents: { "gen.txt": gen.tpl }
  preserve: { "impl.txt": impl.tpl }
"#,
            &[("gen.tpl", "generated\n"), ("impl.tpl", "stub\n")],
        )
        .unwrap();
    let session = session(&[], FilterRegistry::new());
    let mut request = fixture.request("keep", &[demo]);

    fixture.generate(&session, &request).unwrap();
    std::fs::write(fixture.out().join("impl.txt"), "edited\n").unwrap();
    std::fs::write(fixture.out().join("gen.txt"), "edited\n").unwrap();

    let report = fixture.generate(&session, &request).unwrap();
    assert_eq!(report.written, vec![fixture.out().join("gen.txt")]);
    assert_eq!(report.preserved, vec![fixture.out().join("impl.txt")]);
    assert_eq!(fixture.read("impl.txt").unwrap(), "edited\n");
    assert_eq!(fixture.read("gen.txt").unwrap(), "generated\n");

    request.force = true;
    fixture.generate(&session, &request).unwrap();
    assert_eq!(fixture.read("impl.txt").unwrap(), "stub\n");
}

#[test]
fn test_rule_conditions_follow_builtin_features() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture.model("demo.yaml", "module: demo\n").unwrap();
    fixture
        .template(
            "cond",
            r#"
remote:
  when: [remoteobjects]
  module:
    documents: { "remote.txt": t.tpl }
local:
  module:
    when: [dbus]
    documents: { "dbus.txt": t.tpl }
"#,
            &[("t.tpl", "{{ module }}\n")],
        )
        .unwrap();

    let request = fixture.request("cond", &[demo]);
    fixture
        .generate(&session(&["remoteobjects"], FilterRegistry::new()), &request)
        .unwrap();
    assert_eq!(fixture.outputs(), vec!["remote.txt"]);
}

#[test]
fn test_unsupported_type_is_reported() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture
        .model(
            "demo.yaml",
            "module: demo\ninterfaces:\n  - name: Echo\n    properties: [{ name: lookup, type: map<int> }]\n",
        )
        .unwrap();
    fixture.template("plain", MODULE_RULES, &[("m.tpl", "x")]).unwrap();

    let err = fixture
        .generate(&session(&[], FilterRegistry::new()), &fixture.request("plain", &[demo]))
        .unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        "demo.yaml: Properties of type 'map' are not supported"
    );
    assert!(fixture.outputs().is_empty());
}

#[test]
fn test_missing_annotation_file() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture.model("demo.yaml", "module: demo\n").unwrap();
    fixture.template("plain", MODULE_RULES, &[("m.tpl", "x")]).unwrap();

    let mut request = fixture.request("plain", &[demo]);
    request.annotations = vec![fixture.path().join("nope.yaml")];
    let err = fixture
        .generate(&session(&[], FilterRegistry::new()), &request)
        .unwrap_err();
    assert!(err.root_cause().to_string().starts_with("no such annotation file: "));
}

#[test]
fn test_template_error_names_template_and_source() {
    let fixture = Fixture::new().unwrap();
    let demo = fixture.model("demo.yaml", "module: demo\n").unwrap();
    fixture
        .template("broken", MODULE_RULES, &[("m.tpl", "ok\n{{ error('bad module ' ~ module) }}\n")])
        .unwrap();

    let err = fixture
        .generate(&session(&[], FilterRegistry::new()), &fixture.request("broken", &[demo]))
        .unwrap_err();
    let Some(err) = err.downcast_ref::<GenerateError>() else {
        panic!("expected a template error, got {:?}", err);
    };
    assert_eq!(err.template_message(), Some("bad module demo"));
    let message = err.to_string();
    assert!(message.starts_with("m.tpl:2: bad module demo"), "{}", message);
    assert!(message.ends_with("demo.yaml: instantiated from here"), "{}", message);
}

#[test]
fn test_selfcheck() {
    let dir = tempfile::tempdir().unwrap();
    let report = selfcheck(&session(&[], FilterRegistry::new()), dir.path()).unwrap();
    assert_eq!(report.written.len(), 2);
}
