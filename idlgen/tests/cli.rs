use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Run the binary with a builtin configuration written into `dir`.
fn idlgen(dir: &Path, args: &[&str]) -> Output {
    let config = write(dir, "builtin.yaml", "VERSION: \"6.8\"\nFEATURES: [qml]\n");
    Command::new(env!("CARGO_BIN_EXE_idlgen"))
        .args(args)
        .env("IDLGEN_CONFIG", config)
        .env("IDLGEN_LOG", "warn")
        .output()
        .unwrap()
}

#[test]
fn test_selfcheck() {
    let dir = tempfile::tempdir().unwrap();
    let output = idlgen(dir.path(), &["selfcheck"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("self check finished successfully"));
}

#[test]
fn test_missing_builtin_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_idlgen"))
        .arg("selfcheck")
        .env("IDLGEN_CONFIG", dir.path().join("missing.yaml"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load the builtin configuration"));
}

#[test]
fn test_generate_with_qt_filters() {
    let dir = tempfile::tempdir().unwrap();
    let model = write(
        dir.path(),
        "echo.yaml",
        "module: org.example\ninterfaces:\n  - name: Echo\n    properties: [{ name: text, type: string }]\n",
    );
    write(
        dir.path(),
        "templates/qt.yaml",
        "qml:\n  when: [qml]\n  interface:\n    documents:\n      \"{{ interface|lower }}.h\": echo.h.tpl\n",
    );
    write(
        dir.path(),
        "templates/qt/echo.h.tpl",
        "{% for p in interface.properties %}{{ p|return_type }} {{ p|getter_name }}() const;\n{% endfor %}",
    );
    let out = dir.path().join("out");

    let output = idlgen(
        dir.path(),
        &[
            "generate",
            model.to_str().unwrap(),
            out.to_str().unwrap(),
            "-t",
            "qt",
            "-T",
            dir.path().join("templates").to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        std::fs::read_to_string(out.join("echo.h")).unwrap(),
        "QString text() const;\n"
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("  + echo.h"));
}

#[test]
fn test_templates_lists_found() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "templates/frontend.yaml", "");
    let output = idlgen(
        dir.path(),
        &["templates", "-T", dir.path().join("templates").to_str().unwrap()],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("  - frontend ("));
}
