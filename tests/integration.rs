use std::fs;
use std::path::{Path, PathBuf};

use tplfill::config::{FailurePolicy, OutputMode, RenderConfig};
use tplfill::error::FillError;
use tplfill::render::{build_context, render_str, Destination};
use tplfill::values::load_inline;
use walkdir::WalkDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy a fixture into a scratch directory, since batch runs write in place.
fn scratch_fixture(name: &str) -> tempfile::TempDir {
    let src = fixture_path(name);
    let dir = tempfile::tempdir().unwrap();
    for entry in WalkDir::new(&src).min_depth(1) {
        let entry = entry.unwrap();
        let dest = dir.path().join(entry.path().strip_prefix(&src).unwrap());
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(entry.path(), &dest).unwrap();
        }
    }
    dir
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_batch_renders_fixture_in_place() {
    let dir = scratch_fixture("site");
    let root = dir.path();
    let config = RenderConfig::batch(root.join("values.yaml"), root.to_path_buf());

    let report = tplfill::run(&config, &mut Vec::new()).unwrap();
    assert!(report.is_success());
    assert_eq!(report.written.len(), 2);

    let app = fs::read_to_string(root.join("app.conf")).unwrap();
    assert!(app.contains("name = \"billing\""));
    assert!(app.contains("port = 8080"));
    assert!(app.contains("env = \"staging\""));
    assert!(!app.contains("log_level"));

    let upstreams = fs::read_to_string(root.join("nested/upstreams")).unwrap();
    assert!(upstreams.contains("server db-1 weight=3;"));
    assert!(upstreams.contains("server db-2 weight=1;"));

    // templates are left in place
    assert!(root.join("app.conf.tpl").exists());
    assert_eq!(
        fs::read_to_string(root.join("README.txt")).unwrap(),
        "Not a template; left untouched.\n"
    );
}

#[test]
fn test_batch_scalar_value() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("out.tpl"), "{{ x }}");
    write(&root.join("v.yaml"), "x: 5\n");

    let config = RenderConfig::batch(root.join("v.yaml"), root.to_path_buf());
    tplfill::run(&config, &mut Vec::new()).unwrap();

    assert_eq!(fs::read_to_string(root.join("out")).unwrap(), "5");
}

#[test]
fn test_batch_continues_past_failing_template() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("a.tpl"), "{{ missing }}");
    write(&root.join("b/c.tpl"), "{% if %}");
    write(&root.join("d.tpl"), "{{ x }}");
    write(&root.join("v.yaml"), "x: ok\n");

    let config = RenderConfig::batch(root.join("v.yaml"), root.to_path_buf());
    let report = tplfill::run(&config, &mut Vec::new()).unwrap();

    assert_eq!(report.templates.len(), 3);
    assert_eq!(report.failed_count(), 2);
    assert!(!root.join("a").exists(), "failed render must not write output");
    assert!(!root.join("b/c").exists());
    assert_eq!(fs::read_to_string(root.join("d")).unwrap(), "ok");

    let undefined = report
        .failures
        .iter()
        .find(|f| f.source.ends_with("a.tpl"))
        .unwrap();
    assert!(matches!(undefined.error, FillError::UndefinedKey { .. }));
    let parse = report
        .failures
        .iter()
        .find(|f| f.source.ends_with("b/c.tpl"))
        .unwrap();
    assert!(matches!(parse.error, FillError::TemplateParse { .. }));
}

#[test]
fn test_batch_undefined_condition_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("nginx.conf.tpl"), "listen 80;{% if enable_tls %} listen 443;{% endif %}");
    write(&root.join("v.yaml"), "server: web\n");

    let config = RenderConfig::batch(root.join("v.yaml"), root.to_path_buf());
    let report = tplfill::run(&config, &mut Vec::new()).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0].error,
        FillError::UndefinedKey { key, .. } if key == "enable_tls"
    ));
    assert!(!root.join("nginx.conf").exists());
}

#[test]
fn test_batch_resolves_yaml_merge_keys() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("svc.tpl"), "{{ api.image }}:{{ api.port }}");
    write(
        &root.join("v.yaml"),
        "defaults: &defaults\n  image: base\n  port: 80\napi:\n  <<: *defaults\n  port: 8080\n",
    );

    let config = RenderConfig::batch(root.join("v.yaml"), root.to_path_buf());
    let report = tplfill::run(&config, &mut Vec::new()).unwrap();

    assert!(report.is_success());
    assert_eq!(fs::read_to_string(root.join("svc")).unwrap(), "base:8080");
}

#[test]
fn test_batch_invalid_values_file_aborts_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("out.tpl"), "static");
    write(&root.join("v.yaml"), "x: [unclosed\n");

    let config = RenderConfig::batch(root.join("v.yaml"), root.to_path_buf());
    let err = tplfill::run(&config, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, FillError::ValuesParse { .. }));
    assert!(!root.join("out").exists());
}

#[test]
fn test_batch_dry_run_writes_nothing() {
    let dir = scratch_fixture("site");
    let root = dir.path();
    let mut config = RenderConfig::batch(root.join("values.yaml"), root.to_path_buf());
    config.dry_run = true;

    let report = tplfill::run(&config, &mut Vec::new()).unwrap();
    assert_eq!(report.planned.len(), 2);
    assert!(report.written.is_empty());
    assert!(!root.join("app.conf").exists());
    assert!(report
        .planned
        .iter()
        .any(|f| f.destination == Destination::File(root.join("nested/upstreams"))));
}

#[test]
fn test_batch_exclude_and_custom_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(&root.join("keep.tmpl"), "{{ x }}");
    write(&root.join("skip/me.tmpl"), "{{ x }}");
    write(&root.join("other.tpl"), "{{ x }}");
    write(&root.join("v.yaml"), "x: 1\n");

    let config = RenderConfig::batch(root.join("v.yaml"), root.to_path_buf())
        .with_suffix(".tmpl")
        .with_exclude(vec!["skip/**".to_string()]);
    let report = tplfill::run(&config, &mut Vec::new()).unwrap();

    assert_eq!(report.written, vec![Destination::File(root.join("keep"))]);
    assert!(!root.join("skip/me").exists());
    assert!(!root.join("other").exists());
}

#[test]
fn test_inline_renders_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greet.tpl");
    write(&template, "Hello, {{ name }}!");

    let config = RenderConfig::inline(template, vec!["name=World".into()], vec![]);
    let mut stdout = Vec::new();
    tplfill::run(&config, &mut stdout).unwrap();

    assert_eq!(String::from_utf8(stdout).unwrap(), "Hello, World!");
}

#[test]
fn test_inline_undefined_key_produces_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("greet.tpl");
    write(&template, "Hello, {{ name }}! {{ title }}");

    let config = RenderConfig::inline(template, vec!["name=World".into()], vec![]);
    let mut stdout = Vec::new();
    let err = tplfill::run(&config, &mut stdout).unwrap_err();

    assert!(matches!(err, FillError::UndefinedKey { key, .. } if key == "title"));
    assert!(stdout.is_empty());
}

#[test]
fn test_inline_conflict_fails_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.tpl");
    let value_file = dir.path().join("name");
    write(&template, "{% if %}");
    write(&value_file, "file");

    let config = RenderConfig::inline(
        template,
        vec!["name=inline".into()],
        vec![format!("name={}", value_file.display())],
    );
    // the template is invalid too, but the conflict is reported first
    let err = tplfill::run(&config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, FillError::Conflict { name } if name == "name"));
}

#[test]
fn test_inline_malformed_argument() {
    let config = RenderConfig::inline("t.tpl".into(), vec!["novalue".into()], vec![]);
    let err = tplfill::run(&config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, FillError::MalformedArgument { .. }));
}

#[test]
fn test_file_backed_trims_value() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("msg.tpl");
    let secret = dir.path().join("s");
    write(&template, "{{ secret }}");
    write(&secret, "topsecret\n");

    let config =
        RenderConfig::file_backed(template, vec![format!("secret={}", secret.display())]);
    let mut stdout = Vec::new();
    tplfill::run(&config, &mut stdout).unwrap();

    assert_eq!(String::from_utf8(stdout).unwrap(), "topsecret");
}

#[test]
fn test_file_backed_missing_value_file() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("msg.tpl");
    write(&template, "{{ secret }}");

    let config = RenderConfig::file_backed(template, vec!["secret=/nonexistent/s".into()]);
    let err = tplfill::run(&config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, FillError::ValueFileRead { .. }));
}

#[test]
fn test_missing_template_is_fatal_for_single_shot() {
    let config = RenderConfig::inline("/nonexistent/t.tpl".into(), vec![], vec![]);
    assert_eq!(config.failure, FailurePolicy::FailFast);
    assert_eq!(config.output, OutputMode::Stdout);

    let err = tplfill::run(&config, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, FillError::FileRead { .. }));
}

#[test]
fn test_render_matches_direct_evaluation() {
    let values = load_inline(&["a=1".to_string(), "b=two".to_string()]).unwrap();
    let context = build_context(&values);
    let src = "{{ a }}-{{ b | upper }}{% if a == \"1\" %}!{% endif %}";

    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("t.tpl");
    write(&template, src);

    let config = RenderConfig::inline(template.clone(), vec!["a=1".into(), "b=two".into()], vec![]);
    let mut stdout = Vec::new();
    tplfill::run(&config, &mut stdout).unwrap();

    let direct = render_str(&template, src, &context).unwrap();
    assert_eq!(String::from_utf8(stdout).unwrap(), direct);
    assert_eq!(direct, "1-TWO!");
}
