use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const TEMPLATE: &str = r#"<section class="cv-document">
<h1>{{employee.firstName}} {{employee.lastName}}</h1>
{{#if employee.title}}<h2>{{employee.title | uppercase}}</h2>{{/if}}
<ul>{{#each employee.skills}}<li>{{this.name}} - {{this.level | formatProficiency}}</li>{{/each}}</ul>
</section>
"#;

fn cvtpl_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cvtpl"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("RUST_LOG");
    cmd
}

fn write_fixtures(dir: &Path) {
    fs::write(dir.join("modern.html"), TEMPLATE).expect("template");
    fs::write(
        dir.join("ann.json"),
        r#"{"firstName": "Ann", "lastName": "Lee", "title": "Engineer",
            "skills": [{"name": "Rust", "level": 9}, {"name": "Go", "level": 4}]}"#,
    )
    .expect("ann");
}

fn add_template(home: &Path, work: &Path) {
    cvtpl_cmd(home)
        .args(["template", "add", "modern"])
        .arg(work.join("modern.html"))
        .args(["--orientation", "landscape", "--description", "clean single column"])
        .assert()
        .success()
        .stdout(contains("Added template 'modern' (landscape)"));
}

#[test]
fn render_fragment_to_stdout() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());

    cvtpl_cmd(home.path())
        .arg("render")
        .arg(work.path().join("modern.html"))
        .arg("--data")
        .arg(work.path().join("ann.json"))
        .assert()
        .success()
        .stdout(contains("<h1>Ann Lee</h1>"))
        .stdout(contains("<h2>ENGINEER</h2>"))
        .stdout(contains("<li>Rust - Expert</li><li>Go - Beginner</li>"))
        .stdout(contains("<!DOCTYPE").not());
}

#[test]
fn render_to_stdout_is_byte_exact() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    fs::write(work.path().join("static.html"), "<p>static</p>").expect("template");

    cvtpl_cmd(home.path())
        .arg("render")
        .arg(work.path().join("static.html"))
        .arg("--data")
        .arg(work.path().join("ann.json"))
        .assert()
        .success()
        .stdout("<p>static</p>");
}

#[test]
fn render_document_to_file() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    let out = work.path().join("out/ann.html");

    cvtpl_cmd(home.path())
        .arg("render")
        .arg(work.path().join("modern.html"))
        .arg("--data")
        .arg(work.path().join("ann.json"))
        .args(["--document", "--orientation", "landscape", "--title", "Ann's CV"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Rendered 'modern'"));

    let html = fs::read_to_string(&out).expect("output");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Ann&#x27;s CV</title>"));
    assert!(html.contains("class=\"cv-document orientation-landscape\""));
    assert!(html.contains("@page { size: A4 landscape;"));
}

#[test]
fn orientation_requires_document_flag() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());

    cvtpl_cmd(home.path())
        .arg("render")
        .arg(work.path().join("modern.html"))
        .arg("--data")
        .arg(work.path().join("ann.json"))
        .args(["--orientation", "landscape"])
        .assert()
        .failure()
        .stderr(contains("--document"));
}

#[test]
fn template_add_list_remove() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    add_template(home.path(), work.path());

    assert!(home.path().join(".cvtpl/templates/modern.yaml").exists());

    cvtpl_cmd(home.path())
        .args(["template", "add", "modern"])
        .arg(work.path().join("modern.html"))
        .assert()
        .success()
        .stdout(contains("already exists"));

    cvtpl_cmd(home.path())
        .args(["template", "list"])
        .assert()
        .success()
        .stdout(contains("modern"))
        .stdout(contains("landscape"))
        .stdout(contains("clean single column"));

    let output = cvtpl_cmd(home.path())
        .args(["template", "list", "--json"])
        .output()
        .expect("list --json");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(parsed[0]["name"], "modern");
    assert_eq!(parsed[0]["orientation"], "landscape");

    cvtpl_cmd(home.path())
        .args(["template", "remove", "modern"])
        .assert()
        .success()
        .stdout(contains("Removed template 'modern'"));

    cvtpl_cmd(home.path())
        .args(["template", "remove", "modern"])
        .assert()
        .failure()
        .stderr(contains("template not found"));
}

#[test]
fn export_dry_run_then_real_then_noop() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    add_template(home.path(), work.path());
    let out = work.path().join("exports");

    cvtpl_cmd(home.path())
        .args(["export", "modern", "--dry-run", "--data"])
        .arg(work.path().join("ann.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("1 written"));
    assert!(!out.join("ann-lee.html").exists(), "dry-run must not write");

    cvtpl_cmd(home.path())
        .args(["export", "modern", "--data"])
        .arg(work.path().join("ann.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("1 written, 0 unchanged"));
    let html = fs::read_to_string(out.join("ann-lee.html")).expect("exported");
    assert!(html.contains("orientation-landscape"));

    cvtpl_cmd(home.path())
        .args(["export", "modern", "--data"])
        .arg(work.path().join("ann.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("0 written, 1 unchanged"));
}

#[test]
fn default_out_dir_is_tracked_per_working_directory() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    let first = TempDir::new().expect("first");
    let second = TempDir::new().expect("second");

    let export_from = |dir: &Path| {
        let mut c = cvtpl_cmd(home.path());
        c.current_dir(dir)
            .arg("export")
            .arg(work.path().join("modern.html"))
            .arg("--data")
            .arg(work.path().join("ann.json"));
        c
    };

    export_from(first.path()).assert().success().stdout(contains("1 written"));
    fs::write(second.path().join("ann-lee.html"), "stale").expect("stale");

    export_from(second.path())
        .assert()
        .success()
        .stdout(contains("1 written, 0 unchanged"));
    let html = fs::read_to_string(second.path().join("ann-lee.html")).expect("exported");
    assert!(html.contains("<h1>Ann Lee</h1>"), "stale file must be replaced:\n{html}");
}

#[test]
fn export_uses_configured_export_dir() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    let export_dir = work.path().join("configured");
    fs::create_dir_all(home.path().join(".cvtpl")).expect("mkdir");
    fs::write(
        home.path().join(".cvtpl/config.yaml"),
        format!("export_dir: {}\n", export_dir.display()),
    )
    .expect("config");

    cvtpl_cmd(home.path())
        .arg("export")
        .arg(work.path().join("modern.html"))
        .arg("--data")
        .arg(work.path().join("ann.json"))
        .assert()
        .success();
    assert!(export_dir.join("ann-lee.html").exists());
}

#[test]
fn diff_reports_local_edits() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());
    add_template(home.path(), work.path());
    let out = work.path().join("exports");

    let export = |cmd: &str| {
        let mut c = cvtpl_cmd(home.path());
        c.args([cmd, "modern", "--data"])
            .arg(work.path().join("ann.json"))
            .arg("--out")
            .arg(&out);
        c
    };

    export("export").assert().success();
    export("diff").assert().success().stdout(contains("No differences for 'modern'"));

    let target = out.join("ann-lee.html");
    let edited = fs::read_to_string(&target).expect("read").replace("ENGINEER", "MANAGER");
    fs::write(&target, edited).expect("write");

    export("diff")
        .assert()
        .success()
        .stdout(contains("--- a/ann-lee.html"))
        .stdout(contains("-<h2>MANAGER</h2>"))
        .stdout(contains("+<h2>ENGINEER</h2>"));
}

#[test]
fn filters_lists_every_filter() {
    let home = TempDir::new().expect("home");
    let output = cvtpl_cmd(home.path()).arg("filters").output().expect("filters");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["formatDate", "formatDateRange", "join", "truncate", "capitalize", "formatProficiency"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn missing_template_fails_with_context() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    write_fixtures(work.path());

    cvtpl_cmd(home.path())
        .args(["render", "ghost", "--data"])
        .arg(work.path().join("ann.json"))
        .assert()
        .failure()
        .stderr(contains("template 'ghost' not found"));
}

#[test]
fn verbose_flag_logs_filter_fallbacks() {
    let home = TempDir::new().expect("home");
    let work = TempDir::new().expect("work");
    fs::write(work.path().join("t.html"), "{{employee.firstName | sparkle}}").expect("tpl");
    fs::write(work.path().join("d.json"), r#"{"firstName": "Ann"}"#).expect("data");

    cvtpl_cmd(home.path())
        .args(["-v", "render"])
        .arg(work.path().join("t.html"))
        .arg("--data")
        .arg(work.path().join("d.json"))
        .assert()
        .success()
        .stdout(contains("Ann"))
        .stderr(contains("unknown filter 'sparkle'"));
}
