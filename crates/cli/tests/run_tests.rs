// End-to-end tests for the `lgrid` binary.
//
// Each test works in its own temp directory and points the config lookup
// there, so a real per-user pipeline.toml never leaks in.
//
// Run with: cargo test -p lubegrid-cli --test run_tests -- --nocapture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn lgrid(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lgrid"));
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("LUBEGRID_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be JSON: {e}\nstdout:\n{stdout}"))
}

/// Two weekly exports: comma-separated and semicolon-separated.
fn surveys(dir: &Path) -> (PathBuf, PathBuf) {
    let a = write(
        dir,
        "week1.csv",
        "Area,Asset number,Done?,Critical,Complicated,Comment\n\
         North,A1,No,C,,\n\
         North,B2,NLP,,,\n\
         South,C3,Question,,complicated,\n",
    );
    let b = write(
        dir,
        "week2.csv",
        "Asset number;Done?;Area\n\
         A1;Yes;North\n\
         D4;Not found;South\n",
    );
    (a, b)
}

// ===========================================================================
// lgrid run
// ===========================================================================

#[test]
fn run_json_preserves_first_file_precedence() {
    let tmp = TempDir::new().unwrap();
    let (a, b) = surveys(tmp.path());

    let output = lgrid(tmp.path())
        .args(["run", a.to_str().unwrap(), b.to_str().unwrap(), "--json", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val = json_stdout(&output);
    assert_eq!(val["summary"]["total_rows"], 5);
    assert_eq!(val["summary"]["duplicates_removed"], 1);
    assert_eq!(val["combined"].as_array().unwrap().len(), 4);
    assert_eq!(val["combined"][0]["raw_status"], "No");
    assert_eq!(val["todo"][0]["identifier"], "A1");
    assert_eq!(val["meta"]["preserve_order"], true);
    assert!(val["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn run_sort_lets_completed_row_win() {
    let tmp = TempDir::new().unwrap();
    let (a, b) = surveys(tmp.path());

    let output = lgrid(tmp.path())
        .args(["run", a.to_str().unwrap(), b.to_str().unwrap(), "--sort", "--json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val = json_stdout(&output);
    assert_eq!(val["meta"]["preserve_order"], false);
    assert_eq!(val["combined"][0]["identifier"], "A1");
    assert_eq!(val["combined"][0]["raw_status"], "Yes");
    assert!(val["todo"].as_array().unwrap().is_empty());
}

#[test]
fn run_prints_summary_to_stderr_only() {
    let tmp = TempDir::new().unwrap();
    let (a, b) = surveys(tmp.path());

    let output = lgrid(tmp.path())
        .args(["run", a.to_str().unwrap(), b.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "summary must not go to stdout");

    let err = stderr(&output);
    assert!(err.contains("5 row(s) from 2 file(s)"), "stderr: {err}");
    assert!(err.contains("no-lube-point 1"), "stderr: {err}");
}

#[test]
fn run_writes_output_and_exports() {
    let tmp = TempDir::new().unwrap();
    let (a, b) = surveys(tmp.path());
    let out_json = tmp.path().join("result.json");
    let out_dir = tmp.path().join("export");

    let output = lgrid(tmp.path())
        .args(["run", a.to_str().unwrap(), b.to_str().unwrap(), "-q"])
        .arg("--output")
        .arg(&out_json)
        .arg("--export-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_json).unwrap()).unwrap();
    assert_eq!(val["buckets"].as_array().unwrap().len(), 5);

    for name in [
        "combined",
        "done",
        "todo",
        "procedures-ready",
        "not-collected",
        "no-lube-point",
        "sampled",
        "questions",
    ] {
        assert!(out_dir.join(format!("{name}.csv")).is_file(), "missing {name}.csv");
    }
    let not_collected = fs::read_to_string(out_dir.join("not-collected.csv")).unwrap();
    assert_eq!(not_collected.lines().count(), 2);
    assert!(not_collected.lines().nth(1).unwrap().contains("Not Found"));
}

#[test]
fn run_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let output = lgrid(tmp.path())
        .args(["run", "does-not-exist.csv"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("does-not-exist.csv"));
}

#[test]
fn run_strict_fails_on_diagnostics() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "tags.csv", "Tag,Done?\nA1,Yes\nA1,No\n");

    let lenient = lgrid(tmp.path())
        .args(["run", csv.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(lenient.status.success());
    assert!(stderr(&lenient).contains("warning: Missing column: Asset number (dedupe skipped)"));

    let strict = lgrid(tmp.path())
        .args(["run", csv.to_str().unwrap(), "--strict"])
        .output()
        .unwrap();
    assert_eq!(strict.status.code(), Some(5));
}

#[test]
fn run_with_config_renames_columns() {
    let tmp = TempDir::new().unwrap();
    let csv = write(tmp.path(), "tags.csv", "Tag,State\nT1,complete\nT1,Open\nt1,Open\n");
    let config = write(
        tmp.path(),
        "site.toml",
        "[columns]\nidentifier = \"Tag\"\nstatus = \"State\"\n\n\
         [markers]\ndone = \"Complete\"\nnot_done = \"Open\"\n",
    );

    let output = lgrid(tmp.path())
        .args(["run", csv.to_str().unwrap(), "--case-insensitive", "--json", "-q"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val = json_stdout(&output);
    assert_eq!(val["combined"].as_array().unwrap().len(), 1);
    assert_eq!(val["combined"][0]["status"], "Done");
    assert_eq!(val["meta"]["case_insensitive"], true);
}

#[test]
fn run_picks_up_user_config() {
    let tmp = TempDir::new().unwrap();
    let user_dir = tmp.path().join(".config").join("lubegrid");
    fs::create_dir_all(&user_dir).unwrap();
    write(&user_dir, "pipeline.toml", "[options]\npreserve_order = false\n");
    let (a, b) = surveys(tmp.path());

    let output = lgrid(tmp.path())
        .args(["run", a.to_str().unwrap(), b.to_str().unwrap(), "--json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_stdout(&output)["meta"]["preserve_order"], false);
}

// ===========================================================================
// lgrid validate / config / schema
// ===========================================================================

#[test]
fn validate_reports_invalid_config() {
    let tmp = TempDir::new().unwrap();
    let bad = write(
        tmp.path(),
        "bad.toml",
        "[columns]\nidentifier = \"Done?\"\nstatus = \"Done?\"\n",
    );

    let output = lgrid(tmp.path()).arg("validate").arg(&bad).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("must differ"));
}

#[test]
fn default_config_round_trips_through_validate() {
    let tmp = TempDir::new().unwrap();
    let output = lgrid(tmp.path()).arg("config").output().unwrap();
    assert!(output.status.success());

    let printed = String::from_utf8_lossy(&output.stdout).into_owned();
    assert!(printed.contains("identifier = \"Asset number\""));
    let path = write(tmp.path(), "defaults.toml", &printed);

    let output = lgrid(tmp.path()).arg("validate").arg(&path).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("config OK"));
}

#[test]
fn schema_lists_internal_keys() {
    let tmp = TempDir::new().unwrap();
    let a = write(tmp.path(), "a.csv", "Asset number,Done?,Moteur,Moteur\nA1,No,111,AAA\n");
    let b = write(tmp.path(), "b.csv", "Asset number,Done?,Moteur\nA1,Yes,222\n");
    let empty = write(tmp.path(), "empty.csv", "Asset number,Extra\n");

    let output = lgrid(tmp.path())
        .args(["schema", a.to_str().unwrap(), empty.to_str().unwrap(), b.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val = json_stdout(&output);
    let keys: Vec<&str> = val
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["internal_key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["Asset number__occ1", "Done?__occ1", "Moteur__occ1", "Moteur__occ2"]);
}

#[test]
fn no_subcommand_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    let output = lgrid(tmp.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
