use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn run(config_dir: &Path, args: &[&str]) -> std::process::Output {
    let config = config_dir.join("hades.toml");
    fs::write(&config, "").unwrap();
    Command::new(env!("CARGO_BIN_EXE_hades"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("HADES_DIR")
        .env_remove("HADES_LEVEL")
        .env_remove("HADES_FLAGS")
        .output()
        .expect("failed to run hades")
}

#[test]
fn logs_record_to_stdout() {
    let tmp_dir = TempDir::new().unwrap();
    let output = run(tmp_dir.path(), &["--no-highlight", "info", "net", "up", "ok"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[INFO] net >  up  ok"));
}

#[test]
fn fatal_with_exit_code_exits_with_it() {
    let tmp_dir = TempDir::new().unwrap();
    let output = run(tmp_dir.path(), &["--exit", "3", "fatal", "x"]);
    assert_eq!(output.status.code(), Some(3));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("x"));
}

#[test]
fn exit_code_applies_to_any_level() {
    let tmp_dir = TempDir::new().unwrap();
    let output = run(tmp_dir.path(), &["--exit", "4", "warn", "x"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn writes_log_file_in_dir() {
    let tmp_dir = TempDir::new().unwrap();
    let logs = tmp_dir.path().join("logs");
    let output = run(
        tmp_dir.path(),
        &["--dir", logs.to_str().unwrap(), "--name", "job", "--no-highlight", "warn", "db", "slow"],
    );
    assert!(output.status.success());
    let content = fs::read_to_string(logs.join("job.log")).unwrap();
    assert!(content.ends_with("[WARN] db >  slow\n"));
}

#[test]
fn threshold_is_not_a_record_level() {
    let tmp_dir = TempDir::new().unwrap();
    let output = run(tmp_dir.path(), &["all", "x"]);
    assert!(!output.status.success());
}

#[test]
fn bad_options_file_fails() {
    let tmp_dir = TempDir::new().unwrap();
    let config = tmp_dir.path().join("bad.toml");
    fs::write(&config, "no_such_key = 1").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_hades"))
        .arg("--config")
        .arg(&config)
        .args(["info", "x"])
        .output()
        .expect("failed to run hades");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error loading options"));
}
