use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_worldpop")
}

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/population.csv")
}

fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("worldpop-cli-{name}-{stamp}"))
}

fn worldpop(image_dir: &Path) -> Command {
    let mut command = Command::new(bin());
    command
        .env("WORLDPOP_DATA", fixture())
        .env("WORLDPOP_IMG_DIR", image_dir)
        .env("RUST_LOG", "off");
    command
}

fn run(image_dir: &Path, args: &[&str]) -> Output {
    worldpop(image_dir).args(args).output().expect("worldpop should run")
}

#[test]
fn missing_command_prints_usage() {
    let dir = unique_temp_dir("usage");
    let output = run(&dir, &[]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: worldpop"));
}

#[test]
fn bar_command_writes_chart_and_prints_path() {
    let dir = unique_temp_dir("bar");
    let output = run(&dir, &["bar", "colombia"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("bar_Colombia.png"), "{stdout}");
    assert!(dir.join("bar_Colombia.png").is_file());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn bar_command_joins_multi_word_names() {
    let dir = unique_temp_dir("bar-words");
    let output = run(&dir, &["bar", "south", "africa"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(dir.join("bar_South_Africa.png").is_file());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn bar_command_for_unknown_country_fails() {
    let dir = unique_temp_dir("bar-missing");
    let output = run(&dir, &["bar", "atlantis"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no data found"), "{stderr}");
}

#[test]
fn pie_command_accepts_top_n() {
    let dir = unique_temp_dir("pie");
    let output = run(&dir, &["pie", "south_america", "2"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(dir.join("pie_South_America.png").is_file());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn pie_command_joins_multi_word_continents() {
    let dir = unique_temp_dir("pie-words");
    let output = run(&dir, &["pie", "south", "america", "2"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("pie_South_America.png"), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("invalid top_n"), "{stderr}");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_dataset_stops_before_running() {
    let dir = unique_temp_dir("no-data");
    let output = worldpop(&dir)
        .env("WORLDPOP_DATA", dir.join("absent.csv"))
        .args(["bar", "colombia"])
        .output()
        .expect("worldpop should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("data source error"), "{stderr}");
}

#[test]
fn interactive_session_exits_cleanly() {
    let dir = unique_temp_dir("interactive");
    let mut child = worldpop(&dir)
        .arg("interactive")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("worldpop should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"line\nbar\nperu\nexit\n")
        .expect("script should be written");

    let output = child.wait_with_output().expect("worldpop should finish");
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Invalid chart type"));
    assert!(stdout.contains("Generated bar chart"));
    assert!(dir.join("bar_Peru.png").is_file());

    let _ = std::fs::remove_dir_all(dir);
}
