#![cfg(all(unix, feature = "cli"))]

use std::path::Path;
use std::process::{Command, Output};

// Nothing listens on the discard port, so score requests fail fast.
const DEAD_SERVICE: &str = "http://127.0.0.1:9";

fn gpiocomm(state_file: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gpiocomm"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("--service-root")
        .arg(DEAD_SERVICE)
        .arg("--request-timeout")
        .arg("3s")
        .arg("--state-file")
        .arg(state_file)
        .args(args)
        .output()
        .expect("gpiocomm should run")
}

fn stdout_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

fn responses(output: &Output) -> Vec<Vec<u8>> {
    stdout_lines(output)
        .into_iter()
        .map(|line| serde_json::from_value(line["response"].clone()).expect("response bytes"))
        .collect()
}

#[test]
fn send_initialize_reports_no_replay() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");

    let output = gpiocomm(&state, &["send", "initialize"]);

    assert!(output.status.success(), "{output:?}");
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["tag_name"], "initialize");
    assert_eq!(responses(&output), vec![vec![1, 1, 0]]);
}

#[test]
fn record_script_persists_replay_for_later_runs() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");
    let record = dir.path().join("record.txt");
    std::fs::write(
        &record,
        "\
# record a short run and submit it
startRecord 1 2
recordFrame 5
recordFrame 9
endRecord 100 0 0 0 1 2 3
",
    )
    .expect("script should be writable");

    let output = gpiocomm(&state, &["run", record.to_str().expect("utf8 path")]);
    assert!(output.status.success(), "{output:?}");
    let recorded = responses(&output);
    assert_eq!(recorded.len(), 4);
    assert_eq!(recorded[0].len(), 17);
    assert_eq!(&recorded[1..], &[vec![4], vec![4], vec![5]]);

    let stored = std::fs::read_to_string(&state).expect("state file should exist");
    assert!(stored.contains("gpiocomm_replay"));
    assert!(stored.contains("gpiocomm_host"));

    let replay = dir.path().join("replay.txt");
    std::fs::write(
        &replay,
        "initialize\nstartReplay\nreplayFrame\nreplayFrame\nreplayFrame\n",
    )
    .expect("script should be writable");

    let output = gpiocomm(&state, &["run", replay.to_str().expect("utf8 path")]);
    assert!(output.status.success(), "{output:?}");
    let replayed = responses(&output);
    assert_eq!(replayed[0], vec![1, 1, 1]);
    assert_eq!(replayed[1].len(), 19);
    assert_eq!(&replayed[1][1..17], &recorded[0][1..]);
    assert_eq!(&replayed[1][17..], &[1, 2]);
    assert_eq!(&replayed[2..], &[vec![6, 5], vec![6, 9], vec![6]]);
}

#[test]
fn poll_reports_failed_score_fetch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");
    let script = dir.path().join("scores.txt");
    std::fs::write(&script, "checkScores 1\nloadScores 1\npoll checkScores 1\n")
        .expect("script should be writable");

    let output = gpiocomm(&state, &["run", script.to_str().expect("utf8 path")]);

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        responses(&output),
        vec![vec![8], vec![7], vec![8, 0xFF]]
    );
}

#[test]
fn unanswered_requests_have_size_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");

    let cases: [&[&str]; 3] = [
        &["send", "startReplay"],
        &["send", "99", "1"],
        &["send", "recordFrame", "1"],
    ];
    for args in cases {
        let output = gpiocomm(&state, args);
        assert!(output.status.success(), "{output:?}");
        let lines = stdout_lines(&output);
        assert_eq!(lines[0]["response_size"], 0);
    }
}

#[test]
fn bad_script_line_is_usage_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");
    let script = dir.path().join("bad.txt");
    std::fs::write(&script, "initialize\nwait forever\n").expect("script should be writable");

    let output = gpiocomm(&state, &["run", script.to_str().expect("utf8 path")]);

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));
}

#[test]
fn corrupt_state_file_is_invalid_data() {
    let dir = tempfile::tempdir().expect("temp dir");
    let state = dir.path().join("state.json");
    std::fs::write(&state, "not json").expect("state should be writable");

    let output = gpiocomm(&state, &["send", "initialize"]);

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_gpiocomm"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("gpiocomm {}", env!("CARGO_PKG_VERSION")));
}
