#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const VOLTAGE_FRAME: &str = "42520200b20400008813e701";
const ASCII_FRAME: &str = "425202000300000068696a01";

fn brping(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_brping"))
        .args(args)
        .env_remove("BRPING_REGISTRY")
        .env_remove("BRPING_LOG")
        .output()
        .expect("brping should run")
}

fn brping_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_brping"))
        .args(args)
        .env_remove("BRPING_REGISTRY")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("brping should spawn");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");
    child.wait_with_output().expect("brping should finish")
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "brping-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

fn stdout_json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn decode_prints_fields_as_json() {
    let output = brping(&["decode", VOLTAGE_FRAME, "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = stdout_json_lines(&output);
    assert_eq!(lines.len(), 1);
    let message = &lines[0];
    assert_eq!(message["message_id"], 1202);
    assert_eq!(message["name"], "voltage_5");
    assert_eq!(message["payload_length"], 2);
    assert_eq!(message["fields"]["voltage_5"], 5000);
    assert_eq!(message["checksum"], 0x01e7);
    assert_eq!(message["checksum_valid"], true);
    assert_eq!(message["frame"], VOLTAGE_FRAME);
}

#[test]
fn decode_rejects_bad_checksum_unless_told_not_to() {
    let corrupt = "42520200b20400008813e702";
    let output = brping(&["decode", corrupt, "--format", "json"]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("checksum mismatch"));

    let output = brping(&["decode", corrupt, "--no-verify", "--format", "json"]);
    assert!(output.status.success());
    let lines = stdout_json_lines(&output);
    assert_eq!(lines[0]["checksum_valid"], false);
}

#[test]
fn decode_bytes_field_as_hex() {
    let output = brping(&["decode", ASCII_FRAME, "--format", "json"]);
    assert!(output.status.success());
    let lines = stdout_json_lines(&output);
    assert_eq!(lines[0]["name"], "ascii_text");
    assert_eq!(lines[0]["fields"]["ascii_message"], "6869");
}

#[test]
fn decode_unknown_message_id_is_data_error() {
    let output = brping(&["decode", "42520000e703000003ff", "--format", "json"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn encode_builds_frame_from_assignments() {
    let output = brping(&[
        "encode",
        "set_ping_interval",
        "ping_interval=40",
        "--src",
        "1",
        "--format",
        "json",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines = stdout_json_lines(&output);
    assert_eq!(lines[0]["message_id"], 1004);
    assert_eq!(lines[0]["frame"], "42520200ec0301002800ae01");
}

#[test]
fn encode_accepts_numeric_id_and_rejects_unknown_field() {
    let output = brping(&["encode", "1202", "voltage_5=5000", "--format", "json"]);
    assert!(output.status.success());
    assert_eq!(stdout_json_lines(&output)[0]["frame"], VOLTAGE_FRAME);

    let output = brping(&["encode", "voltage_5", "current=1", "--format", "json"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn request_frame_has_empty_payload() {
    let output = brping(&["request", "voltage_5", "--format", "json"]);
    assert!(output.status.success());
    assert_eq!(stdout_json_lines(&output)[0]["frame"], "42520000b20400004a01");
}

#[test]
fn parse_skips_noise_and_corrupt_frames() {
    let mut stream = b"noise".to_vec();
    stream.extend(hex::decode(VOLTAGE_FRAME).unwrap());
    stream.extend(hex::decode("42520200b20400008813e702").unwrap());
    stream.extend(hex::decode(ASCII_FRAME).unwrap());

    let path = unique_temp_file("parse");
    std::fs::write(&path, &stream).expect("input should be writable");
    let output = brping(&["parse", path.to_str().unwrap(), "--format", "json"]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let lines = stdout_json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["name"], "voltage_5");
    assert_eq!(lines[1]["name"], "ascii_text");
    assert_eq!(lines[2]["parsed"], 2);
    assert_eq!(lines[2]["errors"], 1);
}

#[test]
fn parse_hex_stdin_stops_after_count() {
    let input = format!("{VOLTAGE_FRAME}\n{ASCII_FRAME}\n");
    let output = brping_with_stdin(
        &["parse", "--hex", "--count", "1", "--format", "json"],
        input.as_bytes(),
    );
    assert!(output.status.success());
    let lines = stdout_json_lines(&output);
    assert_eq!(lines[0]["name"], "voltage_5");
    assert_eq!(lines[1]["parsed"], 1);
}

#[test]
fn parse_prints_request_frames_as_received() {
    let request = "42520000b20400004a01";
    let output = brping_with_stdin(&["parse", "--hex", "--format", "json"], request.as_bytes());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = stdout_json_lines(&output);
    assert_eq!(lines[0]["name"], "voltage_5");
    assert_eq!(lines[0]["payload_length"], 0);
    assert_eq!(lines[0]["checksum_valid"], true);
    assert_eq!(lines[0]["frame"], request);
}

#[test]
fn schemas_lists_builtin_table() {
    let output = brping(&["schemas", "--format", "json"]);
    assert!(output.status.success());
    let lines = stdout_json_lines(&output);
    let entries = lines[0].as_array().expect("schemas should be a JSON array");
    assert_eq!(entries.len(), 31);
    assert!(entries.iter().any(|entry| entry["name"] == "profile"));
}

#[test]
fn registry_file_replaces_builtin_table() {
    let path = unique_temp_file("registry");
    std::fs::write(
        &path,
        r#"{"messages": [{"id": 9000, "name": "temperature", "fields": [{"name": "celsius", "type": "i16"}]}]}"#,
    )
    .expect("registry should be writable");

    let registry = path.to_str().unwrap();
    let output = brping(&[
        "--registry",
        registry,
        "encode",
        "temperature",
        "celsius=-5",
        "--format",
        "json",
    ]);
    let missing = brping(&["--registry", registry, "decode", VOLTAGE_FRAME, "--format", "json"]);
    let request = brping(&["--registry", registry, "request", "temperature", "--format", "json"]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json_lines(&output)[0]["message_id"], 9000);
    assert!(request.status.success(), "stderr: {}", String::from_utf8_lossy(&request.stderr));
    assert_eq!(stdout_json_lines(&request)[0]["frame"], "4252000028230000df00");
    assert_eq!(missing.status.code(), Some(60));
}
