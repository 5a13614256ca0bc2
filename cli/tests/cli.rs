use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const CODES_LAYOUT: &str = r#"{
    "root": "Code",
    "repeated": true,
    "records": {
        "Code": { "fields": [
            { "name": "letters", "position": 0, "width": 3, "pad": " ", "align": "left" },
            { "name": "digits", "position": 1, "width": 3, "codec": "integer" }
        ] }
    }
}"#;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/fixtures")
        .join(name)
}

fn codes_layout(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("codes.layout.json");
    write_file(&path, CODES_LAYOUT);
    path
}

#[test]
fn decode_auto_detects_text_input() {
    let dir = TempDir::new().expect("tempdir");
    let layout = codes_layout(&dir);
    let input = dir.path().join("codes.txt");
    write_file(&input, "ABC001\nXY 042\n");

    let expected = "[\n  {\n    \"letters\": \"ABC\",\n    \"digits\": 1\n  },\n  {\n    \"letters\": \"XY \",\n    \"digits\": 42\n  }\n]";

    cargo_bin_cmd!("fwf")
        .arg("--layout")
        .arg(&layout)
        .arg(&input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn encode_auto_detects_json() {
    let dir = TempDir::new().expect("tempdir");
    let layout = codes_layout(&dir);
    let input = dir.path().join("codes.json");
    write_file(&input, r#"[{"letters":"AB","digits":7},{"letters":"XYZ","digits":99}]"#);

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .arg(&input)
        .assert()
        .success()
        .stdout("AB 007\nXYZ099");
}

#[test]
fn encode_with_crlf() {
    let dir = TempDir::new().expect("tempdir");
    let layout = codes_layout(&dir);

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .args(["--encode", "--crlf"])
        .write_stdin(r#"[{"letters":"A","digits":1},{"letters":"B","digits":2}]"#)
        .assert()
        .success()
        .stdout("A  001\r\nB  002");
}

#[test]
fn stdin_defaults_to_decode_with_compact_json() {
    let dir = TempDir::new().expect("tempdir");
    let layout = codes_layout(&dir);

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .args(["--indent", "0"])
        .write_stdin("ABC123")
        .assert()
        .success()
        .stdout(r#"[{"letters":"ABC","digits":123}]"#);
}

#[test]
fn empty_collection_flag() {
    let dir = TempDir::new().expect("tempdir");
    let layout = codes_layout(&dir);

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .write_stdin("not a code line")
        .assert()
        .failure()
        .stderr(contains("ERROR").and(contains("matched no lines")));

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .arg("--allow-empty-collections")
        .write_stdin("not a code line")
        .assert()
        .failure()
        .stderr(contains("contains no Code record"));
}

#[test]
fn deny_trailing_lines_flag() {
    let dir = TempDir::new().expect("tempdir");
    let layout = codes_layout(&dir);

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .arg("--deny-trailing-lines")
        .write_stdin("ABC123\ntrailer")
        .assert()
        .failure()
        .stderr(contains("line 2"));
}

#[test]
fn positive_pay_round_trip_through_files() {
    let dir = TempDir::new().expect("tempdir");
    let layout = fixture("positive_pay.layout.json");
    let json_path = dir.path().join("pay.json");
    let text_path = dir.path().join("pay.txt");

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .arg(fixture("positive_pay.txt"))
        .arg("-o")
        .arg(&json_path)
        .assert()
        .success()
        .stdout(contains("Decoded"));

    let json = fs::read_to_string(&json_path).expect("read json");
    assert!(json.contains("\"payee\": \"T & T TESTPAYEE, L.P\""));

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .arg(&json_path)
        .arg("--crlf")
        .arg("-o")
        .arg(&text_path)
        .assert()
        .success()
        .stdout(contains("Encoded"));

    let original = fs::read_to_string(fixture("positive_pay.txt")).expect("read fixture");
    let encoded = fs::read_to_string(&text_path).expect("read output");
    assert_eq!(encoded, original.trim_end_matches("\r\n"));
}

#[test]
fn invalid_layout_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let layout = dir.path().join("bad.layout.json");
    write_file(
        &layout,
        r#"{ "root": "R", "records": { "R": { "fields": [ { "name": "x", "position": 0, "width": 2, "codec": "money" } ] } } }"#,
    );

    cargo_bin_cmd!("fwf")
        .arg("-l")
        .arg(&layout)
        .write_stdin("ab")
        .assert()
        .failure()
        .stderr(contains("unknown codec"));
}
