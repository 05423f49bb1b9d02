// SPDX-License-Identifier: AGPL-3.0-only
// Integration smoke tests for the CLI to ensure end-to-end flows keep working.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

const SAMPLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sample_order.log");

fn order_lines(sep: char) -> String {
    [
        "2024-01-01 10:00:00.000 Sending: 8=FIX.4.2|35=D|11=A|55=VOD|54=1|38=100|44=1.5|",
        "2024-01-01 10:00:01.000 Receiving: 8=FIX.4.2|35=8|11=A|37=O1|39=2|150=F|14=100|32=100|31=1.5|30=XLON|",
    ]
    .iter()
    .map(|l| format!("{}\n", l.replace('|', &sep.to_string())))
    .collect()
}

#[test]
fn text_report_for_sample_file() {
    cargo_bin_cmd!("fixaudit")
        .arg(SAMPLE)
        .assert()
        .success()
        .stdout(
            contains("Order Summary")
                .and(contains(
                    "5DLY0000030001 -> 5DLY000003000B -> 5DLY000003000K -> 5DLY000003000P",
                ))
                .and(contains("Canceled"))
                .and(contains("5DLY000003000B replaces 5DLY0000030001")),
        );
}

#[test]
fn reads_stdin_when_no_files_given() {
    cargo_bin_cmd!("fixaudit")
        .write_stdin(order_lines('\u{1}'))
        .assert()
        .success()
        .stdout(contains("(stdin)").and(contains("Filled")));
}

#[test]
fn message_listing_on_request() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", order_lines('|')).expect("write temp");
    cargo_bin_cmd!("fixaudit")
        .arg("--messages")
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("New Order Single").and(contains("LastMkt=XLON")));
}

#[test]
fn json_output_is_machine_readable() {
    let output = cargo_bin_cmd!("fixaudit")
        .args(["--format", "json", SAMPLE])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value[0]["summary"]["final_status"], "Canceled");
    assert_eq!(value[0]["summary"]["filled_qty"], 1600.0);
    assert_eq!(value[0]["chains"][0]["cl_ord_ids"][3], "5DLY000003000P");
}

#[test]
fn csv_output_has_header_and_rows() {
    let output = cargo_bin_cmd!("fixaudit")
        .args(["--format", "csv", SAMPLE])
        .output()
        .expect("run");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    let mut lines = text.lines();
    let header = lines.next().expect("header");
    assert!(header.starts_with("source,sequence,line_number"));
    assert_eq!(lines.count(), 27);
}

#[test]
fn delimiter_override_changes_precedence() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "35=D;11=X|Y;38=10").expect("write temp");
    cargo_bin_cmd!("fixaudit")
        .args(["--delimiter", "0x3b"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains("X|Y"));
}

#[test]
fn unreadable_input_sets_exit_code() {
    cargo_bin_cmd!("fixaudit")
        .args([SAMPLE, "/no/such/file.log"])
        .assert()
        .code(1)
        .stdout(contains("5DLY0000030001"))
        .stderr(contains("Cannot read /no/such/file.log"));
}

#[test]
fn bad_arguments_are_rejected() {
    cargo_bin_cmd!("fixaudit")
        .args(["--format", "xml"])
        .assert()
        .failure();
    cargo_bin_cmd!("fixaudit")
        .args(["--delimiter", "ab"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(contains("delimiter must be a single character"));
}

#[test]
fn version_banner() {
    cargo_bin_cmd!("fixaudit")
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("fixaudit ").and(contains("commit:")));
}
