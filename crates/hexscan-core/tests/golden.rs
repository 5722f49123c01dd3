use std::fs;
use std::path::Path;

use hexscan_core::{Report, decode_hex_file};

fn load_expected_report(dir: &str) -> Report {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let expected_path = root.join(dir).join("expected_report.json");

    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(dir: &str) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let input = root.join(dir).join("input.hex");
    let expected = load_expected_report(dir);

    let mut actual = decode_hex_file(&input).expect("decode hex file");
    actual.generated_at = expected.generated_at.clone();
    actual.input.path = expected.input.path.clone();

    let actual_value = serde_json::to_value(actual).expect("serialize actual");
    let expected_value = serde_json::to_value(expected).expect("serialize expected");

    assert_eq!(actual_value, expected_value, "golden mismatch in {dir}");
}

#[test]
fn golden_basic() {
    run_golden("tests/golden/basic");
}

#[test]
fn golden_segmented() {
    run_golden("tests/golden/segmented");
}

#[test]
fn golden_segmented_has_address_bounds() {
    let report = load_expected_report("tests/golden/segmented");
    assert_eq!(report.summary.records_total, 3);
    assert_eq!(report.summary.address_min, Some(0x0100));
    assert_eq!(report.summary.address_max, Some(0x011F));
}
