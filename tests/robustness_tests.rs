use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_malformed_csv_rejected() {
    let output_path = std::path::PathBuf::from("robustness_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["trip", "expense", "payer", "amount", "participant", "share"])
        .unwrap();
    wtr.write_record(["beach", "e1", "A", "10", "B", "5"]).unwrap();
    // Text in share field
    wtr.write_record(["beach", "e2", "A", "10", "B", "not_a_number"])
        .unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("tripsplit"));
    cmd.arg(&output_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CSV error"))
        .stdout(predicate::str::is_empty());

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_negative_share_rejected() {
    let output_path = std::path::PathBuf::from("negative_share_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["trip", "expense", "payer", "amount", "participant", "share"])
        .unwrap();
    wtr.write_record(["beach", "e1", "A", "10", "B", "-5"]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("tripsplit"));
    cmd.arg(&output_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("negative share"));

    std::fs::remove_file(output_path).ok();
}

#[test]
fn test_missing_payer_rejected() {
    let output_path = std::path::PathBuf::from("missing_payer_test.csv");
    let mut wtr = csv::Writer::from_path(&output_path).unwrap();
    wtr.write_record(["trip", "expense", "payer", "amount", "participant", "share"])
        .unwrap();
    wtr.write_record(["beach", "e1", "", "10", "B", "5"]).unwrap();
    wtr.flush().unwrap();
    drop(wtr);

    let mut cmd = Command::new(cargo_bin!("tripsplit"));
    cmd.arg(&output_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("has no payer"));

    std::fs::remove_file(output_path).ok();
}
