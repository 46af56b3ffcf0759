use std::fs;
use std::path::Path;

use tempfile::TempDir;
use weekly_baskets::{run_to_directory, Error, PipelineConfig};

fn fixture_config(output: &Path) -> PipelineConfig {
    PipelineConfig::default().with_overrides(
        Some("test-inputs/customers.csv".into()),
        Some("test-inputs/products.csv".into()),
        Some("test-inputs/transactions".into()),
        Some(output.to_path_buf()),
    )
}

fn written_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn writes_one_report_per_week_window() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("outputs");

    let summary = run_to_directory(fixture_config(&output)).unwrap();

    assert_eq!(summary.sources, 2);
    assert_eq!(summary.skipped_lines, 1);
    assert_eq!(summary.rows, 8);
    assert_eq!(summary.windows, 3);
    assert_eq!(summary.reports_written, 3);
    assert_eq!(summary.failed_windows, 0);
    assert_eq!(
        written_files(&output),
        vec![
            "Week_2021-01-03.json",
            "Week_2021-01-10.json",
            "Week_2021-01-12.json"
        ]
    );
}

#[test]
fn first_window_groups_customers_in_natural_order() {
    let temp_dir = TempDir::new().unwrap();
    run_to_directory(fixture_config(temp_dir.path())).unwrap();

    let body = fs::read_to_string(temp_dir.path().join("Week_2021-01-03.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report.as_object().unwrap().len(), 3);

    // serde_json::Value sorts keys, so check order on the raw text
    let c1 = body.find("\"C1\"").unwrap();
    let c2 = body.find("\"C2\"").unwrap();
    let c12 = body.find("\"C12\"").unwrap();
    assert!(c1 < c2 && c2 < c12);

    assert_eq!(report["C2"]["purchase_count"], 2);
    assert_eq!(report["C2"]["loyalty_score"], 3);
    assert_eq!(report["C2"]["product_id"], serde_json::json!(["P01", "P02"]));
    assert_eq!(
        report["C2"]["product_category"],
        serde_json::json!(["fruit_veg", "house"])
    );
}

#[test]
fn unmatched_references_serialize_as_null() {
    let temp_dir = TempDir::new().unwrap();
    run_to_directory(fixture_config(temp_dir.path())).unwrap();

    let body = fs::read_to_string(temp_dir.path().join("Week_2021-01-10.json")).unwrap();
    let expected = r#"{
    "C1": {
        "purchase_count": 2,
        "loyalty_score": 7,
        "product_id": [
            "P01",
            "P99"
        ],
        "product_category": [
            "fruit_veg",
            null
        ]
    },
    "C9": {
        "purchase_count": 1,
        "loyalty_score": null,
        "product_id": [
            "P02"
        ],
        "product_category": [
            "house"
        ]
    }
}"#;
    assert_eq!(body, expected);
}

#[test]
fn rerun_is_byte_identical() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    run_to_directory(fixture_config(first.path())).unwrap();
    run_to_directory(fixture_config(second.path())).unwrap();

    let names = written_files(first.path());
    assert_eq!(names, written_files(second.path()));
    for name in names {
        assert_eq!(
            fs::read(first.path().join(&name)).unwrap(),
            fs::read(second.path().join(&name)).unwrap(),
            "{name} differs between runs"
        );
    }
}

#[test]
fn duplicate_reference_keys_abort_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let customers = temp_dir.path().join("customers.csv");
    fs::write(&customers, "customer_id,loyalty_score\nC1,7\nC1,8\n").unwrap();
    let output = temp_dir.path().join("outputs");

    let mut config = fixture_config(&output);
    config.customers_location = customers;

    let err = run_to_directory(config).unwrap_err();

    assert!(matches!(
        err,
        Error::DuplicateReferenceKey { table: "customer", .. }
    ));
    assert!(!output.exists());
}

#[test]
fn single_sunday_dataset_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("transactions").join("d=2021-01-03");
    fs::create_dir_all(&source).unwrap();
    fs::write(
        source.join("transactions.json"),
        r#"{"customer_id": "C1", "basket": [{"product_id": "P01", "price": 1.0}], "date_of_purchase": "2021-01-03 10:00:00"}"#,
    )
    .unwrap();
    let output = temp_dir.path().join("outputs");

    let mut config = fixture_config(&output);
    config.transactions_location = temp_dir.path().join("transactions");

    let summary = run_to_directory(config).unwrap();

    assert_eq!(summary.rows, 1);
    assert_eq!(summary.windows, 0);
    assert_eq!(summary.reports_written, 0);
    assert!(!output.exists());
}

#[test]
fn badly_encoded_line_is_skipped_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("transactions").join("d=2021-01-05");
    fs::create_dir_all(&source).unwrap();
    let mut body = Vec::new();
    body.extend_from_slice(
        br#"{"customer_id": "C1", "basket": [{"product_id": "P01", "price": 1.0}], "date_of_purchase": "2021-01-05 10:00:00"}"#,
    );
    body.extend_from_slice(b"\n\xff\xfe garbage\n");
    body.extend_from_slice(
        br#"{"customer_id": "C2", "basket": [{"product_id": "P02", "price": 3.5}], "date_of_purchase": "2021-01-06 10:00:00"}"#,
    );
    fs::write(source.join("transactions.json"), body).unwrap();
    let output = temp_dir.path().join("outputs");

    let mut config = fixture_config(&output);
    config.transactions_location = temp_dir.path().join("transactions");

    let summary = run_to_directory(config).unwrap();

    assert_eq!(summary.skipped_lines, 1);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.reports_written, 1);
    assert_eq!(written_files(&output), vec!["Week_2021-01-06.json"]);
}

#[test]
fn blank_reference_cells_serialize_as_null() {
    let temp_dir = TempDir::new().unwrap();
    let customers = temp_dir.path().join("customers.csv");
    fs::write(&customers, "customer_id,loyalty_score\nC1,\nC2,3\nC4,9\nC12,1\n").unwrap();
    let products = temp_dir.path().join("products.csv");
    fs::write(&products, "product_id,product_category\nP01,\nP02,house\nP04,dairy\n").unwrap();

    let mut config = fixture_config(temp_dir.path());
    config.customers_location = customers;
    config.products_location = products;

    run_to_directory(config).unwrap();

    let body = fs::read_to_string(temp_dir.path().join("Week_2021-01-03.json")).unwrap();
    let report: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(report["C1"]["loyalty_score"], serde_json::Value::Null);
    assert_eq!(report["C1"]["product_category"], serde_json::json!(["dairy"]));
    assert_eq!(
        report["C2"]["product_category"],
        serde_json::json!([null, "house"])
    );
}
