use feed_replay::error::RecordError;
use feed_replay::record::RecordSet;
use serde_json::json;
use std::path::PathBuf;

mod helpers;
use helpers::{create_temp_dir, write_records_file};

#[test]
fn test_load_array_document() {
    let temp_dir = create_temp_dir();
    let path = write_records_file(&temp_dir, "records.json", r#"[{"a": 1}, {"b": 2}, [3, 4]]"#);

    let records = RecordSet::load(&path).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records.get(0), Some(&json!({"a": 1})));
    assert_eq!(records.get(2), Some(&json!([3, 4])));
    assert_eq!(records.get(3), None);
}

#[test]
fn test_load_single_object_document() {
    let temp_dir = create_temp_dir();
    let path = write_records_file(&temp_dir, "snapshot.json", r#"{"book": {"bids": []}}"#);

    let records = RecordSet::load(&path).unwrap();

    assert_eq!(records.len(), 1);
}

#[test]
fn test_payloads_are_compact_and_keep_record_order() {
    let temp_dir = create_temp_dir();
    let path = write_records_file(
        &temp_dir,
        "records.json",
        "[\n  { \"z\": 1, \"a\": \"x y\" },\n  { \"k\": [1, 2] }\n]",
    );

    let payloads = RecordSet::load(&path).unwrap().payloads().unwrap();

    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].as_bytes(), br#"{"z":1,"a":"x y"}"#);
    assert_eq!(payloads[1].as_bytes(), br#"{"k":[1,2]}"#);
}

#[test]
fn test_empty_array_is_rejected_at_load() {
    let temp_dir = create_temp_dir();
    let path = write_records_file(&temp_dir, "empty.json", "[]");

    let err = RecordSet::load(&path).unwrap_err();

    assert!(matches!(err, RecordError::Empty { .. }));
    assert!(err.to_string().contains("empty.json"));
}

#[test]
fn test_missing_file_is_reported_with_path() {
    let path = PathBuf::from("/definitely/not/here/records.json");

    let err = RecordSet::load(&path).unwrap_err();

    assert!(matches!(err, RecordError::FileOpen { .. }));
    assert!(err.to_string().contains("records.json"));
}

#[test]
fn test_invalid_json_is_a_parse_error() {
    let temp_dir = create_temp_dir();
    let path = write_records_file(&temp_dir, "broken.json", r#"[{"a": 1},"#);

    let err = RecordSet::load(&path).unwrap_err();

    assert!(matches!(err, RecordError::Parse { .. }));
}

#[test]
fn test_sample_data_ships_with_the_crate() {
    let records = RecordSet::load(concat!(env!("CARGO_MANIFEST_DIR"), "/sample_data.json")).unwrap();
    assert!(!records.is_empty());
}

#[test]
fn test_multi_key_record_keeps_file_key_order() {
    let temp_dir = create_temp_dir();
    let path = write_records_file(
        &temp_dir,
        "quotes.json",
        r#"[{"symbol": "EURUSD", "bid": 1.08412, "ask": 1.08415, "seq": 1}]"#,
    );

    let payloads = RecordSet::load(&path).unwrap().payloads().unwrap();

    assert_eq!(
        String::from_utf8(payloads[0].as_bytes().to_vec()).unwrap(),
        r#"{"symbol":"EURUSD","bid":1.08412,"ask":1.08415,"seq":1}"#,
        "keys should go out in the order they appear in the file"
    );
}
