#![recursion_limit = "256"]

// Statistics document decoding: typed fields, positional pies, fault tolerance

mod common;

use serde_json::json;
use tdarr_exporter::decoder::{decode_pie, decode_pies, decode_snapshot};
use tdarr_exporter::error::DecodeError;
use tdarr_exporter::models::{Breakdown, BreakdownEntry, PieFault, PieFaultKind};

#[test]
fn test_decode_snapshot_maps_top_level_fields() {
    let snapshot = decode_snapshot(&common::sample_body()).expect("decode");
    assert_eq!(snapshot.id, "statistics");
    assert_eq!(snapshot.total_file_count, 1520);
    assert_eq!(snapshot.total_transcode_count, 310);
    assert_eq!(snapshot.total_health_check_count, 1480);
    assert_eq!(snapshot.size_diff, -812.25);
    assert_eq!(snapshot.db_fetch_time, "1.5s");
    assert_eq!(snapshot.db_load_status, "Stable");
    assert_eq!(snapshot.db_queue, 4);
    assert_eq!(snapshot.tdarr_score, "87.5");
    assert_eq!(snapshot.health_check_score, "97.37");
    assert_eq!(snapshot.table_counts(), [10, 11, 12, 13, 14, 15, 16]);
    assert_eq!(snapshot.table_viewable_counts(), [20, 21, 22, 23, 24, 25, 26]);
    assert_eq!(snapshot.stream_stats.duration.highest, 10800.0);
    assert_eq!(snapshot.stream_stats.bit_rate.total, 9_880_000_000.0);
    assert_eq!(snapshot.stream_stats.nb_frames.average, 64800.0);
    assert_eq!(snapshot.avg_number_of_streams_in_video, 3.4);
    assert_eq!(snapshot.languages["eng"].count, 1400);
    assert_eq!(snapshot.languages["jpn"].count, 120);
    assert!(!snapshot.process_warning_queues);
}

#[test]
fn test_decode_snapshot_builds_categories_in_source_order() {
    let snapshot = decode_snapshot(&common::sample_body()).expect("decode");
    assert!(snapshot.pie_faults.is_empty());
    let names: Vec<&str> = snapshot
        .categories
        .iter()
        .map(|c| c.library.as_str())
        .collect();
    assert_eq!(names, ["Movies", "TV"]);

    let movies = &snapshot.categories[0];
    assert_eq!(movies.id, "lib1");
    assert_eq!(movies.total_file_count, 1000);
    assert_eq!(movies.size_diff, -500.5);
    assert_eq!(
        movies.video_codec,
        vec![BreakdownEntry::new("hevc", 700), BreakdownEntry::new("h264", 300)]
    );
    assert_eq!(movies.audio_container, vec![BreakdownEntry::new("mkv", 1000)]);
    assert_eq!(movies.breakdown_len(), 13);
}

#[test]
fn test_decode_snapshot_defaults_missing_fields() {
    let snapshot = decode_snapshot(br#"{"totalFileCount": 3}"#).expect("decode");
    assert_eq!(snapshot.total_file_count, 3);
    assert_eq!(snapshot.db_queue, 0);
    assert!(snapshot.db_fetch_time.is_empty());
    assert!(snapshot.languages.is_empty());
    assert!(snapshot.categories.is_empty());
}

#[test]
fn test_decode_snapshot_accepts_null_pies() {
    let snapshot = decode_snapshot(br#"{"pies": null}"#).expect("decode");
    assert!(snapshot.categories.is_empty());
}

#[test]
fn test_decode_snapshot_rejects_malformed_json() {
    let err = decode_snapshot(b"{\"totalFileCount\": ").unwrap_err();
    assert!(matches!(err, DecodeError::Body(_)));
}

#[test]
fn test_decode_snapshot_treats_null_fields_as_zero_values() {
    let mut doc = common::sample_document();
    doc["_id"] = json!(null);
    doc["processWarning"] = json!(null);
    doc["languages"] = json!(null);
    doc["DBQueue"] = json!(null);
    doc["streamStats"]["bit_rate"] = json!(null);
    let snapshot = decode_snapshot(&serde_json::to_vec(&doc).unwrap()).expect("decode");
    assert!(snapshot.id.is_empty());
    assert!(snapshot.process_warning.is_empty());
    assert!(snapshot.languages.is_empty());
    assert_eq!(snapshot.db_queue, 0);
    assert_eq!(snapshot.stream_stats.bit_rate.total, 0.0);
    assert_eq!(snapshot.total_file_count, 1520);
    assert_eq!(snapshot.categories.len(), 2);
}

#[test]
fn test_decode_snapshot_rejects_type_mismatch_in_declared_field() {
    let mut doc = common::sample_document();
    doc["totalFileCount"] = json!("many");
    let err = decode_snapshot(&serde_json::to_vec(&doc).unwrap()).unwrap_err();
    assert!(matches!(err, DecodeError::Body(_)));

    let mut doc = common::sample_document();
    doc["tdarrScore"] = json!(87.5);
    assert!(decode_snapshot(&serde_json::to_vec(&doc).unwrap()).is_err());
}

#[test]
fn test_decode_snapshot_rejects_non_array_pies() {
    let err = decode_snapshot(br#"{"pies": "none"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::Body(_)));
}

#[test]
fn test_malformed_pies_do_not_fail_the_document() {
    let mut doc = common::sample_document();
    let pies = doc["pies"].as_array_mut().unwrap();
    pies.insert(0, json!("not a pie"));
    pies.insert(2, json!(["Short", "lib9", 1, 2, 3.0, 4]));
    pies.push(json!([7, "lib3", 1, 1, 1.0, 1, []]));

    let snapshot = decode_snapshot(&serde_json::to_vec(&doc).unwrap()).expect("decode");
    let names: Vec<&str> = snapshot
        .categories
        .iter()
        .map(|c| c.library.as_str())
        .collect();
    assert_eq!(names, ["Movies", "TV"]);
    assert_eq!(
        snapshot.pie_faults,
        vec![
            PieFault {
                pie: 0,
                kind: PieFaultKind::NotAnArray
            },
            PieFault {
                pie: 2,
                kind: PieFaultKind::TooShort { len: 6 }
            },
            PieFault {
                pie: 4,
                kind: PieFaultKind::FieldType {
                    position: 0,
                    expected: "string"
                }
            },
        ]
    );
}

#[test]
fn test_documented_pie_example() {
    let pie = json!([
        "Movies", "lib1", 100, 40, 12345.6, 3,
        [[{"name": "healthy", "value": 5}]],
        [], [], [], [], [], []
    ]);
    let mut faults = Vec::new();
    let record = decode_pie(&pie, &mut faults).expect("record");
    assert!(faults.is_empty());
    assert_eq!(record.library, "Movies");
    assert_eq!(record.id, "lib1");
    assert_eq!(record.total_file_count, 100);
    assert_eq!(record.total_transcode_count, 40);
    assert_eq!(record.size_diff, 12345.6);
    assert_eq!(record.total_health_check_count, 3);
    assert_eq!(record.transcode_status, vec![BreakdownEntry::new("healthy", 5)]);
    for kind in Breakdown::ALL.into_iter().skip(1) {
        assert!(record.breakdown(kind).is_empty(), "{kind} should be empty");
    }
}

#[test]
fn test_flat_and_nested_slots_decode_identically() {
    let flat = json!(["M", "l", 1, 1, 1.0, 1, [{"name": "healthy", "value": 5}]]);
    let nested = json!(["M", "l", 1, 1, 1.0, 1, [[{"name": "healthy", "value": 5}]]]);
    let mut faults = Vec::new();
    assert_eq!(
        decode_pie(&flat, &mut faults).unwrap(),
        decode_pie(&nested, &mut faults).unwrap()
    );
    assert!(faults.is_empty());
}

#[test]
fn test_invalid_breakdown_entries_are_skipped_not_fatal() {
    let pie = json!([
        "Movies", "lib1", 1, 1, 1.0, 1,
        [],
        [{"name": "Success", "value": 3}, "oops", {"name": "Error"}, {"name": "Queued", "value": 1}],
        {"not": "an array"}
    ]);
    let mut faults = Vec::new();
    let record = decode_pie(&pie, &mut faults).expect("record kept");
    assert_eq!(
        record.health,
        vec![BreakdownEntry::new("Success", 3), BreakdownEntry::new("Queued", 1)]
    );
    assert!(record.video_codec.is_empty());
    assert_eq!(
        faults,
        vec![
            PieFaultKind::InvalidEntry {
                breakdown: Breakdown::Health,
                entry: 1
            },
            PieFaultKind::InvalidEntry {
                breakdown: Breakdown::Health,
                entry: 2
            },
            PieFaultKind::SlotNotArray {
                breakdown: Breakdown::VideoCodec
            },
        ]
    );
    assert!(faults.iter().all(|f| !f.drops_record()));
}

#[test]
fn test_header_type_mismatch_drops_only_that_pie() {
    let pies = vec![
        json!(["Movies", "lib1", "100", 1, 1.0, 1, []]),
        json!(["TV", "lib2", 1, 1, 1.0, 1, []]),
        json!(["Music", 42, 1, 1, 1.0, 1, []]),
    ];
    let decoded = decode_pies(&pies);
    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].library, "TV");
    assert_eq!(
        decoded.faults,
        vec![
            PieFault {
                pie: 0,
                kind: PieFaultKind::FieldType {
                    position: 2,
                    expected: "number"
                }
            },
            PieFault {
                pie: 2,
                kind: PieFaultKind::FieldType {
                    position: 1,
                    expected: "string"
                }
            },
        ]
    );
    assert!(decoded.faults.iter().all(|f| f.kind.drops_record()));
}

#[test]
fn test_positions_past_the_last_slot_are_ignored() {
    let pie = json!([
        "M", "l", 1, 1, 1.0, 1,
        [], [], [], [], [], [],
        [{"name": "flac", "value": 2}],
        [{"name": "extra", "value": 9}]
    ]);
    let mut faults = Vec::new();
    let record = decode_pie(&pie, &mut faults).unwrap();
    assert_eq!(record.audio_container, vec![BreakdownEntry::new("flac", 2)]);
    assert_eq!(record.breakdown_len(), 1);
}

#[test]
fn test_sample_count_matches_well_formed_pairs() {
    let entries = json!([
        {"name": "a", "value": 1},
        {"name": "b", "value": 2},
        {"value": 3},
        {"name": "c", "value": 4},
        null
    ]);
    let pie = json!(["M", "l", 1, 1, 1.0, 1, entries]);
    let mut faults = Vec::new();
    let record = decode_pie(&pie, &mut faults).unwrap();
    assert_eq!(record.transcode_status.len(), 3);
    assert_eq!(faults.len(), 2);
}
