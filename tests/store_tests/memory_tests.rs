//! In-memory store tests
//!
//! Tests verify:
//! - Custom record access
//! - Value range scans and their bounds
//! - Full scans in key order
//! - Concurrent readers

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use arksave::store::{MemoryStore, ObjectKey, SaveStore, ValueRange};

use common::*;

fn range(low: &[u8], high: Option<&[u8]>) -> ValueRange {
    ValueRange {
        low: low.to_vec(),
        high: high.map(<[u8]>::to_vec),
    }
}

fn scan_keys(store: &MemoryStore, range: &ValueRange) -> Vec<ObjectKey> {
    store
        .scan_value_range(range)
        .unwrap()
        .map(|row| row.unwrap().key)
        .collect()
}

// =============================================================================
// Custom Records
// =============================================================================

#[test]
fn test_custom_record_lookup() {
    let store = fixture_store();

    let header = store.custom_record("SaveHeader").unwrap().unwrap();
    assert_eq!(&header[..], fixture_header().as_slice());
    assert!(store.custom_record("GameModeCustomBytes").unwrap().is_none());
}

#[test]
fn test_custom_record_replace() {
    let store = MemoryStore::new();
    store.insert_custom("SaveHeader", vec![1u8]);
    store.insert_custom("SaveHeader", vec![2u8]);

    assert_eq!(store.custom_count(), 1);
    assert_eq!(&store.custom_record("SaveHeader").unwrap().unwrap()[..], &[2u8]);
}

// =============================================================================
// Range Scans
// =============================================================================

#[test]
fn test_range_scan_half_open() {
    let store = MemoryStore::new();
    store.insert_object(key(1), vec![0x10, 0x00]);
    store.insert_object(key(2), vec![0x20]);
    store.insert_object(key(3), vec![0x20, 0xFF, 0xFF]);
    store.insert_object(key(4), vec![0x30]);

    let keys = scan_keys(&store, &range(&[0x20], Some(&[0x30])));
    assert_eq!(keys, vec![key(2), key(3)]);
}

#[test]
fn test_range_scan_unbounded_high() {
    let store = MemoryStore::new();
    store.insert_object(key(1), vec![0x01]);
    store.insert_object(key(2), vec![0xFF, 0xFF]);

    let keys = scan_keys(&store, &range(&[0x02], None));
    assert_eq!(keys, vec![key(2)]);
}

#[test]
fn test_range_scan_empty_store() {
    let store = MemoryStore::new();
    assert!(scan_keys(&store, &range(&[0x00], None)).is_empty());
}

#[test]
fn test_range_scan_is_by_value_not_key() {
    let store = MemoryStore::new();
    store.insert_object(key(0xF0), vec![0x05]);
    store.insert_object(key(0x01), vec![0x50]);

    let keys = scan_keys(&store, &range(&[0x00], Some(&[0x10])));
    assert_eq!(keys, vec![key(0xF0)]);
}

#[test]
fn test_value_range_contains() {
    let r = range(&[0x2A, 0x00, 0x00, 0x00], Some(&[0x2A, 0x00, 0x00, 0x01]));

    assert!(r.contains(&[0x2A, 0x00, 0x00, 0x00]));
    assert!(r.contains(&[0x2A, 0x00, 0x00, 0x00, 0x99, 0x99]));
    assert!(!r.contains(&[0x2A, 0x00, 0x00]));
    assert!(!r.contains(&[0x2A, 0x00, 0x00, 0x01]));
}

// =============================================================================
// Full Scans
// =============================================================================

#[test]
fn test_scan_all_in_key_order() {
    let store = MemoryStore::new();
    store.insert_object(key(3), vec![0x01]);
    store.insert_object(key(1), vec![0x02]);
    store.insert_object(key(2), vec![0x03]);

    let keys: Vec<_> = store.scan_all().unwrap().map(|r| r.unwrap().key).collect();
    assert_eq!(keys, vec![key(1), key(2), key(3)]);
    assert_eq!(store.object_count(), 3);
}

#[test]
fn test_scan_snapshot_survives_writes() {
    let store = MemoryStore::new();
    store.insert_object(key(1), vec![0x01]);

    let scan = store.scan_all().unwrap();
    store.insert_object(key(2), vec![0x02]);

    assert_eq!(scan.count(), 1);
    assert_eq!(store.object_count(), 2);
}

// =============================================================================
// Keys
// =============================================================================

#[test]
fn test_object_key_uuid_rendering() {
    let key = ObjectKey([
        0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
        0xFF,
    ]);

    assert_eq!(key.to_string(), "00112233-4455-6677-8899-aabbccddeeff");
    assert_eq!(key.simple(), "00112233445566778899aabbccddeeff");
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_readers() {
    let store = Arc::new(MemoryStore::new());
    for n in 0..64u8 {
        store.insert_object(key(n), vec![n]);
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || scan_keys(&store, &range(&[0x10], Some(&[0x20]))).len())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 16);
    }
}
