//! Property stream tests
//!
//! Tests verify:
//! - Every supported type decodes with its exact framing
//! - Consumed bytes add up to the blob length
//! - Skipped and unsupported entries keep the stream aligned
//! - Fatal errors stop decoding and keep earlier entries
//! - Unknown ids resolve to the sentinel and are reported

#[path = "../common/mod.rs"]
mod common;

use arksave::decoder::{
    decode_object, BlobKind, DecodeError, DecodeOutcome, PropertyStream, PropertyTag,
    PropertyValue, SkipReason, UnsupportedKind, ENTRY_HEAD_SIZE,
};
use arksave::names::{NameId, UNKNOWN_NAME};
use arksave::Diagnostic;

use common::*;

fn value_of(outcome: &DecodeOutcome) -> &PropertyValue {
    outcome.value().unwrap_or_else(|| panic!("not decoded: {:?}", outcome))
}

// =============================================================================
// Supported Types
// =============================================================================

#[test]
fn test_decode_every_supported_type() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .bool(IS_FEMALE, true)
        .byte(BASE_POINTS, 9, 4)
        .byte_enum(STATUS_ENUM, STATUS_ENUM, HEALTH, 0)
        .str(TRIBE_NAME, "abc")
        .name_prop(OWNER, NONE)
        .float(HEALTH, 1.5, 2)
        .double(TAMED_AT_TIME, -2.25)
        .int(BASE_LEVEL, -7, 0)
        .uint32(DINO_ID_1, 4_000_000_000, 0)
        .uint16(COLORS, 513, 3)
        .int64(DINO_ID_2, -9_000_000_000)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.is_complete(), "error: {:?}", decoded.error);
    assert_eq!(decoded.class_name, REX_CLASS);
    assert_eq!(decoded.entries.len(), 11);
    assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);

    let expected = [
        ("bIsFemale", PropertyValue::Bool(true), 26),
        ("NumberOfLevelUpPointsApplied", PropertyValue::Byte(9), 34),
        ("TribeName", PropertyValue::Str("abc".to_string()), 33),
        ("Health", PropertyValue::Float(1.5), 29),
        ("TamedAtTime", PropertyValue::Double(-2.25), 33),
        ("BaseCharacterLevel", PropertyValue::Int(-7), 29),
        ("DinoID1", PropertyValue::UInt32(4_000_000_000), 29),
        ("ColorSetIndices", PropertyValue::UInt16(513), 27),
        ("DinoID2", PropertyValue::Int64(-9_000_000_000), 33),
    ];
    for (name, value, consumed) in expected {
        let entry = decoded.find(name).unwrap();
        assert_eq!(value_of(&entry.value), &value, "{}", name);
        assert_eq!(entry.consumed, consumed, "{}", name);
    }

    let entry = decoded.find("EPrimalCharacterStatusValue").unwrap();
    assert_eq!(entry.consumed, 41);
    match value_of(&entry.value) {
        PropertyValue::Enum(name_ref) => {
            assert_eq!(name_ref.id, NameId(HEALTH));
            assert_eq!(name_ref.name, "Health");
        }
        other => panic!("expected enum, got {:?}", other),
    }

    let entry = decoded.find("Owner").unwrap();
    assert_eq!(entry.consumed, 33);
    match value_of(&entry.value) {
        PropertyValue::Name(name_ref) => assert_eq!(name_ref.name, "None"),
        other => panic!("expected name, got {:?}", other),
    }

    assert_eq!(decoded.bytes_consumed(), blob.len());
}

#[test]
fn test_entry_indices_and_offsets() {
    let names = fixture_table();
    let blob = BlobBuilder::status(7)
        .byte(BASE_POINTS, 10, 0)
        .byte(BASE_POINTS, 5, 1)
        .byte(BASE_POINTS, 3, 4)
        .build();

    let decoded = decode_object(&blob, BlobKind::Status, &names);
    let points: Vec<_> = decoded
        .find_all("NumberOfLevelUpPointsApplied")
        .map(|e| (e.index, value_of(&e.value).as_u32()))
        .collect();
    assert_eq!(
        points,
        vec![(Some(0), Some(10)), (Some(1), Some(5)), (Some(4), Some(3))]
    );

    let start = BlobKind::Status.stream_start();
    let offsets: Vec<_> = decoded.entries.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![start, start + 34, start + 68]);
}

#[test]
fn test_empty_string() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID).str(TRIBE_NAME, "").build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    let entry = decoded.find("TribeName").unwrap();
    assert_eq!(value_of(&entry.value), &PropertyValue::Str(String::new()));
    assert_eq!(entry.consumed, ENTRY_HEAD_SIZE + 13);
    assert_eq!(decoded.bytes_consumed(), blob.len());
}

#[test]
fn test_empty_stream() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID).build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.is_complete());
    assert!(decoded.entries.is_empty());
    assert_eq!(decoded.bytes_consumed(), blob.len());
}

// =============================================================================
// Skipped and Unsupported Entries
// =============================================================================

#[test]
fn test_unsupported_types_stepped_over() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .struct_prop(LOCATION, VECTOR, &[0x11; 24])
        .object(OWNER, &[0x22; 8])
        .array(ANCESTORS, ANCESTORS_ENTRY, &[0x33; 12])
        .int(BASE_LEVEL, 30, 0)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.is_complete());

    let kinds: Vec<_> = decoded.entries.iter().map(|e| e.value.clone()).collect();
    assert_eq!(
        kinds[..3],
        [
            DecodeOutcome::Unsupported(UnsupportedKind::Struct("Vector".to_string())),
            DecodeOutcome::Unsupported(UnsupportedKind::Object),
            DecodeOutcome::Unsupported(UnsupportedKind::Array("DinoAncestorsEntry".to_string())),
        ]
    );
    let consumed: Vec<_> = decoded.entries.iter().map(|e| e.consumed).collect();
    assert_eq!(consumed, vec![61, 33, 45, 29]);

    assert_eq!(
        value_of(&decoded.find("BaseCharacterLevel").unwrap().value),
        &PropertyValue::Int(30)
    );
    assert_eq!(decoded.bytes_consumed(), blob.len());

    let unsupported = decoded
        .diagnostics
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnsupportedPropertyType { .. }))
        .count();
    assert_eq!(unsupported, 3);
}

#[test]
fn test_numeric_length_mismatch_skipped() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .numeric_raw(BASE_LEVEL, INT_TYPE, &[1, 2, 3, 4, 5, 6, 7, 8])
        .numeric_raw(HEALTH, FLOAT_TYPE, &[0, 0])
        .uint32(DINO_ID_1, 55, 0)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.is_complete());
    assert_eq!(
        decoded.entries[0].value,
        DecodeOutcome::Skipped(SkipReason::LengthMismatch {
            expected: vec![4],
            declared: 8,
        })
    );
    assert_eq!(
        decoded.entries[1].value,
        DecodeOutcome::Skipped(SkipReason::LengthMismatch {
            expected: vec![4, 8],
            declared: 2,
        })
    );
    assert_eq!(
        value_of(&decoded.entries[2].value),
        &PropertyValue::UInt32(55)
    );
    assert_eq!(decoded.bytes_consumed(), blob.len());
    assert_eq!(
        decoded
            .diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::SkippedValue { .. }))
            .count(),
        2
    );
}

#[test]
fn test_invalid_utf8_string_skipped() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .str_bytes(TRIBE_NAME, &[0xFF, 0xFE, 0x00])
        .bool(IS_FEMALE, false)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert_eq!(
        decoded.entries[0].value,
        DecodeOutcome::Skipped(SkipReason::InvalidText)
    );
    assert_eq!(
        value_of(&decoded.entries[1].value),
        &PropertyValue::Bool(false)
    );
    assert_eq!(decoded.bytes_consumed(), blob.len());
}

#[test]
fn test_utf16_string_decoded() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .str_utf16(TRIBE_NAME, "Stämme")
        .int(DINO_ID_1, 5, 0)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.error.is_none(), "{:?}", decoded.error);
    assert_eq!(
        value_of(&decoded.entries[0].value),
        &PropertyValue::Str("Stämme".to_string())
    );
    assert_eq!(value_of(&decoded.entries[1].value), &PropertyValue::Int(5));
    assert_eq!(decoded.bytes_consumed(), blob.len());
}

#[test]
fn test_string_length_disagreeing_with_size_skipped() {
    let names = fixture_table();
    // Three UTF-16 units would need 6 bytes, the size only covers 3
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .str_framed(TRIBE_NAME, 7, -3, &[0x41, 0x00, 0x42])
        .int(DINO_ID_1, 200, 0)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.error.is_none(), "{:?}", decoded.error);
    assert_eq!(decoded.entries.len(), 2);
    assert_eq!(
        decoded.entries[0].value,
        DecodeOutcome::Skipped(SkipReason::LengthMismatch {
            expected: vec![10],
            declared: 7,
        })
    );
    assert_eq!(value_of(&decoded.entries[1].value), &PropertyValue::Int(200));
    assert_eq!(decoded.bytes_consumed(), blob.len());
}

// =============================================================================
// Fatal Errors
// =============================================================================

#[test]
fn test_unrecognized_tag_stops_decoding() {
    let names = fixture_table();
    let builder = BlobBuilder::instance(REX_CLASS_ID)
        .int(BASE_LEVEL, 1, 0)
        .uint32(DINO_ID_1, 2, 0);
    let unknown_at = BlobKind::Instance.stream_start() + builder.stream_len();
    let blob = builder
        .raw_entry(COLORS, SET_TYPE, &[0x01; 20])
        .uint32(DINO_ID_2, 3, 0)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert_eq!(decoded.entries.len(), 2);
    assert!(decoded.find("DinoID2").is_none());
    assert_eq!(
        decoded.error,
        Some(DecodeError::UnrecognizedTag {
            tag: "SetProperty".to_string(),
            type_id: NameId(SET_TYPE),
            offset: unknown_at,
        })
    );
}

#[test]
fn test_unresolvable_type_id_is_unrecognized() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .raw_entry(COLORS, 0x00AB_CDEF, &[0u8; 8])
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    match decoded.error {
        Some(DecodeError::UnrecognizedTag { tag, type_id, .. }) => {
            assert_eq!(tag, UNKNOWN_NAME);
            assert_eq!(type_id, NameId(0x00AB_CDEF));
        }
        other => panic!("expected unrecognized tag, got {:?}", other),
    }
}

#[test]
fn test_truncated_value() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .raw_entry(BASE_LEVEL, INT_TYPE, &[4, 0, 0, 0, 0, 0, 0, 0, 0, 0xAA, 0xBB])
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert!(decoded.entries.is_empty());
    assert_eq!(
        decoded.error,
        Some(DecodeError::Truncated {
            offset: BlobKind::Instance.stream_start() + ENTRY_HEAD_SIZE + 9,
            needed: 4,
            available: 2,
        })
    );
}

#[test]
fn test_leftover_bytes() {
    let names = fixture_table();
    let builder = BlobBuilder::instance(REX_CLASS_ID).bool(IS_FEMALE, true);
    let leftover_at = BlobKind::Instance.stream_start() + builder.stream_len();
    let blob = builder.raw(&[0u8; 5]).build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(
        decoded.error,
        Some(DecodeError::Leftover {
            offset: leftover_at,
            remaining: 5,
        })
    );
}

#[test]
fn test_blob_too_short() {
    let names = fixture_table();
    let blob = REX_CLASS_ID.to_le_bytes().to_vec();

    let decoded = decode_object(&blob, BlobKind::Status, &names);
    assert_eq!(decoded.class_id, NameId(REX_CLASS_ID));
    assert_eq!(
        decoded.error,
        Some(DecodeError::BlobTooShort {
            len: 4,
            min: BlobKind::Status.min_blob_len(),
        })
    );
    assert!(PropertyStream::new(&blob, BlobKind::Status, &names).is_err());
}

#[test]
fn test_stream_is_fused_after_error() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .int(BASE_LEVEL, 1, 0)
        .raw_entry(COLORS, SET_TYPE, &[0u8; 8])
        .int(BASE_LEVEL, 2, 0)
        .build();

    let mut stream = PropertyStream::new(&blob, BlobKind::Instance, &names).unwrap();
    assert_eq!(stream.class_id(), NameId(REX_CLASS_ID));
    assert!(stream.next().unwrap().is_ok());
    assert!(stream.next().unwrap().is_err());
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
}

// =============================================================================
// Unknown Names
// =============================================================================

#[test]
fn test_unknown_property_name_reported() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .int(0x0BAD_0BAD, 5, 0)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    let entry = &decoded.entries[0];
    assert_eq!(entry.name, UNKNOWN_NAME);
    assert_eq!(value_of(&entry.value), &PropertyValue::Int(5));
    assert_eq!(
        decoded.diagnostics,
        vec![Diagnostic::UnknownName {
            id: NameId(0x0BAD_0BAD),
            offset: BlobKind::Instance.stream_start(),
        }]
    );
}

#[test]
fn test_unknown_class_reported() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(0x00C0_FFEE).build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert_eq!(decoded.class_name, UNKNOWN_NAME);
    assert_eq!(
        decoded.diagnostics,
        vec![Diagnostic::UnknownName {
            id: NameId(0x00C0_FFEE),
            offset: 0,
        }]
    );
}

#[test]
fn test_unknown_name_reference_reported() {
    let names = fixture_table();
    let blob = BlobBuilder::instance(REX_CLASS_ID)
        .name_prop(OWNER, 0x0000_7777)
        .build();

    let decoded = decode_object(&blob, BlobKind::Instance, &names);
    assert_eq!(decoded.diagnostics.len(), 1);
    assert!(matches!(
        decoded.diagnostics[0],
        Diagnostic::UnknownName { id: NameId(0x0000_7777), .. }
    ));
}

// =============================================================================
// Tags and Values
// =============================================================================

#[test]
fn test_property_tag_names() {
    for name in [
        "BoolProperty",
        "ByteProperty",
        "StrProperty",
        "NameProperty",
        "FloatProperty",
        "DoubleProperty",
        "Int8Property",
        "IntProperty",
        "UInt16Property",
        "UInt32Property",
        "Int64Property",
        "UInt64Property",
        "StructProperty",
        "ObjectProperty",
        "ArrayProperty",
    ] {
        let tag = PropertyTag::from_type_name(name);
        assert!(!matches!(tag, PropertyTag::Unknown(_)), "{}", name);
        assert_eq!(tag.type_name(), name);
    }
    assert_eq!(
        PropertyTag::from_type_name("MapProperty"),
        PropertyTag::Unknown("MapProperty".to_string())
    );
}

#[test]
fn test_value_conversions() {
    assert_eq!(PropertyValue::Byte(7).as_u32(), Some(7));
    assert_eq!(PropertyValue::Int(-1).as_u32(), None);
    assert_eq!(PropertyValue::Int(-1).as_i64(), Some(-1));
    assert_eq!(PropertyValue::UInt64(u64::MAX).as_i64(), None);
    assert_eq!(PropertyValue::Float(1.0).as_u32(), None);
    assert_eq!(PropertyValue::Str("1".to_string()).as_i64(), None);
}
