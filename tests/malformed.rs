//! Structural and query-time error handling.

mod common;

use annodex::prelude::*;
use common::{acme, fixture, XorShift};

/// Header declaring `class_count` classes followed by an empty name pool.
fn header(class_count: u32) -> Vec<u8> {
    let mut bytes = vec![0xBA, 0xBE, 0x1F, 0x15, 0x00, 0x01];
    bytes.extend_from_slice(&class_count.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes
}

/// Calls every accessor of every class. Errors are fine, panics are not.
fn exercise(index: &SparseIndex) {
    for class in index.known_classes() {
        let _ = class.name();
        let _ = class.modifiers();
        let _ = class.super_name();
        let _ = class.interface_names();
        let _ = class.fields();
        let _ = class.methods();
        let _ = class.class_annotations();
        let _ = class.field_annotations();
        let _ = class.method_annotations();
        let _ = class.has_annotation("javax.inject.Singleton");
    }
    let _ = index.known_direct_subclasses(ROOT_CLASS_NAME);
    let _ = index.known_direct_implementors("java.io.Serializable");
}

#[test]
fn zero_classes() {
    let index = SparseIndex::decode(&header(0)).unwrap();
    assert_eq!(index.known_classes().len(), 0);
    assert!(index.class_by_name("com.acme.Foo").is_none());
}

#[test]
fn declared_classes_missing() {
    // Five classes declared, two and a half present
    let mut bytes = header(5);
    bytes.extend_from_slice(&[0u8; 34 * 2 + 17]);

    let result = SparseIndex::decode(&bytes);
    assert!(matches!(result, Err(Error::Malformed { .. })));
}

#[test]
fn empty_and_short_buffers() {
    for len in 0..14 {
        let result = SparseIndex::decode(&header(0)[..len]);
        assert!(matches!(result, Err(Error::Malformed { .. })), "length {len}");
    }
}

#[test]
fn bad_magic_and_version() {
    let mut bytes = header(0);
    bytes[0] = 0xCA;
    assert!(matches!(SparseIndex::decode(&bytes), Err(Error::Malformed { .. })));

    let mut bytes = header(0);
    bytes[5] = 0x02;
    assert!(matches!(SparseIndex::decode(&bytes), Err(Error::Malformed { .. })));
}

#[test]
fn class_name_outside_pool() {
    let mut bytes = header(1);
    let mut record = vec![0u8; 34];
    record[..4].copy_from_slice(&7u32.to_be_bytes());
    bytes.extend_from_slice(&record);

    assert!(matches!(SparseIndex::decode(&bytes), Err(Error::Malformed { .. })));
}

#[test]
fn duplicate_class_names() {
    let mut bytes = vec![0xBA, 0xBE, 0x1F, 0x15, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x03, b'a', b'.', b'A']);
    // Two records naming pool entry 0, both with the root sentinel and no regions
    for _ in 0..2 {
        let mut record = vec![0u8; 34];
        record[4..8].copy_from_slice(&u32::MAX.to_be_bytes());
        bytes.extend_from_slice(&record);
    }

    assert!(matches!(SparseIndex::decode(&bytes), Err(Error::Malformed { .. })));
}

#[test]
fn every_truncation_fails_strict_decode() {
    let bytes = fixture(11, 12);

    for len in 0..bytes.len() {
        let result = SparseIndex::decode_with_config(&bytes[..len], DecodeConfig::strict());
        assert!(matches!(result, Err(Error::Malformed { .. })), "length {len}");
    }

    assert!(SparseIndex::decode_with_config(&bytes, DecodeConfig::strict()).is_ok());
}

#[test]
fn every_truncation_is_handled() {
    let bytes = acme();

    for len in 0..bytes.len() {
        match SparseIndex::decode(&bytes[..len]) {
            Ok(index) => exercise(&index),
            Err(e) => assert!(e.is_malformed(), "length {len}: {e}"),
        }
    }
}

#[test]
fn corrupted_bytes_never_panic() {
    let original = fixture(5, 20);
    let mut rng = XorShift::new(0xC0FFEE);

    for _ in 0..500 {
        let mut bytes = original.clone();
        for _ in 0..1 + rng.below(4) {
            let at = rng.below(bytes.len());
            bytes[at] = rng.next() as u8;
        }

        match SparseIndex::decode(&bytes) {
            Ok(index) => exercise(&index),
            Err(e) => assert!(e.is_malformed(), "{e}"),
        }

        // Strict decode either rejects the buffer or yields an index whose accessors all succeed
        if let Ok(index) = SparseIndex::decode_with_config(&bytes, DecodeConfig::strict()) {
            for class in index.known_classes() {
                class.super_name().unwrap();
                class.interface_names().unwrap();
                class.fields().unwrap();
                class.methods().unwrap();
                class.class_annotations().unwrap();
                class.field_annotations().unwrap();
                class.method_annotations().unwrap();
            }
        }
    }
}

#[test]
fn invalid_utf8_member_name_is_query_time() {
    let mut builder = IndexBuilder::new();
    builder.add_class(
        ClassBuilder::new("a.A").field(MemberBuilder::new("\u{e9}t\u{e9}", 0x0001)),
    );
    let mut bytes = builder.build().unwrap();

    // Pool: "a.A" then "été" (C3 A9 74 C3 A9); break the first continuation byte
    let position = bytes
        .windows(2)
        .position(|w| w == [0xC3, 0xA9])
        .unwrap();
    bytes[position + 1] = 0x28;

    let index = SparseIndex::decode(&bytes).unwrap();
    let class = index.class_by_name("a.A").unwrap();
    assert_eq!(class.field_count(), 1);
    assert!(matches!(class.fields(), Err(Error::Malformed { .. })));
    assert!(class.interface_names().unwrap().is_empty());

    let strict = SparseIndex::decode_with_config(&bytes, DecodeConfig::strict());
    assert!(matches!(strict, Err(Error::Malformed { .. })));
}
