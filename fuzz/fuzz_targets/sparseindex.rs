#![no_main]

use annodex::{DecodeConfig, SparseIndex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(index) = SparseIndex::decode(data) {
        for class in index.known_classes() {
            let _ = class.super_name();
            let _ = class.interface_names();
            let _ = class.fields();
            let _ = class.methods();
            let _ = class.class_annotations();
            let _ = class.field_annotations();
            let _ = class.method_annotations();
        }
    }

    if let Ok(index) = SparseIndex::decode_with_config(data, DecodeConfig::strict()) {
        for class in index.known_classes() {
            assert!(class.interface_names().is_ok());
            assert!(class.field_annotations().is_ok());
            assert!(class.method_annotations().is_ok());
        }
    }
});
