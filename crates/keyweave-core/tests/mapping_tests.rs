use keyweave_core::config::ModifierMode;
use keyweave_core::keymap::{KeyOverride, KeyboardDescription};
use keyweave_core::{
    BuildReport, Key, KeyMapping, KeySlot, KeyboardOptions, LogicalKey, MappingParams,
    RebuildOutcome, StaticBackend,
};
use keyweave_core::{Keyboard, QueueSink};
use std::sync::Arc;

mod common;
use common::*;

fn build(desc: &KeyboardDescription) -> (Arc<KeyMapping>, BuildReport) {
    MappingParams::builder()
        .description(desc)
        .build()
        .build_mapping()
        .unwrap()
}

#[test]
fn test_us_layout_end_to_end() {
    let (mapping, report) = build(&us_keymap());

    assert_eq!(mapping.lookup(A), KeySlot::Assigned(Key::A.code()));
    assert_eq!(mapping.lookup(KP_ENTER), KeySlot::Assigned(Key::PadEnter.code()));
    assert_eq!(mapping.lookup(ALT_R), KeySlot::Assigned(Key::AltGr.code()));
    assert_eq!(mapping.lookup(DIGIT_0), KeySlot::Assigned(Key::Key0.code()));
    assert_eq!(mapping.lookup(KP_7), KeySlot::Assigned(Key::Pad7.code()));

    // NoSymbol codes
    assert_eq!(mapping.lookup(MIN_CODE), KeySlot::Ignored);
    assert_eq!(mapping.lookup(101), KeySlot::Ignored);

    assert_eq!(report.key_count, (MAX_CODE - MIN_CODE + 1) as usize);
    assert_eq!(report.assigned + report.ignored, report.key_count);
    assert!(report.double_mappings.is_empty());
    assert!(!report.capacity_exceeded());
    assert!(!report.unchanged);
    assert_eq!(report.fingerprint.len(), 64);
}

#[test]
fn test_override_forces_key() {
    let desc = us_keymap();
    let overrides = [
        KeyOverride { code: A, key: Key::X.code().0 },
        // outside the code range
        KeyOverride { code: 4000, key: Key::Y.code().0 },
        // outside the key space
        KeyOverride { code: S, key: 999 },
    ];

    let (mapping, report) = MappingParams::builder()
        .description(&desc)
        .overrides(&overrides)
        .build()
        .build_mapping()
        .unwrap();

    assert_eq!(mapping.lookup(A), KeySlot::Assigned(Key::X.code()));
    assert_eq!(mapping.lookup(S), KeySlot::Assigned(Key::S.code()));
    assert_eq!(report.overrides_applied.len(), 1);
    assert_eq!(report.overrides_rejected.len(), 2);

    // X is now reached from two codes
    assert!(report
        .double_mappings
        .iter()
        .any(|(key, codes)| *key == Key::X && codes.contains(&A)));
}

#[test]
fn test_override_releases_displaced_key() {
    let desc = us_keymap();
    let overrides = [KeyOverride { code: A, key: Key::X.code().0 }];
    let (mapping, _) = MappingParams::builder()
        .description(&desc)
        .overrides(&overrides)
        .build()
        .build_mapping()
        .unwrap();

    // nothing maps to A any more: its hardware label and used mark are gone
    assert!(!mapping.is_used(Key::A.code()));
    assert_eq!(mapping.name_of(Key::A.code()), Key::A.code().generic_name());
    assert_ne!(mapping.name_of(Key::A.code()), "a");
}

#[test]
fn test_override_keeps_key_still_reached_elsewhere() {
    // Pause and Break share one key; moving one code leaves the other
    let desc = KeymapBuilder::new(8, 9)
        .key(8, &["Pause"])
        .key(9, &["Break"])
        .build();
    let overrides = [KeyOverride { code: 8, key: Key::X.code().0 }];
    let (mapping, _) = MappingParams::builder()
        .description(&desc)
        .overrides(&overrides)
        .build()
        .build_mapping()
        .unwrap();

    assert_eq!(mapping.lookup(9), KeySlot::Assigned(Key::Pause.code()));
    assert!(mapping.is_used(Key::Pause.code()));
    assert_eq!(mapping.name_of(Key::Pause.code()), "Break");
}

#[test]
fn test_secondary_digit_wins() {
    // French AZERTY number row: the digit is the shifted symbol
    let desc = KeymapBuilder::new(10, 12)
        .key(10, &["ampersand", "1"])
        .key(11, &["eacute", "2"])
        .key(12, &["a", "A"])
        .build();
    let (mapping, report) = build(&desc);

    assert_eq!(mapping.lookup(10), KeySlot::Assigned(Key::Key1.code()));
    assert_eq!(mapping.lookup(11), KeySlot::Assigned(Key::Key2.code()));
    assert_eq!(mapping.lookup(12), KeySlot::Assigned(Key::A.code()));
    assert!(report.deferred.is_empty());
    // the hardware label is the primary symbol
    assert_eq!(mapping.name_of(Key::Key2.code()), "eacute");
}

#[test]
fn test_no_symbol_is_ignored() {
    let desc = KeymapBuilder::new(8, 10)
        .key(9, &["NoSymbol", "NoSymbol"])
        .key(10, &[])
        .build();
    let (mapping, report) = build(&desc);

    for code in 8..=10 {
        assert_eq!(mapping.lookup(code), KeySlot::Ignored);
        assert_eq!(mapping.lookup(code).sentinel(), -1);
    }
    assert_eq!(report.ignored, 3);
    assert_eq!(report.assigned, 0);
}

#[test]
fn test_fallback_is_ascending_and_labelled() {
    let (mapping, report) = build(&us_keymap());

    // every named key below ABNT C1 is taken by the US layout
    let expected = Key::AbntC1.code();
    assert_eq!(report.deferred, vec![EXTRA]);
    assert_eq!(report.fallbacks, vec![(EXTRA, expected)]);
    assert_eq!(mapping.lookup(EXTRA), KeySlot::Assigned(expected));
    assert_eq!(mapping.name_of(expected), "XF86AudioMute");
}

#[test]
fn test_fallback_order_follows_code_order() {
    let desc = KeymapBuilder::new(8, 11)
        .key(8, &["b"])
        .key(9, &["dead_grave"])
        .key(10, &["a"])
        .key(11, &["dead_acute"])
        .build();
    let (mapping, report) = build(&desc);

    // A and B are taken, C is the first free key
    assert_eq!(mapping.lookup(9), KeySlot::Assigned(Key::C.code()));
    assert_eq!(mapping.lookup(11), KeySlot::Assigned(Key::D.code()));
    assert_eq!(report.fallbacks.len(), 2);
}

#[test]
fn test_capacity_exhaustion_is_not_fatal() {
    // 300 unknown symbols for 226 logical keys
    let mut b = KeymapBuilder::new(1000, 1299);
    for code in 1000..=1299 {
        b = b.key(code, &[&format!("vendor_{}", code)]);
    }
    let (mapping, report) = build(&b.build());

    assert!(report.capacity_exceeded());
    assert_eq!(report.fallbacks.len(), 226);
    assert_eq!(report.unassigned.len(), 300 - 226);
    assert_eq!(mapping.lookup(1000), KeySlot::Assigned(LogicalKey(1)));
    assert_eq!(mapping.lookup(1299), KeySlot::Unresolved);
    assert_eq!(mapping.lookup(1299).sentinel(), 0);
}

#[test]
fn test_double_mapping_is_reported() {
    let desc = KeymapBuilder::new(8, 9)
        .key(8, &["Pause"])
        .key(9, &["Break"])
        .build();
    let (mapping, report) = build(&desc);

    assert_eq!(mapping.lookup(8), mapping.lookup(9));
    assert_eq!(report.double_mappings, vec![(Key::Pause.code(), vec![8, 9])]);
}

#[test]
fn test_modifier_map_from_description() {
    let (mapping, _) = build(&us_keymap());
    let mods = mapping.modifiers();

    assert_eq!(mods.codes(0), &[SHIFT_L, SHIFT_R]);
    assert!(mods.is_active(1));
    // scroll lock slot left empty by the server
    assert!(!mods.is_active(5));
    assert!(mods.is_modifier_code(ALT_R));
    assert!(!mods.is_modifier_code(A));
}

#[test]
fn test_invalid_description_is_rejected() {
    let mut desc = us_keymap();
    desc.symbols.pop();
    let result = MappingParams::builder()
        .description(&desc)
        .build()
        .build_mapping();
    assert!(result.is_err());
}

#[test]
fn test_rebuild_is_idempotent() {
    let kb = us_keyboard(ModifierMode::Reported);
    let first = kb.mapping();

    let outcome = kb.rebuild_mapping();
    let report = outcome.report().expect("rebuild");
    assert!(report.unchanged);

    let second = kb.mapping();
    assert_eq!(first.keycodes(), second.keycodes());
    assert_eq!(first.modifiers(), second.modifiers());
    assert_eq!(first.names(), second.names());
}

#[test]
fn test_query_failure_keeps_previous_mapping() {
    let kb = us_keyboard(ModifierMode::Reported);
    kb.backend().disconnect();

    assert!(matches!(kb.rebuild_mapping(), RebuildOutcome::Retained(_)));
    assert_eq!(kb.mapping().lookup(A), KeySlot::Assigned(Key::A.code()));
}

#[test]
fn test_query_failure_without_mapping_ignores_everything() {
    let backend = StaticBackend::from_description(us_keymap(), ModifierMode::Reported);
    backend.disconnect();
    let kb = Keyboard::new(backend, QueueSink::default(), KeyboardOptions::default());

    assert!(matches!(kb.rebuild_mapping(), RebuildOutcome::Degraded(_)));
    assert_eq!(kb.mapping().lookup(A), KeySlot::Ignored);
}

#[test]
fn test_layout_change_swaps_mapping() {
    let kb = us_keyboard(ModifierMode::Reported);
    let before = kb.mapping();

    // a German server swaps Y and Z
    let mut de = us_keymap();
    de.name = "de".to_string();
    de.symbols[(Q + 5 - MIN_CODE) as usize] = vec!["z".into(), "Z".into()];
    de.symbols[(52 - MIN_CODE) as usize] = vec!["y".into(), "Y".into()];
    kb.backend().replace_description(de);

    let report = kb.rebuild_mapping().report().cloned().unwrap();
    assert!(!report.unchanged);
    assert_eq!(kb.mapping().lookup(52), KeySlot::Assigned(Key::Y.code()));
    // readers holding the old mapping keep a consistent view
    assert_eq!(before.lookup(52), KeySlot::Assigned(Key::Z.code()));
}

#[test]
fn test_set_overrides_rebuilds() {
    let kb = us_keyboard(ModifierMode::Reported);
    let outcome = kb.set_overrides(vec![KeyOverride { code: A, key: Key::X.code().0 }]);

    assert_eq!(outcome.report().unwrap().overrides_applied.len(), 1);
    assert_eq!(kb.mapping().lookup(A), KeySlot::Assigned(Key::X.code()));
}
