mod tables;

pub use self::tables::{
    build_summary as print_build_summary, event_counts as print_event_counts,
    events as print_events, keycodes as print_keycodes, names as print_names,
};

use keyweave_core::KeyboardState;

pub fn print_down_keys(state: &KeyboardState, label: impl Fn(keyweave_core::LogicalKey) -> String) {
    let down: Vec<String> = state.down_keys().map(label).collect();
    if down.is_empty() {
        println!("\nKeys down: none");
    } else {
        println!("\nKeys down: {}", down.join(", "));
    }
}
