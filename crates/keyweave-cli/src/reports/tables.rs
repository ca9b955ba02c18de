use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keyweave_core::consts::MAX_KEYS;
use keyweave_core::keymap::KeyboardDescription;
use keyweave_core::{BuildReport, KeyEvent, KeyEventKind, KeyMapping, KeySlot, LogicalKey};
use std::collections::{BTreeMap, HashMap};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right_align(table: &mut Table, columns: &[usize]) {
    for &i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn keycodes(desc: &KeyboardDescription, mapping: &KeyMapping, all: bool) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Code").add_attribute(Attribute::Bold),
        Cell::new("Symbols"),
        Cell::new("Key").fg(Color::Cyan),
        Cell::new("Name"),
    ]);
    right_align(&mut table, &[0, 2]);

    for (code, slot) in mapping.keycodes().iter() {
        if slot == KeySlot::Ignored && !all {
            continue;
        }
        let (key_cell, name) = match slot {
            KeySlot::Assigned(key) => (
                Cell::new(key.0).fg(Color::Cyan),
                mapping.name_of(key),
            ),
            KeySlot::Ignored => (Cell::new("-1").fg(Color::DarkGrey), String::new()),
            KeySlot::Unresolved => (Cell::new("0").fg(Color::Red), "unassigned".to_string()),
        };
        table.add_row(vec![
            Cell::new(code),
            Cell::new(desc.symbols_for(code).join(" ")),
            key_cell,
            Cell::new(name),
        ]);
    }
    println!("\n{}", table);
}

pub fn build_summary(report: &BuildReport) {
    println!("\n🗺️  === KEYMAP: {} === 🗺️", report.keymap);

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value"),
    ]);
    right_align(&mut table, &[1]);

    let fallbacks = if report.fallbacks.is_empty() {
        "0".to_string()
    } else {
        report
            .fallbacks
            .iter()
            .map(|(code, key)| format!("{}→{}", code, key.0))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let doubles = report
        .double_mappings
        .iter()
        .map(|(key, codes)| format!("{} ({:?})", key, codes))
        .collect::<Vec<_>>()
        .join(", ");

    let rows: Vec<(&str, String, Option<Color>)> = vec![
        (
            "Code range",
            format!("{}..={}", report.min_code, report.max_code),
            None,
        ),
        ("Symbols per key", report.symbols_per_key.to_string(), None),
        ("Assigned", report.assigned.to_string(), Some(Color::Green)),
        ("Ignored", report.ignored.to_string(), None),
        ("Fallbacks", fallbacks, None),
        (
            "Unassigned",
            report.unassigned.len().to_string(),
            (!report.unassigned.is_empty()).then_some(Color::Red),
        ),
        ("Double mappings", doubles, None),
        (
            "Overrides",
            format!(
                "{} applied, {} rejected",
                report.overrides_applied.len(),
                report.overrides_rejected.len()
            ),
            (!report.overrides_rejected.is_empty()).then_some(Color::Yellow),
        ),
        (
            "Fingerprint",
            report.fingerprint.chars().take(16).collect(),
            None,
        ),
    ];

    for (name, value, color) in rows {
        let mut value_cell = Cell::new(value);
        if let Some(color) = color {
            value_cell = value_cell.fg(color);
        }
        table.add_row(vec![Cell::new(name), value_cell]);
    }
    println!("{}", table);
}

pub fn events(events: &[KeyEvent], label: impl Fn(LogicalKey) -> String) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Time").add_attribute(Attribute::Bold),
        Cell::new("Kind"),
        Cell::new("Key"),
        Cell::new("Name"),
        Cell::new("Char"),
        Cell::new("Modifiers"),
        Cell::new("Buffered"),
    ]);
    right_align(&mut table, &[0, 2]);

    for e in events {
        let kind_color = match e.kind {
            KeyEventKind::Press => Color::Green,
            KeyEventKind::Repeat => Color::Yellow,
            KeyEventKind::Release => Color::DarkGrey,
        };
        let modifiers = e
            .modifiers
            .iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join("|");
        table.add_row(vec![
            Cell::new(format!("{:.4}", e.timestamp)),
            Cell::new(e.kind).fg(kind_color),
            Cell::new(e.key.0),
            Cell::new(label(e.key)),
            Cell::new(e.unichar.map(|c| format!("{:?}", c)).unwrap_or_default()),
            Cell::new(modifiers),
            Cell::new(if e.buffered { "yes" } else { "no" }),
        ]);
    }
    println!("\n{}", table);
}

pub fn event_counts(counts: &HashMap<KeyEventKind, usize>) {
    let total: usize = counts.values().sum();
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Kind").add_attribute(Attribute::Bold),
        Cell::new("Events"),
        Cell::new("Share"),
    ]);
    right_align(&mut table, &[1, 2]);

    for kind in KeyEventKind::all() {
        let n = counts.get(&kind).copied().unwrap_or(0);
        let share = if total == 0 {
            0.0
        } else {
            n as f64 * 100.0 / total as f64
        };
        table.add_row(vec![
            Cell::new(kind),
            Cell::new(n),
            Cell::new(format!("{:.1}%", share)),
        ]);
    }
    println!("\n{}", table);
}

pub fn names(mapping: &KeyMapping, all: bool) {
    let mut codes_by_key: BTreeMap<LogicalKey, Vec<u32>> = BTreeMap::new();
    for (code, slot) in mapping.keycodes().iter() {
        if let Some(key) = slot.key() {
            codes_by_key.entry(key).or_default().push(code);
        }
    }

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Label"),
        Cell::new("Built-in"),
        Cell::new("Hardware codes"),
    ]);
    right_align(&mut table, &[0]);

    for code in 1..MAX_KEYS as u16 {
        let key = LogicalKey(code);
        let codes = codes_by_key.get(&key);
        if !all && codes.is_none() && key.named().is_none() {
            continue;
        }
        let label = mapping.name_of(key);
        let builtin = key.generic_name();
        let label_cell = if label != builtin {
            Cell::new(label).fg(Color::Cyan)
        } else {
            Cell::new(label)
        };
        table.add_row(vec![
            Cell::new(code),
            label_cell,
            Cell::new(builtin),
            Cell::new(
                codes
                    .map(|c| {
                        c.iter()
                            .map(|c| c.to_string())
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .unwrap_or_default(),
            ),
        ]);
    }
    println!("\n{}", table);
}
