use crate::keycodes::{Key, LogicalKey};
use fnv::FnvHashMap;
use std::sync::LazyLock;

/// Backend symbol names (X11 keysym strings) and the logical key each maps to.
///
/// Several symbols share a key on purpose: keypad keys report either their
/// digit or their navigation symbol depending on NumLock, and Pause/Break,
/// Alt_R/ISO_Level3_Shift, Meta/Super are reported interchangeably by
/// different servers. Two physical keys reporting those will look the same.
pub static TRANSLATION_TABLE: &[(&str, Key)] = &[
    ("a", Key::A),
    ("b", Key::B),
    ("c", Key::C),
    ("d", Key::D),
    ("e", Key::E),
    ("f", Key::F),
    ("g", Key::G),
    ("h", Key::H),
    ("i", Key::I),
    ("j", Key::J),
    ("k", Key::K),
    ("l", Key::L),
    ("m", Key::M),
    ("n", Key::N),
    ("o", Key::O),
    ("p", Key::P),
    ("q", Key::Q),
    ("r", Key::R),
    ("s", Key::S),
    ("t", Key::T),
    ("u", Key::U),
    ("v", Key::V),
    ("w", Key::W),
    ("x", Key::X),
    ("y", Key::Y),
    ("z", Key::Z),
    ("0", Key::Key0),
    ("1", Key::Key1),
    ("2", Key::Key2),
    ("3", Key::Key3),
    ("4", Key::Key4),
    ("5", Key::Key5),
    ("6", Key::Key6),
    ("7", Key::Key7),
    ("8", Key::Key8),
    ("9", Key::Key9),
    // keypad
    ("KP_0", Key::Pad0),
    ("KP_Insert", Key::Pad0),
    ("KP_1", Key::Pad1),
    ("KP_End", Key::Pad1),
    ("KP_2", Key::Pad2),
    ("KP_Down", Key::Pad2),
    ("KP_3", Key::Pad3),
    ("KP_Next", Key::Pad3),
    ("KP_Page_Down", Key::Pad3),
    ("KP_4", Key::Pad4),
    ("KP_Left", Key::Pad4),
    ("KP_5", Key::Pad5),
    ("KP_Begin", Key::Pad5),
    ("KP_6", Key::Pad6),
    ("KP_Right", Key::Pad6),
    ("KP_7", Key::Pad7),
    ("KP_Home", Key::Pad7),
    ("KP_8", Key::Pad8),
    ("KP_Up", Key::Pad8),
    ("KP_9", Key::Pad9),
    ("KP_Prior", Key::Pad9),
    ("KP_Page_Up", Key::Pad9),
    ("KP_Delete", Key::PadDelete),
    ("KP_Decimal", Key::PadDelete),
    ("KP_Divide", Key::PadSlash),
    ("KP_Multiply", Key::PadAsterisk),
    ("KP_Subtract", Key::PadMinus),
    ("KP_Add", Key::PadPlus),
    ("KP_Enter", Key::PadEnter),
    ("KP_Equal", Key::PadEquals),
    ("Pause", Key::Pause),
    ("Break", Key::Pause),
    ("F1", Key::F1),
    ("F2", Key::F2),
    ("F3", Key::F3),
    ("F4", Key::F4),
    ("F5", Key::F5),
    ("F6", Key::F6),
    ("F7", Key::F7),
    ("F8", Key::F8),
    ("F9", Key::F9),
    ("F10", Key::F10),
    ("F11", Key::F11),
    ("F12", Key::F12),
    ("Escape", Key::Escape),
    // US positions: left of 1, right of 0, two right of 0
    ("grave", Key::Tilde),
    ("minus", Key::Minus),
    ("equal", Key::Equals),
    ("BackSpace", Key::Backspace),
    ("Tab", Key::Tab),
    ("bracketleft", Key::OpenBrace),
    ("bracketright", Key::CloseBrace),
    ("Return", Key::Enter),
    ("semicolon", Key::Semicolon),
    ("apostrophe", Key::Quote),
    ("backslash", Key::Backslash),
    // ISO key left of Z
    ("less", Key::Backslash2),
    ("comma", Key::Comma),
    ("period", Key::Fullstop),
    ("slash", Key::Slash),
    ("space", Key::Space),
    ("Insert", Key::Insert),
    ("Delete", Key::Delete),
    ("Home", Key::Home),
    ("End", Key::End),
    ("Prior", Key::PgUp),
    ("Page_Up", Key::PgUp),
    ("Next", Key::PgDn),
    ("Page_Down", Key::PgDn),
    ("Left", Key::Left),
    ("Right", Key::Right),
    ("Up", Key::Up),
    ("Down", Key::Down),
    ("Print", Key::PrintScreen),
    ("Shift_L", Key::LShift),
    ("Shift_R", Key::RShift),
    ("Control_L", Key::LCtrl),
    ("Control_R", Key::RCtrl),
    ("Alt_L", Key::Alt),
    ("Alt_R", Key::AltGr),
    ("ISO_Level3_Shift", Key::AltGr),
    ("Meta_L", Key::LWin),
    ("Super_L", Key::LWin),
    ("Meta_R", Key::RWin),
    ("Super_R", Key::RWin),
    ("Menu", Key::Menu),
    ("Scroll_Lock", Key::ScrollLock),
    ("Num_Lock", Key::NumLock),
    ("Caps_Lock", Key::CapsLock),
];

static INDEX: LazyLock<FnvHashMap<&'static str, Key>> = LazyLock::new(|| {
    let mut map = FnvHashMap::default();
    for &(sym, key) in TRANSLATION_TABLE {
        // first entry wins, matching a linear scan of the table
        map.entry(sym).or_insert(key);
    }
    map
});

/// Logical key for a backend symbol name. Symbol names are case sensitive.
pub fn lookup(symbol: &str) -> Option<LogicalKey> {
    INDEX.get(symbol).map(|k| k.code())
}

/// Digit key for a symbol that names a single decimal digit.
pub fn digit_key(symbol: &str) -> Option<LogicalKey> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c
            .to_digit(10)
            .and_then(|d| Key::digit(d as u8))
            .map(Key::code),
        _ => None,
    }
}
