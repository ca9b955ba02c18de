use crate::consts::{MAX_KEYS, MODIFIERS_START};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Named logical keys. The discriminant is the portable key code.
///
/// Codes 107..=214 have no name; the mapping builder hands them out to
/// hardware keys whose symbols it does not recognise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, FromRepr, IntoStaticStr, Display,
)]
#[strum(serialize_all = "UPPERCASE")]
#[repr(u16)]
pub enum Key {
    A = 1,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    #[strum(to_string = "0")]
    Key0 = 27,
    #[strum(to_string = "1")]
    Key1,
    #[strum(to_string = "2")]
    Key2,
    #[strum(to_string = "3")]
    Key3,
    #[strum(to_string = "4")]
    Key4,
    #[strum(to_string = "5")]
    Key5,
    #[strum(to_string = "6")]
    Key6,
    #[strum(to_string = "7")]
    Key7,
    #[strum(to_string = "8")]
    Key8,
    #[strum(to_string = "9")]
    Key9,

    #[strum(to_string = "PAD 0")]
    Pad0 = 37,
    #[strum(to_string = "PAD 1")]
    Pad1,
    #[strum(to_string = "PAD 2")]
    Pad2,
    #[strum(to_string = "PAD 3")]
    Pad3,
    #[strum(to_string = "PAD 4")]
    Pad4,
    #[strum(to_string = "PAD 5")]
    Pad5,
    #[strum(to_string = "PAD 6")]
    Pad6,
    #[strum(to_string = "PAD 7")]
    Pad7,
    #[strum(to_string = "PAD 8")]
    Pad8,
    #[strum(to_string = "PAD 9")]
    Pad9,

    F1 = 47,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Escape = 59,
    Tilde,
    Minus,
    Equals,
    Backspace,
    Tab,
    #[strum(to_string = "OPEN BRACE")]
    OpenBrace,
    #[strum(to_string = "CLOSE BRACE")]
    CloseBrace,
    Enter,
    Semicolon,
    Quote,
    Backslash,
    Backslash2,
    Comma,
    Fullstop,
    Slash,
    Space,

    Insert = 76,
    Delete,
    Home,
    End,
    #[strum(to_string = "PAGE UP")]
    PgUp,
    #[strum(to_string = "PAGE DOWN")]
    PgDn,
    Left,
    Right,
    Up,
    Down,

    #[strum(to_string = "PAD /")]
    PadSlash = 86,
    #[strum(to_string = "PAD *")]
    PadAsterisk,
    #[strum(to_string = "PAD -")]
    PadMinus,
    #[strum(to_string = "PAD +")]
    PadPlus,
    #[strum(to_string = "PAD DELETE")]
    PadDelete,
    #[strum(to_string = "PAD ENTER")]
    PadEnter,

    #[strum(to_string = "PRINT SCREEN")]
    PrintScreen = 92,
    Pause,

    #[strum(to_string = "ABNT C1")]
    AbntC1 = 94,
    Yen,
    Kana,
    Convert,
    #[strum(to_string = "NO CONVERT")]
    NoConvert,
    At,
    Circumflex,
    Colon2,
    Kanji,
    #[strum(to_string = "PAD =")]
    PadEquals,
    Backquote,
    Semicolon2,
    Command,

    #[strum(to_string = "LEFT SHIFT")]
    LShift = 215,
    #[strum(to_string = "RIGHT SHIFT")]
    RShift,
    #[strum(to_string = "LEFT CTRL")]
    LCtrl,
    #[strum(to_string = "RIGHT CTRL")]
    RCtrl,
    Alt,
    AltGr,
    #[strum(to_string = "LEFT WIN")]
    LWin,
    #[strum(to_string = "RIGHT WIN")]
    RWin,
    Menu,
    #[strum(to_string = "SCROLL LOCK")]
    ScrollLock,
    #[strum(to_string = "NUM LOCK")]
    NumLock,
    #[strum(to_string = "CAPS LOCK")]
    CapsLock,
}

impl Key {
    pub fn code(self) -> LogicalKey {
        LogicalKey(self as u16)
    }

    /// The digit key for `0..=9`.
    pub fn digit(n: u8) -> Option<Key> {
        if n > 9 {
            return None;
        }
        Key::from_repr(Key::Key0 as u16 + n as u16)
    }

    pub fn all() -> impl Iterator<Item = Key> {
        Key::iter()
    }

    /// Reverse of the display name, ignoring case ("pad enter" -> PadEnter).
    pub fn from_label(label: &str) -> Option<Key> {
        let label = label.trim();
        Key::iter().find(|k| k.to_string().eq_ignore_ascii_case(label))
    }
}

/// Portable application-facing key code in `0..MAX_KEYS`; 0 means "no key".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LogicalKey(pub u16);

impl LogicalKey {
    pub const NONE: LogicalKey = LogicalKey(0);

    /// Checked constructor: `None` for 0 and codes outside the key space.
    pub fn new(code: u16) -> Option<LogicalKey> {
        let key = LogicalKey(code);
        key.is_valid().then_some(key)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0 && (self.0 as usize) < MAX_KEYS
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn named(self) -> Option<Key> {
        Key::from_repr(self.0)
    }

    pub fn is_modifier(self) -> bool {
        self.0 >= MODIFIERS_START && self.is_valid()
    }

    /// Built-in name of the code, or a generic label for unnamed codes.
    pub fn generic_name(self) -> String {
        match self.named() {
            Some(key) => key.to_string(),
            None => format!("unnamed key {}", self.0),
        }
    }
}

impl From<Key> for LogicalKey {
    fn from(key: Key) -> Self {
        key.code()
    }
}

impl PartialEq<Key> for LogicalKey {
    fn eq(&self, other: &Key) -> bool {
        self.0 == *other as u16
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.named() {
            Some(key) => write!(f, "{}", <&'static str>::from(key)),
            None => write!(f, "#{}", self.0),
        }
    }
}
