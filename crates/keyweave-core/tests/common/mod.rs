#![allow(dead_code)] // not every test file uses every helper

use keyweave_core::config::ModifierMode;
use keyweave_core::keymap::{HardwareCode, KeyboardDescription, NO_SYMBOL};
use keyweave_core::terminate::Terminator;
use keyweave_core::{Keyboard, KeyboardOptions, QueueSink, StaticBackend};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// XFree86 keycodes of the US layout below
pub const ESCAPE: HardwareCode = 9;
pub const DIGIT_1: HardwareCode = 10;
pub const DIGIT_0: HardwareCode = 19;
pub const Q: HardwareCode = 24;
pub const CTRL_L: HardwareCode = 37;
pub const A: HardwareCode = 38;
pub const S: HardwareCode = 39;
pub const SHIFT_L: HardwareCode = 50;
pub const SHIFT_R: HardwareCode = 62;
pub const ALT_L: HardwareCode = 64;
pub const SPACE: HardwareCode = 65;
pub const CAPS_LOCK: HardwareCode = 66;
pub const NUM_LOCK: HardwareCode = 77;
pub const SCROLL_LOCK: HardwareCode = 78;
pub const KP_7: HardwareCode = 79;
pub const END: HardwareCode = 103;
pub const DELETE: HardwareCode = 107;
pub const KP_ENTER: HardwareCode = 108;
pub const CTRL_R: HardwareCode = 109;
pub const PAUSE: HardwareCode = 110;
pub const ALT_R: HardwareCode = 113;
pub const EXTRA: HardwareCode = 118;
pub const MIN_CODE: HardwareCode = 8;
pub const MAX_CODE: HardwareCode = 120;

/// Builder for KeyboardDescription to clean up tests
pub struct KeymapBuilder {
    desc: KeyboardDescription,
}

impl KeymapBuilder {
    /// Every code starts out with no symbol.
    pub fn new(min_code: HardwareCode, max_code: HardwareCode) -> Self {
        Self {
            desc: KeyboardDescription {
                name: "test".to_string(),
                min_code,
                max_code,
                symbols: vec![vec![NO_SYMBOL.to_string()]; (max_code - min_code + 1) as usize],
                modifiers: vec![vec![]; 8],
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.desc.name = name.to_string();
        self
    }

    pub fn key(mut self, code: HardwareCode, symbols: &[&str]) -> Self {
        let idx = (code - self.desc.min_code) as usize;
        self.desc.symbols[idx] = symbols.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn modifier(mut self, slot: usize, codes: &[HardwareCode]) -> Self {
        self.desc.modifiers[slot] = codes.to_vec();
        self
    }

    pub fn build(self) -> KeyboardDescription {
        self.desc
    }
}

/// A US 105-key keymap as an XFree86 server reports it.
pub fn us_keymap() -> KeyboardDescription {
    let mut b = KeymapBuilder::new(MIN_CODE, MAX_CODE)
        .name("us")
        .key(ESCAPE, &["Escape"]);

    let digits = [
        ("1", "exclam"),
        ("2", "at"),
        ("3", "numbersign"),
        ("4", "dollar"),
        ("5", "percent"),
        ("6", "asciicircum"),
        ("7", "ampersand"),
        ("8", "asterisk"),
        ("9", "parenleft"),
        ("0", "parenright"),
    ];
    for (i, (plain, shifted)) in digits.iter().enumerate() {
        b = b.key(DIGIT_1 + i as HardwareCode, &[plain, shifted]);
    }

    for (i, c) in "qwertyuiop".chars().enumerate() {
        let lower = c.to_string();
        let upper = c.to_ascii_uppercase().to_string();
        b = b.key(Q + i as HardwareCode, &[&lower, &upper]);
    }
    for (i, c) in "asdfghjkl".chars().enumerate() {
        let lower = c.to_string();
        let upper = c.to_ascii_uppercase().to_string();
        b = b.key(A + i as HardwareCode, &[&lower, &upper]);
    }
    for (i, c) in "zxcvbnm".chars().enumerate() {
        let lower = c.to_string();
        let upper = c.to_ascii_uppercase().to_string();
        b = b.key(52 + i as HardwareCode, &[&lower, &upper]);
    }

    let fkeys = ["F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10"];
    for (i, f) in fkeys.iter().enumerate() {
        b = b.key(67 + i as HardwareCode, &[f]);
    }

    b.key(20, &["minus", "underscore"])
        .key(21, &["equal", "plus"])
        .key(22, &["BackSpace"])
        .key(23, &["Tab", "ISO_Left_Tab"])
        .key(34, &["bracketleft", "braceleft"])
        .key(35, &["bracketright", "braceright"])
        .key(36, &["Return"])
        .key(CTRL_L, &["Control_L"])
        .key(47, &["semicolon", "colon"])
        .key(48, &["apostrophe", "quotedbl"])
        .key(49, &["grave", "asciitilde"])
        .key(SHIFT_L, &["Shift_L"])
        .key(51, &["backslash", "bar"])
        .key(59, &["comma", "less"])
        .key(60, &["period", "greater"])
        .key(61, &["slash", "question"])
        .key(SHIFT_R, &["Shift_R"])
        .key(63, &["KP_Multiply"])
        .key(ALT_L, &["Alt_L", "Meta_L"])
        .key(SPACE, &["space"])
        .key(CAPS_LOCK, &["Caps_Lock"])
        .key(NUM_LOCK, &["Num_Lock", "Pointer_EnableKeys"])
        .key(SCROLL_LOCK, &["Scroll_Lock"])
        .key(KP_7, &["KP_Home", "KP_7"])
        .key(80, &["KP_Up", "KP_8"])
        .key(81, &["KP_Prior", "KP_9"])
        .key(82, &["KP_Subtract"])
        .key(83, &["KP_Left", "KP_4"])
        .key(84, &["KP_Begin", "KP_5"])
        .key(85, &["KP_Right", "KP_6"])
        .key(86, &["KP_Add"])
        .key(87, &["KP_End", "KP_1"])
        .key(88, &["KP_Down", "KP_2"])
        .key(89, &["KP_Next", "KP_3"])
        .key(90, &["KP_Insert", "KP_0"])
        .key(91, &["KP_Delete", "KP_Decimal"])
        .key(94, &["less", "greater"])
        .key(95, &["F11"])
        .key(96, &["F12"])
        .key(97, &["Home"])
        .key(98, &["Up"])
        .key(99, &["Prior"])
        .key(100, &["Left"])
        .key(102, &["Right"])
        .key(END, &["End"])
        .key(104, &["Down"])
        .key(105, &["Next"])
        .key(106, &["Insert"])
        .key(DELETE, &["Delete"])
        .key(KP_ENTER, &["KP_Enter"])
        .key(CTRL_R, &["Control_R"])
        .key(PAUSE, &["Pause", "Break"])
        .key(111, &["Print", "Sys_Req"])
        .key(112, &["KP_Divide"])
        .key(ALT_R, &["Alt_R", "Meta_R"])
        .key(115, &["Super_L"])
        .key(116, &["Super_R"])
        .key(117, &["Menu"])
        // vendor key the symbol table does not know
        .key(EXTRA, &["XF86AudioMute"])
        .modifier(0, &[SHIFT_L, SHIFT_R])
        .modifier(1, &[CAPS_LOCK])
        .modifier(2, &[CTRL_L, CTRL_R])
        .modifier(3, &[ALT_L])
        .modifier(4, &[NUM_LOCK])
        .modifier(6, &[115, 116])
        .modifier(7, &[ALT_R])
        .build()
}

pub type TestKeyboard = Keyboard<StaticBackend, QueueSink>;

pub fn keyboard_with(
    desc: KeyboardDescription,
    mode: ModifierMode,
    options: KeyboardOptions,
) -> TestKeyboard {
    let kb = Keyboard::new(
        StaticBackend::from_description(desc, mode),
        QueueSink::with_capacity(1024),
        options,
    );
    kb.rebuild_mapping();
    kb
}

pub fn us_keyboard(mode: ModifierMode) -> TestKeyboard {
    keyboard_with(us_keymap(), mode, KeyboardOptions::default())
}

/// Counts termination requests instead of signalling anyone.
#[derive(Clone, Default)]
pub struct CountingTerminator {
    pub calls: Arc<AtomicUsize>,
}

impl CountingTerminator {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Terminator for CountingTerminator {
    fn terminate(&self, _pid: u32) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
