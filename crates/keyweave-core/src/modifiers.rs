use bitflags::bitflags;
use keyweave_protocol::{HardwareCode, KeyAction, ModifierMode, RawKeyEvent, MODIFIER_SLOT_COUNT};
use serde::{Deserialize, Serialize};
use tracing::trace;

bitflags! {
    /// Logical modifier state delivered with every press event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ModifierMask: u16 {
        const SHIFT = 0x0001;
        const CAPSLOCK = 0x0002;
        const CTRL = 0x0004;
        const ALT = 0x0008;
        const NUMLOCK = 0x0010;
        const SCROLLLOCK = 0x0020;
        const META = 0x0040;
        const ALTGR = 0x0080;
    }
}

bitflags! {
    /// Modifier bits of the backend's per-event state field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BackendState: u16 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD2 = 1 << 4;
        const MOD3 = 1 << 5;
        const MOD4 = 1 << 6;
        const MOD5 = 1 << 7;
    }
}

impl ModifierMask {
    /// Lock states that have an indicator LED.
    pub const LEDS: ModifierMask = ModifierMask::NUMLOCK
        .union(ModifierMask::CAPSLOCK)
        .union(ModifierMask::SCROLLLOCK);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotBehavior {
    /// Active while one of the slot's keys is held.
    Normal,
    /// Flips on every press, ignores releases.
    Toggle,
}

#[derive(Debug, Clone, Copy)]
pub struct ModifierSlot {
    pub flag: ModifierMask,
    pub backend: BackendState,
    pub behavior: SlotBehavior,
}

/// Backend modifier slot `i` drives logical modifier `MODIFIER_SLOTS[i].flag`.
pub const MODIFIER_SLOTS: [ModifierSlot; MODIFIER_SLOT_COUNT] = [
    ModifierSlot {
        flag: ModifierMask::SHIFT,
        backend: BackendState::SHIFT,
        behavior: SlotBehavior::Normal,
    },
    ModifierSlot {
        flag: ModifierMask::CAPSLOCK,
        backend: BackendState::LOCK,
        behavior: SlotBehavior::Toggle,
    },
    ModifierSlot {
        flag: ModifierMask::CTRL,
        backend: BackendState::CONTROL,
        behavior: SlotBehavior::Normal,
    },
    ModifierSlot {
        flag: ModifierMask::ALT,
        backend: BackendState::MOD1,
        behavior: SlotBehavior::Normal,
    },
    ModifierSlot {
        flag: ModifierMask::NUMLOCK,
        backend: BackendState::MOD2,
        behavior: SlotBehavior::Toggle,
    },
    ModifierSlot {
        flag: ModifierMask::SCROLLLOCK,
        backend: BackendState::MOD3,
        behavior: SlotBehavior::Toggle,
    },
    ModifierSlot {
        flag: ModifierMask::META,
        backend: BackendState::MOD4,
        behavior: SlotBehavior::Normal,
    },
    ModifierSlot {
        flag: ModifierMask::ALTGR,
        backend: BackendState::MOD5,
        behavior: SlotBehavior::Normal,
    },
];

impl ModifierSlot {
    fn apply(&self, mask: &mut ModifierMask, action: KeyAction) {
        match (action, self.behavior) {
            (KeyAction::Press, SlotBehavior::Toggle) => mask.toggle(self.flag),
            (KeyAction::Press, SlotBehavior::Normal) => mask.insert(self.flag),
            (KeyAction::Release, SlotBehavior::Normal) => mask.remove(self.flag),
            (KeyAction::Release, SlotBehavior::Toggle) => {}
        }
    }
}

/// Hardware codes acting as each modifier slot. A slot without codes is
/// treated as permanently inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifierMap {
    slots: [Vec<HardwareCode>; MODIFIER_SLOT_COUNT],
}

impl ModifierMap {
    pub fn new(slots: [Vec<HardwareCode>; MODIFIER_SLOT_COUNT]) -> Self {
        let slots = slots.map(|mut codes| {
            codes.retain(|&c| c != 0);
            codes
        });
        Self { slots }
    }

    pub fn codes(&self, slot: usize) -> &[HardwareCode] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_active(&self, slot: usize) -> bool {
        !self.codes(slot).is_empty()
    }

    pub fn contains(&self, slot: usize, code: HardwareCode) -> bool {
        self.codes(slot).contains(&code)
    }

    /// True when the code drives any modifier slot.
    pub fn is_modifier_code(&self, code: HardwareCode) -> bool {
        (0..MODIFIER_SLOT_COUNT).any(|slot| self.contains(slot, code))
    }
}

/// Computes the post-event modifier mask for every raw key event.
#[derive(Debug, Clone)]
pub struct ModifierTracker {
    mode: ModifierMode,
    mask: ModifierMask,
}

impl ModifierTracker {
    pub fn new(mode: ModifierMode) -> Self {
        Self {
            mode,
            mask: ModifierMask::empty(),
        }
    }

    pub fn mode(&self) -> ModifierMode {
        self.mode
    }

    /// Mask after the most recent event.
    pub fn current(&self) -> ModifierMask {
        self.mask
    }

    /// Feeds one raw event. In `Tracked` mode the event's state field is
    /// rewritten to carry the tracked modifiers.
    pub fn update(&mut self, event: &mut RawKeyEvent, map: &ModifierMap) -> ModifierMask {
        match self.mode {
            ModifierMode::Reported => self.update_reported(event, map),
            ModifierMode::Tracked => self.update_tracked(event, map),
        }
        trace!(
            "modifiers after code {} {:?}: {:?}",
            event.code,
            event.action,
            self.mask
        );
        self.mask
    }

    fn update_reported(&mut self, event: &RawKeyEvent, map: &ModifierMap) {
        let state = BackendState::from_bits_truncate(event.state);
        let mut mask = ModifierMask::empty();

        for (idx, slot) in MODIFIER_SLOTS.iter().enumerate() {
            if !map.is_active(idx) {
                continue;
            }
            // backend state is pre-event
            if state.contains(slot.backend) {
                mask.insert(slot.flag);
            }
            if map.contains(idx, event.code) {
                slot.apply(&mut mask, event.action);
            }
        }
        self.mask = mask;
    }

    fn update_tracked(&mut self, event: &mut RawKeyEvent, map: &ModifierMap) {
        for (idx, slot) in MODIFIER_SLOTS.iter().enumerate() {
            if !map.is_active(idx) {
                // a rebuild may have emptied the slot while its bit was set
                self.mask.remove(slot.flag);
                continue;
            }
            if map.contains(idx, event.code) {
                slot.apply(&mut self.mask, event.action);
            }
            if self.mask.contains(slot.flag) {
                event.state |= slot.backend.bits();
            }
        }
    }
}
