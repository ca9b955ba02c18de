use crate::keymap::HardwareCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Press,
    Release,
}

/// One raw key action as delivered by the backend's event-dispatch thread.
///
/// `state` is the backend modifier field (X11 style bits: Shift=1, Lock=2,
/// Control=4, Mod1..Mod5=8..128). Its meaning depends on the modifier mode.
/// `unichar` is the input method's decoded character and `composed` is set
/// when the input method absorbed the event into a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKeyEvent {
    pub code: HardwareCode,
    pub action: KeyAction,
    #[serde(default)]
    pub state: u16,
    #[serde(default)]
    pub unichar: Option<char>,
    #[serde(default)]
    pub composed: bool,
}

impl RawKeyEvent {
    pub fn press(code: HardwareCode) -> Self {
        Self {
            code,
            action: KeyAction::Press,
            state: 0,
            unichar: None,
            composed: false,
        }
    }

    pub fn release(code: HardwareCode) -> Self {
        Self {
            action: KeyAction::Release,
            ..Self::press(code)
        }
    }

    pub fn with_state(mut self, state: u16) -> Self {
        self.state = state;
        self
    }

    pub fn with_char(mut self, c: char) -> Self {
        self.unichar = Some(c);
        self
    }

    pub fn composed(mut self) -> Self {
        self.composed = true;
        self
    }

    pub fn is_press(&self) -> bool {
        self.action == KeyAction::Press
    }
}
