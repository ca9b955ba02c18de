pub mod config;
pub mod event;
pub mod keymap;

pub use self::config::{DriverConfig, ModifierMode};
pub use self::event::{KeyAction, RawKeyEvent};
pub use self::keymap::{
    HardwareCode, KeyOverride, KeyboardDescription, MODIFIER_SLOT_COUNT, NO_SYMBOL,
};
