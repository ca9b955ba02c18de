// Re-export types from the protocol crate so they are accessible via keyweave_core::*
pub use keyweave_protocol::config;
pub use keyweave_protocol::event;
pub use keyweave_protocol::keymap;

// Internal Modules
pub mod backend;
pub mod consts;
pub mod error;
pub mod keyboard;
pub mod keycodes;
pub mod machine;
pub mod mapping;
pub mod modifiers;
pub mod overrides;
pub mod sink;
pub mod state;
pub mod symbols;
pub mod terminate;

pub use self::backend::{KeyboardBackend, StaticBackend};
pub use self::error::{KeyweaveError, KwResult};
pub use self::keyboard::{Keyboard, KeyboardOptions, RebuildOutcome};
pub use self::keycodes::{Key, LogicalKey};
pub use self::mapping::{BuildReport, KeyMapping, KeySlot, MappingParams};
pub use self::modifiers::{ModifierMask, ModifierTracker};
pub use self::sink::{EventSink, KeyEvent, KeyEventKind, QueueSink};
pub use self::state::KeyboardState;
