use crate::error::{KeyweaveError, KwResult};
use crate::modifiers::ModifierMask;
use keyweave_protocol::{KeyboardDescription, ModifierMode};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, info};

/// What a windowing backend must provide to drive a keyboard.
pub trait KeyboardBackend: Send + Sync {
    fn name(&self) -> &str;

    /// How the backend's per-event modifier field should be read.
    fn modifier_mode(&self) -> ModifierMode;

    /// Current hardware keymap. Called without the keyboard lock held.
    fn query_keymap(&self) -> KwResult<KeyboardDescription>;

    fn set_leds(&self, leds: ModifierMask) -> KwResult<()>;
}

/// Backend serving a fixed description, from memory or a JSON file.
#[derive(Debug)]
pub struct StaticBackend {
    name: String,
    mode: ModifierMode,
    description: RwLock<Option<KeyboardDescription>>,
    leds: Mutex<Option<ModifierMask>>,
}

impl StaticBackend {
    pub fn from_description(description: KeyboardDescription, mode: ModifierMode) -> Self {
        Self {
            name: format!("static:{}", description.name),
            mode,
            description: RwLock::new(Some(description)),
            leds: Mutex::new(None),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P, mode: ModifierMode) -> KwResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let description: KeyboardDescription = serde_json::from_str(&content)?;
        description
            .validate()
            .map_err(|e| KeyweaveError::InvalidKeymap(format!("{}: {}", path.display(), e)))?;
        info!("📂 Loaded keymap '{}' from {:?}", description.name, path);
        Ok(Self::from_description(description, mode))
    }

    /// Swaps the served description, as after a layout change.
    pub fn replace_description(&self, description: KeyboardDescription) {
        debug!("Backend keymap replaced by '{}'", description.name);
        *self
            .description
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(description);
    }

    /// Makes every following query fail until a description is set again.
    pub fn disconnect(&self) {
        *self
            .description
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Last LED mask requested through `set_leds`.
    pub fn last_leds(&self) -> Option<ModifierMask> {
        *self.leds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyboardBackend for StaticBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn modifier_mode(&self) -> ModifierMode {
        self.mode
    }

    fn query_keymap(&self) -> KwResult<KeyboardDescription> {
        self.description
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| KeyweaveError::Backend(format!("{}: no keymap available", self.name)))
    }

    fn set_leds(&self, leds: ModifierMask) -> KwResult<()> {
        debug!("{}: LEDs {:?}", self.name, leds);
        *self.leds.lock().unwrap_or_else(PoisonError::into_inner) = Some(leds);
        Ok(())
    }
}
