use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Raw physical key identifier reported by a windowing backend.
pub type HardwareCode = u32;

/// Symbol name a backend reports for a key slot that produces nothing.
pub const NO_SYMBOL: &str = "NoSymbol";

/// Number of modifier slots a backend exposes (Shift, Lock, Control, Mod1..Mod5).
pub const MODIFIER_SLOT_COUNT: usize = 8;

/// Snapshot of a live hardware keymap, as returned by a backend query.
///
/// `symbols[i]` holds the ordered symbol names of hardware code `min_code + i`;
/// index 0 is the primary symbol, index 1 the secondary (shifted) one.
/// `modifiers[slot]` lists the hardware codes acting as that modifier slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyboardDescription {
    #[serde(default)]
    pub name: String,
    pub min_code: HardwareCode,
    pub max_code: HardwareCode,
    pub symbols: Vec<Vec<String>>,
    #[serde(default)]
    pub modifiers: Vec<Vec<HardwareCode>>,
}

impl KeyboardDescription {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read keymap file: {}", e))?;

        let desc: KeyboardDescription = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse keymap JSON: {}", e))?;

        desc.validate()?;
        Ok(desc)
    }

    /// Checks the code range and the per-code symbol table agree.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_code > self.max_code {
            return Err(format!(
                "min_code {} is above max_code {}",
                self.min_code, self.max_code
            ));
        }
        let expected = self.key_count();
        if self.symbols.len() != expected {
            return Err(format!(
                "expected symbols for {} codes ({}..={}), got {}",
                expected,
                self.min_code,
                self.max_code,
                self.symbols.len()
            ));
        }
        if self.modifiers.len() > MODIFIER_SLOT_COUNT {
            return Err(format!(
                "{} modifier slots reported, at most {} are supported",
                self.modifiers.len(),
                MODIFIER_SLOT_COUNT
            ));
        }
        Ok(())
    }

    pub fn key_count(&self) -> usize {
        if self.min_code > self.max_code {
            return 0;
        }
        (self.max_code - self.min_code) as usize + 1
    }

    pub fn contains(&self, code: HardwareCode) -> bool {
        code >= self.min_code && code <= self.max_code
    }

    /// Widest symbol list of any code (X11's "symbols per key").
    pub fn symbols_per_key(&self) -> usize {
        self.symbols.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn symbols_for(&self, code: HardwareCode) -> &[String] {
        if !self.contains(code) {
            return &[];
        }
        self.symbols
            .get((code - self.min_code) as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Primary symbol of a code, `None` when the backend reports no symbol.
    pub fn primary(&self, code: HardwareCode) -> Option<&str> {
        self.symbol_at(code, 0)
    }

    /// Secondary symbol of a code, `None` when absent.
    pub fn secondary(&self, code: HardwareCode) -> Option<&str> {
        self.symbol_at(code, 1)
    }

    fn symbol_at(&self, code: HardwareCode, idx: usize) -> Option<&str> {
        self.symbols_for(code)
            .get(idx)
            .map(String::as_str)
            .filter(|s| !s.is_empty() && *s != NO_SYMBOL)
    }

    /// Codes designated as the given modifier slot. Zero entries are padding.
    pub fn modifier_codes(&self, slot: usize) -> impl Iterator<Item = HardwareCode> + '_ {
        self.modifiers
            .get(slot)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&c| c != 0)
    }

    /// Stable SHA-256 of the description, used to spot unchanged layouts.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hex::encode(hasher.finalize())
    }
}

/// Externally supplied forced assignment of a logical key to a hardware code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOverride {
    pub code: HardwareCode,
    pub key: u16,
}
