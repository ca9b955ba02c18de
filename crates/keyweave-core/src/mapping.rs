use crate::consts::{MAX_KEYS, SENTINEL_IGNORED, SENTINEL_UNRESOLVED};
use crate::error::{KeyweaveError, KwResult};
use crate::keycodes::LogicalKey;
use crate::modifiers::ModifierMap;
use crate::symbols;
use itertools::Itertools;
use keyweave_protocol::{HardwareCode, KeyOverride, KeyboardDescription, MODIFIER_SLOT_COUNT};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

/// Resolution state of one hardware code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeySlot {
    Assigned(LogicalKey),
    /// The backend reports no symbol; the key never produces events.
    Ignored,
    /// No logical key could be given to the code.
    Unresolved,
}

impl KeySlot {
    /// Integer view: the key code, -1 for ignored, 0 for unresolved.
    pub fn sentinel(self) -> i32 {
        match self {
            KeySlot::Assigned(key) => key.0 as i32,
            KeySlot::Ignored => SENTINEL_IGNORED,
            KeySlot::Unresolved => SENTINEL_UNRESOLVED,
        }
    }

    pub fn key(self) -> Option<LogicalKey> {
        match self {
            KeySlot::Assigned(key) => Some(key),
            _ => None,
        }
    }
}

/// Hardware code to logical key table for one code range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeycodeMap {
    min_code: HardwareCode,
    slots: Vec<KeySlot>,
}

impl KeycodeMap {
    fn with_range(min_code: HardwareCode, count: usize) -> Self {
        Self {
            min_code,
            slots: vec![KeySlot::Unresolved; count],
        }
    }

    fn index(&self, code: HardwareCode) -> Option<usize> {
        let idx = code.checked_sub(self.min_code)? as usize;
        (idx < self.slots.len()).then_some(idx)
    }

    /// Slot of a code. Codes outside the built range are ignored.
    pub fn get(&self, code: HardwareCode) -> KeySlot {
        self.index(code)
            .map(|idx| self.slots[idx])
            .unwrap_or(KeySlot::Ignored)
    }

    fn set(&mut self, code: HardwareCode, slot: KeySlot) {
        if let Some(idx) = self.index(code) {
            self.slots[idx] = slot;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HardwareCode, KeySlot)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, &slot)| (self.min_code + idx as HardwareCode, slot))
    }
}

/// Human-readable label per logical key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNames {
    labels: Vec<Option<String>>,
}

impl Default for KeyNames {
    fn default() -> Self {
        Self {
            labels: vec![None; MAX_KEYS],
        }
    }
}

impl KeyNames {
    fn set(&mut self, key: LogicalKey, label: &str) {
        if let Some(slot) = self.labels.get_mut(key.index()) {
            *slot = Some(label.to_string());
        }
    }

    fn clear(&mut self, key: LogicalKey) {
        if let Some(slot) = self.labels.get_mut(key.index()) {
            *slot = None;
        }
    }

    /// Hardware label if the key was assigned one, else the built-in name.
    pub fn name_of(&self, key: LogicalKey) -> String {
        if !key.is_valid() {
            return "(none)".to_string();
        }
        match &self.labels[key.index()] {
            Some(label) => label.clone(),
            None => key.generic_name(),
        }
    }
}

/// The live tables of one keyboard: keycode map, modifier map, key names.
#[derive(Debug, Clone)]
pub struct KeyMapping {
    keycodes: KeycodeMap,
    modifiers: ModifierMap,
    names: KeyNames,
    used: Vec<bool>,
    labels_by_code: Vec<Option<String>>,
    fingerprint: Option<String>,
}

impl Default for KeyMapping {
    fn default() -> Self {
        Self::ignored()
    }
}

impl KeyMapping {
    /// Mapping that ignores every hardware code.
    pub fn ignored() -> Self {
        Self::with_range(0, 0)
    }

    fn with_range(min_code: HardwareCode, count: usize) -> Self {
        let mut used = vec![false; MAX_KEYS];
        used[0] = true;
        Self {
            keycodes: KeycodeMap::with_range(min_code, count),
            modifiers: ModifierMap::default(),
            names: KeyNames::default(),
            used,
            labels_by_code: vec![None; count],
            fingerprint: None,
        }
    }

    pub fn lookup(&self, code: HardwareCode) -> KeySlot {
        self.keycodes.get(code)
    }

    pub fn keycodes(&self) -> &KeycodeMap {
        &self.keycodes
    }

    pub fn modifiers(&self) -> &ModifierMap {
        &self.modifiers
    }

    pub fn names(&self) -> &KeyNames {
        &self.names
    }

    pub fn name_of(&self, key: LogicalKey) -> String {
        self.names.name_of(key)
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn is_used(&self, key: LogicalKey) -> bool {
        self.used.get(key.index()).copied().unwrap_or(false)
    }

    fn assign(&mut self, code: HardwareCode, key: LogicalKey, label: Option<&str>) {
        self.keycodes.set(code, KeySlot::Assigned(key));
        if let Some(label) = label {
            self.names.set(key, label);
        }
        self.used[key.index()] = true;
    }

    /// Drops the label and used mark of a key no code maps to any more.
    fn release_if_unmapped(&mut self, key: LogicalKey) {
        if self.keycodes.iter().any(|(_, slot)| slot == KeySlot::Assigned(key)) {
            return;
        }
        self.names.clear(key);
        self.used[key.index()] = false;
    }

    pub(crate) fn has_free_key(&self) -> bool {
        self.used.iter().any(|used| !used)
    }

    /// Gives an unresolved code the lowest unused logical key.
    ///
    /// Returns `None` and leaves the code unresolved once the key space is
    /// exhausted.
    pub(crate) fn assign_fallback(&mut self, code: HardwareCode) -> Option<LogicalKey> {
        let free = (1..MAX_KEYS).find(|&k| !self.used[k])?;
        let key = LogicalKey(free as u16);
        let label = self
            .keycodes
            .index(code)
            .and_then(|idx| self.labels_by_code[idx].clone());
        self.assign(code, key, label.as_deref());
        Some(key)
    }
}

/// Diagnostics of one mapping build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub keymap: String,
    pub min_code: HardwareCode,
    pub max_code: HardwareCode,
    pub key_count: usize,
    pub symbols_per_key: usize,
    pub assigned: usize,
    pub ignored: usize,
    /// Codes whose symbol was unknown and had to wait for a fallback key.
    pub deferred: Vec<HardwareCode>,
    pub fallbacks: Vec<(HardwareCode, LogicalKey)>,
    /// Codes left without a key because the key space ran out.
    pub unassigned: Vec<HardwareCode>,
    /// Logical keys shared by more than one hardware code.
    pub double_mappings: Vec<(LogicalKey, Vec<HardwareCode>)>,
    pub overrides_applied: Vec<KeyOverride>,
    pub overrides_rejected: Vec<KeyOverride>,
    pub fingerprint: String,
    /// The description matched the previous build's fingerprint.
    pub unchanged: bool,
}

impl BuildReport {
    pub fn capacity_exceeded(&self) -> bool {
        !self.unassigned.is_empty()
    }
}

#[derive(TypedBuilder)]
pub struct MappingParams<'a> {
    pub description: &'a KeyboardDescription,
    #[builder(default)]
    pub overrides: &'a [KeyOverride],
    /// Fingerprint of the mapping being replaced, if any.
    #[builder(default)]
    pub previous_fingerprint: Option<&'a str>,
}

impl MappingParams<'_> {
    pub fn build_mapping(self) -> KwResult<(Arc<KeyMapping>, BuildReport)> {
        let desc = self.description;
        desc.validate().map_err(KeyweaveError::InvalidKeymap)?;

        let fingerprint = desc.fingerprint();
        let unchanged = self.previous_fingerprint == Some(fingerprint.as_str());

        let mut mapping = KeyMapping::with_range(desc.min_code, desc.key_count());
        mapping.labels_by_code = (desc.min_code..=desc.max_code)
            .map(|code| desc.primary(code).map(str::to_string))
            .collect();

        let mut report = BuildReport {
            keymap: desc.name.clone(),
            min_code: desc.min_code,
            max_code: desc.max_code,
            key_count: desc.key_count(),
            symbols_per_key: desc.symbols_per_key(),
            unchanged,
            ..Default::default()
        };

        info!(
            "Keymap '{}': {} keys, {} symbols per key{}",
            desc.name,
            report.key_count,
            report.symbols_per_key,
            if unchanged { " (unchanged)" } else { "" }
        );

        // 1. Symbol pass
        for code in desc.min_code..=desc.max_code {
            let primary = desc.primary(code);
            let secondary = desc.secondary(code);

            // number rows on some layouts only carry the digit as the shifted symbol
            let mut key = secondary.and_then(symbols::digit_key);

            if key.is_none() {
                match primary {
                    Some(sym) => {
                        key = symbols::lookup(sym);
                        if key.is_none() {
                            report.deferred.push(code);
                            debug!(
                                "key [{}: {} {}] deferred",
                                code,
                                sym,
                                secondary.unwrap_or("NULL")
                            );
                        }
                    }
                    None => {
                        mapping.keycodes.set(code, KeySlot::Ignored);
                        report.ignored += 1;
                        trace!("key [{}] has no symbol, not assigned", code);
                    }
                }
            }

            if let Some(key) = key {
                if mapping.is_used(key) {
                    debug!("key [{}] *double* on {}", code, key);
                }
                mapping.assign(code, key, primary);
                trace!(
                    "key [{}: {} {}] assigned to {}",
                    code,
                    primary.unwrap_or("NULL"),
                    secondary.unwrap_or("NULL"),
                    key.0
                );
            }
        }

        // 2. Fallback pass over whatever is still unresolved
        for code in desc.min_code..=desc.max_code {
            if mapping.lookup(code) != KeySlot::Unresolved {
                continue;
            }
            match mapping.assign_fallback(code) {
                Some(key) => {
                    debug!(
                        "key [{}: {}] missing, assigned to {}",
                        code,
                        desc.symbols_for(code).iter().join(" "),
                        key.0
                    );
                    report.fallbacks.push((code, key));
                }
                None => report.unassigned.push(code),
            }
        }

        if report.capacity_exceeded() {
            warn!(
                "Keymap reports more keys than the {} logical keys available; {} codes left unassigned: {:?}",
                MAX_KEYS - 1,
                report.unassigned.len(),
                report.unassigned
            );
        }

        // 3. Modifier map
        let slots: [Vec<HardwareCode>; MODIFIER_SLOT_COUNT] =
            std::array::from_fn(|slot| desc.modifier_codes(slot).collect());
        for (slot, codes) in slots.iter().enumerate() {
            debug!(
                "Modifier {}: {}",
                slot + 1,
                codes
                    .iter()
                    .map(|&c| desc.primary(c).unwrap_or("NULL"))
                    .join(" ")
            );
        }
        mapping.modifiers = ModifierMap::new(slots);

        // 4. Overrides win over everything above
        for ov in self.overrides {
            match LogicalKey::new(ov.key) {
                Some(key) if desc.contains(ov.code) => {
                    let displaced = mapping.lookup(ov.code).key();
                    mapping.keycodes.set(ov.code, KeySlot::Assigned(key));
                    mapping.used[key.index()] = true;
                    if let Some(old) = displaced.filter(|&old| old != key) {
                        mapping.release_if_unmapped(old);
                    }
                    info!("User override: code {} assigned to {}", ov.code, key.0);
                    report.overrides_applied.push(*ov);
                }
                _ => {
                    warn!(
                        "Rejected override: code {} -> key {} (code outside {}..={} or key outside 1..{})",
                        ov.code, ov.key, desc.min_code, desc.max_code, MAX_KEYS
                    );
                    report.overrides_rejected.push(*ov);
                }
            }
        }

        report.double_mappings = mapping
            .keycodes
            .iter()
            .filter_map(|(code, slot)| slot.key().map(|key| (key, code)))
            .into_group_map()
            .into_iter()
            .filter(|(_, codes)| codes.len() > 1)
            .sorted_by_key(|(key, _)| *key)
            .collect();
        for (key, codes) in &report.double_mappings {
            debug!("Logical key {} shared by codes {:?}", key, codes);
        }

        report.assigned = mapping
            .keycodes
            .iter()
            .filter(|(_, slot)| slot.key().is_some())
            .count();
        report.ignored = mapping
            .keycodes
            .iter()
            .filter(|(_, slot)| *slot == KeySlot::Ignored)
            .count();

        report.fingerprint = fingerprint.clone();
        mapping.fingerprint = Some(fingerprint);

        Ok((Arc::new(mapping), report))
    }
}
