use crate::consts::MAX_KEYS;
use crate::keycodes::LogicalKey;

const WORDS: usize = MAX_KEYS.div_ceil(64);

/// Down/up bit per logical key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyboardState {
    bits: [u64; WORDS],
}

impl KeyboardState {
    pub fn is_down(&self, key: LogicalKey) -> bool {
        if !key.is_valid() {
            return false;
        }
        let idx = key.index();
        self.bits[idx / 64] & (1 << (idx % 64)) != 0
    }

    /// Sets one key's bit. Key 0 and out-of-range keys are ignored.
    pub fn update(&mut self, key: LogicalKey, down: bool) {
        if !key.is_valid() {
            return;
        }
        let idx = key.index();
        let bit = 1u64 << (idx % 64);
        if down {
            self.bits[idx / 64] |= bit;
        } else {
            self.bits[idx / 64] &= !bit;
        }
    }

    pub fn down_keys(&self) -> impl Iterator<Item = LogicalKey> + '_ {
        (1..MAX_KEYS as u16)
            .map(LogicalKey)
            .filter(|&k| self.is_down(k))
    }

    pub fn down_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn clear(&mut self) {
        self.bits = [0; WORDS];
    }
}
