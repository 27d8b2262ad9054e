//! Fixed-size press-state bitset for evdev key codes.

/// Highest key code tracked (`KEY_MAX` in linux/input-event-codes.h).
pub const KEY_MAX: u32 = 0x2ff;

const WORDS: usize = (KEY_MAX as usize + 1) / 64;

/// Current press state of every key code up to `KEY_MAX`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldKeys {
    bits: [u64; WORDS],
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release. Returns `false` for codes above
    /// `KEY_MAX`, which are not tracked.
    pub fn set(&mut self, key: u32, pressed: bool) -> bool {
        if key > KEY_MAX {
            return false;
        }
        let (word, mask) = Self::slot(key);
        if pressed {
            self.bits[word] |= mask;
        } else {
            self.bits[word] &= !mask;
        }
        true
    }

    pub fn is_held(&self, key: u32) -> bool {
        if key > KEY_MAX {
            return false;
        }
        let (word, mask) = Self::slot(key);
        self.bits[word] & mask != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Held key codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..=KEY_MAX).filter(move |k| self.is_held(*k))
    }

    fn slot(key: u32) -> (usize, u64) {
        ((key / 64) as usize, 1u64 << (key % 64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn press_and_release() {
        let mut keys = HeldKeys::new();
        assert!(keys.is_empty());

        keys.set(30, true);
        keys.set(125, true);
        assert!(keys.is_held(30));
        assert!(keys.is_held(125));
        assert_eq!(keys.len(), 2);

        keys.set(30, false);
        assert!(!keys.is_held(30));
        assert_eq!(keys.iter().collect::<Vec<_>>(), vec![125]);

        keys.set(125, false);
        assert!(keys.is_empty());
    }

    #[test]
    fn codes_past_key_max_are_ignored() {
        let mut keys = HeldKeys::new();
        assert!(keys.set(KEY_MAX, true));
        assert!(!keys.set(KEY_MAX + 1, true));
        assert!(!keys.is_held(KEY_MAX + 1));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn repeated_release_is_harmless() {
        let mut keys = HeldKeys::new();
        keys.set(34, false);
        keys.set(34, false);
        assert!(keys.is_empty());
    }

    #[test]
    fn matches_last_event_per_key() {
        // Small LCG so the sequence is deterministic.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as u32
        };

        let mut keys = HeldKeys::new();
        let mut model = BTreeSet::new();
        for _ in 0..5_000 {
            let key = next() % (KEY_MAX + 1);
            let pressed = next() % 2 == 0;
            keys.set(key, pressed);
            if pressed {
                model.insert(key);
            } else {
                model.remove(&key);
            }
        }

        assert_eq!(keys.iter().collect::<BTreeSet<_>>(), model);
        assert_eq!(keys.len(), model.len());
    }
}
