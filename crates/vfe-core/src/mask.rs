//! Fixed-capacity bitsets used for group membership and dependency masks.
//!
//! Masks are stored as `u32` words so they can be handed to the coprocessor
//! in the same word order the firmware expects.

use core::fmt;

use crate::ids::{EquIdx, MAX_EQUATIONS, MAX_VARIABLES, VarIdx};

const WORD_BITS: usize = 32;

/// A bitset with `WORDS * 32` bits of capacity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitMask<const WORDS: usize> {
    words: [u32; WORDS],
}

/// Mask over every variable index the format supports.
pub type VarMask = BitMask<{ MAX_VARIABLES / WORD_BITS }>;

/// Mask over every equation index the format supports.
pub type EquMask = BitMask<{ MAX_EQUATIONS / WORD_BITS }>;

impl<const WORDS: usize> Default for BitMask<WORDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WORDS: usize> BitMask<WORDS> {
    /// Number of addressable bits.
    pub const CAPACITY: usize = WORDS * WORD_BITS;

    /// Empty mask.
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Rebuild a mask from exported words.
    pub fn from_words(words: [u32; WORDS]) -> Self {
        Self { words }
    }

    /// Set `bit`. Returns `false` (and leaves the mask untouched) past capacity.
    pub fn set(&mut self, bit: usize) -> bool {
        if bit >= Self::CAPACITY {
            return false;
        }
        self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
        true
    }

    /// Clear `bit`.
    pub fn clear(&mut self, bit: usize) {
        if bit < Self::CAPACITY {
            self.words[bit / WORD_BITS] &= !(1 << (bit % WORD_BITS));
        }
    }

    pub fn contains(&self, bit: usize) -> bool {
        bit < Self::CAPACITY && self.words[bit / WORD_BITS] & (1 << (bit % WORD_BITS)) != 0
    }

    /// In-place union.
    pub fn union_with(&mut self, other: &Self) {
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= *src;
        }
    }

    /// Union of two masks.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.union_with(other);
        out
    }

    /// True if every bit in `self` is also set in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & !b == 0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            (0..WORD_BITS)
                .filter(move |b| word & (1 << b) != 0)
                .map(move |b| w * WORD_BITS + b)
        })
    }

    /// Raw words, lowest bits first.
    pub fn words(&self) -> &[u32; WORDS] {
        &self.words
    }
}

impl VarMask {
    pub fn with_var(idx: VarIdx) -> Self {
        let mut mask = Self::new();
        mask.set(idx.index());
        mask
    }

    pub fn vars(&self) -> impl Iterator<Item = VarIdx> + '_ {
        self.iter().filter_map(VarIdx::new)
    }
}

impl EquMask {
    pub fn equs(&self) -> impl Iterator<Item = EquIdx> + '_ {
        self.iter().filter_map(EquIdx::new)
    }
}

impl<const WORDS: usize> FromIterator<usize> for BitMask<WORDS> {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut mask = Self::new();
        for bit in iter {
            mask.set(bit);
        }
        mask
    }
}

impl<const WORDS: usize> fmt::Debug for BitMask<WORDS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
impl<const WORDS: usize> serde::Serialize for BitMask<WORDS> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = s.serialize_seq(Some(WORDS))?;
        for word in &self.words {
            seq.serialize_element(word)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacities_match_format() {
        assert_eq!(VarMask::CAPACITY, 256);
        assert_eq!(EquMask::CAPACITY, 2048);
    }

    #[test]
    fn set_contains_clear() {
        let mut m = VarMask::new();
        assert!(m.set(0));
        assert!(m.set(31));
        assert!(m.set(32));
        assert!(m.set(255));
        assert!(!m.set(256));
        assert!(m.contains(31) && m.contains(32));
        assert_eq!(m.count(), 4);
        m.clear(31);
        assert!(!m.contains(31));
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![0, 32, 255]);
    }

    #[test]
    fn union_and_subset() {
        let a: VarMask = [1, 2].into_iter().collect();
        let b: VarMask = [2, 40].into_iter().collect();
        let u = a.union(&b);
        assert_eq!(u.iter().collect::<Vec<_>>(), vec![1, 2, 40]);
        assert!(a.is_subset(&u));
        assert!(!u.is_subset(&a));
    }

    #[test]
    fn words_are_little_bit_first() {
        let m: EquMask = [0, 33].into_iter().collect();
        assert_eq!(m.words()[0], 1);
        assert_eq!(m.words()[1], 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn iter_matches_inserted(bits in prop::collection::btree_set(0_usize..256, 0..64)) {
            let mask: VarMask = bits.iter().copied().collect();
            prop_assert_eq!(mask.count(), bits.len());
            prop_assert!(mask.iter().eq(bits.iter().copied()));
        }
    }
}
