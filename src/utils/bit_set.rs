//! A growable set of bits used for the display, ghost and vertex-visibility sets.

use core::ops::Range;

const WORD_BITS: usize = 64;

/// A growable bit-vector.
///
/// Bits beyond [`BitSet::len`] always read as unset. Setting a bit past the
/// current length grows the set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    /// Creates a set of `len` unset bits.
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Creates a set of `len` set bits.
    pub fn full(len: usize) -> Self {
        let mut result = Self::new(len);
        result.set_range(0..len, true);
        result
    }

    /// The number of bits tracked by this set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Is this set tracking zero bits?
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grows or shrinks this set to `len` bits. New bits are unset.
    pub fn resize(&mut self, len: usize) {
        self.words.resize(len.div_ceil(WORD_BITS), 0);
        self.len = len;

        let tail = len % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }

    /// Is the `i`-th bit set?
    #[inline]
    pub fn contains(&self, i: usize) -> bool {
        i < self.len && self.words[i / WORD_BITS] & (1 << (i % WORD_BITS)) != 0
    }

    /// Sets the `i`-th bit to `value`, growing the set if needed.
    #[inline]
    pub fn set(&mut self, i: usize, value: bool) {
        if i >= self.len {
            if !value {
                return;
            }
            self.resize(i + 1);
        }

        let mask = 1 << (i % WORD_BITS);
        if value {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    /// Sets the `i`-th bit.
    #[inline]
    pub fn insert(&mut self, i: usize) {
        self.set(i, true)
    }

    /// Unsets the `i`-th bit.
    #[inline]
    pub fn remove(&mut self, i: usize) {
        self.set(i, false)
    }

    /// Sets every bit of `range` to `value`.
    pub fn set_range(&mut self, range: Range<usize>, value: bool) {
        for i in range {
            self.set(i, value);
        }
    }

    /// Unsets every bit while keeping the length.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Is at least one bit set?
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// The number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Sets every bit that is set in `other`, growing this set if needed.
    pub fn union_with(&mut self, other: &BitSet) {
        if other.len > self.len {
            self.resize(other.len);
        }

        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w |= *o;
        }
    }

    /// Iterates through the indices of all the set bits, in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(k, word)| {
            let mut word = *word;
            core::iter::from_fn(move || {
                if word == 0 {
                    None
                } else {
                    let bit = word.trailing_zeros() as usize;
                    word &= word - 1;
                    Some(k * WORD_BITS + bit)
                }
            })
        })
    }
}
