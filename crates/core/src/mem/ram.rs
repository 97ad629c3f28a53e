//! Main memory: a fixed array of signed words.

/// Word-addressed main memory.
///
/// Addresses must satisfy `0 <= addr < len()`; the engine turns violations
/// into out-of-range faults before touching the array.
#[derive(Debug, Clone)]
pub struct Ram {
    words: Vec<i64>,
}

impl Ram {
    /// Creates a zeroed memory of `words` words.
    pub fn new(words: usize) -> Self {
        Self {
            words: vec![0; words],
        }
    }

    /// Memory size in words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True for a zero-sized memory.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Reads the word at `addr`, or `None` when out of range.
    pub fn read(&self, addr: usize) -> Option<i64> {
        self.words.get(addr).copied()
    }

    /// Writes the word at `addr`; returns `false` when out of range.
    pub fn write(&mut self, addr: usize, value: i64) -> bool {
        match self.words.get_mut(addr) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The full memory contents, for goal predicates and inspection.
    pub fn as_slice(&self) -> &[i64] {
        &self.words
    }

    /// Zeroes every word.
    pub fn reset(&mut self) {
        self.words.fill(0);
    }
}
