//! Comparison flags.

/// Result of the most recent `CMP`.
///
/// Produced only by `CMP`, consumed only by conditional jumps, and kept
/// until the next `CMP` or a reset. `defined` distinguishes "no comparison
/// has run yet" from a comparison that happened to be unequal; `JNE` jumps
/// only on a defined, unequal result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// The compared values were equal.
    pub equal: bool,
    /// The first value was greater.
    pub greater: bool,
    /// The first value was smaller.
    pub less: bool,
    /// The first value was zero.
    pub zero: bool,
    defined: bool,
}

impl Flags {
    /// Sets the flags from comparing `a` against `b`.
    pub fn set(&mut self, a: i64, b: i64) {
        self.equal = a == b;
        self.greater = a > b;
        self.less = a < b;
        self.zero = a == 0;
        self.defined = true;
    }

    /// True once any `CMP` has run since the last reset.
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Returns the flags to their undefined initial state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
