//! One-way boolean flag
//!
//! `won` and `game_over` can only ever turn on within a game; a fresh game
//! replaces the latch instead of clearing it.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Latch(bool);

impl Latch {
    pub const fn new() -> Self {
        Self(false)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0
    }

    /// Set the latch. Returns `true` only on the transition from unset to set.
    #[inline]
    pub fn set(&mut self) -> bool {
        let was = self.0;
        self.0 = true;
        !was
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_reports_transition_once() {
        let mut latch = Latch::new();
        assert!(!latch.is_set());
        assert!(latch.set());
        assert!(latch.is_set());
        assert!(!latch.set());
        assert!(latch.is_set());
    }

    #[test]
    fn test_default_is_unset() {
        assert_eq!(Latch::default(), Latch::new());
    }
}
