use crate::types::Word;

bitflags::bitflags! {
    /// Condition flags updated by arithmetic, logic and compare
    /// instructions.
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Flags: u8 {
        /// Result was zero
        const ZERO = 0x01;
        /// Result had the sign bit set
        const NEGATIVE = 0x02;
        /// Unsigned overflow (add) or borrow (sub/cmp)
        const CARRY = 0x04;
        /// Two's-complement signed overflow
        const OVERFLOW = 0x08;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::empty()
    }
}

impl Flags {
    /// Zero and negative bits for `result`; carry and overflow cleared.
    pub fn from_result(result: Word) -> Self {
        let mut flags = Self::empty();

        if result == 0 {
            flags |= Self::ZERO;
        }

        if (result as i32) < 0 {
            flags |= Self::NEGATIVE;
        }

        flags
    }

    /// `ZERO` is set — `jz`/`jeq` is taken.
    pub fn zero(&self) -> bool {
        self.contains(Self::ZERO)
    }

    /// Signed less-than after a compare: `NEGATIVE != OVERFLOW`.
    pub fn lt(&self) -> bool {
        self.contains(Self::NEGATIVE) != self.contains(Self::OVERFLOW)
    }

    /// Signed greater-than: not zero and `NEGATIVE == OVERFLOW`.
    pub fn gt(&self) -> bool {
        !self.contains(Self::ZERO) && !self.lt()
    }

    /// Signed less-or-equal: zero or `NEGATIVE != OVERFLOW`.
    pub fn le(&self) -> bool {
        self.contains(Self::ZERO) || self.lt()
    }

    /// Signed greater-or-equal: `NEGATIVE == OVERFLOW`.
    pub fn ge(&self) -> bool {
        !self.lt()
    }
}
