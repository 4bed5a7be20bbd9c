use std::fmt;

use crate::SyntaxKind;

const SLOTS: usize = 3;

/// A compact bit set of [`SyntaxKind`]s, usable in `const` position.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SyntaxSet {
    bits: [u64; SLOTS],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SLOTS] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn slot_and_mask(kind: SyntaxKind) -> (usize, u64) {
        let kind = kind as u16;
        let slot = (kind / Self::BITS_PER_SLOT) as usize;

        debug_assert!(slot < SLOTS, "SyntaxKind does not fit into the set; increase SLOTS");

        (slot, 1 << (kind % Self::BITS_PER_SLOT))
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.with(kinds[i]);
            i += 1;
        }

        set
    }

    pub const fn with(mut self, kind: SyntaxKind) -> Self {
        let (slot, mask) = Self::slot_and_mask(kind);
        self.bits[slot] |= mask;
        self
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < SLOTS {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let (slot, mask) = Self::slot_and_mask(kind);
        self.bits[slot] & mask != 0
    }
}

impl fmt::Debug for SyntaxSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for slot in 0..SLOTS {
            let mut bits = self.bits[slot];
            while bits != 0 {
                let bit = bits.trailing_zeros() as u16;
                bits &= bits - 1;
                set.entry(&(slot as u16 * Self::BITS_PER_SLOT + bit));
            }
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;

    #[test]
    fn membership_across_slots() {
        let set = SyntaxSet::new([BODY_START, NULL_KW, TOMBSTONE]);

        assert!(set.contains(BODY_START));
        assert!(set.contains(NULL_KW));
        assert!(set.contains(TOMBSTONE));
        assert!(!set.contains(IDENT));
    }

    #[test]
    fn union_keeps_both_sides() {
        let set = SyntaxSet::new([ELSE_KW]).union(&SyntaxSet::new([ENDIF_KW]));

        assert!(set.contains(ELSE_KW));
        assert!(set.contains(ENDIF_KW));
        assert!(!set.contains(ELSEIF_KW));
    }
}
