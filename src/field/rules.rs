//! Birth/death tables indexed by live-neighbor count.

use std::fmt;

pub const NEIGHBOR_COUNTS: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleTable {
    pub birth: [bool; NEIGHBOR_COUNTS],
    pub death: [bool; NEIGHBOR_COUNTS],
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::conway()
    }
}

impl RuleTable {
    /// Standard Life, B3/D0145678.
    pub const fn conway() -> Self {
        Self {
            birth: [false, false, false, true, false, false, false, false, false],
            death: [true, true, false, false, true, true, true, true, true],
        }
    }

    /// Next age of an unprotected cell.
    #[inline(always)]
    pub fn advance(&self, age: u32, neighbors: usize, max_age: u32) -> u32 {
        if age == 0 {
            u32::from(self.birth[neighbors])
        } else if self.death[neighbors] {
            0
        } else {
            age.saturating_add(1).min(max_age)
        }
    }
}

/// `B3/D0145678` style notation.
impl fmt::Display for RuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("B")?;
        for (n, _) in self.birth.iter().enumerate().filter(|(_, on)| **on) {
            write!(f, "{n}")?;
        }
        f.write_str("/D")?;
        for (n, _) in self.death.iter().enumerate().filter(|(_, on)| **on) {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}
