use super::bits;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Copy of a signal value at one instant
///
/// Snapshots are what probes hand to waveform and test-vector consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueSnapshot {
    /// Declared bit width
    pub bits: u8,
    /// Defined bits; floating bits are zero
    pub value: u64,
    /// Floating bit mask
    pub high_z: u64,
}

impl ValueSnapshot {
    /// The value, if no bit is floating
    pub fn defined(&self) -> Option<u64> {
        if self.high_z == 0 {
            Some(self.value)
        } else {
            None
        }
    }

    /// True if at least one bit is floating
    pub fn is_high_z(&self) -> bool {
        self.high_z != 0
    }

    /// True if every bit is floating
    pub fn is_fully_high_z(&self) -> bool {
        self.high_z == bits::mask(self.bits)
    }
}

impl fmt::Display for ValueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high_z == 0 {
            write!(f, "{:#x}", self.value)
        } else if self.is_fully_high_z() {
            write!(f, "Z")
        } else {
            write!(f, "{}", bits::z_mask_string(self.value, self.high_z, self.bits))
        }
    }
}
