//! Bit field helpers and hex formatting used for diagnostics

use core::fmt;

/// Reads the bit at `pos` (0 being the LSB), returned as 0 or 1
pub fn bit_read(value: u8, pos: u8) -> u8 {
    (value >> pos) & 0x01
}

/// Returns the bits `start..=end` of `value`, shifted down to bit 0
///
/// `start <= end <= 7` must hold.
pub fn bits_read(value: u8, start: u8, end: u8) -> u8 {
    debug_assert!(start <= end && end < 8);
    let width = end - start + 1;
    let mask = if width == 8 { 0xff } else { (1u8 << width) - 1 };
    (value >> start) & mask
}

/// Upper case hex rendering of a byte slice, without separators
pub struct Hex<'a>(pub &'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
