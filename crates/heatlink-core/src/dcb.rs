//! The Data Configuration Block buffer.
//!
//! A [`Dcb`] is the validated, framing-stripped register image returned by a
//! poll. It is immutable once built: a thermostat handle replaces its DCB
//! wholesale on every successful decode.
//!
//! Reads past the end of the buffer yield `0` instead of failing, so a
//! truncated-but-valid frame decodes the fields it does carry.

/// Byte order of a two-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Low byte at the field offset, high byte after it.
    Little,
    /// High byte at the field offset, low byte after it.
    Big,
}

/// An owned, read-only DCB image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dcb {
    bytes: Vec<u8>,
}

impl Dcb {
    /// Wrap a validated byte buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Dcb { bytes }
    }

    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte at `offset`, or `0` past the end.
    pub fn byte(&self, offset: usize) -> u8 {
        self.bytes.get(offset).copied().unwrap_or(0)
    }

    /// Bit `position` (0 = LSB) of the byte at `offset`.
    pub fn bit(&self, offset: usize, position: u8) -> bool {
        (self.byte(offset) >> position) & 1 == 1
    }

    /// Two-byte unsigned value starting at `offset`.
    pub fn word(&self, offset: usize, order: ByteOrder) -> u16 {
        let first = self.byte(offset);
        let second = self.byte(offset + 1);
        match order {
            ByteOrder::Little => u16::from_le_bytes([first, second]),
            ByteOrder::Big => u16::from_be_bytes([first, second]),
        }
    }

    /// Copy `len` bytes starting at `start`, zero-filling past the end.
    pub fn window(&self, start: usize, len: usize) -> Vec<u8> {
        (start..start + len).map(|i| self.byte(i)).collect()
    }
}

impl From<Vec<u8>> for Dcb {
    fn from(bytes: Vec<u8>) -> Self {
        Dcb::new(bytes)
    }
}

impl AsRef<[u8]> for Dcb {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_in_range() {
        let dcb = Dcb::new(vec![0x10, 0x20, 0x30]);
        assert_eq!(dcb.byte(1), 0x20);
        assert_eq!(dcb.len(), 3);
    }

    #[test]
    fn byte_past_end_is_zero() {
        let dcb = Dcb::new(vec![0x10]);
        assert_eq!(dcb.byte(1), 0);
        assert_eq!(dcb.byte(1000), 0);
        assert_eq!(Dcb::new(Vec::new()).byte(0), 0);
    }

    #[test]
    fn bits_lsb_first() {
        let dcb = Dcb::new(vec![0b1001_0000]);
        assert!(dcb.bit(0, 7));
        assert!(!dcb.bit(0, 6));
        assert!(dcb.bit(0, 4));
        assert!(!dcb.bit(0, 0));
        assert!(!dcb.bit(5, 7));
    }

    #[test]
    fn word_byte_orders() {
        let dcb = Dcb::new(vec![0x00, 0xD7, 0x00]);
        assert_eq!(dcb.word(0, ByteOrder::Big), 0x00D7);
        assert_eq!(dcb.word(0, ByteOrder::Little), 0xD700);
        assert_eq!(dcb.word(1, ByteOrder::Little), 0x00D7);
    }

    #[test]
    fn word_straddling_end() {
        let dcb = Dcb::new(vec![0x00, 0x12]);
        assert_eq!(dcb.word(1, ByteOrder::Big), 0x1200);
    }

    #[test]
    fn window_zero_fills() {
        let dcb = Dcb::new(vec![1, 2, 3, 4]);
        assert_eq!(dcb.window(2, 4), vec![3, 4, 0, 0]);
        assert_eq!(dcb.window(10, 2), vec![0, 0]);
    }
}
