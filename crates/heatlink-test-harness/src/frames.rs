//! Valid-frame fixture builders.
//!
//! Tests describe a thermostat's register image byte by byte and let these
//! builders produce a wire frame with correct length fields and checksum
//! trailer, so a fixture never goes stale when a field offset changes.
//!
//! # Example
//!
//! ```
//! use heatlink_test_harness::V3Image;
//!
//! let frame = V3Image::new(7, 2).set(27, 21).frame();
//! assert_eq!(frame[3], 7);
//! assert_eq!(usize::from(u16::from_le_bytes([frame[1], frame[2]])), frame.len());
//! ```

use bytes::{BufMut, BytesMut};

use heatlink_core::checksum::{stamp_v2, stamp_v3};

/// Default number of bytes in a V2 fixture DCB, checksum slot included.
pub const V2_DEFAULT_DCB_LEN: usize = 20;

/// Default total length of a V3 fixture frame.
pub const V3_DEFAULT_FRAME_LEN: usize = 75;

/// Function byte a V2 thermostat echoes in a full status response.
const V2_STATUS_FUNCTION: u8 = 0x26;

/// Fixed first byte of a V3 response.
const V3_SOURCE_BYTE: u8 = 0x81;

/// Offset of the model code in a V2 DCB.
const V2_MODEL_OFFSET: usize = 2;

/// Offset of the model code in a V3 frame.
const V3_MODEL_OFFSET: usize = 13;

/// A V2 register image.
///
/// Offsets passed to [`set`](Self::set) are logical DCB offsets, i.e. with
/// the wire length byte already removed. The last byte is the checksum
/// slot and is overwritten by [`frame`](Self::frame).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V2Image {
    dcb: Vec<u8>,
}

impl V2Image {
    /// A zeroed image for `address`, reporting `model_code` at offset 2.
    pub fn new(address: u8, model_code: u8) -> Self {
        let mut dcb = vec![0u8; V2_DEFAULT_DCB_LEN];
        dcb[0] = address;
        dcb[1] = V2_STATUS_FUNCTION;
        dcb[V2_MODEL_OFFSET] = model_code;
        V2Image { dcb }
    }

    /// Resize the image, checksum slot included.
    pub fn with_len(mut self, len: usize) -> Self {
        self.dcb.resize(len.max(V2_MODEL_OFFSET + 2), 0);
        self
    }

    /// Set the byte at logical `offset`, growing the image if needed.
    pub fn set(mut self, offset: usize, value: u8) -> Self {
        if offset + 1 >= self.dcb.len() {
            self.dcb.resize(offset + 2, 0);
        }
        self.dcb[offset] = value;
        self
    }

    /// The logical DCB with a valid checksum in its last byte.
    pub fn dcb(&self) -> Vec<u8> {
        let mut dcb = self.dcb.clone();
        stamp_v2(&mut dcb);
        dcb
    }

    /// The wire frame: the DCB with its length byte inserted at offset 2.
    pub fn frame(&self) -> Vec<u8> {
        let dcb = self.dcb();
        let mut buf = BytesMut::with_capacity(dcb.len() + 1);
        buf.put_slice(&dcb[..2]);
        buf.put_u8(dcb.len() as u8);
        buf.put_slice(&dcb[2..]);
        buf.to_vec()
    }
}

/// A V3 response frame image.
///
/// Offsets passed to the setters are absolute frame offsets. The length
/// fields and the CRC trailer are filled in by [`frame`](Self::frame).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct V3Image {
    bytes: Vec<u8>,
}

impl V3Image {
    /// A zeroed full-DCB response from `address`, reporting `model_code`
    /// at offset 13.
    pub fn new(address: u8, model_code: u8) -> Self {
        let mut bytes = vec![0u8; V3_DEFAULT_FRAME_LEN];
        bytes[0] = V3_SOURCE_BYTE;
        bytes[3] = address;
        bytes[V3_MODEL_OFFSET] = model_code;
        V3Image { bytes }
    }

    /// Resize the frame, CRC trailer included.
    pub fn with_len(mut self, len: usize) -> Self {
        self.bytes.resize(len.max(V3_MODEL_OFFSET + 3), 0);
        self
    }

    /// Set the function byte (offset 4).
    pub fn with_function(self, function: u8) -> Self {
        self.set(4, function)
    }

    /// Set the DCB start offset (offsets 5-6, little-endian).
    pub fn with_start(self, start: u16) -> Self {
        let [lo, hi] = start.to_le_bytes();
        self.set(5, lo).set(6, hi)
    }

    /// Set the byte at `offset`, growing the frame if needed.
    pub fn set(mut self, offset: usize, value: u8) -> Self {
        if offset + 2 >= self.bytes.len() {
            self.bytes.resize(offset + 3, 0);
        }
        self.bytes[offset] = value;
        self
    }

    /// Set a big-endian pair at `offset`, as temperatures and counters are
    /// stored.
    pub fn set_word_be(self, offset: usize, value: u16) -> Self {
        let [hi, lo] = value.to_be_bytes();
        self.set(offset, hi).set(offset + 1, lo)
    }

    /// Set a temperature in tenths of a degree.
    pub fn set_tenths(self, offset: usize, celsius: f64) -> Self {
        self.set_word_be(offset, (celsius * 10.0).round() as u16)
    }

    /// The wire frame with frame length, DCB length and CRC filled in.
    pub fn frame(&self) -> Vec<u8> {
        let mut frame = self.bytes.clone();
        let total = frame.len() as u16;
        frame[1..3].copy_from_slice(&total.to_le_bytes());
        let dcb_len = total.saturating_sub(11);
        frame[7..9].copy_from_slice(&dcb_len.to_le_bytes());
        stamp_v3(&mut frame);
        frame
    }
}
