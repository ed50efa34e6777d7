//! Frame checksum engines.
//!
//! Both protocol generations protect every frame with a trailer computed
//! over the rest of the frame:
//!
//! - **V2**: a single byte, the 8-bit additive sum of every preceding byte.
//! - **V3**: two bytes, a CRC-16 (polynomial `0x1021`, seed `0xFFFF`,
//!   MSB-first, no reflection, no final XOR) stored little-endian.
//!
//! The same functions are used to validate inbound frames and to stamp
//! outbound ones. They take the *whole* frame, trailer included, and skip
//! the trailer themselves.

use crc::{Crc, CRC_16_IBM_3740};

/// Length of the V2 checksum trailer in bytes.
pub const V2_TRAILER_LEN: usize = 1;

/// Length of the V3 CRC trailer in bytes.
pub const V3_TRAILER_LEN: usize = 2;

/// CRC-16/IBM-3740, also known as CCITT-FALSE.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// V2 checksum: 8-bit sum of all bytes except the last.
///
/// # Example
///
/// ```
/// use heatlink_core::checksum::v2_checksum;
///
/// assert_eq!(v2_checksum(&[0x01, 0x26, 0x00, 0x00]), 0x27);
/// ```
pub fn v2_checksum(frame: &[u8]) -> u8 {
    let body = &frame[..frame.len().saturating_sub(V2_TRAILER_LEN)];
    body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// V3 checksum: CRC-16 over all bytes except the last two.
///
/// # Example
///
/// ```
/// use heatlink_core::checksum::v3_checksum;
///
/// // The standard CRC-16/CCITT-FALSE check value, with a 2-byte trailer slot.
/// let mut frame = b"123456789".to_vec();
/// frame.extend_from_slice(&[0, 0]);
/// assert_eq!(v3_checksum(&frame), 0x29B1);
/// ```
pub fn v3_checksum(frame: &[u8]) -> u16 {
    let body = &frame[..frame.len().saturating_sub(V3_TRAILER_LEN)];
    CRC16.checksum(body)
}

/// Write the V2 checksum into the last byte of `frame`.
pub fn stamp_v2(frame: &mut [u8]) {
    if let Some(last) = frame.len().checked_sub(V2_TRAILER_LEN) {
        frame[last] = v2_checksum(frame);
    }
}

/// Write the V3 CRC, little-endian, into the last two bytes of `frame`.
pub fn stamp_v3(frame: &mut [u8]) {
    if let Some(start) = frame.len().checked_sub(V3_TRAILER_LEN) {
        let crc = v3_checksum(frame);
        frame[start..].copy_from_slice(&crc.to_le_bytes());
    }
}
