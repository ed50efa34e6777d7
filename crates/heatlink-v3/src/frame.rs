//! V3 frame encoder/decoder.
//!
//! V3 frames carry explicit length, start-offset and CRC fields, and writes
//! address a byte range of the DCB directly.
//!
//! # Frame format
//!
//! ```text
//! response: <src> <len_lo> <len_hi> <addr> <func> <start_lo> <start_hi> <n_lo> <n_hi> <dcb>... <crc_lo> <crc_hi>
//! read:     <addr> 0x0A 0x81 0x00 <start_lo> <start_hi> <n_lo> <n_hi> <crc_lo> <crc_hi>
//! write:    <addr> <10+n> 0x81 0x01 <start_lo> <start_hi> <n_lo> <n_hi> <payload>... <crc_lo> <crc_hi>
//! ```
//!
//! All multi-byte header integers and the CRC are little-endian. Responses
//! are accepted only when they cover the whole DCB from offset 0; layout
//! offsets then index the validated frame directly.

use bytes::{BufMut, BytesMut};
use tracing::{debug, warn};

use heatlink_core::checksum::{stamp_v3, v3_checksum, V3_TRAILER_LEN};
use heatlink_core::{ByteOrder, DecodedFrame, Dcb, Error, Model, Result};

/// Shortest frame accepted by [`decode_frame`].
pub const MIN_FRAME_LEN: usize = 9;

/// Length of an outbound header, before payload and CRC.
pub const HEADER_LEN: usize = 8;

/// Master source byte carried by every outbound frame.
pub const SOURCE_MASTER: u8 = 0x81;

/// Outbound operation byte for a read.
pub const OP_READ: u8 = 0x00;

/// Outbound operation byte for a write.
pub const OP_WRITE: u8 = 0x01;

/// Response function code signalling a rejected request.
pub const FN_NACK: u8 = 0x01;

/// Read length requesting the whole DCB.
pub const READ_ALL: u16 = 0xFFFF;

/// Offset of the model code in a response frame.
pub const MODEL_OFFSET: usize = 13;

const LENGTH_OFFSET: usize = 1;
const ADDRESS_OFFSET: usize = 3;
const FUNCTION_OFFSET: usize = 4;
const START_OFFSET: usize = 5;

/// Map a V3 model code onto a [`Model`].
///
/// | Code | Model |
/// |------|-------|
/// | 0    | DT    |
/// | 1    | DTE   |
/// | 2    | PRT   |
/// | 3    | PRTE  |
/// | 4    | PRTHW |
pub fn model_from_code(code: u8) -> Result<Model> {
    match code {
        0 => Ok(Model::DT),
        1 => Ok(Model::DTE),
        2 => Ok(Model::PRT),
        3 => Ok(Model::PRTE),
        4 => Ok(Model::PRTHW),
        other => Err(Error::UnknownModelCode(other)),
    }
}

/// Total frame length announced by a response header.
pub fn expected_frame_len(header: &[u8]) -> Option<usize> {
    match header {
        [_, lo, hi, ..] => Some(usize::from(u16::from_le_bytes([*lo, *hi]))),
        _ => None,
    }
}

/// Validate a raw V3 response frame.
///
/// The returned DCB is the whole frame, so layout offsets are absolute
/// frame offsets.
pub fn decode_frame(raw: &[u8]) -> Result<DecodedFrame> {
    if raw.len() < MIN_FRAME_LEN {
        debug!(len = raw.len(), "V3 frame too short");
        return Err(Error::TooShort {
            len: raw.len(),
            min: MIN_FRAME_LEN,
        });
    }

    let dcb = Dcb::new(raw.to_vec());

    let declared = usize::from(dcb.word(LENGTH_OFFSET, ByteOrder::Little));
    if declared != raw.len() {
        debug!(declared, actual = raw.len(), "V3 frame length mismatch");
        return Err(Error::LengthMismatch {
            declared,
            actual: raw.len(),
        });
    }

    let carried = dcb.word(declared - V3_TRAILER_LEN, ByteOrder::Little);
    let computed = v3_checksum(raw);
    if carried != computed {
        debug!(carried, computed, "V3 CRC mismatch");
        return Err(Error::ChecksumMismatch {
            expected: carried,
            computed,
        });
    }

    let function = dcb.byte(FUNCTION_OFFSET);
    if function == FN_NACK {
        debug!(address = dcb.byte(ADDRESS_OFFSET), "V3 thermostat rejected request");
        return Err(Error::UnexpectedFunctionCode(function));
    }

    let start = dcb.word(START_OFFSET, ByteOrder::Little);
    if start != 0 {
        debug!(start, "V3 partial DCB response");
        return Err(Error::PartialDcbUnsupported(start));
    }

    let address = dcb.byte(ADDRESS_OFFSET);
    let model = match model_from_code(dcb.byte(MODEL_OFFSET)) {
        Ok(model) => Some(model),
        Err(e) => {
            warn!(address, "{e}; model left unset");
            None
        }
    };

    Ok(DecodedFrame {
        address,
        function,
        model,
        dcb,
    })
}

/// Build a read request for `length` bytes from DCB offset `start`.
///
/// # Example
///
/// ```
/// use heatlink_v3::frame::encode_read;
///
/// let frame = encode_read(1, 0, 0xFFFF);
/// assert_eq!(&frame[..8], &[0x01, 0x0A, 0x81, 0x00, 0x00, 0x00, 0xFF, 0xFF]);
/// assert_eq!(frame.len(), 10);
/// ```
pub fn encode_read(address: u8, start: u16, length: u16) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + V3_TRAILER_LEN);
    buf.put_u8(address);
    buf.put_u8((HEADER_LEN + V3_TRAILER_LEN) as u8);
    buf.put_u8(SOURCE_MASTER);
    buf.put_u8(OP_READ);
    buf.put_u16_le(start);
    buf.put_u16_le(length);
    buf.put_u16_le(0);
    stamp_v3(&mut buf);
    buf.to_vec()
}

/// Build a read request for the whole DCB.
pub fn encode_poll(address: u8) -> Vec<u8> {
    encode_read(address, 0, READ_ALL)
}

/// Build a write of `payload` at DCB offset `start`.
///
/// # Example
///
/// ```
/// use heatlink_v3::frame::encode_write;
///
/// let frame = encode_write(1, 18, &[21]);
/// assert_eq!(&frame[..9], &[0x01, 0x0B, 0x81, 0x01, 0x12, 0x00, 0x01, 0x00, 0x15]);
/// assert_eq!(frame.len(), 11);
/// ```
pub fn encode_write(address: u8, start: u16, payload: &[u8]) -> Vec<u8> {
    let total = HEADER_LEN + payload.len() + V3_TRAILER_LEN;
    let mut buf = BytesMut::with_capacity(total);
    buf.put_u8(address);
    buf.put_u8(total as u8);
    buf.put_u8(SOURCE_MASTER);
    buf.put_u8(OP_WRITE);
    buf.put_u16_le(start);
    buf.put_u16_le(payload.len() as u16);
    buf.put_slice(payload);
    buf.put_u16_le(0);
    stamp_v3(&mut buf);
    buf.to_vec()
}
