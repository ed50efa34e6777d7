//! V2 frame encoder/decoder.
//!
//! V2 thermostats answer a poll with their whole register image. On the
//! wire the image carries one extra byte, the length byte at offset 2,
//! which is not part of the logical DCB layout.
//!
//! # Frame format
//!
//! ```text
//! response:  <addr> <func> <len> <model> <dcb[3]> ... <dcb[n-2]> <sum>
//! poll:      <addr> 0x26|0x29 0x00 <sum>
//! write:     <addr> <cmd|0x80> <payload>... <sum>
//! ```
//!
//! - `len`: number of bytes in the logical DCB (frame minus the length byte)
//! - `sum`: 8-bit additive checksum of every preceding DCB byte
//! - poll function `0x29` requests the extended PRTHW image, `0x26` the
//!   standard one

use bytes::{BufMut, BytesMut};
use tracing::{debug, warn};

use heatlink_core::checksum::{stamp_v2, v2_checksum, V2_TRAILER_LEN};
use heatlink_core::{DecodedFrame, Dcb, Error, Model, Result};

/// Offset of the wire length byte.
pub const LENGTH_OFFSET: usize = 2;

/// Shortest frame accepted by [`decode_frame`].
pub const MIN_FRAME_LEN: usize = 4;

/// Poll function requesting the standard status image.
pub const FN_POLL_STATUS: u8 = 0x26;

/// Poll function requesting the extended hot-water status image.
pub const FN_POLL_STATUS_HW: u8 = 0x29;

/// Flag set on the command byte of every write.
pub const WRITE_FLAG: u8 = 0x80;

/// Offset of the model code in the logical DCB.
pub const MODEL_OFFSET: usize = 2;

/// Map a V2 model code onto a [`Model`].
///
/// | Code | Model |
/// |------|-------|
/// | 81   | PRT   |
/// | 82   | PRTHW |
/// | 83   | FCV   |
/// | 85   | DT    |
pub fn model_from_code(code: u8) -> Result<Model> {
    match code {
        85 => Ok(Model::DT),
        81 => Ok(Model::PRT),
        83 => Ok(Model::FCV),
        82 => Ok(Model::PRTHW),
        other => Err(Error::UnknownModelCode(other)),
    }
}

/// Total frame length announced by a response header.
///
/// The length byte counts the logical DCB, so the wire frame is one byte
/// longer.
pub fn expected_frame_len(header: &[u8]) -> Option<usize> {
    header.get(LENGTH_OFFSET).map(|&len| usize::from(len) + 1)
}

/// Validate a raw V2 frame and strip the length byte.
///
/// # Example
///
/// ```
/// use heatlink_v2::frame::decode_frame;
///
/// // Minimal PRT response: addr 1, func 0x26, len 4, model 81, checksum.
/// let frame = [0x01, 0x26, 0x04, 0x51, 0x78];
/// let decoded = decode_frame(&frame).unwrap();
/// assert_eq!(decoded.address, 1);
/// assert_eq!(decoded.dcb.as_bytes(), &[0x01, 0x26, 0x51, 0x78]);
/// ```
pub fn decode_frame(raw: &[u8]) -> Result<DecodedFrame> {
    if raw.len() < MIN_FRAME_LEN {
        debug!(len = raw.len(), "V2 frame too short");
        return Err(Error::TooShort {
            len: raw.len(),
            min: MIN_FRAME_LEN,
        });
    }

    let declared = usize::from(raw[LENGTH_OFFSET]);
    let mut bytes = Vec::with_capacity(raw.len() - 1);
    bytes.extend_from_slice(&raw[..LENGTH_OFFSET]);
    bytes.extend_from_slice(&raw[LENGTH_OFFSET + 1..]);

    if bytes.len() != declared {
        debug!(declared, actual = bytes.len(), "V2 frame length mismatch");
        return Err(Error::LengthMismatch {
            declared,
            actual: bytes.len(),
        });
    }

    let carried = bytes[bytes.len() - V2_TRAILER_LEN];
    let computed = v2_checksum(&bytes);
    if carried != computed {
        debug!(carried, computed, "V2 checksum mismatch");
        return Err(Error::ChecksumMismatch {
            expected: u16::from(carried),
            computed: u16::from(computed),
        });
    }

    let model = match model_from_code(bytes[MODEL_OFFSET]) {
        Ok(model) => Some(model),
        Err(e) => {
            warn!(address = bytes[0], "{e}; model left unset");
            None
        }
    };

    Ok(DecodedFrame {
        address: bytes[0],
        function: bytes[1],
        model,
        dcb: Dcb::new(bytes),
    })
}

/// Build a full-status poll frame.
///
/// PRTHW thermostats are polled with [`FN_POLL_STATUS_HW`]; every other
/// model (or an unknown one) with [`FN_POLL_STATUS`].
///
/// # Example
///
/// ```
/// use heatlink_core::Model;
/// use heatlink_v2::frame::encode_poll;
///
/// assert_eq!(encode_poll(1, Some(Model::PRT)), vec![0x01, 0x26, 0x00, 0x27]);
/// assert_eq!(encode_poll(1, Some(Model::PRTHW)), vec![0x01, 0x29, 0x00, 0x2A]);
/// ```
pub fn encode_poll(address: u8, model: Option<Model>) -> Vec<u8> {
    let function = if model == Some(Model::PRTHW) {
        FN_POLL_STATUS_HW
    } else {
        FN_POLL_STATUS
    };
    let mut buf = BytesMut::with_capacity(MIN_FRAME_LEN);
    buf.put_u8(address);
    buf.put_u8(function);
    buf.put_u8(0x00);
    buf.put_u8(0x00);
    stamp_v2(&mut buf);
    buf.to_vec()
}

/// Build a write frame carrying `payload` for command `cmd`.
///
/// # Example
///
/// ```
/// use heatlink_v2::frame::encode_write;
///
/// // Set temperature 21 on thermostat 1.
/// assert_eq!(encode_write(1, 0x04, &[21]), vec![0x01, 0x84, 0x15, 0x9A]);
/// ```
pub fn encode_write(address: u8, cmd: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(payload.len() + 3);
    buf.put_u8(address);
    buf.put_u8(cmd | WRITE_FLAG);
    buf.put_slice(payload);
    buf.put_u8(0x00);
    stamp_v2(&mut buf);
    buf.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatlink_test_harness::V2Image;

    // ---------------------------------------------------------------
    // Decoding
    // ---------------------------------------------------------------

    #[test]
    fn decode_valid_prt_frame() {
        let frame = V2Image::new(7, 81).set(6, 19).frame();
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.address, 7);
        assert_eq!(decoded.function, 0x26);
        assert_eq!(decoded.model, Some(Model::PRT));
        assert_eq!(decoded.dcb.len(), frame.len() - 1);
        assert_eq!(decoded.dcb.byte(6), 19);
    }

    #[test]
    fn decoded_checksum_matches_trailer() {
        let frame = V2Image::new(2, 82).set(8, 0xD8).set(9, 22).frame();
        let decoded = decode_frame(&frame).unwrap();
        let dcb = decoded.dcb.as_bytes();
        assert_eq!(v2_checksum(dcb), dcb[dcb.len() - 1]);
    }

    #[test]
    fn decode_too_short() {
        let err = decode_frame(&[0x01, 0x26, 0x02]).unwrap_err();
        assert!(matches!(err, Error::TooShort { len: 3, min: 4 }));
    }

    #[test]
    fn decode_length_mismatch() {
        let mut frame = V2Image::new(1, 81).frame();
        frame[LENGTH_OFFSET] += 1;
        let err = decode_frame(&frame).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                declared: 21,
                actual: 20
            }
        ));
    }

    #[test]
    fn decode_checksum_mismatch() {
        let mut frame = V2Image::new(1, 81).frame();
        frame[7] ^= 0x01;
        assert!(matches!(
            decode_frame(&frame),
            Err(Error::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn decode_unknown_model_is_not_fatal() {
        let frame = V2Image::new(4, 99).frame();
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.model, None);
        assert_eq!(decoded.address, 4);
    }

    #[test]
    fn model_codes() {
        assert_eq!(model_from_code(85).unwrap(), Model::DT);
        assert_eq!(model_from_code(81).unwrap(), Model::PRT);
        assert_eq!(model_from_code(83).unwrap(), Model::FCV);
        assert_eq!(model_from_code(82).unwrap(), Model::PRTHW);
        assert!(matches!(model_from_code(84), Err(Error::UnknownModelCode(84))));
    }

    #[test]
    fn frame_length_from_header() {
        assert_eq!(expected_frame_len(&[0x01, 0x26]), None);
        assert_eq!(expected_frame_len(&[0x01, 0x26, 0x14]), Some(21));
    }

    // ---------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------

    #[test]
    fn poll_function_by_model() {
        assert_eq!(encode_poll(5, Some(Model::PRTHW))[1], FN_POLL_STATUS_HW);
        for model in [Some(Model::PRT), Some(Model::DT), Some(Model::FCV), None] {
            assert_eq!(encode_poll(5, model)[1], FN_POLL_STATUS);
        }
    }

    #[test]
    fn poll_frame_is_four_bytes() {
        let frame = encode_poll(0x10, None);
        assert_eq!(frame, vec![0x10, 0x26, 0x00, 0x36]);
    }

    #[test]
    fn write_frame_layout() {
        let frame = encode_write(3, 0x26, &[1, 2, 3]);
        assert_eq!(frame.len(), 6);
        assert_eq!(&frame[..5], &[3, 0xA6, 1, 2, 3]);
        assert_eq!(frame[5], v2_checksum(&frame));
    }

    #[test]
    fn write_frame_empty_payload() {
        let frame = encode_write(1, 0x02, &[]);
        assert_eq!(frame, vec![0x01, 0x82, 0x83]);
    }
}
