//! V2 command builders.
//!
//! Every builder returns a complete, checksummed write frame. Temperatures
//! and switches have single-purpose write commands; the clock, the key lock
//! and the hot-water relay are written by patching a settings block rebuilt
//! from the cached DCB (see [`crate::layout`]).
//!
//! Numeric values are truncated toward zero before they are checked.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::debug;

use heatlink_core::variant::whole_number;
use heatlink_core::{Error, Function, Result};

use crate::frame::encode_write;
use crate::layout::{StatusBlock, BLOCK_DAY, BLOCK_HOUR, BLOCK_MINUTE, LOCK_MASK};

// ---------------------------------------------------------------
// Command codes
// ---------------------------------------------------------------

/// Write the thermostat on/off switch. Data: `0xFF` on, `0x00` off.
pub const CMD_ON_OFF: u8 = 0x02;

/// Write the set-point temperature. Data: whole degrees.
pub const CMD_SET_TEMP: u8 = 0x04;

/// Write the frost protection temperature. Data: whole degrees.
pub const CMD_FROST_TEMP: u8 = 0x07;

/// Write the full settings block. Data: 13-byte block.
pub const CMD_STATUS_BLOCK: u8 = 0x26;

/// Write the hot-water relay. Data: first byte of the settings block.
pub const CMD_WATER: u8 = 0x2A;

/// Lowest set-point accepted.
pub const SET_TEMP_MIN: i64 = 5;

/// Highest set-point accepted.
pub const SET_TEMP_MAX: i64 = 35;

/// Frost temperatures are clamped into this range.
pub const FROST_TEMP_MIN: i64 = 7;

/// Frost temperatures are clamped into this range.
pub const FROST_TEMP_MAX: i64 = 17;

const SWITCH_ON: u8 = 0xFF;
const SWITCH_OFF: u8 = 0x00;

/// Build a set-point write. Values outside 5..=35 are rejected.
///
/// # Example
///
/// ```
/// use heatlink_v2::commands::cmd_set_temp;
///
/// assert_eq!(cmd_set_temp(1, 21.0).unwrap(), vec![0x01, 0x84, 0x15, 0x9A]);
/// assert!(cmd_set_temp(1, 36.0).is_err());
/// ```
pub fn cmd_set_temp(address: u8, celsius: f64) -> Result<Vec<u8>> {
    let degrees = whole_number(Function::SetTemp, celsius)?;
    if !(SET_TEMP_MIN..=SET_TEMP_MAX).contains(&degrees) {
        return Err(Error::ValueOutOfRange {
            function: Function::SetTemp,
            value: celsius,
        });
    }
    Ok(encode_write(address, CMD_SET_TEMP, &[degrees as u8]))
}

/// Build a frost temperature write, clamping into 7..=17.
pub fn cmd_frost_temp(address: u8, celsius: f64) -> Result<Vec<u8>> {
    let degrees = whole_number(Function::FrostTemp, celsius)?;
    let clamped = degrees.clamp(FROST_TEMP_MIN, FROST_TEMP_MAX);
    if clamped != degrees {
        debug!(requested = degrees, clamped, "frost temperature clamped");
    }
    Ok(encode_write(address, CMD_FROST_TEMP, &[clamped as u8]))
}

/// Build an on/off write.
pub fn cmd_on_off(address: u8, on: bool) -> Vec<u8> {
    let data = if on { SWITCH_ON } else { SWITCH_OFF };
    encode_write(address, CMD_ON_OFF, &[data])
}

/// Patch the clock into `block` and build the settings block write.
///
/// The day byte is Monday = 1 through Sunday = 7.
pub fn cmd_time(address: u8, mut block: StatusBlock, time: NaiveDateTime) -> Vec<u8> {
    block[BLOCK_DAY] = (time.weekday().number_from_monday() as u8) & 0x0F;
    block[BLOCK_HOUR] = time.hour() as u8;
    block[BLOCK_MINUTE] = time.minute() as u8;
    encode_write(address, CMD_STATUS_BLOCK, &block)
}

/// Set or clear the lock bit of the status byte at `status_index` and
/// build the settings block write.
pub fn cmd_lock(address: u8, mut block: StatusBlock, status_index: usize, locked: bool) -> Vec<u8> {
    if locked {
        block[status_index] |= LOCK_MASK;
    } else {
        block[status_index] &= !LOCK_MASK;
    }
    encode_write(address, CMD_STATUS_BLOCK, &block)
}

/// Build a hot-water relay write from a rebuilt block.
///
/// Only the first byte of the block is sent, carrying 1 for on and 0 for
/// off.
pub fn cmd_water(address: u8, mut block: StatusBlock, on: bool) -> Vec<u8> {
    block[0] = u8::from(on);
    encode_write(address, CMD_WATER, &block[..1])
}
