//! V3 command builders.
//!
//! V3 writes address the DCB directly: each builder returns a write frame
//! placing its payload at a fixed offset. Numeric values are truncated
//! toward zero before they are checked.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::debug;

use heatlink_core::variant::whole_number;
use heatlink_core::{Error, Function, Result};

use crate::frame::encode_write;

// ---------------------------------------------------------------
// Write offsets
// ---------------------------------------------------------------

/// Frost protection temperature, 1 byte.
pub const OFFSET_FROST_TEMP: u16 = 17;

/// Set-point temperature, 1 byte.
pub const OFFSET_SET_TEMP: u16 = 18;

/// On/off switch, 1 byte.
pub const OFFSET_ON_OFF: u16 = 21;

/// Key lock, 1 byte.
pub const OFFSET_LOCK: u16 = 22;

/// Run mode (heating or frost protection), 1 byte.
pub const OFFSET_RUN_MODE: u16 = 23;

/// Holiday hours, 2 bytes little-endian.
pub const OFFSET_HOLIDAY: u16 = 24;

/// Hot-water relay, 1 byte.
pub const OFFSET_WATER: u16 = 42;

/// Clock: weekday, hour, minute, second.
pub const OFFSET_TIME: u16 = 43;

/// Lowest set-point accepted.
pub const SET_TEMP_MIN: i64 = 5;

/// Highest set-point accepted.
pub const SET_TEMP_MAX: i64 = 35;

/// Frost temperatures are clamped into this range.
pub const FROST_TEMP_MIN: i64 = 5;

/// Frost temperatures are clamped into this range.
pub const FROST_TEMP_MAX: i64 = 18;

/// Longest holiday, in days.
pub const HOLIDAY_MAX_DAYS: i64 = 99;

/// Longest holiday, in hours.
pub const HOLIDAY_MAX_HOURS: i64 = HOLIDAY_MAX_DAYS * 24;

/// Build a set-point write. Values outside 5..=35 are rejected.
///
/// # Example
///
/// ```
/// use heatlink_v3::commands::cmd_set_temp;
///
/// let frame = cmd_set_temp(1, 21.0).unwrap();
/// assert_eq!(&frame[4..9], &[18, 0, 1, 0, 21]);
/// assert!(cmd_set_temp(1, 4.0).is_err());
/// ```
pub fn cmd_set_temp(address: u8, celsius: f64) -> Result<Vec<u8>> {
    let degrees = whole_number(Function::SetTemp, celsius)?;
    if !(SET_TEMP_MIN..=SET_TEMP_MAX).contains(&degrees) {
        return Err(Error::ValueOutOfRange {
            function: Function::SetTemp,
            value: celsius,
        });
    }
    Ok(encode_write(address, OFFSET_SET_TEMP, &[degrees as u8]))
}

/// Build a frost temperature write, clamping into 5..=18.
pub fn cmd_frost_temp(address: u8, celsius: f64) -> Result<Vec<u8>> {
    let degrees = whole_number(Function::FrostTemp, celsius)?;
    let clamped = degrees.clamp(FROST_TEMP_MIN, FROST_TEMP_MAX);
    if clamped != degrees {
        debug!(requested = degrees, clamped, "frost temperature clamped");
    }
    Ok(encode_write(address, OFFSET_FROST_TEMP, &[clamped as u8]))
}

/// Build an on/off write.
pub fn cmd_on_off(address: u8, on: bool) -> Vec<u8> {
    encode_write(address, OFFSET_ON_OFF, &[u8::from(on)])
}

/// Build a key lock write.
pub fn cmd_lock(address: u8, locked: bool) -> Vec<u8> {
    encode_write(address, OFFSET_LOCK, &[u8::from(locked)])
}

/// Build a run mode write.
pub fn cmd_run_mode(address: u8, on: bool) -> Vec<u8> {
    encode_write(address, OFFSET_RUN_MODE, &[u8::from(on)])
}

/// Build a hot-water relay write.
pub fn cmd_water(address: u8, on: bool) -> Vec<u8> {
    encode_write(address, OFFSET_WATER, &[u8::from(on)])
}

/// Build a clock write: weekday (Monday = 1 through Sunday = 7), hour,
/// minute, second.
pub fn cmd_time(address: u8, time: NaiveDateTime) -> Vec<u8> {
    let payload = [
        time.weekday().number_from_monday() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second() as u8,
    ];
    encode_write(address, OFFSET_TIME, &payload)
}

/// Hours of holiday to program for `days`, counted from `now`.
///
/// The holiday ends at midnight: the hours already gone today are
/// subtracted. A day count outside 0..=99 cancels the holiday, and so
/// does a result beyond 99 days of hours.
pub fn holiday_hours(days: i64, now: NaiveDateTime) -> u16 {
    let days = if (0..=HOLIDAY_MAX_DAYS).contains(&days) {
        days
    } else {
        0
    };
    let mut hours = days * 24 - i64::from(now.hour());
    if hours < 0 {
        hours = 0;
    }
    if hours > HOLIDAY_MAX_HOURS {
        hours = 0;
    }
    hours as u16
}

/// Build a holiday write for `days` from `now`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use heatlink_v3::commands::cmd_holiday;
///
/// let midnight = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let frame = cmd_holiday(1, 99.0, midnight).unwrap();
/// // 99 * 24 = 2376 = 0x0948, little-endian.
/// assert_eq!(&frame[8..10], &[0x48, 0x09]);
/// ```
pub fn cmd_holiday(address: u8, days: f64, now: NaiveDateTime) -> Result<Vec<u8>> {
    let requested = whole_number(Function::HolidaySet, days)?;
    let hours = holiday_hours(requested, now);
    debug!(days = requested, hours, "holiday hours computed");
    Ok(encode_write(address, OFFSET_HOLIDAY, &hours.to_le_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, mi: u32, s: u32) -> NaiveDateTime {
        // 2024-01-10 is a Wednesday.
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn payload(frame: &[u8]) -> &[u8] {
        &frame[8..frame.len() - 2]
    }

    fn start(frame: &[u8]) -> u16 {
        u16::from_le_bytes([frame[4], frame[5]])
    }

    // ---------------------------------------------------------------
    // Temperatures
    // ---------------------------------------------------------------

    #[test]
    fn set_temp_bounds() {
        assert!(matches!(
            cmd_set_temp(1, 4.0),
            Err(Error::ValueOutOfRange { .. })
        ));
        assert_eq!(payload(&cmd_set_temp(1, 5.0).unwrap()), &[5]);
        assert_eq!(payload(&cmd_set_temp(1, 35.0).unwrap()), &[35]);
        assert!(matches!(
            cmd_set_temp(1, 36.0),
            Err(Error::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn frost_temp_clamps() {
        let frame = cmd_frost_temp(1, 3.0).unwrap();
        assert_eq!(start(&frame), OFFSET_FROST_TEMP);
        assert_eq!(payload(&frame), &[5]);
        assert_eq!(payload(&cmd_frost_temp(1, 25.0).unwrap()), &[18]);
        assert_eq!(payload(&cmd_frost_temp(1, 10.0).unwrap()), &[10]);
    }

    // ---------------------------------------------------------------
    // Switches
    // ---------------------------------------------------------------

    #[test]
    fn switch_offsets_and_payloads() {
        let cases: [(fn(u8, bool) -> Vec<u8>, u16); 4] = [
            (cmd_on_off, OFFSET_ON_OFF),
            (cmd_lock, OFFSET_LOCK),
            (cmd_run_mode, OFFSET_RUN_MODE),
            (cmd_water, OFFSET_WATER),
        ];
        for (build, offset) in cases {
            let on = build(4, true);
            assert_eq!(on[0], 4);
            assert_eq!(start(&on), offset);
            assert_eq!(payload(&on), &[1]);
            assert_eq!(payload(&build(4, false)), &[0]);
        }
    }

    // ---------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------

    #[test]
    fn time_payload() {
        let frame = cmd_time(1, at(17, 45, 9));
        assert_eq!(start(&frame), OFFSET_TIME);
        assert_eq!(payload(&frame), &[3, 17, 45, 9]);
        assert_eq!(frame.len(), 14);

        let sunday = NaiveDate::from_ymd_opt(2024, 1, 14)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(payload(&cmd_time(1, sunday))[0], 7);
    }

    // ---------------------------------------------------------------
    // Holiday policy
    // ---------------------------------------------------------------

    #[test]
    fn holiday_at_midnight() {
        assert_eq!(holiday_hours(99, at(0, 0, 0)), 2376);
        assert_eq!(holiday_hours(1, at(0, 0, 0)), 24);
        assert_eq!(holiday_hours(0, at(0, 0, 0)), 0);
    }

    #[test]
    fn holiday_out_of_range_days_cancel() {
        assert_eq!(holiday_hours(100, at(0, 0, 0)), 0);
        assert_eq!(holiday_hours(-1, at(0, 0, 0)), 0);
    }

    #[test]
    fn holiday_subtracts_hours_gone_today() {
        assert_eq!(holiday_hours(2, at(10, 30, 0)), 38);
        assert_eq!(holiday_hours(99, at(23, 0, 0)), 2376 - 23);
        // Nothing left of a zero-day holiday late in the day.
        assert_eq!(holiday_hours(0, at(15, 0, 0)), 0);
    }

    #[test]
    fn holiday_frame() {
        let frame = cmd_holiday(1, 99.0, at(0, 0, 0)).unwrap();
        assert_eq!(start(&frame), OFFSET_HOLIDAY);
        assert_eq!(payload(&frame), &[0x48, 0x09]);

        let cancelled = cmd_holiday(1, 100.0, at(0, 0, 0)).unwrap();
        assert_eq!(payload(&cancelled), &[0x00, 0x00]);

        assert!(cmd_holiday(1, f64::INFINITY, at(0, 0, 0)).is_err());
    }
}
