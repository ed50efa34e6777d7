//! V2 field layouts and status-block rebuild.
//!
//! Offsets are into the logical DCB, i.e. the frame with its length byte
//! removed. All V2 temperatures are whole degrees in a single byte; the
//! switch states share one status byte at offset 8.
//!
//! | Field       | PRT                    | PRTHW          |
//! |-------------|------------------------|----------------|
//! | room temp   | byte 6                 | same           |
//! | set temp    | byte 9                 | same           |
//! | frost temp  | byte 10                | same           |
//! | floor temp  | byte 12                | same           |
//! | on/off      | byte 8 bit 7           | same           |
//! | lock        | byte 8 bit 6           | same           |
//! | heat relay  | byte 8 bit 4           | same           |
//! | water relay | --                     | byte 8 bit 3   |
//! | clock       | day 3, hour 4, min 5   | same           |
//!
//! V2 has no single-byte write for the clock or the key lock. Those
//! commands resend a 13-byte settings block rebuilt from the cached DCB
//! window `2..15`; see [`prt_status_block`] and [`prthw_status_block`].

use heatlink_core::{ClockSource, Dcb, FieldLayout, FlagSource, NumericSource};

/// Length of the settings block written by status-block commands.
pub const STATUS_BLOCK_LEN: usize = 13;

/// DCB offset the settings block is rebuilt from.
pub const STATUS_WINDOW_START: usize = 2;

/// Block index of the day-of-week byte.
pub const BLOCK_DAY: usize = 1;

/// Block index of the clock hour.
pub const BLOCK_HOUR: usize = 2;

/// Block index of the clock minute.
pub const BLOCK_MINUTE: usize = 3;

/// Block index of the PRT status byte carrying the lock bit.
pub const PRT_BLOCK_STATUS: usize = 7;

/// Block index of the PRTHW status byte carrying the lock bit.
pub const PRTHW_BLOCK_STATUS: usize = 6;

/// Lock bit within the status byte.
pub const LOCK_MASK: u8 = 0x40;

/// A rebuilt settings block.
pub type StatusBlock = [u8; STATUS_BLOCK_LEN];

const STATUS_BYTE: usize = 8;

/// PRT layout.
pub const PRT_LAYOUT: FieldLayout = FieldLayout {
    room_temperature: Some(NumericSource::Byte(6)),
    frost_temperature: Some(NumericSource::Byte(10)),
    floor_temperature: Some(NumericSource::Byte(12)),
    set_temperature: Some(NumericSource::Byte(9)),
    on_off: Some(FlagSource::Bit {
        offset: STATUS_BYTE,
        bit: 7,
    }),
    heat_state: Some(FlagSource::Bit {
        offset: STATUS_BYTE,
        bit: 4,
    }),
    water_state: None,
    lock: Some(FlagSource::Bit {
        offset: STATUS_BYTE,
        bit: 6,
    }),
    time: Some(ClockSource {
        day: 3,
        hour: 4,
        minute: 5,
    }),
    holiday_hours: None,
    hold_minutes: None,
};

/// PRTHW layout: the PRT fields plus the hot-water relay.
pub const PRTHW_LAYOUT: FieldLayout = FieldLayout {
    water_state: Some(FlagSource::Bit {
        offset: STATUS_BYTE,
        bit: 3,
    }),
    ..PRT_LAYOUT
};

/// Rebuild the PRT settings block from a cached DCB.
///
/// Calibration and reserved bytes are zeroed, the day nibble is masked out
/// of its status byte, and the switching differential is moved from the
/// high nibble of the day byte into the last-but-one slot.
pub fn prt_status_block(dcb: &Dcb) -> StatusBlock {
    let old = dcb.window(STATUS_WINDOW_START, STATUS_BLOCK_LEN);
    [
        old[0],
        old[1] & 0x0F,
        old[2],
        old[3],
        0,
        old[5] & 0x0F,
        old[5] & 0xF0,
        old[6],
        old[7],
        old[8],
        old[9],
        (old[1] & 0x70) >> 3,
        old[10],
    ]
}

/// Rebuild the PRTHW settings block from a cached DCB.
///
/// Keeps bytes `5..=10` of the window in place, where the PRT rebuild
/// splits byte 5 and shifts the rest.
pub fn prthw_status_block(dcb: &Dcb) -> StatusBlock {
    let old = dcb.window(STATUS_WINDOW_START, STATUS_BLOCK_LEN);
    [
        old[0],
        old[1] & 0x0F,
        old[2],
        old[3],
        0,
        old[5],
        old[6],
        old[7],
        old[8],
        old[9],
        old[10],
        0,
        0,
    ]
}
