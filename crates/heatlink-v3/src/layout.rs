//! V3 field layouts.
//!
//! Offsets are absolute frame offsets. Temperatures are big-endian tenths
//! of a degree except the set-point and frost temperatures, which are whole
//! degrees in one byte. Switch states are whole bytes, on when equal to 1.
//!
//! | Field         | PRT (baseline)                          | PRTHW        |
//! |---------------|-----------------------------------------|--------------|
//! | room temp     | 37 if byte 22 is 1 or 4, else 41 (/10)  | 41 (/10)     |
//! | floor temp    | 39 (/10)                                | --           |
//! | set temp      | byte 27                                 | same         |
//! | frost temp    | byte 26                                 | same         |
//! | on/off        | byte 30                                 | same         |
//! | heat relay    | byte 44                                 | same         |
//! | water relay   | --                                      | byte 45      |
//! | holiday hours | 33-34                                   | same         |
//! | hold minutes  | 35-36                                   | same         |

use heatlink_core::{ByteOrder, CounterSource, FieldLayout, FlagSource, NumericSource};

/// Sensor-selection byte.
pub const SENSOR_SELECT: usize = 22;

/// Sensor selections whose room reading comes from the remote air sensor.
pub const REMOTE_SENSOR_MODES: &[u8] = &[1, 4];

const REMOTE_AIR: NumericSource = tenths(37);
const BUILT_IN_AIR: NumericSource = tenths(41);

const fn tenths(offset: usize) -> NumericSource {
    NumericSource::Word {
        offset,
        order: ByteOrder::Big,
        divisor: 10,
    }
}

/// PRT layout, shared by every V3 model without a dedicated layout.
pub const PRT_LAYOUT: FieldLayout = FieldLayout {
    room_temperature: Some(NumericSource::Selected {
        selector: SENSOR_SELECT,
        values: REMOTE_SENSOR_MODES,
        matched: &REMOTE_AIR,
        otherwise: &BUILT_IN_AIR,
    }),
    frost_temperature: Some(NumericSource::Byte(26)),
    floor_temperature: Some(tenths(39)),
    set_temperature: Some(NumericSource::Byte(27)),
    on_off: Some(FlagSource::Byte(30)),
    heat_state: Some(FlagSource::Byte(44)),
    water_state: None,
    lock: None,
    time: None,
    holiday_hours: Some(CounterSource {
        offset: 33,
        order: ByteOrder::Big,
    }),
    hold_minutes: Some(CounterSource {
        offset: 35,
        order: ByteOrder::Big,
    }),
};

/// PRTHW layout: built-in sensor only, no floor sensor, hot-water relay.
pub const PRTHW_LAYOUT: FieldLayout = FieldLayout {
    room_temperature: Some(BUILT_IN_AIR),
    floor_temperature: None,
    water_state: Some(FlagSource::Byte(45)),
    ..PRT_LAYOUT
};
