//! Static field layouts.
//!
//! A [`FieldLayout`] maps every semantic field to where it lives in a DCB:
//! a raw byte, a single bit, or a two-byte pair with a byte order and an
//! optional scaling divisor. One `const` layout exists per supported
//! (protocol version, model) pair; offsets never depend on payload
//! contents, apart from the room-temperature sensor selector some layouts
//! carry.
//!
//! A field whose source is `None` decodes to [`Field::Unsupported`].

use chrono::Weekday;

use crate::dcb::{ByteOrder, Dcb};
use crate::types::{Field, FieldSet, TimeOfDay};

/// Weekdays indexed from Sunday, matching the device's day numbering.
const WEEK_FROM_SUNDAY: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Where a numeric (temperature) field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericSource {
    /// A raw byte, whole degrees.
    Byte(usize),
    /// A two-byte value divided by `divisor` (10 for tenths of a degree).
    Word {
        /// Offset of the first byte.
        offset: usize,
        /// Byte order of the pair.
        order: ByteOrder,
        /// Scaling divisor.
        divisor: u16,
    },
    /// One of two sources, chosen by the byte at `selector`.
    Selected {
        /// Offset of the selector byte.
        selector: usize,
        /// Selector values that choose `matched`.
        values: &'static [u8],
        /// Source used when the selector matches.
        matched: &'static NumericSource,
        /// Source used otherwise.
        otherwise: &'static NumericSource,
    },
}

impl NumericSource {
    /// Read this field from `dcb`.
    pub fn read(&self, dcb: &Dcb) -> f64 {
        match self {
            NumericSource::Byte(offset) => f64::from(dcb.byte(*offset)),
            NumericSource::Word {
                offset,
                order,
                divisor,
            } => f64::from(dcb.word(*offset, *order)) / f64::from(*divisor),
            NumericSource::Selected {
                selector,
                values,
                matched,
                otherwise,
            } => {
                if values.contains(&dcb.byte(*selector)) {
                    matched.read(dcb)
                } else {
                    otherwise.read(dcb)
                }
            }
        }
    }
}

/// Where an on/off field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagSource {
    /// A whole byte; on when it equals 1.
    Byte(usize),
    /// A single bit of a byte; on when set.
    Bit {
        /// Offset of the byte.
        offset: usize,
        /// Bit position, 0 = LSB.
        bit: u8,
    },
}

impl FlagSource {
    /// Read this field from `dcb`.
    pub fn read(&self, dcb: &Dcb) -> bool {
        match self {
            FlagSource::Byte(offset) => dcb.byte(*offset) == 1,
            FlagSource::Bit { offset, bit } => dcb.bit(*offset, *bit),
        }
    }
}

/// A plain two-byte counter (holiday hours, hold minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSource {
    /// Offset of the first byte.
    pub offset: usize,
    /// Byte order of the pair.
    pub order: ByteOrder,
}

impl CounterSource {
    /// Read this field from `dcb`.
    pub fn read(&self, dcb: &Dcb) -> u16 {
        dcb.word(self.offset, self.order)
    }
}

/// Location of the thermostat clock.
///
/// The day byte's low nibble is a Sunday-based day index; the hour and
/// minute bytes are binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSource {
    /// Offset of the day-of-week byte.
    pub day: usize,
    /// Offset of the hour byte.
    pub hour: usize,
    /// Offset of the minute byte.
    pub minute: usize,
}

impl ClockSource {
    /// Read this field from `dcb`.
    pub fn read(&self, dcb: &Dcb) -> TimeOfDay {
        let nibble = usize::from(dcb.byte(self.day) & 0x0F);
        TimeOfDay {
            weekday: WEEK_FROM_SUNDAY[nibble % 7],
            hour: dcb.byte(self.hour),
            minute: dcb.byte(self.minute),
        }
    }
}

/// A complete field layout for one (protocol version, model) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub room_temperature: Option<NumericSource>,
    pub frost_temperature: Option<NumericSource>,
    pub floor_temperature: Option<NumericSource>,
    pub set_temperature: Option<NumericSource>,
    pub on_off: Option<FlagSource>,
    pub heat_state: Option<FlagSource>,
    pub water_state: Option<FlagSource>,
    pub lock: Option<FlagSource>,
    pub time: Option<ClockSource>,
    pub holiday_hours: Option<CounterSource>,
    pub hold_minutes: Option<CounterSource>,
}

impl FieldLayout {
    /// A layout carrying no fields at all.
    pub const EMPTY: FieldLayout = FieldLayout {
        room_temperature: None,
        frost_temperature: None,
        floor_temperature: None,
        set_temperature: None,
        on_off: None,
        heat_state: None,
        water_state: None,
        lock: None,
        time: None,
        holiday_hours: None,
        hold_minutes: None,
    };

    /// Decode every field this layout carries.
    pub fn decode(&self, dcb: &Dcb) -> FieldSet {
        FieldSet {
            room_temperature: read(self.room_temperature, |s| s.read(dcb)),
            frost_temperature: read(self.frost_temperature, |s| s.read(dcb)),
            floor_temperature: read(self.floor_temperature, |s| s.read(dcb)),
            set_temperature: read(self.set_temperature, |s| s.read(dcb)),
            on_off: read(self.on_off, |s| s.read(dcb)),
            heat_state: read(self.heat_state, |s| s.read(dcb)),
            water_state: read(self.water_state, |s| s.read(dcb)),
            lock: read(self.lock, |s| s.read(dcb)),
            time: read(self.time, |s| s.read(dcb)),
            holiday_hours: read(self.holiday_hours, |s| s.read(dcb)),
            hold_minutes: read(self.hold_minutes, |s| s.read(dcb)),
        }
    }
}

fn read<S, T>(source: Option<S>, f: impl FnOnce(S) -> T) -> Field<T> {
    source.map(f).into()
}
