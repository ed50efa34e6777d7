//! V3 thermostat variants.
//!
//! [`V3Prt`] is the baseline V3 layout (DT, DTE and PRTE thermostats use
//! it too); [`V3Prthw`] adds the hot-water relay and drops the floor
//! sensor.

use heatlink_core::layout::FieldLayout;
use heatlink_core::variant::{
    expect_numeric, expect_on_off, expect_timestamp, unsupported_function,
};
use heatlink_core::{
    DecodedFrame, EncodeContext, Function, Model, ProtocolVersion, Result, ThermostatVariant,
    Value,
};

use crate::commands::{
    cmd_frost_temp, cmd_holiday, cmd_lock, cmd_on_off, cmd_run_mode, cmd_set_temp, cmd_time,
    cmd_water,
};
use crate::frame;
use crate::layout::{PRTHW_LAYOUT, PRT_LAYOUT};

/// V3 programmable room thermostat.
#[derive(Debug, Clone, Copy, Default)]
pub struct V3Prt;

/// V3 programmable room thermostat with hot-water timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct V3Prthw;

/// Shared PRT instance.
pub static PRT: V3Prt = V3Prt;

/// Shared PRTHW instance.
pub static PRTHW: V3Prthw = V3Prthw;

const PRT_WRITABLE: &[Function] = &[
    Function::SetTemp,
    Function::FrostTemp,
    Function::OnOff,
    Function::RunMode,
    Function::HolidaySet,
    Function::Time,
    Function::Lock,
];

const PRTHW_WRITABLE: &[Function] = &[
    Function::SetTemp,
    Function::FrostTemp,
    Function::OnOff,
    Function::RunMode,
    Function::HolidaySet,
    Function::Time,
    Function::Lock,
    Function::WaterState,
];

/// Every V3 variant, baseline first.
pub fn all_v3_variants() -> [&'static dyn ThermostatVariant; 2] {
    [&PRT, &PRTHW]
}

fn encode_common(
    variant: &dyn ThermostatVariant,
    ctx: &EncodeContext<'_>,
    function: Function,
    value: &Value,
) -> Result<Vec<u8>> {
    let address = ctx.address;
    match function {
        Function::SetTemp => cmd_set_temp(address, expect_numeric(function, value)?),
        Function::FrostTemp => cmd_frost_temp(address, expect_numeric(function, value)?),
        Function::HolidaySet => cmd_holiday(address, expect_numeric(function, value)?, ctx.now),
        Function::OnOff => Ok(cmd_on_off(address, expect_on_off(function, value)?)),
        Function::RunMode => Ok(cmd_run_mode(address, expect_on_off(function, value)?)),
        Function::Lock => Ok(cmd_lock(address, expect_on_off(function, value)?)),
        Function::Time => Ok(cmd_time(address, expect_timestamp(function, value)?)),
        other => Err(unsupported_function(variant, other)),
    }
}

impl ThermostatVariant for V3Prt {
    fn version(&self) -> Option<ProtocolVersion> {
        Some(ProtocolVersion::V3)
    }

    fn model(&self) -> Option<Model> {
        Some(Model::PRT)
    }

    fn layout(&self) -> &'static FieldLayout {
        &PRT_LAYOUT
    }

    fn writable(&self) -> &'static [Function] {
        PRT_WRITABLE
    }

    fn expected_frame_len(&self, header: &[u8]) -> Option<usize> {
        frame::expected_frame_len(header)
    }

    fn decode_frame(&self, raw: &[u8]) -> Result<DecodedFrame> {
        frame::decode_frame(raw)
    }

    fn poll_frame(&self, address: u8, _model: Option<Model>) -> Result<Vec<u8>> {
        Ok(frame::encode_poll(address))
    }

    fn encode(&self, ctx: &EncodeContext<'_>, function: Function, value: &Value) -> Result<Vec<u8>> {
        encode_common(self, ctx, function, value)
    }
}

impl ThermostatVariant for V3Prthw {
    fn version(&self) -> Option<ProtocolVersion> {
        Some(ProtocolVersion::V3)
    }

    fn model(&self) -> Option<Model> {
        Some(Model::PRTHW)
    }

    fn layout(&self) -> &'static FieldLayout {
        &PRTHW_LAYOUT
    }

    fn writable(&self) -> &'static [Function] {
        PRTHW_WRITABLE
    }

    fn expected_frame_len(&self, header: &[u8]) -> Option<usize> {
        frame::expected_frame_len(header)
    }

    fn decode_frame(&self, raw: &[u8]) -> Result<DecodedFrame> {
        frame::decode_frame(raw)
    }

    fn poll_frame(&self, address: u8, _model: Option<Model>) -> Result<Vec<u8>> {
        Ok(frame::encode_poll(address))
    }

    fn encode(&self, ctx: &EncodeContext<'_>, function: Function, value: &Value) -> Result<Vec<u8>> {
        match function {
            Function::WaterState => Ok(cmd_water(ctx.address, expect_on_off(function, value)?)),
            _ => encode_common(self, ctx, function, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use heatlink_core::{Dcb, Error, Field};
    use heatlink_test_harness::V3Image;

    fn midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn ctx() -> EncodeContext<'static> {
        EncodeContext {
            address: 2,
            model: Some(Model::PRT),
            dcb: None,
            now: midnight(),
        }
    }

    fn payload(frame: &[u8]) -> &[u8] {
        &frame[8..frame.len() - 2]
    }

    #[test]
    fn identities() {
        assert_eq!(PRT.version(), Some(ProtocolVersion::V3));
        assert_eq!(PRT.model(), Some(Model::PRT));
        assert_eq!(PRTHW.model(), Some(Model::PRTHW));
        assert_eq!(all_v3_variants().len(), 2);
    }

    #[test]
    fn capability_lists() {
        assert!(PRT.supports(Function::HolidaySet));
        assert!(PRT.supports(Function::Lock));
        assert!(!PRT.supports(Function::WaterState));
        assert!(PRTHW.supports(Function::WaterState));
        assert!(!PRTHW.supports(Function::RoomTemp));
    }

    #[test]
    fn poll_requests_whole_dcb() {
        let frame = PRTHW.poll_frame(9, Some(Model::PRTHW)).unwrap();
        assert_eq!(&frame[..8], &[9, 10, 0x81, 0, 0, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn encode_needs_no_cached_dcb() {
        for (function, value) in [
            (Function::SetTemp, Value::Numeric(20.0)),
            (Function::HolidaySet, Value::Numeric(3.0)),
            (Function::Lock, Value::OnOff(true)),
            (Function::Time, Value::Timestamp(midnight())),
        ] {
            assert!(PRT.encode(&ctx(), function, &value).is_ok(), "{function}");
        }
    }

    #[test]
    fn holiday_through_variant() {
        let frame = PRT
            .encode(&ctx(), Function::HolidaySet, &Value::Numeric(99.0))
            .unwrap();
        assert_eq!(payload(&frame), &[0x48, 0x09]);
        let frame = PRT
            .encode(&ctx(), Function::HolidaySet, &Value::Numeric(100.0))
            .unwrap();
        assert_eq!(payload(&frame), &[0, 0]);
    }

    #[test]
    fn water_only_on_prthw() {
        let err = PRT
            .encode(&ctx(), Function::WaterState, &Value::OnOff(true))
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));

        let frame = PRTHW
            .encode(&ctx(), Function::WaterState, &Value::OnOff(true))
            .unwrap();
        assert_eq!(frame[4], 42);
        assert_eq!(payload(&frame), &[1]);
    }

    #[test]
    fn run_mode_requires_on_off() {
        let err = PRT
            .encode(&ctx(), Function::RunMode, &Value::Numeric(1.0))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                function: Function::RunMode,
                expected: "on/off",
                ..
            }
        ));
    }

    #[test]
    fn no_status_block_on_v3() {
        let dcb = Dcb::new(V3Image::new(1, 2).frame());
        assert!(matches!(
            PRT.current_write_status_packet(Some(&dcb)),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn decode_through_variant() {
        let raw = V3Image::new(5, 4).set(45, 1).set_tenths(41, 19.0).frame();
        let decoded = PRTHW.decode_frame(&raw).unwrap();
        let fields = PRTHW.decode_fields(&decoded.dcb);
        assert_eq!(fields.water_state, Field::Supported(true));
        assert_eq!(fields.room_temperature, Field::Supported(19.0));
        assert_eq!(fields.floor_temperature, Field::Unsupported);
        assert_eq!(PRTHW.expected_frame_len(&raw), Some(raw.len()));
    }
}
