//! V2 thermostat variants.
//!
//! Two layouts exist on the V2 protocol: the programmable room thermostat
//! ([`V2Prt`]), which every other V2 model falls back to, and the hot-water
//! variant ([`V2Prthw`]). Both are stateless; use the [`PRT`] and [`PRTHW`]
//! statics.

use heatlink_core::layout::FieldLayout;
use heatlink_core::variant::{
    expect_numeric, expect_on_off, expect_timestamp, unsupported_function,
};
use heatlink_core::{
    DecodedFrame, Dcb, EncodeContext, Error, Function, Model, ProtocolVersion, Result,
    ThermostatVariant, Value,
};

use crate::commands::{cmd_frost_temp, cmd_lock, cmd_on_off, cmd_set_temp, cmd_time, cmd_water};
use crate::frame;
use crate::layout::{
    prt_status_block, prthw_status_block, StatusBlock, PRTHW_BLOCK_STATUS, PRTHW_LAYOUT,
    PRT_BLOCK_STATUS, PRT_LAYOUT,
};

/// V2 programmable room thermostat.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Prt;

/// V2 programmable room thermostat with hot-water timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Prthw;

/// Shared PRT instance.
pub static PRT: V2Prt = V2Prt;

/// Shared PRTHW instance.
pub static PRTHW: V2Prthw = V2Prthw;

const PRT_WRITABLE: &[Function] = &[
    Function::SetTemp,
    Function::FrostTemp,
    Function::OnOff,
    Function::Time,
    Function::Lock,
];

const PRTHW_WRITABLE: &[Function] = &[
    Function::SetTemp,
    Function::FrostTemp,
    Function::OnOff,
    Function::Time,
    Function::Lock,
    Function::WaterState,
];

/// Every V2 variant, baseline first.
pub fn all_v2_variants() -> [&'static dyn ThermostatVariant; 2] {
    [&PRT, &PRTHW]
}

/// How a variant rebuilds and patches its settings block.
struct BlockRules {
    rebuild: fn(&Dcb) -> StatusBlock,
    status_index: usize,
}

const PRT_BLOCK: BlockRules = BlockRules {
    rebuild: prt_status_block,
    status_index: PRT_BLOCK_STATUS,
};

const PRTHW_BLOCK: BlockRules = BlockRules {
    rebuild: prthw_status_block,
    status_index: PRTHW_BLOCK_STATUS,
};

/// Encode the commands every V2 variant shares.
fn encode_common(
    variant: &dyn ThermostatVariant,
    rules: &BlockRules,
    ctx: &EncodeContext<'_>,
    function: Function,
    value: &Value,
) -> Result<Vec<u8>> {
    match function {
        Function::SetTemp => cmd_set_temp(ctx.address, expect_numeric(function, value)?),
        Function::FrostTemp => cmd_frost_temp(ctx.address, expect_numeric(function, value)?),
        Function::OnOff => Ok(cmd_on_off(ctx.address, expect_on_off(function, value)?)),
        Function::Time => {
            let time = expect_timestamp(function, value)?;
            let block = (rules.rebuild)(ctx.require_dcb()?);
            Ok(cmd_time(ctx.address, block, time))
        }
        Function::Lock => {
            let locked = expect_on_off(function, value)?;
            let block = (rules.rebuild)(ctx.require_dcb()?);
            Ok(cmd_lock(ctx.address, block, rules.status_index, locked))
        }
        other => Err(unsupported_function(variant, other)),
    }
}

fn status_packet(rules: &BlockRules, dcb: Option<&Dcb>) -> Result<Vec<u8>> {
    let dcb = dcb.ok_or(Error::NoCachedDcb)?;
    Ok((rules.rebuild)(dcb).to_vec())
}

impl ThermostatVariant for V2Prt {
    fn version(&self) -> Option<ProtocolVersion> {
        Some(ProtocolVersion::V2)
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

    fn poll_frame(&self, address: u8, model: Option<Model>) -> Result<Vec<u8>> {
        Ok(frame::encode_poll(address, model))
    }

    fn encode(&self, ctx: &EncodeContext<'_>, function: Function, value: &Value) -> Result<Vec<u8>> {
        encode_common(self, &PRT_BLOCK, ctx, function, value)
    }

    fn current_write_status_packet(&self, dcb: Option<&Dcb>) -> Result<Vec<u8>> {
        status_packet(&PRT_BLOCK, dcb)
    }
}

impl ThermostatVariant for V2Prthw {
    fn version(&self) -> Option<ProtocolVersion> {
        Some(ProtocolVersion::V2)
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

    fn poll_frame(&self, address: u8, model: Option<Model>) -> Result<Vec<u8>> {
        Ok(frame::encode_poll(address, model))
    }

    fn encode(&self, ctx: &EncodeContext<'_>, function: Function, value: &Value) -> Result<Vec<u8>> {
        match function {
            Function::WaterState => {
                let on = expect_on_off(function, value)?;
                let block = (PRTHW_BLOCK.rebuild)(ctx.require_dcb()?);
                Ok(cmd_water(ctx.address, block, on))
            }
            _ => encode_common(self, &PRTHW_BLOCK, ctx, function, value),
        }
    }

    fn current_write_status_packet(&self, dcb: Option<&Dcb>) -> Result<Vec<u8>> {
        status_packet(&PRTHW_BLOCK, dcb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use heatlink_core::Field;
    use heatlink_test_harness::V2Image;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn ctx(dcb: Option<&Dcb>) -> EncodeContext<'_> {
        EncodeContext {
            address: 1,
            model: Some(Model::PRT),
            dcb,
            now: noon(),
        }
    }

    fn prthw_dcb() -> Dcb {
        let frame = V2Image::new(1, 82)
            .set(3, 0x02)
            .set(4, 8)
            .set(5, 15)
            .set(8, 0x98)
            .frame();
        frame::decode_frame(&frame).unwrap().dcb
    }

    // ---------------------------------------------------------------
    // Identity and capability
    // ---------------------------------------------------------------

    #[test]
    fn identities() {
        assert_eq!(PRT.version(), Some(ProtocolVersion::V2));
        assert_eq!(PRT.model(), Some(Model::PRT));
        assert_eq!(PRTHW.model(), Some(Model::PRTHW));
        let models: Vec<_> = all_v2_variants().iter().map(|v| v.model()).collect();
        assert_eq!(models, vec![Some(Model::PRT), Some(Model::PRTHW)]);
    }

    #[test]
    fn capability_lists() {
        assert!(PRT.supports(Function::Lock));
        assert!(!PRT.supports(Function::WaterState));
        assert!(!PRT.supports(Function::RunMode));
        assert!(!PRT.supports(Function::HolidaySet));
        assert!(PRTHW.supports(Function::WaterState));
    }

    // ---------------------------------------------------------------
    // Decode through the variant
    // ---------------------------------------------------------------

    #[test]
    fn water_state_unsupported_on_prt() {
        let dcb = prthw_dcb();
        assert_eq!(PRT.decode_fields(&dcb).water_state, Field::Unsupported);
        assert_eq!(PRTHW.decode_fields(&dcb).water_state, Field::Supported(true));
    }

    // ---------------------------------------------------------------
    // Encode dispatch
    // ---------------------------------------------------------------

    #[test]
    fn encode_set_temp() {
        let frame = PRT
            .encode(&ctx(None), Function::SetTemp, &Value::Numeric(21.0))
            .unwrap();
        assert_eq!(&frame[..3], &[1, 0x84, 21]);
    }

    #[test]
    fn encode_type_mismatch() {
        let err = PRT
            .encode(&ctx(None), Function::SetTemp, &Value::OnOff(true))
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn block_writes_need_a_dcb() {
        let err = PRT
            .encode(&ctx(None), Function::Lock, &Value::OnOff(true))
            .unwrap_err();
        assert!(matches!(err, Error::NoCachedDcb));
        let err = PRTHW
            .encode(&ctx(None), Function::Time, &Value::Timestamp(noon()))
            .unwrap_err();
        assert!(matches!(err, Error::NoCachedDcb));
        let err = PRTHW
            .encode(&ctx(None), Function::WaterState, &Value::OnOff(true))
            .unwrap_err();
        assert!(matches!(err, Error::NoCachedDcb));
    }

    #[test]
    fn unsupported_functions() {
        let dcb = prthw_dcb();
        for function in [Function::RunMode, Function::HolidaySet, Function::RoomTemp] {
            let err = PRTHW
                .encode(&ctx(Some(&dcb)), function, &Value::Numeric(1.0))
                .unwrap_err();
            assert!(matches!(err, Error::Unsupported(_)), "{function}");
        }
        let err = PRT
            .encode(&ctx(Some(&dcb)), Function::WaterState, &Value::OnOff(true))
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn prt_lock_patches_block_index_seven() {
        let dcb = prthw_dcb();
        let frame = PRT
            .encode(&ctx(Some(&dcb)), Function::Lock, &Value::OnOff(true))
            .unwrap();
        assert_eq!(frame.len(), 16);
        assert_eq!(frame[1], 0xA6);
        assert_eq!(frame[2 + PRT_BLOCK_STATUS], 0x98 | 0x40);
    }

    #[test]
    fn prthw_lock_patches_block_index_six() {
        let dcb = prthw_dcb();
        let frame = PRTHW
            .encode(&ctx(Some(&dcb)), Function::Lock, &Value::OnOff(true))
            .unwrap();
        assert_eq!(frame.len(), 16);
        assert_eq!(frame[1], 0xA6);
        assert_eq!(frame[2 + PRTHW_BLOCK_STATUS], 0xD8);
    }

    #[test]
    fn prthw_water_write() {
        let dcb = prthw_dcb();
        let frame = PRTHW
            .encode(&ctx(Some(&dcb)), Function::WaterState, &Value::OnOff(false))
            .unwrap();
        assert_eq!(&frame[..3], &[1, 0xAA, 0]);
        assert_eq!(frame.len(), 4);
    }

    // ---------------------------------------------------------------
    // Status packet
    // ---------------------------------------------------------------

    #[test]
    fn status_packet_requires_dcb() {
        assert!(matches!(
            PRT.current_write_status_packet(None),
            Err(Error::NoCachedDcb)
        ));
        assert!(matches!(
            PRTHW.current_write_status_packet(None),
            Err(Error::NoCachedDcb)
        ));
    }

    #[test]
    fn status_packet_from_dcb() {
        let dcb = prthw_dcb();
        let packet = PRTHW.current_write_status_packet(Some(&dcb)).unwrap();
        assert_eq!(packet.len(), 13);
        assert_eq!(&packet[..4], &[82, 0x02, 8, 15]);
        assert_eq!(packet[PRTHW_BLOCK_STATUS], 0x98);
    }

    #[test]
    fn poll_uses_reported_model() {
        assert_eq!(PRT.poll_frame(1, Some(Model::PRTHW)).unwrap()[1], 0x29);
        assert_eq!(PRTHW.poll_frame(1, Some(Model::PRT)).unwrap()[1], 0x26);
    }
}
