//! The `ThermostatVariant` trait -- one implementation per supported
//! (protocol version, model) pair.
//!
//! A variant bundles a frame codec, a field layout and a command encoder.
//! Variants are stateless: everything they need (bus address, last DCB,
//! current time) arrives in the call, so a single `'static` instance serves
//! every thermostat of that kind. Per-thermostat state lives in the handle
//! that owns a variant reference.

use std::fmt;

use chrono::NaiveDateTime;

use crate::dcb::Dcb;
use crate::error::{Error, Result};
use crate::layout::FieldLayout;
use crate::types::{FieldSet, Function, Model, ProtocolVersion, Value};

/// A validated inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Bus address of the responding thermostat.
    pub address: u8,
    /// Function byte of the response.
    pub function: u8,
    /// Model reported by the DCB, if its code is known.
    pub model: Option<Model>,
    /// The addressable register image.
    pub dcb: Dcb,
}

/// Everything an encoder may need beyond the command itself.
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    /// Bus address of the target thermostat.
    pub address: u8,
    /// Model currently reported by the thermostat.
    pub model: Option<Model>,
    /// Last accepted DCB, required by status-block writes.
    pub dcb: Option<&'a Dcb>,
    /// Local wall-clock time, used by commands relative to "today".
    pub now: NaiveDateTime,
}

impl<'a> EncodeContext<'a> {
    /// The cached DCB, or [`Error::NoCachedDcb`].
    pub fn require_dcb(&self) -> Result<&'a Dcb> {
        self.dcb.ok_or(Error::NoCachedDcb)
    }
}

/// Frame codec, field layout and command encoder for one kind of thermostat.
pub trait ThermostatVariant: Send + Sync + fmt::Debug {
    /// Protocol version spoken, or `None` for the unrecognised-version base.
    fn version(&self) -> Option<ProtocolVersion>;

    /// Model whose layout this variant implements.
    fn model(&self) -> Option<Model>;

    /// Static field layout.
    fn layout(&self) -> &'static FieldLayout;

    /// Functions this variant can encode commands for.
    fn writable(&self) -> &'static [Function];

    /// Returns `true` if [`encode`](Self::encode) handles `function`.
    fn supports(&self, function: Function) -> bool {
        self.writable().contains(&function)
    }

    /// Total frame length announced by the first bytes of a response, if
    /// enough of the header has arrived to tell.
    fn expected_frame_len(&self, header: &[u8]) -> Option<usize>;

    /// Validate a raw frame and strip its framing.
    fn decode_frame(&self, raw: &[u8]) -> Result<DecodedFrame>;

    /// Decode the semantic fields of a validated DCB.
    fn decode_fields(&self, dcb: &Dcb) -> FieldSet {
        self.layout().decode(dcb)
    }

    /// Build the frame that requests the whole DCB.
    fn poll_frame(&self, address: u8, model: Option<Model>) -> Result<Vec<u8>>;

    /// Build a framed write for one command.
    fn encode(&self, ctx: &EncodeContext<'_>, function: Function, value: &Value)
    -> Result<Vec<u8>>;

    /// Rebuild the canonical settings block from a cached DCB.
    ///
    /// Only protocols with block-patch writes implement this.
    fn current_write_status_packet(&self, dcb: Option<&Dcb>) -> Result<Vec<u8>> {
        let _ = dcb;
        Err(Error::Unsupported(format!(
            "status block writes on {}",
            describe(self.version(), self.model())
        )))
    }
}

/// Human-readable "V3 PRTHW" style label.
pub fn describe(version: Option<ProtocolVersion>, model: Option<Model>) -> String {
    match (version, model) {
        (Some(v), Some(m)) => format!("{v} {m}"),
        (Some(v), None) => format!("{v}"),
        (None, _) => "unrecognised protocol".to_string(),
    }
}

/// Check a command value's kind, returning [`Error::TypeMismatch`] otherwise.
pub fn expect_numeric(function: Function, value: &Value) -> Result<f64> {
    match value {
        Value::Numeric(n) => Ok(*n),
        other => Err(type_mismatch(function, "numeric", other)),
    }
}

/// Check a command value's kind, returning [`Error::TypeMismatch`] otherwise.
pub fn expect_on_off(function: Function, value: &Value) -> Result<bool> {
    match value {
        Value::OnOff(on) => Ok(*on),
        other => Err(type_mismatch(function, "on/off", other)),
    }
}

/// Check a command value's kind, returning [`Error::TypeMismatch`] otherwise.
pub fn expect_timestamp(function: Function, value: &Value) -> Result<NaiveDateTime> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        other => Err(type_mismatch(function, "timestamp", other)),
    }
}

fn type_mismatch(function: Function, expected: &'static str, actual: &Value) -> Error {
    Error::TypeMismatch {
        function,
        expected,
        actual: actual.kind(),
    }
}

/// Truncate a numeric command value toward zero.
///
/// Non-finite input is [`Error::ValueOutOfRange`].
pub fn whole_number(function: Function, value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(Error::ValueOutOfRange { function, value });
    }
    Ok(value.trunc() as i64)
}

/// Error for a function the variant does not encode.
pub fn unsupported_function(variant: &dyn ThermostatVariant, function: Function) -> Error {
    Error::Unsupported(format!(
        "{function} on {}",
        describe(variant.version(), variant.model())
    ))
}

/// Base variant for an unrecognised protocol version.
///
/// Exposes no model and no fields; every decode and encode fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrecognized;

impl ThermostatVariant for Unrecognized {
    fn version(&self) -> Option<ProtocolVersion> {
        None
    }

    fn model(&self) -> Option<Model> {
        None
    }

    fn layout(&self) -> &'static FieldLayout {
        &FieldLayout::EMPTY
    }

    fn writable(&self) -> &'static [Function] {
        &[]
    }

    fn expected_frame_len(&self, _header: &[u8]) -> Option<usize> {
        None
    }

    fn decode_frame(&self, _raw: &[u8]) -> Result<DecodedFrame> {
        Err(Error::Unsupported("decode on unrecognised protocol".into()))
    }

    fn poll_frame(&self, _address: u8, _model: Option<Model>) -> Result<Vec<u8>> {
        Err(Error::Unsupported("poll on unrecognised protocol".into()))
    }

    fn encode(
        &self,
        _ctx: &EncodeContext<'_>,
        function: Function,
        _value: &Value,
    ) -> Result<Vec<u8>> {
        Err(unsupported_function(self, function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx(dcb: Option<&Dcb>) -> EncodeContext<'_> {
        EncodeContext {
            address: 1,
            model: None,
            dcb,
            now: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn require_dcb() {
        assert!(matches!(ctx(None).require_dcb(), Err(Error::NoCachedDcb)));
        let dcb = Dcb::new(vec![1, 2]);
        assert_eq!(ctx(Some(&dcb)).require_dcb().unwrap().len(), 2);
    }

    #[test]
    fn value_kind_checks() {
        assert_eq!(
            expect_numeric(Function::SetTemp, &Value::Numeric(20.0)).unwrap(),
            20.0
        );
        let err = expect_on_off(Function::OnOff, &Value::Numeric(1.0)).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                function: Function::OnOff,
                expected: "on/off",
                actual: "numeric",
            }
        ));
        assert!(expect_timestamp(Function::Time, &Value::Text("now".into())).is_err());
    }

    #[test]
    fn whole_number_truncates() {
        assert_eq!(whole_number(Function::SetTemp, 21.9).unwrap(), 21);
        assert_eq!(whole_number(Function::SetTemp, -0.5).unwrap(), 0);
        assert_eq!(whole_number(Function::SetTemp, -3.5).unwrap(), -3);
        assert!(matches!(
            whole_number(Function::SetTemp, f64::NAN),
            Err(Error::ValueOutOfRange { .. })
        ));
        assert!(whole_number(Function::SetTemp, f64::INFINITY).is_err());
    }

    #[test]
    fn unrecognized_fails_everything() {
        let base = Unrecognized;
        assert_eq!(base.version(), None);
        assert_eq!(base.model(), None);
        assert!(base.decode_frame(&[0; 16]).is_err());
        assert!(base.poll_frame(1, None).is_err());
        assert!(base.current_write_status_packet(None).is_err());
        let err = base
            .encode(&ctx(None), Function::SetTemp, &Value::Numeric(20.0))
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(!base.supports(Function::SetTemp));
        assert_eq!(base.decode_fields(&Dcb::new(vec![1; 64])), FieldSet::unsupported());
    }

    #[test]
    fn describe_labels() {
        assert_eq!(
            describe(Some(ProtocolVersion::V3), Some(Model::PRTHW)),
            "V3 PRTHW"
        );
        assert_eq!(describe(None, None), "unrecognised protocol");
    }
}
