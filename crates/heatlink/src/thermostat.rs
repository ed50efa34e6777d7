//! The per-thermostat handle.
//!
//! A [`Thermostat`] owns the only mutable state in the codec: the bus
//! address, the model the device last reported, and the most recently
//! accepted DCB with its decoded fields. The DCB is replaced wholesale on
//! every successful [`decode`](Thermostat::decode) and left untouched when
//! a frame is rejected.
//!
//! Handles are not synchronised. Callers that share one between tasks must
//! serialise `decode` and `encode` calls themselves, e.g. behind a mutex or
//! by giving each handle a single owning task.

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use heatlink_core::{
    Dcb, EncodeContext, Field, FieldSet, Function, Model, ProtocolVersion, Result,
    ThermostatVariant, Value, ValueKind,
};

use crate::registry;

/// A thermostat on the bus.
#[derive(Debug, Clone)]
pub struct Thermostat {
    address: u8,
    model: Option<Model>,
    variant: &'static dyn ThermostatVariant,
    dcb: Option<Dcb>,
    fields: FieldSet,
}

impl Thermostat {
    /// Create a handle for `model` on `version` at bus `address`.
    ///
    /// # Example
    ///
    /// ```
    /// use heatlink::{Model, ProtocolVersion, Thermostat};
    ///
    /// let thermostat = Thermostat::new(ProtocolVersion::V2, Model::PRTHW, 1);
    /// assert_eq!(thermostat.poll().unwrap(), vec![0x01, 0x29, 0x00, 0x2A]);
    /// ```
    pub fn new(version: ProtocolVersion, model: Model, address: u8) -> Self {
        Self::with_variant(registry::lookup(version, model), Some(model), address)
    }

    /// Create a handle served by an explicit variant.
    pub fn with_variant(
        variant: &'static dyn ThermostatVariant,
        model: Option<Model>,
        address: u8,
    ) -> Self {
        Thermostat {
            address,
            model,
            variant,
            dcb: None,
            fields: FieldSet::unsupported(),
        }
    }

    /// Bus address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Change the bus address.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Protocol version, or `None` for an unrecognised one.
    pub fn version(&self) -> Option<ProtocolVersion> {
        self.variant.version()
    }

    /// Model as configured, or as last reported by the thermostat.
    pub fn model(&self) -> Option<Model> {
        self.model
    }

    /// The variant decoding and encoding for this thermostat.
    pub fn variant(&self) -> &'static dyn ThermostatVariant {
        self.variant
    }

    /// Most recently accepted DCB.
    pub fn dcb(&self) -> Option<&Dcb> {
        self.dcb.as_ref()
    }

    /// Fields decoded from the most recently accepted DCB.
    ///
    /// Every field is unsupported until the first successful decode.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Returns `true` if commands can be encoded for `function`.
    pub fn supports(&self, function: Function) -> bool {
        self.variant.supports(function)
    }

    /// Build the frame requesting the whole DCB.
    pub fn poll(&self) -> Result<Vec<u8>> {
        self.variant.poll_frame(self.address, self.model)
    }

    /// Validate `raw` and install its DCB.
    ///
    /// On success the handle takes the frame's address, and its model when
    /// the model code is known. On failure nothing changes.
    pub fn decode(&mut self, raw: &[u8]) -> Result<()> {
        let frame = self.variant.decode_frame(raw)?;
        debug!(
            address = frame.address,
            function = frame.function,
            model = ?frame.model,
            len = frame.dcb.len(),
            "DCB accepted"
        );
        self.address = frame.address;
        if let Some(model) = frame.model {
            self.model = Some(model);
        }
        self.fields = self.variant.decode_fields(&frame.dcb);
        self.dcb = Some(frame.dcb);
        Ok(())
    }

    /// Encode a command, taking "now" from the local clock.
    pub fn encode(&self, function: Function, value: &Value) -> Result<Vec<u8>> {
        self.encode_at(function, value, Local::now().naive_local())
    }

    /// Encode a command relative to `now`.
    pub fn encode_at(&self, function: Function, value: &Value, now: NaiveDateTime) -> Result<Vec<u8>> {
        let ctx = EncodeContext {
            address: self.address,
            model: self.model,
            dcb: self.dcb.as_ref(),
            now,
        };
        self.variant.encode(&ctx, function, value)
    }

    /// Read a field as a generic value, anchoring timestamps at the local
    /// clock.
    pub fn read(&self, function: Function) -> Field<Value> {
        self.read_at(function, Local::now().naive_local())
    }

    /// Read a field as a generic value, anchoring timestamps at `now`.
    pub fn read_at(&self, function: Function, now: NaiveDateTime) -> Field<Value> {
        self.fields.read(function, now)
    }

    /// Read a field rendered as `kind`, anchoring timestamps at the local
    /// clock.
    pub fn read_as(&self, function: Function, kind: ValueKind) -> Field<Value> {
        self.read_as_at(function, kind, Local::now().naive_local())
    }

    /// Read a field rendered as `kind`, anchoring timestamps at `now`.
    ///
    /// See [`FieldSet::read_as`] for the renderings on offer.
    pub fn read_as_at(&self, function: Function, kind: ValueKind, now: NaiveDateTime) -> Field<Value> {
        self.fields.read_as(function, kind, now)
    }

    /// Rebuild the settings block written by block-patch commands.
    pub fn current_write_status_packet(&self) -> Result<Vec<u8>> {
        self.variant.current_write_status_packet(self.dcb.as_ref())
    }
}
