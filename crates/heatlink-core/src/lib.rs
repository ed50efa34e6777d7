//! heatlink-core: Core types, checksums, field layouts and error definitions
//! for heatlink.
//!
//! This crate defines the protocol-agnostic pieces every thermostat variant
//! builds on. The per-generation crates (`heatlink-v2`, `heatlink-v3`)
//! implement [`ThermostatVariant`] on top of it, and the `heatlink` facade
//! ties variants to per-thermostat state.
//!
//! # Key types
//!
//! - [`ThermostatVariant`] -- frame codec + field layout + command encoder
//! - [`Dcb`] -- an immutable, zero-filling register image
//! - [`FieldLayout`] -- `const` map from semantic fields to DCB offsets
//! - [`FieldSet`] / [`Field`] -- decoded readings, with explicit "unsupported"
//! - [`Transport`] -- byte-level communication channel
//! - [`Error`] / [`Result`] -- error handling

pub mod checksum;
pub mod dcb;
pub mod error;
pub mod layout;
pub mod transport;
pub mod types;
pub mod variant;

// Re-export key types at crate root for ergonomic `use heatlink_core::*`.
pub use dcb::{ByteOrder, Dcb};
pub use error::{Error, Result};
pub use layout::{ClockSource, CounterSource, FieldLayout, FlagSource, NumericSource};
pub use transport::Transport;
pub use types::*;
pub use variant::{DecodedFrame, EncodeContext, ThermostatVariant, Unrecognized};
