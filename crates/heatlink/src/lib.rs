//! # heatlink -- Heatmiser thermostat protocol codec
//!
//! `heatlink` decodes and encodes the binary protocol spoken by Heatmiser
//! programmable thermostats on an RS-485 bus. It validates polled register
//! images (the thermostat's DCB), decodes them into typed readings, and turns
//! commands into correctly framed, checksummed write packets. Moving the
//! bytes is left to a [`Transport`].
//!
//! ## Quick Start
//!
//! ```
//! use heatlink::{Function, Model, ProtocolVersion, ThermostatBuilder, Value};
//!
//! let mut thermostat = ThermostatBuilder::new(Model::PRT)
//!     .version(ProtocolVersion::V2)
//!     .address(1)
//!     .build();
//!
//! // Frame to send on the bus.
//! let poll = thermostat.poll().unwrap();
//! assert_eq!(poll, vec![0x01, 0x26, 0x00, 0x27]);
//!
//! // Feed the response back in.
//! let response = [0x01, 0x26, 0x04, 0x51, 0x78];
//! thermostat.decode(&response).unwrap();
//! assert_eq!(thermostat.model(), Some(Model::PRT));
//!
//! // Encode a command.
//! let frame = thermostat.encode(Function::SetTemp, &Value::Numeric(21.0)).unwrap();
//! assert_eq!(frame, vec![0x01, 0x84, 0x15, 0x9A]);
//! ```
//!
//! ## Architecture
//!
//! | Crate                   | Purpose                                          |
//! |-------------------------|--------------------------------------------------|
//! | `heatlink-core`         | Types, errors, checksums, layouts, traits        |
//! | `heatlink-v2`           | V2 frame codec, layouts, commands                |
//! | `heatlink-v3`           | V3 frame codec, layouts, commands                |
//! | **`heatlink`**          | This facade -- registry, handle, builder, link   |
//!
//! Each (protocol version, model) pair is served by a stateless
//! [`ThermostatVariant`]. The [`registry`] maps a pair to its variant,
//! falling back to the PRT variant of the same version; a [`Thermostat`]
//! pairs a variant with the per-device state (address, reported model,
//! cached DCB).
//!
//! ## Readings
//!
//! Fields a thermostat's layout does not carry read as
//! [`Field::Unsupported`], never as zero:
//!
//! ```
//! use heatlink::{Field, Function, Model, ProtocolVersion, Thermostat};
//!
//! let mut thermostat = Thermostat::new(ProtocolVersion::V2, Model::PRT, 1);
//! thermostat.decode(&[0x01, 0x26, 0x04, 0x51, 0x78]).unwrap();
//! assert_eq!(thermostat.read(Function::WaterState), Field::Unsupported);
//! ```

pub use heatlink_core::*;

/// Protocol V2 backend: short frames, additive checksum, status-block
/// writes.
pub mod v2 {
    pub use heatlink_v2::*;
}

/// Protocol V3 backend: CRC-16 frames, offset-addressed writes.
pub mod v3 {
    pub use heatlink_v3::*;
}

pub mod builder;
pub mod link;
pub mod registry;
pub mod thermostat;

pub use builder::ThermostatBuilder;
pub use link::ThermostatLink;
pub use registry::{all_variants, create_thermostat};
pub use thermostat::Thermostat;
