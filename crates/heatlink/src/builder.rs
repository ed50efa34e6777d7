//! ThermostatBuilder -- fluent builder for [`Thermostat`] handles.
//!
//! # Example
//!
//! ```
//! use heatlink::{Model, ProtocolVersion, ThermostatBuilder};
//!
//! let thermostat = ThermostatBuilder::new(Model::PRTHW)
//!     .version(ProtocolVersion::V2)
//!     .address(12)
//!     .build();
//! assert_eq!(thermostat.address(), 12);
//! assert_eq!(thermostat.version(), Some(ProtocolVersion::V2));
//! ```

use heatlink_core::{Model, ProtocolVersion};

use crate::registry;
use crate::thermostat::Thermostat;

/// Default bus address.
pub const DEFAULT_ADDRESS: u8 = 1;

/// Fluent builder for [`Thermostat`].
///
/// The protocol version defaults to V3 and the address to 1.
#[derive(Debug, Clone)]
pub struct ThermostatBuilder {
    model: Model,
    version: u8,
    address: u8,
}

impl ThermostatBuilder {
    /// Create a new builder for the given model.
    pub fn new(model: Model) -> Self {
        ThermostatBuilder {
            model,
            version: ProtocolVersion::V3.number(),
            address: DEFAULT_ADDRESS,
        }
    }

    /// Set the protocol version.
    pub fn version(mut self, version: ProtocolVersion) -> Self {
        self.version = version.number();
        self
    }

    /// Set the protocol version by number, as read from configuration.
    ///
    /// Numbers other than 2 and 3 build a handle with no model that fails
    /// every call.
    pub fn version_number(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Set the bus address.
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Build the handle.
    pub fn build(self) -> Thermostat {
        registry::create_thermostat(self.version, self.model, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let thermostat = ThermostatBuilder::new(Model::PRT).build();
        assert_eq!(thermostat.version(), Some(ProtocolVersion::V3));
        assert_eq!(thermostat.address(), DEFAULT_ADDRESS);
        assert_eq!(thermostat.model(), Some(Model::PRT));
    }

    #[test]
    fn overrides() {
        let thermostat = ThermostatBuilder::new(Model::FCV)
            .version(ProtocolVersion::V2)
            .address(200)
            .build();
        assert_eq!(thermostat.version(), Some(ProtocolVersion::V2));
        assert_eq!(thermostat.address(), 200);
        assert_eq!(thermostat.model(), Some(Model::FCV));
        assert_eq!(thermostat.variant().model(), Some(Model::PRT));
    }

    #[test]
    fn unknown_version_number() {
        let thermostat = ThermostatBuilder::new(Model::PRT).version_number(5).build();
        assert_eq!(thermostat.version(), None);
        assert_eq!(thermostat.model(), None);
        assert!(thermostat.poll().is_err());
    }
}
