//! Variant registry and thermostat factory.
//!
//! Every (protocol version, model) pair with a dedicated implementation is
//! listed in a static table. Lookups try the exact pair first and fall back
//! to the PRT variant of the same protocol version, which carries the
//! baseline feature set. An unrecognised protocol version resolves to
//! [`Unrecognized`], which exposes no model and fails every call.

use tracing::debug;

use heatlink_core::{Model, ProtocolVersion, ThermostatVariant, Unrecognized};

use crate::thermostat::Thermostat;

static UNRECOGNIZED: Unrecognized = Unrecognized;

static VARIANTS: [&dyn ThermostatVariant; 4] = [
    &heatlink_v2::PRT,
    &heatlink_v2::PRTHW,
    &heatlink_v3::PRT,
    &heatlink_v3::PRTHW,
];

/// Every registered variant, V2 first.
pub fn all_variants() -> &'static [&'static dyn ThermostatVariant] {
    &VARIANTS
}

fn find(version: ProtocolVersion, model: Model) -> Option<&'static dyn ThermostatVariant> {
    VARIANTS
        .iter()
        .copied()
        .find(|v| v.version() == Some(version) && v.model() == Some(model))
}

/// Variant for `model` on `version`, falling back to that version's PRT.
///
/// # Example
///
/// ```
/// use heatlink::registry::lookup;
/// use heatlink::{Model, ProtocolVersion};
///
/// let variant = lookup(ProtocolVersion::V3, Model::DTE);
/// assert_eq!(variant.model(), Some(Model::PRT));
/// ```
pub fn lookup(version: ProtocolVersion, model: Model) -> &'static dyn ThermostatVariant {
    if let Some(variant) = find(version, model) {
        return variant;
    }
    debug!(%version, %model, "no dedicated layout, falling back to PRT");
    find(version, Model::PRT).unwrap_or(&UNRECOGNIZED)
}

/// Variant for a numeric protocol version, as found in configuration.
///
/// Versions other than 2 and 3 resolve to the [`Unrecognized`] base.
pub fn resolve(version: u8, model: Model) -> &'static dyn ThermostatVariant {
    match ProtocolVersion::from_number(version) {
        Some(version) => lookup(version, model),
        None => {
            debug!(version, %model, "unrecognised protocol version");
            &UNRECOGNIZED
        }
    }
}

/// Create a thermostat handle for a numeric protocol version.
///
/// The handle reports `model` until a decoded frame says otherwise, even
/// when the variant serving it is the PRT fallback. A handle for an
/// unrecognised version reports no model.
pub fn create_thermostat(version: u8, model: Model, address: u8) -> Thermostat {
    let variant = resolve(version, model);
    let model = variant.version().map(|_| model);
    Thermostat::with_variant(variant, model, address)
}
