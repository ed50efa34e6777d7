//! Heatmiser protocol V2 backend for heatlink.
//!
//! V2 thermostats speak a short-frame protocol with an 8-bit additive
//! checksum. This crate provides:
//!
//! - **Frame codec** ([`frame`]) -- validate responses, strip the wire
//!   length byte, build poll and write frames.
//! - **Field layouts** ([`layout`]) -- `const` PRT and PRTHW layouts and the
//!   13-byte settings block rebuilt from a cached DCB.
//! - **Command builders** ([`commands`]) -- set-point, frost, on/off, and the
//!   clock, lock and hot-water writes that patch the settings block.
//! - **Variants** ([`models`]) -- [`ThermostatVariant`](heatlink_core::ThermostatVariant)
//!   implementations tying the above together.
//!
//! # Example
//!
//! ```
//! use heatlink_core::Model;
//! use heatlink_v2::frame::{decode_frame, encode_poll};
//!
//! let poll = encode_poll(1, Some(Model::PRT));
//! assert_eq!(poll, vec![0x01, 0x26, 0x00, 0x27]);
//!
//! let response = [0x01, 0x26, 0x04, 0x51, 0x78];
//! let decoded = decode_frame(&response).unwrap();
//! assert_eq!(decoded.model, Some(Model::PRT));
//! ```

pub mod commands;
pub mod frame;
pub mod layout;
pub mod models;

pub use models::{all_v2_variants, V2Prt, V2Prthw, PRT, PRTHW};
