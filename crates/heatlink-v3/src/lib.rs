//! Heatmiser protocol V3 backend for heatlink.
//!
//! V3 thermostats frame every message with explicit length and DCB offset
//! fields and protect it with a CRC-16. This crate provides:
//!
//! - **Frame codec** ([`frame`]) -- validate full-DCB responses, build read
//!   and offset-addressed write frames.
//! - **Field layouts** ([`layout`]) -- `const` PRT and PRTHW layouts,
//!   including room-sensor selection and holiday/hold counters.
//! - **Command builders** ([`commands`]) -- one builder per writable field,
//!   with the set-point range check, frost clamp and holiday policy.
//! - **Variants** ([`models`]) -- [`ThermostatVariant`](heatlink_core::ThermostatVariant)
//!   implementations.
//!
//! # Example
//!
//! ```
//! use heatlink_v3::frame::encode_poll;
//!
//! let poll = encode_poll(1);
//! assert_eq!(&poll[..8], &[0x01, 0x0A, 0x81, 0x00, 0x00, 0x00, 0xFF, 0xFF]);
//! ```

pub mod commands;
pub mod frame;
pub mod layout;
pub mod models;

pub use models::{all_v3_variants, V3Prt, V3Prthw, PRT, PRTHW};
