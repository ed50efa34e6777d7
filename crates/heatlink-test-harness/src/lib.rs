//! heatlink-test-harness: Test utilities, a mock transport, and frame
//! fixtures for heatlink.
//!
//! This crate provides [`MockTransport`] for deterministic testing of the
//! link layer without a thermostat network, and [`V2Image`] / [`V3Image`]
//! for building valid response frames with correct length fields and
//! checksums.

pub mod frames;
pub mod mock_transport;

pub use frames::{V2Image, V3Image};
pub use mock_transport::MockTransport;
