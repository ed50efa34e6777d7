//! The byte pipe between the codec and a thermostat bus.
//!
//! Heatmiser networks are half-duplex RS-485, reached through a serial
//! adapter or a TCP bridge. The codec never performs I/O itself; the link
//! layer in the `heatlink` crate writes encoded frames to a [`Transport`]
//! and hands whatever comes back to the decoder. Tests script the bus with
//! `MockTransport` from `heatlink-test-harness`.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous access to one thermostat bus.
///
/// Implementations move raw bytes only. Addressing, framing and checksums
/// belong to the codec, and nothing here knows where one frame ends.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one complete frame to the bus.
    async fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Read whatever bytes are available into `buf`, returning how many.
    ///
    /// A reply may arrive over several calls. Fails with
    /// [`Error::Timeout`](crate::error::Error::Timeout) when the bus stays
    /// silent for `timeout`.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Release the bus. Later sends and receives fail with
    /// [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Returns `true` while the bus can be used.
    fn is_connected(&self) -> bool;
}
