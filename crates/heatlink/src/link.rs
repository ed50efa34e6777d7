//! ThermostatLink -- drives [`Thermostat`] handles over a [`Transport`].
//!
//! The link sends a handle's poll frame, gathers the response until the
//! variant reports a complete frame, and hands it to the handle for
//! decoding. Commands are encoded by the handle and sent as-is; V2 and V3
//! thermostats do not acknowledge writes, so nothing is read back.
//!
//! There are no retries: a timeout or a rejected frame is returned to the
//! caller, who decides whether to poll again.
//!
//! # Example
//!
//! ```no_run
//! use heatlink::{Function, Model, ThermostatBuilder, ThermostatLink, Transport, Value};
//!
//! # async fn example(transport: Box<dyn Transport>) -> heatlink::Result<()> {
//! let mut thermostat = ThermostatBuilder::new(Model::PRT).address(3).build();
//! let mut link = ThermostatLink::new(transport);
//!
//! link.refresh(&mut thermostat).await?;
//! println!("room: {:?}", thermostat.fields().room_temperature);
//!
//! link.execute(&thermostat, Function::SetTemp, &Value::Numeric(21.0)).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use heatlink_core::{Error, Function, Result, ThermostatVariant, Transport, Value};

use crate::thermostat::Thermostat;

/// Default time allowed for a complete response to arrive.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Size of a single receive buffer.
const RECEIVE_CHUNK: usize = 256;

/// Pause after a receive that returned no bytes.
const IDLE_BACKOFF: Duration = Duration::from_millis(5);

/// Request/response driver over one transport.
pub struct ThermostatLink {
    transport: Box<dyn Transport>,
    response_timeout: Duration,
}

impl ThermostatLink {
    /// Wrap a connected transport.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        ThermostatLink {
            transport,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Set the time allowed for a complete response (default: 1s).
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Returns `true` if the underlying transport is connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Give back the underlying transport.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }

    /// Poll `thermostat` and decode the response into it.
    pub async fn refresh(&mut self, thermostat: &mut Thermostat) -> Result<()> {
        let poll = thermostat.poll()?;
        trace!(address = thermostat.address(), frame = ?poll, "sending poll");
        self.transport.send(&poll).await?;

        let response = self.read_frame(thermostat.variant()).await?;
        trace!(len = response.len(), "response received");
        thermostat.decode(&response)
    }

    /// Encode a command for `thermostat` and send it.
    pub async fn execute(
        &mut self,
        thermostat: &Thermostat,
        function: Function,
        value: &Value,
    ) -> Result<()> {
        let frame = thermostat.encode(function, value)?;
        debug!(
            address = thermostat.address(),
            %function,
            %value,
            len = frame.len(),
            "sending command"
        );
        self.transport.send(&frame).await
    }

    /// Gather bytes until `variant` reports a complete frame.
    ///
    /// If the transport falls silent part way through, the partial frame is
    /// returned so decoding reports what is wrong with it.
    async fn read_frame(&mut self, variant: &dyn ThermostatVariant) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.response_timeout;
        let mut buf = [0u8; RECEIVE_CHUNK];
        let mut response = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::Timeout);
            }

            let received =
                tokio::time::timeout(remaining, self.transport.receive(&mut buf, remaining)).await;
            match received {
                Err(_) => return Err(Error::Timeout),
                Ok(Ok(0)) => {
                    tokio::time::sleep(IDLE_BACKOFF.min(remaining)).await;
                }
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if let Some(expected) = variant.expected_frame_len(&response) {
                        if response.len() >= expected {
                            if response.len() > expected {
                                debug!(
                                    expected,
                                    extra = response.len() - expected,
                                    "discarding bytes after frame"
                                );
                            }
                            response.truncate(expected);
                            return Ok(response);
                        }
                    }
                }
                Ok(Err(Error::Timeout)) if !response.is_empty() => {
                    debug!(len = response.len(), "response stopped short");
                    return Ok(response);
                }
                Ok(Err(e)) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use heatlink_core::{Field, Model, ProtocolVersion};
    use heatlink_test_harness::{MockTransport, V2Image, V3Image};

    /// Accepts every frame and then reads zero bytes forever.
    struct IdleTransport {
        receives: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for IdleTransport {
        async fn send(&mut self, _frame: &[u8]) -> Result<()> {
            Ok(())
        }

        async fn receive(&mut self, _buf: &mut [u8], _timeout: Duration) -> Result<usize> {
            self.receives.fetch_add(1, Ordering::Relaxed);
            Ok(0)
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn link(mock: MockTransport) -> ThermostatLink {
        ThermostatLink::new(Box::new(mock)).response_timeout(Duration::from_millis(200))
    }

    // ---------------------------------------------------------------
    // Refresh
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn refresh_v3() {
        let mut thermostat = Thermostat::new(ProtocolVersion::V3, Model::PRT, 5);
        let response = V3Image::new(5, 2).set_tenths(41, 20.5).set(27, 21).frame();

        let mut mock = MockTransport::new();
        mock.expect_poll(&thermostat.poll().unwrap(), &response);
        let mut link = link(mock);

        link.refresh(&mut thermostat).await.unwrap();
        assert_eq!(thermostat.fields().room_temperature, Field::Supported(20.5));
        assert_eq!(thermostat.fields().set_temperature, Field::Supported(21.0));
    }

    #[tokio::test]
    async fn refresh_v2_in_chunks() {
        let mut thermostat = Thermostat::new(ProtocolVersion::V2, Model::PRTHW, 2);
        let response = V2Image::new(2, 82).set(6, 18).set(8, 0x08).frame();

        let mut mock = MockTransport::new().with_chunk_size(2);
        mock.expect_poll(&[0x02, 0x29, 0x00, 0x2B], &response);
        let mut link = link(mock);

        link.refresh(&mut thermostat).await.unwrap();
        assert_eq!(thermostat.fields().room_temperature, Field::Supported(18.0));
        assert_eq!(thermostat.fields().water_state, Field::Supported(true));
    }

    #[tokio::test]
    async fn refresh_ignores_trailing_bytes() {
        let mut thermostat = Thermostat::new(ProtocolVersion::V3, Model::PRT, 1);
        let mut response = V3Image::new(1, 2).frame();
        response.extend_from_slice(&[0xAA, 0xBB]);

        let mut mock = MockTransport::new();
        mock.expect_poll(&thermostat.poll().unwrap(), &response);
        let mut link = link(mock);

        link.refresh(&mut thermostat).await.unwrap();
        assert_eq!(thermostat.dcb().unwrap().len(), response.len() - 2);
    }

    #[tokio::test]
    async fn refresh_without_response_times_out() {
        let mut thermostat = Thermostat::new(ProtocolVersion::V3, Model::PRT, 1);
        let mut mock = MockTransport::new();
        mock.expect_poll(&thermostat.poll().unwrap(), &[]);
        let mut link = link(mock);

        assert!(matches!(
            link.refresh(&mut thermostat).await,
            Err(Error::Timeout)
        ));
        assert!(thermostat.dcb().is_none());
    }

    #[tokio::test]
    async fn empty_reads_back_off_until_deadline() {
        let receives = Arc::new(AtomicUsize::new(0));
        let transport = IdleTransport {
            receives: Arc::clone(&receives),
        };
        let mut link = ThermostatLink::new(Box::new(transport))
            .response_timeout(Duration::from_millis(50));
        let mut thermostat = Thermostat::new(ProtocolVersion::V3, Model::PRT, 1);

        assert!(matches!(
            link.refresh(&mut thermostat).await,
            Err(Error::Timeout)
        ));
        let calls = receives.load(Ordering::Relaxed);
        assert!(calls >= 1);
        assert!(calls <= 20, "{calls} receive calls in 50ms");
    }

    #[tokio::test]
    async fn truncated_response_is_rejected_by_decode() {
        let mut thermostat = Thermostat::new(ProtocolVersion::V3, Model::PRT, 1);
        let full = V3Image::new(1, 2).frame();

        let mut mock = MockTransport::new();
        mock.expect_poll(&thermostat.poll().unwrap(), &full[..40]);
        let mut link = link(mock);

        assert!(matches!(
            link.refresh(&mut thermostat).await,
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn refresh_disconnected() {
        let mut thermostat = Thermostat::new(ProtocolVersion::V3, Model::PRT, 1);
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        let mut link = link(mock);

        assert!(!link.is_connected());
        assert!(matches!(
            link.refresh(&mut thermostat).await,
            Err(Error::NotConnected)
        ));
    }

    // ---------------------------------------------------------------
    // Execute
    // ---------------------------------------------------------------

    #[tokio::test]
    async fn execute_sends_encoded_frame() {
        let thermostat = Thermostat::new(ProtocolVersion::V2, Model::PRT, 1);
        let mut mock = MockTransport::new();
        mock.expect_write(&[0x01, 0x84, 0x15, 0x9A]);
        let mut link = link(mock);

        link.execute(&thermostat, Function::SetTemp, &Value::Numeric(21.0))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn execute_rejects_before_sending() {
        let thermostat = Thermostat::new(ProtocolVersion::V2, Model::PRT, 1);
        let mut link = link(MockTransport::new());

        let result = link
            .execute(&thermostat, Function::SetTemp, &Value::Numeric(40.0))
            .await;
        assert!(matches!(result, Err(Error::ValueOutOfRange { .. })));
    }

    #[tokio::test]
    async fn close_disconnects() {
        let mut link = link(MockTransport::new());
        link.close().await.unwrap();
        assert!(!link.into_transport().is_connected());
    }
}
