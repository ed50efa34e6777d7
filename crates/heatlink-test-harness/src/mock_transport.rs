//! Scripted stand-in for an RS-485 thermostat bus.
//!
//! A test scripts the bus traffic in order: each poll frame the link is
//! expected to send together with the bytes the thermostat answers, and
//! each command frame that goes unanswered. Frames arriving out of script
//! fail the `send` with [`Error::Transport`].
//!
//! # Example
//!
//! ```
//! use heatlink_test_harness::MockTransport;
//!
//! let mut bus = MockTransport::new();
//! // V2 poll of thermostat 1, answered with a minimal frame.
//! bus.expect_poll(&[0x01, 0x26, 0x00, 0x27], &[0x01, 0x26, 0x04, 0x51, 0x78]);
//! // V2 SET_TEMP 21, no reply on the bus.
//! bus.expect_write(&[0x01, 0x84, 0x15, 0x9A]);
//! assert_eq!(bus.pending_exchanges(), 2);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use heatlink_core::error::{Error, Result};
use heatlink_core::transport::Transport;

/// One scripted frame and what the bus returns for it.
#[derive(Debug)]
struct Exchange {
    frame: Bytes,
    reply: Bytes,
}

/// A [`Transport`] that plays back a scripted bus conversation.
///
/// Replies are drained by `receive`, at most `chunk_size` bytes per call.
/// Once a reply is exhausted, or when nothing was asked, `receive` reports
/// [`Error::Timeout`] just as a silent bus would.
#[derive(Debug)]
pub struct MockTransport {
    script: VecDeque<Exchange>,
    reply: Bytes,
    chunk_size: usize,
    connected: bool,
    sent: Vec<Bytes>,
}

impl MockTransport {
    /// A connected bus with an empty script.
    pub fn new() -> Self {
        MockTransport {
            script: VecDeque::new(),
            reply: Bytes::new(),
            chunk_size: usize::MAX,
            connected: true,
            sent: Vec::new(),
        }
    }

    /// Script a frame the thermostat answers with `reply`.
    ///
    /// A reply shorter than a full frame models a thermostat that stops
    /// talking part way through.
    pub fn expect_poll(&mut self, frame: &[u8], reply: &[u8]) {
        self.script.push_back(Exchange {
            frame: Bytes::copy_from_slice(frame),
            reply: Bytes::copy_from_slice(reply),
        });
    }

    /// Script a frame that gets no reply, such as a command write.
    pub fn expect_write(&mut self, frame: &[u8]) {
        self.expect_poll(frame, &[]);
    }

    /// Hand replies out in pieces of at most `size` bytes, the way a slow
    /// serial adapter does.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Every frame written to the bus, in order.
    pub fn frames_sent(&self) -> &[Bytes] {
        &self.sent
    }

    /// Scripted exchanges the link has not reached yet.
    pub fn pending_exchanges(&self) -> usize {
        self.script.len()
    }

    /// Simulate the adapter going away (or coming back).
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
        if !connected {
            self.reply.clear();
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        let index = self.sent.len();
        self.sent.push(Bytes::copy_from_slice(data));

        let Some(exchange) = self.script.pop_front() else {
            return Err(Error::Transport(format!(
                "frame #{index} {data:02X?} sent after the script ended"
            )));
        };
        if exchange.frame != data {
            return Err(Error::Transport(format!(
                "frame #{index}: scripted {:02X?}, link sent {data:02X?}",
                exchange.frame.as_ref()
            )));
        }
        // A new request discards whatever was left of the previous reply.
        self.reply = exchange.reply;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.reply.is_empty() {
            return Err(Error::Timeout);
        }
        let n = self.reply.len().min(buf.len()).min(self.chunk_size);
        let chunk = self.reply.split_to(n);
        buf[..n].copy_from_slice(&chunk);
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.set_connected(false);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
