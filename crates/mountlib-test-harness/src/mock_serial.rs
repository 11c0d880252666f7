//! Scripted serial transport for hand-controller tests.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs, so NexStar frame encoding and response parsing
//! can be exercised without a mount on the bench.
//!
//! # Example
//!
//! ```
//! use mountlib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // "Is the alignment complete?" -> binary 1 followed by '#'.
//! mock.expect(b"J", &[1, b'#']);
//! // Precise azimuth/elevation query.
//! mock.expect(b"z", b"40000000,20000000#");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mountlib_core::error::{Error, Result};
use mountlib_core::transport::Transport;

#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
}

/// Shared record of every frame written to a [`MockTransport`].
///
/// The mock is usually boxed and moved into the mount under test; grab a
/// `SentLog` first to inspect the wire traffic afterwards.
#[derive(Debug, Clone, Default)]
pub struct SentLog {
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl SentLog {
    fn push(&self, frame: &[u8]) {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push(frame.to_vec());
        }
    }

    /// Copy of all frames sent so far, one per `send()` call.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// Number of `send()` calls so far.
    pub fn len(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or(0)
    }

    /// True if nothing has been written to the wire.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A mock [`Transport`] for testing protocol engines without hardware.
///
/// Expectations are consumed in order. Each `send()` is recorded and must
/// match the next expectation exactly; its response is then handed out by
/// subsequent `receive()` calls, at most [`set_chunk_size`] bytes at a time.
/// Once the response is exhausted, `receive()` reports [`Error::Timeout`],
/// the same as a serial port with nothing left to read.
///
/// [`set_chunk_size`]: MockTransport::set_chunk_size
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    pending_response: Option<Vec<u8>>,
    response_cursor: usize,
    chunk_size: usize,
    connected: bool,
    sent_log: SentLog,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            chunk_size: usize::MAX,
            connected: true,
            sent_log: SentLog::default(),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// An empty `response` simulates a mount that never answers.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Limit how many bytes a single `receive()` returns, to simulate a
    /// response trickling in over several reads.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size.max(1);
    }

    /// All frames sent through this transport, one per `send()` call.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.sent_log.frames()
    }

    /// A handle to the sent-frame log that outlives moving the mock.
    pub fn sent_log(&self) -> SentLog {
        self.sent_log.clone()
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
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

        self.sent_log.push(data);

        let Some(expectation) = self.expectations.pop_front() else {
            return Err(Error::Transport(format!(
                "no more expectations in mock transport (sent {data:02X?})"
            )));
        };
        if data != expectation.request.as_slice() {
            return Err(Error::Transport(format!(
                "unexpected send data: expected {:02X?}, got {data:02X?}",
                expectation.request
            )));
        }
        self.pending_response = Some(expectation.response);
        self.response_cursor = 0;
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let Some(ref response) = self.pending_response else {
            return Err(Error::Timeout);
        };
        let remaining = &response[self.response_cursor..];
        if remaining.is_empty() {
            self.pending_response = None;
            self.response_cursor = 0;
            return Err(Error::Timeout);
        }
        let n = remaining.len().min(buf.len()).min(self.chunk_size);
        buf[..n].copy_from_slice(&remaining[..n]);
        self.response_cursor += n;
        if self.response_cursor >= response.len() {
            self.pending_response = None;
            self.response_cursor = 0;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn position_query_round_trip() {
        let mut mock = MockTransport::new();
        mock.expect(b"z", b"40000000,20000000#");

        mock.send(b"z").await.unwrap();
        let mut buf = [0u8; 32];
        let n = mock.receive(&mut buf, WAIT).await.unwrap();
        assert_eq!(&buf[..n], b"40000000,20000000#");
    }

    #[tokio::test]
    async fn sent_log_survives_move() {
        let mut mock = MockTransport::new();
        mock.expect(b"J", &[1, b'#']);
        mock.expect(b"M", b"#");
        let log = mock.sent_log();

        let mut boxed: Box<dyn Transport> = Box::new(mock);
        boxed.send(b"J").await.unwrap();
        boxed.send(b"M").await.unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.frames(), vec![b"J".to_vec(), b"M".to_vec()]);
    }

    #[tokio::test]
    async fn wrong_request_is_transport_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"J", &[1, b'#']);

        let result = mock.send(b"L").await;
        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(mock.sent_data(), vec![b"L".to_vec()]);
    }

    #[tokio::test]
    async fn exhausted_expectations_error() {
        let mut mock = MockTransport::new();
        assert!(matches!(mock.send(b"V").await, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn receive_without_send_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 8];
        assert!(matches!(
            mock.receive(&mut buf, WAIT).await,
            Err(Error::Timeout)
        ));
    }

    #[tokio::test]
    async fn silent_mount_times_out() {
        let mut mock = MockTransport::new();
        mock.expect(b"V", b"");
        mock.send(b"V").await.unwrap();

        let mut buf = [0u8; 8];
        assert!(matches!(
            mock.receive(&mut buf, WAIT).await,
            Err(Error::Timeout)
        ));
    }

    #[tokio::test]
    async fn chunked_response() {
        let mut mock = MockTransport::new();
        mock.expect(b"V", &[4, 21, b'#']);
        mock.set_chunk_size(2);
        mock.send(b"V").await.unwrap();

        let mut buf = [0u8; 8];
        let n = mock.receive(&mut buf, WAIT).await.unwrap();
        assert_eq!(&buf[..n], &[4, 21]);
        let n = mock.receive(&mut buf, WAIT).await.unwrap();
        assert_eq!(&buf[..n], b"#");
        assert!(matches!(
            mock.receive(&mut buf, WAIT).await,
            Err(Error::Timeout)
        ));
    }

    #[tokio::test]
    async fn small_buffer_reads_partial() {
        let mut mock = MockTransport::new();
        mock.expect(b"h", &[21, 30, 5, 10, 14, 26, 251, 1, b'#']);
        mock.send(b"h").await.unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(mock.receive(&mut buf, WAIT).await.unwrap(), 4);
        assert_eq!(buf, [21, 30, 5, 10]);
    }

    #[tokio::test]
    async fn remaining_expectations() {
        let mut mock = MockTransport::new();
        mock.expect(b"J", &[1, b'#']);
        mock.expect(b"M", b"#");
        assert_eq!(mock.remaining_expectations(), 2);

        mock.send(b"J").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 1);
    }

    #[tokio::test]
    async fn disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());
        assert!(matches!(mock.send(b"J").await, Err(Error::NotConnected)));
    }

    #[tokio::test]
    async fn set_connected_false() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);

        let mut buf = [0u8; 8];
        assert!(matches!(
            mock.receive(&mut buf, WAIT).await,
            Err(Error::NotConnected)
        ));
    }
}
