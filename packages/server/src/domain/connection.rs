//! Framed bidirectional connection abstraction.

use async_trait::async_trait;

use super::ConnectionError;

/// One physical connection carrying discrete text frames.
///
/// Both pumps of a client share the connection: the read pump only reads,
/// the write pump only writes, and either may close it.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Wait for the next text frame.
    ///
    /// Returns [`ConnectionError::Closed`] once the peer has gone away or
    /// [`close`](Connection::close) was called, including while a read is
    /// pending. [`ConnectionError::InvalidFrame`] only rejects one frame; the
    /// connection stays readable.
    async fn read_frame(&self) -> Result<String, ConnectionError>;

    /// Write one text frame.
    async fn write_frame(&self, frame: String) -> Result<(), ConnectionError>;

    /// Close the connection. Safe to call any number of times.
    async fn close(&self);
}
