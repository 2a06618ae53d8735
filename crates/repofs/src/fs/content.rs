//! Byte sources handed to and taken from the protocol front end.

use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::error::{FsError, FsResult, catalog};

/// Full object content, readable and seekable from the start.
///
/// Holds one whole object in memory; dropping it releases the buffer.
#[derive(Debug, Clone, Default)]
pub struct Content {
    inner: Cursor<Vec<u8>>,
}

impl Content {
    /// Wrap fetched bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(bytes),
        }
    }

    /// Total size in bytes.
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    /// True for a zero-length object.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All bytes, regardless of the read position.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }

    /// Take the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl Read for Content {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(&mut self.inner, buf)
    }
}

impl Seek for Content {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl AsyncRead for Content {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

/// Drain an upload stream fully into memory.
///
/// A failure here happens before any remote call, so nothing was mutated
/// and the client may resend.
pub(crate) async fn drain(data: &mut (dyn AsyncRead + Unpin + Send)) -> FsResult<Vec<u8>> {
    let mut bytes = Vec::new();
    data.read_to_end(&mut bytes)
        .await
        .map_err(|e| FsError::transient(format!("{}: {}", catalog::UPLOAD_READ_FAILED, e)))?;
    Ok(bytes)
}
