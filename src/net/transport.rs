//! Line-oriented transport over an async byte stream
//!
//! The coordinator's wire protocol is newline-delimited UTF-8 text. This module
//! frames that protocol over any `AsyncRead + AsyncWrite` stream: a `TcpStream`
//! in production, an in-memory duplex pipe in tests.

use crate::error::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};

/// Blocking line-send and line-receive over one exclusively owned stream
#[async_trait]
pub trait LineTransport: Send {
    /// Write one line, appending the newline delimiter, and flush
    async fn send_line(&mut self, line: &str) -> Result<()>;

    /// Read one line, stripped of its delimiter; `None` signals end-of-stream
    async fn recv_line(&mut self) -> Result<Option<String>>;

    /// Release the underlying stream; further sends and receives fail
    async fn close(&mut self) -> Result<()>;
}

/// `LineTransport` over any split-table async stream
pub struct StreamLineTransport<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
}

impl<S> StreamLineTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        }
    }
}

#[async_trait]
impl<S> LineTransport for StreamLineTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    async fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn recv_line(&mut self) -> Result<Option<String>> {
        let mut buffer = String::new();
        let bytes_read = self.reader.read_line(&mut buffer).await?;
        if bytes_read == 0 {
            return Ok(None);
        }
        // Strip the delimiter and any CR from clients using CRLF line endings
        while buffer.ends_with('\n') || buffer.ends_with('\r') {
            buffer.pop();
        }
        Ok(Some(buffer))
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
