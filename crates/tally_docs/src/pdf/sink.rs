//! Destinations for PDF bytes.
//!
//! A [`PdfDocument`](crate::pdf::PdfDocument) writes each finished page as
//! one chunk. Sinks that can apply backpressure do so by not returning from
//! [`PdfSink::write_chunk`] until the consumer has room.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::error::DocsError;

#[async_trait]
pub trait PdfSink: Send {
    /// Hand one chunk of the file to the consumer.
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DocsError>;

    /// Called once after the trailer has been written.
    async fn close(&mut self) -> Result<(), DocsError> {
        Ok(())
    }
}

/// Collects the whole document in memory.
#[async_trait]
impl PdfSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DocsError> {
        self.extend_from_slice(&chunk);
        Ok(())
    }
}

/// Forwards chunks into a bounded channel.
///
/// The channel capacity is the backpressure window: once it is full, the
/// producer waits. If the receiver is dropped (client gone) the next write
/// fails with [`DocsError::Stream`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<io::Result<Bytes>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl PdfSink for ChannelSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DocsError> {
        self.tx
            .send(Ok(chunk))
            .await
            .map_err(|_| DocsError::Stream("consumer disconnected".into()))
    }
}

/// Writes chunks to any async writer, e.g. a `tokio::fs::File`.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> PdfSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), DocsError> {
        self.writer.write_all(&chunk).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DocsError> {
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}
