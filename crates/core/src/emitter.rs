//! Protocol emitter: writes snapshots as an open-ended JSON array stream
//!
//! The stream starts with the header object and an opening bracket plus an
//! empty array element. Each snapshot is then appended as `,[...]` and
//! flushed. The outer array is never closed while the process runs.

use crate::constants::PROTOCOL_HEADER;
use crate::error::EmitError;
use log::trace;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Encode one snapshot as the next stream element (leading comma included)
pub fn encode_snapshot<S: Serialize + ?Sized>(snapshot: &S) -> Result<Vec<u8>, EmitError> {
    let mut buf = Vec::with_capacity(256);
    buf.push(b',');
    serde_json::to_writer(&mut buf, snapshot)?;
    Ok(buf)
}

/// Writes the status stream to an async writer (normally stdout)
pub struct ProtocolEmitter<W> {
    writer: W,
    started: bool,
    emitted: u64,
}

impl<W: AsyncWrite + Unpin> ProtocolEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            started: false,
            emitted: 0,
        }
    }

    /// Write the preamble. Called implicitly by the first [`emit`](Self::emit).
    pub async fn begin(&mut self) -> Result<(), EmitError> {
        if self.started {
            return Ok(());
        }
        let preamble = format!("{}[[]", PROTOCOL_HEADER);
        self.writer.write_all(preamble.as_bytes()).await?;
        self.writer.flush().await?;
        self.started = true;
        Ok(())
    }

    /// Append one snapshot to the stream and flush it
    pub async fn emit<S: Serialize + ?Sized>(&mut self, snapshot: &S) -> Result<(), EmitError> {
        self.begin().await?;
        let element = encode_snapshot(snapshot)?;
        self.writer.write_all(&element).await?;
        self.writer.flush().await?;
        self.emitted += 1;
        trace!("Emitted snapshot #{} ({} bytes)", self.emitted, element.len());
        Ok(())
    }

    /// Number of snapshots written so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
