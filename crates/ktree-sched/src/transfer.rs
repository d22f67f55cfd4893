//! Line transfer engine and the MMIO line window.
//!
//! The window stands in for the accelerator's receive registers: exactly
//! [`LINE_SIZE`] bytes, fully overwritten by every line, never appended.
//! A multi-line task therefore leaves only its last line visible — the
//! device is assumed to consume each line between writes, which is the
//! full system's concern, not this engine's.

use crate::error::{Result, SchedulerError};
use bytes::Bytes;
use ktree_chip::layout::LINE_SIZE;
use tracing::{debug, trace};

/// Fixed-size MMIO receive window.
#[derive(Debug)]
pub struct MmioWindow {
    bytes: Vec<u8>,
}

impl MmioWindow {
    /// Create a zeroed window.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: vec![0; LINE_SIZE] }
    }

    /// Read-only view of the window contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Zero-copy-shareable snapshot of the current window contents.
    #[must_use]
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.bytes)
    }
}

impl Default for MmioWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies lines from a source buffer into the MMIO window.
#[derive(Debug, Default)]
pub struct LineEngine;

impl LineEngine {
    /// Copy exactly one line from `source` at `offset` into the window.
    ///
    /// The bounds check precedes the copy, so the window is never
    /// partially updated.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::BufferOverrun`] if the line extends past
    /// the end of `source`.
    pub fn transfer_line(&self, source: &[u8], offset: usize, window: &mut MmioWindow) -> Result<()> {
        let end = offset.checked_add(LINE_SIZE).filter(|&e| e <= source.len());
        let Some(end) = end else {
            return Err(SchedulerError::buffer_overrun(offset, LINE_SIZE, source.len()));
        };

        window.bytes.copy_from_slice(&source[offset..end]);
        trace!(offset, "line written to MMIO window");
        Ok(())
    }

    /// Copy `line_count` consecutive lines starting at line `base_line`.
    ///
    /// The whole source range is validated up front; lines are then
    /// written in strictly ascending offset order. Returns the number of
    /// lines copied. Afterwards the window holds exactly the last line.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::BufferOverrun`] if `line_count` is zero
    /// or the range exceeds `source`; nothing is copied in that case.
    pub fn transfer_task(
        &self,
        source: &[u8],
        base_line: usize,
        line_count: usize,
        window: &mut MmioWindow,
    ) -> Result<usize> {
        let offset = base_line * LINE_SIZE;
        let len = line_count * LINE_SIZE;
        if line_count == 0 || offset + len > source.len() {
            return Err(SchedulerError::buffer_overrun(offset, len, source.len()));
        }

        for line in 0..line_count {
            self.transfer_line(source, offset + line * LINE_SIZE, window)?;
        }
        debug!(base_line, line_count, "task lines transferred");
        Ok(line_count)
    }
}
