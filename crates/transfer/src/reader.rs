//! Scoped byte-window access to a local media file.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::{TransferError, window::ChunkWindow};

/// A file handle exposing requested byte windows.
///
/// Opened once per transfer call and reused across retry attempts
/// (seek per attempt instead of reopen); dropped on every exit path,
/// which releases the handle.
pub struct ChunkSource {
    file: std::fs::File,
    size: u64,
}

impl ChunkSource {
    /// Opens `path` for windowed reading.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }

    /// Total file size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads exactly the given window.
    pub fn read_window(&mut self, window: ChunkWindow) -> Result<Vec<u8>, TransferError> {
        if window.end >= self.size {
            return Err(TransferError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("window {}-{} beyond file size {}", window.start, window.end, self.size),
            )));
        }
        self.file.seek(SeekFrom::Start(window.start))?;
        let mut buf = vec![0u8; window.len() as usize];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads from `offset` to end of file. An offset at EOF yields an
    /// empty buffer (nothing left to send).
    pub fn read_from(&mut self, offset: u64) -> Result<Vec<u8>, TransferError> {
        if offset >= self.size {
            return Ok(Vec::new());
        }
        self.read_window(ChunkWindow::new(offset, self.size - 1))
    }
}
