//! Pull-based read/seek access to a compressed buffer held in memory

use std::io::{self, Read, Seek, SeekFrom};
use symphonia::core::io::MediaSource;

/// Result of a single read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were copied and the offset advanced by the same amount
    Read(usize),
    /// The offset is at or past the end of the buffer
    EndOfData,
}

/// Seek request understood by [`MemorySource::seek_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Start(u64),
    Current(i64),
    End(i64),
    /// Report the total buffer length without moving the offset
    Size,
}

impl From<SeekFrom> for SeekMode {
    fn from(pos: SeekFrom) -> Self {
        match pos {
            SeekFrom::Start(offset) => SeekMode::Start(offset),
            SeekFrom::Current(delta) => SeekMode::Current(delta),
            SeekFrom::End(delta) => SeekMode::End(delta),
        }
    }
}

/// A compressed file's bytes plus its own read offset.
///
/// Seeking past the end is allowed; subsequent reads report
/// [`ReadOutcome::EndOfData`].
pub struct MemorySource {
    data: Vec<u8>,
    offset: u64,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            offset: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Copy up to `buf.len()` bytes from the current offset
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> ReadOutcome {
        let offset = self.offset;
        if offset >= self.len() {
            return ReadOutcome::EndOfData;
        }

        let start = offset as usize;
        let count = buf.len().min(self.data.len() - start);
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        self.offset = offset + count as u64;

        ReadOutcome::Read(count)
    }

    /// Move the offset, or report the buffer size for [`SeekMode::Size`]
    pub fn seek_to(&mut self, mode: SeekMode) -> io::Result<u64> {
        let current = i128::from(self.offset);
        let len = i128::from(self.len());

        let target = match mode {
            SeekMode::Size => return Ok(self.len()),
            SeekMode::Start(offset) => i128::from(offset),
            SeekMode::Current(delta) => current + i128::from(delta),
            SeekMode::End(delta) => len + i128::from(delta),
        };

        let target = u64::try_from(target).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to offset {} is outside the buffer", target),
            )
        })?;

        self.offset = target;
        Ok(target)
    }
}

impl Read for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_chunk(buf) {
            ReadOutcome::Read(count) => Ok(count),
            ReadOutcome::EndOfData => Ok(0),
        }
    }
}

impl Seek for MemorySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.seek_to(pos.into())
    }
}

impl MediaSource for MemorySource {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Some(self.len())
    }
}
