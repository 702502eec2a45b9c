//! Last-N-lines retrieval by reading backward from end of file.
//!
//! Only as many chunks as needed are read, so tailing a multi-gigabyte log
//! costs about as much as tailing a small one.

use crate::error::{MedicError, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Default backward read size.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Reads the tail of a file in fixed-size chunks from the end.
#[derive(Debug, Clone, Copy)]
pub struct LogTailer {
    chunk_size: usize,
}

impl Default for LogTailer {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl LogTailer {
    /// Create a tailer with the given chunk size (at least one byte).
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Return the last `n` lines of the file at `path`, oldest first.
    pub fn tail(&self, path: &Path, n: usize) -> Result<Vec<String>> {
        let mut file = File::open(path).map_err(|e| MedicError::from_io(e, path))?;
        self.tail_reader(&mut file, n)
            .map_err(|e| MedicError::from_io(e, path))
    }

    /// Return the last `n` lines of any seekable reader, oldest first.
    ///
    /// Lines end at `\n`; a trailing `\r` is dropped. Invalid UTF-8 is
    /// replaced per line, so a multi-byte character split across chunks is
    /// still decoded intact.
    pub fn tail_reader<R: Read + Seek>(&self, reader: &mut R, n: usize) -> io::Result<Vec<String>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let end = reader.seek(SeekFrom::End(0))?;
        if end == 0 {
            return Ok(Vec::new());
        }

        let mut lines: VecDeque<String> = VecDeque::new();
        // Bytes of the earliest, possibly incomplete, line seen so far.
        let mut carry: Vec<u8> = Vec::new();
        let mut pos = end;
        let mut first = true;

        while pos > 0 && lines.len() <= n {
            let size = (self.chunk_size as u64).min(pos);
            pos -= size;
            reader.seek(SeekFrom::Start(pos))?;

            let mut combined = vec![0u8; size as usize];
            reader.read_exact(&mut combined)?;
            combined.extend_from_slice(&carry);

            if first {
                if combined.last() == Some(&b'\n') {
                    combined.pop();
                }
                first = false;
            }

            let mut pieces = combined.split(|b| *b == b'\n');
            let head = pieces.next().unwrap_or_default().to_vec();
            let complete: Vec<String> = pieces.map(decode_line).collect();
            for line in complete.into_iter().rev() {
                lines.push_front(line);
            }
            carry = head;
        }

        if pos == 0 {
            lines.push_front(decode_line(&carry));
        }

        let skip = lines.len().saturating_sub(n);
        Ok(lines.into_iter().skip(skip).collect())
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Tail `path` with the default chunk size.
pub fn tail_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    LogTailer::default().tail(path, n)
}
