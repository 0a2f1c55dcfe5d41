//! TFRecord container reader and writer.
//!
//! # TFRecord Format Reference
//!
//! A TFRecord file is a plain concatenation of records:
//!
//! ```text
//! u64  length            (little-endian)
//! u32  masked_crc32c(length bytes)
//! [u8] payload           (length bytes)
//! u32  masked_crc32c(payload)
//! ```
//!
//! The CRC is Castagnoli (CRC-32C), rotated right by 15 bits and offset by
//! a constant so that CRCs of CRC-bearing data do not degenerate.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::SynthrecError;

const MASK_DELTA: u32 = 0xa282_ead8;
const HEADER_LEN: usize = 12;
const FOOTER_LEN: usize = 4;

/// Applies the TFRecord CRC mask.
#[inline]
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

// ============================================================================
// Writer
// ============================================================================

/// Appends framed records to an underlying writer.
pub struct TfRecordWriter<W: Write> {
    inner: W,
    records: usize,
}

impl TfRecordWriter<BufWriter<File>> {
    /// Creates (or truncates) `path` and wraps it in a buffered writer.
    pub fn create(path: &Path) -> Result<Self, SynthrecError> {
        let file = File::create(path).map_err(SynthrecError::io_at(path))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TfRecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, records: 0 }
    }

    /// Writes one record.
    pub fn write_record(&mut self, payload: &[u8]) -> io::Result<()> {
        let len = (payload.len() as u64).to_le_bytes();
        self.inner.write_all(&len)?;
        self.inner.write_all(&masked_crc32c(&len).to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.inner.write_all(&masked_crc32c(payload).to_le_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

// ============================================================================
// Reader
// ============================================================================

/// Iterates framed records, verifying both CRCs.
///
/// A clean end of input at a record boundary ends iteration. Any short read
/// inside a record, or a CRC mismatch, yields
/// [`SynthrecError::TfRecordCorrupt`] and the iterator stops.
pub struct TfRecordReader<R: Read> {
    inner: R,
    source: PathBuf,
    index: usize,
    done: bool,
}

impl TfRecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SynthrecError> {
        let file = File::open(path).map_err(SynthrecError::io_at(path))?;
        Ok(Self::with_source(BufReader::new(file), path))
    }
}

impl<R: Read> TfRecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_source(inner, Path::new("<bytes>"))
    }

    /// Like [`new`](Self::new), but errors name `source`.
    pub fn with_source(inner: R, source: &Path) -> Self {
        Self {
            inner,
            source: source.to_path_buf(),
            index: 0,
            done: false,
        }
    }

    fn corrupt(&self, message: impl Into<String>) -> SynthrecError {
        SynthrecError::TfRecordCorrupt {
            path: self.source.clone(),
            record: self.index,
            message: message.into(),
        }
    }

    fn read_record(&mut self) -> Result<Option<Vec<u8>>, SynthrecError> {
        let mut header = [0u8; HEADER_LEN];
        let filled =
            read_full(&mut self.inner, &mut header).map_err(SynthrecError::io_at(&self.source))?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < HEADER_LEN {
            return Err(self.corrupt(format!(
                "truncated header ({} of {} bytes)",
                filled, HEADER_LEN
            )));
        }

        let mut len_bytes = [0u8; 8];
        let mut crc_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&header[..8]);
        crc_bytes.copy_from_slice(&header[8..]);
        if masked_crc32c(&len_bytes) != u32::from_le_bytes(crc_bytes) {
            return Err(self.corrupt("length CRC mismatch"));
        }

        let len = usize::try_from(u64::from_le_bytes(len_bytes))
            .map_err(|_| self.corrupt("record length does not fit in memory"))?;

        let mut payload = Vec::new();
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut payload)
            .map_err(SynthrecError::io_at(&self.source))?;
        if read < len {
            return Err(self.corrupt(format!("truncated payload ({} of {} bytes)", read, len)));
        }

        let mut footer = [0u8; FOOTER_LEN];
        let filled =
            read_full(&mut self.inner, &mut footer).map_err(SynthrecError::io_at(&self.source))?;
        if filled < FOOTER_LEN {
            return Err(self.corrupt("truncated payload CRC"));
        }
        if masked_crc32c(&payload) != u32::from_le_bytes(footer) {
            return Err(self.corrupt("payload CRC mismatch"));
        }

        Ok(Some(payload))
    }
}

impl<R: Read> Iterator for TfRecordReader<R> {
    type Item = Result<Vec<u8>, SynthrecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(payload)) => {
                self.index += 1;
                Some(Ok(payload))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fills as much of `buf` as the reader allows; returns the count.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// ============================================================================
// Convenience API
// ============================================================================

/// Reads every record from a TFRecord file.
pub fn read_tfrecord(path: &Path) -> Result<Vec<Vec<u8>>, SynthrecError> {
    TfRecordReader::open(path)?.collect()
}

/// Writes `records` to a new TFRecord file.
pub fn write_tfrecord<I, B>(path: &Path, records: I) -> Result<(), SynthrecError>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut writer = TfRecordWriter::create(path)?;
    for record in records {
        writer
            .write_record(record.as_ref())
            .map_err(SynthrecError::io_at(path))?;
    }
    writer.into_inner().map_err(SynthrecError::io_at(path))?;
    Ok(())
}

/// Reads records from an in-memory buffer.
pub fn from_tfrecord_slice(bytes: &[u8]) -> Result<Vec<Vec<u8>>, SynthrecError> {
    TfRecordReader::new(bytes).collect()
}

/// Frames `records` into an in-memory buffer.
pub fn to_tfrecord_bytes<I, B>(records: I) -> Vec<u8>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut writer = TfRecordWriter::new(Vec::new());
    for record in records {
        // Writing into a Vec cannot fail.
        let _ = writer.write_record(record.as_ref());
    }
    writer.inner
}
