//! Encodes a byte stream using OpenPGP's partial body encoding.

use std::fmt;
use std::io;

use crate::packet::{BodyLength, Tag};
use crate::packet::ctb::CTB;
use crate::{Error, Result};
use super::{write_byte, Serialize};

// Whether to trace the modules execution (on stderr).
const TRACE: bool = false;

/// The default chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 13;

// The first chunk must be at least 512 octets, and no chunk may
// exceed 1 GiB.
const MIN_CHUNK_SIZE: usize = 1 << 9;
const MAX_CHUNK_SIZE: usize = 1 << 30;

/// Writes a new format packet whose length is not known upfront.
///
/// The body is emitted in chunks of a fixed power-of-two size, each
/// preceded by a partial body length octet.  The last chunk carries a
/// definite length, possibly zero.  Call [`finalize`] to write it and
/// to get the sink back; dropping the writer finalizes it too, but
/// errors are lost.
///
/// [`finalize`]: #method.finalize
pub struct PartialBodyWriter<W: io::Write> {
    // Because this writer implements `Drop`, we cannot move the inner
    // writer out of this writer.  We therefore wrap it with `Option`
    // so that we can `take()` it.
    inner: Option<W>,
    buffer: Vec<u8>,
    chunk_size: usize,
    chunk_size_log2: u8,
}

impl<W: io::Write> fmt::Debug for PartialBodyWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PartialBodyWriter")
            .field("buffered", &self.buffer.len())
            .field("chunk_size", &self.chunk_size)
            .field("finalized", &self.inner.is_none())
            .finish()
    }
}

impl<W: io::Write> PartialBodyWriter<W> {
    /// Writes a new format CTB for `tag` and returns a writer for the
    /// packet's body.
    pub fn new(sink: W, tag: Tag) -> Result<Self> {
        Self::with_chunk_size(sink, tag, DEFAULT_CHUNK_SIZE)
    }

    /// Like [`new`], but with a custom chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `chunk_size` is not a
    /// power of two between 512 octets and 1 GiB.
    ///
    /// [`new`]: #method.new
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn with_chunk_size(mut sink: W, tag: Tag, chunk_size: usize)
                           -> Result<Self> {
        tracer!(TRACE, "PartialBodyWriter::with_chunk_size");
        if ! chunk_size.is_power_of_two()
            || chunk_size < MIN_CHUNK_SIZE
            || chunk_size > MAX_CHUNK_SIZE
        {
            return Err(Error::InvalidArgument(
                format!("Invalid partial body chunk size: {}", chunk_size))
                       .into());
        }

        t!("{}, chunks of {} octets", tag, chunk_size);
        CTB::new(tag).serialize(&mut sink)?;

        Ok(PartialBodyWriter {
            inner: Some(sink),
            buffer: Vec::with_capacity(2 * chunk_size),
            chunk_size,
            chunk_size_log2: chunk_size.trailing_zeros() as u8,
        })
    }

    // Writes out all full chunks but the last.  If `done` is set, the
    // rest is written with a definite length.
    fn write_out(&mut self, done: bool) -> Result<()> {
        let inner = match self.inner.as_mut() {
            Some(inner) => inner,
            None => return Ok(()),
        };

        while self.buffer.len() > self.chunk_size {
            write_byte(inner, 0xE0 | self.chunk_size_log2)?;
            inner.write_all(&self.buffer[..self.chunk_size])?;
            self.buffer.drain(..self.chunk_size);
        }

        if done {
            // The last chunk must have a definite length, even if it
            // is empty.
            BodyLength::Full(self.buffer.len() as u32).serialize(inner)?;
            inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Writes the last chunk and returns the sink.
    pub fn finalize(mut self) -> Result<W> {
        self.write_out(true)?;
        self.inner.take().ok_or_else(|| Error::InvalidOperation(
            "PartialBodyWriter already finalized".into()).into())
    }
}

impl<W: io::Write> io::Write for PartialBodyWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.is_none() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe,
                                      "PartialBodyWriter is finalized"));
        }
        self.buffer.extend_from_slice(buf);
        self.write_out(false)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(buf.len())
    }

    // Only full chunks can be written without ending the body.
    fn flush(&mut self) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Ok(()),
        }
    }
}

impl<W: io::Write> Drop for PartialBodyWriter<W> {
    // Make sure the internal buffer is flushed.
    fn drop(&mut self) {
        let _ = self.write_out(true);
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn chunking() {
        let data: Vec<u8> = (0..2000u32).map(|i| i as u8).collect();

        let mut w = PartialBodyWriter::with_chunk_size(
            Vec::new(), Tag::Literal, 512).unwrap();
        w.write_all(&data[..100]).unwrap();
        w.write_all(&data[100..]).unwrap();
        let out = w.finalize().unwrap();

        // CTB, three full chunks and a 464 octet definite chunk.
        assert_eq!(out[0], 0xC0 | 11);
        let mut expected = vec![0xC0 | 11];
        for chunk in data[..1536].chunks(512) {
            expected.push(0xE0 | 9);
            expected.extend_from_slice(chunk);
        }
        // 464 = ((193 - 192) << 8) + 16 + 192.
        expected.extend_from_slice(&[193, 16]);
        expected.extend_from_slice(&data[1536..]);
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_body() {
        let w = PartialBodyWriter::new(Vec::new(), Tag::SEIP).unwrap();
        assert_eq!(w.finalize().unwrap(), vec![0xC0 | 18, 0]);
    }

    #[test]
    fn chunk_size() {
        assert!(PartialBodyWriter::with_chunk_size(
            Vec::new(), Tag::Literal, 1000).is_err());
        assert!(PartialBodyWriter::with_chunk_size(
            Vec::new(), Tag::Literal, 256).is_err());
        assert!(PartialBodyWriter::with_chunk_size(
            Vec::new(), Tag::Literal, 1 << 31).is_err());
    }

    #[test]
    fn drop_finalizes() {
        let mut out = Vec::new();
        {
            let mut w = PartialBodyWriter::new(&mut out, Tag::Literal)
                .unwrap();
            w.write_all(b"abc").unwrap();
        }
        assert_eq!(out, vec![0xC0 | 11, 3, b'a', b'b', b'c']);
    }
}
