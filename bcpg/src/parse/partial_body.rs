//! Bodies with partial body lengths.
//!
//! A body announced with a partial length is split into chunks.  Each
//! chunk but the last is followed by the length of the next one.  See
//! [Section 4.2.2.4 of RFC 4880] for details.
//!
//!   [Section 4.2.2.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2.4

use std::cmp;
use std::fmt;
use std::io;

use buffered_reader::{BufferedReader, Generic};

use crate::Error;
use crate::packet::BodyLength;
use crate::parse::into_io_error;

const TRACE: bool = false;

// Yields the contents of the chunks, reading the chunk lengths as it
// goes.
struct Chunks<'a> {
    source: Box<dyn BufferedReader<()> + 'a>,
    // Octets left in the current chunk.
    remaining: u32,
    // Whether the current chunk is the last one.
    last: bool,
}

impl<'a> Chunks<'a> {
    // Reads the next chunk's length.  Returns false if the body ended.
    fn next_chunk(&mut self) -> io::Result<bool> {
        tracer!(TRACE, "PartialBodyFilter::next_chunk", 3);

        let octet1 = match self.source.data(1)?.first() {
            Some(&b) => b,
            None => {
                t!("EOF instead of a chunk length, body ends");
                self.last = true;
                return Ok(false);
            }
        };
        self.source.consume(1);

        let length = BodyLength::decode_new_format(octet1, &mut self.source)
            .map_err(into_io_error)?;
        t!("next chunk: {:?}", length);
        match length {
            BodyLength::Partial(l) => self.remaining = l,
            BodyLength::Full(l) => {
                self.remaining = l;
                self.last = true;
            }
            BodyLength::Indeterminate =>
                return Err(into_io_error(Error::MalformedHeader(
                    "indeterminate chunk length".into()).into())),
        }
        Ok(true)
    }
}

impl<'a> io::Read for Chunks<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.remaining == 0 {
            if self.last || ! self.next_chunk()? {
                return Ok(0);
            }
        }

        let want = cmp::min(buf.len(), self.remaining as usize);
        let data = self.source.data(want)?;
        if data.is_empty() {
            return Err(into_io_error(Error::PrematureEof(
                format!("{} octets missing from packet body",
                        self.remaining)).into()));
        }
        let n = cmp::min(data.len(), want);
        buf[..n].copy_from_slice(&data[..n]);
        self.source.consume(n);
        self.remaining -= n as u32;
        Ok(n)
    }
}

/// A `BufferedReader` that joins the chunks of a body with partial
/// body lengths.
///
/// Reading stops at the end of the last chunk; the rest of the
/// stream is left untouched.  If the stream ends where a chunk length
/// is expected, the body ends there.  If it ends inside a chunk,
/// reading fails with [`Error::PrematureEof`].
///
/// [`Error::PrematureEof`]: ../enum.Error.html#variant.PrematureEof
pub(crate) struct PartialBodyFilter<'a> {
    reader: Generic<Chunks<'a>, ()>,
}

impl<'a> PartialBodyFilter<'a> {
    /// Returns a filter for a body whose first chunk, announced by
    /// the packet's header, is `first` octets long.
    pub(crate) fn new<R>(source: R, first: u32) -> Self
        where R: BufferedReader<()> + 'a
    {
        PartialBodyFilter {
            reader: Generic::new(Chunks {
                source: source.into_boxed(),
                remaining: first,
                last: false,
            }, None),
        }
    }
}

impl<'a> io::Read for PartialBodyFilter<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<'a> fmt::Display for PartialBodyFilter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PartialBodyFilter")
    }
}

impl<'a> fmt::Debug for PartialBodyFilter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let chunks = self.reader.reader_ref();
        f.debug_struct("PartialBodyFilter")
            .field("remaining", &chunks.remaining)
            .field("last", &chunks.last)
            .field("source", &chunks.source)
            .finish()
    }
}

impl<'a> BufferedReader<()> for PartialBodyFilter<'a> {
    fn buffer(&self) -> &[u8] {
        self.reader.buffer()
    }

    fn data(&mut self, amount: usize) -> io::Result<&[u8]> {
        self.reader.data(amount)
    }

    fn data_hard(&mut self, amount: usize) -> io::Result<&[u8]> {
        self.reader.data_hard(amount)
    }

    fn data_eof(&mut self) -> io::Result<&[u8]> {
        self.reader.data_eof()
    }

    fn consume(&mut self, amount: usize) -> &[u8] {
        self.reader.consume(amount)
    }

    fn data_consume(&mut self, amount: usize) -> io::Result<&[u8]> {
        self.reader.data_consume(amount)
    }

    fn data_consume_hard(&mut self, amount: usize) -> io::Result<&[u8]> {
        self.reader.data_consume_hard(amount)
    }

    fn steal(&mut self, amount: usize) -> io::Result<Vec<u8>> {
        self.reader.steal(amount)
    }

    fn steal_eof(&mut self) -> io::Result<Vec<u8>> {
        self.reader.steal_eof()
    }

    fn get_mut(&mut self) -> Option<&mut dyn BufferedReader<()>> {
        Some(&mut self.reader.reader_mut().source)
    }

    fn get_ref(&self) -> Option<&dyn BufferedReader<()>> {
        Some(&self.reader.reader_ref().source)
    }

    fn into_inner<'b>(self: Box<Self>)
            -> Option<Box<dyn BufferedReader<()> + 'b>> where Self: 'b {
        Some(self.reader.into_reader().source.into_boxed())
    }

    fn cookie_set(&mut self, cookie: ()) {
        self.reader.cookie_set(cookie)
    }

    fn cookie_ref(&self) -> &() {
        self.reader.cookie_ref()
    }

    fn cookie_mut(&mut self) -> &mut () {
        self.reader.cookie_mut()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Read;

    use buffered_reader::Memory;

    fn join(input: &[u8], first: u32) -> (io::Result<Vec<u8>>, Vec<u8>) {
        let mut filter: Box<dyn BufferedReader<()> + '_> =
            Box::new(PartialBodyFilter::new(Memory::new(input), first));
        let mut body = Vec::new();
        let r = filter.read_to_end(&mut body).map(|_| body);
        let mut source = filter.into_inner().unwrap();
        let rest = source.steal_eof().unwrap();
        (r, rest)
    }

    #[test]
    fn chunks() {
        // 2 + 4 + 1 octets, then the next packet.
        let input = b"ab\xe2cdef\x01gNEXT";
        let (body, rest) = join(input, 2);
        assert_eq!(body.unwrap(), b"abcdefg");
        assert_eq!(rest, b"NEXT");
    }

    #[test]
    fn empty_last_chunk() {
        let (body, rest) = join(b"ab\x00NEXT", 2);
        assert_eq!(body.unwrap(), b"ab");
        assert_eq!(rest, b"NEXT");
    }

    #[test]
    fn eof_at_chunk_length() {
        let (body, rest) = join(b"ab", 2);
        assert_eq!(body.unwrap(), b"ab");
        assert!(rest.is_empty());
    }

    #[test]
    fn eof_inside_chunk() {
        let (body, _) = join(b"ab\xe2cd", 2);
        let e = body.unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
        let e = crate::parse::io_error(e);
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::PrematureEof(_))));
    }

    #[test]
    fn buffered_access() {
        let input = b"ab\xe2cdef\x01g";
        let mut filter = PartialBodyFilter::new(Memory::new(input), 2);
        assert_eq!(filter.data_hard(5).unwrap()[..5], b"abcde"[..]);
        assert_eq!(filter.data_consume_hard(3).unwrap()[..3], b"abc"[..]);
        assert_eq!(filter.steal_eof().unwrap(), b"defg");
        assert!(filter.data(1).unwrap().is_empty());
    }
}
