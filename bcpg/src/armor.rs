//! ASCII Armor.
//!
//! This module deals with ASCII Armored data (see [RFC 4880, section 6]).
//!
//! [RFC 4880, section 6]: https://tools.ietf.org/html/rfc4880#section-6
//!
//! # Scope
//!
//! [`Writer`] armors binary data and can emit the cleartext part of a
//! cleartext signed message (with dash escaping).  [`Reader`] strips
//! the armor from a single armored block.  Multipart messages are not
//! supported, and neither is reading cleartext signed messages.
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//! use bcpg::armor::{Kind, Reader, Writer};
//!
//! # fn main() -> std::io::Result<()> {
//! let mut armored = Vec::new();
//! {
//!     let mut writer = Writer::with_headers(&mut armored, Some(Kind::File),
//!                                           &[("Key", "Value")]);
//!     writer.write_all(b"Hello world!")?;
//!     // writer is drop()ed here.
//! }
//! assert_eq!(String::from_utf8_lossy(&armored),
//!            "-----BEGIN PGP ARMORED FILE-----
//! Key: Value
//!
//! SGVsbG8gd29ybGQh
//! =s4Gu
//! -----END PGP ARMORED FILE-----
//! ");
//!
//! let mut reader = Reader::new(&armored[..]);
//! let mut content = String::new();
//! reader.read_to_string(&mut content)?;
//! assert_eq!(content, "Hello world!");
//! assert_eq!(reader.kind(), Some(Kind::File));
//! # Ok(()) }
//! ```

use std::io::{self, BufRead, Write};
use std::mem;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::constants::HashAlgorithm;
use crate::packet::Tag;
use crate::parse::into_io_error;
use crate::Error;

mod crc;
pub use self::crc::Crc24;

// Whether to trace execution by default (on stderr).
const TRACE: bool = false;

/// Number of base64 groups (four characters each) per line.
///
/// Lines must not be longer than 76 characters (see [RFC 4880,
/// section 6.3]).  GnuPG uses 64 characters.
///
/// [RFC 4880, section 6.3]: https://tools.ietf.org/html/rfc4880#section-6.3
const GROUPS_PER_LINE: usize = 16;

const LINE_ENDING: &str = "\n";

const VERSION_HEADER: &str = "Version";

const BEGIN_PREFIX: &str = "-----BEGIN PGP ";
const END_PREFIX: &str = "-----END PGP ";
const DASHES: &str = "-----";
const SIGNED_MESSAGE: &str = "SIGNED MESSAGE";

/// Specifies the type of data (see [RFC 4880, section 6.2]).
///
/// [RFC 4880, section 6.2]: https://tools.ietf.org/html/rfc4880#section-6.2
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A generic OpenPGP message.
    Message,
    /// A transferable public key.
    PublicKey,
    /// A transferable secret key.
    SecretKey,
    /// A detached signature.
    Signature,
    /// A generic file.  This is a GnuPG extension.
    File,
}

#[cfg(test)]
impl Arbitrary for Kind {
    fn arbitrary(g: &mut Gen) -> Self {
        use self::Kind::*;
        *g.choose(&[Message, PublicKey, SecretKey, Signature, File])
            .unwrap_or(&Message)
    }
}

impl Kind {
    /// Chooses the kind from the first octet of a packet stream.
    ///
    /// Public and secret keys and signatures get their own label;
    /// everything else is a message.
    pub fn detect(ctb: u8) -> Self {
        let tag = if ctb & 0x40 != 0 {
            ctb & 0x3f
        } else {
            (ctb & 0x3f) >> 2
        };
        match Tag::from(tag) {
            Tag::PublicKey => Kind::PublicKey,
            Tag::SecretKey => Kind::SecretKey,
            Tag::Signature => Kind::Signature,
            _ => Kind::Message,
        }
    }

    /// Returns the label used in the armor header and tail lines.
    pub fn blurb(&self) -> &'static str {
        match self {
            Kind::Message => "MESSAGE",
            Kind::PublicKey => "PUBLIC KEY BLOCK",
            Kind::SecretKey => "PRIVATE KEY BLOCK",
            Kind::Signature => "SIGNATURE",
            Kind::File => "ARMORED FILE",
        }
    }

    fn from_blurb(blurb: &str) -> Option<Self> {
        use self::Kind::*;
        [Message, PublicKey, SecretKey, Signature, File].iter()
            .find(|k| k.blurb() == blurb)
            .cloned()
    }

    fn begin(&self) -> String {
        format!("{}{}{}", BEGIN_PREFIX, self.blurb(), DASHES)
    }

    fn end(&self) -> String {
        format!("{}{}{}", END_PREFIX, self.blurb(), DASHES)
    }
}

/// A filter that applies ASCII Armor to the data written to it.
///
/// The armor header line is written when the first octet arrives.
/// Unless a kind was given, the label is chosen by looking at that
/// octet (see [`Kind::detect`]).
///
/// Before that, [`begin_clear_text`] switches the writer into
/// cleartext mode: octets are passed through, and lines starting with
/// a dash are dash-escaped.  [`end_clear_text`] switches back.
///
/// [`Kind::detect`]: enum.Kind.html#method.detect
/// [`begin_clear_text`]: #method.begin_clear_text
/// [`end_clear_text`]: #method.end_clear_text
pub struct Writer<W: Write> {
    sink: W,
    kind: Option<Kind>,
    headers: Vec<(String, String)>,
    // Whether the armor header line was written.
    started: bool,
    clear_text: bool,
    // Whether the next cleartext octet starts a line.
    newline: bool,
    last: u8,
    stash: Vec<u8>,
    crc: Crc24,
    // Base64 groups written so far.
    groups: usize,
    finalized: bool,
}

impl<W: Write> Writer<W> {
    /// Constructs a new filter with the default `Version` header.
    ///
    /// The kind is detected from the first octet written.
    pub fn new(sink: W) -> Self {
        let version = format!("bcpg v{}", env!("CARGO_PKG_VERSION"));
        Self::with_headers(sink, None, &[(VERSION_HEADER, &version[..])])
    }

    /// Constructs a new filter for the given type of data and with
    /// the given headers.
    ///
    /// If `kind` is `None`, it is detected from the first octet
    /// written.
    pub fn with_headers(sink: W, kind: Option<Kind>,
                        headers: &[(&str, &str)]) -> Self {
        Writer {
            sink,
            kind,
            headers: headers.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            started: false,
            clear_text: false,
            newline: true,
            last: 0,
            stash: Vec::with_capacity(3),
            crc: Crc24::new(),
            groups: 0,
            finalized: false,
        }
    }

    /// Returns the kind of data, if it is known yet.
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Returns the headers in the order they will be written.
    pub fn headers(&self) -> Vec<(&str, &str)> {
        let version = self.headers.iter()
            .filter(|(k, _)| k == VERSION_HEADER);
        let others = self.headers.iter()
            .filter(|(k, _)| k != VERSION_HEADER);
        version.chain(others)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Replaces all values of the header `name`.
    ///
    /// If `value` is `None`, the header is removed.
    pub fn set_header(&mut self, name: &str, value: Option<&str>) {
        self.headers.retain(|(k, _)| k != name);
        if let Some(value) = value {
            self.add_header(name, value);
        }
    }

    /// Adds a value for the header `name`, keeping existing ones.
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.into(), value.into()));
    }

    /// Removes all headers except `Version`.
    pub fn reset_headers(&mut self) {
        self.headers.retain(|(k, _)| k == VERSION_HEADER);
    }

    /// Starts the cleartext part of a cleartext signed message.
    ///
    /// Writes the `-----BEGIN PGP SIGNED MESSAGE-----` line and the
    /// `Hash` header.  Subsequent writes are dash-escaped and passed
    /// through until [`end_clear_text`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedHashAlgorithm`] if `hash_algo`
    /// has no armor name.
    ///
    /// [`end_clear_text`]: #method.end_clear_text
    /// [`Error::UnsupportedHashAlgorithm`]: ../enum.Error.html#variant.UnsupportedHashAlgorithm
    pub fn begin_clear_text(&mut self, hash_algo: HashAlgorithm)
                            -> crate::Result<()> {
        let name = hash_algo.armor_name()
            .ok_or(Error::UnsupportedHashAlgorithm(hash_algo))?;
        write!(self.sink, "{}{}{}Hash: {}{}{}",
               BEGIN_PREFIX, SIGNED_MESSAGE, DASHES, LINE_ENDING,
               name, LINE_ENDING)?;
        write!(self.sink, "{}", LINE_ENDING)?;
        self.clear_text = true;
        self.newline = true;
        self.last = 0;
        Ok(())
    }

    /// Ends the cleartext part.
    ///
    /// Subsequent writes are armored.
    pub fn end_clear_text(&mut self) {
        self.clear_text = false;
    }

    fn write_clear_text(&mut self, buf: &[u8]) -> io::Result<()> {
        for &b in buf {
            if self.newline {
                if b == b'-' {
                    self.sink.write_all(b"- ")?;
                }
                // The LF of a CRLF doesn't start a new line.
                if ! (b == b'\n' && self.last == b'\r') {
                    self.newline = false;
                }
            }
            self.sink.write_all(&[b])?;
            if b == b'\r' || (b == b'\n' && self.last != b'\r') {
                self.newline = true;
            }
            self.last = b;
        }
        Ok(())
    }

    // Writes the armor header line, the headers, and the blank line.
    fn start(&mut self, first: u8) -> io::Result<()> {
        let kind = *self.kind.get_or_insert_with(|| Kind::detect(first));
        tracer!(TRACE, "armor::Writer::start");
        t!("{:?}", kind);

        let mut head = String::new();
        head.push_str(&kind.begin());
        head.push_str(LINE_ENDING);
        for (k, v) in self.headers() {
            head.push_str(k);
            head.push_str(": ");
            head.push_str(v);
            head.push_str(LINE_ENDING);
        }
        head.push_str(LINE_ENDING);
        self.sink.write_all(head.as_bytes())?;
        self.started = true;
        Ok(())
    }

    // Encodes one group of up to three octets.
    fn write_group(&mut self, group: &[u8]) -> io::Result<()> {
        self.sink.write_all(STANDARD.encode(group).as_bytes())?;
        self.groups += 1;
        if self.groups % GROUPS_PER_LINE == 0 {
            write!(self.sink, "{}", LINE_ENDING)?;
        }
        Ok(())
    }

    /// Writes the checksum and the armor tail line.
    ///
    /// No more data can be written after this call.  If this is not
    /// called explicitly, the tail is written once the writer is
    /// dropped.  Calling it again, or on a writer that was never
    /// written to, does nothing.
    pub fn finalize(&mut self) -> io::Result<()> {
        if self.finalized || ! self.started {
            self.finalized = true;
            return self.sink.flush();
        }
        self.finalized = true;

        // Any stashed octets are padded.
        if ! self.stash.is_empty() {
            let stash = mem::take(&mut self.stash);
            self.write_group(&stash)?;
        }
        // A full last line already ends in a line break.  The checksum
        // line follows it directly, without an empty line in between.
        if self.groups % GROUPS_PER_LINE != 0 {
            write!(self.sink, "{}", LINE_ENDING)?;
        }

        let kind = self.kind.unwrap_or(Kind::Message);
        write!(self.sink, "={}{}{}{}",
               STANDARD.encode(self.crc.to_bytes()),
               LINE_ENDING, kind.end(), LINE_ENDING)?;
        self.sink.flush()
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.finalized {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe,
                                      "Writer is finalized."));
        }
        if buf.is_empty() {
            return Ok(0);
        }
        if self.clear_text {
            self.write_clear_text(buf)?;
            return Ok(buf.len());
        }
        if ! self.started {
            self.start(buf[0])?;
        }

        // Update CRC on the unencoded data.
        self.crc.update(buf);

        for &b in buf {
            self.stash.push(b);
            if self.stash.len() == 3 {
                let group = [self.stash[0], self.stash[1], self.stash[2]];
                self.stash.clear();
                self.write_group(&group)?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        let _ = self.finalize();
    }
}

/// A filter that strips ASCII Armor from a stream of data.
///
/// Text in front of the armor header line is ignored.  Base64 lines
/// may be wrapped at any length and may contain whitespace.  If the
/// checksum line is present, the checksum is verified when the tail
/// line is reached.
///
/// Problems are reported as `io::Error`s of kind `InvalidData`
/// wrapping an [`Error`], or `UnexpectedEof` if the tail line is
/// missing.
///
/// [`Error`]: ../enum.Error.html
pub struct Reader<R: BufRead> {
    source: R,
    kind: Option<Kind>,
    headers: Vec<(String, String)>,
    initialized: bool,
    // Base64 characters not yet decoded.
    pending: Vec<u8>,
    // Decoded data not yet returned.
    buffer: Vec<u8>,
    cursor: usize,
    crc: Crc24,
    expect_crc: Option<u32>,
    finished: bool,
}

fn invalid_data(e: Error) -> io::Error {
    into_io_error(e.into())
}

// Whether `line` is the checksum line: `=` followed by the four
// base64 characters encoding the CRC-24.  A line of padding
// characters, e.g. `==` after re-wrapping, is body data.
fn is_checksum_line(line: &str) -> bool {
    line.len() == 5
        && line.starts_with('=')
        && line[1..].bytes().all(|b| b.is_ascii_alphanumeric()
                                 || b == b'+' || b == b'/')
}

impl<R: BufRead> Reader<R> {
    /// Constructs a new filter.
    pub fn new(source: R) -> Self {
        Reader {
            source,
            kind: None,
            headers: Vec::new(),
            initialized: false,
            pending: Vec::new(),
            buffer: Vec::new(),
            cursor: 0,
            crc: Crc24::new(),
            expect_crc: None,
            finished: false,
        }
    }

    /// Returns the kind of data this reader is for.
    ///
    /// If the header has not been encountered yet (try reading some
    /// data first!), this function returns None.
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Returns the armor headers.
    ///
    /// If a key occurs multiple times, there are multiple entries
    /// with the same key.
    pub fn headers(&mut self) -> io::Result<&[(String, String)]> {
        self.initialize()?;
        Ok(&self.headers[..])
    }

    // Reads a line, stripping trailing whitespace.  Returns `None` at
    // the end of the stream.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        if self.source.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&line);
        Ok(Some(line.trim_end().to_string()))
    }

    /// Consumes the armor header line and the headers.
    fn initialize(&mut self) -> io::Result<()> {
        if self.initialized {
            return Ok(());
        }
        tracer!(TRACE, "armor::Reader::initialize");

        // Look for the armor header line, skipping any garbage.
        let mut garbage = false;
        let kind = loop {
            let line = match self.read_line()? {
                Some(line) => line,
                None if ! garbage => {
                    // Nothing at all: an empty stream.
                    self.initialized = true;
                    self.finished = true;
                    return Ok(());
                }
                None => return Err(invalid_data(Error::MalformedHeader(
                    "No armor header line found".into()))),
            };
            let line = line.trim_start();
            let blurb = match line.strip_prefix(BEGIN_PREFIX)
                .and_then(|l| l.strip_suffix(DASHES))
            {
                Some(blurb) => blurb,
                None => {
                    garbage |= ! line.is_empty();
                    continue;
                }
            };
            if blurb == SIGNED_MESSAGE {
                return Err(invalid_data(Error::InvalidOperation(
                    "Cleartext signed messages are not supported".into())));
            }
            match Kind::from_blurb(blurb) {
                Some(kind) => break kind,
                None => return Err(invalid_data(Error::MalformedHeader(
                    format!("Unknown armor label: {:?}", blurb)))),
            }
        };
        t!("found {:?}", kind);
        self.kind = Some(kind);
        self.initialized = true;

        // Headers, up to the blank line.
        loop {
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Err(into_io_error(Error::PrematureEof(
                    "armor headers".into()).into())),
            };
            if line.trim().is_empty() {
                break;
            }
            match line.find(": ") {
                Some(i) => self.headers.push(
                    (line[..i].to_string(), line[i + 2..].to_string())),
                None => {
                    // Be tolerant of a missing blank line.
                    log::debug!("Armor header without \": \": {:?}, \
                                 assuming the body starts here", line);
                    self.process_line(&line)?;
                    break;
                }
            }
        }
        Ok(())
    }

    // Handles one line of the body.
    fn process_line(&mut self, line: &str) -> io::Result<()> {
        let line = line.trim();
        if let Some(blurb) = line.strip_prefix(END_PREFIX) {
            return self.finish(blurb);
        }
        if is_checksum_line(line) {
            let crc = &line[1..];
            if self.expect_crc.is_some() {
                return Err(invalid_data(Error::MalformedPacket(
                    "Duplicate armor checksum".into())));
            }
            let crc = STANDARD.decode(crc)
                .ok()
                .filter(|b| b.len() == 3)
                .ok_or_else(|| invalid_data(Error::MalformedPacket(
                    format!("Invalid armor checksum: {:?}", crc))))?;
            self.expect_crc = Some(
                (crc[0] as u32) << 16 | (crc[1] as u32) << 8 | crc[2] as u32);
            return Ok(());
        }
        if self.expect_crc.is_some() && ! line.is_empty() {
            return Err(invalid_data(Error::MalformedPacket(
                "Data after the armor checksum".into())));
        }

        self.pending.extend(line.bytes().filter(|b| ! b.is_ascii_whitespace()));
        let n = self.pending.len() / 4 * 4;
        if n > 0 {
            let decoded = STANDARD.decode(&self.pending[..n])
                .map_err(|e| invalid_data(Error::MalformedPacket(
                    format!("Invalid base64 data: {}", e))))?;
            self.pending.drain(..n);
            self.crc.update(&decoded);
            self.buffer.extend_from_slice(&decoded);
        }
        Ok(())
    }

    // Handles the armor tail line.
    fn finish(&mut self, blurb: &str) -> io::Result<()> {
        let kind = self.kind.unwrap_or(Kind::Message);
        if blurb.strip_suffix(DASHES) != Some(kind.blurb()) {
            return Err(invalid_data(Error::MalformedHeader(
                format!("Armor tail {:?} doesn't match {:?}",
                        blurb, kind.blurb()))));
        }
        if ! self.pending.is_empty() {
            return Err(invalid_data(Error::MalformedPacket(
                "Truncated base64 data".into())));
        }
        if let Some(expected) = self.expect_crc {
            if expected != self.crc.value() {
                return Err(invalid_data(Error::MalformedPacket(
                    format!("Armor checksum mismatch: expected {:06X}, \
                             got {:06X}", expected, self.crc.value()))));
            }
        }
        self.finished = true;
        Ok(())
    }
}

impl<R: BufRead> io::Read for Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.initialize()?;

        while self.cursor == self.buffer.len() && ! self.finished {
            self.buffer.clear();
            self.cursor = 0;
            match self.read_line()? {
                Some(line) => self.process_line(&line)?,
                None => return Err(into_io_error(Error::PrematureEof(
                    "armor tail line missing".into()).into())),
            }
        }

        let n = std::cmp::min(buf.len(), self.buffer.len() - self.cursor);
        buf[..n].copy_from_slice(&self.buffer[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }
}
