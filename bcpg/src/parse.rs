//! OpenPGP packet parser.
//!
//! [`PacketReader`] reads a sequence of packets from any
//! `std::io::Read`.  Each call to [`PacketReader::next_packet`]
//! decodes one header and returns a [`PacketParser`].  Contained
//! packets are parsed in full.  For literal data, compressed data and
//! the two encrypted data packets only the leading fields are decoded;
//! the payload is read through the `PacketParser`, which implements
//! `std::io::Read` and follows partial body chunks transparently.
//!
//! Building blocks (headers, MPIs, S2K specifiers, subpackets) and the
//! individual packet types can be parsed on their own using the
//! [`Parse`] trait.

use std::cmp;
use std::convert::TryFrom;
use std::fmt;
use std::io::{self, Read};
use std::mem;

use buffered_reader::{BufferedReader, EOF, Generic, Limitor, Memory};

use crate::constants::{
    HashAlgorithm,
    PublicKeyAlgorithm,
    SymmetricAlgorithm,
};
use crate::mpis::{self, MPI};
use crate::packet::ctb::{CTB, PacketLengthType};
use crate::packet::signature::subpacket::Subpacket;
use crate::packet::user_attribute::UserAttributeSubpacket;
use crate::packet::{
    BodyLength,
    CompressedData,
    Experimental,
    Header,
    Key,
    Literal,
    Marker,
    OnePassSig,
    PKESK,
    SKESK,
    SecretKey,
    SED,
    SEIP,
    Signature,
    Tag,
    Trust,
    UserAttribute,
    UserID,
    MDC,
};
use crate::{Error, KeyID, Packet, Result, S2K};

mod key_material;
mod partial_body;
use self::partial_body::PartialBodyFilter;
mod subpacket;
mod packet_reader_builder;
pub use self::packet_reader_builder::PacketReaderBuilder;

// Whether to trace execution by default (on stderr).
const TRACE: bool = false;

/// The default maximum size of contained packets.
///
/// Streamed payloads (literal data, compressed data, encrypted data)
/// are not subject to this limit.
///
/// The default is 32 MiB.
pub const MAX_PACKET_SIZE: u32 = 1 << 25;

/// Parsing of packets and related structures.
///
/// This is a uniform interface to parse packets and their building
/// blocks.
pub trait Parse<'a, T> {
    /// Reads from the given reader.
    fn from_reader<R: 'a + Read + Send + Sync>(reader: R) -> Result<T>;

    /// Reads from the given slice.
    ///
    /// The default implementation just uses [`from_reader(..)`].
    ///
    /// [`from_reader(..)`]: #tymethod.from_reader
    fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Result<T> {
        Self::from_reader(io::Cursor::new(data.as_ref()))
    }
}

/// Converts an `io::Error` into an `anyhow::Error`.
///
/// Our own readers smuggle `Error`s through `io::Error`s; unwrap them
/// so that callers can downcast to `Error`.
pub(crate) fn io_error(e: io::Error) -> anyhow::Error {
    let inner = e.get_ref()
        .and_then(|inner| inner.downcast_ref::<Error>())
        .cloned();
    match inner {
        Some(inner) => inner.into(),
        None => e.into(),
    }
}

/// Converts an `anyhow::Error` into an `io::Error`.
pub(crate) fn into_io_error(e: anyhow::Error) -> io::Error {
    match e.downcast::<io::Error>() {
        Ok(e) => e,
        Err(e) => match e.downcast::<Error>() {
            Ok(e @ Error::PrematureEof(_)) =>
                io::Error::new(io::ErrorKind::UnexpectedEof, e),
            Ok(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            Err(e) => io::Error::new(io::ErrorKind::Other, e.to_string()),
        },
    }
}

/// Fixed-size field readers.
///
/// A short read is reported as [`Error::PrematureEof`], naming the
/// field.
///
/// [`Error::PrematureEof`]: ../enum.Error.html#variant.PrematureEof
pub(crate) trait ReadFields: Read + Sized {
    fn parse_u8(&mut self, name: &'static str) -> Result<u8> {
        Ok(self.parse_bytes(name, 1)?[0])
    }

    fn parse_be_u16(&mut self, name: &'static str) -> Result<u16> {
        let b = self.parse_bytes(name, 2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn parse_be_u32(&mut self, name: &'static str) -> Result<u32> {
        let b = self.parse_bytes(name, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn parse_bytes(&mut self, name: &'static str, amount: usize)
                   -> Result<Vec<u8>> {
        // Don't trust `amount` for the allocation.
        let mut buf = Vec::with_capacity(cmp::min(amount, 8192));
        self.by_ref().take(amount as u64).read_to_end(&mut buf)
            .map_err(io_error)?;
        if buf.len() < amount {
            return Err(Error::PrematureEof(
                format!("reading {}: expected {} octets, got {}",
                        name, amount, buf.len())).into());
        }
        Ok(buf)
    }

    fn parse_array8(&mut self, name: &'static str) -> Result<[u8; 8]> {
        let mut a = [0u8; 8];
        a.copy_from_slice(&self.parse_bytes(name, 8)?);
        Ok(a)
    }

    fn parse_bytes_eof(&mut self, _name: &'static str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf).map_err(io_error)?;
        Ok(buf)
    }
}

impl<R: Read> ReadFields for R {}

impl BodyLength {
    /// Decodes a new format body length as described in [Section
    /// 4.2.2 of RFC 4880].
    ///
    ///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
    pub(crate) fn parse_new_format<R: Read>(r: &mut R) -> Result<BodyLength> {
        let octet1 = r.parse_u8("body_length")?;
        Self::decode_new_format(octet1, r)
    }

    /// Like `parse_new_format`, but the first octet has already been
    /// read.
    fn decode_new_format<R: Read>(octet1: u8, r: &mut R)
                                  -> Result<BodyLength> {
        match octet1 {
            0..=191 => // One octet.
                Ok(BodyLength::Full(octet1 as u32)),
            192..=223 => { // Two octets length.
                let octet2 = r.parse_u8("body_length")?;
                Ok(BodyLength::Full(((octet1 as u32 - 192) << 8)
                                    + octet2 as u32 + 192))
            },
            224..=254 => // Partial body length.
                Ok(BodyLength::Partial(1 << (octet1 & 0x1F))),
            255 => // Five octets.
                Ok(BodyLength::Full(r.parse_be_u32("body_length")?)),
        }
    }

    /// Decodes an old format body length as described in [Section
    /// 4.2.1 of RFC 4880].
    ///
    ///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
    pub(crate) fn parse_old_format<R: Read>(r: &mut R,
                                            length_type: PacketLengthType)
                                            -> Result<BodyLength> {
        match length_type {
            PacketLengthType::OneOctet =>
                Ok(BodyLength::Full(r.parse_u8("body_length")? as u32)),
            PacketLengthType::TwoOctets =>
                Ok(BodyLength::Full(r.parse_be_u16("body_length")? as u32)),
            PacketLengthType::FourOctets =>
                Ok(BodyLength::Full(r.parse_be_u32("body_length")?)),
            PacketLengthType::Indeterminate =>
                Ok(BodyLength::Indeterminate),
        }
    }
}

impl Header {
    pub(crate) fn parse<R: Read>(r: &mut R) -> Result<Header> {
        let ctb = CTB::try_from(r.parse_u8("ctb")?)?;
        Self::parse_length(ctb, r)
    }

    fn parse_length<R: Read>(ctb: CTB, r: &mut R) -> Result<Header> {
        let length = match ctb {
            CTB::New(_) => BodyLength::parse_new_format(r)?,
            CTB::Old(ref ctb) =>
                BodyLength::parse_old_format(r, ctb.length_type())?,
        };
        Ok(Header::new(ctb, length))
    }
}

impl<'a> Parse<'a, Header> for Header {
    /// Parses an OpenPGP packet's header as described in [Section 4.2
    /// of RFC 4880].
    ///
    ///   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2
    fn from_reader<R: 'a + Read + Send + Sync>(mut reader: R) -> Result<Self> {
        Header::parse(&mut reader)
    }
}

impl S2K {
    pub(crate) fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let tag = r.parse_u8("s2k_type")?;
        let hash = HashAlgorithm::from(r.parse_u8("s2k_hash_algo")?);

        let s2k = match tag {
            S2K::SIMPLE => S2K::Simple { hash },
            S2K::SALTED => S2K::Salted {
                hash,
                salt: r.parse_array8("s2k_salt")?,
            },
            S2K::ITERATED_SALTED => S2K::Iterated {
                hash,
                salt: r.parse_array8("s2k_salt")?,
                coded_count: r.parse_u8("s2k_count")?,
            },
            S2K::GNU_DUMMY => {
                let marker = r.parse_bytes("s2k_gnu_marker", 3)?;
                if &marker[..] != &S2K::GNU_MARKER[..] {
                    return Err(Error::MalformedPacket(
                        format!("Bad GnuPG S2K marker: {:?}", marker))
                               .into());
                }
                S2K::GnuDummy {
                    hash,
                    protection_mode: r.parse_u8("s2k_gnu_mode")?,
                }
            }
            tag => {
                log::debug!("Unknown S2K type {}, assuming no parameters",
                            tag);
                S2K::Unknown { tag, hash }
            }
        };

        Ok(s2k)
    }
}

impl<'a> Parse<'a, S2K> for S2K {
    /// Reads an S2K from `reader`.
    fn from_reader<R: 'a + Read + Send + Sync>(mut reader: R) -> Result<Self> {
        S2K::parse(&mut reader)
    }
}

impl MPI {
    /// Parses an OpenPGP MPI.
    ///
    /// See [Section 3.2 of RFC 4880] for details.
    ///
    ///   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2
    pub(crate) fn parse<R: Read>(name: &'static str, r: &mut R)
                                 -> Result<Self> {
        let bits = r.parse_be_u16(name)? as usize;
        let magnitude = r.parse_bytes(name, (bits + 7) / 8)?;
        let mpi = MPI::from_magnitude(&magnitude);

        // Leading zeros are tolerated, excess bits are not.
        if mpi.bits() > bits {
            return Err(Error::MalformedMPI(
                format!("{}: {} bits declared, but the value has {}",
                        name, bits, mpi.bits())).into());
        }
        Ok(mpi)
    }
}

impl<'a> Parse<'a, MPI> for MPI {
    /// Reads an MPI from `reader`.
    fn from_reader<R: 'a + Read + Send + Sync>(mut reader: R) -> Result<Self> {
        MPI::parse("mpi", &mut reader)
    }
}

impl Signature {
    /// Parses a signature packet's body.
    pub(crate) fn parse<R: Read>(r: &mut R) -> Result<Self> {
        tracer!(TRACE, "Signature::parse", 2);
        let version = r.parse_u8("version")?;
        t!("version {}", version);

        match version {
            2 | 3 => {
                let hashed_len = r.parse_u8("hashed_len")?;
                if hashed_len != 5 {
                    log::debug!("v{} signature with hashed length {}",
                                version, hashed_len);
                }
                let typ = r.parse_u8("type")?.into();
                let creation_time = r.parse_be_u32("creation_time")?;
                let issuer = KeyID::from(r.parse_array8("issuer")?);
                let pk_algo: PublicKeyAlgorithm =
                    r.parse_u8("pk_algo")?.into();
                let hash_algo: HashAlgorithm =
                    r.parse_u8("hash_algo")?.into();
                let digest_prefix = parse_digest_prefix(r)?;
                let mpis = mpis::Signature::parse(pk_algo, r)?;

                Ok(Signature::new_v3(version, typ,
                                     creation_time as u64 * 1000, issuer,
                                     pk_algo, hash_algo, digest_prefix,
                                     mpis))
            }
            4 => {
                let typ = r.parse_u8("type")?.into();
                let pk_algo: PublicKeyAlgorithm =
                    r.parse_u8("pk_algo")?.into();
                let hash_algo: HashAlgorithm =
                    r.parse_u8("hash_algo")?.into();

                let hashed_len = r.parse_be_u16("hashed_area_len")?;
                let hashed_area = Subpacket::parse_area(
                    &r.parse_bytes("hashed_area", hashed_len as usize)?)?;
                let unhashed_len = r.parse_be_u16("unhashed_area_len")?;
                let unhashed_area = Subpacket::parse_area(
                    &r.parse_bytes("unhashed_area", unhashed_len as usize)?)?;
                t!("{} hashed, {} unhashed subpackets",
                   hashed_area.len(), unhashed_area.len());

                let digest_prefix = parse_digest_prefix(r)?;
                let mpis = mpis::Signature::parse(pk_algo, r)?;

                Ok(Signature::new_v4(typ, pk_algo, hash_algo, hashed_area,
                                     unhashed_area, digest_prefix, mpis))
            }
            version => {
                r.parse_bytes_eof("body")?;
                Err(Error::UnsupportedPacketVersion {
                    tag: Tag::Signature,
                    version,
                }.into())
            }
        }
    }
}

fn parse_digest_prefix<R: Read>(r: &mut R) -> Result<[u8; 2]> {
    let b = r.parse_bytes("digest_prefix", 2)?;
    Ok([b[0], b[1]])
}

/// Parses a signature packet's body, e.g. from an embedded signature
/// subpacket.
pub(crate) fn parse_signature_body(body: &[u8]) -> Result<Signature> {
    Signature::parse(&mut io::Cursor::new(body))
}

/// Parses secret key material, returning any trailing octets.
pub(crate) fn parse_secret_key_material(algo: PublicKeyAlgorithm,
                                        data: &[u8])
    -> Result<(mpis::SecretKeyMaterial, &[u8])>
{
    let mut cur = io::Cursor::new(data);
    let material = mpis::SecretKeyMaterial::parse(algo, &mut cur)?;
    let consumed = cur.position() as usize;
    Ok((material, &data[consumed..]))
}

impl OnePassSig {
    fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let version = r.parse_u8("version")?;
        let typ = r.parse_u8("type")?.into();
        let hash_algo = r.parse_u8("hash_algo")?.into();
        let pk_algo = r.parse_u8("pk_algo")?.into();
        let issuer = KeyID::from(r.parse_array8("issuer")?);
        let last = r.parse_u8("last")?;
        Ok(OnePassSig::from_fields(version, typ, hash_algo, pk_algo, issuer,
                                   last))
    }
}

impl PKESK {
    fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let version = r.parse_u8("version")?;
        let recipient = KeyID::from(r.parse_array8("recipient")?);
        let pk_algo: PublicKeyAlgorithm = r.parse_u8("pk_algo")?.into();
        let esk = mpis::Ciphertext::parse(pk_algo, r)?;
        PKESK::from_fields(version, recipient, pk_algo, esk)
    }
}

impl SKESK {
    fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let version = r.parse_u8("version")?;
        let sym_algo: SymmetricAlgorithm = r.parse_u8("sym_algo")?.into();
        let s2k = S2K::parse(r)?;
        let esk = r.parse_bytes_eof("esk")?;
        Ok(SKESK::from_fields(version, sym_algo, s2k, esk))
    }
}

impl Key {
    /// Parses a public key or public subkey packet's body.
    fn parse<R: Read>(tag: Tag, r: &mut R) -> Result<Self> {
        let version = r.parse_u8("version")?;
        if ! (2..=4).contains(&version) {
            return Err(Error::UnsupportedPacketVersion { tag, version }
                       .into());
        }
        let creation_time = r.parse_be_u32("creation_time")?;
        let valid_days = if version <= 3 {
            Some(r.parse_be_u16("valid_days")?)
        } else {
            None
        };
        let pk_algo: PublicKeyAlgorithm = r.parse_u8("pk_algo")?.into();
        let mpis = mpis::PublicKey::parse(pk_algo, r)?;
        Key::from_fields(version, creation_time, valid_days, pk_algo, mpis)
    }
}

impl SecretKey {
    /// Parses a secret key or secret subkey packet's body.
    fn parse<R: Read>(tag: Tag, r: &mut R) -> Result<Self> {
        let public = Key::parse(tag, r)?;
        let s2k_usage = r.parse_u8("s2k_usage")?;
        let (sym_algo, s2k) = match s2k_usage {
            SecretKey::USAGE_CHECKSUM | SecretKey::USAGE_SHA1 => {
                let sym_algo: SymmetricAlgorithm =
                    r.parse_u8("sym_algo")?.into();
                (sym_algo, Some(S2K::parse(r)?))
            }
            // Legacy: the usage octet is the symmetric algorithm.
            algo => (SymmetricAlgorithm::from(algo), None),
        };
        let iv = if SecretKey::has_iv(s2k_usage, s2k.as_ref()) {
            Some(r.parse_bytes("iv", sym_algo.iv_size())?)
        } else {
            None
        };
        let secret = r.parse_bytes_eof("secret")?;
        Ok(SecretKey::from_fields(public, s2k_usage, sym_algo, s2k, iv,
                                  secret))
    }
}

impl UserAttribute {
    fn parse<R: BufferedReader<()>>(r: &mut R) -> Result<Self> {
        let mut subpackets = Vec::new();
        while let Some(sp) = UserAttributeSubpacket::parse(r)? {
            subpackets.push(sp);
        }
        Ok(subpackets.into())
    }
}

impl Literal {
    fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let format = r.parse_u8("format")?;
        let filename_len = r.parse_u8("filename_len")?;
        let filename = r.parse_bytes("filename", filename_len as usize)?;
        let date = r.parse_be_u32("date")?;

        let mut literal = Literal::new(format.into());
        literal.set_filename(filename)?;
        literal.set_date(date);
        Ok(literal)
    }
}

/// Decodes a contained packet's buffered body.
fn parse_contained(tag: Tag, body: Vec<u8>) -> Result<Packet> {
    tracer!(TRACE, "parse_contained", 1);
    t!("{}, {} octets", tag, body.len());

    let mut r = Memory::new(&body[..]);
    let packet: Packet = match tag {
        Tag::PKESK => PKESK::parse(&mut r)?.into(),
        Tag::Signature => Signature::parse(&mut r)?.into(),
        Tag::SKESK => SKESK::parse(&mut r)?.into(),
        Tag::OnePassSig => OnePassSig::parse(&mut r)?.into(),
        Tag::SecretKey =>
            Packet::SecretKey(SecretKey::parse(Tag::SecretKey, &mut r)?),
        Tag::SecretSubkey =>
            Packet::SecretSubkey(SecretKey::parse(Tag::SecretSubkey, &mut r)?),
        Tag::PublicKey =>
            Packet::PublicKey(Key::parse(Tag::PublicKey, &mut r)?),
        Tag::PublicSubkey =>
            Packet::PublicSubkey(Key::parse(Tag::PublicSubkey, &mut r)?),
        Tag::UserAttribute => UserAttribute::parse(&mut r)?.into(),
        Tag::Marker => {
            if &body[..] != Marker::BODY {
                return Err(Error::MalformedPacket(
                    format!("Unexpected marker packet body: {:?}", body))
                           .into());
            }
            return Ok(Marker::default().into());
        }
        Tag::MDC => {
            let digest = <[u8; 20]>::try_from(&body[..])
                .map_err(|_| Error::MalformedPacket(
                    format!("MDC must be 20 octets, got {}", body.len())))?;
            return Ok(MDC::from(digest).into());
        }
        Tag::Trust => return Ok(Trust::from(body).into()),
        Tag::UserID => return Ok(UserID::from(body).into()),
        Tag::Private(_) => return Ok(Experimental::new(tag, body)?.into()),
        Tag::Literal | Tag::CompressedData | Tag::SED | Tag::SEIP
            => return Err(Error::InvalidOperation(
                format!("{} is not a contained packet", tag)).into()),
        Tag::Reserved | Tag::Unknown(_) =>
            return Err(Error::UnknownPacketTag(tag).into()),
    };

    let rest = r.buffer().len();
    if rest > 0 {
        log::debug!("Ignoring {} trailing octets after {}", rest, tag);
    }
    Ok(packet)
}

/// Settings shared by a `PacketReader` and its builder.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PacketReaderSettings {
    pub(crate) max_packet_size: u32,
    pub(crate) buffer_unread_content: bool,
}

impl Default for PacketReaderSettings {
    fn default() -> Self {
        PacketReaderSettings {
            max_packet_size: MAX_PACKET_SIZE,
            buffer_unread_content: false,
        }
    }
}

// The current packet's body.
#[derive(Debug)]
struct Body {
    // The length announced by a full length header.
    expected: Option<u32>,
    // Octets read so far.
    read: u64,
    // Whether a filter was pushed onto the stream for this body.
    filtered: bool,
}

/// Reads a sequence of OpenPGP packets.
///
/// The reader keeps a stack of `BufferedReader`s.  At the bottom is
/// the stream.  While a packet's body is being read, a filter sits on
/// top that ends at the end of the body: a `Limitor` for bodies with a
/// full length, and a filter that joins the chunks for bodies with
/// partial lengths.  Bodies with an indeterminate length extend to the
/// end of the stream and need no filter.
///
/// # Examples
///
/// ```
/// use bcpg::{Packet, PacketReader};
/// use bcpg::packet::UserID;
/// use bcpg::serialize::Serialize;
///
/// # fn main() -> bcpg::Result<()> {
/// let bytes = Packet::from(UserID::from("Alice")).to_vec()?;
///
/// let mut reader = PacketReader::from_bytes(&bytes);
/// assert_eq!(reader.read_packet()?,
///            Some(Packet::from(UserID::from("Alice"))));
/// assert_eq!(reader.read_packet()?, None);
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct PacketReader<'a> {
    reader: Box<dyn BufferedReader<()> + 'a>,
    body: Option<Body>,
    settings: PacketReaderSettings,
}
assert_send_and_sync!(PacketReader<'_>);

impl<'a> PacketReader<'a> {
    /// Reads packets from `source` using the default settings.
    ///
    /// Use [`PacketReaderBuilder`] to change them.
    ///
    /// [`PacketReaderBuilder`]: struct.PacketReaderBuilder.html
    pub fn new<R: 'a + Read + Send + Sync>(source: R) -> Self {
        Self::with_settings(Generic::new(source, None),
                            PacketReaderSettings::default())
    }

    /// Reads packets from a buffer.
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Self {
        Self::with_settings(Memory::new(data.as_ref()),
                            PacketReaderSettings::default())
    }

    pub(crate) fn with_settings<R>(source: R, settings: PacketReaderSettings)
                                   -> Self
        where R: BufferedReader<()> + 'a
    {
        PacketReader {
            reader: source.into_boxed(),
            body: None,
            settings,
        }
    }

    /// Returns the underlying reader.
    ///
    /// Any unread part of the current packet's body is skipped first.
    pub fn into_inner(mut self) -> Result<Box<dyn BufferedReader<()> + 'a>> {
        self.skip_body()?;
        Ok(self.reader)
    }

    /// Reads from the current packet's body.
    ///
    /// Returns 0 at the end of the body.
    fn read_body(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let body = match self.body.as_mut() {
            Some(body) => body,
            None => return Ok(0),
        };

        let n = self.reader.read(buf)?;
        body.read += n as u64;
        if n == 0 && ! buf.is_empty() {
            if let Some(expected) = body.expected {
                if body.read < expected as u64 {
                    return Err(into_io_error(Error::PrematureEof(
                        format!("{} octets missing from packet body",
                                expected as u64 - body.read)).into()));
                }
            }
        }
        Ok(n)
    }

    // Pushes a filter for a body of the given length.
    fn push_body(&mut self, length: &BodyLength) {
        tracer!(TRACE, "PacketReader::push_body", 1);
        let (expected, filtered) = match *length {
            BodyLength::Full(l) => (Some(l), true),
            BodyLength::Partial(_) => (None, true),
            BodyLength::Indeterminate => (None, false),
        };

        let source = mem::replace(&mut self.reader, Box::new(EOF::new()));
        self.reader = match *length {
            BodyLength::Full(l) => Box::new(Limitor::new(source, l as u64)),
            BodyLength::Partial(l) =>
                Box::new(PartialBodyFilter::new(source, l)),
            BodyLength::Indeterminate => source,
        };
        t!("{}", self.reader);
        self.body = Some(Body { expected, read: 0, filtered });
    }

    // Skips the rest of the current packet's body and pops its filter.
    fn skip_body(&mut self) -> Result<()> {
        let filtered = match self.body {
            Some(ref body) => body.filtered,
            None => return Ok(()),
        };

        io::copy(&mut BodyReader(&mut *self), &mut io::sink())
            .map_err(io_error)?;
        self.body = None;

        if filtered {
            let filter = mem::replace(&mut self.reader, Box::new(EOF::new()));
            self.reader = filter.into_inner().ok_or_else(|| {
                Error::InvalidOperation("body filter without a source".into())
            })?;
        }
        Ok(())
    }

    /// Returns the tag of the next packet without consuming it.
    ///
    /// Any unread part of the current packet's body is skipped.
    /// Returns `Ok(None)` at the end of the stream.
    pub fn next_tag(&mut self) -> Result<Option<Tag>> {
        self.skip_body()?;
        match self.reader.data(1).map_err(io_error)?.first() {
            Some(&b) => Ok(Some(CTB::try_from(b)?.tag())),
            None => Ok(None),
        }
    }

    /// Reads the next packet header.
    ///
    /// Any unread part of the current packet's body is skipped.
    /// Returns `Ok(None)` at the end of the stream.
    ///
    /// After this, the packet's body can be read via
    /// [`next_packet`]; prefer that.
    ///
    /// [`next_packet`]: #method.next_packet
    fn read_header(&mut self) -> Result<Option<Header>> {
        tracer!(TRACE, "PacketReader::read_header", 0);
        self.skip_body()?;

        if self.reader.data(1).map_err(io_error)?.is_empty() {
            t!("EOF");
            return Ok(None);
        }
        let ctb = CTB::try_from(
            self.reader.data_consume_hard(1).map_err(io_error)?[0])?;
        let header = Header::parse_length(ctb, &mut self.reader)?;
        t!("{:?}", header);

        self.push_body(header.length());
        Ok(Some(header))
    }

    /// Reads the next packet.
    ///
    /// Contained packets are parsed in full.  The payload of
    /// streaming packets is read through the returned
    /// [`PacketParser`].  Returns `Ok(None)` at the end of the stream.
    ///
    /// # Errors
    ///
    /// Any error is fatal: the stream can't be resynchronized.
    ///
    /// [`PacketParser`]: struct.PacketParser.html
    pub fn next_packet(&mut self) -> Result<Option<PacketParser<'_, 'a>>> {
        let header = match self.read_header()? {
            Some(header) => header,
            None => return Ok(None),
        };
        let tag = header.tag();

        let packet: Packet = match tag {
            Tag::Literal =>
                Literal::parse(&mut BodyReader(&mut *self))?.into(),
            Tag::CompressedData => {
                let algo = BodyReader(&mut *self).parse_u8("algo")?;
                CompressedData::new(algo.into()).into()
            }
            Tag::SED => SED::new().into(),
            Tag::SEIP => {
                let version = BodyReader(&mut *self).parse_u8("version")?;
                SEIP::with_version(version).into()
            }
            Tag::Reserved | Tag::Unknown(_) =>
                return Err(Error::UnknownPacketTag(tag).into()),
            _ => {
                let body = self.buffer_body(&header)?;
                parse_contained(tag, body)?
            }
        };

        Ok(Some(PacketParser { reader: self, header, packet }))
    }

    // Reads a contained packet's body into memory.
    fn buffer_body(&mut self, header: &Header) -> Result<Vec<u8>> {
        let max = self.settings.max_packet_size;
        let too_large = || -> anyhow::Error {
            Error::MalformedPacket(
                format!("{} exceeds the maximum packet size of {} octets",
                        header.tag(), max)).into()
        };

        if let BodyLength::Full(l) = header.length() {
            if *l > max {
                return Err(too_large());
            }
        }

        let mut body = Vec::new();
        BodyReader(&mut *self).take(max as u64 + 1).read_to_end(&mut body)
            .map_err(io_error)?;
        if body.len() > max as usize {
            return Err(too_large());
        }
        Ok(body)
    }

    /// Reads the next packet, returning it as a value.
    ///
    /// The payload of streaming packets is dropped, or stored in the
    /// packet if [`buffer_unread_content`] was configured.
    ///
    /// [`buffer_unread_content`]: struct.PacketReaderBuilder.html#method.buffer_unread_content
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        let buffer = self.settings.buffer_unread_content;
        match self.next_packet()? {
            None => Ok(None),
            Some(mut pp) => {
                if buffer {
                    pp.buffer_unread_content()?;
                } else {
                    pp.drop_unread_content()?;
                }
                Ok(Some(pp.into_packet()))
            }
        }
    }
}

// Reads the current packet's body.
struct BodyReader<'r, 'a>(&'r mut PacketReader<'a>);

impl<'r, 'a> Read for BodyReader<'r, 'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read_body(buf)
    }
}

/// A packet and, for streaming packets, its unread payload.
///
/// Reading from the `PacketParser` yields the payload of literal data,
/// compressed data and encrypted data packets; for any other packet it
/// yields nothing.  Whatever is left unread is skipped when the next
/// packet is read.
pub struct PacketParser<'r, 'a> {
    reader: &'r mut PacketReader<'a>,
    header: Header,
    packet: Packet,
}

impl<'r, 'a> fmt::Debug for PacketParser<'r, 'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PacketParser")
            .field("header", &self.header)
            .field("packet", &self.packet)
            .finish()
    }
}

impl<'r, 'a> PacketParser<'r, 'a> {
    /// Returns the packet's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the packet.
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Returns the packet, dropping any unread payload.
    pub fn into_packet(self) -> Packet {
        self.packet
    }

    /// Reads the rest of the payload and stores it in the packet.
    ///
    /// Payload that was already read through `Read` is not included.
    pub fn buffer_unread_content(&mut self) -> Result<()> {
        if ! self.packet.is_streaming() {
            return Ok(());
        }
        let mut rest = Vec::new();
        self.read_to_end(&mut rest).map_err(io_error)?;

        let mut body = self.packet.streamed_body()
            .map(|b| b.to_vec())
            .unwrap_or_default();
        body.extend_from_slice(&rest);
        self.packet.set_streamed_body(body);
        Ok(())
    }

    /// Skips the rest of the payload.
    pub fn drop_unread_content(&mut self) -> Result<()> {
        self.reader.skip_body()
    }
}

impl<'r, 'a> Read for PacketParser<'r, 'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read_body(buf)
    }
}

impl<'a> Parse<'a, Packet> for Packet {
    /// Reads exactly one packet, buffering any payload.
    fn from_reader<R: 'a + Read + Send + Sync>(reader: R) -> Result<Self> {
        let mut reader = PacketReaderBuilder::from_reader(reader)
            .buffer_unread_content()
            .finalize();
        let packet = reader.read_packet()?.ok_or_else(|| {
            Error::MalformedPacket("expected a packet".into())
        })?;
        if reader.next_tag()?.is_some() {
            return Err(Error::InvalidOperation(
                "Excess data after packet".into()).into());
        }
        Ok(packet)
    }
}

macro_rules! impl_parse_generic_packet {
    ($typ: ident) => {
        impl_parse_generic_packet!($typ, $typ);
    };
    ($typ: ident, $($variant: ident),+) => {
        impl<'a> Parse<'a, $typ> for $typ {
            fn from_reader<R: 'a + Read + Send + Sync>(reader: R)
                                                       -> Result<Self> {
                match Packet::from_reader(reader)? {
                    $(Packet::$variant(p) => Ok(p),)+
                    p => Err(Error::InvalidOperation(
                        format!("Not a {} packet: {}", stringify!($typ),
                                p.tag())).into()),
                }
            }
        }
    };
}

impl_parse_generic_packet!(PKESK);
impl_parse_generic_packet!(Signature);
impl_parse_generic_packet!(SKESK);
impl_parse_generic_packet!(OnePassSig);
impl_parse_generic_packet!(SecretKey, SecretKey, SecretSubkey);
impl_parse_generic_packet!(Key, PublicKey, PublicSubkey);
impl_parse_generic_packet!(CompressedData);
impl_parse_generic_packet!(SED);
impl_parse_generic_packet!(Marker);
impl_parse_generic_packet!(Literal);
impl_parse_generic_packet!(Trust);
impl_parse_generic_packet!(UserID);
impl_parse_generic_packet!(UserAttribute);
impl_parse_generic_packet!(SEIP);
impl_parse_generic_packet!(MDC);
impl_parse_generic_packet!(Experimental);

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::SignatureType;
    use crate::packet::signature::subpacket::SubpacketTag;
    use crate::packet::{DataFormat, StreamingPacket};
    use crate::serialize::{PartialBodyWriter, Serialize, write_packet};

    fn downcast(e: &anyhow::Error) -> Option<&Error> {
        e.downcast_ref::<Error>()
    }

    #[test]
    fn body_length_new_format() {
        fn test(input: &[u8], expected_result: BodyLength) {
            assert_eq!(
                BodyLength::parse_new_format(&mut io::Cursor::new(input))
                    .unwrap(),
                expected_result);
        }

        // Examples from Section 4.2.3 of RFC4880.

        // Example #1.
        test(&[0x64][..], BodyLength::Full(100));

        // Example #2.
        test(&[0xC5, 0xFB][..], BodyLength::Full(1723));

        // Example #3.
        test(&[0xFF, 0x00, 0x01, 0x86, 0xA0][..], BodyLength::Full(100000));

        // Example #4.
        test(&[0xEF][..], BodyLength::Partial(32768));
        test(&[0xE1][..], BodyLength::Partial(2));
        test(&[0xF0][..], BodyLength::Partial(65536));
        test(&[0xC5, 0xDD][..], BodyLength::Full(1693));
    }

    #[test]
    fn body_length_old_format() {
        fn test(input: &[u8], length_type: PacketLengthType,
                expected_result: BodyLength) {
            assert_eq!(
                BodyLength::parse_old_format(&mut io::Cursor::new(input),
                                             length_type).unwrap(),
                expected_result);
        }

        test(&[1], PacketLengthType::OneOctet, BodyLength::Full(1));
        test(&[1, 2], PacketLengthType::TwoOctets, BodyLength::Full(258));
        test(&[0, 0, 1, 2], PacketLengthType::FourOctets,
             BodyLength::Full(258));
        test(&[], PacketLengthType::Indeterminate, BodyLength::Indeterminate);

        let e = BodyLength::parse_old_format(
            &mut io::Cursor::new(&[1][..]), PacketLengthType::TwoOctets)
            .unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::PrematureEof(_))));
    }

    quickcheck! {
        fn header_roundtrip(tag: Tag, len: u32, new_format: bool) -> bool {
            let length = BodyLength::Full(len);
            let ctb = if new_format || ! tag.fits_old_format() {
                CTB::new(tag)
            } else {
                CTB::Old(crate::packet::ctb::CTBOld::new(tag, length)
                         .unwrap())
            };
            let header = Header::new(ctb, length);
            let buf = header.to_vec().unwrap();
            Header::from_bytes(&buf).unwrap() == header
        }
    }

    #[test]
    fn bad_ctb() {
        let e = Header::from_bytes(&[0x3f, 0][..]).unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::MalformedHeader(_))));

        let e = PacketReader::from_bytes(&[0x00][..]).read_packet()
            .unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::MalformedHeader(_))));
    }

    #[test]
    fn empty_stream() {
        let mut reader = PacketReader::from_bytes(&[][..]);
        assert!(reader.next_tag().unwrap().is_none());
        assert!(reader.read_packet().unwrap().is_none());
        // And again.
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn next_tag_peeks() {
        let mut buf = Vec::new();
        Packet::from(UserID::from("a")).serialize(&mut buf).unwrap();
        Packet::from(Marker::default()).serialize(&mut buf).unwrap();

        let mut reader = PacketReader::from_bytes(&buf);
        assert_eq!(reader.next_tag().unwrap(), Some(Tag::UserID));
        assert_eq!(reader.next_tag().unwrap(), Some(Tag::UserID));
        assert_eq!(reader.read_packet().unwrap(),
                   Some(UserID::from("a").into()));
        assert_eq!(reader.next_tag().unwrap(), Some(Tag::Marker));
        assert_eq!(reader.read_packet().unwrap(),
                   Some(Marker::default().into()));
        assert_eq!(reader.next_tag().unwrap(), None);
    }

    #[test]
    fn premature_eof() {
        // A user ID claiming 10 octets, providing 3.
        let buf = [0xB4, 10, b'a', b'b', b'c'];
        let e = PacketReader::from_bytes(&buf[..]).read_packet().unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::PrematureEof(_))));

        // Same for a streamed payload.
        let buf = [0xCB, 20, b'b', 0, 0, 0, 0, 0, b'x'];
        let mut reader = PacketReader::from_bytes(&buf[..]);
        let mut pp = reader.next_packet().unwrap().unwrap();
        let mut content = Vec::new();
        let e = pp.read_to_end(&mut content).unwrap_err();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn partial_body() {
        let mut literal = Literal::new(DataFormat::Binary);
        literal.set_filename("a.txt").unwrap();
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();

        let mut w = PartialBodyWriter::with_chunk_size(
            Vec::new(), Tag::Literal, 512).unwrap();
        literal.serialize_headers(&mut w).unwrap();
        io::Write::write_all(&mut w, &payload).unwrap();
        let buf = w.finalize().unwrap();

        let mut reader = PacketReader::from_bytes(&buf);
        let mut pp = reader.next_packet().unwrap().unwrap();
        assert!(pp.header().partial());
        assert_eq!(pp.header().body_length(), Some(512));
        match pp.packet() {
            Packet::Literal(l) => assert_eq!(l.filename(), b"a.txt"),
            p => panic!("unexpected packet: {:?}", p),
        }
        let mut content = Vec::new();
        pp.read_to_end(&mut content).unwrap();
        assert_eq!(content, payload);
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn partial_body_eof_at_chunk_length() {
        // One partial chunk of two octets, then nothing.
        let buf = [0xCB, 0xE1, b'b', 0];
        let mut reader = PacketReader::from_bytes(&buf[..]);
        let e = reader.next_packet().unwrap_err();
        // The literal's header is incomplete.
        assert!(matches!(downcast(&e), Some(Error::PrematureEof(_))));

        let mut buf = vec![0xC8, 0xE1, 1, b'x'];
        {
            let mut reader = PacketReader::from_bytes(&buf);
            let mut pp = reader.next_packet().unwrap().unwrap();
            let mut content = Vec::new();
            pp.read_to_end(&mut content).unwrap();
            assert_eq!(content, b"x");
        }

        // With a terminating chunk.
        buf.extend_from_slice(&[2, b'y', b'z']);
        let mut reader = PacketReader::from_bytes(&buf);
        let mut pp = reader.next_packet().unwrap().unwrap();
        let mut content = Vec::new();
        pp.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"xyz");
    }

    #[test]
    fn indeterminate_length() {
        // Old format compressed data (tag 8), length type 3.
        let buf = [0x80 | (8 << 2) | 3, 1, b'a', b'b', b'c'];
        let mut reader = PacketReader::from_bytes(&buf[..]);
        let mut pp = reader.next_packet().unwrap().unwrap();
        assert!(pp.header().partial());
        assert_eq!(pp.header().body_length(), None);
        let mut content = Vec::new();
        pp.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"abc");
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn unread_content() {
        let mut literal = Literal::new(DataFormat::Text);
        literal.set_body(b"hello".to_vec());
        let mut buf = Packet::from(literal.clone()).to_vec().unwrap();
        Packet::from(UserID::from("u")).serialize(&mut buf).unwrap();

        // Dropped by default.
        let mut reader = PacketReader::from_bytes(&buf);
        match reader.read_packet().unwrap() {
            Some(Packet::Literal(l)) => assert_eq!(l.body(), None),
            p => panic!("unexpected packet: {:?}", p),
        }
        assert_eq!(reader.read_packet().unwrap(),
                   Some(UserID::from("u").into()));

        // Buffered on request.
        let mut reader = PacketReaderBuilder::from_bytes(&buf)
            .buffer_unread_content()
            .finalize();
        assert_eq!(reader.read_packet().unwrap(), Some(literal.into()));
        assert_eq!(reader.read_packet().unwrap(),
                   Some(UserID::from("u").into()));
    }

    #[test]
    fn partially_read_content_is_skipped() {
        let mut literal = Literal::new(DataFormat::Binary);
        literal.set_body(vec![7; 1000]);
        let mut buf = Packet::from(literal).to_vec().unwrap();
        Packet::from(Marker::default()).serialize(&mut buf).unwrap();

        let mut reader = PacketReader::from_bytes(&buf);
        {
            let mut pp = reader.next_packet().unwrap().unwrap();
            let mut first = [0u8; 10];
            pp.read_exact(&mut first).unwrap();
            assert_eq!(first, [7; 10]);
        }
        assert_eq!(reader.read_packet().unwrap(),
                   Some(Marker::default().into()));
    }

    #[test]
    fn partial_body_from_stream() {
        let payload: Vec<u8> = (0..3000u32).map(|i| (i % 13) as u8).collect();
        let mut w = PartialBodyWriter::with_chunk_size(
            Vec::new(), Tag::Literal, 256).unwrap();
        Literal::new(DataFormat::Binary).serialize_headers(&mut w).unwrap();
        io::Write::write_all(&mut w, &payload).unwrap();
        let mut buf = w.finalize().unwrap();
        Packet::from(UserID::from("after")).serialize(&mut buf).unwrap();

        // Not a slice, so the stream is buffered by the reader.
        let mut reader = PacketReader::new(io::Cursor::new(buf));
        {
            let mut pp = reader.next_packet().unwrap().unwrap();
            let mut head = [0u8; 300];
            pp.read_exact(&mut head).unwrap();
            assert_eq!(&head[..], &payload[..300]);
        }
        assert_eq!(reader.next_tag().unwrap(), Some(Tag::UserID));
        assert_eq!(reader.read_packet().unwrap(),
                   Some(UserID::from("after").into()));
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn into_inner_skips_body() {
        let mut literal = Literal::new(DataFormat::Binary);
        literal.set_body(vec![1; 100]);
        let mut buf = Packet::from(literal).to_vec().unwrap();
        let uid = Packet::from(UserID::from("rest")).to_vec().unwrap();
        buf.extend_from_slice(&uid);

        let mut reader = PacketReader::from_bytes(&buf);
        {
            let mut pp = reader.next_packet().unwrap().unwrap();
            let mut first = [0u8; 1];
            pp.read_exact(&mut first).unwrap();
        }
        let mut source = reader.into_inner().unwrap();
        assert_eq!(source.steal_eof().unwrap(), uid);
    }

    #[test]
    fn max_packet_size() {
        let buf = Packet::from(UserID::from(vec![b'x'; 100])).to_vec().unwrap();

        let mut reader = PacketReaderBuilder::from_bytes(&buf)
            .max_packet_size(99)
            .finalize();
        let e = reader.read_packet().unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::MalformedPacket(_))));

        let mut reader = PacketReaderBuilder::from_bytes(&buf)
            .max_packet_size(100)
            .finalize();
        assert!(reader.read_packet().unwrap().is_some());
    }

    #[test]
    fn unknown_tags() {
        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::Unknown(40), b"abc", true).unwrap();
        let e = PacketReader::from_bytes(&buf).read_packet().unwrap_err();
        assert_eq!(downcast(&e), Some(&Error::UnknownPacketTag(Tag::Unknown(40))));

        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::Reserved, b"abc", false).unwrap();
        let e = PacketReader::from_bytes(&buf).read_packet().unwrap_err();
        assert_eq!(downcast(&e), Some(&Error::UnknownPacketTag(Tag::Reserved)));

        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::Private(61), b"abc", false).unwrap();
        let p = PacketReader::from_bytes(&buf).read_packet().unwrap().unwrap();
        assert_eq!(p, Experimental::new(Tag::Private(61), b"abc".to_vec())
                   .unwrap().into());
    }

    #[test]
    fn marker_body() {
        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::Marker, b"PGP", false).unwrap();
        assert_eq!(Marker::from_bytes(&buf).unwrap(), Marker::default());

        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::Marker, b"GPG", false).unwrap();
        assert!(Marker::from_bytes(&buf).is_err());
    }

    #[test]
    fn excess_data() {
        let mut buf = Packet::from(UserID::from("a")).to_vec().unwrap();
        assert!(UserID::from_bytes(&buf).is_ok());
        assert!(Marker::from_bytes(&buf).is_err());
        let copy = buf.clone();
        buf.extend_from_slice(&copy);
        assert!(UserID::from_bytes(&buf).is_err());
    }

    #[test]
    fn mpi_excess_bits() {
        // Declares 7 bits, holds 8.
        let e = MPI::from_bytes(&[0, 7, 0x80][..]).unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::MalformedMPI(_))));
        // Leading zeros are fine.
        assert_eq!(MPI::from_bytes(&[0, 16, 0, 1][..]).unwrap(),
                   MPI::from(1u32));
    }

    fn v4_signature() -> Signature {
        use crate::packet::signature::SignatureBuilder;

        SignatureBuilder::new(SignatureType::Binary)
            .set_pk_algo(PublicKeyAlgorithm::RSAEncryptSign)
            .set_hash_algo(HashAlgorithm::SHA256)
            .add_hashed_subpacket(Subpacket::creation_time(1_500_000_000,
                                                           false)).unwrap()
            .add_unhashed_subpacket(Subpacket::issuer(
                KeyID::from(0x1122_3344_5566_7788u64), false)).unwrap()
            .finalize([0xAB, 0xCD],
                      mpis::Signature::MPIs(vec![MPI::from(12345u32)]))
            .unwrap()
    }

    #[test]
    fn signature_v4() {
        let sig = v4_signature();
        let buf = Packet::from(sig.clone()).to_vec().unwrap();
        let parsed = Signature::from_bytes(&buf).unwrap();
        assert_eq!(parsed, sig);
        assert_eq!(parsed.creation_time(), 1_500_000_000_000);
        assert_eq!(parsed.issuer(), &KeyID::from(0x1122_3344_5566_7788u64));
        assert_eq!(parsed.digest_prefix(), &[0xAB, 0xCD]);
        assert!(parsed.hashed_subpacket(SubpacketTag::SignatureCreationTime)
                .is_some());
    }

    #[test]
    fn signature_unsupported_version() {
        let mut body = v4_signature().to_vec().unwrap();
        body[0] = 5;
        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::Signature, &body, false).unwrap();
        Packet::from(Marker::default()).serialize(&mut buf).unwrap();

        let mut reader = PacketReader::from_bytes(&buf);
        let e = reader.read_packet().unwrap_err();
        assert_eq!(downcast(&e), Some(&Error::UnsupportedPacketVersion {
            tag: Tag::Signature,
            version: 5,
        }));
    }

    #[test]
    fn signature_unknown_algorithm() {
        let mut body = v4_signature().to_vec().unwrap();
        // The public key algorithm follows the version and the type.
        body[2] = PublicKeyAlgorithm::ECDH.into();
        let e = parse_signature_body(&body).unwrap_err();
        assert_eq!(downcast(&e), Some(&Error::UnsupportedPublicKeyAlgorithm(
            PublicKeyAlgorithm::ECDH)));
    }

    #[test]
    fn key_versions() {
        let mpis = crate::mpis::PublicKey::RSA {
            e: MPI::from(65537u32),
            n: MPI::from(0xC0FFEEu32),
        };
        let v3 = Key::new_v3(1_000, 10, PublicKeyAlgorithm::RSAEncryptSign,
                             mpis.clone()).unwrap();
        let buf = Packet::from(v3.clone()).to_vec().unwrap();
        assert_eq!(Key::from_bytes(&buf).unwrap(), v3);

        let mut body = v3.to_vec().unwrap();
        body[0] = 5;
        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::PublicSubkey, &body, false).unwrap();
        let e = Key::from_bytes(&buf).unwrap_err();
        assert_eq!(downcast(&e), Some(&Error::UnsupportedPacketVersion {
            tag: Tag::PublicSubkey,
            version: 5,
        }));
    }

    #[test]
    fn secret_key_without_material() {
        let public = Key::new(1_000, PublicKeyAlgorithm::DSA,
                              crate::mpis::PublicKey::DSA {
                                  p: MPI::from(23u32),
                                  q: MPI::from(11u32),
                                  g: MPI::from(4u32),
                                  y: MPI::from(8u32),
                              }).unwrap();
        let s2k = S2K::GnuDummy {
            hash: HashAlgorithm::SHA1,
            protection_mode: S2K::GNU_PROTECTION_MODE_NO_PRIVATE_KEY,
        };
        let key = SecretKey::new_encrypted(
            public, SecretKey::USAGE_SHA1, SymmetricAlgorithm::AES256, s2k,
            None, Vec::new()).unwrap();

        let buf = Packet::SecretSubkey(key.clone()).to_vec().unwrap();
        match Packet::from_bytes(&buf).unwrap() {
            Packet::SecretSubkey(k) => {
                assert_eq!(k, key);
                assert_eq!(k.iv(), None);
                assert!(k.secret().is_empty());
            }
            p => panic!("unexpected packet: {:?}", p),
        }
    }

    #[test]
    fn bad_ecc_oid() {
        // Version 4, time, ECDSA, OID length 0.
        let body = [4, 0, 0, 0, 1, 19, 0, 0, 1, 1];
        let mut buf = Vec::new();
        write_packet(&mut buf, Tag::PublicKey, &body, false).unwrap();
        let e = Key::from_bytes(&buf).unwrap_err();
        assert!(matches!(downcast(&e), Some(Error::MalformedPacket(_))));
    }
}
