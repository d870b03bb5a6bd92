//! OpenPGP packet serializer.
//!
//! Every packet body, as well as the building blocks packets are made
//! of (MPIs, S2K specifiers, subpackets), implements [`Serialize`].
//! [`Packet`] adds the framing: a CTB and the body length.
//!
//! Packets whose length is not known upfront can be streamed using
//! [`PartialBodyWriter`].
//!
//! [`Packet`]: ../enum.Packet.html

use std::convert::TryFrom;
use std::io;

use crate::constants::Curve;
use crate::mpis::{self, MPI};
use crate::packet::ctb::{CTB, CTBOld};
use crate::packet::signature::subpacket::Subpacket;
use crate::packet::signature::v3_creation_time;
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
    StreamingPacket,
    Tag,
    Trust,
    UserAttribute,
    UserID,
    MDC,
};
use crate::{Error, Packet, Result, S2K};

mod partial_body;
pub use self::partial_body::{PartialBodyWriter, DEFAULT_CHUNK_SIZE};

// Whether to trace the modules execution (on stderr).
const TRACE: bool = false;

/// Serializes OpenPGP data structures.
pub trait Serialize {
    /// Writes a serialized version of the object to `o`.
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()>;

    /// Serializes the object into a vector.
    fn to_vec(&self) -> Result<Vec<u8>> {
        let mut o = Vec::new();
        self.serialize(&mut o)?;
        Ok(o)
    }
}

pub(crate) fn write_byte<W: io::Write>(o: &mut W, b: u8) -> io::Result<()> {
    o.write_all(&[b])
}

pub(crate) fn write_be_u16<W: io::Write>(o: &mut W, n: u16)
                                         -> io::Result<()> {
    o.write_all(&n.to_be_bytes())
}

pub(crate) fn write_be_u32<W: io::Write>(o: &mut W, n: u32)
                                         -> io::Result<()> {
    o.write_all(&n.to_be_bytes())
}

fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::InvalidArgument(
        format!("{} too large: {} octets", what, len)).into())
}

fn len_u16(len: usize, what: &str) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::InvalidArgument(
        format!("{} too large: {} octets", what, len)).into())
}

impl Serialize for BodyLength {
    /// Emits the length encoded for use with new format CTBs.
    ///
    /// Full lengths use the shortest encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if invoked on
    /// [`BodyLength::Indeterminate`], or on a partial length that is
    /// not a power of two of at most 1 GiB.  Use
    /// [`serialize_old(..)`] for old format lengths.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    /// [`BodyLength::Indeterminate`]: ../packet/enum.BodyLength.html#variant.Indeterminate
    /// [`serialize_old(..)`]: #method.serialize_old
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        match *self {
            BodyLength::Full(l) if l < 192 => write_byte(o, l as u8)?,
            BodyLength::Full(l) if l <= 8383 => {
                let v = l - 192;
                write_byte(o, ((v >> 8) + 192) as u8)?;
                write_byte(o, (v & 0xff) as u8)?;
            }
            BodyLength::Full(l) => {
                write_byte(o, 0xff)?;
                write_be_u32(o, l)?;
            }
            BodyLength::Partial(l) => {
                if ! l.is_power_of_two() || l > 1 << 30 {
                    return Err(Error::InvalidArgument(
                        format!("Partial body length must be a power of two \
                                 up to 2^30, got {}", l)).into());
                }
                write_byte(o, 0xE0 | l.trailing_zeros() as u8)?;
            }
            BodyLength::Indeterminate =>
                return Err(Error::InvalidArgument(
                    "Indeterminate lengths are not supported \
                     for new format packets".into()).into()),
        }
        Ok(())
    }
}

impl BodyLength {
    /// Emits the length encoded for use with old format CTBs.
    ///
    /// The CTB's length type determines the size of the encoding; this
    /// uses the smallest one, as [`CTBOld::new`] does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if invoked on
    /// [`BodyLength::Partial`].
    ///
    /// [`CTBOld::new`]: ../packet/ctb/struct.CTBOld.html#method.new
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    /// [`BodyLength::Partial`]: ../packet/enum.BodyLength.html#variant.Partial
    pub fn serialize_old<W: io::Write>(&self, o: &mut W) -> Result<()> {
        match *self {
            BodyLength::Full(l) if l <= 0xff => write_byte(o, l as u8)?,
            BodyLength::Full(l) if l <= 0xffff => write_be_u16(o, l as u16)?,
            BodyLength::Full(l) => write_be_u32(o, l)?,
            BodyLength::Indeterminate => (),
            BodyLength::Partial(_) =>
                return Err(Error::InvalidArgument(
                    "Partial body lengths are not supported \
                     for old format packets".into()).into()),
        }
        Ok(())
    }
}

impl Serialize for CTB {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, (*self).into())?;
        Ok(())
    }
}

impl Serialize for Header {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        self.ctb().serialize(o)?;
        if self.new_format() {
            self.length().serialize(o)
        } else {
            self.length().serialize_old(o)
        }
    }
}

/// Writes a packet: its CTB, its body length, and its body.
///
/// An old format header is used unless `force_new_format` is set or
/// the tag doesn't fit in an old format CTB.  Either way the length
/// is the smallest definite encoding.
pub fn write_packet<W: io::Write>(o: &mut W, tag: Tag, body: &[u8],
                                  force_new_format: bool)
    -> Result<()>
{
    tracer!(TRACE, "write_packet");
    let length = BodyLength::Full(len_u32(body.len(), "Packet body")?);

    let header = if force_new_format || ! tag.fits_old_format() {
        Header::new(CTB::new(tag), length)
    } else {
        Header::new(CTB::Old(CTBOld::new(tag, length)?), length)
    };
    t!("{:?}", header);

    header.serialize(o)?;
    o.write_all(body)?;
    Ok(())
}

impl Serialize for MPI {
    /// Writes the bit count followed by the magnitude.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the value has more than
    /// 65535 bits.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        let bits = len_u16(self.bits(), "MPI bit count")?;
        write_be_u16(o, bits)?;
        o.write_all(&self.value_bytes())?;
        Ok(())
    }
}

fn write_curve<W: io::Write>(o: &mut W, curve: &Curve) -> Result<()> {
    let oid = curve.oid();
    if oid.is_empty() || oid.len() >= 0xff {
        return Err(Error::InvalidArgument(
            format!("Invalid curve OID length: {}", oid.len())).into());
    }
    write_byte(o, oid.len() as u8)?;
    o.write_all(oid)?;
    Ok(())
}

impl Serialize for mpis::PublicKey {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        use crate::mpis::PublicKey::*;

        match self {
            RSA { e, n } => {
                n.serialize(o)?;
                e.serialize(o)?;
            }
            DSA { p, q, g, y } => {
                p.serialize(o)?;
                q.serialize(o)?;
                g.serialize(o)?;
                y.serialize(o)?;
            }
            Elgamal { p, g, y } => {
                p.serialize(o)?;
                g.serialize(o)?;
                y.serialize(o)?;
            }
            ECDH { curve, q, hash, sym } => {
                write_curve(o, curve)?;
                q.serialize(o)?;
                // KDF parameters: length, reserved octet, algorithms.
                o.write_all(&[3, 1, (*hash).into(), (*sym).into()])?;
            }
            ECDSA { curve, q } => {
                write_curve(o, curve)?;
                q.serialize(o)?;
            }
        }
        Ok(())
    }
}

impl Serialize for mpis::SecretKeyMaterial {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        use crate::mpis::SecretKeyMaterial::*;

        match self {
            RSA { d, p, q, u } => {
                d.serialize(o)?;
                p.serialize(o)?;
                q.serialize(o)?;
                u.serialize(o)?;
            }
            DSA { x } | Elgamal { x } => x.serialize(o)?,
            ECDH { scalar } | ECDSA { scalar } => scalar.serialize(o)?,
        }
        Ok(())
    }
}

impl Serialize for mpis::Signature {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        match self {
            mpis::Signature::MPIs(mpis) => {
                for mpi in mpis {
                    mpi.serialize(o)?;
                }
            }
            mpis::Signature::Opaque(raw) => o.write_all(raw)?,
        }
        Ok(())
    }
}

impl Serialize for mpis::Ciphertext {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        match self {
            mpis::Ciphertext::RSA { c } => c.serialize(o)?,
            mpis::Ciphertext::Elgamal { e, c } => {
                e.serialize(o)?;
                c.serialize(o)?;
            }
            mpis::Ciphertext::ECDH { data } => o.write_all(data)?,
        }
        Ok(())
    }
}

impl Serialize for S2K {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.tag())?;
        write_byte(o, self.hash_algo().into())?;
        match self {
            S2K::Simple { .. } | S2K::Unknown { .. } => (),
            S2K::Salted { salt, .. } => o.write_all(salt)?,
            S2K::Iterated { salt, coded_count, .. } => {
                o.write_all(salt)?;
                write_byte(o, *coded_count)?;
            }
            S2K::GnuDummy { protection_mode, .. } => {
                o.write_all(S2K::GNU_MARKER)?;
                write_byte(o, *protection_mode)?;
            }
        }
        Ok(())
    }
}

/// Writes the length of a signature or user attribute subpacket.
///
/// `len` covers the type octet and the data.  The five octet form is
/// used if `long_length` is set or the length doesn't fit in two
/// octets.
fn write_subpacket_length<W: io::Write>(o: &mut W, len: u32,
                                        long_length: bool)
    -> Result<()>
{
    if long_length {
        write_byte(o, 0xff)?;
        write_be_u32(o, len)?;
        Ok(())
    } else {
        BodyLength::Full(len).serialize(o)
    }
}

impl Serialize for Subpacket {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        let len = len_u32(self.data().len() + 1, "Subpacket")?;
        write_subpacket_length(o, len, self.long_length())?;
        let tag: u8 = self.tag().into();
        write_byte(o, if self.critical() { tag | 0x80 } else { tag })?;
        o.write_all(self.data())?;
        Ok(())
    }
}

/// Writes a subpacket area, without its length prefix.
pub(crate) fn write_subpacket_area<W: io::Write>(o: &mut W,
                                                 area: &[Subpacket])
    -> Result<()>
{
    for sp in area {
        sp.serialize(o)?;
    }
    Ok(())
}

fn write_prefixed_subpacket_area<W: io::Write>(o: &mut W,
                                               area: &[Subpacket])
    -> Result<()>
{
    let mut buf = Vec::new();
    write_subpacket_area(&mut buf, area)?;
    write_be_u16(o, len_u16(buf.len(), "Subpacket area")?)?;
    o.write_all(&buf)?;
    Ok(())
}

impl Serialize for UserAttributeSubpacket {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        let body = self.body();
        let len = len_u32(body.len() + 1, "User attribute subpacket")?;
        write_subpacket_length(o, len, self.long_length())?;
        write_byte(o, self.tag())?;
        o.write_all(&body)?;
        Ok(())
    }
}

impl Serialize for UserAttribute {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        for sp in self.subpackets() {
            sp.serialize(o)?;
        }
        Ok(())
    }
}

impl Serialize for Signature {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        match self.version() {
            2 | 3 => {
                write_byte(o, self.version())?;
                // Length of the hashed material.
                write_byte(o, 5)?;
                write_byte(o, self.typ().into())?;
                write_be_u32(o, v3_creation_time(self.creation_time())?)?;
                o.write_all(self.issuer().as_bytes())?;
                write_byte(o, self.pk_algo().into())?;
                write_byte(o, self.hash_algo().into())?;
            }
            4 => {
                write_byte(o, self.version())?;
                write_byte(o, self.typ().into())?;
                write_byte(o, self.pk_algo().into())?;
                write_byte(o, self.hash_algo().into())?;
                write_prefixed_subpacket_area(o, self.hashed_area())?;
                write_prefixed_subpacket_area(o, self.unhashed_area())?;
            }
            version => return Err(Error::UnsupportedPacketVersion {
                tag: Tag::Signature,
                version,
            }.into()),
        }
        o.write_all(self.digest_prefix())?;
        self.mpis().serialize(o)
    }
}

impl Serialize for OnePassSig {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.version())?;
        write_byte(o, self.typ().into())?;
        write_byte(o, self.hash_algo().into())?;
        write_byte(o, self.pk_algo().into())?;
        o.write_all(self.issuer().as_bytes())?;
        write_byte(o, self.last_raw())?;
        Ok(())
    }
}

impl Serialize for PKESK {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.version())?;
        o.write_all(self.recipient().as_bytes())?;
        write_byte(o, self.pk_algo().into())?;
        self.esk().serialize(o)
    }
}

impl Serialize for SKESK {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.version())?;
        write_byte(o, self.sym_algo().into())?;
        self.s2k().serialize(o)?;
        o.write_all(self.esk())?;
        Ok(())
    }
}

impl Serialize for Key {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.version())?;
        write_be_u32(o, self.creation_time())?;
        if let Some(days) = self.valid_days() {
            write_be_u16(o, days)?;
        }
        write_byte(o, self.pk_algo().into())?;
        self.mpis().serialize(o)
    }
}

impl Serialize for SecretKey {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        self.public().serialize(o)?;
        write_byte(o, self.s2k_usage())?;
        match self.s2k_usage() {
            SecretKey::USAGE_CHECKSUM | SecretKey::USAGE_SHA1 => {
                let s2k = self.s2k().ok_or_else(|| Error::InvalidArgument(
                    "S2K usage requires an S2K specifier".into()))?;
                write_byte(o, self.sym_algo().into())?;
                s2k.serialize(o)?;
            }
            // Either unencrypted, or the usage octet is the algorithm.
            _ => (),
        }
        if let Some(iv) = self.iv() {
            o.write_all(iv)?;
        }
        o.write_all(self.secret())?;
        Ok(())
    }
}

impl StreamingPacket for Literal {
    fn tag(&self) -> Tag {
        Tag::Literal
    }

    fn serialize_headers<W: io::Write>(&self, o: &mut W) -> Result<()> {
        let filename = self.filename();
        write_byte(o, self.format().into())?;
        write_byte(o, filename.len() as u8)?;
        o.write_all(filename)?;
        write_be_u32(o, self.date())?;
        Ok(())
    }

    fn body(&self) -> Option<&[u8]> {
        Literal::body(self)
    }

    fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        Literal::set_body(self, body)
    }
}

impl StreamingPacket for CompressedData {
    fn tag(&self) -> Tag {
        Tag::CompressedData
    }

    fn serialize_headers<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.algo().into())?;
        Ok(())
    }

    fn body(&self) -> Option<&[u8]> {
        CompressedData::body(self)
    }

    fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        CompressedData::set_body(self, body)
    }
}

impl StreamingPacket for SED {
    fn tag(&self) -> Tag {
        Tag::SED
    }

    fn serialize_headers<W: io::Write>(&self, _: &mut W) -> Result<()> {
        Ok(())
    }

    fn body(&self) -> Option<&[u8]> {
        SED::body(self)
    }

    fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        SED::set_body(self, body)
    }
}

impl StreamingPacket for SEIP {
    fn tag(&self) -> Tag {
        Tag::SEIP
    }

    fn serialize_headers<W: io::Write>(&self, o: &mut W) -> Result<()> {
        write_byte(o, self.version())?;
        Ok(())
    }

    fn body(&self) -> Option<&[u8]> {
        SEIP::body(self)
    }

    fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        SEIP::set_body(self, body)
    }
}

macro_rules! impl_serialize_streaming {
    ($typ:ident) => {
        impl Serialize for $typ {
            /// Writes the leading fields followed by the buffered
            /// payload, if any.
            fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
                self.serialize_headers(o)?;
                if let Some(body) = StreamingPacket::body(self) {
                    o.write_all(body)?;
                }
                Ok(())
            }
        }
    };
}

impl_serialize_streaming!(Literal);
impl_serialize_streaming!(CompressedData);
impl_serialize_streaming!(SED);
impl_serialize_streaming!(SEIP);

impl Serialize for MDC {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        o.write_all(self.digest())?;
        Ok(())
    }
}

impl Serialize for Marker {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        o.write_all(Marker::BODY)?;
        Ok(())
    }
}

impl Serialize for Trust {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        o.write_all(self.value())?;
        Ok(())
    }
}

impl Serialize for UserID {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        o.write_all(self.value())?;
        Ok(())
    }
}

impl Serialize for Experimental {
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        o.write_all(self.body())?;
        Ok(())
    }
}

impl Serialize for Packet {
    /// Writes the packet with an old format header where possible.
    fn serialize<W: io::Write>(&self, o: &mut W) -> Result<()> {
        self.serialize_packet(o, false)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::{HashAlgorithm, SymmetricAlgorithm};
    use crate::packet::signature::subpacket::SubpacketTag;

    #[test]
    fn new_format_lengths() {
        let cases: &[(u32, &[u8])] = &[
            (0, &[0]),
            (191, &[191]),
            (192, &[192, 0]),
            (1723, &[197, 251]),
            (8383, &[223, 255]),
            (8384, &[255, 0, 0, 0x20, 0xc0]),
            (100000, &[255, 0x00, 0x01, 0x86, 0xa0]),
        ];
        for (len, expected) in cases {
            assert_eq!(&BodyLength::Full(*len).to_vec().unwrap()[..],
                       *expected, "length {}", len);
        }

        assert_eq!(BodyLength::Partial(1).to_vec().unwrap(), vec![0xE0]);
        assert_eq!(BodyLength::Partial(4096).to_vec().unwrap(), vec![0xEC]);
        assert!(BodyLength::Partial(3000).to_vec().is_err());
        assert!(BodyLength::Indeterminate.to_vec().is_err());
    }

    #[test]
    fn old_format_header() {
        let mut o = Vec::new();
        write_packet(&mut o, Tag::UserID, b"abc", false).unwrap();
        // 0x80 | (13 << 2) | 0.
        assert_eq!(o, vec![0xB4, 3, b'a', b'b', b'c']);

        let mut o = Vec::new();
        write_packet(&mut o, Tag::PublicKey, &[0; 300], false).unwrap();
        assert_eq!(&o[..3], &[0x99, 0x01, 0x2C]);

        // Tags above 15 always use the new format.
        let mut o = Vec::new();
        write_packet(&mut o, Tag::MDC, &[0; 20], false).unwrap();
        assert_eq!(&o[..2], &[0xD3, 20]);

        let mut o = Vec::new();
        write_packet(&mut o, Tag::UserID, b"abc", true).unwrap();
        assert_eq!(o, vec![0xCD, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn subpacket_lengths() {
        let sp = Subpacket::new(SubpacketTag::Issuer, true, vec![0; 8]);
        assert_eq!(&sp.to_vec().unwrap()[..2], &[9, 0x80 | 16]);

        let sp = Subpacket::with_long_length(SubpacketTag::Issuer, false,
                                             vec![0; 8]);
        assert_eq!(&sp.to_vec().unwrap()[..6], &[0xff, 0, 0, 0, 9, 16]);
    }

    #[test]
    fn s2k_layouts() {
        let salt = [1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(S2K::Simple { hash: HashAlgorithm::SHA1 }.to_vec().unwrap(),
                   vec![0, 2]);
        assert_eq!(S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt,
            coded_count: 0x60,
        }.to_vec().unwrap(),
                   vec![3, 8, 1, 2, 3, 4, 5, 6, 7, 8, 0x60]);
    }

    #[test]
    fn ecdh_kdf_parameters() {
        let k = mpis::PublicKey::ECDH {
            curve: Curve::Cv25519,
            q: MPI::from(0x40u32),
            hash: HashAlgorithm::SHA256,
            sym: SymmetricAlgorithm::AES128,
        };
        let buf = k.to_vec().unwrap();
        assert_eq!(buf[0] as usize, Curve::Cv25519.oid().len());
        assert_eq!(&buf[buf.len() - 4..], &[3, 1, 8, 7]);

        let k = mpis::PublicKey::ECDSA {
            curve: Curve::Unknown(Vec::new().into_boxed_slice()),
            q: MPI::from(1u32),
        };
        assert!(k.to_vec().is_err());
        assert_eq!(k.encoded(), None);
    }
}
