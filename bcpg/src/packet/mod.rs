//! Packet-related types.
//!
//! Every packet body has its own type.  [`Packet`] is the closed sum
//! over all of them.
//!
//! Packets fall into two groups.  Most packets are small and are
//! parsed in full; they implement [`ContainedPacket`].  Literal data,
//! compressed data and the two encrypted data packets can be
//! arbitrarily large; the parser only decodes their leading fields and
//! streams the rest of the body to the caller.  They implement
//! [`StreamingPacket`] and hold their payload only if the caller asked
//! for it to be buffered.
//!
//! See [Section 4 of RFC 4880] for more details.
//!
//!   [Section 4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4

use std::io;

use crate::serialize::{Serialize, write_packet};
use crate::Result;

mod tag;
pub use self::tag::Tag;
pub mod ctb;
pub mod header;
pub use self::header::{BodyLength, Header};

pub mod signature;
pub use self::signature::Signature;
pub mod key;
pub use self::key::{Key, SecretKey};
mod one_pass_sig;
pub use self::one_pass_sig::OnePassSig;
mod pkesk;
pub use self::pkesk::PKESK;
mod skesk;
pub use self::skesk::SKESK;
mod literal;
pub use self::literal::{Literal, DataFormat};
mod compressed_data;
pub use self::compressed_data::CompressedData;
mod seip;
pub use self::seip::{SED, SEIP};
mod mdc;
pub use self::mdc::MDC;
mod marker;
pub use self::marker::Marker;
mod trust;
pub use self::trust::Trust;
mod userid;
pub use self::userid::UserID;
pub mod user_attribute;
pub use self::user_attribute::UserAttribute;
mod unknown;
pub use self::unknown::Experimental;

/// Packets that are parsed and serialized in full.
pub trait ContainedPacket: Serialize {
    /// Returns the tag this packet is written with.
    ///
    /// [`Key`] and [`SecretKey`] bodies don't know whether they belong
    /// to a primary key or to a subkey, and return the primary key's
    /// tag.  Write subkeys as [`Packet::PublicSubkey`] or
    /// [`Packet::SecretSubkey`].
    ///
    /// [`Key`]: struct.Key.html
    /// [`SecretKey`]: struct.SecretKey.html
    /// [`Packet::PublicSubkey`]: enum.Packet.html#variant.PublicSubkey
    /// [`Packet::SecretSubkey`]: enum.Packet.html#variant.SecretSubkey
    fn tag(&self) -> Tag;

    /// Writes the packet, header included, using [`tag`].
    ///
    /// An old format header is used unless `force_new_format` is set
    /// or the tag doesn't fit in an old format CTB.
    ///
    /// [`tag`]: #tymethod.tag
    fn serialize_packet<W: io::Write>(&self, o: &mut W,
                                      force_new_format: bool)
        -> Result<()>
    {
        write_packet(o, self.tag(), &self.to_vec()?, force_new_format)
    }
}

/// Packets that stream an opaque payload.
///
/// The parser decodes the leading fields and hands the rest of the
/// body to the caller.  The payload is only stored in the packet if
/// it was buffered.
pub trait StreamingPacket {
    /// Returns the packet's tag.
    fn tag(&self) -> Tag;

    /// Writes the fields that precede the payload.
    fn serialize_headers<W: io::Write>(&self, o: &mut W) -> Result<()>;

    /// Returns the buffered payload, if any.
    fn body(&self) -> Option<&[u8]>;

    /// Replaces the buffered payload, returning the old one.
    fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>>;
}

/// An OpenPGP packet.
///
/// Note: the Reserved tag (0) and unassigned tags have no variant;
/// the parser rejects them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Packet {
    /// Public-Key Encrypted Session Key Packet.
    PKESK(PKESK),
    /// Signature Packet.
    Signature(Signature),
    /// Symmetric-Key Encrypted Session Key Packet.
    SKESK(SKESK),
    /// One-Pass Signature Packet.
    OnePassSig(OnePassSig),
    /// Secret-Key Packet.
    SecretKey(SecretKey),
    /// Public-Key Packet.
    PublicKey(Key),
    /// Secret-Subkey Packet.
    SecretSubkey(SecretKey),
    /// Compressed Data Packet.
    CompressedData(CompressedData),
    /// Symmetrically Encrypted Data Packet.
    SED(SED),
    /// Marker Packet.
    Marker(Marker),
    /// Literal Data Packet.
    Literal(Literal),
    /// Trust Packet.
    Trust(Trust),
    /// User ID Packet.
    UserID(UserID),
    /// Public-Subkey Packet.
    PublicSubkey(Key),
    /// User Attribute Packet.
    UserAttribute(UserAttribute),
    /// Sym. Encrypted and Integrity Protected Data Packet.
    SEIP(SEIP),
    /// Modification Detection Code Packet.
    MDC(MDC),
    /// Experimental packets (tags 60 to 63).
    Experimental(Experimental),
}

impl Packet {
    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        match self {
            Packet::PKESK(_) => Tag::PKESK,
            Packet::Signature(_) => Tag::Signature,
            Packet::SKESK(_) => Tag::SKESK,
            Packet::OnePassSig(_) => Tag::OnePassSig,
            Packet::SecretKey(_) => Tag::SecretKey,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::SecretSubkey(_) => Tag::SecretSubkey,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::SED(_) => Tag::SED,
            Packet::Marker(_) => Tag::Marker,
            Packet::Literal(_) => Tag::Literal,
            Packet::Trust(_) => Tag::Trust,
            Packet::UserID(_) => Tag::UserID,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::UserAttribute(_) => Tag::UserAttribute,
            Packet::SEIP(_) => Tag::SEIP,
            Packet::MDC(_) => Tag::MDC,
            Packet::Experimental(p) => p.tag(),
        }
    }

    /// Returns whether this packet streams its payload.
    pub fn is_streaming(&self) -> bool {
        self.tag().is_streaming()
    }

    /// Stores the payload of a streaming packet.
    ///
    /// Returns `false` if this is not a streaming packet.
    pub(crate) fn set_streamed_body(&mut self, body: Vec<u8>) -> bool {
        match self {
            Packet::Literal(p) => { p.set_body(body); }
            Packet::CompressedData(p) => { p.set_body(body); }
            Packet::SED(p) => { p.set_body(body); }
            Packet::SEIP(p) => { p.set_body(body); }
            _ => return false,
        }
        true
    }

    /// Returns the buffered payload of a streaming packet.
    pub(crate) fn streamed_body(&self) -> Option<&[u8]> {
        match self {
            Packet::Literal(p) => p.body(),
            Packet::CompressedData(p) => p.body(),
            Packet::SED(p) => p.body(),
            Packet::SEIP(p) => p.body(),
            _ => None,
        }
    }

    /// Writes the packet, header included.
    ///
    /// An old format header is used unless `force_new_format` is set
    /// or the tag doesn't fit in an old format CTB.
    pub fn serialize_packet<W: io::Write>(&self, o: &mut W,
                                          force_new_format: bool)
        -> Result<()>
    {
        write_packet(o, self.tag(), &self.body_to_vec()?, force_new_format)
    }

    /// Serializes the packet's body, without header.
    pub fn body_to_vec(&self) -> Result<Vec<u8>> {
        match self {
            Packet::PKESK(p) => p.to_vec(),
            Packet::Signature(p) => p.to_vec(),
            Packet::SKESK(p) => p.to_vec(),
            Packet::OnePassSig(p) => p.to_vec(),
            Packet::SecretKey(p) | Packet::SecretSubkey(p) => p.to_vec(),
            Packet::PublicKey(p) | Packet::PublicSubkey(p) => p.to_vec(),
            Packet::CompressedData(p) => p.to_vec(),
            Packet::SED(p) => p.to_vec(),
            Packet::Marker(p) => p.to_vec(),
            Packet::Literal(p) => p.to_vec(),
            Packet::Trust(p) => p.to_vec(),
            Packet::UserID(p) => p.to_vec(),
            Packet::UserAttribute(p) => p.to_vec(),
            Packet::SEIP(p) => p.to_vec(),
            Packet::MDC(p) => p.to_vec(),
            Packet::Experimental(p) => p.to_vec(),
        }
    }
}

macro_rules! impl_from_packet {
    ($typ:ident, $variant:ident) => {
        impl From<$typ> for Packet {
            fn from(p: $typ) -> Self {
                Packet::$variant(p)
            }
        }
    };
}

impl_from_packet!(PKESK, PKESK);
impl_from_packet!(Signature, Signature);
impl_from_packet!(SKESK, SKESK);
impl_from_packet!(OnePassSig, OnePassSig);
impl_from_packet!(CompressedData, CompressedData);
impl_from_packet!(SED, SED);
impl_from_packet!(Marker, Marker);
impl_from_packet!(Literal, Literal);
impl_from_packet!(Trust, Trust);
impl_from_packet!(UserID, UserID);
impl_from_packet!(UserAttribute, UserAttribute);
impl_from_packet!(SEIP, SEIP);
impl_from_packet!(MDC, MDC);
impl_from_packet!(Experimental, Experimental);

// Keys convert to primary keys; use the variants directly for
// subkeys.
impl_from_packet!(Key, PublicKey);
impl_from_packet!(SecretKey, SecretKey);

assert_send_and_sync!(Packet);
