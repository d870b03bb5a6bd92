//! Cipher Type Byte.
//!
//! The first octet of every packet.  It carries the packet's tag and
//! tells old format packets apart from new format packets.  See
//! [Section 4.2 of RFC 4880] for more details.
//!
//!   [Section 4.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use std::convert::TryFrom;

use crate::packet::{BodyLength, Tag};
use crate::{Error, Result};

/// The length type of an old format CTB (its two low bits).
///
/// See [Section 4.2.1 of RFC 4880] for more details.
///
///   [Section 4.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketLengthType {
    /// A one octet length follows.
    OneOctet,
    /// A two octet length follows.
    TwoOctets,
    /// A four octet length follows.
    FourOctets,
    /// The body extends to the end of the stream.
    Indeterminate,
}

impl From<u8> for PacketLengthType {
    /// Only the two low bits are considered.
    fn from(u: u8) -> Self {
        match u & 0x3 {
            0 => PacketLengthType::OneOctet,
            1 => PacketLengthType::TwoOctets,
            2 => PacketLengthType::FourOctets,
            _ => PacketLengthType::Indeterminate,
        }
    }
}

impl From<PacketLengthType> for u8 {
    fn from(l: PacketLengthType) -> Self {
        match l {
            PacketLengthType::OneOctet => 0,
            PacketLengthType::TwoOctets => 1,
            PacketLengthType::FourOctets => 2,
            PacketLengthType::Indeterminate => 3,
        }
    }
}

/// A new format CTB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CTBNew {
    tag: Tag,
}

impl CTBNew {
    /// Constructs a new format CTB.
    pub fn new(tag: Tag) -> Self {
        CTBNew { tag }
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }
}

/// An old format CTB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CTBOld {
    tag: Tag,
    length_type: PacketLengthType,
}

impl CTBOld {
    /// Constructs an old format CTB.
    ///
    /// The length type is the smallest one that can express
    /// `length`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the tag doesn't fit in
    /// four bits or `length` is a partial body length.
    ///
    /// [`Error::InvalidArgument`]: ../../enum.Error.html#variant.InvalidArgument
    pub fn new(tag: Tag, length: BodyLength) -> Result<Self> {
        if ! tag.fits_old_format() {
            return Err(Error::InvalidArgument(
                format!("Only tags 0-15 are supported, got: {}",
                        u8::from(tag))).into());
        }

        let length_type = match length {
            BodyLength::Full(l) if l <= 0xff => PacketLengthType::OneOctet,
            BodyLength::Full(l) if l <= 0xffff => PacketLengthType::TwoOctets,
            BodyLength::Full(_) => PacketLengthType::FourOctets,
            BodyLength::Partial(_) =>
                return Err(Error::InvalidArgument(
                    "Partial body lengths are not supported \
                     for old format packets".into()).into()),
            BodyLength::Indeterminate => PacketLengthType::Indeterminate,
        };

        Ok(CTBOld { tag, length_type })
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the length type.
    pub fn length_type(&self) -> PacketLengthType {
        self.length_type
    }
}

/// A CTB in either format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CTB {
    /// New format.
    New(CTBNew),
    /// Old format.
    Old(CTBOld),
}

impl CTB {
    /// Constructs a new format CTB.
    pub fn new(tag: Tag) -> Self {
        CTB::New(CTBNew::new(tag))
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        match self {
            CTB::New(c) => c.tag(),
            CTB::Old(c) => c.tag(),
        }
    }

    /// Returns whether this is a new format CTB.
    pub fn is_new_format(&self) -> bool {
        matches!(self, CTB::New(_))
    }
}

impl TryFrom<u8> for CTB {
    type Error = anyhow::Error;

    /// Decodes the first octet of a packet.
    ///
    /// Fails with [`Error::MalformedHeader`] if bit 7 is clear.
    ///
    /// [`Error::MalformedHeader`]: ../../enum.Error.html#variant.MalformedHeader
    fn try_from(ptag: u8) -> Result<CTB> {
        if ptag & 0b1000_0000 == 0 {
            return Err(Error::MalformedHeader(
                format!("bit 7 of the CTB 0x{:02x} is clear", ptag)).into());
        }

        if ptag & 0b0100_0000 != 0 {
            Ok(CTB::New(CTBNew::new((ptag & 0b0011_1111).into())))
        } else {
            Ok(CTB::Old(CTBOld {
                tag: ((ptag & 0b0011_1100) >> 2).into(),
                length_type: PacketLengthType::from(ptag),
            }))
        }
    }
}

impl From<CTB> for u8 {
    fn from(ctb: CTB) -> u8 {
        match ctb {
            CTB::New(c) => 0b1100_0000 | u8::from(c.tag()),
            CTB::Old(c) => 0b1000_0000
                | (u8::from(c.tag()) << 2)
                | u8::from(c.length_type()),
        }
    }
}
