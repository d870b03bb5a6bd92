use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// The packet tags, see [Section 4.3 of RFC 4880].
///
///   [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
///
/// The values correspond to the serialized format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Reserved, a packet tag must not have this value.
    Reserved,
    /// Public-Key Encrypted Session Key Packet.
    PKESK,
    /// Signature Packet.
    Signature,
    /// Symmetric-Key Encrypted Session Key Packet.
    SKESK,
    /// One-Pass Signature Packet.
    OnePassSig,
    /// Secret-Key Packet.
    SecretKey,
    /// Public-Key Packet.
    PublicKey,
    /// Secret-Subkey Packet.
    SecretSubkey,
    /// Compressed Data Packet.
    CompressedData,
    /// Symmetrically Encrypted Data Packet.
    SED,
    /// Marker Packet.
    Marker,
    /// Literal Data Packet.
    Literal,
    /// Trust Packet.
    Trust,
    /// User ID Packet.
    UserID,
    /// Public-Subkey Packet.
    PublicSubkey,
    /// User Attribute Packet.
    UserAttribute,
    /// Sym. Encrypted and Integrity Protected Data Packet.
    SEIP,
    /// Modification Detection Code Packet.
    MDC,
    /// Experimental packets (60 to 63).
    Private(u8),
    /// Unassigned packets.
    Unknown(u8),
}

impl From<u8> for Tag {
    fn from(u: u8) -> Self {
        use self::Tag::*;

        match u {
            0 => Reserved,
            1 => PKESK,
            2 => Signature,
            3 => SKESK,
            4 => OnePassSig,
            5 => SecretKey,
            6 => PublicKey,
            7 => SecretSubkey,
            8 => CompressedData,
            9 => SED,
            10 => Marker,
            11 => Literal,
            12 => Trust,
            13 => UserID,
            14 => PublicSubkey,
            17 => UserAttribute,
            18 => SEIP,
            19 => MDC,
            60..=63 => Private(u),
            _ => Unknown(u),
        }
    }
}

impl From<Tag> for u8 {
    fn from(t: Tag) -> u8 {
        use self::Tag::*;

        match t {
            Reserved => 0,
            PKESK => 1,
            Signature => 2,
            SKESK => 3,
            OnePassSig => 4,
            SecretKey => 5,
            PublicKey => 6,
            SecretSubkey => 7,
            CompressedData => 8,
            SED => 9,
            Marker => 10,
            Literal => 11,
            Trust => 12,
            UserID => 13,
            PublicSubkey => 14,
            UserAttribute => 17,
            SEIP => 18,
            MDC => 19,
            Private(x) | Unknown(x) => x,
        }
    }
}

impl Tag {
    /// Returns whether packets with this tag stream their body to
    /// the caller instead of being parsed in full.
    pub fn is_streaming(self) -> bool {
        matches!(self,
                 Tag::CompressedData | Tag::Literal | Tag::SED | Tag::SEIP)
    }

    /// Returns whether the tag fits in an old format CTB.
    pub fn fits_old_format(self) -> bool {
        u8::from(self) < 16
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::Reserved =>
                f.write_str("Reserved - a packet tag MUST NOT have this value"),
            Tag::PKESK =>
                f.write_str("Public-Key Encrypted Session Key Packet"),
            Tag::Signature => f.write_str("Signature Packet"),
            Tag::SKESK =>
                f.write_str("Symmetric-Key Encrypted Session Key Packet"),
            Tag::OnePassSig => f.write_str("One-Pass Signature Packet"),
            Tag::SecretKey => f.write_str("Secret-Key Packet"),
            Tag::PublicKey => f.write_str("Public-Key Packet"),
            Tag::SecretSubkey => f.write_str("Secret-Subkey Packet"),
            Tag::CompressedData => f.write_str("Compressed Data Packet"),
            Tag::SED => f.write_str("Symmetrically Encrypted Data Packet"),
            Tag::Marker => f.write_str("Marker Packet"),
            Tag::Literal => f.write_str("Literal Data Packet"),
            Tag::Trust => f.write_str("Trust Packet"),
            Tag::UserID => f.write_str("User ID Packet"),
            Tag::PublicSubkey => f.write_str("Public-Subkey Packet"),
            Tag::UserAttribute => f.write_str("User Attribute Packet"),
            Tag::SEIP =>
                f.write_str("Sym. Encrypted and Integrity Protected Data Packet"),
            Tag::MDC => f.write_str("Modification Detection Code Packet"),
            Tag::Private(u) =>
                write!(f, "Private/Experimental Packet {}", u),
            Tag::Unknown(u) => write!(f, "Unknown Packet {}", u),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Tag {
    fn arbitrary(g: &mut Gen) -> Self {
        // A new format CTB carries six bits of tag.
        (u8::arbitrary(g) & 0x3f).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    quickcheck! {
        fn roundtrip(tag: Tag) -> bool {
            let val: u8 = tag.into();
            tag == Tag::from(val)
        }
    }

    quickcheck! {
        fn unknown_private(tag: Tag) -> bool {
            match tag {
                Tag::Unknown(u) => u > 19 || u == 15 || u == 16,
                Tag::Private(u) => (60..=63).contains(&u),
                _ => true
            }
        }
    }

    #[test]
    fn streaming() {
        assert!(Tag::Literal.is_streaming());
        assert!(Tag::SEIP.is_streaming());
        assert!(!Tag::Signature.is_streaming());
        assert!(Tag::PublicSubkey.fits_old_format());
        assert!(!Tag::UserAttribute.fits_old_format());
    }
}
