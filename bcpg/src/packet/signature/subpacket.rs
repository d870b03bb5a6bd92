//! Signature subpackets.
//!
//! Version 4 signatures carry two areas of subpackets: the hashed area
//! is covered by the signature, the unhashed area is not.  Each
//! subpacket is a length, a type octet whose top bit marks it as
//! critical, and the type specific data.  See [Section 5.2.3.1 of RFC
//! 4880] for details.
//!
//! [`Subpacket`] keeps the data verbatim.  The typed accessors decode
//! the well-known fixed layouts on demand.
//!
//! [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1

use std::fmt;
use std::hash::{Hash, Hasher};

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::constants::{
    CompressionAlgorithm,
    HashAlgorithm,
    SymmetricAlgorithm,
};
use crate::packet::Signature;
use crate::parse::parse_signature_body;
use crate::serialize::Serialize;
use crate::{KeyID, Result};

/// The subpacket types specified by [Section 5.2.3.1 of RFC 4880].
///
///   [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubpacketTag {
    /// The time the signature was made.
    SignatureCreationTime,
    /// The validity period of the signature.
    SignatureExpirationTime,
    /// Whether a certification may be exported.
    ExportableCertification,
    /// Trust level and amount.
    TrustSignature,
    /// Limits the scope of a trust signature.
    RegularExpression,
    /// Whether the signature can be revoked.
    Revocable,
    /// The validity period of the key.
    KeyExpirationTime,
    /// Deprecated.
    PlaceholderForBackwardCompatibility,
    /// Preferred symmetric algorithms.
    PreferredSymmetricAlgorithms,
    /// Designated revoker.
    RevocationKey,
    /// The key ID of the issuing key.
    Issuer,
    /// A notation.
    NotationData,
    /// Preferred hash algorithms.
    PreferredHashAlgorithms,
    /// Preferred compression algorithms.
    PreferredCompressionAlgorithms,
    /// Key server preferences.
    KeyServerPreferences,
    /// Preferred key server.
    PreferredKeyServer,
    /// Whether the User ID is the primary one.
    PrimaryUserID,
    /// Policy URI.
    PolicyURI,
    /// Key flags.
    KeyFlags,
    /// The User ID responsible for the signature.
    SignersUserID,
    /// Why a key or certification was revoked.
    ReasonForRevocation,
    /// Supported features.
    Features,
    /// The signature this signature refers to.
    SignatureTarget,
    /// A complete signature packet body.
    EmbeddedSignature,
    /// The fingerprint of the issuing key.
    IssuerFingerprint,
    /// Preferred AEAD algorithms.
    PreferredAEADAlgorithms,
    /// Fingerprint of an intended recipient.
    IntendedRecipient,
    /// Reserved subpacket types.
    Reserved(u8),
    /// Private or experimental subpacket types (100 to 110).
    Private(u8),
    /// Unassigned subpacket types.
    Unknown(u8),
}

impl From<u8> for SubpacketTag {
    fn from(u: u8) -> Self {
        use self::SubpacketTag::*;
        match u {
            2 => SignatureCreationTime,
            3 => SignatureExpirationTime,
            4 => ExportableCertification,
            5 => TrustSignature,
            6 => RegularExpression,
            7 => Revocable,
            9 => KeyExpirationTime,
            10 => PlaceholderForBackwardCompatibility,
            11 => PreferredSymmetricAlgorithms,
            12 => RevocationKey,
            16 => Issuer,
            20 => NotationData,
            21 => PreferredHashAlgorithms,
            22 => PreferredCompressionAlgorithms,
            23 => KeyServerPreferences,
            24 => PreferredKeyServer,
            25 => PrimaryUserID,
            26 => PolicyURI,
            27 => KeyFlags,
            28 => SignersUserID,
            29 => ReasonForRevocation,
            30 => Features,
            31 => SignatureTarget,
            32 => EmbeddedSignature,
            33 => IssuerFingerprint,
            34 => PreferredAEADAlgorithms,
            35 => IntendedRecipient,
            0 | 1 | 8 | 13 | 14 | 15 | 17 | 18 | 19 => Reserved(u),
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<SubpacketTag> for u8 {
    fn from(t: SubpacketTag) -> Self {
        use self::SubpacketTag::*;
        match t {
            SignatureCreationTime => 2,
            SignatureExpirationTime => 3,
            ExportableCertification => 4,
            TrustSignature => 5,
            RegularExpression => 6,
            Revocable => 7,
            KeyExpirationTime => 9,
            PlaceholderForBackwardCompatibility => 10,
            PreferredSymmetricAlgorithms => 11,
            RevocationKey => 12,
            Issuer => 16,
            NotationData => 20,
            PreferredHashAlgorithms => 21,
            PreferredCompressionAlgorithms => 22,
            KeyServerPreferences => 23,
            PreferredKeyServer => 24,
            PrimaryUserID => 25,
            PolicyURI => 26,
            KeyFlags => 27,
            SignersUserID => 28,
            ReasonForRevocation => 29,
            Features => 30,
            SignatureTarget => 31,
            EmbeddedSignature => 32,
            IssuerFingerprint => 33,
            PreferredAEADAlgorithms => 34,
            IntendedRecipient => 35,
            Reserved(u) | Private(u) | Unknown(u) => u,
        }
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketTag {
    fn arbitrary(g: &mut Gen) -> Self {
        (u8::arbitrary(g) & 0x7f).into()
    }
}

/// A signature subpacket.
///
/// Equality ignores the length encoding: two subpackets are equal if
/// their types, critical bits and data are.
#[derive(Clone)]
pub struct Subpacket {
    /// The subpacket's type.
    tag: SubpacketTag,
    /// Whether an implementation must understand this subpacket.
    critical: bool,
    /// Whether the length was (or will be) encoded with the five octet
    /// form, whatever the size.
    long_length: bool,
    /// The subpacket's data, without the type octet.
    data: Vec<u8>,
}

impl PartialEq for Subpacket {
    fn eq(&self, other: &Subpacket) -> bool {
        self.tag == other.tag
            && self.critical == other.critical
            && self.data == other.data
    }
}

impl Eq for Subpacket {}

impl Hash for Subpacket {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        self.critical.hash(state);
        self.data.hash(state);
    }
}

impl fmt::Debug for Subpacket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = f.debug_struct("Subpacket");
        s.field("tag", &self.tag);
        if self.critical {
            s.field("critical", &self.critical);
        }
        if self.long_length {
            s.field("long_length", &self.long_length);
        }
        s.field("data", &crate::conversions::to_hex(&self.data, false));
        s.finish()
    }
}

impl Subpacket {
    /// Creates a new subpacket.
    ///
    /// The shortest length encoding is used.
    pub fn new(tag: SubpacketTag, critical: bool, data: Vec<u8>) -> Self {
        Subpacket { tag, critical, long_length: false, data }
    }

    /// Creates a new subpacket whose length is always encoded with the
    /// five octet form.
    pub fn with_long_length(tag: SubpacketTag, critical: bool,
                            data: Vec<u8>) -> Self {
        Subpacket { tag, critical, long_length: true, data }
    }

    /// Creates an issuer subpacket.
    pub fn issuer(id: KeyID, critical: bool) -> Self {
        Self::new(SubpacketTag::Issuer, critical, id.as_bytes().to_vec())
    }

    /// Creates a signature creation time subpacket.
    ///
    /// `time` is in seconds since the epoch.
    pub fn creation_time(time: u32, critical: bool) -> Self {
        Self::new(SubpacketTag::SignatureCreationTime, critical,
                  time.to_be_bytes().to_vec())
    }

    /// Creates an embedded signature subpacket.
    pub fn embedded(sig: &Signature, critical: bool) -> Result<Self> {
        Ok(Self::new(SubpacketTag::EmbeddedSignature, critical,
                     sig.to_vec()?))
    }

    /// Gets the subpacket's type.
    pub fn tag(&self) -> SubpacketTag {
        self.tag
    }

    /// Returns whether the subpacket is critical.
    pub fn critical(&self) -> bool {
        self.critical
    }

    /// Returns whether the length is encoded with the five octet form.
    pub fn long_length(&self) -> bool {
        self.long_length
    }

    /// Sets whether the length is encoded with the five octet form.
    pub fn set_long_length(&mut self, long_length: bool) -> bool {
        ::std::mem::replace(&mut self.long_length, long_length)
    }

    /// Gets the subpacket's data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn data_if(&self, tag: SubpacketTag) -> Option<&[u8]> {
        if self.tag == tag {
            Some(&self.data)
        } else {
            None
        }
    }

    fn u32_if(&self, tag: SubpacketTag) -> Option<u32> {
        match self.data_if(tag) {
            Some(&[a, b, c, d]) => Some(u32::from_be_bytes([a, b, c, d])),
            _ => None,
        }
    }

    fn bool_if(&self, tag: SubpacketTag) -> Option<bool> {
        match self.data_if(tag) {
            Some(&[b]) => Some(b != 0),
            _ => None,
        }
    }

    /// Returns the issuer's key ID, if this is a well-formed issuer
    /// subpacket.
    pub fn issuer_key_id(&self) -> Option<KeyID> {
        self.data_if(SubpacketTag::Issuer)
            .and_then(|data| KeyID::from_bytes(data).ok())
    }

    /// Returns the signature creation time in seconds since the epoch.
    pub fn signature_creation_time(&self) -> Option<u32> {
        self.u32_if(SubpacketTag::SignatureCreationTime)
    }

    /// Returns the signature's validity period in seconds.
    pub fn signature_expiration_time(&self) -> Option<u32> {
        self.u32_if(SubpacketTag::SignatureExpirationTime)
    }

    /// Returns the key's validity period in seconds.
    pub fn key_expiration_time(&self) -> Option<u32> {
        self.u32_if(SubpacketTag::KeyExpirationTime)
    }

    /// Returns the preferred symmetric algorithms.
    pub fn preferred_symmetric_algorithms(&self)
                                          -> Option<Vec<SymmetricAlgorithm>> {
        self.data_if(SubpacketTag::PreferredSymmetricAlgorithms)
            .map(|data| data.iter().map(|&a| a.into()).collect())
    }

    /// Returns the preferred hash algorithms.
    pub fn preferred_hash_algorithms(&self) -> Option<Vec<HashAlgorithm>> {
        self.data_if(SubpacketTag::PreferredHashAlgorithms)
            .map(|data| data.iter().map(|&a| a.into()).collect())
    }

    /// Returns the preferred compression algorithms.
    pub fn preferred_compression_algorithms(&self)
        -> Option<Vec<CompressionAlgorithm>>
    {
        self.data_if(SubpacketTag::PreferredCompressionAlgorithms)
            .map(|data| data.iter().map(|&a| a.into()).collect())
    }

    /// Returns the key flags.
    ///
    /// The first octet holds the least significant bits.  Flags
    /// beyond the fourth octet are ignored.
    pub fn key_flags(&self) -> Option<u32> {
        self.data_if(SubpacketTag::KeyFlags).map(|data| {
            data.iter().take(4).enumerate()
                .fold(0, |flags, (i, &b)| flags | (b as u32) << (8 * i))
        })
    }

    /// Returns whether the User ID is the primary one.
    pub fn primary_user_id(&self) -> Option<bool> {
        self.bool_if(SubpacketTag::PrimaryUserID)
    }

    /// Returns whether the signature is revocable.
    pub fn revocable(&self) -> Option<bool> {
        self.bool_if(SubpacketTag::Revocable)
    }

    /// Returns whether the certification is exportable.
    pub fn exportable(&self) -> Option<bool> {
        self.bool_if(SubpacketTag::ExportableCertification)
    }

    /// Returns the signer's User ID.
    pub fn signer_user_id(&self) -> Option<&[u8]> {
        self.data_if(SubpacketTag::SignersUserID)
    }

    /// Parses the embedded signature.
    ///
    /// Returns `None` if this is not an embedded signature subpacket.
    pub fn embedded_signature(&self) -> Option<Result<Signature>> {
        self.data_if(SubpacketTag::EmbeddedSignature)
            .map(parse_signature_body)
    }
}

#[cfg(test)]
impl Arbitrary for Subpacket {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut data = Vec::<u8>::arbitrary(g);
        data.truncate(300);
        let mut sp = Subpacket::new(SubpacketTag::arbitrary(g),
                                    bool::arbitrary(g), data);
        sp.set_long_length(bool::arbitrary(g));
        sp
    }
}
