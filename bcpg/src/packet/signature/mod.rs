//! Signature packets.
//!
//! Version 2 and 3 signatures have a fixed layout.  Version 4
//! signatures keep most of their metadata in [subpackets]; the issuer
//! and the creation time are derived from them.  See [Section 5.2 of
//! RFC 4880] for details.
//!
//! This module doesn't create or verify signatures.  It decodes and
//! encodes them, and computes the [trailer] that is hashed along with
//! the signed data.
//!
//! [subpackets]: subpacket/index.html
//! [trailer]: struct.Signature.html#method.signature_trailer
//! [Section 5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2

use std::convert::TryFrom;
use std::fmt;

use crate::constants::{HashAlgorithm, PublicKeyAlgorithm, SignatureType};
use crate::mpis;
use crate::packet::{ContainedPacket, Tag};
use crate::serialize::write_subpacket_area;
use crate::{Error, KeyID, Result};

pub mod subpacket;
use self::subpacket::{Subpacket, SubpacketTag};

/// Converts a creation time in milliseconds to the seconds stored in
/// version 2 and 3 signatures.
pub(crate) fn v3_creation_time(creation_time: u64) -> Result<u32> {
    u32::try_from(creation_time / 1000).map_err(|_| {
        Error::InvalidArgument(
            format!("Creation time {} ms doesn't fit a version 3 signature",
                    creation_time)).into()
    })
}

/// Computes the trailer hashed after the signed data.
fn trailer(version: u8, typ: SignatureType, pk_algo: PublicKeyAlgorithm,
           hash_algo: HashAlgorithm, creation_time: u64,
           hashed_area: &[Subpacket]) -> Result<Vec<u8>> {
    match version {
        2 | 3 => {
            let secs = v3_creation_time(creation_time)?;
            let mut t = Vec::with_capacity(5);
            t.push(typ.into());
            t.extend_from_slice(&secs.to_be_bytes());
            Ok(t)
        }
        4 => {
            let mut hashed = Vec::new();
            write_subpacket_area(&mut hashed, hashed_area)?;
            if hashed.len() > std::u16::MAX as usize {
                return Err(Error::InvalidArgument(
                    format!("Hashed area too large: {} octets", hashed.len()))
                           .into());
            }

            let mut t = Vec::with_capacity(6 + hashed.len() + 6);
            t.push(version);
            t.push(typ.into());
            t.push(pk_algo.into());
            t.push(hash_algo.into());
            t.extend_from_slice(&(hashed.len() as u16).to_be_bytes());
            t.extend_from_slice(&hashed);

            let len = 6 + hashed.len() as u32;
            t.push(version);
            t.push(0xff);
            t.extend_from_slice(&len.to_be_bytes());
            Ok(t)
        }
        _ => Err(Error::UnsupportedPacketVersion {
            tag: Tag::Signature,
            version,
        }.into()),
    }
}

/// Returns the creation time (in milliseconds) and the issuer of a
/// version 4 signature.
///
/// The first issuer and creation time subpackets in the hashed area
/// count; an issuer subpacket in the unhashed area overrides the
/// hashed one.
fn derive_v4(hashed_area: &[Subpacket], unhashed_area: &[Subpacket])
             -> (u64, KeyID) {
    let creation_time = hashed_area.iter()
        .find_map(|sp| sp.signature_creation_time())
        .map(|t| t as u64 * 1000)
        .unwrap_or(0);
    let issuer = unhashed_area.iter()
        .find_map(|sp| sp.issuer_key_id())
        .or_else(|| hashed_area.iter().find_map(|sp| sp.issuer_key_id()))
        .unwrap_or_else(KeyID::wildcard);
    (creation_time, issuer)
}

/// Builds a signature.
///
/// The caller computes the digest over the signed data followed by
/// [`SignatureBuilder::signature_trailer`], signs it, and passes the
/// result to [`SignatureBuilder::finalize`].
///
/// [`SignatureBuilder::signature_trailer`]: #method.signature_trailer
/// [`SignatureBuilder::finalize`]: #method.finalize
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureBuilder {
    version: u8,
    typ: SignatureType,
    pk_algo: PublicKeyAlgorithm,
    hash_algo: HashAlgorithm,
    creation_time: u64,
    issuer: KeyID,
    hashed_area: Vec<Subpacket>,
    unhashed_area: Vec<Subpacket>,
}

impl SignatureBuilder {
    /// Starts a version 4 signature.
    pub fn new(typ: SignatureType) -> Self {
        SignatureBuilder {
            version: 4,
            typ,
            pk_algo: PublicKeyAlgorithm::Unknown(0),
            hash_algo: HashAlgorithm::Unknown(0),
            creation_time: 0,
            issuer: KeyID::wildcard(),
            hashed_area: Vec::new(),
            unhashed_area: Vec::new(),
        }
    }

    /// Starts a version 3 signature.
    ///
    /// `creation_time` is in milliseconds since the epoch; only whole
    /// seconds are stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the creation time in
    /// seconds doesn't fit in 32 bits.
    ///
    /// [`Error::InvalidArgument`]: ../../enum.Error.html#variant.InvalidArgument
    pub fn new_v3(typ: SignatureType, creation_time: u64, issuer: KeyID)
                  -> Result<Self> {
        let secs = v3_creation_time(creation_time)?;
        Ok(SignatureBuilder {
            version: 3,
            creation_time: secs as u64 * 1000,
            issuer,
            ..Self::new(typ)
        })
    }

    /// Sets the public key algorithm.
    pub fn set_pk_algo(mut self, pk_algo: PublicKeyAlgorithm) -> Self {
        self.pk_algo = pk_algo;
        self
    }

    /// Sets the hash algorithm.
    pub fn set_hash_algo(mut self, hash_algo: HashAlgorithm) -> Self {
        self.hash_algo = hash_algo;
        self
    }

    fn check_v4(&self) -> Result<()> {
        if self.version != 4 {
            return Err(Error::InvalidOperation(
                format!("Version {} signatures have no subpackets",
                        self.version)).into());
        }
        Ok(())
    }

    /// Appends a subpacket to the hashed area.
    pub fn add_hashed_subpacket(mut self, sp: Subpacket) -> Result<Self> {
        self.check_v4()?;
        self.hashed_area.push(sp);
        Ok(self)
    }

    /// Appends a subpacket to the unhashed area.
    pub fn add_unhashed_subpacket(mut self, sp: Subpacket) -> Result<Self> {
        self.check_v4()?;
        self.unhashed_area.push(sp);
        Ok(self)
    }

    /// Returns the trailer to hash after the signed data.
    pub fn signature_trailer(&self) -> Result<Vec<u8>> {
        trailer(self.version, self.typ, self.pk_algo, self.hash_algo,
                self.creation_time, &self.hashed_area)
    }

    /// Returns the signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `mpis` doesn't fit the
    /// public key algorithm.
    ///
    /// [`Error::InvalidArgument`]: ../../enum.Error.html#variant.InvalidArgument
    pub fn finalize(self, digest_prefix: [u8; 2], mpis: mpis::Signature)
                    -> Result<Signature> {
        if ! mpis.matches(self.pk_algo) {
            return Err(Error::InvalidArgument(
                format!("Signature values don't fit {}", self.pk_algo))
                       .into());
        }

        let (creation_time, issuer) = if self.version == 4 {
            derive_v4(&self.hashed_area, &self.unhashed_area)
        } else {
            (self.creation_time, self.issuer)
        };

        Ok(Signature {
            version: self.version,
            typ: self.typ,
            pk_algo: self.pk_algo,
            hash_algo: self.hash_algo,
            creation_time,
            issuer,
            hashed_area: self.hashed_area,
            unhashed_area: self.unhashed_area,
            digest_prefix,
            mpis,
        })
    }
}

/// Holds a signature packet.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Packet version, 2 to 4.
    version: u8,
    /// Type of signature.
    typ: SignatureType,
    /// Public key algorithm used for this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Hash algorithm used to compute the signature.
    hash_algo: HashAlgorithm,
    /// Creation time in milliseconds since the epoch.
    creation_time: u64,
    /// The issuing key.
    issuer: KeyID,
    /// Subpackets covered by the signature (version 4 only).
    hashed_area: Vec<Subpacket>,
    /// Subpackets not covered by the signature (version 4 only).
    unhashed_area: Vec<Subpacket>,
    /// Upper 16 bits of the signed hash value.
    digest_prefix: [u8; 2],
    /// The signature values.
    mpis: mpis::Signature,
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signature")
            .field("version", &self.version)
            .field("typ", &self.typ)
            .field("pk_algo", &self.pk_algo)
            .field("hash_algo", &self.hash_algo)
            .field("creation_time", &self.creation_time)
            .field("issuer", &self.issuer)
            .field("hashed_area", &self.hashed_area)
            .field("unhashed_area", &self.unhashed_area)
            .field("digest_prefix",
                   &crate::conversions::to_hex(&self.digest_prefix, false))
            .field("mpis", &self.mpis)
            .finish()
    }
}

impl Signature {
    pub(crate) fn new_v3(version: u8, typ: SignatureType,
                         creation_time: u64, issuer: KeyID,
                         pk_algo: PublicKeyAlgorithm,
                         hash_algo: HashAlgorithm,
                         digest_prefix: [u8; 2], mpis: mpis::Signature)
                         -> Self {
        Signature {
            version,
            typ,
            pk_algo,
            hash_algo,
            creation_time,
            issuer,
            hashed_area: Vec::new(),
            unhashed_area: Vec::new(),
            digest_prefix,
            mpis,
        }
    }

    pub(crate) fn new_v4(typ: SignatureType, pk_algo: PublicKeyAlgorithm,
                         hash_algo: HashAlgorithm,
                         hashed_area: Vec<Subpacket>,
                         unhashed_area: Vec<Subpacket>,
                         digest_prefix: [u8; 2], mpis: mpis::Signature)
                         -> Self {
        let (creation_time, issuer) = derive_v4(&hashed_area, &unhashed_area);
        Signature {
            version: 4,
            typ,
            pk_algo,
            hash_algo,
            creation_time,
            issuer,
            hashed_area,
            unhashed_area,
            digest_prefix,
            mpis,
        }
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Gets the creation time in milliseconds since the epoch.
    ///
    /// Zero if a version 4 signature has no creation time subpacket.
    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }

    /// Gets the issuer's key ID.
    ///
    /// The wildcard key ID if a version 4 signature has no issuer
    /// subpacket.
    pub fn issuer(&self) -> &KeyID {
        &self.issuer
    }

    /// Gets the hashed subpackets.
    pub fn hashed_area(&self) -> &[Subpacket] {
        &self.hashed_area
    }

    /// Gets the unhashed subpackets.
    pub fn unhashed_area(&self) -> &[Subpacket] {
        &self.unhashed_area
    }

    /// Gets the upper 16 bits of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        &self.digest_prefix
    }

    /// Gets the signature values.
    pub fn mpis(&self) -> &mpis::Signature {
        &self.mpis
    }

    /// Returns the first hashed subpacket of the given type.
    pub fn hashed_subpacket(&self, tag: SubpacketTag) -> Option<&Subpacket> {
        self.hashed_area.iter().find(|sp| sp.tag() == tag)
    }

    /// Returns the first subpacket of the given type, looking at the
    /// hashed area first.
    pub fn subpacket(&self, tag: SubpacketTag) -> Option<&Subpacket> {
        self.hashed_subpacket(tag)
            .or_else(|| self.unhashed_area.iter().find(|sp| sp.tag() == tag))
    }

    /// Returns the key's validity period in seconds, from the hashed
    /// area.
    pub fn key_expiration_time(&self) -> Option<u32> {
        self.hashed_subpacket(SubpacketTag::KeyExpirationTime)
            .and_then(|sp| sp.key_expiration_time())
    }

    /// Returns the signature's validity period in seconds, from the
    /// hashed area.
    pub fn signature_expiration_time(&self) -> Option<u32> {
        self.hashed_subpacket(SubpacketTag::SignatureExpirationTime)
            .and_then(|sp| sp.signature_expiration_time())
    }

    /// Returns the key flags, from the hashed area.
    pub fn key_flags(&self) -> Option<u32> {
        self.hashed_subpacket(SubpacketTag::KeyFlags)
            .and_then(|sp| sp.key_flags())
    }

    /// Parses the first embedded signature, if any.
    pub fn embedded_signature(&self) -> Option<Result<Signature>> {
        self.subpacket(SubpacketTag::EmbeddedSignature)
            .and_then(|sp| sp.embedded_signature())
    }

    /// Returns the trailer hashed after the signed data.
    ///
    /// Version 2 and 3 signatures hash the type and the creation time
    /// in seconds.  Version 4 signatures hash the fields preceding the
    /// unhashed area followed by the version, `0xff` and the length of
    /// those fields.
    pub fn signature_trailer(&self) -> Result<Vec<u8>> {
        trailer(self.version, self.typ, self.pk_algo, self.hash_algo,
                self.creation_time, &self.hashed_area)
    }
}

impl ContainedPacket for Signature {
    fn tag(&self) -> Tag {
        Tag::Signature
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mpis::MPI;

    fn rsa_mpis() -> mpis::Signature {
        mpis::Signature::MPIs(vec![MPI::from(0x1234u32)])
    }

    #[test]
    fn v3_trailer() {
        let sig = SignatureBuilder::new_v3(SignatureType::Text,
                                           1_000_000_000_000,
                                           KeyID::from(42u64))
            .unwrap()
            .set_pk_algo(PublicKeyAlgorithm::RSASign)
            .set_hash_algo(HashAlgorithm::SHA1)
            .finalize([0, 0], rsa_mpis())
            .unwrap();
        // 1000000000 = 0x3B9ACA00.
        assert_eq!(sig.signature_trailer().unwrap(),
                   vec![0x01, 0x3B, 0x9A, 0xCA, 0x00]);
        assert_eq!(sig.creation_time(), 1_000_000_000_000);
        assert_eq!(sig.issuer(), &KeyID::from(42u64));
    }

    #[test]
    fn v4_trailer() {
        let sig = SignatureBuilder::new(SignatureType::Binary)
            .set_pk_algo(PublicKeyAlgorithm::RSASign)
            .set_hash_algo(HashAlgorithm::SHA256)
            .add_hashed_subpacket(Subpacket::creation_time(0x01020304, false))
            .unwrap()
            .finalize([0xab, 0xcd], rsa_mpis())
            .unwrap();

        let trailer = sig.signature_trailer().unwrap();
        assert_eq!(trailer,
                   vec![4, 0x00, 3, 8, 0, 6,
                        5, 2, 1, 2, 3, 4,
                        4, 0xff, 0, 0, 0, 12]);
        assert_eq!(sig.creation_time(), 0x01020304 * 1000);
    }

    #[test]
    fn derived_issuer() {
        let hashed_id = KeyID::from(1u64);
        let unhashed_id = KeyID::from(2u64);

        let sig = SignatureBuilder::new(SignatureType::Binary)
            .set_pk_algo(PublicKeyAlgorithm::RSASign)
            .add_hashed_subpacket(Subpacket::issuer(hashed_id, false)).unwrap()
            .finalize([0, 0], rsa_mpis()).unwrap();
        assert_eq!(sig.issuer(), &hashed_id);
        assert_eq!(sig.creation_time(), 0);

        let sig = SignatureBuilder::new(SignatureType::Binary)
            .set_pk_algo(PublicKeyAlgorithm::RSASign)
            .add_hashed_subpacket(Subpacket::issuer(hashed_id, false)).unwrap()
            .add_unhashed_subpacket(Subpacket::issuer(unhashed_id, false))
            .unwrap()
            .finalize([0, 0], rsa_mpis()).unwrap();
        assert_eq!(sig.issuer(), &unhashed_id);

        let sig = SignatureBuilder::new(SignatureType::Binary)
            .set_pk_algo(PublicKeyAlgorithm::RSASign)
            .finalize([0, 0], rsa_mpis()).unwrap();
        assert!(sig.issuer().is_wildcard());
    }

    #[test]
    fn mismatched_values() {
        assert!(SignatureBuilder::new(SignatureType::Binary)
                .set_pk_algo(PublicKeyAlgorithm::DSA)
                .finalize([0, 0], rsa_mpis())
                .is_err());
        assert!(SignatureBuilder::new_v3(SignatureType::Binary, 0,
                                         KeyID::wildcard())
                .unwrap()
                .add_hashed_subpacket(Subpacket::creation_time(0, false))
                .is_err());
    }

    #[test]
    fn v3_creation_time_range() {
        // The last second that fits.
        let max = u32::MAX as u64 * 1000 + 999;
        let sig = SignatureBuilder::new_v3(SignatureType::Binary, max,
                                           KeyID::wildcard())
            .unwrap()
            .set_pk_algo(PublicKeyAlgorithm::RSASign)
            .finalize([0, 0], rsa_mpis())
            .unwrap();
        assert_eq!(sig.creation_time(), u32::MAX as u64 * 1000);
        assert_eq!(&sig.signature_trailer().unwrap()[1..], &[0xff; 4][..]);

        let e = SignatureBuilder::new_v3(SignatureType::Binary, max + 1,
                                         KeyID::wildcard())
            .unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::InvalidArgument(_))));
    }
}
