//! One-pass signature packets.
//!
//! See [Section 5.4 of RFC 4880] for details.
//!
//!   [Section 5.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.4

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::constants::{HashAlgorithm, PublicKeyAlgorithm, SignatureType};
use crate::packet::{ContainedPacket, Tag};
use crate::KeyID;

/// Holds a one-pass signature packet.
///
/// A one-pass signature announces a signature that follows the
/// signed data, so that the reader can start hashing right away.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OnePassSig {
    /// Packet version, normally 3.
    version: u8,
    /// Type of the signature.
    typ: SignatureType,
    /// Hash algorithm used to compute the signature.
    hash_algo: HashAlgorithm,
    /// Public key algorithm of this signature.
    pk_algo: PublicKeyAlgorithm,
    /// Key ID of the signing key.
    issuer: KeyID,
    /// Zero if the next packet is another one-pass signature over the
    /// same data.
    last: u8,
}

impl OnePassSig {
    /// Returns a new version 3 one-pass signature packet.
    pub fn new(typ: SignatureType, hash_algo: HashAlgorithm,
               pk_algo: PublicKeyAlgorithm, issuer: KeyID) -> Self {
        OnePassSig {
            version: 3,
            typ,
            hash_algo,
            pk_algo,
            issuer,
            last: 1,
        }
    }

    pub(crate) fn from_fields(version: u8, typ: SignatureType,
                              hash_algo: HashAlgorithm,
                              pk_algo: PublicKeyAlgorithm,
                              issuer: KeyID, last: u8) -> Self {
        OnePassSig { version, typ, hash_algo, pk_algo, issuer, last }
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the signature type.
    pub fn typ(&self) -> SignatureType {
        self.typ
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the issuer.
    pub fn issuer(&self) -> &KeyID {
        &self.issuer
    }

    /// Gets the raw value of the last flag.
    pub fn last_raw(&self) -> u8 {
        self.last
    }

    /// Returns whether this is the last one-pass signature before the
    /// signed data.
    pub fn last(&self) -> bool {
        self.last > 0
    }

    /// Sets the last flag.
    pub fn set_last(&mut self, last: bool) -> bool {
        ::std::mem::replace(&mut self.last, if last { 1 } else { 0 }) > 0
    }
}

impl ContainedPacket for OnePassSig {
    fn tag(&self) -> Tag {
        Tag::OnePassSig
    }
}

#[cfg(test)]
impl Arbitrary for OnePassSig {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut ops = OnePassSig::new(SignatureType::arbitrary(g),
                                      HashAlgorithm::arbitrary(g),
                                      PublicKeyAlgorithm::arbitrary(g),
                                      KeyID::arbitrary(g));
        ops.set_last(bool::arbitrary(g));
        ops
    }
}
