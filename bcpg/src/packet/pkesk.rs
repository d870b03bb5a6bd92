//! Public-key encrypted session key packets.
//!
//! The session key is needed to decrypt the actual ciphertext.  See
//! [Section 5.1 of RFC 4880] for details.
//!
//!   [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1

use crate::constants::PublicKeyAlgorithm;
use crate::mpis::Ciphertext;
use crate::packet::{ContainedPacket, Tag};
use crate::{Error, KeyID, Result};

/// Holds a public-key encrypted session key packet.
///
/// The shape of the encrypted session key depends on the public key
/// algorithm: one MPI for RSA, two for Elgamal, and an opaque octet
/// string for ECDH.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PKESK {
    /// Packet version, normally 3.
    version: u8,
    /// Key ID of the key this is encrypted to.
    recipient: KeyID,
    /// Public key algorithm used to encrypt the session key.
    pk_algo: PublicKeyAlgorithm,
    /// The encrypted session key.
    esk: Ciphertext,
}

impl PKESK {
    /// Creates a new version 3 PKESK packet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `esk` doesn't fit
    /// `pk_algo`.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn new(recipient: KeyID, pk_algo: PublicKeyAlgorithm,
               esk: Ciphertext) -> Result<Self> {
        Self::from_fields(3, recipient, pk_algo, esk)
    }

    pub(crate) fn from_fields(version: u8, recipient: KeyID,
                              pk_algo: PublicKeyAlgorithm,
                              esk: Ciphertext) -> Result<Self> {
        if ! esk.matches(pk_algo) {
            return Err(Error::InvalidArgument(
                format!("Ciphertext doesn't fit {}", pk_algo)).into());
        }
        Ok(PKESK { version, recipient, pk_algo, esk })
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the recipient.
    pub fn recipient(&self) -> &KeyID {
        &self.recipient
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the encrypted session key.
    pub fn esk(&self) -> &Ciphertext {
        &self.esk
    }
}

impl ContainedPacket for PKESK {
    fn tag(&self) -> Tag {
        Tag::PKESK
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mpis::MPI;

    #[test]
    fn algorithm_mismatch() {
        let esk = Ciphertext::RSA { c: MPI::from(7u32) };
        assert!(PKESK::new(KeyID::wildcard(),
                           PublicKeyAlgorithm::RSAEncryptSign,
                           esk.clone()).is_ok());
        assert!(PKESK::new(KeyID::wildcard(),
                           PublicKeyAlgorithm::ElgamalEncrypt,
                           esk).is_err());
    }
}
