//! Symmetric-key encrypted session key packets.
//!
//! SKESK packets hold a session key encrypted with a key derived from
//! a passphrase, or just the S2K parameters if the derived key is the
//! session key.  See [Section 5.3 of RFC 4880] for details.
//!
//!   [Section 5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.3

use std::fmt;

use crate::constants::SymmetricAlgorithm;
use crate::packet::{ContainedPacket, Tag};
use crate::S2K;

/// Holds a symmetric-key encrypted session key packet.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SKESK {
    /// Packet version, normally 4.
    version: u8,
    /// Symmetric algorithm used to encrypt the session key.
    sym_algo: SymmetricAlgorithm,
    /// Key derivation method.
    s2k: S2K,
    /// The encrypted session key, empty if the derived key is used
    /// directly.
    esk: Vec<u8>,
}

impl fmt::Debug for SKESK {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SKESK")
            .field("version", &self.version)
            .field("sym_algo", &self.sym_algo)
            .field("s2k", &self.s2k)
            .field("esk", &crate::conversions::to_hex(&self.esk, false))
            .finish()
    }
}

impl SKESK {
    /// Creates a new version 4 SKESK packet.
    pub fn new(sym_algo: SymmetricAlgorithm, s2k: S2K, esk: Vec<u8>)
               -> Self {
        Self::from_fields(4, sym_algo, s2k, esk)
    }

    pub(crate) fn from_fields(version: u8, sym_algo: SymmetricAlgorithm,
                              s2k: S2K, esk: Vec<u8>) -> Self {
        SKESK { version, sym_algo, s2k, esk }
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the symmetric algorithm.
    pub fn sym_algo(&self) -> SymmetricAlgorithm {
        self.sym_algo
    }

    /// Gets the S2K specifier.
    pub fn s2k(&self) -> &S2K {
        &self.s2k
    }

    /// Gets the encrypted session key.
    pub fn esk(&self) -> &[u8] {
        &self.esk
    }
}

impl ContainedPacket for SKESK {
    fn tag(&self) -> Tag {
        Tag::SKESK
    }
}
