use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Result;

/// A key identifier: the low eight octets of a key's fingerprint.
///
/// Signatures, one-pass signatures and public key encrypted session
/// keys carry the key ID of the key they refer to.  A key ID of all
/// zeros is a wildcard.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct KeyID([u8; 8]);

impl fmt::Display for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for KeyID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("KeyID")
            .field(&self.to_hex())
            .finish()
    }
}

impl From<u64> for KeyID {
    fn from(id: u64) -> Self {
        KeyID(id.to_be_bytes())
    }
}

impl From<KeyID> for u64 {
    fn from(id: KeyID) -> Self {
        u64::from_be_bytes(id.0)
    }
}

impl From<[u8; 8]> for KeyID {
    fn from(raw: [u8; 8]) -> Self {
        KeyID(raw)
    }
}

impl KeyID {
    /// Returns the wildcard key ID.
    pub fn wildcard() -> Self {
        KeyID([0; 8])
    }

    /// Reads a binary key ID.
    ///
    /// Fails unless `raw` is exactly eight octets long.
    pub fn from_bytes(raw: &[u8]) -> Result<KeyID> {
        if raw.len() != 8 {
            return Err(Error::InvalidArgument(
                format!("A key ID is 8 octets, got {}", raw.len())).into());
        }
        let mut id = [0u8; 8];
        id.copy_from_slice(raw);
        Ok(KeyID(id))
    }

    /// Returns the raw key ID.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Returns true if this is the wildcard ID.
    pub fn is_wildcard(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Formats the key ID as upper case hex without separators.
    pub fn to_hex(&self) -> String {
        crate::conversions::to_hex(&self.0, false)
    }
}

#[cfg(test)]
impl Arbitrary for KeyID {
    fn arbitrary(g: &mut Gen) -> Self {
        KeyID::from(u64::arbitrary(g))
    }
}
