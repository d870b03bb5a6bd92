//! String-to-Key (S2K) specifiers.
//!
//! An S2K specifier describes how a passphrase is turned into a
//! symmetric key.  It accompanies encrypted secret key material and
//! symmetric-key encrypted session keys.  See [Section 3.7 of RFC
//! 4880] for details.
//!
//!   [Section 3.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.7

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::constants::HashAlgorithm;

/// A String-to-Key specifier.
///
/// The wire format always starts with the type octet followed by the
/// hash algorithm.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum S2K {
    /// Hashes the passphrase (type 0).
    Simple {
        /// Hash algorithm.
        hash: HashAlgorithm,
    },
    /// Hashes a salt and the passphrase (type 1).
    Salted {
        /// Hash algorithm.
        hash: HashAlgorithm,
        /// Salt.
        salt: [u8; 8],
    },
    /// Repeatedly hashes the salt and the passphrase (type 3).
    Iterated {
        /// Hash algorithm.
        hash: HashAlgorithm,
        /// Salt.
        salt: [u8; 8],
        /// The coded number of octets to hash.
        coded_count: u8,
    },
    /// GnuPG's extension for keys whose secret part lives elsewhere
    /// (type 101, followed by the marker `GNU`).
    GnuDummy {
        /// Hash algorithm.
        hash: HashAlgorithm,
        /// What happened to the secret key material.
        protection_mode: u8,
    },
    /// Any other type.  Only the hash algorithm is known to follow.
    Unknown {
        /// The type octet.
        tag: u8,
        /// Hash algorithm.
        hash: HashAlgorithm,
    },
}

impl S2K {
    /// Type octet of `S2K::Simple`.
    pub const SIMPLE: u8 = 0;
    /// Type octet of `S2K::Salted`.
    pub const SALTED: u8 = 1;
    /// Type octet of `S2K::Iterated`.
    pub const ITERATED_SALTED: u8 = 3;
    /// Type octet of `S2K::GnuDummy`.
    pub const GNU_DUMMY: u8 = 101;

    /// The marker following the hash algorithm of `S2K::GnuDummy`.
    pub const GNU_MARKER: &'static [u8; 3] = b"GNU";

    /// The secret key material has been removed.
    pub const GNU_PROTECTION_MODE_NO_PRIVATE_KEY: u8 = 1;
    /// The secret key material is on a smartcard.
    pub const GNU_PROTECTION_MODE_DIVERT_TO_CARD: u8 = 2;

    /// Returns the type octet.
    pub fn tag(&self) -> u8 {
        match self {
            S2K::Simple { .. } => Self::SIMPLE,
            S2K::Salted { .. } => Self::SALTED,
            S2K::Iterated { .. } => Self::ITERATED_SALTED,
            S2K::GnuDummy { .. } => Self::GNU_DUMMY,
            S2K::Unknown { tag, .. } => *tag,
        }
    }

    /// Returns the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        match self {
            S2K::Simple { hash }
            | S2K::Salted { hash, .. }
            | S2K::Iterated { hash, .. }
            | S2K::GnuDummy { hash, .. }
            | S2K::Unknown { hash, .. } => *hash,
        }
    }

    /// Returns the salt, if any.
    pub fn salt(&self) -> Option<&[u8; 8]> {
        match self {
            S2K::Salted { salt, .. } | S2K::Iterated { salt, .. } =>
                Some(salt),
            _ => None,
        }
    }

    /// Returns the coded count of an iterated and salted S2K.
    pub fn coded_count(&self) -> Option<u8> {
        match self {
            S2K::Iterated { coded_count, .. } => Some(*coded_count),
            _ => None,
        }
    }

    /// Returns the number of octets an iterated and salted S2K
    /// hashes.
    ///
    /// The count is `(16 + (c & 15)) << ((c >> 4) + 6)` for the coded
    /// count `c`.
    pub fn iteration_count(&self) -> Option<u32> {
        self.coded_count().map(decode_count)
    }

    /// Returns the GnuPG protection mode, if any.
    pub fn protection_mode(&self) -> Option<u8> {
        match self {
            S2K::GnuDummy { protection_mode, .. } => Some(*protection_mode),
            _ => None,
        }
    }

    /// Returns whether this S2K says that there is no secret key
    /// material at all.
    pub fn is_gnu_no_private_key(&self) -> bool {
        self.protection_mode()
            == Some(Self::GNU_PROTECTION_MODE_NO_PRIVATE_KEY)
    }

    /// Returns the length of the wire encoding.
    pub fn serialized_len(&self) -> usize {
        match self {
            S2K::Simple { .. } | S2K::Unknown { .. } => 2,
            S2K::Salted { .. } => 10,
            S2K::Iterated { .. } => 11,
            S2K::GnuDummy { .. } => 6,
        }
    }
}

fn decode_count(coded: u8) -> u32 {
    let c = coded as u32;
    (16 + (c & 15)) << ((c >> 4) + 6)
}

#[cfg(test)]
impl Arbitrary for S2K {
    fn arbitrary(g: &mut Gen) -> Self {
        let hash = HashAlgorithm::arbitrary(g);
        let mut salt = [0u8; 8];
        for b in salt.iter_mut() {
            *b = u8::arbitrary(g);
        }
        match u8::arbitrary(g) % 5 {
            0 => S2K::Simple { hash },
            1 => S2K::Salted { hash, salt },
            2 => S2K::Iterated { hash, salt, coded_count: u8::arbitrary(g) },
            3 => S2K::GnuDummy { hash, protection_mode: u8::arbitrary(g) },
            _ => {
                let tag = match u8::arbitrary(g) {
                    S2K::SIMPLE | S2K::SALTED | S2K::ITERATED_SALTED
                        | S2K::GNU_DUMMY => 2,
                    t => t,
                };
                S2K::Unknown { tag, hash }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::Serialize;

    #[test]
    fn iteration_count() {
        let s2k = S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt: [0; 8],
            coded_count: 0x10,
        };
        assert_eq!(s2k.iteration_count(), Some(2048));

        // The smallest and largest counts.
        assert_eq!(decode_count(0), 1024);
        assert_eq!(decode_count(0xff), 65011712);

        assert_eq!(S2K::Simple { hash: HashAlgorithm::SHA1 }
                   .iteration_count(), None);
    }

    #[test]
    fn gnu_dummy() {
        let bytes = [101, 2, b'G', b'N', b'U', 1];
        let s2k = S2K::from_bytes(&bytes[..]).unwrap();
        assert_eq!(s2k, S2K::GnuDummy {
            hash: HashAlgorithm::SHA1,
            protection_mode: 1,
        });
        assert!(s2k.is_gnu_no_private_key());
        assert_eq!(s2k.salt(), None);
        assert_eq!(s2k.to_vec().unwrap(), bytes.to_vec());

        // A wrong marker is rejected.
        assert!(S2K::from_bytes(&[101, 2, b'G', b'N', b'X', 1][..]).is_err());
    }

    #[test]
    fn unknown_type() {
        let s2k = S2K::from_bytes(&[2, 8][..]).unwrap();
        assert_eq!(s2k, S2K::Unknown { tag: 2, hash: HashAlgorithm::SHA256 });
        assert_eq!(s2k.to_vec().unwrap(), vec![2, 8]);
    }

    #[test]
    fn truncated() {
        assert!(S2K::from_bytes(&[1, 8, 1, 2, 3][..]).is_err());
        assert!(S2K::from_bytes(&[3, 8, 1, 2, 3, 4, 5, 6, 7, 8][..]).is_err());
    }

    quickcheck! {
        fn roundtrip(s2k: S2K) -> bool {
            let buf = s2k.to_vec().unwrap();
            assert_eq!(buf.len(), s2k.serialized_len());
            S2K::from_bytes(&buf).unwrap() == s2k
        }
    }
}
