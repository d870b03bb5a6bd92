use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet::{ContainedPacket, Tag};

/// Holds a Modification Detection Code packet.
///
/// The body is the SHA-1 digest of the preceding plaintext.  It is
/// only ever found inside the encrypted payload of a SEIP packet.
///
/// See [Section 5.14 of RFC 4880] for details.
///
///   [Section 5.14 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.14
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MDC {
    digest: [u8; 20],
}

impl fmt::Debug for MDC {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MDC")
            .field("digest", &crate::conversions::to_hex(&self.digest, false))
            .finish()
    }
}

impl From<[u8; 20]> for MDC {
    fn from(digest: [u8; 20]) -> Self {
        MDC { digest }
    }
}

impl MDC {
    /// Returns the digest.
    pub fn digest(&self) -> &[u8; 20] {
        &self.digest
    }
}

impl ContainedPacket for MDC {
    fn tag(&self) -> Tag {
        Tag::MDC
    }
}

#[cfg(test)]
impl Arbitrary for MDC {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut digest = [0u8; 20];
        for b in digest.iter_mut() {
            *b = u8::arbitrary(g);
        }
        digest.into()
    }
}
