use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet::{ContainedPacket, Tag};

/// Holds a Trust packet.
///
/// The content is implementation defined and kept verbatim.
///
/// See [Section 5.10 of RFC 4880] for details.
///
///   [Section 5.10 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.10
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Trust {
    value: Vec<u8>,
}

impl From<Vec<u8>> for Trust {
    fn from(u: Vec<u8>) -> Self {
        Trust { value: u }
    }
}

impl fmt::Debug for Trust {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Trust")
            .field("value", &crate::conversions::to_hex(&self.value, false))
            .finish()
    }
}

impl Trust {
    /// Returns the raw value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl ContainedPacket for Trust {
    fn tag(&self) -> Tag {
        Tag::Trust
    }
}

#[cfg(test)]
impl Arbitrary for Trust {
    fn arbitrary(g: &mut Gen) -> Self {
        Vec::<u8>::arbitrary(g).into()
    }
}
