use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet::{ContainedPacket, Tag};

/// Holds a UserID packet.
///
/// By convention the value is UTF-8 encoded and in "mail name-addr"
/// form, e.g. `Name (Comment) <email@example.com>`, but nothing
/// enforces that.
///
/// See [Section 5.11 of RFC 4880] for details.
///
///   [Section 5.11 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.11
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UserID {
    value: Vec<u8>,
}

impl From<Vec<u8>> for UserID {
    fn from(u: Vec<u8>) -> Self {
        UserID { value: u }
    }
}

impl From<&[u8]> for UserID {
    fn from(u: &[u8]) -> Self {
        u.to_vec().into()
    }
}

impl From<&str> for UserID {
    fn from(u: &str) -> Self {
        u.as_bytes().into()
    }
}

impl From<String> for UserID {
    fn from(u: String) -> Self {
        u.into_bytes().into()
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.value))
    }
}

impl fmt::Debug for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserID")
            .field("value", &String::from_utf8_lossy(&self.value))
            .finish()
    }
}

impl UserID {
    /// Returns the raw value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl ContainedPacket for UserID {
    fn tag(&self) -> Tag {
        Tag::UserID
    }
}

#[cfg(test)]
impl Arbitrary for UserID {
    fn arbitrary(g: &mut Gen) -> Self {
        Vec::<u8>::arbitrary(g).into()
    }
}
