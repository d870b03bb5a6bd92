use std::fmt;

use crate::packet::{ContainedPacket, Tag};
use crate::{Error, Result};

/// Holds a packet with one of the experimental tags (60 to 63).
///
/// The body is kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Experimental {
    tag: Tag,
    body: Vec<u8>,
}

impl fmt::Debug for Experimental {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Experimental")
            .field("tag", &self.tag)
            .field("body", &crate::conversions::to_hex(&self.body, false))
            .finish()
    }
}

impl Experimental {
    /// Creates a new experimental packet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `tag` is one of the
    /// experimental tags.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn new(tag: Tag, body: Vec<u8>) -> Result<Self> {
        match tag {
            Tag::Private(_) => Ok(Experimental { tag, body }),
            _ => Err(Error::InvalidArgument(
                format!("{} is not an experimental tag", tag)).into()),
        }
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ContainedPacket for Experimental {
    fn tag(&self) -> Tag {
        self.tag
    }
}
