//! Packet headers.

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet::ctb::CTB;
use crate::packet::Tag;

/// A packet's body length.
///
/// See [Section 4.2.2 of RFC 4880] for more details.
///
///   [Section 4.2.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLength {
    /// The body is exactly this long.
    Full(u32),
    /// The body is streamed in chunks.  The value is the length of
    /// the current chunk, always a power of two.  Only new format
    /// packets use this.
    Partial(u32),
    /// The body extends to the end of the stream.  Only old format
    /// packets use this.
    Indeterminate,
}

#[cfg(test)]
impl Arbitrary for BodyLength {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 3 {
            0 => BodyLength::Full(u32::arbitrary(g)),
            1 => BodyLength::Partial(1 << (u8::arbitrary(g) % 31)),
            _ => BodyLength::Indeterminate,
        }
    }
}

/// A packet's header: its CTB and its (first) body length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    ctb: CTB,
    length: BodyLength,
}

impl Header {
    /// Creates a new header.
    pub fn new(ctb: CTB, length: BodyLength) -> Self {
        Header { ctb, length }
    }

    /// Returns the packet's CTB.
    pub fn ctb(&self) -> &CTB {
        &self.ctb
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.ctb.tag()
    }

    /// Returns whether the packet uses the new format.
    pub fn new_format(&self) -> bool {
        self.ctb.is_new_format()
    }

    /// Returns the encoded length.
    pub fn length(&self) -> &BodyLength {
        &self.length
    }

    /// Returns the body length, or the length of the first chunk if
    /// the body is streamed in chunks.
    ///
    /// Returns `None` if the body extends to the end of the stream.
    pub fn body_length(&self) -> Option<u32> {
        match self.length {
            BodyLength::Full(l) | BodyLength::Partial(l) => Some(l),
            BodyLength::Indeterminate => None,
        }
    }

    /// Returns whether the total body length is unknown when the
    /// header is read.
    ///
    /// This is the case for partial body lengths and for old format
    /// packets of indeterminate length.
    pub fn partial(&self) -> bool {
        ! matches!(self.length, BodyLength::Full(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::packet::ctb::CTBOld;

    #[test]
    fn accessors() {
        let h = Header::new(CTB::new(Tag::Literal), BodyLength::Partial(512));
        assert!(h.new_format());
        assert!(h.partial());
        assert_eq!(h.body_length(), Some(512));
        assert_eq!(h.tag(), Tag::Literal);

        let h = Header::new(
            CTB::Old(CTBOld::new(Tag::CompressedData,
                                 BodyLength::Indeterminate).unwrap()),
            BodyLength::Indeterminate);
        assert!(! h.new_format());
        assert!(h.partial());
        assert_eq!(h.body_length(), None);

        let h = Header::new(CTB::new(Tag::UserID), BodyLength::Full(0));
        assert!(! h.partial());
        assert_eq!(h.body_length(), Some(0));
    }
}
