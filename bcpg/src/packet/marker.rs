use crate::packet::{ContainedPacket, Tag};

/// Holds a Marker packet.
///
/// The body is always the three octets `PGP`.  Readers must ignore
/// the packet.
///
/// See [Section 5.8 of RFC 4880] for details.
///
///   [Section 5.8 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.8
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct Marker {}

impl Marker {
    pub(crate) const BODY: &'static [u8] = b"PGP";
}

impl ContainedPacket for Marker {
    fn tag(&self) -> Tag {
        Tag::Marker
    }
}
