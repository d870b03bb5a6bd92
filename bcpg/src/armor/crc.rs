//! The CRC-24 used by the armor checksum line (see [RFC 4880, section
//! 6.1]).
//!
//! [RFC 4880, section 6.1]: https://tools.ietf.org/html/rfc4880#section-6.1

pub(crate) const CRC24_INIT: u32 = 0xB704CE;
const CRC24_POLY: u32 = 0x1864CFB;

/// An incremental CRC-24.
///
/// The checksum is updated one octet at a time.  Feeding a buffer in
/// one go or octet by octet yields the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crc24 {
    n: u32,
}

impl Default for Crc24 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc24 {
    /// Returns a fresh checksum.
    pub fn new() -> Self {
        Crc24 { n: CRC24_INIT }
    }

    /// Feeds a single octet.
    pub fn update_byte(&mut self, octet: u8) -> &mut Self {
        self.n ^= (octet as u32) << 16;
        for _ in 0..8 {
            self.n <<= 1;
            if self.n & 0x1000000 != 0 {
                self.n ^= CRC24_POLY;
            }
        }
        self
    }

    /// Feeds a buffer.
    pub fn update(&mut self, buf: &[u8]) -> &mut Self {
        for octet in buf {
            self.update_byte(*octet);
        }
        self
    }

    /// Returns the 24-bit checksum.
    pub fn value(&self) -> u32 {
        self.n & 0xFFFFFF
    }

    /// Returns the checksum as it appears on the wire, most
    /// significant octet first.
    pub fn to_bytes(&self) -> [u8; 3] {
        let v = self.value();
        [(v >> 16) as u8, (v >> 8) as u8, v as u8]
    }

    /// Starts over.
    pub fn reset(&mut self) {
        self.n = CRC24_INIT;
    }
}
