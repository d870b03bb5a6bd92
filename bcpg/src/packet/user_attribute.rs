//! User Attribute packets and subpackets.
//!
//! A User Attribute packet is a sequence of subpackets that share the
//! length encoding of signature subpackets but have no critical bit.
//! The only type assigned by RFC 4880 is the image attribute.
//!
//! See [Section 5.12 of RFC 4880] for details.
//!
//!   [Section 5.12 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.12

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::packet::{ContainedPacket, Tag};
use crate::{Error, Result};

/// An image, as stored in an image attribute subpacket.
///
/// The image header starts with its own length as a little-endian
/// two octet number, followed by the header version and the image
/// encoding.  Version 1 headers are 16 octets long; the remaining
/// octets are reserved.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Image {
    /// The raw header, including the length.
    header: Vec<u8>,
    /// The image data.
    data: Vec<u8>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Image")
            .field("header_version", &self.header_version())
            .field("encoding", &self.encoding())
            .field("data", &format!("<{} bytes>", self.data.len()))
            .finish()
    }
}

impl Image {
    /// The JPEG image encoding.
    pub const ENCODING_JPEG: u8 = 1;

    /// Creates an image with a version 1 header.
    pub fn new(encoding: u8, data: Vec<u8>) -> Self {
        let mut header = vec![0u8; 16];
        header[..2].copy_from_slice(&16u16.to_le_bytes());
        header[2] = 1;
        header[3] = encoding;
        Image { header, data }
    }

    /// Splits a subpacket body into header and image data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPacket`] if the body doesn't hold the
    /// header's length field, or if the header is longer than the
    /// body.
    ///
    /// [`Error::MalformedPacket`]: ../../enum.Error.html#variant.MalformedPacket
    pub fn from_body(mut body: Vec<u8>) -> Result<Self> {
        if body.len() < 2 {
            return Err(Error::MalformedPacket(
                "image attribute too short".into()).into());
        }
        let header_len = u16::from_le_bytes([body[0], body[1]]) as usize;
        if header_len < 2 || header_len > body.len() {
            return Err(Error::MalformedPacket(
                format!("invalid image header length {} ({} octets)",
                        header_len, body.len())).into());
        }
        let data = body.split_off(header_len);
        Ok(Image { header: body, data })
    }

    /// Returns the header version, if the header has one.
    pub fn header_version(&self) -> Option<u8> {
        self.header.get(2).cloned()
    }

    /// Returns the image encoding, if the header has one.
    pub fn encoding(&self) -> Option<u8> {
        self.header.get(3).cloned()
    }

    /// Returns the raw header, including its length.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Returns the image data.
    pub fn image_data(&self) -> &[u8] {
        &self.data
    }
}

/// A user attribute subpacket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UserAttributeSubpacket {
    /// An image attribute (type 1).
    Image {
        /// Whether the length is encoded with the five octet form.
        long_length: bool,
        /// The image.
        image: Image,
    },
    /// Any other attribute, kept verbatim.
    Unknown {
        /// The subpacket type.
        tag: u8,
        /// Whether the length is encoded with the five octet form.
        long_length: bool,
        /// The subpacket data.
        data: Vec<u8>,
    },
}

impl UserAttributeSubpacket {
    /// Type of image attributes.
    pub const IMAGE: u8 = 1;

    /// Creates an image attribute subpacket.
    pub fn image(image: Image) -> Self {
        UserAttributeSubpacket::Image { long_length: false, image }
    }

    /// Creates a subpacket from its type and body.
    ///
    /// Image attributes are decoded.
    pub fn from_body(tag: u8, long_length: bool, data: Vec<u8>)
                     -> Result<Self> {
        if tag == Self::IMAGE {
            Ok(UserAttributeSubpacket::Image {
                long_length,
                image: Image::from_body(data)?,
            })
        } else {
            Ok(UserAttributeSubpacket::Unknown { tag, long_length, data })
        }
    }

    /// Returns the subpacket type.
    pub fn tag(&self) -> u8 {
        match self {
            UserAttributeSubpacket::Image { .. } => Self::IMAGE,
            UserAttributeSubpacket::Unknown { tag, .. } => *tag,
        }
    }

    /// Returns whether the length is encoded with the five octet form.
    pub fn long_length(&self) -> bool {
        match self {
            UserAttributeSubpacket::Image { long_length, .. }
            | UserAttributeSubpacket::Unknown { long_length, .. } =>
                *long_length,
        }
    }

    /// Returns the subpacket body.
    pub fn body(&self) -> Vec<u8> {
        match self {
            UserAttributeSubpacket::Image { image, .. } => {
                let mut body = image.header.clone();
                body.extend_from_slice(&image.data);
                body
            }
            UserAttributeSubpacket::Unknown { data, .. } => data.clone(),
        }
    }
}

#[cfg(test)]
impl Arbitrary for UserAttributeSubpacket {
    fn arbitrary(g: &mut Gen) -> Self {
        let long_length = bool::arbitrary(g);
        let mut data = Vec::<u8>::arbitrary(g);
        data.truncate(300);
        if bool::arbitrary(g) {
            UserAttributeSubpacket::Image {
                long_length,
                image: Image::new(u8::arbitrary(g), data),
            }
        } else {
            let tag = match u8::arbitrary(g) {
                Self::IMAGE => 100,
                t => t,
            };
            UserAttributeSubpacket::Unknown { tag, long_length, data }
        }
    }
}

/// Holds a UserAttribute packet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct UserAttribute {
    subpackets: Vec<UserAttributeSubpacket>,
}

impl From<Vec<UserAttributeSubpacket>> for UserAttribute {
    fn from(subpackets: Vec<UserAttributeSubpacket>) -> Self {
        UserAttribute { subpackets }
    }
}

impl UserAttribute {
    /// Returns the subpackets.
    pub fn subpackets(&self) -> &[UserAttributeSubpacket] {
        &self.subpackets
    }

    /// Returns the images.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.subpackets.iter().filter_map(|sp| match sp {
            UserAttributeSubpacket::Image { image, .. } => Some(image),
            _ => None,
        })
    }
}

impl ContainedPacket for UserAttribute {
    fn tag(&self) -> Tag {
        Tag::UserAttribute
    }
}

#[cfg(test)]
impl Arbitrary for UserAttribute {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut subpackets = Vec::<UserAttributeSubpacket>::arbitrary(g);
        subpackets.truncate(4);
        subpackets.into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn image() {
        let image = Image::new(Image::ENCODING_JPEG, vec![0xff, 0xd8, 0xff]);
        assert_eq!(image.header_version(), Some(1));
        assert_eq!(image.encoding(), Some(Image::ENCODING_JPEG));
        assert_eq!(image.header().len(), 16);

        let sp = UserAttributeSubpacket::image(image.clone());
        let body = sp.body();
        assert_eq!(body.len(), 19);
        assert_eq!(&body[..4], &[16, 0, 1, 1]);

        let decoded = UserAttributeSubpacket::from_body(1, false, body)
            .unwrap();
        assert_eq!(decoded, sp);
        assert_eq!(UserAttribute::from(vec![decoded]).images().next(),
                   Some(&image));
    }

    #[test]
    fn malformed_image() {
        assert!(Image::from_body(vec![]).is_err());
        assert!(Image::from_body(vec![2]).is_err());
        assert!(Image::from_body(vec![1, 0, 1]).is_err());
        assert!(Image::from_body(vec![4, 0, 1]).is_err());
        assert!(Image::from_body(vec![16, 0, 1, 1]).is_err());
        assert!(Image::from_body(vec![4, 0, 1, 1]).is_ok());
    }

    #[test]
    fn short_image_header() {
        // Only the length field.
        let image = Image::from_body(vec![2, 0, 0xff, 0xd8]).unwrap();
        assert_eq!(image.header(), &[2, 0]);
        assert_eq!(image.header_version(), None);
        assert_eq!(image.encoding(), None);
        assert_eq!(image.image_data(), &[0xff, 0xd8]);

        // Length and version, no encoding.
        let image = Image::from_body(vec![3, 0, 1]).unwrap();
        assert_eq!(image.header_version(), Some(1));
        assert_eq!(image.encoding(), None);
        assert!(image.image_data().is_empty());

        // Written back unchanged.
        let sp = UserAttributeSubpacket::from_body(
            UserAttributeSubpacket::IMAGE, false, vec![2, 0, 0xff, 0xd8])
            .unwrap();
        assert_eq!(sp.body(), vec![2, 0, 0xff, 0xd8]);
    }
}
