//! OpenPGP packet codec.
//!
//! This crate reads and writes the OpenPGP message format as defined
//! in [RFC 4880]: the packet framing (old and new format headers,
//! partial body lengths), the packet bodies (keys, signatures,
//! encrypted session keys, literal and compressed data, user IDs and
//! user attributes, ...), multi-precision integers, String-to-Key
//! specifiers, signature and user attribute subpackets, and ASCII
//! armor.
//!
//! The crate does no cryptography.  It neither verifies signatures
//! nor decrypts or decompresses anything: encrypted and compressed
//! payloads are handed to the caller as opaque byte streams.
//!
//! # Reading packets
//!
//! [`PacketReader`] reads one packet after the other.  Packets whose
//! body may be large (literal data, compressed data and the encrypted
//! data packets) are not buffered; their payload is streamed through
//! the [`PacketParser`] returned by [`PacketReader::next_packet`].
//!
//! ```
//! use std::io::Read;
//! use bcpg::{Packet, PacketReader};
//! use bcpg::packet::{DataFormat, Literal, UserID};
//! use bcpg::serialize::Serialize;
//!
//! # fn main() -> bcpg::Result<()> {
//! let mut bytes = Packet::from(UserID::from("Alice <alice@example.org>"))
//!     .to_vec()?;
//! let mut literal = Literal::new(DataFormat::Binary);
//! literal.set_body(b"Hello world.".to_vec());
//! bytes.extend(Packet::from(literal).to_vec()?);
//!
//! let mut reader = PacketReader::from_bytes(&bytes);
//! while let Some(mut pp) = reader.next_packet()? {
//!     match pp.packet() {
//!         Packet::UserID(u) =>
//!             assert_eq!(u.value(), b"Alice <alice@example.org>"),
//!         Packet::Literal(_) => {
//!             let mut content = Vec::new();
//!             pp.read_to_end(&mut content)?;
//!             assert_eq!(content, b"Hello world.");
//!         }
//!         p => panic!("unexpected packet: {:?}", p),
//!     }
//! }
//! # Ok(()) }
//! ```
//!
//! # ASCII armor
//!
//! [`armor::Writer`] and [`armor::Reader`] convert between the binary
//! packet stream and its ASCII armored form.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880
//! [`PacketReader`]: parse::PacketReader
//! [`PacketParser`]: parse::PacketParser
//! [`PacketReader::next_packet`]: parse::PacketReader::next_packet

#![warn(missing_docs)]

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
mod macros;

pub mod armor;
pub mod constants;
mod conversions;
mod keyid;
pub use keyid::KeyID;
pub mod mpis;
pub mod packet;
pub use packet::{Packet, Tag};
pub mod parse;
pub use parse::{PacketReader, PacketParser};
pub mod s2k;
pub use s2k::S2K;
pub mod serialize;

use constants::{HashAlgorithm, PublicKeyAlgorithm};

/// Crate result specialization.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

/// Errors returned by this crate.
///
/// Functions return `anyhow::Error`s; use `downcast_ref` to recover
/// an `Error`.  Reading past the end of a packet body yields an
/// `std::io::Error` of kind `UnexpectedEof` wrapping
/// `Error::PrematureEof`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The packet framing is broken.
    #[error("Invalid header: {0}")]
    MalformedHeader(String),

    /// A malformed packet.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// Malformed MPI.
    #[error("Malformed MPI: {0}")]
    MalformedMPI(String),

    /// The stream ended before a declared length was satisfied.
    #[error("Premature end of stream: {0}")]
    PrematureEof(String),

    /// A subpacket length octet that subpacket areas don't allow.
    #[error("Unrecognised subpacket length octet: {0}")]
    UnrecognisedLength(u8),

    /// Unknown or reserved packet tag.
    #[error("Unknown packet type: {0}")]
    UnknownPacketTag(Tag),

    /// Unsupported packet version.
    #[error("Unsupported {tag} version {version}")]
    UnsupportedPacketVersion {
        /// The packet's tag.
        tag: Tag,
        /// The offending version.
        version: u8,
    },

    /// Unsupported public key algorithm.
    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedPublicKeyAlgorithm(PublicKeyAlgorithm),

    /// Unsupported hash algorithm.
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedHashAlgorithm(HashAlgorithm),

    /// Inconsistent key material.
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            Error::UnsupportedPacketVersion {
                tag: Tag::Signature,
                version: 7,
            }.to_string(),
            "Unsupported Signature Packet version 7");
        assert_eq!(Error::UnrecognisedLength(230).to_string(),
                   "Unrecognised subpacket length octet: 230");
    }

    #[test]
    fn error_downcast() {
        let e: anyhow::Error =
            Error::MalformedHeader("invalid header".into()).into();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::MalformedHeader("invalid header".into())));
    }
}
