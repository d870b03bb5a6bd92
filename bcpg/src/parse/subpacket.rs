//! Signature and user attribute subpackets.
//!
//! Both kinds of subpackets are framed the same way: a length that
//! covers the type octet and the data, the type octet, and the data.
//! Lengths use the one, two and five octet forms of new format packet
//! lengths; partial lengths are not allowed.
//!
//! See [Section 5.2.3.1 of RFC 4880] for details.
//!
//!   [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1

use std::io::Read;

use buffered_reader::{BufferedReader, Generic, Memory};

use crate::packet::signature::subpacket::{Subpacket, SubpacketTag};
use crate::packet::user_attribute::UserAttributeSubpacket;
use crate::parse::{Parse, ReadFields, io_error};
use crate::{Error, Result};

const TRACE: bool = false;

/// Reads a subpacket length.
///
/// Returns the length and whether the five octet form was used, or
/// `None` at the end of the stream.
fn parse_subpacket_length<R>(r: &mut R) -> Result<Option<(u32, bool)>>
    where R: BufferedReader<()>
{
    if r.data(1).map_err(io_error)?.is_empty() {
        return Ok(None);
    }
    let octet1 = r.data_consume_hard(1).map_err(io_error)?[0];

    let length = match octet1 {
        0..=191 => (octet1 as u32, false),
        192..=223 => {
            let octet2 = r.parse_u8("subpacket_length")?;
            (((octet1 as u32 - 192) << 8) + octet2 as u32 + 192, false)
        }
        224..=254 => return Err(Error::UnrecognisedLength(octet1).into()),
        255 => (r.parse_be_u32("subpacket_length")?, true),
    };
    Ok(Some(length))
}

// Reads the type octet and the data of a subpacket of length `len`.
fn parse_subpacket_body<R: Read>(r: &mut R, len: u32) -> Result<(u8, Vec<u8>)> {
    if len == 0 {
        return Err(Error::MalformedPacket(
            "Zero-length subpacket".into()).into());
    }
    let tag = r.parse_u8("subpacket_type")?;
    let data = r.parse_bytes("subpacket_data", len as usize - 1)?;
    Ok((tag, data))
}

impl Subpacket {
    /// Reads the next subpacket, or `None` at the end of the stream.
    pub(crate) fn parse<R>(r: &mut R) -> Result<Option<Self>>
        where R: BufferedReader<()>
    {
        tracer!(TRACE, "Subpacket::parse", 3);
        let (len, long_length) = match parse_subpacket_length(r)? {
            Some(length) => length,
            None => return Ok(None),
        };
        let (tag, data) = parse_subpacket_body(r, len)?;
        t!("type {}, {} octets", tag & 0x7f, data.len());

        let critical = tag & 0x80 != 0;
        let tag = SubpacketTag::from(tag & 0x7f);
        Ok(Some(if long_length {
            Subpacket::with_long_length(tag, critical, data)
        } else {
            Subpacket::new(tag, critical, data)
        }))
    }

    /// Parses a subpacket area.
    pub(crate) fn parse_area(area: &[u8]) -> Result<Vec<Self>> {
        let mut r = Memory::new(area);
        let mut subpackets = Vec::new();
        while let Some(sp) = Subpacket::parse(&mut r)? {
            subpackets.push(sp);
        }
        Ok(subpackets)
    }
}

impl<'a> Parse<'a, Subpacket> for Subpacket {
    /// Reads exactly one subpacket.
    fn from_reader<R: 'a + Read + Send + Sync>(reader: R) -> Result<Self> {
        let mut reader = Generic::new(reader, None);
        Subpacket::parse(&mut reader)?.ok_or_else(|| {
            Error::PrematureEof("expected a subpacket".into()).into()
        })
    }
}

impl UserAttributeSubpacket {
    /// Reads the next user attribute subpacket, or `None` at the end
    /// of the stream.
    pub(crate) fn parse<R>(r: &mut R) -> Result<Option<Self>>
        where R: BufferedReader<()>
    {
        let (len, long_length) = match parse_subpacket_length(r)? {
            Some(length) => length,
            None => return Ok(None),
        };
        let (tag, data) = parse_subpacket_body(r, len)?;
        UserAttributeSubpacket::from_body(tag, long_length, data).map(Some)
    }
}

impl<'a> Parse<'a, UserAttributeSubpacket> for UserAttributeSubpacket {
    /// Reads exactly one user attribute subpacket.
    fn from_reader<R: 'a + Read + Send + Sync>(reader: R) -> Result<Self> {
        let mut reader = Generic::new(reader, None);
        UserAttributeSubpacket::parse(&mut reader)?.ok_or_else(|| {
            Error::PrematureEof("expected a subpacket".into()).into()
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serialize::Serialize;

    quickcheck! {
        fn subpacket_roundtrip(sp: Subpacket) -> bool {
            let buf = sp.to_vec().unwrap();
            let parsed = Subpacket::from_bytes(&buf).unwrap();
            parsed == sp && parsed.long_length() == sp.long_length()
        }
    }

    quickcheck! {
        fn user_attribute_subpacket_roundtrip(sp: UserAttributeSubpacket)
                                              -> bool {
            let buf = sp.to_vec().unwrap();
            UserAttributeSubpacket::from_bytes(&buf).unwrap() == sp
        }
    }

    #[test]
    fn critical_bit() {
        // Length 5, critical creation time.
        let buf = [5, 0x82, 0x5a, 0x00, 0x00, 0x00];
        let sp = Subpacket::from_bytes(&buf[..]).unwrap();
        assert!(sp.critical());
        assert_eq!(sp.tag(), SubpacketTag::SignatureCreationTime);
        assert_eq!(sp.signature_creation_time(), Some(0x5a00_0000));
    }

    #[test]
    fn long_length_is_kept() {
        let buf = [0xff, 0, 0, 0, 2, 25, 1];
        let sp = Subpacket::from_bytes(&buf[..]).unwrap();
        assert!(sp.long_length());
        assert_eq!(sp.primary_user_id(), Some(true));
        assert_eq!(sp.to_vec().unwrap(), buf);
    }

    #[test]
    fn malformed_lengths() {
        let e = Subpacket::parse_area(&[0xe0, 2, 3]).unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::UnrecognisedLength(0xe0)));

        let e = Subpacket::parse_area(&[0]).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::MalformedPacket(_))));

        let e = Subpacket::parse_area(&[10, 2, 0]).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::PrematureEof(_))));
    }

    #[test]
    fn area() {
        let mut buf = Vec::new();
        Subpacket::creation_time(1, false).serialize(&mut buf).unwrap();
        Subpacket::new(SubpacketTag::from(99), true, vec![1, 2, 3])
            .serialize(&mut buf).unwrap();
        let area = Subpacket::parse_area(&buf).unwrap();
        assert_eq!(area.len(), 2);
        assert_eq!(area[1].tag(), SubpacketTag::from(99));
        assert!(area[1].critical());
        assert!(Subpacket::parse_area(&[]).unwrap().is_empty());
    }
}
