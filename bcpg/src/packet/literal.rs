use std::cmp;
use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Result;

/// The data format of a literal packet.
///
/// See [Section 5.9 of RFC 4880] for details.
///
///   [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// Binary data (`b`).
    Binary,
    /// Text data (`t`).
    Text,
    /// UTF-8 encoded text (`u`).
    Unicode,
    /// A MIME message (`m`).
    MIME,
    /// Any other format octet.
    Unknown(u8),
}

impl Default for DataFormat {
    fn default() -> Self {
        DataFormat::Binary
    }
}

impl From<u8> for DataFormat {
    fn from(u: u8) -> Self {
        match u {
            b'b' => DataFormat::Binary,
            b't' => DataFormat::Text,
            b'u' => DataFormat::Unicode,
            b'm' => DataFormat::MIME,
            u => DataFormat::Unknown(u),
        }
    }
}

impl From<DataFormat> for u8 {
    fn from(f: DataFormat) -> u8 {
        match f {
            DataFormat::Binary => b'b',
            DataFormat::Text => b't',
            DataFormat::Unicode => b'u',
            DataFormat::MIME => b'm',
            DataFormat::Unknown(u) => u,
        }
    }
}

#[cfg(test)]
impl Arbitrary for DataFormat {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Holds a literal packet.
///
/// A literal packet contains unstructured data.  The parser only
/// decodes the metadata and streams the data to the caller; the
/// packet holds the data only if it was buffered.
///
/// See [Section 5.9 of RFC 4880] for details.
///
///   [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Literal {
    /// How the data is formatted.
    format: DataFormat,
    /// The file name, not necessarily UTF-8.  At most 255 octets.
    filename: Vec<u8>,
    /// The date in seconds since the epoch, or zero.
    date: u32,
    /// The literal data, if buffered.
    body: Option<Vec<u8>>,
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let body = self.body.as_ref().map(|body| {
            let threshold = 36;
            let prefix = &body[..cmp::min(threshold, body.len())];
            let mut prefix_fmt = String::from_utf8_lossy(prefix).into_owned();
            if body.len() > threshold {
                prefix_fmt.push_str("...");
            }
            prefix_fmt.push_str(&format!(" ({} bytes)", body.len()));
            prefix_fmt
        });

        f.debug_struct("Literal")
            .field("format", &self.format)
            .field("filename", &String::from_utf8_lossy(&self.filename))
            .field("date", &self.date)
            .field("body", &body)
            .finish()
    }
}

impl Literal {
    /// Returns a new `Literal` packet without file name, date or
    /// data.
    pub fn new(format: DataFormat) -> Literal {
        Literal {
            format,
            filename: Vec::new(),
            date: 0,
            body: None,
        }
    }

    /// Gets the data format.
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Sets the data format.
    pub fn set_format(&mut self, format: DataFormat) -> DataFormat {
        ::std::mem::replace(&mut self.format, format)
    }

    /// Gets the file name.
    pub fn filename(&self) -> &[u8] {
        &self.filename
    }

    /// Sets the file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the name is longer than
    /// 255 octets.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn set_filename<F: AsRef<[u8]>>(&mut self, filename: F)
                                        -> Result<Vec<u8>> {
        let filename = filename.as_ref();
        if filename.len() > 255 {
            return Err(Error::InvalidArgument(
                format!("filename too long: {} octets", filename.len()))
                .into());
        }
        Ok(::std::mem::replace(&mut self.filename, filename.to_vec()))
    }

    /// Gets the date, in seconds since the epoch.
    pub fn date(&self) -> u32 {
        self.date
    }

    /// Sets the date, in seconds since the epoch.
    pub fn set_date(&mut self, date: u32) -> u32 {
        ::std::mem::replace(&mut self.date, date)
    }

    /// Gets the buffered data, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Sets the data, returning the old data.
    pub fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        self.body.replace(body)
    }
}

#[cfg(test)]
impl Arbitrary for Literal {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut l = Literal::new(DataFormat::arbitrary(g));
        let mut filename = Vec::<u8>::arbitrary(g);
        filename.truncate(255);
        l.filename = filename;
        l.date = u32::arbitrary(g);
        l.body = Some(Vec::<u8>::arbitrary(g));
        l
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn data_format() {
        assert_eq!(DataFormat::from(b'b'), DataFormat::Binary);
        assert_eq!(DataFormat::from(b'x'), DataFormat::Unknown(b'x'));
        assert_eq!(u8::from(DataFormat::MIME), b'm');
    }

    #[test]
    fn filename_length() {
        let mut l = Literal::new(DataFormat::Text);
        assert!(l.set_filename(vec![b'a'; 255]).is_ok());
        assert!(l.set_filename(vec![b'a'; 256]).is_err());
        assert_eq!(l.filename().len(), 255);
    }
}
