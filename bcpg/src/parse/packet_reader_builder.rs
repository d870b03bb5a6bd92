use std::io;
use std::path::Path;

use buffered_reader::{BufferedReader, File, Generic, Memory};

use crate::Result;
use crate::parse::{PacketReader, PacketReaderSettings};

/// A builder for configuring a `PacketReader`.
///
/// Since the default settings are usually appropriate, this mechanism
/// will only be needed in exceptional circumstances.  Instead use,
/// for instance, `PacketReader::new` or `PacketReader::from_bytes` to
/// start reading an OpenPGP message.
#[derive(Debug)]
pub struct PacketReaderBuilder<'a> {
    source: Box<dyn BufferedReader<()> + 'a>,
    settings: PacketReaderSettings,
}

impl<'a> PacketReaderBuilder<'a> {
    // Creates a `PacketReaderBuilder` for an OpenPGP message stored
    // in a `BufferedReader` object.
    fn from_buffered_reader<R>(source: R) -> Self
        where R: BufferedReader<()> + 'a
    {
        PacketReaderBuilder {
            source: source.into_boxed(),
            settings: PacketReaderSettings::default(),
        }
    }

    /// Creates a `PacketReaderBuilder` for an OpenPGP message stored
    /// in a `std::io::Read` object.
    pub fn from_reader<R: 'a + io::Read + Send + Sync>(reader: R) -> Self {
        Self::from_buffered_reader(Generic::new(reader, None))
    }

    /// Creates a `PacketReaderBuilder` for an OpenPGP message stored
    /// in the file named `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_buffered_reader(File::with_cookie(path, ())?))
    }

    /// Creates a `PacketReaderBuilder` for an OpenPGP message stored
    /// in the specified buffer.
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &'a D) -> Self {
        Self::from_buffered_reader(Memory::new(data.as_ref()))
    }

    /// Sets the maximum size of contained packets.
    ///
    /// Packets that are parsed in full are buffered first.  Larger
    /// packets are rejected with [`Error::MalformedPacket`].  The
    /// payload of streaming packets is not limited.  The default is
    /// [`MAX_PACKET_SIZE`].
    ///
    /// [`Error::MalformedPacket`]: ../enum.Error.html#variant.MalformedPacket
    /// [`MAX_PACKET_SIZE`]: constant.MAX_PACKET_SIZE.html
    pub fn max_packet_size(mut self, value: u32) -> Self {
        self.settings.max_packet_size = value;
        self
    }

    /// Causes `PacketReader::read_packet` to store the payload of
    /// streaming packets in the packet.
    pub fn buffer_unread_content(mut self) -> Self {
        self.settings.buffer_unread_content = true;
        self
    }

    /// Causes `PacketReader::read_packet` to drop the payload of
    /// streaming packets.
    ///
    /// This is the default.
    pub fn drop_unread_content(mut self) -> Self {
        self.settings.buffer_unread_content = false;
        self
    }

    /// Finishes configuring the `PacketReader` and returns it.
    pub fn finalize(self) -> PacketReader<'a> {
        PacketReader::with_settings(self.source, self.settings)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Packet;
    use crate::packet::{DataFormat, Literal};
    use crate::serialize::Serialize;

    #[test]
    fn settings() {
        let mut literal = Literal::new(DataFormat::Binary);
        literal.set_body(b"payload".to_vec());
        let buf = Packet::from(literal.clone()).to_vec().unwrap();

        let mut reader = PacketReaderBuilder::from_bytes(&buf)
            .buffer_unread_content()
            .drop_unread_content()
            .finalize();
        match reader.read_packet().unwrap() {
            Some(Packet::Literal(l)) => assert_eq!(l.body(), None),
            p => panic!("unexpected packet: {:?}", p),
        }

        let mut reader = PacketReaderBuilder::from_bytes(&buf)
            .buffer_unread_content()
            .finalize();
        assert_eq!(reader.read_packet().unwrap(), Some(literal.into()));
    }

    #[test]
    fn from_file() {
        assert!(PacketReaderBuilder::from_file(
            "/this/file/does/not/exist.pgp").is_err());

        let uid = Packet::from(crate::packet::UserID::from("file"));
        let path = std::env::temp_dir().join(
            format!("bcpg-packet-reader-builder-{}.pgp", std::process::id()));
        std::fs::write(&path, uid.to_vec().unwrap()).unwrap();
        let mut reader = PacketReaderBuilder::from_file(&path).unwrap()
            .finalize();
        let packet = reader.read_packet();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(packet.unwrap(), Some(uid));
        assert!(reader.read_packet().unwrap().is_none());
    }
}
