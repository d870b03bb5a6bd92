use std::fmt;

use crate::constants::CompressionAlgorithm;

/// Holds a compressed data packet.
///
/// The payload is neither compressed nor decompressed here: the parser
/// decodes the algorithm octet and streams the compressed octets to
/// the caller.
///
/// See [Section 5.6 of RFC 4880] for details.
///
///   [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompressedData {
    /// Algorithm used to compress the payload.
    algo: CompressionAlgorithm,
    /// The compressed payload, if buffered.
    body: Option<Vec<u8>>,
}

impl fmt::Debug for CompressedData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompressedData")
            .field("algo", &self.algo)
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

impl CompressedData {
    /// Returns a new `CompressedData` packet.
    pub fn new(algo: CompressionAlgorithm) -> Self {
        CompressedData { algo, body: None }
    }

    /// Gets the compression algorithm.
    pub fn algo(&self) -> CompressionAlgorithm {
        self.algo
    }

    /// Sets the compression algorithm.
    pub fn set_algo(&mut self, algo: CompressionAlgorithm)
                    -> CompressionAlgorithm {
        ::std::mem::replace(&mut self.algo, algo)
    }

    /// Gets the buffered payload, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Sets the payload, returning the old payload.
    pub fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        self.body.replace(body)
    }
}
