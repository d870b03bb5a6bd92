//! Symmetrically encrypted data packets.
//!
//! Both packets carry an opaque ciphertext.  See [Section 5.7] and
//! [Section 5.13 of RFC 4880] for details.
//!
//! [Section 5.7]: https://tools.ietf.org/html/rfc4880#section-5.7
//! [Section 5.13 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.13

use std::fmt;

/// Holds a legacy symmetrically encrypted data packet.
///
/// The packet has no fields; everything is ciphertext.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct SED {
    /// The ciphertext, if buffered.
    body: Option<Vec<u8>>,
}

impl fmt::Debug for SED {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SED")
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

impl SED {
    /// Creates a new SED packet.
    pub fn new() -> Self {
        Default::default()
    }

    /// Gets the buffered ciphertext, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Sets the ciphertext, returning the old ciphertext.
    pub fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        self.body.replace(body)
    }
}

/// Holds a symmetrically encrypted integrity protected data packet.
///
/// A version octet precedes the ciphertext.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SEIP {
    /// Packet version, normally 1.
    version: u8,
    /// The ciphertext, if buffered.
    body: Option<Vec<u8>>,
}

impl fmt::Debug for SEIP {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SEIP")
            .field("version", &self.version)
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

impl Default for SEIP {
    fn default() -> Self {
        SEIP::new()
    }
}

impl SEIP {
    /// Creates a new version 1 SEIP packet.
    pub fn new() -> Self {
        SEIP { version: 1, body: None }
    }

    pub(crate) fn with_version(version: u8) -> Self {
        SEIP { version, body: None }
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the buffered ciphertext, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Sets the ciphertext, returning the old ciphertext.
    pub fn set_body(&mut self, body: Vec<u8>) -> Option<Vec<u8>> {
        self.body.replace(body)
    }
}
