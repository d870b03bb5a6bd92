//! Algorithm identifiers used on the wire.
//!
//! Every enumeration round-trips through `u8` without loss: values
//! that are not assigned by [RFC 4880] are kept as `Private` (100 to
//! 110) or `Unknown`.
//!
//!   [RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// The public key algorithms, see [Section 9.1 of RFC 4880] and
/// [Section 5 of RFC 6637].
///
///   [Section 9.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.1
///   [Section 5 of RFC 6637]: https://tools.ietf.org/html/rfc6637
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum PublicKeyAlgorithm {
    /// RSA (Encrypt or Sign).
    RSAEncryptSign,
    /// RSA Encrypt-Only.
    RSAEncrypt,
    /// RSA Sign-Only.
    RSASign,
    /// Elgamal (Encrypt-Only).
    ElgamalEncrypt,
    /// DSA.
    DSA,
    /// Elliptic curve Diffie-Hellman.
    ECDH,
    /// Elliptic curve DSA.
    ECDSA,
    /// Elgamal (Encrypt or Sign).
    ElgamalEncryptSign,
    /// Diffie-Hellman (X9.42).
    DiffieHellman,
    /// Private or experimental algorithm (100 to 110).
    Private(u8),
    /// Unassigned algorithm.
    Unknown(u8),
}

impl From<u8> for PublicKeyAlgorithm {
    fn from(u: u8) -> Self {
        use self::PublicKeyAlgorithm::*;
        match u {
            1 => RSAEncryptSign,
            2 => RSAEncrypt,
            3 => RSASign,
            16 => ElgamalEncrypt,
            17 => DSA,
            18 => ECDH,
            19 => ECDSA,
            20 => ElgamalEncryptSign,
            21 => DiffieHellman,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<PublicKeyAlgorithm> for u8 {
    fn from(p: PublicKeyAlgorithm) -> u8 {
        use self::PublicKeyAlgorithm::*;
        match p {
            RSAEncryptSign => 1,
            RSAEncrypt => 2,
            RSASign => 3,
            ElgamalEncrypt => 16,
            DSA => 17,
            ECDH => 18,
            ECDSA => 19,
            ElgamalEncryptSign => 20,
            DiffieHellman => 21,
            Private(u) | Unknown(u) => u,
        }
    }
}

impl PublicKeyAlgorithm {
    /// Returns whether this is one of the RSA variants.
    pub fn is_rsa(self) -> bool {
        use self::PublicKeyAlgorithm::*;
        matches!(self, RSAEncryptSign | RSAEncrypt | RSASign)
    }

    /// Returns whether this is one of the Elgamal variants.
    pub fn is_elgamal(self) -> bool {
        use self::PublicKeyAlgorithm::*;
        matches!(self, ElgamalEncrypt | ElgamalEncryptSign)
    }

    /// Returns whether this is in the experimental range.
    pub fn is_experimental(self) -> bool {
        matches!(self, PublicKeyAlgorithm::Private(_))
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::PublicKeyAlgorithm::*;
        match *self {
            RSAEncryptSign => f.write_str("RSA (Encrypt or Sign)"),
            RSAEncrypt => f.write_str("RSA Encrypt-Only"),
            RSASign => f.write_str("RSA Sign-Only"),
            ElgamalEncrypt => f.write_str("Elgamal (Encrypt-Only)"),
            DSA => f.write_str("DSA"),
            ECDH => f.write_str("ECDH"),
            ECDSA => f.write_str("ECDSA"),
            ElgamalEncryptSign => f.write_str("Elgamal (Encrypt or Sign)"),
            DiffieHellman => f.write_str("Diffie-Hellman"),
            Private(u) =>
                write!(f, "Private/Experimental public key algorithm {}", u),
            Unknown(u) => write!(f, "Unknown public key algorithm {}", u),
        }
    }
}

#[cfg(test)]
impl Arbitrary for PublicKeyAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Symmetric ciphers, see [Section 9.2 of RFC 4880].
///
///   [Section 9.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.2
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum SymmetricAlgorithm {
    /// Plaintext or unencrypted data.
    Unencrypted,
    /// IDEA.
    IDEA,
    /// TripleDES (168 bit key derived from 192).
    TripleDES,
    /// CAST5.
    CAST5,
    /// Blowfish.
    Blowfish,
    /// SAFER-SK128.
    SaferSK,
    /// Reserved for DES/SK.
    DesSK,
    /// AES with 128-bit key.
    AES128,
    /// AES with 192-bit key.
    AES192,
    /// AES with 256-bit key.
    AES256,
    /// Twofish with 256-bit key.
    Twofish,
    /// Camellia with 128-bit key.
    Camellia128,
    /// Camellia with 192-bit key.
    Camellia192,
    /// Camellia with 256-bit key.
    Camellia256,
    /// Private or experimental algorithm (100 to 110).
    Private(u8),
    /// Unassigned algorithm.
    Unknown(u8),
}

impl From<u8> for SymmetricAlgorithm {
    fn from(u: u8) -> Self {
        use self::SymmetricAlgorithm::*;
        match u {
            0 => Unencrypted,
            1 => IDEA,
            2 => TripleDES,
            3 => CAST5,
            4 => Blowfish,
            5 => SaferSK,
            6 => DesSK,
            7 => AES128,
            8 => AES192,
            9 => AES256,
            10 => Twofish,
            11 => Camellia128,
            12 => Camellia192,
            13 => Camellia256,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<SymmetricAlgorithm> for u8 {
    fn from(s: SymmetricAlgorithm) -> u8 {
        use self::SymmetricAlgorithm::*;
        match s {
            Unencrypted => 0,
            IDEA => 1,
            TripleDES => 2,
            CAST5 => 3,
            Blowfish => 4,
            SaferSK => 5,
            DesSK => 6,
            AES128 => 7,
            AES192 => 8,
            AES256 => 9,
            Twofish => 10,
            Camellia128 => 11,
            Camellia192 => 12,
            Camellia256 => 13,
            Private(u) | Unknown(u) => u,
        }
    }
}

impl SymmetricAlgorithm {
    /// Returns the length of the IV that precedes encrypted secret
    /// key material.
    ///
    /// The 64-bit block ciphers have identifiers below 7 and use an
    /// eight octet IV; everything else uses sixteen octets.
    pub fn iv_size(self) -> usize {
        if u8::from(self) < 7 {
            8
        } else {
            16
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SymmetricAlgorithm::*;
        match *self {
            Unencrypted => f.write_str("Unencrypted"),
            IDEA => f.write_str("IDEA"),
            TripleDES => f.write_str("TripleDES"),
            CAST5 => f.write_str("CAST5"),
            Blowfish => f.write_str("Blowfish"),
            SaferSK => f.write_str("SAFER-SK128"),
            DesSK => f.write_str("DES/SK"),
            AES128 => f.write_str("AES with 128-bit key"),
            AES192 => f.write_str("AES with 192-bit key"),
            AES256 => f.write_str("AES with 256-bit key"),
            Twofish => f.write_str("Twofish"),
            Camellia128 => f.write_str("Camellia with 128-bit key"),
            Camellia192 => f.write_str("Camellia with 192-bit key"),
            Camellia256 => f.write_str("Camellia with 256-bit key"),
            Private(u) =>
                write!(f, "Private/Experimental symmetric algorithm {}", u),
            Unknown(u) => write!(f, "Unknown symmetric algorithm {}", u),
        }
    }
}

#[cfg(test)]
impl Arbitrary for SymmetricAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Compression algorithms, see [Section 9.3 of RFC 4880].
///
/// The codec only frames compressed data; it never inflates it.
///
///   [Section 9.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.3
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum CompressionAlgorithm {
    /// Null compression.
    Uncompressed,
    /// DEFLATE.
    Zip,
    /// ZLIB.
    Zlib,
    /// bzip2.
    BZip2,
    /// Private or experimental algorithm (100 to 110).
    Private(u8),
    /// Unassigned algorithm.
    Unknown(u8),
}

impl From<u8> for CompressionAlgorithm {
    fn from(u: u8) -> Self {
        use self::CompressionAlgorithm::*;
        match u {
            0 => Uncompressed,
            1 => Zip,
            2 => Zlib,
            3 => BZip2,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<CompressionAlgorithm> for u8 {
    fn from(c: CompressionAlgorithm) -> u8 {
        use self::CompressionAlgorithm::*;
        match c {
            Uncompressed => 0,
            Zip => 1,
            Zlib => 2,
            BZip2 => 3,
            Private(u) | Unknown(u) => u,
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::CompressionAlgorithm::*;
        match *self {
            Uncompressed => f.write_str("Uncompressed"),
            Zip => f.write_str("ZIP"),
            Zlib => f.write_str("ZLIB"),
            BZip2 => f.write_str("BZip2"),
            Private(u) =>
                write!(f, "Private/Experimental compression algorithm {}", u),
            Unknown(u) => write!(f, "Unknown compression algorithm {}", u),
        }
    }
}

#[cfg(test)]
impl Arbitrary for CompressionAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Hash algorithms, see [Section 9.4 of RFC 4880].
///
///   [Section 9.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-9.4
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum HashAlgorithm {
    /// MD5.
    MD5,
    /// SHA-1.
    SHA1,
    /// RIPEMD-160.
    RipeMD,
    /// Double-width SHA (reserved).
    DoubleSHA,
    /// MD2.
    MD2,
    /// TIGER/192.
    Tiger192,
    /// HAVAL (5 pass, 160-bit).
    Haval5_160,
    /// SHA-256.
    SHA256,
    /// SHA-384.
    SHA384,
    /// SHA-512.
    SHA512,
    /// SHA-224.
    SHA224,
    /// Private or experimental algorithm (100 to 110).
    Private(u8),
    /// Unassigned algorithm.
    Unknown(u8),
}

impl From<u8> for HashAlgorithm {
    fn from(u: u8) -> Self {
        use self::HashAlgorithm::*;
        match u {
            1 => MD5,
            2 => SHA1,
            3 => RipeMD,
            4 => DoubleSHA,
            5 => MD2,
            6 => Tiger192,
            7 => Haval5_160,
            8 => SHA256,
            9 => SHA384,
            10 => SHA512,
            11 => SHA224,
            100..=110 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<HashAlgorithm> for u8 {
    fn from(h: HashAlgorithm) -> u8 {
        use self::HashAlgorithm::*;
        match h {
            MD5 => 1,
            SHA1 => 2,
            RipeMD => 3,
            DoubleSHA => 4,
            MD2 => 5,
            Tiger192 => 6,
            Haval5_160 => 7,
            SHA256 => 8,
            SHA384 => 9,
            SHA512 => 10,
            SHA224 => 11,
            Private(u) | Unknown(u) => u,
        }
    }
}

impl HashAlgorithm {
    /// Returns the name used in the `Hash:` header of a cleartext
    /// signature, if the algorithm has one.
    pub fn armor_name(self) -> Option<&'static str> {
        use self::HashAlgorithm::*;
        match self {
            SHA1 => Some("SHA1"),
            SHA256 => Some("SHA256"),
            SHA384 => Some("SHA384"),
            SHA512 => Some("SHA512"),
            MD2 => Some("MD2"),
            MD5 => Some("MD5"),
            RipeMD => Some("RIPEMD160"),
            _ => None,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::HashAlgorithm::*;
        match *self {
            MD5 => f.write_str("MD5"),
            SHA1 => f.write_str("SHA1"),
            RipeMD => f.write_str("RIPEMD160"),
            DoubleSHA => f.write_str("double-width SHA"),
            MD2 => f.write_str("MD2"),
            Tiger192 => f.write_str("TIGER192"),
            Haval5_160 => f.write_str("HAVAL-5-160"),
            SHA256 => f.write_str("SHA256"),
            SHA384 => f.write_str("SHA384"),
            SHA512 => f.write_str("SHA512"),
            SHA224 => f.write_str("SHA224"),
            Private(u) =>
                write!(f, "Private/Experimental hash algorithm {}", u),
            Unknown(u) => write!(f, "Unknown hash algorithm {}", u),
        }
    }
}

#[cfg(test)]
impl Arbitrary for HashAlgorithm {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Signature types, see [Section 5.2.1 of RFC 4880].
///
///   [Section 5.2.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.1
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SignatureType {
    /// Signature over a binary document.
    Binary,
    /// Signature over a canonical text document.
    Text,
    /// Standalone signature.
    Standalone,
    /// Generic certification of a User ID and Public-Key packet.
    GenericCertification,
    /// Persona certification.
    PersonaCertification,
    /// Casual certification.
    CasualCertification,
    /// Positive certification.
    PositiveCertification,
    /// Subkey binding signature.
    SubkeyBinding,
    /// Primary key binding signature.
    PrimaryKeyBinding,
    /// Signature directly on a key.
    DirectKey,
    /// Key revocation signature.
    KeyRevocation,
    /// Subkey revocation signature.
    SubkeyRevocation,
    /// Certification revocation signature.
    CertificationRevocation,
    /// Timestamp signature.
    Timestamp,
    /// Third-party confirmation signature.
    Confirmation,
    /// Unassigned type.
    Unknown(u8),
}

impl From<u8> for SignatureType {
    fn from(u: u8) -> Self {
        use self::SignatureType::*;
        match u {
            0x00 => Binary,
            0x01 => Text,
            0x02 => Standalone,
            0x10 => GenericCertification,
            0x11 => PersonaCertification,
            0x12 => CasualCertification,
            0x13 => PositiveCertification,
            0x18 => SubkeyBinding,
            0x19 => PrimaryKeyBinding,
            0x1f => DirectKey,
            0x20 => KeyRevocation,
            0x28 => SubkeyRevocation,
            0x30 => CertificationRevocation,
            0x40 => Timestamp,
            0x50 => Confirmation,
            u => Unknown(u),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(t: SignatureType) -> u8 {
        use self::SignatureType::*;
        match t {
            Binary => 0x00,
            Text => 0x01,
            Standalone => 0x02,
            GenericCertification => 0x10,
            PersonaCertification => 0x11,
            CasualCertification => 0x12,
            PositiveCertification => 0x13,
            SubkeyBinding => 0x18,
            PrimaryKeyBinding => 0x19,
            DirectKey => 0x1f,
            KeyRevocation => 0x20,
            SubkeyRevocation => 0x28,
            CertificationRevocation => 0x30,
            Timestamp => 0x40,
            Confirmation => 0x50,
            Unknown(u) => u,
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SignatureType::Unknown(u) =>
                write!(f, "Unknown signature type 0x{:02x}", u),
            t => write!(f, "{:?}", t),
        }
    }
}

#[cfg(test)]
impl Arbitrary for SignatureType {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// Elliptic curves, identified on the wire by their OID (see [Section
/// 11 of RFC 6637]).
///
///   [Section 11 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-11
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Curve {
    /// NIST curve P-256.
    NistP256,
    /// NIST curve P-384.
    NistP384,
    /// NIST curve P-521.
    NistP521,
    /// brainpoolP256r1.
    BrainpoolP256,
    /// brainpoolP512r1.
    BrainpoolP512,
    /// Ed25519.
    Ed25519,
    /// Curve25519 for ECDH.
    Cv25519,
    /// Any other OID.
    Unknown(Box<[u8]>),
}

const NIST_P256_OID: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
const NIST_P384_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x22];
const NIST_P521_OID: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x23];
const BRAINPOOL_P256_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x07];
const BRAINPOOL_P512_OID: &[u8] =
    &[0x2B, 0x24, 0x03, 0x03, 0x02, 0x08, 0x01, 0x01, 0x0D];
const ED25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
const CV25519_OID: &[u8] =
    &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x97, 0x55, 0x01, 0x05, 0x01];

impl Curve {
    /// Maps an OID to a curve.
    pub fn from_oid(oid: &[u8]) -> Curve {
        match oid {
            NIST_P256_OID => Curve::NistP256,
            NIST_P384_OID => Curve::NistP384,
            NIST_P521_OID => Curve::NistP521,
            BRAINPOOL_P256_OID => Curve::BrainpoolP256,
            BRAINPOOL_P512_OID => Curve::BrainpoolP512,
            ED25519_OID => Curve::Ed25519,
            CV25519_OID => Curve::Cv25519,
            oid => Curve::Unknown(oid.to_vec().into_boxed_slice()),
        }
    }

    /// Returns the curve's OID.
    pub fn oid(&self) -> &[u8] {
        match self {
            Curve::NistP256 => NIST_P256_OID,
            Curve::NistP384 => NIST_P384_OID,
            Curve::NistP521 => NIST_P521_OID,
            Curve::BrainpoolP256 => BRAINPOOL_P256_OID,
            Curve::BrainpoolP512 => BRAINPOOL_P512_OID,
            Curve::Ed25519 => ED25519_OID,
            Curve::Cv25519 => CV25519_OID,
            Curve::Unknown(oid) => oid,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Curve::*;
        match self {
            NistP256 => f.write_str("NIST curve P-256"),
            NistP384 => f.write_str("NIST curve P-384"),
            NistP521 => f.write_str("NIST curve P-521"),
            BrainpoolP256 => f.write_str("brainpoolP256r1"),
            BrainpoolP512 => f.write_str("brainpoolP512r1"),
            Ed25519 => f.write_str("Ed25519"),
            Cv25519 => f.write_str("Curve25519"),
            Unknown(oid) => write!(f, "Unknown curve (OID: {:?})", oid),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Curve {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 8 {
            0 => Curve::NistP256,
            1 => Curve::NistP384,
            2 => Curve::NistP521,
            3 => Curve::BrainpoolP256,
            4 => Curve::BrainpoolP512,
            5 => Curve::Ed25519,
            6 => Curve::Cv25519,
            _ => {
                // An OID must fit behind a one octet length and
                // must not collide with the known ones.
                let mut oid = Vec::<u8>::arbitrary(g);
                oid.truncate(16);
                oid.insert(0, 0xff);
                Curve::Unknown(oid.into_boxed_slice())
            }
        }
    }
}
