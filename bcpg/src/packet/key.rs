//! Public and secret key packets.
//!
//! The four key packets share two layouts: public keys and public
//! subkeys hold a [`Key`], secret keys and secret subkeys hold a
//! [`SecretKey`] which embeds the public part.
//!
//! See [Section 5.5 of RFC 4880] for details.
//!
//!   [Section 5.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::constants::{PublicKeyAlgorithm, SymmetricAlgorithm};
use crate::mpis::{self, SecretKeyMaterial};
use crate::packet::{ContainedPacket, Tag};
use crate::parse::parse_secret_key_material;
use crate::serialize::Serialize;
use crate::{Error, Result, S2K};

/// The public part of a key.
///
/// Version 2 and 3 keys carry a validity period in days; version 4
/// keys express expiration through self-signatures instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    /// Packet version, 2 to 4.
    version: u8,
    /// Creation time in seconds since the epoch.
    creation_time: u32,
    /// Validity period in days, only for version 2 and 3 keys.
    valid_days: Option<u16>,
    /// Public key algorithm.
    pk_algo: PublicKeyAlgorithm,
    /// Public key material.
    mpis: mpis::PublicKey,
}

impl Key {
    /// Creates a new version 4 key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `mpis` doesn't fit
    /// `pk_algo`.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn new(creation_time: u32, pk_algo: PublicKeyAlgorithm,
               mpis: mpis::PublicKey) -> Result<Self> {
        Self::from_fields(4, creation_time, None, pk_algo, mpis)
    }

    /// Creates a new version 3 key.
    ///
    /// A `valid_days` of zero means the key doesn't expire.
    pub fn new_v3(creation_time: u32, valid_days: u16,
                  pk_algo: PublicKeyAlgorithm, mpis: mpis::PublicKey)
                  -> Result<Self> {
        Self::from_fields(3, creation_time, Some(valid_days), pk_algo, mpis)
    }

    pub(crate) fn from_fields(version: u8, creation_time: u32,
                              valid_days: Option<u16>,
                              pk_algo: PublicKeyAlgorithm,
                              mpis: mpis::PublicKey) -> Result<Self> {
        if ! mpis.matches(pk_algo) {
            return Err(Error::InvalidArgument(
                format!("Key material doesn't fit {}", pk_algo)).into());
        }
        if (version <= 3) != valid_days.is_some() {
            return Err(Error::InvalidArgument(
                format!("Version {} keys {} a validity period", version,
                        if version <= 3 { "need" } else { "don't have" }))
                .into());
        }
        Ok(Key { version, creation_time, valid_days, pk_algo, mpis })
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the creation time in seconds since the epoch.
    pub fn creation_time(&self) -> u32 {
        self.creation_time
    }

    /// Gets the validity period of version 2 and 3 keys, in days.
    pub fn valid_days(&self) -> Option<u16> {
        self.valid_days
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the key material.
    pub fn mpis(&self) -> &mpis::PublicKey {
        &self.mpis
    }

    /// Returns the encoding of the key material, or `None` if it can't
    /// be encoded.
    pub fn key_encoded(&self) -> Option<Vec<u8>> {
        self.mpis.encoded()
    }
}

impl ContainedPacket for Key {
    fn tag(&self) -> Tag {
        Tag::PublicKey
    }
}

#[cfg(test)]
impl Arbitrary for Key {
    fn arbitrary(g: &mut Gen) -> Self {
        let mpis = mpis::PublicKey::arbitrary(g);
        let pk_algo = match mpis {
            mpis::PublicKey::RSA { .. } => PublicKeyAlgorithm::RSAEncryptSign,
            mpis::PublicKey::DSA { .. } => PublicKeyAlgorithm::DSA,
            mpis::PublicKey::Elgamal { .. } =>
                PublicKeyAlgorithm::ElgamalEncrypt,
            mpis::PublicKey::ECDH { .. } => PublicKeyAlgorithm::ECDH,
            mpis::PublicKey::ECDSA { .. } => PublicKeyAlgorithm::ECDSA,
        };
        let creation_time = u32::arbitrary(g);
        let key = if bool::arbitrary(g) {
            Key::new(creation_time, pk_algo, mpis)
        } else {
            Key::new_v3(creation_time, u16::arbitrary(g), pk_algo, mpis)
        };
        key.expect("material matches algorithm")
    }
}

/// A secret key packet.
///
/// The secret key material is kept as an opaque blob, encrypted or
/// not, exactly as it appeared on the wire.  Use
/// [`SecretKey::plaintext_secret`] to decode unencrypted material.
///
/// [`SecretKey::plaintext_secret`]: #method.plaintext_secret
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    /// The public part.
    public: Key,
    /// Zero for unencrypted material, 254 or 255 if an S2K
    /// specifier follows, otherwise a symmetric algorithm.
    s2k_usage: u8,
    /// Algorithm protecting the secret material.
    sym_algo: SymmetricAlgorithm,
    /// Key derivation method, if any.
    s2k: Option<S2K>,
    /// IV of the encrypted material, if any.
    iv: Option<Vec<u8>>,
    /// The secret material, including any checksum.
    secret: Vec<u8>,
}

// Don't leak secrets through Debug.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("public", &self.public)
            .field("s2k_usage", &self.s2k_usage)
            .field("sym_algo", &self.sym_algo)
            .field("s2k", &self.s2k)
            .field("iv", &self.iv.as_ref()
                   .map(|iv| crate::conversions::to_hex(iv, false)))
            .field("secret", &format!("<{} bytes>", self.secret.len()))
            .finish()
    }
}

impl SecretKey {
    /// The material is protected with a two octet checksum.
    pub const USAGE_CHECKSUM: u8 = 0xff;
    /// The material is protected with a SHA-1 hash.
    pub const USAGE_SHA1: u8 = 0xfe;

    /// Creates a secret key packet holding unencrypted material.
    ///
    /// The material is encoded and followed by the two octet checksum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `secret` doesn't fit the
    /// public key's algorithm.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn new_plaintext(public: Key, secret: &SecretKeyMaterial)
                         -> Result<Self> {
        if ! secret.matches(public.pk_algo()) {
            return Err(Error::InvalidArgument(
                format!("Secret key material doesn't fit {}",
                        public.pk_algo())).into());
        }

        let mut blob = secret.to_vec()?;
        let checksum = checksum(&blob);
        blob.extend_from_slice(&checksum.to_be_bytes());

        Ok(SecretKey {
            public,
            s2k_usage: 0,
            sym_algo: SymmetricAlgorithm::Unencrypted,
            s2k: None,
            iv: None,
            secret: blob,
        })
    }

    /// Creates a secret key packet holding encrypted material.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `s2k_usage` is zero or
    /// the IV's length doesn't fit `sym_algo`.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn new_encrypted(public: Key, s2k_usage: u8,
                         sym_algo: SymmetricAlgorithm, s2k: S2K,
                         iv: Option<Vec<u8>>, secret: Vec<u8>)
                         -> Result<Self> {
        if s2k_usage != Self::USAGE_CHECKSUM && s2k_usage != Self::USAGE_SHA1 {
            return Err(Error::InvalidArgument(
                format!("S2K usage {} doesn't take an S2K", s2k_usage))
                .into());
        }
        let expected = if Self::has_iv(s2k_usage, Some(&s2k)) {
            Some(sym_algo.iv_size())
        } else {
            None
        };
        if iv.as_ref().map(|iv| iv.len()) != expected {
            return Err(Error::InvalidArgument(
                format!("Expected {} IV octets for {}",
                        expected.unwrap_or(0), sym_algo)).into());
        }
        Ok(Self::from_fields(public, s2k_usage, sym_algo, Some(s2k), iv,
                             secret))
    }

    pub(crate) fn from_fields(public: Key, s2k_usage: u8,
                              sym_algo: SymmetricAlgorithm,
                              s2k: Option<S2K>, iv: Option<Vec<u8>>,
                              secret: Vec<u8>) -> Self {
        SecretKey { public, s2k_usage, sym_algo, s2k, iv, secret }
    }

    /// Returns whether the secret material is preceded by an IV.
    ///
    /// Unencrypted keys and keys whose material was removed (GnuPG's
    /// no-private-key extension) have no IV.
    pub(crate) fn has_iv(s2k_usage: u8, s2k: Option<&S2K>) -> bool {
        s2k_usage != 0
            && ! s2k.map(|s| s.is_gnu_no_private_key()).unwrap_or(false)
    }

    /// Gets the public part.
    pub fn public(&self) -> &Key {
        &self.public
    }

    /// Gets the S2K usage octet.
    pub fn s2k_usage(&self) -> u8 {
        self.s2k_usage
    }

    /// Gets the symmetric algorithm protecting the secret material.
    pub fn sym_algo(&self) -> SymmetricAlgorithm {
        self.sym_algo
    }

    /// Gets the S2K specifier, if any.
    pub fn s2k(&self) -> Option<&S2K> {
        self.s2k.as_ref()
    }

    /// Gets the IV, if any.
    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    /// Gets the raw secret material.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Returns whether the secret material is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.s2k_usage != 0
    }

    /// Decodes unencrypted secret key material.
    ///
    /// A trailing two octet checksum is verified if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if the material is
    /// encrypted, and [`Error::InvalidKey`] if the checksum doesn't
    /// match.
    ///
    /// [`Error::InvalidOperation`]: ../enum.Error.html#variant.InvalidOperation
    /// [`Error::InvalidKey`]: ../enum.Error.html#variant.InvalidKey
    pub fn plaintext_secret(&self) -> Result<SecretKeyMaterial> {
        if self.is_encrypted() {
            return Err(Error::InvalidOperation(
                "secret key material is encrypted".into()).into());
        }

        let (material, rest) =
            parse_secret_key_material(self.public.pk_algo(), &self.secret)?;
        match rest.len() {
            0 => (),
            2 => {
                let expected = u16::from_be_bytes([rest[0], rest[1]]);
                let consumed = self.secret.len() - 2;
                if checksum(&self.secret[..consumed]) != expected {
                    return Err(Error::InvalidKey(
                        "secret key checksum mismatch".into()).into());
                }
            }
            n => return Err(Error::MalformedPacket(
                format!("{} trailing bytes after secret key material", n))
                            .into()),
        }
        Ok(material)
    }
}

/// The sum of all octets, modulo 65536.
fn checksum(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |sum, b| sum.wrapping_add(*b as u16))
}

impl ContainedPacket for SecretKey {
    /// Returns `Tag::SecretKey`, also for subkeys.
    fn tag(&self) -> Tag {
        Tag::SecretKey
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::HashAlgorithm;
    use crate::mpis::MPI;

    fn rsa_key() -> Key {
        Key::new(1_500_000_000, PublicKeyAlgorithm::RSAEncryptSign,
                 mpis::PublicKey::RSA {
                     e: MPI::from(17u32),
                     n: MPI::from(3233u32),
                 }).unwrap()
    }

    #[test]
    fn material_must_match() {
        assert!(Key::new(0, PublicKeyAlgorithm::DSA,
                         rsa_key().mpis().clone()).is_err());
        assert!(Key::from_fields(4, 0, Some(10),
                                 PublicKeyAlgorithm::RSASign,
                                 rsa_key().mpis().clone()).is_err());
        assert!(Key::from_fields(3, 0, None,
                                 PublicKeyAlgorithm::RSASign,
                                 rsa_key().mpis().clone()).is_err());
    }

    #[test]
    fn plaintext_secret() {
        let material = SecretKeyMaterial::rsa_from_primes(
            MPI::from(2753u32), MPI::from(61u32), MPI::from(53u32)).unwrap();
        let key = SecretKey::new_plaintext(rsa_key(), &material).unwrap();
        assert!(! key.is_encrypted());
        assert_eq!(key.iv(), None);
        assert_eq!(key.plaintext_secret().unwrap(), material);

        // Corrupt the checksum.
        let mut broken = key.clone();
        let last = broken.secret.len() - 1;
        broken.secret[last] ^= 1;
        assert!(broken.plaintext_secret().is_err());

        // Without the checksum.
        let mut bare = key.clone();
        bare.secret.truncate(bare.secret.len() - 2);
        assert_eq!(bare.plaintext_secret().unwrap(), material);
    }

    #[test]
    fn subkey_tags() {
        use crate::Packet;
        use crate::parse::PacketReader;

        let material = SecretKeyMaterial::rsa_from_primes(
            MPI::from(2753u32), MPI::from(61u32), MPI::from(53u32)).unwrap();
        let key = SecretKey::new_plaintext(rsa_key(), &material).unwrap();

        // The body alone is written as a primary key.
        let mut buf = Vec::new();
        key.serialize_packet(&mut buf, true).unwrap();
        assert_eq!(buf[0], 0xC0 | 5);
        let mut buf = Vec::new();
        rsa_key().serialize_packet(&mut buf, true).unwrap();
        assert_eq!(buf[0], 0xC0 | 6);

        // The packet carries the subkey tags.
        let mut buf = Vec::new();
        Packet::SecretSubkey(key.clone()).serialize_packet(&mut buf, true)
            .unwrap();
        assert_eq!(buf[0], 0xC0 | 7);
        Packet::PublicSubkey(rsa_key()).serialize_packet(&mut buf, true)
            .unwrap();

        let mut reader = PacketReader::from_bytes(&buf);
        assert_eq!(reader.read_packet().unwrap(),
                   Some(Packet::SecretSubkey(key)));
        assert_eq!(reader.read_packet().unwrap(),
                   Some(Packet::PublicSubkey(rsa_key())));
        assert!(reader.read_packet().unwrap().is_none());
    }

    #[test]
    fn encrypted() {
        let s2k = S2K::Iterated {
            hash: HashAlgorithm::SHA256,
            salt: [1; 8],
            coded_count: 0x60,
        };
        let key = SecretKey::new_encrypted(
            rsa_key(), SecretKey::USAGE_SHA1, SymmetricAlgorithm::AES128,
            s2k, Some(vec![0; 16]), vec![1, 2, 3]).unwrap();
        assert!(key.is_encrypted());
        assert!(key.plaintext_secret().is_err());

        // Wrong IV size.
        assert!(SecretKey::new_encrypted(
            rsa_key(), SecretKey::USAGE_SHA1, SymmetricAlgorithm::CAST5,
            s2k, Some(vec![0; 16]), vec![1, 2, 3]).is_err());

        // No IV for keys without secret material.
        let dummy = S2K::GnuDummy {
            hash: HashAlgorithm::SHA1,
            protection_mode: S2K::GNU_PROTECTION_MODE_NO_PRIVATE_KEY,
        };
        assert!(SecretKey::new_encrypted(
            rsa_key(), SecretKey::USAGE_CHECKSUM, SymmetricAlgorithm::CAST5,
            dummy, None, vec![]).is_ok());
        assert!(SecretKey::new_encrypted(
            rsa_key(), SecretKey::USAGE_CHECKSUM, SymmetricAlgorithm::CAST5,
            dummy, Some(vec![0; 8]), vec![]).is_err());
    }
}
