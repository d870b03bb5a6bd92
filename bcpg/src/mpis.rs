//! Multi-precision integers and the algorithm specific values built
//! from them.
//!
//! An MPI is encoded as a two octet bit count followed by the
//! big-endian magnitude (see [Section 3.2 of RFC 4880]).  Public keys,
//! secret keys, signatures and encrypted session keys are sequences of
//! MPIs whose shape depends on the public key algorithm.
//!
//!   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2

use std::fmt;

use num_bigint_dig::{BigInt, BigUint, ModInverse, Sign};
#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::constants::{
    Curve,
    HashAlgorithm,
    PublicKeyAlgorithm,
    SymmetricAlgorithm,
};
use crate::serialize::Serialize;
use crate::{Error, Result};

/// A multi-precision integer.
///
/// The value is never negative.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MPI {
    value: BigUint,
}

impl From<BigUint> for MPI {
    fn from(value: BigUint) -> Self {
        MPI { value }
    }
}

impl From<u32> for MPI {
    fn from(value: u32) -> Self {
        MPI { value: BigUint::from(value) }
    }
}

impl MPI {
    /// Creates an MPI from a signed integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is negative.
    ///
    /// [`Error::InvalidArgument`]: ../enum.Error.html#variant.InvalidArgument
    pub fn new(value: &BigInt) -> Result<Self> {
        match value.to_bytes_be() {
            (Sign::Minus, _) => Err(Error::InvalidArgument(
                "An MPI can't hold a negative value".into()).into()),
            (_, magnitude) => Ok(Self::from_magnitude(&magnitude)),
        }
    }

    /// Creates an MPI from a big-endian magnitude.
    ///
    /// Leading zeros are ignored.
    pub fn from_magnitude(be: &[u8]) -> Self {
        MPI { value: BigUint::from_bytes_be(be) }
    }

    /// Returns the value.
    pub fn value(&self) -> &BigUint {
        &self.value
    }

    /// Returns the value, consuming the MPI.
    pub fn into_value(self) -> BigUint {
        self.value
    }

    /// Returns the number of significant bits.
    pub fn bits(&self) -> usize {
        self.value.bits() as usize
    }

    /// Returns the big-endian magnitude without leading zeros.
    ///
    /// Zero has an empty magnitude.
    pub fn value_bytes(&self) -> Vec<u8> {
        if self.bits() == 0 {
            Vec::new()
        } else {
            self.value.to_bytes_be()
        }
    }

    /// Returns the length of the wire encoding.
    pub fn serialized_len(&self) -> usize {
        2 + (self.bits() + 7) / 8
    }
}

impl fmt::Debug for MPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} bits: {:x}", self.bits(), self.value)
    }
}

#[cfg(test)]
impl Arbitrary for MPI {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut bytes = Vec::<u8>::arbitrary(g);
        bytes.truncate(64);
        MPI::from_magnitude(&bytes)
    }
}

/// Public key material.
///
/// The variant is selected by the key's public key algorithm: the
/// three RSA algorithms share `RSA`, the two Elgamal algorithms share
/// `Elgamal`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PublicKey {
    /// RSA public key.
    RSA {
        /// Public exponent.
        e: MPI,
        /// Public modulus.
        n: MPI,
    },
    /// DSA public key.
    DSA {
        /// Prime of the group.
        p: MPI,
        /// Order of the subgroup.
        q: MPI,
        /// Generator.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },
    /// Elgamal public key.
    Elgamal {
        /// Prime of the group.
        p: MPI,
        /// Generator.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },
    /// ECDH public key.
    ECDH {
        /// Curve.
        curve: Curve,
        /// Public point.
        q: MPI,
        /// KDF hash algorithm.
        hash: HashAlgorithm,
        /// Key wrapping algorithm.
        sym: SymmetricAlgorithm,
    },
    /// ECDSA public key.
    ECDSA {
        /// Curve.
        curve: Curve,
        /// Public point.
        q: MPI,
    },
}

impl PublicKey {
    /// Returns whether this material belongs to keys of algorithm
    /// `algo`.
    pub fn matches(&self, algo: PublicKeyAlgorithm) -> bool {
        match self {
            PublicKey::RSA { .. } => algo.is_rsa(),
            PublicKey::DSA { .. } => algo == PublicKeyAlgorithm::DSA,
            PublicKey::Elgamal { .. } => algo.is_elgamal(),
            PublicKey::ECDH { .. } => algo == PublicKeyAlgorithm::ECDH,
            PublicKey::ECDSA { .. } => algo == PublicKeyAlgorithm::ECDSA,
        }
    }

    /// Returns the key size in bits, if that is meaningful.
    pub fn bits(&self) -> Option<usize> {
        match self {
            PublicKey::RSA { n, .. } => Some(n.bits()),
            PublicKey::DSA { p, .. } => Some(p.bits()),
            PublicKey::Elgamal { p, .. } => Some(p.bits()),
            PublicKey::ECDH { .. } | PublicKey::ECDSA { .. } => None,
        }
    }

    /// Returns the wire encoding, or `None` if it can't be encoded.
    pub fn encoded(&self) -> Option<Vec<u8>> {
        self.to_vec().ok()
    }
}

#[cfg(test)]
impl Arbitrary for PublicKey {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 5 {
            0 => PublicKey::RSA {
                e: MPI::arbitrary(g),
                n: MPI::arbitrary(g),
            },
            1 => PublicKey::DSA {
                p: MPI::arbitrary(g),
                q: MPI::arbitrary(g),
                g: MPI::arbitrary(g),
                y: MPI::arbitrary(g),
            },
            2 => PublicKey::Elgamal {
                p: MPI::arbitrary(g),
                g: MPI::arbitrary(g),
                y: MPI::arbitrary(g),
            },
            3 => PublicKey::ECDH {
                curve: Curve::arbitrary(g),
                q: MPI::arbitrary(g),
                hash: HashAlgorithm::arbitrary(g),
                sym: SymmetricAlgorithm::arbitrary(g),
            },
            _ => PublicKey::ECDSA {
                curve: Curve::arbitrary(g),
                q: MPI::arbitrary(g),
            },
        }
    }
}

/// Secret key material, as stored in an unencrypted secret key
/// packet.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SecretKeyMaterial {
    /// RSA secret key.
    RSA {
        /// Secret exponent.
        d: MPI,
        /// Smaller secret prime.
        p: MPI,
        /// Larger secret prime.
        q: MPI,
        /// Inverse of p mod q.
        u: MPI,
    },
    /// DSA secret key.
    DSA {
        /// Secret exponent.
        x: MPI,
    },
    /// Elgamal secret key.
    Elgamal {
        /// Secret exponent.
        x: MPI,
    },
    /// ECDH secret key.
    ECDH {
        /// Secret scalar.
        scalar: MPI,
    },
    /// ECDSA secret key.
    ECDSA {
        /// Secret scalar.
        scalar: MPI,
    },
}

// Don't leak secrets through Debug.
impl fmt::Debug for SecretKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SecretKeyMaterial::RSA { .. } => "RSA",
            SecretKeyMaterial::DSA { .. } => "DSA",
            SecretKeyMaterial::Elgamal { .. } => "Elgamal",
            SecretKeyMaterial::ECDH { .. } => "ECDH",
            SecretKeyMaterial::ECDSA { .. } => "ECDSA",
        };
        write!(f, "SecretKeyMaterial::{} {{ <redacted> }}", name)
    }
}

/// Converts a possibly negative residue into its canonical
/// representative in `[0, m)`.
fn canonical(v: BigInt, m: &BigUint) -> BigUint {
    match v.to_bytes_be() {
        (Sign::Minus, magnitude) => {
            let magnitude = BigUint::from_bytes_be(&magnitude) % m;
            if magnitude.bits() == 0 {
                magnitude
            } else {
                m - magnitude
            }
        }
        (_, magnitude) => BigUint::from_bytes_be(&magnitude),
    }
}

impl SecretKeyMaterial {
    /// Creates RSA secret key material from the secret exponent and
    /// the two primes.
    ///
    /// The primes are ordered so that p < q, and u = p^-1 mod q is
    /// derived.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if p and q are equal or p has no
    /// inverse modulo q.
    ///
    /// [`Error::InvalidKey`]: ../enum.Error.html#variant.InvalidKey
    pub fn rsa_from_primes(d: MPI, p: MPI, q: MPI) -> Result<Self> {
        if p == q {
            return Err(Error::InvalidKey(
                "p and q cannot be equal".into()).into());
        }
        let (p, q) = if p > q { (q, p) } else { (p, q) };

        let u = p.value().clone().mod_inverse(q.value())
            .ok_or_else(|| Error::InvalidKey(
                "p has no inverse mod q".into()))?;
        let u = canonical(u, q.value());

        Ok(SecretKeyMaterial::RSA { d, p, q, u: u.into() })
    }

    /// Returns whether this material belongs to keys of algorithm
    /// `algo`.
    pub fn matches(&self, algo: PublicKeyAlgorithm) -> bool {
        match self {
            SecretKeyMaterial::RSA { .. } => algo.is_rsa(),
            SecretKeyMaterial::DSA { .. } => algo == PublicKeyAlgorithm::DSA,
            SecretKeyMaterial::Elgamal { .. } => algo.is_elgamal(),
            SecretKeyMaterial::ECDH { .. } =>
                algo == PublicKeyAlgorithm::ECDH,
            SecretKeyMaterial::ECDSA { .. } =>
                algo == PublicKeyAlgorithm::ECDSA,
        }
    }

    /// Returns d mod (p - 1), for RSA keys.
    pub fn prime_exponent_p(&self) -> Option<BigUint> {
        match self {
            SecretKeyMaterial::RSA { d, p, .. } =>
                Self::prime_exponent(d.value(), p.value()),
            _ => None,
        }
    }

    /// Returns d mod (q - 1), for RSA keys.
    pub fn prime_exponent_q(&self) -> Option<BigUint> {
        match self {
            SecretKeyMaterial::RSA { d, q, .. } =>
                Self::prime_exponent(d.value(), q.value()),
            _ => None,
        }
    }

    fn prime_exponent(d: &BigUint, prime: &BigUint) -> Option<BigUint> {
        let one = BigUint::from(1u32);
        if prime <= &one {
            return None;
        }
        Some(d % (prime - &one))
    }

    /// Returns q^-1 mod p, for RSA keys.
    pub fn crt_coefficient(&self) -> Option<BigUint> {
        match self {
            SecretKeyMaterial::RSA { p, q, .. } => {
                if p.bits() == 0 {
                    return None;
                }
                q.value().clone().mod_inverse(p.value())
                    .map(|c| canonical(c, p.value()))
            }
            _ => None,
        }
    }

    /// Returns the wire encoding, or `None` if it can't be encoded.
    pub fn encoded(&self) -> Option<Vec<u8>> {
        self.to_vec().ok()
    }
}

/// Signature values.
///
/// Signatures made with known algorithms hold their MPIs: one for
/// RSA, two for DSA and ECDSA, three for Elgamal.  Signatures made
/// with an experimental algorithm are kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Signature {
    /// The signature MPIs.
    MPIs(Vec<MPI>),
    /// The raw encoding of an experimental algorithm's signature.
    Opaque(Vec<u8>),
}

impl Signature {
    /// Returns how many MPIs a signature made with `algo` holds.
    ///
    /// Returns `None` for experimental algorithms, whose signatures
    /// are opaque.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPublicKeyAlgorithm`] for algorithms
    /// that can't sign.
    ///
    /// [`Error::UnsupportedPublicKeyAlgorithm`]: ../enum.Error.html#variant.UnsupportedPublicKeyAlgorithm
    pub fn mpi_count(algo: PublicKeyAlgorithm) -> Result<Option<usize>> {
        use crate::constants::PublicKeyAlgorithm::*;
        match algo {
            RSAEncryptSign | RSASign => Ok(Some(1)),
            DSA | ECDSA => Ok(Some(2)),
            ElgamalEncrypt | ElgamalEncryptSign => Ok(Some(3)),
            Private(_) => Ok(None),
            _ => Err(Error::UnsupportedPublicKeyAlgorithm(algo).into()),
        }
    }

    /// Returns whether this value fits signatures made with `algo`.
    pub fn matches(&self, algo: PublicKeyAlgorithm) -> bool {
        match (self, Self::mpi_count(algo)) {
            (Signature::MPIs(mpis), Ok(Some(n))) => mpis.len() == n,
            (Signature::Opaque(_), Ok(None)) => true,
            _ => false,
        }
    }

    /// Returns the wire encoding, or `None` if it can't be encoded.
    pub fn encoded(&self) -> Option<Vec<u8>> {
        self.to_vec().ok()
    }
}

/// Encrypted session key values.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Ciphertext {
    /// RSA ciphertext.
    RSA {
        /// m^e mod n.
        c: MPI,
    },
    /// Elgamal ciphertext.
    Elgamal {
        /// Ephemeral key.
        e: MPI,
        /// Ciphertext.
        c: MPI,
    },
    /// ECDH ciphertext, kept verbatim.
    ECDH {
        /// Ephemeral point and wrapped session key.
        data: Vec<u8>,
    },
}

impl Ciphertext {
    /// Returns whether this value fits session keys encrypted with
    /// `algo`.
    pub fn matches(&self, algo: PublicKeyAlgorithm) -> bool {
        match self {
            Ciphertext::RSA { .. } =>
                algo == PublicKeyAlgorithm::RSAEncryptSign
                || algo == PublicKeyAlgorithm::RSAEncrypt,
            Ciphertext::Elgamal { .. } => algo.is_elgamal(),
            Ciphertext::ECDH { .. } => algo == PublicKeyAlgorithm::ECDH,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::Parse;

    quickcheck! {
        fn mpi_roundtrip(mpi: MPI) -> bool {
            let buf = mpi.to_vec().unwrap();
            assert_eq!(buf.len(), mpi.serialized_len());
            assert_eq!(((buf[0] as usize) << 8) | buf[1] as usize,
                       mpi.bits());
            assert_eq!(buf.len() - 2, (mpi.bits() + 7) / 8);
            MPI::from_bytes(&buf).unwrap() == mpi
        }
    }

    #[test]
    fn zero() {
        let zero = MPI::from(0u32);
        assert_eq!(zero.bits(), 0);
        assert!(zero.value_bytes().is_empty());
        assert_eq!(zero.to_vec().unwrap(), vec![0, 0]);
        assert_eq!(MPI::from_bytes(&[0, 0][..]).unwrap(), zero);
    }

    #[test]
    fn leading_zeros() {
        let mpi = MPI::from_magnitude(&[0, 0, 1, 0]);
        assert_eq!(mpi.bits(), 9);
        assert_eq!(mpi.value_bytes(), vec![1, 0]);
        assert_eq!(mpi.to_vec().unwrap(), vec![0, 9, 1, 0]);
    }

    #[test]
    fn negative() {
        let v = BigInt::from_bytes_be(Sign::Minus, &[1, 2, 3]);
        assert!(MPI::new(&v).is_err());
        let v = BigInt::from_bytes_be(Sign::Plus, &[1, 2, 3]);
        assert_eq!(MPI::new(&v).unwrap(), MPI::from_magnitude(&[1, 2, 3]));
    }

    #[test]
    fn rsa_crt() {
        // p = 61, q = 53, e = 17, d = 2753.
        let d = MPI::from(2753u32);
        let k = SecretKeyMaterial::rsa_from_primes(
            d.clone(), MPI::from(61u32), MPI::from(53u32)).unwrap();

        match &k {
            SecretKeyMaterial::RSA { p, q, u, .. } => {
                // Primes are reordered so that p < q.
                assert_eq!(p, &MPI::from(53u32));
                assert_eq!(q, &MPI::from(61u32));
                // 53 * 38 = 2014 = 33 * 61 + 1.
                assert_eq!(u, &MPI::from(38u32));
            }
            _ => panic!("expected RSA material"),
        }

        // 2753 mod 52 = 49, 2753 mod 60 = 53.
        assert_eq!(k.prime_exponent_p(), Some(BigUint::from(49u32)));
        assert_eq!(k.prime_exponent_q(), Some(BigUint::from(53u32)));
        // 61 * 20 = 1220 = 23 * 53 + 1.
        assert_eq!(k.crt_coefficient(), Some(BigUint::from(20u32)));

        assert!(SecretKeyMaterial::rsa_from_primes(
            d, MPI::from(61u32), MPI::from(61u32)).is_err());
    }

    #[test]
    fn signature_shapes() {
        use crate::constants::PublicKeyAlgorithm::*;
        assert_eq!(Signature::mpi_count(RSASign).unwrap(), Some(1));
        assert_eq!(Signature::mpi_count(ECDSA).unwrap(), Some(2));
        assert_eq!(Signature::mpi_count(ElgamalEncryptSign).unwrap(), Some(3));
        assert_eq!(Signature::mpi_count(Private(105)).unwrap(), None);
        assert!(Signature::mpi_count(ECDH).is_err());

        assert!(Signature::MPIs(vec![MPI::from(1u32)]).matches(RSAEncryptSign));
        assert!(! Signature::MPIs(vec![MPI::from(1u32)]).matches(DSA));
        assert!(Signature::Opaque(vec![1, 2, 3]).matches(Private(100)));
    }

    quickcheck! {
        fn public_key_encoded(k: PublicKey) -> bool {
            k.encoded().is_some()
        }
    }
}
