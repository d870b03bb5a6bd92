//! Functions for parsing key material and other algorithm specific
//! values.

use std::io::Read;

use crate::constants::{
    Curve,
    HashAlgorithm,
    PublicKeyAlgorithm,
    SymmetricAlgorithm,
};
use crate::mpis::{self, MPI};
use crate::parse::ReadFields;
use crate::{Error, Result};

// Reads a length-prefixed curve OID.
fn parse_curve<R: Read>(r: &mut R) -> Result<Curve> {
    let curve_len = r.parse_u8("curve_len")?;
    if curve_len == 0 || curve_len == 0xff {
        return Err(Error::MalformedPacket(
            format!("Invalid curve OID length: {}", curve_len)).into());
    }
    let oid = r.parse_bytes("curve", curve_len as usize)?;
    Ok(Curve::from_oid(&oid))
}

impl mpis::PublicKey {
    /// Parses a set of OpenPGP MPIs representing a public key.
    ///
    /// See [Section 5.5.2 of RFC 4880] and [Section 9 of RFC 6637]
    /// for details.
    ///
    ///   [Section 5.5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2
    ///   [Section 9 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-9
    pub(crate) fn parse<R: Read>(algo: PublicKeyAlgorithm, r: &mut R)
                                 -> Result<Self>
    {
        use crate::constants::PublicKeyAlgorithm::*;

        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign => {
                let n = MPI::parse("rsa_public_n", r)?;
                let e = MPI::parse("rsa_public_e", r)?;

                Ok(mpis::PublicKey::RSA { e, n })
            }

            DSA => {
                let p = MPI::parse("dsa_public_p", r)?;
                let q = MPI::parse("dsa_public_q", r)?;
                let g = MPI::parse("dsa_public_g", r)?;
                let y = MPI::parse("dsa_public_y", r)?;

                Ok(mpis::PublicKey::DSA { p, q, g, y })
            }

            ElgamalEncrypt | ElgamalEncryptSign => {
                let p = MPI::parse("elgamal_public_p", r)?;
                let g = MPI::parse("elgamal_public_g", r)?;
                let y = MPI::parse("elgamal_public_y", r)?;

                Ok(mpis::PublicKey::Elgamal { p, g, y })
            }

            ECDSA => {
                let curve = parse_curve(r)?;
                let q = MPI::parse("ecdsa_public", r)?;

                Ok(mpis::PublicKey::ECDSA { curve, q })
            }

            ECDH => {
                let curve = parse_curve(r)?;
                let q = MPI::parse("ecdh_public", r)?;
                let kdf_len = r.parse_u8("kdf_len")?;

                if kdf_len != 3 {
                    return Err(Error::MalformedPacket(
                        format!("wrong kdf length: {}", kdf_len)).into());
                }

                let _reserved = r.parse_u8("kdf_reserved")?;
                let hash: HashAlgorithm = r.parse_u8("kdf_hash")?.into();
                let sym: SymmetricAlgorithm = r.parse_u8("kek_symm")?.into();

                Ok(mpis::PublicKey::ECDH { curve, q, hash, sym })
            }

            algo => Err(Error::UnsupportedPublicKeyAlgorithm(algo).into()),
        }
    }
}

impl mpis::SecretKeyMaterial {
    /// Parses unencrypted secret key material.
    ///
    /// See [Section 5.5.3 of RFC 4880] for details.
    ///
    ///   [Section 5.5.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.3
    pub(crate) fn parse<R: Read>(algo: PublicKeyAlgorithm, r: &mut R)
                                 -> Result<Self>
    {
        use crate::constants::PublicKeyAlgorithm::*;

        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign => {
                let d = MPI::parse("rsa_secret_d", r)?;
                let p = MPI::parse("rsa_secret_p", r)?;
                let q = MPI::parse("rsa_secret_q", r)?;
                let u = MPI::parse("rsa_secret_u", r)?;

                Ok(mpis::SecretKeyMaterial::RSA { d, p, q, u })
            }

            DSA => Ok(mpis::SecretKeyMaterial::DSA {
                x: MPI::parse("dsa_secret", r)?,
            }),

            ElgamalEncrypt | ElgamalEncryptSign =>
                Ok(mpis::SecretKeyMaterial::Elgamal {
                    x: MPI::parse("elgamal_secret", r)?,
                }),

            ECDH => Ok(mpis::SecretKeyMaterial::ECDH {
                scalar: MPI::parse("ecdh_secret", r)?,
            }),

            ECDSA => Ok(mpis::SecretKeyMaterial::ECDSA {
                scalar: MPI::parse("ecdsa_secret", r)?,
            }),

            algo => Err(Error::UnsupportedPublicKeyAlgorithm(algo).into()),
        }
    }
}

impl mpis::Signature {
    /// Parses the values of a signature made with `algo`.
    ///
    /// Signatures made with experimental algorithms are kept
    /// verbatim.
    pub(crate) fn parse<R: Read>(algo: PublicKeyAlgorithm, r: &mut R)
                                 -> Result<Self>
    {
        match mpis::Signature::mpi_count(algo)? {
            Some(n) => {
                let mut mpis = Vec::with_capacity(n);
                for _ in 0..n {
                    mpis.push(MPI::parse("signature_value", r)?);
                }
                Ok(mpis::Signature::MPIs(mpis))
            }
            None => Ok(mpis::Signature::Opaque(
                r.parse_bytes_eof("signature_value")?)),
        }
    }
}

impl mpis::Ciphertext {
    /// Parses an encrypted session key.
    ///
    /// See [Section 5.1 of RFC 4880] for details.
    ///
    ///   [Section 5.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.1
    pub(crate) fn parse<R: Read>(algo: PublicKeyAlgorithm, r: &mut R)
                                 -> Result<Self>
    {
        use crate::constants::PublicKeyAlgorithm::*;

        match algo {
            RSAEncryptSign | RSAEncrypt => Ok(mpis::Ciphertext::RSA {
                c: MPI::parse("rsa_ciphertxt", r)?,
            }),

            ElgamalEncrypt | ElgamalEncryptSign => {
                let e = MPI::parse("elgamal_e", r)?;
                let c = MPI::parse("elgamal_c", r)?;

                Ok(mpis::Ciphertext::Elgamal { e, c })
            }

            ECDH => Ok(mpis::Ciphertext::ECDH {
                data: r.parse_bytes_eof("ecdh_esk")?,
            }),

            algo => Err(Error::UnsupportedPublicKeyAlgorithm(algo).into()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    use crate::serialize::Serialize;

    quickcheck! {
        fn public_key_roundtrip(mpis: mpis::PublicKey) -> bool {
            let algo = match mpis {
                mpis::PublicKey::RSA { .. } => PublicKeyAlgorithm::RSASign,
                mpis::PublicKey::DSA { .. } => PublicKeyAlgorithm::DSA,
                mpis::PublicKey::Elgamal { .. } =>
                    PublicKeyAlgorithm::ElgamalEncrypt,
                mpis::PublicKey::ECDH { .. } => PublicKeyAlgorithm::ECDH,
                mpis::PublicKey::ECDSA { .. } => PublicKeyAlgorithm::ECDSA,
            };
            match mpis.encoded() {
                // Curves with an unencodable OID.
                None => true,
                Some(buf) => mpis::PublicKey::parse(
                    algo, &mut Cursor::new(&buf)).unwrap() == mpis,
            }
        }
    }

    #[test]
    fn ecdh_kdf_length() {
        let mpis = mpis::PublicKey::ECDH {
            curve: Curve::Cv25519,
            q: MPI::from(0x40u32),
            hash: HashAlgorithm::SHA256,
            sym: SymmetricAlgorithm::AES128,
        };
        let mut buf = mpis.to_vec().unwrap();
        let kdf = buf.len() - 4;
        assert_eq!(buf[kdf], 3);

        buf[kdf] = 4;
        let e = mpis::PublicKey::parse(PublicKeyAlgorithm::ECDH,
                                       &mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(),
                         Some(Error::MalformedPacket(_))));
    }

    #[test]
    fn signature_values() {
        let buf = [0, 1, 1, 0, 2, 3];
        let sig = mpis::Signature::parse(PublicKeyAlgorithm::DSA,
                                         &mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(sig, mpis::Signature::MPIs(
            vec![MPI::from(1u32), MPI::from(3u32)]));

        let sig = mpis::Signature::parse(PublicKeyAlgorithm::Private(100),
                                         &mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(sig, mpis::Signature::Opaque(buf.to_vec()));

        // Not enough values.
        assert!(mpis::Signature::parse(PublicKeyAlgorithm::ElgamalEncryptSign,
                                       &mut Cursor::new(&buf[..])).is_err());
    }

    #[test]
    fn ciphertext() {
        let buf = [0, 2, 3];
        assert_eq!(mpis::Ciphertext::parse(PublicKeyAlgorithm::RSAEncrypt,
                                           &mut Cursor::new(&buf[..]))
                   .unwrap(),
                   mpis::Ciphertext::RSA { c: MPI::from(3u32) });
        assert_eq!(mpis::Ciphertext::parse(PublicKeyAlgorithm::ECDH,
                                           &mut Cursor::new(&buf[..]))
                   .unwrap(),
                   mpis::Ciphertext::ECDH { data: buf.to_vec() });

        let e = mpis::Ciphertext::parse(PublicKeyAlgorithm::DSA,
                                        &mut Cursor::new(&buf[..]))
            .unwrap_err();
        assert_eq!(e.downcast_ref::<Error>(),
                   Some(&Error::UnsupportedPublicKeyAlgorithm(
                       PublicKeyAlgorithm::DSA)));
    }
}
