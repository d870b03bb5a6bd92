use std::io::{self, Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quickcheck_macros::quickcheck;
use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;

use bcpg::Error;
use bcpg::armor::{Crc24, Kind, Reader, Writer};
use bcpg::constants::HashAlgorithm;
use bcpg::packet::UserID;
use bcpg::serialize::write_packet;
use bcpg::{PacketReader, Packet, Tag};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn enarmor(data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut w = Writer::new(&mut buf);
        w.write_all(data).unwrap();
        w.finalize().unwrap();
        // Finalized writers refuse more data.
        assert_eq!(w.write(b"x").unwrap_err().kind(),
                   io::ErrorKind::BrokenPipe);
    }
    buf
}

fn dearmor(armored: &[u8]) -> io::Result<Vec<u8>> {
    let mut r = Reader::new(armored);
    let mut data = Vec::new();
    r.read_to_end(&mut data)?;
    Ok(data)
}

#[test]
fn crc24_vector() {
    assert_eq!(Crc24::new().value(), 0xB704CE);

    let mut crc = Crc24::new();
    crc.update(b"Hello world!");
    assert_eq!(crc.to_bytes(), [0xb3, 0x81, 0xae]);

    let mut bytewise = Crc24::new();
    for b in b"Hello world!" {
        bytewise.update_byte(*b);
    }
    assert_eq!(bytewise, crc);
}

#[test]
fn roundtrip_lengths() {
    init();
    for &len in &[0, 1, 2, 3, 4, 100, 1000] {
        let mut data = vec![0u8; len];
        StdRng::seed_from_u64(len as u64).fill_bytes(&mut data);
        // Keep the kind stable regardless of the first octet.
        if len > 0 {
            data[0] = 0xC0 | 11;
        }

        let armored = enarmor(&data);
        assert_eq!(dearmor(&armored).unwrap(), data, "length {}", len);

        if len == 0 {
            assert!(armored.is_empty());
            continue;
        }

        let text = String::from_utf8(armored).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-----BEGIN PGP MESSAGE-----");
        assert!(lines[1].starts_with("Version: bcpg"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[lines.len() - 1], "-----END PGP MESSAGE-----");

        let crc_line = lines[lines.len() - 2];
        let mut crc = Crc24::new();
        crc.update(&data);
        assert_eq!(crc_line, format!("={}", STANDARD.encode(crc.to_bytes())));

        for line in &lines[3..lines.len() - 2] {
            assert!(line.len() <= 64, "line too long: {}", line);
        }
    }
}

#[test]
fn checksum_after_full_line() {
    // 48 octets fill exactly one line, 96 exactly two.  The checksum
    // line follows the last full line directly; no empty line is
    // written in between.
    for &len in &[48, 96] {
        let mut data = vec![0x5a; len];
        data[0] = 0xC0 | 11;
        let text = String::from_utf8(enarmor(&data)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let body = &lines[3..lines.len() - 2];
        assert_eq!(body.len(), len / 48);
        assert!(body.iter().all(|l| l.len() == 64));
        assert!(lines[lines.len() - 2].starts_with('='));
        assert!(! text.contains("\n\n="));
        assert_eq!(dearmor(text.as_bytes()).unwrap(), data);
    }
}

#[quickcheck]
fn roundtrip(data: Vec<u8>) -> bool {
    dearmor(&enarmor(&data)).unwrap() == data
}

#[test]
fn dash_escaping() {
    let mut out = Vec::new();
    {
        let mut w = Writer::new(&mut out);
        w.begin_clear_text(HashAlgorithm::SHA256).unwrap();
        w.write_all(b"-- test --\n").unwrap();
        w.end_clear_text();
    }
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with(
        "-----BEGIN PGP SIGNED MESSAGE-----\nHash: SHA256\n\n"));
    assert!(text.ends_with("\n- -- test --\n"));
}

#[test]
fn clear_text_then_signature() {
    let mut sig = Vec::new();
    write_packet(&mut sig, Tag::Signature, &[4, 0, 1, 8], false).unwrap();

    let mut out = Vec::new();
    {
        let mut w = Writer::new(&mut out);
        w.begin_clear_text(HashAlgorithm::SHA1).unwrap();
        w.write_all(b"first\n-second\n").unwrap();
        w.end_clear_text();
        w.write_all(&sig).unwrap();
    }
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("first\n- -second\n-----BEGIN PGP SIGNATURE-----\n"));
    assert!(text.ends_with("-----END PGP SIGNATURE-----\n"));
}

#[test]
fn unsupported_clear_text_hash() {
    let mut w = Writer::new(Vec::new());
    let e = w.begin_clear_text(HashAlgorithm::Unknown(200)).unwrap_err();
    assert_eq!(e.downcast_ref::<Error>(),
               Some(&Error::UnsupportedHashAlgorithm(
                   HashAlgorithm::Unknown(200))));
}

#[test]
fn armored_packets() {
    init();
    let mut armored = Vec::new();
    {
        let mut w = Writer::with_headers(&mut armored, Some(Kind::PublicKey),
                                         &[("Comment", "test key")]);
        write_packet(&mut w, Tag::UserID, b"Alice", false).unwrap();
    }
    let text = String::from_utf8(armored.clone()).unwrap();
    assert!(text.starts_with(
        "-----BEGIN PGP PUBLIC KEY BLOCK-----\nComment: test key\n\n"));

    let mut r = Reader::new(&armored[..]);
    assert_eq!(r.headers().unwrap(),
               &[("Comment".to_string(), "test key".to_string())][..]);
    assert_eq!(r.kind(), Some(Kind::PublicKey));

    let mut reader = PacketReader::new(r);
    assert_eq!(reader.read_packet().unwrap(),
               Some(Packet::from(UserID::from("Alice"))));
    assert!(reader.read_packet().unwrap().is_none());
}

#[test]
fn corrupt_armor() {
    let mut armored = enarmor(b"\xc4\x05hello");
    let text = String::from_utf8(armored.clone()).unwrap();
    let crc = text.find("\n=").unwrap() + 2;

    // Flip a checksum character.
    armored[crc] = if armored[crc] == b'A' { b'B' } else { b'A' };
    let e = dearmor(&armored).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::InvalidData);

    // Lose the tail.
    let e = dearmor(text[..crc - 1].as_bytes()).unwrap_err();
    assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
}
