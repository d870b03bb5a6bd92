//! Hex helpers used by `Debug` implementations and tests.

use std::fmt::Write;

/// Formats `s` as upper-case hex.
///
/// If `pretty` is set, groups of two octets are separated by a space.
pub(crate) fn to_hex(s: &[u8], pretty: bool) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for (i, b) in s.iter().enumerate() {
        if pretty && i > 0 && i % 2 == 0 {
            result.push(' ');
        }
        // Writing to a String can't fail.
        let _ = write!(&mut result, "{:02X}", b);
    }
    result
}

/// Parses a hex string.  Whitespace is skipped if `pretty` is set.
///
/// Returns `None` on anything that is not an even number of hex
/// digits.
#[allow(dead_code)]
pub(crate) fn from_hex(hex: &str, pretty: bool) -> Option<Vec<u8>> {
    let nibbles = hex.chars()
        .filter(|c| ! (pretty && c.is_ascii_whitespace()))
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<Vec<u8>>>()?;

    if nibbles.len() % 2 != 0 {
        return None;
    }

    Some(nibbles.chunks(2).map(|n| (n[0] << 4) | n[1]).collect())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex() {
        assert_eq!(to_hex(&[], false), "");
        assert_eq!(to_hex(&[0x01, 0xab, 0xcd, 0xef, 0x10], false),
                   "01ABCDEF10");
        assert_eq!(to_hex(&[0x01, 0xab, 0xcd, 0xef, 0x10], true),
                   "01AB CDEF 10");

        assert_eq!(from_hex("01ABcdef10", false),
                   Some(vec![0x01, 0xab, 0xcd, 0xef, 0x10]));
        assert_eq!(from_hex("01AB CDEF 10", true),
                   Some(vec![0x01, 0xab, 0xcd, 0xef, 0x10]));
        assert_eq!(from_hex("01AB CDEF 10", false), None);
        assert_eq!(from_hex("123", false), None);
        assert_eq!(from_hex("zz", false), None);
    }

    quickcheck! {
        fn roundtrip(data: Vec<u8>, pretty: bool) -> bool {
            from_hex(&to_hex(&data, pretty), pretty) == Some(data)
        }
    }
}
