//! Text decoding: UTF-8 detection using simdutf8, latin-1 fallback.

use std::borrow::Cow;

use simdutf8::basic::from_utf8;

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the data starts with a UTF-8 BOM (Byte Order Mark).
///
/// The UTF-8 BOM is the byte sequence: EF BB BF
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.len() >= 3 && data[0] == 0xEF && data[1] == 0xBB && data[2] == 0xBF
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) {
        &data[3..]
    } else {
        data
    }
}

/// Decode bytes to text, never failing on encoding.
///
/// UTF-8 is preferred; anything that is not valid UTF-8 is decoded as
/// latin-1, where every byte maps to the code point of the same value.
/// Valid UTF-8 input is borrowed without copying.
pub fn decode_text(data: &[u8]) -> Cow<'_, str> {
    let data = skip_bom(data);
    match from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(data.iter().map(|&b| b as char).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_utf8() {
        assert!(is_utf8(b"Hello, World!"));
        assert!(is_utf8("こんにちは".as_bytes()));
        assert!(is_utf8(b""));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(!is_utf8(&[0xFF, 0xFE]));
        assert!(!is_utf8(&[0x80, 0x81, 0x82]));
    }

    #[test]
    fn test_utf8_bom() {
        let with_bom = [0xEF, 0xBB, 0xBF, b'a', b'b', b'c'];
        let without_bom = b"abc";

        assert!(has_utf8_bom(&with_bom));
        assert!(!has_utf8_bom(without_bom));

        assert_eq!(skip_bom(&with_bom), b"abc");
        assert_eq!(skip_bom(without_bom), b"abc");
    }

    #[test]
    fn test_decode_utf8_borrows() {
        let decoded = decode_text(b"Depth\tAge");
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "Depth\tAge");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // 0xB0 is the degree sign in latin-1 but invalid as a UTF-8 start byte.
        let decoded = decode_text(&[b'5', b'2', 0xB0, b'N']);
        assert_eq!(decoded, "52°N");
    }

    #[test]
    fn test_decode_skips_bom() {
        let decoded = decode_text(&[0xEF, 0xBB, 0xBF, b'H', b'i']);
        assert_eq!(decoded, "Hi");
    }
}
