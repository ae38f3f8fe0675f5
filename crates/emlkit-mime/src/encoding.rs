//! MIME encoding and decoding utilities.
//!
//! Supports Base64 with RFC 2045 line wrapping and lenient
//! Quoted-Printable decoding.

use crate::charset::{CharsetDecoder, EncodingRsDecoder, UTF8, decode_bytes, normalize_charset};
use crate::error::Result;
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Maximum line length for Base64 bodies (RFC 2045).
pub const MAX_LINE_LENGTH: usize = 76;

/// Base64 engine that accepts missing padding and trailing bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Decodes Base64 data, ignoring whitespace and missing padding.
///
/// # Errors
///
/// Returns an error if the input contains characters outside the Base64
/// alphabet.
pub fn decode_base64_lenient(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT.decode(cleaned).map_err(Into::into)
}

/// Hard-wraps `text` to `width` characters per line, joining lines with CRLF.
///
/// The last line carries no terminator. A zero width disables wrapping.
#[must_use]
pub fn wrap_lines(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + text.len() / width * 2);
    let mut line_length = 0;

    for ch in text.chars() {
        if line_length == width {
            result.push_str("\r\n");
            line_length = 0;
        }
        result.push(ch);
        line_length += 1;
    }

    result
}

/// Encodes data as Base64 wrapped at [`MAX_LINE_LENGTH`] columns.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    wrap_lines(&encode_base64(data), MAX_LINE_LENGTH)
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// Every contiguous run of `=XX` escapes is decoded as one byte sequence in
/// `charset` (UTF-8 when absent), so multi-byte characters split across
/// escapes are reassembled. Soft line breaks (`=` before a line break) are
/// removed. Invalid escapes and unescaped characters pass through unchanged;
/// this function never fails.
#[must_use]
pub fn decode_quoted_printable(text: &str, charset: Option<&str>) -> String {
    decode_quoted_printable_with(text, charset, &EncodingRsDecoder)
}

/// Decodes Quoted-Printable text using a caller-supplied charset decoder.
///
/// See [`decode_quoted_printable`].
#[must_use]
pub fn decode_quoted_printable_with(
    text: &str,
    charset: Option<&str>,
    decoder: &dyn CharsetDecoder,
) -> String {
    let charset = charset.map_or_else(|| UTF8.to_string(), normalize_charset);
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut run: Vec<u8> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'=' {
            match bytes.get(i + 1..i + 3) {
                // Soft line break
                Some([b'\r', b'\n', ..]) => {
                    i += 3;
                    continue;
                }
                Some([b'\n', ..]) => {
                    i += 2;
                    continue;
                }
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    run.push((hex_value(*hi) << 4) | hex_value(*lo));
                    i += 3;
                    continue;
                }
                None if bytes.get(i + 1) == Some(&b'\n') => {
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }

        if !run.is_empty() {
            result.push_str(&decode_bytes(&charset, &run, decoder));
            run.clear();
        }

        let ch = text[i..].chars().next().unwrap_or('=');
        result.push(ch);
        i += ch.len_utf8();
    }

    if !run.is_empty() {
        result.push_str(&decode_bytes(&charset, &run, decoder));
    }

    result
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64_lenient() {
        assert_eq!(decode_base64_lenient("SGVs\r\nbG8").unwrap(), b"Hello");
        assert!(decode_base64("SGVsbG8").is_err());
        assert!(decode_base64_lenient("not base64!").is_err());
    }

    #[test]
    fn test_wrap_lines() {
        assert_eq!(wrap_lines("abcdefg", 3), "abc\r\ndef\r\ng");
        assert_eq!(wrap_lines("abcdef", 3), "abc\r\ndef");
        assert_eq!(wrap_lines("ab", 3), "ab");
        assert_eq!(wrap_lines("", 3), "");
    }

    #[test]
    fn test_base64_wrapped_line_lengths() {
        // 150 bytes encode to exactly 200 characters
        let encoded = encode_base64_wrapped(&[0x5A; 150]);
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 76);
        assert_eq!(lines[1].len(), 76);
        assert_eq!(lines[2].len(), 48);
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable("Hello, World!", None), "Hello, World!");
        assert_eq!(decode_quoted_printable("Caf=C3=A9", None), "Café");
        assert_eq!(decode_quoted_printable("H=C3=A9llo", Some("UTF-8")), "Héllo");
    }

    #[test]
    fn test_quoted_printable_long_run() {
        // Four-byte sequence followed by a two-byte one, all escaped
        let decoded = decode_quoted_printable("=F0=9F=98=80=C3=A9", None);
        assert_eq!(decoded, "😀é");
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable("Hello=\r\nWorld", None), "HelloWorld");
        assert_eq!(decode_quoted_printable("Hello=\nWorld", None), "HelloWorld");
    }

    #[test]
    fn test_quoted_printable_invalid_escape_is_literal() {
        assert_eq!(decode_quoted_printable("a=ZZb", None), "a=ZZb");
        assert_eq!(decode_quoted_printable("trailing=", None), "trailing=");
        assert_eq!(decode_quoted_printable("x=4", None), "x=4");
    }

    #[test]
    fn test_quoted_printable_charset() {
        assert_eq!(decode_quoted_printable("=B1", Some("ISO-8859-2")), "ą");
        assert_eq!(decode_quoted_printable("caf=E9", Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_quoted_printable_custom_decoder() {
        struct Upper;
        impl CharsetDecoder for Upper {
            fn decode(&self, charset: &str, bytes: &[u8]) -> String {
                format!("[{charset}:{}]", bytes.len())
            }
        }

        let decoded = decode_quoted_printable_with("a=41=42b", Some("x-test"), &Upper);
        assert_eq!(decoded, "a[xtest:2]b");
    }

    proptest! {
        #[test]
        fn prop_wrapped_lines_never_exceed_width(data in proptest::collection::vec(any::<u8>(), 0..600)) {
            let wrapped = encode_base64_wrapped(&data);
            let lines: Vec<&str> = wrapped.split("\r\n").collect();
            for (index, line) in lines.iter().enumerate() {
                if index + 1 < lines.len() {
                    prop_assert_eq!(line.len(), MAX_LINE_LENGTH);
                } else {
                    prop_assert!(line.len() <= MAX_LINE_LENGTH);
                }
            }
            prop_assert_eq!(lines.concat(), encode_base64(&data));
        }

        #[test]
        fn prop_plain_ascii_passes_through(text in "[a-zA-Z0-9 ,.!?]{0,80}") {
            prop_assert_eq!(decode_quoted_printable(&text, None), text);
        }
    }
}
