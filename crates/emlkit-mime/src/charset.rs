//! Charset name normalization and byte-to-text decoding.

use tracing::warn;

/// Normalized name of the UTF-8 charset.
pub const UTF8: &str = "utf8";

/// Normalizes a charset label for lookup.
///
/// Lowercases the label and strips everything outside `[0-9a-z]`, so
/// `ISO-8859-2` becomes `iso88592`. An RFC 2231 language suffix
/// (`utf-8*en`) is ignored. An empty label normalizes to `utf8`.
#[must_use]
pub fn normalize_charset(label: &str) -> String {
    let label = label.split_once('*').map_or(label, |(name, _)| name);
    let normalized: String = label
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if normalized.is_empty() {
        UTF8.to_string()
    } else {
        normalized
    }
}

/// Decodes bytes written in a non-UTF-8 charset into text.
///
/// Implementations are keyed by the normalized charset name produced by
/// [`normalize_charset`] and must never fail: undecodable input degrades to
/// replacement characters.
pub trait CharsetDecoder {
    /// Decodes `bytes` using the normalized `charset`.
    fn decode(&self, charset: &str, bytes: &[u8]) -> String;
}

/// [`CharsetDecoder`] backed by `encoding_rs`.
///
/// Unknown charsets fall back to lossy UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingRsDecoder;

impl EncodingRsDecoder {
    /// Resolves a normalized charset name to an `encoding_rs` encoding.
    fn lookup(charset: &str) -> Option<&'static encoding_rs::Encoding> {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            return Some(encoding);
        }

        // Normalization strips the hyphen that most WHATWG labels need.
        ["windows", "iso8859", "koi8"]
            .iter()
            .find_map(|prefix| {
                let rest = charset.strip_prefix(prefix)?;
                let head = if *prefix == "iso8859" { "iso-8859" } else { *prefix };
                encoding_rs::Encoding::for_label(format!("{head}-{rest}").as_bytes())
            })
    }
}

impl CharsetDecoder for EncodingRsDecoder {
    fn decode(&self, charset: &str, bytes: &[u8]) -> String {
        if charset == UTF8 {
            return String::from_utf8_lossy(bytes).into_owned();
        }

        if let Some(encoding) = Self::lookup(charset) {
            let (decoded, _, _) = encoding.decode(bytes);
            decoded.into_owned()
        } else {
            warn!(charset, "Unknown charset, falling back to UTF-8 lossy");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Decodes bytes in the given normalized charset.
///
/// UTF-8 never reaches the collaborator.
pub(crate) fn decode_bytes(charset: &str, bytes: &[u8], decoder: &dyn CharsetDecoder) -> String {
    if charset == UTF8 {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        decoder.decode(charset, bytes)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_charset() {
        assert_eq!(normalize_charset("ISO-8859-2"), "iso88592");
        assert_eq!(normalize_charset("UTF-8"), "utf8");
        assert_eq!(normalize_charset("utf_8"), "utf8");
        assert_eq!(normalize_charset("Windows-1252"), "windows1252");
    }

    #[test]
    fn test_normalize_charset_defaults_to_utf8() {
        assert_eq!(normalize_charset(""), "utf8");
        assert_eq!(normalize_charset("--"), "utf8");
    }

    #[test]
    fn test_normalize_charset_language_suffix() {
        assert_eq!(normalize_charset("utf-8*en"), "utf8");
    }

    #[test]
    fn test_encoding_rs_latin2() {
        // 0xB1 is 'ą' in ISO-8859-2
        let text = EncodingRsDecoder.decode("iso88592", &[0xB1]);
        assert_eq!(text, "ą");
    }

    #[test]
    fn test_encoding_rs_windows1252() {
        // 0x80 is the euro sign in windows-1252
        let text = EncodingRsDecoder.decode("windows1252", &[0x80]);
        assert_eq!(text, "€");
    }

    #[test]
    fn test_encoding_rs_unknown_charset() {
        let text = EncodingRsDecoder.decode("x-klingon", b"plain");
        assert_eq!(text, "plain");
    }

    #[test]
    fn test_decode_bytes_utf8_is_lossy() {
        let text = decode_bytes(UTF8, &[0x66, 0xFF], &EncodingRsDecoder);
        assert_eq!(text, "f\u{FFFD}");
    }
}
