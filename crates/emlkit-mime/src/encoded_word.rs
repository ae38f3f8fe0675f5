//! RFC 2047 encoded-word decoding.
//!
//! Format: `=?charset?encoding?encoded-text?=`, where encoding is `B`
//! (Base64) or `Q` (Quoted-Printable), case-insensitive.
//!
//! Decoding is total: a token that does not match the format, or whose
//! payload fails to decode, is kept as literal text.

use crate::charset::{CharsetDecoder, EncodingRsDecoder, decode_bytes, normalize_charset};
use crate::encoding::{decode_base64_lenient, decode_quoted_printable_with};

/// Encoding letter of an encoded word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordEncoding {
    Base64,
    QuotedPrintable,
}

/// An encoded word located inside a larger string.
#[derive(Debug)]
struct EncodedWord<'a> {
    start: usize,
    end: usize,
    charset: String,
    encoding: WordEncoding,
    payload: &'a str,
}

impl EncodedWord<'_> {
    /// Locates the first well-formed encoded word in `text`.
    fn find(text: &str) -> Option<EncodedWord<'_>> {
        text.match_indices("=?")
            .find_map(|(start, _)| EncodedWord::parse_at(text, start))
    }

    fn parse_at(text: &str, start: usize) -> Option<EncodedWord<'_>> {
        let body = &text[start + 2..];
        let charset_end = body.find('?')?;
        let charset = &body[..charset_end];
        if charset.is_empty() {
            return None;
        }

        let rest = &body[charset_end + 1..];
        let encoding = match rest.as_bytes() {
            [b'B' | b'b', b'?', ..] => WordEncoding::Base64,
            [b'Q' | b'q', b'?', ..] => WordEncoding::QuotedPrintable,
            _ => return None,
        };

        // Payload is at least one character, up to the first `?=`.
        let region = &rest[2..];
        let first = region.chars().next()?.len_utf8();
        let payload_end = region[first..].find("?=")? + first;
        let payload = &region[..payload_end];
        if payload.contains('\n') {
            return None;
        }

        let end = start + 2 + charset_end + 1 + 2 + payload_end + 2;
        Some(EncodedWord {
            start,
            end,
            charset: normalize_charset(charset),
            encoding,
            payload,
        })
    }

    fn decode(&self, decoder: &dyn CharsetDecoder) -> Option<String> {
        match self.encoding {
            WordEncoding::Base64 => {
                let bytes = decode_base64_lenient(self.payload).ok()?;
                Some(decode_bytes(&self.charset, &bytes, decoder))
            }
            WordEncoding::QuotedPrintable => {
                let text = self.payload.replace('_', " ");
                Some(decode_quoted_printable_with(
                    &text,
                    Some(&self.charset),
                    decoder,
                ))
            }
        }
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Literal text around encoded words is kept; whitespace separating two
/// adjacent encoded words is dropped. Non-UTF-8 charsets are decoded with
/// [`EncodingRsDecoder`].
///
/// ```
/// use emlkit_mime::decode_encoded_words;
///
/// assert_eq!(decode_encoded_words("=?utf-8?B?SMOpbGxv?="), "Héllo");
/// assert_eq!(decode_encoded_words("plain text"), "plain text");
/// ```
#[must_use]
pub fn decode_encoded_words(text: &str) -> String {
    decode_encoded_words_with(text, &EncodingRsDecoder)
}

/// Decodes every RFC 2047 encoded word using a caller-supplied charset
/// decoder.
///
/// See [`decode_encoded_words`].
#[must_use]
pub fn decode_encoded_words_with(text: &str, decoder: &dyn CharsetDecoder) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut after_word = false;

    while let Some(word) = EncodedWord::find(rest) {
        let literal = &rest[..word.start];
        if !(after_word && literal.trim().is_empty()) {
            result.push_str(literal);
        }

        if let Some(decoded) = word.decode(decoder) {
            result.push_str(&decoded);
            after_word = true;
        } else {
            result.push_str(&rest[word.start..word.end]);
            after_word = false;
        }

        rest = &rest[word.end..];
    }

    result.push_str(rest);
    result
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
    fn test_decode_base64_word() {
        assert_eq!(decode_encoded_words("=?utf-8?B?SMOpbGxv?="), "Héllo");
        assert_eq!(decode_encoded_words("=?UTF-8?b?SMOpbGxv?="), "Héllo");
    }

    #[test]
    fn test_decode_quoted_printable_word() {
        assert_eq!(decode_encoded_words("=?utf-8?Q?H=C3=A9llo?="), "Héllo");
        assert_eq!(decode_encoded_words("=?utf-8?q?Caf=C3=A9_Bar?="), "Café Bar");
    }

    #[test]
    fn test_decode_non_utf8_charset() {
        assert_eq!(decode_encoded_words("=?ISO-8859-2?Q?=B1?="), "ą");
        assert_eq!(decode_encoded_words("=?iso-8859-1?B?Y2Fm6Q==?="), "café");
    }

    #[test]
    fn test_no_match_is_unchanged() {
        assert_eq!(decode_encoded_words("John Doe"), "John Doe");
        assert_eq!(decode_encoded_words("=?utf-8?X?abc?="), "=?utf-8?X?abc?=");
        assert_eq!(decode_encoded_words("=??B?abc?="), "=??B?abc?=");
        assert_eq!(decode_encoded_words("=?utf-8?B??="), "=?utf-8?B??=");
    }

    #[test]
    fn test_malformed_base64_is_kept() {
        assert_eq!(decode_encoded_words("=?utf-8?B?!!!?="), "=?utf-8?B?!!!?=");
    }

    #[test]
    fn test_surrounding_text_is_kept() {
        assert_eq!(
            decode_encoded_words("Re: =?utf-8?Q?Caf=C3=A9?= menu"),
            "Re: Café menu"
        );
    }

    #[test]
    fn test_adjacent_words_join() {
        assert_eq!(
            decode_encoded_words("=?utf-8?Q?Caf=C3?= =?utf-8?Q?=A9?="),
            "Caf\u{FFFD}\u{FFFD}"
        );
        assert_eq!(
            decode_encoded_words("=?utf-8?B?SMOp?=  =?utf-8?B?bGxv?="),
            "Héllo"
        );
    }

    #[test]
    fn test_custom_decoder() {
        struct Fixed;
        impl CharsetDecoder for Fixed {
            fn decode(&self, charset: &str, _bytes: &[u8]) -> String {
                charset.to_string()
            }
        }

        let decoded = decode_encoded_words_with("=?KOI8-R?B?8g==?=", &Fixed);
        assert_eq!(decoded, "koi8r");
    }
}
