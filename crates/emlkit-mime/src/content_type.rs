//! MIME content type handling.

use crate::error::{Error, Result};
use std::fmt;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters in declaration order (e.g., charset=utf-8, boundary=xxx).
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a text/plain content type.
    #[must_use]
    pub fn text_plain() -> Self {
        Self::new("text", "plain").with_parameter("charset", "utf-8")
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "utf-8")
    }

    /// Creates a multipart/mixed content type with boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: impl Into<String>) -> Self {
        Self::new("multipart", "mixed").with_parameter("boundary", boundary)
    }

    /// Adds a parameter, replacing an existing one with the same name.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into().to_lowercase();
        let value = value.into();
        if let Some(slot) = self.parameters.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.parameters.push((key, value));
        }
        self
    }

    /// Returns a parameter value by (lowercase) name.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameter("charset")
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }

    /// Returns the conventional file extension for this type.
    #[must_use]
    pub fn file_extension(&self) -> &'static str {
        file_extension(&format!("{}/{}", self.main_type, self.sub_type))
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2=value2`
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(';');

        let type_str = parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidContentType("Empty content type".to_string()))?;

        let (main_type, sub_type) = type_str
            .split_once('/')
            .ok_or_else(|| Error::InvalidContentType(format!("Missing subtype in {type_str}")))?;

        let mut content_type = Self::new(
            main_type.trim().to_lowercase(),
            sub_type.trim().to_lowercase(),
        );

        for param in parts {
            if let Some((key, value)) = param.trim().split_once('=') {
                content_type = content_type.with_parameter(key.trim(), value.trim().trim_matches('"'));
            }
        }

        Ok(content_type)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let main = &self.main_type;
        let sub = &self.sub_type;
        write!(f, "{main}/{sub}")?;

        for (key, value) in &self.parameters {
            // Boundaries are always quoted; other values only when needed
            let special = value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c));
            if key == "boundary" || special {
                write!(f, "; {key}=\"{value}\"")?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}

/// Extracts the boundary from a raw Content-Type header value.
///
/// Matches `boundary="?(.+?)"?(\s*;.*)?$`: the value may be quoted and may be
/// followed by further parameters. Returns `None` when no boundary parameter
/// is present.
///
/// ```
/// use emlkit_mime::extract_boundary;
///
/// assert_eq!(extract_boundary("multipart/mixed; boundary=\"XYZ\""), Some("XYZ"));
/// assert_eq!(extract_boundary("multipart/mixed; boundary=XYZ; x=1"), Some("XYZ"));
/// assert_eq!(extract_boundary("text/plain"), None);
/// ```
#[must_use]
pub fn extract_boundary(content_type: &str) -> Option<&str> {
    content_type
        .match_indices("boundary=")
        .find_map(|(index, key)| boundary_value(&content_type[index + key.len()..]))
}

fn boundary_value(rest: &str) -> Option<&str> {
    rest.strip_prefix('"')
        .into_iter()
        .chain(std::iter::once(rest))
        .find_map(|candidate| {
            for (index, ch) in candidate.char_indices() {
                if ch == '\n' {
                    return None;
                }
                let end = index + ch.len_utf8();
                if is_boundary_tail(&candidate[end..]) {
                    return Some(&candidate[..end]);
                }
            }
            None
        })
}

fn is_boundary_tail(tail: &str) -> bool {
    let tail = tail.strip_prefix('"').unwrap_or(tail);
    tail.is_empty() || tail.trim_start().starts_with(';')
}

/// Extracts the charset name from a raw Content-Type header value.
///
/// ```
/// use emlkit_mime::charset_param;
///
/// assert_eq!(charset_param("text/plain; charset=\"iso-8859-2\""), Some("iso-8859-2"));
/// assert_eq!(charset_param("text/plain"), None);
/// ```
#[must_use]
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type.match_indices("charset").find_map(|(index, key)| {
        let rest = content_type[index + key.len()..].trim_start();
        let rest = rest.strip_prefix('=')?;
        let rest = rest.trim_start_matches(|c: char| !(c.is_alphanumeric() || c == '_'));
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        (end > 0).then_some(&rest[..end])
    })
}

/// Returns the conventional file extension (with dot) for a MIME type.
///
/// Unknown types yield an empty string.
#[must_use]
pub fn file_extension(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "text/plain" => ".txt",
        "text/html" => ".html",
        "image/png" => ".png",
        "image/jpg" | "image/jpeg" => ".jpg",
        _ => "",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_new() {
        let ct = ContentType::new("text", "plain");
        assert_eq!(ct.main_type, "text");
        assert_eq!(ct.sub_type, "plain");
        assert!(ct.parameters.is_empty());
    }

    #[test]
    fn test_text_plain() {
        let ct = ContentType::text_plain();
        assert_eq!(ct.charset(), Some("utf-8"));
        assert_eq!(ct.to_string(), "text/plain; charset=utf-8");
        assert_eq!(ContentType::text_html().to_string(), "text/html; charset=utf-8");
    }

    #[test]
    fn test_multipart_mixed() {
        let ct = ContentType::multipart_mixed("boundary123");
        assert_eq!(ct.boundary(), Some("boundary123"));
        assert!(ct.is_multipart());
        assert_eq!(ct.to_string(), "multipart/mixed; boundary=\"boundary123\"");
    }

    #[test]
    fn test_content_type_parse() {
        let ct = ContentType::parse("Text/Plain; Charset=utf-8").unwrap();
        assert_eq!(ct.main_type, "text");
        assert_eq!(ct.sub_type, "plain");
        assert_eq!(ct.charset(), Some("utf-8"));
    }

    #[test]
    fn test_content_type_parse_quoted() {
        let ct = ContentType::parse("multipart/mixed; boundary=\"----=_Part_123\"").unwrap();
        assert_eq!(ct.boundary(), Some("----=_Part_123"));
    }

    #[test]
    fn test_content_type_parse_errors() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("text").is_err());
    }

    #[test]
    fn test_content_type_with_parameter_replaces() {
        let ct = ContentType::new("text", "plain")
            .with_parameter("charset", "iso-8859-1")
            .with_parameter("format", "flowed")
            .with_parameter("charset", "utf-8");

        assert_eq!(ct.to_string(), "text/plain; charset=utf-8; format=flowed");
    }

    #[test]
    fn test_extract_boundary() {
        assert_eq!(extract_boundary("multipart/mixed; boundary=\"XYZ\""), Some("XYZ"));
        assert_eq!(extract_boundary("multipart/mixed; boundary=XYZ"), Some("XYZ"));
        assert_eq!(
            extract_boundary("multipart/mixed; boundary=\"----=abc\"; charset=utf-8"),
            Some("----=abc")
        );
        assert_eq!(
            extract_boundary("multipart/mixed;\r\n  boundary=\"folded\""),
            Some("folded")
        );
        assert_eq!(extract_boundary("multipart/mixed"), None);
    }

    #[test]
    fn test_charset_param() {
        assert_eq!(charset_param("text/plain; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_param("text/plain; charset = \"ISO-8859-2\""), Some("ISO-8859-2"));
        assert_eq!(charset_param("text/plain; charset="), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("image/png"), ".png");
        assert_eq!(file_extension("IMAGE/JPEG"), ".jpg");
        assert_eq!(file_extension("application/pdf"), "");
        assert_eq!(ContentType::text_html().file_extension(), ".html");
    }
}
