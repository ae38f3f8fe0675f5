//! Ordered header map and header block rendering.

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// Value bound to a header name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// One header line.
    Single(String),
    /// One header line per value, in order.
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// Returns the values as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        }
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.as_slice().first().map(String::as_str)
    }

    /// Returns true if no value carries any text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.as_slice().iter().all(String::is_empty)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

/// Collection of email headers.
///
/// Names are case-sensitive as supplied. Insertion order is the emission
/// order; replacing a value keeps the header in its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, HeaderValue)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a header value, replacing any existing values.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<HeaderValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Adds a header value, keeping any existing ones.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, HeaderValue::Multiple(values))) => values.push(value),
            Some((_, slot @ HeaderValue::Single(_))) => {
                let first = slot.first().unwrap_or_default().to_string();
                *slot = HeaderValue::Multiple(vec![first, value]);
            }
            None => self.entries.push((name, HeaderValue::Single(value))),
        }
    }

    /// Gets the value bound to a header.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_value(name).and_then(HeaderValue::first)
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get_value(name)
            .map(|value| value.as_slice().iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get_value(name).is_some()
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    /// Returns the number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no header is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all header lines, in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, value)| {
            value
                .as_slice()
                .iter()
                .map(move |v| (name.as_str(), v.as_str()))
        })
    }
}

/// Renders the header block: one `Name: value` line per value, CRLF
/// terminated, with embedded line breaks folded as CRLF plus two spaces.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {}\r\n", fold(value))?;
        }
        Ok(())
    }
}

fn fold(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\n', "\r\n  ")
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to a string or list of strings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut headers = Headers::new();
                while let Some((name, value)) = access.next_entry::<String, Option<HeaderValue>>()? {
                    // Missing values are skipped
                    if let Some(value) = value {
                        headers.set(name, value);
                    }
                }
                Ok(headers)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Headers::new())
            }
        }

        deserializer.deserialize_any(HeadersVisitor)
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
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_set_get_case_sensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), None);
    }

    #[test]
    fn test_headers_set_keeps_position() {
        let mut headers = Headers::new();
        headers.set("To", "a@x.com");
        headers.set("Subject", "Hi");
        headers.set("To", "b@x.com");

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["To", "Subject"]);
        assert_eq!(headers.get("To"), Some("b@x.com"));
    }

    #[test]
    fn test_headers_add() {
        let mut headers = Headers::new();
        headers.add("Received", "first");
        headers.add("Received", "second");
        headers.add("Received", "third");
        assert_eq!(headers.get_all("Received"), vec!["first", "second", "third"]);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_headers_remove() {
        let mut headers = Headers::new();
        headers.set("Subject", "Test");
        assert!(headers.contains("Subject"));

        headers.remove("Subject");
        assert!(!headers.contains("Subject"));
    }

    #[test]
    fn test_headers_display() {
        let mut headers = Headers::new();
        headers.set("From", "sender@example.com");
        headers.set("Received", vec!["one".to_string(), "two".to_string()]);

        assert_eq!(
            headers.to_string(),
            "From: sender@example.com\r\nReceived: one\r\nReceived: two\r\n"
        );
    }

    #[test]
    fn test_headers_display_folds_line_breaks() {
        let mut headers = Headers::new();
        headers.set("Subject", "line one\nline two\r\nline three");

        assert_eq!(
            headers.to_string(),
            "Subject: line one\r\n  line two\r\n  line three\r\n"
        );
    }

    #[test]
    fn test_header_value_blank() {
        assert!(HeaderValue::from("").is_blank());
        assert!(HeaderValue::Multiple(Vec::new()).is_blank());
        assert!(!HeaderValue::from("x").is_blank());
    }

    #[test]
    fn test_headers_deserialize_preserves_order() {
        let json = r#"{"Zeta": "1", "Alpha": ["a", "b"], "Skipped": null}"#;
        let headers: Headers = serde_json::from_str(json).unwrap();

        let lines: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(lines, vec![("Zeta", "1"), ("Alpha", "a"), ("Alpha", "b")]);
    }
}
