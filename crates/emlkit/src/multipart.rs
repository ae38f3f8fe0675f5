//! Multipart body serialization.

use crate::config::Config;
use crate::message::{Attachment, MessagePart};
use emlkit_mime::encoding::{encode_base64, wrap_lines};
use emlkit_mime::file_extension;

const CRLF: &str = "\r\n";

/// Serializes body parts into boundary-delimited MIME sections.
#[derive(Debug, Clone, Copy)]
pub struct MultipartBodyBuilder<'a> {
    boundary: &'a str,
    config: &'a Config,
}

impl<'a> MultipartBodyBuilder<'a> {
    /// Creates a body builder for `boundary` (without the leading `--`).
    #[must_use]
    pub const fn new(boundary: &'a str, config: &'a Config) -> Self {
        Self { boundary, config }
    }

    /// Builds the body.
    ///
    /// Sections are emitted in a fixed order: the text part (only when no
    /// HTML part is given), the HTML part, then each attachment. The body
    /// ends with the closing `--boundary--` line.
    #[must_use]
    pub fn build(
        &self,
        text: Option<&MessagePart>,
        html: Option<&MessagePart>,
        attachments: &[Attachment],
    ) -> String {
        let mut body = String::new();

        if let (None, Some(text)) = (html, text) {
            self.push_part(&mut body, text);
        }
        if let Some(html) = html {
            self.push_part(&mut body, html);
        }
        for (index, attachment) in attachments.iter().enumerate() {
            self.push_attachment(&mut body, index, attachment);
        }

        body.push_str("--");
        body.push_str(self.boundary);
        body.push_str("--");
        body.push_str(CRLF);
        body
    }

    fn push_delimiter(&self, body: &mut String) {
        body.push_str("--");
        body.push_str(self.boundary);
        body.push_str(CRLF);
    }

    fn push_part(&self, body: &mut String, part: &MessagePart) {
        self.push_delimiter(body);
        push_header(body, "Content-Type", &part.content_type().to_string());
        body.push_str(CRLF);
        if self.config.normalize_line_endings {
            body.push_str(&normalize_crlf(&part.body));
        } else {
            body.push_str(&part.body);
        }
        body.push_str(CRLF);
        body.push_str(CRLF);
    }

    fn push_attachment(&self, body: &mut String, index: usize, attachment: &Attachment) {
        let content_type = attachment
            .content_type
            .as_deref()
            .unwrap_or(&self.config.default_content_type);

        let filename = if attachment.filename.is_empty() {
            format!("attachment_{}{}", index + 1, file_extension(content_type))
        } else {
            attachment.filename.clone()
        };

        self.push_delimiter(body);
        push_header(body, "Content-Type", content_type);
        push_header(body, "Content-Transfer-Encoding", "base64");
        push_header(
            body,
            "Content-Disposition",
            &format!("{}; filename=\"{filename}\"", attachment.disposition),
        );
        if let Some(cid) = &attachment.cid {
            push_header(body, "Content-ID", &format!("<{cid}>"));
        }
        body.push_str(CRLF);

        let bytes = attachment.data.as_bytes();
        if !bytes.is_empty() {
            body.push_str(&wrap_lines(&encode_base64(bytes), self.config.wrap_width));
            body.push_str(CRLF);
        }
        body.push_str(CRLF);
    }
}

fn push_header(body: &mut String, name: &str, value: &str) {
    body.push_str(name);
    body.push_str(": ");
    body.push_str(value);
    body.push_str(CRLF);
}

/// Converts bare line feeds to CRLF, leaving existing CRLF pairs intact.
fn normalize_crlf(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous = '\0';
    for ch in text.chars() {
        if ch == '\n' && previous != '\r' {
            result.push('\r');
        }
        result.push(ch);
        previous = ch;
    }
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

    fn build(
        text: Option<&MessagePart>,
        html: Option<&MessagePart>,
        attachments: &[Attachment],
    ) -> String {
        let config = Config::default();
        MultipartBodyBuilder::new("B", &config).build(text, html, attachments)
    }

    #[test]
    fn test_text_only() {
        let body = build(Some(&MessagePart::text("Hello")), None, &[]);
        assert_eq!(
            body,
            "--B\r\nContent-Type: text/plain; charset=utf-8\r\n\r\nHello\r\n\r\n--B--\r\n"
        );
    }

    #[test]
    fn test_html_suppresses_text() {
        let body = build(
            Some(&MessagePart::text("Hello")),
            Some(&MessagePart::html("<p>Hello</p>")),
            &[],
        );
        assert_eq!(
            body,
            "--B\r\nContent-Type: text/html; charset=utf-8\r\n\r\n<p>Hello</p>\r\n\r\n--B--\r\n"
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(build(None, None, &[]), "--B--\r\n");
    }

    #[test]
    fn test_attachment_section() {
        let attachment = Attachment::new("hello.txt", "hello").content_type("text/plain");
        let body = build(None, None, &[attachment]);
        assert_eq!(
            body,
            concat!(
                "--B\r\n",
                "Content-Type: text/plain\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "Content-Disposition: attachment; filename=\"hello.txt\"\r\n",
                "\r\n",
                "aGVsbG8=\r\n",
                "\r\n",
                "--B--\r\n"
            )
        );
    }

    #[test]
    fn test_inline_attachment_with_cid() {
        let attachment = Attachment::new("logo.png", vec![0u8, 1, 2])
            .content_type("image/png")
            .inline()
            .cid("logo@x");
        let body = build(None, None, &[attachment]);
        assert!(body.contains("Content-Disposition: inline; filename=\"logo.png\"\r\n"));
        assert!(body.contains("Content-ID: <logo@x>\r\n"));
        assert!(body.contains("\r\n\r\nAAEC\r\n\r\n"));
    }

    #[test]
    fn test_attachment_defaults() {
        let body = build(None, None, &[Attachment::new("", b"x".as_slice())]);
        assert!(body.contains("Content-Type: application/octet-stream\r\n"));
        assert!(body.contains("filename=\"attachment_1\""));

        let png = Attachment::new("", vec![1u8]).content_type("image/png");
        let body = build(None, None, &[Attachment::new("a", "a"), png]);
        assert!(body.contains("filename=\"attachment_2.png\""));
    }

    #[test]
    fn test_empty_attachment_has_no_content_line() {
        let body = build(None, None, &[Attachment::new("empty.bin", Vec::new())]);
        assert!(body.ends_with("filename=\"empty.bin\"\r\n\r\n\r\n--B--\r\n"));
    }

    #[test]
    fn test_attachment_wrapping() {
        // 150 bytes encode to exactly 200 characters
        let body = build(None, None, &[Attachment::new("z.bin", vec![0x5Au8; 150])]);
        let encoded: Vec<&str> = body
            .split("\r\n")
            .filter(|line| line.starts_with("Wlpa"))
            .collect();
        assert_eq!(encoded.len(), 3);
        assert_eq!(encoded[0].len(), 76);
        assert_eq!(encoded[1].len(), 76);
        assert_eq!(encoded[2].len(), 48);
    }

    #[test]
    fn test_line_endings_normalized() {
        let body = build(Some(&MessagePart::text("one\ntwo\r\nthree")), None, &[]);
        assert!(body.contains("one\r\ntwo\r\nthree\r\n"));

        let config = Config::builder().normalize_line_endings(false).build();
        let body = MultipartBodyBuilder::new("B", &config).build(
            Some(&MessagePart::text("one\ntwo")),
            None,
            &[],
        );
        assert!(body.contains("one\ntwo\r\n"));
    }

    #[test]
    fn test_normalize_crlf() {
        assert_eq!(normalize_crlf("a\nb"), "a\r\nb");
        assert_eq!(normalize_crlf("a\r\nb"), "a\r\nb");
        assert_eq!(normalize_crlf("\n\n"), "\r\n\r\n");
    }
}
