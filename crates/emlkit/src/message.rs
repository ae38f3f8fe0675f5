//! Structured description of a message to build.

use crate::header::{HeaderValue, Headers};
use emlkit_mime::{AddressList, ContentType, Mailbox, format_address_list};
use serde::Deserialize;
use std::fmt;

/// Sender or recipient field: raw header text or structured mailboxes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AddressField {
    /// Header text used verbatim.
    Raw(String),
    /// Mailboxes formatted as `"name" <email>, ...`.
    List(AddressList),
}

impl AddressField {
    /// Returns the header value for this field.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        match self {
            Self::Raw(raw) => raw.clone(),
            Self::List(list) => format_address_list(list),
        }
    }
}

impl From<&str> for AddressField {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for AddressField {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

impl From<Mailbox> for AddressField {
    fn from(mailbox: Mailbox) -> Self {
        Self::List(AddressList::Single(mailbox))
    }
}

impl From<Vec<Mailbox>> for AddressField {
    fn from(mailboxes: Vec<Mailbox>) -> Self {
        Self::List(mailboxes.into())
    }
}

impl From<AddressList> for AddressField {
    fn from(list: AddressList) -> Self {
        Self::List(list)
    }
}

/// Kind of a body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    /// `text/plain`.
    Text,
    /// `text/html`.
    Html,
}

/// Text or HTML body part, always UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePart {
    /// Part kind.
    pub kind: PartKind,
    /// Raw body text.
    pub body: String,
}

impl MessagePart {
    /// Creates a plain-text part.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Text,
            body: body.into(),
        }
    }

    /// Creates an HTML part.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Html,
            body: body.into(),
        }
    }

    /// Returns the content type of this part.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self.kind {
            PartKind::Text => ContentType::text_plain(),
            PartKind::Html => ContentType::text_html(),
        }
    }
}

/// Attachment disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Displayed inline, usually referenced by Content-ID.
    Inline,
    /// Offered as a download.
    #[default]
    Attachment,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Attachment => write!(f, "attachment"),
        }
    }
}

/// Attachment content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AttachmentData {
    /// Text, encoded as UTF-8.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl AttachmentData {
    /// Returns the bytes to encode.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

impl Default for AttachmentData {
    fn default() -> Self {
        Self::Bytes(Vec::new())
    }
}

impl From<&str> for AttachmentData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AttachmentData {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for AttachmentData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for AttachmentData {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// File attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAttachment")]
pub struct Attachment {
    /// File name; an empty name is replaced by `attachment_<n>` on output.
    pub filename: String,
    /// Content type; the configured default applies when absent.
    pub content_type: Option<String>,
    /// Inline or attachment.
    pub disposition: Disposition,
    /// Content-ID, without angle brackets.
    pub cid: Option<String>,
    /// Content.
    pub data: AttachmentData,
}

impl Attachment {
    /// Creates an attachment with the default content type and disposition.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: impl Into<AttachmentData>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            disposition: Disposition::Attachment,
            cid: None,
            data: data.into(),
        }
    }

    /// Sets the content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Marks the attachment as inline.
    #[must_use]
    pub const fn inline(mut self) -> Self {
        self.disposition = Disposition::Inline;
        self
    }

    /// Sets the Content-ID.
    #[must_use]
    pub fn cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }
}

/// Loosely typed attachment shape accepted from JSON.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttachment {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    inline: bool,
    #[serde(default)]
    disposition: Option<Disposition>,
    #[serde(default)]
    cid: Option<String>,
    #[serde(default)]
    data: Option<AttachmentData>,
}

impl From<RawAttachment> for Attachment {
    fn from(raw: RawAttachment) -> Self {
        let disposition = raw.disposition.unwrap_or(if raw.inline {
            Disposition::Inline
        } else {
            Disposition::Attachment
        });

        Self {
            filename: raw.filename.or(raw.name).unwrap_or_default(),
            content_type: raw.content_type.filter(|ct| !ct.is_empty()),
            disposition,
            cid: raw.cid.filter(|cid| !cid.is_empty()),
            data: raw.data.unwrap_or_default(),
        }
    }
}

/// Message to build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmailMessage {
    /// Subject line.
    pub subject: Option<String>,
    /// Sender.
    pub from: Option<AddressField>,
    /// Recipients.
    pub to: Option<AddressField>,
    /// Carbon-copy recipients.
    pub cc: Option<AddressField>,
    /// Caller-supplied headers, emitted first and in order.
    pub headers: Headers,
    /// Plain-text body. Ignored when an HTML body is present.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// Attachments, in order.
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the sender.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from(mut self, from: impl Into<AddressField>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the recipients.
    #[must_use]
    pub fn to(mut self, to: impl Into<AddressField>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the carbon-copy recipients.
    #[must_use]
    pub fn cc(mut self, cc: impl Into<AddressField>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Sets a caller-supplied header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Returns the text part, if one will be emitted.
    ///
    /// An HTML body, even an empty one, suppresses the text part.
    #[must_use]
    pub fn text_part(&self) -> Option<MessagePart> {
        if self.html.is_some() {
            return None;
        }
        self.text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map(MessagePart::text)
    }

    /// Returns the HTML part, if one will be emitted.
    #[must_use]
    pub fn html_part(&self) -> Option<MessagePart> {
        self.html
            .as_deref()
            .filter(|html| !html.is_empty())
            .map(MessagePart::html)
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
    fn test_address_field_header_value() {
        assert_eq!(AddressField::from("raw text").to_header_value(), "raw text");
        assert_eq!(
            AddressField::from(Mailbox::with_name("A", "a@x.com")).to_header_value(),
            "\"A\" <a@x.com>"
        );
        assert_eq!(
            AddressField::from(vec![Mailbox::new("a@x.com"), Mailbox::new("b@x.com")])
                .to_header_value(),
            "<a@x.com>, <b@x.com>"
        );
        assert_eq!(AddressField::from(AddressList::None).to_header_value(), "");
    }

    #[test]
    fn test_disposition_display() {
        assert_eq!(Disposition::Inline.to_string(), "inline");
        assert_eq!(Disposition::Attachment.to_string(), "attachment");
    }

    #[test]
    fn test_html_suppresses_text_part() {
        let message = EmailMessage::new().text("plain").html("<b>rich</b>");
        assert!(message.text_part().is_none());
        assert_eq!(message.html_part(), Some(MessagePart::html("<b>rich</b>")));

        let message = EmailMessage::new().text("plain").html("");
        assert!(message.text_part().is_none());
        assert!(message.html_part().is_none());

        let message = EmailMessage::new().text("plain");
        assert_eq!(message.text_part(), Some(MessagePart::text("plain")));
    }

    #[test]
    fn test_part_content_type() {
        assert_eq!(
            MessagePart::text("x").content_type().to_string(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            MessagePart::html("x").content_type().to_string(),
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_attachment_builder() {
        let attachment = Attachment::new("logo.png", vec![1u8, 2, 3])
            .content_type("image/png")
            .inline()
            .cid("logo");

        assert_eq!(attachment.filename, "logo.png");
        assert_eq!(attachment.content_type.as_deref(), Some("image/png"));
        assert_eq!(attachment.disposition, Disposition::Inline);
        assert_eq!(attachment.cid.as_deref(), Some("logo"));
        assert_eq!(attachment.data.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_deserialize_message() {
        let json = serde_json::json!({
            "subject": "Hello",
            "from": { "name": "Sender", "email": "s@x.com" },
            "to": [{ "name": "A", "email": "a@x.com" }, { "email": "b@x.com" }],
            "cc": "raw@x.com",
            "headers": { "X-Mailer": "emlkit", "Received": ["one", "two"] },
            "text": "body",
            "attachments": [
                { "name": "a.txt", "data": "hello" },
                { "filename": "b.bin", "contentType": "application/pdf", "inline": true, "cid": "c1", "data": [1, 2, 3] }
            ]
        });

        let message = EmailMessage::deserialize(&json).unwrap();
        assert_eq!(message.subject.as_deref(), Some("Hello"));
        assert_eq!(
            message.from,
            Some(AddressField::List(AddressList::Single(Mailbox::with_name(
                "Sender", "s@x.com"
            ))))
        );
        assert_eq!(
            message.to.as_ref().unwrap().to_header_value(),
            "\"A\" <a@x.com>, <b@x.com>"
        );
        assert_eq!(message.cc, Some(AddressField::Raw("raw@x.com".to_string())));
        assert_eq!(message.headers.get_all("Received"), vec!["one", "two"]);

        assert_eq!(message.attachments.len(), 2);
        assert_eq!(message.attachments[0].filename, "a.txt");
        assert_eq!(message.attachments[0].data, AttachmentData::Text("hello".to_string()));
        assert_eq!(message.attachments[0].disposition, Disposition::Attachment);
        assert_eq!(message.attachments[1].disposition, Disposition::Inline);
        assert_eq!(message.attachments[1].cid.as_deref(), Some("c1"));
        assert_eq!(message.attachments[1].data, AttachmentData::Bytes(vec![1, 2, 3]));
    }
}
