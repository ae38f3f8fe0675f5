//! # emlkit
//!
//! Builds RFC 5322 / MIME multipart messages (`.eml` files) from a
//! structured description.
//!
//! ## Features
//!
//! - **Header assembly**: caller headers, convenience `Subject`/`From`/`To`/`Cc`
//!   fields and the forced draft markers, in a fixed order
//! - **Multipart bodies**: text or HTML part plus Base64 attachments, inline
//!   parts with Content-ID
//! - **JSON input**: build straight from a `serde_json::Value`
//! - **Deterministic output**: inject a seeded RNG for reproducible boundaries
//!
//! ## Quick Start
//!
//! ```
//! use emlkit::{Attachment, EmailMessage, Mailbox, MessageBuilder};
//!
//! let message = EmailMessage::new()
//!     .subject("Quarterly report")
//!     .from(Mailbox::with_name("Reports", "reports@example.com"))
//!     .to("team@example.com")
//!     .html("<p>See attached.</p>")
//!     .attach(Attachment::new("report.csv", "a,b\n1,2\n").content_type("text/csv"));
//!
//! let eml = MessageBuilder::new().build(&message)?;
//! assert!(eml.starts_with("Subject: Quarterly report\r\n"));
//! assert!(eml.contains("X-Unsent: 1\r\n"));
//! # Ok::<(), emlkit::Error>(())
//! ```
//!
//! ### From JSON
//!
//! ```
//! use emlkit::MessageBuilder;
//! use serde_json::json;
//!
//! let eml = MessageBuilder::new().build_json(&json!({
//!     "to": [{ "name": "PayPal", "email": "noreply@paypal.com" }],
//!     "text": "Hello",
//! }))?;
//! assert!(eml.contains("To: \"PayPal\" <noreply@paypal.com>\r\n"));
//! # Ok::<(), emlkit::Error>(())
//! ```
//!
//! Header-level codecs (encoded words, quoted-printable, address lists) live
//! in `emlkit-mime` and are re-exported here.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod assemble;
mod boundary;
mod builder;
mod config;
mod error;
mod header;
mod message;
mod multipart;

pub use assemble::{AssembledHeaders, FORCED_HEADERS, HeaderAssembler};
pub use boundary::BoundaryGenerator;
pub use builder::{MessageBuilder, build_eml};
pub use config::{Config, ConfigBuilder, DEFAULT_ATTACHMENT_TYPE, DEFAULT_BOUNDARY_PREFIX};
pub use error::{BuildResult, Error, Result};
pub use header::{HeaderValue, Headers};
pub use message::{
    AddressField, Attachment, AttachmentData, Disposition, EmailMessage, MessagePart, PartKind,
};
pub use multipart::MultipartBodyBuilder;

pub use emlkit_mime::{
    AddressList, CharsetDecoder, ContentType, EncodingRsDecoder, Mailbox, decode_encoded_words,
    encoding, extract_boundary, format_address_list, is_valid_email, parse_address_list,
};
