//! # emlkit-mime
//!
//! Header-level codecs used when building email messages.
//!
//! ## Features
//!
//! - **Encoded words**: RFC 2047 `=?charset?B|Q?...?=` decoding for display names
//! - **Quoted-Printable**: lenient decoding that reassembles multi-byte characters
//! - **Base64**: encoding with RFC 2045 76-column line wrapping
//! - **Address lists**: parsing `"Name" <email>` lists and formatting them back
//! - **Content types**: parameter handling and boundary extraction
//!
//! Decoders in this crate never fail: malformed input degrades to literal text.
//!
//! ## Quick Start
//!
//! ### Parsing Address Lists
//!
//! ```
//! use emlkit_mime::{AddressList, Mailbox, parse_address_list};
//!
//! let list = parse_address_list("\"PayPal\" <noreply@paypal.com>, bob@example.com");
//! assert_eq!(list.len(), 2);
//! assert_eq!(list.to_string(), "\"PayPal\" <noreply@paypal.com>, <bob@example.com>");
//! ```
//!
//! ### Decoding Header Text
//!
//! ```
//! use emlkit_mime::{decode_encoded_words, encoding::decode_quoted_printable};
//!
//! assert_eq!(decode_encoded_words("=?UTF-8?Q?Caf=C3=A9?="), "Café");
//! assert_eq!(decode_quoted_printable("Caf=C3=A9", None), "Café");
//! ```
//!
//! ### Non-UTF-8 Charsets
//!
//! Charsets other than UTF-8 go through a [`CharsetDecoder`]. The default,
//! [`EncodingRsDecoder`], is backed by `encoding_rs`; the `*_with` variants
//! accept any implementation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod charset;
mod content_type;
mod encoded_word;
mod error;

pub mod encoding;

pub use address::{
    AddressList, Mailbox, format_address_list, is_valid_email, parse_address_list,
    parse_address_list_with,
};
pub use charset::{CharsetDecoder, EncodingRsDecoder, normalize_charset};
pub use content_type::{ContentType, charset_param, extract_boundary, file_extension};
pub use encoded_word::{decode_encoded_words, decode_encoded_words_with};
pub use error::{Error, Result};
