//! Header assembly: convenience fields, forced headers, validation and
//! boundary resolution.

use crate::boundary::BoundaryGenerator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::message::EmailMessage;
use emlkit_mime::{ContentType, extract_boundary};
use rand::RngCore;
use tracing::{debug, warn};

/// Headers forced into every message; callers cannot override them.
pub const FORCED_HEADERS: [(&str, &str); 2] = [("X-Unsent", "1"), ("X-Priority", "1")];

/// Header map ready for rendering, with the boundary the body must use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledHeaders {
    /// Headers in emission order.
    pub headers: Headers,
    /// Multipart boundary, without the leading `--`.
    pub boundary: String,
}

/// Builds the header map of a message.
#[derive(Debug)]
pub struct HeaderAssembler<'a, R> {
    config: &'a Config,
    boundaries: &'a mut BoundaryGenerator<R>,
}

impl<'a, R: RngCore> HeaderAssembler<'a, R> {
    /// Creates an assembler drawing boundaries from `boundaries`.
    pub fn new(config: &'a Config, boundaries: &'a mut BoundaryGenerator<R>) -> Self {
        Self { config, boundaries }
    }

    /// Assembles the headers of `message`.
    ///
    /// Caller headers come first, then `Subject`, `From`, `To` and `Cc` from
    /// the convenience fields, then the forced headers. A `Content-Type` is
    /// synthesized when absent; otherwise its boundary parameter is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if no `To` value is present.
    pub fn assemble(self, message: &EmailMessage) -> Result<AssembledHeaders> {
        let mut headers = message.headers.clone();

        if let Some(subject) = &message.subject {
            headers.set("Subject", subject.as_str());
        }

        let fields = [("From", &message.from), ("To", &message.to), ("Cc", &message.cc)];
        for (name, field) in fields {
            if let Some(field) = field {
                headers.set(name, field.to_header_value());
            }
        }

        for (name, value) in FORCED_HEADERS {
            headers.set(name, value);
        }

        if headers.get_value("To").is_none_or(|to| to.is_blank()) {
            return Err(Error::missing_to());
        }

        let boundary = self.resolve_boundary(&mut headers);
        Ok(AssembledHeaders { headers, boundary })
    }

    fn resolve_boundary(self, headers: &mut Headers) -> String {
        let Some(content_type) = headers.get("Content-Type") else {
            let boundary = self.boundaries.boundary(&self.config.boundary_prefix);
            debug!(%boundary, "Generated multipart boundary");
            headers.set(
                "Content-Type",
                ContentType::multipart_mixed(boundary.as_str()).to_string(),
            );
            return boundary;
        };

        if let Some(boundary) = extract_boundary(content_type) {
            debug!(boundary, "Using boundary from supplied Content-Type");
            return boundary.to_string();
        }

        warn!(
            content_type,
            "Supplied Content-Type has no boundary, generating one"
        );
        self.boundaries.boundary(&self.config.boundary_prefix)
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
    use crate::header::HeaderValue;
    use emlkit_mime::{AddressList, Mailbox};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assemble(message: &EmailMessage) -> Result<AssembledHeaders> {
        let config = Config::default();
        let mut boundaries = BoundaryGenerator::with_rng(StdRng::seed_from_u64(3));
        HeaderAssembler::new(&config, &mut boundaries).assemble(message)
    }

    #[test]
    fn test_header_order() {
        let message = EmailMessage::new()
            .header("X-Custom", "custom")
            .subject("Hi")
            .from("me@x.com")
            .to("you@x.com")
            .cc("them@x.com");

        let assembled = assemble(&message).unwrap();
        let names: Vec<&str> = assembled.headers.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                "X-Custom",
                "Subject",
                "From",
                "To",
                "Cc",
                "X-Unsent",
                "X-Priority",
                "Content-Type"
            ]
        );
    }

    #[test]
    fn test_structured_addresses_are_formatted() {
        let message = EmailMessage::new()
            .from(Mailbox::with_name("Me", "me@x.com"))
            .to(vec![Mailbox::with_name("A", "a@x.com"), Mailbox::new("b@x.com")]);

        let assembled = assemble(&message).unwrap();
        assert_eq!(assembled.headers.get("From"), Some("\"Me\" <me@x.com>"));
        assert_eq!(assembled.headers.get("To"), Some("\"A\" <a@x.com>, <b@x.com>"));
    }

    #[test]
    fn test_forced_headers_override_caller() {
        let message = EmailMessage::new()
            .header("X-Priority", "5")
            .to("you@x.com");

        let assembled = assemble(&message).unwrap();
        assert_eq!(assembled.headers.get("X-Priority"), Some("1"));
        assert_eq!(assembled.headers.get("X-Unsent"), Some("1"));
    }

    #[test]
    fn test_missing_to_fails() {
        let err = assemble(&EmailMessage::new().subject("No recipient")).unwrap_err();
        assert_eq!(err, Error::Validation("missing To".to_string()));

        let err = assemble(&EmailMessage::new().to("")).unwrap_err();
        assert!(err.is_validation());

        let err = assemble(&EmailMessage::new().to(AddressList::None)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_to_from_caller_headers_is_accepted() {
        let message = EmailMessage::new().header("To", "you@x.com");
        assert!(assemble(&message).is_ok());
    }

    #[test]
    fn test_generated_boundary() {
        let assembled = assemble(&EmailMessage::new().to("you@x.com")).unwrap();
        assert!(assembled.boundary.starts_with("----="));
        assert_eq!(assembled.boundary.len(), 37);
        assert_eq!(
            assembled.headers.get("Content-Type").unwrap(),
            format!("multipart/mixed; boundary=\"{}\"", assembled.boundary)
        );
    }

    #[test]
    fn test_boundary_from_supplied_content_type() {
        let message = EmailMessage::new()
            .header("Content-Type", "multipart/mixed; boundary=\"XYZ\"")
            .to("you@x.com");

        let assembled = assemble(&message).unwrap();
        assert_eq!(assembled.boundary, "XYZ");
        assert_eq!(
            assembled.headers.get("Content-Type"),
            Some("multipart/mixed; boundary=\"XYZ\"")
        );
    }

    #[test]
    fn test_content_type_without_boundary_keeps_header() {
        let message = EmailMessage::new()
            .header("Content-Type", "multipart/mixed")
            .to("you@x.com");

        let assembled = assemble(&message).unwrap();
        assert!(assembled.boundary.starts_with("----="));
        assert_eq!(assembled.headers.get("Content-Type"), Some("multipart/mixed"));
    }

    #[test]
    fn test_multi_value_header_preserved() {
        let message = EmailMessage::new()
            .header(
                "Received",
                HeaderValue::Multiple(vec!["a".to_string(), "b".to_string()]),
            )
            .to("you@x.com");

        let assembled = assemble(&message).unwrap();
        assert_eq!(assembled.headers.get_all("Received"), vec!["a", "b"]);
    }
}
