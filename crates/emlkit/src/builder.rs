//! Message builder: header block, blank line, multipart body.

use crate::assemble::HeaderAssembler;
use crate::boundary::BoundaryGenerator;
use crate::config::Config;
use crate::error::{BuildResult, Error};
use crate::message::EmailMessage;
use crate::multipart::MultipartBodyBuilder;
use rand::RngCore;
use rand::rngs::ThreadRng;
use serde::Deserialize;
use tracing::debug;

/// Builds complete EML documents.
///
/// The builder holds its configuration and boundary source; each call to
/// [`build`](Self::build) is independent of the previous ones.
///
/// # Example
///
/// ```
/// use emlkit::{EmailMessage, MessageBuilder};
///
/// let mut builder = MessageBuilder::new();
/// let eml = builder
///     .build(&EmailMessage::new().to("you@example.com").text("Hello"))
///     .unwrap();
/// assert!(eml.contains("To: you@example.com\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder<R = ThreadRng> {
    config: Config,
    boundaries: BoundaryGenerator<R>,
}

impl MessageBuilder<ThreadRng> {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a builder with a custom configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            boundaries: BoundaryGenerator::new(),
        }
    }
}

impl Default for MessageBuilder<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> MessageBuilder<R> {
    /// Creates a builder drawing boundaries from `rng`.
    #[must_use]
    pub const fn with_rng(config: Config, rng: R) -> Self {
        Self {
            config,
            boundaries: BoundaryGenerator::with_rng(rng),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the EML text of `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the message has no `To` recipient.
    pub fn build(&mut self, message: &EmailMessage) -> BuildResult {
        let assembled = HeaderAssembler::new(&self.config, &mut self.boundaries).assemble(message)?;

        let text = message.text_part();
        let html = message.html_part();
        let body = MultipartBodyBuilder::new(&assembled.boundary, &self.config).build(
            text.as_ref(),
            html.as_ref(),
            &message.attachments,
        );

        let mut eml = assembled.headers.to_string();
        eml.push_str("\r\n");
        eml.push_str(&body);

        debug!(
            boundary = %assembled.boundary,
            headers = assembled.headers.len(),
            attachments = message.attachments.len(),
            bytes = eml.len(),
            "Built message"
        );
        Ok(eml)
    }

    /// Builds the EML text of a message described as a JSON object.
    ///
    /// Recognized keys are `subject`, `from`, `to`, `cc`, `headers`, `text`,
    /// `html` and `attachments`; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputType`] if `value` is not an object or does not
    /// describe a message, and [`Error::Validation`] if it has no recipient.
    pub fn build_json(&mut self, value: &serde_json::Value) -> BuildResult {
        if !value.is_object() {
            return Err(Error::InputType(format!(
                "expected an object, got {}",
                json_kind(value)
            )));
        }
        let message =
            EmailMessage::deserialize(value).map_err(|e| Error::InputType(e.to_string()))?;
        self.build(&message)
    }
}

/// Builds `message` with a default builder.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the message has no `To` recipient.
pub fn build_eml(message: &EmailMessage) -> BuildResult {
    MessageBuilder::new().build(message)
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
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
    use crate::message::Attachment;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn builder() -> MessageBuilder<StdRng> {
        MessageBuilder::with_rng(Config::default(), StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_build_layout() {
        let message = EmailMessage::new()
            .header("Content-Type", "multipart/mixed; boundary=\"B\"")
            .subject("Hi")
            .to("you@x.com")
            .text("Hello");

        let eml = builder().build(&message).unwrap();
        assert_eq!(
            eml,
            concat!(
                "Content-Type: multipart/mixed; boundary=\"B\"\r\n",
                "Subject: Hi\r\n",
                "To: you@x.com\r\n",
                "X-Unsent: 1\r\n",
                "X-Priority: 1\r\n",
                "\r\n",
                "--B\r\n",
                "Content-Type: text/plain; charset=utf-8\r\n",
                "\r\n",
                "Hello\r\n",
                "\r\n",
                "--B--\r\n"
            )
        );
    }

    #[test]
    fn test_build_is_deterministic_with_seed() {
        let message = EmailMessage::new().to("you@x.com").text("Hello");
        assert_eq!(builder().build(&message), builder().build(&message));
    }

    #[test]
    fn test_build_uses_generated_boundary_in_body() {
        let eml = builder()
            .build(&EmailMessage::new().to("you@x.com").attach(Attachment::new("a.txt", "a")))
            .unwrap();

        let content_type = eml
            .lines()
            .find(|line| line.starts_with("Content-Type: multipart/mixed"))
            .unwrap();
        let boundary = emlkit_mime::extract_boundary(content_type).unwrap();
        assert!(eml.contains(&format!("--{boundary}\r\n")));
        assert!(eml.ends_with(&format!("--{boundary}--\r\n")));
    }

    #[test]
    fn test_build_missing_to() {
        let err = builder().build(&EmailMessage::new().text("Hello")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_build_json() {
        let value = json!({
            "to": [{"name": "You", "email": "you@x.com"}],
            "subject": "Hi",
            "html": "<b>Hi</b>",
            "attachments": [{"name": "a.txt", "data": "abc", "inline": true}]
        });

        let eml = builder().build_json(&value).unwrap();
        assert!(eml.contains("To: \"You\" <you@x.com>\r\n"));
        assert!(eml.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(eml.contains("Content-Disposition: inline; filename=\"a.txt\"\r\n"));
        assert!(eml.contains("\r\nYWJj\r\n"));
    }

    #[test]
    fn test_build_json_rejects_non_objects() {
        for value in [json!(null), json!("to"), json!(3), json!([1, 2])] {
            let err = builder().build_json(&value).unwrap_err();
            assert!(err.is_input_type(), "{value} should be rejected");
        }
    }

    #[test]
    fn test_build_json_rejects_malformed_fields() {
        let err = builder()
            .build_json(&json!({"to": "you@x.com", "attachments": "nope"}))
            .unwrap_err();
        assert!(err.is_input_type());
    }

    #[test]
    fn test_build_eml() {
        assert!(build_eml(&EmailMessage::new().to("you@x.com")).is_ok());
    }
}
