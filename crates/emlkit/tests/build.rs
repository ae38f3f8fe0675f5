//! Integration tests for message building.
//!
//! Every build uses a seeded RNG so generated boundaries are reproducible.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use emlkit::{Attachment, Config, EmailMessage, Error, Mailbox, MessageBuilder, extract_boundary};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;

fn builder() -> MessageBuilder<StdRng> {
    MessageBuilder::with_rng(Config::default(), StdRng::seed_from_u64(2024))
}

fn count_lines(eml: &str, prefix: &str) -> usize {
    eml.split("\r\n").filter(|line| line.starts_with(prefix)).count()
}

fn message_boundary(eml: &str) -> Option<&str> {
    eml.split("\r\n")
        .find(|line| line.starts_with("Content-Type: multipart/"))
        .and_then(extract_boundary)
}

fn has_bare_line_feed(eml: &str) -> bool {
    eml.bytes()
        .enumerate()
        .any(|(i, b)| b == b'\n' && (i == 0 || eml.as_bytes()[i - 1] != b'\r'))
}

#[test]
fn test_full_message() {
    let message = EmailMessage::new()
        .header("Content-Type", "multipart/mixed; boundary=\"XYZ\"")
        .header("Message-ID", "<1@x.com>")
        .subject("Report")
        .from(Mailbox::with_name("Sender", "sender@x.com"))
        .to(vec![
            Mailbox::with_name("A", "a@x.com"),
            Mailbox::with_name("B", "b@y.com"),
        ])
        .text("ignored")
        .html("<p>Hi</p>")
        .attach(Attachment::new("hi.txt", "hi").content_type("text/plain"));

    let eml = builder().build(&message).unwrap();
    assert_eq!(
        eml,
        concat!(
            "Content-Type: multipart/mixed; boundary=\"XYZ\"\r\n",
            "Message-ID: <1@x.com>\r\n",
            "Subject: Report\r\n",
            "From: \"Sender\" <sender@x.com>\r\n",
            "To: \"A\" <a@x.com>, \"B\" <b@y.com>\r\n",
            "X-Unsent: 1\r\n",
            "X-Priority: 1\r\n",
            "\r\n",
            "--XYZ\r\n",
            "Content-Type: text/html; charset=utf-8\r\n",
            "\r\n",
            "<p>Hi</p>\r\n",
            "\r\n",
            "--XYZ\r\n",
            "Content-Type: text/plain\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "Content-Disposition: attachment; filename=\"hi.txt\"\r\n",
            "\r\n",
            "aGk=\r\n",
            "\r\n",
            "--XYZ--\r\n"
        )
    );
}

#[test]
fn test_missing_to_produces_no_output() {
    let result = builder().build(&EmailMessage::new().subject("x").text("body"));
    assert_eq!(result, Err(Error::Validation("missing To".to_string())));
}

#[test]
fn test_html_suppresses_text() {
    let eml = builder()
        .build(&EmailMessage::new().to("a@x.com").text("plain").html("<b>rich</b>"))
        .unwrap();

    assert_eq!(count_lines(&eml, "Content-Type: text/html"), 1);
    assert_eq!(count_lines(&eml, "Content-Type: text/plain"), 0);
    assert!(!eml.contains("plain"));
}

#[test]
fn test_attachment_wrapped_at_76() {
    let eml = builder()
        .build(&EmailMessage::new().to("a@x.com").attach(Attachment::new("z.bin", vec![0xFFu8; 150])))
        .unwrap();

    let lines: Vec<&str> = eml
        .split("\r\n")
        .filter(|line| line.starts_with("////"))
        .collect();
    assert_eq!(lines.iter().map(|l| l.len()).collect::<Vec<_>>(), vec![76, 76, 48]);
}

#[test]
fn test_custom_boundary_used_for_every_delimiter() {
    let message = EmailMessage::new()
        .header("Content-Type", "multipart/mixed; boundary=\"XYZ\"")
        .to("a@x.com")
        .text("hello")
        .attach(Attachment::new("a", "a"))
        .attach(Attachment::new("b", "b"));

    let eml = builder().build(&message).unwrap();
    let delimiters: Vec<&str> = eml
        .split("\r\n")
        .filter(|line| line.starts_with("--"))
        .collect();
    assert_eq!(delimiters, vec!["--XYZ", "--XYZ", "--XYZ", "--XYZ--"]);
}

#[test]
fn test_generated_boundary_matches_body() {
    let eml = builder().build(&EmailMessage::new().to("a@x.com").text("hi")).unwrap();
    let boundary = message_boundary(&eml).unwrap();

    assert!(boundary.starts_with("----="));
    assert_eq!(boundary.len(), 37);
    assert!(eml.contains(&format!("\r\n--{boundary}\r\n")));
    assert!(eml.ends_with(&format!("--{boundary}--\r\n")));
}

#[test]
fn test_build_json_input_type() {
    let err = builder().build_json(&json!("not an object")).unwrap_err();
    assert!(err.is_input_type());

    let eml = builder()
        .build_json(&json!({
            "headers": { "Received": ["one", "two"] },
            "to": "a@x.com",
            "attachments": [{ "contentType": "image/png", "data": [137, 80, 78, 71] }]
        }))
        .unwrap();
    assert!(eml.starts_with("Received: one\r\nReceived: two\r\nTo: a@x.com\r\n"));
    assert!(eml.contains("filename=\"attachment_1.png\""));
    assert!(eml.contains("\r\niVBORw==\r\n"));
}

#[test]
fn test_inline_attachment() {
    let message = EmailMessage::new()
        .to("a@x.com")
        .html("<img src=\"cid:logo\">")
        .attach(
            Attachment::new("logo.png", vec![1u8, 2, 3])
                .content_type("image/png")
                .inline()
                .cid("logo"),
        );

    let eml = builder().build(&message).unwrap();
    assert!(eml.contains("Content-Disposition: inline; filename=\"logo.png\"\r\nContent-ID: <logo>\r\n"));
}

proptest! {
    #[test]
    fn prop_exactly_one_to_line(
        to in "[a-z]{1,8}@[a-z]{1,8}\\.com",
        subject in "[ -~]{0,40}",
        text in "[a-zA-Z0-9 .,]{0,80}",
        seed in any::<u64>(),
    ) {
        let mut builder = MessageBuilder::with_rng(Config::default(), StdRng::seed_from_u64(seed));
        let eml = builder
            .build(&EmailMessage::new().subject(subject).to(to.as_str()).text(text))
            .unwrap();
        prop_assert_eq!(count_lines(&eml, "To:"), 1);
    }

    #[test]
    fn prop_no_bare_line_feed(
        subject in "[a-z\n]{0,30}",
        text in "[a-z\r\n]{0,80}",
        html in proptest::option::of("[a-z<>/\n]{0,80}"),
    ) {
        let mut message = EmailMessage::new().subject(subject).to("a@x.com").text(text);
        if let Some(html) = html {
            message = message.html(html);
        }
        let eml = builder().build(&message).unwrap();
        prop_assert!(!has_bare_line_feed(&eml));
        prop_assert!(eml.ends_with("\r\n"));
    }
}
