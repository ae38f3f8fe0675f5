#![allow(clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: Build an .eml draft with an HTML body and attachments
//!
//! Writes the message to stdout, or to the path given as the first argument.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=emlkit=debug cargo run --package emlkit --example build_eml -- draft.eml
//! ```

use emlkit::{Attachment, EmailMessage, Mailbox, MessageBuilder, parse_address_list};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emlkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let recipients = parse_address_list("\"=?UTF-8?Q?Caf=C3=A9?= Team\" <team@example.com>, ops@example.com");

    let message = EmailMessage::new()
        .subject("Weekly summary")
        .from(Mailbox::with_name("Reports", "reports@example.com"))
        .to(recipients)
        .header("X-Mailer", "emlkit")
        .html("<h1>Summary</h1>\n<p>See the attached figures.</p>\n<img src=\"cid:chart\">")
        .attach(Attachment::new("figures.csv", "week,total\n1,42\n2,57\n").content_type("text/csv"))
        .attach(
            Attachment::new("chart.png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
                .content_type("image/png")
                .inline()
                .cid("chart"),
        );

    let eml = MessageBuilder::new().build(&message)?;

    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::write(&path, &eml)?;
            println!("Wrote {} bytes to {}", eml.len(), path);
        }
        None => print!("{}", eml),
    }

    Ok(())
}
