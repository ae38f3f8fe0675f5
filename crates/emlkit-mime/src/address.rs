//! Address-list parsing and formatting.
//!
//! Parses header values such as `"PayPal" <noreply@paypal.com>, bob@example.com`
//! into [`Mailbox`] values and formats them back into header text.

use crate::charset::{CharsetDecoder, EncodingRsDecoder};
use crate::encoded_word::decode_encoded_words_with;
use std::fmt;
use tracing::debug;

/// Mailbox (optional display name + address).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mailbox {
    /// Display name (optional).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub name: Option<String>,
    /// Email address.
    pub email: String,
}

impl Mailbox {
    /// Creates a new mailbox with just an address.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Creates a new mailbox with a display name and address.
    #[must_use]
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }
}

/// Formats as `"name" <email>`, or only the part that is present.
impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().filter(|name| !name.is_empty());
        if let Some(name) = name {
            write!(f, "\"{name}\"")?;
        }
        if !self.email.is_empty() {
            if name.is_some() {
                f.write_str(" ")?;
            }
            write!(f, "<{}>", self.email)?;
        }
        Ok(())
    }
}

/// Ordered list of mailboxes.
///
/// Keeps the legacy shape of parsed address headers: no address, a single
/// mailbox, or several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum AddressList {
    /// No address.
    #[default]
    None,
    /// Exactly one mailbox.
    Single(Mailbox),
    /// Two or more mailboxes, in order of appearance.
    Many(Vec<Mailbox>),
}

impl AddressList {
    /// Parses a raw comma-separated address list.
    ///
    /// Display names are decoded with [`EncodingRsDecoder`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        parse_address_list(raw)
    }

    /// Builds a list from pre-validated address strings.
    ///
    /// Entries failing [`is_valid_email`] are dropped.
    pub fn from_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        emails
            .into_iter()
            .filter_map(|email| {
                let email = email.as_ref().trim();
                if is_valid_email(email) {
                    Some(Mailbox::new(email))
                } else {
                    debug!(email, "Dropping invalid address");
                    None
                }
            })
            .collect()
    }

    /// Returns the mailboxes as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Mailbox] {
        match self {
            Self::None => &[],
            Self::Single(mailbox) => std::slice::from_ref(mailbox),
            Self::Many(mailboxes) => mailboxes,
        }
    }

    /// Returns an iterator over the mailboxes.
    pub fn iter(&self) -> impl Iterator<Item = &Mailbox> {
        self.as_slice().iter()
    }

    /// Returns the number of mailboxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the list holds no mailbox.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Consumes the list, returning the mailboxes.
    #[must_use]
    pub fn into_vec(self) -> Vec<Mailbox> {
        match self {
            Self::None => Vec::new(),
            Self::Single(mailbox) => vec![mailbox],
            Self::Many(mailboxes) => mailboxes,
        }
    }
}

impl From<Mailbox> for AddressList {
    fn from(mailbox: Mailbox) -> Self {
        Self::Single(mailbox)
    }
}

impl From<Vec<Mailbox>> for AddressList {
    fn from(mut mailboxes: Vec<Mailbox>) -> Self {
        match mailboxes.len() {
            0 => Self::None,
            1 => mailboxes.pop().map_or(Self::None, Self::Single),
            _ => Self::Many(mailboxes),
        }
    }
}

impl FromIterator<Mailbox> for AddressList {
    fn from_iter<T: IntoIterator<Item = Mailbox>>(iter: T) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

/// Formats each mailbox and joins them with `", "`.
impl fmt::Display for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, mailbox) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{mailbox}")?;
        }
        Ok(())
    }
}

/// Parses a raw comma-separated address list.
///
/// ```
/// use emlkit_mime::{AddressList, Mailbox, parse_address_list};
///
/// let list = parse_address_list("\"A\" <a@x.com>, \"B\" <b@y.com>");
/// assert_eq!(list.as_slice(), &[
///     Mailbox::with_name("A", "a@x.com"),
///     Mailbox::with_name("B", "b@y.com"),
/// ]);
///
/// assert_eq!(parse_address_list("a@x.com"), AddressList::Single(Mailbox::new("a@x.com")));
/// ```
#[must_use]
pub fn parse_address_list(raw: &str) -> AddressList {
    parse_address_list_with(raw, &EncodingRsDecoder)
}

/// Parses a raw address list, decoding display names with `decoder`.
///
/// Tokens are split on commas outside double quotes. A token that is only a
/// quoted string names the mailbox in the following token; if no token
/// follows, the name is dropped. Tokens of the form `name <email>` yield a
/// named mailbox; anything else is taken as a bare address. Empty addresses
/// are skipped.
#[must_use]
pub fn parse_address_list_with(raw: &str, decoder: &dyn CharsetDecoder) -> AddressList {
    let mut mailboxes = Vec::new();
    let mut tokens = split_tokens(raw).into_iter();

    while let Some(mut token) = tokens.next() {
        let mut name = None;

        if is_quoted(token.trim()) {
            name = display_name(token, decoder);
            let Some(next) = tokens.next() else {
                debug!(name = ?name, "Dropping display name without address");
                break;
            };
            token = next;
        }

        let token = token.trim();
        let email = match split_angle_addr(token) {
            Some((name_part, email)) => {
                if let Some(decoded) = display_name(name_part, decoder) {
                    name = Some(decoded);
                }
                email.trim()
            }
            None => token,
        };

        if email.is_empty() {
            continue;
        }

        mailboxes.push(Mailbox {
            name,
            email: email.to_string(),
        });
    }

    mailboxes.into()
}

/// Formats an address list as header text.
#[must_use]
pub fn format_address_list(list: &AddressList) -> String {
    list.to_string()
}

/// Checks that `email` looks like `local@domain.tld`.
///
/// No whitespace, exactly one `@`, and a dot inside the domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Splits on commas that are not inside a quoted string.
///
/// A token starting with a quote ends at the closing quote, so
/// `"Doe, John" <j@x.com>` yields the name and the address as two tokens.
fn split_tokens(raw: &str) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b',' {
            i += 1;
            continue;
        }

        let start = i;
        if bytes[i] == b'"' {
            if let Some(close) = raw[i + 1..].find('"') {
                i += close + 2;
                tokens.push(&raw[start..i]);
                continue;
            }
        }

        let mut in_quotes = false;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => in_quotes = !in_quotes,
                b',' if !in_quotes => break,
                _ => {}
            }
            i += 1;
        }
        tokens.push(&raw[start..i]);
    }

    tokens
}

fn is_quoted(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}

/// Splits `name <email>` into its name part and the text inside the brackets.
fn split_angle_addr(token: &str) -> Option<(&str, &str)> {
    let inner = token.strip_suffix('>')?;
    let open = inner.find('<')?;
    Some((&inner[..open], &inner[open + 1..]))
}

/// Decodes encoded words, strips quotes and trims; empty names become `None`.
fn display_name(raw: &str, decoder: &dyn CharsetDecoder) -> Option<String> {
    let decoded = decode_encoded_words_with(raw, decoder).replace('"', "");
    let name = decoded.trim();
    (!name.is_empty()).then(|| name.to_string())
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
    use proptest::prelude::*;

    #[test]
    fn test_parse_two_named() {
        let list = parse_address_list("\"A\" <a@x.com>, \"B\" <b@y.com>");
        assert_eq!(
            list,
            AddressList::Many(vec![
                Mailbox::with_name("A", "a@x.com"),
                Mailbox::with_name("B", "b@y.com"),
            ])
        );
    }

    #[test]
    fn test_parse_bare_address() {
        let list = parse_address_list("a@x.com");
        assert_eq!(list, AddressList::Single(Mailbox::new("a@x.com")));
        assert!(list.as_slice()[0].name.is_none());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_address_list(""), AddressList::None);
        assert_eq!(parse_address_list(" , ,"), AddressList::None);
        assert!(parse_address_list("").is_empty());
    }

    #[test]
    fn test_parse_unquoted_name() {
        let list = parse_address_list("John Doe <john@example.com>");
        assert_eq!(
            list,
            AddressList::Single(Mailbox::with_name("John Doe", "john@example.com"))
        );
    }

    #[test]
    fn test_parse_comma_inside_quotes() {
        let list = parse_address_list("a@x.com, \"Doe, John\" <j@x.com>");
        assert_eq!(
            list.as_slice(),
            &[
                Mailbox::new("a@x.com"),
                Mailbox::with_name("Doe, John", "j@x.com"),
            ]
        );
    }

    #[test]
    fn test_parse_leading_quoted_name_with_comma() {
        let list = parse_address_list("\"Doe, John\" <j@x.com>");
        assert_eq!(
            list,
            AddressList::Single(Mailbox::with_name("Doe, John", "j@x.com"))
        );
    }

    #[test]
    fn test_parse_pending_name_pairs_with_next_token() {
        let list = parse_address_list("\"Jane\", jane@example.com");
        assert_eq!(
            list,
            AddressList::Single(Mailbox::with_name("Jane", "jane@example.com"))
        );
    }

    #[test]
    fn test_parse_pending_name_without_address_is_dropped() {
        let list = parse_address_list("a@x.com, \"Orphan\"");
        assert_eq!(list, AddressList::Single(Mailbox::new("a@x.com")));
    }

    #[test]
    fn test_parse_encoded_display_name() {
        let list = parse_address_list("\"=?utf-8?B?SMOpbGxv?=\" <h@x.com>");
        assert_eq!(list, AddressList::Single(Mailbox::with_name("Héllo", "h@x.com")));

        let list = parse_address_list("=?utf-8?Q?Caf=C3=A9?= <c@x.com>");
        assert_eq!(list, AddressList::Single(Mailbox::with_name("Café", "c@x.com")));
    }

    #[test]
    fn test_parse_empty_name_and_brackets() {
        let list = parse_address_list("<a@x.com>");
        assert_eq!(list, AddressList::Single(Mailbox::new("a@x.com")));

        assert_eq!(parse_address_list("Nobody <>"), AddressList::None);
    }

    #[test]
    fn test_format_single() {
        assert_eq!(
            Mailbox::with_name("PayPal", "noreply@paypal.com").to_string(),
            "\"PayPal\" <noreply@paypal.com>"
        );
        assert_eq!(Mailbox::new("a@x.com").to_string(), "<a@x.com>");
        assert_eq!(Mailbox::with_name("", "a@x.com").to_string(), "<a@x.com>");
    }

    #[test]
    fn test_format_list() {
        let list = AddressList::Many(vec![
            Mailbox::with_name("A", "a@x.com"),
            Mailbox::new("b@y.com"),
        ]);
        assert_eq!(format_address_list(&list), "\"A\" <a@x.com>, <b@y.com>");
        assert_eq!(format_address_list(&AddressList::None), "");
    }

    #[test]
    fn test_format_parse_is_stable_for_canonical_input() {
        let canonical = "\"A\" <a@x.com>, \"B\" <b@y.com>";
        assert_eq!(format_address_list(&parse_address_list(canonical)), canonical);
    }

    #[test]
    fn test_from_vec_keeps_shape() {
        assert_eq!(AddressList::from(Vec::new()), AddressList::None);
        assert_eq!(
            AddressList::from(vec![Mailbox::new("a@x.com")]),
            AddressList::Single(Mailbox::new("a@x.com"))
        );
        assert_eq!(AddressList::from(vec![Mailbox::new("a@x.com")]).len(), 1);
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b@sub.example.co.uk"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn test_from_emails_drops_invalid() {
        let list = AddressList::from_emails(["alice@example.com", "nope", " bob@example.org "]);
        assert_eq!(
            list.into_vec(),
            vec![Mailbox::new("alice@example.com"), Mailbox::new("bob@example.org")]
        );
    }

    proptest! {
        #[test]
        fn prop_canonical_lists_are_stable(
            entries in proptest::collection::vec(("[A-Za-z][A-Za-z ]{0,10}[A-Za-z]", "[a-z]{1,8}@[a-z]{1,8}\\.com"), 1..5)
        ) {
            let list: AddressList = entries
                .iter()
                .map(|(name, email)| Mailbox::with_name(name.clone(), email.clone()))
                .collect();
            let formatted = format_address_list(&list);
            let reparsed = parse_address_list(&formatted);
            prop_assert_eq!(&reparsed, &list);
            prop_assert_eq!(format_address_list(&reparsed), formatted);
        }
    }
}
