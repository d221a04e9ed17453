//! Transcript entries.
//!
//! A [`Message`] is created once, stamped with the local clock time, and
//! never modified afterwards. The [`Transcript`] only grows.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Text typed by the person using the widget.
    User,
    /// Text produced by the generation service (or the fallback reply).
    Bot,
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    text: String,
    sender: Sender,
    timestamp: String,
}

impl Message {
    /// Create a user message stamped with the current time.
    pub fn user(text: impl Into<String>) -> Self {
        Self::stamped(Sender::User, text, &Local::now())
    }

    /// Create a bot message stamped with the current time.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::stamped(Sender::Bot, text, &Local::now())
    }

    /// Create a message stamped with the given instant.
    pub fn stamped<Tz: TimeZone>(sender: Sender, text: impl Into<String>, at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            text: text.into(),
            sender,
            timestamp: clock_label(at),
        }
    }

    /// Create a message with an already formatted timestamp.
    pub fn with_timestamp(
        sender: Sender,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: timestamp.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Clock time the message was created, e.g. `3:07:42 PM`.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Format an instant as a 12-hour clock label without a leading zero.
pub fn clock_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-I:%M:%S %p").to_string()
}

/// Ordered, append-only message history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Entries are never removed or reordered.
    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl FromIterator<Message> for Transcript {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}
