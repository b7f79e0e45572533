use std::fmt::{self, Display, Formatter};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durable identifier that scopes stored conversations to one client.
///
/// The value is opaque to the client. It is generated once, persisted,
/// and reused across sessions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Wraps an existing identifier.
    #[inline]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Generates a new globally unique identifier.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who produced a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// Text typed by the user.
    User,
    /// Text generated by the assistant.
    System,
}

/// A single entry of a transcript.
///
/// Messages are values: growing an assistant reply produces a new
/// `Message` each time rather than editing an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// The producer of this message.
    pub speaker: Speaker,
    /// The message text.
    pub text: String,
    /// Creation time as an RFC 3339 UTC string, e.g.
    /// `2024-05-01T12:00:00.000Z`.
    pub timestamp: String,
}

impl Message {
    /// Creates a message stamped with the current time.
    #[inline]
    pub fn new<S: Into<String>>(speaker: Speaker, text: S) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: now_timestamp(),
        }
    }

    /// Creates a user message stamped with the current time.
    #[inline]
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self::new(Speaker::User, text)
    }

    /// Creates an assistant message stamped with the current time.
    #[inline]
    pub fn system<S: Into<String>>(text: S) -> Self {
        Self::new(Speaker::System, text)
    }
}

/// A stored conversation owned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conversation {
    /// Backend-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// The client this conversation belongs to.
    #[serde(rename = "clientId")]
    pub client_id: ClientId,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
