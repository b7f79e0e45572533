use serde::{Deserialize, Serialize};

/// The events in a preset reply.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    /// Delivers a text fragment.
    #[serde(rename = "fragment")]
    Fragment(String),
    /// Delivers a payload that cannot be decoded.
    #[serde(rename = "malformed")]
    Malformed(String),
    /// Delivers the end-of-reply sentinel.
    #[serde(rename = "done")]
    Done,
    /// Never delivers anything again.
    #[serde(rename = "stall")]
    Stall,
    /// Fails the transport.
    #[serde(rename = "disconnect")]
    Disconnect,
}

/// The preset reply for one chat request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetReply {
    /// Events in this reply.
    pub events: Vec<PresetEvent>,
    /// If set, the request itself is rejected and no stream is opened.
    pub rejected: bool,
}

impl PresetReply {
    /// Creates a `PresetReply` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            rejected: false,
        }
    }

    /// Creates a reply that streams the fragments and then the sentinel.
    pub fn with_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut events: Vec<_> = fragments
            .into_iter()
            .map(|f| PresetEvent::Fragment(f.into()))
            .collect();
        events.push(PresetEvent::Done);
        Self::with_events(events)
    }

    /// Creates a reply whose request is rejected by the backend.
    #[inline]
    pub fn rejected() -> Self {
        Self {
            events: vec![],
            rejected: true,
        }
    }
}
