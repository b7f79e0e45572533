use little_chat_model::{ChatRequest, StreamEvent};
use serde::{Deserialize, Serialize};

/// The payload that marks the end of a reply.
pub const DONE_SENTINEL: &str = "[DONE]";

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct FragmentPayload {
    pub content: String,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User { content: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatRequestBody {
    messages: Vec<Message>,
    #[serde(rename = "clientId")]
    client_id: String,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ChatRequest) -> ChatRequestBody {
    ChatRequestBody {
        messages: vec![Message::User {
            content: req.text.clone(),
        }],
        client_id: req.client_id.as_str().to_owned(),
    }
}

/// Decodes one `data:` payload into a stream event.
pub fn parse_payload(payload: String) -> StreamEvent {
    if payload == DONE_SENTINEL {
        return StreamEvent::Done;
    }
    match serde_json::from_str::<FragmentPayload>(&payload) {
        Ok(fragment) => StreamEvent::Fragment(fragment.content),
        Err(err) => StreamEvent::Malformed {
            payload,
            reason: format!("{err}"),
        },
    }
}
