use crate::ClientId;

/// A chat request to be sent to the backend.
///
/// Only the newly submitted user text is carried, the backend does not
/// receive the rest of the transcript.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatRequest {
    /// The client that owns the exchange.
    pub client_id: ClientId,
    /// The user input, as typed.
    pub text: String,
}
