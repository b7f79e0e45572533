use std::error::Error;

use crate::error::ErrorKind;
use crate::message::{ClientId, Conversation};
use crate::request::ChatRequest;
use crate::stream::ChatStream;

/// The error type for a chat backend.
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a chat backend, which streams replies for new
/// user input and serves the stored conversations of a client.
///
/// Once the backend is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the backend should be prepared for being dropped anytime.
pub trait ChatBackend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// The reply stream type for this backend.
    type Stream: ChatStream<Error = Self::Error>;

    /// Sends a user message and opens the reply stream.
    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static;

    /// Fetches all stored conversations of a client, in backend order.
    fn fetch_history(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>>
    + Send
    + 'static;
}
