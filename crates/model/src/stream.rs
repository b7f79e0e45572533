use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};

use crate::backend::BackendError;

/// A streamed reply from the backend.
pub trait ChatStream: Sized + Send + 'static {
    /// The error type that may be returned by the stream.
    type Error: BackendError;

    /// Attempts to pull out the next event from the reply.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct stream state:
    ///
    /// - `Poll::Pending` means that this stream is still waiting for
    ///   the next event. Implementations will ensure that the current
    ///   task will be notified when the next event may be ready.
    /// - `Poll::Ready(Ok(Some(event)))` means the stream has an event
    ///   to deliver, and may produce further events on subsequent
    ///   `poll_next_event` calls.
    /// - `Poll::Ready(Ok(None))` means the underlying body has ended.
    ///   This may happen without a [`StreamEvent::Done`] ever being
    ///   delivered.
    /// - `Poll::Ready(Err(error))` means the transport failed while
    ///   reading the reply.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>>;
}

/// The event from a streamed reply.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Received the next fragment of assistant text.
    Fragment(String),
    /// Received a payload that could not be decoded.
    ///
    /// This is not fatal, the stream can still produce further events.
    Malformed {
        /// The raw payload.
        payload: String,
        /// Why decoding failed.
        reason: String,
    },
    /// Received the end-of-reply sentinel.
    Done,
}
