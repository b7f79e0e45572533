use std::pin::Pin;
use std::sync::Arc;
use std::task::{Poll, ready};

use futures_util::{Stream, stream};
use little_chat_model::{
    BackendError, ChatBackend, ChatRequest, ChatStream, ClientId,
    Conversation, StreamEvent,
};
use tracing::Instrument;

pub type BoxedBackendError = Box<dyn BackendError>;
pub type EventStream =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, BoxedBackendError>> + Send>>;

type BoxedFuture<T> =
    Pin<Box<dyn Future<Output = Result<T, BoxedBackendError>> + Send>>;
type SendChatFn = Arc<dyn Fn(ChatRequest) -> BoxedFuture<EventStream> + Send + Sync>;
#[rustfmt::skip]
type FetchHistoryFn = Arc<
    dyn Fn(ClientId) -> BoxedFuture<Vec<Conversation>> + Send + Sync
>;

/// A wrapper around a chat backend that provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct BackendClient {
    send_chat_fn: SendChatFn,
    fetch_history_fn: FetchHistoryFn,
}

impl BackendClient {
    pub fn new<B: ChatBackend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since the session doesn't have a
        // generic parameter and we don't want it either.
        let backend = Arc::new(backend);

        let send_chat_fn: SendChatFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move |req| {
                let fut = backend.send_chat(&req);
                Box::pin(
                    async move {
                        trace!("sending a chat request: {req:?}");
                        match fut.await {
                            Ok(stream) => Ok(into_event_stream(stream)),
                            Err(err) => {
                                error!("chat request failed: {err:?}");
                                Err(Box::new(err) as BoxedBackendError)
                            }
                        }
                    }
                    .instrument(trace_span!("send chat")),
                )
            })
        };

        let fetch_history_fn: FetchHistoryFn = Arc::new(move |client_id| {
            let fut = backend.fetch_history(&client_id);
            Box::pin(
                async move {
                    let conversations = fut.await.map_err(|err| {
                        error!("history request failed: {err:?}");
                        Box::new(err) as BoxedBackendError
                    })?;
                    trace!(
                        "got {} conversations for {client_id}",
                        conversations.len()
                    );
                    Ok(conversations)
                }
                .instrument(trace_span!("fetch history")),
            )
        });

        Self {
            send_chat_fn,
            fetch_history_fn,
        }
    }

    /// Sends a chat request and returns the reply events.
    ///
    /// # Cancel safety
    ///
    /// Dropping the returned stream stops reading the reply.
    #[inline]
    pub async fn send_chat(
        &self,
        req: ChatRequest,
    ) -> Result<EventStream, BoxedBackendError> {
        (self.send_chat_fn)(req).await
    }

    #[inline]
    pub async fn fetch_history(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<Conversation>, BoxedBackendError> {
        (self.fetch_history_fn)(client_id).await
    }
}

fn into_event_stream<S: ChatStream>(stream: S) -> EventStream {
    let mut stream = Box::pin(stream);
    Box::pin(stream::poll_fn(move |cx| {
        let event = match ready!(stream.as_mut().poll_next_event(cx)) {
            Ok(Some(event)) => {
                trace!("got an event: {event:?}");
                Ok(event)
            }
            Ok(None) => return Poll::Ready(None),
            Err(err) => Err(Box::new(err) as BoxedBackendError),
        };
        Poll::Ready(Some(event))
    }))
}
