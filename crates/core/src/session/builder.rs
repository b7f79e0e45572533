use std::time::Duration;

use little_chat_model::ChatBackend;

use super::ChatSession;
use crate::backend_client::BackendClient;
use crate::history::HistoryView;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::transcript::{Transcript, TranscriptEvent};

/// How long a reply may stay silent before the submission gives up.
pub const DEFAULT_STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// [`ChatSession`] builder.
pub struct SessionBuilder {
    client: BackendClient,
    store: Box<dyn KeyValueStore>,
    stream_idle_timeout: Option<Duration>,
    on_transcript: Option<Box<dyn Fn(&TranscriptEvent) + Send + Sync>>,
    on_history: Option<Box<dyn Fn(&HistoryView) + Send + Sync>>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified backend.
    ///
    /// The client identity is kept in memory unless a durable store is
    /// set with [`SessionBuilder::with_store`].
    #[inline]
    pub fn with_backend<B: ChatBackend + 'static>(backend: B) -> Self {
        Self {
            client: BackendClient::new(backend),
            store: Box::new(MemoryStore::default()),
            stream_idle_timeout: Some(DEFAULT_STREAM_IDLE_TIMEOUT),
            on_transcript: None,
            on_history: None,
        }
    }

    /// Sets the store that keeps the client identity.
    #[inline]
    pub fn with_store<S: KeyValueStore + 'static>(mut self, store: S) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Sets how long a reply may stay silent. `None` waits forever.
    #[inline]
    pub fn with_stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// Attaches a callback to be invoked when the transcript changes.
    #[inline]
    pub fn on_transcript(
        mut self,
        on_transcript: impl Fn(&TranscriptEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_transcript = Some(Box::new(on_transcript));
        self
    }

    /// Attaches a callback to be invoked after every history fetch.
    #[inline]
    pub fn on_history(
        mut self,
        on_history: impl Fn(&HistoryView) + Send + Sync + 'static,
    ) -> Self {
        self.on_history = Some(Box::new(on_history));
        self
    }

    /// Builds the session. Call [`ChatSession::start`] before submitting.
    pub fn build(self) -> ChatSession {
        let SessionBuilder {
            client,
            store,
            stream_idle_timeout,
            on_transcript,
            on_history,
        } = self;

        ChatSession {
            client,
            store,
            stream_idle_timeout,
            client_id: None,
            input: String::new(),
            transcript: Transcript::default(),
            history: HistoryView::default(),
            on_transcript,
            on_history,
        }
    }
}
