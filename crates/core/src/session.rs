mod builder;

use std::mem;
use std::time::Duration;

use futures_util::StreamExt;
use little_chat_model::{ChatRequest, ClientId, Message, StreamEvent};
use tokio::time::timeout;

pub use builder::{DEFAULT_STREAM_IDLE_TIMEOUT, SessionBuilder};

use crate::Error;
use crate::backend_client::{BackendClient, EventStream};
use crate::history::HistoryView;
use crate::identity::{self, Identity};
use crate::storage::KeyValueStore;
use crate::transcript::{Transcript, TranscriptEvent};

type TranscriptObserver = Box<dyn Fn(&TranscriptEvent) + Send + Sync>;
type HistoryObserver = Box<dyn Fn(&HistoryView) + Send + Sync>;

/// The result of a submission that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// The input was blank, nothing happened.
    Ignored,
    /// The reply reached the end-of-reply sentinel.
    Completed,
    /// The reply ended without the sentinel. Whatever arrived is kept as
    /// the last message.
    Incomplete,
}

/// A chat session, like a window that displays messages, a history
/// sidebar and has an input box.
///
/// All operations take `&mut self`, so one session never runs two
/// submissions at the same time.
pub struct ChatSession {
    client: BackendClient,
    store: Box<dyn KeyValueStore>,
    stream_idle_timeout: Option<Duration>,
    client_id: Option<ClientId>,
    input: String,
    transcript: Transcript,
    history: HistoryView,

    on_transcript: Option<TranscriptObserver>,
    on_history: Option<HistoryObserver>,
}

impl ChatSession {
    /// Resolves the client identity, and loads the history if the client
    /// is not new.
    ///
    /// A failed history load does not fail this method, it is recorded in
    /// [`ChatSession::history`] instead.
    pub async fn start(&mut self) -> Result<Identity, Error> {
        let identity = identity::resolve(self.store.as_ref())?;
        self.client_id = Some(identity.client_id.clone());
        if !identity.is_new {
            self.refresh_history().await.ok();
        }
        Ok(identity)
    }

    /// Returns the client identifier, once started.
    #[inline]
    pub fn client_id(&self) -> Option<&ClientId> {
        self.client_id.as_ref()
    }

    /// Returns the current input text.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input text.
    #[inline]
    pub fn set_input<S: Into<String>>(&mut self, input: S) {
        self.input = input.into();
    }

    /// Returns the transcript.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the history view.
    #[inline]
    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    /// Submits the current input and streams the reply into the
    /// transcript.
    ///
    /// Blank input is ignored and left in place. Otherwise the user
    /// message is appended and the input cleared before the request is
    /// sent, so a failed request still leaves the message visible.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, Error> {
        if self.input.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        let client_id = self.client_id.clone().ok_or_else(Error::not_started)?;

        // A previous submission may have been dropped mid-reply.
        self.end_stream();
        let text = mem::take(&mut self.input);
        let event = self.transcript.push(Message::user(text.clone()));
        self.emit_transcript(&event);

        let events = self
            .client
            .send_chat(ChatRequest { client_id, text })
            .await
            .map_err(Error::backend)?;
        let outcome = self.receive_reply(events).await?;

        if outcome == SubmitOutcome::Completed {
            // A failure is kept in the history view.
            self.refresh_history().await.ok();
        }
        Ok(outcome)
    }

    async fn receive_reply(
        &mut self,
        mut events: EventStream,
    ) -> Result<SubmitOutcome, Error> {
        loop {
            let next = match self.stream_idle_timeout {
                Some(duration) => match timeout(duration, events.next()).await
                {
                    Ok(next) => next,
                    Err(_) => {
                        self.end_stream();
                        return Err(Error::timed_out(duration));
                    }
                },
                None => events.next().await,
            };

            let event = match next {
                Some(Ok(event)) => event,
                Some(Err(err)) => {
                    self.end_stream();
                    return Err(Error::backend(err));
                }
                None => {
                    self.end_stream();
                    return Ok(SubmitOutcome::Incomplete);
                }
            };

            match event {
                StreamEvent::Fragment(fragment) => {
                    let event = self.transcript.push_fragment(&fragment);
                    self.emit_transcript(&event);
                }
                StreamEvent::Malformed { payload, reason } => {
                    warn!("discarding malformed payload {payload:?}: {reason}");
                }
                StreamEvent::Done => {
                    let event = self.transcript.finalize();
                    self.emit_transcript(&event);
                    return Ok(SubmitOutcome::Completed);
                }
            }
        }
    }

    /// Fetches the history of the current client.
    ///
    /// On failure the previous list is kept and the error is recorded in
    /// the history view.
    pub async fn refresh_history(&mut self) -> Result<(), Error> {
        let client_id = self.client_id.clone().ok_or_else(Error::not_started)?;
        let result = match self.client.fetch_history(client_id).await {
            Ok(conversations) => {
                debug!("loaded {} conversations", conversations.len());
                self.history.replace(conversations);
                Ok(())
            }
            Err(err) => {
                self.history.record_error(format!("{err}"));
                Err(Error::backend(err))
            }
        };
        if let Some(on_history) = &self.on_history {
            on_history(&self.history);
        }
        result
    }

    /// Shows the stored messages of a history entry in the transcript,
    /// discarding the live transcript.
    pub fn select_history(&mut self, index: usize) -> Result<(), Error> {
        let Some(conversation) = self.history.get(index) else {
            return Err(Error::no_such_conversation(index));
        };
        let event = self.transcript.replace_all(conversation.messages.clone());
        self.emit_transcript(&event);
        Ok(())
    }

    fn end_stream(&mut self) {
        if self.transcript.end_stream() {
            warn!("reply ended early, keeping the partial message");
        }
    }

    #[inline]
    fn emit_transcript(&self, event: &TranscriptEvent) {
        if let Some(on_transcript) = &self.on_transcript {
            on_transcript(event);
        }
    }
}
