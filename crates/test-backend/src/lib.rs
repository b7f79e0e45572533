//! A local fake chat backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use little_chat_model::{
    BackendError, ChatBackend, ChatRequest, ChatStream, ClientId,
    Conversation, ErrorKind, Message, StreamEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct State {
    replies: VecDeque<PresetReply>,
    conversations: Vec<Conversation>,
    requests: Vec<ChatRequest>,
    history_requests: Vec<ClientId>,
    history_unavailable: bool,
    next_conversation_id: u64,
}

pub struct TestChatStream {
    backend: TestBackend,
    request: ChatRequest,
    events: Vec<PresetEvent>,
    event_idx: usize,
    reply: String,
    stalled: bool,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ChatStream for TestChatStream {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>> {
        let this = self.get_mut();
        if this.stalled {
            return Poll::Pending;
        }

        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            let Some(event) = this.events.get(this.event_idx).cloned() else {
                return Poll::Ready(Ok(None));
            };
            this.event_idx += 1;

            let event = match event {
                PresetEvent::Fragment(fragment) => {
                    this.reply.push_str(&fragment);
                    StreamEvent::Fragment(fragment)
                }
                PresetEvent::Malformed(payload) => StreamEvent::Malformed {
                    payload,
                    reason: "preset malformed payload".to_owned(),
                },
                PresetEvent::Done => {
                    // Like the real server, the exchange is stored before
                    // the sentinel goes out.
                    this.backend.save_conversation(&this.request, &this.reply);
                    StreamEvent::Done
                }
                PresetEvent::Stall => {
                    this.stalled = true;
                    return Poll::Pending;
                }
                PresetEvent::Disconnect => {
                    return Poll::Ready(Err(Error {
                        message: "connection reset",
                        kind: ErrorKind::Network,
                    }));
                }
            };
            return Poll::Ready(Ok(Some(event)));
        }
        this.sleep = Some(Box::pin(sleep(
            this.backend.delay.unwrap_or(Duration::from_millis(1)),
        )));
        Pin::new(this).poll_next_event(cx)
    }
}

/// A local fake chat backend for testing purpose.
///
/// Before sending requests, you need to script the replies, one per chat
/// request, in the order they will be consumed. If there are no replies
/// left, an error will be returned. Clones share the same script and
/// stored conversations, so a test can keep a clone for inspection.
///
/// Completed exchanges are stored as conversations and served by
/// `fetch_history`, just like the real server does.
#[derive(Clone, Default)]
pub struct TestBackend {
    state: Arc<Mutex<State>>,
    delay: Option<Duration>,
}

impl TestBackend {
    #[inline]
    pub fn add_reply(&mut self, reply: PresetReply) {
        self.state().replies.push_back(reply);
    }

    #[inline]
    pub fn add_conversation(&mut self, conversation: Conversation) {
        self.state().conversations.push(conversation);
    }

    #[inline]
    pub fn set_history_unavailable(&mut self, unavailable: bool) {
        self.state().history_unavailable = unavailable;
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns the chat requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.state().requests.clone()
    }

    /// Returns the clients whose history has been requested so far.
    pub fn history_requests(&self) -> Vec<ClientId> {
        self.state().history_requests.clone()
    }

    /// Returns all stored conversations.
    pub fn conversations(&self) -> Vec<Conversation> {
        self.state().conversations.clone()
    }

    fn save_conversation(&self, request: &ChatRequest, reply: &str) {
        let mut state = self.state();
        let id = format!("conv:{}", state.next_conversation_id);
        state.next_conversation_id += 1;
        state.conversations.push(Conversation {
            id,
            client_id: request.client_id.clone(),
            messages: vec![
                Message::user(request.text.clone()),
                Message::system(reply),
            ],
        });
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for TestBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestBackend")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl ChatBackend for TestBackend {
    type Error = crate::Error;
    type Stream = TestChatStream;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            let mut state = self.state();
            state.requests.push(req.clone());
            let Some(reply) = state.replies.pop_front() else {
                break 'blk Err(Error {
                    message: "no enough replies",
                    kind: ErrorKind::Other,
                });
            };
            if reply.rejected {
                break 'blk Err(Error {
                    message: "request rejected",
                    kind: ErrorKind::Status,
                });
            }
            Ok(TestChatStream {
                backend: self.clone(),
                request: req.clone(),
                events: reply.events,
                event_idx: 0,
                reply: String::new(),
                stalled: false,
                sleep: None,
            })
        };
        ready(result)
    }

    fn fetch_history(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>>
    + Send
    + 'static {
        let mut state = self.state();
        state.history_requests.push(client_id.clone());
        let result = if state.history_unavailable {
            Err(Error {
                message: "history unavailable",
                kind: ErrorKind::Status,
            })
        } else {
            Ok(state
                .conversations
                .iter()
                .filter(|c| &c.client_id == client_id)
                .cloned()
                .collect())
        };
        ready(result)
    }
}
