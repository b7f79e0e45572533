use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::{poll_fn, ready};
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use little_chat_model::{
    BackendError, ChatBackend, ChatRequest, ChatStream, ClientId,
    Conversation, ErrorKind, Message, StreamEvent,
};
use tokio::time::{Sleep, sleep};

#[derive(Debug)]
struct FakeBackendError(ErrorKind);

impl Display for FakeBackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeBackendError {}

impl BackendError for FakeBackendError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct FakeChatStream {
    fake_items: VecDeque<String>,
    done_sent: bool,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl FakeChatStream {
    fn new(input: &str) -> Self {
        let fake_items = format!("You said {}", input)
            .split(' ')
            .map(ToString::to_string)
            .collect();
        Self {
            fake_items,
            done_sent: false,
            sleep: None,
        }
    }
}

impl ChatStream for FakeChatStream {
    type Error = FakeBackendError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>> {
        let this = self.get_mut();
        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            if let Some(mut this_item) = this.fake_items.pop_front() {
                if !this.fake_items.is_empty() {
                    this_item.push(' ');
                }
                return Poll::Ready(Ok(Some(StreamEvent::Fragment(this_item))));
            }
            if !this.done_sent {
                this.done_sent = true;
                return Poll::Ready(Ok(Some(StreamEvent::Done)));
            }
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_event(cx)
    }
}

struct FakeBackend;

impl ChatBackend for FakeBackend {
    type Error = FakeBackendError;
    type Stream = FakeChatStream;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let result = if req.text.is_empty() {
            Err(FakeBackendError(ErrorKind::Status))
        } else {
            Ok(FakeChatStream::new(&req.text))
        };
        ready(result)
    }

    fn fetch_history(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>>
    + Send
    + 'static {
        ready(Ok(vec![Conversation {
            id: "conv:0".to_owned(),
            client_id: client_id.clone(),
            messages: vec![Message::user("Good morning")],
        }]))
    }
}

#[tokio::test]
async fn test_streamed_reply() {
    let backend = FakeBackend;
    let req = ChatRequest {
        client_id: ClientId::new("client"),
        text: "Good morning".to_owned(),
    };
    let mut stream = backend.send_chat(&req).await.unwrap();

    let mut reply = String::new();
    let mut done = false;
    loop {
        let event_fut =
            poll_fn(|cx| Pin::new(&mut stream).poll_next_event(cx));
        match event_fut.await {
            Ok(Some(StreamEvent::Fragment(fragment))) => {
                reply.push_str(&fragment);
            }
            Ok(Some(StreamEvent::Done)) => done = true,
            Ok(Some(event)) => unreachable!("unexpected event: {event:?}"),
            Ok(None) => break,
            Err(err) => unreachable!("unexpected error: {err:?}"),
        }
    }

    assert!(done);
    assert_eq!(reply, "You said Good morning");
}

#[tokio::test]
async fn test_error() {
    let backend = FakeBackend;
    let req = ChatRequest {
        client_id: ClientId::new("client"),
        text: String::new(),
    };
    let err = backend.send_chat(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
}

#[tokio::test]
async fn test_history_is_scoped() {
    let backend = FakeBackend;
    let client_id = ClientId::new("client");
    let history = backend.fetch_history(&client_id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].client_id, client_id);
}
