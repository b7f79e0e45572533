//! A chat backend that talks to the chat server over HTTP.
//!
//! Replies are read from a line-framed body where each `data:` line
//! carries either a JSON fragment or the `[DONE]` sentinel.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use little_chat_model::{
    BackendError, ChatBackend, ChatRequest, ClientId, Conversation, ErrorKind,
};
use mime::Mime;
use reqwest::{Client, Response, header};

pub use config::{HttpBackendConfig, HttpBackendConfigBuilder};
use io::{Chunks, DataLines};
pub use response::HttpChatStream;

const CHAT_PATH: &str = "/api/chat";
const HISTORY_PATH: &str = "/api/history";

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_status() {
            ErrorKind::Status
        } else if err.is_decode() {
            ErrorKind::Decode
        } else if err.is_connect() || err.is_timeout() || err.is_request() {
            ErrorKind::Network
        } else {
            ErrorKind::Other
        };
        Self::new(format!("{err}"), kind)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// HTTP chat backend.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpBackendConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    pub fn new(config: HttpBackendConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(Error::from_reqwest)?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }
}

impl ChatBackend for HttpBackend {
    type Error = Error;
    type Stream = HttpChatStream;

    fn send_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let body = proto::create_request(req);
        let resp_fut = self
            .client
            .post(self.config.endpoint(CHAT_PATH))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&body)
            .send();

        async move {
            let resp = resp_fut
                .await
                .and_then(Response::error_for_status)
                .map_err(Error::from_reqwest)?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse().ok())
                .is_some_and(|m: Mime| {
                    m.subtype().as_str() == "event-stream"
                });
            if !is_event_stream {
                // The framing is still line based, keep reading.
                warn!("unexpected content type: {content_type:?}");
            }

            let chunks = Chunks::from_response(resp);
            Ok(HttpChatStream::from_lines(DataLines::new(chunks)))
        }
    }

    fn fetch_history(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Vec<Conversation>, Self::Error>>
    + Send
    + 'static {
        let client = self.client.clone();
        let url = self.config.history_url(client_id);

        async move {
            let url = url?;
            trace!("fetching history from {url}");
            client
                .get(url)
                .header(header::ACCEPT, "application/json")
                .send()
                .await
                .and_then(Response::error_for_status)
                .map_err(Error::from_reqwest)?
                .json::<Vec<Conversation>>()
                .await
                .map_err(Error::from_reqwest)
        }
    }
}
