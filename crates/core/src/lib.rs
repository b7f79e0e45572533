//! Core logic of the chat client, including the client identity, the
//! transcript, conversation history and the session that drives them
//! against a backend.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod backend_client;
mod error;
pub mod history;
pub mod identity;
mod session;
pub mod storage;
pub mod transcript;

pub use error::{Error, ErrorKind};
pub use little_chat_model::{ClientId, Conversation, Message, Speaker};
pub use session::{
    ChatSession, DEFAULT_STREAM_IDLE_TIMEOUT, SessionBuilder, SubmitOutcome,
};
