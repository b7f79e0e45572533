//! Data model and backend abstraction for the chat client.
//!
//! This crate establishes the protocol between a chat session and the
//! backend that serves replies and stored conversations, so that the
//! session can be driven by a real HTTP server or a scripted fake
//! without changing the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that backend implementors should adhere to.

#![deny(missing_docs)]

mod backend;
mod error;
mod message;
mod request;
mod stream;

pub use backend::*;
pub use error::*;
pub use message::*;
pub use request::*;
pub use stream::*;
