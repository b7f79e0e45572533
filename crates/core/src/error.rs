use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::io;
use std::time::Duration;

use little_chat_model::ErrorKind as BackendErrorKind;

use crate::backend_client::BoxedBackendError;

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The durable storage could not be read or written.
    Storage,
    /// The backend failed to serve a request.
    Backend,
    /// The reply stream stayed silent for too long.
    TimedOut,
    /// The session has not been started yet.
    NotStarted,
    /// The selected history entry does not exist.
    NoSuchConversation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Storage => write!(f, "Storage error"),
            ErrorKind::Backend => write!(f, "Backend error"),
            ErrorKind::TimedOut => write!(f, "Timed out"),
            ErrorKind::NotStarted => write!(f, "Session not started"),
            ErrorKind::NoSuchConversation => write!(f, "No such conversation"),
        }
    }
}

#[derive(Debug)]
enum Source {
    Io(io::Error),
    Backend(BoxedBackendError),
}

/// Describes a session error.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    reason: Option<String>,
    source: Option<Source>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            reason: None,
            source: None,
        }
    }

    #[inline]
    pub(crate) fn storage<S: Into<String>>(err: io::Error, context: S) -> Self {
        Self {
            kind: ErrorKind::Storage,
            reason: Some(format!("{}: {err}", context.into())),
            source: Some(Source::Io(err)),
        }
    }

    #[inline]
    pub(crate) fn backend(err: BoxedBackendError) -> Self {
        Self {
            kind: ErrorKind::Backend,
            reason: Some(format!("{err}")),
            source: Some(Source::Backend(err)),
        }
    }

    #[inline]
    pub(crate) fn timed_out(after: Duration) -> Self {
        Self::new(ErrorKind::TimedOut).with_reason(format!(
            "no reply data for {} seconds",
            after.as_secs_f32()
        ))
    }

    #[inline]
    pub(crate) fn not_started() -> Self {
        Self::new(ErrorKind::NotStarted)
    }

    #[inline]
    pub(crate) fn no_such_conversation(index: usize) -> Self {
        Self::new(ErrorKind::NoSuchConversation)
            .with_reason(format!("no conversation at index {index}"))
    }

    #[inline]
    fn with_reason<S: Into<String>>(self, reason: S) -> Self {
        Self {
            reason: Some(reason.into()),
            ..self
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the backend error kind, if the backend caused this error.
    pub fn backend_kind(&self) -> Option<BackendErrorKind> {
        match &self.source {
            Some(Source::Backend(err)) => Some(err.kind()),
            _ => None,
        }
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> Cow<'_, str> {
        match self.reason.as_deref() {
            Some(reason) => Cow::Borrowed(reason),
            None => Cow::Owned(format!("{}", self.kind)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.source {
            Some(Source::Io(err)) => Some(err),
            Some(Source::Backend(err)) => {
                let err: &(dyn StdError + 'static) = &**err;
                Some(err)
            }
            None => None,
        }
    }
}
