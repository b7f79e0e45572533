use std::pin::Pin;
use std::task::{Context, Poll, ready};

use little_chat_model::{ChatStream, ErrorKind, StreamEvent};
use pin_project_lite::pin_project;

use crate::Error;
use crate::io::{DataLines, DataLinesError};
use crate::proto::parse_payload;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<StreamEvent>, DataLines), Error>;

pin_project! {
    /// A streamed chat reply read from an HTTP response body.
    pub struct HttpChatStream {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl HttpChatStream {
    #[inline]
    pub(crate) fn from_lines(lines: DataLines) -> Self {
        let next_event_fut = async move { next_event(lines).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ChatStream for HttpChatStream {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<StreamEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, lines) = match ready!(next_event_fut.as_mut().poll(cx)) {
            Ok((Some(event), lines)) => (event, lines),
            Ok((None, _)) => {
                *this.next_event_fut = None;
                return Poll::Ready(Ok(None));
            }
            Err(err) => {
                *this.next_event_fut = None;
                return Poll::Ready(Err(err));
            }
        };

        // The body may still have more lines, create a new future for the
        // next event.
        let next_event_fut = async move { next_event(lines).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(
    mut lines: DataLines,
) -> Result<(Option<StreamEvent>, DataLines), Error> {
    let event = match lines.next_data().await {
        Ok(Some(payload)) => {
            trace!("got data line: {payload}");
            parse_payload(payload)
        }
        Ok(None) => return Ok((None, lines)),
        Err(DataLinesError::InvalidUtf8(payload)) => StreamEvent::Malformed {
            payload,
            reason: "payload is not valid UTF-8".to_owned(),
        },
        Err(DataLinesError::ChunksError(err)) => {
            return Err(Error::new(err.0, ErrorKind::Network));
        }
    };
    Ok((Some(event), lines))
}
