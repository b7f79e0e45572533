//! The transcript of the active chat.

use little_chat_model::Message;

/// A change to the transcript, delivered to the transcript observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TranscriptEvent {
    /// A message was appended at `index`.
    Appended {
        /// Position of the new message.
        index: usize,
        /// The new message.
        message: Message,
    },
    /// The in-progress reply at `index` was replaced by a longer one.
    Updated {
        /// Position of the reply, always the last one.
        index: usize,
        /// The replacement message.
        message: Message,
        /// The text added by this update.
        delta: String,
    },
    /// The reply at `index` was completed.
    Finalized {
        /// Position of the reply.
        index: usize,
        /// The completed message.
        message: Message,
    },
    /// The whole transcript was replaced.
    Replaced {
        /// The new transcript content.
        messages: Vec<Message>,
    },
}

#[derive(Clone, Debug)]
struct StreamingReply {
    index: usize,
    text: String,
}

/// The ordered messages of the active chat, plus the accumulator of the
/// reply currently being streamed, if any.
///
/// While a reply is streaming it is always the last message. Growing it
/// replaces that last element and never touches earlier ones.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    streaming: Option<StreamingReply>,
}

impl Transcript {
    /// Returns the messages in chronological order.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the last message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns `true` while a reply is being streamed.
    #[inline]
    pub fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    /// Appends a message. A reply still marked as streaming, left behind
    /// by a cancelled submission, is kept as it is and no longer grows.
    pub(crate) fn push(&mut self, message: Message) -> TranscriptEvent {
        self.end_stream();
        let index = self.messages.len();
        self.messages.push(message.clone());
        TranscriptEvent::Appended { index, message }
    }

    /// Adds a fragment to the streaming reply, starting one if needed.
    pub(crate) fn push_fragment(&mut self, fragment: &str) -> TranscriptEvent {
        let Some(streaming) = &mut self.streaming else {
            let index = self.messages.len();
            let message = Message::system(fragment);
            self.messages.push(message.clone());
            self.streaming = Some(StreamingReply {
                index,
                text: fragment.to_owned(),
            });
            return TranscriptEvent::Appended { index, message };
        };

        debug_assert_eq!(streaming.index + 1, self.messages.len());
        streaming.text.push_str(fragment);
        let index = streaming.index;
        let message = Message::system(streaming.text.clone());
        self.messages[index] = message.clone();
        TranscriptEvent::Updated {
            index,
            message,
            delta: fragment.to_owned(),
        }
    }

    /// Completes the streaming reply with a fresh timestamp. A reply that
    /// never received a fragment is appended with empty text.
    pub(crate) fn finalize(&mut self) -> TranscriptEvent {
        match self.streaming.take() {
            Some(StreamingReply { index, text }) => {
                let message = Message::system(text);
                self.messages[index] = message.clone();
                TranscriptEvent::Finalized { index, message }
            }
            None => {
                let index = self.messages.len();
                let message = Message::system("");
                self.messages.push(message.clone());
                TranscriptEvent::Finalized { index, message }
            }
        }
    }

    /// Stops streaming, keeping whatever was received as the final entry.
    ///
    /// Returns `true` if a partial reply was kept.
    pub(crate) fn end_stream(&mut self) -> bool {
        self.streaming.take().is_some()
    }

    pub(crate) fn replace_all(&mut self, messages: Vec<Message>) -> TranscriptEvent {
        self.streaming = None;
        self.messages = messages.clone();
        TranscriptEvent::Replaced { messages }
    }
}

#[cfg(test)]
mod tests {
    use little_chat_model::Speaker;

    use super::*;

    #[test]
    fn test_fragments_grow_last_message() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hi"));

        let event = transcript.push_fragment("Hel");
        assert!(matches!(event, TranscriptEvent::Appended { index: 1, .. }));
        let event = transcript.push_fragment("lo");
        let TranscriptEvent::Updated { index, message, delta } = event else {
            panic!("unexpected event: {event:?}");
        };
        assert_eq!(index, 1);
        assert_eq!(message.text, "Hello");
        assert_eq!(delta, "lo");

        let event = transcript.finalize();
        assert!(matches!(event, TranscriptEvent::Finalized { index: 1, .. }));
        assert!(!transcript.is_streaming());

        let messages = transcript.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Hi");
        assert_eq!(messages[0].speaker, Speaker::User);
        assert_eq!(messages[1].text, "Hello");
        assert_eq!(messages[1].speaker, Speaker::System);
    }

    #[test]
    fn test_finalize_without_fragments() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hi"));
        transcript.finalize();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().text, "");
    }

    #[test]
    fn test_end_stream_keeps_partial_reply() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hi"));
        transcript.push_fragment("Par");
        assert!(transcript.end_stream());
        assert!(!transcript.end_stream());

        // The next reply starts a new message.
        transcript.push(Message::user("More"));
        transcript.push_fragment("Ok");
        let texts: Vec<_> =
            transcript.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["Hi", "Par", "More", "Ok"]);
    }

    #[test]
    fn test_push_ends_abandoned_reply() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hi"));
        transcript.push_fragment("Old");

        transcript.push(Message::user("Again"));
        assert!(!transcript.is_streaming());
        let event = transcript.push_fragment("New");
        assert!(matches!(event, TranscriptEvent::Appended { index: 3, .. }));

        let texts: Vec<_> =
            transcript.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["Hi", "Old", "Again", "New"]);
    }

    #[test]
    fn test_replace_all() {
        let mut transcript = Transcript::default();
        transcript.push(Message::user("Hi"));
        transcript.push_fragment("Par");

        let messages = vec![Message::user("a"), Message::system("b")];
        transcript.replace_all(messages.clone());
        assert_eq!(transcript.messages(), messages.as_slice());
        assert!(!transcript.is_streaming());
    }
}
