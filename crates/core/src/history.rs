//! Conversation history of the current client.

use little_chat_model::Conversation;

/// Number of characters kept in a conversation summary.
pub const SUMMARY_LEN: usize = 30;

const EMPTY_SUMMARY: &str = "(empty conversation)";

/// The last fetched history list and the outcome of the latest fetch.
///
/// A failed fetch keeps the previous list and records the error, so a
/// stale list is never shown as if it were fresh.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryView {
    conversations: Vec<Conversation>,
    last_error: Option<String>,
    loaded: bool,
}

impl HistoryView {
    /// Returns the conversations in backend order.
    #[inline]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Returns the conversation at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Conversation> {
        self.conversations.get(index)
    }

    /// Returns the error of the latest fetch, if it failed.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns `true` once any fetch has succeeded.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns one summary line per conversation.
    pub fn summaries(&self) -> impl Iterator<Item = String> + '_ {
        self.conversations.iter().map(summarize)
    }

    pub(crate) fn replace(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.last_error = None;
        self.loaded = true;
    }

    pub(crate) fn record_error(&mut self, error: String) {
        self.last_error = Some(error);
    }
}

/// Summarizes a conversation by the beginning of its first message.
pub fn summarize(conversation: &Conversation) -> String {
    let Some(first) = conversation.messages.first() else {
        return EMPTY_SUMMARY.to_owned();
    };
    let mut summary: String = first.text.chars().take(SUMMARY_LEN).collect();
    summary.push_str("...");
    summary
}
