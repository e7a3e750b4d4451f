//! Common types used throughout the bot.

use crate::error::BotError;

/// What produced an inbox notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Reply or username mention in a comment thread
    CommentReply,
    /// Private message sent to the bot account
    DirectMessage,
}

/// An unread inbox notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxItem {
    /// Reddit fullname, e.g. `t1_abc123`
    pub id: String,
    pub kind: ItemKind,
    pub author: Option<String>,
    pub body: String,
}

impl InboxItem {
    #[must_use]
    pub fn is_comment_reply(&self) -> bool {
        self.kind == ItemKind::CommentReply
    }

    /// Author for log lines.
    #[must_use]
    pub fn author_tag(&self) -> &str {
        self.author.as_deref().unwrap_or("[deleted]")
    }
}

/// What happened to a single inbox item.
#[derive(Debug)]
pub enum ItemOutcome {
    /// Not a comment reply; left unread
    Skipped,
    /// No trigger keyword; marked read without a reply
    Ignored,
    /// Answered and marked read
    Replied { keyword: String },
    /// Answered, but marking read failed; may be answered again next run
    RepliedUnmarked { keyword: String, error: BotError },
}
