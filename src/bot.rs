//! Inbox processing loop.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use crate::error::Result;
use crate::keyword::KeywordExtractor;
use crate::response::ResponseComposer;
use crate::types::{InboxItem, ItemOutcome};

/// Messaging platform capabilities the bot relies on.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Name of the authenticated account.
    async fn me(&self) -> Result<String>;

    /// Every currently unread inbox item, in delivery order.
    async fn unread(&self) -> Result<Vec<InboxItem>>;

    async fn reply(&self, item: &InboxItem, text: &str) -> Result<()>;

    async fn mark_read(&self, item: &InboxItem) -> Result<()>;
}

/// Totals for one pass over the inbox.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub replied: usize,
    pub ignored: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub struct InboxBot<'a, P: Platform> {
    platform: &'a P,
    extractor: &'a KeywordExtractor,
    composer: &'a ResponseComposer,
    pacing: Duration,
}

impl<'a, P: Platform> InboxBot<'a, P> {
    #[must_use]
    pub fn new(
        platform: &'a P,
        extractor: &'a KeywordExtractor,
        composer: &'a ResponseComposer,
        pacing: Duration,
    ) -> Self {
        Self {
            platform,
            extractor,
            composer,
            pacing,
        }
    }

    /// Drain the unread inbox once.
    ///
    /// # Errors
    ///
    /// Returns an error if the unread listing cannot be fetched or the
    /// session stops being valid mid-run. Failures confined to one item are
    /// logged and counted instead.
    pub async fn process_unread(&self) -> Result<RunSummary> {
        let items = self.platform.unread().await?;
        info!("Found {} unread inbox items", items.len());

        let mut summary = RunSummary::default();
        for item in &items {
            match self.process_item(item).await {
                Ok(ItemOutcome::Skipped) => {
                    debug!("Skipping direct message {}", item.id);
                    summary.skipped += 1;
                }
                Ok(ItemOutcome::Ignored) => {
                    debug!("No keyword in {}, marked read", item.id);
                    summary.ignored += 1;
                }
                Ok(ItemOutcome::Replied { keyword }) => {
                    info!(
                        "Replied to {} from u/{} with keyword: {keyword}",
                        item.id,
                        item.author_tag()
                    );
                    summary.replied += 1;
                    self.pace().await;
                }
                Ok(ItemOutcome::RepliedUnmarked { keyword, error }) => {
                    if error.is_fatal() {
                        error!("Session error marking {} read: {error}", item.id);
                        return Err(error);
                    }
                    warn!(
                        "Replied to {} with keyword {keyword} but could not mark it read: {error}",
                        item.id
                    );
                    summary.replied += 1;
                    self.pace().await;
                }
                Err(e) if e.is_fatal() => {
                    error!("Session error while processing {}: {e}", item.id);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Error processing message {}: {e}", item.id);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Handle one inbox item. Replies before marking read, so a failed reply
    /// leaves the item unread for the next run.
    async fn process_item(&self, item: &InboxItem) -> Result<ItemOutcome> {
        if !item.is_comment_reply() {
            return Ok(ItemOutcome::Skipped);
        }

        let Some(keyword) = self.extractor.extract(&item.body) else {
            self.platform.mark_read(item).await?;
            return Ok(ItemOutcome::Ignored);
        };

        info!("Processing message {} with keyword: {keyword}", item.id);
        let response = self.composer.compose(&keyword);

        self.platform.reply(item, &response).await?;
        match self.platform.mark_read(item).await {
            Ok(()) => Ok(ItemOutcome::Replied { keyword }),
            Err(error) => Ok(ItemOutcome::RepliedUnmarked { keyword, error }),
        }
    }

    /// Wait out the pacing interval; follows every posted reply.
    async fn pace(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }
}

/// Log the authenticated account, then drain the inbox once.
///
/// # Errors
///
/// Returns an error if the platform session is unusable.
pub async fn run_once<P: Platform>(
    platform: &P,
    extractor: &KeywordExtractor,
    composer: &ResponseComposer,
    pacing: Duration,
) -> Result<RunSummary> {
    let name = platform.me().await?;
    info!("Bot started as u/{name}");

    let summary = InboxBot::new(platform, extractor, composer, pacing)
        .process_unread()
        .await?;

    info!(
        "Finished processing messages: {} replied, {} ignored, {} skipped, {} failed",
        summary.replied, summary.ignored, summary.skipped, summary.failed
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{fs, sync::Mutex};

    use reqwest::StatusCode;
    use tempfile::TempDir;

    use crate::config::FaqStrategy;
    use crate::error::BotError;
    use crate::faq::{FaqResolver, MANIFEST_FILE};
    use crate::response::FOOTER_FILE;
    use crate::types::ItemKind;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Reply(String, String),
        MarkRead(String),
    }

    #[derive(Default)]
    struct FakePlatform {
        items: Vec<InboxItem>,
        calls: Mutex<Vec<Call>>,
        failing_reply: Option<String>,
        forbidden_reply: Option<String>,
        failing_mark_read: Option<String>,
        expired_session: bool,
    }

    impl FakePlatform {
        fn with_items(items: Vec<InboxItem>) -> Self {
            Self {
                items,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl Platform for FakePlatform {
        async fn me(&self) -> Result<String> {
            Ok("xeqtbot".to_string())
        }

        async fn unread(&self) -> Result<Vec<InboxItem>> {
            Ok(self.items.clone())
        }

        async fn reply(&self, item: &InboxItem, text: &str) -> Result<()> {
            if self.expired_session {
                return Err(BotError::RedditApi {
                    status: StatusCode::UNAUTHORIZED,
                    message: "expired".to_string(),
                });
            }
            if self.failing_reply.as_deref() == Some(item.id.as_str()) {
                return Err(BotError::RedditResponse("RATELIMIT".to_string()));
            }
            if self.forbidden_reply.as_deref() == Some(item.id.as_str()) {
                return Err(BotError::RedditApi {
                    status: StatusCode::FORBIDDEN,
                    message: "Forbidden".to_string(),
                });
            }
            self.calls
                .lock()
                .expect("calls lock")
                .push(Call::Reply(item.id.clone(), text.to_string()));
            Ok(())
        }

        async fn mark_read(&self, item: &InboxItem) -> Result<()> {
            if self.failing_mark_read.as_deref() == Some(item.id.as_str()) {
                return Err(BotError::RedditApi {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "boom".to_string(),
                });
            }
            self.calls
                .lock()
                .expect("calls lock")
                .push(Call::MarkRead(item.id.clone()));
            Ok(())
        }
    }

    fn comment(id: &str, body: &str) -> InboxItem {
        InboxItem {
            id: id.to_string(),
            kind: ItemKind::CommentReply,
            author: Some("investor".to_string()),
            body: body.to_string(),
        }
    }

    fn direct_message(id: &str, body: &str) -> InboxItem {
        InboxItem {
            kind: ItemKind::DirectMessage,
            ..comment(id, body)
        }
    }

    fn content_dir() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("faq")).expect("faq dir");
        fs::create_dir_all(root.join("template")).expect("template dir");
        fs::write(
            root.join(MANIFEST_FILE),
            "- [dividend, distributions](./faq/dividends.md)\n",
        )
        .expect("manifest");
        fs::write(root.join("faq/dividends.md"), "XEQT pays quarterly.").expect("faq");
        fs::write(root.join("template/unknown.md"), "Unknown keyword.").expect("fallback");
        fs::write(root.join(FOOTER_FILE), "— XEQT Bot").expect("footer");
        dir
    }

    async fn run(platform: &FakePlatform) -> Result<RunSummary> {
        run_paced(platform, Duration::ZERO).await
    }

    async fn run_paced(platform: &FakePlatform, pacing: Duration) -> Result<RunSummary> {
        let dir = content_dir();
        let extractor = KeywordExtractor::new("xeqtbot").expect("valid identifier");
        let composer =
            ResponseComposer::new(FaqResolver::new(dir.path(), FaqStrategy::Manifest), false);
        run_once(platform, &extractor, &composer, pacing).await
    }

    #[tokio::test]
    async fn replies_then_marks_read() {
        let platform = FakePlatform::with_items(vec![comment("t1_a", "/u/xeqtbot DIVIDEND please")]);

        let summary = run(&platform).await.expect("run succeeds");

        assert_eq!(summary.replied, 1);
        assert_eq!(
            platform.calls(),
            vec![
                Call::Reply(
                    "t1_a".to_string(),
                    "XEQT pays quarterly.\n\n— XEQT Bot".to_string()
                ),
                Call::MarkRead("t1_a".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn direct_messages_stay_unread() {
        let platform =
            FakePlatform::with_items(vec![direct_message("t4_a", "/u/xeqtbot dividend")]);

        let summary = run(&platform).await.expect("run succeeds");

        assert_eq!(summary.skipped, 1);
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn comments_without_keyword_are_marked_read() {
        let platform = FakePlatform::with_items(vec![comment("t1_a", "thanks for the info!")]);

        let summary = run(&platform).await.expect("run succeeds");

        assert_eq!(summary.ignored, 1);
        assert_eq!(platform.calls(), vec![Call::MarkRead("t1_a".to_string())]);
    }

    #[tokio::test]
    async fn unknown_keyword_gets_fallback_reply() {
        let platform = FakePlatform::with_items(vec![comment("t1_a", "u/xeqtbot leverage")]);

        run(&platform).await.expect("run succeeds");

        assert_eq!(
            platform.calls()[0],
            Call::Reply(
                "t1_a".to_string(),
                "Unknown keyword.\n\n— XEQT Bot".to_string()
            )
        );
    }

    #[tokio::test]
    async fn failed_reply_is_left_unread_and_loop_continues() {
        let platform = FakePlatform {
            failing_reply: Some("t1_a".to_string()),
            ..FakePlatform::with_items(vec![
                comment("t1_a", "/u/xeqtbot dividend"),
                comment("t1_b", "/u/xeqtbot distributions"),
            ])
        };

        let summary = run(&platform).await.expect("run succeeds");

        assert_eq!(
            summary,
            RunSummary {
                replied: 1,
                failed: 1,
                ..RunSummary::default()
            }
        );
        let calls = platform.calls();
        assert!(!calls.contains(&Call::MarkRead("t1_a".to_string())));
        assert!(calls.contains(&Call::MarkRead("t1_b".to_string())));
    }

    #[tokio::test]
    async fn expired_session_aborts_run() {
        let platform = FakePlatform {
            expired_session: true,
            ..FakePlatform::with_items(vec![
                comment("t1_a", "/u/xeqtbot dividend"),
                comment("t1_b", "no mention here"),
            ])
        };

        let err = run(&platform).await.expect_err("run aborts");

        assert!(err.is_fatal());
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn forbidden_reply_does_not_block_later_items() {
        let platform = FakePlatform {
            forbidden_reply: Some("t1_banned".to_string()),
            ..FakePlatform::with_items(vec![
                comment("t1_banned", "/u/xeqtbot dividend"),
                comment("t1_ok", "/u/xeqtbot distributions"),
            ])
        };

        for _ in 0..2 {
            let summary = run(&platform).await.expect("run succeeds");
            assert_eq!(summary.replied, 1);
            assert_eq!(summary.failed, 1);
        }

        let calls = platform.calls();
        assert!(calls.contains(&Call::MarkRead("t1_ok".to_string())));
        assert!(!calls.contains(&Call::MarkRead("t1_banned".to_string())));
    }

    #[tokio::test]
    async fn reply_counts_when_mark_read_fails() {
        let platform = FakePlatform {
            failing_mark_read: Some("t1_a".to_string()),
            ..FakePlatform::with_items(vec![
                comment("t1_a", "/u/xeqtbot dividend"),
                comment("t1_b", "/u/xeqtbot dividend"),
            ])
        };

        let summary = run(&platform).await.expect("run succeeds");

        assert_eq!(summary.replied, 2);
        assert_eq!(summary.failed, 0);
        let calls = platform.calls();
        assert!(calls.contains(&Call::Reply(
            "t1_a".to_string(),
            "XEQT pays quarterly.\n\n— XEQT Bot".to_string()
        )));
        assert!(!calls.contains(&Call::MarkRead("t1_a".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_follows_each_reply_only() {
        let pacing = Duration::from_secs(5);
        let platform = FakePlatform::with_items(vec![
            comment("t1_a", "/u/xeqtbot dividend"),
            comment("t1_b", "no mention here"),
            direct_message("t4_c", "/u/xeqtbot dividend"),
            comment("t1_d", "/u/xeqtbot distributions"),
        ]);

        let start = tokio::time::Instant::now();
        let summary = run_paced(&platform, pacing).await.expect("run succeeds");

        assert_eq!(summary.replied, 2);
        assert_eq!(start.elapsed(), pacing * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_follows_reply_left_unmarked() {
        let pacing = Duration::from_secs(3);
        let platform = FakePlatform {
            failing_mark_read: Some("t1_a".to_string()),
            ..FakePlatform::with_items(vec![comment("t1_a", "/u/xeqtbot dividend")])
        };

        let start = tokio::time::Instant::now();
        run_paced(&platform, pacing).await.expect("run succeeds");

        assert_eq!(start.elapsed(), pacing);
    }

    #[tokio::test(start_paused = true)]
    async fn no_pacing_without_replies() {
        let platform = FakePlatform {
            failing_reply: Some("t1_c".to_string()),
            ..FakePlatform::with_items(vec![
                comment("t1_a", "thanks!"),
                direct_message("t4_b", "/u/xeqtbot dividend"),
                comment("t1_c", "/u/xeqtbot dividend"),
            ])
        };

        let start = tokio::time::Instant::now();
        run_paced(&platform, Duration::from_secs(5))
            .await
            .expect("run succeeds");

        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
