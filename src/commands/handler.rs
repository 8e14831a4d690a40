//! Turns inbound chat text into capsule submissions and reply text
//!
//! Transport-agnostic: the Discord event handler only forwards the channel id,
//! the content and whether the bot was addressed, then posts whatever reply
//! comes back.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Stay silent on unaddressed guild chatter; only stored capsules count against the rate limit
//! - 1.0.0: Initial help, prompt, throttle and confirmation replies

use log::{debug, error, info};

use super::parser::{CommandParser, ParsedCommand};
use crate::core::CapsuleError;
use crate::features::capsules::{format_due_at, CapsuleService, OffsetDays};
use crate::features::rate_limiting::SubmissionLimiter;

pub const HELP_TEXT: &str = "👋 Hi! Send me a message for your time capsule and tell me how many days \
to keep it, for example: `Hello from the past in 365`";

pub const FORMAT_PROMPT: &str = "✍️ Write your message as `<message> in <number of days>`, \
for example: `Hello from the past in 365`";

pub const STORAGE_APOLOGY: &str =
    "⚠️ Sorry, I couldn't save your capsule right now. Please try again later.";

pub struct CapsuleCommandHandler {
    parser: CommandParser,
    service: CapsuleService,
    limiter: SubmissionLimiter,
}

impl CapsuleCommandHandler {
    pub fn new(parser: CommandParser, service: CapsuleService, limiter: SubmissionLimiter) -> Self {
        Self {
            parser,
            service,
            limiter,
        }
    }

    /// Handle one inbound message; `None` means stay silent
    ///
    /// `addressed` is true for direct messages and for guild messages that
    /// mention the bot. Anything else is ordinary conversation and ignored.
    pub async fn handle_text(&self, recipient: &str, text: &str, addressed: bool) -> Option<String> {
        if !addressed {
            return None;
        }

        let (message, days) = match self.parser.parse(text) {
            ParsedCommand::Help => return Some(HELP_TEXT.to_string()),
            ParsedCommand::Ignored => return None,
            ParsedCommand::Malformed => return Some(FORMAT_PROMPT.to_string()),
            ParsedCommand::Submit { message, days } => (message, days),
        };

        let offset = match OffsetDays::parse(&days) {
            Ok(offset) => offset,
            Err(e) => {
                debug!("Rejected submission from {recipient}: {e}");
                return Some(FORMAT_PROMPT.to_string());
            }
        };

        if !self.limiter.would_allow(recipient) {
            let wait = self
                .limiter
                .retry_after(recipient)
                .map(|d| d.as_secs().max(1))
                .unwrap_or(1);
            info!("Throttled capsule submission from {recipient}");
            return Some(format!(
                "⏳ You're sealing capsules too quickly. Try again in {wait} second{}.",
                if wait == 1 { "" } else { "s" }
            ));
        }

        match self
            .service
            .submit(recipient, &message, i64::from(offset.days()))
            .await
        {
            Ok(due_at) => {
                self.limiter.record(recipient);
                Some(format!(
                    "📦 Your message '{message}' is sealed. It will be sent to you on {}.",
                    format_due_at(due_at)
                ))
            }
            Err(CapsuleError::Validation(reason)) => {
                debug!("Rejected submission from {recipient}: {reason}");
                Some(format!("❌ {reason}. {FORMAT_PROMPT}"))
            }
            Err(e) => {
                error!("Failed to store capsule for {recipient}: {e}");
                Some(STORAGE_APOLOGY.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Result;
    use crate::database::Database;
    use crate::features::capsules::{Capsule, CapsuleStore, MAX_PAYLOAD_CHARS};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Arc;

    async fn handler(limit: usize) -> (CapsuleCommandHandler, Database) {
        let db = Database::in_memory().await.unwrap();
        let handler = handler_over(Arc::new(db.clone()), limit);
        (handler, db)
    }

    fn handler_over(store: Arc<dyn CapsuleStore>, limit: usize) -> CapsuleCommandHandler {
        CapsuleCommandHandler::new(
            CommandParser::new().unwrap(),
            CapsuleService::new(store),
            SubmissionLimiter::new(limit, std::time::Duration::from_secs(60)),
        )
    }

    #[tokio::test]
    async fn test_help_and_ignored() {
        let (handler, db) = handler(5).await;

        assert_eq!(
            handler.handle_text("42", "/start", true).await.unwrap(),
            HELP_TEXT
        );
        assert_eq!(handler.handle_text("42", "/roll d20", true).await, None);
        assert_eq!(db.count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unaddressed_chatter_ignored() {
        let (handler, db) = handler(5).await;

        for text in ["good morning everyone", "lunch in 5", "/start", "see you in soon"] {
            assert_eq!(
                handler.handle_text("42", text, false).await,
                None,
                "unexpected reply for '{text}'"
            );
        }
        assert_eq!(db.count_pending().await.unwrap(), 0);

        assert_eq!(
            handler.handle_text("42", "good morning everyone", true).await.unwrap(),
            FORMAT_PROMPT
        );
    }

    #[tokio::test]
    async fn test_submission_confirmed_and_stored() {
        let (handler, db) = handler(5).await;

        let reply = handler.handle_text("42", "Hello in 2", true).await.unwrap();

        assert!(reply.contains("'Hello' is sealed"));
        let due = db.query_due(Utc::now() + Duration::days(3)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].recipient, "42");
        assert_eq!(due[0].payload, "Hello");
        assert!(reply.contains(&format_due_at(due[0].due_at)));
    }

    #[tokio::test]
    async fn test_invalid_offsets_prompt_format() {
        let (handler, db) = handler(5).await;

        for text in ["Hello in -1", "Hello in soon", "Hello"] {
            assert_eq!(
                handler.handle_text("42", text, true).await.unwrap(),
                FORMAT_PROMPT,
                "unexpected reply for '{text}'"
            );
        }
        assert_eq!(db.count_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (handler, db) = handler(1).await;

        assert!(handler
            .handle_text("42", "first in 1", true)
            .await
            .unwrap()
            .contains("sealed"));
        assert!(handler
            .handle_text("42", "second in 1", true)
            .await
            .unwrap()
            .starts_with("⏳"));
        assert!(handler
            .handle_text("7", "other in 1", true)
            .await
            .unwrap()
            .contains("sealed"));

        assert_eq!(db.count_pending().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rejected_submissions_do_not_count_against_limit() {
        let (handler, db) = handler(2).await;
        let too_long = format!("{} in 1", "x".repeat(MAX_PAYLOAD_CHARS + 1));

        for _ in 0..3 {
            let reply = handler.handle_text("42", &too_long, true).await.unwrap();
            assert!(reply.starts_with("❌"), "unexpected reply: {reply}");
        }

        let reply = handler.handle_text("42", "Hello in 1", true).await.unwrap();
        assert!(reply.contains("sealed"), "unexpected reply: {reply}");
        assert_eq!(db.count_pending().await.unwrap(), 1);
    }

    /// Store that refuses every insert
    struct BrokenStore;

    #[async_trait]
    impl CapsuleStore for BrokenStore {
        async fn insert(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<i64> {
            Err(CapsuleError::CorruptRow("disk full".to_string()))
        }

        async fn query_due(&self, _now: DateTime<Utc>) -> Result<Vec<Capsule>> {
            Ok(vec![])
        }

        async fn delete(&self, _id: i64) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_storage_failure_apologises_and_stores_nothing() {
        let store = Arc::new(BrokenStore);
        let handler = handler_over(store.clone(), 1);

        for _ in 0..2 {
            assert_eq!(
                handler.handle_text("42", "Hello in 1", true).await.unwrap(),
                STORAGE_APOLOGY
            );
        }

        assert!(store
            .query_due(Utc::now() + Duration::days(2))
            .await
            .unwrap()
            .is_empty());
    }
}
