//! Free-text command parsing
//!
//! Splits `"<message> in <days>"` into its parts. The last ` in ` wins, so a
//! message may itself contain the word.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Add bot mention stripping for guild channels
//! - 1.0.0: Initial submission, help and foreign-command parsing

use regex::Regex;

/// Greedy message group: backtracks to the final `in <token>` pair
const SUBMISSION_PATTERN: &str = r"(?is)^(?P<message>.+)\s+in\s+(?P<days>\S+)\s*$";

/// What an inbound chat message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// `/start` or `/help`
    Help,
    /// Some other bot's command; stay quiet
    Ignored,
    /// A capsule request; `days` is raw text, validated on submit
    Submit { message: String, days: String },
    /// Text that does not match the submission format
    Malformed,
}

pub struct CommandParser {
    submission: Regex,
}

impl CommandParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            submission: Regex::new(SUBMISSION_PATTERN)?,
        })
    }

    pub fn parse(&self, text: &str) -> ParsedCommand {
        let text = text.trim();

        if let Some(command) = text.strip_prefix('/').or_else(|| text.strip_prefix('!')) {
            let name = command.split_whitespace().next().unwrap_or_default();
            return match name.to_lowercase().as_str() {
                "start" | "help" => ParsedCommand::Help,
                _ => ParsedCommand::Ignored,
            };
        }

        let Some(captures) = self.submission.captures(text) else {
            return ParsedCommand::Malformed;
        };

        match (captures.name("message"), captures.name("days")) {
            (Some(message), Some(days)) if !message.as_str().trim().is_empty() => {
                ParsedCommand::Submit {
                    message: message.as_str().trim().to_string(),
                    days: days.as_str().to_string(),
                }
            }
            _ => ParsedCommand::Malformed,
        }
    }
}

/// Remove `<@id>` / `<@!id>` mentions of the bot.
///
/// Returns `None` when the bot is not mentioned at all.
pub fn strip_bot_mention(text: &str, bot_id: u64) -> Option<String> {
    let plain = format!("<@{bot_id}>");
    let nick = format!("<@!{bot_id}>");

    if !text.contains(&plain) && !text.contains(&nick) {
        return None;
    }

    Some(text.replace(&nick, "").replace(&plain, "").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedCommand {
        CommandParser::new().unwrap().parse(text)
    }

    fn submit(message: &str, days: &str) -> ParsedCommand {
        ParsedCommand::Submit {
            message: message.to_string(),
            days: days.to_string(),
        }
    }

    #[test]
    fn test_parse_submission() {
        assert_eq!(parse("Hello in 365"), submit("Hello", "365"));
        assert_eq!(parse("  Hello   IN 0  "), submit("Hello", "0"));
        assert_eq!(parse("Hello in -1"), submit("Hello", "-1"));
        assert_eq!(parse("Hello in soon"), submit("Hello", "soon"));
    }

    #[test]
    fn test_last_separator_wins() {
        assert_eq!(
            parse("meet me in Paris in 30"),
            submit("meet me in Paris", "30")
        );
        assert_eq!(
            parse("line one\nline two in 2"),
            submit("line one\nline two", "2")
        );
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse("Hello"), ParsedCommand::Malformed);
        assert_eq!(parse("Hello in"), ParsedCommand::Malformed);
        assert_eq!(parse("in 5"), ParsedCommand::Malformed);
        assert_eq!(parse("Hello in 3 days"), ParsedCommand::Malformed);
        assert_eq!(parse(""), ParsedCommand::Malformed);
    }

    #[test]
    fn test_strip_bot_mention() {
        assert_eq!(
            strip_bot_mention("<@123> Hello in 5", 123).as_deref(),
            Some("Hello in 5")
        );
        assert_eq!(
            strip_bot_mention("<@!123>\nline one\nline two in 5", 123).as_deref(),
            Some("line one\nline two in 5")
        );
        assert_eq!(strip_bot_mention("<@456> Hello in 5", 123), None);
        assert_eq!(strip_bot_mention("Hello in 5", 123), None);
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse("/start"), ParsedCommand::Help);
        assert_eq!(parse("!HELP please"), ParsedCommand::Help);
        assert_eq!(parse("/play some song in 3"), ParsedCommand::Ignored);
        assert_eq!(parse("!"), ParsedCommand::Ignored);
    }
}
