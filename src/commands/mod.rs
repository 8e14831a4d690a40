//! # Command System
//!
//! Plain-text command handling for capsule submissions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod handler;
pub mod parser;

pub use handler::{CapsuleCommandHandler, FORMAT_PROMPT, HELP_TEXT, STORAGE_APOLOGY};
pub use parser::{strip_bot_mention, CommandParser, ParsedCommand};
