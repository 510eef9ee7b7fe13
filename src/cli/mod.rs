//! CLI module for agentstream.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version and usage display
//! - History replay
//! - Terminal rendering of the store
//!
//! # Usage
//!
//! The CLI dispatcher should be called early in main() to handle the commands
//! that do not need a network connection:
//!
//! ```ignore
//! use agentstream::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! if let Some(result) = run_cli_command(&command) {
//!     return result;
//! }
//! // No CLI command, continue to streaming
//! ```

pub mod args;
pub mod replay;
pub mod transcript;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use replay::handle_replay_command;
pub use transcript::{render_conversation, LivePrinter};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Run a CLI command if applicable.
///
/// # Returns
///
/// * `None` - If the command is `Stream` (the caller opens the connection)
/// * `Some(Ok(()))` - If a CLI command executed successfully
/// * `Some(Err(e))` - If a CLI command failed
pub fn run_cli_command(command: &CliCommand) -> Option<Result<()>> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            Some(Ok(()))
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Some(Ok(()))
        }
        CliCommand::Replay { path, conversation } => {
            Some(handle_replay_command(path, conversation.as_deref()))
        }
        CliCommand::Invalid(message) => Some(Err(eyre!("{}\n\n{}", message, USAGE))),
        CliCommand::Stream { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_returns_none() {
        let command = CliCommand::Stream {
            query: "hi".to_string(),
            conversation: None,
        };
        assert!(run_cli_command(&command).is_none());
    }

    #[test]
    fn test_invalid_is_an_error() {
        let result = run_cli_command(&CliCommand::Invalid("bad".to_string()));
        assert!(matches!(result, Some(Err(_))));
    }

    #[test]
    fn test_replay_missing_file_is_an_error() {
        let command = CliCommand::Replay {
            path: "/nonexistent/agentstream-history.jsonl".to_string(),
            conversation: None,
        };
        assert!(matches!(run_cli_command(&command), Some(Err(_))));
    }
}
