//! Command-line argument parsing for the agentstream CLI.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Rebuild a conversation from a history file and print it
    Replay {
        path: String,
        conversation: Option<String>,
    },
    /// Stream a query to the agent (default)
    Stream {
        query: String,
        conversation: Option<String>,
    },
    /// The arguments could not be understood
    Invalid(String),
}

pub const USAGE: &str = "\
Usage: agentstream [OPTIONS] <QUERY>...

Stream an agent response for QUERY and print it as it arrives.

Options:
  --conversation <ID>  Continue an existing conversation
  --replay <FILE>      Rebuild a conversation from a history file instead of streaming
  -V, --version        Print version
  -h, --help           Print this help

Environment:
  AGENTSTREAM_URL                    Stream endpoint
  AGENTSTREAM_HANDSHAKE_TIMEOUT_MS   Handshake timeout in milliseconds
  AGENTSTREAM_AGENT_ID               Agent that answers queries
  AGENTSTREAM_LOG                    Log filter (default: info)";

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use agentstream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["agentstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut words = Vec::new();
    let mut replay = None;
    let mut conversation = None;

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--replay" => match args.next() {
                Some(path) => replay = Some(path),
                None => return CliCommand::Invalid("--replay requires a file".to_string()),
            },
            "--conversation" => match args.next() {
                Some(id) => conversation = Some(id),
                None => {
                    return CliCommand::Invalid("--conversation requires an id".to_string())
                }
            },
            flag if flag.starts_with("--") => {
                return CliCommand::Invalid(format!("unknown option {}", flag))
            }
            word => words.push(word.to_string()),
        }
    }

    if let Some(path) = replay {
        return CliCommand::Replay { path, conversation };
    }
    if words.is_empty() {
        return CliCommand::Help;
    }
    CliCommand::Stream {
        query: words.join(" "),
        conversation,
    }
}
