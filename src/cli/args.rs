//! Command-line argument parsing for the notedeck CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Restore any existing session and print its state
    Status,
    /// Sign in with an identity-provider credential
    Login { credential: String },
    /// Sign out
    Logout,
    /// GET an API path through the request gateway
    Get { path: String },
    /// Print usage, optionally explaining what was wrong
    Usage { problem: Option<String> },
}

/// Command plus global options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// `--api <url>` override for the API base URL
    pub api_url: Option<String>,
    /// `--credential <c>` signs in before running the command
    pub credential: Option<String>,
    pub command: CliCommand,
}

pub const USAGE: &str = "\
usage: notedeck [--api <url>] [--credential <credential>] <command>

commands:
  status               restore any existing session and print its state
  login <credential>   sign in with an identity-provider credential
  logout               sign out
  get <path>           GET an API path with the session credential
  --version, -V        print the version";

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use notedeck::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["notedeck".to_string(), "get".to_string(), "/api/notes".to_string()];
/// assert_eq!(
///     parse_args(args.into_iter()).command,
///     CliCommand::Get { path: "/api/notes".to_string() }
/// );
/// ```
pub fn parse_args<I>(args: I) -> CliArgs
where
    I: Iterator<Item = String>,
{
    let mut parsed = CliArgs {
        api_url: None,
        credential: None,
        command: CliCommand::Usage { problem: None },
    };

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        let command = match arg.as_str() {
            "--version" | "-V" => CliCommand::Version,
            "--api" => match args.next() {
                Some(url) => {
                    parsed.api_url = Some(url);
                    continue;
                }
                None => missing("--api", "<url>"),
            },
            "--credential" => match args.next() {
                Some(credential) => {
                    parsed.credential = Some(credential);
                    continue;
                }
                None => missing("--credential", "<credential>"),
            },
            "status" => CliCommand::Status,
            "logout" => CliCommand::Logout,
            "login" => match args.next() {
                Some(credential) => CliCommand::Login { credential },
                None => missing("login", "<credential>"),
            },
            "get" => match args.next() {
                Some(path) => CliCommand::Get { path },
                None => missing("get", "<path>"),
            },
            "--help" | "-h" | "help" => CliCommand::Usage { problem: None },
            other => CliCommand::Usage {
                problem: Some(format!("unknown argument: {}", other)),
            },
        };
        parsed.command = command;
        return parsed;
    }

    parsed
}

fn missing(flag: &str, what: &str) -> CliCommand {
    CliCommand::Usage {
        problem: Some(format!("{} expects {}", flag, what)),
    }
}
