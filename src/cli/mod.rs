//! CLI module for notedeck.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version display
//! - Logging setup
//! - Command execution against a live session
//!
//! Each invocation is a fresh process, so the session lives only as long as
//! the command: it is bootstrapped, used and shut down.

pub mod args;
pub mod logging;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand, USAGE};
pub use logging::init_logging;
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;

use crate::adapters::{ReqwestHttpClient, StaticIdentity, TerminalUi};
use crate::config::SessionConfig;
use crate::session::{Collaborators, SessionFacade, SessionSnapshot};

/// Build the session facade for a CLI invocation.
pub fn build_facade(args: &CliArgs) -> Result<SessionFacade> {
    let mut config = SessionConfig::from_env();
    if let Some(url) = &args.api_url {
        config = config.with_api_base_url(url.clone());
    }

    let credential = match &args.command {
        CliCommand::Login { credential } => Some(credential.clone()),
        _ => args.credential.clone(),
    };
    let identity = credential.map(StaticIdentity::new).unwrap_or_default();

    let http = ReqwestHttpClient::with_timeout(config.request_timeout)?;
    let ui = Arc::new(TerminalUi::new("/"));

    Ok(SessionFacade::new(
        config,
        Collaborators {
            http: Arc::new(http),
            identity: Arc::new(identity),
            navigator: ui.clone(),
            notifier: ui,
        },
    ))
}

/// Run a session command.
pub async fn run(args: CliArgs) -> Result<()> {
    if let CliCommand::Usage { problem } = &args.command {
        return match problem {
            Some(problem) => Err(eyre!("{}\n\n{}", problem, USAGE)),
            None => {
                println!("{}", USAGE);
                Ok(())
            }
        };
    }

    let facade = build_facade(&args)?;
    let result = execute(&facade, &args).await;
    facade.shutdown();
    result
}

async fn execute(facade: &SessionFacade, args: &CliArgs) -> Result<()> {
    facade.initialize().await;

    if args.credential.is_some() && !matches!(args.command, CliCommand::Login { .. }) {
        facade.login().await?;
    }

    match &args.command {
        CliCommand::Status => print_snapshot(&facade.snapshot()),
        CliCommand::Login { .. } => {
            facade.login().await?;
            print_snapshot(&facade.snapshot());
        }
        CliCommand::Logout => {
            facade.logout().await;
            println!("signed out");
        }
        CliCommand::Get { path } => {
            let response = facade.gateway().get(path).await?;
            println!("HTTP {}", response.status);
            println!("{}", response.text().unwrap_or_default());
        }
        CliCommand::Version | CliCommand::Usage { .. } => {}
    }
    Ok(())
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("phase: {}", snapshot.phase);
    match &snapshot.user {
        Some(user) => println!("user:  {} <{}> ({})", user.name, user.email, user.id),
        None => println!("user:  (none)"),
    }
    if let Some(error) = &snapshot.error {
        println!("error: {}", error);
    }
}
