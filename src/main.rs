use color_eyre::Result;
use notedeck::cli::{handle_version_command, init_logging, parse_args, run, CliCommand};

fn main() -> Result<()> {
    let args = parse_args(std::env::args());

    // Handle --version before any initialization
    if args.command == CliCommand::Version {
        handle_version_command();
    }

    color_eyre::install()?;
    init_logging()?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args))
}
