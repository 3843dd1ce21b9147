mod cmd;
mod config;

use clap::Command;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("silas")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build a small categorized blog from JSON descriptors and templates")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let verbose = matches
        .subcommand()
        .is_some_and(|(_, args)| args.get_flag("verbose"));

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        _ => unreachable!("subcommand is required"),
    }
}
