use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use silas_core::build_site;
use crate::config::SilasConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Content root containing config.json [default: .]")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for generated site [default: generated]")
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Theme directory overriding the built-in templates")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Build settings file [default: silas.toml]")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every loaded category and written page")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("no-overwrite")
                .long("no-overwrite")
                .help("Fail instead of replacing an existing output directory")
                .action(ArgAction::SetTrue)
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Build the static site from the content descriptors")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = SilasConfig::load(args)?;
    let output = &config.build.output;

    let report = build_site(&config.build_options())
        .with_context(|| format!("Failed to build site from {}", config.build.source))?;

    println!(
        "Site built successfully in {} ({} pages)",
        output,
        report.files.len()
    );

    Ok(())
}
