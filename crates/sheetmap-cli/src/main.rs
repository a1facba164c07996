//! `sheetmap` binary.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use sheetmap_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use sheetmap_cli::commands::{Settings, run_import, run_map, run_profile, run_schema};
use sheetmap_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let settings = match Settings::from_args(&cli.settings) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Schema => run_schema(&settings).map(|()| 0),
        Command::Profile(args) => run_profile(&settings, args).map(|()| 0),
        Command::Map(args) => run_map(&settings, args).map(|()| 0),
        Command::Import(args) => {
            run_import(&settings, args).map(|outcome| if outcome.valid { 0 } else { 1 })
        }
    };
    let exit_code = result.unwrap_or_else(|error| {
        eprintln!("error: {error:#}");
        1
    });
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
