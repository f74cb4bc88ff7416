use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand, value_parser};
use env_logger::{Builder, Env};
use log::{error, Level};
use std::path::PathBuf;
use std::process;

use tiffmerge::commands::{apply_cli_overrides, CommandFactory, TiffMergeCommandFactory};
use tiffmerge::config::Config;
use tiffmerge::sequence::Outcome;
use tiffmerge::utils::logger::Logger;

fn inputs_arg(help: &'static str) -> Arg {
    Arg::new("inputs")
        .help(help)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .num_args(0..)
        .index(1)
}

fn build_cli() -> ClapCommand {
    ClapCommand::new("tiffmerge")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Merge TIFF files into one multi-frame TIFF, or split a multi-frame TIFF into single-frame files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file (default: tiffmerge.toml when present)")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for merge output and split files")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Append the operation log to this file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("no-atomic")
                .long("no-atomic")
                .help("Write the merge output in place instead of via a temporary file")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("bigtiff")
                .long("bigtiff")
                .help("Always write BigTIFF")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .help("Decode inputs and outputs to check other readers accept them")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            ClapCommand::new("merge")
                .about("Merge TIFF files, in the order given, into one multi-frame TIFF")
                .arg(inputs_arg("Input TIFF files"))
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output TIFF file (default: converted_<date>.tif)")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("from-split")
                        .long("from-split")
                        .help("Merge the <stem>_<N>.tif files a split of this file produced")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("inputs"),
                ),
        )
        .subcommand(
            ClapCommand::new("split")
                .about("Write every frame of a multi-frame TIFF to <stem>_<index>.tif")
                .arg(inputs_arg("Input TIFF file")),
        )
        .subcommand(
            ClapCommand::new("info")
                .about("Show the container format and frames of TIFF files")
                .arg(inputs_arg("Input TIFF files")),
        )
}

/// Installs the global logger: the log file when one is configured,
/// env_logger on the console otherwise
fn init_logging(config: &Config, args: &ArgMatches) -> std::io::Result<()> {
    let level = if args.get_flag("verbose") { Level::Debug } else { Level::Info };

    match &config.log_file {
        Some(path) => Logger::init_global_logger(path, level),
        None => {
            let default_filter = if level == Level::Debug { "debug" } else { "info" };
            Builder::from_env(Env::default().default_filter_or(default_filter))
                .format_target(false)
                .init();
            Ok(())
        }
    }
}

fn main() {
    let matches = build_cli().get_matches();

    let mut config = match Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    apply_cli_overrides(&mut config, &matches);

    if let Err(e) = init_logging(&config, &matches) {
        eprintln!("Error setting up logging: {}", e);
        process::exit(1);
    }

    let logger = match &config.log_file {
        Some(path) => match Logger::new(path) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Error initializing logger: {}", e);
                process::exit(1);
            }
        },
        None => Logger::disabled(),
    };

    let factory = TiffMergeCommandFactory::new();

    let outcome = match factory.create_command(&matches, &config, &logger) {
        Ok(command) => command.execute(),
        Err(e) => {
            error!("Failed to create command: {}", e);
            Outcome::Failed(e)
        }
    };

    match &outcome {
        Outcome::Success(report) if !report.outputs.is_empty() => println!("{}", outcome),
        Outcome::Success(_) => {},
        Outcome::Rejected(_) | Outcome::Failed(_) => eprintln!("{}", outcome),
    }

    process::exit(outcome.exit_code());
}
