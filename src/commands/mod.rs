//! CLI command implementations
//!
//! This module contains implementations of the commands supported by the
//! CLI application using the Command pattern.

pub mod command_traits;
pub mod info_command;
pub mod merge_command;
pub mod selection;
pub mod split_command;

pub use command_traits::{Command, CommandFactory};
pub use info_command::InfoCommand;
pub use merge_command::MergeCommand;
pub use split_command::SplitCommand;

use clap::ArgMatches;
use std::path::PathBuf;

use crate::config::Config;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::logger::Logger;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the subcommand on the command line and creates
/// the matching command instance for execution.
pub struct TiffMergeCommandFactory;

impl TiffMergeCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        TiffMergeCommandFactory
    }
}

impl Default for TiffMergeCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for TiffMergeCommandFactory {
    fn create_command(&self, args: &ArgMatches, config: &Config, logger: &'a Logger)
        -> TiffResult<Box<dyn Command + 'a>> {
        match args.subcommand() {
            Some(("merge", sub_args)) => Ok(Box::new(MergeCommand::new(sub_args, config, logger)?)),
            Some(("split", sub_args)) => Ok(Box::new(SplitCommand::new(sub_args, config, logger)?)),
            Some(("info", sub_args)) => Ok(Box::new(InfoCommand::new(sub_args, logger)?)),
            Some((name, _)) => Err(TiffError::GenericError(format!("Unknown command: {}", name))),
            None => Err(TiffError::GenericError("No command given".to_string())),
        }
    }
}

/// Applies command line flags on top of the loaded configuration
///
/// Flags live on the root command and are global, so they may be given
/// before or after the subcommand name.
pub fn apply_cli_overrides(config: &mut Config, args: &ArgMatches) {
    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        config.output_dir = Some(dir.clone());
    }
    if let Some(log_file) = args.get_one::<PathBuf>("log-file") {
        config.log_file = Some(log_file.clone());
    }
    if args.get_flag("no-atomic") {
        config.atomic = false;
    }
    if args.get_flag("bigtiff") {
        config.big_tiff = true;
    }
    if args.get_flag("verify") {
        config.verify = true;
    }
}
