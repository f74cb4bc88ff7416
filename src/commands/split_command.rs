//! Split command
//!
//! Writes every frame of one multi-frame TIFF to its own file.

use clap::ArgMatches;
use log::info;
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::commands::selection::{self, Operation};
use crate::config::Config;
use crate::sequence::{self, Outcome, WriteOptions};
use crate::tiff::errors::TiffResult;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Command for splitting a TIFF into single-frame files
pub struct SplitCommand<'a> {
    inputs: Vec<PathBuf>,
    /// Directory for the outputs, the source's directory when unset
    output_dir: Option<PathBuf>,
    options: WriteOptions,
    logger: &'a Logger,
}

impl<'a> SplitCommand<'a> {
    pub fn new(args: &ArgMatches, config: &Config, logger: &'a Logger) -> TiffResult<Self> {
        let inputs = args.get_many::<PathBuf>("inputs")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(SplitCommand {
            inputs,
            output_dir: config.output_dir.clone(),
            options: config.write_options(),
            logger,
        })
    }
}

impl<'a> Command for SplitCommand<'a> {
    fn execute(&self) -> Outcome {
        if let Err(reason) = selection::check_selection(Operation::Split, &self.inputs) {
            return Outcome::Rejected(reason.to_string());
        }

        let source = &self.inputs[0];
        let progress = ProgressTracker::new(0, "Splitting");
        let outcome = sequence::split(source, self.output_dir.as_deref(), &self.options, self.logger, &progress);

        match &outcome {
            Outcome::Success(report) => {
                progress.finish();
                for output in &report.outputs {
                    info!("  {}", output.display());
                }
            },
            _ => progress.abandon(),
        }

        outcome
    }
}
