//! Merge command
//!
//! Merges the listed TIFF files, or the outputs of an earlier split, into
//! one multi-frame TIFF.

use chrono::Local;
use clap::ArgMatches;
use log::{debug, info};
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::commands::selection::{self, Operation};
use crate::config::Config;
use crate::sequence::{self, naming, Outcome, WriteOptions};
use crate::tiff::errors::TiffResult;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Command for merging TIFF files into one container
pub struct MergeCommand<'a> {
    /// Source files, in frame order
    inputs: Vec<PathBuf>,
    /// Path of the merged container
    output: PathBuf,
    options: WriteOptions,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> MergeCommand<'a> {
    /// Create a new merge command
    ///
    /// With `--from-split` the inputs are the `{stem}_{index}.tif` files
    /// found next to the given stem, in index order.
    pub fn new(args: &ArgMatches, config: &Config, logger: &'a Logger) -> TiffResult<Self> {
        let inputs = match args.get_one::<PathBuf>("from-split") {
            Some(stem) => {
                let found = naming::collect_split_outputs(stem)?;
                info!("Collected {} split files for {}", found.len(), stem.display());
                found
            },
            None => args.get_many::<PathBuf>("inputs")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        };

        let output = match args.get_one::<PathBuf>("output") {
            Some(output) => output.clone(),
            None => config.merge_destination(Local::now().date_naive()),
        };

        debug!("Merge of {} inputs into {}", inputs.len(), output.display());

        Ok(MergeCommand {
            inputs,
            output,
            options: config.write_options(),
            logger,
        })
    }
}

impl<'a> Command for MergeCommand<'a> {
    fn execute(&self) -> Outcome {
        if let Err(reason) = selection::check_selection(Operation::Merge, &self.inputs) {
            return Outcome::Rejected(reason.to_string());
        }

        let progress = ProgressTracker::new(0, "Merging");
        let outcome = sequence::merge(&self.inputs, &self.output, &self.options, self.logger, &progress);

        if outcome.is_success() {
            progress.finish();
            info!("Merged file written to {}", self.output.display());
        } else {
            progress.abandon();
        }

        outcome
    }
}
