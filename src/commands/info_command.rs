//! TIFF structure summary command
//!
//! Shows the container kind, byte order and frames of TIFF files, the
//! same view merge and split work from.

use clap::ArgMatches;
use log::{error, info};
use std::path::PathBuf;

use crate::commands::command_traits::Command;
use crate::commands::selection::NO_FILES;
use crate::sequence::{Outcome, Report};
use crate::tiff::TiffReader;
use crate::tiff::errors::TiffResult;
use crate::utils::logger::Logger;

/// Command for describing TIFF files
pub struct InfoCommand<'a> {
    inputs: Vec<PathBuf>,
    /// Also list every tag of every frame
    verbose: bool,
    logger: &'a Logger,
}

impl<'a> InfoCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> TiffResult<Self> {
        let inputs = args.get_many::<PathBuf>("inputs")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Ok(InfoCommand {
            inputs,
            verbose: args.get_flag("verbose"),
            logger,
        })
    }
}

impl<'a> Command for InfoCommand<'a> {
    fn execute(&self) -> Outcome {
        if self.inputs.is_empty() {
            return Outcome::Rejected(NO_FILES.to_string());
        }

        let mut frames = 0;
        for path in &self.inputs {
            let mut reader = TiffReader::new(self.logger);
            let tiff = match reader.load(path) {
                Ok(tiff) => tiff,
                Err(e) => {
                    error!("Cannot read {}: {}", path.display(), e);
                    return Outcome::Failed(e);
                }
            };

            info!("{}", path.display());
            for line in tiff.to_string().lines() {
                info!("  {}", line);
            }

            if self.verbose {
                for ifd in &tiff.ifds {
                    info!("  Frame {} tags:", ifd.number);
                    for entry in &ifd.entries {
                        info!("    {}", entry.description());
                    }
                }
            }

            frames += tiff.frame_count();
        }

        info!("{} frame(s) in {} file(s)", frames, self.inputs.len());
        Outcome::Success(Report { frames_written: 0, outputs: Vec::new() })
    }
}
