use std::path::{Path, PathBuf};
use chrono::Local;
use log::info;

use crate::config::Config;
use crate::sequence::{self, naming, Outcome, WriteOptions};
use crate::tiff::errors::TiffResult;
use crate::tiff::TiffReader;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Main interface to the tiffmerge library
pub struct TiffMerge {
    logger: Logger,
    config: Config,
}

impl TiffMerge {
    /// Create a new TiffMerge instance
    ///
    /// # Arguments
    /// * `config` - Settings for output naming and writing; the operation
    ///   log goes to `config.log_file` when set
    ///
    /// # Returns
    /// A TiffMerge instance or an error if the log file cannot be opened
    pub fn new(config: Config) -> TiffResult<Self> {
        let logger = match &config.log_file {
            Some(path) => Logger::new(path)?,
            None => Logger::disabled(),
        };
        Ok(TiffMerge { logger, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn options(&self) -> WriteOptions {
        self.config.write_options()
    }

    /// Merge `sources`, in order, into one container at `destination`
    pub fn merge<P: AsRef<Path>>(&self, sources: &[PathBuf], destination: P) -> Outcome {
        sequence::merge(sources, destination.as_ref(), &self.options(), &self.logger,
                        &ProgressTracker::hidden())
    }

    /// Merge `sources` into the configured default destination
    ///
    /// # Returns
    /// The destination used together with the outcome
    pub fn merge_to_default(&self, sources: &[PathBuf]) -> (PathBuf, Outcome) {
        let destination = self.config.merge_destination(Local::now().date_naive());
        let outcome = self.merge(sources, &destination);
        (destination, outcome)
    }

    /// Split `source` into one `{stem}_{index}.tif` file per frame
    pub fn split<P: AsRef<Path>>(&self, source: P) -> Outcome {
        sequence::split(source.as_ref(), self.config.output_dir.as_deref(), &self.options(),
                        &self.logger, &ProgressTracker::hidden())
    }

    /// Merge the files an earlier split of `stem_path` produced back into
    /// one container
    pub fn join_split<P: AsRef<Path>, Q: AsRef<Path>>(&self, stem_path: P, destination: Q) -> Outcome {
        match naming::collect_split_outputs(stem_path.as_ref()) {
            Ok(parts) => {
                info!("Joining {} split files into {}", parts.len(), destination.as_ref().display());
                self.merge(&parts, destination)
            },
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Number of frames in a TIFF file
    pub fn frame_count<P: AsRef<Path>>(&self, path: P) -> TiffResult<usize> {
        let mut reader = TiffReader::new(&self.logger);
        Ok(reader.load(path.as_ref())?.frame_count())
    }

    /// Describe the container and frames of a TIFF file
    ///
    /// # Returns
    /// A multi-line summary: format, byte order, and one line per frame
    pub fn info<P: AsRef<Path>>(&self, path: P) -> TiffResult<String> {
        let mut reader = TiffReader::new(&self.logger);
        let tiff = reader.load(path.as_ref())?;
        Ok(tiff.to_string())
    }
}
