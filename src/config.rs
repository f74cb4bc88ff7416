//! Tool configuration
//!
//! Settings come from an optional TOML file and are then overridden by
//! command line flags. Every setting has a default, so running without a
//! configuration file behaves like the plain merge/split tool.
//!
//! ```toml
//! [output]
//! directory = "out"
//! merge_name = "converted_{date}.tif"
//!
//! [write]
//! atomic = true
//! big_tiff = false
//! verify = false
//!
//! [log]
//! file = "tiffmerge.log"
//! ```

use chrono::NaiveDate;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::sequence::{naming, WriteOptions};
use crate::tiff::errors::{TiffError, TiffResult};

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tiffmerge.toml";

/// Merge output name used when neither the command line nor the
/// configuration names one
pub const DEFAULT_MERGE_NAME: &str = "converted_{date}.tif";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory for merge output and, when set, split output
    pub output_dir: Option<PathBuf>,
    /// Merge output file name template, `{date}` expands to YYYYMMDD
    pub merge_name: String,
    pub atomic: bool,
    pub big_tiff: bool,
    pub verify: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: None,
            merge_name: DEFAULT_MERGE_NAME.to_string(),
            atomic: true,
            big_tiff: false,
            verify: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads the configuration for a run
    ///
    /// An explicit path must exist. Without one, `tiffmerge.toml` in the
    /// working directory is used when present, else the defaults.
    pub fn load(explicit: Option<&Path>) -> TiffResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    Ok(Config::default())
                }
            }
        }
    }

    /// Loads the configuration from a TOML file
    pub fn from_file(path: &Path) -> TiffResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            TiffError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;

        debug!("Loading configuration from {}", path.display());
        contents.parse()
    }

    /// Merge output path used when none is given on the command line
    pub fn merge_destination(&self, today: NaiveDate) -> PathBuf {
        let file_name = naming::expand_merge_name(&self.merge_name, today);
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Write settings handed to the merge and split operations
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            atomic: self.atomic,
            force_big_tiff: self.big_tiff,
            verify: self.verify,
        }
    }
}

impl FromStr for Config {
    type Err = TiffError;

    /// Parses the configuration from a TOML string
    fn from_str(content: &str) -> TiffResult<Self> {
        let root: toml::Table = content.parse()
            .map_err(|e| TiffError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        let mut config = Config::default();

        for (section, value) in &root {
            let table = match value.as_table() {
                Some(table) => table,
                None => {
                    warn!("Ignoring top-level configuration key '{}'", section);
                    continue;
                }
            };

            for (key, value) in table {
                match (section.as_str(), key.as_str()) {
                    ("output", "directory") => config.output_dir = Some(PathBuf::from(expect_str(section, key, value)?)),
                    ("output", "merge_name") => config.merge_name = expect_str(section, key, value)?.to_string(),
                    ("write", "atomic") => config.atomic = expect_bool(section, key, value)?,
                    ("write", "big_tiff") => config.big_tiff = expect_bool(section, key, value)?,
                    ("write", "verify") => config.verify = expect_bool(section, key, value)?,
                    ("log", "file") => config.log_file = Some(PathBuf::from(expect_str(section, key, value)?)),
                    _ => warn!("Ignoring unknown configuration key '{}.{}'", section, key),
                }
            }
        }

        if config.merge_name.trim().is_empty() {
            return Err(TiffError::ConfigError("output.merge_name must not be empty".to_string()));
        }

        Ok(config)
    }
}

fn expect_str<'v>(section: &str, key: &str, value: &'v toml::Value) -> TiffResult<&'v str> {
    value.as_str().ok_or_else(|| {
        TiffError::ConfigError(format!("{}.{} must be a string, found {}", section, key, value.type_str()))
    })
}

fn expect_bool(section: &str, key: &str, value: &toml::Value) -> TiffResult<bool> {
    value.as_bool().ok_or_else(|| {
        TiffError::ConfigError(format!("{}.{} must be a boolean, found {}", section, key, value.type_str()))
    })
}
