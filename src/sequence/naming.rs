//! Output file naming
//!
//! Split outputs are named `{stem}_{index}.tif` after their source. The
//! same pattern is parsed back to gather a split set for re-merging.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::tiff::errors::{TiffError, TiffResult};

lazy_static! {
    static ref SPLIT_NAME: Regex = Regex::new(r"^(?P<stem>.+)_(?P<index>\d+)\.tif$")
        .expect("SPLIT_NAME is a valid regex pattern");
}

/// Extensions accepted as TIFF without a warning
const TIFF_EXTENSIONS: [&str; 2] = ["tif", "tiff"];

/// Names the single-frame files produced by splitting one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameNaming {
    directory: PathBuf,
    stem: String,
}

impl FrameNaming {
    /// Naming rooted in the source's own directory, or in `output_dir`
    pub fn for_source(source: &Path, output_dir: Option<&Path>) -> TiffResult<Self> {
        let stem = source.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| TiffError::GenericError(format!("{} has no file name", source.display())))?;

        let directory = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        };

        Ok(FrameNaming { directory, stem })
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Output path of frame `index`
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.directory.join(format!("{}_{}.tif", self.stem, index))
    }
}

/// Splits a `{stem}_{index}.tif` file name into its stem and index
pub fn parse_split_name(file_name: &str) -> Option<(&str, usize)> {
    let captures = SPLIT_NAME.captures(file_name)?;
    let stem = captures.name("stem")?.as_str();
    let index = captures.name("index")?.as_str().parse().ok()?;
    Some((stem, index))
}

/// Finds the files a split of `stem_path` produced, in frame order
///
/// `stem_path` is the split source path or its stem, for example
/// `scans/report.tif` or `scans/report`. Files are ordered by their numeric
/// index, so `report_10.tif` follows `report_9.tif`.
pub fn collect_split_outputs(stem_path: &Path) -> TiffResult<Vec<PathBuf>> {
    let naming = FrameNaming::for_source(stem_path, None)?;
    let directory = if naming.directory().as_os_str().is_empty() {
        Path::new(".")
    } else {
        naming.directory()
    };

    let mut found = Vec::new();
    for dir_entry in fs::read_dir(directory)? {
        let dir_entry = dir_entry?;
        let file_name = dir_entry.file_name();
        let file_name = file_name.to_string_lossy();

        if let Some((stem, index)) = parse_split_name(&file_name) {
            if stem == naming.stem() {
                found.push((index, dir_entry.path()));
            }
        }
    }

    found.sort_by_key(|(index, _)| *index);

    for (position, (index, path)) in found.iter().enumerate() {
        if *index != position {
            warn!("Split set of {} has a gap: expected index {}, found {}",
                  naming.stem(), position, path.display());
            break;
        }
    }

    debug!("Found {} split outputs for {} in {}", found.len(), naming.stem(), directory.display());
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

/// Expands a merge name template, replacing `{date}` with YYYYMMDD
pub fn expand_merge_name(template: &str, date: NaiveDate) -> String {
    template.replace("{date}", &date.format("%Y%m%d").to_string())
}

pub fn has_tiff_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .map(|ext| TIFF_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
