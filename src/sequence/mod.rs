//! Frame sequencing
//!
//! The two operations of the tool: merging the frames of several TIFF
//! files into one container, and splitting a container into one file per
//! frame. Both take explicit paths and return an [`Outcome`].

pub mod merge;
pub mod naming;
pub mod outcome;
pub mod split;

use image::ImageReader;
use log::{debug, warn};
use std::path::Path;

use crate::tiff::errors::{TiffError, TiffResult};

pub use merge::merge;
pub use naming::FrameNaming;
pub use outcome::{Outcome, Report};
pub use split::split;

/// How outputs are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write the merge output to a temporary file and rename it into place
    pub atomic: bool,
    /// Write BigTIFF even when classic TIFF would do
    pub force_big_tiff: bool,
    /// Decode inputs and outputs with the `image` crate as a sanity check
    pub verify: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            atomic: true,
            force_big_tiff: false,
            verify: false,
        }
    }
}

/// Warns about paths that do not carry a TIFF extension
pub(crate) fn check_extension(path: &Path) {
    if !naming::has_tiff_extension(path) {
        warn!("{} does not have a .tif or .tiff extension", path.display());
    }
}

/// Decodes the first frame of `path` to make sure other readers accept it
pub(crate) fn verify_decodable(path: &Path) -> TiffResult<()> {
    let failed = |e: &dyn std::fmt::Display| {
        TiffError::GenericError(format!("Verification of {} failed: {}", path.display(), e))
    };

    let image = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| failed(&e))?
        .decode()
        .map_err(|e| failed(&e))?;

    debug!("Verified {}: {}x{} {:?}", path.display(), image.width(), image.height(), image.color());
    Ok(())
}
