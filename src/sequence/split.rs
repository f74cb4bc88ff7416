//! Splitting a multi-frame TIFF into single-frame files

use log::{error, info};
use std::fs;
use std::path::Path;

use crate::sequence::naming::FrameNaming;
use crate::sequence::outcome::{Outcome, Report};
use crate::sequence::{check_extension, verify_decodable, WriteOptions};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::TiffSource;
use crate::tiff::writer::TiffWriter;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Reason given when the source holds a single frame
pub const NOTHING_TO_SPLIT: &str = "This file contains only 1 frame. There is nothing to split.";

/// Writes each frame of `source` to its own `{stem}_{index}.tif`
///
/// Outputs go next to the source unless `output_dir` is given. A source
/// with a single frame is rejected without writing anything. When a frame
/// fails, the files written before it are kept.
pub fn split(
    source: &Path,
    output_dir: Option<&Path>,
    options: &WriteOptions,
    logger: &Logger,
    progress: &ProgressTracker,
) -> Outcome {
    check_extension(source);

    let mut opened = match TiffSource::open(source, logger) {
        Ok(opened) => opened,
        Err(e) => {
            error!("Cannot split {}: {}", source.display(), e);
            return Outcome::Failed(e);
        }
    };

    if opened.frame_count() == 1 {
        info!("{} has a single frame, nothing to split", source.display());
        return Outcome::Rejected(NOTHING_TO_SPLIT.to_string());
    }

    let result = split_frames(&mut opened, output_dir, options, logger, progress);
    if let Err(e) = &result {
        error!("Split of {} failed: {}", source.display(), e);
    }
    result.into()
}

fn split_frames(
    source: &mut TiffSource<'_>,
    output_dir: Option<&Path>,
    options: &WriteOptions,
    logger: &Logger,
    progress: &ProgressTracker,
) -> TiffResult<Report> {
    let frame_count = source.frame_count();
    let naming = FrameNaming::for_source(source.path(), output_dir)?;
    let is_big_tiff = options.force_big_tiff || source.is_big_tiff();

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir).map_err(|e| {
            TiffError::GenericError(format!("Cannot create output directory {}: {}", dir.display(), e))
        })?;
    }

    info!("Splitting {} into {} files", source.path().display(), frame_count);
    logger.log(&format!("Splitting {} into {} files", source.path().display(), frame_count))?;
    progress.set_total(frame_count as u64);

    let mut outputs = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        let mut frame = source.read_frame(index)?;
        frame.clear_page();

        let output = naming.path_for(index);
        let mut writer = TiffWriter::create(&output, source.byte_order(), is_big_tiff, logger)?;
        writer.append_frame(&frame)?;
        let buffered = writer.finish()?;
        buffered.into_inner()
            .map_err(|e| TiffError::IoError(e.into_error()))?
            .sync_all()?;

        if options.verify {
            verify_decodable(&output)?;
        }

        logger.log(&format!("Wrote frame {} to {}", index, output.display()))?;
        outputs.push(output);
        progress.increment(1);
    }

    info!("Split {} into {} files in {}", source.path().display(), outputs.len(), naming.directory().display());

    Ok(Report {
        frames_written: outputs.len(),
        outputs,
    })
}
