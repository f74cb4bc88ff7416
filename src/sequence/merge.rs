//! Merging TIFF files into one multi-frame container

use log::{debug, error, info, warn};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::io::byte_order::ByteOrder;
use crate::sequence::outcome::{Outcome, Report};
use crate::sequence::{check_extension, verify_decodable, WriteOptions};
use crate::tiff::constants::{header, limits};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::frame::TiffSource;
use crate::tiff::writer::{TiffWriter, WRITE_BUFFER_SIZE};
use crate::utils::ifd_utils;
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Per-frame allowance for the page tags and alignment added on merge
const FRAME_OVERHEAD_ESTIMATE: u64 = 64;

/// Merges `sources`, in order, into a new container at `destination`
///
/// Each source contributes one frame, its first, so N sources give an
/// N-frame container. All sources are opened before the destination is
/// touched. With `options.atomic` the container is built in a temporary
/// file next to the destination and renamed over it once complete, so a
/// failed merge leaves no partial file behind.
pub fn merge(
    sources: &[PathBuf],
    destination: &Path,
    options: &WriteOptions,
    logger: &Logger,
    progress: &ProgressTracker,
) -> Outcome {
    if sources.is_empty() {
        return Outcome::Rejected("Please select file(s) to continue.".to_string());
    }

    let result = merge_sources(sources, destination, options, logger, progress);
    if let Err(e) = &result {
        error!("Merge into {} failed: {}", destination.display(), e);
    }
    result.into()
}

fn merge_sources(
    sources: &[PathBuf],
    destination: &Path,
    options: &WriteOptions,
    logger: &Logger,
    progress: &ProgressTracker,
) -> TiffResult<Report> {
    info!("Merging {} files into {}", sources.len(), destination.display());
    logger.log(&format!("Merging {} files into {}", sources.len(), destination.display()))?;

    let mut opened = Vec::with_capacity(sources.len());
    for path in sources {
        check_extension(path);
        let source = TiffSource::open(path, logger)?;
        if source.frame_count() > 1 {
            warn!("{} holds {} frames, only the first is merged", path.display(), source.frame_count());
        }
        opened.push(source);
    }

    if options.verify {
        for path in sources {
            verify_decodable(path)?;
        }
    }

    let byte_order = opened.first()
        .map(TiffSource::byte_order)
        .ok_or_else(|| TiffError::GenericError("No sources to merge".to_string()))?;
    let total_frames = opened.len();
    let is_big_tiff = needs_big_tiff(&opened, options)?;
    progress.set_total(total_frames as u64);

    if options.atomic {
        let directory = parent_directory(destination);
        let temporary = NamedTempFile::new_in(directory).map_err(|e| {
            TiffError::GenericError(format!("Cannot create a temporary file in {}: {}", directory.display(), e))
        })?;
        debug!("Building {} at {}", destination.display(), temporary.path().display());

        // Dropping the temporary file on any error removes it
        write_container(&mut opened, temporary.as_file(), byte_order, is_big_tiff, logger, progress)?;
        temporary.persist(destination).map_err(|e| {
            TiffError::GenericError(format!("Cannot move {} to {}: {}",
                                            e.file.path().display(), destination.display(), e.error))
        })?;
    } else {
        ensure_not_a_source(&opened, destination)?;
        let file = File::create(destination).map_err(|e| {
            TiffError::GenericError(format!("Cannot create {}: {}", destination.display(), e))
        })?;
        write_container(&mut opened, &file, byte_order, is_big_tiff, logger, progress)?;
    }

    logger.log(&format!("Merged {} frames into {}", total_frames, destination.display()))?;
    info!("Merged {} frames from {} files into {}", total_frames, sources.len(), destination.display());

    Ok(Report {
        frames_written: total_frames,
        outputs: vec![destination.to_path_buf()],
    })
}

/// Writes the first frame of each source, in order, into `file`
fn write_container(
    sources: &mut [TiffSource<'_>],
    file: &File,
    byte_order: ByteOrder,
    is_big_tiff: bool,
    logger: &Logger,
    progress: &ProgressTracker,
) -> TiffResult<()> {
    let total_frames = sources.len();
    info!("Writing {} {} container with {} frames",
          if is_big_tiff { "BigTIFF" } else { "TIFF" }, byte_order.name(), total_frames);

    let buffered = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let mut writer = TiffWriter::new(buffered, byte_order, is_big_tiff, logger)?;

    for (page, source) in sources.iter_mut().enumerate() {
        let mut frame = source.read_frame(0)?;
        if total_frames > 1 {
            frame.set_page(page, total_frames);
        } else {
            frame.clear_page();
        }

        writer.append_frame(&frame).map_err(|e| {
            error!("Cannot append {} as frame {}", source.path().display(), page);
            e
        })?;

        progress.increment(1);
    }

    let buffered = writer.finish()?;
    buffered.into_inner()
        .map_err(|e| TiffError::IoError(e.into_error()))?
        .sync_all()?;
    Ok(())
}

/// Decides between classic TIFF and BigTIFF for the merged container
fn needs_big_tiff(sources: &[TiffSource<'_>], options: &WriteOptions) -> TiffResult<bool> {
    if options.force_big_tiff {
        return Ok(true);
    }

    if let Some(source) = sources.iter().find(|source| source.is_big_tiff()) {
        info!("Writing BigTIFF since {} is a BigTIFF", source.path().display());
        return Ok(true);
    }

    let mut estimate = header::TIFF_HEADER_SIZE;
    for source in sources {
        estimate += fs::metadata(source.path())?.len();
        estimate += source.frame_count() as u64
            * (FRAME_OVERHEAD_ESTIMATE + ifd_utils::entry_size(false));
    }

    if estimate > limits::CLASSIC_MAX_OFFSET {
        info!("Writing BigTIFF since the output may reach {} bytes", estimate);
        return Ok(true);
    }

    Ok(false)
}

/// Directory the temporary container is created in
fn parent_directory(destination: &Path) -> &Path {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Refuses an in-place merge that would truncate one of its own sources
fn ensure_not_a_source(sources: &[TiffSource<'_>], destination: &Path) -> TiffResult<()> {
    let Ok(destination) = fs::canonicalize(destination) else {
        return Ok(());
    };

    for source in sources {
        if fs::canonicalize(source.path()).map(|path| path == destination).unwrap_or(false) {
            return Err(TiffError::GenericError(format!(
                "Output {} is also an input; enable atomic writes to replace it",
                destination.display())));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::tiff::tests::test_utils::{build_tiff, gray_frame};

    fn write_fixture(path: &Path, frames: &[crate::tiff::tests::test_utils::FrameSpec]) {
        fs::write(path, build_tiff(ByteOrder::LittleEndian, false, frames)).unwrap();
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir).unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn temporary_file_is_created_beside_the_destination() {
        assert_eq!(parent_directory(Path::new("/out/merged.tif")), Path::new("/out"));
        assert_eq!(parent_directory(Path::new("merged.tif")), Path::new("."));
    }

    #[test]
    fn empty_source_list_is_rejected() {
        let logger = Logger::disabled();
        let outcome = merge(&[], Path::new("out.tif"), &WriteOptions::default(),
                            &logger, &ProgressTracker::hidden());
        assert!(matches!(outcome, Outcome::Rejected(_)));
    }

    #[test]
    fn failed_rename_leaves_no_temporary_file() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tif");
        let b = dir.path().join("b.tif");
        write_fixture(&a, &[gray_frame(2, 2, 0)]);
        write_fixture(&b, &[gray_frame(2, 2, 9)]);

        // A non-empty directory cannot be replaced by a file
        let destination = dir.path().join("out.tif");
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("keep"), b"").unwrap();

        let logger = Logger::disabled();
        let outcome = merge(&[a, b], &destination, &WriteOptions::default(),
                            &logger, &ProgressTracker::hidden());

        assert!(matches!(outcome, Outcome::Failed(_)));
        assert_eq!(file_names(dir.path()), vec!["a.tif", "b.tif", "out.tif"]);
        assert!(destination.join("keep").exists());
    }

    #[test]
    fn existing_file_named_like_a_temporary_is_left_alone() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.tif");
        let b = dir.path().join("b.tif");
        write_fixture(&a, &[gray_frame(2, 2, 0)]);
        write_fixture(&b, &[gray_frame(2, 2, 9)]);
        let bystander = dir.path().join("out.tif.tmp");
        fs::write(&bystander, b"user data").unwrap();

        let logger = Logger::disabled();
        let destination = dir.path().join("out.tif");
        let outcome = merge(&[a, b], &destination, &WriteOptions::default(),
                            &logger, &ProgressTracker::hidden());

        assert!(outcome.is_success());
        assert_eq!(fs::read(&bystander).unwrap(), b"user data".to_vec());
        assert_eq!(file_names(dir.path()), vec!["a.tif", "b.tif", "out.tif", "out.tif.tmp"]);
    }

    #[test]
    fn multi_frame_source_contributes_its_first_frame() {
        let dir = tempdir().unwrap();
        let multi = dir.path().join("multi.tif");
        let single = dir.path().join("single.tif");
        let first_page = gray_frame(3, 3, 10);
        let expected = first_page.pixels.clone();
        write_fixture(&multi, &[first_page, gray_frame(3, 3, 20)]);
        write_fixture(&single, &[gray_frame(2, 2, 30)]);

        let logger = Logger::disabled();
        let destination = dir.path().join("out.tif");
        let outcome = merge(&[multi, single], &destination, &WriteOptions::default(),
                            &logger, &ProgressTracker::hidden());
        assert_eq!(outcome.report().map(|report| report.frames_written), Some(2));

        let mut merged = TiffSource::open(&destination, &logger).unwrap();
        assert_eq!(merged.frame_count(), 2);
        assert_eq!(merged.read_frame(0).unwrap().chunks, vec![expected]);
        assert_eq!(merged.read_frame(1).unwrap().dimensions(), Some((2, 2)));
    }

    #[test]
    fn undecodable_source_fails_verification_before_any_output() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.tif");
        let unknown = dir.path().join("unknown.tif");
        write_fixture(&good, &[gray_frame(4, 4, 0)]);

        // Well-formed container, but no decoder knows this compression
        let mut frame = gray_frame(4, 4, 1);
        frame.compression = 50_000;
        write_fixture(&unknown, &[frame]);

        let logger = Logger::disabled();
        let destination = dir.path().join("out.tif");
        let sources = vec![good, unknown];

        let verified = WriteOptions { verify: true, ..WriteOptions::default() };
        let outcome = merge(&sources, &destination, &verified, &logger, &ProgressTracker::hidden());
        assert!(matches!(outcome, Outcome::Failed(TiffError::GenericError(_))));
        assert_eq!(file_names(dir.path()), vec!["good.tif", "unknown.tif"]);

        // The container itself is fine to relocate
        let outcome = merge(&sources, &destination, &WriteOptions::default(),
                            &logger, &ProgressTracker::hidden());
        assert!(outcome.is_success());
    }
}
