//! Input shape checks made before an operation runs

use std::path::PathBuf;

pub const NO_FILES: &str = "Please select file(s) to continue.";
pub const MERGE_NEEDS_TWO: &str = "Please select 2 or more files to merge.";
pub const SPLIT_NEEDS_ONE: &str = "Select a single file only to split.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Merge,
    Split,
}

/// Checks that `inputs` has the shape `operation` needs
///
/// # Returns
/// The reason the selection is rejected, if it is
pub fn check_selection(operation: Operation, inputs: &[PathBuf]) -> Result<(), &'static str> {
    match (operation, inputs.len()) {
        (_, 0) => Err(NO_FILES),
        (Operation::Merge, 1) => Err(MERGE_NEEDS_TWO),
        (Operation::Split, n) if n > 1 => Err(SPLIT_NEEDS_ONE),
        _ => Ok(()),
    }
}
