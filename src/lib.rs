pub mod io;
pub mod tiff;
pub mod utils;
pub mod sequence;
pub mod config;
pub mod commands;
pub mod api;

pub use crate::api::TiffMerge;
pub use crate::config::Config;

pub use sequence::{merge, split, Outcome, Report, WriteOptions};
pub use tiff::{Frame, TiffReader, TiffSource, TiffWriter};
