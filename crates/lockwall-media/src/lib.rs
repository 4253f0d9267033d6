//! FFmpeg CLI wrapper for asset post-processing.
//!
//! Turns a staged download into the canonical presentation asset: strip
//! audio, normalize encoding (or pass the bytes through unchanged), always
//! landing on exactly one output path with overwrite semantics.

pub mod command;
pub mod error;
pub mod postprocess;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use postprocess::{PostProcessMode, PostProcessor};
