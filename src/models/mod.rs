//! Data models for maika-mux.
//!
//! - [`ReleaseName`] / [`MuxJob`]: one container file and the fields parsed from its name
//! - [`AssetSet`] / [`SubtitleTrack`]: sidecar files discovered for a job
//! - [`Settings`] / [`RawSettings`]: resolved and on-disk configuration

pub mod assets;
pub mod config;
pub mod job;

pub use assets::{AssetSet, SubtitleTrack};
pub use config::{RawSettings, Settings};
pub use job::{MuxJob, ReleaseName};
