//! Release filename parsing.
//!
//! Container names follow the `[Group] Series - Episode[HASH].mkv` convention.
//! A strict pattern that can capture the CRC token is tried first; a looser one
//! that tolerates bracketed quality tags (without capturing anything from them)
//! is the fallback.

use crate::models::{MuxJob, ReleaseName};
use camino::Utf8Path;
use regex::Regex;

/// Parser for release-style container file names.
pub struct ReleaseNameParser {
    /// `[Group] Series - 01[HASH].mkv`, hash optional and only taken when it
    /// sits directly before the extension.
    primary: Regex,

    /// `[Group] Series - 01 [1080p][x265].mkv`, tags ignored.
    fallback: Regex,
}

impl ReleaseNameParser {
    pub fn new() -> Self {
        Self {
            primary: Regex::new(
                r"^\[(?P<group>.*?)\] (?P<series>.*?) - (?P<episode>\d+)(?:.*?\[(?P<hash>[A-Z0-9]+)\])?\.mkv$",
            )
            .expect("Invalid primary release regex"),
            fallback: Regex::new(
                r"^\[(?P<group>.*?)\] (?P<series>.*) - (?P<episode>\d+)(?:\s*\[[^\]]+\])*\.mkv$",
            )
            .expect("Invalid fallback release regex"),
        }
    }

    /// Parse a file name. Returns `None` when neither pattern matches.
    pub fn parse(&self, file_name: &str) -> Option<ReleaseName> {
        if let Some(caps) = self.primary.captures(file_name) {
            let release = ReleaseName {
                group: caps["group"].to_string(),
                series: caps["series"].to_string(),
                episode: caps["episode"].to_string(),
                old_hash: caps.name("hash").map(|m| m.as_str().to_string()),
            };
            if is_complete(&release) {
                return Some(release);
            }
        }

        let caps = self.fallback.captures(file_name)?;
        let release = ReleaseName {
            group: caps["group"].to_string(),
            series: caps["series"].to_string(),
            episode: caps["episode"].to_string(),
            old_hash: None,
        };

        is_complete(&release).then_some(release)
    }

    /// Build a [`MuxJob`] for a container path, or `None` if its name does not parse.
    pub fn job_for(&self, path: &Utf8Path) -> Option<MuxJob> {
        let file_name = path.file_name()?;
        let release = self.parse(file_name)?;
        MuxJob::new(path.to_path_buf(), release)
    }
}

impl Default for ReleaseNameParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_complete(release: &ReleaseName) -> bool {
    !release.group.is_empty() && !release.series.is_empty() && !release.episode.is_empty()
}
