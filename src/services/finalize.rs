//! Post-mux finalization: CRC32 naming and replacement of the source file.

use crate::models::{AssetSet, MuxJob, SubtitleTrack};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Crc;
use std::fs::{self, File};
use std::io::{BufReader, Read};

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// CRC32 of a file as eight uppercase hex digits.
pub fn crc32_hex(path: &Utf8Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("Failed to open {} for hashing", path))?;
    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    let mut crc = Crc::new();

    loop {
        let read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {} for hashing", path))?;
        if read == 0 {
            break;
        }
        crc.update(&buffer[..read]);
    }

    Ok(format_crc(crc.sum()))
}

pub fn format_crc(crc: u32) -> String {
    format!("{:08X}", crc)
}

/// Name of the finished file: the old hash token is swapped for `new_hash`,
/// or `[new_hash]` is appended before the extension when there was none.
pub fn final_file_name(job: &MuxJob, new_hash: &str) -> String {
    let (stem, extension) = match job.file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (job.file_name.as_str(), String::new()),
    };

    if let Some(old_hash) = &job.release.old_hash {
        let token = format!("[{}]", old_hash);
        if let Some(prefix) = stem.strip_suffix(&token) {
            return format!("{}[{}]{}", prefix, new_hash, extension);
        }
    }

    format!("{}[{}]{}", stem, new_hash, extension)
}

/// Where the muxed file ended up and what happened to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub final_path: Utf8PathBuf,
    /// The source no longer exists under its old name.
    pub replaced_original: bool,
    /// Set when the source should have been removed but could not be.
    pub warning: Option<String>,
}

/// Move the muxed temp file into place under its hash-bearing name.
///
/// The temp file is moved before the source is touched. With `overwrite` the
/// source is then removed; otherwise both files remain. Failing to remove the
/// source is reported in [`Finalized::warning`], since the muxed file is
/// already in place by then.
pub fn finalize(job: &MuxJob, temp_path: &Utf8Path, overwrite: bool) -> Result<Finalized> {
    let new_hash = crc32_hex(temp_path)?;
    let final_path = job.directory.join(final_file_name(job, &new_hash));

    tracing::debug!("CRC32 of {} is {}", temp_path, new_hash);

    move_file(temp_path, &final_path)?;
    tracing::info!("Wrote {}", final_path);

    // Same name means the move already replaced the source.
    if final_path == job.source_path {
        return Ok(Finalized {
            final_path,
            replaced_original: true,
            warning: None,
        });
    }

    if !overwrite {
        return Ok(Finalized {
            final_path,
            replaced_original: false,
            warning: None,
        });
    }

    match fs::remove_file(&job.source_path) {
        Ok(()) => {
            tracing::info!("Removed original {}", job.source_path);
            Ok(Finalized {
                final_path,
                replaced_original: true,
                warning: None,
            })
        }
        Err(e) => {
            tracing::warn!("Failed to remove original {}: {}", job.source_path, e);
            Ok(Finalized {
                final_path,
                replaced_original: false,
                warning: Some(format!(
                    "Warning: '{}' could not be removed after muxing: {}",
                    job.source_path, e
                )),
            })
        }
    }
}

/// Rename, falling back to copy + delete when the rename itself fails.
fn move_file(from: &Utf8Path, to: &Utf8Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    fs::copy(from, to).with_context(|| format!("Failed to move {} to {}", from, to))?;
    fs::remove_file(from).with_context(|| format!("Failed to remove {}", from))?;
    Ok(())
}

/// What went into a finished container, for the console report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxSummary {
    pub subtitles: Vec<SubtitleSummary>,
    pub chapters: Option<String>,
    pub font_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleSummary {
    pub file_name: String,
    pub track_name: String,
    pub default: bool,
}

impl MuxSummary {
    pub fn new(job: &MuxJob, assets: &AssetSet) -> Self {
        let subtitles = assets
            .subtitles
            .iter()
            .enumerate()
            .map(|(position, track)| SubtitleSummary {
                file_name: track.file_name.clone(),
                track_name: track.track_name(&job.release.group, position),
                default: SubtitleTrack::is_default(position),
            })
            .collect();

        Self {
            subtitles,
            chapters: assets
                .chapters
                .as_ref()
                .and_then(|p| p.file_name())
                .map(str::to_string),
            font_count: assets.fonts.len(),
        }
    }

    /// Plain-text report lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["Subtitle tracks:".to_string()];
        for (i, sub) in self.subtitles.iter().enumerate() {
            lines.push(format!(
                "  - Track {}: {} → {} ({})",
                i + 1,
                sub.file_name,
                sub.track_name,
                if sub.default { "default" } else { "non-default" }
            ));
        }

        if let Some(chapters) = &self.chapters {
            lines.push("Chapter file:".to_string());
            lines.push(format!("  - {}", chapters));
        }

        lines.push("Font attachments:".to_string());
        lines.push(format!("  - {} fonts attached", self.font_count));
        lines
    }
}
