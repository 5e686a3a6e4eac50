//! Sidecar discovery.
//!
//! Subtitles, chapters and fonts live in `subs/`, `chapters/` and `fonts/`
//! beside the container and are matched to it by base name:
//!
//! ```text
//! [ABC] Show - 01[DEADBEEF].mkv
//! subs/[ABC] Show - 01.ass              -> track 1 (default)
//! subs/[ABC] Show - 01_1[Signs].ass     -> track 2, "ABC - Signs"
//! subs/[ABC] Show - 01_2.srt            -> track 3, "ABC (Track 3)"
//! chapters/[ABC] Show - 01.xml
//! fonts/*
//! ```

use crate::models::assets::{CHAPTERS_DIR, FONTS_DIR, SIDECAR_DIRS, SUBS_DIR};
use crate::models::{AssetSet, MuxJob, SubtitleTrack};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;

/// Create any missing sidecar directories beside a container.
///
/// Returns the directories that were created.
pub fn ensure_folders(directory: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut created = Vec::new();

    for name in SIDECAR_DIRS {
        let path = directory.join(name);
        if !path.exists() {
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create folder: {}", path))?;
            tracing::info!("Created folder: {}", path);
            created.push(path);
        }
    }

    Ok(created)
}

/// Locate every sidecar file belonging to `job`.
pub fn discover(job: &MuxJob) -> Result<AssetSet> {
    let base_name = job.base_name();

    let subtitles = find_subtitles(&job.sidecar_dir(SUBS_DIR), &base_name)?;
    let chapters = find_chapters(&job.sidecar_dir(CHAPTERS_DIR), &base_name);
    let fonts = find_fonts(&job.sidecar_dir(FONTS_DIR))?;

    tracing::debug!(
        "Sidecars for {}: {} subtitles, chapters: {}, {} fonts",
        base_name,
        subtitles.len(),
        chapters.is_some(),
        fonts.len()
    );

    Ok(AssetSet {
        subtitles,
        chapters,
        fonts,
    })
}

/// Subtitle files for `base_name`, ordered by their `_N` suffix.
pub fn find_subtitles(subs_dir: &Utf8Path, base_name: &str) -> Result<Vec<SubtitleTrack>> {
    if !subs_dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = Regex::new(&format!(
        r"^{}(?:_(\d+))?(?:\[(.*?)\])?\.(?:ass|srt)$",
        regex::escape(base_name)
    ))
    .context("Failed to build subtitle pattern")?;

    let mut tracks = Vec::new();
    for file_name in list_files(subs_dir)? {
        let Some(caps) = pattern.captures(&file_name) else {
            continue;
        };

        let suffix = caps.get(1);
        let index = suffix.and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
        // A tag only names the track when it follows a numeric suffix.
        let label = suffix
            .and(caps.get(2))
            .map(|m| m.as_str().to_string());

        tracks.push(SubtitleTrack {
            path: subs_dir.join(&file_name),
            file_name,
            index,
            label,
        });
    }

    tracks.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.file_name.cmp(&b.file_name)));
    Ok(tracks)
}

pub fn find_chapters(chapters_dir: &Utf8Path, base_name: &str) -> Option<Utf8PathBuf> {
    let path = chapters_dir.join(format!("{}.xml", base_name));
    path.is_file().then_some(path)
}

pub fn find_fonts(fonts_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if !fonts_dir.is_dir() {
        return Ok(Vec::new());
    }

    Ok(list_files(fonts_dir)?
        .into_iter()
        .map(|name| fonts_dir.join(name))
        .collect())
}

/// Names of regular files directly inside `dir`, sorted.
fn list_files(dir: &Utf8Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in dir
        .read_dir_utf8()
        .with_context(|| format!("Failed to read directory: {}", dir))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string());
        }
    }

    names.sort();
    Ok(names)
}
