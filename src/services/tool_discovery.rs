//! Locating the `mkvmerge` executable.
//!
//! Each platform has a few well-known install locations (MKVToolNix installer on
//! Windows, Homebrew/MacPorts on macOS). When none of them exist the `PATH` is
//! searched.

use camino::{Utf8Path, Utf8PathBuf};

/// Executable name searched for on `PATH`.
pub const MKVMERGE: &str = "mkvmerge";

/// Well-known install locations for the current platform, checked in order.
pub fn known_locations() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\MKVToolNix\mkvmerge.exe",
            r"C:\Program Files (x86)\MKVToolNix\mkvmerge.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/usr/local/bin/mkvmerge",
            "/opt/homebrew/bin/mkvmerge",
            "/usr/bin/mkvmerge",
        ]
    } else {
        &[]
    }
}

/// Find mkvmerge in the known locations, then on `PATH`.
pub fn find_mkvmerge() -> Option<Utf8PathBuf> {
    find_in(known_locations()).or_else(find_on_path)
}

/// First existing file among `candidates`.
pub fn find_in(candidates: &[&str]) -> Option<Utf8PathBuf> {
    let found = candidates
        .iter()
        .map(Utf8Path::new)
        .find(|path| path.is_file())
        .map(Utf8Path::to_path_buf);

    if let Some(path) = &found {
        tracing::info!("Found mkvmerge at {}", path);
    }
    found
}

fn find_on_path() -> Option<Utf8PathBuf> {
    match which::which(MKVMERGE) {
        Ok(path) => match Utf8PathBuf::try_from(path) {
            Ok(path) => {
                tracing::info!("Found mkvmerge on PATH: {}", path);
                Some(path)
            }
            Err(e) => {
                tracing::warn!("Ignoring non UTF-8 mkvmerge path: {}", e);
                None
            }
        },
        Err(e) => {
            tracing::debug!("mkvmerge not found on PATH: {}", e);
            None
        }
    }
}
