//! Command-line interface.

use crate::models::Settings;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;

/// Remux Matroska releases with their sidecar subtitles, chapters and fonts.
///
/// For every `[Group] Series - Episode[HASH].mkv`, subtitles from `subs/`, a
/// chapter file from `chapters/` and fonts from `fonts/` are muxed in with
/// mkvmerge and the result is renamed with its new CRC32.
#[derive(Parser, Debug, Default)]
#[command(name = "maika-mux", version, about)]
pub struct Cli {
    /// MKV files or directories containing MKV files (default: current directory)
    pub paths: Vec<Utf8PathBuf>,

    /// Replace the original file with the muxed one
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Keep the original file next to the muxed one
    #[arg(long, overrides_with = "overwrite")]
    pub no_overwrite: bool,

    /// Create subs/, chapters/ and fonts/ when missing
    #[arg(long, overrides_with = "no_create_folders")]
    pub create_folders: bool,

    /// Do not create missing sidecar folders
    #[arg(long, overrides_with = "create_folders")]
    pub no_create_folders: bool,

    /// Append mkvmerge warnings and errors to mux.log.txt
    #[arg(long, overrides_with = "no_save_log")]
    pub save_log: bool,

    /// Do not write mux.log.txt
    #[arg(long, overrides_with = "save_log")]
    pub no_save_log: bool,

    /// Edit the configuration interactively and exit
    #[arg(long)]
    pub config: bool,

    /// Settings file to use instead of ./muxer_config.yaml
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<Utf8PathBuf>,

    /// Do not draw the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    /// Mirror diagnostic logging to the console
    #[arg(short, long)]
    pub verbose: bool,
}

/// `--flag` / `--no-flag` pair resolved against the configured value.
fn resolve_flag(enabled: bool, disabled: bool, configured: bool) -> bool {
    if enabled {
        true
    } else if disabled {
        false
    } else {
        configured
    }
}

impl Cli {
    /// Settings for this run: command-line flags override the config file.
    pub fn apply_overrides(&self, settings: Settings) -> Settings {
        Settings {
            overwrite_original: resolve_flag(
                self.overwrite,
                self.no_overwrite,
                settings.overwrite_original,
            ),
            create_folders: resolve_flag(
                self.create_folders,
                self.no_create_folders,
                settings.create_folders,
            ),
            save_mux_log: resolve_flag(self.save_log, self.no_save_log, settings.save_mux_log),
            ..settings
        }
    }

    /// Paths to process; the current directory when none were given.
    pub fn input_paths(&self) -> Result<Vec<Utf8PathBuf>> {
        if !self.paths.is_empty() {
            return Ok(self.paths.clone());
        }

        let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
        let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;
        Ok(vec![cwd])
    }
}
