use crate::models::config::{
    DEFAULT_CREATE_FOLDERS, DEFAULT_OVERWRITE_ORIGINAL, DEFAULT_SAVE_MUX_LOG, parse_flag,
};
use crate::models::{RawSettings, Settings};
use crate::services::tool_discovery;
use crate::ui::prompt::Prompter;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Default settings file, looked up in the current working directory.
pub const CONFIG_FILE_NAME: &str = "muxer_config.yaml";

/// Configuration manager for the flat settings file.
///
/// The file is a single YAML mapping:
///
/// ```yaml
/// MKVMergePath: /usr/bin/mkvmerge
/// OverwriteOriginal: true
/// CreateFolders: true
/// SaveMuxLog: true
/// ```
///
/// Missing keys are completed on load (locating mkvmerge, or asking for it) and
/// the file is written back immediately.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    pub fn new<P: AsRef<Utf8Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Manager for [`CONFIG_FILE_NAME`] in the current working directory.
    pub fn in_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
        let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;
        Ok(Self::new(cwd.join(CONFIG_FILE_NAME)))
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Read the file as-is. A missing file yields all keys unset.
    pub fn load_raw(&self) -> Result<RawSettings> {
        if !self.config_path.exists() {
            tracing::warn!("Config file not found at {}, using defaults", self.config_path);
            return Ok(RawSettings::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        if file_contents.trim().is_empty() {
            return Ok(RawSettings::default());
        }

        let raw: RawSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(raw)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(&RawSettings::from(settings))
            .context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Load settings, completing and persisting any missing keys.
    ///
    /// mkvmerge is searched for with [`tool_discovery::find_mkvmerge`]; if that
    /// fails the user is asked until a path is given.
    pub fn load_or_init(&self, prompter: &mut dyn Prompter) -> Result<Settings> {
        self.load_or_init_with(prompter, tool_discovery::find_mkvmerge)
    }

    /// [`load_or_init`](Self::load_or_init) with a custom mkvmerge lookup.
    pub fn load_or_init_with<F>(&self, prompter: &mut dyn Prompter, locate: F) -> Result<Settings>
    where
        F: FnOnce() -> Option<Utf8PathBuf>,
    {
        let raw = self.load_raw()?;
        if raw.is_incomplete() {
            tracing::info!("Completing missing settings in {}", self.config_path);
        }

        let mkvmerge_path = match raw.mkvmerge_path.filter(|p| !p.as_str().is_empty()) {
            Some(path) => path,
            None => match locate() {
                Some(path) => path,
                None => {
                    prompter.notify("mkvmerge not found in default locations.");
                    ask_path(prompter, "Please enter the full path to mkvmerge: ")?
                }
            },
        };

        let settings = Settings {
            mkvmerge_path,
            overwrite_original: raw.overwrite_original.unwrap_or(DEFAULT_OVERWRITE_ORIGINAL),
            create_folders: raw.create_folders.unwrap_or(DEFAULT_CREATE_FOLDERS),
            save_mux_log: raw.save_mux_log.unwrap_or(DEFAULT_SAVE_MUX_LOG),
        };

        self.save(&settings)?;
        Ok(settings)
    }

    /// Ask for every setting, keeping the current value on empty input, then save.
    pub fn edit_interactively(
        &self,
        current: &Settings,
        prompter: &mut dyn Prompter,
    ) -> Result<Settings> {
        let answer = prompter.ask(&format!("Enter mkvmerge path [{}]: ", current.mkvmerge_path))?;
        let mkvmerge_path = match answer.trim() {
            "" => current.mkvmerge_path.clone(),
            path => Utf8PathBuf::from(path),
        };

        let settings = Settings {
            mkvmerge_path,
            overwrite_original: ask_flag(
                prompter,
                "Overwrite original files",
                current.overwrite_original,
            )?,
            create_folders: ask_flag(
                prompter,
                "Create folders if they don't exist",
                current.create_folders,
            )?,
            save_mux_log: ask_flag(prompter, "Save mux log", current.save_mux_log)?,
        };

        self.save(&settings)?;
        Ok(settings)
    }
}

fn ask_path(prompter: &mut dyn Prompter, question: &str) -> Result<Utf8PathBuf> {
    loop {
        let answer = prompter.ask(question)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(Utf8PathBuf::from(answer));
        }
    }
}

fn ask_flag(prompter: &mut dyn Prompter, label: &str, current: bool) -> Result<bool> {
    let question = format!("{} (True/False) [{}]: ", label, display_flag(current));
    loop {
        let answer = prompter.ask(&question)?;
        if answer.trim().is_empty() {
            return Ok(current);
        }
        match parse_flag(&answer) {
            Some(value) => return Ok(value),
            None => prompter.notify(&format!("Please answer True or False (got {:?}).", answer.trim())),
        }
    }
}

fn display_flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
