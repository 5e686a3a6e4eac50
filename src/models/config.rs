use camino::Utf8PathBuf;
use serde::{Deserialize, Deserializer, Serialize};

/// Settings exactly as stored in `muxer_config.yaml`.
///
/// Every key is optional so a partially written file can be detected and
/// completed with defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSettings {
    #[serde(
        rename = "MKVMergePath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mkvmerge_path: Option<Utf8PathBuf>,

    #[serde(
        rename = "OverwriteOriginal",
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub overwrite_original: Option<bool>,

    #[serde(
        rename = "CreateFolders",
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_folders: Option<bool>,

    #[serde(
        rename = "SaveMuxLog",
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub save_mux_log: Option<bool>,
}

impl RawSettings {
    /// True when any key is missing from the file.
    pub fn is_incomplete(&self) -> bool {
        self.mkvmerge_path.is_none()
            || self.overwrite_original.is_none()
            || self.create_folders.is_none()
            || self.save_mux_log.is_none()
    }
}

/// Fully resolved settings, threaded through every muxing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub mkvmerge_path: Utf8PathBuf,
    pub overwrite_original: bool,
    pub create_folders: bool,
    pub save_mux_log: bool,
}

impl Settings {
    pub fn with_mkvmerge(mkvmerge_path: Utf8PathBuf) -> Self {
        Self {
            mkvmerge_path,
            overwrite_original: DEFAULT_OVERWRITE_ORIGINAL,
            create_folders: DEFAULT_CREATE_FOLDERS,
            save_mux_log: DEFAULT_SAVE_MUX_LOG,
        }
    }
}

impl From<&Settings> for RawSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            mkvmerge_path: Some(settings.mkvmerge_path.clone()),
            overwrite_original: Some(settings.overwrite_original),
            create_folders: Some(settings.create_folders),
            save_mux_log: Some(settings.save_mux_log),
        }
    }
}

pub const DEFAULT_OVERWRITE_ORIGINAL: bool = true;
pub const DEFAULT_CREATE_FOLDERS: bool = true;
pub const DEFAULT_SAVE_MUX_LOG: bool = true;

/// Parse the textual booleans accepted in the config file and at prompts.
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlagValue>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(FlagValue::Bool(b)) => Ok(Some(b)),
        Some(FlagValue::Int(i)) => Ok(Some(i != 0)),
        Some(FlagValue::Text(text)) => parse_flag(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean: {:?}", text))),
    }
}
