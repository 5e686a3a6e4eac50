use camino::Utf8PathBuf;

/// Prefix given to the temporary mkvmerge output beside the source file.
pub const TEMP_PREFIX: &str = "temp_muxed_";

/// Name of the append-only log written next to the muxed files.
pub const MUX_LOG_NAME: &str = "mux.log.txt";

/// Fields recovered from a `[Group] Series - Episode[HASH].mkv` release name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseName {
    pub group: String,
    pub series: String,
    /// Literal digits as they appear in the file name ("01" stays "01").
    pub episode: String,
    pub old_hash: Option<String>,
}

impl ReleaseName {
    /// The `[Group] Series - Episode` prefix shared with sidecar files.
    pub fn base_name(&self) -> String {
        format!("[{}] {} - {}", self.group, self.series, self.episode)
    }
}

/// A single container file queued for remuxing.
///
/// Only built from a file name that parsed successfully; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxJob {
    pub source_path: Utf8PathBuf,
    pub directory: Utf8PathBuf,
    pub file_name: String,
    pub release: ReleaseName,
}

impl MuxJob {
    pub fn new(source_path: Utf8PathBuf, release: ReleaseName) -> Option<Self> {
        let file_name = source_path.file_name()?.to_string();
        let directory = match source_path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };

        Some(Self {
            source_path,
            directory,
            file_name,
            release,
        })
    }

    pub fn base_name(&self) -> String {
        self.release.base_name()
    }

    pub fn temp_path(&self) -> Utf8PathBuf {
        self.directory.join(format!("{}{}", TEMP_PREFIX, self.file_name))
    }

    pub fn log_path(&self) -> Utf8PathBuf {
        self.directory.join(MUX_LOG_NAME)
    }

    pub fn sidecar_dir(&self, name: &str) -> Utf8PathBuf {
        self.directory.join(name)
    }
}
