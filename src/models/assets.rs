use camino::Utf8PathBuf;

/// Names of the sidecar directories expected beside each container.
pub const SUBS_DIR: &str = "subs";
pub const CHAPTERS_DIR: &str = "chapters";
pub const FONTS_DIR: &str = "fonts";

pub const SIDECAR_DIRS: [&str; 3] = [SUBS_DIR, CHAPTERS_DIR, FONTS_DIR];

/// A subtitle file found in `subs/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleTrack {
    pub path: Utf8PathBuf,
    pub file_name: String,
    /// Numeric `_N` suffix; 0 when the file has none.
    pub index: u32,
    /// Bracketed tag following the numeric suffix (`_2[Signs]` → `Signs`).
    pub label: Option<String>,
}

impl SubtitleTrack {
    /// Track name for the subtitle at `position` in the sorted list.
    ///
    /// The first track is named after the group alone.
    pub fn track_name(&self, group: &str, position: usize) -> String {
        if position == 0 {
            return group.to_string();
        }

        match &self.label {
            Some(label) => format!("{} - {}", group, label),
            None => format!("{} (Track {})", group, position + 1),
        }
    }

    pub fn is_default(position: usize) -> bool {
        position == 0
    }
}

/// Everything that will be muxed into a container besides its own audio/video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
    pub subtitles: Vec<SubtitleTrack>,
    pub chapters: Option<Utf8PathBuf>,
    pub fonts: Vec<Utf8PathBuf>,
}

impl AssetSet {
    pub fn is_empty(&self) -> bool {
        self.subtitles.is_empty() && self.chapters.is_none() && self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(label: Option<&str>) -> SubtitleTrack {
        SubtitleTrack {
            path: Utf8PathBuf::from("subs/x.ass"),
            file_name: "x.ass".to_string(),
            index: 1,
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_first_track_named_after_group() {
        assert_eq!(track(Some("Signs")).track_name("ABC", 0), "ABC");
    }

    #[test]
    fn test_labelled_track_name() {
        assert_eq!(track(Some("Signs")).track_name("ABC", 1), "ABC - Signs");
    }

    #[test]
    fn test_unlabelled_track_name() {
        assert_eq!(track(None).track_name("ABC", 2), "ABC (Track 3)");
    }

    #[test]
    fn test_empty_asset_set() {
        let mut assets = AssetSet::default();
        assert!(assets.is_empty());

        assets.fonts.push(Utf8PathBuf::from("fonts/a.ttf"));
        assert!(!assets.is_empty());
    }
}
