//! mkvmerge identification and command construction.

use crate::models::{AssetSet, MuxJob, SubtitleTrack};
use crate::services::muxing::MuxError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use tokio::process::Command;

/// MIME type given to every attached font.
pub const FONT_MIME_TYPE: &str = "application/x-truetype-font";

/// Language assigned to every attached subtitle track.
pub const SUBTITLE_LANGUAGE: &str = "eng";

/// Subset of `mkvmerge -J` output needed to rebuild the track order.
#[derive(Debug, Clone, Deserialize)]
pub struct Identification {
    pub tracks: Vec<TrackInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackInfo {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub codec: Option<String>,
}

impl TrackInfo {
    fn is_audio_or_video(&self) -> bool {
        matches!(self.kind.as_str(), "video" | "audio")
    }
}

impl Identification {
    pub fn from_json(json: &str) -> Result<Self, MuxError> {
        serde_json::from_str(json).map_err(|e| MuxError::InvalidIdentification(e.to_string()))
    }

    /// `--track-order` value for the source's video and audio tracks, by id.
    ///
    /// Returns `None` when the source has neither.
    pub fn track_order(&self) -> Option<String> {
        let mut ids: Vec<u64> = self
            .tracks
            .iter()
            .filter(|t| t.is_audio_or_video())
            .map(|t| t.id)
            .collect();

        if ids.is_empty() {
            return None;
        }

        ids.sort_unstable();
        Some(
            ids.iter()
                .map(|id| format!("0:{}", id))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

/// Run `mkvmerge -J` against the source container.
pub async fn identify(mkvmerge: &Utf8Path, source: &Utf8Path) -> Result<Identification, MuxError> {
    tracing::debug!("Identifying tracks in {}", source);

    let output = Command::new(mkvmerge)
        .arg("-J")
        .arg(source)
        .output()
        .await
        .map_err(|e| MuxError::Spawn {
            tool: mkvmerge.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(MuxError::ToolFailed {
            tool: mkvmerge.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let identification = Identification::from_json(&String::from_utf8_lossy(&output.stdout))?;
    tracing::debug!("{} reports {} tracks", source, identification.tracks.len());
    for track in &identification.tracks {
        tracing::debug!(
            "  track {}: {} ({})",
            track.id,
            track.kind,
            track.codec.as_deref().unwrap_or("unknown codec")
        );
    }

    Ok(identification)
}

/// A fully assembled mkvmerge invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxCommand {
    pub program: Utf8PathBuf,
    pub args: Vec<String>,
    pub output: Utf8PathBuf,
}

impl MuxCommand {
    /// Assemble the remux of `job` with `assets`, writing to the job's temp path.
    ///
    /// Existing subtitles, chapters and attachments in the source are dropped and
    /// replaced by the sidecars.
    pub fn build(
        program: &Utf8Path,
        job: &MuxJob,
        assets: &AssetSet,
        identification: &Identification,
    ) -> Self {
        let output = job.temp_path();
        let mut args = vec![
            "-o".to_string(),
            output.to_string(),
            "--title".to_string(),
            job.base_name(),
        ];

        if let Some(order) = identification.track_order() {
            args.push("--track-order".to_string());
            args.push(order);
        }

        args.extend(
            ["--no-subtitles", "--no-chapters", "--no-attachments"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(job.source_path.to_string());

        if let Some(chapters) = &assets.chapters {
            args.push("--chapters".to_string());
            args.push(chapters.to_string());
        }

        for (position, subtitle) in assets.subtitles.iter().enumerate() {
            let default = if SubtitleTrack::is_default(position) { "yes" } else { "no" };
            args.extend([
                "--language".to_string(),
                format!("0:{}", SUBTITLE_LANGUAGE),
                "--track-name".to_string(),
                format!("0:{}", subtitle.track_name(&job.release.group, position)),
                "--default-track".to_string(),
                format!("0:{}", default),
                "(".to_string(),
                subtitle.path.to_string(),
                ")".to_string(),
            ]);
        }

        for font in &assets.fonts {
            args.extend([
                "--attachment-mime-type".to_string(),
                FONT_MIME_TYPE.to_string(),
                "--attach-file".to_string(),
                font.to_string(),
            ]);
        }

        Self {
            program: program.to_path_buf(),
            args,
            output,
        }
    }

    /// Human-readable rendering for diagnostics; arguments with spaces are quoted.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|arg| {
                if arg.contains(' ') {
                    format!("\"{}\"", arg)
                } else {
                    arg.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReleaseName, SubtitleTrack};

    const JSON: &str = r#"{
        "container": {"type": "Matroska"},
        "tracks": [
            {"id": 2, "type": "subtitles", "codec": "SubStationAlpha"},
            {"id": 1, "type": "audio", "codec": "AAC"},
            {"id": 0, "type": "video", "codec": "AVC/H.264/MPEG-4p10"}
        ]
    }"#;

    fn job() -> MuxJob {
        MuxJob::new(
            Utf8PathBuf::from("/m/[ABC] Show - 01[DEADBEEF].mkv"),
            ReleaseName {
                group: "ABC".to_string(),
                series: "Show".to_string(),
                episode: "01".to_string(),
                old_hash: Some("DEADBEEF".to_string()),
            },
        )
        .unwrap()
    }

    fn subtitle(name: &str, index: u32, label: Option<&str>) -> SubtitleTrack {
        SubtitleTrack {
            path: Utf8PathBuf::from(format!("/m/subs/{}", name)),
            file_name: name.to_string(),
            index,
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_track_order_sorted_audio_video_only() {
        let identification = Identification::from_json(JSON).unwrap();
        assert_eq!(identification.track_order().as_deref(), Some("0:0,0:1"));
    }

    #[test]
    fn test_track_order_empty() {
        let identification = Identification::from_json(r#"{"tracks": []}"#).unwrap();
        assert_eq!(identification.track_order(), None);
    }

    #[test]
    fn test_codec_is_optional() {
        let identification =
            Identification::from_json(r#"{"tracks": [{"id": 0, "type": "video"}]}"#).unwrap();
        assert_eq!(identification.tracks[0].codec, None);

        let identification = Identification::from_json(JSON).unwrap();
        assert_eq!(identification.tracks[1].codec.as_deref(), Some("AAC"));
    }

    #[test]
    fn test_malformed_identification() {
        assert!(matches!(
            Identification::from_json("{\"tracks\": 3}"),
            Err(MuxError::InvalidIdentification(_))
        ));
    }

    #[test]
    fn test_build_full_command() {
        let identification = Identification::from_json(JSON).unwrap();
        let assets = AssetSet {
            subtitles: vec![
                subtitle("[ABC] Show - 01.ass", 0, None),
                subtitle("[ABC] Show - 01_1[Signs].ass", 1, Some("Signs")),
            ],
            chapters: Some(Utf8PathBuf::from("/m/chapters/[ABC] Show - 01.xml")),
            fonts: vec![Utf8PathBuf::from("/m/fonts/a.ttf")],
        };

        let command = MuxCommand::build(
            Utf8Path::new("mkvmerge"),
            &job(),
            &assets,
            &identification,
        );

        let expected: Vec<String> = [
            "-o",
            "/m/temp_muxed_[ABC] Show - 01[DEADBEEF].mkv",
            "--title",
            "[ABC] Show - 01",
            "--track-order",
            "0:0,0:1",
            "--no-subtitles",
            "--no-chapters",
            "--no-attachments",
            "/m/[ABC] Show - 01[DEADBEEF].mkv",
            "--chapters",
            "/m/chapters/[ABC] Show - 01.xml",
            "--language",
            "0:eng",
            "--track-name",
            "0:ABC",
            "--default-track",
            "0:yes",
            "(",
            "/m/subs/[ABC] Show - 01.ass",
            ")",
            "--language",
            "0:eng",
            "--track-name",
            "0:ABC - Signs",
            "--default-track",
            "0:no",
            "(",
            "/m/subs/[ABC] Show - 01_1[Signs].ass",
            ")",
            "--attachment-mime-type",
            "application/x-truetype-font",
            "--attach-file",
            "/m/fonts/a.ttf",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(command.args, expected);
        assert_eq!(command.output, job().temp_path());
    }

    #[test]
    fn test_build_without_chapters_or_fonts() {
        let identification = Identification::from_json(JSON).unwrap();
        let assets = AssetSet {
            subtitles: vec![subtitle("[ABC] Show - 01.ass", 0, None)],
            ..Default::default()
        };

        let command = MuxCommand::build(
            Utf8Path::new("mkvmerge"),
            &job(),
            &assets,
            &identification,
        );

        assert!(!command.args.contains(&"--chapters".to_string()));
        assert!(!command.args.contains(&"--attach-file".to_string()));
        assert!(command.display().contains("\"[ABC] Show - 01\""));
    }
}
