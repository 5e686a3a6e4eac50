//! mkvmerge process execution and output classification.
//!
//! mkvmerge reports progress as `Progress: NN%` lines and problems as
//! `Warning: ...` lines on its output streams. Everything else is informational.
//! On a terminal-less pipe, progress updates end in `\r` rather than `\n`, and
//! quoted subtitle text may not be valid UTF-8.

use crate::services::command::MuxCommand;
use crate::services::muxing::{JobOutcome, MuxError};
use camino::{Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};
use std::io;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};

static PROGRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Progress:\s*(\d+)%").expect("Invalid progress regex"));

static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'?(.+?\.(?:mkv|ass))'?:|'(.+?)'").expect("Invalid path regex")
});

/// One classified line of mkvmerge output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxLine {
    Progress(u8),
    Warning(String),
    Other(String),
}

/// Classify a single output line. Surrounding whitespace is ignored.
pub fn classify_line(line: &str) -> MuxLine {
    let line = line.trim();

    if let Some(caps) = PROGRESS_PATTERN.captures(line) {
        let percent = caps[1].parse::<u32>().unwrap_or(0).min(100) as u8;
        return MuxLine::Progress(percent);
    }

    if line.starts_with("Warning:") {
        return MuxLine::Warning(line.to_string());
    }

    MuxLine::Other(line.to_string())
}

/// Replace full paths mentioned in a line by their file names.
pub fn shorten_paths(line: &str) -> String {
    shorten_paths_with(line, str::to_string)
}

/// Like [`shorten_paths`], passing each file name through `render` (for highlighting).
pub fn shorten_paths_with<F>(line: &str, render: F) -> String
where
    F: Fn(&str) -> String,
{
    PATH_PATTERN
        .replace_all(line, |caps: &Captures| {
            let full = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            render(base_name(full))
        })
        .into_owned()
}

/// Final component of a path written with either separator.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Receives classified mkvmerge output as it streams in.
pub trait MuxObserver {
    fn on_start(&mut self, _file_name: &str) {}

    fn on_progress(&mut self, percent: u8);

    /// Informational line (never called for progress or warnings).
    fn on_line(&mut self, line: &str);

    fn on_finish(&mut self, _exit_code: i32) {}

    /// Sidecar folders created beside a container before discovery.
    fn on_folders_created(&mut self, _folders: &[Utf8PathBuf]) {}

    /// Called once per input file after it has been processed or skipped.
    fn on_outcome(&mut self, _path: &Utf8Path, _outcome: &JobOutcome) {}
}

/// Observer that discards everything.
pub struct SilentObserver;

impl MuxObserver for SilentObserver {
    fn on_progress(&mut self, _percent: u8) {}
    fn on_line(&mut self, _line: &str) {}
}

/// Result of a finished mkvmerge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuxOutcome {
    pub exit_code: i32,
    pub warnings: Vec<String>,
}

impl MuxOutcome {
    /// mkvmerge exits with 1 when it finished but emitted warnings.
    pub fn succeeded(&self) -> bool {
        matches!(self.exit_code, 0 | 1)
    }
}

/// Feed one chunk of output through the classifier and into `observer`/`warnings`.
///
/// A chunk may hold several `\r`-separated updates; each is classified alone.
fn dispatch(chunk: &str, observer: &mut dyn MuxObserver, warnings: &mut Vec<String>) {
    for line in chunk.split(['\r', '\n']) {
        if line.trim().is_empty() {
            continue;
        }

        match classify_line(line) {
            MuxLine::Progress(percent) => observer.on_progress(percent),
            MuxLine::Warning(warning) => warnings.push(warning),
            MuxLine::Other(text) => observer.on_line(&text),
        }
    }
}

/// Read up to the next `\n`, decoding invalid UTF-8 lossily.
///
/// `buf` holds bytes of a read interrupted by another `select!` branch and must
/// persist across calls.
async fn read_chunk<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let read = reader.read_until(b'\n', buf).await?;
    if read == 0 && buf.is_empty() {
        return Ok(None);
    }

    let chunk = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    Ok(Some(chunk))
}

/// Drain stdout and stderr together until both are closed.
async fn drain_output(
    stdout: ChildStdout,
    stderr: ChildStderr,
    observer: &mut dyn MuxObserver,
    warnings: &mut Vec<String>,
) -> io::Result<()> {
    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    let mut stdout_open = true;
    let mut stderr_open = true;

    while stdout_open || stderr_open {
        tokio::select! {
            chunk = read_chunk(&mut stdout, &mut stdout_buf), if stdout_open => match chunk? {
                Some(chunk) => dispatch(&chunk, observer, warnings),
                None => stdout_open = false,
            },
            chunk = read_chunk(&mut stderr, &mut stderr_buf), if stderr_open => match chunk? {
                Some(chunk) => dispatch(&chunk, observer, warnings),
                None => stderr_open = false,
            },
        }
    }

    Ok(())
}

/// Run mkvmerge to completion, streaming stdout and stderr through the classifier.
///
/// If reading its output fails the child is killed and reaped before the error
/// is returned, so it never outlives its job.
pub async fn run_mux(
    command: &MuxCommand,
    file_name: &str,
    observer: &mut dyn MuxObserver,
) -> Result<MuxOutcome, MuxError> {
    tracing::info!("Executing: {}", command.display());

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| MuxError::Spawn {
            tool: command.program.to_string(),
            source: e,
        })?;

    let stdout = child.stdout.take().ok_or(MuxError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(MuxError::MissingPipe("stderr"))?;

    observer.on_start(file_name);

    let mut warnings = Vec::new();
    if let Err(e) = drain_output(stdout, stderr, observer, &mut warnings).await {
        tracing::error!("Lost mkvmerge output for {}: {}", file_name, e);
        if let Err(kill_err) = child.kill().await {
            tracing::warn!("Failed to stop mkvmerge: {}", kill_err);
        }
        return Err(e.into());
    }

    let status = child.wait().await?;
    let exit_code = status.code().unwrap_or(-1);
    observer.on_finish(exit_code);

    tracing::info!(
        "mkvmerge finished for {} with exit code {} ({} warnings)",
        file_name,
        exit_code,
        warnings.len()
    );

    Ok(MuxOutcome {
        exit_code,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        progress: Vec<u8>,
        lines: Vec<String>,
    }

    impl MuxObserver for Recorder {
        fn on_progress(&mut self, percent: u8) {
            self.progress.push(percent);
        }

        fn on_line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }

    #[test]
    fn test_classify_progress() {
        assert_eq!(classify_line("Progress: 42%"), MuxLine::Progress(42));
        assert_eq!(classify_line("  Progress: 100%\r"), MuxLine::Progress(100));
        assert_eq!(classify_line("Progress: 250%"), MuxLine::Progress(100));
    }

    #[test]
    fn test_classify_warning() {
        let line = "Warning: '/m/subs/a.ass' line 12: The following line will be skipped";
        assert_eq!(classify_line(line), MuxLine::Warning(line.to_string()));
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(
            classify_line("Multiplexing took 2 seconds."),
            MuxLine::Other("Multiplexing took 2 seconds.".to_string())
        );
        assert_eq!(
            classify_line("The progress: 10%"),
            MuxLine::Other("The progress: 10%".to_string())
        );
    }

    #[test]
    fn test_shorten_quoted_paths() {
        let line = "The file '/media/show/[ABC] Show - 01.mkv' has been opened for writing.";
        assert_eq!(
            shorten_paths(line),
            "The file [ABC] Show - 01.mkv has been opened for writing."
        );
    }

    #[test]
    fn test_shorten_path_with_colon() {
        let line = "'/media/subs/a.ass': Using the input module for SSA/ASS subtitles.";
        assert_eq!(
            shorten_paths(line),
            "a.ass Using the input module for SSA/ASS subtitles."
        );
    }

    #[test]
    fn test_shorten_paths_with_renderer() {
        let line = "Opening 'C:\\media\\x.mkv'";
        assert_eq!(
            shorten_paths_with(line, |name| format!("<{}>", name)),
            "Opening <x.mkv>"
        );
    }

    #[test]
    fn test_dispatch_routes_lines() {
        let mut recorder = Recorder::default();
        let mut warnings = Vec::new();

        for line in ["Progress: 10%", "", "Warning: odd", "Done."] {
            dispatch(line, &mut recorder, &mut warnings);
        }

        assert_eq!(recorder.progress, vec![10]);
        assert_eq!(recorder.lines, vec!["Done.".to_string()]);
        assert_eq!(warnings, vec!["Warning: odd".to_string()]);
    }

    #[test]
    fn test_dispatch_splits_carriage_returns() {
        let mut recorder = Recorder::default();
        let mut warnings = Vec::new();

        dispatch(
            "Progress: 0%\rProgress: 50%\rWarning: mid-mux gap\n",
            &mut recorder,
            &mut warnings,
        );
        dispatch("Progress: 100%\r\n", &mut recorder, &mut warnings);

        assert_eq!(recorder.progress, vec![0, 50, 100]);
        assert_eq!(warnings, vec!["Warning: mid-mux gap".to_string()]);
        assert!(recorder.lines.is_empty());
    }

    #[test]
    fn test_outcome_success_codes() {
        let outcome = |exit_code| MuxOutcome {
            exit_code,
            warnings: Vec::new(),
        };

        assert!(outcome(0).succeeded());
        assert!(outcome(1).succeeded());
        assert!(!outcome(2).succeeded());
        assert!(!outcome(-1).succeeded());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_mux_collects_output() {
        let command = MuxCommand {
            program: "sh".into(),
            args: vec![
                "-c".to_string(),
                "echo 'Progress: 50%'; echo 'Warning: careful' 1>&2; echo 'All done'; exit 1"
                    .to_string(),
            ],
            output: "unused.mkv".into(),
        };

        let mut recorder = Recorder::default();
        let outcome = run_mux(&command, "x.mkv", &mut recorder).await.unwrap();

        assert_eq!(outcome.exit_code, 1);
        assert!(outcome.succeeded());
        assert_eq!(outcome.warnings, vec!["Warning: careful".to_string()]);
        assert_eq!(recorder.progress, vec![50]);
        assert_eq!(recorder.lines, vec!["All done".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_mux_carriage_return_progress() {
        let command = MuxCommand {
            program: "sh".into(),
            args: vec![
                "-c".to_string(),
                r"printf 'Progress: 0%%\rProgress: 50%%\rWarning: mid-mux gap\nProgress: 100%%\r\n'"
                    .to_string(),
            ],
            output: "unused.mkv".into(),
        };

        let mut recorder = Recorder::default();
        let outcome = run_mux(&command, "x.mkv", &mut recorder).await.unwrap();

        assert_eq!(recorder.progress, vec![0, 50, 100]);
        assert_eq!(outcome.warnings, vec!["Warning: mid-mux gap".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_mux_tolerates_invalid_utf8() {
        let command = MuxCommand {
            program: "sh".into(),
            args: vec![
                "-c".to_string(),
                r"printf 'Warning: caf\351 line\n'; echo 'Progress: 100%'; echo 'Done.'".to_string(),
            ],
            output: "unused.mkv".into(),
        };

        let mut recorder = Recorder::default();
        let outcome = run_mux(&command, "x.mkv", &mut recorder).await.unwrap();

        assert_eq!(outcome.exit_code, 0);
        assert_eq!(outcome.warnings, vec!["Warning: caf\u{FFFD} line".to_string()]);
        assert_eq!(recorder.progress, vec![100]);
        assert_eq!(recorder.lines, vec!["Done.".to_string()]);
    }

    #[tokio::test]
    async fn test_run_mux_missing_program() {
        let command = MuxCommand {
            program: "/nonexistent/mkvmerge-does-not-exist".into(),
            args: Vec::new(),
            output: "unused.mkv".into(),
        };

        let result = run_mux(&command, "x.mkv", &mut SilentObserver).await;
        assert!(matches!(result, Err(MuxError::Spawn { .. })));
    }
}
