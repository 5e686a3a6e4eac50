use crate::metrics::BatchMetrics;
use crate::models::{MuxJob, Settings};
use crate::services::command::{self, MuxCommand};
use crate::services::finalize::{self, MuxSummary};
use crate::services::mux_log::MuxLog;
use crate::services::release_name::ReleaseNameParser;
use crate::services::runner::{self, MuxObserver};
use crate::services::sidecar;
use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Errors raised while talking to mkvmerge.
#[derive(Error, Debug)]
pub enum MuxError {
    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{tool} exited with code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("Invalid mkvmerge identification output: {0}")]
    InvalidIdentification(String),

    #[error("mkvmerge failed with exit code {0}")]
    MuxerFailed(i32),

    #[error("mkvmerge {0} was not captured")]
    MissingPipe(&'static str),

    #[error("Process error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file name does not follow the release naming convention.
    UnrecognizedName,
    /// No subtitles, chapters or fonts were found for it.
    NoSidecars,
}

/// A successfully remuxed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuxedFile {
    pub final_path: Utf8PathBuf,
    pub replaced_original: bool,
    pub warnings: Vec<String>,
    pub summary: MuxSummary,
}

/// Result of processing one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Muxed(MuxedFile),
    Skipped(SkipReason),
    Failed {
        error: String,
        /// Whether an error block was appended to the mux log.
        logged: bool,
    },
}

/// Temp output owned by a job; removed on drop unless it was moved into place.
struct TempOutput {
    path: Utf8PathBuf,
    armed: bool,
}

impl TempOutput {
    fn new(path: Utf8PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            match fs::remove_file(&self.path) {
                Ok(()) => tracing::info!("Removed temp file {}", self.path),
                Err(e) => tracing::warn!("Failed to remove temp file {}: {}", self.path, e),
            }
        }
    }
}

/// Runs the per-file remux pipeline: parse, discover, build, run, finalize.
///
/// Every failure is contained to the file being processed; the batch always
/// continues with the next input.
pub struct MuxService {
    settings: Settings,
    parser: ReleaseNameParser,
    mux_log: MuxLog,
}

impl MuxService {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            parser: ReleaseNameParser::new(),
            mux_log: MuxLog::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process every file in order and tally the outcomes.
    pub async fn run_batch(
        &self,
        files: &[Utf8PathBuf],
        observer: &mut dyn MuxObserver,
    ) -> BatchMetrics {
        let mut metrics = BatchMetrics::new();

        for file in files {
            let outcome = self.process(file, observer).await;
            metrics.record(&outcome);
            observer.on_outcome(file, &outcome);
        }

        metrics.log_summary();
        metrics
    }

    /// Process a single container file.
    pub async fn process(&self, path: &Utf8Path, observer: &mut dyn MuxObserver) -> JobOutcome {
        let Some(job) = self.parser.job_for(path) else {
            tracing::warn!("Failed to extract release info from {}", path);
            return JobOutcome::Skipped(SkipReason::UnrecognizedName);
        };

        match self.mux_job(&job, observer).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let error = format!("{:#}", e);
                tracing::error!("Error muxing {}: {}", job.file_name, error);

                let logged = self.settings.save_mux_log && {
                    match self.mux_log.append_error(&job.log_path(), &job.file_name, &error) {
                        Ok(()) => true,
                        Err(log_err) => {
                            tracing::warn!("Could not write mux log: {:#}", log_err);
                            false
                        }
                    }
                };

                JobOutcome::Failed { error, logged }
            }
        }
    }

    async fn mux_job(&self, job: &MuxJob, observer: &mut dyn MuxObserver) -> Result<JobOutcome> {
        if self.settings.create_folders {
            let created = sidecar::ensure_folders(&job.directory)?;
            if !created.is_empty() {
                observer.on_folders_created(&created);
            }
        }

        let assets = sidecar::discover(job)?;
        if assets.is_empty() {
            tracing::info!("No additional files found for {}", job.file_name);
            return Ok(JobOutcome::Skipped(SkipReason::NoSidecars));
        }

        let identification =
            command::identify(&self.settings.mkvmerge_path, &job.source_path).await?;
        let command = MuxCommand::build(&self.settings.mkvmerge_path, job, &assets, &identification);

        let temp = TempOutput::new(command.output.clone());
        let outcome = runner::run_mux(&command, &job.file_name, observer).await?;

        self.log_warnings(job, &outcome.warnings);

        if !outcome.succeeded() {
            return Err(MuxError::MuxerFailed(outcome.exit_code).into());
        }

        let finalized = finalize::finalize(job, temp.path(), self.settings.overwrite_original)?;
        temp.disarm();

        let mut warnings = outcome.warnings;
        if let Some(warning) = finalized.warning {
            self.log_warnings(job, std::slice::from_ref(&warning));
            warnings.push(warning);
        }

        Ok(JobOutcome::Muxed(MuxedFile {
            final_path: finalized.final_path,
            replaced_original: finalized.replaced_original,
            warnings,
            summary: MuxSummary::new(job, &assets),
        }))
    }

    fn log_warnings(&self, job: &MuxJob, warnings: &[String]) {
        if !self.settings.save_mux_log || warnings.is_empty() {
            return;
        }

        if let Err(e) = self
            .mux_log
            .append_warnings(&job.log_path(), &job.file_name, warnings)
        {
            tracing::warn!("Could not write mux log: {:#}", e);
        }
    }
}
