//! Append-only `mux.log.txt` written beside the muxed files.

use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::Local;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;

const RULE: &str = "___________________________________________________";
const SKIPPED_LINE_MARKER: &str = "The following line will be skipped";

/// Formats and appends warning and error blocks.
pub struct MuxLog {
    /// `Warning: '<path>' <message>`
    warning_pattern: Regex,

    /// Subtitle line quoted after `timestamp:` in skipped-line warnings.
    skipped_pattern: Regex,
}

impl MuxLog {
    pub fn new() -> Self {
        Self {
            warning_pattern: Regex::new(r"^Warning: '(.+?)' (.+)").expect("Invalid warning regex"),
            skipped_pattern: Regex::new(r"timestamp: (.+)$").expect("Invalid skipped line regex"),
        }
    }

    /// Render the block recorded for a file that produced warnings.
    pub fn format_warnings(&self, timestamp: &str, file_name: &str, warnings: &[String]) -> String {
        let mut block = format!("[{}]\nWARNINGS FOR:\n{}\n\n", timestamp, file_name);

        for warning in warnings {
            match self.warning_pattern.captures(warning) {
                Some(caps) => {
                    let path = &caps[1];
                    let message = &caps[2];
                    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
                    block.push_str("Warning:\n");
                    block.push_str(&format!("{} | {}\n", name, message));

                    if message.contains(SKIPPED_LINE_MARKER) {
                        if let Some(skipped) = self.skipped_pattern.captures(warning) {
                            block.push_str(&format!("{}:\n", SKIPPED_LINE_MARKER));
                            block.push_str(&format!("{}\n{}\n{}\n", RULE, &skipped[1], RULE));
                        }
                    }
                }
                None => {
                    block.push_str(warning);
                    block.push('\n');
                }
            }
            block.push('\n');
        }

        block
    }

    pub fn format_error(&self, timestamp: &str, file_name: &str, error: &str) -> String {
        format!("[{}]\nERROR MUXING: {}\n\n{}\n\n", timestamp, file_name, error)
    }

    pub fn append_warnings(
        &self,
        log_path: &Utf8Path,
        file_name: &str,
        warnings: &[String],
    ) -> Result<()> {
        if warnings.is_empty() {
            return Ok(());
        }
        append(log_path, &self.format_warnings(&now(), file_name, warnings))
    }

    pub fn append_error(&self, log_path: &Utf8Path, file_name: &str, error: &str) -> Result<()> {
        append(log_path, &self.format_error(&now(), file_name, error))
    }
}

impl Default for MuxLog {
    fn default() -> Self {
        Self::new()
    }
}

fn now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn append(log_path: &Utf8Path, block: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open mux log: {}", log_path))?;

    file.write_all(block.as_bytes())
        .with_context(|| format!("Failed to write mux log: {}", log_path))?;

    tracing::debug!("Appended {} bytes to {}", block.len(), log_path);
    Ok(())
}
