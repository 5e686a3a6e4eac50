// Mux report
//
// Renders the mux report for each file: a framed block with an in-place
// progress bar and mkvmerge's informational output, followed by the outcome
// and a summary of what was muxed.

use crate::metrics::BatchMetrics;
use crate::models::Settings;
use crate::models::job::MUX_LOG_NAME;
use crate::services::muxing::{JobOutcome, MuxedFile, SkipReason};
use crate::services::runner::{MuxObserver, shorten_paths_with};
use camino::{Utf8Path, Utf8PathBuf};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{prefix}[{bar:20.green}] {pos}%";

/// [`MuxObserver`] that writes to the terminal.
pub struct ConsoleReporter {
    show_progress: bool,
    save_log: bool,
    current_file: String,
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    pub fn new(show_progress: bool, save_log: bool) -> Self {
        Self {
            show_progress,
            save_log,
            current_file: String::new(),
            bar: None,
        }
    }

    fn progress_bar(&mut self) -> &ProgressBar {
        self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::with_template(BAR_TEMPLATE)
                    .expect("Invalid progress bar template")
                    .progress_chars("█░"),
            );
            bar.set_prefix("║ Progress: ");
            bar
        })
    }

    fn print_muxed(&self, path: &Utf8Path, muxed: &MuxedFile) {
        println!("{}", style("✔ Muxing completed successfully.").green());

        let file_name = muxed.final_path.file_name().unwrap_or(muxed.final_path.as_str());
        if muxed.replaced_original {
            println!("{}", style("► Original file overwritten with new muxed file:").yellow());
        } else {
            println!("{}", style("► New muxed file created:").yellow());
        }
        println!("  {}", style(file_name).white());

        println!("\n{}", style("Muxed content:").cyan());
        for line in muxed.summary.lines() {
            match line.strip_prefix("  ") {
                Some(detail) => println!("  {}", style(detail).white()),
                None => println!("{}", style(format!("► {}", line)).yellow()),
            }
        }

        if self.save_log && !muxed.warnings.is_empty() {
            println!(
                "{} {}",
                style("► Warnings saved to:").yellow(),
                log_path_for(path)
            );
        }
    }
}

fn log_path_for(path: &Utf8Path) -> Utf8PathBuf {
    path.parent()
        .map(|dir| dir.join(MUX_LOG_NAME))
        .unwrap_or_else(|| Utf8PathBuf::from(MUX_LOG_NAME))
}

fn display_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}

impl MuxObserver for ConsoleReporter {
    fn on_start(&mut self, file_name: &str) {
        self.current_file = file_name.to_string();
        println!(
            "\n{}{}{}",
            style("╔══ Muxing ").cyan(),
            style(file_name).white(),
            style(" ══╗").cyan()
        );
    }

    fn on_progress(&mut self, percent: u8) {
        if self.show_progress {
            self.progress_bar().set_position(u64::from(percent));
        }
    }

    fn on_line(&mut self, line: &str) {
        let text = shorten_paths_with(line, |name| style(name).red().to_string());
        let rendered = format!("{} {}", style("║").yellow(), style(text).yellow());

        match &self.bar {
            Some(bar) => bar.println(rendered),
            None => println!("{}", rendered),
        }
    }

    fn on_finish(&mut self, exit_code: i32) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
        tracing::debug!("Closing report for {} (exit {})", self.current_file, exit_code);
        println!(
            "{}",
            style(format!(
                "╚{}╝",
                "═".repeat(self.current_file.chars().count() + 10)
            ))
            .cyan()
        );
    }

    fn on_folders_created(&mut self, folders: &[Utf8PathBuf]) {
        for folder in folders {
            println!("{}", style(format!("Created folder: {}", folder)).yellow());
        }
    }

    fn on_outcome(&mut self, path: &Utf8Path, outcome: &JobOutcome) {
        let name = display_name(path);

        match outcome {
            JobOutcome::Muxed(muxed) => self.print_muxed(path, muxed),
            JobOutcome::Skipped(SkipReason::UnrecognizedName) => {
                println!("{}", style(format!("Failed to extract info from {}", name)).red());
            }
            JobOutcome::Skipped(SkipReason::NoSidecars) => {
                println!("{}", style(format!("No additional files found for {}", name)).yellow());
            }
            JobOutcome::Failed { error, logged } => {
                println!("{}", style(format!("✘ Error muxing file {}: {}", name, error)).red());
                if *logged {
                    println!(
                        "{}",
                        style(format!("  Check {} for details.", log_path_for(path))).red()
                    );
                }
            }
        }
    }
}

/// Effective settings for this run.
pub fn print_settings(settings: &Settings) {
    println!("Overwrite setting: {}", settings.overwrite_original);
    println!("Create folders setting: {}", settings.create_folders);
    println!("Save log setting: {}", settings.save_mux_log);
}

pub fn print_invalid(path: &Utf8Path) {
    println!("{}", style(format!("Invalid path: {}", path)).red());
}

pub fn print_batch_summary(metrics: &BatchMetrics) {
    println!("\n{}", style(metrics.summary()).cyan().bold());
}
