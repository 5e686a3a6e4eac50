//! maika-mux - batch remux of Matroska releases.
//!
//! # Execution Flow
//!
//! 1. Parse the command line
//! 2. Initialize logging → logs/maika-mux.<date>
//! 3. Load `muxer_config.yaml`, completing missing keys (may ask for the mkvmerge path)
//! 4. With `--config`: edit every setting interactively, save, and exit
//! 5. Expand the input paths into `.mkv` files
//! 6. Remux each file in turn on a single-threaded tokio runtime
//! 7. Print the batch summary
//!
//! Per-file failures are reported and skipped; only startup errors end the
//! process with a non-zero status.

use anyhow::{Context, Result};
use clap::Parser;
use maika_mux::logging::{self, LogOptions};
use maika_mux::services::collect_inputs;
use maika_mux::ui::report;
use maika_mux::ui::{ConsoleReporter, StdinPrompter};
use maika_mux::{APP_NAME, Cli, ConfigManager, MuxService, VERSION};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::setup_logging(&LogOptions {
        debug: cli.debug,
        console: cli.verbose,
        ..LogOptions::default()
    })?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = match &cli.config_file {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::in_current_dir()?,
    };

    let mut prompter = StdinPrompter;
    let settings = config_manager.load_or_init(&mut prompter)?;

    if cli.config {
        config_manager.edit_interactively(&settings, &mut prompter)?;
        println!("Configuration saved.");
        return Ok(());
    }

    let settings = cli.apply_overrides(settings);
    tracing::info!("Effective settings: {:?}", settings);
    report::print_settings(&settings);

    let inputs = collect_inputs(&cli.input_paths()?)?;
    for invalid in &inputs.invalid {
        report::print_invalid(invalid);
    }

    // Jobs run strictly one after another; the runtime only drives mkvmerge's pipes.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let mut reporter = ConsoleReporter::new(!cli.no_progress, settings.save_mux_log);
    let service = MuxService::new(settings);
    let metrics = runtime.block_on(service.run_batch(&inputs.files, &mut reporter));

    report::print_batch_summary(&metrics);
    tracing::info!("{} finished", APP_NAME);

    Ok(())
}
