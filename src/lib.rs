// maika-mux - batch remux of Matroska releases with sidecar subtitles, chapters and fonts
//
// This is the library crate containing the muxing pipeline and data structures.
// The binary crate (main.rs) provides the command-line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod ui;

// Re-export commonly used types for convenience
pub use cli::Cli;
pub use config::ConfigManager;
pub use metrics::BatchMetrics;
pub use models::{AssetSet, MuxJob, ReleaseName, Settings};
pub use services::{JobOutcome, MuxService};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
