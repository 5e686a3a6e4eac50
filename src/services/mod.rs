//! Services module - the remux pipeline.
//!
//! Each stage is a small, independently testable unit; [`MuxService`] wires
//! them together for one container at a time:
//!
//! 1. [`release_name`]: parse `[Group] Series - Episode[HASH].mkv`
//! 2. [`sidecar`]: find subtitles, chapters and fonts in `subs/`, `chapters/`, `fonts/`
//! 3. [`command`]: identify source tracks with `mkvmerge -J` and build the mux command
//! 4. [`runner`]: run mkvmerge, classifying its output into progress, warnings and info
//! 5. [`finalize`]: CRC32 the result and move it into place
//!
//! [`mux_log`] records warnings and errors beside the files, [`tool_discovery`]
//! locates mkvmerge and [`inputs`] expands command-line paths.
//!
//! Nothing here prints to the console; presentation goes through
//! [`MuxObserver`](runner::MuxObserver).

pub mod command;
pub mod finalize;
pub mod inputs;
pub mod mux_log;
pub mod muxing;
pub mod release_name;
pub mod runner;
pub mod sidecar;
pub mod tool_discovery;

pub use command::{Identification, MuxCommand};
pub use finalize::MuxSummary;
pub use inputs::{Inputs, collect_inputs};
pub use muxing::{JobOutcome, MuxError, MuxService, MuxedFile, SkipReason};
pub use release_name::ReleaseNameParser;
pub use runner::{MuxLine, MuxObserver, MuxOutcome, classify_line};
pub use tool_discovery::find_mkvmerge;
