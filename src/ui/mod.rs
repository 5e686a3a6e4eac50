//! Terminal presentation: colored mux reports, the progress bar and prompts.

pub mod prompt;
pub mod report;

pub use prompt::{Prompter, ScriptedPrompter, StdinPrompter};
pub use report::ConsoleReporter;
