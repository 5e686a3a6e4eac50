//! Interactive questions for first-run setup and `--config`.

use anyhow::{Context, Result, bail};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Source of answers to interactive questions.
pub trait Prompter {
    /// Ask `question` and return the answer without its line ending.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Show a message that needs no answer.
    fn notify(&mut self, message: &str);
}

/// Prompts on stdout and reads answers from stdin.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{}", question).context("Failed to write prompt")?;
        stdout.flush().context("Failed to flush prompt")?;

        let mut answer = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read answer")?;
        if read == 0 {
            bail!("Input closed while waiting for an answer");
        }

        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn notify(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Answers from a fixed list, for non-interactive runs.
///
/// Fails once the list is exhausted instead of blocking.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every question asked, in order.
    pub questions: Vec<String>,
    /// Every notification shown, in order.
    pub messages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
            messages: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer),
            None => bail!("No scripted answer for: {}", question),
        }
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompter() {
        let mut prompter = ScriptedPrompter::new(["first", ""]);

        assert_eq!(prompter.ask("one? ").unwrap(), "first");
        assert_eq!(prompter.ask("two? ").unwrap(), "");
        assert!(prompter.ask("three? ").is_err());
        assert_eq!(prompter.questions, vec!["one? ", "two? ", "three? "]);
    }
}
