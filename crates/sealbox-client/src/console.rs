//! The human at the keyboard, behind a trait.
//!
//! Console and stdin handling are external collaborators as far as the
//! protocol reactor is concerned; this seam lets tests drive the reactor
//! with scripted input and capture what it would display.

use std::io::Write as _;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

// ----------------------------------------------------------------------------
// Console Trait
// ----------------------------------------------------------------------------

#[async_trait]
pub trait Console: Send {
    /// One line typed by the human, or `None` when input is exhausted.
    async fn read_line(&mut self) -> std::io::Result<Option<String>>;

    /// Display a line to the human.
    fn show(&mut self, line: &str);
}

#[async_trait]
impl<T: Console> Console for &mut T {
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        (**self).read_line().await
    }

    fn show(&mut self, line: &str) {
        (**self).show(line)
    }
}

// ----------------------------------------------------------------------------
// Terminal Console
// ----------------------------------------------------------------------------

/// Production console: prompts on stdout, reads stdin.
pub struct TerminalConsole {
    reader: BufReader<Stdin>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        print!("\n> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    fn show(&mut self, line: &str) {
        println!("{line}");
    }
}

// ----------------------------------------------------------------------------
// Scripted Console (test support)
// ----------------------------------------------------------------------------

/// Test console: pops pre-scripted input lines and records what was shown.
#[cfg(test)]
pub(crate) struct ScriptedConsole {
    input: std::collections::VecDeque<String>,
    pub shown: Vec<String>,
}

#[cfg(test)]
impl ScriptedConsole {
    pub fn new<I: IntoIterator<Item = &'static str>>(lines: I) -> Self {
        Self {
            input: lines.into_iter().map(str::to_owned).collect(),
            shown: Vec::new(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Console for ScriptedConsole {
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.input.pop_front())
    }

    fn show(&mut self, line: &str) {
        self.shown.push(line.to_owned());
    }
}
