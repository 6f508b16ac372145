//! Yes/no confirmation gates.

use std::io::{self, BufRead, IsTerminal, Write};

use tracing::{info, warn};

pub const CLEAN_NULLS_PROMPT: &str = "Clean null values? (Y/N)";
pub const COMMIT_PROMPT: &str = "Commit dataframe results? (Y/N)";

/// Source of a yes/no decision.
pub trait ConfirmationGate {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Only `Y` or `y` counts as yes.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim(), "Y" | "y")
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl ConfirmationGate for FixedAnswer {
    fn confirm(&mut self, prompt: &str) -> bool {
        info!(answer = self.0, "{prompt} answered by flag");
        self.0
    }
}

/// Asks on `output` and reads one line from `input`.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for ConsolePrompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        if let Err(error) = write!(self.output, "{prompt} ").and_then(|()| self.output.flush()) {
            warn!("Could not write prompt: {error}");
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => {
                let confirmed = is_affirmative(&answer);
                info!(answer = answer.trim(), confirmed, "{prompt}");
                confirmed
            }
            Err(error) => {
                warn!("Could not read answer, treating as no: {error}");
                false
            }
        }
    }
}

/// Builds the gate for a CLI choice: `None` prompts, `Some(answer)` is fixed.
///
/// Prompting falls back to "no" when stdin is not a terminal.
pub fn gate_for(answer: Option<bool>) -> Box<dyn ConfirmationGate> {
    match answer {
        Some(fixed) => Box::new(FixedAnswer(fixed)),
        None if io::stdin().is_terminal() => Box::new(ConsolePrompt::stdio()),
        None => {
            warn!("stdin is not a terminal; interactive gates answer no");
            Box::new(FixedAnswer(false))
        }
    }
}
