use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::agent::tools::Execution;
use crate::script::{Value, worker};

/// Asks the user whether a piece of code may run.
pub trait Confirm {
    fn confirm(&self, code: &str) -> Result<bool>;
}

/// Executes approved code.
pub trait CodeRunner {
    fn run(&self, code: &str) -> Result<Option<Value>>;
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, code: &str) -> Result<bool> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{} [y/N]: ", prompt_text(code))
            .and_then(|()| stderr.flush())
            .context("Failed to write confirmation prompt")?;

        let mut answer = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read confirmation answer")?;
        if read == 0 {
            // EOF
            writeln!(stderr).ok();
            return Ok(false);
        }
        Ok(is_approval(&answer))
    }
}

/// Runs code in an interpreter worker started from `program`.
///
/// Whatever the code prints is forwarded to stdout before the result is
/// returned.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    program: PathBuf,
}

impl ScriptRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Uses the running `codeq` binary as the worker.
    pub fn current_exe() -> Result<Self> {
        std::env::current_exe()
            .context("Failed to locate the codeq executable")
            .map(Self::new)
    }
}

impl CodeRunner for ScriptRunner {
    fn run(&self, code: &str) -> Result<Option<Value>> {
        let report =
            worker::run_in_child(&self.program, code).context("Code execution failed")?;

        if !report.output.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(report.output.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to forward code output")?;
        }
        report.result.context("Code execution failed")
    }
}

pub fn prompt_text(code: &str) -> String {
    format!("Do you want to run this code?\n```\n{code}\n```")
}

pub fn is_approval(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Runs code only after the user approves it.
pub struct ConfirmationGate<'a> {
    confirm: &'a dyn Confirm,
    runner: &'a dyn CodeRunner,
}

impl<'a> ConfirmationGate<'a> {
    pub fn new(confirm: &'a dyn Confirm, runner: &'a dyn CodeRunner) -> Self {
        Self { confirm, runner }
    }

    pub fn run(&self, code: &str) -> Result<Execution> {
        if !self.confirm.confirm(code)? {
            info!("code execution declined");
            return Ok(Execution::Refused);
        }

        debug!(code_len = code.len(), "code execution approved");
        self.runner.run(code).map(Execution::from)
    }
}
