//! Snippets run in a child `codeq` process, so an interpreter that aborts
//! (for example on a failed multi-gigabyte allocation) only takes the child
//! down.

use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::Report;

/// Hidden subcommand the parent uses to start a worker.
pub const WORKER_COMMAND: &str = "exec";

/// Worker side: reads code from stdin, writes one JSON [`Report`] to stdout.
pub fn serve() -> Result<()> {
    let mut code = String::new();
    io::stdin()
        .read_to_string(&mut code)
        .context("Failed to read code from stdin")?;

    let report = super::run(&code);

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &report).context("Failed to write execution report")?;
    stdout.flush().context("Failed to flush execution report")?;
    Ok(())
}

/// Parent side: runs `code` in `program exec` and decodes its report.
pub fn run_in_child(program: &Path, code: &str) -> Result<Report> {
    let mut child = Command::new(program)
        .arg(WORKER_COMMAND)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| {
            format!(
                "Failed to start interpreter process '{}'",
                program.display()
            )
        })?;
    debug!(pid = child.id(), "started interpreter process");

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(code.as_bytes())
            .context("Failed to send code to interpreter process")?;
    }

    let output = child
        .wait_with_output()
        .context("Failed to wait for interpreter process")?;
    read_report(output.status, &output.stdout)
}

fn read_report(status: ExitStatus, stdout: &[u8]) -> Result<Report> {
    if !status.success() {
        bail!(
            "Interpreter process terminated abnormally ({status}); the code may have run out of memory"
        );
    }
    serde_json::from_slice(stdout).context("Interpreter process sent an unreadable report")
}
