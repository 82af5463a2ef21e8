//! Copy text to the system clipboard through the platform's clipboard tool

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};

type Tool = (&'static str, &'static [&'static str]);

/// Candidate clipboard programs, in order of preference
#[cfg(target_os = "macos")]
const TOOLS: &[Tool] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const TOOLS: &[Tool] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const TOOLS: &[Tool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Write `text` to the clipboard using the first tool that works
pub fn copy(text: &str) -> Result<()> {
    let mut last_error = None;

    for (program, args) in TOOLS {
        match pipe_to(program, args, text) {
            Ok(()) => {
                debug!("copied {} chars with {}", text.chars().count(), program);
                return Ok(());
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow!("no clipboard tool available")))
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start {}", program))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("failed to write to {}", program))?;
    }

    let status = child.wait().with_context(|| format!("{} did not finish", program))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("{} exited with {}", program, status))
    }
}
