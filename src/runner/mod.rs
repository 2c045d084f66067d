//! Command wrapper with captured output and verbose failure reporting.
//!
//! The wrapper runs one external command with stdout and stderr redirected
//! into uniquely-named temporary files. On success the captured streams are
//! relayed to the caller's own streams (unless suppressed); on failure a
//! diagnostic bundle goes to stderr and the caller gets a failure indicator
//! back. The capture files are removed on every path.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context as _;
use tempfile::NamedTempFile;

use crate::config::Context;
use crate::output::{self, RED};
use crate::trace::{self, BacktraceInspector};

/// Marker row framing a captured stream in the failure report.
const FRAME_LINE: &str = "----------------------------------------";

/// Wrapper options parsed from the front of the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Extra text for the `Command failed` header, from `--msg`.
    pub message: Option<String>,
    /// Echo captured stdout on success.
    pub echo_stdout: bool,
    /// Echo captured stderr on success.
    pub echo_stderr: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            message: None,
            echo_stdout: true,
            echo_stderr: true,
        }
    }
}

/// Split leading wrapper flags from the command tokens.
///
/// Parsing is strictly left-to-right and stops at the first token that is
/// not a recognized flag; that token and everything after it are the
/// command to execute.
///
/// # Errors
///
/// Returns an error for an unrecognized leading flag, a `--msg` without a
/// value, or an empty command. These are usage errors: route them to
/// [`crate::output::assertion_failure`], not to the command-failure path.
pub fn parse_args(args: &[String]) -> anyhow::Result<(RunOptions, &[String])> {
    let mut opts = RunOptions::default();
    let mut rest = args;
    loop {
        match rest {
            [flag, value, tail @ ..] if flag == "--msg" => {
                opts.message = Some(value.clone());
                rest = tail;
            }
            [flag] if flag == "--msg" => anyhow::bail!("--msg requires a value"),
            [flag, tail @ ..] if flag == "--no-stdout" => {
                opts.echo_stdout = false;
                rest = tail;
            }
            [flag, tail @ ..] if flag == "--no-stderr" => {
                opts.echo_stderr = false;
                rest = tail;
            }
            [flag, tail @ ..] if flag == "--silent" => {
                opts.echo_stdout = false;
                opts.echo_stderr = false;
                rest = tail;
            }
            [flag, ..] if flag.starts_with('-') => {
                anyhow::bail!("unrecognized option: {flag}")
            }
            _ => break,
        }
    }
    if rest.is_empty() {
        anyhow::bail!("no command given");
    }
    Ok((opts, rest))
}

/// Run `command`, capturing both output streams to temporary files.
///
/// Returns `Ok(true)` when the command exits zero and `Ok(false)` when it
/// does not; the failure report has already been printed in the latter
/// case, and the caller only decides whether to carry on.
///
/// # Errors
///
/// Returns an error when the capture files cannot be created or the command
/// cannot be spawned at all (e.g. the binary does not exist).
pub fn run(ctx: &Context, opts: &RunOptions, command: &[String]) -> anyhow::Result<bool> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("no command given"))?;

    let stdout_capture = NamedTempFile::new().context("failed to create stdout capture file")?;
    let stderr_capture = NamedTempFile::new().context("failed to create stderr capture file")?;

    let status = Command::new(program)
        .args(args)
        .stdout(Stdio::from(
            stdout_capture
                .reopen()
                .context("failed to reopen stdout capture file")?,
        ))
        .stderr(Stdio::from(
            stderr_capture
                .reopen()
                .context("failed to reopen stderr capture file")?,
        ))
        .status()
        .with_context(|| format!("failed to execute {program}"))?;

    if status.success() {
        if opts.echo_stdout {
            relay(stdout_capture.path(), &mut io::stdout().lock())?;
        }
        if opts.echo_stderr {
            relay(stderr_capture.path(), &mut io::stderr().lock())?;
        }
        return Ok(true);
    }

    let stdout_text = read_capture(stdout_capture.path());
    let stderr_text = read_capture(stderr_capture.path());
    {
        let mut err = io::stderr().lock();
        let _ = write_failure_report(&mut err, ctx, opts, command, &stdout_text, &stderr_text);
    }
    trace::print_stack_trace(ctx, &BacktraceInspector::capture(1));
    Ok(false)
}

/// Copy a capture file verbatim to one of our own streams.
fn relay(path: &Path, out: &mut impl io::Write) -> anyhow::Result<()> {
    let mut file = std::fs::File::open(path)
        .with_context(|| format!("failed to reread capture file {}", path.display()))?;
    io::copy(&mut file, out).context("failed to relay captured output")?;
    out.flush().context("failed to flush relayed output")?;
    Ok(())
}

/// Read a capture file for the failure report. A capture that cannot be
/// read back is treated as empty rather than failing the report.
fn read_capture(path: &Path) -> String {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// The diagnostic bundle for a failed command: separator, header, literal
/// command line, then both captured streams.
fn write_failure_report(
    out: &mut impl io::Write,
    ctx: &Context,
    opts: &RunOptions,
    command: &[String],
    stdout_text: &str,
    stderr_text: &str,
) -> io::Result<()> {
    writeln!(out)?;
    let header = match &opts.message {
        Some(msg) => format!("Command failed: {msg}"),
        None => "Command failed".to_string(),
    };
    writeln!(out, "{}", output::paint(ctx, RED, &header))?;
    writeln!(out, "Command line: {}", command.join(" "))?;
    if let Some(target) = &ctx.target_name {
        writeln!(out, "Target binary: {target}")?;
    }
    write_stream_section(out, "stdout", stdout_text)?;
    write_stream_section(out, "stderr", stderr_text)?;
    Ok(())
}

/// One captured stream: `name: <EMPTY>`, or the content framed by marker
/// lines.
fn write_stream_section(out: &mut impl io::Write, name: &str, text: &str) -> io::Result<()> {
    if text.is_empty() {
        writeln!(out, "{name}: <EMPTY>")
    } else {
        writeln!(out, "{name}:")?;
        writeln!(out, "{FRAME_LINE}")?;
        writeln!(out, "{}", text.trim_end_matches('\n'))?;
        writeln!(out, "{FRAME_LINE}")
    }
}
