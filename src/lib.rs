//! Diagnostic and process-control helpers for a compiler's command-line
//! test harness.
//!
//! Three leaf utilities, each independent, synchronous and blocking:
//!
//! - [`runner`] wraps an external command, capturing its output and turning
//!   a non-zero exit into a verbose failure report.
//! - [`terminate`] stops a process by pid, SIGTERM first, SIGKILL only if
//!   the process lingers.
//! - [`trace`] renders a best-effort stack trace, re-reading source lines
//!   from disk.
//!
//! Everything environment-dependent lives in [`config::Context`], captured
//! once at startup and passed by reference.

pub mod config;
pub mod output;
pub mod runner;
pub mod terminate;
pub mod trace;
