//! Terminal formatting and the hard-failure path.

use crate::config::Context;
use crate::trace::{self, BacktraceInspector};

pub const RED: &str = "\x1b[1;31m";
pub const RESET: &str = "\x1b[0m";

/// Wrap `text` in an ANSI escape unless plain output was requested.
pub fn paint(ctx: &Context, code: &str, text: &str) -> String {
    if ctx.plain_output {
        text.to_string()
    } else {
        format!("{code}{text}{RESET}")
    }
}

/// Print a tool-level error, `[cmdwrap]`-prefixed, to stderr.
pub fn tool_error(err: &anyhow::Error) {
    eprintln!("[cmdwrap] error: {err:#}");
}

/// Report a bug in the harness itself and abort with exit code 2.
///
/// This is the unconditional tier of the error contract: usage errors and
/// violated preconditions land here instead of being handed back to the
/// caller. Exit code 2 separates them from failures of the command under
/// test, which exit 1.
pub fn assertion_failure(ctx: &Context, msg: &str) -> ! {
    eprintln!();
    eprintln!("{}", paint(ctx, RED, &format!("Assertion failed: {msg}")));
    let inspector = BacktraceInspector::capture(1);
    trace::print_stack_trace(ctx, &inspector);
    std::process::exit(2)
}
