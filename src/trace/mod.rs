//! Best-effort stack traces for failure diagnostics.
//!
//! Frame data comes from a [`CallStackInspector`]; the default
//! implementation walks the current thread's backtrace. Each frame's source
//! line is re-read from disk, which can only ever be a heuristic: the
//! recorded path may be relative to a directory the process has since left.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Context;

/// Printed in place of a source line that could not be read back.
pub const UNRESOLVED_LINE: &str = "<source line unavailable>";

/// One call-stack frame, as far as it could be symbolicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    pub depth: usize,
    pub file: PathBuf,
    pub line: u32,
    pub function: String,
}

/// Call-stack introspection capability.
///
/// The contract is a walk by increasing depth: callers query depth 0, 1, 2…
/// until `None` signals the end of the stack.
pub trait CallStackInspector {
    /// Describe the frame at `depth`, or `None` once the stack is exhausted.
    fn frame_at(&self, depth: usize) -> Option<CallFrame>;
}

/// Inspector backed by the `backtrace` crate.
pub struct BacktraceInspector {
    frames: Vec<CallFrame>,
}

impl BacktraceInspector {
    /// Capture the stack of the calling thread.
    ///
    /// Frames missing file, line or symbol information are dropped, as are
    /// the capture machinery's own frames; `skip_callers` further frames are
    /// discarded so the walk starts above the error-reporting wrapper that
    /// asked for the trace.
    pub fn capture(skip_callers: usize) -> Self {
        let bt = backtrace::Backtrace::new();
        let mut frames: Vec<CallFrame> = Vec::new();
        for frame in bt.frames() {
            for symbol in frame.symbols() {
                let (Some(file), Some(line), Some(name)) =
                    (symbol.filename(), symbol.lineno(), symbol.name())
                else {
                    continue;
                };
                frames.push(CallFrame {
                    depth: 0,
                    file: file.to_path_buf(),
                    line,
                    function: strip_symbol_hash(&name.to_string()),
                });
            }
        }

        // Frames up to and including our own capture call are machinery.
        // When the compiler has inlined them away, the walk already starts
        // at the caller and only `skip_callers` applies.
        let own = frames
            .iter()
            .rposition(|f| f.function.ends_with("BacktraceInspector::capture"));
        let start = own
            .map_or(0, |i| i + 1)
            .saturating_add(skip_callers)
            .min(frames.len());
        let mut frames = frames.split_off(start);
        for (depth, frame) in frames.iter_mut().enumerate() {
            frame.depth = depth;
        }
        Self { frames }
    }
}

impl CallStackInspector for BacktraceInspector {
    fn frame_at(&self, depth: usize) -> Option<CallFrame> {
        self.frames.get(depth).cloned()
    }
}

/// Drop the trailing `::h0123abcd` disambiguator rustc appends to symbols.
fn strip_symbol_hash(symbol: &str) -> String {
    match symbol.rfind("::h") {
        Some(pos) if symbol[pos + 3..].chars().all(|c| c.is_ascii_hexdigit()) => {
            symbol[..pos].to_string()
        }
        _ => symbol.to_string(),
    }
}

/// Outcome of trying to read a frame's source line back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLine {
    Resolved(String),
    Unresolved,
}

/// Three-branch lookup: the path as recorded, then the same path joined to
/// the directory the process started in, then give up.
pub fn resolve_source_line(file: &Path, line: u32, initial_dir: &Path) -> SourceLine {
    if let Some(text) = read_line_at(file, line) {
        return SourceLine::Resolved(text);
    }
    if file.is_relative()
        && let Some(text) = read_line_at(&initial_dir.join(file), line)
    {
        return SourceLine::Resolved(text);
    }
    SourceLine::Unresolved
}

fn read_line_at(path: &Path, line: u32) -> Option<String> {
    let idx = usize::try_from(line).ok()?.checked_sub(1)?;
    let content = std::fs::read_to_string(path).ok()?;
    content.lines().nth(idx).map(|l| l.trim().to_string())
}

/// Render the whole stack, one two-line entry per frame: the location
/// header, then the indented source text (or the placeholder).
///
/// # Errors
///
/// Returns an error only when the writer itself fails.
pub fn write_stack_trace(
    out: &mut impl Write,
    ctx: &Context,
    inspector: &dyn CallStackInspector,
) -> std::io::Result<()> {
    let mut depth = 0;
    while let Some(frame) = inspector.frame_at(depth) {
        writeln!(
            out,
            "{}:{} in {}()",
            frame.file.display(),
            frame.line,
            frame.function
        )?;
        match resolve_source_line(&frame.file, frame.line, &ctx.initial_dir) {
            SourceLine::Resolved(text) => writeln!(out, "    {text}")?,
            SourceLine::Unresolved => writeln!(out, "    {UNRESOLVED_LINE}")?,
        }
        depth += 1;
    }
    Ok(())
}

/// [`write_stack_trace`] to stderr, ignoring write failures.
pub fn print_stack_trace(ctx: &Context, inspector: &dyn CallStackInspector) {
    let _ = write_stack_trace(&mut std::io::stderr().lock(), ctx, inspector);
}
