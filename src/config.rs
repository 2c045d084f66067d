use std::path::PathBuf;

/// Immutable process-wide context, captured once at startup.
///
/// The stack-trace resolver needs the directory the process started in:
/// frame paths recorded at capture time are often relative to it, and the
/// harness may have changed directory by the time a failure is reported.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory at startup, for resolving relative frame paths.
    pub initial_dir: PathBuf,
    /// Display name of the binary under test (`CMDWRAP_TARGET`), if set.
    pub target_name: Option<String>,
    /// Disable ANSI escapes (`NO_COLOR`).
    pub plain_output: bool,
}

impl Context {
    /// Snapshot the environment. Call once near process start and thread
    /// the result through explicitly.
    pub fn from_env() -> Self {
        Self {
            initial_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            target_name: std::env::var("CMDWRAP_TARGET")
                .ok()
                .filter(|v| !v.is_empty()),
            plain_output: std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        }
    }
}
