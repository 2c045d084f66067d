//! Graceful-then-forceful process termination.

use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Liveness polls after SIGTERM before escalating.
const POLL_ATTEMPTS: u32 = 4;
/// Delay between liveness polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Terminate `pid`, preferring a graceful shutdown.
///
/// A pid that is already gone is a no-op, not an error. Otherwise SIGTERM
/// is sent, the process is polled once a second for up to four seconds, and
/// a single SIGKILL follows if it still has not exited. The contract is
/// "terminated or already gone"; the return value does not say which
/// signal did it. Progress lines go to stdout.
///
/// # Errors
///
/// Returns an error when a signal cannot be delivered for a reason other
/// than the process having already exited (e.g. insufficient permissions).
pub fn stop(pid: i32, name: Option<&str>) -> anyhow::Result<()> {
    let target = Pid::from_raw(pid);
    let label = name.map_or_else(|| pid.to_string(), ToString::to_string);

    if !alive(target) {
        return Ok(());
    }

    println!("Sending SIGTERM to {label} ({pid})...");
    match signal::kill(target, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => return Err(e).with_context(|| format!("failed to send SIGTERM to {pid}")),
    }

    for attempt in 1..=POLL_ATTEMPTS {
        println!("Waiting for {label} to exit ({attempt})...");
        thread::sleep(POLL_INTERVAL);
        if !alive(target) {
            return Ok(());
        }
    }

    println!("Sending SIGKILL to {label} ({pid})...");
    match signal::kill(target, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to send SIGKILL to {pid}")),
    }
}

/// Signal-0 liveness probe. EPERM still means the process exists, just not
/// as one of ours.
fn alive(pid: Pid) -> bool {
    matches!(signal::kill(pid, None), Ok(()) | Err(Errno::EPERM))
}
