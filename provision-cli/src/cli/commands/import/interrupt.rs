//! Ctrl-C handling during a run

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

/// Exit code after a forced quit (128 + SIGINT)
pub const FORCE_QUIT_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The signal handler could not be installed
    Unavailable,
    /// Cancellation was requested once
    Cancelled,
    /// A second interrupt arrived while the run was still winding down
    ForceQuit,
}

/// Set `cancel_flag` on the first interrupt, report a forced quit on the second
pub async fn watch_interrupts<F, Fut>(
    mut next_signal: F,
    cancel_flag: Arc<AtomicBool>,
) -> Interrupt
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(e) = next_signal().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        return Interrupt::Unavailable;
    }

    cancel_flag.store(true, Ordering::Relaxed);
    eprintln!("\nCancelling after the current identifier... (press Ctrl-C again to quit now)");

    match next_signal().await {
        Ok(()) => Interrupt::ForceQuit,
        Err(_) => Interrupt::Cancelled,
    }
}
