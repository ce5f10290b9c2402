//! Single-line progress indicator on stderr

use std::io::{self, Write};

use is_terminal::IsTerminal;

/// Redraws `current/total` in place while alive; clears the line when dropped, so the
/// terminal is never left showing a stale "processing" line.
pub struct ProgressLine {
    interactive: bool,
    drawn: bool,
}

impl ProgressLine {
    pub fn new(total: usize) -> Self {
        log::debug!("Progress line for {} identifiers", total);
        Self {
            interactive: io::stderr().is_terminal(),
            drawn: false,
        }
    }

    pub fn update(&mut self, current: usize, total: usize) {
        if !self.interactive {
            log::info!("Processed {}/{}", current, total);
            return;
        }

        let percent = if total == 0 {
            100
        } else {
            current * 100 / total
        };
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\rProcessing: {}/{} ({}%)", current, total, percent);
        let _ = stderr.flush();
        self.drawn = true;
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if self.drawn {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
        }
    }
}
