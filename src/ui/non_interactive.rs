//! Non-interactive UI for CI/headless environments.

use super::{OutputMode, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Plain lines only: no spinners, no colors, no cursor movement. Spinner
/// starts are printed once so logs still show what was running.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            println!("  {}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            println!("  ✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("  ⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("  ✗ {}", msg);
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_command_output() {
            println!("  … {}", message);
        }
        Box::new(NoopSpinner { mode: self.mode })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn show_stage(&mut self, current: usize, total: usize, name: &str) {
        if self.mode.shows_status() {
            println!("[{}/{}] {}", current, total, name);
        }
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_command_output() {
            println!("  ({}/{})", current, total);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            println!("    fix: {}", hint);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that does nothing (for non-interactive mode).
struct NoopSpinner {
    mode: OutputMode,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            println!("  ✓ {}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  ✗ {}", msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        if self.mode.shows_detail() {
            println!("  ○ {}", msg);
        }
    }

    fn finish_and_clear(&mut self) {}
}
