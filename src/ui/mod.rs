//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use pitch::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("UFO");
//! ui.success("Environment ready");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI, SpinnerStatus};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, PitchTheme};

use crate::report::{Status, ValidationResult};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Announce a pipeline stage (e.g., "[2/4] Environment").
    fn show_stage(&mut self, current: usize, total: usize, name: &str);

    /// Show progress within a stage (e.g., "3 of 7").
    fn show_progress(&mut self, current: usize, total: usize);

    /// Show a remediation hint.
    fn show_hint(&mut self, hint: &str);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;

    /// Show one validation result, with its hint when it is not ok.
    fn show_result(&mut self, result: &ValidationResult) {
        let line = result.summary_line();
        match result.status {
            Status::Ok => self.success(&line),
            Status::Skipped => self.message(&line),
            Status::Warning => self.warning(&line),
            Status::Missing | Status::VersionMismatch | Status::Error => {
                if result.degrades {
                    self.error(&line)
                } else {
                    self.warning(&line)
                }
            }
        }
        if !result.is_ok() {
            if let Some(hint) = &result.remediation {
                self.show_hint(hint);
            }
        }
    }
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);

    /// Remove the spinner without leaving a line behind.
    fn finish_and_clear(&mut self);
}
