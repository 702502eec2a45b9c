//! User interface components.
//!
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal output
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use medic::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(OutputMode::Quiet, true);
//! ui.success("All discovered dependencies are satisfied.");
//! ```

pub mod mock;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, MedicTheme};

/// Trait for user-facing output.
///
/// Commands write through this trait so tests can capture output with
/// [`MockUI`].
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// A status line.
    fn message(&mut self, msg: &str);

    /// A report line shown only in normal and verbose modes.
    fn detail(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// An error; shown in every mode.
    fn error(&mut self, msg: &str);

    /// A diagnostic hint.
    fn hint(&mut self, msg: &str);

    /// Machine-readable output; shown in every mode.
    fn data(&mut self, text: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Whether a user is watching a terminal.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    /// Stop with a success line.
    fn finish_success(&mut self, msg: &str);

    /// Stop with an error line.
    fn finish_error(&mut self, msg: &str);

    /// Stop and erase the spinner.
    fn finish_clear(&mut self);
}
