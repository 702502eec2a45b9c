//! Mock UI implementation for testing.
//!
//! `MockUI` implements [`UserInterface`] and captures every interaction for
//! later assertion.
//!
//! # Example
//!
//! ```
//! use medic::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.warning("libbar is not installed");
//! ui.success("1 package installed");
//!
//! assert!(ui.has_warning("libbar"));
//! assert!(ui.successes().contains(&"1 package installed".to_string()));
//! ```

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI capturing all output.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    details: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    hints: Vec<String>,
    data: Vec<String>,
    headers: Vec<String>,
    spinners: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Machine-readable output (JSON documents).
    pub fn data_lines(&self) -> &[String] {
        &self.data
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Messages of all spinners that were started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_detail(&self, msg: &str) -> bool {
        self.details.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn detail(&mut self, msg: &str) {
        self.details.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn hint(&mut self, msg: &str) {
        self.hints.push(msg.to_string());
    }

    fn data(&mut self, text: &str) {
        self.data.push(text.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that does nothing.
#[derive(Debug, Default)]
pub struct MockSpinner;

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}
    fn finish_success(&mut self, _msg: &str) {}
    fn finish_error(&mut self, _msg: &str) {}
    fn finish_clear(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_by_kind() {
        let mut ui = MockUI::new();
        ui.message("scanning");
        ui.detail("Module: 'sale'");
        ui.error("install failed");
        ui.hint("- Hint: check PostgreSQL");
        ui.data("{}");

        assert!(ui.has_message("scanning"));
        assert!(ui.has_detail("sale"));
        assert!(ui.has_error("failed"));
        assert!(ui.has_hint("PostgreSQL"));
        assert_eq!(ui.data_lines(), &["{}".to_string()]);
    }

    #[test]
    fn records_spinners() {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        let mut spinner = ui.start_spinner("Installing libfoo");
        spinner.finish_success("done");
        assert_eq!(ui.spinners(), &["Installing libfoo".to_string()]);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
