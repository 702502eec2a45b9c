//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{
    should_use_colors, MedicTheme, OutputMode, ProgressSpinner, SpinnerHandle, UserInterface,
};
use crate::shell::is_ci;

/// Terminal UI writing reports to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: MedicTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI; colors follow the terminal and `NO_COLOR`.
    pub fn new(mode: OutputMode) -> Self {
        Self::with_colors(mode, should_use_colors())
    }

    /// Create a terminal UI with colors forced on or off.
    pub fn with_colors(mode: OutputMode, colors: bool) -> Self {
        let theme = if colors {
            MedicTheme::new()
        } else {
            MedicTheme::plain()
        };
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn detail(&mut self, msg: &str) {
        if self.mode.shows_details() {
            writeln!(self.out, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn hint(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_hint(msg)).ok();
        }
    }

    fn data(&mut self, text: &str) {
        writeln!(self.out, "{}", text).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_details() {
            writeln!(self.out, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && self.is_interactive() && !is_ci() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn is_interactive(&self) -> bool {
        self.err.is_term()
    }
}

/// Create the UI for a CLI run.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    if no_color {
        Box::new(TerminalUI::with_colors(mode, false))
    } else {
        Box::new(TerminalUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(OutputMode::Silent, true);
        assert_eq!(ui.output_mode(), OutputMode::Silent);
    }
}
