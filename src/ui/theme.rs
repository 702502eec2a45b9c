//! Visual theme and styling.

use console::Style;

/// Medic's visual theme.
#[derive(Debug, Clone)]
pub struct MedicTheme {
    /// Satisfied requirements, successful installs (green).
    pub success: Style,
    /// Unmet requirements, skipped roots (orange).
    pub warning: Style,
    /// Check failures and install failures (red bold).
    pub error: Style,
    /// Headers (cyan bold).
    pub header: Style,
    /// Secondary text.
    pub dim: Style,
    /// Diagnostic hints (cyan).
    pub hint: Style,
    /// Highlighted text (bold).
    pub highlight: Style,
}

impl Default for MedicTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicTheme {
    /// Create the colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            header: Style::new().cyan().bold(),
            dim: Style::new().dim(),
            hint: Style::new().cyan(),
            highlight: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            header: Style::new(),
            dim: Style::new(),
            hint: Style::new(),
            highlight: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_hint(&self, msg: &str) -> String {
        format!("{}", self.hint.apply_to(msg))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!(
            "{} {}",
            self.header.apply_to("✚"),
            self.highlight.apply_to(title)
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    console::Term::stdout().is_term()
}
