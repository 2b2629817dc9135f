//! Visual theme and styling.

use console::Style;

/// Pitch's visual theme.
#[derive(Debug, Clone)]
pub struct PitchTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for stage counters (dim).
    pub stage_number: Style,
    /// Style for remediation hints (cyan dim).
    pub hint: Style,
}

impl Default for PitchTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PitchTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            stage_number: Style::new().dim(),
            hint: Style::new().cyan().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            stage_number: Style::new(),
            hint: Style::new(),
        }
    }

    /// Pick colored or plain based on the environment.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a skipped message (icon + text in dim).
    pub fn format_skipped(&self, msg: &str) -> String {
        format!("{}", self.dim.apply_to(format!("○ {}", msg)))
    }

    /// Format a stage line.
    pub fn format_stage(&self, current: usize, total: usize, name: &str) -> String {
        format!(
            "{} {}",
            self.stage_number.apply_to(format!("[{}/{}]", current, total)),
            self.highlight.apply_to(name)
        )
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("▲"), self.highlight.apply_to(title))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_success() {
        let theme = PitchTheme::plain();
        let msg = theme.format_success("Complete");
        assert!(msg.contains("✓"));
        assert!(msg.contains("Complete"));
    }

    #[test]
    fn theme_formats_warning() {
        let theme = PitchTheme::plain();
        let msg = theme.format_warning("Caution");
        assert!(msg.contains("⚠"));
        assert!(msg.contains("Caution"));
    }

    #[test]
    fn theme_formats_error() {
        let theme = PitchTheme::plain();
        let msg = theme.format_error("Failed");
        assert!(msg.contains("✗"));
        assert!(msg.contains("Failed"));
    }

    #[test]
    fn theme_formats_skipped() {
        let theme = PitchTheme::plain();
        let msg = theme.format_skipped("Skipped");
        assert!(msg.contains("○"));
    }

    #[test]
    fn theme_formats_stage() {
        let theme = PitchTheme::plain();
        assert_eq!(theme.format_stage(2, 4, "Environment"), "[2/4] Environment");
    }

    #[test]
    fn theme_formats_header() {
        let theme = PitchTheme::plain();
        let msg = theme.format_header("UFO");
        assert!(msg.contains("UFO"));
    }

    #[test]
    fn default_impl_matches_new() {
        let default = PitchTheme::default();
        let new = PitchTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
