//! Color theme for resolved-method output.

use crate::types::Visibility;
use console::Style;
use owo_colors::OwoColorize;
use std::sync::LazyLock;

/// Global theme instance for consistent styling across the application.
pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub error: Style,
    /// Qualified method names and section titles
    pub header: Style,
    /// Secondary text such as counts and field labels
    pub dim: Style,
    /// Owner and method names in listings
    pub code: Style,
    pub public: Style,
    pub protected: Style,
    pub private: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            error: Style::new().red().bright(),
            header: Style::new().cyan().bold(),
            dim: Style::new().dim(),
            code: Style::new().yellow(),
            public: Style::new().green(),
            protected: Style::new().yellow(),
            private: Style::new().red(),
        }
    }
}

impl Theme {
    /// Format a success message with checkmark.
    pub fn success_with_icon(&self, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("✓ {text}")
        } else {
            format!("{} {}", "✓".green(), self.success.apply_to(text))
        }
    }

    /// Format an error message with X mark.
    pub fn error_with_icon(&self, text: &str) -> String {
        if Self::should_disable_colors() {
            format!("✗ {text}")
        } else {
            format!("{} {}", "✗".red(), self.error.apply_to(text))
        }
    }

    /// Visibility keyword colored by how reachable the method is.
    pub fn visibility(&self, visibility: Visibility) -> String {
        let style = match visibility {
            Visibility::Public => &self.public,
            Visibility::Protected => &self.protected,
            Visibility::Private => &self.private,
        };
        self.apply(style, visibility)
    }

    /// Check if color output should be disabled.
    pub fn should_disable_colors() -> bool {
        use is_terminal::IsTerminal;
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    /// Apply theme styling conditionally based on terminal support.
    pub fn apply<T: std::fmt::Display>(&self, style: &Style, text: T) -> String {
        if Self::should_disable_colors() {
            text.to_string()
        } else {
            style.apply_to(text).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styling_keeps_text() {
        let theme = Theme::default();
        assert!(theme.visibility(Visibility::Private).contains("private"));
        assert!(theme.success_with_icon("done").contains("done"));
        assert!(theme.apply(&theme.header, "Array#map").contains("Array#map"));
    }
}
