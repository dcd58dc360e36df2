use crossterm::style::{Color, Stylize};

/// Color theme for tables
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub const HEADER: Color = Color::Blue;
    pub const FIRST_COLUMN: Color = Color::DarkBlue;

    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// No escape sequences at all
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn header(&self, text: &str) -> String {
        if self.color {
            text.with(Self::HEADER).underlined().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn first_column(&self, text: &str) -> String {
        if self.color {
            text.with(Self::FIRST_COLUMN).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_leaves_text_alone() {
        let theme = Theme::plain();
        assert_eq!(theme.header("resource"), "resource");
        assert_eq!(theme.first_column("aws_instance.a"), "aws_instance.a");
    }

    #[test]
    fn test_colored_theme_wraps_text() {
        let theme = Theme::new(true);
        assert!(theme.header("resource").contains("resource"));
        assert!(theme.first_column("web").contains("web"));
    }
}
