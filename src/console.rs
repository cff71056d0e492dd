//! Console output formatting with ANSI color support.
//!
//! Provides styled terminal output with automatic TTY detection
//! and respect for the NO_COLOR environment variable.

use crate::sources::{Chapter, Manga, Page};
use chrono::DateTime;
use std::io::{self, IsTerminal};

/// ANSI style codes for terminal formatting.
#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    /// Returns the ANSI escape code for this style.
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Console output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Creates a new Console instance, detecting color support.
    ///
    /// Colors are disabled if:
    /// - The `NO_COLOR` environment variable is set
    /// - stdout is not a terminal (TTY)
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();

        Self { colors_enabled }
    }

    /// Creates a Console with colors explicitly enabled or disabled.
    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        let styled = self.style(label, &[color, Style::Bold]);
        format!("[{}]", styled)
    }

    /// Prints an info message with blue `[INFO]` label.
    pub fn info(&self, message: &str) {
        println!("{} {}", self.label("INFO", Style::Blue), message);
    }

    /// Prints a success message with green `[OK]` label.
    pub fn success(&self, message: &str) {
        println!("{} {}", self.label("OK", Style::Green), message);
    }

    /// Prints a warning message with yellow `[WARN]` label.
    pub fn warning(&self, message: &str) {
        println!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    /// Prints an error message with red `[ERROR]` label.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    /// Prints a step message with cyan `[STEP]` label.
    pub fn step(&self, message: &str) {
        println!("{} {}", self.label("STEP", Style::Cyan), message);
    }

    /// Prints a section header in magenta bold.
    pub fn section(&self, message: &str) {
        println!();
        println!("{}", self.style(message, &[Style::Magenta, Style::Bold]));
    }

    /// Returns text styled as muted (dim gray).
    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    /// Formats a count with styling.
    pub fn count(&self, n: usize) -> String {
        self.style(&n.to_string(), &[Style::Green, Style::Bold])
    }

    /// Formats a browse entry as `identifier  title`.
    pub fn manga_line(&self, manga: &Manga) -> String {
        format!(
            "{}  {}",
            self.style(&manga.url, &[Style::Cyan]),
            self.style(&manga.title, &[Style::Bold])
        )
    }

    /// Formats a labelled detail field; absent values print as `-`.
    pub fn field(&self, label: &str, value: Option<&str>) -> String {
        let label = format!("{:>12}", label);
        format!(
            "{}: {}",
            self.style(&label, &[Style::Bold]),
            value.unwrap_or("-")
        )
    }

    /// Formats a chapter as `number  name  (date)`.
    pub fn chapter_line(&self, chapter: &Chapter) -> String {
        let number = if chapter.chapter_number < 0.0 {
            "?".to_string()
        } else {
            chapter.chapter_number.to_string()
        };

        format!(
            "{}  {}  {}",
            self.style(&format!("{:>7}", number), &[Style::Yellow, Style::Bold]),
            chapter.name,
            self.muted(&format!("({})", format_upload_date(chapter.date_upload)))
        )
    }

    /// Formats a page as `index  image URL`.
    pub fn page_line(&self, page: &Page) -> String {
        let target = page.image_url.as_deref().unwrap_or(&page.url);
        format!(
            "{}  {}",
            self.style(&format!("{:>4}", page.index), &[Style::Cyan]),
            target
        )
    }
}

/// Renders an epoch-millisecond upload time as a UTC date.
pub fn format_upload_date(millis: i64) -> String {
    if millis == 0 {
        return "unknown date".to_string();
    }

    DateTime::from_timestamp_millis(millis)
        .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}
