//! Used to color and otherwise style bits of output. Styling is off until init enables
//! it so tests and pipes get plain text.
use crate::cli::ColorWhen;
use nu_ansi_term::{Color, Style};
use std::io::IsTerminal;
use std::sync::OnceLock;

static ENABLED: OnceLock<bool> = OnceLock::new();

/// Decide once whether to emit escape sequences.
pub fn init(when: ColorWhen) {
    let enabled = match when {
        ColorWhen::Always => true,
        ColorWhen::Never => false,
        ColorWhen::Auto => {
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
        }
    };
    let _ = ENABLED.set(enabled);
}

pub fn enabled() -> bool {
    ENABLED.get().copied().unwrap_or(false)
}

fn paint(style: Style, text: &str) -> String {
    if enabled() {
        style.paint(text).to_string()
    } else {
        text.to_string()
    }
}

pub trait Styling {
    fn explain_title(self) -> String;
    fn explain_text(self) -> String;
    fn table_header(self) -> String;
    fn table_sep(self) -> String;
    fn warn(self) -> String;
}

impl Styling for &str {
    fn explain_title(self) -> String {
        paint(Style::new().bold(), self)
    }

    fn explain_text(self) -> String {
        paint(Style::new().italic(), self)
    }

    fn table_header(self) -> String {
        paint(Color::Blue.bold(), self)
    }

    fn table_sep(self) -> String {
        paint(Style::new().dimmed(), self)
    }

    fn warn(self) -> String {
        paint(Color::Red.bold(), self)
    }
}

impl Styling for String {
    fn explain_title(self) -> String {
        self.as_str().explain_title()
    }

    fn explain_text(self) -> String {
        self.as_str().explain_text()
    }

    fn table_header(self) -> String {
        self.as_str().table_header()
    }

    fn table_sep(self) -> String {
        self.as_str().table_sep()
    }

    fn warn(self) -> String {
        self.as_str().warn()
    }
}
