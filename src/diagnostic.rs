use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A renderable report. Errors in this language are line-granular, so the
/// diagnostic points at a whole source line rather than a byte span.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<String>,
    pub message: String,
    pub line: Option<usize>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            line: None,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            line: None,
            notes: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.notes.push(format!("help: {}", help.into()));
        self
    }
}

fn source_line(source: &str, line_num: usize) -> Option<&str> {
    source.lines().nth(line_num.saturating_sub(1))
}

pub struct DiagnosticRenderer<'a> {
    source: &'a str,
    file_name: &'a str,
    use_color: bool,
}

impl<'a> DiagnosticRenderer<'a> {
    pub fn new(source: &'a str, file_name: &'a str, use_color: bool) -> Self {
        Self {
            source,
            file_name,
            use_color,
        }
    }

    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();

        let severity_str = match diagnostic.severity {
            Severity::Error => self.style_red_bold("error"),
            Severity::Warning => self.style_yellow_bold("warning"),
            Severity::Info => self.style_blue("info"),
        };
        if let Some(code) = &diagnostic.code {
            output.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code,
                self.style_bold(&diagnostic.message)
            ));
        } else {
            output.push_str(&format!(
                "{}: {}\n",
                severity_str,
                self.style_bold(&diagnostic.message)
            ));
        }

        if let Some(line_num) = diagnostic.line {
            output.push_str(&format!(
                "  {} {}:{}\n",
                self.style_blue("-->"),
                self.file_name,
                line_num
            ));

            if let Some(content) = source_line(self.source, line_num) {
                let width = line_num.to_string().len();
                output.push_str(&format!("{} {}\n", " ".repeat(width + 1), self.style_blue("|")));
                output.push_str(&format!(
                    "{:>width$} {} {}\n",
                    self.style_blue(&line_num.to_string()),
                    self.style_blue("|"),
                    content,
                    width = width + 1
                ));
                let trimmed_len = content.trim_end().len().max(1);
                let leading = content.len() - content.trim_start().len();
                let carets = "^".repeat(trimmed_len.saturating_sub(leading).max(1));
                output.push_str(&format!(
                    "{} {} {}{}\n",
                    " ".repeat(width + 1),
                    self.style_blue("|"),
                    " ".repeat(leading),
                    self.style_red(&carets)
                ));
            }
        }

        for note in &diagnostic.notes {
            let prefix = if note.starts_with("help:") {
                self.style_cyan("=")
            } else {
                self.style_blue("=")
            };
            output.push_str(&format!("  {} {}\n", prefix, note));
        }

        output
    }

    fn style_red(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[31m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_red_bold(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[1;31m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_yellow_bold(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[1;33m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_blue(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[34m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_cyan(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[36m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }

    fn style_bold(&self, s: &str) -> String {
        if self.use_color {
            format!("\x1b[1m{}\x1b[0m", s)
        } else {
            s.to_string()
        }
    }
}

pub fn render_diagnostics(
    source: &str,
    file_name: &str,
    diagnostics: &[Diagnostic],
    use_color: bool,
) -> String {
    let renderer = DiagnosticRenderer::new(source, file_name, use_color);
    let mut output = String::new();

    for diagnostic in diagnostics {
        output.push_str(&renderer.render(diagnostic));
        output.push('\n');
    }

    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if error_count > 0 {
        output.push_str(&format!(
            "error: aborting due to {} error{}\n",
            error_count,
            if error_count == 1 { "" } else { "s" }
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_line_lookup() {
        let source = "Declare Integer x\nSet x = 1\nDisplay x";
        assert_eq!(source_line(source, 1), Some("Declare Integer x"));
        assert_eq!(source_line(source, 3), Some("Display x"));
        assert_eq!(source_line(source, 4), None);
    }

    #[test]
    fn test_render_with_line() {
        let source = "Set x = 1 / 0\n";
        let diagnostic = Diagnostic::error("Division by zero")
            .with_code("E0204")
            .with_line(1);
        let renderer = DiagnosticRenderer::new(source, "program", false);
        let output = renderer.render(&diagnostic);

        assert!(output.contains("error[E0204]"));
        assert!(output.contains("Division by zero"));
        assert!(output.contains("program:1"));
        assert!(output.contains("Set x = 1 / 0"));
    }

    #[test]
    fn test_render_without_line() {
        let diagnostic = Diagnostic::error("Program stopped by user");
        let renderer = DiagnosticRenderer::new("", "program", false);
        let output = renderer.render(&diagnostic);
        assert!(output.starts_with("error: Program stopped by user"));
    }
}
