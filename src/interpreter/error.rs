use crate::diagnostic::Diagnostic;

/// Every failure the toolchain can surface. All variants except `Stopped`
/// carry the source line of the offending token or statement.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpreterError {
    Syntax { message: String, line: usize },
    Semantic { message: String, line: usize },
    Type { message: String, line: usize },
    Range { message: String, line: usize },
    DivisionByZero { line: usize },
    MissingReturn { name: String, line: usize },
    Stopped,
}

impl InterpreterError {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::Syntax { message: message.into(), line }
    }

    pub fn semantic(message: impl Into<String>, line: usize) -> Self {
        Self::Semantic { message: message.into(), line }
    }

    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        Self::Type { message: message.into(), line }
    }

    pub fn range(message: impl Into<String>, line: usize) -> Self {
        Self::Range { message: message.into(), line }
    }

    pub fn division_by_zero(line: usize) -> Self {
        Self::DivisionByZero { line }
    }

    pub fn missing_return(name: impl Into<String>, line: usize) -> Self {
        Self::MissingReturn { name: name.into(), line }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::Semantic { line, .. }
            | Self::Type { line, .. }
            | Self::Range { line, .. }
            | Self::DivisionByZero { line }
            | Self::MissingReturn { line, .. } => Some(*line),
            Self::Stopped => None,
        }
    }

    /// One-line report in the form the driver prints.
    pub fn report(&self) -> String {
        match self.line() {
            Some(line) => format!("Error on line {}: {}", line, self),
            None => "Program stopped by user.".to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Syntax { message, line } => Diagnostic::error(message.clone())
                .with_code("E0101")
                .with_line(*line),
            Self::Semantic { message, line } => Diagnostic::error(message.clone())
                .with_code("E0201")
                .with_line(*line),
            Self::Type { message, line } => Diagnostic::error(message.clone())
                .with_code("E0202")
                .with_line(*line),
            Self::Range { message, line } => Diagnostic::error(message.clone())
                .with_code("E0203")
                .with_line(*line),
            Self::DivisionByZero { line } => Diagnostic::error("Division by zero")
                .with_code("E0204")
                .with_line(*line),
            Self::MissingReturn { name, line } => Diagnostic::error(format!(
                "Function '{}' ended without a Return statement",
                name
            ))
            .with_code("E0205")
            .with_line(*line)
            .with_help(format!("add `Return <expression>` before `End Function` in '{}'", name)),
            Self::Stopped => Diagnostic::error("Program stopped by user"),
        }
    }
}

impl std::fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax { message, .. }
            | Self::Semantic { message, .. }
            | Self::Type { message, .. }
            | Self::Range { message, .. } => write!(f, "{}", message),
            Self::DivisionByZero { .. } => write!(f, "Division by zero"),
            Self::MissingReturn { name, .. } => {
                write!(f, "Function '{}' ended without a Return statement", name)
            }
            Self::Stopped => write!(f, "Program stopped by user"),
        }
    }
}

impl std::error::Error for InterpreterError {}
