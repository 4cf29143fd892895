use std::fmt;

use crate::{
    lexer,
    token::{Span, Spanned},
    type_checker,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// The stage a diagnostic comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Checker,
}

impl Stage {
    /// The `log` target diagnostics of this stage are sent to.
    pub const fn target(self) -> &'static str {
        match self {
            Stage::Lexer => "humanscript::lexer",
            Stage::Checker => "humanscript::checker",
        }
    }
}

/// A non-fatal, human-readable event. Not a stable format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn from_lexer(error: &Spanned<lexer::Error>) -> Diagnostic {
        let severity = if error.inner.is_warning() {
            Severity::Warning
        } else {
            Severity::Error
        };
        Diagnostic {
            severity,
            stage: Stage::Lexer,
            span: error.span,
            message: error.inner.to_string(),
        }
    }

    pub fn from_note(note: &Spanned<type_checker::Note>) -> Diagnostic {
        Diagnostic {
            severity: Severity::Info,
            stage: Stage::Checker,
            span: note.span,
            message: note.inner.to_string(),
        }
    }

    /// Forwards the diagnostic to the `log` facade, located in `src`.
    pub fn log(&self, src: &str) {
        let (line, column) = self.span.location(src);
        log::log!(
            target: self.stage.target(),
            self.severity.level(),
            "{line}:{column}: {}",
            self.message
        );
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_lexer_error_kind() {
        let span = Span::new_of_length(0, 1);
        let overflow = Diagnostic::from_lexer(&span.wrap(lexer::Error::IntOverflow));
        let unclosed = Diagnostic::from_lexer(&span.wrap(lexer::Error::UnclosedString));

        assert_eq!(overflow.severity, Severity::Warning);
        assert_eq!(unclosed.severity, Severity::Error);
        assert_eq!(unclosed.to_string(), "error: unclosed string");
        assert!(Severity::Info < Severity::Warning);
    }

    #[test]
    fn notes_are_informational() {
        let note = Span::new_of_length(0, 1).wrap(type_checker::Note::If);
        let diagnostic = Diagnostic::from_note(&note);
        assert_eq!(diagnostic.severity, Severity::Info);
        assert_eq!(diagnostic.stage.target(), "humanscript::checker");
        assert_eq!(diagnostic.to_string(), "info: processed if statement");
    }
}
