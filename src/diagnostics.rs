use crate::signature::SignatureConflict;
use miette::{NamedSource, Report, SourceSpan};
use serde::Deserialize;
use std::{fmt, fs, path::PathBuf};
use thiserror::Error;

pub const CODE_UNKNOWN_MESSAGE: &str = "fosa.unknownMessage";
pub const CODE_ARITY_MISMATCH: &str = "fosa.arityMismatch";
pub const CODE_ARGUMENT_TYPE_MISMATCH: &str = "fosa.argumentTypeMismatch";
pub const CODE_UNRESOLVABLE_MESSAGE_NAME: &str = "fosa.unresolvableMessageName";
pub const CODE_SIGNATURE_CONFLICT: &str = "fosa.signatureConflict";
pub const CODE_MALFORMED_DECLARATION: &str = "fosa.malformedDeclaration";

/// Where in the compiled source a declaration or call sits. Lines and
/// columns are 1-based; zero means unknown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: PathBuf,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn is_known(&self) -> bool {
        !self.file.as_os_str().is_empty() && self.line > 0
    }

    /// Byte offset of this location in `source`, if it lies inside it.
    fn offset_in(&self, source: &str) -> Option<usize> {
        if self.line == 0 {
            return None;
        }
        let mut offset = 0;
        for (idx, line) in source.split_inclusive('\n').enumerate() {
            if idx + 1 == self.line as usize {
                let column = (self.column.max(1) as usize - 1).min(line.len());
                return Some(offset + column);
            }
            offset += line.len();
        }
        None
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return f.write_str("<unknown>");
        }
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnknownMessage,
    ArityMismatch { expected: usize, got: usize },
    ArgumentTypeMismatch {
        ordinal: usize,
        expected: String,
        got: String,
    },
    UnresolvableMessageName,
    SignatureConflict(SignatureConflict),
    MalformedDeclaration { reason: String },
}

impl DiagnosticKind {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnknownMessage => CODE_UNKNOWN_MESSAGE,
            DiagnosticKind::ArityMismatch { .. } => CODE_ARITY_MISMATCH,
            DiagnosticKind::ArgumentTypeMismatch { .. } => CODE_ARGUMENT_TYPE_MISMATCH,
            DiagnosticKind::UnresolvableMessageName => CODE_UNRESOLVABLE_MESSAGE_NAME,
            DiagnosticKind::SignatureConflict(_) => CODE_SIGNATURE_CONFLICT,
            DiagnosticKind::MalformedDeclaration { .. } => CODE_MALFORMED_DECLARATION,
        }
    }
}

/// One user-visible problem with a declaration or a call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
    pub message_name: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, location: Location, message_name: Option<String>) -> Self {
        Self {
            kind,
            location,
            message_name,
        }
    }

    pub fn message(&self) -> String {
        let name = self.message_name.as_deref().unwrap_or("?");
        match &self.kind {
            DiagnosticKind::UnknownMessage => format!("Unknown output message: {name}"),
            DiagnosticKind::ArityMismatch { expected, got } => format!(
                "Expected {expected} argument(s) to message `{name}`, but got {got}"
            ),
            DiagnosticKind::ArgumentTypeMismatch {
                ordinal,
                expected,
                got,
            } => format!("Expected `{expected}`, but got `{got}` in argument {ordinal}"),
            DiagnosticKind::UnresolvableMessageName => "Cannot figure out message name".into(),
            DiagnosticKind::SignatureConflict(conflict) => conflict.to_string(),
            DiagnosticKind::MalformedDeclaration { reason } => reason.clone(),
        }
    }

    pub fn details(&self) -> Option<String> {
        match &self.kind {
            DiagnosticKind::SignatureConflict(conflict) => Some(conflict.describe()),
            DiagnosticKind::ArgumentTypeMismatch { .. } => self
                .message_name
                .as_ref()
                .map(|name| format!("while checking message `{name}`")),
            _ => None,
        }
    }

    pub fn display_message(&self) -> String {
        format!("[{}] {}", self.kind.code(), self.message())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.display_message())?;
        if let Some(details) = self.details() {
            write!(f, "\n{details}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, miette::Diagnostic, Clone)]
#[error("{message}")]
pub struct SourceDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("{label}")]
    span: SourceSpan,
    message: String,
    label: String,
    #[help]
    help: Option<String>,
}

pub fn emit_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        let rendered = fs::read_to_string(&diag.location.file)
            .ok()
            .and_then(|contents| {
                let offset = diag.location.offset_in(&contents)?;
                Some(SourceDiagnostic {
                    src: NamedSource::new(diag.location.file.display().to_string(), contents),
                    span: SourceSpan::from((offset, 0)),
                    message: diag.display_message(),
                    label: diag.kind.code().to_string(),
                    help: diag.details(),
                })
            });
        match rendered {
            Some(source_diag) => eprintln!("{:?}", Report::new(source_diag)),
            None => eprintln!("{diag}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_follow_lines_and_columns() {
        let source = "int a;\nout->message(out, \"x\");\n";
        assert_eq!(Location::new("a.c", 1, 1).offset_in(source), Some(0));
        assert_eq!(Location::new("a.c", 2, 6).offset_in(source), Some(12));
        assert_eq!(Location::new("a.c", 9, 1).offset_in(source), None);
        assert_eq!(Location::default().offset_in(source), None);
    }

    #[test]
    fn unknown_locations_display_as_such() {
        assert_eq!(Location::default().to_string(), "<unknown>");
        assert_eq!(Location::new("main.c", 4, 2).to_string(), "main.c:4:2");
    }

    #[test]
    fn messages_name_the_problem() {
        let arity = Diagnostic::new(
            DiagnosticKind::ArityMismatch { expected: 2, got: 1 },
            Location::new("main.c", 3, 1),
            Some("widget".into()),
        );
        assert_eq!(
            arity.to_string(),
            "main.c:3:1: [fosa.arityMismatch] Expected 2 argument(s) to message `widget`, but got 1"
        );

        let mismatch = Diagnostic::new(
            DiagnosticKind::ArgumentTypeMismatch {
                ordinal: 4,
                expected: "char *".into(),
                got: "int".into(),
            },
            Location::default(),
            Some("widget".into()),
        );
        assert_eq!(
            mismatch.message(),
            "Expected `char *`, but got `int` in argument 4"
        );
        assert_eq!(mismatch.details().as_deref(), Some("while checking message `widget`"));
    }
}
