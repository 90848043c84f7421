//! Import diagnostics
//!
//! Problems found while importing never abort the import. They are
//! collected as [`Diagnostic`]s which callers can render to a terminal or
//! export as JSON.

use std::fmt;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Severity as CsSeverity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use termcolor::WriteColor;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Something is probably wrong but importing continues normally
    Warning,
    /// Part of a module could not be imported
    Critical,
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A referenced type description file does not exist
    MissingManifestFile,
    /// A referenced type description is a directory
    ManifestIsDirectory,
    /// A manifest or type description could not be read
    ManifestUnreadable,
    /// A manifest or type description is malformed
    ManifestParseFailure,
    /// A type description declares dependencies itself
    DeprecatedDependencyFormat,
    /// Two different types are exported under one name and version
    AmbiguousExport,
    /// A manifest lists a component file that does not exist
    MissingDeclaredComponentFile,
    /// An optional import was skipped
    OptionalImportUnsupported,
    /// A module could not be found on the import paths
    ModuleNotFound,
    /// A plugin module has a type description it does not declare
    UndeclaredTypeInfo,
    /// A component file's base type could not be resolved
    IncompleteCompositeType,
    /// Manifest and component disagree on being a singleton
    SingletonMismatch,
    /// Builtin type descriptions are missing from the import paths
    MissingBuiltins,
    /// An explicitly given manifest is not a directory manifest
    NotADirectoryManifest,
    /// The component front end failed to populate a type
    FrontEndFailure,
}

impl DiagnosticKind {
    /// Stable code used when rendering
    pub fn code(self) -> &'static str {
        use DiagnosticKind::*;

        match self {
            MissingManifestFile => "I0001",
            ManifestIsDirectory => "I0002",
            ManifestUnreadable => "I0003",
            ManifestParseFailure => "I0004",
            DeprecatedDependencyFormat => "I0005",
            AmbiguousExport => "I0006",
            MissingDeclaredComponentFile => "I0007",
            OptionalImportUnsupported => "I0008",
            ModuleNotFound => "I0009",
            UndeclaredTypeInfo => "I0010",
            IncompleteCompositeType => "I0011",
            SingletonMismatch => "I0012",
            MissingBuiltins => "I0013",
            NotADirectoryManifest => "I0014",
            FrontEndFailure => "I0015",
        }
    }

    /// Severity used unless a diagnostic overrides it
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticKind::ManifestParseFailure
            | DiagnosticKind::ManifestUnreadable
            | DiagnosticKind::MissingBuiltins => Severity::Critical,
            DiagnosticKind::OptionalImportUnsupported => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

/// Position in a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// File the problem was found in
    pub file: PathBuf,
    /// Line (1-indexed), 0 when unknown
    pub line: usize,
    /// Column (1-indexed), 0 when unknown
    pub column: usize,
}

impl SourceLocation {
    /// Location of a whole file
    pub fn file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            line: 0,
            column: 0,
        }
    }

    /// Location of a line in a file
    pub fn line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        if self.line > 0 {
            write!(f, ":{}", self.line)?;
            if self.column > 0 {
                write!(f, ":{}", self.column)?;
            }
        }
        Ok(())
    }
}

/// A problem found while importing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// How serious it is
    pub severity: Severity,
    /// Human readable description
    pub message: String,
    /// Where it happened, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Create a diagnostic with the kind's default severity
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            location: None,
        }
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach a location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether part of an import was lost
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }

    /// Convert into a codespan diagnostic for rendering
    pub fn to_codespan(&self) -> CsDiagnostic<usize> {
        let severity = match self.severity {
            Severity::Info => CsSeverity::Note,
            Severity::Warning => CsSeverity::Warning,
            Severity::Critical => CsSeverity::Error,
        };
        let mut diagnostic = CsDiagnostic::new(severity)
            .with_message(self.message.clone())
            .with_code(self.kind.code());
        if let Some(location) = &self.location {
            diagnostic = diagnostic.with_notes(vec![format!("in {}", location)]);
        }
        diagnostic
    }

    /// Render to a terminal writer
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
    ) -> Result<(), codespan_reporting::files::Error> {
        let files: SimpleFiles<String, String> = SimpleFiles::new();
        let config = term::Config::default();
        term::emit(writer, &config, &files, &self.to_codespan())
    }

    /// Serialize as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        write!(f, "{}[{}]: {}", severity, self.kind.code(), self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

/// Render a batch of diagnostics
pub fn emit_all(
    diagnostics: &[Diagnostic],
    writer: &mut dyn WriteColor,
) -> Result<(), codespan_reporting::files::Error> {
    for diagnostic in diagnostics {
        diagnostic.emit(writer)?;
    }
    Ok(())
}

/// Serialize a batch of diagnostics as a JSON array
pub fn to_json(diagnostics: &[Diagnostic]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(diagnostics)
}
