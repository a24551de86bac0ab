//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (files sorted by path,
//!    diagnostics by position)
//! 3. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use crate::error::{OutputErrorCode, VylintError};
use crate::patch::OutputEdit;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Diagnostics
// ============================================================================

/// A diagnostic as it appears in output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticInfo {
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column.
    pub col: u32,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Whether `fix` can repair this diagnostic.
    pub fixable: bool,
}

impl From<&Diagnostic> for DiagnosticInfo {
    fn from(d: &Diagnostic) -> Self {
        DiagnosticInfo {
            line: d.location.line,
            col: d.location.column,
            severity: d.severity,
            code: d.code,
            message: d.message.clone(),
            fixable: d.fixable,
        }
    }
}

/// Diagnostics for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Workspace-relative path.
    pub path: String,
    pub diagnostics: Vec<DiagnosticInfo>,
}

/// Totals across all files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of files analysed.
    pub files: usize,
    /// Number of diagnostics reported.
    pub errors: usize,
    /// Number of those that `fix` can repair.
    pub fixable: usize,
}

impl Summary {
    /// Count diagnostics over a set of reports.
    pub fn from_reports(reports: &[FileReport], files: usize) -> Self {
        let diagnostics = reports.iter().flat_map(|r| r.diagnostics.iter());
        let (errors, fixable) = diagnostics.fold((0, 0), |(e, f), d| {
            (e + 1, f + usize::from(d.fixable))
        });
        Summary {
            files,
            errors,
            fixable,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A file left out of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Workspace-relative path.
    pub path: String,
    pub reason: String,
}

/// Response for `vylint check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// "ok" when clean, "violations" otherwise.
    pub status: String,
    pub schema_version: String,
    /// Only files with diagnostics are listed.
    pub files: Vec<FileReport>,
    /// Files that could not be analysed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
    pub summary: Summary,
}

impl CheckResponse {
    pub fn new(mut files: Vec<FileReport>, analysed: usize) -> Self {
        files.retain(|f| !f.diagnostics.is_empty());
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let summary = Summary::from_reports(&files, analysed);
        let status = if summary.errors == 0 { "ok" } else { "violations" };
        CheckResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            files,
            skipped: Vec::new(),
            summary,
        }
    }

    /// Attach the files that were left out.
    pub fn with_skipped(mut self, skipped: Vec<SkippedFile>) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Fix result for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedFile {
    /// Workspace-relative path.
    pub path: String,
    /// Number of changesets applied.
    pub passes: usize,
    /// Edits of every applied pass, each against the text of its own pass.
    pub edits: Vec<OutputEdit>,
    /// Diagnostics left after fixing.
    pub remaining: Vec<DiagnosticInfo>,
}

/// Response for `vylint fix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixResponse {
    /// "ok" when nothing remains, "violations" otherwise.
    pub status: String,
    pub schema_version: String,
    /// True when files were not written.
    pub dry_run: bool,
    /// Only files that changed or still have diagnostics are listed.
    pub files: Vec<FixedFile>,
    /// Files that could not be analysed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
    /// Totals of the remaining diagnostics.
    pub summary: Summary,
}

impl FixResponse {
    pub fn new(mut files: Vec<FixedFile>, analysed: usize, dry_run: bool) -> Self {
        files.retain(|f| f.passes > 0 || !f.remaining.is_empty());
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let remaining: Vec<FileReport> = files
            .iter()
            .map(|f| FileReport {
                path: f.path.clone(),
                diagnostics: f.remaining.clone(),
            })
            .collect();
        let summary = Summary::from_reports(&remaining, analysed);
        let status = if summary.errors == 0 { "ok" } else { "violations" };
        FixResponse {
            status: status.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            dry_run,
            files,
            skipped: Vec::new(),
            summary,
        }
    }

    /// Attach the files that were left out.
    pub fn with_skipped(mut self, skipped: Vec<SkippedFile>) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Error details in an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a VylintError.
    pub fn from_error(err: &VylintError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let details = match err {
            VylintError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            VylintError::ApplyError {
                file: Some(file), ..
            } => Some(serde_json::json!({ "file": file })),
            _ => None,
        };
        ErrorInfo {
            code,
            message: err.to_string(),
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &VylintError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(fixable: bool) -> DiagnosticInfo {
        DiagnosticInfo {
            line: 8,
            col: 12,
            severity: Severity::Error,
            code: DiagnosticCode::RenderWithoutEl,
            message: "Method \"render\" does not have matching \"el\" method".to_string(),
            fixable,
        }
    }

    #[test]
    fn check_response_drops_clean_files_and_sorts() {
        let files = vec![
            FileReport {
                path: "src/B.php".to_string(),
                diagnostics: vec![info(true)],
            },
            FileReport {
                path: "src/Clean.php".to_string(),
                diagnostics: vec![],
            },
            FileReport {
                path: "src/A.php".to_string(),
                diagnostics: vec![info(false), info(true)],
            },
        ];

        let response = CheckResponse::new(files, 3);
        assert_eq!(response.status, "violations");
        assert_eq!(response.files.len(), 2);
        assert_eq!(response.files[0].path, "src/A.php");
        assert_eq!(
            response.summary,
            Summary {
                files: 3,
                errors: 3,
                fixable: 2
            }
        );
    }

    #[test]
    fn clean_check_is_ok() {
        let response = CheckResponse::new(vec![], 5);
        assert_eq!(response.status, "ok");
        assert_eq!(response.summary.files, 5);
    }

    #[test]
    fn status_is_first_field() {
        let mut out = Vec::new();
        emit_response(&CheckResponse::new(vec![], 0), &mut out).unwrap();
        let json = String::from_utf8(out).unwrap();
        let status = json.find("\"status\"").unwrap();
        let schema = json.find("\"schema_version\"").unwrap();
        assert!(status < schema);
    }

    #[test]
    fn skipped_files_are_listed_only_when_present() {
        let clean = serde_json::to_value(CheckResponse::new(vec![], 1)).unwrap();
        assert!(clean.get("skipped").is_none());

        let response = CheckResponse::new(vec![], 1).with_skipped(vec![SkippedFile {
            path: "Legacy.php".to_string(),
            reason: "not valid UTF-8".to_string(),
        }]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["skipped"][0]["path"], "Legacy.php");
        assert_eq!(response.status, "ok");
    }

    #[test]
    fn diagnostic_code_serializes_as_name() {
        let json = serde_json::to_value(info(true)).unwrap();
        assert_eq!(json["code"], "RenderWithoutEl");
        assert_eq!(json["severity"], "error");
    }

    #[test]
    fn error_response_carries_code_and_details() {
        let response = ErrorResponse::from_error(&VylintError::file_not_found("src/Missing.php"));
        assert_eq!(response.status, "error");
        assert_eq!(response.error.code, 3);
        assert_eq!(
            response.error.details,
            Some(serde_json::json!({ "path": "src/Missing.php" }))
        );
    }
}
