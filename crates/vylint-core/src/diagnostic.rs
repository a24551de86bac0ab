//! Diagnostics produced by lint rules, and the fix-request policy.
//!
//! A [`Diagnostic`] is created while a rule evaluates one class and is
//! consumed right away by the reporter. Its optional fix is a
//! [`Changeset`] against the content the rule analysed; the rule only builds
//! it when the [`FixMode`] asks for a fix for that code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::patch::Changeset;

/// Stable identifier of a rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A trigger-marked `render*` method has no companion element method.
    RenderWithoutEl,
    /// The companion's parameter list differs from the render method's.
    RenderElParamsMismatch,
}

impl DiagnosticCode {
    /// All codes, in declaration order.
    pub const ALL: [DiagnosticCode; 2] = [
        DiagnosticCode::RenderWithoutEl,
        DiagnosticCode::RenderElParamsMismatch,
    ];

    /// The code as it appears in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::RenderWithoutEl => "RenderWithoutEl",
            DiagnosticCode::RenderElParamsMismatch => "RenderElParamsMismatch",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagnosticCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagnosticCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = DiagnosticCode::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown diagnostic code '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Where a diagnostic points: a token's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Index of the token the diagnostic is attached to.
    pub token: usize,
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column (in characters).
    pub column: u32,
    /// Byte offset of the token start.
    pub byte_offset: usize,
}

/// A rule violation with an optional fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Whether the rule can build a fix for this diagnostic.
    pub fixable: bool,
    /// The fix, present only when one was requested and could be built.
    pub fix: Option<Changeset>,
}

impl Diagnostic {
    /// Create an error diagnostic without a fix.
    pub fn error(location: Location, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            location,
            severity: Severity::Error,
            code,
            message: message.into(),
            fixable: false,
            fix: None,
        }
    }

    /// Mark the diagnostic as fixable.
    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }

    /// Attach a built fix.
    pub fn with_fix(mut self, fix: Changeset) -> Self {
        self.fixable = true;
        self.fix = Some(fix);
        self
    }
}

/// Whether the consumer wants fixes built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FixMode {
    /// Report only.
    #[default]
    Off,
    /// Build fixes for every fixable diagnostic.
    All,
    /// Build fixes only for the listed codes.
    Only(Vec<DiagnosticCode>),
}

impl FixMode {
    /// Answer the reporter's "was a fix requested?" question for `code`.
    pub fn requested(&self, code: DiagnosticCode) -> bool {
        match self {
            FixMode::Off => false,
            FixMode::All => true,
            FixMode::Only(codes) => codes.contains(&code),
        }
    }

    /// Build a fix mode from `--only` style code lists (empty means all).
    pub fn from_codes(codes: Vec<DiagnosticCode>) -> Self {
        if codes.is_empty() {
            FixMode::All
        } else {
            FixMode::Only(codes)
        }
    }
}
