//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Infrastructure Types
// ============================================================================

// patch module - changesets and their application
use vylint::patch::{
    Changeset, ChangesetBuilder, ContentHash, Edit, EditKind, OutputEdit, PatchError, PatchResult,
    Span,
};

// diagnostic module - findings and fix requests
use vylint::diagnostic::{Diagnostic, DiagnosticCode, FixMode, Location, Severity};

// error module - error types and codes
use vylint::error::{OutputErrorCode, VylintError};

// config module - rule configuration
use vylint::config::{
    CliOverrides, ConfigError, ConfigResult, ConfigSource, ConfigValue, ProjectConfig,
    ResolvedConfig, RuleConfig, PROJECT_CONFIG_FILE,
};

// output module - JSON output types
use vylint::output::{
    emit_response, CheckResponse, DiagnosticInfo, ErrorInfo, ErrorResponse, FileReport,
    FixResponse, FixedFile, SkippedFile, Summary, SCHEMA_VERSION,
};

// text module - position utilities
use vylint::text::{detect_eol, offset_to_char_position};

// ============================================================================
// PHP Support
// ============================================================================

use vylint::php::attributes::{AttributeAnnotation, RawAttribute};
use vylint::php::fixer::{CompanionShape, InsertionPoint, TokenFixer};
use vylint::php::locator::{ClassKind, ClassScope, MethodDeclaration};
use vylint::php::namespace::NamespaceContext;
use vylint::php::naming::companion_name;
use vylint::php::rule::MAX_FIX_PASSES;
use vylint::php::tokens::{MethodProperties, Parameter, Visibility};
use vylint::php::{
    check_source, fix_source, tokenize, ElMethodsRule, FileCheck, FileContext, FixOutcome,
    SniffError, SniffResult, Token, TokenKind, TokenStream,
};

// ============================================================================
// CLI Front Door
// ============================================================================

use vylint::cli::{run_check, run_fix};
use vylint::files::{collect_php_files, CollectedFiles, FileError, FileResult, SourceFile};

#[test]
fn api_surface_compiles() {
    // This test passes if the file compiles.
    // The imports above verify that all public types are accessible.
}
