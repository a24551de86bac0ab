//! The render/element pairing rule.
//!
//! Every `render*` method carrying the trigger attribute needs a companion
//! factory method with the same parameter list. [`ElMethodsRule`] checks one
//! class-like declaration at a time; [`check_source`] and [`fix_source`] run
//! it over a whole file.

use std::collections::HashSet;

use tracing::{debug, warn};

use vylint_core::config::RuleConfig;
use vylint_core::diagnostic::{Diagnostic, DiagnosticCode, FixMode, Location};
use vylint_core::patch::{Changeset, OutputEdit, PatchError};

use crate::attributes::method_has_attribute;
use crate::error::SniffResult;
use crate::fixer::{insert_companion, insertion_point, rewrite_companion};
use crate::locator::{ClassScope, MethodDeclaration};
use crate::namespace::NamespaceContext;
use crate::naming::companion_name;
use crate::params::params_match;
use crate::tokenizer::tokenize;
use crate::tokens::{TokenKind, TokenStream};

/// Upper bound on fix passes over one file.
pub const MAX_FIX_PASSES: usize = 10;

/// A tokenized file plus the namespace table built from it.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub stream: TokenStream,
    /// `None` when the file's imports could not be read.
    pub namespace: Option<NamespaceContext>,
}

impl FileContext {
    pub fn new(source: &str) -> Self {
        let stream = tokenize(source);
        let namespace = NamespaceContext::build(&stream);
        if namespace.is_none() {
            debug!("namespace context unavailable, attributes stay unresolved");
        }
        FileContext { stream, namespace }
    }

    fn location(&self, index: usize) -> Location {
        let (line, column, byte_offset) = self
            .stream
            .get(index)
            .map(|t| (t.line, t.column, t.offset))
            .unwrap_or((1, 1, 0));
        Location {
            token: index,
            line,
            column,
            byte_offset,
        }
    }
}

/// The rule itself, configured with the names it works with.
#[derive(Debug, Clone, Default)]
pub struct ElMethodsRule {
    config: RuleConfig,
}

impl ElMethodsRule {
    /// Declarations the rule is invoked for. Interfaces cannot hold bodies
    /// and are left out.
    pub const REGISTERED: [TokenKind; 3] = [TokenKind::Class, TokenKind::Trait, TokenKind::Enum];

    pub fn new(config: RuleConfig) -> Self {
        ElMethodsRule { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Check the class-like declaration at `index`.
    pub fn check_class(
        &self,
        file: &FileContext,
        index: usize,
        fix: &FixMode,
    ) -> SniffResult<Vec<Diagnostic>> {
        let Some(scope) = ClassScope::of(&file.stream, index)? else {
            return Ok(Vec::new());
        };

        let mut diagnostics = Vec::new();
        let mut claimed = HashSet::new();
        for method in scope.methods(&file.stream) {
            let method = method?;
            if let Some(diagnostic) = self.check_method(file, &scope, &method, &mut claimed, fix)? {
                diagnostics.push(diagnostic);
            }
        }
        Ok(diagnostics)
    }

    fn check_method(
        &self,
        file: &FileContext,
        scope: &ClassScope,
        render: &MethodDeclaration,
        claimed: &mut HashSet<String>,
        fix: &FixMode,
    ) -> SniffResult<Option<Diagnostic>> {
        let stream = &file.stream;
        let Some(render_name) = render.name.as_deref() else {
            return Ok(None);
        };
        let Some(el_name) = companion_name(render_name) else {
            return Ok(None);
        };
        if !method_has_attribute(
            stream,
            render.index,
            file.namespace.as_ref(),
            &self.config.trigger_attribute,
        )? {
            return Ok(None);
        }

        // Method names are case-insensitive, so `renderFoo` and `renderFOO`
        // compete for one companion. The first declaration owns it.
        if !claimed.insert(el_name.to_lowercase()) {
            debug!(method = render_name, companion = %el_name, "companion already claimed");
            return Ok(None);
        }

        match scope.find_method(stream, &el_name)? {
            None => self.missing_companion(file, render, render_name, &el_name, fix),
            Some(el) => self.mismatched_companion(file, render, render_name, &el, fix),
        }
    }

    fn missing_companion(
        &self,
        file: &FileContext,
        render: &MethodDeclaration,
        render_name: &str,
        el_name: &str,
        fix: &FixMode,
    ) -> SniffResult<Option<Diagnostic>> {
        let stream = &file.stream;
        if render.params.is_none() {
            debug!(method = render_name, "parameter list incomplete, skipping");
            return Ok(None);
        }

        let code = DiagnosticCode::RenderWithoutEl;
        let message = format!(
            "Method \"{}\" does not have matching \"{}\" method",
            render_name, el_name
        );
        let diagnostic = Diagnostic::error(file.location(render.index), code, message);
        debug!(method = render_name, companion = el_name, "companion missing");

        let Some(point) = insertion_point(stream, render)? else {
            return Ok(Some(diagnostic));
        };
        if !fix.requested(code) {
            return Ok(Some(diagnostic.fixable()));
        }
        let fixed = insert_companion(stream, &self.config, render, render_name, el_name, point)?;
        Ok(Some(match fixed {
            Some(changeset) => diagnostic.with_fix(changeset),
            None => diagnostic,
        }))
    }

    fn mismatched_companion(
        &self,
        file: &FileContext,
        render: &MethodDeclaration,
        render_name: &str,
        el: &MethodDeclaration,
        fix: &FixMode,
    ) -> SniffResult<Option<Diagnostic>> {
        let stream = &file.stream;
        match params_match(stream, render.index, el.index)? {
            Some(true) => return Ok(None),
            Some(false) => {}
            None => {
                debug!(method = render_name, "parameter lists incomparable, skipping");
                return Ok(None);
            }
        }

        let el_name = el.name.as_deref().unwrap_or_default();
        let code = DiagnosticCode::RenderElParamsMismatch;
        let message = format!(
            "Parameters of \"{}()\" do not match parameters of \"{}()\"",
            el_name, render_name
        );
        let diagnostic = Diagnostic::error(file.location(el.index), code, message);
        debug!(method = render_name, companion = el_name, "parameter mismatch");

        if el.body.is_none() {
            return Ok(Some(diagnostic));
        }
        if !fix.requested(code) {
            return Ok(Some(diagnostic.fixable()));
        }
        let fixed = rewrite_companion(stream, &self.config, render, render_name, el)?;
        Ok(Some(match fixed {
            Some(changeset) => diagnostic.with_fix(changeset),
            None => diagnostic,
        }))
    }
}

// ============================================================================
// Whole files
// ============================================================================

/// Diagnostics for one file and the merged fix for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    /// Ordered by position.
    pub diagnostics: Vec<Diagnostic>,
    /// Every attached fix that merged cleanly.
    pub fix: Option<Changeset>,
}

/// Run the rule over every registered declaration in `source`.
pub fn check_source(rule: &ElMethodsRule, source: &str, fix: &FixMode) -> SniffResult<FileCheck> {
    let file = FileContext::new(source);

    let mut diagnostics = Vec::new();
    for token in file.stream.tokens() {
        if ElMethodsRule::REGISTERED.contains(&token.kind) {
            diagnostics.extend(rule.check_class(&file, token.index, fix)?);
        }
    }
    diagnostics.sort_by_key(|d| d.location.byte_offset);

    let mut merged: Option<Changeset> = None;
    for diagnostic in &diagnostics {
        let Some(changeset) = &diagnostic.fix else {
            continue;
        };
        merged = match merged {
            None => Some(changeset.clone()),
            Some(current) => match current.merge(changeset) {
                Ok(combined) => Some(combined),
                Err(PatchError::OverlappingEdits { first, second }) => {
                    warn!(
                        "Dropping fix for {} at line {}: overlaps {} with {}",
                        diagnostic.code, diagnostic.location.line, first, second
                    );
                    Some(current)
                }
                Err(err) => return Err(err.into()),
            },
        };
    }

    Ok(FileCheck { diagnostics, fix: merged })
}

/// Result of fixing one file to a fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The fixed content.
    pub content: String,
    /// Number of changesets applied.
    pub passes: usize,
    /// Edits of every pass, each against that pass's input.
    pub edits: Vec<OutputEdit>,
    /// Diagnostics still present in `content`.
    pub remaining: Vec<Diagnostic>,
}

impl FixOutcome {
    pub fn changed(&self) -> bool {
        self.passes > 0
    }
}

/// Apply requested fixes until none is left, re-analysing after every pass.
pub fn fix_source(rule: &ElMethodsRule, source: &str, fix: &FixMode) -> SniffResult<FixOutcome> {
    let mut content = source.to_string();
    let mut passes = 0;
    let mut edits = Vec::new();

    loop {
        let check = check_source(rule, &content, fix)?;
        let Some(changeset) = check.fix.filter(Changeset::has_edits) else {
            break;
        };
        if passes == MAX_FIX_PASSES {
            warn!(
                "Fixes did not converge after {} passes, giving up",
                MAX_FIX_PASSES
            );
            break;
        }
        edits.extend(changeset.materialize(&content));
        content = changeset.apply(&content)?;
        passes += 1;
        debug!(pass = passes, edits = changeset.edit_count(), "applied fixes");
    }

    let remaining = check_source(rule, &content, &FixMode::Off)?.diagnostics;
    Ok(FixOutcome {
        content,
        passes,
        edits,
        remaining,
    })
}
