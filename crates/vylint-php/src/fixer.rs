//! Fix generation for the render/element pairing rule.
//!
//! Fixes are expressed against tokens through [`TokenFixer`] and land in a
//! [`Changeset`] for the analysed content. Two fixes exist: inserting a
//! missing companion ([`insert_companion`]) and rewriting the parameter list
//! and body of a mismatched one ([`rewrite_companion`]).

use vylint_core::config::RuleConfig;
use vylint_core::patch::{Changeset, ChangesetBuilder, Span};

use crate::error::{SniffError, SniffResult};
use crate::locator::MethodDeclaration;
use crate::tokens::{Parameter, Token, TokenStream, Visibility};

// ============================================================================
// Token-level editing
// ============================================================================

/// Token-addressed edits over one stream.
pub struct TokenFixer<'a> {
    stream: &'a TokenStream,
    builder: ChangesetBuilder,
}

impl<'a> TokenFixer<'a> {
    pub fn new(stream: &'a TokenStream) -> Self {
        TokenFixer {
            stream,
            builder: ChangesetBuilder::new(stream.source()),
        }
    }

    fn token(&self, index: usize) -> SniffResult<&'a Token> {
        self.stream.expect(index, "a token in the stream", |_| true)
    }

    /// Insert `text` right before token `index`.
    pub fn add_content_before(&mut self, index: usize, text: &str) -> SniffResult<&mut Self> {
        let offset = self.token(index)?.offset;
        self.builder.insert(offset, text);
        Ok(self)
    }

    /// Insert `text` right after token `index`.
    pub fn add_content_after(&mut self, index: usize, text: &str) -> SniffResult<&mut Self> {
        let offset = self.token(index)?.end();
        self.builder.insert(offset, text);
        Ok(self)
    }

    pub fn add_newline_before(&mut self, index: usize) -> SniffResult<&mut Self> {
        let eol = self.stream.eol();
        self.add_content_before(index, eol)
    }

    pub fn add_newline_after(&mut self, index: usize) -> SniffResult<&mut Self> {
        let eol = self.stream.eol();
        self.add_content_after(index, eol)
    }

    /// Replace tokens `first..=last` with `text`.
    pub fn replace_tokens(&mut self, first: usize, last: usize, text: &str) -> SniffResult<&mut Self> {
        if last < first {
            return Err(SniffError::UnexpectedToken {
                index: last,
                expected: "a token at or after the first replaced token",
                found: self.stream.kind(last),
            });
        }
        let start = self.token(first)?.offset;
        let end = self.token(last)?.end();
        self.builder.replace(Span::new(start, end), text);
        Ok(self)
    }

    /// Validate the recorded edits.
    pub fn finish(self) -> SniffResult<Changeset> {
        Ok(self.builder.finish()?)
    }
}

// ============================================================================
// Companion shape and body
// ============================================================================

/// How a companion is declared and what it hands to the element function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionShape {
    pub visibility: Visibility,
    pub is_static: bool,
    /// First argument of the element function call.
    pub callable: String,
}

impl CompanionShape {
    /// Derive the companion's shape from its source method.
    ///
    /// A public instance method is rendered by the framework on a fresh
    /// instance, so its companion passes the class name. Static methods and
    /// non-public instance methods are passed as first-class callables.
    pub fn for_source(source: &MethodDeclaration, source_name: &str) -> Self {
        match (source.is_static, source.visibility) {
            (true, visibility) => CompanionShape {
                visibility,
                is_static: true,
                callable: format!("static::{}(...)", source_name),
            },
            (false, Visibility::Public) => CompanionShape {
                visibility: Visibility::Public,
                is_static: true,
                callable: "static::class".to_string(),
            },
            (false, visibility) => CompanionShape {
                visibility,
                is_static: false,
                callable: format!("$this->{}(...)", source_name),
            },
        }
    }
}

/// A companion body forwarding every parameter by name, `{` through `}`.
///
/// `indent` is the indentation of the declaration line; the closing brace
/// lines up with it.
pub fn element_body(
    params: &[Parameter],
    shape: &CompanionShape,
    config: &RuleConfig,
    indent: &str,
    eol: &str,
) -> String {
    let inner = format!("{}{}", indent, config.indent);
    let mut lines = Vec::with_capacity(params.len() + 4);
    lines.push("{".to_string());
    lines.push(format!(
        "{}return \\{}({}, [",
        inner, config.element_function, shape.callable
    ));
    for param in params {
        lines.push(format!(
            "{}{}'{}' => {},",
            inner,
            config.indent,
            param.bare_name(),
            param.name
        ));
    }
    lines.push(format!("{}]);", inner));
    lines.push(format!("{}}}", indent));
    lines.join(eol)
}

// ============================================================================
// Case A: missing companion
// ============================================================================

/// Where a new companion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    /// Content is added after this token.
    pub after: usize,
    /// True when `after` ends a line, so the insert starts a fresh line.
    pub at_line_start: bool,
    /// True when the point follows another member rather than the class `{`.
    pub after_sibling: bool,
}

/// The insertion point for a companion of `method`: after the previous
/// sibling method, or after the class opener when there is none.
///
/// `None` when the previous sibling has no locatable end.
pub fn insertion_point(
    stream: &TokenStream,
    method: &MethodDeclaration,
) -> SniffResult<Option<InsertionPoint>> {
    let mut previous = None;
    for sibling in method.scope.methods(stream) {
        let sibling = sibling?;
        if sibling.index >= method.index {
            break;
        }
        previous = Some(sibling);
    }

    let (boundary, after_sibling) = match previous {
        Some(sibling) => match sibling.end(stream) {
            Some(end) => (end, true),
            None => return Ok(None),
        },
        None => (method.scope.opener, false),
    };

    let point = match stream.get(boundary + 1) {
        Some(next) if next.ends_line() => InsertionPoint {
            after: boundary + 1,
            at_line_start: true,
            after_sibling,
        },
        _ => InsertionPoint {
            after: boundary,
            at_line_start: false,
            after_sibling,
        },
    };
    Ok(Some(point))
}

/// Build the changeset inserting a companion named `name` for `source`.
pub fn insert_companion(
    stream: &TokenStream,
    config: &RuleConfig,
    source: &MethodDeclaration,
    source_name: &str,
    name: &str,
    point: InsertionPoint,
) -> SniffResult<Option<Changeset>> {
    let Some((open, close)) = source.params else {
        return Ok(None);
    };
    let params_text = stream.text_between(open, close);
    let params = stream.method_parameters(source.index)?;
    let shape = CompanionShape::for_source(source, source_name);
    let eol = stream.eol();
    let indent = stream.line_indent(source.index);

    let declaration = format!(
        "{indent}{visibility}{static_kw} function {name}{params_text}: \\{class} {body}",
        visibility = shape.visibility.as_str(),
        static_kw = if shape.is_static { " static" } else { "" },
        class = config.element_class,
        body = element_body(&params, &shape, config, indent, eol),
    );
    let method = format!(
        "{indent}#[\\{attribute}]{eol}{declaration}",
        attribute = config.companion_attribute,
    );

    let text = match (point.at_line_start, point.after_sibling) {
        (true, false) => format!("{method}{eol}{eol}"),
        _ => format!("{eol}{method}{eol}"),
    };

    let mut fixer = TokenFixer::new(stream);
    fixer.add_content_after(point.after, &text)?;
    Ok(Some(fixer.finish()?))
}

// ============================================================================
// Case B: mismatched companion
// ============================================================================

/// Build the changeset copying `source`'s parameter list onto `companion` and
/// regenerating the companion's body.
///
/// `None` when either parameter list or the companion's body is missing.
pub fn rewrite_companion(
    stream: &TokenStream,
    config: &RuleConfig,
    source: &MethodDeclaration,
    source_name: &str,
    companion: &MethodDeclaration,
) -> SniffResult<Option<Changeset>> {
    let (Some((src_open, src_close)), Some((open, close)), Some((body_open, body_close))) =
        (source.params, companion.params, companion.body)
    else {
        return Ok(None);
    };

    let params = stream.method_parameters(source.index)?;
    let shape = CompanionShape::for_source(source, source_name);
    let body = element_body(
        &params,
        &shape,
        config,
        stream.line_indent(companion.index),
        stream.eol(),
    );

    let mut fixer = TokenFixer::new(stream);
    fixer.replace_tokens(open, close, stream.text_between(src_open, src_close))?;
    fixer.replace_tokens(body_open, body_close, &body)?;
    Ok(Some(fixer.finish()?))
}
