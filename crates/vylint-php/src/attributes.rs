//! Attributes written in front of a method declaration.
//!
//! Discovery runs in two stages. [`collect_raw_attributes`] walks backwards
//! from the `function` keyword and reads the names out of each `#[...]`
//! block; [`resolve_attributes`] then turns those names into fully qualified
//! ones with the file's [`NamespaceContext`].

use crate::error::SniffResult;
use crate::namespace::NamespaceContext;
use crate::tokens::{TokenKind, TokenStream};

/// Token kinds that end the backward attribute scan.
const BOUNDARIES: [TokenKind; 8] = [
    TokenKind::Function,
    TokenKind::Class,
    TokenKind::Trait,
    TokenKind::Interface,
    TokenKind::Enum,
    TokenKind::OpenCurly,
    TokenKind::CloseCurly,
    TokenKind::Semicolon,
];

/// One attribute entry as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// The enclosing `#[`.
    pub opener: usize,
    /// The matching `]`.
    pub closer: usize,
    /// Name as written, e.g. `VyComponent` or `\Vy\Attributes\VyComponent`.
    pub name: String,
}

/// An attribute with its resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAnnotation {
    pub opener: usize,
    pub closer: usize,
    pub raw_name: String,
    /// Fully qualified name without a leading `\`; `None` when the file has
    /// no usable namespace context.
    pub resolved: Option<String>,
}

impl AttributeAnnotation {
    /// Whether this annotation names `fqn`.
    ///
    /// Comparison ignores ASCII case and a leading `\` on either side.
    pub fn is(&self, fqn: &str) -> bool {
        let fqn = fqn.strip_prefix('\\').unwrap_or(fqn);
        self.resolved
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(fqn))
    }
}

/// Collect the attribute entries preceding the `function` keyword at `index`,
/// nearest block first.
pub fn collect_raw_attributes(stream: &TokenStream, index: usize) -> SniffResult<Vec<RawAttribute>> {
    stream.expect(index, "a function keyword", |k| k == TokenKind::Function)?;

    let mut found = Vec::new();
    let mut i = index;
    while i > 0 {
        i -= 1;
        let Some(token) = stream.get(i) else {
            break;
        };

        if token.kind == TokenKind::CloseSquare {
            if let Some(opener) = token.attribute_opener {
                found.extend(block_entries(stream, opener, i));
                i = opener;
                continue;
            }
        }

        if token.kind == TokenKind::AttributeOpen {
            // A `#[` whose `]` we never passed has no closer at all.
            break;
        }

        if BOUNDARIES.contains(&token.kind) {
            break;
        }
    }
    Ok(found)
}

/// Resolve collected names. Without a context every name stays unresolved.
pub fn resolve_attributes(
    raw: Vec<RawAttribute>,
    context: Option<&NamespaceContext>,
) -> Vec<AttributeAnnotation> {
    raw.into_iter()
        .map(|attribute| AttributeAnnotation {
            resolved: context.map(|ctx| ctx.resolve(&attribute.name)),
            opener: attribute.opener,
            closer: attribute.closer,
            raw_name: attribute.name,
        })
        .collect()
}

/// Collect and resolve in one step.
pub fn method_attributes(
    stream: &TokenStream,
    index: usize,
    context: Option<&NamespaceContext>,
) -> SniffResult<Vec<AttributeAnnotation>> {
    Ok(resolve_attributes(
        collect_raw_attributes(stream, index)?,
        context,
    ))
}

/// Whether the method at `index` carries the attribute `fqn`.
pub fn method_has_attribute(
    stream: &TokenStream,
    index: usize,
    context: Option<&NamespaceContext>,
    fqn: &str,
) -> SniffResult<bool> {
    Ok(method_attributes(stream, index, context)?
        .iter()
        .any(|annotation| annotation.is(fqn)))
}

/// One entry per top-level comma-separated item of the block `[opener, closer]`.
fn block_entries(stream: &TokenStream, opener: usize, closer: usize) -> Vec<RawAttribute> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut name = String::new();
    let mut reading_name = true;

    for i in opener + 1..closer {
        let Some(token) = stream.get(i) else {
            break;
        };
        match token.kind {
            TokenKind::OpenParen
            | TokenKind::OpenSquare
            | TokenKind::OpenCurly
            | TokenKind::AttributeOpen => {
                depth += 1;
                reading_name = false;
            }
            TokenKind::CloseParen | TokenKind::CloseSquare | TokenKind::CloseCurly => {
                depth = depth.saturating_sub(1);
            }
            TokenKind::Comma if depth == 0 => {
                push_entry(&mut entries, &mut name, opener, closer);
                reading_name = true;
            }
            TokenKind::Identifier | TokenKind::NsSeparator if reading_name && depth == 0 => {
                name.push_str(&token.text);
            }
            k if k.is_keyword() && reading_name && depth == 0 => {
                name.push_str(&token.text);
            }
            k if k.is_trivia() => {
                if !name.is_empty() {
                    reading_name = false;
                }
            }
            _ => reading_name = false,
        }
    }
    push_entry(&mut entries, &mut name, opener, closer);
    entries
}

fn push_entry(entries: &mut Vec<RawAttribute>, name: &mut String, opener: usize, closer: usize) {
    if !name.is_empty() {
        entries.push(RawAttribute {
            opener,
            closer,
            name: std::mem::take(name),
        });
    }
}
