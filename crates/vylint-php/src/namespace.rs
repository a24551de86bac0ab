//! File-level namespace and import-alias table.
//!
//! Built once per file by [`NamespaceContext::build`] and only read
//! afterwards. Resolution follows PHP's class-name rules closely enough for
//! attribute names: fully qualified names pass through, the first segment is
//! looked up among the imports, and anything else lands in the declared
//! namespace (or the global one).

use std::collections::HashMap;

use tracing::trace;

use crate::tokens::{Token, TokenKind, TokenStream};

/// Declared namespace and class imports of one file.
///
/// All names are stored without a leading backslash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    namespace: Option<String>,
    /// Lowercased alias -> fully qualified name.
    aliases: HashMap<String, String>,
}

impl NamespaceContext {
    /// Scan a whole file.
    ///
    /// Returns `None` when a `namespace` or `use` statement has no
    /// terminator, which only happens for incomplete input.
    pub fn build(stream: &TokenStream) -> Option<Self> {
        let mut context = NamespaceContext::default();
        let mut namespace_seen = false;
        // One entry per open brace: whether it opened a braced namespace.
        let mut braces: Vec<bool> = Vec::new();
        let mut namespace_brace: Option<usize> = None;

        for token in stream.tokens() {
            match token.kind {
                TokenKind::OpenCurly => {
                    braces.push(namespace_brace == Some(token.index));
                }
                TokenKind::CloseCurly => {
                    braces.pop();
                }
                TokenKind::Namespace => {
                    if !starts_statement(stream, token.index) {
                        continue;
                    }
                    let (name, terminator) = namespace_declaration(stream, token.index)?;
                    if stream.kind(terminator) == Some(TokenKind::OpenCurly) {
                        namespace_brace = Some(terminator);
                    }
                    if !namespace_seen {
                        namespace_seen = true;
                        context.namespace = name;
                    }
                }
                TokenKind::Use => {
                    let nested = braces.iter().any(|is_namespace| !is_namespace);
                    if nested || !starts_statement(stream, token.index) {
                        continue;
                    }
                    let terminator =
                        stream.find_next(&[TokenKind::Semicolon], token.index + 1, None)?;
                    let statement: Vec<&Token> = stream.tokens()[token.index + 1..terminator]
                        .iter()
                        .filter(|t| !t.kind.is_trivia())
                        .collect();
                    for (alias, name) in parse_imports(&statement) {
                        trace!(alias = %alias, name = %name, "import");
                        context.aliases.insert(alias.to_ascii_lowercase(), name);
                    }
                }
                _ => {}
            }
        }

        Some(context)
    }

    /// The declared namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The fully qualified name imported under `alias` (case-insensitive).
    pub fn alias(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(&alias.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Resolve a class-like symbol to its fully qualified name.
    pub fn resolve(&self, symbol: &str) -> String {
        if let Some(qualified) = symbol.strip_prefix('\\') {
            return qualified.to_string();
        }

        let (first, rest) = match symbol.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (symbol, None),
        };

        if first.eq_ignore_ascii_case("namespace") {
            if let Some(rest) = rest {
                return self.qualify(rest);
            }
        }

        if let Some(target) = self.alias(first) {
            return match rest {
                Some(rest) => format!("{}\\{}", target, rest),
                None => target.to_string(),
            };
        }

        self.qualify(symbol)
    }

    fn qualify(&self, symbol: &str) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}\\{}", namespace, symbol),
            None => symbol.to_string(),
        }
    }
}

/// Name and terminator (`;` or `{`) of a namespace declaration.
fn namespace_declaration(stream: &TokenStream, index: usize) -> Option<(Option<String>, usize)> {
    let terminator = stream.find_next(
        &[TokenKind::Semicolon, TokenKind::OpenCurly],
        index + 1,
        None,
    )?;
    let name: String = stream.tokens()[index + 1..terminator]
        .iter()
        .filter(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::NsSeparator) || t.kind.is_keyword())
        .map(|t| t.text.as_str())
        .collect();
    let name = name.trim_start_matches('\\');
    Some(((!name.is_empty()).then(|| name.to_string()), terminator))
}

/// Whether the keyword at `index` begins a statement (rules out closure
/// `use` and `namespace` as a relative name or method name).
fn starts_statement(stream: &TokenStream, index: usize) -> bool {
    if index == 0 {
        return true;
    }
    match stream.previous_significant(index - 1) {
        None => true,
        Some(prev) => matches!(
            stream.kind(prev),
            Some(
                TokenKind::OpenTag
                    | TokenKind::CloseTag
                    | TokenKind::InlineHtml
                    | TokenKind::Semicolon
                    | TokenKind::OpenCurly
                    | TokenKind::CloseCurly
            )
        ),
    }
}

/// Parse the significant tokens between `use` and `;` into `(alias, name)`
/// pairs. Function and constant imports yield nothing.
fn parse_imports(tokens: &[&Token]) -> Vec<(String, String)> {
    let mut imports = Vec::new();
    if tokens.first().is_some_and(|t| is_import_kind_prefix(t)) {
        return imports;
    }

    let mut i = 0;
    while i < tokens.len() {
        let path = read_path(tokens, &mut i);
        if tokens.get(i).map(|t| t.kind) == Some(TokenKind::OpenCurly) {
            i += 1;
            let prefix = path.trim_end_matches('\\');
            while i < tokens.len() && tokens[i].kind != TokenKind::CloseCurly {
                let skip = is_import_kind_prefix(tokens[i]);
                if skip {
                    i += 1;
                }
                let inner = read_path(tokens, &mut i);
                let alias = read_alias(tokens, &mut i);
                if !skip && !inner.is_empty() {
                    imports.push(import(&format!("{}\\{}", prefix, inner), alias));
                }
                // Step over the separating comma or an unexpected token.
                if i < tokens.len() && tokens[i].kind != TokenKind::CloseCurly {
                    i += 1;
                }
            }
            i += 1;
        } else {
            let alias = read_alias(tokens, &mut i);
            if !path.is_empty() {
                imports.push(import(&path, alias));
            }
        }
        // Step over the comma between top-level imports.
        i += 1;
    }
    imports
}

fn is_import_kind_prefix(token: &Token) -> bool {
    token.kind == TokenKind::Function
        || (token.kind == TokenKind::Identifier
            && (token.text.eq_ignore_ascii_case("function")
                || token.text.eq_ignore_ascii_case("const")))
}

fn read_path(tokens: &[&Token], i: &mut usize) -> String {
    let mut path = String::new();
    while let Some(token) = tokens.get(*i) {
        let part_of_name = matches!(token.kind, TokenKind::Identifier | TokenKind::NsSeparator)
            || token.kind.is_keyword();
        if !part_of_name || token.text.eq_ignore_ascii_case("as") {
            break;
        }
        path.push_str(&token.text);
        *i += 1;
    }
    path
}

fn read_alias(tokens: &[&Token], i: &mut usize) -> Option<String> {
    let keyword = tokens.get(*i)?;
    if keyword.kind != TokenKind::Identifier || !keyword.text.eq_ignore_ascii_case("as") {
        return None;
    }
    let alias = tokens.get(*i + 1)?;
    *i += 2;
    Some(alias.text.clone())
}

fn import(path: &str, alias: Option<String>) -> (String, String) {
    let name = path.trim_start_matches('\\').to_string();
    let alias = alias.unwrap_or_else(|| match name.rfind('\\') {
        Some(pos) => name[pos + 1..].to_string(),
        None => name.clone(),
    });
    (alias, name)
}
