//! The token stream and its positional query API.
//!
//! A [`TokenStream`] is built once per file by the tokenizer and is
//! read-only afterwards. Tokens carry explicit optional boundary links
//! instead of an open-ended property bag: a `function` or class-like keyword
//! and its braces know their body, a `function` keyword and its parentheses
//! know the parameter list, and `#[` and its matching `]` know each other.
//!
//! Lookups that only make sense for one token kind (parameter lists, method
//! modifiers, ...) return [`SniffError::UnexpectedToken`] when called on
//! anything else. Missing links are not errors; they surface as `None`.

use serde::Serialize;

use crate::error::{SniffError, SniffResult};

/// Token kinds produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    InlineHtml,
    OpenTag,
    CloseTag,
    Whitespace,
    Comment,
    DocComment,
    Variable,
    Identifier,
    NsSeparator,
    StringLiteral,
    Number,

    // Keywords
    Namespace,
    Use,
    Class,
    Trait,
    Interface,
    Enum,
    Function,
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Readonly,
    Return,

    // Punctuation
    AttributeOpen,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    Semicolon,
    Comma,
    Colon,
    DoubleColon,
    Arrow,
    DoubleArrow,
    Ellipsis,
    Question,
    Ampersand,
    Equals,
    Operator,
}

impl TokenKind {
    /// Whitespace and comments.
    pub const TRIVIA: [TokenKind; 3] = [
        TokenKind::Whitespace,
        TokenKind::Comment,
        TokenKind::DocComment,
    ];

    /// Keywords that open a class-like body.
    pub const CLASS_LIKE: [TokenKind; 4] = [
        TokenKind::Class,
        TokenKind::Trait,
        TokenKind::Interface,
        TokenKind::Enum,
    ];

    pub fn is_trivia(self) -> bool {
        Self::TRIVIA.contains(&self)
    }

    pub fn is_class_like(self) -> bool {
        Self::CLASS_LIKE.contains(&self)
    }

    /// Member modifiers that may precede `function`.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Abstract
                | TokenKind::Final
                | TokenKind::Readonly
        )
    }

    pub fn is_keyword(self) -> bool {
        self.is_class_like()
            || self.is_modifier()
            || matches!(
                self,
                TokenKind::Namespace | TokenKind::Use | TokenKind::Function | TokenKind::Return
            )
    }
}

/// One token. Immutable once the stream is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Position in the stream.
    pub index: usize,
    pub kind: TokenKind,
    /// Literal source text.
    pub text: String,
    /// Byte offset of the first byte.
    pub offset: usize,
    /// 1-indexed line of the first character.
    pub line: u32,
    /// 1-indexed column (in characters) of the first character.
    pub column: u32,
    /// Body braces, on the owning keyword and on both braces.
    pub scope_opener: Option<usize>,
    pub scope_closer: Option<usize>,
    /// Parameter/argument parentheses, on a `function` keyword and on both parens.
    pub paren_opener: Option<usize>,
    pub paren_closer: Option<usize>,
    /// Attribute block, on `#[` and on its closing `]`.
    pub attribute_opener: Option<usize>,
    pub attribute_closer: Option<usize>,
}

impl Token {
    /// Create an unlinked token.
    pub fn new(
        index: usize,
        kind: TokenKind,
        text: impl Into<String>,
        offset: usize,
        line: u32,
        column: u32,
    ) -> Self {
        Token {
            index,
            kind,
            text: text.into(),
            offset,
            line,
            column,
            scope_opener: None,
            scope_closer: None,
            paren_opener: None,
            paren_closer: None,
            attribute_opener: None,
            attribute_closer: None,
        }
    }

    /// Byte offset one past the last byte.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Whether this whitespace token finishes its line.
    pub fn ends_line(&self) -> bool {
        self.kind == TokenKind::Whitespace && (self.text.ends_with('\n') || self.text.ends_with('\r'))
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// The PHP keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// Modifiers of a method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodProperties {
    /// Declared visibility; `Public` when none is written.
    pub visibility: Visibility,
    pub visibility_specified: bool,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

/// One parameter of a parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Variable name including the `$` sigil.
    pub name: String,
    pub variadic: bool,
    pub by_reference: bool,
    /// Raw text of the whole parameter, trimmed.
    pub content: String,
}

impl Parameter {
    /// The name without its sigil.
    pub fn bare_name(&self) -> &str {
        self.name.strip_prefix('$').unwrap_or(&self.name)
    }
}

/// The tokens of one file plus the source they were cut from.
#[derive(Debug, Clone)]
pub struct TokenStream {
    source: String,
    tokens: Vec<Token>,
    eol: &'static str,
}

impl TokenStream {
    /// Wrap already linked tokens. Token texts must tile `source` in order.
    pub fn new(source: impl Into<String>, tokens: Vec<Token>) -> Self {
        let source = source.into();
        let eol = vylint_core::text::detect_eol(&source);
        debug_assert!(tokens.iter().enumerate().all(|(i, t)| t.index == i));
        debug_assert_eq!(
            tokens.iter().map(|t| t.text.len()).sum::<usize>(),
            source.len()
        );
        TokenStream {
            source,
            tokens,
            eol,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// The file's end-of-line sequence.
    pub fn eol(&self) -> &'static str {
        self.eol
    }

    /// The kind of the token at `index`, if any.
    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    /// Fetch a token, requiring it to satisfy `accept`.
    pub fn expect(
        &self,
        index: usize,
        expected: &'static str,
        accept: impl Fn(TokenKind) -> bool,
    ) -> SniffResult<&Token> {
        match self.tokens.get(index) {
            Some(token) if accept(token.kind) => Ok(token),
            other => Err(SniffError::UnexpectedToken {
                index,
                expected,
                found: other.map(|t| t.kind),
            }),
        }
    }

    fn expect_function(&self, index: usize) -> SniffResult<&Token> {
        self.expect(index, "a function keyword", |k| k == TokenKind::Function)
    }

    // ------------------------------------------------------------------------
    // Bounded searches
    // ------------------------------------------------------------------------

    /// First token in `[start, end)` whose kind is in `kinds`.
    ///
    /// `end` defaults to the end of the stream.
    pub fn find_next(&self, kinds: &[TokenKind], start: usize, end: Option<usize>) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// First token in `[start, end)` whose kind is NOT in `kinds`.
    pub fn find_next_excluding(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| !kinds.contains(&self.tokens[i].kind))
    }

    /// Last token in `[end, start]` (searching backwards from `start`) whose
    /// kind is in `kinds`. `end` defaults to the first token.
    pub fn find_previous(
        &self,
        kinds: &[TokenKind],
        start: usize,
        end: Option<usize>,
    ) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        let end = end.unwrap_or(0);
        if end > start {
            return None;
        }
        (end..=start)
            .rev()
            .find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// Next non-trivia token at or after `start`.
    pub fn next_significant(&self, start: usize) -> Option<usize> {
        self.find_next_excluding(&TokenKind::TRIVIA, start, None)
    }

    /// Previous non-trivia token at or before `start`.
    pub fn previous_significant(&self, start: usize) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        (0..=start).rev().find(|&i| !self.tokens[i].kind.is_trivia())
    }

    /// Source text from the start of `first` to the end of `last`, inclusive.
    ///
    /// Returns an empty string when `last < first` or `first` is out of range.
    pub fn text_between(&self, first: usize, last: usize) -> &str {
        if last < first || first >= self.tokens.len() {
            return "";
        }
        let last = last.min(self.tokens.len() - 1);
        &self.source[self.tokens[first].offset..self.tokens[last].end()]
    }

    /// Index of the first token on the line of token `index`.
    pub fn first_token_on_line(&self, index: usize) -> usize {
        let Some(token) = self.tokens.get(index) else {
            return index;
        };
        let mut i = index;
        while i > 0 && self.tokens[i - 1].line == token.line && !self.tokens[i - 1].ends_line() {
            i -= 1;
        }
        i
    }

    /// Leading whitespace of the line containing token `index`.
    pub fn line_indent(&self, index: usize) -> &str {
        let first = self.first_token_on_line(index);
        match self.tokens.get(first) {
            Some(t) if t.kind == TokenKind::Whitespace && !t.ends_line() => &t.text,
            _ => "",
        }
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    /// Name declared by a `function` or class-like keyword.
    ///
    /// `None` for closures, anonymous classes and incomplete input.
    pub fn declaration_name(&self, index: usize) -> SniffResult<Option<&str>> {
        let token = self.expect(index, "a function or class-like keyword", |k| {
            k == TokenKind::Function || k.is_class_like()
        })?;
        let mut next = self.next_significant(index + 1);
        if token.kind == TokenKind::Function {
            // function &name()
            if let Some(i) = next.filter(|&i| self.tokens[i].kind == TokenKind::Ampersand) {
                next = self.next_significant(i + 1);
            }
        }
        Ok(next.map(|i| &self.tokens[i]).and_then(|t| {
            let named = t.kind == TokenKind::Identifier || t.kind.is_keyword();
            named.then_some(t.text.as_str())
        }))
    }

    /// Modifiers written before a `function` keyword.
    pub fn method_properties(&self, index: usize) -> SniffResult<MethodProperties> {
        self.expect_function(index)?;
        let mut props = MethodProperties {
            visibility: Visibility::Public,
            visibility_specified: false,
            is_static: false,
            is_abstract: false,
            is_final: false,
        };
        for token in self.tokens[..index].iter().rev() {
            match token.kind {
                k if k.is_trivia() => continue,
                TokenKind::Public => props.visibility = Visibility::Public,
                TokenKind::Protected => props.visibility = Visibility::Protected,
                TokenKind::Private => props.visibility = Visibility::Private,
                TokenKind::Static => props.is_static = true,
                TokenKind::Abstract => props.is_abstract = true,
                TokenKind::Final => props.is_final = true,
                TokenKind::Readonly => {}
                _ => break,
            }
            if matches!(
                token.kind,
                TokenKind::Public | TokenKind::Protected | TokenKind::Private
            ) {
                props.visibility_specified = true;
            }
        }
        Ok(props)
    }

    /// Parentheses of a function's parameter list.
    pub fn params_open_close(&self, index: usize) -> SniffResult<Option<(usize, usize)>> {
        let token = self.expect_function(index)?;
        Ok(token.paren_opener.and_then(|opener| {
            let closer = self.tokens[opener].paren_closer?;
            Some((opener, closer))
        }))
    }

    /// Braces of a function's body. `None` for abstract methods.
    pub fn body_open_close(&self, index: usize) -> SniffResult<Option<(usize, usize)>> {
        let token = self.expect_function(index)?;
        Ok(token.scope_opener.and_then(|opener| {
            let closer = self.tokens[opener].scope_closer?;
            Some((opener, closer))
        }))
    }

    /// Parameters of a function, in declaration order.
    ///
    /// Returns an empty list when the parameter list is incomplete.
    pub fn method_parameters(&self, index: usize) -> SniffResult<Vec<Parameter>> {
        let Some((opener, closer)) = self.params_open_close(index)? else {
            return Ok(Vec::new());
        };

        let mut params = Vec::new();
        let mut depth = 0usize;
        let mut segment_start = opener + 1;
        for i in opener + 1..=closer {
            let kind = self.tokens[i].kind;
            match kind {
                TokenKind::OpenParen
                | TokenKind::OpenSquare
                | TokenKind::OpenCurly
                | TokenKind::AttributeOpen => depth += 1,
                TokenKind::CloseParen | TokenKind::CloseSquare | TokenKind::CloseCurly
                    if depth > 0 =>
                {
                    depth -= 1
                }
                _ => {}
            }
            let at_end = i == closer;
            if at_end || (kind == TokenKind::Comma && depth == 0) {
                if let Some(param) = self.parameter(segment_start, i) {
                    params.push(param);
                }
                segment_start = i + 1;
            }
        }
        Ok(params)
    }

    /// Parse the parameter whose tokens are `[start, end)`.
    fn parameter(&self, start: usize, end: usize) -> Option<Parameter> {
        let mut depth = 0usize;
        let mut variadic = false;
        let mut by_reference = false;
        for i in start..end {
            let token = &self.tokens[i];
            match token.kind {
                TokenKind::OpenParen
                | TokenKind::OpenSquare
                | TokenKind::OpenCurly
                | TokenKind::AttributeOpen => depth += 1,
                TokenKind::CloseParen | TokenKind::CloseSquare | TokenKind::CloseCurly => {
                    depth = depth.saturating_sub(1)
                }
                TokenKind::Ellipsis if depth == 0 => variadic = true,
                TokenKind::Ampersand if depth == 0 => by_reference = true,
                TokenKind::Variable if depth == 0 => {
                    return Some(Parameter {
                        name: token.text.clone(),
                        variadic,
                        by_reference,
                        content: self.text_between(start, end - 1).trim().to_string(),
                    });
                }
                _ => {}
            }
        }
        None
    }
}
