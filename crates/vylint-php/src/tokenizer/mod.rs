//! A forgiving PHP tokenizer.
//!
//! [`tokenize`] never fails: anything it does not recognise becomes an
//! [`TokenKind::Operator`] token, and unterminated strings or comments run to
//! the end of the file. The token texts always tile the source exactly, so
//! byte offsets taken from tokens are valid for fixes.
//!
//! Conventions the rule relies on:
//!
//! - Whitespace is split after every line break, so the token after an
//!   opening brace that ends its line is exactly the line break.
//! - Keywords after `->`, `?->`, `::` or a namespace separator are plain
//!   identifiers (`Foo::class` does not open a class).
//! - `function` and `const` directly after `use` are identifiers.
//! - `enum` is a keyword only when a name follows it.

mod links;


use tracing::trace;

use crate::tokens::{Token, TokenKind, TokenStream};

/// Tokenize PHP source and link its brackets and declaration bodies.
pub fn tokenize(source: &str) -> TokenStream {
    let mut tokens = Lexer::new(source).run();
    demote_keywords(&mut tokens);
    links::link(&mut tokens);
    trace!(tokens = tokens.len(), "tokenized");
    TokenStream::new(source, tokens)
}

/// Multi-character operators, longest first within each shared prefix.
const OPERATORS: &[&str] = &[
    "<=>", "**=", "...", "<<=", ">>=", "===", "!==", "??=", "?->", "++", "--", "->", "=>", "::",
    "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "+=", "-=", "*=", "/=", ".=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**",
];

fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word.to_ascii_lowercase().as_str() {
        "namespace" => TokenKind::Namespace,
        "use" => TokenKind::Use,
        "class" => TokenKind::Class,
        "trait" => TokenKind::Trait,
        "interface" => TokenKind::Interface,
        "enum" => TokenKind::Enum,
        "function" => TokenKind::Function,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "static" => TokenKind::Static,
        "abstract" => TokenKind::Abstract,
        "final" => TokenKind::Final,
        "readonly" => TokenKind::Readonly,
        "return" => TokenKind::Return,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric() || !c.is_ascii()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    in_php: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            line: 1,
            column: 1,
            in_php: false,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.src.len() {
            if self.in_php {
                self.lex_php();
            } else {
                self.lex_html();
            }
        }
        self.tokens
    }

    /// Emit the next `len` bytes as one token and advance.
    fn emit(&mut self, kind: TokenKind, len: usize) {
        let len = len.max(1).min(self.src.len() - self.pos);
        let mut end = self.pos + len;
        while !self.src.is_char_boundary(end) {
            end += 1;
        }
        let text = &self.src[self.pos..end];
        let index = self.tokens.len();
        self.tokens
            .push(Token::new(index, kind, text, self.pos, self.line, self.column));

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\n' => {
                    self.line += 1;
                    self.column = 1;
                }
                '\r' if chars.peek() != Some(&'\n') => {
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.column += 1,
            }
        }
        self.pos = end;
    }

    fn lex_html(&mut self) {
        let rest = self.rest();
        if let Some(tag) = open_tag(rest) {
            self.emit(TokenKind::OpenTag, tag);
            self.in_php = true;
            return;
        }
        let len = next_open_tag(rest).unwrap_or(rest.len());
        self.emit(TokenKind::InlineHtml, len);
    }

    fn lex_php(&mut self) {
        let rest = self.rest();
        let Some(c) = self.peek() else {
            return;
        };

        if c.is_whitespace() {
            self.lex_whitespace();
            return;
        }

        if rest.starts_with("?>") {
            // The tag swallows one directly following line break.
            let len = if rest[2..].starts_with("\r\n") {
                4
            } else if rest[2..].starts_with('\n') {
                3
            } else {
                2
            };
            self.emit(TokenKind::CloseTag, len);
            self.in_php = false;
            return;
        }

        if rest.starts_with("#[") {
            self.emit(TokenKind::AttributeOpen, 2);
            return;
        }
        if rest.starts_with('#') || rest.starts_with("//") {
            self.emit(TokenKind::Comment, line_comment_len(rest));
            return;
        }
        if rest.starts_with("/*") {
            let doc = rest.starts_with("/**") && rest[3..].starts_with(char::is_whitespace);
            let len = rest[2..].find("*/").map(|i| i + 4).unwrap_or(rest.len());
            let kind = if doc {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            };
            self.emit(kind, len);
            return;
        }

        if c == '$' && rest[1..].starts_with(is_ident_start) {
            let len = 1 + ident_len(&rest[1..]);
            self.emit(TokenKind::Variable, len);
            return;
        }

        if is_ident_start(c) {
            let len = ident_len(rest);
            let word = &rest[..len];
            let followed_by_separator = rest[len..].starts_with('\\');
            let kind = match keyword(word) {
                Some(kind) if !followed_by_separator => kind,
                _ => TokenKind::Identifier,
            };
            self.emit(kind, len);
            return;
        }

        if c.is_ascii_digit() || (c == '.' && rest[1..].starts_with(|d: char| d.is_ascii_digit()))
        {
            let len = rest
                .find(|d: char| !(d.is_ascii_alphanumeric() || d == '_' || d == '.'))
                .unwrap_or(rest.len());
            self.emit(TokenKind::Number, len);
            return;
        }

        match c {
            '\'' | '"' | '`' => {
                self.emit(TokenKind::StringLiteral, quoted_len(rest, c));
                return;
            }
            '\\' => {
                self.emit(TokenKind::NsSeparator, 1);
                return;
            }
            _ => {}
        }

        if rest.starts_with("<<<") {
            if let Some(len) = heredoc_len(rest) {
                self.emit(TokenKind::StringLiteral, len);
                return;
            }
        }

        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            let kind = match *op {
                "->" | "?->" => TokenKind::Arrow,
                "=>" => TokenKind::DoubleArrow,
                "::" => TokenKind::DoubleColon,
                "..." => TokenKind::Ellipsis,
                _ => TokenKind::Operator,
            };
            self.emit(kind, op.len());
            return;
        }

        let kind = match c {
            '{' => TokenKind::OpenCurly,
            '}' => TokenKind::CloseCurly,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '[' => TokenKind::OpenSquare,
            ']' => TokenKind::CloseSquare,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '&' => TokenKind::Ampersand,
            '=' => TokenKind::Equals,
            _ => TokenKind::Operator,
        };
        self.emit(kind, c.len_utf8());
    }

    /// One whitespace token per line: a run ends right after a line break.
    fn lex_whitespace(&mut self) {
        let rest = self.rest();
        let mut len = 0;
        let mut chars = rest.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if !c.is_whitespace() {
                break;
            }
            len = i + c.len_utf8();
            if c == '\n' {
                break;
            }
            if c == '\r' {
                if let Some(&(j, '\n')) = chars.peek() {
                    len = j + 1;
                }
                break;
            }
        }
        self.emit(TokenKind::Whitespace, len);
    }
}

/// Length of an opening tag at the start of `s`.
fn open_tag(s: &str) -> Option<usize> {
    if s.get(..5).is_some_and(|tag| tag.eq_ignore_ascii_case("<?php")) {
        let after = &s[5..];
        if after.is_empty() || after.starts_with(char::is_whitespace) {
            return Some(5);
        }
    }
    if s.starts_with("<?=") {
        return Some(3);
    }
    if s.starts_with("<?") {
        return Some(2);
    }
    None
}

fn next_open_tag(s: &str) -> Option<usize> {
    s.match_indices("<?")
        .map(|(i, _)| i)
        .find(|&i| i > 0 && open_tag(&s[i..]).is_some())
}

fn ident_len(s: &str) -> usize {
    s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len())
}

/// Single-line comments end before the line break or a closing tag.
fn line_comment_len(s: &str) -> usize {
    let mut end = s.find(['\n', '\r']).unwrap_or(s.len());
    if let Some(tag) = s[..end].find("?>") {
        end = tag;
    }
    end
}

/// Length of a quoted string including both quotes, honouring escapes.
fn quoted_len(s: &str, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return i + c.len_utf8();
        }
    }
    s.len()
}

/// Length of a heredoc or nowdoc through its closing label.
fn heredoc_len(s: &str) -> Option<usize> {
    let header_end = s.find('\n')?;
    let header = s[3..header_end].trim();
    let label = header.trim_matches(|c| c == '\'' || c == '"');
    if label.is_empty() || !label.starts_with(is_ident_start) || ident_len(label) != label.len() {
        return None;
    }

    let mut line_start = header_end + 1;
    while line_start <= s.len() {
        let line_end = s[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(s.len());
        let line = &s[line_start..line_end];
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(label) {
            if !after.starts_with(is_ident_char) {
                let indent = line.len() - trimmed.len();
                return Some(line_start + indent + label.len());
            }
        }
        if line_end == s.len() {
            break;
        }
        line_start = line_end + 1;
    }
    Some(s.len())
}

/// Context-sensitive keyword fixups that need neighbouring tokens.
fn demote_keywords(tokens: &mut [Token]) {
    let mut previous: Option<TokenKind> = None;
    for i in 0..tokens.len() {
        let kind = tokens[i].kind;
        if kind.is_trivia() {
            continue;
        }
        if kind.is_keyword() {
            let demote = match previous {
                Some(TokenKind::Arrow | TokenKind::DoubleColon | TokenKind::NsSeparator) => true,
                Some(TokenKind::Use) => matches!(kind, TokenKind::Function),
                _ => false,
            };
            let bare_enum = kind == TokenKind::Enum && !followed_by_name(tokens, i);
            if demote || bare_enum {
                tokens[i].kind = TokenKind::Identifier;
            }
        }
        previous = Some(tokens[i].kind);
    }
}

fn followed_by_name(tokens: &[Token], index: usize) -> bool {
    tokens[index + 1..]
        .iter()
        .find(|t| !t.kind.is_trivia())
        .is_some_and(|t| t.kind == TokenKind::Identifier || t.kind.is_keyword())
}
