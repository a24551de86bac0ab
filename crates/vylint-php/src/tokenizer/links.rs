//! Boundary links between tokens.
//!
//! Brackets are paired with a stack first. A closer that does not match the
//! innermost opener closes the nearest matching opener further out, or is
//! left unlinked when there is none. Declarations are linked afterwards by
//! walking forward from their keyword.

use crate::tokens::{Token, TokenKind};

pub(super) fn link(tokens: &mut [Token]) {
    pair_brackets(tokens);
    for i in 0..tokens.len() {
        match tokens[i].kind {
            TokenKind::Function => link_function(tokens, i),
            k if k.is_class_like() => link_class_like(tokens, i),
            _ => {}
        }
    }
}

fn closes(opener: TokenKind, closer: TokenKind) -> bool {
    matches!(
        (opener, closer),
        (TokenKind::OpenParen, TokenKind::CloseParen)
            | (TokenKind::OpenSquare, TokenKind::CloseSquare)
            | (TokenKind::AttributeOpen, TokenKind::CloseSquare)
            | (TokenKind::OpenCurly, TokenKind::CloseCurly)
    )
}

fn pair_brackets(tokens: &mut [Token]) {
    let mut stack: Vec<usize> = Vec::new();
    for i in 0..tokens.len() {
        let kind = tokens[i].kind;
        match kind {
            TokenKind::OpenParen
            | TokenKind::OpenSquare
            | TokenKind::AttributeOpen
            | TokenKind::OpenCurly => stack.push(i),
            TokenKind::CloseParen | TokenKind::CloseSquare | TokenKind::CloseCurly => {
                let Some(depth) = stack
                    .iter()
                    .rposition(|&open| closes(tokens[open].kind, kind))
                else {
                    continue;
                };
                let open = stack[depth];
                stack.truncate(depth);
                set_pair(tokens, open, i);
            }
            _ => {}
        }
    }
}

fn set_pair(tokens: &mut [Token], open: usize, close: usize) {
    let kind = tokens[open].kind;
    for index in [open, close] {
        let token = &mut tokens[index];
        match kind {
            TokenKind::OpenParen => {
                token.paren_opener = Some(open);
                token.paren_closer = Some(close);
            }
            TokenKind::AttributeOpen => {
                token.attribute_opener = Some(open);
                token.attribute_closer = Some(close);
            }
            TokenKind::OpenCurly => {
                token.scope_opener = Some(open);
                token.scope_closer = Some(close);
            }
            _ => {}
        }
    }
}

/// Link a `function` keyword to its parameter list and body.
///
/// Abstract and interface methods end in `;` and get no body link.
fn link_function(tokens: &mut [Token], index: usize) {
    let mut i = index + 1;
    let mut params = None;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::OpenParen => {
                params = tokens[i].paren_closer.map(|close| (i, close));
                break;
            }
            TokenKind::OpenCurly | TokenKind::Semicolon | TokenKind::CloseCurly => break,
            _ => i += 1,
        }
    }
    let Some((open, close)) = params else {
        return;
    };
    tokens[index].paren_opener = Some(open);
    tokens[index].paren_closer = Some(close);

    // Skip the return type and a closure's `use (...)` clause.
    let mut i = close + 1;
    while i < tokens.len() {
        match tokens[i].kind {
            TokenKind::OpenParen => match tokens[i].paren_closer {
                Some(close) => i = close + 1,
                None => return,
            },
            TokenKind::OpenCurly => {
                if let Some(body_close) = tokens[i].scope_closer {
                    tokens[index].scope_opener = Some(i);
                    tokens[index].scope_closer = Some(body_close);
                }
                return;
            }
            TokenKind::Semicolon
            | TokenKind::CloseCurly
            | TokenKind::CloseParen
            | TokenKind::Comma
            | TokenKind::DoubleArrow
            | TokenKind::Equals => return,
            _ => i += 1,
        }
    }
}

/// Link a class-like keyword to its body.
fn link_class_like(tokens: &mut [Token], index: usize) {
    let mut i = index + 1;
    while i < tokens.len() {
        match tokens[i].kind {
            // Anonymous class constructor arguments.
            TokenKind::OpenParen => match tokens[i].paren_closer {
                Some(close) => i = close + 1,
                None => return,
            },
            TokenKind::OpenCurly => {
                if let Some(close) = tokens[i].scope_closer {
                    tokens[index].scope_opener = Some(i);
                    tokens[index].scope_closer = Some(close);
                }
                return;
            }
            TokenKind::Semicolon | TokenKind::CloseCurly => return,
            _ => i += 1,
        }
    }
}
