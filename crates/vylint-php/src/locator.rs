//! Class-like scopes and the methods declared directly in them.

use serde::Serialize;

use crate::error::SniffResult;
use crate::tokens::{TokenKind, TokenStream, Visibility};

/// Kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Trait,
    Interface,
    Enum,
}

impl ClassKind {
    fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Class => Some(ClassKind::Class),
            TokenKind::Trait => Some(ClassKind::Trait),
            TokenKind::Interface => Some(ClassKind::Interface),
            TokenKind::Enum => Some(ClassKind::Enum),
            _ => None,
        }
    }
}

/// A class-like declaration with a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassScope {
    /// Index of the class-like keyword.
    pub keyword: usize,
    pub kind: ClassKind,
    /// The body's `{` and `}`.
    pub opener: usize,
    pub closer: usize,
}

impl ClassScope {
    /// The scope opened by the class-like keyword at `index`.
    ///
    /// `Ok(None)` when the declaration has no complete body.
    pub fn of(stream: &TokenStream, index: usize) -> SniffResult<Option<ClassScope>> {
        let token = stream.expect(index, "a class-like keyword", TokenKind::is_class_like)?;
        let Some(kind) = ClassKind::from_token(token.kind) else {
            return Ok(None);
        };
        let scope = token.scope_opener.and_then(|opener| {
            let closer = stream.get(opener)?.scope_closer?;
            Some(ClassScope {
                keyword: index,
                kind,
                opener,
                closer,
            })
        });
        Ok(scope)
    }

    /// Lazily enumerate the methods declared directly in this body.
    ///
    /// The iterator is cheap to clone, and every clone restarts from the
    /// position it was cloned at.
    pub fn methods<'a>(&self, stream: &'a TokenStream) -> Methods<'a> {
        Methods {
            stream,
            scope: *self,
            next: self.opener + 1,
        }
    }

    /// The first method named `name` (ASCII case-insensitive).
    pub fn find_method(
        &self,
        stream: &TokenStream,
        name: &str,
    ) -> SniffResult<Option<MethodDeclaration>> {
        for method in self.methods(stream) {
            let method = method?;
            if method
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
            {
                return Ok(Some(method));
            }
        }
        Ok(None)
    }
}

/// A method declaration found directly in a class-like body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    /// Index of the `function` keyword.
    pub index: usize,
    pub name: Option<String>,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    /// Parameter-list parentheses.
    pub params: Option<(usize, usize)>,
    /// Body braces; `None` for abstract and interface methods.
    pub body: Option<(usize, usize)>,
    pub scope: ClassScope,
}

impl MethodDeclaration {
    /// Read the declaration at a `function` keyword.
    pub fn read(
        stream: &TokenStream,
        index: usize,
        scope: ClassScope,
    ) -> SniffResult<MethodDeclaration> {
        let props = stream.method_properties(index)?;
        Ok(MethodDeclaration {
            index,
            name: stream.declaration_name(index)?.map(str::to_string),
            visibility: props.visibility,
            is_static: props.is_static,
            is_abstract: props.is_abstract,
            params: stream.params_open_close(index)?,
            body: stream.body_open_close(index)?,
            scope,
        })
    }

    /// The last token of the declaration: the body's `}`, or the `;` after an
    /// abstract signature.
    pub fn end(&self, stream: &TokenStream) -> Option<usize> {
        match (self.body, self.params) {
            (Some((_, closer)), _) => Some(closer),
            (None, Some((_, close))) => {
                stream.find_next(&[TokenKind::Semicolon], close + 1, Some(self.scope.closer))
            }
            (None, None) => None,
        }
    }
}

/// Iterator over the methods of one [`ClassScope`].
#[derive(Debug, Clone)]
pub struct Methods<'a> {
    stream: &'a TokenStream,
    scope: ClassScope,
    next: usize,
}

impl Iterator for Methods<'_> {
    type Item = SniffResult<MethodDeclaration>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self
            .stream
            .find_next(&[TokenKind::Function], self.next, Some(self.scope.closer))?;

        let method = match MethodDeclaration::read(self.stream, index, self.scope) {
            Ok(method) => method,
            Err(err) => {
                self.next = self.scope.closer;
                return Some(Err(err));
            }
        };

        self.next = match (method.body, method.params) {
            (Some((_, closer)), _) => closer + 1,
            (None, Some((_, close))) => close + 1,
            (None, None) => index + 1,
        };
        Some(Ok(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SniffError;
    use crate::tokenizer::tokenize;

    fn scope_of(stream: &TokenStream, kind: TokenKind) -> ClassScope {
        let index = stream.find_next(&[kind], 0, None).unwrap();
        ClassScope::of(stream, index).unwrap().unwrap()
    }

    fn names(stream: &TokenStream, scope: &ClassScope) -> Vec<String> {
        scope
            .methods(stream)
            .map(|m| m.unwrap().name.unwrap_or_default())
            .collect()
    }

    #[test]
    fn methods_skip_nested_bodies() {
        let stream = tokenize(
            "<?php class A {\n    public function a() { $f = function () {}; }\n    abstract protected function b(int $x);\n    private static function c() { return new class { function nested() {} }; }\n}",
        );
        let scope = scope_of(&stream, TokenKind::Class);
        assert_eq!(names(&stream, &scope), ["a", "b", "c"]);

        let methods: Vec<MethodDeclaration> =
            scope.methods(&stream).map(Result::unwrap).collect();
        assert!(methods[1].is_abstract && methods[1].body.is_none());
        assert_eq!(methods[1].visibility, Visibility::Protected);
        assert!(methods[2].is_static);
        assert_eq!(methods[2].visibility, Visibility::Private);
    }

    #[test]
    fn iteration_is_restartable() {
        let stream = tokenize("<?php trait T { function a() {} function b() {} }");
        let scope = scope_of(&stream, TokenKind::Trait);
        assert_eq!(scope.kind, ClassKind::Trait);

        let mut methods = scope.methods(&stream);
        let first = methods.next().unwrap().unwrap();
        let restart = methods.clone();
        assert_eq!(first.name.as_deref(), Some("a"));
        assert_eq!(methods.count(), 1);
        assert_eq!(restart.count(), 1);
        assert_eq!(names(&stream, &scope), ["a", "b"]);
    }

    #[test]
    fn find_method_ignores_case() {
        let stream = tokenize("<?php class A { function renderHeader() {} function HeaderEl() {} }");
        let scope = scope_of(&stream, TokenKind::Class);
        let found = scope.find_method(&stream, "headerEl").unwrap().unwrap();
        assert_eq!(found.name.as_deref(), Some("HeaderEl"));
        assert!(scope.find_method(&stream, "el").unwrap().is_none());
    }

    #[test]
    fn class_without_body_has_no_scope() {
        let stream = tokenize("<?php class A");
        let index = stream.find_next(&[TokenKind::Class], 0, None).unwrap();
        assert_eq!(ClassScope::of(&stream, index).unwrap(), None);
    }

    #[test]
    fn non_class_token_is_a_contract_violation() {
        let stream = tokenize("<?php function f() {}");
        let index = stream.find_next(&[TokenKind::Function], 0, None).unwrap();
        assert!(matches!(
            ClassScope::of(&stream, index),
            Err(SniffError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn declaration_end() {
        let stream = tokenize("<?php interface I { public function a(); }\nclass C { function b() {} }");
        let interface = scope_of(&stream, TokenKind::Interface);
        let a = interface.find_method(&stream, "a").unwrap().unwrap();
        assert_eq!(stream.kind(a.end(&stream).unwrap()), Some(TokenKind::Semicolon));

        let class = scope_of(&stream, TokenKind::Class);
        let b = class.find_method(&stream, "b").unwrap().unwrap();
        assert_eq!(a.scope.kind, ClassKind::Interface);
        assert_eq!(stream.kind(b.end(&stream).unwrap()), Some(TokenKind::CloseCurly));
    }
}
