//! PHP support for vylint.
//!
//! This crate provides:
//! - A forgiving tokenizer producing a linked [`TokenStream`]
//! - Class, method, namespace and attribute lookups over that stream
//! - The render/element pairing rule and its fixes
//!
//! ```
//! use vylint_core::diagnostic::FixMode;
//! use vylint_php::{check_source, ElMethodsRule};
//!
//! let source = "<?php\nclass Foo\n{\n    public function render() {}\n}\n";
//! let check = check_source(&ElMethodsRule::default(), source, &FixMode::Off).unwrap();
//! assert!(check.diagnostics.is_empty());
//! ```

pub mod attributes;
pub mod error;
pub mod fixer;
pub mod locator;
pub mod namespace;
pub mod naming;
pub mod params;
pub mod rule;
pub mod tokenizer;
pub mod tokens;

pub use error::{SniffError, SniffResult};
pub use rule::{check_source, fix_source, ElMethodsRule, FileCheck, FileContext, FixOutcome};
pub use tokenizer::tokenize;
pub use tokens::{Token, TokenKind, TokenStream};
