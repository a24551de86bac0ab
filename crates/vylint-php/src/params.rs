//! Parameter-list text and its comparison.
//!
//! Two methods have the same parameters when the source text between their
//! parentheses is byte-identical, parentheses included. Nothing is
//! normalised: a reformatted but equivalent list is a mismatch.

use crate::error::SniffResult;
use crate::tokens::TokenStream;

/// Literal text of the parameter list of the function at `index`,
/// parentheses included. `None` when the list is incomplete.
pub fn params_content(stream: &TokenStream, index: usize) -> SniffResult<Option<&str>> {
    Ok(stream
        .params_open_close(index)?
        .map(|(open, close)| stream.text_between(open, close)))
}

/// Whether two functions declare identical parameter lists.
///
/// `None` when either list is incomplete and the two cannot be compared.
pub fn params_match(stream: &TokenStream, first: usize, second: usize) -> SniffResult<Option<bool>> {
    let first = params_content(stream, first)?;
    let second = params_content(stream, second)?;
    Ok(first.zip(second).map(|(a, b)| a == b))
}
