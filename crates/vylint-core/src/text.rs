//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, matching token columns

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
///
/// Columns count Unicode scalar values. Offsets inside a multi-byte
/// character are clamped back to the character start.
pub fn offset_to_char_position(content: &str, offset: usize) -> (u32, u32) {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &content[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() as u32 + 1;

    (line, col)
}

/// Detect the end-of-line sequence used by `content`.
///
/// Returns `"\r\n"` when the first line break is CRLF, `"\r"` for a lone CR,
/// and `"\n"` otherwise (including content without any line break).
pub fn detect_eol(content: &str) -> &'static str {
    match content.find(['\n', '\r']) {
        Some(i) if content[i..].starts_with("\r\n") => "\r\n",
        Some(i) if content.as_bytes()[i] == b'\r' => "\r",
        _ => "\n",
    }
}
