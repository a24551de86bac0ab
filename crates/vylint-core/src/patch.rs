//! Patch IR: Span, Edit, Changeset for atomic source fixes.
//!
//! This module implements the patch infrastructure used by rule fixes:
//! - Byte spans and edits against one file's content
//! - Conflict detection (overlapping spans)
//! - Atomic apply semantics (all-or-nothing, guarded by a content hash)
//! - Materialization into output edits with line/column positions

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

use crate::text::offset_to_char_position;

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Spans
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn at(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Adjacent spans (one ends where another starts) do NOT overlap, and a
    /// zero-width span never overlaps anything.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a changeset could not be built or applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// Two edits have overlapping spans.
    #[error("overlapping edits: {first} and {second}")]
    OverlappingEdits { first: Span, second: Span },

    /// An edit span extends beyond the content.
    #[error("span {span} is out of bounds for content of length {len}")]
    SpanOutOfBounds { span: Span, len: usize },

    /// An edit boundary splits a UTF-8 character.
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    /// The content differs from the content the changeset was built against.
    #[error("content hash mismatch: expected {expected}, got {actual}")]
    BaseMismatch {
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Two changesets built against different contents were merged.
    #[error("cannot merge changesets built against different contents")]
    MergeBaseMismatch,
}

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

// ============================================================================
// Edit Operations
// ============================================================================

/// The kind of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Insert text at `span.start` (span is empty).
    Insert,
    /// Delete the bytes in `span`.
    Delete,
    /// Replace the bytes in `span` with new text.
    Replace,
}

/// A single text change in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Insertion order, used as the final tie-breaker when sorting.
    pub seq: u32,
    /// The kind of operation.
    pub kind: EditKind,
    /// The byte range the edit covers.
    pub span: Span,
    /// The new text (empty for Delete).
    pub text: String,
}

impl Edit {
    fn sort_key(&self) -> (usize, bool, u32) {
        // Insertions at an offset come before a replacement starting there.
        (self.span.start, !self.span.is_empty(), self.seq)
    }
}

// ============================================================================
// Changeset
// ============================================================================

/// Accumulates edits against one content snapshot.
///
/// Edits may be added in any order; [`ChangesetBuilder::finish`] sorts and
/// validates them.
#[derive(Debug, Clone)]
pub struct ChangesetBuilder {
    base: ContentHash,
    len: usize,
    edits: Vec<Edit>,
}

impl ChangesetBuilder {
    /// Start a changeset against `content`.
    pub fn new(content: &str) -> Self {
        ChangesetBuilder {
            base: ContentHash::compute(content.as_bytes()),
            len: content.len(),
            edits: Vec::new(),
        }
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) -> &mut Self {
        self.push(EditKind::Insert, Span::at(offset), text.into())
    }

    /// Replace the bytes in `span` with `text`.
    pub fn replace(&mut self, span: Span, text: impl Into<String>) -> &mut Self {
        self.push(EditKind::Replace, span, text.into())
    }

    /// Delete the bytes in `span`.
    pub fn delete(&mut self, span: Span) -> &mut Self {
        self.push(EditKind::Delete, span, String::new())
    }

    /// Number of edits recorded so far.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Check if no edit was recorded.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn push(&mut self, kind: EditKind, span: Span, text: String) -> &mut Self {
        let seq = self.edits.len() as u32;
        self.edits.push(Edit {
            seq,
            kind,
            span,
            text,
        });
        self
    }

    /// Sort the edits and reject overlaps or out-of-bounds spans.
    pub fn finish(self) -> PatchResult<Changeset> {
        let mut edits = self.edits;
        edits.sort_by_key(Edit::sort_key);
        validate(&edits, self.len)?;
        Ok(Changeset {
            base: self.base,
            edits,
        })
    }
}

fn validate(edits: &[Edit], len: usize) -> PatchResult<()> {
    for edit in edits {
        if edit.span.end > len {
            return Err(PatchError::SpanOutOfBounds {
                span: edit.span,
                len,
            });
        }
    }
    for pair in edits.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        // Sorted by start, so only neighbours can overlap first.
        if a.span.overlaps(&b.span) || (!a.span.is_empty() && b.span.start < a.span.end) {
            return Err(PatchError::OverlappingEdits {
                first: a.span,
                second: b.span,
            });
        }
    }
    Ok(())
}

/// An ordered set of non-overlapping edits, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changeset {
    /// Hash of the content the edits were computed against.
    pub base: ContentHash,
    /// The edits, sorted by start offset.
    pub edits: Vec<Edit>,
}

impl Changeset {
    /// Check if this changeset contains any edits.
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Get the number of edits in this changeset.
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Combine two changesets built against the same content.
    ///
    /// Fails without modifying either side if any spans overlap.
    pub fn merge(&self, other: &Changeset) -> PatchResult<Changeset> {
        if self.base != other.base {
            return Err(PatchError::MergeBaseMismatch);
        }
        let offset = self.edits.len() as u32;
        let mut edits = self.edits.clone();
        edits.extend(other.edits.iter().cloned().map(|mut e| {
            e.seq += offset;
            e
        }));
        edits.sort_by_key(Edit::sort_key);
        validate(&edits, usize::MAX)?;
        Ok(Changeset {
            base: self.base.clone(),
            edits,
        })
    }

    /// Apply this changeset to `content`, producing the new text.
    ///
    /// Either every edit applies or an error is returned and nothing changes.
    pub fn apply(&self, content: &str) -> PatchResult<String> {
        let actual = ContentHash::compute(content.as_bytes());
        if actual != self.base {
            return Err(PatchError::BaseMismatch {
                expected: self.base.clone(),
                actual,
            });
        }
        validate(&self.edits, content.len())?;
        for edit in &self.edits {
            for offset in [edit.span.start, edit.span.end] {
                if !content.is_char_boundary(offset) {
                    return Err(PatchError::NotCharBoundary { offset });
                }
            }
        }

        let extra: usize = self.edits.iter().map(|e| e.text.len()).sum();
        let mut out = String::with_capacity(content.len() + extra);
        let mut cursor = 0;
        for edit in &self.edits {
            out.push_str(&content[cursor..edit.span.start]);
            out.push_str(&edit.text);
            cursor = edit.span.end;
        }
        out.push_str(&content[cursor..]);
        Ok(out)
    }

    /// Materialize this changeset into output edits for display.
    pub fn materialize(&self, content: &str) -> Vec<OutputEdit> {
        self.edits
            .iter()
            .map(|edit| {
                let old_text = content
                    .get(edit.span.start..edit.span.end)
                    .unwrap_or_default()
                    .to_string();
                let (line, col) = offset_to_char_position(content, edit.span.start);
                OutputEdit {
                    kind: edit.kind,
                    span: edit.span,
                    old_text,
                    new_text: edit.text.clone(),
                    line,
                    col,
                }
            })
            .collect()
    }
}

/// A single edit as it appears in output (for JSON serialization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEdit {
    /// The kind of operation.
    pub kind: EditKind,
    /// Byte range being replaced.
    pub span: Span,
    /// Original text.
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
    /// 1-indexed line number (for display).
    pub line: u32,
    /// 1-indexed column (for display).
    pub col: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_content() -> &'static str {
        "class Foo\n{\n    public function render() {}\n}\n"
    }

    mod span_tests {
        use super::*;

        #[test]
        fn span_overlap_detection() {
            let span1 = Span::new(10, 20);
            let span2 = Span::new(15, 25);
            let span3 = Span::new(20, 30);

            assert!(span1.overlaps(&span2));
            assert!(span2.overlaps(&span1));

            // Adjacent spans don't overlap
            assert!(!span1.overlaps(&span3));
            assert!(!span3.overlaps(&span1));
        }

        #[test]
        fn zero_width_span_never_overlaps() {
            let point = Span::at(15);
            assert!(!point.overlaps(&Span::new(10, 20)));
            assert!(!Span::new(10, 20).overlaps(&point));
            assert!(Span::new(10, 20).contains(&point));
        }

        #[test]
        #[should_panic(expected = "must be <= end")]
        fn span_new_invalid_range_panics() {
            let _ = Span::new(5, 3);
        }
    }

    mod builder_tests {
        use super::*;

        #[test]
        fn finish_sorts_edits_by_offset() {
            let content = test_content();
            let mut builder = ChangesetBuilder::new(content);
            builder.replace(Span::new(6, 9), "Bar");
            builder.insert(0, "<?php\n");
            let changeset = builder.finish().unwrap();

            assert_eq!(changeset.edits[0].span, Span::at(0));
            assert_eq!(changeset.edits[1].span, Span::new(6, 9));
        }

        #[test]
        fn finish_rejects_overlapping_replacements() {
            let mut builder = ChangesetBuilder::new(test_content());
            builder.replace(Span::new(0, 5), "a");
            builder.replace(Span::new(3, 8), "b");

            assert_eq!(
                builder.finish(),
                Err(PatchError::OverlappingEdits {
                    first: Span::new(0, 5),
                    second: Span::new(3, 8),
                })
            );
        }

        #[test]
        fn finish_rejects_insert_inside_replacement() {
            let mut builder = ChangesetBuilder::new(test_content());
            builder.replace(Span::new(0, 5), "a");
            builder.insert(3, "b");

            assert!(matches!(
                builder.finish(),
                Err(PatchError::OverlappingEdits { .. })
            ));
        }

        #[test]
        fn finish_rejects_out_of_bounds() {
            let content = test_content();
            let mut builder = ChangesetBuilder::new(content);
            builder.delete(Span::new(0, content.len() + 1));

            assert!(matches!(
                builder.finish(),
                Err(PatchError::SpanOutOfBounds { .. })
            ));
        }
    }

    mod apply_tests {
        use super::*;

        #[test]
        fn apply_replaces_and_inserts_in_one_pass() {
            let content = test_content();
            let mut builder = ChangesetBuilder::new(content);
            builder.replace(Span::new(6, 9), "Bar");
            builder.insert(0, "<?php\n");
            let changeset = builder.finish().unwrap();

            let result = changeset.apply(content).unwrap();
            assert_eq!(
                result,
                "<?php\nclass Bar\n{\n    public function render() {}\n}\n"
            );
        }

        #[test]
        fn insert_at_replacement_start_goes_first() {
            let content = "abc";
            let mut builder = ChangesetBuilder::new(content);
            builder.replace(Span::new(1, 2), "X");
            builder.insert(1, "-");
            let changeset = builder.finish().unwrap();

            assert_eq!(changeset.apply(content).unwrap(), "a-Xc");
        }

        #[test]
        fn inserts_at_same_offset_keep_insertion_order() {
            let content = "ab";
            let mut builder = ChangesetBuilder::new(content);
            builder.insert(1, "1");
            builder.insert(1, "2");
            let changeset = builder.finish().unwrap();

            assert_eq!(changeset.apply(content).unwrap(), "a12b");
        }

        #[test]
        fn apply_fails_on_changed_content() {
            let mut builder = ChangesetBuilder::new("abc");
            builder.delete(Span::new(0, 1));
            let changeset = builder.finish().unwrap();

            assert!(matches!(
                changeset.apply("abd"),
                Err(PatchError::BaseMismatch { .. })
            ));
        }

        #[test]
        fn apply_rejects_split_characters() {
            let content = "é";
            let mut builder = ChangesetBuilder::new(content);
            builder.insert(1, "x");
            let changeset = builder.finish().unwrap();

            assert_eq!(
                changeset.apply(content),
                Err(PatchError::NotCharBoundary { offset: 1 })
            );
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn merge_combines_disjoint_changesets() {
            let content = "one two three";
            let mut a = ChangesetBuilder::new(content);
            a.replace(Span::new(8, 13), "3");
            let mut b = ChangesetBuilder::new(content);
            b.replace(Span::new(0, 3), "1");

            let merged = a.finish().unwrap().merge(&b.finish().unwrap()).unwrap();
            assert_eq!(merged.edit_count(), 2);
            assert_eq!(merged.apply(content).unwrap(), "1 two 3");
        }

        #[test]
        fn merge_rejects_overlap() {
            let content = "one two three";
            let mut a = ChangesetBuilder::new(content);
            a.replace(Span::new(0, 7), "x");
            let mut b = ChangesetBuilder::new(content);
            b.replace(Span::new(4, 13), "y");

            assert!(matches!(
                a.finish().unwrap().merge(&b.finish().unwrap()),
                Err(PatchError::OverlappingEdits { .. })
            ));
        }

        #[test]
        fn merge_rejects_different_bases() {
            let a = ChangesetBuilder::new("a").finish().unwrap();
            let b = ChangesetBuilder::new("b").finish().unwrap();
            assert_eq!(a.merge(&b), Err(PatchError::MergeBaseMismatch));
        }
    }

    mod materialize_tests {
        use super::*;

        #[test]
        fn materialize_reports_old_text_and_position() {
            let content = test_content();
            let mut builder = ChangesetBuilder::new(content);
            // "render" on line 3
            let start = content.find("render").unwrap();
            builder.replace(Span::new(start, start + 6), "renderHeader");
            let edits = builder.finish().unwrap().materialize(content);

            assert_eq!(edits.len(), 1);
            assert_eq!(edits[0].old_text, "render");
            assert_eq!(edits[0].new_text, "renderHeader");
            assert_eq!((edits[0].line, edits[0].col), (3, 21));
        }

        #[test]
        fn changeset_serializes_deterministically() {
            let mut builder = ChangesetBuilder::new("abc");
            builder.insert(3, "d");
            let changeset = builder.finish().unwrap();

            let json1 = serde_json::to_string(&changeset).unwrap();
            let json2 = serde_json::to_string(&changeset.clone()).unwrap();
            assert_eq!(json1, json2);
            assert!(json1.contains("\"kind\":\"insert\""));
        }
    }
}
