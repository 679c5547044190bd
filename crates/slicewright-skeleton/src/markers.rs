//! Marker-delimited preserved regions.
//!
//! A generated file is an ordered sequence of regions: structural text owned
//! by the generator, and at most one preserved block owned by the
//! implementer, delimited by literal marker lines. Splitting and merging are
//! pure functions over those region sequences; nothing here touches the
//! file system.

use thiserror::Error;

/// Literal token opening a preserved region.
pub const BEGIN_MARKER: &str = "=== BEGIN USER CODE ===";

/// Literal token closing a preserved region.
pub const END_MARKER: &str = "=== END USER CODE ===";

/// How markers are rendered as comments in the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Line-comment prefix, e.g. `#` for Python.
    pub comment_prefix: &'static str,
}

impl MarkerStyle {
    /// Python line comments.
    pub const PYTHON: MarkerStyle = MarkerStyle { comment_prefix: "#" };

    /// The begin-marker line, without indentation.
    pub fn begin_line(&self) -> String {
        format!("{} {}", self.comment_prefix, BEGIN_MARKER)
    }

    /// The end-marker line, without indentation.
    pub fn end_line(&self) -> String {
        format!("{} {}", self.comment_prefix, END_MARKER)
    }
}

/// One region of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// Generator-owned text, rewritten on every regeneration. Marker lines
    /// themselves are structural.
    Structural(String),
    /// Implementer-owned text between the markers, carried forward verbatim.
    Preserved(String),
}

/// Marker integrity failures. Any of these aborts a regeneration before a
/// single byte is written, and each doubles as a lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("begin marker is missing")]
    MissingBegin,

    #[error("end marker is missing")]
    MissingEnd,

    #[error("begin marker appears {0} times, expected exactly one")]
    DuplicateBegin(usize),

    #[error("end marker appears {0} times, expected exactly one")]
    DuplicateEnd(usize),

    #[error("end marker precedes begin marker")]
    Inverted,
}

/// Locate the begin/end marker lines, validating the pairing.
fn marker_indices(lines: &[&str], style: MarkerStyle) -> Result<(usize, usize), MarkerError> {
    let begin_line = style.begin_line();
    let end_line = style.end_line();

    let begins: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim() == begin_line)
        .map(|(i, _)| i)
        .collect();
    let ends: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim() == end_line)
        .map(|(i, _)| i)
        .collect();

    if begins.len() > 1 {
        return Err(MarkerError::DuplicateBegin(begins.len()));
    }
    if ends.len() > 1 {
        return Err(MarkerError::DuplicateEnd(ends.len()));
    }

    match (begins.first(), ends.first()) {
        (None, _) => Err(MarkerError::MissingBegin),
        (_, None) => Err(MarkerError::MissingEnd),
        (Some(&b), Some(&e)) if e < b => Err(MarkerError::Inverted),
        (Some(&b), Some(&e)) => Ok((b, e)),
    }
}

/// Split file content into its region sequence.
///
/// The result is always `[Structural, Preserved, Structural]`: head through
/// the begin-marker line, the preserved text, and the end-marker line
/// through EOF.
pub fn split_regions(content: &str, style: MarkerStyle) -> Result<Vec<Region>, MarkerError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let (begin, end) = marker_indices(&lines, style)?;

    Ok(vec![
        Region::Structural(lines[..=begin].join("\n")),
        Region::Preserved(lines[begin + 1..end].join("\n")),
        Region::Structural(lines[end..].join("\n")),
    ])
}

/// Extract the preserved text from a file, verbatim.
pub fn extract_preserved(content: &str, style: MarkerStyle) -> Result<String, MarkerError> {
    let lines: Vec<&str> = content.split('\n').collect();
    let (begin, end) = marker_indices(&lines, style)?;
    Ok(lines[begin + 1..end].join("\n"))
}

/// Splice previously captured preserved text into a freshly generated
/// skeleton, replacing the skeleton's placeholder region.
///
/// The preserved text goes in verbatim even if the new structure makes it
/// inconsistent; surfacing that is the target language compiler's job, not
/// the merger's.
pub fn merge_preserved(
    skeleton: &str,
    preserved: &str,
    style: MarkerStyle,
) -> Result<String, MarkerError> {
    let lines: Vec<&str> = skeleton.split('\n').collect();
    let (begin, end) = marker_indices(&lines, style)?;

    let mut merged = String::new();
    merged.push_str(&lines[..=begin].join("\n"));
    merged.push('\n');
    merged.push_str(preserved);
    merged.push('\n');
    merged.push_str(&lines[end..].join("\n"));
    Ok(merged)
}

/// Whether file content has a well-formed marker pair.
pub fn check_markers(content: &str, style: MarkerStyle) -> Result<(), MarkerError> {
    let lines: Vec<&str> = content.split('\n').collect();
    marker_indices(&lines, style).map(|_| ())
}
