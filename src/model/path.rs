// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::ops::Range;

/// A sequence of child indices locating a node in a move tree.
///
/// The same type is used for root-relative *initial* paths and for *fragments* relative to another
/// path; only the string encodings differ:
///
/// - initial path: `"<n>"` walks `n` mainline moves, further `.`-separated numbers are explicit
///   child indices once the path leaves the mainline (`[0, 0, 3, 0]` is `"2.3.0"`, the root is
///   `"0"`)
/// - fragment: runs of equal indices joined by `.`, with runs of two or more written as
///   `"<index>:<count>"` (`[0, 0, 0, 0, 0]` is `"0:5"`, the empty fragment is `""`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    indices: Vec<usize>,
}

impl TreePath {
    /// Longest path the string parsers accept. Far beyond any real game record.
    pub const MAX_LEN: usize = 100_000;

    pub fn new() -> Self {
        Self::default()
    }

    /// The path of `len` moves that always follows the first child.
    pub fn mainline(len: usize) -> Self {
        Self { indices: vec![0; len] }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Returns `self` followed by `fragment`.
    pub fn concat(&self, fragment: &TreePath) -> TreePath {
        let mut indices = Vec::with_capacity(self.len() + fragment.len());
        indices.extend_from_slice(&self.indices);
        indices.extend_from_slice(&fragment.indices);
        Self { indices }
    }

    /// Returns the sub-path covering `range`, clamped to the path length.
    pub fn slice(&self, range: Range<usize>) -> TreePath {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self { indices: self.indices[start..end].to_vec() }
    }

    /// `true` when every step takes the first child.
    pub fn is_mainline(&self) -> bool {
        self.indices.iter().all(|&index| index == 0)
    }

    pub fn to_initial_string(&self) -> String {
        let mut out = String::new();
        let mut buf = itoa::Buffer::new();
        let mut on_mainline = true;

        for (depth, &index) in self.indices.iter().enumerate() {
            if on_mainline {
                if index == 0 {
                    continue;
                }
                on_mainline = false;
                out.push_str(buf.format(depth));
            }
            out.push('.');
            out.push_str(buf.format(index));
        }

        if on_mainline {
            out.push_str(buf.format(self.len()));
        }
        out
    }

    pub fn to_fragment_string(&self) -> String {
        let mut out = String::new();
        let mut buf = itoa::Buffer::new();

        let mut rest = self.indices.as_slice();
        while let Some(&value) = rest.first() {
            let run = rest.iter().take_while(|&&index| index == value).count();
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(buf.format(value));
            if run > 1 {
                out.push(':');
                out.push_str(buf.format(run));
            }
            rest = &rest[run..];
        }
        out
    }

    /// Parses the initial-path encoding. `""` and `"0"` are both the root.
    pub fn parse_initial(input: &str) -> Result<Self, PathError> {
        let compact: String = input.chars().filter(|ch| !ch.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Self::new());
        }

        let mut segments = compact.split('.');
        let mut indices = Vec::new();

        if let Some(head) = segments.next() {
            let moves = parse_index(head, input)?;
            check_len(moves, input)?;
            indices.resize(moves, 0);
        }
        for segment in segments {
            check_len(indices.len().saturating_add(1), input)?;
            indices.push(parse_index(segment, input)?);
        }
        Ok(Self { indices })
    }

    /// Parses the fragment encoding. `""` is the empty fragment.
    pub fn parse_fragment(input: &str) -> Result<Self, PathError> {
        let compact: String = input.chars().filter(|ch| !ch.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Self::new());
        }

        let mut indices = Vec::new();
        for segment in compact.split('.') {
            match segment.split_once(':') {
                Some((value, count)) => {
                    let value = parse_index(value, input)?;
                    let count = parse_index(count, input)?;
                    check_len(indices.len().saturating_add(count), input)?;
                    indices.extend(std::iter::repeat(value).take(count));
                }
                None => {
                    check_len(indices.len().saturating_add(1), input)?;
                    indices.push(parse_index(segment, input)?);
                }
            }
        }
        Ok(Self { indices })
    }
}

impl From<Vec<usize>> for TreePath {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

impl<'a> IntoIterator for &'a TreePath {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

fn parse_index(segment: &str, input: &str) -> Result<usize, PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment { input: input.to_owned() });
    }
    segment.parse::<usize>().map_err(|_| PathError::InvalidSegment {
        input: input.to_owned(),
        segment: segment.to_owned(),
    })
}

fn check_len(len: usize, input: &str) -> Result<(), PathError> {
    if len > TreePath::MAX_LEN {
        return Err(PathError::TooLong { input: input.to_owned(), max: TreePath::MAX_LEN });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    EmptySegment { input: String },
    InvalidSegment { input: String, segment: String },
    TooLong { input: String, max: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySegment { input } => write!(f, "tree path {input:?} has an empty segment"),
            Self::InvalidSegment { input, segment } => {
                write!(f, "tree path {input:?} has a non-numeric segment {segment:?}")
            }
            Self::TooLong { input, max } => {
                write!(f, "tree path {input:?} is longer than {max} moves")
            }
        }
    }
}

impl std::error::Error for PathError {}

#[cfg(test)]
mod tests {
    use super::{PathError, TreePath};

    fn path(indices: &[usize]) -> TreePath {
        TreePath::from(indices.to_vec())
    }

    #[test]
    fn initial_paths_use_mainline_move_counts() {
        assert_eq!(TreePath::new().to_initial_string(), "0");
        assert_eq!(TreePath::mainline(16).to_initial_string(), "16");
        assert_eq!(path(&[0, 0, 3, 0]).to_initial_string(), "2.3.0");
        assert_eq!(path(&[1]).to_initial_string(), "0.1");
        assert_eq!(path(&[2, 0, 1]).to_initial_string(), "0.2.0.1");
    }

    #[test]
    fn initial_path_strings_parse_back() {
        for indices in [&[][..], &[0; 7][..], &[0, 0, 3, 0], &[1], &[0, 2, 2, 0, 1]] {
            let original = path(indices);
            let parsed = TreePath::parse_initial(&original.to_initial_string()).expect("parse");
            assert_eq!(parsed, original);
        }
        assert_eq!(TreePath::parse_initial("").expect("root"), TreePath::new());
        assert_eq!(TreePath::parse_initial(" 2 . 1 ").expect("spaces"), path(&[0, 0, 1]));
    }

    #[test]
    fn fragments_compress_runs() {
        assert_eq!(TreePath::new().to_fragment_string(), "");
        assert_eq!(path(&[0]).to_fragment_string(), "0");
        assert_eq!(TreePath::mainline(5).to_fragment_string(), "0:5");
        assert_eq!(path(&[0, 0, 1]).to_fragment_string(), "0:2.1");
        assert_eq!(path(&[1, 2, 2, 2, 0]).to_fragment_string(), "1.2:3.0");
    }

    #[test]
    fn fragment_strings_parse_back() {
        for indices in [&[][..], &[0][..], &[0; 228], &[1, 2, 2, 2, 0], &[3, 3]] {
            let original = path(indices);
            let parsed = TreePath::parse_fragment(&original.to_fragment_string()).expect("parse");
            assert_eq!(parsed, original);
        }
    }

    #[test]
    fn concat_is_associative_and_slice_splits() {
        let a = path(&[0, 1]);
        let b = path(&[2]);
        let c = path(&[0, 0]);
        assert_eq!(a.concat(&b).concat(&c), a.concat(&b.concat(&c)));

        let full = TreePath::mainline(21);
        assert_eq!(full.slice(0..16), TreePath::mainline(16));
        assert_eq!(full.slice(16..21), TreePath::mainline(5));
        assert_eq!(full.slice(16..40), TreePath::mainline(5));
    }

    #[test]
    fn mainline_detection() {
        assert!(TreePath::new().is_mainline());
        assert!(TreePath::mainline(3).is_mainline());
        assert!(!path(&[0, 1]).is_mainline());
    }

    #[test]
    fn rejects_garbage_segments() {
        assert!(matches!(
            TreePath::parse_initial("3.x"),
            Err(PathError::InvalidSegment { segment, .. }) if segment == "x"
        ));
        assert!(matches!(TreePath::parse_fragment("0:"), Err(PathError::EmptySegment { .. })));
        assert!(matches!(TreePath::parse_fragment("1..2"), Err(PathError::EmptySegment { .. })));
    }

    #[test]
    fn huge_move_counts_are_errors() {
        for input in ["18446744073709551615", "100001", "99999.1.2"] {
            assert!(
                matches!(TreePath::parse_initial(input), Err(PathError::TooLong { .. })),
                "{input}"
            );
        }
        for input in ["0:18446744073709551615", "0:100000000000", "0:100000.1"] {
            assert!(
                matches!(TreePath::parse_fragment(input), Err(PathError::TooLong { .. })),
                "{input}"
            );
        }
        let longest = TreePath::parse_fragment("0:100000").expect("at the limit");
        assert_eq!(longest.len(), TreePath::MAX_LEN);
    }
}
