// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Minimal SGF (FF[4]) reader and writer.
//!
//! Only the first game tree of a collection is read. Property values are unescaped but otherwise
//! kept verbatim; interpretation (points, sizes, compressed lists) happens at the use site.

use std::fmt;

use memchr::{memchr, memchr2};
use smol_str::SmolStr;

use super::movetree::{MoveTree, Property};
use super::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SgfError {
    NoGameTree,
    UnexpectedEof { offset: usize },
    UnexpectedChar { offset: usize, ch: char },
    /// A node or property outside the first game tree's root sequence.
    MisplacedNode { offset: usize },
    InvalidPropertyIdent { offset: usize, ident: String },
}

impl fmt::Display for SgfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoGameTree => f.write_str("no game tree found"),
            Self::UnexpectedEof { offset } => write!(f, "unexpected end of input at byte {offset}"),
            Self::UnexpectedChar { offset, ch } => {
                write!(f, "unexpected character {ch:?} at byte {offset}")
            }
            Self::MisplacedNode { offset } => write!(f, "node outside a game tree at byte {offset}"),
            Self::InvalidPropertyIdent { offset, ident } => {
                write!(f, "invalid property identifier {ident:?} at byte {offset}")
            }
        }
    }
}

impl std::error::Error for SgfError {}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(byte) if byte.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> SgfError {
        match self.input[self.pos..].chars().next() {
            Some(ch) => SgfError::UnexpectedChar { offset: self.pos, ch },
            None => SgfError::UnexpectedEof { offset: self.pos },
        }
    }

    /// Reads an identifier; lowercase letters (FF[3] long names) are dropped.
    fn read_ident(&mut self) -> Result<SmolStr, SgfError> {
        let start = self.pos;
        while matches!(self.peek(), Some(byte) if byte.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let ident: String = raw.chars().filter(char::is_ascii_uppercase).collect();
        if ident.is_empty() {
            return Err(SgfError::InvalidPropertyIdent { offset: start, ident: raw.to_owned() });
        }
        Ok(SmolStr::new(ident))
    }

    /// Reads one `[...]` value; `pos` is on the opening bracket.
    fn read_value(&mut self) -> Result<String, SgfError> {
        self.pos += 1;
        let mut value = String::new();
        loop {
            let rest = &self.bytes()[self.pos..];
            let Some(found) = memchr2(b']', b'\\', rest) else {
                return Err(SgfError::UnexpectedEof { offset: self.input.len() });
            };
            value.push_str(&self.input[self.pos..self.pos + found]);
            self.pos += found;

            if rest[found] == b']' {
                self.pos += 1;
                return Ok(value);
            }

            // Escape: the next char is literal, an escaped newline is a soft line break.
            self.pos += 1;
            let Some(escaped) = self.input[self.pos..].chars().next() else {
                return Err(SgfError::UnexpectedEof { offset: self.pos });
            };
            self.pos += escaped.len_utf8();
            match escaped {
                '\n' => {
                    if self.peek() == Some(b'\r') {
                        self.pos += 1;
                    }
                }
                '\r' => {
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                }
                other => value.push(other),
            }
        }
    }
}

pub(crate) fn parse(input: &str) -> Result<MoveTree, SgfError> {
    let mut reader = Reader::new(input);
    let Some(start) = memchr(b'(', input.as_bytes()) else {
        return Err(SgfError::NoGameTree);
    };
    reader.pos = start;

    let mut tree: Option<MoveTree> = None;
    let mut current: Option<NodeId> = None;
    let mut stack: Vec<Option<NodeId>> = Vec::new();

    loop {
        reader.skip_whitespace();
        let Some(byte) = reader.peek() else {
            return Err(SgfError::UnexpectedEof { offset: reader.pos });
        };

        match byte {
            b'(' => {
                stack.push(current);
                reader.pos += 1;
            }
            b')' => {
                let Some(parent) = stack.pop() else {
                    return Err(reader.unexpected());
                };
                reader.pos += 1;
                current = parent;
                if stack.is_empty() {
                    break;
                }
            }
            b';' => {
                if stack.is_empty() {
                    return Err(SgfError::MisplacedNode { offset: reader.pos });
                }
                let node = match (tree.as_mut(), current) {
                    (Some(tree), Some(parent)) => tree.push_child(parent, Vec::new()),
                    // A second root sequence, e.g. `((;A[]))(;B[])`.
                    (Some(_), None) => return Err(SgfError::MisplacedNode { offset: reader.pos }),
                    (None, _) => {
                        let created = MoveTree::empty();
                        let root = created.root_id();
                        tree = Some(created);
                        root
                    }
                };
                current = Some(node);
                reader.pos += 1;
            }
            byte if byte.is_ascii_alphabetic() => {
                let (Some(tree), Some(node)) = (&mut tree, current) else {
                    return Err(SgfError::MisplacedNode { offset: reader.pos });
                };
                let name = reader.read_ident()?;
                let mut values = Vec::new();
                loop {
                    reader.skip_whitespace();
                    if reader.peek() != Some(b'[') {
                        break;
                    }
                    values.push(reader.read_value()?);
                }
                if values.is_empty() {
                    return Err(reader.unexpected());
                }
                tree.push_property(node, Property::new(name, values));
            }
            _ => return Err(reader.unexpected()),
        }
    }

    tree.ok_or(SgfError::NoGameTree)
}

pub(crate) fn write(tree: &MoveTree) -> String {
    let mut out = String::new();
    out.push('(');
    write_sequence(tree, tree.root_id(), &mut out);
    out.push(')');
    out
}

fn write_sequence(tree: &MoveTree, start: NodeId, out: &mut String) {
    let mut node = start;
    loop {
        out.push(';');
        for property in tree.properties(node) {
            out.push_str(property.name());
            for value in property.values() {
                out.push('[');
                push_escaped(out, value);
                out.push(']');
            }
        }

        match tree.children(node) {
            [] => return,
            [only] => node = *only,
            children => {
                for &child in children {
                    out.push('(');
                    write_sequence(tree, child, out);
                    out.push(')');
                }
                return;
            }
        }
    }
}

fn push_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        if ch == ']' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
}
