// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Source-tree capability.
//!
//! Generation and rendering only talk to game records through [`GameTree`]. [`MoveTree`] is the
//! in-crate implementation: an arena tree read from (and written back to) SGF, with board replay,
//! flattening and auto-rotation.

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use crate::model::{AutoRotateCropPrefs, BoardRegion, DiagramOptions, TreePath};

mod board;
mod cache;
mod movetree;
mod problems;
mod rotate;
mod sgf;

pub use board::Bounds;
pub use cache::{CacheError, TreeCache};
pub use movetree::MoveTree;
pub use problems::{ConditionJudge, ProblemJudge, ProblemResult};
pub use sgf::SgfError;

/// Index of a node inside one tree. Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::White => "White",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A board intersection; `x` is the column, `y` the row, both from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Decodes a two-letter SGF coordinate. Out-of-board values (passes) yield `None`.
    pub fn from_sgf(value: &str, size: usize) -> Option<Self> {
        let bytes = value.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let x = sgf_coord(bytes[0])?;
        let y = sgf_coord(bytes[1])?;
        (x < size && y < size).then_some(Self { x, y })
    }

    pub fn to_sgf(self) -> String {
        let mut out = String::with_capacity(2);
        out.push(sgf_letter(self.x));
        out.push(sgf_letter(self.y));
        out
    }
}

fn sgf_coord(byte: u8) -> Option<usize> {
    match byte {
        b'a'..=b'z' => Some(usize::from(byte - b'a')),
        b'A'..=b'Z' => Some(usize::from(byte - b'A') + 26),
        _ => None,
    }
}

fn sgf_letter(coord: usize) -> char {
    // Board sizes are capped at 52, so the coordinate always fits one letter.
    let coord = coord.min(51) as u8;
    if coord < 26 {
        char::from(b'a' + coord)
    } else {
        char::from(b'A' + coord - 26)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mark {
    Triangle,
    Square,
    Circle,
    XMark,
    Label(SmolStr),
}

/// A move that landed on an already numbered intersection, e.g. `Black 7 at 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    color: Color,
    move_number: usize,
    label: String,
}

impl Collision {
    pub fn new(color: Color, move_number: usize, label: impl Into<String>) -> Self {
        Self { color, move_number, label: label.into() }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn move_number(&self) -> usize {
        self.move_number
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}", self.color, self.move_number, self.label)
    }
}

/// Board-shaping flags passed from diagram options to flattening.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlattenOptions {
    pub board_region: BoardRegion,
    pub auto_box_crop_on_variation: bool,
    pub region_restrictions: Vec<BoardRegion>,
    pub clear_marks: bool,
    pub ignore_labels: bool,
}

impl From<&DiagramOptions> for FlattenOptions {
    fn from(options: &DiagramOptions) -> Self {
        Self {
            board_region: options.board_region,
            auto_box_crop_on_variation: options.auto_box_crop_on_variation,
            region_restrictions: options.region_restrictions.clone(),
            clear_marks: options.clear_marks,
            ignore_labels: options.ignore_render_labels,
        }
    }
}

/// Everything a renderer needs to draw one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    pub(crate) size: usize,
    pub(crate) stones: BTreeMap<Point, Color>,
    pub(crate) numbers: BTreeMap<Point, usize>,
    pub(crate) marks: BTreeMap<Point, Mark>,
    pub(crate) collisions: Vec<Collision>,
    pub(crate) comment: Option<String>,
    pub(crate) is_on_main_path: bool,
    pub(crate) starting_move_num: usize,
    pub(crate) ending_move_num: usize,
    pub(crate) bounds: Bounds,
}

impl Flattened {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn stone(&self, point: Point) -> Option<Color> {
        self.stones.get(&point).copied()
    }

    pub fn stones(&self) -> &BTreeMap<Point, Color> {
        &self.stones
    }

    /// Move numbers of the stones played along the next-moves fragment.
    pub fn number(&self, point: Point) -> Option<usize> {
        self.numbers.get(&point).copied()
    }

    pub fn mark(&self, point: Point) -> Option<&Mark> {
        self.marks.get(&point)
    }

    pub fn marks(&self) -> &BTreeMap<Point, Mark> {
        &self.marks
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn is_on_main_path(&self) -> bool {
        self.is_on_main_path
    }

    pub fn starting_move_num(&self) -> usize {
        self.starting_move_num
    }

    pub fn ending_move_num(&self) -> usize {
        self.ending_move_num
    }

    /// The cropped part of the board that should be drawn.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// Read access to a game record's move tree.
///
/// Nodes are addressed by [`NodeId`]s obtained from [`GameTree::root`] and [`GameTree::child`].
pub trait GameTree {
    fn parse(sgf: &str) -> Result<Self, TreeError>
    where
        Self: Sized;

    fn to_sgf(&self) -> String;

    fn root(&self) -> NodeId;

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId>;

    fn num_children(&self, node: NodeId) -> usize;

    /// All values of property `name` on `node`, if present.
    fn property(&self, node: NodeId, name: &str) -> Option<&[String]>;

    /// A copy of the tree rotated so its stones sit in the preferred corner or side.
    fn auto_rotate(&self, prefs: &AutoRotateCropPrefs) -> Self
    where
        Self: Sized;

    fn game_name(&self) -> Option<&str> {
        self.property(self.root(), "GN")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// The node's comment; empty comments count as absent.
    fn comment(&self, node: NodeId) -> Option<&str> {
        self.property(node, "C")
            .and_then(|values| values.first())
            .map(String::as_str)
            .filter(|comment| !comment.trim().is_empty())
    }

    fn node_at(&self, path: &TreePath) -> Result<NodeId, TreeError> {
        let mut node = self.root();
        for (depth, &index) in path.into_iter().enumerate() {
            node = self.child(node, index).ok_or_else(|| TreeError::PathNotFound {
                path: path.to_initial_string(),
                depth,
            })?;
        }
        Ok(node)
    }

    /// Board state at `initial` with the moves along `fragment` numbered on top.
    fn flatten(
        &self,
        initial: &TreePath,
        fragment: &TreePath,
        options: &FlattenOptions,
    ) -> Result<Flattened, TreeError> {
        board::flatten(self, initial, fragment, options)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    Sgf(SgfError),
    PathNotFound { path: String, depth: usize },
    InvalidBoardSize { value: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sgf(err) => write!(f, "invalid SGF: {err}"),
            Self::PathNotFound { path, depth } => {
                write!(f, "path {path} leaves the move tree at depth {depth}")
            }
            Self::InvalidBoardSize { value } => write!(f, "unsupported board size SZ[{value}]"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sgf(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SgfError> for TreeError {
    fn from(value: SgfError) -> Self {
        Self::Sgf(value)
    }
}
