// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use super::{Collision, Color, FlattenOptions, Flattened, GameTree, Mark, NodeId, Point, TreeError};
use crate::model::{BoardRegion, TreePath};

pub(crate) const DEFAULT_BOARD_SIZE: usize = 19;
const MAX_BOARD_SIZE: usize = 52;
const BOX_CROP_MARGIN: usize = 2;

/// An inclusive rectangle of intersections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Bounds {
    pub fn full(size: usize) -> Self {
        let last = size.saturating_sub(1);
        Self { left: 0, top: 0, right: last, bottom: last }
    }

    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.top..=self.bottom).contains(&point.y)
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }

    /// The smallest bounds covering every point, if any.
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Self>, point| {
            Some(match acc {
                None => Self { left: point.x, top: point.y, right: point.x, bottom: point.y },
                Some(b) => Self {
                    left: b.left.min(point.x),
                    top: b.top.min(point.y),
                    right: b.right.max(point.x),
                    bottom: b.bottom.max(point.y),
                },
            })
        })
    }

    fn expanded(&self, margin: usize, size: usize) -> Self {
        let last = size.saturating_sub(1);
        Self {
            left: self.left.saturating_sub(margin),
            top: self.top.saturating_sub(margin),
            right: (self.right + margin).min(last),
            bottom: (self.bottom + margin).min(last),
        }
    }
}

/// The part of a `size` board a region covers. Halves overlap the center line by one.
pub fn region_bounds(region: BoardRegion, size: usize) -> Bounds {
    let full = Bounds::full(size);
    let last = full.right;
    let near_end = (size / 2 + 1).min(last);
    let far_start = last.saturating_sub(size / 2 + 1);

    let (cols, rows) = match region {
        BoardRegion::All | BoardRegion::Auto => return full,
        BoardRegion::Top => ((0, last), (0, near_end)),
        BoardRegion::Bottom => ((0, last), (far_start, last)),
        BoardRegion::Left => ((0, near_end), (0, last)),
        BoardRegion::Right => ((far_start, last), (0, last)),
        BoardRegion::TopLeft => ((0, near_end), (0, near_end)),
        BoardRegion::TopRight => ((far_start, last), (0, near_end)),
        BoardRegion::BottomLeft => ((0, near_end), (far_start, last)),
        BoardRegion::BottomRight => ((far_start, last), (far_start, last)),
    };
    Bounds { left: cols.0, right: cols.1, top: rows.0, bottom: rows.1 }
}

/// Picks the smallest allowed region containing `content`; the full board when none does.
fn auto_region(content: Option<Bounds>, size: usize, restrictions: &[BoardRegion]) -> Bounds {
    let full = Bounds::full(size);
    let Some(content) = content else {
        return full;
    };

    let candidates: Vec<BoardRegion> = if restrictions.is_empty() {
        BoardRegion::CORNERS.into_iter().chain(BoardRegion::SIDES).collect()
    } else {
        restrictions.to_vec()
    };

    candidates
        .into_iter()
        .map(|region| region_bounds(region, size))
        .filter(|bounds| bounds.contains_bounds(&content))
        .min_by_key(Bounds::area)
        .unwrap_or(full)
}

pub(crate) fn board_size<T: GameTree + ?Sized>(tree: &T) -> Result<usize, TreeError> {
    let Some(raw) = tree.property(tree.root(), "SZ").and_then(|values| values.first()) else {
        return Ok(DEFAULT_BOARD_SIZE);
    };
    // `SZ[19:13]` is a rectangular board; only the column count is used.
    let head = raw.split(':').next().unwrap_or_default().trim();
    match head.parse::<usize>() {
        Ok(size) if (1..=MAX_BOARD_SIZE).contains(&size) => Ok(size),
        _ => Err(TreeError::InvalidBoardSize { value: raw.clone() }),
    }
}

/// Expands point values including compressed `aa:cc` rectangles.
pub(crate) fn points_of(values: &[String], size: usize) -> Vec<Point> {
    let mut out = Vec::new();
    for value in values {
        match value.split_once(':') {
            Some((from, to)) => {
                let (Some(a), Some(b)) = (Point::from_sgf(from, size), Point::from_sgf(to, size))
                else {
                    continue;
                };
                for y in a.y.min(b.y)..=a.y.max(b.y) {
                    for x in a.x.min(b.x)..=a.x.max(b.x) {
                        out.push(Point::new(x, y));
                    }
                }
            }
            None => out.extend(Point::from_sgf(value, size)),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Board {
    size: usize,
    grid: Vec<Option<Color>>,
}

impl Board {
    pub(crate) fn new(size: usize) -> Self {
        Self { size, grid: vec![None; size * size] }
    }

    pub(crate) fn get(&self, point: Point) -> Option<Color> {
        self.grid.get(point.y * self.size + point.x).copied().flatten()
    }

    fn set(&mut self, point: Point, color: Option<Color>) {
        if let Some(cell) = self.grid.get_mut(point.y * self.size + point.x) {
            *cell = color;
        }
    }

    fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> {
        let size = self.size;
        let Point { x, y } = point;
        [
            (x > 0).then(|| Point::new(x - 1, y)),
            (x + 1 < size).then(|| Point::new(x + 1, y)),
            (y > 0).then(|| Point::new(x, y - 1)),
            (y + 1 < size).then(|| Point::new(x, y + 1)),
        ]
        .into_iter()
        .flatten()
    }

    /// The chain containing `start` and whether it has any liberty.
    fn chain(&self, start: Point) -> (Vec<Point>, bool) {
        let Some(color) = self.get(start) else {
            return (Vec::new(), true);
        };
        let mut seen = vec![false; self.grid.len()];
        let mut stack = vec![start];
        let mut stones = Vec::new();
        let mut has_liberty = false;
        seen[start.y * self.size + start.x] = true;

        while let Some(point) = stack.pop() {
            stones.push(point);
            for next in self.neighbors(point) {
                match self.get(next) {
                    None => has_liberty = true,
                    Some(c) if c == color => {
                        let idx = next.y * self.size + next.x;
                        if !seen[idx] {
                            seen[idx] = true;
                            stack.push(next);
                        }
                    }
                    Some(_) => {}
                }
            }
        }
        (stones, has_liberty)
    }

    /// Plays a stone and removes opponent chains left without liberties.
    pub(crate) fn play(&mut self, point: Point, color: Color) -> Vec<Point> {
        self.set(point, Some(color));
        let mut captured = Vec::new();
        let opponents: Vec<Point> = self
            .neighbors(point)
            .filter(|&n| self.get(n) == Some(color.opposite()))
            .collect();
        for neighbor in opponents {
            if self.get(neighbor).is_none() {
                continue;
            }
            let (stones, has_liberty) = self.chain(neighbor);
            if !has_liberty {
                for stone in &stones {
                    self.set(*stone, None);
                }
                captured.extend(stones);
            }
        }
        captured
    }

    /// Applies `AE`/`AB`/`AW` setup and then the node's move. Returns the move, if any; a pass is
    /// a move without a point.
    pub(crate) fn apply_node<T: GameTree + ?Sized>(
        &mut self,
        tree: &T,
        node: NodeId,
    ) -> Option<(Color, Option<Point>)> {
        for (name, color) in [("AE", None), ("AB", Some(Color::Black)), ("AW", Some(Color::White))] {
            if let Some(values) = tree.property(node, name) {
                for point in points_of(values, self.size) {
                    self.set(point, color);
                }
            }
        }

        for (name, color) in [("B", Color::Black), ("W", Color::White)] {
            if let Some(value) = tree.property(node, name).and_then(|values| values.first()) {
                let point = Point::from_sgf(value, self.size);
                if let Some(point) = point {
                    self.play(point, color);
                }
                return Some((color, point));
            }
        }
        None
    }

    pub(crate) fn stones(&self) -> BTreeMap<Point, Color> {
        let mut out = BTreeMap::new();
        for y in 0..self.size {
            for x in 0..self.size {
                let point = Point::new(x, y);
                if let Some(color) = self.get(point) {
                    out.insert(point, color);
                }
            }
        }
        out
    }
}

fn marks_of<T: GameTree + ?Sized>(
    tree: &T,
    node: NodeId,
    size: usize,
    options: &FlattenOptions,
) -> BTreeMap<Point, Mark> {
    let mut marks = BTreeMap::new();
    if options.clear_marks {
        return marks;
    }

    for (name, mark) in [
        ("TR", Mark::Triangle),
        ("SQ", Mark::Square),
        ("CR", Mark::Circle),
        ("MA", Mark::XMark),
    ] {
        if let Some(values) = tree.property(node, name) {
            for point in points_of(values, size) {
                marks.insert(point, mark.clone());
            }
        }
    }

    if !options.ignore_labels {
        for value in tree.property(node, "LB").unwrap_or_default() {
            let Some((at, text)) = value.split_once(':') else {
                continue;
            };
            if let Some(point) = Point::from_sgf(at, size) {
                marks.insert(point, Mark::Label(SmolStr::new(text)));
            }
        }
    }
    marks
}

pub(crate) fn flatten<T: GameTree + ?Sized>(
    tree: &T,
    initial: &TreePath,
    fragment: &TreePath,
    options: &FlattenOptions,
) -> Result<Flattened, TreeError> {
    let size = board_size(tree)?;
    let mut board = Board::new(size);
    let mut node = tree.root();
    let mut moves = usize::from(board.apply_node(tree, node).is_some());

    let full = initial.concat(fragment);
    let missing = |depth: usize| TreeError::PathNotFound { path: full.to_initial_string(), depth };

    for (depth, &index) in initial.into_iter().enumerate() {
        node = tree.child(node, index).ok_or_else(|| missing(depth))?;
        if board.apply_node(tree, node).is_some() {
            moves += 1;
        }
    }

    let initial_moves = moves;
    let mut first_move = None;
    let mut numbers = BTreeMap::<Point, usize>::new();
    let mut collisions = Vec::new();

    for (offset, &index) in fragment.into_iter().enumerate() {
        node = tree.child(node, index).ok_or_else(|| missing(initial.len() + offset))?;
        let Some((color, point)) = board.apply_node(tree, node) else {
            continue;
        };
        moves += 1;
        first_move.get_or_insert(moves);
        let Some(point) = point else {
            continue;
        };
        match numbers.get(&point) {
            Some(&earlier) => {
                let mut buf = itoa::Buffer::new();
                collisions.push(Collision::new(color, moves, buf.format(earlier)));
            }
            None => {
                numbers.insert(point, moves);
            }
        }
    }

    let stones = board.stones();
    numbers.retain(|point, _| stones.contains_key(point));
    let marks = marks_of(tree, node, size, options);
    let is_on_main_path = full.is_mainline();

    let bounds = match options.board_region {
        BoardRegion::Auto if options.auto_box_crop_on_variation && !is_on_main_path => {
            let focus = if numbers.is_empty() {
                Bounds::enclosing(stones.keys().copied())
            } else {
                Bounds::enclosing(numbers.keys().copied())
            };
            focus.map_or(Bounds::full(size), |b| b.expanded(BOX_CROP_MARGIN, size))
        }
        BoardRegion::Auto => auto_region(
            Bounds::enclosing(stones.keys().chain(marks.keys()).copied()),
            size,
            &options.region_restrictions,
        ),
        region => region_bounds(region, size),
    };

    Ok(Flattened {
        size,
        stones,
        numbers,
        marks,
        collisions,
        comment: tree.comment(node).map(str::to_owned),
        is_on_main_path,
        starting_move_num: first_move.unwrap_or(initial_moves),
        ending_move_num: moves,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{points_of, region_bounds, Board, Bounds};
    use crate::model::{BoardRegion, TreePath};
    use crate::tree::{Color, FlattenOptions, GameTree, Mark, MoveTree, Point, TreeError};

    fn flatten(sgf: &str, initial: &[usize], fragment: &[usize]) -> crate::tree::Flattened {
        let tree = MoveTree::parse(sgf).expect("parse");
        tree.flatten(
            &TreePath::from(initial.to_vec()),
            &TreePath::from(fragment.to_vec()),
            &FlattenOptions::default(),
        )
        .expect("flatten")
    }

    #[test]
    fn single_stone_capture() {
        let mut board = Board::new(9);
        board.play(Point::new(0, 0), Color::White);
        assert!(board.play(Point::new(1, 0), Color::Black).is_empty());
        let captured = board.play(Point::new(0, 1), Color::Black);
        assert_eq!(captured, vec![Point::new(0, 0)]);
        assert_eq!(board.get(Point::new(0, 0)), None);
    }

    #[test]
    fn chain_capture_removes_every_stone() {
        let mut board = Board::new(5);
        board.play(Point::new(0, 0), Color::White);
        board.play(Point::new(1, 0), Color::White);
        board.play(Point::new(2, 0), Color::Black);
        board.play(Point::new(0, 1), Color::Black);
        let captured = board.play(Point::new(1, 1), Color::Black);
        assert_eq!(captured.len(), 2);
    }

    #[test]
    fn compressed_point_lists_expand() {
        let points = points_of(&["aa:bc".to_owned(), "ee".to_owned(), "zz".to_owned()], 19);
        assert_eq!(points.len(), 7);
        assert!(points.contains(&Point::new(1, 2)));
        assert!(points.contains(&Point::new(4, 4)));
    }

    #[test]
    fn flatten_numbers_fragment_moves() {
        let flat = flatten("(;GM[1];B[aa];W[bb];B[cc];W[dd])", &[0, 0], &[0, 0]);
        assert_eq!(flat.stone(Point::new(0, 0)), Some(Color::Black));
        assert_eq!(flat.number(Point::new(0, 0)), None);
        assert_eq!(flat.number(Point::new(2, 2)), Some(3));
        assert_eq!(flat.number(Point::new(3, 3)), Some(4));
        assert_eq!((flat.starting_move_num(), flat.ending_move_num()), (3, 4));
        assert!(flat.is_on_main_path());
    }

    #[test]
    fn flatten_records_collisions_on_renumbered_points() {
        // Black 2 captures White 1; White 5 is played back on the same point.
        let sgf = "(;GM[1]SZ[9]AB[ba];W[aa];B[ab];W[bb];B[cb];W[aa])";
        let flat = flatten(sgf, &[], &[0, 0, 0, 0, 0]);
        let collisions: Vec<String> = flat.collisions().iter().map(ToString::to_string).collect();
        assert_eq!(collisions, vec!["White 5 at 1"]);
        assert_eq!(flat.stone(Point::new(0, 0)), Some(Color::White));
        assert_eq!(flat.number(Point::new(0, 0)), Some(1));
    }

    #[test]
    fn flatten_reads_marks_and_comment_of_final_node() {
        let flat = flatten("(;GM[1];B[aa]TR[bb]LB[cc:A]C[look])", &[0], &[]);
        assert_eq!(flat.mark(Point::new(1, 1)), Some(&Mark::Triangle));
        assert_eq!(flat.mark(Point::new(2, 2)), Some(&Mark::Label("A".into())));
        assert_eq!(flat.comment(), Some("look"));
        assert_eq!((flat.starting_move_num(), flat.ending_move_num()), (1, 1));
    }

    #[test]
    fn flatten_rejects_paths_outside_the_tree() {
        let tree = MoveTree::parse("(;GM[1];B[aa])").expect("parse");
        let err = tree
            .flatten(&TreePath::mainline(1), &TreePath::mainline(3), &FlattenOptions::default())
            .unwrap_err();
        assert!(matches!(err, TreeError::PathNotFound { depth: 1, .. }));
    }

    #[test]
    fn auto_region_picks_the_smallest_enclosing_region() {
        let flat = flatten("(;GM[1];B[pd];W[qc])", &[], &[0, 0]);
        assert_eq!(flat.bounds(), region_bounds(BoardRegion::TopRight, 19));

        let flat = flatten("(;GM[1];B[dd];W[pd])", &[], &[0, 0]);
        assert_eq!(flat.bounds(), region_bounds(BoardRegion::Top, 19));

        let flat = flatten("(;GM[1];B[dd];W[pp])", &[], &[0, 0]);
        assert_eq!(flat.bounds(), Bounds::full(19));
    }

    #[test]
    fn box_crop_applies_to_variations_only() {
        let tree = MoveTree::parse("(;GM[1];B[pd](;W[qc])(;W[jj]))").expect("parse");
        let options = FlattenOptions { auto_box_crop_on_variation: true, ..Default::default() };
        let flat = tree
            .flatten(&TreePath::mainline(1), &TreePath::from(vec![1]), &options)
            .expect("flatten");
        assert_eq!(flat.bounds(), Bounds { left: 7, top: 7, right: 11, bottom: 11 });
    }

    #[rstest]
    #[case(BoardRegion::TopLeft, Bounds { left: 0, top: 0, right: 10, bottom: 10 })]
    #[case(BoardRegion::BottomRight, Bounds { left: 8, top: 8, right: 18, bottom: 18 })]
    #[case(BoardRegion::Left, Bounds { left: 0, top: 0, right: 10, bottom: 18 })]
    #[case(BoardRegion::All, Bounds { left: 0, top: 0, right: 18, bottom: 18 })]
    fn region_bounds_on_full_board(#[case] region: BoardRegion, #[case] expected: Bounds) {
        assert_eq!(region_bounds(region, 19), expected);
    }
}
