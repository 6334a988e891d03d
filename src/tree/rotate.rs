// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Auto-rotation: turn a record so its stones sit in the preferred corner or side.

use super::board::{board_size, points_of, region_bounds, Bounds};
use super::movetree::{MoveTree, Property};
use super::{GameTree, Point};
use crate::model::{AutoRotateCropPrefs, BoardRegion};

/// Properties whose values are points or compressed point rectangles.
const POINT_PROPERTIES: [&str; 13] =
    ["B", "W", "AB", "AW", "AE", "TR", "SQ", "CR", "MA", "SL", "TB", "TW", "DD"];
/// Properties whose values are `point:point` pairs where order matters.
const POINT_PAIR_PROPERTIES: [&str; 2] = ["AR", "LN"];

/// Clockwise quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rotation(usize);

impl Rotation {
    pub(crate) const NONE: Self = Self(0);

    fn between(from: BoardRegion, to: BoardRegion, cycle: &[BoardRegion; 4]) -> Self {
        let from = cycle.iter().position(|r| *r == from).unwrap_or(0);
        let to = cycle.iter().position(|r| *r == to).unwrap_or(0);
        Self((to + 4 - from) % 4)
    }

    pub(crate) fn apply(self, point: Point, size: usize) -> Point {
        let last = size - 1;
        (0..self.0).fold(point, |p, _| Point::new(last - p.y, p.x))
    }
}

/// Where the record's stones are, as the preferred corner/side they should be moved to.
pub(crate) fn rotation_for(tree: &MoveTree, size: usize, prefs: &AutoRotateCropPrefs) -> Rotation {
    let stones = tree
        .all_properties()
        .filter(|property| matches!(property.name(), "B" | "W" | "AB" | "AW"))
        .flat_map(|property| points_of(property.values(), size));
    let Some(content) = Bounds::enclosing(stones) else {
        return Rotation::NONE;
    };
    let fits = |region: BoardRegion| region_bounds(region, size).contains_bounds(&content);

    if fits(prefs.corner) {
        return Rotation::NONE;
    }
    if let Some(corner) = BoardRegion::CORNERS.into_iter().find(|c| fits(*c)) {
        return Rotation::between(corner, prefs.corner, &BoardRegion::CORNERS);
    }
    if fits(prefs.side) {
        return Rotation::NONE;
    }
    if let Some(side) = BoardRegion::SIDES.into_iter().find(|s| fits(*s)) {
        return Rotation::between(side, prefs.side, &BoardRegion::SIDES);
    }
    Rotation::NONE
}

fn is_square(tree: &MoveTree) -> bool {
    match tree.property(tree.root(), "SZ").and_then(|values| values.first()) {
        Some(raw) => match raw.split_once(':') {
            Some((cols, rows)) => cols.trim() == rows.trim(),
            None => true,
        },
        None => true,
    }
}

fn rotate_point_value(value: &str, rotation: Rotation, size: usize) -> String {
    Point::from_sgf(value, size)
        .map(|p| rotation.apply(p, size).to_sgf())
        .unwrap_or_else(|| value.to_owned())
}

fn rotate_property(property: &mut Property, rotation: Rotation, size: usize) {
    let name = property.name().to_owned();
    for value in property.values_mut() {
        let rotated = if POINT_PROPERTIES.contains(&name.as_str()) {
            match value.split_once(':') {
                Some((from, to)) => {
                    match (Point::from_sgf(from, size), Point::from_sgf(to, size)) {
                        (Some(a), Some(b)) => {
                            let (a, b) = (rotation.apply(a, size), rotation.apply(b, size));
                            let low = Point::new(a.x.min(b.x), a.y.min(b.y));
                            let high = Point::new(a.x.max(b.x), a.y.max(b.y));
                            format!("{}:{}", low.to_sgf(), high.to_sgf())
                        }
                        _ => continue,
                    }
                }
                None => rotate_point_value(value, rotation, size),
            }
        } else if POINT_PAIR_PROPERTIES.contains(&name.as_str()) {
            let Some((from, to)) = value.split_once(':') else {
                continue;
            };
            format!(
                "{}:{}",
                rotate_point_value(from, rotation, size),
                rotate_point_value(to, rotation, size)
            )
        } else if name == "LB" {
            let Some((at, text)) = value.split_once(':') else {
                continue;
            };
            format!("{}:{text}", rotate_point_value(at, rotation, size))
        } else {
            continue;
        };
        *value = rotated;
    }
}

pub(crate) fn auto_rotate(tree: &MoveTree, prefs: &AutoRotateCropPrefs) -> MoveTree {
    let mut rotated = tree.clone();
    let Ok(size) = board_size(tree) else {
        return rotated;
    };
    if !is_square(tree) {
        return rotated;
    }

    let rotation = rotation_for(tree, size, prefs);
    if rotation == Rotation::NONE {
        return rotated;
    }
    tracing::debug!(quarter_turns = rotation.0, "auto-rotating move tree");
    rotated.for_each_property_mut(|property| rotate_property(property, rotation, size));
    rotated
}
