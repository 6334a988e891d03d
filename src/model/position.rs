// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smol_str::SmolStr;

use super::ids::{GameId, PositionId};
use super::path::TreePath;

pub const MAINLINE: &str = "MAINLINE";
pub const VARIATION: &str = "VARIATION";
pub const GAME_COMMENTARY: &str = "GAME_COMMENTARY";
pub const PROBLEM: &str = "PROBLEM";
pub const PROBLEM_ROOT: &str = "PROBLEM_ROOT";

/// How a position is interpreted during spec processing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionType {
    /// Rendered as-is; never expanded.
    Example,
    /// A mainline plus variations.
    #[default]
    GameCommentary,
    /// Every branch is a candidate answer judged correct or incorrect.
    Problem,
}

impl PositionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Example => "EXAMPLE",
            Self::GameCommentary => GAME_COMMENTARY,
            Self::Problem => PROBLEM,
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionType {
    type Err = ParsePositionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EXAMPLE" => Ok(Self::Example),
            GAME_COMMENTARY => Ok(Self::GameCommentary),
            PROBLEM => Ok(Self::Problem),
            other => Err(ParsePositionTypeError { value: other.to_owned() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePositionTypeError {
    value: String,
}

impl fmt::Display for ParsePositionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown position type {:?} (expected EXAMPLE, GAME_COMMENTARY or PROBLEM)",
            self.value
        )
    }
}

impl std::error::Error for ParsePositionTypeError {}

/// An insertion-ordered set of tags.
///
/// Order matters for display only; two label sets are equal when they hold the same tags.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    tags: SmallVec<[SmolStr; 2]>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tag` unless already present. Returns whether it was added.
    pub fn insert(&mut self, tag: impl Into<SmolStr>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(ToOwned::to_owned).collect()
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|tag| other.contains(tag))
    }
}

impl Eq for Labels {}

impl<S: Into<SmolStr>> FromIterator<S> for Labels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut labels = Self::new();
        for tag in iter {
            labels.insert(tag);
        }
        labels
    }
}

/// One renderable unit: a slice of a game's move tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    id: PositionId,
    game_id: GameId,
    initial_position: Option<TreePath>,
    next_moves_path: Option<TreePath>,
    position_type: Option<PositionType>,
    labels: Labels,
}

impl Position {
    pub fn new(id: PositionId, game_id: GameId) -> Self {
        Self {
            id,
            game_id,
            initial_position: None,
            next_moves_path: None,
            position_type: None,
            labels: Labels::new(),
        }
    }

    pub fn id(&self) -> &PositionId {
        &self.id
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn initial_position(&self) -> Option<&TreePath> {
        self.initial_position.as_ref()
    }

    pub fn set_initial_position(&mut self, initial_position: Option<TreePath>) {
        self.initial_position = initial_position;
    }

    pub fn next_moves_path(&self) -> Option<&TreePath> {
        self.next_moves_path.as_ref()
    }

    /// An empty fragment is stored as absent.
    pub fn set_next_moves_path(&mut self, next_moves_path: Option<TreePath>) {
        self.next_moves_path = next_moves_path.filter(|path| !path.is_empty());
    }

    pub fn position_type(&self) -> Option<PositionType> {
        self.position_type
    }

    pub fn set_position_type(&mut self, position_type: Option<PositionType>) {
        self.position_type = position_type;
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// The positions generated from one base position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    id: PositionId,
    positions: Vec<Position>,
}

impl Generated {
    pub fn new(id: PositionId) -> Self {
        Self { id, positions: Vec::new() }
    }

    pub fn id(&self) -> &PositionId {
        &self.id
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut Vec<Position> {
        &mut self.positions
    }

    /// Groups positions by every label they carry, keeping generation order inside each bucket.
    pub fn position_labels(&self) -> BTreeMap<&str, Vec<&Position>> {
        let mut out = BTreeMap::<&str, Vec<&Position>>::new();
        for position in &self.positions {
            for label in position.labels().iter() {
                out.entry(label).or_default().push(position);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{Generated, Labels, Position, PositionType, GAME_COMMENTARY, MAINLINE, VARIATION};
    use crate::model::{GameId, PositionId, TreePath};

    fn position(id: &str, labels: &[&str]) -> Position {
        Position::new(PositionId::new(id).expect("id"), GameId::new("g").expect("game id"))
            .with_labels(labels.iter().copied().collect())
    }

    #[test]
    fn labels_keep_insertion_order_but_compare_as_sets() {
        let a: Labels = [MAINLINE, GAME_COMMENTARY].into_iter().collect();
        let b: Labels = [GAME_COMMENTARY, MAINLINE, MAINLINE].into_iter().collect();
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![MAINLINE, GAME_COMMENTARY]);
        assert_eq!(b.len(), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_next_moves_are_absent() {
        let mut pos = position("p", &[]);
        pos.set_next_moves_path(Some(TreePath::new()));
        assert_eq!(pos.next_moves_path(), None);
        pos.set_next_moves_path(Some(TreePath::mainline(2)));
        assert_eq!(pos.next_moves_path(), Some(&TreePath::mainline(2)));
    }

    #[test]
    fn position_labels_bucket_in_generation_order() {
        let mut generated = Generated::new(PositionId::new("base").expect("id"));
        generated.positions_mut().extend([
            position("base-0", &[MAINLINE, GAME_COMMENTARY]),
            position("base-1", &[VARIATION, GAME_COMMENTARY]),
            position("base-2", &[MAINLINE, GAME_COMMENTARY]),
        ]);

        let by_label = generated.position_labels();
        let ids = |label: &str| {
            by_label[label].iter().map(|p| p.id().as_str()).collect::<Vec<_>>()
        };
        assert_eq!(ids(MAINLINE), vec!["base-0", "base-2"]);
        assert_eq!(ids(VARIATION), vec!["base-1"]);
        assert_eq!(ids(GAME_COMMENTARY).len(), 3);
    }

    #[test]
    fn position_type_parses_wire_names() {
        assert_eq!("PROBLEM".parse::<PositionType>(), Ok(PositionType::Problem));
        assert_eq!("EXAMPLE".parse::<PositionType>(), Ok(PositionType::Example));
        assert!("JOSEKI".parse::<PositionType>().is_err());
        assert_eq!(PositionType::GameCommentary.to_string(), "GAME_COMMENTARY");
    }
}
