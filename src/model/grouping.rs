// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::ids::PositionId;
use super::position::{Generated, Position, PositionType};

/// A node of the spec's grouping hierarchy (book, chapter, section...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    title: Option<String>,
    description: Option<String>,
    position_type: Option<PositionType>,
    positions: Vec<Position>,
    generated: BTreeMap<PositionId, Generated>,
    sub_groupings: Vec<Grouping>,
}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn position_type(&self) -> Option<PositionType> {
        self.position_type
    }

    pub fn set_position_type(&mut self, position_type: Option<PositionType>) {
        self.position_type = position_type;
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut Vec<Position> {
        &mut self.positions
    }

    pub fn generated(&self) -> &BTreeMap<PositionId, Generated> {
        &self.generated
    }

    pub fn generated_mut(&mut self) -> &mut BTreeMap<PositionId, Generated> {
        &mut self.generated
    }

    pub fn sub_groupings(&self) -> &[Grouping] {
        &self.sub_groupings
    }

    pub fn sub_groupings_mut(&mut self) -> &mut Vec<Grouping> {
        &mut self.sub_groupings
    }

    /// The type in effect for `position` inside this grouping.
    ///
    /// `inherited` is the nearest type set by an enclosing grouping (or the spec-level default).
    pub fn effective_type(&self, position: &Position, inherited: PositionType) -> PositionType {
        position
            .position_type()
            .or(self.position_type)
            .unwrap_or(inherited)
    }

    /// The positions a renderer sees, in order: generated expansions replace their owner.
    pub fn rendered_positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.positions.iter().flat_map(move |position| {
            match self.generated.get(position.id()) {
                Some(generated) => generated.positions().iter().collect::<Vec<_>>(),
                None => vec![position],
            }
        })
    }

    /// Total number of positions in this grouping and every descendant.
    pub fn position_count(&self) -> usize {
        self.positions.len()
            + self
                .sub_groupings
                .iter()
                .map(Grouping::position_count)
                .sum::<usize>()
    }
}
