// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{GameId, OverrideTarget, PositionOverride, TreePath};

/// A position about to be emitted, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub game_id: GameId,
    pub initial: TreePath,
    pub next_moves: TreePath,
    /// Set when the full path stays on the mainline.
    pub move_number: Option<usize>,
}

impl Candidate {
    pub fn full_path(&self) -> TreePath {
        self.initial.concat(&self.next_moves)
    }
}

/// Retargets generated positions according to caller-supplied rules.
#[derive(Debug, Clone, Default)]
pub struct PositionOverrider {
    rules: Vec<PositionOverride>,
}

impl PositionOverrider {
    pub fn new(rules: Vec<PositionOverride>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PositionOverride] {
        &self.rules
    }

    fn find_rule(&self, candidate: &Candidate) -> Option<&PositionOverride> {
        let full = candidate.full_path();
        self.rules.iter().find(|rule| {
            rule.game_id() == &candidate.game_id
                && match rule.target() {
                    OverrideTarget::MoveNumber(n) => candidate.move_number == Some(*n),
                    OverrideTarget::Path { initial, next_moves } => {
                        initial.concat(next_moves) == full
                    }
                }
        })
    }

    /// Returns `candidate` with its paths replaced by the first matching rule, or unchanged.
    pub fn apply_overrides_if_necessary(&self, candidate: Candidate) -> Candidate {
        let Some(rule) = self.find_rule(&candidate) else {
            return candidate;
        };

        let target = match rule.target() {
            OverrideTarget::MoveNumber(n) => TreePath::mainline(*n),
            OverrideTarget::Path { initial, next_moves } => initial.concat(next_moves),
        };
        let (initial, next_moves) = match rule.show_previous_moves() {
            Some(n) => {
                let split = target.len().saturating_sub(n);
                (target.slice(0..split), target.slice(split..target.len()))
            }
            None => (target, TreePath::new()),
        };

        tracing::debug!(
            game_id = %candidate.game_id,
            initial = %initial.to_initial_string(),
            next_moves = %next_moves.to_fragment_string(),
            "applied position override"
        );
        Candidate { initial, next_moves, ..candidate }
    }
}
