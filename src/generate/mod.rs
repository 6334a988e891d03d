// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Position generation.
//!
//! A base position is expanded into the ordered list of positions a book shows for it. One
//! traversal driver walks the move tree; a [`Policy`] decides where a position is recorded, how
//! it is labeled and which children are visited.
//!
//! Recording a position closes the current fragment: the next position starts where the last
//! one ended, so consecutive diagrams of one line never repeat moves.

use std::collections::VecDeque;
use std::fmt;

use crate::model::{
    Generated, IdGen, Labels, Position, PositionType, ProblemConditions, SpecOptions, TreePath,
    GAME_COMMENTARY, MAINLINE, PROBLEM, PROBLEM_ROOT, VARIATION,
};
use crate::tree::{GameTree, NodeId, ProblemJudge, ProblemResult, TreeError};

pub mod overrider;
pub mod processor;

pub use overrider::{Candidate, PositionOverrider};
pub use processor::{process_spec, ProcessError};

/// How the driver records, labels and descends.
#[derive(Clone, Copy)]
pub enum Policy<'a> {
    /// Record on comments and leaves; follow the mainline first, then variations.
    Commentary,
    /// Record on comments, leaves and the start node; judge every recorded node.
    Problem { judge: &'a dyn ProblemJudge, conditions: &'a ProblemConditions },
}

impl Policy<'_> {
    pub fn position_type(&self) -> PositionType {
        match self {
            Self::Commentary => PositionType::GameCommentary,
            Self::Problem { .. } => PositionType::Problem,
        }
    }
}

impl fmt::Debug for Policy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Commentary => f.write_str("Commentary"),
            Self::Problem { conditions, .. } => {
                f.debug_struct("Problem").field("conditions", conditions).finish_non_exhaustive()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Mainline,
    Variation,
}

impl LineKind {
    fn label(self) -> &'static str {
        match self {
            Self::Mainline => MAINLINE,
            Self::Variation => VARIATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkContext {
    Line(LineKind),
    Problem { ancestor: ProblemResult },
}

/// Traversal state for one node: where the last position ended (`prev`) and the moves since.
#[derive(Debug, Clone)]
struct Walk {
    node: NodeId,
    prev: TreePath,
    since: TreePath,
    context: WalkContext,
}

impl Walk {
    fn path_to_here(&self) -> TreePath {
        self.prev.concat(&self.since)
    }

    fn child(&self, node: NodeId, index: usize, context: WalkContext) -> Walk {
        let mut since = self.since.clone();
        since.push(index);
        Walk { node, prev: self.prev.clone(), since, context }
    }
}

/// Result of expanding one base position.
#[derive(Debug, Clone)]
pub struct Processed<T> {
    generated: Generated,
    derived_tree: Option<T>,
}

impl<T> Processed<T> {
    pub fn generated(&self) -> &Generated {
        &self.generated
    }

    /// The rotated tree the positions refer to, when rotation was applied.
    pub fn derived_tree(&self) -> Option<&T> {
        self.derived_tree.as_ref()
    }

    pub fn into_parts(self) -> (Generated, Option<T>) {
        (self.generated, self.derived_tree)
    }
}

struct Emitter<'a> {
    position: &'a Position,
    id_gen: &'a mut IdGen,
    overrider: &'a PositionOverrider,
    generated: Generated,
}

impl Emitter<'_> {
    fn emit(&mut self, prev: &TreePath, since: &TreePath, labels: Labels) {
        let full = prev.concat(since);
        let candidate = Candidate {
            game_id: self.position.game_id().clone(),
            initial: prev.clone(),
            next_moves: since.clone(),
            move_number: full.is_mainline().then_some(full.len()),
        };
        let Candidate { game_id, initial, next_moves, .. } =
            self.overrider.apply_overrides_if_necessary(candidate);

        let initial_str = initial.to_initial_string();
        let fragment_str = next_moves.to_fragment_string();
        let id = self.id_gen.next(&game_id, &initial_str, &fragment_str);
        tracing::debug!(
            id = %id,
            game_id = %game_id,
            initial = %initial_str,
            next_moves = %fragment_str,
            "generated position"
        );

        let mut position = Position::new(id, game_id).with_labels(labels);
        position.set_initial_position(Some(initial));
        position.set_next_moves_path(Some(next_moves));
        self.generated.positions_mut().push(position);
    }
}

/// Expands `position` over `tree` with the given policy.
///
/// Generation starts at the position's initial path (the root when absent). Ids come from
/// `id_gen` in emission order.
pub fn generate_positions<T: GameTree>(
    tree: &T,
    position: &Position,
    id_gen: &mut IdGen,
    overrider: &PositionOverrider,
    policy: Policy<'_>,
) -> Result<Generated, GenerateError> {
    let start_path = position.initial_position().cloned().unwrap_or_default();
    let start = tree.node_at(&start_path)?;
    let start_len = start_path.len();

    let context = match policy {
        Policy::Commentary if start_path.is_mainline() => WalkContext::Line(LineKind::Mainline),
        Policy::Commentary => WalkContext::Line(LineKind::Variation),
        Policy::Problem { .. } => WalkContext::Problem { ancestor: ProblemResult::Indeterminate },
    };

    let mut emitter = Emitter {
        position,
        id_gen,
        overrider,
        generated: Generated::new(position.id().clone()),
    };
    let mut stack = vec![Walk { node: start, prev: start_path, since: TreePath::new(), context }];
    let mut deferred = VecDeque::<Walk>::new();

    while let Some(mut walk) = stack.pop().or_else(|| deferred.pop_front()) {
        let children = tree.num_children(walk.node);
        let has_comment = tree.comment(walk.node).is_some();

        match (policy, walk.context) {
            (Policy::Commentary, WalkContext::Line(line)) => {
                if has_comment || children == 0 {
                    let labels = [line.label(), GAME_COMMENTARY].into_iter().collect();
                    emitter.emit(&walk.prev, &walk.since, labels);
                    walk.prev = walk.path_to_here();
                    walk.since = TreePath::new();
                }

                for index in 1..children {
                    if let Some(child) = tree.child(walk.node, index) {
                        deferred.push_back(Walk {
                            node: child,
                            prev: walk.path_to_here(),
                            since: TreePath::from(vec![index]),
                            context: WalkContext::Line(LineKind::Variation),
                        });
                    }
                }
                if let Some(child) = tree.child(walk.node, 0) {
                    stack.push(walk.child(child, 0, walk.context));
                }
            }
            (Policy::Problem { judge, conditions }, WalkContext::Problem { ancestor }) => {
                let tree_ref: &dyn GameTree = tree;
                let judgment = judge.judge(tree_ref, walk.node, conditions, ancestor);
                let is_start = walk.prev.len() == start_len && walk.since.is_empty();

                if has_comment || children == 0 || is_start {
                    let is_root = walk.prev.is_empty() && walk.since.is_empty();
                    let verdict = if is_root { PROBLEM_ROOT } else { judgment.as_str() };
                    let labels = [verdict, PROBLEM].into_iter().collect();
                    emitter.emit(&walk.prev, &walk.since, labels);
                    walk.prev = walk.path_to_here();
                    walk.since = TreePath::new();
                }

                let context = WalkContext::Problem { ancestor: judgment };
                for index in (0..children).rev() {
                    if let Some(child) = tree.child(walk.node, index) {
                        stack.push(walk.child(child, index, context));
                    }
                }
            }
            // The start context is derived from the policy, so they always agree.
            _ => {}
        }
    }

    Ok(emitter.generated)
}

/// Applies auto-rotation (when enabled for `position_type`) and generates on the result.
fn process_with_policy<T: GameTree>(
    tree: &T,
    position: &Position,
    id_gen: &mut IdGen,
    options: &SpecOptions,
    policy: Policy<'_>,
) -> Result<Processed<T>, GenerateError> {
    let overrider = PositionOverrider::new(options.position_overrides.clone());
    match options.rotation_for(policy.position_type()) {
        Some(prefs) => {
            let rotated = tree.auto_rotate(prefs);
            let generated = generate_positions(&rotated, position, id_gen, &overrider, policy)?;
            Ok(Processed { generated, derived_tree: Some(rotated) })
        }
        None => {
            let generated = generate_positions(tree, position, id_gen, &overrider, policy)?;
            Ok(Processed { generated, derived_tree: None })
        }
    }
}

/// Expands a game-commentary position: every commented node and every leaf.
pub fn process_game_commentary<T: GameTree>(
    tree: &T,
    position: &Position,
    id_gen: &mut IdGen,
    options: &SpecOptions,
) -> Result<Processed<T>, GenerateError> {
    process_with_policy(tree, position, id_gen, options, Policy::Commentary)
}

/// Expands a problem position: the start node, every commented node and every answer leaf.
pub fn process_problem<T: GameTree>(
    tree: &T,
    position: &Position,
    id_gen: &mut IdGen,
    options: &SpecOptions,
    judge: &dyn ProblemJudge,
) -> Result<Processed<T>, GenerateError> {
    let policy = Policy::Problem { judge, conditions: &options.problem_conditions };
    process_with_policy(tree, position, id_gen, options, policy)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    Tree(TreeError),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree(err) => write!(f, "cannot walk move tree: {err}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tree(err) => Some(err),
        }
    }
}

impl From<TreeError> for GenerateError {
    fn from(value: TreeError) -> Self {
        Self::Tree(value)
    }
}
