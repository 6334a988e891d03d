// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::{GameTree, NodeId};
use crate::model::ProblemConditions;

/// Judgment of a problem node, also used as a position label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemResult {
    Correct,
    Incorrect,
    Indeterminate,
}

impl ProblemResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "CORRECT",
            Self::Incorrect => "INCORRECT",
            Self::Indeterminate => "INDETERMINATE",
        }
    }
}

impl fmt::Display for ProblemResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a node of a problem tree is correct.
pub trait ProblemJudge {
    fn judge(
        &self,
        tree: &dyn GameTree,
        node: NodeId,
        conditions: &ProblemConditions,
        ancestor: ProblemResult,
    ) -> ProblemResult;
}

impl<F> ProblemJudge for F
where
    F: Fn(&dyn GameTree, NodeId, &ProblemConditions, ProblemResult) -> ProblemResult,
{
    fn judge(
        &self,
        tree: &dyn GameTree,
        node: NodeId,
        conditions: &ProblemConditions,
        ancestor: ProblemResult,
    ) -> ProblemResult {
        self(tree, node, conditions, ancestor)
    }
}

/// Judges nodes by property conditions.
///
/// A node satisfies the conditions when one of the listed properties is present and, if the
/// property lists substrings, one of its values contains one of them. A node that does not
/// satisfy them is correct when every line below it reaches a node that does, incorrect when no
/// line does, and indeterminate otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionJudge;

impl ConditionJudge {
    fn matches(tree: &dyn GameTree, node: NodeId, conditions: &ProblemConditions) -> bool {
        conditions.iter().any(|(name, substrings)| {
            tree.property(node, name).is_some_and(|values| {
                substrings.is_empty()
                    || values
                        .iter()
                        .any(|value| substrings.iter().any(|needle| value.contains(needle.as_str())))
            })
        })
    }

    /// Whether the line from `start` down to each leaf (following every branch) passes a
    /// satisfying node, in leaf order.
    fn lines_reaching_correct(
        tree: &dyn GameTree,
        start: NodeId,
        conditions: &ProblemConditions,
    ) -> Vec<bool> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if Self::matches(tree, node, conditions) {
                out.push(true);
                continue;
            }
            let children = tree.num_children(node);
            if children == 0 {
                out.push(false);
                continue;
            }
            for index in (0..children).rev() {
                if let Some(child) = tree.child(node, index) {
                    stack.push(child);
                }
            }
        }
        out
    }
}

impl ProblemJudge for ConditionJudge {
    fn judge(
        &self,
        tree: &dyn GameTree,
        node: NodeId,
        conditions: &ProblemConditions,
        _ancestor: ProblemResult,
    ) -> ProblemResult {
        if Self::matches(tree, node, conditions) {
            return ProblemResult::Correct;
        }
        let lines = Self::lines_reaching_correct(tree, node, conditions);
        let correct = lines.iter().filter(|&&reached| reached).count();
        if correct == 0 {
            ProblemResult::Incorrect
        } else if correct == lines.len() {
            ProblemResult::Correct
        } else {
            ProblemResult::Indeterminate
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{ConditionJudge, ProblemJudge, ProblemResult};
    use crate::model::{default_problem_conditions, ProblemConditions, TreePath};
    use crate::tree::{GameTree, MoveTree, NodeId};

    #[fixture]
    fn problem() -> MoveTree {
        MoveTree::parse(
            "(;GM[1]AB[aa]C[Black to play]\
             (;B[bb]C[Correct!])\
             (;B[cc];W[dd](;B[ee]C[That is correct])(;B[ff]))\
             (;B[gg]))",
        )
        .expect("parse")
    }

    fn judge(tree: &MoveTree, path: &[usize], conditions: &ProblemConditions) -> ProblemResult {
        let node = tree.node_at(&TreePath::from(path.to_vec())).expect("node");
        ConditionJudge.judge(tree, node, conditions, ProblemResult::Indeterminate)
    }

    #[rstest]
    #[case(&[0], ProblemResult::Correct)]
    #[case(&[1], ProblemResult::Indeterminate)]
    #[case(&[1, 0, 0], ProblemResult::Correct)]
    #[case(&[1, 0, 1], ProblemResult::Incorrect)]
    #[case(&[2], ProblemResult::Incorrect)]
    #[case(&[], ProblemResult::Indeterminate)]
    fn judges_by_comment_substrings(
        problem: MoveTree,
        #[case] path: &[usize],
        #[case] expected: ProblemResult,
    ) {
        assert_eq!(judge(&problem, path, &default_problem_conditions()), expected);
    }

    #[test]
    fn empty_substring_list_means_property_present() {
        let tree = MoveTree::parse("(;GM[1](;B[aa]GB[1])(;B[bb]GW[1]))").expect("parse");
        let conditions = default_problem_conditions();
        assert_eq!(judge(&tree, &[0], &conditions), ProblemResult::Correct);
        assert_eq!(judge(&tree, &[1], &conditions), ProblemResult::Incorrect);
    }

    #[test]
    fn closures_can_judge() {
        let tree = MoveTree::parse("(;GM[1])").expect("parse");
        let always_wrong = |_: &dyn GameTree, _: NodeId, _: &ProblemConditions, _: ProblemResult| {
            ProblemResult::Incorrect
        };
        let verdict = always_wrong.judge(
            &tree,
            tree.root(),
            &default_problem_conditions(),
            ProblemResult::Correct,
        );
        assert_eq!(verdict, ProblemResult::Incorrect);
    }
}
