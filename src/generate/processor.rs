// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use super::{process_game_commentary, process_problem, GenerateError, Processed};
use crate::model::{GameId, Grouping, IdGen, PositionId, PositionType, Spec, SpecOptions};
use crate::tree::{CacheError, GameTree, ProblemJudge, TreeCache};

struct Context<'a, T> {
    sgf_mapping: &'a mut BTreeMap<GameId, String>,
    options: &'a SpecOptions,
    cache: &'a mut TreeCache<T>,
    judge: &'a dyn ProblemJudge,
}

/// Expands every position of `spec` in place.
///
/// Groupings are visited depth-first. `GAME_COMMENTARY` and `PROBLEM` positions get a
/// `generated` entry keyed by their id; `EXAMPLE` positions are left alone. When generation
/// rotates a tree, the rotated record replaces the original in the game mapping and the cache.
pub fn process_spec<T: GameTree>(
    spec: &mut Spec,
    cache: &mut TreeCache<T>,
    judge: &dyn ProblemJudge,
) -> Result<(), ProcessError> {
    let (root, sgf_mapping, options) = spec.parts_mut();
    let inherited = options.position_type;
    let mut context = Context { sgf_mapping, options, cache, judge };
    let processed = process_grouping(root, inherited, &mut context)?;
    tracing::info!(positions = processed, "processed spec");
    Ok(())
}

fn process_grouping<T: GameTree>(
    grouping: &mut Grouping,
    inherited: PositionType,
    context: &mut Context<'_, T>,
) -> Result<usize, ProcessError> {
    let mut processed = 0;
    let positions = grouping.positions().to_vec();

    for position in &positions {
        let position_type = grouping.effective_type(position, inherited);
        if position_type == PositionType::Example {
            tracing::debug!(id = %position.id(), "example position kept as-is");
            continue;
        }

        let game_id = position.game_id();
        let sgf = context.sgf_mapping.get(game_id).ok_or_else(|| ProcessError::MissingGame {
            position_id: position.id().clone(),
            game_id: game_id.clone(),
        })?;
        let tree = context.cache.load(game_id, sgf)?;

        let mut id_gen = IdGen::new(position.id().as_str());
        let result: Result<Processed<T>, GenerateError> = match position_type {
            PositionType::Problem => {
                process_problem(tree, position, &mut id_gen, context.options, context.judge)
            }
            _ => process_game_commentary(tree, position, &mut id_gen, context.options),
        };
        let (generated, derived_tree) = result
            .map_err(|source| ProcessError::Generate { position_id: position.id().clone(), source })?
            .into_parts();

        if let Some(derived) = derived_tree {
            context.sgf_mapping.insert(game_id.clone(), derived.to_sgf());
            context.cache.insert(game_id.clone(), derived);
        }

        tracing::info!(
            id = %position.id(),
            position_type = %position_type,
            generated = generated.positions().len(),
            "processed position"
        );
        grouping.generated_mut().insert(position.id().clone(), generated);
        processed += 1;
    }

    let inherited = grouping.position_type().unwrap_or(inherited);
    for sub in grouping.sub_groupings_mut() {
        processed += process_grouping(sub, inherited, context)?;
    }
    Ok(processed)
}

#[derive(Debug)]
pub enum ProcessError {
    MissingGame { position_id: PositionId, game_id: GameId },
    Cache(CacheError),
    Generate { position_id: PositionId, source: GenerateError },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGame { position_id, game_id } => {
                write!(f, "position {position_id} refers to unknown game {game_id}")
            }
            Self::Cache(err) => write!(f, "{err}"),
            Self::Generate { position_id, source } => {
                write!(f, "failed to generate positions for {position_id}: {source}")
            }
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingGame { .. } => None,
            Self::Cache(err) => Some(err),
            Self::Generate { source, .. } => Some(source),
        }
    }
}

impl From<CacheError> for ProcessError {
    fn from(value: CacheError) -> Self {
        Self::Cache(value)
    }
}
