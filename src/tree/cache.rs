// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use super::{GameTree, MoveTree, TreeError};
use crate::model::GameId;

/// Parsed trees keyed by game id, so each record is parsed once per run.
#[derive(Debug, Clone)]
pub struct TreeCache<T = MoveTree> {
    trees: BTreeMap<GameId, T>,
}

impl<T> Default for TreeCache<T> {
    fn default() -> Self {
        Self { trees: BTreeMap::new() }
    }
}

impl<T: GameTree> TreeCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every record of a game mapping.
    pub fn from_mapping(mapping: &BTreeMap<GameId, String>) -> Result<Self, CacheError> {
        let mut cache = Self::new();
        for (game_id, sgf) in mapping {
            cache.load(game_id, sgf)?;
        }
        Ok(cache)
    }

    /// Returns the cached tree, parsing `sgf` on first use.
    pub fn load(&mut self, game_id: &GameId, sgf: &str) -> Result<&T, CacheError> {
        match self.trees.entry(game_id.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let tree = T::parse(sgf)
                    .map_err(|source| CacheError { game_id: game_id.clone(), source })?;
                tracing::debug!(game_id = %game_id, "parsed game record");
                Ok(entry.insert(tree))
            }
        }
    }

    pub fn get(&self, game_id: &GameId) -> Option<&T> {
        self.trees.get(game_id)
    }

    /// Replaces the tree for `game_id`, e.g. with a rotated copy.
    pub fn insert(&mut self, game_id: GameId, tree: T) {
        self.trees.insert(game_id, tree);
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheError {
    pub game_id: GameId,
    pub source: TreeError,
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read game {}: {}", self.game_id, self.source)
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
