// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use super::grouping::Grouping;
use super::ids::{GameId, IdError, PositionId};
use super::options::{BookOptions, DiagramOptions, OptionsError, SpecOptions};
use super::position::Position;
use crate::tree::{GameTree, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecVersion {
    #[default]
    V1,
}

impl SpecVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "V1",
        }
    }
}

/// One raw game record handed to [`Spec::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SgfSource {
    alias: Option<String>,
    contents: String,
}

impl SgfSource {
    pub fn new(contents: impl Into<String>) -> Self {
        Self { alias: None, contents: contents.into() }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// The serializable book description: groupings of positions plus the raw games they point into.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Spec {
    version: SpecVersion,
    root_grouping: Grouping,
    sgf_mapping: BTreeMap<GameId, String>,
    spec_options: SpecOptions,
    diagram_options: DiagramOptions,
    book_options: BookOptions,
}

impl Spec {
    /// An empty spec. Options are validated here so every later phase can trust them.
    pub fn new(
        spec_options: SpecOptions,
        diagram_options: DiagramOptions,
        book_options: BookOptions,
    ) -> Result<Self, SpecError> {
        spec_options.validate()?;
        diagram_options.validate()?;
        book_options.validate()?;
        Ok(Self {
            version: SpecVersion::V1,
            root_grouping: Grouping::new(),
            sgf_mapping: BTreeMap::new(),
            spec_options,
            diagram_options,
            book_options,
        })
    }

    /// Builds a spec with one position per source, all in the root grouping.
    ///
    /// Each position's id and game id is the source's alias: the caller-supplied one, else
    /// `<GN>-<i>` when the record names the game, else `sgf-<i>` (1-based).
    pub fn create<T: GameTree>(
        sources: &[SgfSource],
        spec_options: SpecOptions,
        diagram_options: DiagramOptions,
        book_options: BookOptions,
    ) -> Result<Self, SpecError> {
        let mut spec = Self::new(spec_options, diagram_options, book_options)?;
        spec.root_grouping.set_position_type(Some(spec.spec_options.position_type));

        for (idx, source) in sources.iter().enumerate() {
            if source.contents().trim().is_empty() {
                return Err(SpecError::EmptySource { index: idx });
            }

            let alias = match source.alias() {
                Some(alias) => alias.to_owned(),
                None => {
                    let tree = T::parse(source.contents())
                        .map_err(|source| SpecError::Parse { index: idx, source })?;
                    match tree.game_name() {
                        Some(name) if !name.trim().is_empty() => format!("{}-{}", name.trim(), idx + 1),
                        _ => format!("sgf-{}", idx + 1),
                    }
                }
            };

            let game_id =
                GameId::new(alias.clone()).map_err(|source| SpecError::InvalidAlias { index: idx, source })?;
            if spec.sgf_mapping.contains_key(&game_id) {
                return Err(SpecError::DuplicateAlias { alias });
            }
            let position_id = PositionId::new(alias)
                .map_err(|source| SpecError::InvalidAlias { index: idx, source })?;

            spec.sgf_mapping.insert(game_id.clone(), source.contents().to_owned());
            spec.root_grouping.positions_mut().push(Position::new(position_id, game_id));
        }

        tracing::debug!(positions = sources.len(), "created spec");
        Ok(spec)
    }

    pub fn version(&self) -> SpecVersion {
        self.version
    }

    pub fn root_grouping(&self) -> &Grouping {
        &self.root_grouping
    }

    pub fn root_grouping_mut(&mut self) -> &mut Grouping {
        &mut self.root_grouping
    }

    pub fn sgf_mapping(&self) -> &BTreeMap<GameId, String> {
        &self.sgf_mapping
    }

    pub fn sgf_mapping_mut(&mut self) -> &mut BTreeMap<GameId, String> {
        &mut self.sgf_mapping
    }

    pub fn spec_options(&self) -> &SpecOptions {
        &self.spec_options
    }

    pub fn diagram_options(&self) -> &DiagramOptions {
        &self.diagram_options
    }

    pub fn book_options(&self) -> &BookOptions {
        &self.book_options
    }

    /// Replaces the spec options after validating them.
    pub fn set_spec_options(&mut self, spec_options: SpecOptions) -> Result<(), SpecError> {
        spec_options.validate()?;
        self.spec_options = spec_options;
        Ok(())
    }

    pub fn set_diagram_options(&mut self, diagram_options: DiagramOptions) -> Result<(), SpecError> {
        diagram_options.validate()?;
        self.diagram_options = diagram_options;
        Ok(())
    }

    pub fn set_book_options(&mut self, book_options: BookOptions) -> Result<(), SpecError> {
        book_options.validate()?;
        self.book_options = book_options;
        Ok(())
    }

    /// Splits the borrow so processing can mutate groupings and the game mapping together.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (&mut Grouping, &mut BTreeMap<GameId, String>, &SpecOptions) {
        (&mut self.root_grouping, &mut self.sgf_mapping, &self.spec_options)
    }
}

#[derive(Debug)]
pub enum SpecError {
    Options(OptionsError),
    EmptySource { index: usize },
    Parse { index: usize, source: TreeError },
    InvalidAlias { index: usize, source: IdError },
    DuplicateAlias { alias: String },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Options(err) => write!(f, "invalid options: {err}"),
            Self::EmptySource { index } => write!(f, "no SGF contents for source #{}", index + 1),
            Self::Parse { index, source } => {
                write!(f, "failed to parse source #{}: {source}", index + 1)
            }
            Self::InvalidAlias { index, source } => {
                write!(f, "invalid alias for source #{}: {source}", index + 1)
            }
            Self::DuplicateAlias { alias } => write!(f, "duplicate source alias {alias:?}"),
        }
    }
}

impl std::error::Error for SpecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Options(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidAlias { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<OptionsError> for SpecError {
    fn from(value: OptionsError) -> Self {
        Self::Options(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{SgfSource, Spec, SpecError};
    use crate::model::{BookOptions, DiagramOptions, PositionType, SpecOptions};
    use crate::tree::MoveTree;

    fn create(sources: &[SgfSource]) -> Result<Spec, SpecError> {
        Spec::create::<MoveTree>(
            sources,
            SpecOptions::default(),
            DiagramOptions::default(),
            BookOptions::default(),
        )
    }

    #[test]
    fn aliases_prefer_explicit_then_game_name_then_index() {
        let spec = create(&[
            SgfSource::new("(;GM[1]GN[Honinbo];B[aa])"),
            SgfSource::new("(;GM[1];B[bb])"),
            SgfSource::new("(;GM[1]GN[ignored];W[cc])").with_alias("zed"),
        ])
        .expect("spec");

        let ids: Vec<_> =
            spec.root_grouping().positions().iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, vec!["Honinbo-1", "sgf-2", "zed"]);
        for position in spec.root_grouping().positions() {
            assert_eq!(position.id().as_str(), position.game_id().as_str());
            assert!(spec.sgf_mapping().contains_key(position.game_id()));
        }
        assert_eq!(spec.root_grouping().position_type(), Some(PositionType::GameCommentary));
    }

    #[test]
    fn rejects_duplicate_aliases_and_empty_sources() {
        let err = create(&[
            SgfSource::new("(;GM[1])").with_alias("a"),
            SgfSource::new("(;GM[1])").with_alias("a"),
        ])
        .unwrap_err();
        assert!(matches!(err, SpecError::DuplicateAlias { alias } if alias == "a"));

        let err = create(&[SgfSource::new("   ")]).unwrap_err();
        assert!(matches!(err, SpecError::EmptySource { index: 0 }));
    }

    #[test]
    fn rejects_invalid_book_options_up_front() {
        let mut book = BookOptions::default();
        book.go_intersection_size = "huge".to_owned();
        let err =
            Spec::new(SpecOptions::default(), DiagramOptions::default(), book).unwrap_err();
        assert!(matches!(err, SpecError::Options(_)));
    }
}
