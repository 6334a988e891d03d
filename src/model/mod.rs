// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A spec holds a tree of groupings; groupings hold positions, each a slice of one game's move
//! tree addressed by tree paths.

pub mod grouping;
pub mod ids;
pub mod options;
pub mod path;
pub mod position;
pub mod spec;

pub use grouping::Grouping;
pub use ids::{GameId, Id, IdError, IdGen, PositionId};
pub use options::{
    default_problem_conditions, Appendices, AutoRotateCropPrefs, BoardRegion, BookOptions,
    DiagramOptions, DiagramType, Frontmatter, OptionsError, OutputFormat, OverrideError,
    OverrideTarget, PageSize, PositionOverride, PositionOverrideJson, ProblemConditions,
    SpecOptions,
};
pub use path::{PathError, TreePath};
pub use position::{
    Generated, Labels, ParsePositionTypeError, Position, PositionType, GAME_COMMENTARY, MAINLINE,
    PROBLEM, PROBLEM_ROOT, VARIATION,
};
pub use spec::{SgfSource, Spec, SpecError, SpecVersion};
