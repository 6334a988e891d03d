// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed option bundles for the three phases: spec processing, diagram rendering and book
//! generation. Every recognized field and its default lives here; `validate` runs once when a
//! spec is built or decoded.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::{GameId, IdError};
use super::path::{PathError, TreePath};
use super::position::PositionType;

/// Property name → substrings that mark a problem node as correct.
pub type ProblemConditions = BTreeMap<String, Vec<String>>;

pub fn default_problem_conditions() -> ProblemConditions {
    let mut conditions = ProblemConditions::new();
    conditions.insert("GB".to_owned(), Vec::new());
    conditions.insert(
        "C".to_owned(),
        vec!["Correct".to_owned(), "is correct".to_owned(), "is the correct".to_owned()],
    );
    conditions
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardRegion {
    All,
    #[default]
    Auto,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl BoardRegion {
    pub const CORNERS: [Self; 4] = [Self::TopLeft, Self::TopRight, Self::BottomRight, Self::BottomLeft];
    pub const SIDES: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    pub fn is_corner(self) -> bool {
        Self::CORNERS.contains(&self)
    }

    pub fn is_side(self) -> bool {
        Self::SIDES.contains(&self)
    }
}

impl FromStr for BoardRegion {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_owned()))
            .map_err(|_| OptionsError::UnknownBoardRegion { value: s.to_owned() })
    }
}

/// Which corner/side auto-rotation should move the stones towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoRotateCropPrefs {
    pub corner: BoardRegion,
    pub side: BoardRegion,
}

impl Default for AutoRotateCropPrefs {
    fn default() -> Self {
        Self { corner: BoardRegion::TopRight, side: BoardRegion::Top }
    }
}

impl AutoRotateCropPrefs {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.corner.is_corner() || !self.side.is_side() {
            return Err(OptionsError::InvalidRotationPrefs { corner: self.corner, side: self.side });
        }
        Ok(())
    }
}

/// Which slice of the tree an override rule points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideTarget {
    /// The mainline position after this many moves.
    MoveNumber(usize),
    /// An explicit root-relative path plus fragment.
    Path { initial: TreePath, next_moves: TreePath },
}

impl OverrideTarget {
    /// Length of the full path the target resolves to.
    pub fn resolved_len(&self) -> usize {
        match self {
            Self::MoveNumber(n) => *n,
            Self::Path { initial, next_moves } => initial.len() + next_moves.len(),
        }
    }
}

/// A caller-supplied rule retargeting a generated position.
///
/// Rules are validated on construction, so an overrider built from them cannot fail later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PositionOverrideJson", into = "PositionOverrideJson")]
pub struct PositionOverride {
    game_id: GameId,
    target: OverrideTarget,
    show_previous_moves: Option<usize>,
}

impl PositionOverride {
    pub fn move_number(
        game_id: GameId,
        move_number: usize,
        show_previous_moves: Option<usize>,
    ) -> Result<Self, OverrideError> {
        Self::new(game_id, OverrideTarget::MoveNumber(move_number), show_previous_moves)
    }

    pub fn explicit(
        game_id: GameId,
        initial: TreePath,
        next_moves: TreePath,
        show_previous_moves: Option<usize>,
    ) -> Result<Self, OverrideError> {
        Self::new(game_id, OverrideTarget::Path { initial, next_moves }, show_previous_moves)
    }

    fn new(
        game_id: GameId,
        target: OverrideTarget,
        show_previous_moves: Option<usize>,
    ) -> Result<Self, OverrideError> {
        if let Some(requested) = show_previous_moves {
            let available = target.resolved_len();
            if requested > available {
                return Err(OverrideError::InsufficientHistory {
                    game_id: game_id.into_string(),
                    requested,
                    available,
                });
            }
        }
        Ok(Self { game_id, target, show_previous_moves })
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn target(&self) -> &OverrideTarget {
        &self.target
    }

    pub fn show_previous_moves(&self) -> Option<usize> {
        self.show_previous_moves
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionOverrideJson {
    game_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    move_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_moves_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show_previous_moves: Option<usize>,
}

impl TryFrom<PositionOverrideJson> for PositionOverride {
    type Error = OverrideError;

    fn try_from(json: PositionOverrideJson) -> Result<Self, Self::Error> {
        let game_id = GameId::new(json.game_id).map_err(OverrideError::InvalidGameId)?;
        let has_path = json.initial_position.is_some() || json.next_moves_path.is_some();

        match (json.move_number, has_path) {
            (Some(_), true) => Err(OverrideError::AmbiguousTarget { game_id: game_id.into_string() }),
            (None, false) => Err(OverrideError::MissingTarget { game_id: game_id.into_string() }),
            (Some(n), false) => Self::move_number(game_id, n, json.show_previous_moves),
            (None, true) => {
                let initial = TreePath::parse_initial(json.initial_position.as_deref().unwrap_or(""))
                    .map_err(OverrideError::InvalidPath)?;
                let next_moves =
                    TreePath::parse_fragment(json.next_moves_path.as_deref().unwrap_or(""))
                        .map_err(OverrideError::InvalidPath)?;
                Self::explicit(game_id, initial, next_moves, json.show_previous_moves)
            }
        }
    }
}

impl From<PositionOverride> for PositionOverrideJson {
    fn from(rule: PositionOverride) -> Self {
        let mut json = PositionOverrideJson {
            game_id: rule.game_id.into_string(),
            show_previous_moves: rule.show_previous_moves,
            ..Default::default()
        };
        match rule.target {
            OverrideTarget::MoveNumber(n) => json.move_number = Some(n),
            OverrideTarget::Path { initial, next_moves } => {
                json.initial_position = Some(initial.to_initial_string());
                if !next_moves.is_empty() {
                    json.next_moves_path = Some(next_moves.to_fragment_string());
                }
            }
        }
        json
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideError {
    InvalidGameId(IdError),
    InvalidPath(PathError),
    MissingTarget { game_id: String },
    AmbiguousTarget { game_id: String },
    InsufficientHistory { game_id: String, requested: usize, available: usize },
}

impl fmt::Display for OverrideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGameId(err) => write!(f, "invalid override game id: {err}"),
            Self::InvalidPath(err) => write!(f, "invalid override path: {err}"),
            Self::MissingTarget { game_id } => write!(
                f,
                "override for game {game_id} needs a moveNumber or an initialPosition/nextMovesPath"
            ),
            Self::AmbiguousTarget { game_id } => write!(
                f,
                "override for game {game_id} gives both a moveNumber and an explicit path"
            ),
            Self::InsufficientHistory { game_id, requested, available } => write!(
                f,
                "override for game {game_id} asks for {requested} previous moves but the target \
                 path only has {available}"
            ),
        }
    }
}

impl std::error::Error for OverrideError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGameId(err) => Some(err),
            Self::InvalidPath(err) => Some(err),
            _ => None,
        }
    }
}

/// Options for spec creation and processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecOptions {
    /// Type applied to positions whose grouping chain does not name one.
    pub position_type: PositionType,
    pub problem_conditions: ProblemConditions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_rotate_crop_prefs: Option<AutoRotateCropPrefs>,
    /// Position types that get auto-rotated when prefs are present.
    pub auto_rotate_crop_types: BTreeSet<PositionType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schemars(with = "Vec<PositionOverrideJson>")]
    pub position_overrides: Vec<PositionOverride>,
}

impl Default for SpecOptions {
    fn default() -> Self {
        Self {
            position_type: PositionType::default(),
            problem_conditions: default_problem_conditions(),
            auto_rotate_crop_prefs: None,
            auto_rotate_crop_types: BTreeSet::from([PositionType::Problem]),
            position_overrides: Vec::new(),
        }
    }
}

impl SpecOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(prefs) = &self.auto_rotate_crop_prefs {
            prefs.validate()?;
        }
        Ok(())
    }

    /// Rotation preferences, if rotation is enabled for `position_type`.
    pub fn rotation_for(&self, position_type: PositionType) -> Option<&AutoRotateCropPrefs> {
        self.auto_rotate_crop_prefs
            .as_ref()
            .filter(|_| self.auto_rotate_crop_types.contains(&position_type))
    }
}

/// Registry key selecting a diagram renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagramType(SmolStr);

impl DiagramType {
    pub const ASCII: &'static str = "ASCII";
    pub const UNICODE: &'static str = "UNICODE";

    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DiagramType {
    fn default() -> Self {
        Self::new(Self::ASCII)
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for the diagram rendering phase.
///
/// Everything except the type and the window bounds is forwarded to flattening/rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagramOptions {
    #[schemars(with = "String")]
    pub diagram_type: DiagramType,
    /// Number of leading diagrams to skip.
    pub skip_diagrams: usize,
    /// Upper bound on the global diagram cursor; absent means unlimited.
    ///
    /// `Some(0)` renders nothing. It is not a synonym for "unlimited": leave the field out of
    /// the document for that.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_diagrams: Option<usize>,
    pub board_region: BoardRegion,
    pub auto_box_crop_on_variation: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub region_restrictions: Vec<BoardRegion>,
    pub clear_marks: bool,
    pub ignore_render_labels: bool,
}

impl DiagramOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.diagram_type.as_str().trim().is_empty() {
            return Err(OptionsError::EmptyDiagramType);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    #[default]
    Latex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    A5,
    Octavo,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledgements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,
    pub generate_toc: bool,
    /// Free-form copyright page description consumed by the typesetting layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<serde_json::Value>,
    /// PDF/X-1a output; requires a color profile.
    pub pdfx1a: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_profile_file_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Appendices {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary: Option<String>,
}

/// Options for the book phase. Carried through the spec for the typesetting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BookOptions {
    pub output_format: OutputFormat,
    pub page_size: PageSize,
    /// Intersection size: bare number (pt) or with a `pt`, `in`, `mm` or `em` suffix.
    pub go_intersection_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub init: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub frontmatter: Frontmatter,
    pub appendices: Appendices,
}

impl Default for BookOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            page_size: PageSize::default(),
            go_intersection_size: "12pt".to_owned(),
            template: None,
            init: String::new(),
            title: Some("My Book".to_owned()),
            subtitle: None,
            publisher: None,
            authors: Vec::new(),
            year: None,
            frontmatter: Frontmatter::default(),
            appendices: Appendices::default(),
        }
    }
}

const POINTS_PER_INCH: f64 = 72.0;
const POINTS_PER_MM: f64 = 72.0 / 25.4;
const POINTS_PER_EM: f64 = 10.0;

impl BookOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        self.intersection_size_pt()?;
        if self.frontmatter.pdfx1a && self.frontmatter.color_profile_file_path.is_none() {
            return Err(OptionsError::MissingColorProfile);
        }
        Ok(())
    }

    /// The intersection size in points. `em` assumes a 10pt font.
    pub fn intersection_size_pt(&self) -> Result<f64, OptionsError> {
        let raw = self.go_intersection_size.trim();
        let invalid = || OptionsError::InvalidIntersectionSize { value: raw.to_owned() };

        let split = raw
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(raw.len());
        let (number, unit) = raw.split_at(split);
        let value: f64 = number.parse().map_err(|_| invalid())?;
        let scale = match unit.trim() {
            "" | "pt" => 1.0,
            "in" => POINTS_PER_INCH,
            "mm" => POINTS_PER_MM,
            "em" => POINTS_PER_EM,
            _ => return Err(invalid()),
        };
        let points = value * scale;
        if points <= 0.0 {
            return Err(invalid());
        }
        Ok(points)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    EmptyDiagramType,
    UnknownBoardRegion { value: String },
    InvalidRotationPrefs { corner: BoardRegion, side: BoardRegion },
    InvalidIntersectionSize { value: String },
    MissingColorProfile,
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDiagramType => f.write_str("diagramType must not be empty"),
            Self::UnknownBoardRegion { value } => write!(f, "unknown board region {value:?}"),
            Self::InvalidRotationPrefs { corner, side } => write!(
                f,
                "auto-rotate prefs need a corner and a side (got corner={corner:?}, side={side:?})"
            ),
            Self::InvalidIntersectionSize { value } => {
                write!(f, "goIntersectionSize {value:?} is not a positive size in pt/in/mm/em")
            }
            Self::MissingColorProfile => {
                f.write_str("pdfx1a output requires frontmatter.colorProfileFilePath")
            }
        }
    }
}

impl std::error::Error for OptionsError {}
