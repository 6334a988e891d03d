// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::model::{
    BookOptions, DiagramOptions, GameId, Generated, Grouping, Position, PositionId, PositionType,
    Spec, SpecOptions, SpecVersion, TreePath,
};

fn default_version() -> String {
    SpecVersion::V1.as_str().to_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SpecJson {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    root_grouping: GroupingJson,
    #[serde(default, alias = "gameMapping")]
    sgf_mapping: BTreeMap<String, String>,
    #[serde(default)]
    spec_options: SpecOptions,
    #[serde(default)]
    diagram_options: DiagramOptions,
    #[serde(default)]
    book_options: BookOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct GroupingJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, alias = "sgfType", skip_serializing_if = "Option::is_none")]
    position_type: Option<PositionType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    positions: Vec<PositionJson>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    generated: BTreeMap<String, GeneratedJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sub_groupings: Vec<GroupingJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct PositionJson {
    id: String,
    #[serde(alias = "alias")]
    game_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial_position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_moves_path: Option<String>,
    #[serde(default, alias = "sgfType", skip_serializing_if = "Option::is_none")]
    position_type: Option<PositionType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct GeneratedJson {
    id: String,
    #[serde(default)]
    positions: Vec<PositionJson>,
}

/// Serializes `spec` as pretty-printed JSON.
pub fn to_json_string(spec: &Spec) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&spec_to_json(spec))
        .map_err(|source| StoreError::Json { path: None, source })
}

/// Parses and validates a JSON spec.
pub fn from_json_str(text: &str) -> Result<Spec, StoreError> {
    decode(text)
}

/// The JSON schema of the spec document.
pub fn spec_json_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(SpecJson);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}

pub(super) fn decode(text: &str) -> Result<Spec, StoreError> {
    let spec_json: SpecJson =
        serde_json::from_str(text).map_err(|source| StoreError::Json { path: None, source })?;
    spec_from_json(spec_json)
}

fn spec_to_json(spec: &Spec) -> SpecJson {
    SpecJson {
        version: spec.version().as_str().to_owned(),
        root_grouping: grouping_to_json(spec.root_grouping()),
        sgf_mapping: spec
            .sgf_mapping()
            .iter()
            .map(|(game_id, sgf)| (game_id.to_string(), sgf.clone()))
            .collect(),
        spec_options: spec.spec_options().clone(),
        diagram_options: spec.diagram_options().clone(),
        book_options: spec.book_options().clone(),
    }
}

fn grouping_to_json(grouping: &Grouping) -> GroupingJson {
    GroupingJson {
        title: grouping.title().map(ToOwned::to_owned),
        description: grouping.description().map(ToOwned::to_owned),
        position_type: grouping.position_type(),
        positions: grouping.positions().iter().map(position_to_json).collect(),
        generated: grouping
            .generated()
            .iter()
            .map(|(id, generated)| {
                let json = GeneratedJson {
                    id: generated.id().to_string(),
                    positions: generated.positions().iter().map(position_to_json).collect(),
                };
                (id.to_string(), json)
            })
            .collect(),
        sub_groupings: grouping.sub_groupings().iter().map(grouping_to_json).collect(),
    }
}

fn position_to_json(position: &Position) -> PositionJson {
    PositionJson {
        id: position.id().to_string(),
        game_id: position.game_id().to_string(),
        initial_position: position.initial_position().map(TreePath::to_initial_string),
        next_moves_path: position.next_moves_path().map(TreePath::to_fragment_string),
        position_type: position.position_type(),
        labels: position.labels().to_vec(),
    }
}

fn spec_from_json(spec_json: SpecJson) -> Result<Spec, StoreError> {
    if spec_json.version != SpecVersion::V1.as_str() {
        return Err(StoreError::UnsupportedVersion { version: spec_json.version });
    }

    let mut spec =
        Spec::new(spec_json.spec_options, spec_json.diagram_options, spec_json.book_options)?;

    for (alias, sgf) in spec_json.sgf_mapping {
        let game_id = GameId::new(alias.clone()).map_err(|source| StoreError::InvalidId {
            field: "sgfMapping key",
            value: alias,
            source: Box::new(source),
        })?;
        spec.sgf_mapping_mut().insert(game_id, sgf);
    }

    *spec.root_grouping_mut() = grouping_from_json(spec_json.root_grouping)?;
    Ok(spec)
}

fn grouping_from_json(grouping_json: GroupingJson) -> Result<Grouping, StoreError> {
    let mut grouping = Grouping::new();
    grouping.set_title(grouping_json.title);
    grouping.set_description(grouping_json.description);
    grouping.set_position_type(grouping_json.position_type);

    for position_json in grouping_json.positions {
        grouping.positions_mut().push(position_from_json(position_json)?);
    }

    for (id, generated_json) in grouping_json.generated {
        let key = PositionId::new(id.clone()).map_err(|source| StoreError::InvalidId {
            field: "generated key",
            value: id,
            source: Box::new(source),
        })?;
        let generated_id =
            PositionId::new(generated_json.id.clone()).map_err(|source| StoreError::InvalidId {
                field: "generated[].id",
                value: generated_json.id,
                source: Box::new(source),
            })?;

        let mut generated = Generated::new(generated_id);
        for position_json in generated_json.positions {
            generated.positions_mut().push(position_from_json(position_json)?);
        }
        grouping.generated_mut().insert(key, generated);
    }

    for sub_json in grouping_json.sub_groupings {
        grouping.sub_groupings_mut().push(grouping_from_json(sub_json)?);
    }
    Ok(grouping)
}

fn position_from_json(position_json: PositionJson) -> Result<Position, StoreError> {
    let id = PositionId::new(position_json.id.clone()).map_err(|source| StoreError::InvalidId {
        field: "positions[].id",
        value: position_json.id,
        source: Box::new(source),
    })?;
    let game_id =
        GameId::new(position_json.game_id.clone()).map_err(|source| StoreError::InvalidId {
            field: "positions[].gameId",
            value: position_json.game_id,
            source: Box::new(source),
        })?;

    let initial_position = position_json
        .initial_position
        .map(|value| {
            TreePath::parse_initial(&value).map_err(|source| StoreError::InvalidPath {
                field: "positions[].initialPosition",
                value,
                source: Box::new(source),
            })
        })
        .transpose()?;
    let next_moves_path = position_json
        .next_moves_path
        .map(|value| {
            TreePath::parse_fragment(&value).map_err(|source| StoreError::InvalidPath {
                field: "positions[].nextMovesPath",
                value,
                source: Box::new(source),
            })
        })
        .transpose()?;

    let mut position = Position::new(id, game_id).with_labels(position_json.labels.into_iter().collect());
    position.set_initial_position(initial_position);
    position.set_next_moves_path(next_moves_path);
    position.set_position_type(position_json.position_type);
    Ok(position)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{from_json_str, spec_json_schema, to_json_string};
    use crate::model::{
        BoardRegion, GameId, Grouping, PositionId, PositionType, TreePath, MAINLINE,
    };
    use crate::store::StoreError;

    const DOCUMENT: &str = r#"{
        "version": "V1",
        "rootGrouping": {
            "positionType": "GAME_COMMENTARY",
            "positions": [
                { "id": "game", "gameId": "game", "initialPosition": "3", "nextMovesPath": "0:2" }
            ],
            "subGroupings": [
                {
                    "title": "Problems",
                    "sgfType": "PROBLEM",
                    "positions": [{ "id": "p1", "gameId": "game", "labels": ["MAINLINE"] }]
                }
            ]
        },
        "gameMapping": { "game": "(;GM[1];B[aa];W[bb];B[cc];W[dd];B[ee])" },
        "diagramOptions": { "diagramType": "UNICODE", "maxDiagrams": 3, "boardRegion": "TOP_LEFT" }
    }"#;

    #[test]
    fn decodes_documents_with_legacy_keys() {
        let spec = from_json_str(DOCUMENT).expect("decode");

        let game = GameId::new("game").expect("game id");
        assert!(spec.sgf_mapping().contains_key(&game));
        assert_eq!(spec.diagram_options().diagram_type.as_str(), "UNICODE");
        assert_eq!(spec.diagram_options().max_diagrams, Some(3));
        assert_eq!(spec.diagram_options().board_region, BoardRegion::TopLeft);

        let root = spec.root_grouping();
        let position = &root.positions()[0];
        assert_eq!(position.initial_position(), Some(&TreePath::mainline(3)));
        assert_eq!(position.next_moves_path(), Some(&TreePath::mainline(2)));

        let chapter: &Grouping = &root.sub_groupings()[0];
        assert_eq!(chapter.title(), Some("Problems"));
        assert_eq!(chapter.position_type(), Some(PositionType::Problem));
        assert!(chapter.positions()[0].labels().contains(MAINLINE));
    }

    #[test]
    fn encoding_uses_current_keys_and_survives_a_reload() {
        let spec = from_json_str(DOCUMENT).expect("decode");
        let text = to_json_string(&spec).expect("encode");
        assert!(text.contains("\"sgfMapping\""));
        assert!(text.contains("\"positionType\": \"PROBLEM\""));
        assert!(!text.contains("gameMapping"));

        let reloaded = from_json_str(&text).expect("reload");
        assert_eq!(reloaded, spec);
    }

    #[test]
    fn generated_positions_are_persisted() {
        let mut spec = from_json_str(DOCUMENT).expect("decode");
        let id = PositionId::new("game").expect("id");
        let mut generated = crate::model::Generated::new(id.clone());
        let mut child = crate::model::Position::new(
            PositionId::new("game-0").expect("id"),
            GameId::new("game").expect("game id"),
        );
        child.set_initial_position(Some(TreePath::from(vec![0, 1])));
        generated.positions_mut().push(child);
        spec.root_grouping_mut().generated_mut().insert(id.clone(), generated);

        let reloaded = from_json_str(&to_json_string(&spec).expect("encode")).expect("reload");
        let stored = &reloaded.root_grouping().generated()[&id];
        assert_eq!(stored.positions()[0].initial_position(), Some(&TreePath::from(vec![0, 1])));
    }

    #[rstest]
    #[case::version(r#"{"version":"V2"}"#)]
    #[case::empty_game_id(r#"{"rootGrouping":{"positions":[{"id":"a","gameId":""}]}}"#)]
    #[case::bad_path(
        r#"{"rootGrouping":{"positions":[{"id":"a","gameId":"g","initialPosition":"x.1"}]}}"#
    )]
    #[case::huge_fragment(
        r#"{"rootGrouping":{"positions":[{"id":"a","gameId":"g","nextMovesPath":"0:18446744073709551615"}]}}"#
    )]
    #[case::huge_initial(
        r#"{"rootGrouping":{"positions":[{"id":"a","gameId":"g","initialPosition":"18446744073709551615"}]}}"#
    )]
    #[case::bad_options(r#"{"diagramOptions":{"diagramType":""}}"#)]
    #[case::bad_json(r#"{"rootGrouping": 3}"#)]
    fn rejects_invalid_documents(#[case] text: &str) {
        let err = from_json_str(text).unwrap_err();
        let expected = match err {
            StoreError::UnsupportedVersion { .. } => text.contains("V2"),
            StoreError::InvalidId { .. } => text.contains("\"gameId\":\"\""),
            StoreError::InvalidPath { .. } => {
                text.contains("x.1") || text.contains("18446744073709551615")
            }
            StoreError::Spec(_) => text.contains("diagramType"),
            StoreError::Json { .. } => text.contains(": 3"),
            StoreError::Io { .. } => false,
        };
        assert!(expected, "unexpected error for {text}: {err}");
    }

    #[test]
    fn schema_describes_the_document() {
        let schema = spec_json_schema();
        let text = schema.to_string();
        assert!(text.contains("rootGrouping"));
        assert!(text.contains("sgfMapping"));
        assert!(text.contains("diagramOptions"));
    }
}
