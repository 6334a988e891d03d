// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::{rotate, sgf, GameTree, NodeId, TreeError};
use crate::model::AutoRotateCropPrefs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Property {
    name: SmolStr,
    values: Vec<String>,
}

impl Property {
    pub(crate) fn new(name: SmolStr, values: Vec<String>) -> Self {
        Self { name, values }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<String> {
        &mut self.values
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Node {
    properties: Vec<Property>,
    children: Vec<NodeId>,
}

/// An arena-allocated SGF move tree. Node `0` is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTree {
    nodes: Vec<Node>,
}

impl MoveTree {
    pub(crate) fn empty() -> Self {
        Self { nodes: vec![Node::default()] }
    }

    pub(crate) fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, properties: Vec<Property>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { properties, children: Vec::new() });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Appends `property`, merging values into an existing property of the same name.
    pub(crate) fn push_property(&mut self, node: NodeId, property: Property) {
        let Some(node) = self.nodes.get_mut(node.0) else {
            return;
        };
        match node.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => existing.values.extend(property.values),
            None => node.properties.push(property),
        }
    }

    pub(crate) fn properties(&self, node: NodeId) -> &[Property] {
        self.nodes.get(node.0).map_or(&[], |node| node.properties.as_slice())
    }

    pub(crate) fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node.0).map_or(&[], |node| node.children.as_slice())
    }

    pub(crate) fn all_properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.nodes.iter().flat_map(|node| node.properties.iter())
    }

    /// Visits every property of every node mutably.
    pub(crate) fn for_each_property_mut(&mut self, mut f: impl FnMut(&mut Property)) {
        for node in &mut self.nodes {
            node.properties.iter_mut().for_each(&mut f);
        }
    }
}

impl GameTree for MoveTree {
    fn parse(input: &str) -> Result<Self, TreeError> {
        Ok(sgf::parse(input)?)
    }

    fn to_sgf(&self) -> String {
        sgf::write(self)
    }

    fn root(&self) -> NodeId {
        self.root_id()
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    fn num_children(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    fn property(&self, node: NodeId, name: &str) -> Option<&[String]> {
        self.properties(node)
            .iter()
            .find(|property| property.name() == name)
            .map(Property::values)
    }

    fn auto_rotate(&self, prefs: &AutoRotateCropPrefs) -> Self {
        rotate::auto_rotate(self, prefs)
    }
}
