// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::{
    DiagramMetadata, DiagramRenderer, HandlerError, RenderError, Rendered, RenderedDiagram,
    RendererRegistry,
};
use crate::model::{DiagramOptions, Grouping, Position, Spec, TreePath};
use crate::tree::{FlattenOptions, GameTree, MoveTree, TreeCache};

type Sink<'s> = dyn FnMut(RenderedDiagram, DiagramMetadata) -> Result<(), RenderError> + 's;

/// Renders the positions of a processed spec through one renderer.
///
/// Positions are visited grouping by grouping (own positions first, then sub-groupings). Each
/// visited position advances a counter that lives as long as the orchestrator; positions whose
/// count is `<= skip_diagrams` or above `max_diagrams` are skipped without output.
pub struct DiagramOrchestrator<'a, T: GameTree = MoveTree> {
    spec: &'a Spec,
    options: DiagramOptions,
    cache: &'a TreeCache<T>,
    renderer: Box<dyn DiagramRenderer>,
    diagram_count: usize,
}

impl<'a, T: GameTree> DiagramOrchestrator<'a, T> {
    /// Resolves the renderer for `options.diagram_type`; an unregistered type is an error here.
    pub fn new(
        spec: &'a Spec,
        options: DiagramOptions,
        cache: &'a TreeCache<T>,
        registry: &RendererRegistry,
    ) -> Result<Self, RenderError> {
        let renderer = registry.create(&options.diagram_type)?;
        tracing::debug!(diagram_type = %options.diagram_type, "selected renderer");
        Ok(Self { spec, options, cache, renderer, diagram_count: 0 })
    }

    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    /// Positions visited so far, skipped ones included.
    pub fn diagram_count(&self) -> usize {
        self.diagram_count
    }

    /// Renders every position in the window and keeps all output.
    pub fn render_all(&mut self) -> Result<Rendered, RenderError> {
        let mut diagrams = Vec::new();
        let mut metadata = Vec::new();
        self.run(&mut |diagram, meta| {
            diagrams.push(diagram);
            metadata.push(meta);
            Ok(())
        })?;
        tracing::info!(diagrams = diagrams.len(), "rendered diagrams");
        Ok(Rendered { diagram_type: self.options.diagram_type.clone(), diagrams, metadata })
    }

    /// Hands each diagram to `handler` as soon as it is rendered.
    ///
    /// Only metadata is kept. The first handler error stops the walk.
    pub fn render_stream<F>(&mut self, mut handler: F) -> Result<Rendered, RenderError>
    where
        F: FnMut(RenderedDiagram, &DiagramMetadata) -> Result<(), HandlerError>,
    {
        let mut metadata = Vec::new();
        self.run(&mut |diagram, meta| {
            let position_id = diagram.id.clone();
            handler(diagram, &meta).map_err(|source| RenderError::Handler { position_id, source })?;
            metadata.push(meta);
            Ok(())
        })?;
        tracing::info!(diagrams = metadata.len(), "streamed diagrams");
        Ok(Rendered {
            diagram_type: self.options.diagram_type.clone(),
            diagrams: Vec::new(),
            metadata,
        })
    }

    /// Rewrites move references in free text for the selected renderer.
    pub fn render_inline(&self, text: &str) -> String {
        self.renderer.render_inline(text, &self.options)
    }

    fn run(&mut self, sink: &mut Sink<'_>) -> Result<(), RenderError> {
        let spec = self.spec;
        self.visit_grouping(spec.root_grouping(), sink)
    }

    fn visit_grouping(&mut self, grouping: &Grouping, sink: &mut Sink<'_>) -> Result<(), RenderError> {
        for position in grouping.rendered_positions() {
            self.visit_position(position, sink)?;
        }
        for sub in grouping.sub_groupings() {
            self.visit_grouping(sub, sink)?;
        }
        Ok(())
    }

    fn in_window(&self, count: usize) -> bool {
        count > self.options.skip_diagrams
            && self.options.max_diagrams.map_or(true, |max| count <= max)
    }

    fn visit_position(&mut self, position: &Position, sink: &mut Sink<'_>) -> Result<(), RenderError> {
        self.diagram_count += 1;
        let count = self.diagram_count;
        if !self.in_window(count) {
            tracing::debug!(id = %position.id(), count, "skipped diagram");
            return Ok(());
        }

        let parsed;
        let tree = match self.cache.get(position.game_id()) {
            Some(tree) => tree,
            None => {
                let sgf = self.spec.sgf_mapping().get(position.game_id()).ok_or_else(|| {
                    RenderError::MissingGame {
                        position_id: position.id().clone(),
                        game_id: position.game_id().clone(),
                    }
                })?;
                parsed = T::parse(sgf).map_err(|source| RenderError::Tree {
                    position_id: position.id().clone(),
                    source,
                })?;
                &parsed
            }
        };

        let empty = TreePath::new();
        let flattened = tree
            .flatten(
                position.initial_position().unwrap_or(&empty),
                position.next_moves_path().unwrap_or(&empty),
                &FlattenOptions::from(&self.options),
            )
            .map_err(|source| RenderError::Tree { position_id: position.id().clone(), source })?;
        let rendered = self.renderer.render(&flattened, &self.options)?;

        let metadata = DiagramMetadata {
            id: position.id().clone(),
            extension: self.renderer.file_extension().to_owned(),
            labels: position.labels().to_vec(),
            comment: flattened.comment().map(ToOwned::to_owned),
            collisions: flattened.collisions().iter().map(ToString::to_string).collect(),
            is_on_main_path: flattened.is_on_main_path(),
            starting_move_num: flattened.starting_move_num(),
            ending_move_num: flattened.ending_move_num(),
        };
        tracing::debug!(id = %position.id(), count, "rendered diagram");
        sink(RenderedDiagram { id: position.id().clone(), rendered }, metadata)
    }
}

impl<T: GameTree> fmt::Debug for DiagramOrchestrator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagramOrchestrator")
            .field("options", &self.options)
            .field("diagram_count", &self.diagram_count)
            .finish_non_exhaustive()
    }
}
