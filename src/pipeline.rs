// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One-value entry point over create, process and render.
//!
//! ```no_run
//! use gobook::model::{BookOptions, DiagramOptions, SgfSource, SpecOptions};
//! use gobook::pipeline::Pipeline;
//! use gobook::tree::MoveTree;
//!
//! # fn main() -> Result<(), gobook::pipeline::PipelineError> {
//! let sources = [SgfSource::new("(;GM[1]C[start];B[aa]C[first])").with_alias("demo")];
//! let rendered = Pipeline::<MoveTree>::create(
//!     &sources,
//!     SpecOptions::default(),
//!     DiagramOptions::default(),
//!     BookOptions::default(),
//! )?
//! .process()?
//! .render_diagrams()?;
//! assert_eq!(rendered.diagrams.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::generate::{process_spec, ProcessError};
use crate::model::{BookOptions, DiagramOptions, SgfSource, Spec, SpecError, SpecOptions};
use crate::render::{
    DiagramMetadata, DiagramOrchestrator, HandlerError, RenderError, Rendered, RenderedDiagram,
    RendererRegistry,
};
use crate::tree::{ConditionJudge, GameTree, MoveTree, ProblemJudge, TreeCache};

/// A spec together with the parsed trees, renderers and judge it is processed and rendered with.
///
/// Each render call starts a fresh diagram counter, so windowing always counts from the first
/// position of the spec.
pub struct Pipeline<T: GameTree = MoveTree> {
    spec: Spec,
    cache: TreeCache<T>,
    registry: RendererRegistry,
    judge: Box<dyn ProblemJudge>,
}

impl<T: GameTree> Pipeline<T> {
    /// Builds the spec from raw records. See [`Spec::create`] for alias rules.
    pub fn create(
        sources: &[SgfSource],
        spec_options: SpecOptions,
        diagram_options: DiagramOptions,
        book_options: BookOptions,
    ) -> Result<Self, PipelineError> {
        let spec = Spec::create::<T>(sources, spec_options, diagram_options, book_options)?;
        Ok(Self::from_spec(spec))
    }

    /// Wraps an existing (possibly already processed) spec with the default renderers and judge.
    pub fn from_spec(spec: Spec) -> Self {
        Self {
            spec,
            cache: TreeCache::new(),
            registry: RendererRegistry::with_default_renderers(),
            judge: Box::new(ConditionJudge),
        }
    }

    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_judge(mut self, judge: impl ProblemJudge + 'static) -> Self {
        self.judge = Box::new(judge);
        self
    }

    /// Expands every position in place; see [`process_spec`].
    pub fn process(mut self) -> Result<Self, PipelineError> {
        process_spec(&mut self.spec, &mut self.cache, self.judge.as_ref())?;
        Ok(self)
    }

    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    pub fn into_spec(self) -> Spec {
        self.spec
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    /// Replaces the diagram options used by later render calls.
    pub fn set_diagram_options(&mut self, options: DiagramOptions) -> Result<(), PipelineError> {
        self.spec.set_diagram_options(options)?;
        Ok(())
    }

    /// Renders every position in the window of the spec's diagram options.
    pub fn render_diagrams(&self) -> Result<Rendered, PipelineError> {
        Ok(self.orchestrator()?.render_all()?)
    }

    /// Streams every position in the window to `handler`; see
    /// [`DiagramOrchestrator::render_stream`].
    pub fn render_diagrams_stream<F>(&self, handler: F) -> Result<Rendered, PipelineError>
    where
        F: FnMut(RenderedDiagram, &DiagramMetadata) -> Result<(), HandlerError>,
    {
        Ok(self.orchestrator()?.render_stream(handler)?)
    }

    fn orchestrator(&self) -> Result<DiagramOrchestrator<'_, T>, RenderError> {
        DiagramOrchestrator::new(
            &self.spec,
            self.spec.diagram_options().clone(),
            &self.cache,
            &self.registry,
        )
    }
}

impl<T: GameTree> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("spec", &self.spec)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum PipelineError {
    Spec(SpecError),
    Process(ProcessError),
    Render(RenderError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(err) => write!(f, "invalid spec: {err}"),
            Self::Process(err) => write!(f, "processing failed: {err}"),
            Self::Render(err) => write!(f, "rendering failed: {err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spec(err) => Some(err),
            Self::Process(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<SpecError> for PipelineError {
    fn from(value: SpecError) -> Self {
        Self::Spec(value)
    }
}

impl From<ProcessError> for PipelineError {
    fn from(value: ProcessError) -> Self {
        Self::Process(value)
    }
}

impl From<RenderError> for PipelineError {
    fn from(value: RenderError) -> Self {
        Self::Render(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{Pipeline, PipelineError};
    use crate::model::{
        BookOptions, DiagramOptions, DiagramType, PositionType, ProblemConditions, SgfSource,
        SpecOptions,
    };
    use crate::render::RenderError;
    use crate::tree::{GameTree, MoveTree, NodeId, ProblemJudge, ProblemResult};

    const GAME: &str = "(;GM[1]SZ[9]C[start];B[cc]C[one];W[gg];B[cg]C[three])";
    const PROBLEM: &str = "(;GM[1]SZ[9]AB[bb]C[kill](;B[aa]C[Correct])(;B[ab]))";

    #[fixture]
    fn sources() -> Vec<SgfSource> {
        vec![
            SgfSource::new(GAME).with_alias("game"),
            SgfSource::new(PROBLEM).with_alias("problem"),
        ]
    }

    fn pipeline(sources: &[SgfSource]) -> Pipeline {
        let mut pipeline = Pipeline::<MoveTree>::create(
            sources,
            SpecOptions::default(),
            DiagramOptions::default(),
            BookOptions::default(),
        )
        .expect("create");
        // Keep the default type on the game and make the second record a problem.
        if let Some(position) = pipeline.spec.root_grouping_mut().positions_mut().get_mut(1) {
            position.set_position_type(Some(PositionType::Problem));
        }
        pipeline
    }

    fn ids(rendered: &crate::render::Rendered) -> Vec<String> {
        rendered.metadata.iter().map(|m| m.id.to_string()).collect()
    }

    #[rstest]
    fn create_process_render_in_one_chain(sources: Vec<SgfSource>) {
        let processed = pipeline(&sources).process().expect("process");
        let rendered = processed.render_diagrams().expect("render");
        assert_eq!(
            ids(&rendered),
            vec!["game-0", "game-1", "game-2", "problem-0", "problem-1", "problem-2"]
        );
        assert_eq!(rendered.diagrams.len(), 6);
        assert!(rendered.metadata[3].labels.contains(&"PROBLEM_ROOT".to_owned()));
    }

    #[rstest]
    fn every_render_counts_from_the_start(sources: Vec<SgfSource>) {
        let mut pipeline = pipeline(&sources).process().expect("process");
        let options =
            DiagramOptions { skip_diagrams: 2, max_diagrams: Some(4), ..DiagramOptions::default() };
        pipeline.set_diagram_options(options).expect("options");

        let mut calls = Vec::new();
        let streamed = pipeline
            .render_diagrams_stream(|diagram, _| {
                calls.push(diagram.id.to_string());
                Ok(())
            })
            .expect("stream");
        assert_eq!(calls, vec!["game-2", "problem-0"]);
        assert!(streamed.diagrams.is_empty());

        let again = pipeline.render_diagrams().expect("render");
        assert_eq!(ids(&again), calls);
    }

    struct AlwaysCorrect;

    impl ProblemJudge for AlwaysCorrect {
        fn judge(
            &self,
            _tree: &dyn GameTree,
            _node: NodeId,
            _conditions: &ProblemConditions,
            _ancestor: ProblemResult,
        ) -> ProblemResult {
            ProblemResult::Correct
        }
    }

    #[rstest]
    fn injected_judge_decides_problem_labels(sources: Vec<SgfSource>) {
        let pipeline = pipeline(&sources).with_judge(AlwaysCorrect).process().expect("process");
        let rendered = pipeline.render_diagrams().expect("render");
        let last = rendered.metadata.last().expect("metadata");
        assert_eq!(last.id.as_str(), "problem-2");
        assert!(last.labels.contains(&"CORRECT".to_owned()));
    }

    #[rstest]
    fn unknown_renderer_is_reported_at_render_time(sources: Vec<SgfSource>) {
        let mut pipeline = pipeline(&sources).process().expect("process");
        let options =
            DiagramOptions { diagram_type: DiagramType::new("SVG"), ..DiagramOptions::default() };
        pipeline.set_diagram_options(options).expect("options");
        assert!(matches!(
            pipeline.render_diagrams(),
            Err(PipelineError::Render(RenderError::UnknownDiagramType { .. }))
        ));
    }

    #[test]
    fn bad_sources_fail_at_creation() {
        let err = Pipeline::<MoveTree>::create(
            &[SgfSource::new("  ")],
            SpecOptions::default(),
            DiagramOptions::default(),
            BookOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Spec(_)));
    }
}
