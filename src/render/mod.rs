// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram rendering.
//!
//! Renderers are plugins selected by [`DiagramType`] through an explicit [`RendererRegistry`].
//! The [`DiagramOrchestrator`] walks a processed spec, applies the skip/max window and hands each
//! flattened position to the selected renderer. The text renderers draw on a [`Canvas`].

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{DiagramOptions, DiagramType, GameId, PositionId};
use crate::tree::{Flattened, TreeError};

pub mod orchestrator;
mod text;

pub use orchestrator::DiagramOrchestrator;
pub use text::TextBoardRenderer;

/// A diagram backend.
pub trait DiagramRenderer {
    /// Renders one flattened position.
    fn render(&self, flattened: &Flattened, options: &DiagramOptions) -> Result<String, RenderError>;

    /// Rewrites move references (`Black 12`) inside free text for this backend.
    fn render_inline(&self, text: &str, options: &DiagramOptions) -> String;

    fn file_extension(&self) -> &str;
}

type RendererFactory = Box<dyn Fn() -> Box<dyn DiagramRenderer>>;

/// Diagram type tag → renderer factory.
#[derive(Default)]
pub struct RendererRegistry {
    factories: BTreeMap<DiagramType, RendererFactory>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `ASCII` and `UNICODE` text renderers.
    pub fn with_default_renderers() -> Self {
        let mut registry = Self::new();
        registry.register(DiagramType::new(DiagramType::ASCII), || {
            Box::new(TextBoardRenderer::ascii())
        });
        registry.register(DiagramType::new(DiagramType::UNICODE), || {
            Box::new(TextBoardRenderer::unicode())
        });
        registry
    }

    /// Registers (or replaces) the factory for `tag`.
    pub fn register<F>(&mut self, tag: DiagramType, factory: F)
    where
        F: Fn() -> Box<dyn DiagramRenderer> + 'static,
    {
        self.factories.insert(tag, Box::new(factory));
    }

    pub fn contains(&self, tag: &DiagramType) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &DiagramType> {
        self.factories.keys()
    }

    pub fn create(&self, tag: &DiagramType) -> Result<Box<dyn DiagramRenderer>, RenderError> {
        self.factories
            .get(tag)
            .map(|factory| factory())
            .ok_or_else(|| RenderError::UnknownDiagramType { diagram_type: tag.clone() })
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("tags", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub id: PositionId,
    pub rendered: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramMetadata {
    pub id: PositionId,
    pub extension: String,
    pub labels: Vec<String>,
    pub comment: Option<String>,
    /// Captions such as `Black 7 at 3`.
    pub collisions: Vec<String>,
    pub is_on_main_path: bool,
    pub starting_move_num: usize,
    pub ending_move_num: usize,
}

/// Output of one orchestrator run. `diagrams` stays empty when streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub diagram_type: DiagramType,
    pub diagrams: Vec<RenderedDiagram>,
    pub metadata: Vec<DiagramMetadata>,
}

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum RenderError {
    UnknownDiagramType { diagram_type: DiagramType },
    MissingGame { position_id: PositionId, game_id: GameId },
    Tree { position_id: PositionId, source: TreeError },
    Canvas(CanvasError),
    Handler { position_id: PositionId, source: HandlerError },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDiagramType { diagram_type } => {
                write!(f, "no renderer registered for diagram type {diagram_type}")
            }
            Self::MissingGame { position_id, game_id } => {
                write!(f, "position {position_id} refers to unknown game {game_id}")
            }
            Self::Tree { position_id, source } => {
                write!(f, "cannot flatten position {position_id}: {source}")
            }
            Self::Canvas(err) => write!(f, "cannot draw diagram: {err}"),
            Self::Handler { position_id, source } => {
                write!(f, "diagram handler failed on {position_id}: {source}")
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownDiagramType { .. } | Self::MissingGame { .. } => None,
            Self::Tree { source, .. } => Some(source),
            Self::Canvas(err) => Some(err),
            Self::Handler { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<CanvasError> for RenderError {
    fn from(value: CanvasError) -> Self {
        Self::Canvas(value)
    }
}

pub const UNICODE_BOX_HORIZONTAL: char = '─';
pub const UNICODE_BOX_VERTICAL: char = '│';
pub const UNICODE_BOX_TOP_LEFT: char = '┌';
pub const UNICODE_BOX_TOP_RIGHT: char = '┐';
pub const UNICODE_BOX_BOTTOM_LEFT: char = '└';
pub const UNICODE_BOX_BOTTOM_RIGHT: char = '┘';
pub const UNICODE_BOX_TEE_RIGHT: char = '├';
pub const UNICODE_BOX_TEE_LEFT: char = '┤';
pub const UNICODE_BOX_TEE_DOWN: char = '┬';
pub const UNICODE_BOX_TEE_UP: char = '┴';
pub const UNICODE_BOX_CROSS: char = '┼';

/// Line directions leaving a cell, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Edges(u8);

impl Edges {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const UP: u8 = 4;
    const DOWN: u8 = 8;

    fn of(ch: char) -> Option<Self> {
        let bits = match ch {
            UNICODE_BOX_HORIZONTAL => Self::LEFT | Self::RIGHT,
            UNICODE_BOX_VERTICAL => Self::UP | Self::DOWN,
            UNICODE_BOX_TOP_LEFT => Self::RIGHT | Self::DOWN,
            UNICODE_BOX_TOP_RIGHT => Self::LEFT | Self::DOWN,
            UNICODE_BOX_BOTTOM_LEFT => Self::RIGHT | Self::UP,
            UNICODE_BOX_BOTTOM_RIGHT => Self::LEFT | Self::UP,
            UNICODE_BOX_TEE_RIGHT => Self::UP | Self::DOWN | Self::RIGHT,
            UNICODE_BOX_TEE_LEFT => Self::UP | Self::DOWN | Self::LEFT,
            UNICODE_BOX_TEE_DOWN => Self::LEFT | Self::RIGHT | Self::DOWN,
            UNICODE_BOX_TEE_UP => Self::LEFT | Self::RIGHT | Self::UP,
            UNICODE_BOX_CROSS => Self::LEFT | Self::RIGHT | Self::UP | Self::DOWN,
            _ => return None,
        };
        Some(Self(bits))
    }

    fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    fn glyph(self) -> char {
        match self.0 {
            0 => ' ',
            1..=3 => UNICODE_BOX_HORIZONTAL,
            4 | 8 | 12 => UNICODE_BOX_VERTICAL,
            10 => UNICODE_BOX_TOP_LEFT,
            9 => UNICODE_BOX_TOP_RIGHT,
            6 => UNICODE_BOX_BOTTOM_LEFT,
            5 => UNICODE_BOX_BOTTOM_RIGHT,
            14 => UNICODE_BOX_TEE_RIGHT,
            13 => UNICODE_BOX_TEE_LEFT,
            11 => UNICODE_BOX_TEE_DOWN,
            7 => UNICODE_BOX_TEE_UP,
            _ => UNICODE_BOX_CROSS,
        }
    }
}

/// A fixed-size character grid with two layers.
///
/// Box-drawing characters accumulate into a line layer and are resolved into corners, tees and
/// crosses from their connected neighbours when the canvas is printed. Any other character is an
/// overlay: it hides the line work of its cell (last writer wins) but neighbours still connect
/// through it, so stones placed on grid points leave the grid intact around them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    fill: char,
    overlay: Vec<Option<char>>,
    edges: Vec<Edges>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        Self::new_filled(width, height, ' ')
    }

    pub fn new_filled(width: usize, height: usize, fill: char) -> Result<Self, CanvasError> {
        let len = width.checked_mul(height).ok_or(CanvasError::AreaOverflow { width, height })?;
        Ok(Self {
            width,
            height,
            fill,
            overlay: vec![None; len],
            edges: vec![Edges::default(); len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.char_at(x, y, idx))
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        match Edges::of(ch) {
            Some(edges) => self.edges[idx].0 |= edges.0,
            None => self.overlay[idx] = Some(ch),
        }
        Ok(())
    }

    /// Writes `text` from `(x, y)` rightwards, clipping at the right edge.
    pub fn write_str(&mut self, x: usize, y: usize, text: &str) -> Result<(), CanvasError> {
        if y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        for (offset, ch) in text.chars().enumerate() {
            if x + offset >= self.width {
                break;
            }
            self.set(x + offset, y, ch)?;
        }
        Ok(())
    }

    /// Horizontal line over `x0..=x1` on row `y`. Nothing is drawn when out of bounds.
    pub fn draw_hline(&mut self, x0: usize, x1: usize, y: usize) -> Result<(), CanvasError> {
        let (lo, hi) = (x0.min(x1), x0.max(x1));
        self.index_of(hi, y)?;
        for x in lo..=hi {
            self.set(x, y, UNICODE_BOX_HORIZONTAL)?;
        }
        Ok(())
    }

    /// Vertical line over `y0..=y1` in column `x`. Nothing is drawn when out of bounds.
    pub fn draw_vline(&mut self, x: usize, y0: usize, y1: usize) -> Result<(), CanvasError> {
        let (lo, hi) = (y0.min(y1), y0.max(y1));
        self.index_of(x, hi)?;
        for y in lo..=hi {
            self.set(x, y, UNICODE_BOX_VERTICAL)?;
        }
        Ok(())
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> CanvasError {
        CanvasError::OutOfBounds { x, y, width: self.width, height: self.height }
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_bounds(x, y));
        }
        Ok(y * self.width + x)
    }

    fn char_at(&self, x: usize, y: usize, idx: usize) -> char {
        if let Some(ch) = self.overlay[idx] {
            return ch;
        }
        let edges = self.edges[idx];
        if edges.0 == 0 {
            return self.fill;
        }

        let w = self.width;
        let mut connected = 0;
        if edges.has(Edges::LEFT) && x > 0 && self.edges[idx - 1].has(Edges::RIGHT) {
            connected |= Edges::LEFT;
        }
        if edges.has(Edges::RIGHT) && x + 1 < w && self.edges[idx + 1].has(Edges::LEFT) {
            connected |= Edges::RIGHT;
        }
        if edges.has(Edges::UP) && y > 0 && self.edges[idx - w].has(Edges::DOWN) {
            connected |= Edges::UP;
        }
        if edges.has(Edges::DOWN) && y + 1 < self.height && self.edges[idx + w].has(Edges::UP) {
            connected |= Edges::DOWN;
        }

        if connected == 0 {
            edges.glyph()
        } else {
            Edges(connected).glyph()
        }
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for y in 0..self.height {
            if y > 0 {
                f.write_char('\n')?;
            }
            for x in 0..self.width {
                f.write_char(self.char_at(x, y, y * self.width + x))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    AreaOverflow { width: usize, height: usize },
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AreaOverflow { width, height } => {
                write!(f, "canvas area overflow: {width}*{height}")
            }
            Self::OutOfBounds { x, y, width, height } => {
                write!(f, "out of bounds: ({x},{y}) for {width}x{height} canvas")
            }
        }
    }
}

impl std::error::Error for CanvasError {}

#[cfg(test)]
mod tests {
    use super::{Canvas, CanvasError, DiagramRenderer, RenderError, RendererRegistry};
    use crate::model::{DiagramOptions, DiagramType};
    use crate::tree::Flattened;

    #[test]
    fn grid_lines_resolve_into_junctions() {
        let mut c = Canvas::new(7, 3).expect("canvas");
        for y in 0..3 {
            c.draw_hline(0, 6, y).expect("hline");
        }
        for x in [0, 3, 6] {
            c.draw_vline(x, 0, 2).expect("vline");
        }
        assert_eq!(c.to_string(), "┌──┬──┐\n├──┼──┤\n└──┴──┘");
    }

    #[test]
    fn overlays_hide_lines_without_disconnecting_neighbours() {
        let mut c = Canvas::new(7, 3).expect("canvas");
        for y in 0..3 {
            c.draw_hline(0, 6, y).expect("hline");
        }
        for x in [0, 3, 6] {
            c.draw_vline(x, 0, 2).expect("vline");
        }
        c.set(3, 1, '●').expect("set");
        assert_eq!(c.to_string(), "┌──┬──┐\n├──●──┤\n└──┴──┘");
    }

    #[test]
    fn write_str_clips_and_rejects_rows_outside() {
        let mut c = Canvas::new_filled(4, 1, '.').expect("canvas");
        c.write_str(2, 0, "abcdef").expect("write");
        assert_eq!(c.to_string(), "..ab");
        assert_eq!(
            c.write_str(0, 1, "x"),
            Err(CanvasError::OutOfBounds { x: 0, y: 1, width: 4, height: 1 })
        );
    }

    #[test]
    fn lines_out_of_bounds_draw_nothing() {
        let mut c = Canvas::new_filled(3, 2, '.').expect("canvas");
        assert!(c.draw_hline(0, 3, 0).is_err());
        assert!(c.draw_vline(0, 0, 2).is_err());
        assert_eq!(c.to_string(), "...\n...");
        assert!(matches!(
            Canvas::new(usize::MAX, 2),
            Err(CanvasError::AreaOverflow { .. })
        ));
    }

    struct Fixed;

    impl DiagramRenderer for Fixed {
        fn render(&self, _: &Flattened, _: &DiagramOptions) -> Result<String, RenderError> {
            Ok("fixed".to_owned())
        }

        fn render_inline(&self, text: &str, _: &DiagramOptions) -> String {
            text.to_uppercase()
        }

        fn file_extension(&self) -> &str {
            "fx"
        }
    }

    #[test]
    fn registry_creates_registered_renderers_only() {
        let mut registry = RendererRegistry::with_default_renderers();
        assert!(registry.contains(&DiagramType::new("ASCII")));
        assert!(registry.contains(&DiagramType::new("UNICODE")));

        let err = registry.create(&DiagramType::new("SVG")).err().expect("unknown type");
        assert!(matches!(err, RenderError::UnknownDiagramType { .. }));

        registry.register(DiagramType::new("SVG"), || Box::new(Fixed));
        let renderer = registry.create(&DiagramType::new("SVG")).expect("svg");
        assert_eq!(renderer.file_extension(), "fx");
        assert_eq!(renderer.render_inline("b", &DiagramOptions::default()), "B");
    }
}
