// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{Canvas, DiagramRenderer, RenderError};
use crate::model::DiagramOptions;
use crate::tree::{Color, Flattened, Mark, Point};

/// Columns per intersection.
const CELL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Glyphs {
    black: char,
    white: char,
    /// Empty intersection; `None` draws box-drawing grid lines instead.
    empty: Option<char>,
    hoshi: char,
    triangle: char,
    square: char,
    circle: char,
    xmark: char,
}

const ASCII: Glyphs = Glyphs {
    black: 'X',
    white: 'O',
    empty: Some('.'),
    hoshi: '+',
    triangle: '^',
    square: '#',
    circle: '*',
    xmark: 'x',
};

const UNICODE: Glyphs = Glyphs {
    black: '●',
    white: '○',
    empty: None,
    hoshi: '╋',
    triangle: '△',
    square: '□',
    circle: '◯',
    xmark: '×',
};

/// Fixed-width text board diagrams, registered as `ASCII` and `UNICODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBoardRenderer {
    glyphs: Glyphs,
}

impl TextBoardRenderer {
    pub fn ascii() -> Self {
        Self { glyphs: ASCII }
    }

    pub fn unicode() -> Self {
        Self { glyphs: UNICODE }
    }

    fn stone(&self, color: Color) -> char {
        match color {
            Color::Black => self.glyphs.black,
            Color::White => self.glyphs.white,
        }
    }

    fn mark(&self, mark: &Mark) -> Option<char> {
        match mark {
            Mark::Triangle => Some(self.glyphs.triangle),
            Mark::Square => Some(self.glyphs.square),
            Mark::Circle => Some(self.glyphs.circle),
            Mark::XMark => Some(self.glyphs.xmark),
            Mark::Label(text) => text.chars().next(),
        }
    }

    fn draw_board(&self, flattened: &Flattened) -> Result<Canvas, RenderError> {
        let size = flattened.size();
        let bounds = flattened.bounds();
        let open_left = bounds.left > 0;
        let open_right = bounds.right + 1 < size;
        let open_top = bounds.top > 0;
        let open_bottom = bounds.bottom + 1 < size;

        let width = bounds.width() * CELL;
        let height = bounds.height() + usize::from(open_top) + usize::from(open_bottom);
        let mut canvas = Canvas::new(width, height)?;

        let col = |x: usize| (x - bounds.left) * CELL + 1;
        let row = |y: usize| y - bounds.top + usize::from(open_top);

        match self.glyphs.empty {
            Some(empty) => {
                for y in bounds.top..=bounds.bottom {
                    for x in bounds.left..=bounds.right {
                        canvas.set(col(x), row(y), empty)?;
                    }
                }
            }
            None => {
                let x0 = if open_left { 0 } else { col(bounds.left) };
                let x1 = if open_right { width - 1 } else { col(bounds.right) };
                for y in bounds.top..=bounds.bottom {
                    canvas.draw_hline(x0, x1, row(y))?;
                }
                let y0 = if open_top { 0 } else { row(bounds.top) };
                let y1 = if open_bottom { height - 1 } else { row(bounds.bottom) };
                for x in bounds.left..=bounds.right {
                    canvas.draw_vline(col(x), y0, y1)?;
                }
            }
        }

        for point in hoshi_points(size) {
            if bounds.contains(point) && flattened.stone(point).is_none() {
                canvas.set(col(point.x), row(point.y), self.glyphs.hoshi)?;
            }
        }

        for (&point, &color) in flattened.stones() {
            if !bounds.contains(point) {
                continue;
            }
            let (x, y) = (col(point.x), row(point.y));
            match flattened.number(point) {
                Some(number) => {
                    let mut buf = itoa::Buffer::new();
                    let digits = buf.format(number);
                    // Right-aligned on the intersection; a third digit spills into the gap.
                    let start = (x + 1).saturating_sub(digits.len().min(CELL - 1));
                    canvas.write_str(start, y, digits)?;
                }
                None => canvas.set(x, y, self.stone(color))?,
            }
        }

        for (&point, mark) in flattened.marks() {
            if !bounds.contains(point) || flattened.number(point).is_some() {
                continue;
            }
            let (x, y) = (col(point.x), row(point.y));
            if flattened.stone(point).is_some() {
                if let Some(ch) = self.mark(mark) {
                    canvas.set(x + 1, y, ch)?;
                }
                continue;
            }
            match mark {
                Mark::Label(text) => {
                    let label: String = text.chars().take(CELL - 1).collect();
                    canvas.write_str(x, y, &label)?;
                }
                other => {
                    if let Some(ch) = self.mark(other) {
                        canvas.set(x, y, ch)?;
                    }
                }
            }
        }

        Ok(canvas)
    }
}

impl DiagramRenderer for TextBoardRenderer {
    fn render(&self, flattened: &Flattened, _options: &DiagramOptions) -> Result<String, RenderError> {
        let canvas = self.draw_board(flattened)?;
        let mut out = canvas_to_string_trimmed(&canvas);
        for collision in flattened.collisions() {
            out.push('\n');
            out.push_str(&collision.to_string());
        }
        Ok(out)
    }

    fn render_inline(&self, text: &str, _options: &DiagramOptions) -> String {
        move_reference_regex()
            .replace_all(text, |caps: &Captures<'_>| {
                let glyph = if &caps[1] == "Black" { self.glyphs.black } else { self.glyphs.white };
                format!("{glyph}{}", &caps[2])
            })
            .into_owned()
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

fn move_reference_regex() -> &'static Regex {
    static MOVE_REFERENCE: OnceLock<Regex> = OnceLock::new();
    MOVE_REFERENCE
        .get_or_init(|| Regex::new(r"\b(Black|White) (\d+)\b").expect("valid move reference regex"))
}

/// Star points for the usual board sizes.
fn hoshi_points(size: usize) -> Vec<Point> {
    let edge = match size {
        0..=6 => return Vec::new(),
        7..=11 => 2,
        _ => 3,
    };
    let mut lines = vec![edge, size - 1 - edge];
    if size % 2 == 1 && size >= 9 {
        lines.push(size / 2);
    }
    let mut points = Vec::with_capacity(lines.len() * lines.len());
    for &y in &lines {
        for &x in &lines {
            points.push(Point::new(x, y));
        }
    }
    points
}

/// The canvas text with trailing blanks removed from every line and trailing empty lines dropped.
pub(crate) fn canvas_to_string_trimmed(canvas: &Canvas) -> String {
    let text = canvas.to_string();
    let mut lines: Vec<&str> = text.lines().map(|line| line.trim_end_matches(' ')).collect();
    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{canvas_to_string_trimmed, hoshi_points, TextBoardRenderer};
    use crate::model::DiagramOptions;
    use crate::render::{Canvas, DiagramRenderer};
    use crate::tree::{Bounds, Collision, Color, Flattened, Mark, Point};

    fn flattened(size: usize, bounds: Bounds) -> Flattened {
        Flattened {
            size,
            stones: BTreeMap::new(),
            numbers: BTreeMap::new(),
            marks: BTreeMap::new(),
            collisions: Vec::new(),
            comment: None,
            is_on_main_path: true,
            starting_move_num: 0,
            ending_move_num: 0,
            bounds,
        }
    }

    #[test]
    fn ascii_draws_stones_numbers_and_marks() {
        let mut flat = flattened(5, Bounds::full(5));
        flat.stones.insert(Point::new(1, 1), Color::Black);
        flat.stones.insert(Point::new(2, 2), Color::White);
        flat.numbers.insert(Point::new(2, 2), 1);
        flat.stones.insert(Point::new(3, 3), Color::Black);
        flat.numbers.insert(Point::new(3, 3), 12);
        flat.marks.insert(Point::new(0, 4), Mark::Triangle);
        flat.marks.insert(Point::new(4, 0), Mark::Label("A".into()));
        flat.marks.insert(Point::new(1, 1), Mark::Square);

        let out = TextBoardRenderer::ascii().render(&flat, &DiagramOptions::default()).expect("render");
        assert_eq!(
            out,
            [
                " .  .  .  .  A",
                " .  X# .  .  .",
                " .  .  1  .  .",
                " .  .  . 12  .",
                " ^  .  .  .  .",
            ]
            .join("\n")
        );
    }

    #[test]
    fn unicode_draws_a_grid_with_stones_on_it() {
        let mut flat = flattened(3, Bounds::full(3));
        flat.stones.insert(Point::new(1, 1), Color::Black);
        flat.stones.insert(Point::new(2, 0), Color::White);

        let out =
            TextBoardRenderer::unicode().render(&flat, &DiagramOptions::default()).expect("render");
        assert_eq!(out, " ┌──┬──○\n ├──●──┤\n └──┴──┘");
    }

    #[test]
    fn cropped_unicode_boards_stay_open_towards_the_rest_of_the_board() {
        let flat = flattened(5, Bounds { left: 0, top: 0, right: 1, bottom: 1 });
        let out =
            TextBoardRenderer::unicode().render(&flat, &DiagramOptions::default()).expect("render");
        assert_eq!(out, " ┌──┬─\n ├──┼─\n │  │");
    }

    #[test]
    fn collisions_are_captioned_below_the_board() {
        let mut flat = flattened(3, Bounds::full(3));
        flat.collisions.push(Collision::new(Color::Black, 7, "3"));
        flat.collisions.push(Collision::new(Color::White, 8, "4"));
        let out = TextBoardRenderer::ascii().render(&flat, &DiagramOptions::default()).expect("render");
        let captions: Vec<_> = out.lines().skip(3).collect();
        assert_eq!(captions, vec!["Black 7 at 3", "White 8 at 4"]);
    }

    #[test]
    fn inline_move_references_become_glyphs() {
        let options = DiagramOptions::default();
        assert_eq!(
            TextBoardRenderer::ascii().render_inline("Black 12 then White 3.", &options),
            "X12 then O3."
        );
        assert_eq!(
            TextBoardRenderer::unicode().render_inline("After White 5, Blackish 2", &options),
            "After ○5, Blackish 2"
        );
    }

    #[test]
    fn star_points_follow_board_size() {
        assert_eq!(hoshi_points(19).len(), 9);
        assert_eq!(hoshi_points(13).len(), 9);
        assert_eq!(hoshi_points(9).len(), 9);
        assert!(hoshi_points(9).contains(&Point::new(4, 4)));
        assert_eq!(hoshi_points(8).len(), 4);
        assert!(hoshi_points(5).is_empty());
    }

    #[test]
    fn trimmed_output_drops_trailing_blanks() {
        let mut canvas = Canvas::new(3, 3).expect("canvas");
        canvas.set(0, 0, 'A').expect("set");
        canvas.set(1, 1, 'B').expect("set");
        assert_eq!(canvas_to_string_trimmed(&canvas), "A\n B");
    }
}
