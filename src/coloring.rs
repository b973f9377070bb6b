//! "Colour the letter" reward.
//!
//! The target letter is rasterised from a 5x7 bitmap font into a 100x100
//! mask. Strokes stamp a round brush along each segment; progress is the
//! share of mask pixels the brush has touched, and only ever grows. The
//! board completes when a stroke ends at or above the fill threshold.

use tracing::debug;

pub const MASK_SIZE: usize = 100;
pub const BRUSH_RADIUS: f64 = 9.4;
pub const FILL_THRESHOLD: f64 = 0.9;

const GLYPH_COLUMNS: usize = 5;
const GLYPH_ROWS: usize = 7;
const GLYPH_CELL: usize = 11;
const GLYPH_LEFT: usize = (MASK_SIZE - GLYPH_COLUMNS * GLYPH_CELL) / 2;
const GLYPH_TOP: usize = (MASK_SIZE - GLYPH_ROWS * GLYPH_CELL) / 2;

#[rustfmt::skip]
static FONT: [[&str; GLYPH_ROWS]; 26] = [
    [".###.", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"],
    ["####.", "#...#", "#...#", "####.", "#...#", "#...#", "####."],
    [".###.", "#...#", "#....", "#....", "#....", "#...#", ".###."],
    ["####.", "#...#", "#...#", "#...#", "#...#", "#...#", "####."],
    ["#####", "#....", "#....", "####.", "#....", "#....", "#####"],
    ["#####", "#....", "#....", "####.", "#....", "#....", "#...."],
    [".###.", "#...#", "#....", "#.###", "#...#", "#...#", ".####"],
    ["#...#", "#...#", "#...#", "#####", "#...#", "#...#", "#...#"],
    [".###.", "..#..", "..#..", "..#..", "..#..", "..#..", ".###."],
    ["..###", "...#.", "...#.", "...#.", "...#.", "#..#.", ".##.."],
    ["#...#", "#..#.", "#.#..", "##...", "#.#..", "#..#.", "#...#"],
    ["#....", "#....", "#....", "#....", "#....", "#....", "#####"],
    ["#...#", "##.##", "#.#.#", "#.#.#", "#...#", "#...#", "#...#"],
    ["#...#", "#...#", "##..#", "#.#.#", "#..##", "#...#", "#...#"],
    [".###.", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."],
    ["####.", "#...#", "#...#", "####.", "#....", "#....", "#...."],
    [".###.", "#...#", "#...#", "#...#", "#.#.#", "#..#.", ".##.#"],
    ["####.", "#...#", "#...#", "####.", "#.#..", "#..#.", "#...#"],
    [".####", "#....", "#....", ".###.", "....#", "....#", "####."],
    ["#####", "..#..", "..#..", "..#..", "..#..", "..#..", "..#.."],
    ["#...#", "#...#", "#...#", "#...#", "#...#", "#...#", ".###."],
    ["#...#", "#...#", "#...#", "#...#", "#...#", ".#.#.", "..#.."],
    ["#...#", "#...#", "#...#", "#.#.#", "#.#.#", "#.#.#", ".#.#."],
    ["#...#", "#...#", ".#.#.", "..#..", ".#.#.", "#...#", "#...#"],
    ["#...#", "#...#", ".#.#.", "..#..", "..#..", "..#..", "..#.."],
    ["#####", "....#", "...#.", "..#..", ".#...", "#....", "#####"],
];

/// The 5x7 bitmap rows for an `A-Z` letter (either case).
pub fn glyph(letter: char) -> Option<&'static [&'static str; GLYPH_ROWS]> {
    let upper = letter.to_ascii_uppercase();
    if !upper.is_ascii_uppercase() {
        return None;
    }
    FONT.get((upper as u8 - b'A') as usize)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone)]
pub struct ColoringBoard {
    letter: char,
    mask: Vec<bool>,
    covered: Vec<bool>,
    mask_pixels: usize,
    covered_pixels: usize,
    strokes: Vec<Vec<Point>>,
    drawing: bool,
    complete: bool,
}

impl ColoringBoard {
    /// `None` for anything outside `A-Z`.
    pub fn new(letter: char) -> Option<Self> {
        let rows = glyph(letter)?;
        let mut mask = vec![false; MASK_SIZE * MASK_SIZE];
        for (row, bits) in rows.iter().enumerate() {
            for (column, bit) in bits.chars().enumerate() {
                if bit != '#' {
                    continue;
                }
                let left = GLYPH_LEFT + column * GLYPH_CELL;
                let top = GLYPH_TOP + row * GLYPH_CELL;
                for y in top..top + GLYPH_CELL {
                    for x in left..left + GLYPH_CELL {
                        mask[y * MASK_SIZE + x] = true;
                    }
                }
            }
        }
        let mask_pixels = mask.iter().filter(|pixel| **pixel).count();

        Some(Self {
            letter: letter.to_ascii_uppercase(),
            mask,
            covered: vec![false; MASK_SIZE * MASK_SIZE],
            mask_pixels,
            covered_pixels: 0,
            strokes: Vec::new(),
            drawing: false,
            complete: false,
        })
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    /// Share of the glyph painted so far, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.mask_pixels == 0 {
            return 0.0;
        }
        (self.covered_pixels as f64 / self.mask_pixels as f64).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn strokes(&self) -> &[Vec<Point>] {
        &self.strokes
    }

    pub fn in_glyph(&self, x: usize, y: usize) -> bool {
        x < MASK_SIZE && y < MASK_SIZE && self.mask[y * MASK_SIZE + x]
    }

    pub fn is_covered(&self, x: usize, y: usize) -> bool {
        x < MASK_SIZE && y < MASK_SIZE && self.covered[y * MASK_SIZE + x]
    }

    /// Starts a stroke and stamps the brush once. Returns pixels added.
    pub fn begin_stroke(&mut self, at: Point) -> usize {
        if self.complete {
            return 0;
        }
        self.drawing = true;
        self.strokes.push(vec![at]);
        self.stamp(at)
    }

    /// Continues the current stroke to `to`. Ignored outside a stroke.
    pub fn extend_stroke(&mut self, to: Point) -> usize {
        if !self.drawing || self.complete {
            return 0;
        }
        let Some(from) = self.strokes.last().and_then(|stroke| stroke.last()).copied() else {
            return 0;
        };
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.push(to);
        }

        let distance = (to.x - from.x).hypot(to.y - from.y);
        let steps = ((distance / (BRUSH_RADIUS * 0.5)).ceil() as usize).max(1);
        (1..=steps)
            .map(|step| {
                let t = step as f64 / steps as f64;
                self.stamp(Point::new(
                    from.x + (to.x - from.x) * t,
                    from.y + (to.y - from.y) * t,
                ))
            })
            .sum()
    }

    /// Ends the current stroke; returns `true` if this completed the board.
    pub fn end_stroke(&mut self) -> bool {
        if !self.drawing {
            return false;
        }
        self.drawing = false;
        if !self.complete && self.progress() >= FILL_THRESHOLD {
            self.complete = true;
            debug!(letter = %self.letter, progress = self.progress(), "colouring complete");
            return true;
        }
        false
    }

    fn stamp(&mut self, center: Point) -> usize {
        let max = (MASK_SIZE - 1) as f64;
        let start_x = (center.x - BRUSH_RADIUS).floor().clamp(0.0, max) as usize;
        let end_x = (center.x + BRUSH_RADIUS).ceil().clamp(0.0, max) as usize;
        let start_y = (center.y - BRUSH_RADIUS).floor().clamp(0.0, max) as usize;
        let end_y = (center.y + BRUSH_RADIUS).ceil().clamp(0.0, max) as usize;
        let radius_squared = BRUSH_RADIUS * BRUSH_RADIUS;

        let mut added = 0;
        for y in start_y..=end_y {
            for x in start_x..=end_x {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy > radius_squared {
                    continue;
                }
                let index = y * MASK_SIZE + x;
                if self.mask[index] && !self.covered[index] {
                    self.covered[index] = true;
                    added += 1;
                }
            }
        }
        self.covered_pixels += added;
        added
    }
}
