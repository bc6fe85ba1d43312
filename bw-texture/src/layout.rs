//! Geometry of a text block: tight box, per-line baselines and placement on
//! the square canvas. All values are logical units.

use bw_utils::{Placement, TextAlign};

pub const LINE_HEIGHT_FACTOR: f32 = 1.2;
pub const MAX_PADDING: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineLayout {
    /// Left edge of the line's ink run inside the tight box.
    pub start_x: f32,
    pub width: f32,
    pub baseline: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl LineLayout {
    pub fn underline_y(&self) -> f32 {
        self.baseline + self.descent + 2.0
    }

    pub fn strikethrough_y(&self) -> f32 {
        self.baseline - self.ascent * 0.35
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlockLayout {
    pub padding: f32,
    pub line_height: f32,
    pub box_width: f32,
    pub box_height: f32,
    pub lines: Vec<LineLayout>,
    /// Top-left of the drawn block on the canvas.
    pub x: f32,
    pub y: f32,
    /// Drawn size; smaller than the box only when the box exceeds the canvas.
    pub draw_width: f32,
    pub draw_height: f32,
}

pub fn padding_for(font_size: f32) -> f32 {
    (font_size * 0.1).clamp(0.0, MAX_PADDING)
}

pub fn anchor_point(placement: Placement, canvas: f32) -> (f32, f32) {
    match placement {
        Placement::Center => (canvas * 0.5, canvas * 0.5),
        Placement::Top => (canvas * 0.5, canvas * 0.2),
        Placement::Bottom => (canvas * 0.5, canvas * 0.8),
        Placement::Left => (canvas * 0.05, canvas * 0.5),
        Placement::Right => (canvas * 0.95, canvas * 0.5),
    }
}

/// Offset from the anchor to the block's top-left corner.
pub fn placement_offset(placement: Placement, width: f32, height: f32) -> (f32, f32) {
    match placement {
        Placement::Center => (-width / 2.0, -height / 2.0),
        Placement::Top => (-width / 2.0, -height),
        Placement::Bottom => (-width / 2.0, 0.0),
        Placement::Left => (0.0, -height / 2.0),
        Placement::Right => (-width, -height / 2.0),
    }
}

pub fn layout_block(
    metrics: &[LineMetrics],
    font_size: f32,
    alignment: TextAlign,
    placement: Placement,
    canvas: f32,
) -> TextBlockLayout {
    let padding = padding_for(font_size);
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let text_width = metrics.iter().map(|m| m.width).fold(1.0f32, f32::max);
    let box_width = text_width + padding * 2.0;
    let box_height = line_height * metrics.len() as f32 + padding * 2.0;

    let anchor_x = match alignment {
        TextAlign::Left => padding,
        TextAlign::Right => box_width - padding,
        TextAlign::Center => box_width / 2.0,
    };

    let lines = metrics
        .iter()
        .enumerate()
        .map(|(index, m)| {
            let baseline = padding
                + line_height * index as f32
                + line_height / 2.0
                + (m.ascent - m.descent) / 2.0;
            let start_x = match alignment {
                TextAlign::Left => anchor_x,
                TextAlign::Right => anchor_x - m.width,
                TextAlign::Center => anchor_x - m.width / 2.0,
            };
            LineLayout {
                start_x,
                width: m.width,
                baseline,
                ascent: m.ascent,
                descent: m.descent,
            }
        })
        .collect();

    let fit = (canvas / box_width).min(canvas / box_height).min(1.0);
    let draw_width = (box_width * fit).min(canvas);
    let draw_height = (box_height * fit).min(canvas);

    let (anchor_px, anchor_py) = anchor_point(placement, canvas);
    let (off_x, off_y) = placement_offset(placement, draw_width, draw_height);
    let x = (anchor_px + off_x).max(0.0).min(canvas - draw_width);
    let y = (anchor_py + off_y).max(0.0).min(canvas - draw_height);

    TextBlockLayout {
        padding,
        line_height,
        box_width,
        box_height,
        lines,
        x,
        y,
        draw_width,
        draw_height,
    }
}
