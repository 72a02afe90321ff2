// Copyright 2026 cardsnap contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Card layout composition.
//!
//! [`compose`] turns a card plus a face selector into an ordered sequence of
//! draw instructions. It is a pure function of its inputs: no layout state
//! carries between calls, so composing the same card twice yields the same
//! instruction list. Executing the instructions against an actual pixel
//! surface is the host's job.

use serde::Deserialize;
use serde::Serialize;

use crate::metrics::TextMeasure;
use crate::metrics::TextStyle;
use crate::textflow;
use crate::types::card::Card;
use crate::types::card::Face;
use crate::types::geometry::CanvasSize;
use crate::types::geometry::ImageExtent;
use crate::types::geometry::Rect;

/// An sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Warm page background.
pub const BACKGROUND: Color = Color::rgb(0xFF, 0xFB, 0xE6);
/// Card panel fill.
pub const PANEL: Color = Color::rgb(0xFF, 0xFF, 0xFF);
/// Panel border accent on the question face.
pub const QUESTION_ACCENT: Color = Color::rgb(0xFF, 0xE3, 0xE3);
/// Panel border accent on the answer face.
pub const ANSWER_ACCENT: Color = Color::rgb(0xE3, 0xFD, 0xFD);
/// Recap block background.
pub const RECAP_FILL: Color = Color::rgb(0xF7, 0xF9, 0xFC);

const INK: Color = Color::rgb(0x33, 0x33, 0x33);
const QUESTION_HEADER_COLOR: Color = Color::rgb(0xFF, 0x6B, 0x6B);
const ANSWER_HEADER_COLOR: Color = Color::rgb(0x4E, 0xCD, 0xC4);
const TIPS_HEADER_COLOR: Color = Color::rgb(0xFF, 0x8E, 0x53);
const RECAP_LABEL_COLOR: Color = Color::rgb(0x88, 0x98, 0xAA);
const RECAP_TEXT_COLOR: Color = Color::rgb(0x55, 0x62, 0x70);
const TIP_COLOR: Color = Color::rgb(0x66, 0x66, 0x66);
const FOOTER_COLOR: Color = Color::rgb(0xAA, 0xAA, 0xAA);
const PLACEHOLDER_COLOR: Color = Color::rgb(0x99, 0x99, 0x99);
const QUOTE_COLOR: Color = QUESTION_HEADER_COLOR;

pub const TITLE: &str = "轻学闪卡";
pub const QUESTION_HEADER: &str = "❓ Question";
pub const ANSWER_HEADER: &str = "✅ Answer";
pub const TIPS_HEADER: &str = "💡 Tips";
pub const RECAP_LABEL: &str = "回顾问题：";
pub const FOOTER_HINT: &str = "扫描下方二维码关注我们";
pub const PLACEHOLDER: &str = "更多资讯请关注公众号：技术人个人品牌训练营";

/// Panel inset from the canvas edges.
const PANEL_MARGIN: f32 = 20.0;
/// Vertical space reserved below the panel for the auxiliary image band.
const BOTTOM_RESERVE: f32 = 180.0;
const PANEL_RADIUS: f32 = 20.0;
const BORDER_WIDTH: f32 = 4.0;
/// Maximum height of the placed auxiliary image.
const AUX_MAX_HEIGHT: f32 = 150.0;
/// Fixed offset of the quote line above the panel bottom.
const QUOTE_BOTTOM_OFFSET: f32 = 50.0;

/// Horizontal alignment of a text instruction. For `Center`, `x` is the
/// center of the rendered run; for `Left` it is the left edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Left,
    Center,
}

/// An atomic rendering operation. `y` on text is the top of the line box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawOp {
    /// Solid rectangle fill.
    Fill { rect: Rect, color: Color },
    /// Rounded card panel with drop shadow and face accent border.
    Panel {
        rect: Rect,
        radius: f32,
        fill: Color,
        border: Color,
        border_width: f32,
    },
    /// One line of text.
    Text {
        content: String,
        x: f32,
        y: f32,
        align: Align,
        style: TextStyle,
        color: Color,
    },
    /// Placement of the auxiliary image.
    Image { rect: Rect },
}

/// The card panel region: panel inset on three sides, bottom band reserved
/// for the auxiliary image.
pub fn panel_rect(canvas: CanvasSize) -> Rect {
    Rect::new(
        PANEL_MARGIN,
        PANEL_MARGIN,
        canvas.width - 2.0 * PANEL_MARGIN,
        canvas.height - BOTTOM_RESERVE,
    )
}

/// Shorten the question for the answer face's recap block: questions longer
/// than 35 characters are cut to 32 plus a single ellipsis. Counting is in
/// `char`s so a multi-byte code point is never split.
pub fn truncate_recap(question: &str) -> String {
    if question.chars().count() > 35 {
        let mut recap: String = question.chars().take(32).collect();
        recap.push('…');
        recap
    } else {
        question.to_string()
    }
}

/// Aspect-ratio-preserving fit of `extent` into a `max_width` x `max_height`
/// footprint: full width first, shrink to the height cap if needed.
pub fn fit_within(extent: ImageExtent, max_width: f32, max_height: f32) -> (f32, f32) {
    let ratio = extent.ratio();
    let mut width = max_width;
    let mut height = width / ratio;
    if height > max_height {
        height = max_height;
        width = height * ratio;
    }
    (width, height)
}

/// Flow a block of text and append one `Text` instruction per line.
/// Returns the cursor for the next block.
fn push_flowed(
    ops: &mut Vec<DrawOp>,
    text: &str,
    x: f32,
    start_y: f32,
    max_width: f32,
    line_height: f32,
    style: TextStyle,
    color: Color,
    measure: &dyn TextMeasure,
) -> f32 {
    let block = textflow::flow(text, start_y, max_width, line_height, &style, measure);
    for (i, line) in block.lines.iter().enumerate() {
        ops.push(DrawOp::Text {
            content: line.clone(),
            x,
            y: start_y + i as f32 * line_height,
            align: Align::Left,
            style,
            color,
        });
    }
    block.end_y
}

fn centered(content: &str, x: f32, y: f32, style: TextStyle, color: Color) -> DrawOp {
    DrawOp::Text {
        content: content.to_string(),
        x,
        y,
        align: Align::Center,
        style,
        color,
    }
}

/// Compose the full instruction sequence for one card face.
///
/// `aux` carries the natural dimensions of the auxiliary image when it
/// decoded successfully; `None` degrades the bottom band to a text
/// placeholder. Inputs are assumed well-formed; nothing here fails.
pub fn compose(
    card: &Card,
    face: Face,
    canvas: CanvasSize,
    aux: Option<ImageExtent>,
    measure: &dyn TextMeasure,
) -> Vec<DrawOp> {
    let mut ops: Vec<DrawOp> = Vec::new();
    let center_x = canvas.width / 2.0;

    // Background and panel.
    ops.push(DrawOp::Fill {
        rect: Rect::new(0.0, 0.0, canvas.width, canvas.height),
        color: BACKGROUND,
    });
    let panel = panel_rect(canvas);
    let accent = match face {
        Face::Question => QUESTION_ACCENT,
        Face::Answer => ANSWER_ACCENT,
    };
    ops.push(DrawOp::Panel {
        rect: panel,
        radius: PANEL_RADIUS,
        fill: PANEL,
        border: accent,
        border_width: BORDER_WIDTH,
    });

    // Title.
    ops.push(centered(
        TITLE,
        center_x,
        50.0,
        TextStyle::sans(20.0).bold(),
        INK,
    ));

    let mut start_y = panel.y + 60.0;
    let padding_x = panel.x + 30.0;
    let content_width = panel.width - 60.0;

    match face {
        Face::Question => {
            ops.push(centered(
                QUESTION_HEADER,
                center_x,
                start_y,
                TextStyle::sans(24.0).bold(),
                QUESTION_HEADER_COLOR,
            ));
            start_y += 60.0;
            push_flowed(
                &mut ops,
                &card.question,
                padding_x,
                start_y,
                content_width,
                36.0,
                TextStyle::sans(22.0),
                INK,
                measure,
            );
            ops.push(centered(
                FOOTER_HINT,
                center_x,
                panel.y + panel.height - 40.0,
                TextStyle::sans(14.0),
                FOOTER_COLOR,
            ));
        }
        Face::Answer => {
            ops.push(centered(
                ANSWER_HEADER,
                center_x,
                start_y,
                TextStyle::sans(24.0).bold(),
                ANSWER_HEADER_COLOR,
            ));
            start_y += 50.0;
            let end_y = push_flowed(
                &mut ops,
                &card.answer,
                padding_x,
                start_y,
                content_width,
                32.0,
                TextStyle::sans(20.0),
                INK,
                measure,
            );

            // Question recap block. The shaded rect has a fixed height; the
            // recap text is truncated rather than measured against it.
            let recap_y = end_y + 20.0;
            ops.push(DrawOp::Fill {
                rect: Rect::new(padding_x - 10.0, recap_y, content_width + 20.0, 60.0),
                color: RECAP_FILL,
            });
            ops.push(DrawOp::Text {
                content: RECAP_LABEL.to_string(),
                x: padding_x,
                y: recap_y + 10.0,
                align: Align::Left,
                style: TextStyle::sans(16.0).bold(),
                color: RECAP_LABEL_COLOR,
            });
            push_flowed(
                &mut ops,
                &truncate_recap(&card.question),
                padding_x,
                recap_y + 35.0,
                content_width,
                20.0,
                TextStyle::sans(16.0),
                RECAP_TEXT_COLOR,
                measure,
            );

            let tips_y = recap_y + 70.0;
            ops.push(centered(
                TIPS_HEADER,
                center_x,
                tips_y,
                TextStyle::sans(20.0).bold(),
                TIPS_HEADER_COLOR,
            ));
            push_flowed(
                &mut ops,
                &card.tip,
                padding_x,
                tips_y + 30.0,
                content_width,
                28.0,
                TextStyle::sans(18.0).italic(),
                TIP_COLOR,
                measure,
            );

            // The quote keeps its fixed anchor above the panel bottom even
            // when the tip text flows into it. Known limitation, preserved.
            if let Some(quote) = &card.quote {
                ops.push(centered(
                    &format!("\u{201c}{quote}\u{201d}"),
                    center_x,
                    panel.y + panel.height - QUOTE_BOTTOM_OFFSET,
                    TextStyle::serif(16.0).italic(),
                    QUOTE_COLOR,
                ));
            }
        }
    }

    // Bottom auxiliary image band.
    match aux {
        Some(extent) => {
            let (width, height) =
                fit_within(extent, canvas.width - 2.0 * PANEL_MARGIN, AUX_MAX_HEIGHT);
            ops.push(DrawOp::Image {
                rect: Rect::new(
                    (canvas.width - width) / 2.0,
                    canvas.height - height - PANEL_MARGIN,
                    width,
                    height,
                ),
            });
        }
        None => {
            ops.push(centered(
                PLACEHOLDER,
                center_x,
                canvas.height - 50.0,
                TextStyle::sans(14.0),
                PLACEHOLDER_COLOR,
            ));
        }
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TableMeasure;

    fn test_card() -> Card {
        Card {
            id: 1,
            question: "Q".to_string(),
            answer: "A".to_string(),
            tip: "T".to_string(),
            quote: None,
        }
    }

    const CANVAS: CanvasSize = CanvasSize {
        width: 300.0,
        height: 500.0,
    };

    fn texts(ops: &[DrawOp]) -> Vec<&str> {
        ops.iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Composing the same inputs twice yields an identical sequence.
    #[test]
    fn test_compose_is_pure() {
        let card = test_card();
        let a = compose(&card, Face::Answer, CANVAS, None, &TableMeasure);
        let b = compose(&card, Face::Answer, CANVAS, None, &TableMeasure);
        assert_eq!(a, b);
    }

    /// The question face shows the question header, the wrapped question
    /// and the footer hint, and nothing from the answer face.
    #[test]
    fn test_question_face_contents() {
        let card = test_card();
        let ops = compose(&card, Face::Question, CANVAS, None, &TableMeasure);
        let texts = texts(&ops);
        assert!(texts.contains(&QUESTION_HEADER));
        assert!(texts.contains(&"Q"));
        assert!(texts.contains(&FOOTER_HINT));
        assert!(!texts.contains(&ANSWER_HEADER));
        assert!(!texts.contains(&"A"));
        assert!(!texts.contains(&"T"));
        assert!(!texts.contains(&RECAP_LABEL));
    }

    /// The answer face shows the answer, recap, and tip blocks; no quote
    /// instruction when the quote is absent.
    #[test]
    fn test_answer_face_contents() {
        let card = test_card();
        let ops = compose(&card, Face::Answer, CANVAS, None, &TableMeasure);
        let texts = texts(&ops);
        assert!(texts.contains(&ANSWER_HEADER));
        assert!(texts.contains(&"A"));
        assert!(texts.contains(&RECAP_LABEL));
        assert!(texts.contains(&"Q"));
        assert!(texts.contains(&TIPS_HEADER));
        assert!(texts.contains(&"T"));
        assert!(!texts.contains(&QUESTION_HEADER));
        let has_serif = ops.iter().any(|op| {
            matches!(op, DrawOp::Text { style, .. } if style.family == crate::metrics::FontFamily::Serif)
        });
        assert!(!has_serif, "no quote instruction expected");
    }

    /// The border accent is the only face signal besides content.
    #[test]
    fn test_border_accent_differs_by_face() {
        let card = test_card();
        let q = compose(&card, Face::Question, CANVAS, None, &TableMeasure);
        let a = compose(&card, Face::Answer, CANVAS, None, &TableMeasure);
        let border = |ops: &[DrawOp]| match ops[1] {
            DrawOp::Panel { border, .. } => border,
            _ => panic!("second instruction should be the panel"),
        };
        assert_eq!(border(&q), QUESTION_ACCENT);
        assert_eq!(border(&a), ANSWER_ACCENT);
    }

    /// Questions of 35 characters or fewer are recapped verbatim.
    #[test]
    fn test_recap_short_verbatim() {
        let q: String = "字".repeat(35);
        assert_eq!(truncate_recap(&q), q);
        assert_eq!(truncate_recap(""), "");
    }

    /// Longer questions are cut to 32 characters plus a single ellipsis.
    #[test]
    fn test_recap_long_truncated() {
        let q: String = "字".repeat(36);
        let recap = truncate_recap(&q);
        assert_eq!(recap.chars().count(), 33);
        assert!(recap.ends_with('…'));
        assert!(recap.starts_with(&"字".repeat(32)));
    }

    /// Without an auxiliary image the bottom band holds the placeholder
    /// line, never nothing.
    #[test]
    fn test_missing_aux_yields_placeholder() {
        let ops = compose(&test_card(), Face::Question, CANVAS, None, &TableMeasure);
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::Image { .. })));
        assert!(texts(&ops).contains(&PLACEHOLDER));
    }

    /// Image placement preserves the aspect ratio within the band caps.
    #[test]
    fn test_aux_placement_aspect_ratio() {
        let extent = ImageExtent::new(800, 600);
        let ops = compose(
            &test_card(),
            Face::Question,
            CANVAS,
            Some(extent),
            &TableMeasure,
        );
        let rect = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Image { rect } => Some(*rect),
                _ => None,
            })
            .expect("image instruction expected");
        assert!(rect.width <= CANVAS.width - 40.0);
        assert!(rect.height <= 150.0);
        let ratio = extent.ratio();
        assert!((rect.width / rect.height - ratio).abs() < 1e-3);
        // Centered, anchored 20px above the bottom edge.
        assert!((rect.x - (CANVAS.width - rect.width) / 2.0).abs() < 1e-3);
        assert!((rect.y - (CANVAS.height - rect.height - 20.0)).abs() < 1e-3);
    }

    /// A wide-but-short image keeps full band width.
    #[test]
    fn test_fit_within_width_bound() {
        let (w, h) = fit_within(ImageExtent::new(1000, 100), 260.0, 150.0);
        assert_eq!(w, 260.0);
        assert!((h - 26.0).abs() < 1e-3);
    }

    /// The quote keeps its fixed bottom anchor even when a very long tip
    /// flows past it. This overlap is accepted behavior, not avoided.
    #[test]
    fn test_quote_anchor_is_fixed() {
        let mut card = test_card();
        card.quote = Some("越努力越幸运".to_string());
        card.tip = "提示".repeat(200);
        let ops = compose(&card, Face::Answer, CANVAS, None, &TableMeasure);
        let panel = panel_rect(CANVAS);
        let quote_y = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { content, y, .. } if content.contains("越努力越幸运") => Some(*y),
                _ => None,
            })
            .expect("quote instruction expected");
        assert_eq!(quote_y, panel.y + panel.height - 50.0);
        // The tip really does flow past the anchor.
        let max_tip_y = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, y, .. } if content.contains("提示") => Some(*y),
                _ => None,
            })
            .fold(0.0_f32, f32::max);
        assert!(max_tip_y > quote_y);
    }

    /// Instruction order is background, panel, title, then content.
    #[test]
    fn test_background_precedes_panel() {
        let ops = compose(&test_card(), Face::Question, CANVAS, None, &TableMeasure);
        assert!(matches!(
            ops[0],
            DrawOp::Fill {
                color: BACKGROUND,
                ..
            }
        ));
        assert!(matches!(ops[1], DrawOp::Panel { .. }));
        match &ops[2] {
            DrawOp::Text { content, .. } => assert_eq!(content, TITLE),
            other => panic!("expected title, got {other:?}"),
        }
    }

    /// Draw instructions serialize, so the CLI can dump them for inspection.
    #[test]
    fn test_ops_serialize() -> crate::error::Fallible<()> {
        let ops = compose(&test_card(), Face::Answer, CANVAS, None, &TableMeasure);
        let json = serde_json::to_string(&ops)?;
        let parsed: Vec<DrawOp> = serde_json::from_str(&json)?;
        assert_eq!(parsed, ops);
        Ok(())
    }
}
