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

//! Text measurement.
//!
//! The layout composer never touches glyph data directly: it measures text
//! through the [`TextMeasure`] trait. The binary plugs in a font-backed
//! measurer so wrapping matches the rendered glyphs exactly; this module
//! provides a static fallback table that needs no font files, which keeps
//! the core crate pure and the layout tests deterministic.
//!
//! Table widths are in em units (relative to font size) and cover ASCII
//! 0x20..=0x7E. Every other codepoint is treated as a fullwidth character
//! (1em), which is the right approximation for the CJK text the card
//! content is written in.

use serde::Deserialize;
use serde::Serialize;

/// The two font families the card layout uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    /// Body text, headers, title.
    Sans,
    /// The quote line only.
    Serif,
}

/// Resolved text style for a single run of text.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size_px: f32,
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    pub fn sans(size_px: f32) -> Self {
        Self {
            family: FontFamily::Sans,
            size_px,
            bold: false,
            italic: false,
        }
    }

    pub fn serif(size_px: f32) -> Self {
        Self {
            family: FontFamily::Serif,
            size_px,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }
}

/// Measures the rendered width of text in logical pixels.
pub trait TextMeasure {
    fn width(&self, text: &str, style: &TextStyle) -> f32;
}

/// Static character-width table for one font family.
///
/// `widths[i]` is the width of ASCII character `(i + 32)` in em units,
/// covering 0x20 (space) through 0x7E (~).
pub struct MetricTable {
    widths: [f32; 95],
    /// Width of codepoints outside the ASCII table. CJK characters are
    /// fullwidth, so this is 1em.
    wide_char_width: f32,
}

impl MetricTable {
    fn measure_em(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.wide_char_width
                }
            })
            .sum()
    }
}

/// Table-based measurer covering both families.
pub struct TableMeasure;

impl TextMeasure for TableMeasure {
    fn width(&self, text: &str, style: &TextStyle) -> f32 {
        let table = match style.family {
            FontFamily::Sans => &SANS_TABLE,
            FontFamily::Serif => &SERIF_TABLE,
        };
        table.measure_em(text) * style.size_px
    }
}

/// Humanist sans-serif metrics.
#[rustfmt::skip]
static SANS_TABLE: MetricTable = MetricTable {
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    wide_char_width: 1.0,
};

/// Traditional serif metrics, used for the quote line.
#[rustfmt::skip]
static SERIF_TABLE: MetricTable = MetricTable {
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.23, 0.27, 0.34, 0.50, 0.50, 0.80, 0.60, 0.20, 0.30, 0.30, 0.35, 0.53, 0.25, 0.30, 0.25, 0.28,
        // 0     1     2     3     4     5     6     7     8     9
        0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50, 0.50,
        // :     ;     <     =     >     ?     @
        0.25, 0.25, 0.53, 0.53, 0.53, 0.45, 0.92,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.60, 0.55, 0.55, 0.60, 0.50, 0.45, 0.60, 0.60, 0.23, 0.35, 0.55, 0.48, 0.70,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.60, 0.65, 0.50, 0.65, 0.55, 0.45, 0.50, 0.60, 0.60, 0.80, 0.55, 0.55, 0.50,
        // [     \     ]     ^     _     `
        0.25, 0.28, 0.25, 0.42, 0.50, 0.31,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.50, 0.50, 0.45, 0.50, 0.50, 0.28, 0.50, 0.50, 0.20, 0.20, 0.48, 0.20, 0.75,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.50, 0.50, 0.50, 0.50, 0.30, 0.40, 0.35, 0.50, 0.45, 0.65, 0.45, 0.45, 0.40,
        // {     |     }     ~
        0.30, 0.23, 0.30, 0.53,
    ],
    wide_char_width: 1.0,
};
