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

//! Greedy text flow.
//!
//! Wrapping is character-by-character rather than word-by-word: the card
//! content is CJK-first, where there are no space delimiters to break on.

use crate::metrics::TextMeasure;
use crate::metrics::TextStyle;

/// The vertical extent consumed by one flowed block of text.
///
/// `end_y` is the authoritative cursor for the next block: it includes one
/// full line of clearance below the last rendered line, and advances by one
/// line height even for empty text, so stacked blocks never overlap.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub line_height: f32,
    pub end_y: f32,
}

/// Wrap `text` into lines that fit `max_width`.
///
/// A line is committed as soon as appending the next character would
/// overflow, unless the line is still empty: a single character wider than
/// `max_width` forms its own line rather than looping forever. The final
/// partial line is committed unconditionally, so even the empty string
/// yields one (empty) line.
pub fn wrap(
    text: &str,
    max_width: f32,
    style: &TextStyle,
    measure: &dyn TextMeasure,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for ch in text.chars() {
        let mut candidate = line.clone();
        candidate.push(ch);
        if measure.width(&candidate, style) > max_width && !line.is_empty() {
            lines.push(line);
            line = ch.to_string();
        } else {
            line = candidate;
        }
    }
    lines.push(line);
    lines
}

/// Wrap `text` and report the vertical extent consumed from `start_y`.
pub fn flow(
    text: &str,
    start_y: f32,
    max_width: f32,
    line_height: f32,
    style: &TextStyle,
    measure: &dyn TextMeasure,
) -> TextBlock {
    let lines = wrap(text, max_width, style, measure);
    let end_y = start_y + lines.len() as f32 * line_height;
    TextBlock {
        lines,
        line_height,
        end_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TableMeasure;
    use crate::metrics::TextStyle;

    const STYLE: TextStyle = TextStyle {
        family: crate::metrics::FontFamily::Sans,
        size_px: 20.0,
        bold: false,
        italic: false,
    };

    /// No wrapped line may measure wider than the limit, except a line
    /// holding a single over-wide character.
    #[test]
    fn test_lines_fit_max_width() {
        let text = "二次函数 ax²+bx+c=0 的判别式是什么？答案里还有更多字符。";
        let max_width = 120.0;
        for line in wrap(text, max_width, &STYLE, &TableMeasure) {
            if line.chars().count() > 1 {
                assert!(
                    TableMeasure.width(&line, &STYLE) <= max_width,
                    "line {line:?} overflows"
                );
            }
        }
    }

    /// A single character wider than the limit still forms its own line.
    #[test]
    fn test_overwide_char_forms_own_line() {
        // One fullwidth char at 20px is 20px wide; limit is narrower.
        let lines = wrap("数学题", 10.0, &STYLE, &TableMeasure);
        assert_eq!(lines, vec!["数", "学", "题"]);
    }

    /// Wrapping is deterministic.
    #[test]
    fn test_wrap_is_deterministic() {
        let text = "等差数列通项公式 an = a1 + (n-1)d";
        let a = wrap(text, 90.0, &STYLE, &TableMeasure);
        let b = wrap(text, 90.0, &STYLE, &TableMeasure);
        assert_eq!(a, b);
    }

    /// Text that fits on one line stays on one line.
    #[test]
    fn test_short_text_single_line() {
        let lines = wrap("abc", 500.0, &STYLE, &TableMeasure);
        assert_eq!(lines, vec!["abc"]);
    }

    /// The empty string yields one empty line, and flow still advances the
    /// cursor by one line height.
    #[test]
    fn test_empty_text_advances_cursor() {
        let block = flow("", 100.0, 200.0, 36.0, &STYLE, &TableMeasure);
        assert_eq!(block.lines, vec![String::new()]);
        assert_eq!(block.end_y, 136.0);
    }

    /// `end_y` is `start_y` plus one line height per line: n-1 advances for
    /// the lines themselves plus one line of clearance.
    #[test]
    fn test_end_y_includes_clearance() {
        let block = flow("一二三四五六", 50.0, 60.0, 30.0, &STYLE, &TableMeasure);
        // 60px fits three 20px fullwidth chars per line.
        assert_eq!(block.lines.len(), 2);
        assert_eq!(block.end_y, 50.0 + 2.0 * 30.0);
    }

    /// Mixed ASCII/CJK text survives a wrap round without losing characters.
    #[test]
    fn test_no_characters_lost() {
        let text = "abandon 的中文含义？v. 放弃，遗弃";
        let lines = wrap(text, 80.0, &STYLE, &TableMeasure);
        let rejoined: String = lines.concat();
        assert_eq!(rejoined, text);
    }
}
