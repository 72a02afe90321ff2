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

//! cardsnap-core: composition engine for flashcard share images.
//!
//! This library is pure: it measures and wraps text, stacks the variable
//! height blocks of a card face, and emits an ordered list of draw
//! instructions. It performs no I/O and holds no pixels; decoding the
//! auxiliary image, rasterizing the instructions, and persisting the result
//! are the host binary's concern.

pub mod error;
pub mod layout;
pub mod metrics;
pub mod textflow;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use layout::{Align, Color, DrawOp, compose, fit_within, panel_rect, truncate_recap};
pub use metrics::{FontFamily, TableMeasure, TextMeasure, TextStyle};
pub use textflow::{TextBlock, flow, wrap};
pub use types::card::{Card, Face};
pub use types::geometry::{CanvasSize, ImageExtent, Rect};
