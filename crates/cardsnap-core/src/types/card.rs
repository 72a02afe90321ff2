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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// A single study flashcard.
///
/// Cards are immutable once generated. Which face is currently shown is not
/// part of the card: it is owned by the caller and passed into the layout as
/// a [`Face`] selector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    pub question: String,
    pub answer: String,
    pub tip: String,
    /// Optional motivational quote, anchored to the bottom of the answer
    /// face when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

/// One of the two mutually exclusive visual states of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Question,
    Answer,
}

impl Face {
    /// Map the UI's flip flag onto a face selector.
    pub fn from_flipped(flipped: bool) -> Self {
        if flipped { Face::Answer } else { Face::Question }
    }
}

impl Display for Face {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Face::Question => write!(f, "question"),
            Face::Answer => write!(f, "answer"),
        }
    }
}
