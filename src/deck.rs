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

//! Deck hand-off.
//!
//! The generator (mocked or real) hands cards to the renderer through a
//! single JSON envelope. This is the only persisted state in cardsnap.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use cardsnap_core::Card;
use cardsnap_core::Fallible;
use cardsnap_core::fail;

/// The generator response contract: a success flag and the generated cards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratorResponse {
    pub success: bool,
    pub data: Vec<Card>,
}

/// Read a deck file, rejecting envelopes whose generator reported failure.
pub fn read_deck(path: &Path) -> Fallible<Vec<Card>> {
    let text = std::fs::read_to_string(path)?;
    let response: GeneratorResponse = serde_json::from_str(&text)?;
    if !response.success {
        return fail(format!(
            "deck {} was generated unsuccessfully",
            path.display()
        ));
    }
    if response.data.is_empty() {
        return fail(format!("deck {} contains no cards", path.display()));
    }
    Ok(response.data)
}

/// Write a deck file with a success envelope.
pub fn write_deck(path: &Path, cards: &[Card]) -> Fallible<()> {
    let response = GeneratorResponse {
        success: true,
        data: cards.to_vec(),
    };
    let text = serde_json::to_string_pretty(&response)?;
    std::fs::write(path, text)?;
    Ok(())
}
