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

use std::path::Path;
use std::path::PathBuf;

use clap::Parser;

use cardsnap_core::CanvasSize;
use cardsnap_core::Card;
use cardsnap_core::Face;
use cardsnap_core::Fallible;
use cardsnap_core::TableMeasure;
use cardsnap_core::compose;
use cardsnap_core::fail;

use crate::config::Config;
use crate::deck;
use crate::export::DirLibrary;
use crate::export::ExportOutcome;
use crate::export::ExportPipeline;
use crate::export::StdinPrompter;
use crate::generator;
use crate::media;
use crate::render::FontSet;
use crate::render::GlyphRasterizer;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Generate a mock deck of flashcards for a topic.
    Generate {
        /// The study topic.
        topic: String,
        /// How many cards to generate.
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Path to the deck JSON file to write. By default, the deck is printed to stdout.
        #[arg(long)]
        output: Option<String>,
    },
    /// Print the draw instructions for one card face as JSON.
    Compose {
        /// Path to the deck JSON file.
        deck: String,
        /// Zero-based index of the card within the deck.
        #[arg(long, default_value_t = 0)]
        card: usize,
        /// Compose the answer face instead of the question face.
        #[arg(long)]
        flipped: bool,
        /// Path to the config file. By default, `cardsnap.toml` is used if present.
        #[arg(long)]
        config: Option<String>,
    },
    /// Render one card face to a PNG and save it to the photo library directory.
    Export {
        /// Path to the deck JSON file.
        deck: String,
        /// Zero-based index of the card within the deck.
        #[arg(long, default_value_t = 0)]
        card: usize,
        /// Export the answer face instead of the question face.
        #[arg(long)]
        flipped: bool,
        /// Path to the config file. By default, `cardsnap.toml` is used if present.
        #[arg(long)]
        config: Option<String>,
        /// Override the photo library directory.
        #[arg(long)]
        library: Option<String>,
        /// Override the auxiliary image path.
        #[arg(long)]
        asset: Option<String>,
        /// Override the sans-serif font path.
        #[arg(long)]
        font: Option<String>,
        /// Override the device pixel ratio.
        #[arg(long)]
        scale: Option<f32>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Generate {
            topic,
            count,
            output,
        } => {
            let cards = generator::generate_cards(&topic, count);
            match output {
                Some(path) => {
                    let path = PathBuf::from(path);
                    deck::write_deck(&path, &cards)?;
                    println!("wrote {} cards to {}", cards.len(), path.display());
                }
                None => {
                    let response = deck::GeneratorResponse {
                        success: true,
                        data: cards,
                    };
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
            }
            Ok(())
        }
        Command::Compose {
            deck,
            card,
            flipped,
            config,
        } => {
            let config = Config::load(config.as_deref().map(Path::new))?;
            let cards = deck::read_deck(Path::new(&deck))?;
            let card = select_card(&cards, card)?;
            let face = Face::from_flipped(flipped);
            let canvas = CanvasSize::new(config.canvas_width, config.canvas_height);
            let aux = match &config.asset_path {
                Some(path) => media::load_auxiliary(path).await.map(|a| a.extent()),
                None => None,
            };
            let ops = compose(card, face, canvas, aux, &TableMeasure);
            println!("{}", serde_json::to_string_pretty(&ops)?);
            Ok(())
        }
        Command::Export {
            deck,
            card,
            flipped,
            config,
            library,
            asset,
            font,
            scale,
        } => {
            let mut config = Config::load(config.as_deref().map(Path::new))?;
            if let Some(library) = library {
                config.library_dir = PathBuf::from(library);
            }
            if let Some(asset) = asset {
                config.asset_path = Some(PathBuf::from(asset));
            }
            if let Some(font) = font {
                config.font_path = Some(PathBuf::from(font));
            }
            if let Some(scale) = scale {
                config.pixel_ratio = scale;
            }

            let cards = deck::read_deck(Path::new(&deck))?;
            let card = select_card(&cards, card)?.clone();
            let face = Face::from_flipped(flipped);

            let fonts = FontSet::load(
                config.font_path.as_deref(),
                config.serif_font_path.as_deref(),
            )?;
            let rasterizer = GlyphRasterizer::new(fonts);
            let mut library = DirLibrary::new(config.library_dir.clone());
            let mut prompter = StdinPrompter;
            let canvas = CanvasSize::new(config.canvas_width, config.canvas_height);
            let mut pipeline =
                ExportPipeline::new(canvas, config.pixel_ratio, config.asset_path.clone());

            let outcome = pipeline
                .export(&card, face, &rasterizer, &mut library, &mut prompter)
                .await?;
            match outcome {
                ExportOutcome::Saved(path) => {
                    println!("saved to {}", path.display());
                }
                ExportOutcome::PermissionPrompted { settings_opened } => {
                    if settings_opened {
                        println!("library permission missing; opened its location for review");
                    } else {
                        println!("library permission missing; export not saved");
                    }
                }
            }
            Ok(())
        }
    }
}

fn select_card(cards: &[Card], index: usize) -> Fallible<&Card> {
    if index >= cards.len() {
        return fail(format!(
            "card index {index} out of range: deck has {} cards",
            cards.len()
        ));
    }
    Ok(&cards[index])
}
