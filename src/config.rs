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

use serde::Deserialize;

use cardsnap_core::ErrorReport;
use cardsnap_core::Fallible;

/// Conventional config file name, looked up in the working directory when no
/// explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cardsnap.toml";

/// Export settings, read from an optional `cardsnap.toml`. CLI flags
/// override file values; file values override these defaults.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Logical canvas width in points.
    pub canvas_width: f32,
    /// Logical canvas height in points.
    pub canvas_height: f32,
    /// Device pixel ratio. Output pixels are logical points times this.
    pub pixel_ratio: f32,
    /// TTF font for sans-serif text. Discovered from system font
    /// directories when unset.
    pub font_path: Option<PathBuf>,
    /// TTF font for the serif quote line. Falls back to the sans font.
    pub serif_font_path: Option<PathBuf>,
    /// The auxiliary branding image composited into the bottom band.
    pub asset_path: Option<PathBuf>,
    /// Directory standing in for the photo library.
    pub library_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: 300.0,
            canvas_height: 500.0,
            pixel_ratio: 2.0,
            font_path: None,
            serif_font_path: None,
            asset_path: None,
            library_dir: PathBuf::from("album"),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `cardsnap.toml` in the working
    /// directory if present, or fall back to defaults. An explicit path
    /// that does not exist is an error; the conventional one is optional.
    pub fn load(path: Option<&Path>) -> Fallible<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let conventional = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !conventional.is_file() {
                    return Ok(Config::default());
                }
                conventional
            }
        };
        let text = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| ErrorReport::new(format!("invalid config {}: {e}", path.display())))?;
        Ok(config)
    }
}
