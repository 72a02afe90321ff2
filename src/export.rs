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

//! Card export pipeline.
//!
//! Sequential typed stages: load auxiliary -> compose -> rasterize ->
//! persist. Each stage returns a `Result` and the stages are awaited in
//! order; there is no concurrency within one export, and the pipeline
//! borrows itself mutably so a second export cannot start while one is in
//! flight.
//!
//! Failure taxonomy: auxiliary image failures degrade to the placeholder
//! and never surface; surface/rasterization failures abort with a generic
//! export error; a permission-denied save gets its own recovery path (a
//! confirmation prompt and a settings deep-link) distinct from other save
//! failures.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use chrono::Local;
use log::info;
use log::warn;

use cardsnap_core::CanvasSize;
use cardsnap_core::Card;
use cardsnap_core::DrawOp;
use cardsnap_core::Face;
use cardsnap_core::Fallible;
use cardsnap_core::TextMeasure;
use cardsnap_core::compose;
use cardsnap_core::fail;

use crate::media;
use crate::media::AuxiliaryImage;

/// Turns an instruction list into an encoded image. Also measures text, so
/// the composer wraps with the same metrics the rasterizer draws with.
pub trait Rasterizer: TextMeasure {
    fn rasterize(
        &self,
        canvas: CanvasSize,
        pixel_ratio: f32,
        ops: &[DrawOp],
        aux: Option<&AuxiliaryImage>,
    ) -> Fallible<Vec<u8>>;
}

/// Why a save was refused.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveError {
    /// The library refused for lack of permission; recoverable by the user.
    PermissionDenied,
    Other(String),
}

/// Destination for exported images; stands in for the host's photo
/// library primitive.
pub trait PhotoLibrary {
    fn save(&mut self, bytes: &[u8], file_name: &str) -> Result<PathBuf, SaveError>;
    /// Where the library lives, for the settings deep-link.
    fn location(&self) -> &Path;
}

/// A photo library backed by a plain directory.
pub struct DirLibrary {
    dir: PathBuf,
}

impl DirLibrary {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl PhotoLibrary for DirLibrary {
    fn save(&mut self, bytes: &[u8], file_name: &str) -> Result<PathBuf, SaveError> {
        let map_err = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                SaveError::PermissionDenied
            } else {
                SaveError::Other(e.to_string())
            }
        };
        std::fs::create_dir_all(&self.dir).map_err(map_err)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(map_err)?;
        Ok(path)
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}

/// Asks the user a yes/no question.
pub trait Prompter {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Reads confirmation from stdin.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&mut self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

/// Observable stand-in for the host's blocking loading indicator. The
/// guard dismisses it on drop, which covers every exit path of the
/// pipeline, early returns included.
#[derive(Clone, Default)]
pub struct Indicator {
    active: Arc<AtomicBool>,
}

impl Indicator {
    fn begin(&self, label: &str) -> ProgressGuard {
        self.active.store(true, Ordering::SeqCst);
        info!("{label}");
        ProgressGuard {
            active: self.active.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

struct ProgressGuard {
    active: Arc<AtomicBool>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        info!("done");
    }
}

/// How an export run settled.
#[derive(Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// The library denied permission; the user was prompted and, on
    /// confirmation, the settings deep-link was opened. Not retried.
    PermissionPrompted { settings_opened: bool },
}

pub struct ExportPipeline {
    pub canvas: CanvasSize,
    pub pixel_ratio: f32,
    /// Auxiliary image path; `None` renders the placeholder directly.
    pub asset_path: Option<PathBuf>,
    indicator: Indicator,
}

impl ExportPipeline {
    pub fn new(canvas: CanvasSize, pixel_ratio: f32, asset_path: Option<PathBuf>) -> Self {
        Self {
            canvas,
            pixel_ratio,
            asset_path,
            indicator: Indicator::default(),
        }
    }

    pub fn indicator(&self) -> &Indicator {
        &self.indicator
    }

    /// Run one export end to end. Exclusive borrow: a second export on the
    /// same pipeline cannot start until this one settles.
    pub async fn export(
        &mut self,
        card: &Card,
        face: Face,
        rasterizer: &dyn Rasterizer,
        library: &mut dyn PhotoLibrary,
        prompter: &mut dyn Prompter,
    ) -> Fallible<ExportOutcome> {
        let _guard = self.indicator.begin("generating card image...");

        // Auxiliary image failures degrade, never abort. Loaded fresh on
        // every export.
        let aux = match &self.asset_path {
            Some(path) => media::load_auxiliary(path).await,
            None => None,
        };

        let ops = compose(
            card,
            face,
            self.canvas,
            aux.as_ref().map(|a| a.extent()),
            rasterizer as &dyn TextMeasure,
        );

        let bytes = rasterizer
            .rasterize(self.canvas, self.pixel_ratio, &ops, aux.as_ref())
            .map_err(|e| cardsnap_core::ErrorReport::new(format!("export failed: {e}")))?;

        match library.save(&bytes, &file_name(card, face)) {
            Ok(path) => {
                info!("saved card {} to {}", card.id, path.display());
                Ok(ExportOutcome::Saved(path))
            }
            Err(SaveError::PermissionDenied) => {
                warn!("photo library denied permission");
                let confirmed =
                    prompter.confirm("saving requires photo library permission; open settings?");
                let settings_opened = confirmed && open::that(library.location()).is_ok();
                Ok(ExportOutcome::PermissionPrompted { settings_opened })
            }
            Err(SaveError::Other(e)) => fail(format!("save failed: {e}")),
        }
    }
}

fn file_name(card: &Card, face: Face) -> String {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    format!("card-{}-{}-{stamp}.png", card.id, face)
}
