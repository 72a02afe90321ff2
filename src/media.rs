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

//! Auxiliary image loading.
//!
//! The bottom band of an exported card carries an optional branding bitmap.
//! It is loaded fresh on every export and any failure degrades to the text
//! placeholder: a missing or broken asset must never block the export.

use std::path::Path;

use image::RgbaImage;
use log::warn;

use cardsnap_core::ErrorReport;
use cardsnap_core::Fallible;
use cardsnap_core::ImageExtent;
use cardsnap_core::fail;

/// A decoded auxiliary bitmap.
pub struct AuxiliaryImage {
    pub pixels: RgbaImage,
}

impl AuxiliaryImage {
    /// Natural dimensions, for the layout's placement math.
    pub fn extent(&self) -> ImageExtent {
        ImageExtent::new(self.pixels.width(), self.pixels.height())
    }
}

/// Load and decode the auxiliary image. Returns `None` on any failure,
/// after logging a warning; the caller proceeds with the placeholder.
pub async fn load_auxiliary(path: &Path) -> Option<AuxiliaryImage> {
    match load_inner(path).await {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("auxiliary image {} unavailable: {e}", path.display());
            None
        }
    }
}

async fn load_inner(path: &Path) -> Fallible<AuxiliaryImage> {
    if !path.is_file() {
        return fail(format!("{} is not a file", path.display()));
    }
    let bytes = tokio::fs::read(path).await?;
    let pixels = image::load_from_memory(&bytes)
        .map_err(|e| ErrorReport::new(format!("decode failed: {e}")))?
        .to_rgba8();
    Ok(AuxiliaryImage { pixels })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use tempfile::tempdir;

    use cardsnap_core::Fallible;

    fn png_bytes(width: u32, height: u32) -> Fallible<Vec<u8>> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| ErrorReport::new(format!("encode failed: {e}")))?;
        Ok(bytes)
    }

    #[tokio::test]
    async fn test_load_reports_natural_dimensions() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("aux.png");
        std::fs::write(&path, png_bytes(8, 6)?)?;
        let image = load_auxiliary(&path).await.expect("image should load");
        assert_eq!(image.extent(), ImageExtent::new(8, 6));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_none() {
        assert!(load_auxiliary(Path::new("/no/such/asset.png")).await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_file_degrades_to_none() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("aux.png");
        std::fs::write(&path, b"not an image")?;
        assert!(load_auxiliary(&path).await.is_none());
        Ok(())
    }

    /// Failures are independent across attempts: a load that failed once
    /// succeeds later if the asset appears.
    #[tokio::test]
    async fn test_no_caching_across_attempts() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("aux.png");
        assert!(load_auxiliary(&path).await.is_none());
        std::fs::write(&path, png_bytes(4, 4)?)?;
        assert!(load_auxiliary(&path).await.is_some());
        Ok(())
    }
}
