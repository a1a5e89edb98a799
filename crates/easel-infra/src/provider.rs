// Copyright 2025 eraflo
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

//! A drawable provider that paints bounding boxes without any rasterizer.

use easel_core::error::ProviderError;
use easel_core::platform::{DrawableProvider, RenderRequest};
use easel_core::{Drawable, PixelBuffer, Rgba8};
use std::collections::HashSet;

/// Color used for drawables whose real pixels need an asset.
const PLACEHOLDER: Rgba8 = Rgba8::new(255, 0, 255, 255);

/// Paints every drawable as its bounding box filled with its color.
///
/// Emoji and images have no color of their own and get a magenta
/// placeholder. [`Drawable::Blank`] renders as a transparent buffer.
#[derive(Debug, Default)]
pub struct SolidFillProvider {
    refused: HashSet<&'static str>,
    rendered: usize,
}

impl SolidFillProvider {
    /// Creates a provider accepting every drawable kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the provider fail on `kind` (a [`Drawable::kind_name`]).
    pub fn refusing(mut self, kind: &'static str) -> Self {
        self.refused.insert(kind);
        self
    }

    /// The number of buffers produced so far.
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl DrawableProvider for SolidFillProvider {
    fn render(&mut self, request: &RenderRequest<'_>) -> Result<PixelBuffer, ProviderError> {
        let kind = request.drawable.kind_name();
        if self.refused.contains(kind) {
            return Err(ProviderError::Unsupported { kind: kind.to_string() });
        }

        let width = request.width.max(0.0).ceil() as u32;
        let height = request.height.max(0.0).ceil() as u32;
        let fill = match request.drawable {
            Drawable::Blank => Rgba8::TRANSPARENT,
            other => other.color().unwrap_or(PLACEHOLDER),
        };
        let buffer = PixelBuffer::new(width, height, fill);
        self.rendered += 1;
        log::trace!("Rendered {kind} into a {width}x{height} buffer");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(drawable: &Drawable, width: f32, height: f32) -> RenderRequest<'_> {
        RenderRequest {
            drawable,
            width,
            height,
        }
    }

    #[test]
    fn test_rectangles_fill_their_box() {
        let mut provider = SolidFillProvider::new();
        let rect = Drawable::Rectangle {
            color: Rgba8::RED,
            border: 0.0,
        };

        let buffer = provider.render(&request(&rect, 4.0, 2.5)).unwrap();

        assert_eq!((buffer.width(), buffer.height()), (4, 3), "Sizes are rounded up");
        assert!(buffer.pixels().iter().all(|p| *p == Rgba8::RED));
        assert_eq!(provider.rendered(), 1);
    }

    #[test]
    fn test_colorless_drawables_get_the_placeholder() {
        let mut provider = SolidFillProvider::new();
        let emoji = Drawable::Emoji { name: "dog".into() };

        let buffer = provider.render(&request(&emoji, 2.0, 2.0)).unwrap();

        assert_eq!(buffer.get(1, 1), Some(PLACEHOLDER));
    }

    #[test]
    fn test_blank_is_transparent_and_refused_kinds_fail() {
        let mut provider = SolidFillProvider::new().refusing("Image");

        let blank = provider.render(&request(&Drawable::Blank, 3.0, 3.0)).unwrap();
        assert!(blank.pixels().iter().all(|p| *p == Rgba8::TRANSPARENT));

        let image = Drawable::Image {
            source: "dog.png".into(),
        };
        let result = provider.render(&request(&image, 3.0, 3.0));
        assert!(matches!(result, Err(ProviderError::Unsupported { ref kind }) if kind == "Image"));
    }
}
