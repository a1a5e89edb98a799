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

use crate::layer_tree::LayerRank;
use easel_core::pixels::BlendMode;
use easel_core::{ObjectId, PixelBuffer, Rect};
use std::rc::Rc;

/// One image placed on screen for a frame, or retained across frames when static.
#[derive(Debug, Clone)]
pub struct Blit {
    /// The object that produced the blit. `None` for decorations drawn directly.
    pub owner: Option<ObjectId>,
    /// The transformed image.
    pub image: Rc<PixelBuffer>,
    /// Screen x-coordinate of the top-left corner.
    pub x: i32,
    /// Screen y-coordinate of the top-left corner.
    pub y: i32,
    /// The draw-order rank.
    pub layer: LayerRank,
    /// How the image is combined with what lies below.
    pub blend: BlendMode,
    /// The blit is retained across frames.
    pub is_static: bool,
}

impl Blit {
    /// Creates a dynamic blit.
    pub fn new(image: Rc<PixelBuffer>, x: i32, y: i32, layer: LayerRank) -> Self {
        Self {
            owner: None,
            image,
            x,
            y,
            layer,
            blend: BlendMode::Alpha,
            is_static: false,
        }
    }

    /// The screen rectangle covered by the image.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.image.width() as i32, self.image.height() as i32)
    }
}
