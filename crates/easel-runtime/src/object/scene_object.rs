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

//! The one concrete drawable entity of a scene.

use super::property::{Property, PropertyValue};
use crate::error::PropertyError;
use easel_core::error::ProviderError;
use easel_core::math::rotated_extent;
use easel_core::pixels::BlendMode;
use easel_core::platform::{DrawableProvider, RenderRequest};
use easel_core::{Anchor, Drawable, PixelBuffer, Rect, Rgba8, Vec2, ViewId};
use std::rc::Rc;

/// What kind of change invalidated an object. Decides which caches are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    /// Only the placement changed, the image can be reused.
    Placement,
    /// Flip, scale, rotation or opacity changed.
    Transform,
    /// The drawable itself or its untransformed size changed.
    Content,
}

/// Per-object bookkeeping of the incremental renderer.
#[derive(Debug, Clone, Default)]
pub(crate) struct RenderState {
    /// Consecutive draws without a mutation.
    pub(crate) age: u32,
    /// The object's blit is retained by the compositor.
    pub(crate) is_static: bool,
    /// The provider output, before transforms.
    raw: Option<Rc<PixelBuffer>>,
    /// The provider output after flip, scale, rotation and opacity.
    image: Option<Rc<PixelBuffer>>,
    /// The box used by collision queries, in screen space.
    collision: Option<Rect>,
}

/// A drawable entity: a [`Drawable`] payload plus the geometry shared by every kind.
///
/// All setters compare with the current value first. An actual change
/// *invalidates* the object: it leaves the static path, its age restarts at
/// `0` and its collision box is recomputed on the spot.
#[derive(Debug, Clone)]
pub struct SceneObject {
    drawable: Drawable,
    position: Vec2,
    size: Vec2,
    anchor: Anchor,
    scale: Vec2,
    angle: f32,
    flip_x: bool,
    flip_y: bool,
    alpha: f32,
    visible: bool,
    view: ViewId,
    layer: Option<String>,
    mask: Option<Rect>,
    blend: BlendMode,
    pub(crate) render: RenderState,
}

impl SceneObject {
    /// Creates an object showing `drawable` in a `width` x `height` box at the origin.
    pub fn new(drawable: Drawable, width: f32, height: f32) -> Self {
        let mut object = Self {
            drawable,
            position: Vec2::ZERO,
            size: Vec2::new(width.max(0.0), height.max(0.0)),
            anchor: Anchor::default(),
            scale: Vec2::ONE,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            alpha: 1.0,
            visible: true,
            view: ViewId::ROOT,
            layer: None,
            mask: None,
            blend: BlendMode::Alpha,
            render: RenderState::default(),
        };
        object.render.collision = object.compute_collision(object.position);
        object
    }

    // --- Constructors for the common shapes ---

    /// A filled circle of the given radius.
    pub fn circle(color: Rgba8, radius: f32) -> Self {
        Self::new(Drawable::Circle { color, border: 0.0 }, radius * 2.0, radius * 2.0)
    }

    /// A filled rectangle.
    pub fn rectangle(color: Rgba8, width: f32, height: f32) -> Self {
        Self::new(Drawable::Rectangle { color, border: 0.0 }, width, height)
    }

    /// A filled ellipse.
    pub fn ellipse(color: Rgba8, width: f32, height: f32) -> Self {
        Self::new(Drawable::Ellipse { color, border: 0.0 }, width, height)
    }

    /// A line from `start` to `end`, positioned at the top-left of their bounding box.
    pub fn line(color: Rgba8, start: Vec2, end: Vec2, thickness: f32) -> Self {
        let min = Vec2::new(start.x.min(end.x), start.y.min(end.y));
        let extent = Vec2::new((start.x - end.x).abs(), (start.y - end.y).abs());
        let mut object = Self::new(
            Drawable::Line {
                start: start - min,
                end: end - min,
                thickness,
                color,
            },
            extent.x.max(thickness),
            extent.y.max(thickness),
        );
        object.position = min;
        object.render.collision = object.compute_collision(object.position);
        object
    }

    /// An arc of the ellipse inscribed in a `width` x `height` box.
    pub fn arc(color: Rgba8, start_angle: f32, stop_angle: f32, thickness: f32, width: f32, height: f32) -> Self {
        Self::new(
            Drawable::Arc {
                start_angle,
                stop_angle,
                thickness,
                color,
            },
            width,
            height,
        )
    }

    /// A text label. The box is an estimate; providers measure the real glyphs.
    pub fn text(color: Rgba8, text: impl Into<String>, size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * size * 0.6;
        Self::new(
            Drawable::Text {
                text,
                font: None,
                size,
                color,
            },
            width,
            size,
        )
    }

    /// An emoji looked up by name.
    pub fn emoji(name: impl Into<String>) -> Self {
        Self::new(Drawable::Emoji { name: name.into() }, 32.0, 32.0)
    }

    /// An image asset scaled into the given box.
    pub fn image(source: impl Into<String>, width: f32, height: f32) -> Self {
        Self::new(Drawable::Image { source: source.into() }, width, height)
    }

    /// An invisible box, useful as a hit area.
    pub fn blank(width: f32, height: f32) -> Self {
        Self::new(Drawable::Blank, width, height)
    }

    // --- Builder-style placement, used before spawning ---

    /// Returns the object moved to `(x, y)`.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.set_position(Vec2::new(x, y));
        self
    }

    /// Returns the object with another anchor point.
    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.set_anchor(anchor);
        self
    }

    /// Returns the object placed in `layer` of its view.
    pub fn in_layer(mut self, layer: impl Into<String>) -> Self {
        self.set_layer(Some(layer.into()));
        self
    }

    /// Returns the object placed in `view`.
    pub fn in_view(mut self, view: ViewId) -> Self {
        self.set_view(view);
        self
    }

    // --- Getters ---

    /// The visual payload.
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    /// The anchor point position.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// The untransformed `(width, height)`.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// The anchor point.
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The per-axis scale factors.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// The rotation in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// The opacity.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether the object is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The view the object belongs to.
    pub fn view(&self) -> ViewId {
        self.view
    }

    /// The layer inside the view.
    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    /// The explicit collision rectangle, relative to the transformed box.
    pub fn mask(&self) -> Option<Rect> {
        self.mask
    }

    /// How the object's pixels are combined with what is below.
    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    /// Whether the compositor currently retains this object's blit.
    pub fn is_static(&self) -> bool {
        self.render.is_static
    }

    /// Consecutive draws since the last mutation.
    pub fn age(&self) -> u32 {
        self.render.age
    }

    /// The box collision queries use, `None` for objects without area.
    pub fn collision_box(&self) -> Option<Rect> {
        self.render.collision
    }

    /// The size of the bounding box after scale and rotation.
    pub fn transformed_size(&self) -> Vec2 {
        let w = self.size.x * self.scale.x.abs();
        let h = self.size.y * self.scale.y.abs();
        if self.angle.rem_euclid(360.0).abs() < f32::EPSILON {
            return Vec2::new(w, h);
        }
        rotated_extent(w, h, self.angle)
    }

    /// The screen-space bounding box after scale and rotation.
    pub fn bounds(&self) -> Rect {
        self.bounds_at(self.position)
    }

    // --- Setters ---

    /// Moves the anchor point to `position`.
    pub fn set_position(&mut self, position: Vec2) {
        if self.position != position {
            self.position = position;
            self.invalidate(Change::Placement);
        }
    }

    /// Sets the horizontal position.
    pub fn set_x(&mut self, x: f32) {
        self.set_position(Vec2::new(x, self.position.y));
    }

    /// Sets the vertical position.
    pub fn set_y(&mut self, y: f32) {
        self.set_position(Vec2::new(self.position.x, y));
    }

    /// Resizes the untransformed box.
    pub fn set_size(&mut self, width: f32, height: f32) {
        let size = Vec2::new(width.max(0.0), height.max(0.0));
        if self.size != size {
            self.size = size;
            self.invalidate(Change::Content);
        }
    }

    /// Changes the anchor point.
    pub fn set_anchor(&mut self, anchor: Anchor) {
        if self.anchor != anchor {
            self.anchor = anchor;
            self.invalidate(Change::Placement);
        }
    }

    /// Sets the per-axis scale factors.
    pub fn set_scale(&mut self, scale: Vec2) {
        if self.scale != scale {
            self.scale = scale;
            self.invalidate(Change::Transform);
        }
    }

    /// Sets the rotation in degrees.
    pub fn set_angle(&mut self, angle: f32) {
        if self.angle != angle {
            self.angle = angle;
            self.invalidate(Change::Transform);
        }
    }

    /// Sets horizontal and vertical mirroring.
    pub fn set_flip(&mut self, flip_x: bool, flip_y: bool) {
        if (self.flip_x, self.flip_y) != (flip_x, flip_y) {
            self.flip_x = flip_x;
            self.flip_y = flip_y;
            self.invalidate(Change::Transform);
        }
    }

    /// Sets the opacity, clamped to `[0, 1]`.
    pub fn set_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if self.alpha != alpha {
            self.alpha = alpha;
            self.invalidate(Change::Transform);
        }
    }

    /// Shows or hides the object.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.invalidate(Change::Placement);
        }
    }

    /// Moves the object to another view.
    pub fn set_view(&mut self, view: ViewId) {
        if self.view != view {
            self.view = view;
            self.invalidate(Change::Placement);
        }
    }

    /// Moves the object to another layer of its view.
    pub fn set_layer(&mut self, layer: Option<String>) {
        if self.layer != layer {
            self.layer = layer;
            self.invalidate(Change::Placement);
        }
    }

    /// Overrides the collision box with a rectangle relative to the transformed box.
    pub fn set_mask(&mut self, mask: Option<Rect>) {
        if self.mask != mask {
            self.mask = mask;
            self.invalidate(Change::Placement);
        }
    }

    /// Changes the blend mode.
    pub fn set_blend(&mut self, blend: BlendMode) {
        if self.blend != blend {
            self.blend = blend;
            self.invalidate(Change::Placement);
        }
    }

    /// Replaces the visual payload.
    pub fn set_drawable(&mut self, drawable: Drawable) {
        if self.drawable != drawable {
            self.drawable = drawable;
            self.invalidate(Change::Content);
        }
    }

    /// Changes the main color. Has no effect on kinds without a color.
    pub fn set_color(&mut self, color: Rgba8) {
        if self.drawable.set_color(color) {
            self.invalidate(Change::Content);
        }
    }

    /// Forces the object off the static path without changing anything.
    ///
    /// The object is redrawn on the next frames until it ages again.
    pub fn expire(&mut self) {
        self.invalidate(Change::Placement);
    }

    // --- Name-based access ---

    /// Reads a property.
    ///
    /// # Errors
    ///
    /// [`PropertyError::NotApplicable`] if the drawable kind has no such property.
    pub fn get(&self, property: Property) -> Result<PropertyValue, PropertyError> {
        let kind = self.drawable.kind_name();
        let value = match property {
            Property::X => PropertyValue::Number(self.position.x as f64),
            Property::Y => PropertyValue::Number(self.position.y as f64),
            Property::Width => PropertyValue::Number(self.size.x as f64),
            Property::Height => PropertyValue::Number(self.size.y as f64),
            Property::ScaleX => PropertyValue::Number(self.scale.x as f64),
            Property::ScaleY => PropertyValue::Number(self.scale.y as f64),
            Property::Angle => PropertyValue::Number(self.angle as f64),
            Property::Alpha => PropertyValue::Number(self.alpha as f64),
            Property::Visible => PropertyValue::Bool(self.visible),
            Property::FlipX => PropertyValue::Bool(self.flip_x),
            Property::FlipY => PropertyValue::Bool(self.flip_y),
            Property::Anchor => PropertyValue::Anchor(self.anchor),
            Property::Layer => PropertyValue::Layer(self.layer.clone()),
            Property::Color => PropertyValue::Color(self.drawable.color().ok_or(
                PropertyError::NotApplicable {
                    property: "color",
                    kind,
                },
            )?),
            Property::Text | Property::FontSize => match &self.drawable {
                Drawable::Text { text, size, .. } => {
                    if property == Property::Text {
                        PropertyValue::Text(text.clone())
                    } else {
                        PropertyValue::Number(*size as f64)
                    }
                }
                _ => {
                    return Err(PropertyError::NotApplicable {
                        property: property.name(),
                        kind,
                    })
                }
            },
            Property::Name => match &self.drawable {
                Drawable::Emoji { name } => PropertyValue::Text(name.clone()),
                _ => return Err(PropertyError::NotApplicable { property: "name", kind }),
            },
            Property::Source => match &self.drawable {
                Drawable::Image { source } => PropertyValue::Text(source.clone()),
                _ => return Err(PropertyError::NotApplicable { property: "source", kind }),
            },
        };
        Ok(value)
    }

    /// Writes a property through the matching setter.
    ///
    /// # Errors
    ///
    /// [`PropertyError::TypeMismatch`] if the value does not fit the property,
    /// [`PropertyError::NotApplicable`] if the drawable kind lacks it.
    pub fn set(&mut self, property: Property, value: PropertyValue) -> Result<(), PropertyError> {
        let kind = self.drawable.kind_name();
        let number = |expected: &'static str| {
            value.as_number().map(|n| n as f32).ok_or(PropertyError::TypeMismatch {
                property: property.name(),
                expected,
            })
        };
        match property {
            Property::X => self.set_x(number("a number")?),
            Property::Y => self.set_y(number("a number")?),
            Property::Width => self.set_size(number("a number")?, self.size.y),
            Property::Height => self.set_size(self.size.x, number("a number")?),
            Property::ScaleX => self.set_scale(Vec2::new(number("a number")?, self.scale.y)),
            Property::ScaleY => self.set_scale(Vec2::new(self.scale.x, number("a number")?)),
            Property::Angle => self.set_angle(number("a number of degrees")?),
            Property::Alpha => self.set_alpha(number("a number between 0 and 1")?),
            Property::Visible | Property::FlipX | Property::FlipY => {
                let flag = value.as_bool().ok_or(PropertyError::TypeMismatch {
                    property: property.name(),
                    expected: "a boolean",
                })?;
                match property {
                    Property::Visible => self.set_visible(flag),
                    Property::FlipX => self.set_flip(flag, self.flip_y),
                    _ => self.set_flip(self.flip_x, flag),
                }
            }
            Property::Anchor => match value {
                PropertyValue::Anchor(anchor) => self.set_anchor(anchor),
                PropertyValue::Text(ref name) => match Anchor::from_name(name) {
                    Some(anchor) => self.set_anchor(anchor),
                    None => {
                        return Err(PropertyError::TypeMismatch {
                            property: "anchor",
                            expected: "an anchor name such as 'center' or 'top left'",
                        })
                    }
                },
                _ => {
                    return Err(PropertyError::TypeMismatch {
                        property: "anchor",
                        expected: "an anchor",
                    })
                }
            },
            Property::Layer => match value {
                PropertyValue::Layer(layer) => self.set_layer(layer),
                PropertyValue::Text(layer) => self.set_layer(Some(layer)),
                _ => {
                    return Err(PropertyError::TypeMismatch {
                        property: "layer",
                        expected: "a layer name",
                    })
                }
            },
            Property::Color => match value {
                PropertyValue::Color(color) if self.drawable.color().is_some() => self.set_color(color),
                PropertyValue::Color(_) => return Err(PropertyError::NotApplicable { property: "color", kind }),
                _ => {
                    return Err(PropertyError::TypeMismatch {
                        property: "color",
                        expected: "a color",
                    })
                }
            },
            Property::Text | Property::FontSize | Property::Name | Property::Source => {
                let mut drawable = self.drawable.clone();
                match (&mut drawable, property) {
                    (Drawable::Text { text, .. }, Property::Text) => {
                        *text = value.as_text().map(str::to_string).ok_or(PropertyError::TypeMismatch {
                            property: "text",
                            expected: "a string",
                        })?;
                    }
                    (Drawable::Text { size, .. }, Property::FontSize) => *size = number("a number")?,
                    (Drawable::Emoji { name }, Property::Name) => {
                        *name = value.as_text().map(str::to_string).ok_or(PropertyError::TypeMismatch {
                            property: "name",
                            expected: "an emoji name",
                        })?;
                    }
                    (Drawable::Image { source }, Property::Source) => {
                        *source = value.as_text().map(str::to_string).ok_or(PropertyError::TypeMismatch {
                            property: "source",
                            expected: "a path or URL",
                        })?;
                    }
                    _ => {
                        return Err(PropertyError::NotApplicable {
                            property: property.name(),
                            kind,
                        })
                    }
                }
                self.set_drawable(drawable);
            }
        }
        Ok(())
    }

    // --- Renderer and collision internals ---

    /// Returns the transformed image, rendering and caching it when needed.
    pub(crate) fn transformed_image(
        &mut self,
        provider: &mut dyn DrawableProvider,
    ) -> Result<Rc<PixelBuffer>, ProviderError> {
        if let Some(image) = &self.render.image {
            return Ok(Rc::clone(image));
        }
        let raw = match &self.render.raw {
            Some(raw) => Rc::clone(raw),
            None => {
                let request = RenderRequest {
                    drawable: &self.drawable,
                    width: self.size.x,
                    height: self.size.y,
                };
                let raw = Rc::new(provider.render(&request)?);
                self.render.raw = Some(Rc::clone(&raw));
                raw
            }
        };
        let image = Rc::new(
            raw.flipped(self.flip_x, self.flip_y)
                .scaled(self.scale)
                .rotated(self.angle)
                .faded(self.alpha),
        );
        self.render.image = Some(Rc::clone(&image));
        Ok(image)
    }

    /// The top-left corner of a box of `extent` anchored at `position`.
    pub(crate) fn top_left_for(&self, position: Vec2, extent: Vec2) -> Vec2 {
        position - self.anchor.offset_in(extent.x, extent.y)
    }

    /// The collision box the object would have with its anchor at `position`.
    pub(crate) fn compute_collision(&self, position: Vec2) -> Option<Rect> {
        let extent = self.transformed_size();
        let top_left = self.top_left_for(position, extent);
        let area = match self.mask {
            Some(mask) => mask.translated(top_left.x.floor() as i32, top_left.y.floor() as i32),
            None => Rect::enclosing(top_left, top_left + extent),
        };
        (!area.is_empty()).then_some(area)
    }

    fn bounds_at(&self, position: Vec2) -> Rect {
        let extent = self.transformed_size();
        let top_left = self.top_left_for(position, extent);
        Rect::enclosing(top_left, top_left + extent)
    }

    fn invalidate(&mut self, change: Change) {
        self.render.age = 0;
        self.render.is_static = false;
        match change {
            Change::Placement => {}
            Change::Transform => self.render.image = None,
            Change::Content => {
                self.render.raw = None;
                self.render.image = None;
            }
        }
        self.render.collision = self.compute_collision(self.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setter_with_same_value_keeps_static_state() {
        let mut obj = SceneObject::rectangle(Rgba8::RED, 10.0, 10.0);
        obj.render.is_static = true;
        obj.render.age = 7;

        obj.set_x(0.0);
        assert!(obj.is_static(), "Writing the current value is not a mutation");

        obj.set_x(5.0);
        assert!(!obj.is_static(), "A real change demotes the object");
        assert_eq!(obj.age(), 0);
    }

    #[test]
    fn test_collision_box_follows_anchor_and_mask() {
        let mut obj = SceneObject::rectangle(Rgba8::RED, 20.0, 10.0)
            .at(100.0, 100.0)
            .anchored(Anchor::Center);
        assert_eq!(obj.collision_box(), Some(Rect::new(90, 95, 20, 10)));

        obj.set_mask(Some(Rect::new(5, 0, 10, 10)));
        assert_eq!(obj.collision_box(), Some(Rect::new(95, 95, 10, 10)));
    }

    #[test]
    fn test_rotation_grows_collision_box() {
        let mut obj = SceneObject::rectangle(Rgba8::RED, 20.0, 10.0);
        obj.set_angle(90.0);
        let size = obj.transformed_size();
        approx::assert_relative_eq!(size.x, 10.0, epsilon = 1e-3);
        approx::assert_relative_eq!(size.y, 20.0, epsilon = 1e-3);

        obj.set_angle(45.0);
        let tilted = obj.collision_box().expect("A rectangle always collides");
        assert!(tilted.w > 20 && tilted.h > 10);
    }

    #[test]
    fn test_quarter_and_half_turns_keep_an_exact_collision_box() {
        let mut obj = SceneObject::rectangle(Rgba8::RED, 20.0, 10.0);

        obj.set_angle(90.0);
        assert_eq!(obj.collision_box(), Some(Rect::new(0, 0, 10, 20)));

        obj.set_angle(180.0);
        assert_eq!(obj.collision_box(), Some(Rect::new(0, 0, 20, 10)));

        obj.set_angle(270.0);
        assert_eq!(obj.collision_box(), Some(Rect::new(0, 0, 10, 20)));
    }

    #[test]
    fn test_property_access_by_name() {
        let mut text = SceneObject::text(Rgba8::BLACK, "hi", 20.0);
        text.set(Property::Text, "hello".into()).unwrap();
        assert_eq!(text.get(Property::Text).unwrap(), PropertyValue::Text("hello".into()));

        let err = text.set(Property::Name, "dog".into()).unwrap_err();
        assert!(matches!(err, PropertyError::NotApplicable { property: "name", .. }));

        let err = text.set(Property::X, true.into()).unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { property: "x", .. }));
    }

    #[test]
    fn test_zero_sized_object_has_no_collision_box() {
        assert_eq!(SceneObject::blank(0.0, 0.0).collision_box(), None);
        assert!(SceneObject::blank(4.0, 4.0).collision_box().is_some());
    }
}
