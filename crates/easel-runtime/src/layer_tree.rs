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

//! Deterministic draw-order ranks for named layers and nested views.
//!
//! Every view owns an ordered list of layer names. A view itself sits in one of
//! its parent's layers, so the rank of anything drawn is the path of layer
//! positions from the root down to it. Ranks compare lexicographically: a
//! child view's contents always sort inside its parent layer's slot, never
//! interleaved with a sibling layer.

use crate::error::SceneError;
use easel_core::ViewId;

/// The draw-order position of a blit. Lower ranks are drawn first.
///
/// Each entry is a position inside one view's layer list, outermost first.
/// Position `0` is reserved for "no layer", named layers start at `1`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerRank(Vec<u32>);

impl LayerRank {
    /// Builds a rank from explicit positions.
    pub fn from_positions(positions: impl Into<Vec<u32>>) -> Self {
        Self(positions.into())
    }

    /// The per-view positions, outermost first.
    pub fn positions(&self) -> &[u32] {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct ViewNode {
    parent: Option<ViewId>,
    /// The layer of the parent this view is drawn in.
    layer: Option<String>,
    layers: Option<Vec<String>>,
}

/// The tree of views of one scene and their layer lists.
#[derive(Debug, Clone)]
pub struct LayerTree {
    views: Vec<(ViewId, Option<ViewNode>)>,
    freed_views: Vec<u32>,
    revision: u64,
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTree {
    /// Creates a tree containing only the root view, without layers.
    pub fn new() -> Self {
        Self {
            views: vec![(
                ViewId::ROOT,
                Some(ViewNode {
                    parent: None,
                    layer: None,
                    layers: None,
                }),
            )],
            freed_views: Vec::new(),
            revision: 0,
        }
    }

    /// A counter bumped by every change that can alter ranks.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Defines the ordered layers of `view`, bottom first.
    ///
    /// # Errors
    ///
    /// Layers can be defined only once per view:
    /// [`SceneError::LayersAlreadyDefined`] is returned on a second call.
    pub fn set_layers<S: Into<String>>(
        &mut self,
        view: ViewId,
        layers: impl IntoIterator<Item = S>,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(view)?;
        if node.layers.is_some() {
            return Err(SceneError::LayersAlreadyDefined(format!("{view:?}")));
        }
        let names: Vec<String> = layers.into_iter().map(Into::into).collect();
        log::debug!("Defined layers {names:?} on {view:?}");
        node.layers = Some(names);
        self.revision += 1;
        Ok(())
    }

    /// Returns the layer names of `view`, if any were defined.
    pub fn layers(&self, view: ViewId) -> Option<&[String]> {
        self.node(view).ok()?.layers.as_deref()
    }

    /// Creates a child view of `parent`, drawn inside `layer` of the parent.
    pub fn create_view(&mut self, parent: ViewId, layer: Option<&str>) -> Result<ViewId, SceneError> {
        self.node(parent)?;
        let node = ViewNode {
            parent: Some(parent),
            layer: layer.map(str::to_string),
            layers: None,
        };
        let id = if let Some(index) = self.freed_views.pop() {
            let (id_slot, node_slot) = &mut self.views[index as usize];
            id_slot.generation += 1;
            *node_slot = Some(node);
            *id_slot
        } else {
            let id = ViewId {
                index: self.views.len() as u32,
                generation: 0,
            };
            self.views.push((id, Some(node)));
            id
        };
        self.revision += 1;
        Ok(id)
    }

    /// Removes `view` and every view nested inside it.
    pub fn remove_view(&mut self, view: ViewId) -> Result<(), SceneError> {
        if view == ViewId::ROOT {
            return Err(SceneError::RootView);
        }
        self.node(view)?;
        let doomed: Vec<ViewId> = self
            .views
            .iter()
            .filter(|(id, node)| node.is_some() && self.is_within(*id, view))
            .map(|(id, _)| *id)
            .collect();
        for id in doomed {
            self.views[id.index as usize].1 = None;
            self.freed_views.push(id.index);
        }
        self.revision += 1;
        Ok(())
    }

    /// Moves `view` into another layer of its parent.
    pub fn set_view_layer(&mut self, view: ViewId, layer: Option<&str>) -> Result<(), SceneError> {
        if view == ViewId::ROOT {
            return Err(SceneError::RootView);
        }
        let node = self.node_mut(view)?;
        node.layer = layer.map(str::to_string);
        self.revision += 1;
        Ok(())
    }

    /// Checks whether `view` is alive.
    pub fn contains(&self, view: ViewId) -> bool {
        self.node(view).is_ok()
    }

    /// Returns `true` if `view` is `ancestor` or nested somewhere below it.
    pub fn is_within(&self, view: ViewId, ancestor: ViewId) -> bool {
        let mut current = Some(view);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).ok().and_then(|n| n.parent);
        }
        false
    }

    /// Computes the rank of something drawn in `layer` of `view`.
    ///
    /// Unknown layer names (or names used on a view without layers) are ranked
    /// like "no layer" and logged.
    pub fn rank(&self, view: ViewId, layer: Option<&str>) -> LayerRank {
        let mut positions = vec![self.position_in(view, layer)];
        let mut current = view;
        while let Ok(node) = self.node(current) {
            let Some(parent) = node.parent else {
                break;
            };
            positions.push(self.position_in(parent, node.layer.as_deref()));
            current = parent;
        }
        positions.reverse();
        LayerRank(positions)
    }

    fn position_in(&self, view: ViewId, layer: Option<&str>) -> u32 {
        let Some(name) = layer else {
            return 0;
        };
        let found = self
            .layers(view)
            .and_then(|layers| layers.iter().position(|l| l == name));
        match found {
            Some(index) => index as u32 + 1,
            None => {
                log::warn!("Layer '{name}' is not defined on {view:?}; drawing it as unlayered");
                0
            }
        }
    }

    fn node(&self, view: ViewId) -> Result<&ViewNode, SceneError> {
        self.views
            .get(view.index as usize)
            .filter(|(id, _)| id.generation == view.generation)
            .and_then(|(_, node)| node.as_ref())
            .ok_or_else(|| SceneError::UnknownView(format!("{view:?}")))
    }

    fn node_mut(&mut self, view: ViewId) -> Result<&mut ViewNode, SceneError> {
        self.views
            .get_mut(view.index as usize)
            .filter(|(id, _)| id.generation == view.generation)
            .and_then(|(_, node)| node.as_mut())
            .ok_or_else(|| SceneError::UnknownView(format!("{view:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_layers_order_bottom_first() {
        let mut tree = LayerTree::new();
        tree.set_layers(ViewId::ROOT, ["background", "actors", "hud"]).unwrap();

        let background = tree.rank(ViewId::ROOT, Some("background"));
        let hud = tree.rank(ViewId::ROOT, Some("hud"));
        let unlayered = tree.rank(ViewId::ROOT, None);

        assert!(unlayered < background, "Unlayered objects are drawn first");
        assert!(background < hud);
    }

    #[test]
    fn test_layers_can_only_be_defined_once() {
        let mut tree = LayerTree::new();
        tree.set_layers(ViewId::ROOT, ["a"]).unwrap();
        let second = tree.set_layers(ViewId::ROOT, ["b"]);
        assert!(matches!(second, Err(SceneError::LayersAlreadyDefined(_))));
    }

    #[test]
    fn test_child_view_stays_inside_parent_layer() {
        // --- 1. SETUP ---
        let mut tree = LayerTree::new();
        tree.set_layers(ViewId::ROOT, ["bottom", "middle", "top"]).unwrap();
        let panel = tree.create_view(ViewId::ROOT, Some("middle")).unwrap();
        tree.set_layers(panel, ["a", "b", "c", "d"]).unwrap();

        // --- 2. ACTION ---
        let highest_in_panel = tree.rank(panel, Some("d"));
        let bottom = tree.rank(ViewId::ROOT, Some("bottom"));
        let top = tree.rank(ViewId::ROOT, Some("top"));

        // --- 3. ASSERTIONS ---
        assert!(bottom < highest_in_panel);
        assert!(
            highest_in_panel < top,
            "Nothing in the panel may be drawn over the parent's next layer"
        );
    }

    #[test]
    fn test_removed_view_handle_goes_stale() {
        let mut tree = LayerTree::new();
        let outer = tree.create_view(ViewId::ROOT, None).unwrap();
        let inner = tree.create_view(outer, None).unwrap();

        tree.remove_view(outer).unwrap();

        assert!(!tree.contains(outer));
        assert!(!tree.contains(inner), "Nested views are removed with their parent");
        let recycled = tree.create_view(ViewId::ROOT, None).unwrap();
        assert_ne!(recycled, outer, "A recycled slot gets a new generation");
        assert!(matches!(tree.remove_view(ViewId::ROOT), Err(SceneError::RootView)));
    }
}
