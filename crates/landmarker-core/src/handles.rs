//! Screen-space handles derived from the current selection.
//!
//! Nothing here is stored between frames: handle boxes are recomputed from
//! the landmarks' projected positions every time they are needed.

use bevy::math::Vec2;

use crate::bridge::CoordinateBridge;
use crate::config::EditorConfig;
use crate::geometry::{Corner, ScreenRect, box_intersection, circle_intersection};
use crate::model::AnnotationModel;

/// Corner grab order. TL and BR win over the other two when handles overlap.
const CORNER_HIT_ORDER: [Corner; 4] = [
    Corner::TopLeft,
    Corner::BottomRight,
    Corner::BottomLeft,
    Corner::TopRight,
];

fn hit_corner(rect: &ScreenRect, pointer: Vec2, radius: f32) -> Option<Corner> {
    CORNER_HIT_ORDER
        .into_iter()
        .find(|&corner| box_intersection(pointer, rect.corner(corner), radius))
}

/// The box drawn around a group selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    /// Tight bounds of the selected landmarks.
    pub inner: ScreenRect,
    pub padding: f32,
    pub handle_radius: f32,
}

impl SelectionBox {
    pub fn from_points(points: impl IntoIterator<Item = Vec2>, config: &EditorConfig) -> Option<Self> {
        ScreenRect::bounding(points).map(|inner| Self {
            inner,
            padding: config.selection_padding,
            handle_radius: config.selection_handle_radius,
        })
    }

    /// The drawn box; resize handles sit on its corners.
    pub fn outer(&self) -> ScreenRect {
        self.inner.expand(self.padding)
    }

    /// Centre of the rotation grip, above the top edge.
    pub fn rotation_handle(&self) -> Vec2 {
        let outer = self.outer();
        Vec2::new(outer.center().x, outer.min.y - self.handle_radius * 3.0)
    }

    pub fn hit_resize(&self, pointer: Vec2, grab_padding: f32) -> Option<Corner> {
        hit_corner(&self.outer(), pointer, self.handle_radius + grab_padding)
    }

    pub fn hit_rotation(&self, pointer: Vec2, grab_padding: f32) -> bool {
        circle_intersection(pointer, self.rotation_handle(), self.handle_radius + grab_padding)
    }

    /// Inside the box but clear of every corner handle.
    pub fn hit_body(&self, pointer: Vec2, grab_padding: f32) -> bool {
        self.outer().contains(pointer) && self.hit_resize(pointer, grab_padding).is_none()
    }
}

/// Corner handles of the bounding-box annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBoxHandles {
    pub rect: ScreenRect,
    pub half_width: f32,
}

impl BoundingBoxHandles {
    pub fn hit(&self, pointer: Vec2, grab_padding: f32) -> Option<Corner> {
        hit_corner(&self.rect, pointer, self.half_width + grab_padding)
    }
}

/// Which handle regions a screen position falls on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleHits {
    pub bounding_box: Option<Corner>,
    pub resize: Option<Corner>,
    pub body: bool,
    pub rotate: bool,
}

impl HandleHits {
    /// A grab handle (not the selection body) was hit.
    pub fn any_handle(&self) -> bool {
        self.bounding_box.is_some() || self.resize.is_some() || self.rotate
    }
}

/// All handles active for the current selection and mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandleGeometry {
    pub selection: Option<SelectionBox>,
    pub bounding_box: Option<BoundingBoxHandles>,
}

impl HandleGeometry {
    /// Project the model and build the handles that are currently active.
    ///
    /// The selection box needs at least `min_group_selection` placed and
    /// selected landmarks. Bounding-box handles need bounding-box mode with
    /// the first four landmarks placed.
    pub fn compute(
        model: &AnnotationModel,
        bridge: &dyn CoordinateBridge,
        config: &EditorConfig,
        bounding_box_mode: bool,
    ) -> Self {
        let selected = model.selected_points();
        let selection = if selected.len() >= config.min_group_selection {
            SelectionBox::from_points(selected.iter().map(|&(_, p)| bridge.local_to_screen(p)), config)
        } else {
            None
        };

        let bounding_box = if bounding_box_mode {
            model
                .bounding_box_points()
                .and_then(|points| ScreenRect::bounding(points.map(|(_, p)| bridge.local_to_screen(p))))
                .map(|rect| BoundingBoxHandles {
                    rect,
                    half_width: config.bounding_box_handle_half_width,
                })
        } else {
            None
        };

        Self { selection, bounding_box }
    }

    pub fn hit_test(&self, pointer: Vec2, config: &EditorConfig) -> HandleHits {
        let resize_padding = config.resize_handle_padding;
        let mut hits = HandleHits::default();
        if let Some(selection) = &self.selection {
            hits.resize = selection.hit_resize(pointer, resize_padding);
            hits.body = selection.hit_body(pointer, resize_padding);
            hits.rotate = selection.hit_rotation(pointer, config.rotation_handle_padding);
        }
        if let Some(bbox) = &self.bounding_box {
            hits.bounding_box = bbox.hit(pointer, resize_padding);
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection_box() -> SelectionBox {
        // inner (20,20)-(80,60), outer (10,10)-(90,70), handle radius 4
        SelectionBox::from_points([Vec2::new(20.0, 20.0), Vec2::new(80.0, 60.0)], &EditorConfig::default())
            .unwrap()
    }

    #[test]
    fn test_resize_handles_on_outer_corners() {
        let sb = selection_box();
        assert_eq!(sb.hit_resize(Vec2::new(12.0, 8.0), 1.0), Some(Corner::TopLeft));
        assert_eq!(sb.hit_resize(Vec2::new(90.0, 70.0), 1.0), Some(Corner::BottomRight));
        assert_eq!(sb.hit_resize(Vec2::new(10.0, 70.0), 1.0), Some(Corner::BottomLeft));
        assert_eq!(sb.hit_resize(Vec2::new(94.0, 15.0), 1.0), Some(Corner::TopRight));
        assert_eq!(sb.hit_resize(Vec2::new(50.0, 10.0), 1.0), None);
    }

    #[test]
    fn test_body_excludes_corners() {
        let sb = selection_box();
        assert!(sb.hit_body(Vec2::new(50.0, 40.0), 1.0));
        assert!(!sb.hit_body(Vec2::new(11.0, 11.0), 1.0));
        assert!(!sb.hit_body(Vec2::new(95.0, 40.0), 1.0));
    }

    #[test]
    fn test_rotation_handle_above_box() {
        let sb = selection_box();
        assert_eq!(sb.rotation_handle(), Vec2::new(50.0, -2.0));
        assert!(sb.hit_rotation(Vec2::new(55.0, -2.0), 2.0));
        assert!(!sb.hit_rotation(Vec2::new(57.0, -2.0), 2.0));
    }

    #[test]
    fn test_any_handle_ignores_body() {
        let hits = HandleHits {
            body: true,
            ..HandleHits::default()
        };
        assert!(!hits.any_handle());
        let hits = HandleHits {
            rotate: true,
            ..HandleHits::default()
        };
        assert!(hits.any_handle());
    }
}
