//! Screen-space geometry shared by handles and gestures.
//!
//! Screen coordinates follow the display convention: X grows to the right
//! and Y grows downward.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four corners of an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Corners in role order (TL, TR, BL, BR).
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle spanned by two arbitrary corners, normalised so `min <= max`.
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Tight bounds of a set of points. `None` for an empty set.
    pub fn bounding(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |rect, p| Self {
            min: rect.min.min(p),
            max: rect.max.max(p),
        }))
    }

    /// Grow (or shrink for negative values) by `amount` on every side.
    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn corner(&self, corner: Corner) -> Vec2 {
        match corner {
            Corner::TopLeft => self.min,
            Corner::TopRight => Vec2::new(self.max.x, self.min.y),
            Corner::BottomLeft => Vec2::new(self.min.x, self.max.y),
            Corner::BottomRight => self.max,
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Square hit test: `point` within `radius` of `centre` on both axes.
pub fn box_intersection(point: Vec2, centre: Vec2, radius: f32) -> bool {
    (point.x - centre.x).abs() <= radius && (point.y - centre.y).abs() <= radius
}

/// Round hit test: `point` within Euclidean `radius` of `centre`.
pub fn circle_intersection(point: Vec2, centre: Vec2, radius: f32) -> bool {
    point.distance(centre) <= radius
}

/// Sort four screen points into (top-left, top-right, bottom-left, bottom-right).
///
/// Returns indices into `points` in role order. Points are ordered by
/// ascending Y first; the upper and lower pairs are then each ordered by
/// ascending X. Both passes are stable, so ties keep their input order.
pub fn sort_by_position(points: [Vec2; 4]) -> [usize; 4] {
    let mut order = [0, 1, 2, 3];
    order.sort_by(|&a, &b| points[a].y.total_cmp(&points[b].y));
    if points[order[0]].x > points[order[1]].x {
        order.swap(0, 1);
    }
    if points[order[2]].x > points[order[3]].x {
        order.swap(2, 3);
    }
    order
}

/// Whether four points form an axis-aligned rectangle.
///
/// `tolerance` is relative to the rectangle's extent on each axis, so a
/// value of `0.01` allows corners to be off by one percent.
pub fn makes_rectangle_shape(points: [Vec2; 4], tolerance: f32) -> bool {
    let [tl, tr, bl, br] = sort_by_position(points).map(|i| points[i]);
    let margin_x = ((br.x - tl.x) * tolerance).abs();
    let margin_y = ((br.y - tl.y) * tolerance).abs();
    let near = |a: f32, b: f32, margin: f32| a >= b - margin && a <= b + margin;

    near(tr.y, tl.y, margin_y)
        && near(bl.y, br.y, margin_y)
        && near(bl.x, tl.x, margin_x)
        && near(tr.x, br.x, margin_x)
}

/// The inner rectangle after grabbing `corner` of `old` and moving it to `pointer`.
///
/// The handle sits `padding` outside the inner rectangle, so the grabbed
/// inner corner lands `padding` inward from the pointer. The opposite
/// corner is left exactly where it was.
pub fn resize_rect(old: ScreenRect, corner: Corner, pointer: Vec2, padding: f32) -> ScreenRect {
    let mut new = old;
    match corner {
        Corner::TopLeft => {
            new.min = pointer + Vec2::splat(padding);
        }
        Corner::BottomRight => {
            new.max = pointer - Vec2::splat(padding);
        }
        Corner::TopRight => {
            new.min.y = pointer.y + padding;
            new.max.x = pointer.x - padding;
        }
        Corner::BottomLeft => {
            new.min.x = pointer.x + padding;
            new.max.y = pointer.y - padding;
        }
    }
    new
}

/// Map `point` linearly from `old` onto `new`, each axis independently.
///
/// Points on the edges of `old` land exactly on the matching edges of
/// `new`. A degenerate axis (zero extent) maps onto `new.min`.
pub fn remap_point(point: Vec2, old: ScreenRect, new: ScreenRect) -> Vec2 {
    let axis = |p: f32, old_min: f32, old_max: f32, new_min: f32, new_max: f32| {
        let span = old_max - old_min;
        let t = if span == 0.0 { 0.0 } else { (p - old_min) / span };
        new_min * (1.0 - t) + new_max * t
    };
    Vec2::new(
        axis(point.x, old.min.x, old.max.x, new.min.x, new.max.x),
        axis(point.y, old.min.y, old.max.y, new.min.y, new.max.y),
    )
}

/// Angle of `pointer` around `center`, measured clockwise on screen from "up".
///
/// Screen Y grows downward, so it is inverted before measuring. `None` when
/// the pointer sits exactly on the center.
pub fn angle_from_up(center: Vec2, pointer: Vec2) -> Option<f32> {
    let dx = pointer.x - center.x;
    let dy = center.y - pointer.y;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(dx.atan2(dy))
}

/// Rotate `point` about `center` by `angle` radians (clockwise on screen).
pub fn rotate_about(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let offset = point - center;
    Vec2::new(
        offset.x * cos - offset.y * sin + center.x,
        offset.x * sin + offset.y * cos + center.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(points: [Vec2; 4]) -> [Vec2; 4] {
        sort_by_position(points).map(|i| points[i])
    }

    #[test]
    fn test_sort_by_position_labels_corners() {
        let points = [
            Vec2::new(110.0, 60.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 60.0),
            Vec2::new(110.0, 10.0),
        ];
        assert_eq!(sort_by_position(points), [1, 3, 2, 0]);
    }

    #[test]
    fn test_sort_by_position_is_idempotent() {
        let samples = [
            [Vec2::new(10.0, 5.0), Vec2::new(0.0, 6.0), Vec2::new(0.0, 20.0), Vec2::new(10.0, 20.0)],
            [Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0), Vec2::new(1.0, 3.0), Vec2::new(2.0, 3.0)],
            [Vec2::new(-4.0, 8.0), Vec2::new(7.0, -2.0), Vec2::new(0.0, 0.0), Vec2::new(5.0, 8.0)],
        ];
        for points in samples {
            let once = roles(points);
            assert_eq!(roles(once), once);
        }
    }

    #[test]
    fn test_sort_by_position_ties_keep_input_order() {
        // All four share Y: Y-sort keeps input order, pairs sort by X.
        let points = [
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(9.0, 0.0),
            Vec2::new(1.0, 0.0),
        ];
        assert_eq!(sort_by_position(points), [0, 1, 3, 2]);
    }

    #[test]
    fn test_makes_rectangle_shape() {
        let rect = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.5),
            Vec2::new(0.5, 50.0),
            Vec2::new(100.0, 50.0),
        ];
        assert!(makes_rectangle_shape(rect, 0.01));

        let skewed = [
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(30.0, 50.0),
            Vec2::new(100.0, 50.0),
        ];
        assert!(!makes_rectangle_shape(skewed, 0.01));
    }

    #[test]
    fn test_remap_keeps_fixed_corner() {
        let old = ScreenRect::new(Vec2::new(10.0, 20.0), Vec2::new(60.0, 90.0));
        let new = resize_rect(old, Corner::TopLeft, Vec2::new(-3.7, 5.3), 10.0);
        assert_eq!(new.max, old.max);

        let fixed = old.corner(Corner::BottomRight);
        assert_eq!(remap_point(fixed, old, new), fixed);
    }

    #[test]
    fn test_remap_scales_interior_points() {
        let old = ScreenRect::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let new = ScreenRect::new(Vec2::ZERO, Vec2::new(20.0, 40.0));
        let mapped = remap_point(Vec2::new(5.0, 2.5), old, new);
        assert!((mapped - Vec2::new(10.0, 10.0)).length() < 1e-5);
    }

    #[test]
    fn test_remap_degenerate_axis() {
        let old = ScreenRect::new(Vec2::new(5.0, 0.0), Vec2::new(5.0, 10.0));
        let new = ScreenRect::new(Vec2::new(8.0, 0.0), Vec2::new(12.0, 10.0));
        let mapped = remap_point(Vec2::new(5.0, 5.0), old, new);
        assert!((mapped.x - 8.0).abs() < 1e-6);
        assert!((mapped.y - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_rect_corners() {
        let old = ScreenRect::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        let tr = resize_rect(old, Corner::TopRight, Vec2::new(150.0, -20.0), 2.0);
        assert_eq!(tr.min, Vec2::new(0.0, -18.0));
        assert_eq!(tr.max, Vec2::new(148.0, 100.0));

        let bl = resize_rect(old, Corner::BottomLeft, Vec2::new(-20.0, 150.0), 2.0);
        assert_eq!(bl.min, Vec2::new(-18.0, 0.0));
        assert_eq!(bl.max, Vec2::new(100.0, 148.0));
    }

    #[test]
    fn test_rotation_inverse_returns_to_start() {
        let center = Vec2::new(50.0, 50.0);
        let point = Vec2::new(80.0, 35.0);
        let theta = 0.73;
        let back = rotate_about(rotate_about(point, center, theta), center, -theta);
        assert!((back - point).length() < 1e-4);
    }

    #[test]
    fn test_angle_from_up_is_clockwise() {
        let center = Vec2::new(0.0, 0.0);
        let up = angle_from_up(center, Vec2::new(0.0, -10.0)).unwrap();
        let right = angle_from_up(center, Vec2::new(10.0, 0.0)).unwrap();
        assert!(up.abs() < 1e-6);
        assert!((right - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(angle_from_up(center, center).is_none());

        // A quarter turn clockwise moves "up" to "right" on screen.
        let rotated = rotate_about(Vec2::new(0.0, -10.0), center, right - up);
        assert!((rotated - Vec2::new(10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_hit_shapes() {
        let centre = Vec2::new(10.0, 10.0);
        assert!(box_intersection(Vec2::new(13.0, 7.0), centre, 3.0));
        assert!(!box_intersection(Vec2::new(13.5, 10.0), centre, 3.0));
        assert!(circle_intersection(Vec2::new(12.0, 12.0), centre, 3.0));
        assert!(!circle_intersection(Vec2::new(13.0, 13.0), centre, 3.0));
    }
}
