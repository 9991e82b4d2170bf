//! Contract with the scene layer: coordinate conversion and ray casting.
//!
//! The engine never renders or ray-casts itself. Everything it knows about
//! where things are on screen comes through [`CoordinateBridge`].

use bevy::math::{Vec2, Vec3};

/// One ray hit, nearest-first within the list it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Hit point in world space.
    pub point: Vec3,
    /// Distance from the camera along the ray.
    pub distance: f32,
    /// The landmark whose symbol was hit, for landmark intersections.
    pub landmark: Option<usize>,
}

impl Intersection {
    pub fn mesh(point: Vec3, distance: f32) -> Self {
        Self {
            point,
            distance,
            landmark: None,
        }
    }

    pub fn landmark(index: usize, point: Vec3, distance: f32) -> Self {
        Self {
            point,
            distance,
            landmark: Some(index),
        }
    }
}

/// Conversions and hit tests provided by the scene.
///
/// All methods are expected to be pure and consistent within one frame.
/// Hit lists are ordered nearest-first; an empty list means no hit.
pub trait CoordinateBridge {
    /// Model-local point to screen pixels.
    fn local_to_screen(&self, point: Vec3) -> Vec2;

    /// World point to model-local coordinates.
    fn world_to_local(&self, point: Vec3) -> Vec3;

    /// Ray cast from a screen position against the mesh (or image plane).
    fn intersect_mesh(&self, screen: Vec2) -> Vec<Intersection>;

    /// Ray cast from a screen position against the symbols of `landmarks`
    /// (index and model-local point of every placed landmark).
    fn intersect_landmarks(&self, screen: Vec2, landmarks: &[(usize, Vec3)]) -> Vec<Intersection>;

    /// Whether a landmark's symbol is unobscured from the camera.
    fn is_landmark_visible(&self, _index: usize) -> bool {
        true
    }

    /// First mesh hit under `screen`, in model-local coordinates.
    fn mesh_point(&self, screen: Vec2) -> Option<Vec3> {
        self.intersect_mesh(screen)
            .first()
            .map(|hit| self.world_to_local(hit.point))
    }
}

/// Up to `n` candidates ordered nearest-first to `point` in model space.
///
/// Ties keep candidate order. Fewer than `n` candidates returns them all.
pub fn find_closest_landmarks(candidates: &[(usize, Vec3)], point: Vec3, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = candidates
        .iter()
        .map(|&(index, p)| (index, p.distance_squared(point)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.into_iter().take(n).map(|(index, _)| index).collect()
}

/// A flat image shown on a plane facing the camera.
///
/// Model-local units are image pixels with the origin at the image's top
/// left corner and Y growing downward, matching screen space. The image is
/// drawn at `offset` with a uniform `zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneBridge {
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
    /// Screen position of the image's top left corner.
    pub offset: Vec2,
    /// World position of the model's local origin.
    pub origin: Vec3,
    pub camera_distance: f32,
    /// Screen radius (px) of a landmark symbol.
    pub landmark_radius: f32,
}

impl PlaneBridge {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            offset: Vec2::ZERO,
            origin: Vec3::ZERO,
            camera_distance: 100.0,
            landmark_radius: 4.0,
        }
    }

    #[must_use]
    pub fn with_view(mut self, zoom: f32, offset: Vec2) -> Self {
        self.zoom = zoom;
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    fn screen_to_local(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom
    }

    fn inside_image(&self, local: Vec2) -> bool {
        (0.0..=self.width).contains(&local.x) && (0.0..=self.height).contains(&local.y)
    }
}

impl CoordinateBridge for PlaneBridge {
    fn local_to_screen(&self, point: Vec3) -> Vec2 {
        self.offset + point.truncate() * self.zoom
    }

    fn world_to_local(&self, point: Vec3) -> Vec3 {
        point - self.origin
    }

    fn intersect_mesh(&self, screen: Vec2) -> Vec<Intersection> {
        let local = self.screen_to_local(screen);
        if !self.inside_image(local) {
            return Vec::new();
        }
        vec![Intersection::mesh(local.extend(0.0) + self.origin, self.camera_distance)]
    }

    fn intersect_landmarks(&self, screen: Vec2, landmarks: &[(usize, Vec3)]) -> Vec<Intersection> {
        let mut hits: Vec<(f32, Intersection)> = landmarks
            .iter()
            .filter_map(|&(index, point)| {
                let gap = self.local_to_screen(point).distance(screen);
                (gap <= self.landmark_radius).then(|| {
                    let hit = Intersection::landmark(
                        index,
                        point + self.origin,
                        self.camera_distance - self.landmark_radius,
                    );
                    (gap, hit)
                })
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, hit)| hit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_closest_handles_fewer_candidates() {
        let candidates = [(0, Vec3::new(10.0, 0.0, 0.0)), (1, Vec3::new(1.0, 0.0, 0.0))];
        assert_eq!(find_closest_landmarks(&candidates, Vec3::ZERO, 4), vec![1, 0]);
        assert_eq!(find_closest_landmarks(&candidates, Vec3::ZERO, 1), vec![1]);
        assert!(find_closest_landmarks(&[], Vec3::ZERO, 4).is_empty());
    }

    #[test]
    fn test_plane_round_trip() {
        let bridge = PlaneBridge::new(200.0, 100.0)
            .with_view(2.0, Vec2::new(50.0, 20.0))
            .with_origin(Vec3::new(5.0, 5.0, 0.0));

        let hit = bridge.intersect_mesh(Vec2::new(150.0, 120.0));
        assert_eq!(hit.len(), 1);
        let local = bridge.world_to_local(hit[0].point);
        assert_eq!(local, Vec3::new(50.0, 50.0, 0.0));
        assert_eq!(bridge.local_to_screen(local), Vec2::new(150.0, 120.0));
    }

    #[test]
    fn test_plane_misses_outside_image() {
        let bridge = PlaneBridge::new(100.0, 100.0);
        assert!(bridge.intersect_mesh(Vec2::new(-1.0, 50.0)).is_empty());
        assert!(bridge.mesh_point(Vec2::new(50.0, 101.0)).is_none());
    }

    #[test]
    fn test_plane_landmark_hits_are_nearer_than_mesh() {
        let bridge = PlaneBridge::new(100.0, 100.0);
        let landmarks = [(0, Vec3::new(10.0, 10.0, 0.0)), (1, Vec3::new(12.0, 10.0, 0.0))];

        let hits = bridge.intersect_landmarks(Vec2::new(12.5, 10.0), &landmarks);
        assert_eq!(hits.iter().map(|h| h.landmark).collect::<Vec<_>>(), vec![Some(1), Some(0)]);

        let mesh = bridge.intersect_mesh(Vec2::new(12.5, 10.0));
        assert!(hits[0].distance < mesh[0].distance);
    }
}
