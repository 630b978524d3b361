//! Pointer input.
//!
//! The pointer is a single, possibly absent world-space point. Event handlers
//! write it through a [`PointerHandle`] (last write wins); the engine reads it
//! once per frame and hands the value to the deformation pass explicitly.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3};
use parking_lot::RwLock;

/// Converts a screen-space pointer position into a world-space point.
pub trait PointerProjector {
    /// Returns `None` when the pointer does not map onto the interaction plane.
    fn project(&self, screen: Vec2) -> Option<Vec3>;
}

/// Unprojects through a camera onto the plane `z = plane_z`.
///
/// Screen coordinates are in pixels with the origin at the top-left corner.
/// Clip space depth follows the wgpu convention (`0..1`).
#[derive(Debug, Clone)]
pub struct PlaneProjector {
    viewport: Vec2,
    inverse_view_projection: Mat4,
    plane_z: f32,
}

impl PlaneProjector {
    #[must_use]
    pub fn new(view_projection: Mat4, viewport: Vec2, plane_z: f32) -> Self {
        Self {
            viewport,
            inverse_view_projection: view_projection.inverse(),
            plane_z,
        }
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn set_view_projection(&mut self, view_projection: Mat4) {
        self.inverse_view_projection = view_projection.inverse();
    }

    #[must_use]
    pub fn plane_z(&self) -> f32 {
        self.plane_z
    }
}

impl PointerProjector for PlaneProjector {
    fn project(&self, screen: Vec2) -> Option<Vec3> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            screen.x / self.viewport.x * 2.0 - 1.0,
            1.0 - screen.y / self.viewport.y * 2.0,
        );

        let near = self.inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = self.inverse_view_projection.project_point3(ndc.extend(1.0));
        let direction = far - near;
        if direction.z.abs() < f32::EPSILON {
            return None;
        }

        let t = (self.plane_z - near.z) / direction.z;
        let hit = near + direction * t;
        hit.is_finite().then_some(hit)
    }
}

/// Shared, last-write-wins pointer slot.
#[derive(Debug, Clone, Default)]
pub struct PointerHandle {
    inner: Arc<RwLock<Option<Vec3>>>,
}

impl PointerHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, point: Option<Vec3>) {
        *self.inner.write() = point;
    }

    pub fn clear(&self) {
        self.set(None);
    }

    #[must_use]
    pub fn get(&self) -> Option<Vec3> {
        *self.inner.read()
    }
}
