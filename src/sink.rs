//! Output side of the engine.
//!
//! [`InstanceSink`] receives one [`InstanceTransform`] per instance per frame.
//! [`InstanceBuffer`] is a ready-made sink holding GPU-layout records that a
//! renderer can upload with `bytemuck::cast_slice`.
//!
//! [`MaterialProjector`] receives the formation's world transform once at
//! construction, for baking a picture onto the instances.

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat4, Quat, Vec3};

use crate::curve::CurveSample;

/// World transform of one instance for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl InstanceTransform {
    #[must_use]
    pub fn from_sample(sample: &CurveSample, scale: f32) -> Self {
        Self {
            position: sample.position,
            rotation: sample.orientation(),
            scale: Vec3::splat(scale),
        }
    }

    #[inline]
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Receives per-instance transforms every frame.
pub trait InstanceSink {
    /// Called before the first write of a frame.
    fn begin_frame(&mut self, _instance_count: usize) {}

    fn write(&mut self, index: usize, transform: &InstanceTransform);

    /// Called after the last write of a frame.
    fn end_frame(&mut self) {}
}

/// GPU-layout instance record.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
}

impl From<&InstanceTransform> for InstanceRaw {
    fn from(transform: &InstanceTransform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

/// CPU-side instance buffer.
#[derive(Debug, Clone, Default)]
pub struct InstanceBuffer {
    transforms: Vec<InstanceTransform>,
    raw: Vec<InstanceRaw>,
    frames: u64,
}

impl InstanceBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn transforms(&self) -> &[InstanceTransform] {
        &self.transforms
    }

    #[must_use]
    pub fn raw(&self) -> &[InstanceRaw] {
        &self.raw
    }

    /// Byte view of the records for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.raw)
    }

    /// Number of completed frames written into this buffer.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl InstanceSink for InstanceBuffer {
    fn begin_frame(&mut self, instance_count: usize) {
        self.transforms.resize(instance_count, InstanceTransform::default());
        self.raw.resize(instance_count, InstanceRaw::zeroed());
    }

    fn write(&mut self, index: usize, transform: &InstanceTransform) {
        if index >= self.transforms.len() {
            self.begin_frame(index + 1);
        }
        self.transforms[index] = *transform;
        self.raw[index] = InstanceRaw::from(transform);
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }
}

/// Bakes a picture onto the instances from the formation's world transform.
pub trait MaterialProjector {
    /// `world` maps the unit square centered on the origin onto the formation area.
    fn project(&mut self, world: &Affine3A);
}
