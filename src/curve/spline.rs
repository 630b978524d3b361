use glam::{Quat, Vec3};

/// Position and tangent of a curve at a progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub position: Vec3,
    /// Derivative with respect to progress (not normalized).
    pub tangent: Vec3,
}

impl CurveSample {
    /// Shortest-arc rotation turning +Z onto the tangent.
    ///
    /// Returns identity when the tangent is degenerate.
    #[must_use]
    pub fn orientation(&self) -> Quat {
        match self.tangent.try_normalize() {
            Some(direction) => Quat::from_rotation_arc(Vec3::Z, direction),
            None => Quat::IDENTITY,
        }
    }
}

/// Samples a uniform Catmull-Rom spline through `vertices` at `progress`.
///
/// Progress is clamped to `[0, 1]` and mapped uniformly over vertex indices,
/// so progress `i / (n - 1)` reproduces vertex `i` exactly. Interior tangents
/// are central differences; the end tangents are one-sided differences.
#[must_use]
pub fn sample(vertices: &[Vec3], progress: f32) -> CurveSample {
    let n = vertices.len();
    match n {
        0 => {
            return CurveSample {
                position: Vec3::ZERO,
                tangent: Vec3::ZERO,
            };
        }
        1 => {
            return CurveSample {
                position: vertices[0],
                tangent: Vec3::ZERO,
            };
        }
        _ => {}
    }

    let last = n - 1;
    let f = progress.clamp(0.0, 1.0) * last as f32;
    // Segment [index, index + 1], the final vertex belongs to the last segment
    let index = (f.floor() as usize).min(last - 1);
    let t = f - index as f32;

    let v0 = vertices[index];
    let v1 = vertices[index + 1];
    let m0 = tangent_at(vertices, index);
    let m1 = tangent_at(vertices, index + 1);

    let t2 = t * t;
    let t3 = t2 * t;

    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;

    let d2 = -6.0 * t2 + 6.0 * t;
    let d3 = 3.0 * t2 - 2.0 * t;
    let d0 = -d2;
    let d1 = 3.0 * t2 - 4.0 * t + 1.0;

    let position = v0 * s0 + m0 * s1 + v1 * s2 + m1 * s3;
    // d/dprogress = d/dt * (n - 1)
    let tangent = (v0 * d0 + m0 * d1 + v1 * d2 + m1 * d3) * last as f32;

    CurveSample { position, tangent }
}

fn tangent_at(vertices: &[Vec3], index: usize) -> Vec3 {
    let last = vertices.len() - 1;
    if index == 0 {
        vertices[1] - vertices[0]
    } else if index == last {
        vertices[last] - vertices[last - 1]
    } else {
        (vertices[index + 1] - vertices[index - 1]) * 0.5
    }
}
