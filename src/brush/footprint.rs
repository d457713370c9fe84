//! Brush footprint calculation: 3D surface hit → UV-space footprint
//!
//! Two modes are supported:
//! - `Direct`: the physical brush size is used as the UV size, angle 0. Cheap
//!   and the default.
//! - `DistortionAware`: two offset points are re-cast against the surface to
//!   measure how the local UV layout stretches the brush, giving strokes of a
//!   consistent world size.
//!
//! The center is always the hit UV, so the footprint stays anchored at the
//! hit point however distorted the surrounding UVs are.

use glam::{Vec2, Vec3};

use super::UvFootprint;
use crate::core::config::FootprintConfig;

/// Below this length a projected tangent is considered degenerate
const MIN_TANGENT_LENGTH: f32 = 1e-4;

/// Tangent information available for a hit triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TangentData {
    Available(Vec3),
    /// Mesh data cannot be read on the CPU
    NotReadable,
    /// Mesh has no tangent channel
    NoTangentChannel,
    /// Hit reported a triangle the mesh does not have
    TriangleOutOfRange,
}

/// A ray hit on a paintable surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
    pub tangent: TangentData,
}

impl SurfaceHit {
    pub fn new(point: Vec3, uv: Vec2, normal: Vec3, tangent: TangentData) -> Self {
        Self { point, uv, normal, tangent }
    }
}

/// Re-casts rays against the collision surface that produced a hit
pub trait SurfaceProbe {
    /// UV coordinate where the ray meets the surface, if it does
    fn raycast_uv(&self, origin: Vec3, direction: Vec3) -> Option<Vec2>;
}

impl<F> SurfaceProbe for F
where
    F: Fn(Vec3, Vec3) -> Option<Vec2>,
{
    fn raycast_uv(&self, origin: Vec3, direction: Vec3) -> Option<Vec2> {
        self(origin, direction)
    }
}

/// How the UV size and rotation of a footprint are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FootprintMode {
    #[default]
    Direct,
    DistortionAware,
}

/// Converts surface hits into UV footprints
#[derive(Debug, Clone, Default)]
pub struct FootprintCalculator {
    config: FootprintConfig,
}

impl FootprintCalculator {
    pub fn new(config: FootprintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FootprintConfig {
        &self.config
    }

    /// UV size of an undistorted brush
    pub fn expected_size(&self, physical_width: f32, physical_height: f32) -> Vec2 {
        Vec2::new(physical_width, physical_height) * self.config.uv_per_world
    }

    /// Compute a footprint in the requested mode
    ///
    /// `DistortionAware` without a probe degrades to `Direct`.
    pub fn compute(
        &self,
        hit: &SurfaceHit,
        physical_width: f32,
        physical_height: f32,
        mode: FootprintMode,
        probe: Option<&dyn SurfaceProbe>,
    ) -> UvFootprint {
        match (mode, probe) {
            (FootprintMode::Direct, _) => self.direct(hit, physical_width, physical_height),
            (FootprintMode::DistortionAware, Some(probe)) => {
                self.distortion_aware(hit, physical_width, physical_height, probe)
            }
            (FootprintMode::DistortionAware, None) => {
                tracing::debug!("No surface probe for distortion-aware footprint, using direct size");
                self.direct(hit, physical_width, physical_height)
            }
        }
    }

    /// Physical size read directly as UV size, no rotation
    pub fn direct(&self, hit: &SurfaceHit, physical_width: f32, physical_height: f32) -> UvFootprint {
        UvFootprint::axis_aligned(hit.uv, self.expected_size(physical_width, physical_height))
    }

    /// Measure the UV footprint by probing the surface at the brush edges
    pub fn distortion_aware(
        &self,
        hit: &SurfaceHit,
        physical_width: f32,
        physical_height: f32,
        probe: &dyn SurfaceProbe,
    ) -> UvFootprint {
        let expected = self.expected_size(physical_width, physical_height);
        let (tangent, bitangent) = surface_frame(hit);

        let along_tangent = self.probe_uv(probe, hit, hit.point + tangent * (physical_width * 0.5));
        let along_bitangent =
            self.probe_uv(probe, hit, hit.point + bitangent * (physical_height * 0.5));

        let delta_u = along_tangent.map(|uv| uv - hit.uv);
        let delta_v = along_bitangent.map(|uv| uv - hit.uv);

        let measured_width = delta_u.map(|d| d.length() * 2.0).unwrap_or(f32::NAN);
        let measured_height = delta_v.map(|d| d.length() * 2.0).unwrap_or(f32::NAN);

        let width = self.clamp_extent(measured_width, expected.x, "width");
        let height = self.clamp_extent(measured_height, expected.y, "height");

        let angle = delta_u
            .filter(|d| d.is_finite() && d.length() > f32::EPSILON)
            .map(|d| d.y.atan2(d.x))
            .unwrap_or(0.0);

        UvFootprint::new(hit.uv, Vec2::new(width, height), angle)
    }

    fn probe_uv(&self, probe: &dyn SurfaceProbe, hit: &SurfaceHit, target: Vec3) -> Option<Vec2> {
        let normal = hit.normal.normalize_or_zero();
        let origin = target + normal * self.config.probe_height;
        probe.raycast_uv(origin, -normal)
    }

    /// Replace NaN, non-positive or seam-sized extents with the expected size
    fn clamp_extent(&self, measured: f32, expected: f32, axis: &str) -> f32 {
        let limit = expected * self.config.max_distortion_ratio;
        if !measured.is_finite() || measured <= 0.0 || measured > limit {
            tracing::warn!(
                "Correcting brush {}: measured {} UV, expected {} (limit {})",
                axis,
                measured,
                expected,
                limit
            );
            expected
        } else {
            measured
        }
    }
}

/// Orthonormal tangent/bitangent pair lying in the hit plane
///
/// Missing or degenerate tangent data falls back to world up projected onto
/// the plane, then to world forward when up is parallel to the normal.
pub fn surface_frame(hit: &SurfaceHit) -> (Vec3, Vec3) {
    let normal = hit.normal.normalize_or_zero();

    let tangent = match hit.tangent {
        TangentData::Available(t) => project_onto_plane(t, normal),
        other => {
            tracing::debug!("Tangent unavailable ({:?}), projecting world up", other);
            None
        }
    }
    .or_else(|| project_onto_plane(Vec3::Y, normal))
    .or_else(|| project_onto_plane(Vec3::Z, normal))
    .unwrap_or(Vec3::X);

    let bitangent = normal.cross(tangent).normalize_or_zero();
    (tangent, bitangent)
}

fn project_onto_plane(v: Vec3, normal: Vec3) -> Option<Vec3> {
    let projected = v - normal * v.dot(normal);
    if projected.length() > MIN_TANGENT_LENGTH {
        Some(projected.normalize())
    } else {
        None
    }
}
