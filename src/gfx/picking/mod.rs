//! # Pointer picking
//!
//! Converts cursor positions into world-space rays and resolves them against
//! the pickable bodies and the ground plane.
//!
//! 1. **Cursor to ray**: unproject the cursor through the inverse
//!    view-projection matrix.
//! 2. **Ray tests**: ray/sphere for bodies, ray/plane for the ground and the
//!    force-drag plane.
//! 3. **Resolution**: the nearest sphere wins; otherwise the ground point is
//!    reported as an empty hit.

use cgmath::{InnerSpace, SquareMatrix, Vector3, Vector4};

use crate::gfx::camera::{Camera, OrbitCamera};
use crate::interaction::PointerHit;
use crate::physics::BodyKey;
use crate::simulation::sandbox::PARTICLE_RADIUS;
use crate::simulation::SimulationManager;
use crate::state::{LabState, SimulationMode};

/// A 3D ray for intersection testing.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3<f32>,
    /// Normalized direction.
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Distance to the nearest intersection with a sphere in front of the
    /// origin.
    pub fn intersect_sphere(&self, center: Vector3<f32>, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.magnitude2() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }

    /// Distance to the horizontal plane `y = height`, if it lies ahead.
    pub fn intersect_plane_y(&self, height: f32) -> Option<f32> {
        if self.direction.y.abs() < 1e-6 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then_some(t)
    }
}

/// A pickable sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereTarget {
    pub key: BodyKey,
    pub center: Vector3<f32>,
    pub radius: f32,
}

/// Cursor position in physical pixels to a world ray.
pub fn screen_to_ray(
    screen_pos: (f32, f32),
    screen_size: (f32, f32),
    camera: &OrbitCamera,
) -> Ray {
    let (mouse_x, mouse_y) = screen_pos;
    let (width, height) = (screen_size.0.max(1.0), screen_size.1.max(1.0));

    let ndc_x = (2.0 * mouse_x) / width - 1.0;
    let ndc_y = 1.0 - (2.0 * mouse_y) / height;

    let inverse = camera
        .build_view_projection_matrix()
        .invert()
        .unwrap_or_else(cgmath::Matrix4::identity);

    // wgpu clip space has depth in 0..1.
    let unproject = |depth: f32| {
        let world = inverse * Vector4::new(ndc_x, ndc_y, depth, 1.0);
        world.truncate() / world.w
    };
    let near = unproject(0.0);
    let far = unproject(1.0);

    Ray::new(near, far - near)
}

/// Nearest sphere hit, else the ground point, else nothing.
pub fn pick(ray: &Ray, spheres: &[SphereTarget], ground_height: Option<f32>) -> Option<PointerHit> {
    let nearest = spheres
        .iter()
        .filter_map(|sphere| {
            ray.intersect_sphere(sphere.center, sphere.radius)
                .map(|t| (t, sphere.key))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0));

    if let Some((t, key)) = nearest {
        return Some(PointerHit::body(key, ray.point_at(t)));
    }

    let height = ground_height?;
    ray.intersect_plane_y(height)
        .map(|t| PointerHit::empty(ray.point_at(t)))
}

/// Live particle spheres the pointer can hit.
pub fn particle_targets(manager: &SimulationManager, state: &LabState) -> Vec<SphereTarget> {
    let physics = manager.physics();
    let registry = manager.registry();
    state
        .scene()
        .objects()
        .iter()
        .filter_map(|object| {
            let key = BodyKey::Object(object.id);
            let center = registry.get(key).and_then(|h| physics.translation(h))?;
            Some(SphereTarget {
                key,
                center,
                radius: PARTICLE_RADIUS,
            })
        })
        .collect()
}

/// The ground surface is only clickable while the sandbox is mounted.
pub fn ground_height(manager: &SimulationManager) -> Option<f32> {
    (manager.current_mode() == Some(SimulationMode::Sandbox)).then_some(0.0)
}
