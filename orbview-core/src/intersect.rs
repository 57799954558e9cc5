//! Per-triangle ray intersection precomputation
//!
//! Each triangle is reduced to its plane equation plus two barycentric edge
//! functions, so a ray test at query time is a handful of dot products.
use nalgebra::{Point3, Vector3};

use crate::geometry::GeometryRecord;

/// Distance returned when a ray hits nothing
pub const NO_INTERSECTION: f32 = 800.0;

/// Hits farther than this along the ray are ignored
pub const FAR_BOUND: f32 = 750.0;

/// How a query over several triangles picks its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitPolicy {
    /// Test every triangle and return the nearest valid hit
    #[default]
    Closest,
    /// Only the first stored triangle decides the result
    FirstTested,
}

/// Plane and barycentric coefficients of one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionRecord {
    pub normal: Vector3<f32>,
    pub na: Vector3<f32>,
    pub nb: Vector3<f32>,
    pub ca: f32,
    pub cb: f32,
    /// `v0 · N`, so the plane is `N · P = plane_constant`
    pub plane_constant: f32,
}

impl IntersectionRecord {
    /// Returns `None` for zero-area triangles.
    pub fn from_triangle(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Option<Self> {
        let e0 = v1 - v2;
        let e1 = v2 - v0;
        let e2 = v0 - v1;

        let normal = e0.cross(&e1).try_normalize(0.0)?;

        // a is 0 on edge v1-v2 and 1 at v0, b is 0 on edge v2-v0 and 1 at v1
        let na = normal.cross(&e0);
        let nb = normal.cross(&e1);
        let na = na / na.dot(&e2);
        let nb = nb / nb.dot(&e0);

        let record = Self {
            normal,
            na,
            nb,
            ca: na.dot(&v1.coords),
            cb: nb.dot(&v2.coords),
            plane_constant: v0.coords.dot(&normal),
        };

        record.is_finite().then_some(record)
    }

    fn is_finite(&self) -> bool {
        self.normal.iter().all(|c| c.is_finite())
            && self.na.iter().all(|c| c.is_finite())
            && self.nb.iter().all(|c| c.is_finite())
            && self.ca.is_finite()
            && self.cb.is_finite()
            && self.plane_constant.is_finite()
    }

    /// Barycentric weights of a point on the triangle's plane
    pub fn barycentric(&self, point: &Point3<f32>) -> (f32, f32, f32) {
        let a = self.na.dot(&point.coords) - self.ca;
        let b = self.nb.dot(&point.coords) - self.cb;
        (a, b, 1.0 - a - b)
    }

    /// Ray parameter of the hit, if the ray hits within `[near, FAR_BOUND]`
    pub fn distance(&self, origin: &Point3<f32>, dir: &Vector3<f32>, near: f32) -> Option<f32> {
        let t = (self.plane_constant - self.normal.dot(&origin.coords)) / self.normal.dot(dir);

        // parallel rays divide by zero
        if !t.is_finite() || t < near || t > FAR_BOUND {
            return None;
        }

        let hit = *origin + dir * t;
        let (a, b, c) = self.barycentric(&hit);
        if !(0.0..=1.0).contains(&a) || b < 0.0 || c < 0.0 {
            return None;
        }

        Some(t)
    }
}

/// Intersection records for every triangle of one geometry record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intersector {
    records: Vec<IntersectionRecord>,
    policy: HitPolicy,
    /// The first stored triangle had zero area, so a first-tested query
    /// always misses
    first_degenerate: bool,
}

impl Intersector {
    /// Precompute along `indices`, skipping zero-area triangles
    pub fn from_geometry(geometry: &GeometryRecord, policy: HitPolicy) -> Self {
        let records: Vec<_> = geometry
            .triangles()
            .filter_map(|tri| {
                let [v0, v1, v2] = tri.vertices;
                IntersectionRecord::from_triangle(v0, v1, v2)
            })
            .collect();

        let skipped = geometry.triangle_count() - records.len();
        if skipped > 0 {
            log::debug!("Skipped {} degenerate triangles", skipped);
        }

        let first_degenerate = geometry.triangles().next().is_some_and(|tri| {
            let [v0, v1, v2] = tri.vertices;
            IntersectionRecord::from_triangle(v0, v1, v2).is_none()
        });

        Self {
            records,
            policy,
            first_degenerate,
        }
    }

    pub fn records(&self) -> &[IntersectionRecord] {
        &self.records
    }

    pub fn policy(&self) -> HitPolicy {
        self.policy
    }

    pub fn try_intersect(&self, origin: &Point3<f32>, dir: &Vector3<f32>, near: f32) -> Option<f32> {
        match self.policy {
            HitPolicy::FirstTested if self.first_degenerate => None,
            HitPolicy::FirstTested => self.records.first()?.distance(origin, dir, near),
            HitPolicy::Closest => self
                .records
                .iter()
                .filter_map(|r| r.distance(origin, dir, near))
                .reduce(f32::min),
        }
    }

    /// Hit distance, or [`NO_INTERSECTION`]
    pub fn intersect(&self, origin: &Point3<f32>, dir: &Vector3<f32>, near: f32) -> f32 {
        self.try_intersect(origin, dir, near)
            .unwrap_or(NO_INTERSECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn unit_quad(policy: HitPolicy) -> Intersector {
        Intersector::from_geometry(&primitives::plane(Vector2::new(1.0, 1.0)), policy)
    }

    fn down() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, -1.0)
    }

    #[test]
    fn test_record_coefficients() {
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(2.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 2.0, 0.0);
        let r = IntersectionRecord::from_triangle(v0, v1, v2).unwrap();

        assert_relative_eq!(r.normal, Vector3::z(), epsilon = 1e-6);
        assert_relative_eq!(r.plane_constant, 0.0);

        let (a, b, c) = r.barycentric(&v0);
        assert_relative_eq!(a, 1.0, epsilon = 1e-6);
        assert_relative_eq!(b, 0.0, epsilon = 1e-6);
        assert_relative_eq!(c, 0.0, epsilon = 1e-6);

        let (a, b, _) = r.barycentric(&v1);
        assert_relative_eq!(a, 0.0, epsilon = 1e-6);
        assert_relative_eq!(b, 1.0, epsilon = 1e-6);

        let (a, b, c) = r.barycentric(&v2);
        assert_relative_eq!(a, 0.0, epsilon = 1e-6);
        assert_relative_eq!(b, 0.0, epsilon = 1e-6);
        assert_relative_eq!(c, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let v = [
            Point3::new(1.5, -2.0, 0.25),
            Point3::new(-3.0, 4.0, 1.0),
            Point3::new(0.5, 0.5, -7.0),
        ];
        let a = IntersectionRecord::from_triangle(v[0], v[1], v[2]);
        let b = IntersectionRecord::from_triangle(v[0], v[1], v[2]);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_triangle_has_no_record() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(IntersectionRecord::from_triangle(p, p, p).is_none());

        // collinear
        let r = IntersectionRecord::from_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn test_ray_down_onto_quad() {
        let quad = unit_quad(HitPolicy::Closest);
        let t = quad.intersect(&Point3::new(0.0, 0.0, 10.0), &down(), 0.0);
        assert_relative_eq!(t, 10.0, epsilon = 1e-5);

        let t = quad.intersect(&Point3::new(0.2, -0.3, 4.0), &down(), 0.0);
        assert_relative_eq!(t, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_outside_quad_misses() {
        let quad = unit_quad(HitPolicy::Closest);
        let t = quad.intersect(&Point3::new(3.0, 0.0, 10.0), &down(), 0.0);
        assert_eq!(t, NO_INTERSECTION);
        assert!(quad
            .try_intersect(&Point3::new(0.0, -0.6, 10.0), &down(), 0.0)
            .is_none());
    }

    #[test]
    fn test_near_and_far_bounds() {
        let quad = unit_quad(HitPolicy::Closest);

        // geometric hit at t = 10, but closer than near
        let t = quad.intersect(&Point3::new(0.0, 0.0, 10.0), &down(), 11.0);
        assert_eq!(t, NO_INTERSECTION);

        // hit behind the origin
        let t = quad.intersect(&Point3::new(0.0, 0.0, -10.0), &down(), 0.0);
        assert_eq!(t, NO_INTERSECTION);

        let t = quad.intersect(&Point3::new(0.0, 0.0, 751.0), &down(), 0.0);
        assert_eq!(t, NO_INTERSECTION);

        let t = quad.intersect(&Point3::new(0.0, 0.0, 749.0), &down(), 0.0);
        assert_relative_eq!(t, 749.0, epsilon = 1e-3);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let quad = unit_quad(HitPolicy::Closest);
        let t = quad.intersect(&Point3::new(0.0, 0.0, 0.0), &Vector3::x(), 0.0);
        assert_eq!(t, NO_INTERSECTION);
        let t = quad.intersect(&Point3::new(0.0, 0.0, 1.0), &Vector3::y(), 0.0);
        assert_eq!(t, NO_INTERSECTION);
    }

    #[test]
    fn test_empty_geometry_returns_sentinel() {
        for policy in [HitPolicy::Closest, HitPolicy::FirstTested] {
            let none = Intersector::from_geometry(&GeometryRecord::new(), policy);
            let t = none.intersect(&Point3::origin(), &down(), 0.0);
            assert_eq!(t, NO_INTERSECTION);
        }
    }

    #[test]
    fn test_first_tested_only_consults_first_triangle() {
        // (-0.25, 0.25) lies in the quad's second triangle only
        let origin = Point3::new(-0.25, 0.25, 5.0);

        let closest = unit_quad(HitPolicy::Closest);
        assert_relative_eq!(closest.intersect(&origin, &down(), 0.0), 5.0, epsilon = 1e-5);

        let first = unit_quad(HitPolicy::FirstTested);
        assert_eq!(first.intersect(&origin, &down(), 0.0), NO_INTERSECTION);

        // inside the first triangle both policies agree
        let origin = Point3::new(0.25, -0.25, 5.0);
        assert_relative_eq!(first.intersect(&origin, &down(), 0.0), 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_first_tested_misses_when_first_triangle_is_degenerate() {
        let mut geometry = GeometryRecord::new();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(-10.0, -10.0, 0.0),
            Point3::new(10.0, -10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ] {
            geometry.push_vertex(p, Vector3::z(), Vector2::zeros());
        }
        // collinear, then a large triangle under the ray
        geometry.push_triangle(0, 1, 2);
        geometry.push_triangle(3, 4, 5);

        let origin = Point3::new(0.0, 0.0, 10.0);
        let first = Intersector::from_geometry(&geometry, HitPolicy::FirstTested);
        assert_eq!(first.records().len(), 1);
        assert_eq!(first.intersect(&origin, &down(), 0.0), NO_INTERSECTION);

        let closest = Intersector::from_geometry(&geometry, HitPolicy::Closest);
        assert_relative_eq!(closest.intersect(&origin, &down(), 0.0), 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_closest_picks_nearest_layer() {
        // two stacked quads, the farther one stored first
        let mut geometry = primitives::plane(Vector2::new(2.0, 2.0));
        let upper = primitives::plane(Vector2::new(2.0, 2.0));
        let base = geometry.vertex_count() as u32;
        for ((p, n), uv) in upper.positions.iter().zip(&upper.normals).zip(&upper.uvs) {
            geometry.push_vertex(*p + Vector3::new(0.0, 0.0, 3.0), *n, *uv);
        }
        for c in upper.indices.chunks_exact(3) {
            geometry.push_triangle(base + c[0], base + c[1], base + c[2]);
        }

        let origin = Point3::new(0.5, -0.5, 10.0);
        let closest = Intersector::from_geometry(&geometry, HitPolicy::Closest);
        assert_eq!(closest.records().len(), 4);
        assert_relative_eq!(closest.intersect(&origin, &down(), 0.0), 7.0, epsilon = 1e-5);

        let first = Intersector::from_geometry(&geometry, HitPolicy::FirstTested);
        assert_relative_eq!(first.intersect(&origin, &down(), 0.0), 10.0, epsilon = 1e-5);
    }
}
