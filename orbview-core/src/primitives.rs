//! Procedurally generated geometry
use std::f32::consts::PI;

use nalgebra::{Point3, Vector2, Vector3};

use crate::geometry::GeometryRecord;

/// Latitude/longitude sphere.
///
/// `width` columns around the z axis and `height` rows from the +z pole
/// (v = 0) to the -z pole (v = 1). The seam column is duplicated so that
/// u runs from 0 to 1. Each axis is scaled by the matching `size` component.
/// Zero column or row counts are treated as 1.
pub fn sphere(width: u32, height: u32, size: Vector3<f32>) -> GeometryRecord {
    let (w, h) = (width.max(1), height.max(1));
    let vertex_count = ((w + 1) * (h + 1)) as usize;
    let mut geometry = GeometryRecord::with_capacity(vertex_count, (6 * w * h) as usize);

    for y in 0..=h {
        for x in 0..=w {
            let u = x as f32 / w as f32;
            let v = y as f32 / h as f32;

            let (sx, cx) = (2.0 * PI * u).sin_cos();
            let (sy, cy) = (PI * v).sin_cos();
            let normal = Vector3::new(cx * sy, sx * sy, cy);

            geometry.push_vertex(
                Point3::from(size.component_mul(&normal)),
                normal,
                Vector2::new(u, v),
            );
        }
    }

    // two triangles per grid cell, counter-clockwise seen from outside
    for y in 0..h {
        for x in 0..w {
            let a = (w + 1) * y + x;
            let b = a + w + 1;
            geometry.push_triangle(a, b + 1, a + 1);
            geometry.push_triangle(a, b, b + 1);
        }
    }

    geometry
}

/// Two-triangle quad in the XY plane from `-size/2` to `size/2`, facing +z
pub fn plane(size: Vector2<f32>) -> GeometryRecord {
    let (hx, hy) = (0.5 * size.x, 0.5 * size.y);
    let normal = Vector3::z();
    let mut geometry = GeometryRecord::with_capacity(4, 6);

    geometry.push_vertex(Point3::new(-hx, -hy, 0.0), normal, Vector2::new(0.0, 0.0));
    geometry.push_vertex(Point3::new(hx, -hy, 0.0), normal, Vector2::new(1.0, 0.0));
    geometry.push_vertex(Point3::new(-hx, hy, 0.0), normal, Vector2::new(0.0, 1.0));
    geometry.push_vertex(Point3::new(hx, hy, 0.0), normal, Vector2::new(1.0, 1.0));

    geometry.push_triangle(0, 1, 3);
    geometry.push_triangle(0, 3, 2);

    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_counts() {
        for (w, h) in [(1, 1), (4, 3), (16, 8), (32, 17)] {
            let g = sphere(w, h, Vector3::new(1.0, 1.0, 1.0));
            assert_eq!(g.vertex_count(), ((w + 1) * (h + 1)) as usize);
            assert_eq!(g.indices.len(), (6 * w * h) as usize);
            assert!(g.is_consistent());
        }
    }

    #[test]
    fn test_sphere_winding_faces_outward() {
        let g = sphere(12, 6, Vector3::new(2.0, 2.0, 2.0));
        let mut checked = 0;
        for tri in g.triangles() {
            let [v0, v1, v2] = tri.vertices;
            let cross = (v1 - v0).cross(&(v2 - v0));
            // pole rows collapse to zero-area triangles
            if cross.norm() < 1e-4 {
                continue;
            }
            assert!(cross.dot(&tri.centroid().coords) > 0.0);
            checked += 1;
        }
        assert!(checked >= 12 * 4 * 2);
    }

    #[test]
    fn test_sphere_seam_and_poles() {
        let w = 8;
        let g = sphere(w, 4, Vector3::new(1.0, 1.0, 1.0));
        let row = (w + 1) as usize;

        // first and last column share a position
        assert!((g.positions[0] - g.positions[row - 1]).norm() < 1e-5);
        assert!((g.positions[row] - g.positions[2 * row - 1]).norm() < 1e-5);
        assert_eq!(g.uvs[row - 1], Vector2::new(1.0, 0.0));

        // v = 0 is the +z pole, v = 1 the -z pole
        assert!((g.positions[0] - Point3::new(0.0, 0.0, 1.0)).norm() < 1e-5);
        let last = g.vertex_count() - 1;
        assert!((g.positions[last] - Point3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_sphere_scales_per_axis() {
        let g = sphere(4, 2, Vector3::new(3.0, 1.0, 5.0));
        // equator row, u = 0 points along +x
        let equator = 5;
        assert!((g.positions[equator] - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-5);
        assert!((g.positions[0].z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_layout() {
        let g = plane(Vector2::new(4.0, 2.0));
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.indices, vec![0, 1, 3, 0, 3, 2]);
        assert_eq!(g.positions[0], Point3::new(-2.0, -1.0, 0.0));
        assert_eq!(g.positions[3], Point3::new(2.0, 1.0, 0.0));
        for tri in g.triangles() {
            let n = tri.calculate_normal().unwrap();
            assert!((n - Vector3::z()).norm() < 1e-6);
        }
    }
}
