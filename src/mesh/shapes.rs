//! 3D Shapes as `Mesh`s

use crate::environment::GeometryEnvironment;
use crate::errors::CsgError;
use crate::float_types::{PI, Real, TAU};
use crate::mesh::Mesh;
use crate::mesh::plane::Plane;
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector2, Vector3};

impl Mesh {
    /// Create a right prism (a box) that spans from (0, 0, 0)
    /// to (width, length, height). All dimensions must be >= 0.
    ///
    /// Every face is one quad with flat vertex normals.
    ///
    /// # Example
    /// ```
    /// # use bspcsg::mesh::Mesh;
    /// let cube = Mesh::cuboid(1.0, 2.0, 3.0, 0);
    /// assert_eq!(cube.polygons.len(), 6);
    /// ```
    pub fn cuboid(width: Real, length: Real, height: Real, material_index: i32) -> Mesh {
        // Define the eight corner points of the prism.
        //    (x, y, z)
        let p000 = Point3::new(0.0, 0.0, 0.0);
        let p100 = Point3::new(width, 0.0, 0.0);
        let p110 = Point3::new(width, length, 0.0);
        let p010 = Point3::new(0.0, length, 0.0);

        let p001 = Point3::new(0.0, 0.0, height);
        let p101 = Point3::new(width, 0.0, height);
        let p111 = Point3::new(width, length, height);
        let p011 = Point3::new(0.0, length, height);

        // Counter-clockwise seen from outside
        let faces = [
            ([p000, p010, p110, p100], -Vector3::z()), // Bottom
            ([p001, p101, p111, p011], Vector3::z()),  // Top
            ([p000, p100, p101, p001], -Vector3::y()), // Front
            ([p010, p011, p111, p110], Vector3::y()),  // Back
            ([p000, p001, p011, p010], -Vector3::x()), // Left
            ([p100, p110, p111, p101], Vector3::x()),  // Right
        ];

        let polygons = faces
            .into_iter()
            .map(|(corners, normal)| {
                let plane = Plane::from_normal(normal, normal.dot(&corners[0].coords));
                let vertices = corners.iter().map(|&p| Vertex::new(p, normal)).collect();
                Polygon::new(vertices, plane, material_index)
            })
            .collect::<Vec<_>>();

        Mesh::from_polygons(&polygons)
    }

    pub fn cube(width: Real, material_index: i32) -> Mesh {
        Self::cuboid(width, width, width, material_index)
    }

    /// Construct a sphere with radius, segments, stacks, centered at the origin.
    ///
    /// Latitude bands are quads, the two polar caps are triangle fans. `segments` is
    /// raised to at least 3 and `stacks` to at least 2. Vertices carry `(u, v)`
    /// texture coordinates over the longitude/latitude grid.
    ///
    /// The polygons are built under the default geometry environment.
    pub fn sphere(radius: Real, segments: usize, stacks: usize, material_index: i32) -> Mesh {
        let env = GeometryEnvironment::resolve(None);
        let segments = segments.max(3);
        let stacks = stacks.max(2);

        let vertex = |u: Real, v: Real| {
            let theta = u * TAU;
            let phi = v * PI;
            let dir = Vector3::new(theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin());
            Vertex::with_uv(Point3::from(dir * radius), dir, Vector2::new(u, v))
        };

        let mut polygons = Vec::with_capacity(segments * stacks);
        for i in 0..segments {
            for j in 0..stacks {
                let (u0, u1) = (i as Real / segments as Real, (i + 1) as Real / segments as Real);
                let (v0, v1) = (j as Real / stacks as Real, (j + 1) as Real / stacks as Real);

                let mut vertices = Vec::with_capacity(4);
                vertices.push(vertex(u0, v0));
                if j > 0 {
                    vertices.push(vertex(u1, v0));
                }
                if j < stacks - 1 {
                    vertices.push(vertex(u1, v1));
                }
                vertices.push(vertex(u0, v1));

                polygons.extend(Polygon::create(&vertices, material_index, &env));
            }
        }

        Mesh::from_polygons(&polygons)
    }

    /// Creates a polyhedron from raw vertex data (`points`) and face indices.
    ///
    /// # Parameters
    ///
    /// - `points`: a slice of `[x,y,z]` coordinates.
    /// - `faces`: each element is a list of indices into `points`, describing one face,
    ///   counter-clockwise seen from outside.
    ///
    /// Vertex normals are set to the face normal. Degenerate faces are skipped (and
    /// logged); an index outside `points` is an error.
    ///
    /// # Example
    /// ```
    /// # use bspcsg::mesh::Mesh;
    /// # use bspcsg::environment::GeometryEnvironment;
    /// let pts = &[
    ///     [0.0, 0.0, 0.0], // point0
    ///     [1.0, 0.0, 0.0], // point1
    ///     [1.0, 1.0, 0.0], // point2
    ///     [0.0, 1.0, 0.0], // point3
    ///     [0.5, 0.5, 1.0], // point4 - top
    /// ];
    ///
    /// // The square base and four sloping sides
    /// let fcs: &[&[usize]] = &[
    ///     &[0, 3, 2, 1],
    ///     &[0, 1, 4],
    ///     &[1, 2, 4],
    ///     &[2, 3, 4],
    ///     &[3, 0, 4],
    /// ];
    ///
    /// let pyramid = Mesh::polyhedron(pts, fcs, 0, &GeometryEnvironment::default()).unwrap();
    /// assert_eq!(pyramid.polygons.len(), 5);
    /// ```
    pub fn polyhedron(
        points: &[[Real; 3]],
        faces: &[&[usize]],
        material_index: i32,
        env: &GeometryEnvironment,
    ) -> Result<Mesh, CsgError> {
        let mut polygons = Vec::with_capacity(faces.len());

        for face in faces {
            let mut face_vertices = Vec::with_capacity(face.len());
            for &index in face.iter() {
                let [x, y, z] = *points.get(index).ok_or(CsgError::IndexOutOfRange {
                    index,
                    len: points.len(),
                })?;
                face_vertices.push(Vertex::new(Point3::new(x, y, z), Vector3::zeros()));
            }

            let Some(plane) = Plane::from_vertices(&face_vertices, env) else {
                log::warn!("skipping degenerate face {face:?}");
                continue;
            };
            let normal = plane.normal();
            for v in &mut face_vertices {
                v.normal = normal;
            }
            polygons.extend(Polygon::create(&face_vertices, material_index, env));
        }

        Ok(Mesh::from_polygons(&polygons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_point_outward() {
        let mesh = Mesh::cuboid(2.0, 3.0, 4.0, 7);
        let center = Point3::new(1.0, 1.5, 2.0);
        for poly in &mesh.polygons {
            assert_eq!(poly.material_index, 7);
            assert!(poly.plane.point_distance(&center) < 0.0);
            for v in &poly.vertices {
                assert!(poly.plane.point_distance(&v.pos).abs() < 1e-12);
            }
        }
        assert!((mesh.volume() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_layout() {
        let mesh = Mesh::sphere(1.0, 8, 4, 0);
        // two caps of triangles, the rest quads
        assert_eq!(mesh.polygons.len(), 8 * 4);
        let triangles = mesh.polygons.iter().filter(|p| p.vertices.len() == 3).count();
        assert_eq!(triangles, 16);
        for poly in &mesh.polygons {
            assert!(poly.plane.point_distance(&Point3::origin()) < 0.0);
        }
        assert!(mesh.volume() > 0.0 && mesh.volume() < 4.0 / 3.0 * PI);
    }

    #[test]
    fn polyhedron_rejects_bad_index() {
        let env = GeometryEnvironment::default();
        let pts = &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let faces: &[&[usize]] = &[&[0, 1, 3]];
        assert_eq!(
            Mesh::polyhedron(pts, faces, 0, &env).unwrap_err(),
            CsgError::IndexOutOfRange { index: 3, len: 3 }
        );
    }

    #[test]
    fn polyhedron_skips_degenerate_faces() {
        let env = GeometryEnvironment::default();
        let pts = &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let faces: &[&[usize]] = &[&[0, 1, 2], &[0, 1, 3], &[0, 1]];
        let mesh = Mesh::polyhedron(pts, faces, 0, &env).unwrap();
        assert_eq!(mesh.polygons.len(), 1);
        assert_eq!(mesh.polygons[0].vertices[0].normal, Vector3::z());
    }
}
