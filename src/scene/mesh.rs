//! Mesh generation for the mug parts
//!
//! Generates vertex and index data for cylinders, tori, discs and planes.
//! Front faces wind counter-clockwise when seen from the side the normals
//! point to.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::f32::consts::TAU;

/// Vertex for mug meshes
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MockupVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// Normal vector (for lighting)
    pub normal: [f32; 3],
}

impl MockupVertex {
    /// Size of vertex in bytes
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Vertex buffer layout for wgpu
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // uv
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // normal
                wgpu::VertexAttribute {
                    offset: 20,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Generated mesh data
#[derive(Debug, Clone, Default)]
pub struct MockupMesh {
    pub vertices: Vec<MockupVertex>,
    pub indices: Vec<u32>,
}

impl MockupMesh {
    /// Open cylinder (no caps) centered on the origin, outward normals
    ///
    /// The side spans azimuths `theta_start .. theta_start + theta_length`.
    /// U runs right-to-left in azimuth so a texture reads correctly from
    /// outside; V is 0 at the top edge.
    pub fn cylinder(
        radius: f32,
        height: f32,
        segments: u32,
        theta_start: f32,
        theta_length: f32,
    ) -> Self {
        let segments = segments.max(3);
        let half = height * 0.5;
        let row = segments + 1;
        let mut vertices = Vec::with_capacity(row as usize * 2);
        let mut indices = Vec::with_capacity(segments as usize * 6);

        for (y, v) in [(half, 0.0), (-half, 1.0)] {
            for ix in 0..=segments {
                let t = ix as f32 / segments as f32;
                let theta = theta_start + t * theta_length;
                let (sin, cos) = theta.sin_cos();

                vertices.push(MockupVertex {
                    position: [radius * cos, y, radius * sin],
                    uv: [1.0 - t, v],
                    normal: [cos, 0.0, sin],
                });
            }
        }

        for ix in 0..segments {
            let top = ix;
            let bottom = ix + row;
            let bottom_next = ix + 1 + row;
            let top_next = ix + 1;

            indices.extend_from_slice(&[bottom, top, top_next]);
            indices.extend_from_slice(&[bottom, top_next, bottom_next]);
        }

        Self { vertices, indices }
    }

    /// Torus (or partial torus) in the XY plane, centered on the origin
    ///
    /// The ring sweeps `arc` radians counter-clockwise from `arc_start`,
    /// measured from +X.
    pub fn torus(
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
        arc_start: f32,
        arc: f32,
    ) -> Self {
        let radial_segments = radial_segments.max(3);
        let tubular_segments = tubular_segments.max(3);
        let row = tubular_segments + 1;
        let mut vertices = Vec::with_capacity((radial_segments as usize + 1) * row as usize);
        let mut indices = Vec::with_capacity(radial_segments as usize * tubular_segments as usize * 6);

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            for i in 0..=tubular_segments {
                let u = arc_start + i as f32 / tubular_segments as f32 * arc;

                let ring = radius + tube * v.cos();
                let position = Vec3::new(ring * u.cos(), ring * u.sin(), tube * v.sin());
                let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
                let normal = (position - center).normalize_or_zero();

                vertices.push(MockupVertex {
                    position: position.into(),
                    uv: [
                        i as f32 / tubular_segments as f32,
                        j as f32 / radial_segments as f32,
                    ],
                    normal: normal.into(),
                });
            }
        }

        for j in 1..=radial_segments {
            for i in 1..=tubular_segments {
                let a = row * j + i - 1;
                let b = row * (j - 1) + i - 1;
                let c = row * (j - 1) + i;
                let d = row * j + i;

                indices.extend_from_slice(&[a, b, d]);
                indices.extend_from_slice(&[b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    /// Flat disc on the XZ plane facing down (-Y)
    pub fn disc(radius: f32, segments: u32) -> Self {
        let segments = segments.max(8);
        let mut vertices = Vec::with_capacity(segments as usize + 1);
        let mut indices = Vec::with_capacity(segments as usize * 3);

        // Center vertex
        vertices.push(MockupVertex {
            position: [0.0, 0.0, 0.0],
            uv: [0.5, 0.5],
            normal: [0.0, -1.0, 0.0],
        });

        // Edge vertices
        for i in 0..segments {
            let angle = (i as f32 / segments as f32) * TAU;
            let (sin, cos) = angle.sin_cos();

            vertices.push(MockupVertex {
                position: [cos * radius, 0.0, sin * radius],
                uv: [(cos + 1.0) * 0.5, (sin + 1.0) * 0.5],
                normal: [0.0, -1.0, 0.0],
            });
        }

        // Triangle fan, counter-clockwise seen from below
        for i in 0..segments {
            indices.push(0);
            indices.push(i + 1);
            indices.push(((i + 1) % segments) + 1);
        }

        Self { vertices, indices }
    }

    /// Rectangle on the XZ plane facing up (+Y)
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        let normal = [0.0, 1.0, 0.0];
        let vertices = vec![
            MockupVertex { position: [-hw, 0.0, -hd], uv: [0.0, 0.0], normal },
            MockupVertex { position: [hw, 0.0, -hd], uv: [1.0, 0.0], normal },
            MockupVertex { position: [hw, 0.0, hd], uv: [1.0, 1.0], normal },
            MockupVertex { position: [-hw, 0.0, hd], uv: [0.0, 1.0], normal },
        ];
        let indices = vec![0, 3, 2, 0, 2, 1];

        Self { vertices, indices }
    }

    /// Apply a transform to positions and normals
    pub fn transformed(mut self, transform: Mat4) -> Self {
        let normal_matrix = transform.inverse().transpose();
        for vertex in &mut self.vertices {
            let position = transform.transform_point3(Vec3::from(vertex.position));
            let normal = normal_matrix
                .transform_vector3(Vec3::from(vertex.normal))
                .normalize_or_zero();
            vertex.position = position.into();
            vertex.normal = normal.into();
        }
        self
    }

    /// Flip the mesh inside out: normals negated and winding reversed
    pub fn inverted(mut self) -> Self {
        for vertex in &mut self.vertices {
            vertex.normal = (-Vec3::from(vertex.normal)).into();
        }
        for triangle in self.indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
        self
    }

    /// Append another mesh
    pub fn merged(mut self, other: MockupMesh) -> Self {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
        self
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), v| {
                let p = Vec3::from(v.position);
                (min.min(p), max.max(p))
            },
        )
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get index count
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Geometric normal of a triangle from its winding
    pub fn face_normal(&self, triangle: usize) -> Vec3 {
        let i = triangle * 3;
        let p = |k: usize| Vec3::from(self.vertices[self.indices[i + k] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0)).normalize_or_zero()
    }
}
