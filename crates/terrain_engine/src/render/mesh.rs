//! Geometry for the three render passes
//!
//! The terrain is a flat `n × n` grid in the XZ plane; the vertex shader
//! displaces it by sampling the heightmap, so the CPU side only produces
//! positions at `y = 0`, texture coordinates and the strip index list.
//!
//! # Index layout
//!
//! Each pair of adjacent grid rows becomes one triangle strip that zig-zags
//! `bottom, top, bottom, top, ...` across all columns. Strips are separated
//! by [`RESTART_INDEX`], so the whole terrain is a single indexed draw with
//! primitive restart enabled:
//!
//! ```text
//!   i=0:  0 ── 1 ── 2          strip 0: 3 0 4 1 5 2 RESTART
//!         │ ╲  │ ╲  │          strip 1: 6 3 7 4 8 5 RESTART
//!   i=1:  3 ── 4 ── 5
//!         │ ╲  │ ╲  │
//!   i=2:  6 ── 7 ── 8
//! ```
//!
//! The skybox cube and the billboard anchor points live here as well, along
//! with [`GpuMesh`], the uploaded form of any of the three.

use thiserror::Error;

use crate::render::api::{BufferHandle, GraphicsDevice, Primitive, VertexArrayHandle};
use crate::render::RenderResult;

/// Index value that ends one strip and starts the next
///
/// This is the fixed restart index OpenGL uses for `u32` element buffers.
pub const RESTART_INDEX: u32 = u32::MAX;

/// Largest grid side accepted by [`TerrainMesh::generate`]
///
/// Keeps the vertex count clear of [`RESTART_INDEX`] and the strip index
/// count within a single `i32` draw.
pub const MAX_POINTS_PER_SIDE: u32 = 8192;

/// Attribute location of vertex positions
pub const POSITION_LOCATION: u32 = 0;

/// Attribute location of texture coordinates
pub const UV_LOCATION: u32 = 1;

/// Result type for mesh generation
pub type MeshResult<T> = Result<T, MeshError>;

/// Mesh generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A grid needs at least two points per side to form a triangle
    #[error("terrain grid needs at least 2 points per side, got {0}")]
    TooFewPoints(u32),

    /// The grid side exceeds [`MAX_POINTS_PER_SIDE`]
    #[error("terrain grid side of {0} points exceeds the maximum of {MAX_POINTS_PER_SIDE}")]
    TooManyPoints(u32),

    /// More vertices or indices than one GL draw call takes
    #[error("draw count {0} does not fit in a single draw call")]
    DrawCountOverflow(usize),
}

/// CPU-side terrain grid
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    n_points: u32,
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl TerrainMesh {
    /// Generate an `n_points × n_points` grid spanning `[-scale, scale]` on X and Z.
    ///
    /// Vertex `i * n_points + j` sits at column `i` along X and row `j`
    /// along Z. Its UV is offset by half a texel of an `n_points`-wide
    /// texture, which keeps every coordinate strictly inside `(0, 1)`.
    pub fn generate(n_points: u32, scale: f32) -> MeshResult<Self> {
        if n_points < 2 {
            return Err(MeshError::TooFewPoints(n_points));
        }
        if n_points > MAX_POINTS_PER_SIDE {
            return Err(MeshError::TooManyPoints(n_points));
        }

        let n = n_points as usize;
        let last = (n_points - 1) as f32;
        let texels = n_points as f32;

        let mut positions = Vec::with_capacity(n * n);
        let mut uvs = Vec::with_capacity(n * n);
        for i in 0..n {
            let x = scale * (i as f32 / last - 0.5) * 2.0;
            for j in 0..n {
                let z = scale * (j as f32 / last - 0.5) * 2.0;
                positions.push([x, 0.0, z]);
                uvs.push([(i as f32 + 0.5) / texels, (j as f32 + 0.5) / texels]);
            }
        }

        let mut indices = Vec::with_capacity((n - 1) * (2 * n + 1));
        for row in 0..n_points - 1 {
            for column in 0..n_points {
                let top = row * n_points + column;
                indices.push(top + n_points);
                indices.push(top);
            }
            indices.push(RESTART_INDEX);
        }

        log::debug!(
            "Generated terrain grid: {} vertices, {} indices",
            positions.len(),
            indices.len()
        );

        Ok(Self { n_points, positions, uvs, indices })
    }

    /// Points per grid side
    pub fn n_points(&self) -> u32 {
        self.n_points
    }

    /// `n_points²`
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// `(n_points - 1) * (2 * n_points + 1)`
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Grid-space positions (`y = 0`)
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Texture coordinates, one per position
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Strip indices with restart separators
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Unit cube drawn around the camera by the skybox pass.
///
/// Two triangles per face, wound counter-clockwise as seen from inside.
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    // -Z
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
    // -X
    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],
    // +X
    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
    // +Z
    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
    // +Y
    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
    // -Y
    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Anchor points of the billboard sprites
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BillboardSet {
    positions: Vec<[f32; 3]>,
}

impl BillboardSet {
    /// Billboards at the given world positions
    pub fn new(positions: Vec<[f32; 3]>) -> Self {
        Self { positions }
    }

    /// World-space anchors
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Number of sprites
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// How an uploaded mesh is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    /// Topology
    pub primitive: Primitive,
    /// Vertices (or indices, when `indexed`) to draw
    pub count: i32,
    /// Draw through the element buffer
    pub indexed: bool,
}

/// Geometry resident on the GPU
///
/// Owns its vertex array and buffers; [`GpuMesh::destroy`] releases them.
#[derive(Debug)]
pub struct GpuMesh {
    vertex_array: VertexArrayHandle,
    buffers: Vec<BufferHandle>,
    draw: DrawCommand,
}

impl GpuMesh {
    /// Upload the terrain grid: positions, UVs and the strip element buffer.
    ///
    /// Also enables primitive restart, which the terrain draw relies on.
    pub fn upload_terrain(device: &mut dyn GraphicsDevice, mesh: &TerrainMesh) -> RenderResult<Self> {
        let count = draw_count(mesh.index_count())?;
        let vertex_array = device.create_vertex_array()?;
        device.bind_vertex_array(Some(vertex_array));

        let buffers = vec![
            device.create_vertex_buffer(POSITION_LOCATION, 3, bytemuck::cast_slice(mesh.positions()))?,
            device.create_vertex_buffer(UV_LOCATION, 2, bytemuck::cast_slice(mesh.uvs()))?,
            device.create_index_buffer(mesh.indices())?,
        ];
        device.bind_vertex_array(None);
        device.set_primitive_restart(true);

        log::info!(
            "Uploaded terrain mesh ({} vertices, {} indices)",
            mesh.vertex_count(),
            mesh.index_count()
        );

        Ok(Self {
            vertex_array,
            buffers,
            draw: DrawCommand {
                primitive: Primitive::TriangleStrip,
                count,
                indexed: true,
            },
        })
    }

    /// Upload the 36-vertex skybox cube
    pub fn upload_skybox(device: &mut dyn GraphicsDevice) -> RenderResult<Self> {
        Self::upload_positions(device, &SKYBOX_VERTICES, Primitive::Triangles)
    }

    /// Upload billboard anchors as a point list
    pub fn upload_billboards(device: &mut dyn GraphicsDevice, billboards: &BillboardSet) -> RenderResult<Self> {
        Self::upload_positions(device, billboards.positions(), Primitive::Points)
    }

    fn upload_positions(device: &mut dyn GraphicsDevice, positions: &[[f32; 3]], primitive: Primitive) -> RenderResult<Self> {
        let count = draw_count(positions.len())?;
        let vertex_array = device.create_vertex_array()?;
        device.bind_vertex_array(Some(vertex_array));
        let buffer = device.create_vertex_buffer(POSITION_LOCATION, 3, bytemuck::cast_slice(positions))?;
        device.bind_vertex_array(None);

        Ok(Self {
            vertex_array,
            buffers: vec![buffer],
            draw: DrawCommand {
                primitive,
                count,
                indexed: false,
            },
        })
    }

    /// Bind and draw the whole mesh
    pub fn draw(&self, device: &mut dyn GraphicsDevice) {
        device.bind_vertex_array(Some(self.vertex_array));
        if self.draw.indexed {
            device.draw_elements(self.draw.primitive, self.draw.count);
        } else {
            device.draw_arrays(self.draw.primitive, 0, self.draw.count);
        }
    }

    /// Draw parameters
    pub fn draw_command(&self) -> DrawCommand {
        self.draw
    }

    /// Release the buffers, then the vertex array
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        for buffer in self.buffers {
            device.delete_buffer(buffer);
        }
        device.delete_vertex_array(self.vertex_array);
    }
}

fn draw_count(count: usize) -> MeshResult<i32> {
    i32::try_from(count).map_err(|_| MeshError::DrawCountOverflow(count))
}
