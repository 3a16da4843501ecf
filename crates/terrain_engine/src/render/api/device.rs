//! GPU device abstraction
//!
//! Every GL call the renderer makes goes through [`GraphicsDevice`]. The
//! OpenGL implementation lives in `render::opengl`; unit tests drive the
//! same components against a recording device instead of a live context.

use std::num::NonZeroU32;
use thiserror::Error;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

macro_rules! gpu_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Raw GL object name
            pub fn id(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gpu_handle!(
    /// Linked shader program
    ProgramHandle
);
gpu_handle!(
    /// Single shader stage object
    ShaderHandle
);
gpu_handle!(
    /// 2D texture or cubemap
    TextureHandle
);
gpu_handle!(
    /// Vertex or element buffer
    BufferHandle
);
gpu_handle!(
    /// Vertex array object
    VertexArrayHandle
);

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
}

impl ShaderStage {
    /// Lower-case stage name for log lines
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
        }
    }
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// `TEXTURE_2D`
    Texture2D,
    /// `TEXTURE_CUBE_MAP`
    CubeMap,
}

/// Cubemap face, declared in GL upload order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X
    PositiveX,
    /// -X
    NegativeX,
    /// +Y
    PositiveY,
    /// -Y
    NegativeY,
    /// +Z
    PositiveZ,
    /// -Z
    NegativeZ,
}

impl CubeFace {
    /// All faces in upload order
    pub const ALL: [CubeFace; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    /// Offset from `TEXTURE_CUBE_MAP_POSITIVE_X`
    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Pixel layout of uploaded texel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit RGB
    Rgb8,
    /// 8-bit RGBA
    Rgba8,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    /// Tile the texture
    Repeat,
    /// Clamp to the edge texel
    ClampToEdge,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// `NEAREST`
    Nearest,
    /// `LINEAR`
    Linear,
    /// `NEAREST_MIPMAP_LINEAR`
    NearestMipmapLinear,
    /// `LINEAR_MIPMAP_LINEAR`
    LinearMipmapLinear,
}

impl FilterMode {
    /// Whether sampling reads mip levels
    pub fn uses_mipmaps(self) -> bool {
        matches!(self, Self::NearestMipmapLinear | Self::LinearMipmapLinear)
    }
}

/// Wrap/filter state applied to a texture after upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplingPolicy {
    /// Wrap mode on S, T and (for cubemaps) R
    pub wrap: WrapMode,
    /// Minification filter
    pub min_filter: FilterMode,
    /// Magnification filter
    pub mag_filter: FilterMode,
    /// Generate the mip chain after applying the parameters
    pub generate_mipmaps: bool,
}

/// Draw primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Independent points
    Points,
    /// Independent triangles
    Triangles,
    /// Triangle strips (with primitive restart when enabled)
    TriangleStrip,
}

/// Rasterization fill mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    /// Filled triangles
    Fill,
    /// Edges only
    Line,
}

/// Uniform values the renderer sets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int` or sampler unit
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec3`
    Vec3([f32; 3]),
    /// `mat4`, column-major
    Mat4([f32; 16]),
}

/// Result of a compile or link step
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildOutcome {
    /// Compile/link status reported by the driver
    pub success: bool,
    /// Driver info log (may be empty)
    pub log: String,
}

impl BuildOutcome {
    /// Info log with surrounding whitespace removed
    pub fn trimmed_log(&self) -> &str {
        self.log.trim()
    }
}

/// GPU device trait
///
/// Object creation returns typed handles; destruction takes them back by
/// value. Binding calls accept `None` to unbind.
pub trait GraphicsDevice {
    // Shaders and programs

    /// Create an empty shader object for `stage`
    fn create_shader(&mut self, stage: ShaderStage) -> DeviceResult<ShaderHandle>;

    /// Upload source and compile
    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> BuildOutcome;

    /// Delete a shader object
    fn delete_shader(&mut self, shader: ShaderHandle);

    /// Create an empty program object
    fn create_program(&mut self) -> DeviceResult<ProgramHandle>;

    /// Attach `shaders`, link, then detach them again
    fn link_program(&mut self, program: ProgramHandle, shaders: &[ShaderHandle]) -> BuildOutcome;

    /// Delete a program object
    fn delete_program(&mut self, program: ProgramHandle);

    /// Make `program` current
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Set a uniform on `program` by name. Unknown names are ignored.
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue);

    // Textures

    /// Create a texture object of the given target
    fn create_texture(&mut self, target: TextureTarget) -> DeviceResult<TextureHandle>;

    /// Upload level 0 of a 2D texture
    fn upload_texture_2d(&mut self, texture: TextureHandle, width: u32, height: u32, format: PixelFormat, pixels: &[u8]);

    /// Upload level 0 of one cubemap face
    fn upload_cube_face(&mut self, texture: TextureHandle, face: CubeFace, width: u32, height: u32, format: PixelFormat, pixels: &[u8]);

    /// Apply wrap and filter state, generating mipmaps when the policy asks
    fn apply_sampling(&mut self, texture: TextureHandle, target: TextureTarget, policy: &SamplingPolicy);

    /// Bind `texture` on texture unit `unit`
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>);

    /// Delete a texture object
    fn delete_texture(&mut self, texture: TextureHandle);

    // Geometry

    /// Create a vertex array object
    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle>;

    /// Bind a vertex array object
    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>);

    /// Upload a float attribute stream into the bound vertex array
    ///
    /// `components` floats per vertex, tightly packed, at `location`.
    fn create_vertex_buffer(&mut self, location: u32, components: u32, data: &[f32]) -> DeviceResult<BufferHandle>;

    /// Upload a `u32` element buffer into the bound vertex array
    fn create_index_buffer(&mut self, indices: &[u32]) -> DeviceResult<BufferHandle>;

    /// Delete a buffer object
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Delete a vertex array object
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    // Fixed-function state

    /// Enable restart on the maximum index value (`u32::MAX` for `u32` indices)
    fn set_primitive_restart(&mut self, enabled: bool);

    /// Colour used by [`GraphicsDevice::clear`]
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// Clear colour and depth
    fn clear(&mut self);

    /// Depth test with `LESS`
    fn set_depth_test(&mut self, enabled: bool);

    /// Depth buffer writes
    fn set_depth_write(&mut self, enabled: bool);

    /// Back-face culling
    fn set_face_culling(&mut self, enabled: bool);

    /// Front and back polygon fill mode
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Viewport in framebuffer pixels
    fn set_viewport(&mut self, width: i32, height: i32);

    // Draws

    /// Non-indexed draw from the bound vertex array
    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32);

    /// Indexed `u32` draw from the bound vertex array
    fn draw_elements(&mut self, primitive: Primitive, count: i32);
}

/// Device errors
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Object creation failed
    #[error("Failed to create {kind}: {message}")]
    CreateFailed {
        /// Object kind ("texture", "program", ...)
        kind: &'static str,
        /// Driver message
        message: String,
    },

    /// Context is too old for the renderer
    #[error("OpenGL {found} is below the required {required}")]
    UnsupportedVersion {
        /// Version string reported by the driver
        found: String,
        /// Minimum version
        required: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_follow_gl_order() {
        let indices: Vec<u32> = CubeFace::ALL.iter().map(|f| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn mipmap_filters() {
        assert!(FilterMode::LinearMipmapLinear.uses_mipmaps());
        assert!(FilterMode::NearestMipmapLinear.uses_mipmaps());
        assert!(!FilterMode::Linear.uses_mipmaps());
    }
}
