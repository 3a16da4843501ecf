//! [`GraphicsDevice`] over a `glow` OpenGL context

use glow::HasContext;

use crate::render::api::{
    BuildOutcome, BufferHandle, CubeFace, DeviceError, DeviceResult, FilterMode, GraphicsDevice, PixelFormat,
    PolygonMode, Primitive, ProgramHandle, SamplingPolicy, ShaderHandle, ShaderStage, TextureHandle, TextureTarget,
    UniformValue, VertexArrayHandle, WrapMode,
};

/// Oldest context with `PRIMITIVE_RESTART_FIXED_INDEX`
pub const MIN_GL_VERSION: (u32, u32) = (4, 3);

/// OpenGL device
///
/// Must only be used on the thread whose context is current.
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// Wrap a loaded context, rejecting anything older than 4.3
    pub fn new(gl: glow::Context) -> DeviceResult<Self> {
        let version = gl.version();
        let (major, minor) = MIN_GL_VERSION;
        if version.is_embedded || (version.major, version.minor) < (major, minor) {
            return Err(DeviceError::UnsupportedVersion {
                found: format!("{}.{} {}", version.major, version.minor, version.vendor_info),
                required: "4.3",
            });
        }
        log::info!("OpenGL {}.{} ({})", version.major, version.minor, version.vendor_info);
        Ok(Self { gl })
    }

    fn texture_target(target: TextureTarget) -> u32 {
        match target {
            TextureTarget::Texture2D => glow::TEXTURE_2D,
            TextureTarget::CubeMap => glow::TEXTURE_CUBE_MAP,
        }
    }

    fn formats(format: PixelFormat) -> (i32, u32) {
        match format {
            PixelFormat::Rgb8 => (glow::RGB8 as i32, glow::RGB),
            PixelFormat::Rgba8 => (glow::RGBA8 as i32, glow::RGBA),
        }
    }

    fn filter(filter: FilterMode) -> i32 {
        (match filter {
            FilterMode::Nearest => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
            FilterMode::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
            FilterMode::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
        }) as i32
    }

    fn primitive(primitive: Primitive) -> u32 {
        match primitive {
            Primitive::Points => glow::POINTS,
            Primitive::Triangles => glow::TRIANGLES,
            Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
        }
    }

    fn toggle(&mut self, capability: u32, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(capability);
            } else {
                self.gl.disable(capability);
            }
        }
    }

    fn upload_level0(&mut self, target: u32, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        let (internal, layout) = Self::formats(format);
        unsafe {
            // Rows of 3-byte texels are not 4-byte aligned in general
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                target,
                0,
                internal,
                width as i32,
                height as i32,
                0,
                layout,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn create_buffer(&mut self, target: u32, bytes: &[u8]) -> DeviceResult<BufferHandle> {
        unsafe {
            let buffer = self.gl.create_buffer().map_err(|message| DeviceError::CreateFailed { kind: "buffer", message })?;
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, bytes, glow::STATIC_DRAW);
            Ok(BufferHandle(buffer.0))
        }
    }
}

impl GraphicsDevice for GlowDevice {
    fn create_shader(&mut self, stage: ShaderStage) -> DeviceResult<ShaderHandle> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe {
            self.gl
                .create_shader(kind)
                .map(|shader| ShaderHandle(shader.0))
                .map_err(|message| DeviceError::CreateFailed { kind: "shader", message })
        }
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> BuildOutcome {
        let shader = glow::NativeShader(shader.0);
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            BuildOutcome {
                success: self.gl.get_shader_compile_status(shader),
                log: self.gl.get_shader_info_log(shader),
            }
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&mut self) -> DeviceResult<ProgramHandle> {
        unsafe {
            self.gl
                .create_program()
                .map(|program| ProgramHandle(program.0))
                .map_err(|message| DeviceError::CreateFailed { kind: "program", message })
        }
    }

    fn link_program(&mut self, program: ProgramHandle, shaders: &[ShaderHandle]) -> BuildOutcome {
        let program = glow::NativeProgram(program.0);
        unsafe {
            for shader in shaders {
                self.gl.attach_shader(program, glow::NativeShader(shader.0));
            }
            self.gl.link_program(program);
            let outcome = BuildOutcome {
                success: self.gl.get_program_link_status(program),
                log: self.gl.get_program_info_log(program),
            };
            for shader in shaders {
                self.gl.detach_shader(program, glow::NativeShader(shader.0));
            }
            outcome
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        unsafe {
            let Some(location) = self.gl.get_uniform_location(glow::NativeProgram(program.0), name) else {
                return;
            };
            let location = Some(&location);
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(location, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(location, v),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(location, x, y, z),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(location, false, &m),
            }
        }
    }

    fn create_texture(&mut self, target: TextureTarget) -> DeviceResult<TextureHandle> {
        unsafe {
            let texture = self
                .gl
                .create_texture()
                .map_err(|message| DeviceError::CreateFailed { kind: "texture", message })?;
            self.gl.bind_texture(Self::texture_target(target), Some(texture));
            Ok(TextureHandle(texture.0))
        }
    }

    fn upload_texture_2d(&mut self, texture: TextureHandle, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(texture.0))) };
        self.upload_level0(glow::TEXTURE_2D, width, height, format, pixels);
    }

    fn upload_cube_face(
        &mut self,
        texture: TextureHandle,
        face: CubeFace,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(glow::NativeTexture(texture.0))) };
        self.upload_level0(glow::TEXTURE_CUBE_MAP_POSITIVE_X + face.index(), width, height, format, pixels);
    }

    fn apply_sampling(&mut self, texture: TextureHandle, target: TextureTarget, policy: &SamplingPolicy) {
        let target = Self::texture_target(target);
        let wrap = (match policy.wrap {
            WrapMode::Repeat => glow::REPEAT,
            WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        }) as i32;
        unsafe {
            self.gl.bind_texture(target, Some(glow::NativeTexture(texture.0)));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, wrap);
            self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, wrap);
            if target == glow::TEXTURE_CUBE_MAP {
                self.gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_R, wrap);
            }
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, Self::filter(policy.min_filter));
            self.gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, Self::filter(policy.mag_filter));
            if policy.generate_mipmaps {
                self.gl.generate_mipmap(target);
            }
        }
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl
                .bind_texture(Self::texture_target(target), texture.map(|t| glow::NativeTexture(t.0)));
        }
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        unsafe { self.gl.delete_texture(glow::NativeTexture(texture.0)) }
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle> {
        unsafe {
            self.gl
                .create_vertex_array()
                .map(|vao| VertexArrayHandle(vao.0))
                .map_err(|message| DeviceError::CreateFailed { kind: "vertex array", message })
        }
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        unsafe { self.gl.bind_vertex_array(vertex_array.map(|v| glow::NativeVertexArray(v.0))) }
    }

    fn create_vertex_buffer(&mut self, location: u32, components: u32, data: &[f32]) -> DeviceResult<BufferHandle> {
        let buffer = self.create_buffer(glow::ARRAY_BUFFER, bytemuck::cast_slice(data))?;
        unsafe {
            self.gl.enable_vertex_attrib_array(location);
            self.gl
                .vertex_attrib_pointer_f32(location, components as i32, glow::FLOAT, false, 0, 0);
        }
        Ok(buffer)
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> DeviceResult<BufferHandle> {
        self.create_buffer(glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(indices))
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.0)) }
    }

    fn set_primitive_restart(&mut self, enabled: bool) {
        self.toggle(glow::PRIMITIVE_RESTART_FIXED_INDEX, enabled);
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color;
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear(&mut self) {
        unsafe { self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT) }
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.toggle(glow::DEPTH_TEST, enabled);
        if enabled {
            unsafe { self.gl.depth_func(glow::LESS) }
        }
    }

    fn set_depth_write(&mut self, enabled: bool) {
        unsafe { self.gl.depth_mask(enabled) }
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.toggle(glow::CULL_FACE, enabled);
        if enabled {
            unsafe { self.gl.cull_face(glow::BACK) }
        }
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        let mode = match mode {
            PolygonMode::Fill => glow::FILL,
            PolygonMode::Line => glow::LINE,
        };
        unsafe { self.gl.polygon_mode(glow::FRONT_AND_BACK, mode) }
    }

    fn set_viewport(&mut self, width: i32, height: i32) {
        unsafe { self.gl.viewport(0, 0, width, height) }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(Self::primitive(primitive), first, count) }
    }

    fn draw_elements(&mut self, primitive: Primitive, count: i32) {
        unsafe { self.gl.draw_elements(Self::primitive(primitive), count, glow::UNSIGNED_INT, 0) }
    }
}
