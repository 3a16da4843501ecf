//! Recording device for unit tests

use std::collections::HashMap;
use std::num::NonZeroU32;

use super::device::*;

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage, ShaderHandle),
    CompileShader(ShaderHandle, bool),
    DeleteShader(ShaderHandle),
    CreateProgram(ProgramHandle),
    LinkProgram(ProgramHandle, bool),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniform(ProgramHandle, String, UniformValue),
    CreateTexture(TextureTarget, TextureHandle),
    UploadTexture2d { texture: TextureHandle, width: u32, height: u32, format: PixelFormat },
    UploadCubeFace { texture: TextureHandle, face: CubeFace, format: PixelFormat },
    ApplySampling(TextureHandle, TextureTarget, SamplingPolicy),
    BindTexture(u32, TextureTarget, Option<TextureHandle>),
    DeleteTexture(TextureHandle),
    CreateVertexArray(VertexArrayHandle),
    BindVertexArray(Option<VertexArrayHandle>),
    CreateVertexBuffer { location: u32, components: u32, floats: usize },
    CreateIndexBuffer { count: usize },
    DeleteBuffer(BufferHandle),
    DeleteVertexArray(VertexArrayHandle),
    PrimitiveRestart(bool),
    ClearColor([f32; 4]),
    Clear,
    DepthTest(bool),
    DepthWrite(bool),
    FaceCulling(bool),
    PolygonMode(PolygonMode),
    Viewport(i32, i32),
    DrawArrays(Primitive, i32, i32),
    DrawElements(Primitive, i32),
}

/// Device that records calls and tracks live objects.
///
/// Compilation succeeds when the source contains `void main` and its braces
/// balance; linking succeeds when every attached shader compiled, unless
/// `fail_links` is set.
#[derive(Debug, Default)]
pub struct MockDevice {
    pub calls: Vec<Call>,
    pub fail_links: bool,
    next_id: u32,
    live: HashMap<u32, &'static str>,
    compiled: HashMap<u32, bool>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, kind: &'static str) -> NonZeroU32 {
        self.next_id += 1;
        self.live.insert(self.next_id, kind);
        NonZeroU32::new(self.next_id).expect("ids start at 1")
    }

    fn release(&mut self, id: u32, kind: &'static str) {
        let removed = self.live.remove(&id);
        assert_eq!(removed, Some(kind), "deleting {kind} {id} that is not live");
    }

    /// Number of live objects of `kind`
    pub fn live_count(&self, kind: &str) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    /// Total live objects of every kind
    pub fn live_total(&self) -> usize {
        self.live.len()
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Last value set for uniform `name` on any program
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::SetUniform(_, n, value) if n == name => Some(*value),
            _ => None,
        })
    }

    /// Index of the first recorded call matching `predicate`
    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.iter().position(predicate)
    }

    fn source_compiles(source: &str) -> bool {
        let opens = source.matches('{').count();
        let closes = source.matches('}').count();
        source.contains("void main") && opens == closes
    }
}

impl GraphicsDevice for MockDevice {
    fn create_shader(&mut self, stage: ShaderStage) -> DeviceResult<ShaderHandle> {
        let handle = ShaderHandle(self.allocate("shader"));
        self.calls.push(Call::CreateShader(stage, handle));
        Ok(handle)
    }

    fn compile_shader(&mut self, shader: ShaderHandle, source: &str) -> BuildOutcome {
        let success = Self::source_compiles(source);
        self.compiled.insert(shader.id(), success);
        self.calls.push(Call::CompileShader(shader, success));
        BuildOutcome {
            success,
            log: if success { String::new() } else { "0:1(1): error: syntax error".to_string() },
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.release(shader.id(), "shader");
        self.calls.push(Call::DeleteShader(shader));
    }

    fn create_program(&mut self) -> DeviceResult<ProgramHandle> {
        let handle = ProgramHandle(self.allocate("program"));
        self.calls.push(Call::CreateProgram(handle));
        Ok(handle)
    }

    fn link_program(&mut self, program: ProgramHandle, shaders: &[ShaderHandle]) -> BuildOutcome {
        let all_compiled = shaders
            .iter()
            .all(|s| self.compiled.get(&s.id()).copied().unwrap_or(false));
        let success = all_compiled && !self.fail_links;
        self.calls.push(Call::LinkProgram(program, success));
        BuildOutcome {
            success,
            log: if success { String::new() } else { "error: linking failed".to_string() },
        }
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.release(program.id(), "program");
        self.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.calls.push(Call::UseProgram(program));
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        self.calls.push(Call::SetUniform(program, name.to_string(), value));
    }

    fn create_texture(&mut self, target: TextureTarget) -> DeviceResult<TextureHandle> {
        let handle = TextureHandle(self.allocate("texture"));
        self.calls.push(Call::CreateTexture(target, handle));
        Ok(handle)
    }

    fn upload_texture_2d(&mut self, texture: TextureHandle, width: u32, height: u32, format: PixelFormat, pixels: &[u8]) {
        let channels = match format {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        };
        assert_eq!(pixels.len(), (width * height) as usize * channels, "pixel buffer size mismatch");
        self.calls.push(Call::UploadTexture2d { texture, width, height, format });
    }

    fn upload_cube_face(&mut self, texture: TextureHandle, face: CubeFace, _width: u32, _height: u32, format: PixelFormat, _pixels: &[u8]) {
        self.calls.push(Call::UploadCubeFace { texture, face, format });
    }

    fn apply_sampling(&mut self, texture: TextureHandle, target: TextureTarget, policy: &SamplingPolicy) {
        self.calls.push(Call::ApplySampling(texture, target, *policy));
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: Option<TextureHandle>) {
        self.calls.push(Call::BindTexture(unit, target, texture));
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.release(texture.id(), "texture");
        self.calls.push(Call::DeleteTexture(texture));
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayHandle> {
        let handle = VertexArrayHandle(self.allocate("vertex_array"));
        self.calls.push(Call::CreateVertexArray(handle));
        Ok(handle)
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        self.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn create_vertex_buffer(&mut self, location: u32, components: u32, data: &[f32]) -> DeviceResult<BufferHandle> {
        let handle = BufferHandle(self.allocate("buffer"));
        self.calls.push(Call::CreateVertexBuffer { location, components, floats: data.len() });
        Ok(handle)
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> DeviceResult<BufferHandle> {
        let handle = BufferHandle(self.allocate("buffer"));
        self.calls.push(Call::CreateIndexBuffer { count: indices.len() });
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.release(buffer.id(), "buffer");
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        self.release(vertex_array.id(), "vertex_array");
        self.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn set_primitive_restart(&mut self, enabled: bool) {
        self.calls.push(Call::PrimitiveRestart(enabled));
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.calls.push(Call::ClearColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(Call::DepthTest(enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.calls.push(Call::DepthWrite(enabled));
    }

    fn set_face_culling(&mut self, enabled: bool) {
        self.calls.push(Call::FaceCulling(enabled));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.calls.push(Call::PolygonMode(mode));
    }

    fn set_viewport(&mut self, width: i32, height: i32) {
        self.calls.push(Call::Viewport(width, height));
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        self.calls.push(Call::DrawArrays(primitive, first, count));
    }

    fn draw_elements(&mut self, primitive: Primitive, count: i32) {
        self.calls.push(Call::DrawElements(primitive, count));
    }
}
