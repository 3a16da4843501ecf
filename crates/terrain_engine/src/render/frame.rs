//! Per-frame draw sequence
//!
//! Each frame clears, then draws three passes in a fixed order:
//!
//! 1. **Skybox**: depth writes off, translation-free view, cubemap on its unit
//! 2. **Terrain**: depth writes on, every material texture bound, one
//!    strip-with-restart draw over the whole index buffer
//! 3. **Billboards**: culling off while the sprites are drawn as points,
//!    then culling back on and the terrain program current again
//!
//! The renderer only reads the [`RenderContext`]. A pass whose program never
//! linked is skipped, with one warning per program.

use std::collections::HashSet;

use crate::foundation::math::Mat4Ext;
use crate::render::api::{GraphicsDevice, PolygonMode, ProgramHandle, UniformValue};
use crate::render::bindings::TextureSlot;
use crate::render::context::RenderContext;
use crate::render::primitives::FrameMatrices;
use crate::render::shader::ProgramKind;

/// Draws frames from a [`RenderContext`]
#[derive(Debug, Default)]
pub struct FrameRenderer {
    warned: HashSet<ProgramKind>,
}

impl FrameRenderer {
    /// New renderer
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and draw every pass
    pub fn draw_frame(&mut self, device: &mut dyn GraphicsDevice, context: &RenderContext) {
        device.clear();
        device.set_polygon_mode(if context.scene.wireframe() {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        });

        let matrices = context.camera.frame_matrices();

        self.skybox_pass(device, context, &matrices);
        self.terrain_pass(device, context, &matrices);
        self.billboard_pass(device, context, &matrices);
    }

    fn program(&mut self, context: &RenderContext, kind: ProgramKind) -> Option<ProgramHandle> {
        let program = context.shaders.program(kind);
        if program.is_none() && self.warned.insert(kind) {
            log::warn!("No {:?} program available; skipping its pass", kind);
        }
        program
    }

    fn bind_slot(device: &mut dyn GraphicsDevice, context: &RenderContext, program: ProgramHandle, slot: TextureSlot) {
        let (Some(texture), Some(binding)) = (context.textures.get(slot), context.bindings.get(slot)) else {
            return;
        };
        device.bind_texture(binding.unit, binding.target, Some(texture));
        let unit = i32::try_from(binding.unit).unwrap_or(0);
        device.set_uniform(program, binding.sampler, UniformValue::Int(unit));
    }

    fn skybox_pass(&mut self, device: &mut dyn GraphicsDevice, context: &RenderContext, matrices: &FrameMatrices) {
        let Some(program) = self.program(context, ProgramKind::Skybox) else {
            return;
        };

        device.set_depth_write(false);
        device.use_program(Some(program));
        device.set_uniform(program, "view", UniformValue::Mat4(matrices.skybox_view.to_column_array()));
        device.set_uniform(program, "projection", UniformValue::Mat4(matrices.projection.to_column_array()));
        Self::bind_slot(device, context, program, TextureSlot::Skybox);
        context.meshes.skybox.draw(device);
        device.set_depth_write(true);
    }

    fn terrain_pass(&mut self, device: &mut dyn GraphicsDevice, context: &RenderContext, matrices: &FrameMatrices) {
        let Some(program) = self.program(context, ProgramKind::Terrain) else {
            return;
        };

        let light = context.scene.light_direction();
        let eye = matrices.camera_position;

        device.set_depth_write(true);
        device.use_program(Some(program));
        device.set_uniform(program, "MVP", UniformValue::Mat4(matrices.mvp.to_column_array()));
        device.set_uniform(program, "modelView", UniformValue::Mat4(matrices.model_view.to_column_array()));
        device.set_uniform(program, "lightPos", UniformValue::Vec3([light.x, light.y, light.z]));
        device.set_uniform(program, "cameraPos", UniformValue::Vec3([eye.x, eye.y, eye.z]));
        device.set_uniform(program, "numPoints", UniformValue::Float(context.n_points as f32));
        device.set_uniform(program, "scaleValue", UniformValue::Float(context.scene.height_scale()));
        for slot in TextureSlot::TERRAIN {
            Self::bind_slot(device, context, program, slot);
        }
        context.meshes.terrain.draw(device);
    }

    fn billboard_pass(&mut self, device: &mut dyn GraphicsDevice, context: &RenderContext, matrices: &FrameMatrices) {
        let Some(program) = self.program(context, ProgramKind::Billboard) else {
            return;
        };

        let eye = matrices.camera_position;

        device.set_face_culling(false);
        device.use_program(Some(program));
        device.set_uniform(program, "viewProjection", UniformValue::Mat4(matrices.view_projection.to_column_array()));
        device.set_uniform(program, "cameraPosition", UniformValue::Vec3([eye.x, eye.y, eye.z]));
        Self::bind_slot(device, context, program, TextureSlot::Sprite);
        context.meshes.billboards.draw(device);
        device.set_face_culling(true);

        if let Some(terrain) = context.shaders.program(ProgramKind::Terrain) {
            device.use_program(Some(terrain));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TerrainAppConfig;
    use crate::render::api::mock::{Call, MockDevice};
    use crate::render::api::{Primitive, TextureTarget};
    use crate::render::shader::ProgramSources;
    use std::path::PathBuf;

    struct Fixture {
        dir: PathBuf,
        device: MockDevice,
        context: Option<RenderContext>,
    }

    impl Fixture {
        /// Context with working shaders and a sprite, other textures missing
        fn new(test: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("terrain_engine_frame_{}_{}", std::process::id(), test));
            std::fs::create_dir_all(&dir).unwrap();
            let vert = dir.join("p.vert");
            let frag = dir.join("p.frag");
            std::fs::write(&vert, "void main() { gl_Position = vec4(0.0); }").unwrap();
            std::fs::write(&frag, "void main() {}").unwrap();
            let sprite = dir.join("sprite.png");
            image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 255, 0, 255])).save(&sprite).unwrap();

            let mut config = TerrainAppConfig::default();
            config.terrain.n_points = 4;
            let sources = ProgramSources::new(&vert, &frag);
            config.shaders.terrain = sources.clone();
            config.shaders.skybox = sources.clone();
            config.shaders.billboard = sources;
            config.textures.sprite = sprite;

            let mut device = MockDevice::new();
            let context = RenderContext::initialize(&mut device, &config).unwrap();
            device.take_calls();
            Self { dir, device, context: Some(context) }
        }

        fn context(&self) -> &RenderContext {
            self.context.as_ref().unwrap()
        }

        fn draw(&mut self, renderer: &mut FrameRenderer) -> Vec<Call> {
            renderer.draw_frame(&mut self.device, self.context.as_ref().unwrap());
            self.device.take_calls()
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    fn index_of(calls: &[Call], wanted: &Call) -> usize {
        calls.iter().position(|c| c == wanted).unwrap_or_else(|| panic!("missing {:?}", wanted))
    }

    #[test]
    fn passes_run_in_order_with_state_toggles() {
        let mut fixture = Fixture::new("order");
        let terrain = fixture.context().shaders.program(ProgramKind::Terrain).unwrap();
        let skybox = fixture.context().shaders.program(ProgramKind::Skybox).unwrap();
        let billboard = fixture.context().shaders.program(ProgramKind::Billboard).unwrap();

        let calls = fixture.draw(&mut FrameRenderer::new());

        assert_eq!(calls[0], Call::Clear);
        let depth_off = index_of(&calls, &Call::DepthWrite(false));
        let use_skybox = index_of(&calls, &Call::UseProgram(Some(skybox)));
        let draw_skybox = index_of(&calls, &Call::DrawArrays(Primitive::Triangles, 0, 36));
        let depth_on = index_of(&calls, &Call::DepthWrite(true));
        let use_terrain = index_of(&calls, &Call::UseProgram(Some(terrain)));
        let draw_terrain = index_of(&calls, &Call::DrawElements(Primitive::TriangleStrip, 27));
        let cull_off = index_of(&calls, &Call::FaceCulling(false));
        let use_billboard = index_of(&calls, &Call::UseProgram(Some(billboard)));
        let draw_points = index_of(&calls, &Call::DrawArrays(Primitive::Points, 0, 3));
        let cull_on = index_of(&calls, &Call::FaceCulling(true));

        assert!(depth_off < use_skybox && use_skybox < draw_skybox && draw_skybox < depth_on);
        assert!(depth_on < use_terrain && use_terrain < draw_terrain);
        assert!(draw_terrain < cull_off && cull_off < use_billboard);
        assert!(use_billboard < draw_points && draw_points < cull_on);
        assert_eq!(calls.last(), Some(&Call::UseProgram(Some(terrain))));
    }

    #[test]
    fn terrain_uniforms_follow_scene() {
        let mut fixture = Fixture::new("uniforms");
        {
            let context = fixture.context.as_mut().unwrap();
            context.scene.raise_height_scale();
        }
        let calls = fixture.draw(&mut FrameRenderer::new());
        let uniform = |name: &str| {
            calls.iter().rev().find_map(|c| match c {
                Call::SetUniform(_, n, v) if n == name => Some(*v),
                _ => None,
            })
        };
        assert_eq!(uniform("numPoints"), Some(UniformValue::Float(4.0)));
        match uniform("scaleValue") {
            Some(UniformValue::Float(scale)) => approx::assert_relative_eq!(scale, 1.1, epsilon = 1e-6),
            other => panic!("unexpected scaleValue {:?}", other),
        }
        assert_eq!(uniform("lightPos"), Some(UniformValue::Vec3([0.0, -0.5, -0.5])));
        assert_eq!(uniform("cameraPos"), Some(UniformValue::Vec3([0.0, 1.0, 5.0])));
        assert_eq!(uniform("cameraPosition"), Some(UniformValue::Vec3([0.0, 1.0, 5.0])));
    }

    #[test]
    fn only_loaded_textures_are_bound() {
        let mut fixture = Fixture::new("textures");
        let sprite = fixture.context().textures.get(TextureSlot::Sprite).unwrap();
        let calls = fixture.draw(&mut FrameRenderer::new());

        let binds: Vec<&Call> = calls.iter().filter(|c| matches!(c, Call::BindTexture(..))).collect();
        assert_eq!(binds, vec![&Call::BindTexture(0, TextureTarget::Texture2D, Some(sprite))]);
        assert!(calls.contains(&Call::SetUniform(
            fixture.context().shaders.program(ProgramKind::Billboard).unwrap(),
            "sprite".to_string(),
            UniformValue::Int(0)
        )));
    }

    #[test]
    fn textures_bind_on_the_unit_the_table_names() {
        let mut fixture = Fixture::new("rebound");
        let sprite = fixture.context().textures.get(TextureSlot::Sprite).unwrap();
        fixture.context.as_mut().unwrap().bindings =
            crate::render::bindings::TextureBindings::standard().with(TextureSlot::Sprite, 5, "sprite");
        let billboard = fixture.context().shaders.program(ProgramKind::Billboard).unwrap();

        let calls = fixture.draw(&mut FrameRenderer::new());
        assert!(calls.contains(&Call::BindTexture(5, TextureTarget::Texture2D, Some(sprite))));
        assert!(calls.contains(&Call::SetUniform(billboard, "sprite".to_string(), UniformValue::Int(5))));
    }

    #[test]
    fn wireframe_sets_line_mode() {
        let mut fixture = Fixture::new("wireframe");
        let mut renderer = FrameRenderer::new();
        let calls = fixture.draw(&mut renderer);
        assert_eq!(calls[1], Call::PolygonMode(PolygonMode::Fill));

        fixture.context.as_mut().unwrap().scene.toggle_wireframe();
        let calls = fixture.draw(&mut renderer);
        assert_eq!(calls[1], Call::PolygonMode(PolygonMode::Line));
    }

    #[test]
    fn missing_programs_skip_passes() {
        let mut config = TerrainAppConfig::default();
        config.terrain.n_points = 2;
        let mut device = MockDevice::new();
        let context = RenderContext::initialize(&mut device, &config).unwrap();
        device.take_calls();

        let mut renderer = FrameRenderer::new();
        renderer.draw_frame(&mut device, &context);
        renderer.draw_frame(&mut device, &context);

        assert!(!device.calls.iter().any(|c| matches!(c, Call::DrawArrays(..) | Call::DrawElements(..))));
        assert_eq!(renderer.warned.len(), 3);
    }
}
