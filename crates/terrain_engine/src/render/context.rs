//! Render context
//!
//! Owns every GPU resource of the viewer together with the camera and the
//! scene parameters. Built once at startup, handed by reference to the
//! input handler and the frame renderer, and torn down explicitly before
//! the window goes away.

use crate::core::config::TerrainAppConfig;
use crate::render::api::GraphicsDevice;
use crate::render::bindings::TextureBindings;
use crate::render::mesh::{BillboardSet, GpuMesh, TerrainMesh};
use crate::render::primitives::Camera;
use crate::render::shader::ShaderManager;
use crate::render::texture::TextureSet;
use crate::render::RenderResult;
use crate::scene::SceneState;

/// The three uploaded meshes
#[derive(Debug)]
pub struct SceneMeshes {
    /// Terrain grid with its strip element buffer
    pub terrain: GpuMesh,
    /// Skybox cube
    pub skybox: GpuMesh,
    /// Billboard anchor points
    pub billboards: GpuMesh,
}

/// All render state of the viewer
#[derive(Debug)]
pub struct RenderContext {
    /// Fly camera
    pub camera: Camera,
    /// Light, height scale, wireframe
    pub scene: SceneState,
    /// Uploaded geometry
    pub meshes: SceneMeshes,
    /// Loaded textures
    pub textures: TextureSet,
    /// Shader programs
    pub shaders: ShaderManager,
    /// Slot → unit table
    pub bindings: TextureBindings,
    /// Grid resolution, uploaded as `numPoints`
    pub n_points: u32,
}

impl RenderContext {
    /// Build everything from config.
    ///
    /// Mesh generation, binding table and device failures are fatal.
    /// Missing textures or broken shaders are logged and leave their slot
    /// empty.
    pub fn initialize(device: &mut dyn GraphicsDevice, config: &TerrainAppConfig) -> RenderResult<Self> {
        let bindings = TextureBindings::standard();
        bindings.validate()?;

        let terrain_mesh = TerrainMesh::generate(config.terrain.n_points, config.terrain.scale)?;
        let billboards = BillboardSet::new(config.billboards.positions.clone());

        device.set_clear_color(config.scene.clear_color);
        device.set_depth_test(true);
        device.set_face_culling(true);

        let meshes = SceneMeshes {
            terrain: GpuMesh::upload_terrain(device, &terrain_mesh)?,
            skybox: GpuMesh::upload_skybox(device)?,
            billboards: GpuMesh::upload_billboards(device, &billboards)?,
        };
        drop(terrain_mesh);

        let textures = TextureSet::load(device, &config.textures, &bindings);

        let mut shaders = ShaderManager::new(config.shaders.clone());
        shaders.load_all(device)?;

        let mut camera = Camera::from_config(&config.camera);
        camera.set_viewport(config.window.width, config.window.height);

        log::info!("Render context ready");

        Ok(Self {
            camera,
            scene: SceneState::from_config(&config.scene),
            meshes,
            textures,
            shaders,
            bindings,
            n_points: config.terrain.n_points,
        })
    }

    /// Rebuild shader programs from disk, keeping any that fail
    pub fn reload_shaders(&mut self, device: &mut dyn GraphicsDevice) -> RenderResult<()> {
        let reports = self.shaders.reload_all(device)?;
        let linked = reports.iter().filter(|r| r.is_linked()).count();
        log::info!("Shader reload: {} of {} programs rebuilt", linked, reports.len());
        Ok(())
    }

    /// Framebuffer resized
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        device.set_viewport(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );
    }

    /// Release GPU resources: geometry, then programs, then textures
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        let SceneMeshes { terrain, skybox, billboards } = self.meshes;
        terrain.destroy(device);
        skybox.destroy(device);
        billboards.destroy(device);

        self.shaders.destroy(device);
        self.textures.destroy(device);

        log::info!("Render context destroyed");
    }
}
