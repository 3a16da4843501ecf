//! # Viewer Configuration
//!
//! Every tunable of the terrain viewer lives here: window, mesh resolution,
//! camera constants, shader and texture paths, billboard anchors and the
//! initial scene parameters. All sections default to the values the viewer
//! ships with, so a config file only needs to name what it changes.
//!
//! ```toml
//! [terrain]
//! n_points = 400
//!
//! [camera]
//! speed = 6.0
//! ```

use serde::{Serialize, Deserialize};
use std::path::PathBuf;

use crate::render::mesh::MAX_POINTS_PER_SIDE;

pub use crate::config::{Config, ConfigError};

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the viewer (`RUST_LOG` overrides it)
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Base title; the camera position is appended every frame
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "Terrain Viewer".to_string(),
        }
    }
}

/// Terrain grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Vertices per grid side (at least 2)
    pub n_points: u32,
    /// World-space half extent of the grid on X and Z
    pub scale: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            n_points: 200,
            scale: 5.0,
        }
    }
}

/// Fly camera constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting position
    pub position: [f32; 3],
    /// Starting yaw in radians (pi looks down -Z)
    pub yaw: f32,
    /// Starting pitch in radians
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Movement speed in world units per second
    pub speed: f32,
    /// Radians of rotation per pixel of pointer movement
    pub mouse_sensitivity: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 5.0],
            yaw: std::f32::consts::PI,
            pitch: 0.0,
            fov_degrees: 45.0,
            speed: 3.0,
            mouse_sensitivity: 0.005,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Source files of one shader program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSources {
    /// Vertex stage source
    pub vertex: PathBuf,
    /// Fragment stage source
    pub fragment: PathBuf,
    /// Optional geometry stage source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<PathBuf>,
}

impl ProgramSources {
    /// Vertex + fragment program
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            geometry: None,
        }
    }

    /// Add a geometry stage
    pub fn with_geometry(mut self, geometry: impl Into<PathBuf>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }
}

/// Shader sources for the three programs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Heightmap-displaced terrain
    pub terrain: ProgramSources,
    /// Cubemap skybox
    pub skybox: ProgramSources,
    /// Point-expanded billboards
    pub billboard: ProgramSources,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            terrain: ProgramSources::new("shaders/terrain.vert", "shaders/terrain.frag"),
            skybox: ProgramSources::new("shaders/skybox.vert", "shaders/skybox.frag"),
            billboard: ProgramSources::new("shaders/billboard.vert", "shaders/billboard.frag")
                .with_geometry("shaders/billboard.geom"),
        }
    }
}

/// Diffuse, shininess and normal maps of one terrain material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialPaths {
    /// Base colour
    pub diffuse: PathBuf,
    /// Roughness map
    pub shininess: PathBuf,
    /// Tangent-space normal map
    pub normal: PathBuf,
}

impl MaterialPaths {
    fn named(stem: &str) -> Self {
        Self {
            diffuse: PathBuf::from(format!("assets/{stem}.bmp")),
            shininess: PathBuf::from(format!("assets/{stem}-r.bmp")),
            normal: PathBuf::from(format!("assets/{stem}-n.bmp")),
        }
    }
}

/// Texture file paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Low-altitude material
    pub rock: MaterialPaths,
    /// High-altitude material
    pub snow: MaterialPaths,
    /// Flat-ground material
    pub grass: MaterialPaths,
    /// Greyscale heightmap
    pub heightmap: PathBuf,
    /// Cubemap faces in +X, -X, +Y, -Y, +Z, -Z order
    pub skybox_faces: [PathBuf; 6],
    /// Billboard sprite (RGBA)
    pub sprite: PathBuf,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            rock: MaterialPaths::named("rocks"),
            snow: MaterialPaths::named("snow"),
            grass: MaterialPaths::named("grass"),
            heightmap: PathBuf::from("assets/rugged.bmp"),
            skybox_faces: [
                PathBuf::from("assets/skybox/right.jpg"),
                PathBuf::from("assets/skybox/left.jpg"),
                PathBuf::from("assets/skybox/top.jpg"),
                PathBuf::from("assets/skybox/bottom.jpg"),
                PathBuf::from("assets/skybox/front.jpg"),
                PathBuf::from("assets/skybox/back.jpg"),
            ],
            sprite: PathBuf::from("assets/sunflower.png"),
        }
    }
}

/// Billboard anchor points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillboardConfig {
    /// World-space anchor of each sprite
    pub positions: Vec<[f32; 3]>,
}

impl Default for BillboardConfig {
    fn default() -> Self {
        Self {
            positions: vec![
                [-4.09, 1.0, -3.77],
                [3.63, 1.0, 1.14],
                [1.16, 0.86, 2.48],
            ],
        }
    }
}

/// Initial scene parameters and control steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Initial directional light vector
    pub light_direction: [f32; 3],
    /// Initial heightmap displacement multiplier
    pub height_scale: f32,
    /// Degrees per light rotation key press
    pub light_step_degrees: f32,
    /// Height scale change per key press
    pub height_scale_step: f32,
    /// Background colour behind the skybox
    pub clear_color: [f32; 4],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            light_direction: [0.0, -0.5, -0.5],
            height_scale: 1.0,
            light_step_degrees: 5.0,
            height_scale_step: 0.1,
            clear_color: [0.7, 0.8, 1.0, 0.0],
        }
    }
}

/// # Complete Viewer Configuration
///
/// Top-level configuration loaded from `terrain.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainAppConfig {
    /// Engine settings
    pub engine: EngineConfig,
    /// Window settings
    pub window: WindowConfig,
    /// Terrain grid
    pub terrain: TerrainConfig,
    /// Camera constants
    pub camera: CameraConfig,
    /// Shader programs
    pub shaders: ShaderConfig,
    /// Texture files
    pub textures: TextureConfig,
    /// Billboard anchors
    pub billboards: BillboardConfig,
    /// Scene parameters
    pub scene: SceneConfig,
}

impl TerrainAppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".to_string()));
        }
        if !(2..=MAX_POINTS_PER_SIDE).contains(&self.terrain.n_points) {
            return Err(ConfigError::Invalid(format!(
                "terrain.n_points must be between 2 and {}, got {}",
                MAX_POINTS_PER_SIDE, self.terrain.n_points
            )));
        }
        if !(self.terrain.scale > 0.0) {
            return Err(ConfigError::Invalid("terrain.scale must be positive".to_string()));
        }
        let camera = &self.camera;
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(ConfigError::Invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid("camera.fov_degrees must be in (0, 180)".to_string()));
        }
        if self.scene.height_scale < 0.0 || self.scene.height_scale_step < 0.0 {
            return Err(ConfigError::Invalid("height scale values must not be negative".to_string()));
        }
        Ok(())
    }
}

impl Config for TerrainAppConfig {}
