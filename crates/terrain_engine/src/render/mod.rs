//! # Rendering
//!
//! Everything between the scene state and the GL context:
//!
//! - **`api`**: the [`GraphicsDevice`] trait, typed handles and state enums
//! - **`opengl`**: the `glow` device and the GLFW window
//! - **`mesh`**: terrain grid generation and GPU geometry
//! - **`texture`** / **`shader`**: asset loading into GPU objects
//! - **`bindings`**: texture slot to unit and sampler name table
//! - **`context`**: owner of all GPU resources, camera and scene
//! - **`frame`**: the skybox, terrain and billboard passes
//!
//! The GL context is single-threaded; every type here is used from the main
//! thread only.

pub mod api;
pub mod bindings;
pub mod context;
pub mod frame;
pub mod mesh;
pub mod opengl;
pub mod primitives;
pub mod shader;
pub mod texture;
pub mod window;

use thiserror::Error;

pub use api::{DeviceError, GraphicsDevice};
pub use bindings::{BindingError, TextureBindings, TextureSlot};
pub use context::RenderContext;
pub use frame::FrameRenderer;
pub use mesh::{MeshError, TerrainMesh};
pub use opengl::{GlowDevice, WindowError};
pub use primitives::Camera;
pub use shader::{ProgramKind, ShaderError, ShaderManager};
pub use texture::{TextureClass, TextureLoader, TextureSet};
pub use window::WindowHandle;

/// Errors that stop the renderer from starting
#[derive(Error, Debug)]
pub enum RenderError {
    /// Terrain grid could not be built
    #[error("Terrain mesh: {0}")]
    Mesh(#[from] MeshError),

    /// GPU object creation failed
    #[error("Device: {0}")]
    Device(#[from] DeviceError),

    /// Shader manager failure (not a compile error, those are logged)
    #[error("Shaders: {0}")]
    Shader(#[from] ShaderError),

    /// Texture unit table is inconsistent
    #[error("Texture bindings: {0}")]
    Bindings(#[from] BindingError),
}

/// Result type for render setup
pub type RenderResult<T> = Result<T, RenderError>;
