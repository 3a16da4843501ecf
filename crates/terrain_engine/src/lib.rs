//! # Terrain Engine
//!
//! Heightmap terrain rendering over OpenGL 4.5.
//!
//! ## Features
//!
//! - **Terrain grid**: `n x n` vertices drawn as one triangle-strip element
//!   buffer with primitive restart, displaced and shaded in the shaders
//! - **Three passes**: cubemap skybox, textured terrain, billboard sprites
//! - **Shader reload**: rebuild programs from disk without restarting
//! - **Fly camera**: mouse look with arrow and page keys for movement
//! - **Config files**: TOML or RON, every field optional
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use terrain_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TerrainAppConfig::default();
//!     let (mut window, mut device) = WindowHandle::open(&config.window)?;
//!     let context = RenderContext::initialize(&mut device, &config)?;
//!     let mut renderer = FrameRenderer::new();
//!
//!     while !window.should_close() {
//!         window.poll_events();
//!         renderer.draw_frame(&mut device, &context);
//!         window.swap_buffers();
//!     }
//!
//!     context.destroy(&mut device);
//!     Ok(())
//! }
//! ```

#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        core::config::TerrainAppConfig,
        foundation::{
            logging,
            math::{Mat4, Vec3},
            time::Timer,
        },
        input::{AppAction, InputEvent, InputHandler},
        render::{FrameRenderer, GraphicsDevice, RenderContext, RenderError, WindowHandle},
        scene::SceneState,
    };
}
