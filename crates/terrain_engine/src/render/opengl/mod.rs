//! OpenGL backend
//!
//! The only module allowed to touch raw GL: [`GlowDevice`] implements
//! [`GraphicsDevice`](crate::render::api::GraphicsDevice) on a `glow`
//! context, and [`GlWindow`] owns the GLFW window that context belongs to.

#![allow(unsafe_code)]

pub mod device;
pub mod window;

pub use device::{GlowDevice, MIN_GL_VERSION};
pub use window::{GlWindow, WindowError, WindowResult, GL_VERSION};
