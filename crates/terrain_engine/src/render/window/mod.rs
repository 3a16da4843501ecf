//! Window management
//!
//! - **`handle`**: the window type the application holds
//! - **`backend`**: crate-internal trait the GLFW window implements
//!   (see `render::opengl::window`)

pub mod backend;
pub mod handle;

pub use handle::WindowHandle;
