//! Viewer application: startup, frame loop and teardown

use std::path::PathBuf;

use terrain_engine::config::{Config, ConfigError};
use terrain_engine::core::config::TerrainAppConfig;
use terrain_engine::foundation::time::Timer;
use terrain_engine::input::{AppAction, InputHandler};
use terrain_engine::render::{FrameRenderer, GlowDevice, RenderContext, RenderError, WindowError, WindowHandle};
use thiserror::Error;

/// Config file used when none is named on the command line
pub const DEFAULT_CONFIG_PATH: &str = "terrain.toml";

/// Fatal startup errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Config file unreadable, malformed or inconsistent
    #[error("Configuration error in {path}: {source}")]
    Config {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: ConfigError,
    },

    /// Window or GL context
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Render context setup
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Load the config named by `arg`, or [`DEFAULT_CONFIG_PATH`] if absent.
///
/// A missing default file means built-in defaults. A missing file that was
/// named explicitly is an error.
pub fn load_config(arg: Option<&str>) -> Result<TerrainAppConfig, AppError> {
    let (path, explicit) = match arg {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    let config = if !explicit && !path.exists() {
        log::info!("No {} found, using built-in defaults", path.display());
        TerrainAppConfig::default()
    } else {
        TerrainAppConfig::load_from_file(&path).map_err(|source| AppError::Config { path: path.clone(), source })?
    };

    config.validate().map_err(|source| AppError::Config { path, source })?;
    Ok(config)
}

/// Title bar text for a camera position
pub fn window_title(base: &str, position: &terrain_engine::foundation::math::Vec3) -> String {
    format!("{} - ({:.2},{:.2},{:.2})", base, position.x, position.y, position.z)
}

/// The running viewer
pub struct TerrainApp {
    context: Option<RenderContext>,
    device: GlowDevice,
    window: WindowHandle,
    renderer: FrameRenderer,
    input: InputHandler,
    timer: Timer,
    title: String,
}

impl TerrainApp {
    /// Open the window and build every GPU resource
    pub fn new(config: &TerrainAppConfig) -> Result<Self, AppError> {
        let (mut window, mut device) = WindowHandle::open(&config.window)?;
        let mut context = RenderContext::initialize(&mut device, config)?;

        let (width, height) = window.framebuffer_size();
        context.resize(&mut device, width, height);
        window.set_cursor_captured(true);

        Ok(Self {
            context: Some(context),
            device,
            window,
            renderer: FrameRenderer::new(),
            input: InputHandler::new(&config.camera),
            timer: Timer::new(),
            title: config.window.title.clone(),
        })
    }

    /// Run until the window closes
    pub fn run(&mut self) -> Result<(), AppError> {
        log::info!("Entering frame loop");

        while !self.window.should_close() {
            let dt = self.timer.tick();
            let Some(context) = self.context.as_mut() else {
                break;
            };

            for event in self.window.poll_events() {
                let Some(action) = self.input.handle_event(&event, &mut context.scene) else {
                    continue;
                };
                match action {
                    AppAction::Quit => self.window.request_close(),
                    AppAction::ReloadShaders => context.reload_shaders(&mut self.device)?,
                    AppAction::CaptureCursor(captured) => self.window.set_cursor_captured(captured),
                    AppAction::Resized { width, height } => context.resize(&mut self.device, width, height),
                }
            }

            let snapshot = self.window.input_snapshot();
            self.input.update_camera(&mut context.camera, &snapshot, dt);

            self.renderer.draw_frame(&mut self.device, context);
            self.window.set_title(&window_title(&self.title, &context.camera.position));
            self.window.swap_buffers();
        }

        log::info!("Frame loop finished after {} frames", self.timer.frame_count());
        Ok(())
    }

    /// Release GPU resources while the context is still current
    pub fn shutdown(&mut self) {
        if let Some(context) = self.context.take() {
            context.destroy(&mut self.device);
        }
    }
}

impl Drop for TerrainApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Config path from the process arguments
pub fn config_arg(mut args: impl Iterator<Item = String>) -> Option<String> {
    args.nth(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_engine::foundation::math::Vec3;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("terrain_app_{}_{}", std::process::id(), name))
    }

    #[test]
    fn missing_explicit_config_is_fatal() {
        let path = temp_path("absent.toml");
        let result = load_config(path.to_str());
        assert!(matches!(result, Err(AppError::Config { source: ConfigError::Io(_), .. })));
    }

    #[test]
    fn explicit_config_is_loaded_and_validated() {
        let good = temp_path("good.toml");
        std::fs::write(&good, "[terrain]\nn_points = 32\n").unwrap();
        let config = load_config(good.to_str()).unwrap();
        assert_eq!(config.terrain.n_points, 32);
        std::fs::remove_file(&good).ok();

        let bad = temp_path("bad.toml");
        std::fs::write(&bad, "[camera]\nnear = 10.0\nfar = 1.0\n").unwrap();
        let result = load_config(bad.to_str());
        std::fs::remove_file(&bad).ok();
        assert!(matches!(result, Err(AppError::Config { source: ConfigError::Invalid(_), .. })));
    }

    #[test]
    fn first_argument_names_config() {
        let args = ["terrain_viewer", "alpine.ron"].map(String::from);
        assert_eq!(config_arg(args.into_iter()), Some("alpine.ron".to_string()));
        assert_eq!(config_arg(std::iter::once("terrain_viewer".to_string())), None);
    }

    #[test]
    fn title_shows_camera_position() {
        assert_eq!(
            window_title("Terrain Viewer", &Vec3::new(0.0, 1.0, 5.0)),
            "Terrain Viewer - (0.00,1.00,5.00)"
        );
    }
}
