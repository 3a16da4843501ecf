//! Terrain viewer
//!
//! Usage: `terrain_viewer [CONFIG]`, where `CONFIG` is a `.toml` or `.ron`
//! file (default `terrain.toml`, optional).

mod app;

use app::TerrainApp;
use terrain_engine::foundation::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match app::load_config(app::config_arg(std::env::args()).as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            log::error!("{}", e);
            return Err(e.into());
        }
    };
    logging::init(&config.engine.log_level);

    log::info!("Starting {}", config.window.title);
    if let Ok(cwd) = std::env::current_dir() {
        log::debug!("Working directory: {}", cwd.display());
    }

    let result = TerrainApp::new(&config).and_then(|mut app| {
        let run = app.run();
        app.shutdown();
        run
    });

    match result {
        Ok(()) => {
            log::info!("Terrain viewer finished");
            Ok(())
        }
        Err(e) => {
            log::error!("{}", e);
            Err(e.into())
        }
    }
}
