//! Shader program management
//!
//! Programs are built from GLSL files on disk: each stage is read,
//! compiled, and the program is linked only when every stage compiled.
//! Stage objects never outlive the link attempt.
//!
//! [`ShaderManager`] owns the three programs the viewer draws with and can
//! rebuild them from disk at runtime. A program that fails to rebuild keeps
//! running with its previous, working version.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assets;
use crate::core::config::ShaderConfig;
use crate::render::api::{DeviceError, GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage};

pub use crate::core::config::ProgramSources;

/// Result type for shader operations
pub type ShaderResult<T> = Result<T, ShaderError>;

/// Shader errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// The device could not create a shader or program object
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// The programs the viewer draws with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgramKind {
    /// Heightmap-displaced terrain
    Terrain,
    /// Cubemap background
    Skybox,
    /// Camera-facing sprites
    Billboard,
}

impl ProgramKind {
    /// Every program, in load order
    pub const ALL: [ProgramKind; 3] = [Self::Terrain, Self::Skybox, Self::Billboard];
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Source read and compiled
    Compiled,
    /// Source file could not be read
    ReadFailed(String),
    /// Compiler rejected the source; carries the info log
    CompileFailed(String),
}

impl StageStatus {
    /// True for [`StageStatus::Compiled`]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Compiled)
    }
}

/// Per-stage entry of a [`LoadReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Pipeline stage
    pub stage: ShaderStage,
    /// Source file
    pub path: PathBuf,
    /// What happened
    pub status: StageStatus,
}

/// Outcome of the link step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Program linked
    Linked,
    /// Linker rejected the program; carries the info log
    Failed(String),
    /// Not attempted because a stage failed
    Skipped,
}

/// Everything that happened while building one program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Stage outcomes in vertex, fragment, geometry order
    pub stages: Vec<StageReport>,
    /// Link outcome
    pub link: LinkStatus,
    /// The program, when linking succeeded
    pub program: Option<ProgramHandle>,
}

impl LoadReport {
    /// True when the program is usable
    pub fn is_linked(&self) -> bool {
        self.link == LinkStatus::Linked
    }

    /// Status of `stage`, if the program has one
    pub fn stage(&self, stage: ShaderStage) -> Option<&StageStatus> {
        self.stages.iter().find(|s| s.stage == stage).map(|s| &s.status)
    }
}

/// Build a program from `sources`.
///
/// Read, compile and link failures end up in the returned report (and in
/// the log); only a device refusing to create objects is an `Err`.
pub fn load_program(device: &mut dyn GraphicsDevice, sources: &ProgramSources) -> ShaderResult<LoadReport> {
    let mut stage_list: Vec<(ShaderStage, &Path)> = vec![
        (ShaderStage::Vertex, sources.vertex.as_path()),
        (ShaderStage::Fragment, sources.fragment.as_path()),
    ];
    if let Some(geometry) = &sources.geometry {
        stage_list.push((ShaderStage::Geometry, geometry.as_path()));
    }

    let mut shaders: Vec<ShaderHandle> = Vec::with_capacity(stage_list.len());
    let mut stages = Vec::with_capacity(stage_list.len());
    for (stage, path) in stage_list {
        let shader = match device.create_shader(stage) {
            Ok(shader) => shader,
            Err(e) => {
                delete_shaders(device, &shaders);
                return Err(e.into());
            }
        };
        shaders.push(shader);

        let status = compile_stage(device, shader, stage, path);
        stages.push(StageReport { stage, path: path.to_path_buf(), status });
    }

    let (link, program) = if stages.iter().all(|s| s.status.is_ok()) {
        match link_stages(device, &shaders, sources) {
            Ok(result) => result,
            Err(e) => {
                delete_shaders(device, &shaders);
                return Err(e);
            }
        }
    } else {
        log::warn!("Not linking {:?}: a stage failed", sources.vertex);
        (LinkStatus::Skipped, None)
    };

    delete_shaders(device, &shaders);

    Ok(LoadReport { stages, link, program })
}

fn compile_stage(device: &mut dyn GraphicsDevice, shader: ShaderHandle, stage: ShaderStage, path: &Path) -> StageStatus {
    let source = match assets::read_text(path) {
        Ok(source) => source,
        Err(e) => {
            log::error!("Cannot read {} shader {:?}: {}", stage.name(), path, e);
            return StageStatus::ReadFailed(e.to_string());
        }
    };

    log::debug!("Compiling {} shader {:?}", stage.name(), path);
    let outcome = device.compile_shader(shader, &source);
    let log_text = outcome.trimmed_log();
    if outcome.success {
        if !log_text.is_empty() {
            log::info!("{:?}: {}", path, log_text);
        }
        StageStatus::Compiled
    } else {
        log::error!("Compiling {:?} failed: {}", path, log_text);
        StageStatus::CompileFailed(log_text.to_string())
    }
}

fn link_stages(
    device: &mut dyn GraphicsDevice,
    shaders: &[ShaderHandle],
    sources: &ProgramSources,
) -> ShaderResult<(LinkStatus, Option<ProgramHandle>)> {
    let program = device.create_program()?;
    let outcome = device.link_program(program, shaders);
    let log_text = outcome.trimmed_log();

    if outcome.success {
        if !log_text.is_empty() {
            log::info!("Link log for {:?}: {}", sources.vertex, log_text);
        }
        Ok((LinkStatus::Linked, Some(program)))
    } else {
        log::error!("Linking {:?} failed: {}", sources.vertex, log_text);
        device.delete_program(program);
        Ok((LinkStatus::Failed(log_text.to_string()), None))
    }
}

fn delete_shaders(device: &mut dyn GraphicsDevice, shaders: &[ShaderHandle]) {
    for &shader in shaders {
        device.delete_shader(shader);
    }
}

/// Owner of the terrain, skybox and billboard programs
#[derive(Debug)]
pub struct ShaderManager {
    sources: ShaderConfig,
    programs: HashMap<ProgramKind, ProgramHandle>,
}

impl ShaderManager {
    /// Manager for the given sources; nothing is built until [`ShaderManager::load_all`]
    pub fn new(sources: ShaderConfig) -> Self {
        Self {
            sources,
            programs: HashMap::new(),
        }
    }

    /// Build one program outside the managed slots; see [`load_program`]
    pub fn load(device: &mut dyn GraphicsDevice, sources: &ProgramSources) -> ShaderResult<LoadReport> {
        load_program(device, sources)
    }

    /// Source files of `kind`
    pub fn sources(&self, kind: ProgramKind) -> &ProgramSources {
        match kind {
            ProgramKind::Terrain => &self.sources.terrain,
            ProgramKind::Skybox => &self.sources.skybox,
            ProgramKind::Billboard => &self.sources.billboard,
        }
    }

    /// Current program of `kind`, if one ever linked
    pub fn program(&self, kind: ProgramKind) -> Option<ProgramHandle> {
        self.programs.get(&kind).copied()
    }

    /// Build every program. Slots that fail stay empty.
    pub fn load_all(&mut self, device: &mut dyn GraphicsDevice) -> ShaderResult<Vec<LoadReport>> {
        self.rebuild(device, "Loaded")
    }

    /// Rebuild every program from disk.
    ///
    /// A program is replaced only when its rebuild links; the old one is
    /// deleted after the new one is in place. Failed rebuilds keep the
    /// previous program.
    pub fn reload_all(&mut self, device: &mut dyn GraphicsDevice) -> ShaderResult<Vec<LoadReport>> {
        log::info!("Reloading shaders");
        self.rebuild(device, "Reloaded")
    }

    fn rebuild(&mut self, device: &mut dyn GraphicsDevice, verb: &str) -> ShaderResult<Vec<LoadReport>> {
        let mut reports = Vec::with_capacity(ProgramKind::ALL.len());
        for kind in ProgramKind::ALL {
            let report = load_program(device, self.sources(kind))?;
            match report.program {
                Some(program) => {
                    if let Some(previous) = self.programs.insert(kind, program) {
                        device.delete_program(previous);
                    }
                    log::info!("{} {:?} program", verb, kind);
                }
                None if self.programs.contains_key(&kind) => {
                    log::warn!("{:?} program failed to build; keeping the previous one", kind);
                }
                None => log::error!("{:?} program failed to build", kind),
            }
            reports.push(report);
        }
        Ok(reports)
    }

    /// Delete every program
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        for program in self.programs.into_values() {
            device.delete_program(program);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::mock::{Call, MockDevice};

    const GOOD_VERTEX: &str = "#version 450 core\nlayout(location = 0) in vec3 p;\nvoid main() { gl_Position = vec4(p, 1.0); }\n";
    const GOOD_FRAGMENT: &str = "#version 450 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";
    const BROKEN_FRAGMENT: &str = "#version 450 core\nout vec4 c;\nvoid main() { c = vec4(1.0);\n";

    /// Shader files in a per-test temp directory
    struct ShaderDir(PathBuf);

    impl ShaderDir {
        fn new(test: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("terrain_engine_shader_{}_{}", std::process::id(), test));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn write(&self, name: &str, source: &str) -> PathBuf {
            let path = self.0.join(name);
            std::fs::write(&path, source).unwrap();
            path
        }
    }

    impl Drop for ShaderDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    fn config_for(dir: &ShaderDir, fragment: &str) -> ShaderConfig {
        let vertex = dir.write("all.vert", GOOD_VERTEX);
        let frag = dir.write("all.frag", fragment);
        let sources = ProgramSources::new(vertex, frag);
        ShaderConfig {
            terrain: sources.clone(),
            skybox: sources.clone(),
            billboard: sources,
        }
    }

    #[test]
    fn good_pair_links_and_frees_stage_objects() {
        let dir = ShaderDir::new("good_pair");
        let sources = ProgramSources::new(dir.write("a.vert", GOOD_VERTEX), dir.write("a.frag", GOOD_FRAGMENT));
        let mut device = MockDevice::new();

        let report = load_program(&mut device, &sources).unwrap();
        assert!(report.is_linked());
        assert!(report.program.is_some());
        assert_eq!(report.stages.len(), 2);
        assert_eq!(device.live_count("shader"), 0);
        assert_eq!(device.live_count("program"), 1);
    }

    #[test]
    fn syntax_error_fails_compile_and_skips_link() {
        let dir = ShaderDir::new("syntax_error");
        let sources = ProgramSources::new(dir.write("b.vert", GOOD_VERTEX), dir.write("b.frag", BROKEN_FRAGMENT));
        let mut device = MockDevice::new();

        let report = load_program(&mut device, &sources).unwrap();
        assert_eq!(report.stage(ShaderStage::Vertex), Some(&StageStatus::Compiled));
        assert!(matches!(report.stage(ShaderStage::Fragment), Some(StageStatus::CompileFailed(_))));
        assert_eq!(report.link, LinkStatus::Skipped);
        assert!(report.program.is_none());
        assert!(device.position(|c| matches!(c, Call::LinkProgram(..))).is_none());
        assert_eq!(device.live_total(), 0);
    }

    #[test]
    fn missing_geometry_file_is_a_read_failure() {
        let dir = ShaderDir::new("missing_geometry");
        let sources = ProgramSources::new(dir.write("c.vert", GOOD_VERTEX), dir.write("c.frag", GOOD_FRAGMENT))
            .with_geometry(dir.0.join("absent.geom"));
        let mut device = MockDevice::new();

        let report = load_program(&mut device, &sources).unwrap();
        assert!(matches!(report.stage(ShaderStage::Geometry), Some(StageStatus::ReadFailed(_))));
        assert_eq!(report.link, LinkStatus::Skipped);
        assert_eq!(device.live_total(), 0);
    }

    #[test]
    fn link_failure_deletes_program() {
        let dir = ShaderDir::new("link_failure");
        let sources = ProgramSources::new(dir.write("d.vert", GOOD_VERTEX), dir.write("d.frag", GOOD_FRAGMENT));
        let mut device = MockDevice::new();
        device.fail_links = true;

        let report = load_program(&mut device, &sources).unwrap();
        assert!(matches!(report.link, LinkStatus::Failed(_)));
        assert!(report.program.is_none());
        assert_eq!(device.live_total(), 0);
    }

    #[test]
    fn reload_replaces_programs_and_frees_old_ones() {
        let dir = ShaderDir::new("reload_replaces");
        let mut device = MockDevice::new();
        let mut manager = ShaderManager::new(config_for(&dir, GOOD_FRAGMENT));

        manager.load_all(&mut device).unwrap();
        let before = manager.program(ProgramKind::Terrain).unwrap();

        manager.reload_all(&mut device).unwrap();
        let after = manager.program(ProgramKind::Terrain).unwrap();

        assert_ne!(before, after);
        assert!(device.calls.contains(&Call::DeleteProgram(before)));
        assert_eq!(device.live_count("program"), 3);

        manager.destroy(&mut device);
        assert_eq!(device.live_total(), 0);
    }

    #[test]
    fn failed_reload_keeps_last_good_program() {
        let dir = ShaderDir::new("failed_reload");
        let mut device = MockDevice::new();
        let mut manager = ShaderManager::new(config_for(&dir, GOOD_FRAGMENT));
        manager.load_all(&mut device).unwrap();
        let good = manager.program(ProgramKind::Skybox).unwrap();

        dir.write("all.frag", BROKEN_FRAGMENT);
        let reports = manager.reload_all(&mut device).unwrap();

        assert!(reports.iter().all(|r| !r.is_linked()));
        assert_eq!(manager.program(ProgramKind::Skybox), Some(good));
        assert!(!device.calls.contains(&Call::DeleteProgram(good)));
    }

    #[test]
    fn never_linked_slot_stays_empty() {
        let dir = ShaderDir::new("never_linked");
        let mut device = MockDevice::new();
        let mut manager = ShaderManager::new(config_for(&dir, BROKEN_FRAGMENT));

        manager.load_all(&mut device).unwrap();
        for kind in ProgramKind::ALL {
            assert!(manager.program(kind).is_none());
        }
    }
}
