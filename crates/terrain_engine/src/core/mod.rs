//! Core viewer modules

pub mod config;

pub use config::TerrainAppConfig;
