//! Public rendering API
//!
//! The device trait every renderer component talks to, plus its handle and
//! state types.

pub mod device;

#[cfg(test)]
pub(crate) mod mock;

pub use device::{
    GraphicsDevice, DeviceResult, DeviceError, BuildOutcome,
    ProgramHandle, ShaderHandle, TextureHandle, BufferHandle, VertexArrayHandle,
    ShaderStage, TextureTarget, CubeFace, PixelFormat, WrapMode, FilterMode,
    SamplingPolicy, Primitive, PolygonMode, UniformValue,
};
