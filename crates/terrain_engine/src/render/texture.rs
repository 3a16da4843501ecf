//! Texture loading
//!
//! Decodes image files and uploads them through the device with the
//! sampling state of their [`TextureClass`]. Load failures are never fatal:
//! they are logged and the slot stays empty, which the renderer skips.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::assets::{AssetError, ImageData, PixelLayout};
use crate::core::config::TextureConfig;
use crate::render::api::{
    CubeFace, DeviceError, FilterMode, GraphicsDevice, PixelFormat, SamplingPolicy,
    TextureHandle, TextureTarget, WrapMode,
};
use crate::render::bindings::{TextureBindings, TextureSlot};

/// Texture loading errors
#[derive(Error, Debug)]
pub enum TextureError {
    /// The image could not be read or decoded
    #[error("Texture decode failed: {0}")]
    Decode(#[from] AssetError),

    /// The device refused to create the texture object
    #[error("Texture creation failed: {0}")]
    Device(#[from] DeviceError),

    /// Every cubemap face failed to load
    #[error("No cubemap face could be loaded")]
    EmptyCubemap,
}

/// What a texture is used for; decides layout, orientation and sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureClass {
    /// Material albedo
    Diffuse,
    /// Material roughness
    Shininess,
    /// Material normal map
    Normal,
    /// Terrain displacement
    Heightmap,
    /// One face of the skybox
    Cubemap,
    /// Alpha-blended billboard
    Sprite,
}

impl TextureClass {
    /// Wrap, filter and mipmap state applied after upload
    pub fn sampling(self) -> SamplingPolicy {
        match self {
            Self::Diffuse | Self::Shininess | Self::Normal => SamplingPolicy {
                wrap: WrapMode::Repeat,
                min_filter: FilterMode::LinearMipmapLinear,
                mag_filter: FilterMode::Linear,
                generate_mipmaps: true,
            },
            Self::Heightmap => SamplingPolicy {
                wrap: WrapMode::ClampToEdge,
                min_filter: FilterMode::NearestMipmapLinear,
                mag_filter: FilterMode::Linear,
                generate_mipmaps: true,
            },
            Self::Cubemap | Self::Sprite => SamplingPolicy {
                wrap: WrapMode::ClampToEdge,
                min_filter: FilterMode::Linear,
                mag_filter: FilterMode::Linear,
                generate_mipmaps: false,
            },
        }
    }

    /// Decoded channel layout
    pub fn layout(self) -> PixelLayout {
        match self {
            Self::Sprite => PixelLayout::Rgba,
            _ => PixelLayout::Rgb,
        }
    }

    /// Whether rows are flipped so the bottom row is uploaded first.
    ///
    /// Cubemap faces keep top-down order, which is what the cube map
    /// face orientation expects.
    pub fn flip_vertically(self) -> bool {
        !matches!(self, Self::Cubemap)
    }

    /// Target a texture of this class is created on
    pub fn target(self) -> TextureTarget {
        match self {
            Self::Cubemap => TextureTarget::CubeMap,
            _ => TextureTarget::Texture2D,
        }
    }
}

fn pixel_format(layout: PixelLayout) -> PixelFormat {
    match layout {
        PixelLayout::Rgb => PixelFormat::Rgb8,
        PixelLayout::Rgba => PixelFormat::Rgba8,
    }
}

/// Decode-and-upload front end over a [`GraphicsDevice`]
pub struct TextureLoader<'a> {
    device: &'a mut dyn GraphicsDevice,
}

impl<'a> TextureLoader<'a> {
    /// Loader uploading through `device`
    pub fn new(device: &'a mut dyn GraphicsDevice) -> Self {
        Self { device }
    }

    /// Load a 2D texture, logging and returning `None` on failure
    pub fn load(&mut self, path: &Path, class: TextureClass) -> Option<TextureHandle> {
        match self.try_load(path, class) {
            Ok(handle) => {
                log::debug!("Loaded {:?} texture {:?}", class, path);
                Some(handle)
            }
            Err(e) => {
                log::warn!("Skipping texture {:?}: {}", path, e);
                None
            }
        }
    }

    /// Load a 2D texture
    ///
    /// The image is decoded before any GPU object exists, so a decode
    /// failure leaves nothing behind. The pixel buffer is dropped as soon as
    /// the upload returns.
    pub fn try_load(&mut self, path: &Path, class: TextureClass) -> Result<TextureHandle, TextureError> {
        let image = ImageData::from_file(path, class.layout(), class.flip_vertically())?;
        let texture = self.device.create_texture(TextureTarget::Texture2D)?;
        self.device.upload_texture_2d(
            texture,
            image.width,
            image.height,
            pixel_format(image.layout),
            &image.data,
        );
        drop(image);
        self.device.apply_sampling(texture, TextureTarget::Texture2D, &class.sampling());
        Ok(texture)
    }

    /// Load the six skybox faces (+X, -X, +Y, -Y, +Z, -Z) into one cubemap.
    ///
    /// A face that fails to decode is logged and skipped; the others still
    /// upload. Returns `None` only when no face loaded at all.
    pub fn load_cubemap(&mut self, faces: &[PathBuf; 6]) -> Option<TextureHandle> {
        match self.try_load_cubemap(faces) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Skybox unavailable: {}", e);
                None
            }
        }
    }

    fn try_load_cubemap(&mut self, faces: &[PathBuf; 6]) -> Result<TextureHandle, TextureError> {
        let class = TextureClass::Cubemap;
        let texture = self.device.create_texture(class.target())?;

        let mut loaded = 0;
        for (face, path) in CubeFace::ALL.into_iter().zip(faces) {
            match ImageData::from_file(path, class.layout(), class.flip_vertically()) {
                Ok(image) => {
                    self.device.upload_cube_face(
                        texture,
                        face,
                        image.width,
                        image.height,
                        pixel_format(image.layout),
                        &image.data,
                    );
                    loaded += 1;
                    log::debug!("Loaded skybox face {:?} from {:?}", face, path);
                }
                Err(e) => log::warn!("Skipping skybox face {:?}: {}", face, e),
            }
        }

        if loaded == 0 {
            self.device.delete_texture(texture);
            return Err(TextureError::EmptyCubemap);
        }

        self.device.apply_sampling(texture, class.target(), &class.sampling());
        Ok(texture)
    }
}

/// Every texture the viewer samples, keyed by slot
#[derive(Debug, Default)]
pub struct TextureSet {
    textures: BTreeMap<TextureSlot, TextureHandle>,
}

/// Where a slot's pixels come from in [`TextureConfig`]
enum TextureSource<'a> {
    File(&'a Path),
    Faces(&'a [PathBuf; 6]),
}

fn source(config: &TextureConfig, slot: TextureSlot) -> TextureSource<'_> {
    let file = match slot {
        TextureSlot::RockDiffuse => &config.rock.diffuse,
        TextureSlot::RockShininess => &config.rock.shininess,
        TextureSlot::RockNormal => &config.rock.normal,
        TextureSlot::SnowDiffuse => &config.snow.diffuse,
        TextureSlot::SnowShininess => &config.snow.shininess,
        TextureSlot::SnowNormal => &config.snow.normal,
        TextureSlot::GrassDiffuse => &config.grass.diffuse,
        TextureSlot::GrassShininess => &config.grass.shininess,
        TextureSlot::GrassNormal => &config.grass.normal,
        TextureSlot::Heightmap => &config.heightmap,
        TextureSlot::Sprite => &config.sprite,
        TextureSlot::Skybox => return TextureSource::Faces(&config.skybox_faces),
    };
    TextureSource::File(file)
}

impl TextureSet {
    /// Load one texture per entry of `bindings`, with the entry's target and
    /// class, from the files `config` names for that slot.
    ///
    /// Slots absent from `bindings` are not loaded. Missing or corrupt files
    /// leave their slot empty.
    pub fn load(device: &mut dyn GraphicsDevice, config: &TextureConfig, bindings: &TextureBindings) -> Self {
        let mut loader = TextureLoader::new(device);
        let mut set = Self::default();

        for (slot, binding) in bindings.iter() {
            let texture = match (binding.target, source(config, slot)) {
                (TextureTarget::Texture2D, TextureSource::File(path)) => loader.load(path, binding.class),
                (TextureTarget::CubeMap, TextureSource::Faces(faces)) => loader.load_cubemap(faces),
                (target, _) => {
                    log::warn!("Skipping {:?}: its files cannot be loaded as {:?}", slot, target);
                    None
                }
            };
            set.insert(slot, texture);
        }

        log::info!("Loaded {} of {} textures", set.len(), bindings.len());
        set
    }

    fn insert(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) {
        if let Some(texture) = texture {
            self.textures.insert(slot, texture);
        }
    }

    /// Texture in `slot`, if it loaded
    pub fn get(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.textures.get(&slot).copied()
    }

    /// Number of loaded textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// True when nothing loaded
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Delete every loaded texture
    pub fn destroy(self, device: &mut dyn GraphicsDevice) {
        for texture in self.textures.into_values() {
            device.delete_texture(texture);
        }
    }
}
