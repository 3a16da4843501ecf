//! Texture unit assignments
//!
//! A single table maps each semantic texture slot to the texture unit,
//! sampler uniform, binding target and texture class it uses.
//! [`TextureSet::load`](crate::render::texture::TextureSet::load) loads one
//! texture per entry with that target and class, and the frame renderer
//! binds each one on its unit under its sampler name.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::render::api::TextureTarget;
use crate::render::texture::TextureClass;

/// Semantic texture slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    /// Rock albedo
    RockDiffuse,
    /// Greyscale displacement source
    Heightmap,
    /// Rock roughness
    RockShininess,
    /// Rock normal map
    RockNormal,
    /// Snow albedo
    SnowDiffuse,
    /// Snow roughness
    SnowShininess,
    /// Snow normal map
    SnowNormal,
    /// Grass albedo
    GrassDiffuse,
    /// Grass roughness
    GrassShininess,
    /// Grass normal map
    GrassNormal,
    /// Skybox cubemap
    Skybox,
    /// Billboard sprite
    Sprite,
}

impl TextureSlot {
    /// Slots sampled by the terrain program
    pub const TERRAIN: [TextureSlot; 10] = [
        Self::RockDiffuse,
        Self::Heightmap,
        Self::RockShininess,
        Self::RockNormal,
        Self::SnowDiffuse,
        Self::SnowShininess,
        Self::SnowNormal,
        Self::GrassDiffuse,
        Self::GrassShininess,
        Self::GrassNormal,
    ];

    /// Binding target of the slot's texture
    pub fn target(self) -> TextureTarget {
        match self {
            Self::Skybox => TextureTarget::CubeMap,
            _ => TextureTarget::Texture2D,
        }
    }

    /// Texture class the slot is loaded as
    pub fn class(self) -> TextureClass {
        match self {
            Self::RockDiffuse | Self::SnowDiffuse | Self::GrassDiffuse => TextureClass::Diffuse,
            Self::RockShininess | Self::SnowShininess | Self::GrassShininess => TextureClass::Shininess,
            Self::RockNormal | Self::SnowNormal | Self::GrassNormal => TextureClass::Normal,
            Self::Heightmap => TextureClass::Heightmap,
            Self::Skybox => TextureClass::Cubemap,
            Self::Sprite => TextureClass::Sprite,
        }
    }
}

/// How one slot is loaded and bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Texture unit (`TEXTURE0 + unit`)
    pub unit: u32,
    /// Sampler uniform name in the program that reads the slot
    pub sampler: &'static str,
    /// Target the texture is created and bound on
    pub target: TextureTarget,
    /// Layout, orientation and sampling used when loading
    pub class: TextureClass,
}

impl Binding {
    /// Entry for `slot` with the slot's own target and class
    pub fn new(slot: TextureSlot, unit: u32, sampler: &'static str) -> Self {
        Self { unit, sampler, target: slot.target(), class: slot.class() }
    }
}

/// Binding table validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// Two terrain slots share a unit
    #[error("texture unit {unit} assigned to both {first:?} and {second:?}")]
    UnitConflict {
        /// Shared unit
        unit: u32,
        /// Slot seen first
        first: TextureSlot,
        /// Slot seen second
        second: TextureSlot,
    },

    /// A terrain slot has no entry
    #[error("no texture unit assigned to {0:?}")]
    Missing(TextureSlot),

    /// The entry's class is loaded on a different target than the entry names
    #[error("{slot:?} binds {class:?} on {target:?}")]
    TargetMismatch {
        /// Offending slot
        slot: TextureSlot,
        /// Class of the entry
        class: TextureClass,
        /// Target of the entry
        target: TextureTarget,
    },
}

/// Slot → binding table
#[derive(Debug, Clone)]
pub struct TextureBindings {
    table: BTreeMap<TextureSlot, Binding>,
}

impl TextureBindings {
    /// The viewer's unit layout.
    ///
    /// The terrain program samples units 0-9. Skybox and sprite each run in
    /// their own pass and sample unit 0.
    pub fn standard() -> Self {
        let entries = [
            (TextureSlot::RockDiffuse, 0, "rockDiffuse"),
            (TextureSlot::Heightmap, 1, "heightMap"),
            (TextureSlot::RockShininess, 2, "rockShininess"),
            (TextureSlot::RockNormal, 3, "rockNormal"),
            (TextureSlot::SnowDiffuse, 4, "snowDiffuse"),
            (TextureSlot::SnowShininess, 5, "snowShininess"),
            (TextureSlot::SnowNormal, 6, "snowNormal"),
            (TextureSlot::GrassDiffuse, 7, "grassDiffuse"),
            (TextureSlot::GrassShininess, 8, "grassShininess"),
            (TextureSlot::GrassNormal, 9, "grassNormal"),
            (TextureSlot::Skybox, 0, "skybox"),
            (TextureSlot::Sprite, 0, "sprite"),
        ];

        Self {
            table: entries
                .into_iter()
                .map(|(slot, unit, sampler)| (slot, Binding::new(slot, unit, sampler)))
                .collect(),
        }
    }

    /// Override one entry
    pub fn with(self, slot: TextureSlot, unit: u32, sampler: &'static str) -> Self {
        self.with_binding(slot, Binding::new(slot, unit, sampler))
    }

    /// Override one entry with a full binding
    pub fn with_binding(mut self, slot: TextureSlot, binding: Binding) -> Self {
        self.table.insert(slot, binding);
        self
    }

    /// Drop the entry for `slot`; its texture is then neither loaded nor bound
    pub fn without(mut self, slot: TextureSlot) -> Self {
        self.table.remove(&slot);
        self
    }

    /// Entry for `slot`
    pub fn get(&self, slot: TextureSlot) -> Option<&Binding> {
        self.table.get(&slot)
    }

    /// Entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &Binding)> {
        self.table.iter().map(|(&slot, binding)| (slot, binding))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when the table has no entries
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check that every terrain slot is present, no two share a unit and
    /// every entry's class matches its target
    pub fn validate(&self) -> Result<(), BindingError> {
        for (slot, binding) in self.iter() {
            if binding.class.target() != binding.target {
                return Err(BindingError::TargetMismatch { slot, class: binding.class, target: binding.target });
            }
        }

        let mut seen: HashMap<u32, TextureSlot> = HashMap::new();
        for slot in TextureSlot::TERRAIN {
            let binding = self.get(slot).ok_or(BindingError::Missing(slot))?;
            if let Some(&first) = seen.get(&binding.unit) {
                return Err(BindingError::UnitConflict { unit: binding.unit, first, second: slot });
            }
            seen.insert(binding.unit, slot);
        }
        Ok(())
    }
}

impl Default for TextureBindings {
    fn default() -> Self {
        Self::standard()
    }
}
