//! Image resource descriptors and their flags

use crate::types::{ScalarType, image_formats::ChannelLayout};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single resource flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFlag {
    /// Keep a second image holding the previous frame
    StorePrev,
    /// Do not declare a sampler for this image
    NoSampler,
    /// Image is also used as a render-pass attachment
    IsAttachment,
    ForceSizeBloom,
    #[serde(rename = "force_size_1_3")]
    ForceSize1_3,
    BilinearSampler,
    UpscaledSize,
    SinglePixelSize,
    UsageTransfer,
}

impl ResourceFlag {
    /// Every flag, in bit order
    pub const ALL: [ResourceFlag; 9] = [
        Self::StorePrev,
        Self::NoSampler,
        Self::IsAttachment,
        Self::ForceSizeBloom,
        Self::ForceSize1_3,
        Self::BilinearSampler,
        Self::UpscaledSize,
        Self::SinglePixelSize,
        Self::UsageTransfer,
    ];

    pub fn bit(self) -> u32 {
        match self {
            Self::StorePrev => 1 << 0,
            Self::NoSampler => 1 << 1,
            Self::IsAttachment => 1 << 2,
            Self::ForceSizeBloom => 1 << 3,
            Self::ForceSize1_3 => 1 << 4,
            Self::BilinearSampler => 1 << 9,
            Self::UpscaledSize => 1 << 10,
            Self::SinglePixelSize => 1 << 11,
            Self::UsageTransfer => 1 << 12,
        }
    }

    /// Public flags are exposed to the host; the rest only steer generation
    pub fn is_public(self) -> bool {
        !matches!(self, Self::StorePrev | Self::NoSampler)
    }

    /// Name used inside the host flag enumeration
    pub fn enum_name(self) -> &'static str {
        match self {
            Self::StorePrev => "FRAMEBUF_FLAGS_STORE_PREV",
            Self::NoSampler => "FRAMEBUF_FLAGS_NO_SAMPLER",
            Self::IsAttachment => "FRAMEBUF_FLAGS_IS_ATTACHMENT",
            Self::ForceSizeBloom => "FRAMEBUF_FLAGS_FORCE_SIZE_BLOOM",
            Self::ForceSize1_3 => "FRAMEBUF_FLAGS_FORCE_SIZE_1_3",
            Self::BilinearSampler => "FRAMEBUF_FLAGS_BILINEAR_SAMPLER",
            Self::UpscaledSize => "FRAMEBUF_FLAGS_UPSCALED_SIZE",
            Self::SinglePixelSize => "FRAMEBUF_FLAGS_SINGLE_PIXEL_SIZE",
            Self::UsageTransfer => "FRAMEBUF_FLAGS_USAGE_TRANSFER",
        }
    }
}

/// A set of [`ResourceFlag`]s, written in manifests as a list of flag names
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "Vec<ResourceFlag>", into = "Vec<ResourceFlag>")]
pub struct ResourceFlags(u32);

impl ResourceFlags {
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, flag: ResourceFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn with(self, flag: ResourceFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    /// The subset of flags visible to the host
    pub fn public(self) -> Self {
        ResourceFlag::ALL.into_iter().filter(|flag| flag.is_public() && self.contains(*flag)).collect()
    }

    pub fn iter(self) -> impl Iterator<Item = ResourceFlag> {
        ResourceFlag::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<ResourceFlag> for ResourceFlags {
    fn from_iter<I: IntoIterator<Item = ResourceFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::with)
    }
}

impl From<Vec<ResourceFlag>> for ResourceFlags {
    fn from(value: Vec<ResourceFlag>) -> Self {
        value.into_iter().collect()
    }
}

impl From<ResourceFlags> for Vec<ResourceFlag> {
    fn from(value: ResourceFlags) -> Self {
        value.iter().collect()
    }
}

impl fmt::Display for ResourceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A shader-visible 2D image resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageResourceDescriptor {
    /// Resource name in PascalCase
    pub name: String,
    /// Pixel base type
    #[serde(rename = "type")]
    pub pixel_type: ScalarType,
    pub channels: ChannelLayout,
    #[serde(default)]
    pub flags: ResourceFlags,
}

impl ImageResourceDescriptor {
    pub fn new(name: &str, pixel_type: ScalarType, channels: ChannelLayout, flags: &[ResourceFlag]) -> Self {
        Self {
            name: name.to_string(),
            pixel_type,
            channels,
            flags: flags.iter().copied().collect(),
        }
    }

    /// Returns true if a previous-frame copy is allocated next to the image
    pub fn has_history(&self) -> bool {
        self.flags.contains(ResourceFlag::StorePrev)
    }

    pub fn has_sampler(&self) -> bool {
        !self.flags.contains(ResourceFlag::NoSampler)
    }

    pub fn is_attachment(&self) -> bool {
        self.flags.contains(ResourceFlag::IsAttachment)
    }

    /// Number of image instances this descriptor expands to
    pub fn instance_count(&self) -> usize {
        if self.has_history() { 2 } else { 1 }
    }
}
