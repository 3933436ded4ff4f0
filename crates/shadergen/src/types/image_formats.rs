//! Image format registry
//!
//! Maps a pixel base type and channel layout to the Vulkan format used on the host
//! and the GLSL image-format qualifier used in shaders. Every combination must be
//! listed explicitly in both vocabularies.

use super::ScalarType;
use crate::error::UnknownType;
use serde::{Deserialize, Serialize};

/// Channel layout of an image resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    R,
    Rg,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn label(self) -> &'static str {
        match self {
            Self::R => "R",
            Self::Rg => "RG",
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
        }
    }
}

/// Returns the `VkFormat` identifier for a pixel type and channel layout
pub fn host_image_format(pixel: ScalarType, channels: ChannelLayout) -> Result<&'static str, UnknownType> {
    use ChannelLayout::*;
    use ScalarType::*;

    let format = match (pixel, channels) {
        (Unorm8, R) => "VK_FORMAT_R8_UNORM",
        (Unorm8, Rg) => "VK_FORMAT_R8G8_UNORM",
        (Unorm8, Rgba) => "VK_FORMAT_R8G8B8A8_UNORM",

        (Uint8, R) => "VK_FORMAT_R8_UINT",
        (Uint8, Rg) => "VK_FORMAT_R8G8_UINT",
        (Uint8, Rgba) => "VK_FORMAT_R8G8B8A8_UINT",

        (Uint16, R) => "VK_FORMAT_R16_UINT",
        (Uint16, Rg) => "VK_FORMAT_R16G16_UINT",
        (Uint16, Rgba) => "VK_FORMAT_R16G16B16A16_UINT",

        (Uint32, R) => "VK_FORMAT_R32_UINT",
        (Uint32, Rg) => "VK_FORMAT_R32G32_UINT",
        (Uint32, Rgba) => "VK_FORMAT_R32G32B32A32_UINT",

        (Float16, R) => "VK_FORMAT_R16_SFLOAT",
        (Float16, Rg) => "VK_FORMAT_R16G16_SFLOAT",
        (Float16, Rgba) => "VK_FORMAT_R16G16B16A16_SFLOAT",

        (Float32, R) => "VK_FORMAT_R32_SFLOAT",
        (Float32, Rg) => "VK_FORMAT_R32G32_SFLOAT",
        (Float32, Rgba) => "VK_FORMAT_R32G32B32A32_SFLOAT",

        (Pack11, Rgb) => "VK_FORMAT_B10G11R11_UFLOAT_PACK32",
        // Storage images in E5B9G9R9 are not widely supported, so the shared
        // exponent is packed by hand into a single 32-bit channel.
        (PackE5, Rgb) => "VK_FORMAT_R32_UINT",

        _ => {
            return Err(UnknownType::ImageFormat {
                target: "host",
                pixel,
                channels: channels.label(),
            });
        }
    };
    Ok(format)
}

/// Returns the GLSL image-format layout qualifier for a pixel type and channel layout
pub fn shader_image_format(pixel: ScalarType, channels: ChannelLayout) -> Result<&'static str, UnknownType> {
    use ChannelLayout::*;
    use ScalarType::*;

    let format = match (pixel, channels) {
        (Unorm8, R) => "r8",
        (Unorm8, Rg) => "rg8",
        (Unorm8, Rgba) => "rgba8",

        (Uint8, R) => "r8ui",
        (Uint8, Rg) => "rg8ui",
        (Uint8, Rgba) => "rgba8ui",

        (Uint16, R) => "r16ui",
        (Uint16, Rg) => "rg16ui",
        (Uint16, Rgba) => "rgba16ui",

        (Uint32, R) => "r32ui",
        (Uint32, Rg) => "rg32ui",
        (Uint32, Rgba) => "rgba32ui",

        (Float16, R) => "r16f",
        (Float16, Rg) => "rg16f",
        (Float16, Rgba) => "rgba16f",

        (Float32, R) => "r32f",
        (Float32, Rg) => "rg32f",
        (Float32, Rgba) => "rgba32f",

        (Pack11, Rgb) => "r11f_g11f_b10f",
        (PackE5, Rgb) => "r32ui",

        _ => {
            return Err(UnknownType::ImageFormat {
                target: "shader",
                pixel,
                channels: channels.label(),
            });
        }
    };
    Ok(format)
}

/// GLSL storage image type for a pixel type
pub fn shader_image_type(pixel: ScalarType) -> &'static str {
    match pixel {
        ScalarType::Float32 | ScalarType::Unorm8 | ScalarType::Float16 | ScalarType::Pack11 => "image2D",
        ScalarType::Int32 => "iimage2D",
        ScalarType::Uint32 | ScalarType::Uint8 | ScalarType::Uint16 | ScalarType::PackE5 => "uimage2D",
    }
}

/// GLSL combined sampler type for a pixel type
pub fn shader_sampler_type(pixel: ScalarType) -> &'static str {
    match pixel {
        ScalarType::Float32 | ScalarType::Unorm8 | ScalarType::Float16 | ScalarType::Pack11 => "sampler2D",
        ScalarType::Int32 => "isampler2D",
        ScalarType::Uint32 | ScalarType::Uint8 | ScalarType::Uint16 | ScalarType::PackE5 => "usampler2D",
    }
}
