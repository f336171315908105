// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Texel formats understood by the copy and blit paths.
//!
//! A format describes the texel data of a resource: how many bytes a texel block occupies, which
//! color components or depth/stencil aspects it stores, and how the stored values are
//! interpreted. The values of [`Format`] are the raw `VkFormat` values, so a format converts
//! losslessly into [`ash::vk::Format`].
//!
//! # sRGB formats
//!
//! Formats with the [`NumericType::SRGB`] numeric type store color components with a nonlinear
//! encoding. Blits through the 3D pipeline operate on raw channel values, so views created for a
//! blit use the [linear](Format::linear) variant of the format unless the caller explicitly asks
//! for something else.
//!
//! # Block-compressed formats
//!
//! Compressed formats encode a block of texels as a whole, so copies move whole blocks. The block
//! dimensions are returned by [`Format::block_extent`], and [`Format::block_size`] is the size in
//! bytes of one such block.

use crate::{
    blit::{BlitMask, ColorComponents},
    macros::vulkan_enum,
    DeviceSize,
};

vulkan_enum! {
    /// A texel format.
    #[allow(non_camel_case_types)]
    Format = Format(i32);

    R8_UNORM = R8_UNORM,
    R8_SNORM = R8_SNORM,
    R8_UINT = R8_UINT,
    R8_SINT = R8_SINT,
    R8_SRGB = R8_SRGB,
    R8G8_UNORM = R8G8_UNORM,
    R8G8_UINT = R8G8_UINT,
    R8G8_SRGB = R8G8_SRGB,
    R8G8B8A8_UNORM = R8G8B8A8_UNORM,
    R8G8B8A8_SNORM = R8G8B8A8_SNORM,
    R8G8B8A8_UINT = R8G8B8A8_UINT,
    R8G8B8A8_SINT = R8G8B8A8_SINT,
    R8G8B8A8_SRGB = R8G8B8A8_SRGB,
    B8G8R8A8_UNORM = B8G8R8A8_UNORM,
    B8G8R8A8_SRGB = B8G8R8A8_SRGB,
    A8B8G8R8_UNORM_PACK32 = A8B8G8R8_UNORM_PACK32,
    A8B8G8R8_SRGB_PACK32 = A8B8G8R8_SRGB_PACK32,
    R5G6B5_UNORM_PACK16 = R5G6B5_UNORM_PACK16,
    A2B10G10R10_UNORM_PACK32 = A2B10G10R10_UNORM_PACK32,
    R16_UNORM = R16_UNORM,
    R16_UINT = R16_UINT,
    R16_SFLOAT = R16_SFLOAT,
    R16G16_SFLOAT = R16G16_SFLOAT,
    R16G16B16A16_UNORM = R16G16B16A16_UNORM,
    R16G16B16A16_SFLOAT = R16G16B16A16_SFLOAT,
    R32_UINT = R32_UINT,
    R32_SFLOAT = R32_SFLOAT,
    R32G32_SFLOAT = R32G32_SFLOAT,
    R32G32B32A32_UINT = R32G32B32A32_UINT,
    R32G32B32A32_SFLOAT = R32G32B32A32_SFLOAT,
    B10G11R11_UFLOAT_PACK32 = B10G11R11_UFLOAT_PACK32,
    E5B9G9R9_UFLOAT_PACK32 = E5B9G9R9_UFLOAT_PACK32,
    D16_UNORM = D16_UNORM,
    X8_D24_UNORM_PACK32 = X8_D24_UNORM_PACK32,
    D32_SFLOAT = D32_SFLOAT,
    S8_UINT = S8_UINT,
    D24_UNORM_S8_UINT = D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT = D32_SFLOAT_S8_UINT,
    BC1_RGBA_UNORM_BLOCK = BC1_RGBA_UNORM_BLOCK,
    BC1_RGBA_SRGB_BLOCK = BC1_RGBA_SRGB_BLOCK,
    BC3_UNORM_BLOCK = BC3_UNORM_BLOCK,
    BC3_SRGB_BLOCK = BC3_SRGB_BLOCK,
    BC4_UNORM_BLOCK = BC4_UNORM_BLOCK,
    BC5_UNORM_BLOCK = BC5_UNORM_BLOCK,
    BC7_UNORM_BLOCK = BC7_UNORM_BLOCK,
    BC7_SRGB_BLOCK = BC7_SRGB_BLOCK,
    ETC2_R8G8B8A8_UNORM_BLOCK = ETC2_R8G8B8A8_UNORM_BLOCK,
    ETC2_R8G8B8A8_SRGB_BLOCK = ETC2_R8G8B8A8_SRGB_BLOCK,
    ASTC_4x4_UNORM_BLOCK = ASTC_4X4_UNORM_BLOCK,
    ASTC_4x4_SRGB_BLOCK = ASTC_4X4_SRGB_BLOCK,
}

/// The block compression scheme used in a format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum CompressionType {
    /// Adaptive Scalable Texture Compression, low dynamic range.
    ASTC_LDR,
    /// S3TC Block Compression.
    BC,
    /// Ericsson Texture Compression 2.
    ETC2,
}

/// The numeric type that represents data of a format in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum NumericType {
    /// Signed floating-point number.
    SFLOAT,
    /// Unsigned floating-point number.
    UFLOAT,
    /// Signed integer.
    SINT,
    /// Unsigned integer.
    UINT,
    /// Signed integer that represents a normalized floating-point value in the range \[-1,1].
    SNORM,
    /// Unsigned integer that represents a normalized floating-point value in the range \[0,1].
    UNORM,
    /// Unsigned integer where R, G, B components represent a normalized floating-point value in the
    /// sRGB color space, while the A component is a simple normalized value as in `UNORM`.
    SRGB,
}

struct FormatInfo {
    block_size: u8,
    components: [u8; 4],
    depth: u8,
    stencil: u8,
    type_color: Option<NumericType>,
    compression: Option<CompressionType>,
}

const fn color(block_size: u8, components: [u8; 4], numeric_type: NumericType) -> FormatInfo {
    FormatInfo {
        block_size,
        components,
        depth: 0,
        stencil: 0,
        type_color: Some(numeric_type),
        compression: None,
    }
}

const fn depth_stencil(block_size: u8, depth: u8, stencil: u8) -> FormatInfo {
    FormatInfo {
        block_size,
        components: [0; 4],
        depth,
        stencil,
        type_color: None,
        compression: None,
    }
}

// Compressed formats only report whether a component is present.
const fn compressed(
    block_size: u8,
    components: [u8; 4],
    numeric_type: NumericType,
    compression: CompressionType,
) -> FormatInfo {
    FormatInfo {
        block_size,
        components,
        depth: 0,
        stencil: 0,
        type_color: Some(numeric_type),
        compression: Some(compression),
    }
}

impl Format {
    fn info(self) -> FormatInfo {
        use CompressionType::*;
        use NumericType::*;

        match self {
            Format::R8_UNORM => color(1, [8, 0, 0, 0], UNORM),
            Format::R8_SNORM => color(1, [8, 0, 0, 0], SNORM),
            Format::R8_UINT => color(1, [8, 0, 0, 0], UINT),
            Format::R8_SINT => color(1, [8, 0, 0, 0], SINT),
            Format::R8_SRGB => color(1, [8, 0, 0, 0], SRGB),
            Format::R8G8_UNORM => color(2, [8, 8, 0, 0], UNORM),
            Format::R8G8_UINT => color(2, [8, 8, 0, 0], UINT),
            Format::R8G8_SRGB => color(2, [8, 8, 0, 0], SRGB),
            Format::R8G8B8A8_UNORM => color(4, [8, 8, 8, 8], UNORM),
            Format::R8G8B8A8_SNORM => color(4, [8, 8, 8, 8], SNORM),
            Format::R8G8B8A8_UINT => color(4, [8, 8, 8, 8], UINT),
            Format::R8G8B8A8_SINT => color(4, [8, 8, 8, 8], SINT),
            Format::R8G8B8A8_SRGB => color(4, [8, 8, 8, 8], SRGB),
            Format::B8G8R8A8_UNORM => color(4, [8, 8, 8, 8], UNORM),
            Format::B8G8R8A8_SRGB => color(4, [8, 8, 8, 8], SRGB),
            Format::A8B8G8R8_UNORM_PACK32 => color(4, [8, 8, 8, 8], UNORM),
            Format::A8B8G8R8_SRGB_PACK32 => color(4, [8, 8, 8, 8], SRGB),
            Format::R5G6B5_UNORM_PACK16 => color(2, [5, 6, 5, 0], UNORM),
            Format::A2B10G10R10_UNORM_PACK32 => color(4, [10, 10, 10, 2], UNORM),
            Format::R16_UNORM => color(2, [16, 0, 0, 0], UNORM),
            Format::R16_UINT => color(2, [16, 0, 0, 0], UINT),
            Format::R16_SFLOAT => color(2, [16, 0, 0, 0], SFLOAT),
            Format::R16G16_SFLOAT => color(4, [16, 16, 0, 0], SFLOAT),
            Format::R16G16B16A16_UNORM => color(8, [16, 16, 16, 16], UNORM),
            Format::R16G16B16A16_SFLOAT => color(8, [16, 16, 16, 16], SFLOAT),
            Format::R32_UINT => color(4, [32, 0, 0, 0], UINT),
            Format::R32_SFLOAT => color(4, [32, 0, 0, 0], SFLOAT),
            Format::R32G32_SFLOAT => color(8, [32, 32, 0, 0], SFLOAT),
            Format::R32G32B32A32_UINT => color(16, [32, 32, 32, 32], UINT),
            Format::R32G32B32A32_SFLOAT => color(16, [32, 32, 32, 32], SFLOAT),
            Format::B10G11R11_UFLOAT_PACK32 => color(4, [11, 11, 10, 0], UFLOAT),
            Format::E5B9G9R9_UFLOAT_PACK32 => color(4, [9, 9, 9, 0], UFLOAT),
            Format::D16_UNORM => depth_stencil(2, 16, 0),
            Format::X8_D24_UNORM_PACK32 => depth_stencil(4, 24, 0),
            Format::D32_SFLOAT => depth_stencil(4, 32, 0),
            Format::S8_UINT => depth_stencil(1, 0, 8),
            Format::D24_UNORM_S8_UINT => depth_stencil(4, 24, 8),
            Format::D32_SFLOAT_S8_UINT => depth_stencil(8, 32, 8),
            Format::BC1_RGBA_UNORM_BLOCK => compressed(8, [1, 1, 1, 1], UNORM, BC),
            Format::BC1_RGBA_SRGB_BLOCK => compressed(8, [1, 1, 1, 1], SRGB, BC),
            Format::BC3_UNORM_BLOCK => compressed(16, [1, 1, 1, 1], UNORM, BC),
            Format::BC3_SRGB_BLOCK => compressed(16, [1, 1, 1, 1], SRGB, BC),
            Format::BC4_UNORM_BLOCK => compressed(8, [1, 0, 0, 0], UNORM, BC),
            Format::BC5_UNORM_BLOCK => compressed(16, [1, 1, 0, 0], UNORM, BC),
            Format::BC7_UNORM_BLOCK => compressed(16, [1, 1, 1, 1], UNORM, BC),
            Format::BC7_SRGB_BLOCK => compressed(16, [1, 1, 1, 1], SRGB, BC),
            Format::ETC2_R8G8B8A8_UNORM_BLOCK => compressed(16, [1, 1, 1, 1], UNORM, ETC2),
            Format::ETC2_R8G8B8A8_SRGB_BLOCK => compressed(16, [1, 1, 1, 1], SRGB, ETC2),
            Format::ASTC_4x4_UNORM_BLOCK => compressed(16, [1, 1, 1, 1], UNORM, ASTC_LDR),
            Format::ASTC_4x4_SRGB_BLOCK => compressed(16, [1, 1, 1, 1], SRGB, ASTC_LDR),
        }
    }

    /// Returns the size in bytes of one texel block of the format.
    #[inline]
    pub fn block_size(self) -> DeviceSize {
        self.info().block_size as DeviceSize
    }

    /// Returns the dimensions in texels of one texel block. This is `[1, 1, 1]` for every
    /// uncompressed format.
    #[inline]
    pub fn block_extent(self) -> [u32; 3] {
        match self.compression() {
            Some(_) => [4, 4, 1],
            None => [1, 1, 1],
        }
    }

    /// Returns the number of bits per texel of the R, G, B and A components. For compressed
    /// formats, the value is 1 if the component is present and 0 otherwise.
    #[inline]
    pub fn components(self) -> [u8; 4] {
        self.info().components
    }

    /// Returns the numeric type of the color components, or `None` if the format has no color
    /// aspect.
    #[inline]
    pub fn type_color(self) -> Option<NumericType> {
        self.info().type_color
    }

    /// Returns the block compression scheme, if any.
    #[inline]
    pub fn compression(self) -> Option<CompressionType> {
        self.info().compression
    }

    #[inline]
    pub fn has_depth(self) -> bool {
        self.info().depth != 0
    }

    #[inline]
    pub fn has_stencil(self) -> bool {
        self.info().stencil != 0
    }

    /// Returns whether the color components use the sRGB nonlinear encoding.
    #[inline]
    pub fn is_srgb(self) -> bool {
        self.type_color() == Some(NumericType::SRGB)
    }

    /// Returns the format with any sRGB encoding removed. Formats that are not sRGB are returned
    /// unchanged.
    pub fn linear(self) -> Format {
        match self {
            Format::R8_SRGB => Format::R8_UNORM,
            Format::R8G8_SRGB => Format::R8G8_UNORM,
            Format::R8G8B8A8_SRGB => Format::R8G8B8A8_UNORM,
            Format::B8G8R8A8_SRGB => Format::B8G8R8A8_UNORM,
            Format::A8B8G8R8_SRGB_PACK32 => Format::A8B8G8R8_UNORM_PACK32,
            Format::BC1_RGBA_SRGB_BLOCK => Format::BC1_RGBA_UNORM_BLOCK,
            Format::BC3_SRGB_BLOCK => Format::BC3_UNORM_BLOCK,
            Format::BC7_SRGB_BLOCK => Format::BC7_UNORM_BLOCK,
            Format::ETC2_R8G8B8A8_SRGB_BLOCK => Format::ETC2_R8G8B8A8_UNORM_BLOCK,
            Format::ASTC_4x4_SRGB_BLOCK => Format::ASTC_4x4_UNORM_BLOCK,
            other => other,
        }
    }

    /// Returns the sRGB variant of the format, or `None` if there is none.
    pub fn srgb(self) -> Option<Format> {
        Some(match self {
            Format::R8_UNORM => Format::R8_SRGB,
            Format::R8G8_UNORM => Format::R8G8_SRGB,
            Format::R8G8B8A8_UNORM => Format::R8G8B8A8_SRGB,
            Format::B8G8R8A8_UNORM => Format::B8G8R8A8_SRGB,
            Format::A8B8G8R8_UNORM_PACK32 => Format::A8B8G8R8_SRGB_PACK32,
            Format::BC1_RGBA_UNORM_BLOCK => Format::BC1_RGBA_SRGB_BLOCK,
            Format::BC3_UNORM_BLOCK => Format::BC3_SRGB_BLOCK,
            Format::BC7_UNORM_BLOCK => Format::BC7_SRGB_BLOCK,
            Format::ETC2_R8G8B8A8_UNORM_BLOCK => Format::ETC2_R8G8B8A8_SRGB_BLOCK,
            Format::ASTC_4x4_UNORM_BLOCK => Format::ASTC_4x4_SRGB_BLOCK,
            other if other.is_srgb() => other,
            _ => return None,
        })
    }

    /// Returns a mask covering every channel stored by the format.
    pub fn blit_mask(self) -> BlitMask {
        let [r, g, b, a] = self.components();
        let mut color = ColorComponents::empty();

        for (bits, component) in [
            (r, ColorComponents::R),
            (g, ColorComponents::G),
            (b, ColorComponents::B),
            (a, ColorComponents::A),
        ] {
            if bits != 0 {
                color |= component;
            }
        }

        BlitMask {
            color,
            depth: self.has_depth(),
            stencil: self.has_stencil(),
        }
    }

    /// Returns whether texels of `self` and `other` have the same size and block dimensions, so
    /// that raw copies between them are meaningful.
    #[inline]
    pub fn is_copy_compatible(self, other: Format) -> bool {
        self.block_size() == other.block_size() && self.block_extent() == other.block_extent()
    }
}

#[cfg(test)]
mod tests {
    use super::{Format, NumericType};
    use crate::blit::ColorComponents;

    #[test]
    fn linear_strips_srgb() {
        assert_eq!(Format::R8G8B8A8_SRGB.linear(), Format::R8G8B8A8_UNORM);
        assert_eq!(Format::B8G8R8A8_SRGB.linear(), Format::B8G8R8A8_UNORM);
        assert_eq!(Format::BC7_SRGB_BLOCK.linear(), Format::BC7_UNORM_BLOCK);
        assert_eq!(Format::R32_SFLOAT.linear(), Format::R32_SFLOAT);
        assert_eq!(Format::D24_UNORM_S8_UINT.linear(), Format::D24_UNORM_S8_UINT);

        for format in [Format::R8_SRGB, Format::A8B8G8R8_SRGB_PACK32, Format::ASTC_4x4_SRGB_BLOCK] {
            assert!(format.is_srgb());
            assert!(!format.linear().is_srgb());
            assert_eq!(format.linear().srgb(), Some(format));
        }
    }

    #[test]
    fn srgb_of_non_color_format() {
        assert_eq!(Format::R32_UINT.srgb(), None);
        assert_eq!(Format::D16_UNORM.srgb(), None);
    }

    #[test]
    fn blit_mask_covers_present_channels() {
        let mask = Format::R8G8B8A8_UNORM.blit_mask();
        assert_eq!(mask.color, ColorComponents::all());
        assert!(!mask.depth && !mask.stencil);

        let mask = Format::R5G6B5_UNORM_PACK16.blit_mask();
        assert_eq!(
            mask.color,
            ColorComponents::R | ColorComponents::G | ColorComponents::B,
        );

        let mask = Format::BC5_UNORM_BLOCK.blit_mask();
        assert_eq!(mask.color, ColorComponents::R | ColorComponents::G);

        let mask = Format::D24_UNORM_S8_UINT.blit_mask();
        assert!(mask.color.is_empty());
        assert!(mask.depth && mask.stencil);

        let mask = Format::X8_D24_UNORM_PACK32.blit_mask();
        assert!(mask.depth && !mask.stencil);
    }

    #[test]
    fn block_layout() {
        assert_eq!(Format::R8G8B8A8_UNORM.block_size(), 4);
        assert_eq!(Format::R8G8B8A8_UNORM.block_extent(), [1, 1, 1]);
        assert_eq!(Format::BC1_RGBA_UNORM_BLOCK.block_size(), 8);
        assert_eq!(Format::BC1_RGBA_UNORM_BLOCK.block_extent(), [4, 4, 1]);
        assert_eq!(Format::R32G32B32A32_SFLOAT.block_size(), 16);

        assert!(Format::R8G8B8A8_UNORM.is_copy_compatible(Format::R32_UINT));
        assert!(!Format::R8G8B8A8_UNORM.is_copy_compatible(Format::R16_UINT));
        // Same size, different block dimensions.
        assert!(!Format::BC3_UNORM_BLOCK.is_copy_compatible(Format::R32G32B32A32_UINT));
    }

    #[test]
    fn ash_conversion() {
        assert_eq!(
            ash::vk::Format::from(Format::ASTC_4x4_SRGB_BLOCK),
            ash::vk::Format::ASTC_4X4_SRGB_BLOCK,
        );
        assert_eq!(
            Format::try_from(ash::vk::Format::R8_UINT),
            Ok(Format::R8_UINT),
        );
        assert_eq!(Format::try_from(ash::vk::Format::UNDEFINED), Err(()));
        assert_eq!(Format::R16_SFLOAT.type_color(), Some(NumericType::SFLOAT));
        assert_eq!(Format::S8_UINT.type_color(), None);
    }
}
