// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Blit requests and the collaborators that execute them.
//!
//! A blit copies a region of a source resource into a region of a destination resource,
//! converting between formats and scaling with a [`Filter`] if the regions have different sizes.
//! Blits are carried out by one of two collaborators:
//!
//! - A [`HardwareBlit`] engine, which is optional and may decline any request.
//! - A [`BlitEmulator`], which draws through the 3D pipeline and can always perform a generic
//!   blit. It can also perform a plain copy between resources it supports.

use crate::{
    copy::CopyRegionInfo,
    format::Format,
    macros::vulkan_bitflags,
    resource::{ImageBox, Resource},
    sampler::Filter,
    view::{SampledView, SampledViewCreateInfo, SurfaceView, SurfaceViewCreateInfo},
    ValidationError, NE,
};
use std::sync::Arc;

vulkan_bitflags! {
    /// Describes which color components are written by a blit.
    ColorComponents = ColorComponentFlags(u32);

    /// The red component.
    R = R,

    /// The green component.
    G = G,

    /// The blue component.
    B = B,

    /// The alpha component.
    A = A,
}

/// The channels a blit writes into its destination.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlitMask {
    /// The color components.
    pub color: ColorComponents,

    /// The depth aspect.
    pub depth: bool,

    /// The stencil aspect.
    pub stencil: bool,
}

impl BlitMask {
    /// Returns a mask with every channel set.
    #[inline]
    pub fn all() -> Self {
        BlitMask {
            color: ColorComponents::all(),
            depth: true,
            stencil: true,
        }
    }

    /// Returns whether no channel is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.color.is_empty() && !self.depth && !self.stencil
    }
}

/// A rectangle of the destination outside of which nothing is written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scissor {
    /// Coordinates of the top-left hand corner of the box.
    pub offset: [u32; 2],

    /// Dimensions of the box.
    pub extent: [u32; 2],
}

impl Scissor {
    /// Returns a scissor that, when used, will instruct the pipeline to draw to the entire
    /// framebuffer no matter its size.
    #[inline]
    pub fn irrelevant() -> Scissor {
        Scissor {
            offset: [0, 0],
            extent: [0x7fffffff, 0x7fffffff],
        }
    }
}

/// Parameters to blit a region of a resource into another.
#[derive(Clone, Debug)]
pub struct BlitInfo {
    /// The resource to read from.
    ///
    /// There is no default value.
    pub src_resource: Arc<Resource>,

    /// The mip level of `src_resource` to read from.
    ///
    /// The default value is `0`.
    pub src_level: u32,

    /// The region of `src_resource` to read from. The third axis selects array layers, or depth
    /// slices for 3D volumes.
    ///
    /// The default value is the whole of mip level 0.
    pub src_box: ImageBox,

    /// The format to read `src_resource` with. `None` selects the
    /// [default view format](crate::view::default_view_format).
    ///
    /// The default value is `None`.
    pub src_format: Option<Format>,

    /// The resource to write to.
    ///
    /// There is no default value.
    pub dst_resource: Arc<Resource>,

    /// The mip level of `dst_resource` to write to.
    ///
    /// The default value is `0`.
    pub dst_level: u32,

    /// The region of `dst_resource` to write to.
    ///
    /// The default value is the whole of mip level 0.
    pub dst_box: ImageBox,

    /// The format to write `dst_resource` with. `None` selects the
    /// [default view format](crate::view::default_view_format).
    ///
    /// The default value is `None`.
    pub dst_format: Option<Format>,

    /// The channels to write.
    ///
    /// The default value is the [mask of the format](Format::blit_mask) of `src_resource`.
    pub mask: BlitMask,

    /// The filter to use when the regions have different sizes.
    ///
    /// The default value is [`Filter::Nearest`].
    pub filter: Filter,

    /// If `Some`, nothing outside of this rectangle of the destination is written.
    ///
    /// The default value is `None`.
    pub scissor: Option<Scissor>,

    /// Whether the active render condition gates the blit.
    ///
    /// The default value is `false`.
    pub render_condition: bool,

    /// Whether the blit blends with the existing contents of the destination using the source
    /// alpha.
    ///
    /// The default value is `false`.
    pub alpha_blend: bool,

    pub _ne: crate::NonExhaustive,
}

impl BlitInfo {
    /// Returns a `BlitInfo` with the specified `src_resource` and `dst_resource`.
    pub fn new(src_resource: Arc<Resource>, dst_resource: Arc<Resource>) -> Self {
        let src_box = ImageBox::from_extent(level_box_extent(&src_resource, 0));
        let dst_box = ImageBox::from_extent(level_box_extent(&dst_resource, 0));
        let mask = src_resource.format().blit_mask();

        Self {
            src_resource,
            src_level: 0,
            src_box,
            src_format: None,
            dst_resource,
            dst_level: 0,
            dst_box,
            dst_format: None,
            mask,
            filter: Filter::Nearest,
            scissor: None,
            render_condition: false,
            alpha_blend: false,
            _ne: NE,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Box<ValidationError>> {
        let &Self {
            ref src_resource,
            src_level,
            ref src_box,
            src_format,
            ref dst_resource,
            dst_level,
            ref dst_box,
            dst_format,
            mask,
            filter: _,
            scissor,
            render_condition: _,
            alpha_blend: _,
            _ne: _,
        } = self;

        validate_region(src_resource, src_level, src_box)
            .map_err(|err| err.add_context("src"))?;
        validate_region(dst_resource, dst_level, dst_box)
            .map_err(|err| err.add_context("dst"))?;

        if dst_box.extent[2] < 0 {
            return Err(ValidationError::new(
                "dst_box.extent[2]",
                "is negative; the destination cannot be flipped along the third axis",
            ));
        }

        SampledViewCreateInfo::from_resource(src_resource, src_level, false, src_format)
            .validate(src_resource)
            .map_err(|err| err.add_context("src_view"))?;
        SurfaceViewCreateInfo::from_resource(
            dst_resource,
            dst_level,
            dst_box.offset[2] as u32,
            dst_format,
        )
        .validate(dst_resource)
        .map_err(|err| err.add_context("dst_view"))?;

        if mask.is_empty() {
            return Err(ValidationError::new("mask", "is empty"));
        }

        for resource in [src_resource, dst_resource] {
            if mask.depth && !resource.format().has_depth() {
                return Err(ValidationError::new(
                    "mask.depth",
                    "is set, but a resource format has no depth aspect",
                ));
            }

            if mask.stencil && !resource.format().has_stencil() {
                return Err(ValidationError::new(
                    "mask.stencil",
                    "is set, but a resource format has no stencil aspect",
                ));
            }
        }

        if let Some(scissor) = scissor {
            if scissor.offset[0].checked_add(scissor.extent[0]).is_none()
                || scissor.offset[1].checked_add(scissor.extent[1]).is_none()
            {
                return Err(ValidationError::new(
                    "scissor",
                    "`offset + extent` overflows a 32-bit coordinate",
                ));
            }
        }

        Ok(())
    }
}

/// Returns the extent of mip level `level` of `resource`, with the third axis counting the slices
/// of the level.
pub(crate) fn level_box_extent(resource: &Resource, level: u32) -> [u32; 3] {
    let [width, height, _] = resource.mip_level_extent(level).unwrap_or([0; 3]);

    [width, height, resource.layer_count(level)]
}

pub(crate) fn validate_region(
    resource: &Resource,
    level: u32,
    region: &ImageBox,
) -> Result<(), Box<ValidationError>> {
    if level >= resource.mip_levels() {
        return Err(ValidationError::new(
            "level",
            "is not less than the number of mip levels of the resource",
        ));
    }

    if region.extent.contains(&0) {
        return Err(ValidationError::new("box.extent", "has a zero dimension"));
    }

    if !region.fits_within(level_box_extent(resource, level)) {
        return Err(ValidationError::new(
            "box",
            "is not contained within the mip level",
        ));
    }

    Ok(())
}

/// A fixed-function engine that copies and blits without going through the 3D pipeline.
pub trait HardwareBlit {
    /// Performs the blit described by `info`, or returns `false` to decline it. Declining is not
    /// an error: the caller falls back to another strategy.
    fn try_blit(&mut self, info: &BlitInfo) -> bool;
}

impl<F> HardwareBlit for F
where
    F: FnMut(&BlitInfo) -> bool,
{
    #[inline]
    fn try_blit(&mut self, info: &BlitInfo) -> bool {
        self(info)
    }
}

/// The views and parameters of a generic blit, handed to [`BlitEmulator::blit_generic`].
#[derive(Clone, Copy, Debug)]
pub struct GenericBlitInfo<'a> {
    /// The view that is rendered to.
    pub dst_view: &'a SurfaceView,

    /// The region of the destination that is written.
    pub dst_box: ImageBox,

    /// The view that is sampled.
    pub src_view: &'a SampledView,

    /// The region of the source that is read.
    pub src_box: ImageBox,

    /// The width and height of the first mip level of the source, used to normalize texture
    /// coordinates.
    pub src_extent: [u32; 2],

    /// The channels to write.
    pub mask: BlitMask,

    /// The filter to use when the regions have different sizes.
    pub filter: Filter,

    /// If `Some`, nothing outside of this rectangle is written.
    pub scissor: Option<&'a Scissor>,

    /// Whether to blend with the existing contents of the destination.
    pub alpha_blend: bool,
}

/// A service that emulates blits and copies by drawing through the 3D pipeline.
///
/// Every method is called while a [blit stage](crate::context::RenderStage::Blit) is active on the
/// owning context, except for [`is_copy_supported`](Self::is_copy_supported).
pub trait BlitEmulator {
    /// Returns whether [`copy_texture`](Self::copy_texture) can copy between `dst` and `src`.
    /// This has no side effects.
    fn is_copy_supported(&self, dst: &Resource, src: &Resource) -> bool;

    /// Copies a region between two resources for which
    /// [`is_copy_supported`](Self::is_copy_supported) returned `true`.
    fn copy_texture(&mut self, info: &CopyRegionInfo);

    /// Performs a format-converting, filtering blit between two views. This always succeeds.
    fn blit_generic(&mut self, info: &GenericBlitInfo<'_>);
}

#[cfg(test)]
mod tests {
    use super::{BlitInfo, BlitMask, ColorComponents, Scissor};
    use crate::{
        format::Format,
        resource::{ImageBox, Resource, ResourceCreateInfo, ResourceShape},
        sampler::Filter,
    };
    use std::sync::Arc;

    fn image(extent: [u32; 2], format: Format, mip_levels: u32) -> Arc<Resource> {
        Resource::new(ResourceCreateInfo {
            mip_levels,
            ..ResourceCreateInfo::new(ResourceShape::Image2d { extent }, format)
        })
        .unwrap()
    }

    #[test]
    fn defaults() {
        let src = image([64, 32], Format::R5G6B5_UNORM_PACK16, 1);
        let dst = image([16, 16], Format::R8G8B8A8_SRGB, 1);
        let info = BlitInfo::new(src, dst);

        assert_eq!(info.src_box, ImageBox::new([0; 3], [64, 32, 1]));
        assert_eq!(info.dst_box, ImageBox::new([0; 3], [16, 16, 1]));
        assert_eq!(
            info.mask,
            BlitMask {
                color: ColorComponents::R | ColorComponents::G | ColorComponents::B,
                depth: false,
                stencil: false,
            },
        );
        assert_eq!(info.filter, Filter::Nearest);
        assert_eq!(info.scissor, None);
        assert!(info.validate().is_ok());
    }

    #[test]
    fn region_validation() {
        let src = image([64, 64], Format::R8G8B8A8_UNORM, 2);
        let dst = image([64, 64], Format::R8G8B8A8_UNORM, 1);

        let info = BlitInfo {
            src_level: 2,
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert_eq!(info.validate().unwrap_err().context, "src.level");

        let info = BlitInfo {
            src_level: 1,
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert_eq!(info.validate().unwrap_err().context, "src.box");

        let info = BlitInfo {
            dst_box: ImageBox::new([0; 3], [64, 0, 1]),
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert_eq!(info.validate().unwrap_err().context, "dst.box.extent");

        // Flipped horizontally.
        let info = BlitInfo {
            src_box: ImageBox::new([64, 0, 0], [-64, 64, 1]),
            ..BlitInfo::new(src, dst)
        };
        assert!(info.validate().is_ok());
    }

    #[test]
    fn format_and_mask_validation() {
        let src = image([8, 8], Format::R8G8B8A8_UNORM, 1);
        let dst = image([8, 8], Format::R8G8B8A8_UNORM, 1);

        let info = BlitInfo {
            dst_format: Some(Format::R16_UNORM),
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert_eq!(info.validate().unwrap_err().context, "dst_view.format");

        let info = BlitInfo {
            src_format: Some(Format::B8G8R8A8_SRGB),
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert!(info.validate().is_ok());

        let info = BlitInfo {
            mask: BlitMask::default(),
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert_eq!(info.validate().unwrap_err().context, "mask");

        let info = BlitInfo {
            mask: BlitMask::all(),
            ..BlitInfo::new(src.clone(), dst.clone())
        };
        assert_eq!(info.validate().unwrap_err().context, "mask.depth");

        let info = BlitInfo {
            scissor: Some(Scissor {
                offset: [u32::MAX, 0],
                extent: [1, 1],
            }),
            ..BlitInfo::new(src, dst)
        };
        assert_eq!(info.validate().unwrap_err().context, "scissor");
    }

    #[test]
    fn closures_are_hardware_blitters() {
        use super::HardwareBlit;

        let src = image([8, 8], Format::R8_UNORM, 1);
        let dst = image([8, 8], Format::R8_UNORM, 1);
        let info = BlitInfo::new(src, dst);

        let mut calls = 0;
        let mut engine = |info: &BlitInfo| {
            calls += 1;
            info.filter == Filter::Nearest
        };
        assert!(engine.try_blit(&info));
        assert_eq!(calls, 1);
    }
}
