// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Plain copies between resources, and the strategies that can carry them out.

use crate::{
    blit::{level_box_extent, validate_region, BlitInfo},
    resource::{ImageBox, Resource},
    sampler::Filter,
    ValidationError, NE,
};
use std::sync::Arc;

/// Parameters to copy a region of a resource into another, without any conversion.
#[derive(Clone, Debug)]
pub struct CopyRegionInfo {
    /// The resource to copy from.
    ///
    /// There is no default value.
    pub src_resource: Arc<Resource>,

    /// The mip level of `src_resource` to copy from.
    ///
    /// The default value is `0`.
    pub src_level: u32,

    /// The region of `src_resource` to copy. The third axis selects array layers, or depth slices
    /// for 3D volumes.
    ///
    /// The default value is the whole of mip level 0.
    pub src_box: ImageBox,

    /// The resource to copy to.
    ///
    /// There is no default value.
    pub dst_resource: Arc<Resource>,

    /// The mip level of `dst_resource` to copy to.
    ///
    /// The default value is `0`.
    pub dst_level: u32,

    /// The offset in `dst_resource` where the region is copied. The extent is the same as the one
    /// of `src_box`.
    ///
    /// The default value is `[0; 3]`.
    pub dst_offset: [u32; 3],

    pub _ne: crate::NonExhaustive,
}

impl CopyRegionInfo {
    /// Returns a `CopyRegionInfo` with the specified `src_resource` and `dst_resource`.
    #[inline]
    pub fn new(src_resource: Arc<Resource>, dst_resource: Arc<Resource>) -> Self {
        let src_box = ImageBox::from_extent(level_box_extent(&src_resource, 0));

        Self {
            src_resource,
            src_level: 0,
            src_box,
            dst_resource,
            dst_level: 0,
            dst_offset: [0; 3],
            _ne: NE,
        }
    }

    /// Returns the region of `dst_resource` that is written.
    #[inline]
    pub fn dst_box(&self) -> ImageBox {
        ImageBox {
            offset: self.dst_offset.map(|x| x as i32),
            extent: self.src_box.extent,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), Box<ValidationError>> {
        let &Self {
            ref src_resource,
            src_level,
            ref src_box,
            ref dst_resource,
            dst_level,
            dst_offset,
            _ne: _,
        } = self;

        if src_box.is_flipped() {
            return Err(ValidationError::new(
                "src_box.extent",
                "is negative; copies cannot flip",
            ));
        }

        if dst_offset.iter().any(|&x| x > i32::MAX as u32) {
            return Err(ValidationError::new(
                "dst_offset",
                "does not fit in a signed 32-bit coordinate",
            ));
        }

        validate_region(src_resource, src_level, src_box)
            .map_err(|err| err.add_context("src"))?;
        validate_region(dst_resource, dst_level, &self.dst_box())
            .map_err(|err| err.add_context("dst"))?;

        if !src_resource
            .texel_format()
            .is_copy_compatible(dst_resource.texel_format())
        {
            return Err(ValidationError::new(
                "dst_resource",
                "the texel block layout differs from the one of `src_resource`",
            ));
        }

        if Arc::ptr_eq(src_resource, dst_resource) && src_level == dst_level {
            let (src_min, src_max) = src_box.bounds();
            let (dst_min, dst_max) = self.dst_box().bounds();

            if (0..3).all(|axis| src_min[axis] < dst_max[axis] && dst_min[axis] < src_max[axis]) {
                return Err(ValidationError::new(
                    "dst_offset",
                    "the destination region overlaps the source region",
                ));
            }
        }

        let [block_width, block_height, _] = src_resource.texel_block_extent();

        if block_width != 1 || block_height != 1 {
            let src_extent = level_box_extent(src_resource, src_level);
            let dst_extent = level_box_extent(dst_resource, dst_level);
            let aligned = |offset: i64, extent: i64, block: u32, level_extent: u32| {
                let block = block as i64;
                offset % block == 0
                    && (extent % block == 0 || offset + extent == level_extent as i64)
            };

            for (axis, block) in [(0, block_width), (1, block_height)] {
                let extent = src_box.extent[axis] as i64;

                if !aligned(src_box.offset[axis] as i64, extent, block, src_extent[axis])
                    || !aligned(dst_offset[axis] as i64, extent, block, dst_extent[axis])
                {
                    return Err(ValidationError::new(
                        "src_box",
                        "the region is not aligned to the texel block dimensions",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Returns the request handed to a hardware blit engine for this copy: native formats on both
    /// sides, every channel of the source format, nearest filtering and no scissor.
    ///
    /// # Panics
    ///
    /// - Panics if the width or height of `src_box` is negative.
    pub fn to_blit_info(&self) -> BlitInfo {
        assert!(self.src_box.extent[0] >= 0);
        assert!(self.src_box.extent[1] >= 0);

        BlitInfo {
            src_level: self.src_level,
            src_box: self.src_box,
            src_format: Some(self.src_resource.format()),
            dst_level: self.dst_level,
            dst_box: self.dst_box(),
            dst_format: Some(self.dst_resource.format()),
            mask: self.src_resource.format().blit_mask(),
            filter: Filter::Nearest,
            scissor: None,
            render_condition: false,
            alpha_blend: false,
            ..BlitInfo::new(self.src_resource.clone(), self.dst_resource.clone())
        }
    }
}

/// One of the ways a copy can be carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// A fixed-function blit engine.
    HardwareBlit,
    /// A copy drawn through the 3D pipeline by the blit-emulation service.
    PipelineBlit,
    /// A copy of host-visible memory. Never declines.
    SoftwareCopy,
}

impl Strategy {
    /// The strategies in the order they are attempted.
    pub const PRIORITY: [Strategy; 3] = [
        Strategy::HardwareBlit,
        Strategy::PipelineBlit,
        Strategy::SoftwareCopy,
    ];
}

/// Whether a strategy took a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum CopyOutcome {
    /// The work was issued; no other strategy may be attempted.
    Handled,
    /// The strategy does not apply; the next one is attempted.
    Declined,
}

impl CopyOutcome {
    #[inline]
    pub fn is_handled(self) -> bool {
        matches!(self, CopyOutcome::Handled)
    }
}

impl From<bool> for CopyOutcome {
    #[inline]
    fn from(handled: bool) -> Self {
        if handled {
            CopyOutcome::Handled
        } else {
            CopyOutcome::Declined
        }
    }
}
