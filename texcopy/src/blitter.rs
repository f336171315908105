// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The dispatcher that routes copies and blits to the collaborators able to carry them out.
//!
//! A copy is attempted with each [`Strategy`] in turn, in [priority order](Strategy::PRIORITY):
//!
//! 1. The hardware blit engine, if one is installed. It receives a [`BlitInfo`] with the native
//!    formats of both resources, every channel of the source format, nearest filtering and no
//!    scissor, and may decline.
//! 2. The blit-emulation service, which copies through the 3D pipeline. It is skipped if either
//!    resource is a buffer, or if the service reports that it can't copy between the two
//!    resources. The copy is bracketed by a blit stage on the owning context.
//! 3. The software copy, which never declines.
//!
//! Each strategy is attempted at most once, and the first one to take the request ends the
//! dispatch.

use crate::{
    blit::{BlitEmulator, BlitInfo, GenericBlitInfo, HardwareBlit},
    context::{ExecutionContext, StageGuard, StageInfo},
    copy::{CopyOutcome, CopyRegionInfo, Strategy},
    software::SoftwareCopy,
    view::{SampledView, SampledViewCreateInfo, SurfaceView, SurfaceViewCreateInfo},
    ValidationError, NE,
};

/// Parameters to create a new `Blitter`.
#[derive(Clone, Debug)]
pub struct BlitterCreateInfo {
    /// Whether cube maps and cube map arrays must be sampled as 2D arrays covering every face,
    /// because the device can't sample cube views in blits.
    ///
    /// The default value is `false`.
    pub cube_as_2d_array: bool,

    pub _ne: crate::NonExhaustive,
}

impl Default for BlitterCreateInfo {
    #[inline]
    fn default() -> Self {
        Self {
            cube_as_2d_array: false,
            _ne: NE,
        }
    }
}

/// Routes copies and blits on behalf of an execution context.
pub struct Blitter<C> {
    context: C,
    hardware_blit: Option<Box<dyn HardwareBlit>>,
    emulator: Box<dyn BlitEmulator>,
    software: Box<dyn SoftwareCopy>,
    cube_as_2d_array: bool,
}

impl<C> Blitter<C>
where
    C: ExecutionContext,
{
    /// Creates a new `Blitter` for `context`, without a hardware blit engine.
    pub fn new(
        context: C,
        emulator: Box<dyn BlitEmulator>,
        software: Box<dyn SoftwareCopy>,
        create_info: BlitterCreateInfo,
    ) -> Self {
        let BlitterCreateInfo {
            cube_as_2d_array,
            _ne: _,
        } = create_info;

        Blitter {
            context,
            hardware_blit: None,
            emulator,
            software,
            cube_as_2d_array,
        }
    }

    /// Installs or removes the hardware blit engine.
    #[inline]
    pub fn set_hardware_blit(&mut self, hardware_blit: Option<Box<dyn HardwareBlit>>) {
        self.hardware_blit = hardware_blit;
    }

    /// Returns whether a hardware blit engine is installed.
    #[inline]
    pub fn has_hardware_blit(&self) -> bool {
        self.hardware_blit.is_some()
    }

    /// Returns the execution context.
    #[inline]
    pub fn context(&self) -> &C {
        &self.context
    }

    #[inline]
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Destroys the blitter and returns the execution context.
    #[inline]
    pub fn into_context(self) -> C {
        self.context
    }

    #[inline]
    pub fn cube_as_2d_array(&self) -> bool {
        self.cube_as_2d_array
    }

    /// Copies a region between two resources with the first strategy that takes it, and returns
    /// that strategy.
    ///
    /// Once the request is valid, the copy always completes. A region with a zero dimension is not
    /// valid, and neither is a region overlapping its destination within the same mip level of a
    /// single resource.
    pub fn copy_region(
        &mut self,
        copy_region_info: &CopyRegionInfo,
    ) -> Result<Strategy, Box<ValidationError>> {
        self.validate_copy_region(copy_region_info)?;

        Ok(self.copy_region_unchecked(copy_region_info))
    }

    fn validate_copy_region(
        &self,
        copy_region_info: &CopyRegionInfo,
    ) -> Result<(), Box<ValidationError>> {
        copy_region_info
            .validate()
            .map_err(|err| err.add_context("copy_region_info"))?;

        Ok(())
    }

    #[cfg_attr(not(feature = "document_unchecked"), doc(hidden))]
    pub fn copy_region_unchecked(&mut self, copy_region_info: &CopyRegionInfo) -> Strategy {
        for strategy in Strategy::PRIORITY {
            let outcome = match strategy {
                Strategy::HardwareBlit => self.try_hardware_blit(copy_region_info),
                Strategy::PipelineBlit => self.try_pipeline_blit(copy_region_info),
                Strategy::SoftwareCopy => {
                    self.software.copy_region(copy_region_info);
                    CopyOutcome::Handled
                }
            };

            if outcome.is_handled() {
                tracing::debug!(?strategy, "copy handled");

                return strategy;
            }

            tracing::trace!(?strategy, "copy declined");
        }

        unreachable!("the software copy never declines")
    }

    fn try_hardware_blit(&mut self, copy_region_info: &CopyRegionInfo) -> CopyOutcome {
        let Some(hardware_blit) = self.hardware_blit.as_mut() else {
            return CopyOutcome::Declined;
        };

        hardware_blit
            .try_blit(&copy_region_info.to_blit_info())
            .into()
    }

    fn try_pipeline_blit(&mut self, copy_region_info: &CopyRegionInfo) -> CopyOutcome {
        let CopyRegionInfo {
            src_resource,
            dst_resource,
            ..
        } = copy_region_info;

        if src_resource.is_buffer() || dst_resource.is_buffer() {
            return CopyOutcome::Declined;
        }

        if !self.emulator.is_copy_supported(dst_resource, src_resource) {
            return CopyOutcome::Declined;
        }

        let _stage = StageGuard::begin(&mut self.context, StageInfo::blit(false, false));
        self.emulator.copy_texture(copy_region_info);

        CopyOutcome::Handled
    }

    /// Blits a region of a resource into another through the blit-emulation service, converting
    /// formats and filtering as requested.
    ///
    /// Once the request is valid, the blit always completes. A region with a zero dimension is not
    /// valid.
    pub fn blit(&mut self, blit_info: &BlitInfo) -> Result<(), Box<ValidationError>> {
        self.validate_blit(blit_info)?;
        self.blit_unchecked(blit_info);

        Ok(())
    }

    fn validate_blit(&self, blit_info: &BlitInfo) -> Result<(), Box<ValidationError>> {
        blit_info
            .validate()
            .map_err(|err| err.add_context("blit_info"))?;

        Ok(())
    }

    #[cfg_attr(not(feature = "document_unchecked"), doc(hidden))]
    pub fn blit_unchecked(&mut self, blit_info: &BlitInfo) {
        let &BlitInfo {
            ref src_resource,
            src_level,
            src_box,
            src_format,
            ref dst_resource,
            dst_level,
            dst_box,
            dst_format,
            mask,
            filter,
            ref scissor,
            render_condition,
            alpha_blend,
            _ne: _,
        } = blit_info;

        // Without scissor or blending, a blit covering the whole level overwrites everything.
        let discard = scissor.is_none()
            && !alpha_blend
            && dst_resource.covers_whole_level(dst_level, &dst_box);

        if discard {
            tracing::debug!(dst_level, "blit discards the destination contents");
        }

        let stage = StageGuard::begin(
            &mut self.context,
            StageInfo::blit(render_condition, discard),
        );

        let dst_view = SurfaceView::new_unchecked(
            dst_resource.clone(),
            SurfaceViewCreateInfo::from_resource(
                dst_resource,
                dst_level,
                dst_box.offset[2] as u32,
                dst_format,
            ),
        );
        let src_view = SampledView::new_unchecked(
            src_resource.clone(),
            SampledViewCreateInfo::from_resource(
                src_resource,
                src_level,
                self.cube_as_2d_array,
                src_format,
            ),
        );
        let [src_width, src_height, _] = src_resource.extent();

        self.emulator.blit_generic(&GenericBlitInfo {
            dst_view: &dst_view,
            dst_box,
            src_view: &src_view,
            src_box,
            src_extent: [src_width, src_height],
            mask,
            filter,
            scissor: scissor.as_ref(),
            alpha_blend,
        });

        drop(src_view);
        drop(dst_view);
        drop(stage);
    }
}
