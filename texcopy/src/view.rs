// Copyright (c) 2026 The texcopy developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Views over a subset of a resource, as seen by the blit machinery.
//!
//! A blit reads from a [`SampledView`] and writes into a [`SurfaceView`]. Both are transient:
//! the blitter creates them at the start of a generic blit and drops them before returning. Each
//! view holds a reference to its resource, so the resource stays alive exactly as long as the
//! view does.
//!
//! A view may reinterpret the texels of its resource with another format, as long as the texel
//! block layout in memory is the same. Buffers are always presented as single-level,
//! single-layer 1D images of `R8_UINT` texels.

use crate::{
    format::Format,
    macros::vulkan_enum,
    resource::{Resource, ResourceShape},
    sampler::ComponentMapping,
    ValidationError, NE,
};
use std::{ops::Range, sync::Arc};

vulkan_enum! {
    /// The geometry type of a view.
    #[non_exhaustive]
    ImageViewType = ImageViewType(i32);

    Dim1d = TYPE_1D,
    Dim2d = TYPE_2D,
    Dim3d = TYPE_3D,
    Cube = CUBE,
    Dim1dArray = TYPE_1D_ARRAY,
    Dim2dArray = TYPE_2D_ARRAY,
    CubeArray = CUBE_ARRAY,
}

impl ImageViewType {
    /// Returns whether `self` is compatible with a resource of the given shape, when the view
    /// covers `layer_count` layers.
    pub fn is_compatible_with(self, shape: &ResourceShape, layer_count: u32) -> bool {
        match (self, shape) {
            (
                ImageViewType::Dim1d,
                ResourceShape::Buffer { .. }
                | ResourceShape::Image1d { .. }
                | ResourceShape::Image1dArray { .. },
            ) => layer_count == 1,
            (
                ImageViewType::Dim1dArray,
                ResourceShape::Image1d { .. } | ResourceShape::Image1dArray { .. },
            ) => true,
            (
                ImageViewType::Dim2d,
                ResourceShape::Image2d { .. }
                | ResourceShape::Image2dArray { .. }
                | ResourceShape::Cube { .. }
                | ResourceShape::CubeArray { .. },
            ) => layer_count == 1,
            (
                ImageViewType::Dim2dArray,
                ResourceShape::Image2d { .. }
                | ResourceShape::Image2dArray { .. }
                | ResourceShape::Cube { .. }
                | ResourceShape::CubeArray { .. },
            ) => true,
            (
                ImageViewType::Cube,
                ResourceShape::Cube { .. } | ResourceShape::CubeArray { .. },
            ) => layer_count == 6,
            (
                ImageViewType::CubeArray,
                ResourceShape::Cube { .. } | ResourceShape::CubeArray { .. },
            ) => layer_count % 6 == 0,
            (ImageViewType::Dim3d, ResourceShape::Image3d { .. }) => true,
            _ => false,
        }
    }
}

/// Returns the format a view of `resource` uses when no format is requested explicitly.
///
/// Buffers are viewed as bytes. Images are viewed with the linear variant of their format, so that
/// the blit operates on the raw channel values.
#[inline]
pub fn default_view_format(resource: &Resource) -> Format {
    if resource.is_buffer() {
        Format::R8_UINT
    } else {
        resource.format().linear()
    }
}

fn validate_view_format(resource: &Resource, format: Format) -> Result<(), Box<ValidationError>> {
    if !format.is_copy_compatible(resource.texel_format()) {
        return Err(ValidationError::new(
            "format",
            "the texel block layout of the format differs from the one of the resource",
        ));
    }

    Ok(())
}

/// Parameters to create a new `SurfaceView`.
#[derive(Clone, Debug)]
pub struct SurfaceViewCreateInfo {
    /// The format the texels are written with.
    ///
    /// There is no default value.
    pub format: Format,

    /// The mip level that is rendered to.
    ///
    /// The default value is `0`.
    pub mip_level: u32,

    /// The range of slices that are rendered to. For 3D volumes these are depth slices.
    ///
    /// The default value is `0..1`.
    pub array_layers: Range<u32>,

    pub _ne: crate::NonExhaustive,
}

impl SurfaceViewCreateInfo {
    /// Returns a `SurfaceViewCreateInfo` with the specified `format`.
    #[inline]
    pub fn new(format: Format) -> Self {
        Self {
            format,
            mip_level: 0,
            array_layers: 0..1,
            _ne: NE,
        }
    }

    /// Returns the create info of a view that renders to slice `layer` of mip level `level` of
    /// `resource`.
    ///
    /// The format is `format` if it is `Some`, otherwise the
    /// [default view format](default_view_format) of the resource.
    pub fn from_resource(
        resource: &Resource,
        level: u32,
        layer: u32,
        format: Option<Format>,
    ) -> Self {
        Self {
            format: format.unwrap_or_else(|| default_view_format(resource)),
            mip_level: level,
            array_layers: layer..layer + 1,
            _ne: NE,
        }
    }

    pub(crate) fn validate(&self, resource: &Resource) -> Result<(), Box<ValidationError>> {
        let &Self {
            format,
            mip_level,
            ref array_layers,
            _ne: _,
        } = self;

        if mip_level >= resource.mip_levels() {
            return Err(ValidationError::new(
                "mip_level",
                "is not less than the number of mip levels of the resource",
            ));
        }

        if array_layers.is_empty() {
            return Err(ValidationError::new("array_layers", "is empty"));
        }

        if array_layers.end > resource.layer_count(mip_level) {
            return Err(ValidationError::new(
                "array_layers.end",
                "is greater than the number of slices in the mip level",
            ));
        }

        validate_view_format(resource, format)?;

        Ok(())
    }
}

/// A writable view over one mip level of a resource, used as the destination of a blit.
#[derive(Debug)]
pub struct SurfaceView {
    resource: Arc<Resource>,
    format: Format,
    mip_level: u32,
    array_layers: Range<u32>,
}

impl SurfaceView {
    /// Creates a new `SurfaceView` over `resource`.
    pub fn new(
        resource: Arc<Resource>,
        create_info: SurfaceViewCreateInfo,
    ) -> Result<Arc<SurfaceView>, Box<ValidationError>> {
        Self::validate_new(&resource, &create_info)?;

        Ok(Self::new_unchecked(resource, create_info))
    }

    fn validate_new(
        resource: &Resource,
        create_info: &SurfaceViewCreateInfo,
    ) -> Result<(), Box<ValidationError>> {
        create_info
            .validate(resource)
            .map_err(|err| err.add_context("create_info"))?;

        Ok(())
    }

    #[cfg_attr(not(feature = "document_unchecked"), doc(hidden))]
    pub fn new_unchecked(
        resource: Arc<Resource>,
        create_info: SurfaceViewCreateInfo,
    ) -> Arc<SurfaceView> {
        let SurfaceViewCreateInfo {
            format,
            mip_level,
            array_layers,
            _ne: _,
        } = create_info;

        Arc::new(SurfaceView {
            resource,
            format,
            mip_level,
            array_layers,
        })
    }

    /// Returns the resource this view was created from.
    #[inline]
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline]
    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    #[inline]
    pub fn array_layers(&self) -> Range<u32> {
        self.array_layers.clone()
    }

    /// Returns the extent of the mip level this view renders to.
    #[inline]
    pub fn extent(&self) -> [u32; 3] {
        // Validated on creation.
        self.resource
            .mip_level_extent(self.mip_level)
            .unwrap_or([1; 3])
    }
}

/// Parameters to create a new `SampledView`.
#[derive(Clone, Debug)]
pub struct SampledViewCreateInfo {
    /// The geometry the resource is sampled as.
    ///
    /// There is no default value.
    pub view_type: ImageViewType,

    /// The format the texels are read with.
    ///
    /// There is no default value.
    pub format: Format,

    /// The range of mip levels that can be sampled.
    ///
    /// The default value is `0..1`.
    pub mip_levels: Range<u32>,

    /// The range of layers that can be sampled. For 3D volumes these are the depth slices of the
    /// first mip level of the view.
    ///
    /// The default value is `0..1`.
    pub array_layers: Range<u32>,

    /// How to map the components of each texel.
    ///
    /// The default value is [`ComponentMapping::identity()`].
    pub component_mapping: ComponentMapping,

    pub _ne: crate::NonExhaustive,
}

impl SampledViewCreateInfo {
    /// Returns a `SampledViewCreateInfo` with the specified `view_type` and `format`.
    #[inline]
    pub fn new(view_type: ImageViewType, format: Format) -> Self {
        Self {
            view_type,
            format,
            mip_levels: 0..1,
            array_layers: 0..1,
            component_mapping: ComponentMapping::identity(),
            _ne: NE,
        }
    }

    /// Returns the create info of a view that samples every slice of mip level `level` of
    /// `resource`.
    ///
    /// - The view type follows the shape of the resource. Cube maps and cube map arrays are
    ///   sampled as 2D arrays covering every face if `cube_as_2d_array` is set. Buffers are
    ///   sampled as 1D images.
    /// - The format is `format` if it is `Some`, otherwise the
    ///   [default view format](default_view_format) of the resource.
    /// - The layers cover the whole array, or every depth slice of the level for 3D volumes.
    pub fn from_resource(
        resource: &Resource,
        level: u32,
        cube_as_2d_array: bool,
        format: Option<Format>,
    ) -> Self {
        let shape = resource.shape();
        let view_type = if cube_as_2d_array && shape.is_cube() {
            ImageViewType::Dim2dArray
        } else {
            shape.view_type()
        };

        Self {
            view_type,
            format: format.unwrap_or_else(|| default_view_format(resource)),
            mip_levels: level..level + 1,
            array_layers: 0..resource.layer_count(level),
            component_mapping: ComponentMapping::identity(),
            _ne: NE,
        }
    }

    pub(crate) fn validate(&self, resource: &Resource) -> Result<(), Box<ValidationError>> {
        let &Self {
            view_type,
            format,
            ref mip_levels,
            ref array_layers,
            component_mapping: _,
            _ne: _,
        } = self;

        if mip_levels.is_empty() {
            return Err(ValidationError::new("mip_levels", "is empty"));
        }

        if mip_levels.end > resource.mip_levels() {
            return Err(ValidationError::new(
                "mip_levels.end",
                "is greater than the number of mip levels of the resource",
            ));
        }

        if array_layers.is_empty() {
            return Err(ValidationError::new("array_layers", "is empty"));
        }

        if array_layers.end > resource.layer_count(mip_levels.start) {
            return Err(ValidationError::new(
                "array_layers.end",
                "is greater than the number of slices in the first mip level of the view",
            ));
        }

        if !view_type.is_compatible_with(resource.shape(), array_layers.end - array_layers.start) {
            return Err(ValidationError::new(
                "view_type",
                "is not compatible with the shape of the resource or with `array_layers`",
            ));
        }

        validate_view_format(resource, format)?;

        Ok(())
    }
}

/// A read-only view over a range of mip levels of a resource, used as the source of a blit.
#[derive(Debug)]
pub struct SampledView {
    resource: Arc<Resource>,
    view_type: ImageViewType,
    format: Format,
    mip_levels: Range<u32>,
    array_layers: Range<u32>,
    component_mapping: ComponentMapping,
}

impl SampledView {
    /// Creates a new `SampledView` over `resource`.
    pub fn new(
        resource: Arc<Resource>,
        create_info: SampledViewCreateInfo,
    ) -> Result<Arc<SampledView>, Box<ValidationError>> {
        Self::validate_new(&resource, &create_info)?;

        Ok(Self::new_unchecked(resource, create_info))
    }

    fn validate_new(
        resource: &Resource,
        create_info: &SampledViewCreateInfo,
    ) -> Result<(), Box<ValidationError>> {
        create_info
            .validate(resource)
            .map_err(|err| err.add_context("create_info"))?;

        Ok(())
    }

    #[cfg_attr(not(feature = "document_unchecked"), doc(hidden))]
    pub fn new_unchecked(
        resource: Arc<Resource>,
        create_info: SampledViewCreateInfo,
    ) -> Arc<SampledView> {
        let SampledViewCreateInfo {
            view_type,
            format,
            mip_levels,
            array_layers,
            component_mapping,
            _ne: _,
        } = create_info;

        Arc::new(SampledView {
            resource,
            view_type,
            format,
            mip_levels,
            array_layers,
            component_mapping,
        })
    }

    /// Returns the resource this view was created from.
    #[inline]
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    #[inline]
    pub fn view_type(&self) -> ImageViewType {
        self.view_type
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline]
    pub fn mip_levels(&self) -> Range<u32> {
        self.mip_levels.clone()
    }

    #[inline]
    pub fn array_layers(&self) -> Range<u32> {
        self.array_layers.clone()
    }

    #[inline]
    pub fn component_mapping(&self) -> ComponentMapping {
        self.component_mapping
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ImageViewType, SampledView, SampledViewCreateInfo, SurfaceView, SurfaceViewCreateInfo,
    };
    use crate::{
        format::Format,
        resource::{Resource, ResourceCreateInfo, ResourceShape},
    };
    use std::sync::Arc;

    fn resource(shape: ResourceShape, format: Format, mip_levels: u32) -> Arc<Resource> {
        Resource::new(ResourceCreateInfo {
            mip_levels,
            ..ResourceCreateInfo::new(shape, format)
        })
        .unwrap()
    }

    #[test]
    fn surface_defaults_to_linear_format() {
        let image = resource(
            ResourceShape::Image2d { extent: [32, 32] },
            Format::R8G8B8A8_SRGB,
            1,
        );

        let create_info = SurfaceViewCreateInfo::from_resource(&image, 0, 0, None);
        assert_eq!(create_info.format, Format::R8G8B8A8_UNORM);

        let view = SurfaceView::new(image.clone(), create_info).unwrap();
        assert_eq!(view.format(), Format::R8G8B8A8_UNORM);
        assert_eq!(view.extent(), [32, 32, 1]);

        let create_info =
            SurfaceViewCreateInfo::from_resource(&image, 0, 0, Some(Format::B8G8R8A8_SRGB));
        assert_eq!(create_info.format, Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn surface_rejects_out_of_range() {
        let image = resource(
            ResourceShape::Image2dArray {
                extent: [16, 16],
                array_layers: 4,
            },
            Format::R8_UNORM,
            2,
        );

        let err = SurfaceView::new(
            image.clone(),
            SurfaceViewCreateInfo::from_resource(&image, 2, 0, None),
        )
        .unwrap_err();
        assert_eq!(err.context, "create_info.mip_level");

        let err = SurfaceView::new(
            image.clone(),
            SurfaceViewCreateInfo::from_resource(&image, 1, 4, None),
        )
        .unwrap_err();
        assert_eq!(err.context, "create_info.array_layers.end");

        let err = SurfaceView::new(
            image.clone(),
            SurfaceViewCreateInfo::from_resource(&image, 0, 0, Some(Format::R16_UINT)),
        )
        .unwrap_err();
        assert_eq!(err.context, "create_info.format");
    }

    #[test]
    fn sampled_view_of_cube() {
        let cube = resource(ResourceShape::Cube { extent: [8, 8] }, Format::R8_UNORM, 1);

        let native = SampledViewCreateInfo::from_resource(&cube, 0, false, None);
        assert_eq!(native.view_type, ImageViewType::Cube);
        assert_eq!(native.array_layers, 0..6);

        let remapped = SampledViewCreateInfo::from_resource(&cube, 0, true, None);
        assert_eq!(remapped.view_type, ImageViewType::Dim2dArray);
        assert_eq!(remapped.array_layers, 0..6);

        let view = SampledView::new(cube.clone(), remapped).unwrap();
        assert_eq!(view.view_type(), ImageViewType::Dim2dArray);
        assert!(view.component_mapping().is_identity());
    }

    #[test]
    fn sampled_view_of_volume_covers_level_depth() {
        let volume = resource(
            ResourceShape::Image3d {
                extent: [16, 16, 16],
            },
            Format::R8G8B8A8_UNORM,
            3,
        );

        let create_info = SampledViewCreateInfo::from_resource(&volume, 2, false, None);
        assert_eq!(create_info.view_type, ImageViewType::Dim3d);
        assert_eq!(create_info.mip_levels, 2..3);
        assert_eq!(create_info.array_layers, 0..4);
        SampledView::new(volume, create_info).unwrap();
    }

    #[test]
    fn buffers_alias_to_bytes() {
        let buffer = resource(ResourceShape::Buffer { size: 256 }, Format::R32_SFLOAT, 1);

        let create_info = SampledViewCreateInfo::from_resource(&buffer, 0, true, None);
        assert_eq!(create_info.view_type, ImageViewType::Dim1d);
        assert_eq!(create_info.format, Format::R8_UINT);
        assert_eq!(create_info.mip_levels, 0..1);
        assert_eq!(create_info.array_layers, 0..1);
        SampledView::new(buffer.clone(), create_info).unwrap();

        let create_info = SurfaceViewCreateInfo::from_resource(&buffer, 0, 0, None);
        assert_eq!(create_info.format, Format::R8_UINT);
        let view = SurfaceView::new(buffer, create_info).unwrap();
        assert_eq!(view.extent(), [256, 1, 1]);
    }

    #[test]
    fn incompatible_view_type() {
        let image = resource(
            ResourceShape::Image2d { extent: [8, 8] },
            Format::R8_UNORM,
            1,
        );

        let err = SampledView::new(
            image,
            SampledViewCreateInfo::new(ImageViewType::Dim3d, Format::R8_UNORM),
        )
        .unwrap_err();
        assert_eq!(err.context, "create_info.view_type");
    }

    #[test]
    fn view_keeps_resource_alive() {
        let image = resource(
            ResourceShape::Image2d { extent: [8, 8] },
            Format::R8_UNORM,
            1,
        );

        let view = SurfaceView::new(
            image.clone(),
            SurfaceViewCreateInfo::from_resource(&image, 0, 0, None),
        )
        .unwrap();
        assert_eq!(Arc::strong_count(&image), 2);

        drop(view);
        assert_eq!(Arc::strong_count(&image), 1);
    }
}
